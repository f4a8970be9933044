use serde::{Deserialize, Serialize};
use std::path::Path;
use std::str::FromStr;
use crate::utils::OptimizerError;

/// Word document container flavours accepted by validation.
///
/// Only the extension is checked. A legacy binary `.doc` passes here and
/// fails later when the unpacker finds it is not a zip container.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum DocumentFormat {
    Docx,
    Doc,
}

impl DocumentFormat {
    /// Whether the container is expected to be a zip package
    pub fn is_zip_package(&self) -> bool {
        matches!(self, Self::Docx)
    }
}

impl FromStr for DocumentFormat {
    type Err = OptimizerError;

    fn from_str(ext: &str) -> Result<Self, Self::Err> {
        match ext.to_lowercase().as_str() {
            "docx" => Ok(Self::Docx),
            "doc" => Ok(Self::Doc),
            other => Err(OptimizerError::unsupported_format(format!(
                "Only Word documents (.docx/.doc) are supported, got: .{other}"
            ))),
        }
    }
}

/// Get the document format from a path's extension
pub fn document_format(path: &Path) -> Result<DocumentFormat, OptimizerError> {
    let ext = path
        .extension()
        .and_then(|e| e.to_str())
        .ok_or_else(|| OptimizerError::unsupported_format(format!(
            "File has no extension: {}", path.display()
        )))?;

    DocumentFormat::from_str(ext)
}

/// Raster formats recognized inside the media directory.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ImageFormat {
    JPEG,
    PNG,
    BMP,
}

impl FromStr for ImageFormat {
    type Err = OptimizerError;

    fn from_str(ext: &str) -> Result<Self, Self::Err> {
        match ext.to_lowercase().as_str() {
            "jpg" | "jpeg" => Ok(Self::JPEG),
            "png" => Ok(Self::PNG),
            "bmp" => Ok(Self::BMP),
            other => Err(OptimizerError::unsupported_format(format!(
                "Unsupported image format: {other}"
            ))),
        }
    }
}

/// Get the image format from a path's extension, `None` when it is not a candidate
pub fn image_format(path: &Path) -> Option<ImageFormat> {
    path.extension()
        .and_then(|e| e.to_str())
        .and_then(|e| ImageFormat::from_str(e).ok())
}
