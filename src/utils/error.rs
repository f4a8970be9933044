//! Error types for the document optimizer.
//!
//! One variant per failure class of the pipeline. Every variant except
//! [`OptimizerError::Image`] is terminal for a job; image errors are caught
//! per file, logged and never reach the caller.

use std::io;
use std::path::PathBuf;
use thiserror::Error;
use serde::Serialize;

/// Main error type for the optimizer.
///
/// All pipeline failures are converted to this type before being reported
/// as a failed [`JobOutcome`](crate::core::JobOutcome).
#[derive(Error, Debug, Serialize)]
pub enum OptimizerError {
    /// Input document does not exist
    #[error("Input file does not exist: {}", .0.display())]
    NotFound(PathBuf),

    /// Input extension is not a recognized Word document extension
    #[error("Unsupported format: {0}")]
    UnsupportedFormat(String),

    /// Container unpacked but lacks the expected layout
    #[error("Invalid document structure: {0}")]
    InvalidStructure(String),

    /// Container cannot be opened or an entry cannot be read
    #[error("Corrupt archive: {0}")]
    CorruptArchive(String),

    /// Output container cannot be written
    #[error("Write error: {0}")]
    Write(String),

    /// Job settings or configuration out of range
    #[error("Settings error: {0}")]
    Settings(String),

    /// Single image could not be decoded or re-encoded
    #[error("Image error: {0}")]
    Image(String),

    /// Any other unexpected failure
    #[error("Pipeline error: {0}")]
    Pipeline(String),
}

/// Convenience result type for optimizer operations.
pub type OptimizerResult<T> = Result<T, OptimizerError>;

// Helper methods for error creation
impl OptimizerError {
    pub fn unsupported_format<T: Into<String>>(msg: T) -> Self {
        Self::UnsupportedFormat(msg.into())
    }

    pub fn invalid_structure<T: Into<String>>(msg: T) -> Self {
        Self::InvalidStructure(msg.into())
    }

    pub fn corrupt_archive<T: Into<String>>(msg: T) -> Self {
        Self::CorruptArchive(msg.into())
    }

    pub fn write<T: Into<String>>(msg: T) -> Self {
        Self::Write(msg.into())
    }

    pub fn settings<T: Into<String>>(msg: T) -> Self {
        Self::Settings(msg.into())
    }

    pub fn image<T: Into<String>>(msg: T) -> Self {
        Self::Image(msg.into())
    }

    pub fn pipeline<T: Into<String>>(msg: T) -> Self {
        Self::Pipeline(msg.into())
    }
}

// Unexpected IO outside a stage-specific mapping is a pipeline failure
impl From<io::Error> for OptimizerError {
    fn from(err: io::Error) -> Self {
        Self::Pipeline(format!("IO error: {err}"))
    }
}

impl From<image::ImageError> for OptimizerError {
    fn from(err: image::ImageError) -> Self {
        Self::Image(err.to_string())
    }
}
