//! Runtime configuration for the optimizer.

use std::path::{Path, PathBuf};
use serde::{Deserialize, Serialize};
use crate::utils::{OptimizerError, OptimizerResult, validate_quality};

/// PNG deflate effort used when re-encoding PNG images.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PngCompression {
    Fast,
    Default,
    #[default]
    Best,
}

impl From<PngCompression> for image::codecs::png::CompressionType {
    fn from(value: PngCompression) -> Self {
        match value {
            PngCompression::Fast => Self::Fast,
            PngCompression::Default => Self::Default,
            PngCompression::Best => Self::Best,
        }
    }
}

impl From<PngCompression> for png::Compression {
    fn from(value: PngCompression) -> Self {
        match value {
            PngCompression::Fast => Self::Fast,
            PngCompression::Default => Self::Default,
            PngCompression::Best => Self::Best,
        }
    }
}

/// Optimizer configuration.
///
/// Every field has a default, so a config file only needs the keys it overrides.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct OptimizerConfig {
    /// Quality used when the caller supplies none
    pub default_quality: u32,
    /// Media-bearing directory inside the container, `/`-separated
    pub media_dir: String,
    /// Prefix for derived output file names
    pub output_prefix: String,
    /// Reject documents without a media directory instead of passing them through
    pub require_media_dir: bool,
    pub png_compression: PngCompression,
    /// Deflate level for repackaged entries, zip default when unset
    pub archive_compression_level: Option<i64>,
    /// Parent directory for scratch trees, system temp dir when unset
    pub scratch_root: Option<PathBuf>,
    /// Jobs a [`WorkerPool`](crate::worker::WorkerPool) runs at once
    pub max_concurrent_jobs: usize,
}

impl Default for OptimizerConfig {
    fn default() -> Self {
        Self {
            default_quality: 75,
            media_dir: "word/media".to_string(),
            output_prefix: "compressed_".to_string(),
            require_media_dir: false,
            png_compression: PngCompression::Best,
            archive_compression_level: None,
            scratch_root: None,
            max_concurrent_jobs: 1,
        }
    }
}

impl OptimizerConfig {
    /// Loads a JSON config file and validates it
    pub fn from_file(path: impl AsRef<Path>) -> OptimizerResult<Self> {
        let path = path.as_ref();
        let raw = std::fs::read_to_string(path).map_err(|e| OptimizerError::settings(
            format!("Cannot read config file {}: {e}", path.display())
        ))?;
        let config: Self = serde_json::from_str(&raw).map_err(|e| OptimizerError::settings(
            format!("Invalid config file {}: {e}", path.display())
        ))?;
        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> OptimizerResult<()> {
        validate_quality(self.default_quality)?;

        if self.max_concurrent_jobs == 0 {
            return Err(OptimizerError::settings("max_concurrent_jobs must be at least 1"));
        }

        if self.media_dir.trim_matches('/').is_empty() {
            return Err(OptimizerError::settings("media_dir cannot be empty"));
        }

        if let Some(level) = self.archive_compression_level {
            if !(0..=9).contains(&level) {
                return Err(OptimizerError::settings(
                    format!("archive_compression_level must be 0-9, got {level}")
                ));
            }
        }

        Ok(())
    }

    /// Media directory inside a scratch tree rooted at `root`
    pub fn media_path(&self, root: &Path) -> PathBuf {
        self.media_dir
            .split('/')
            .filter(|part| !part.is_empty())
            .fold(root.to_path_buf(), |acc, part| acc.join(part))
    }
}
