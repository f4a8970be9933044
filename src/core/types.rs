//! Core types for document optimization settings and results.

use serde::{Deserialize, Serialize};
use crate::utils::OptimizerError;

/// Settings for one document job.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct JobSettings {
    /// JPEG quality level (1-100). PNG and BMP re-encoding ignores it.
    pub quality: u32,
}

impl Default for JobSettings {
    fn default() -> Self {
        Self { quality: 75 }
    }
}

/// Statistics of a finished document job.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CompressionReport {
    /// Input document size in bytes
    pub original_size: u64,
    /// Output document size in bytes
    pub compressed_size: u64,
    /// Bytes saved (negative if the document grew)
    pub saved_bytes: i64,
    /// Size reduction as a percentage of the original
    pub compression_ratio: f64,
    /// Candidate images found in the media directory
    pub images_total: usize,
    /// Images re-encoded in place
    pub images_processed: usize,
    /// Images left untouched after a decode or encode failure
    pub images_skipped: usize,
    /// Combined size of the re-encoded images before and after
    pub image_bytes_before: u64,
    pub image_bytes_after: u64,
    /// Whether the run stopped early on a cancel request
    pub cancelled: bool,
}

/// Terminal result of a job: exactly one per run.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct JobOutcome {
    pub success: bool,
    /// Human-readable summary on success, failure reason otherwise
    pub message: String,
    #[serde(default)]
    pub report: Option<CompressionReport>,
}

impl JobOutcome {
    pub fn succeeded(report: CompressionReport) -> Self {
        Self {
            success: true,
            message: report.summary(),
            report: Some(report),
        }
    }

    pub fn failed(error: &OptimizerError) -> Self {
        Self {
            success: false,
            message: format!("Compression failed: {error}"),
            report: None,
        }
    }
}
