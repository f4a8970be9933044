//! Sequential in-place recompression of the media directory.
//!
//! Images are handled one at a time in file-name order. A failing image is
//! logged and left untouched; the cancel flag is checked between images only.

use std::fs;
use std::io::Write;
use std::path::{Path, PathBuf};
use tempfile::NamedTempFile;
use tracing::{debug, warn};

use crate::core::{CancelFlag, Progress, ProgressSink, ProgressType};
use crate::utils::{ImageFormat, OptimizerError, OptimizerResult, extract_filename, image_format};

use super::formats::{EncodePolicy, recompress};

/// A candidate raster file inside the media directory.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ImageEntry {
    pub path: PathBuf,
    pub format: ImageFormat,
}

/// Counts for one pass over the media directory.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct RecompressSummary {
    pub total: usize,
    pub processed: usize,
    pub skipped: usize,
    pub cancelled: bool,
    /// Bytes of the handled images before and after re-encoding
    pub bytes_before: u64,
    pub bytes_after: u64,
}

/// Lists candidate images directly inside `media_dir`, sorted by file name.
///
/// A missing directory yields no candidates.
pub fn scan_candidates(media_dir: &Path) -> OptimizerResult<Vec<ImageEntry>> {
    if !media_dir.is_dir() {
        return Ok(Vec::new());
    }

    let mut entries = Vec::new();
    for entry in fs::read_dir(media_dir)? {
        let entry = entry?;
        if !entry.file_type()?.is_file() {
            continue;
        }
        let path = entry.path();
        if let Some(format) = image_format(&path) {
            entries.push(ImageEntry { path, format });
        }
    }

    entries.sort_by(|a, b| a.path.file_name().cmp(&b.path.file_name()));
    Ok(entries)
}

/// Executor that re-encodes media images in place.
pub struct MediaExecutor<'a> {
    policy: EncodePolicy,
    cancel: &'a CancelFlag,
}

impl<'a> MediaExecutor<'a> {
    pub fn new(policy: EncodePolicy, cancel: &'a CancelFlag) -> Self {
        Self { policy, cancel }
    }

    /// Processes `entries` in order, emitting one progress event after each image.
    pub fn execute_batch(&self, entries: &[ImageEntry], sink: &dyn ProgressSink) -> RecompressSummary {
        let total = entries.len();
        let mut summary = RecompressSummary { total, ..RecompressSummary::default() };

        for (idx, entry) in entries.iter().enumerate() {
            if self.cancel.is_cancelled() {
                debug!("Cancel requested, stopping after {idx} of {total} images");
                summary.cancelled = true;
                break;
            }

            let file_name = extract_filename(&entry.path);
            let progress_type = match optimize_single(entry, &self.policy) {
                Ok((before, after)) => {
                    debug!("'{file_name}': {before} -> {after} bytes");
                    summary.processed += 1;
                    summary.bytes_before += before;
                    summary.bytes_after += after;
                    ProgressType::Processed
                }
                Err(e) => {
                    warn!("Image processing failed: {file_name} - {e}");
                    summary.skipped += 1;
                    ProgressType::Skipped
                }
            };

            sink.emit(&Progress::new(progress_type, idx + 1, total, file_name));
        }

        summary
    }
}

/// Re-encodes one image and swaps it in atomically.
///
/// The original file is only replaced once the new bytes are fully written.
fn optimize_single(entry: &ImageEntry, policy: &EncodePolicy) -> OptimizerResult<(u64, u64)> {
    let original = fs::read(&entry.path)
        .map_err(|e| OptimizerError::image(format!("Cannot read image: {e}")))?;
    let encoded = recompress(&original, entry.format, policy)?;

    let dir = entry.path.parent().unwrap_or_else(|| Path::new("."));
    let mut staged = NamedTempFile::new_in(dir)
        .map_err(|e| OptimizerError::image(format!("Cannot stage re-encoded image: {e}")))?;
    staged
        .write_all(&encoded)
        .map_err(|e| OptimizerError::image(format!("Cannot stage re-encoded image: {e}")))?;
    staged
        .persist(&entry.path)
        .map_err(|e| OptimizerError::image(format!("Cannot replace image: {}", e.error)))?;

    Ok((original.len() as u64, encoded.len() as u64))
}
