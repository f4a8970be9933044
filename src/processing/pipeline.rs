//! The document recompression pipeline.
//!
//! Stages run strictly in order: validate, unpack, recompress images,
//! repackage, report. The scratch tree lives in a [`tempfile::TempDir`]
//! owned by this function, so it is removed on every exit path.

use tracing::{debug, info, warn};

use crate::core::{CompressionReport, DocumentJob, JobOutcome, OptimizerConfig, ProgressSink};
use crate::utils::{OptimizerError, OptimizerResult, extract_filename, get_file_size, validate_job};

use super::images::{EncodePolicy, MediaExecutor, scan_candidates};
use super::package::{create_scratch_dir, repack, unpack};
use super::report::build_report;

/// Runs one job to completion and converts any failure into a failed outcome.
pub fn run_job(job: &DocumentJob, config: &OptimizerConfig, sink: &dyn ProgressSink) -> JobOutcome {
    match execute(job, config, sink) {
        Ok(report) => {
            info!(
                "Compressed {} -> {} ({:.1}% smaller)",
                job.input_path.display(),
                job.output_path.display(),
                report.compression_ratio
            );
            JobOutcome::succeeded(report)
        }
        Err(e) => {
            warn!("Compression of {} failed: {e}", job.input_path.display());
            JobOutcome::failed(&e)
        }
    }
}

/// Runs the pipeline, propagating the first terminal error.
pub fn execute(
    job: &DocumentJob,
    config: &OptimizerConfig,
    sink: &dyn ProgressSink,
) -> OptimizerResult<CompressionReport> {
    let format = validate_job(job)?;
    if !format.is_zip_package() {
        debug!(
            "{} has a legacy extension, unpacking it as a zip container anyway",
            extract_filename(&job.input_path)
        );
    }

    // Measured up front so an in-place job still reports the real original size
    let original_size = get_file_size(&job.input_path)?;

    let scratch = create_scratch_dir(config)?;
    let manifest = unpack(&job.input_path, scratch.path())?;

    let media_dir = config.media_path(scratch.path());
    if media_dir.exists() && !media_dir.is_dir() {
        return Err(OptimizerError::invalid_structure(format!(
            "{} is not a directory", config.media_dir
        )));
    }
    if !media_dir.exists() {
        if config.require_media_dir {
            return Err(OptimizerError::invalid_structure(format!(
                "Missing {} directory", config.media_dir
            )));
        }
        debug!("No {} directory, nothing to recompress", config.media_dir);
    }

    let entries = scan_candidates(&media_dir)?;
    debug!("Found {} candidate images", entries.len());

    let policy = EncodePolicy::new(job.settings.quality, config.png_compression);
    let images = MediaExecutor::new(policy, &job.cancel).execute_batch(&entries, sink);

    repack(scratch.path(), &job.output_path, &manifest, config.archive_compression_level)?;

    let compressed_size = get_file_size(&job.output_path)
        .map_err(|e| OptimizerError::write(e.to_string()))?;

    if let Err(e) = scratch.close() {
        warn!("Failed to remove scratch tree: {e}");
    }

    Ok(build_report(original_size, compressed_size, &images))
}
