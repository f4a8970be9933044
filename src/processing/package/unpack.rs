//! Extracts a Word container into a scratch tree.

use std::collections::BTreeSet;
use std::fs::{self, File};
use std::io::{self, BufReader};
use std::path::Path;
use tempfile::TempDir;
use tracing::debug;
use zip::ZipArchive;

use crate::core::OptimizerConfig;
use crate::utils::{OptimizerError, OptimizerResult};

/// What the unpacker learned about the source container.
#[derive(Debug, Clone, Default)]
pub struct ContainerManifest {
    /// Every entry name in archive order
    pub entries: Vec<String>,
    /// Explicit directory entries, without the trailing `/`
    pub directories: BTreeSet<String>,
}

impl ContainerManifest {
    pub fn file_count(&self) -> usize {
        self.entries.len() - self.directories.len()
    }
}

/// Allocates a fresh scratch directory for one job.
///
/// The directory and everything in it is removed when the returned guard drops.
pub fn create_scratch_dir(config: &OptimizerConfig) -> OptimizerResult<TempDir> {
    let mut builder = tempfile::Builder::new();
    builder.prefix("doc-optimizer-");

    let dir = match &config.scratch_root {
        Some(root) => {
            fs::create_dir_all(root).map_err(|e| OptimizerError::pipeline(
                format!("Cannot create scratch root {}: {e}", root.display())
            ))?;
            builder.tempdir_in(root)
        }
        None => builder.tempdir(),
    }
    .map_err(|e| OptimizerError::pipeline(format!("Cannot allocate scratch directory: {e}")))?;

    debug!("Allocated scratch tree at {}", dir.path().display());
    Ok(dir)
}

/// Extracts every entry of the zip container at `input` under `scratch`.
///
/// Entry paths are recreated exactly, explicit directory entries included.
/// Entries whose names escape the scratch root are rejected as corrupt.
pub fn unpack(input: &Path, scratch: &Path) -> OptimizerResult<ContainerManifest> {
    let file = File::open(input).map_err(|e| OptimizerError::corrupt_archive(
        format!("Cannot open {}: {e}", input.display())
    ))?;
    let mut archive = ZipArchive::new(BufReader::new(file)).map_err(|e| {
        OptimizerError::corrupt_archive(format!("{} is not a valid zip container: {e}", input.display()))
    })?;

    let mut manifest = ContainerManifest::default();

    for i in 0..archive.len() {
        let mut entry = archive.by_index(i).map_err(|e| OptimizerError::corrupt_archive(
            format!("Cannot read entry #{i}: {e}")
        ))?;
        let name = entry.name().to_string();

        let Some(relative) = entry.enclosed_name() else {
            return Err(OptimizerError::corrupt_archive(format!("Unsafe entry path: {name}")));
        };
        let target = scratch.join(relative);

        if entry.is_dir() {
            fs::create_dir_all(&target)?;
            manifest.directories.insert(name.trim_end_matches('/').to_string());
            manifest.entries.push(name);
            continue;
        }

        if let Some(parent) = target.parent() {
            fs::create_dir_all(parent)?;
        }

        let mut out = File::create(&target)?;
        io::copy(&mut entry, &mut out).map_err(|e| OptimizerError::corrupt_archive(
            format!("Cannot read entry {name}: {e}")
        ))?;
        manifest.entries.push(name);
    }

    debug!(
        "Unpacked {} entries ({} directories) from {}",
        manifest.entries.len(),
        manifest.directories.len(),
        input.display()
    );
    Ok(manifest)
}
