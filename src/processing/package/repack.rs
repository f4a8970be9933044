//! Writes a scratch tree back into a zip container.

use std::fs::{self, File};
use std::io::{self, BufWriter};
use std::path::{Component, Path};
use tracing::debug;
use walkdir::WalkDir;
use zip::CompressionMethod;
use zip::write::{SimpleFileOptions, ZipWriter};

use crate::utils::{OptimizerError, OptimizerResult, ensure_parent_dir};
use super::ContainerManifest;

/// Repackages every file under `scratch` into a new container at `output`.
///
/// Entries are deflated and written in file-name-sorted walk order, so the
/// same tree always yields the same entry sequence. Directories get their own
/// entry when the source container had one or when they are empty.
///
/// The archive is staged next to `output` and only replaces an existing file
/// once it is complete; on error `output` is left as it was.
/// Returns the number of entries written.
pub fn repack(
    scratch: &Path,
    output: &Path,
    manifest: &ContainerManifest,
    compression_level: Option<i64>,
) -> OptimizerResult<usize> {
    ensure_parent_dir(output)?;

    let dir = match output.parent() {
        Some(parent) if !parent.as_os_str().is_empty() => parent,
        _ => Path::new("."),
    };
    let staged = tempfile::Builder::new()
        .prefix(".doc-optimizer-")
        .suffix(".tmp")
        .tempfile_in(dir)
        .map_err(|e| OptimizerError::write(format!("Cannot create {}: {e}", output.display())))?;
    let mut zip = ZipWriter::new(BufWriter::new(staged));
    let options = SimpleFileOptions::default()
        .compression_method(CompressionMethod::Deflated)
        .compression_level(compression_level);

    let mut written = 0;
    for entry in WalkDir::new(scratch).min_depth(1).sort_by_file_name() {
        let entry = entry.map_err(|e| OptimizerError::pipeline(format!("Cannot walk scratch tree: {e}")))?;
        let relative = entry.path().strip_prefix(scratch).map_err(|e| {
            OptimizerError::pipeline(format!("Entry outside scratch tree {}: {e}", entry.path().display()))
        })?;
        let name = archive_name(relative)?;

        if entry.file_type().is_dir() {
            if manifest.directories.contains(&name) || is_empty_dir(entry.path())? {
                zip.add_directory(name.as_str(), options).map_err(|e| OptimizerError::write(
                    format!("Cannot add directory {name}: {e}")
                ))?;
                written += 1;
            }
            continue;
        }

        if !entry.file_type().is_file() {
            continue;
        }

        zip.start_file(name.as_str(), options).map_err(|e| OptimizerError::write(
            format!("Cannot add entry {name}: {e}")
        ))?;
        let mut source = File::open(entry.path())?;
        io::copy(&mut source, &mut zip).map_err(|e| OptimizerError::write(
            format!("Cannot write entry {name}: {e}")
        ))?;
        written += 1;
    }

    let staged = zip
        .finish()
        .map_err(|e| OptimizerError::write(format!("Cannot finalize {}: {e}", output.display())))?
        .into_inner()
        .map_err(|e| OptimizerError::write(format!("Cannot flush {}: {e}", output.display())))?;

    let permissions = fs::metadata(output).ok().map(|m| m.permissions());
    staged.persist(output).map_err(|e| OptimizerError::write(
        format!("Cannot replace {}: {}", output.display(), e.error)
    ))?;
    if let Some(permissions) = permissions {
        fs::set_permissions(output, permissions).map_err(|e| OptimizerError::write(
            format!("Cannot restore permissions of {}: {e}", output.display())
        ))?;
    }

    if !output.exists() {
        return Err(OptimizerError::write(format!("Output file was not created: {}", output.display())));
    }

    debug!("Repackaged {written} entries into {}", output.display());
    Ok(written)
}

/// Zip entry name for a path relative to the scratch root: `/`-separated
fn archive_name(relative: &Path) -> OptimizerResult<String> {
    let mut parts = Vec::new();
    for component in relative.components() {
        match component {
            Component::Normal(part) => parts.push(part.to_str().ok_or_else(|| {
                OptimizerError::pipeline(format!("Non UTF-8 path in scratch tree: {}", relative.display()))
            })?),
            other => return Err(OptimizerError::pipeline(format!(
                "Unexpected path component {other:?} in {}", relative.display()
            ))),
        }
    }
    Ok(parts.join("/"))
}

fn is_empty_dir(path: &Path) -> OptimizerResult<bool> {
    Ok(fs::read_dir(path)?.next().is_none())
}
