use std::path::{Path, PathBuf};
use crate::utils::{OptimizerError, OptimizerResult};

/// Get file size in bytes
pub fn get_file_size(path: impl AsRef<Path>) -> OptimizerResult<u64> {
    std::fs::metadata(path.as_ref())
        .map(|m| m.len())
        .map_err(|e| OptimizerError::pipeline(format!(
            "Failed to get file size of {}: {e}", path.as_ref().display()
        )))
}

/// Create the parent directory of `path` if it is missing
pub fn ensure_parent_dir(path: impl AsRef<Path>) -> OptimizerResult<()> {
    match path.as_ref().parent() {
        Some(parent) if !parent.as_os_str().is_empty() => std::fs::create_dir_all(parent)
            .map_err(|e| OptimizerError::write(format!(
                "Cannot create output directory {}: {e}", parent.display()
            ))),
        _ => Ok(()),
    }
}

/// File name component for logs and progress labels
pub fn extract_filename(path: &Path) -> &str {
    path.file_name()
        .and_then(|n| n.to_str())
        .unwrap_or("unknown")
}

/// Builds `<output_dir>/<prefix><file name>`.
///
/// When `output_dir` is `None` the input's own directory is used.
pub fn derive_output_path(input: &Path, output_dir: Option<&Path>, prefix: &str) -> PathBuf {
    let file_name = input
        .file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .unwrap_or_default();
    let dir = output_dir
        .map(Path::to_path_buf)
        .or_else(|| input.parent().map(Path::to_path_buf))
        .unwrap_or_default();

    dir.join(format!("{prefix}{file_name}"))
}
