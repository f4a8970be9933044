use std::path::Path;
use crate::core::{DocumentJob, JobSettings};
use crate::utils::{DocumentFormat, OptimizerError, OptimizerResult, document_format};

/// Validates a document job before any scratch space is allocated
pub fn validate_job(job: &DocumentJob) -> OptimizerResult<DocumentFormat> {
    let format = validate_input_path(&job.input_path)?;
    validate_output_path(&job.output_path)?;
    validate_settings(&job.settings)?;
    Ok(format)
}

/// Validates the input file path and extension
pub fn validate_input_path(path: &Path) -> OptimizerResult<DocumentFormat> {
    if !path.exists() {
        return Err(OptimizerError::NotFound(path.to_path_buf()));
    }

    if !path.is_file() {
        return Err(OptimizerError::unsupported_format(
            format!("Input path is not a file: {}", path.display())
        ));
    }

    document_format(path)
}

/// Validates the output file path
///
/// Missing parent directories are fine, the repackager creates them.
pub fn validate_output_path(path: &Path) -> OptimizerResult<()> {
    if path.as_os_str().is_empty() {
        return Err(OptimizerError::settings("Output path is empty"));
    }

    if path.is_dir() {
        return Err(OptimizerError::settings(
            format!("Output path is a directory: {}", path.display())
        ));
    }

    Ok(())
}

/// Validates job settings
pub fn validate_settings(settings: &JobSettings) -> OptimizerResult<()> {
    validate_quality(settings.quality)
}

pub fn validate_quality(quality: u32) -> OptimizerResult<()> {
    if quality == 0 || quality > 100 {
        return Err(OptimizerError::settings(
            format!("Invalid quality value: {quality}. Must be between 1 and 100")
        ));
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;

    fn job(input: &Path, output: &Path, quality: u32) -> DocumentJob {
        DocumentJob::new(input, output, JobSettings { quality })
    }

    #[test]
    fn missing_input_is_not_found() {
        let tmp = tempfile::tempdir().unwrap();
        let input = tmp.path().join("missing.docx");
        let err = validate_job(&job(&input, &tmp.path().join("out.docx"), 75)).unwrap_err();
        assert!(matches!(err, OptimizerError::NotFound(p) if p == input));
    }

    #[test]
    fn wrong_extension_is_unsupported() {
        let tmp = tempfile::tempdir().unwrap();
        let input = tmp.path().join("slides.pptx");
        fs::write(&input, b"x").unwrap();
        let err = validate_job(&job(&input, &tmp.path().join("out.pptx"), 75)).unwrap_err();
        assert!(matches!(err, OptimizerError::UnsupportedFormat(_)));
    }

    #[test]
    fn directory_input_is_rejected() {
        let tmp = tempfile::tempdir().unwrap();
        let input = tmp.path().join("folder.docx");
        fs::create_dir(&input).unwrap();
        let err = validate_input_path(&input).unwrap_err();
        assert!(matches!(err, OptimizerError::UnsupportedFormat(_)));
    }

    #[test]
    fn quality_bounds() {
        assert!(validate_quality(1).is_ok());
        assert!(validate_quality(100).is_ok());
        assert!(matches!(validate_quality(0), Err(OptimizerError::Settings(_))));
        assert!(matches!(validate_quality(101), Err(OptimizerError::Settings(_))));
    }

    #[test]
    fn uppercase_doc_is_accepted() {
        let tmp = tempfile::tempdir().unwrap();
        let input = tmp.path().join("LEGACY.DOC");
        fs::write(&input, b"not a zip").unwrap();
        let format = validate_job(&job(&input, &tmp.path().join("out.doc"), 50)).unwrap();
        assert_eq!(format, DocumentFormat::Doc);
    }
}
