pub mod error;
pub mod validation;
pub mod formats;
pub mod fs;

pub use error::{OptimizerError, OptimizerResult};
pub use validation::{validate_job, validate_quality};
pub use formats::{DocumentFormat, ImageFormat, document_format, image_format};
pub use fs::{
    get_file_size,
    ensure_parent_dir,
    extract_filename,
    derive_output_path,
};
