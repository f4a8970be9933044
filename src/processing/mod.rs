pub mod images;
pub mod package;
mod pipeline;
mod report;

pub use pipeline::{execute, run_job};
pub use report::build_report;
