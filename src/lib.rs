// Module declarations in dependency order
pub mod utils;
pub mod core;
pub mod processing;
pub mod worker;

/// Crate version, reported by the command-line front end
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

// Public exports for external consumers
pub use crate::core::{
    CancelFlag, CompressionReport, DocumentJob, JobOutcome, JobSettings, OptimizerConfig, Progress,
};
pub use crate::processing::run_job;
pub use crate::utils::{OptimizerError, OptimizerResult};
pub use crate::worker::{JobEvent, JobHandle, JobObserver, WorkerPool, submit, submit_with_observer};

// This library file is the public API of the pipeline.
// The command-line entry point is in main.rs.
