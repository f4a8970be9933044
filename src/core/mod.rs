//! Core job types and configuration.
//!
//! This module contains the fundamental types used throughout the crate:
//! - [`DocumentJob`]: One document to recompress, with its [`CancelFlag`]
//! - [`JobSettings`]: Per-job quality
//! - [`Progress`]: Per-image progress events
//! - [`JobOutcome`] and [`CompressionReport`]: Terminal result of a job
//! - [`OptimizerConfig`]: Runtime configuration

mod config;
mod types;
mod task;
mod progress;

pub use config::{OptimizerConfig, PngCompression};
pub use types::{JobSettings, JobOutcome, CompressionReport};
pub use task::{DocumentJob, CancelFlag};
pub use progress::{Progress, ProgressSink, ProgressType, percentage};
