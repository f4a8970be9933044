//! Document job definition and cooperative cancellation.

use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};
use serde::{Deserialize, Serialize};
use crate::core::JobSettings;

/// Shared cancel signal.
///
/// The requester sets it, the pipeline only reads it between images.
/// Cloning shares the same flag.
#[derive(Debug, Clone, Default)]
pub struct CancelFlag(Arc<AtomicBool>);

impl CancelFlag {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn cancel(&self) {
        self.0.store(true, Ordering::SeqCst);
    }

    pub fn is_cancelled(&self) -> bool {
        self.0.load(Ordering::SeqCst)
    }
}

/// Represents a single document recompression job.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DocumentJob {
    /// Path to the source Word document
    pub input_path: PathBuf,
    /// Path where the repackaged document will be written
    pub output_path: PathBuf,
    pub settings: JobSettings,
    #[serde(skip)]
    pub cancel: CancelFlag,
}

impl DocumentJob {
    pub fn new(input: impl AsRef<Path>, output: impl AsRef<Path>, settings: JobSettings) -> Self {
        Self {
            input_path: input.as_ref().to_path_buf(),
            output_path: output.as_ref().to_path_buf(),
            settings,
            cancel: CancelFlag::new(),
        }
    }

    pub fn is_cancelled(&self) -> bool {
        self.cancel.is_cancelled()
    }
}
