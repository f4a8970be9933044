use serde::{Deserialize, Serialize};

/// Progress message type
#[derive(Debug, Deserialize, Clone, Copy, Serialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub enum ProgressType {
    /// Image was re-encoded in place
    Processed,
    /// Image failed to decode or encode and kept its bytes
    Skipped,
}

/// One progress event, emitted after each candidate image
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct Progress {
    pub progress_type: ProgressType,
    /// Number of candidates handled so far
    pub completed_tasks: usize,
    /// Number of candidates in the media directory
    pub total_tasks: usize,
    /// Progress percentage (0-100)
    pub progress_percentage: u8,
    /// Label naming the file just handled
    pub status: String,
    pub file_name: String,
}

impl Progress {
    pub fn new(progress_type: ProgressType, completed_tasks: usize, total_tasks: usize, file_name: &str) -> Self {
        let status = match progress_type {
            ProgressType::Processed => format!("Processing image: {file_name}"),
            ProgressType::Skipped => format!("Skipped image: {file_name}"),
        };

        Self {
            progress_type,
            completed_tasks,
            total_tasks,
            progress_percentage: percentage(completed_tasks, total_tasks),
            status,
            file_name: file_name.to_string(),
        }
    }
}

/// Receives progress events as the pipeline emits them
pub trait ProgressSink {
    fn emit(&self, progress: &Progress);
}

impl<F> ProgressSink for F
where
    F: Fn(&Progress),
{
    fn emit(&self, progress: &Progress) {
        self(progress)
    }
}

/// `round(completed / total * 100)`, 0 for an empty batch
pub fn percentage(completed: usize, total: usize) -> u8 {
    if total == 0 {
        return 0;
    }
    let pct = (completed as f64 / total as f64 * 100.0).round();
    pct.clamp(0.0, 100.0) as u8
}
