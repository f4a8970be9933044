//! Running a document job off the caller's task.
//!
//! The pipeline runs on tokio's blocking pool. Events reach the caller over
//! an unbounded channel in emission order: zero or more
//! [`JobEvent::Progress`] followed by exactly one [`JobEvent::Complete`].

use std::sync::Arc;
use std::sync::atomic::{AtomicU64, Ordering};
use serde::Serialize;
use tokio::sync::mpsc::{UnboundedReceiver, UnboundedSender, unbounded_channel};
use tokio::task::JoinHandle;
use tracing::{debug, warn};

use crate::core::{CancelFlag, DocumentJob, JobOutcome, OptimizerConfig, Progress};
use crate::processing::run_job;
use crate::utils::OptimizerError;

use super::pool::JobSlot;

static NEXT_JOB_ID: AtomicU64 = AtomicU64::new(1);

/// Event delivered to the observer of a job.
#[derive(Debug, Clone, Serialize)]
#[serde(tag = "type", content = "payload", rename_all = "camelCase")]
pub enum JobEvent {
    Progress(Progress),
    Complete(JobOutcome),
}

/// Callback-style observer for callers that do not poll a [`JobHandle`].
pub trait JobObserver: Send + Sync + 'static {
    fn on_progress(&self, progress: &Progress);
    fn on_complete(&self, outcome: &JobOutcome);
}

/// Handle to a submitted job.
pub struct JobHandle {
    id: u64,
    cancel: CancelFlag,
    events: UnboundedReceiver<JobEvent>,
    task: JoinHandle<()>,
}

impl JobHandle {
    pub fn id(&self) -> u64 {
        self.id
    }

    /// Requests cooperative cancellation; images already re-encoded stay re-encoded.
    pub fn cancel(&self) {
        debug!("Cancel requested for job {}", self.id);
        self.cancel.cancel();
    }

    /// Next event, `None` once the terminal event has been consumed.
    pub async fn next_event(&mut self) -> Option<JobEvent> {
        self.events.recv().await
    }

    /// Drains progress events and returns the terminal outcome.
    pub async fn wait(self) -> JobOutcome {
        self.wait_with(|_| {}).await
    }

    /// Like [`wait`](Self::wait), handing every progress event to `on_progress`.
    pub async fn wait_with(mut self, mut on_progress: impl FnMut(&Progress)) -> JobOutcome {
        while let Some(event) = self.events.recv().await {
            match event {
                JobEvent::Progress(progress) => on_progress(&progress),
                JobEvent::Complete(outcome) => return outcome,
            }
        }

        // Sender gone without a terminal event: the worker task itself died
        let reason = match (&mut self.task).await {
            Err(e) => format!("Job worker aborted: {e}"),
            Ok(()) => "Job worker exited without a result".to_string(),
        };
        JobOutcome::failed(&OptimizerError::pipeline(reason))
    }
}

/// A job whose events go to a [`JobObserver`].
pub struct ObservedJob {
    id: u64,
    cancel: CancelFlag,
    task: JoinHandle<JobOutcome>,
}

impl ObservedJob {
    pub fn id(&self) -> u64 {
        self.id
    }

    pub fn cancel(&self) {
        self.cancel.cancel();
    }

    /// Waits until the observer has seen the terminal event.
    pub async fn join(self) -> JobOutcome {
        self.task.await.unwrap_or_else(|e| {
            JobOutcome::failed(&OptimizerError::pipeline(format!("Observer task aborted: {e}")))
        })
    }
}

/// Submits `job` for background execution.
///
/// Must be called from within a tokio runtime.
pub fn submit(job: DocumentJob, config: Arc<OptimizerConfig>) -> JobHandle {
    spawn_job(job, config, None)
}

/// Submits `job` and forwards its events to `observer`.
pub fn submit_with_observer<O: JobObserver>(
    job: DocumentJob,
    config: Arc<OptimizerConfig>,
    observer: O,
) -> ObservedJob {
    let handle = submit(job, config);
    observe(handle, observer)
}

pub(crate) fn observe<O: JobObserver>(handle: JobHandle, observer: O) -> ObservedJob {
    let id = handle.id;
    let cancel = handle.cancel.clone();
    let task = tokio::spawn(async move {
        let outcome = handle.wait_with(|progress| observer.on_progress(progress)).await;
        observer.on_complete(&outcome);
        outcome
    });

    ObservedJob { id, cancel, task }
}

pub(crate) fn spawn_job(job: DocumentJob, config: Arc<OptimizerConfig>, slot: Option<JobSlot>) -> JobHandle {
    let id = NEXT_JOB_ID.fetch_add(1, Ordering::Relaxed);
    let cancel = job.cancel.clone();
    let (tx, events) = unbounded_channel();

    let task = tokio::spawn(async move {
        let outcome = run_in_slot(id, job, config, slot, tx.clone()).await;
        if tx.send(JobEvent::Complete(outcome)).is_err() {
            debug!("Job {id} handle dropped before completion");
        }
    });

    JobHandle { id, cancel, events, task }
}

/// Waits for a pool slot when there is one, then runs the pipeline.
///
/// The slot is released before the terminal event is sent, so a caller that
/// saw `Complete` can reuse the output path right away.
async fn run_in_slot(
    id: u64,
    job: DocumentJob,
    config: Arc<OptimizerConfig>,
    slot: Option<JobSlot>,
    tx: UnboundedSender<JobEvent>,
) -> JobOutcome {
    let _guard = match slot {
        Some(slot) => match slot.acquire().await {
            Ok(guard) => Some(guard),
            Err(e) => return JobOutcome::failed(&e),
        },
        None => None,
    };

    debug!("Job {id} started: {}", job.input_path.display());
    let outcome = run_blocking(job, config, tx).await;
    debug!("Job {id} finished: success={}", outcome.success);
    outcome
}

async fn run_blocking(
    job: DocumentJob,
    config: Arc<OptimizerConfig>,
    tx: UnboundedSender<JobEvent>,
) -> JobOutcome {
    let result = tokio::task::spawn_blocking(move || {
        let sink = |progress: &Progress| {
            let _ = tx.send(JobEvent::Progress(progress.clone()));
        };
        run_job(&job, &config, &sink)
    })
    .await;

    result.unwrap_or_else(|e| {
        warn!("Job worker panicked: {e}");
        JobOutcome::failed(&OptimizerError::pipeline(format!("Job worker panicked: {e}")))
    })
}
