use std::collections::HashSet;
use std::path::{Path, PathBuf};
use std::sync::{Arc, Mutex, PoisonError};
use tokio::sync::{OwnedSemaphorePermit, Semaphore};
use tracing::{debug, warn};

use crate::core::{DocumentJob, OptimizerConfig};
use crate::utils::{OptimizerError, OptimizerResult};

use super::job::{JobHandle, JobObserver, ObservedJob, observe, spawn_job};

type ActiveOutputs = Arc<Mutex<HashSet<PathBuf>>>;

/// Runs document jobs with bounded concurrency.
///
/// Each job still gets its own scratch tree; the pool additionally refuses a
/// job whose output path belongs to a job that is queued or running.
#[derive(Clone)]
pub struct WorkerPool {
    config: Arc<OptimizerConfig>,
    semaphore: Arc<Semaphore>,
    active_outputs: ActiveOutputs,
    worker_count: usize,
}

impl WorkerPool {
    pub fn new(config: OptimizerConfig) -> OptimizerResult<Self> {
        config.validate()?;
        let worker_count = config.max_concurrent_jobs;
        debug!("Creating worker pool with {worker_count} slots");

        Ok(Self {
            config: Arc::new(config),
            semaphore: Arc::new(Semaphore::new(worker_count)),
            active_outputs: Arc::new(Mutex::new(HashSet::new())),
            worker_count,
        })
    }

    /// Queues `job`; it starts once a slot is free.
    pub fn submit(&self, job: DocumentJob) -> OptimizerResult<JobHandle> {
        let slot = self.reserve(&job.output_path)?;
        Ok(spawn_job(job, Arc::clone(&self.config), Some(slot)))
    }

    /// Queues `job` and forwards its events to `observer`.
    pub fn submit_with_observer<O: JobObserver>(&self, job: DocumentJob, observer: O) -> OptimizerResult<ObservedJob> {
        let handle = self.submit(job)?;
        Ok(observe(handle, observer))
    }

    /// Jobs queued or running
    pub fn active_jobs(&self) -> usize {
        self.active_outputs.lock().unwrap_or_else(PoisonError::into_inner).len()
    }

    pub fn available_slots(&self) -> usize {
        self.semaphore.available_permits()
    }

    pub fn worker_count(&self) -> usize {
        self.worker_count
    }

    fn reserve(&self, output: &Path) -> OptimizerResult<JobSlot> {
        let key = output_key(output);
        let mut active = self.active_outputs.lock().unwrap_or_else(PoisonError::into_inner);
        if !active.insert(key.clone()) {
            warn!("Rejected job: output {} already in use", output.display());
            return Err(OptimizerError::settings(format!(
                "Output path is already used by another job: {}", output.display()
            )));
        }

        Ok(JobSlot {
            semaphore: Arc::clone(&self.semaphore),
            active_outputs: Arc::clone(&self.active_outputs),
            output: key,
        })
    }
}

fn output_key(output: &Path) -> PathBuf {
    std::path::absolute(output).unwrap_or_else(|_| output.to_path_buf())
}

/// A reserved output path waiting for a semaphore permit.
pub(crate) struct JobSlot {
    semaphore: Arc<Semaphore>,
    active_outputs: ActiveOutputs,
    output: PathBuf,
}

impl JobSlot {
    pub(crate) async fn acquire(self) -> OptimizerResult<SlotGuard> {
        let permit = Arc::clone(&self.semaphore)
            .acquire_owned()
            .await
            .map_err(|e| OptimizerError::pipeline(format!("Failed to acquire worker: {e}")))?;

        Ok(SlotGuard { _permit: permit, _slot: self })
    }
}

impl Drop for JobSlot {
    fn drop(&mut self) {
        self.active_outputs
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .remove(&self.output);
    }
}

/// Held for the lifetime of a running job.
pub(crate) struct SlotGuard {
    _permit: OwnedSemaphorePermit,
    _slot: JobSlot,
}
