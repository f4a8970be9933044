//! Asynchronous job surface: submit, observe, cancel.

mod job;
mod pool;

pub use job::{JobEvent, JobHandle, JobObserver, ObservedJob, submit, submit_with_observer};
pub use pool::WorkerPool;
