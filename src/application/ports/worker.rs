//! Encoder worker port interfaces

use thiserror::Error;
use tokio::sync::mpsc;

use crate::domain::worker::{WorkerLocation, WorkerRequest, WorkerResponse};

/// Worker errors
#[derive(Debug, Clone, Error)]
pub enum WorkerError {
    #[error("Failed to spawn worker '{location}': {reason}")]
    SpawnFailed { location: String, reason: String },

    #[error("Worker has been terminated")]
    Terminated,
}

/// Handle to a running encoder worker.
///
/// Requests posted through one handle are delivered in order.
pub trait EncoderWorker: Send + Sync {
    /// Queue a request without waiting for the worker
    fn post(&self, request: WorkerRequest) -> Result<(), WorkerError>;

    /// Stop the worker and release its resources. Idempotent.
    fn terminate(&self);
}

/// A freshly spawned worker: its handle and the stream of its replies.
/// The stream ends when the worker goes away.
pub struct SpawnedWorker {
    pub handle: Box<dyn EncoderWorker>,
    pub messages: mpsc::UnboundedReceiver<WorkerResponse>,
}

/// Port for spawning encoder workers
pub trait WorkerSpawner: Send + Sync {
    fn spawn(&self, location: &WorkerLocation) -> Result<SpawnedWorker, WorkerError>;
}
