//! Host capability port
//!
//! The host owns the engine and receives its outcome events. It also
//! supplies the worker location.

use serde_json::Value;
use thiserror::Error;

use crate::domain::audio::AudioData;
use crate::domain::recording::Duration;
use crate::domain::worker::WorkerLocation;

/// Failures reported to the host's error channel
#[derive(Debug, Clone, PartialEq, Error)]
pub enum RecorderError {
    /// The worker replied `error`; payload kept verbatim
    #[error("Encoder worker error: {0}")]
    Worker(Value),

    /// The worker sent something outside the protocol
    #[error("Unexpected message from encoder worker: {0}")]
    ProtocolViolation(Value),

    #[error("Encoder worker did not finish within {0}")]
    DrainTimeout(Duration),

    #[error("Encoder worker exited before finishing")]
    WorkerExited,
}

/// Events triggered on the host
#[derive(Debug, Clone, PartialEq)]
pub enum HostEvent {
    /// The recording is complete
    Finished(AudioData),
    /// The recording failed
    Error(RecorderError),
}

impl HostEvent {
    /// Event name as seen by the host
    pub const fn name(&self) -> &'static str {
        match self {
            Self::Finished(_) => "finished",
            Self::Error(_) => "error",
        }
    }
}

/// Port implemented by whatever embeds the recording engine
pub trait RecorderHost: Send + Sync + 'static {
    /// Deliver an event. Called from a background task; must not block.
    fn trigger(&self, event: HostEvent);

    /// Where the encoder worker lives
    fn worker_location(&self) -> WorkerLocation;
}
