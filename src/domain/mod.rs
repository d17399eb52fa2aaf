//! Domain layer - Core recording logic
//!
//! Contains value objects, the session state machine, the worker
//! protocol messages and domain errors.
//! This layer has no dependencies on external systems.

pub mod audio;
pub mod config;
pub mod error;
pub mod recording;
pub mod worker;

// Re-export common types
pub use audio::{AudioData, AudioMimeType};
pub use config::AppConfig;
pub use error::*;
pub use recording::{
    AudioFrame, Duration, InputSource, InvalidStateTransition, RecordingSession, SessionConfig,
    SessionState,
};
pub use worker::{WorkerLocation, WorkerRequest, WorkerResponse};
