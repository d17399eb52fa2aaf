//! Port interfaces (traits) for external systems
//!
//! These traits define the boundaries between the application
//! and infrastructure layers.

pub mod capture;
pub mod config;
pub mod host;
pub mod worker;

// Re-export common types
pub use capture::{AudioCaptureFactory, AudioProcessCallback, CaptureError, CaptureGraph};
pub use config::ConfigStore;
pub use host::{HostEvent, RecorderError, RecorderHost};
pub use worker::{EncoderWorker, SpawnedWorker, WorkerError, WorkerSpawner};
