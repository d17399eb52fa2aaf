//! Application layer - Recording engine and port interfaces
//!
//! Contains the recording lifecycle and the trait definitions
//! for capture, encoder workers, hosts and configuration.

pub mod ports;
pub mod recorder;

// Re-export the engine
pub use recorder::{EngineError, EngineOptions, Mp3RecordingEngine};
