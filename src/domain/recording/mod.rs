//! Recording domain: session lifecycle, configuration and captured frames

mod config;
mod duration;
mod frame;
mod session;

pub use config::{SessionConfig, PROCESSOR_BUFFER_SIZE};
pub use duration::{Duration, DEFAULT_DRAIN_TIMEOUT_SECS};
pub use frame::{AudioFrame, InputSource};
pub use session::{InvalidStateTransition, RecordingSession, SessionState};
