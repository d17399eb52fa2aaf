//! Audio capture port interfaces

use std::sync::Arc;

use thiserror::Error;

use crate::domain::recording::{AudioFrame, InputSource};

/// Capture errors
#[derive(Debug, Clone, Error)]
pub enum CaptureError {
    #[error("No audio device available")]
    NoAudioDevice,

    #[error("Input device not found: {0}")]
    DeviceNotFound(String),

    #[error("Failed to open audio input: {0}")]
    OpenFailed(String),

    #[error("Failed to connect audio graph: {0}")]
    ConnectFailed(String),

    #[error("Audio graph is closed")]
    Closed,
}

/// Callback invoked once per processing block while the graph is connected
pub type AudioProcessCallback = Arc<dyn Fn(AudioFrame) + Send + Sync>;

/// An opened capture context: input source feeding a fixed-size,
/// single-channel processing node.
pub trait CaptureGraph: Send {
    /// Sample rate the context actually runs at
    fn sample_rate(&self) -> u32;

    /// Attach the callback and connect source -> processor -> sink.
    fn connect(&mut self, on_audio_process: AudioProcessCallback) -> Result<(), CaptureError>;

    /// Disconnect the nodes and detach the callback. No callback runs
    /// after this returns.
    fn disconnect(&mut self);

    /// Release the context. Implies `disconnect`.
    fn close(&mut self);
}

/// Port for opening capture contexts
pub trait AudioCaptureFactory: Send + Sync {
    /// Open a context on `source` delivering blocks of `frames_per_block`
    /// mono samples.
    fn open(
        &self,
        source: &InputSource,
        frames_per_block: usize,
    ) -> Result<Box<dyn CaptureGraph>, CaptureError>;
}
