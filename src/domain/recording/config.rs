//! Session configuration value object

use serde::{Deserialize, Serialize};

/// Frames per processing block delivered by the capture graph
pub const PROCESSOR_BUFFER_SIZE: usize = 16384;

/// Per-session encoder configuration, sent to the worker with `init`.
///
/// The sample rate always comes from the opened capture context, never
/// from the caller.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SessionConfig {
    pub debug: bool,
    pub sample_rate: u32,
}

impl SessionConfig {
    pub fn new(debug: bool, sample_rate: u32) -> Self {
        Self { debug, sample_rate }
    }
}
