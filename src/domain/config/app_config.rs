//! Application configuration value object

use std::path::PathBuf;

use serde::{Deserialize, Serialize};

use crate::domain::recording::{Duration, InputSource};
use crate::domain::worker::{WorkerLocation, BUILTIN_WORKER};

/// Application configuration.
/// All fields are optional to support partial configs and merging.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct AppConfig {
    /// Encoder worker: "builtin" or a command line
    pub worker: Option<String>,
    /// Input device name, "default" for the system default
    pub device: Option<String>,
    /// Stop automatically after this long; unset records until interrupted
    pub duration: Option<String>,
    /// How long to wait for the encoder after stopping
    pub drain_timeout: Option<String>,
    /// Directory for recordings when no output path is given
    pub output_dir: Option<String>,
    /// Verbose worker logging
    pub debug: Option<bool>,
}

impl AppConfig {
    /// Create config with default values
    pub fn defaults() -> Self {
        Self {
            worker: Some(BUILTIN_WORKER.to_string()),
            device: Some("default".to_string()),
            duration: None,
            drain_timeout: Some(Duration::default_drain_timeout().to_string()),
            output_dir: Some(".".to_string()),
            debug: Some(false),
        }
    }

    /// Create an empty config (all None)
    pub fn empty() -> Self {
        Self::default()
    }

    /// Merge this config with another, where other takes precedence.
    /// Only non-None values from other will override this.
    pub fn merge(self, other: Self) -> Self {
        Self {
            worker: other.worker.or(self.worker),
            device: other.device.or(self.device),
            duration: other.duration.or(self.duration),
            drain_timeout: other.drain_timeout.or(self.drain_timeout),
            output_dir: other.output_dir.or(self.output_dir),
            debug: other.debug.or(self.debug),
        }
    }

    /// Get worker location, or builtin if not set/invalid
    pub fn worker_or_default(&self) -> WorkerLocation {
        self.worker
            .as_ref()
            .and_then(|s| s.parse().ok())
            .unwrap_or_default()
    }

    /// Get input source, or the default device if not set
    pub fn input_source(&self) -> InputSource {
        InputSource::from_name(self.device.as_deref())
    }

    /// Get drain timeout as parsed Duration, or default if not set/invalid
    pub fn drain_timeout_or_default(&self) -> Duration {
        self.drain_timeout
            .as_ref()
            .and_then(|s| s.parse().ok())
            .unwrap_or_else(Duration::default_drain_timeout)
    }

    /// Get output directory, or the current directory if not set
    pub fn output_dir_or_default(&self) -> PathBuf {
        self.output_dir
            .as_deref()
            .map(PathBuf::from)
            .unwrap_or_else(|| PathBuf::from("."))
    }

    /// Get debug setting, or false if not set
    pub fn debug_or_default(&self) -> bool {
        self.debug.unwrap_or(false)
    }
}
