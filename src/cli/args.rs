//! CLI argument definitions using Clap

use std::path::PathBuf;

use clap::{Parser, Subcommand};

use crate::domain::recording::{Duration, InputSource};
use crate::domain::worker::WorkerLocation;

/// mp3-recorder - record live audio to MP3
#[derive(Parser, Debug)]
#[command(name = "mp3-recorder")]
#[command(version)]
#[command(about = "Record live audio to MP3 through a background LAME encoding worker")]
#[command(long_about = None)]
pub struct Cli {
    /// Stop recording after this long (e.g., 10s, 1m, 2m30s); default is until Ctrl-C
    #[arg(short = 'd', long, value_name = "TIME")]
    pub duration: Option<String>,

    /// Output MP3 file (default: <output_dir>/recording-<timestamp>.mp3)
    #[arg(short = 'o', long, value_name = "FILE")]
    pub output: Option<PathBuf>,

    /// Input device name ("default" for the system default)
    #[arg(long, value_name = "NAME")]
    pub device: Option<String>,

    /// Encoder worker: "builtin" or a command line speaking the worker protocol
    #[arg(long, env = "MP3_RECORDER_WORKER", value_name = "WORKER")]
    pub worker: Option<String>,

    /// Verbose logging, including per-request worker detail
    #[arg(long)]
    pub debug: bool,

    #[command(subcommand)]
    pub command: Option<Commands>,
}

/// Subcommands
#[derive(Subcommand, Debug)]
pub enum Commands {
    /// List audio input devices
    Devices,
    /// Manage configuration
    Config {
        #[command(subcommand)]
        action: ConfigAction,
    },
    /// Serve the encoder worker protocol on stdin/stdout
    #[command(hide = true)]
    Worker,
}

/// Config action subcommands
#[derive(Subcommand, Debug)]
pub enum ConfigAction {
    /// Create config file with defaults
    Init,
    /// Set a config value
    Set {
        /// Config key
        key: String,
        /// Config value
        value: String,
    },
    /// Get a config value
    Get {
        /// Config key
        key: String,
    },
    /// List all config values
    List,
    /// Show config file path
    Path,
}

/// Parsed record options
#[derive(Debug, Clone)]
pub struct RecordOptions {
    /// `None` records until interrupted
    pub duration: Option<Duration>,
    pub output: PathBuf,
    pub source: InputSource,
    pub worker: WorkerLocation,
    pub drain_timeout: Duration,
    pub debug: bool,
}

/// Valid config keys
pub const VALID_CONFIG_KEYS: &[&str] = &[
    "worker",
    "device",
    "duration",
    "drain_timeout",
    "output_dir",
    "debug",
];

/// Check if a config key is valid
pub fn is_valid_config_key(key: &str) -> bool {
    VALID_CONFIG_KEYS.contains(&key)
}
