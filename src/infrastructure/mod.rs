//! Infrastructure layer - Adapter implementations
//!
//! Contains concrete implementations of the port interfaces,
//! integrating with cpal, LAME, child processes and the filesystem.

pub mod capture;
pub mod config;
pub mod host;
pub mod worker;

// Re-export adapters
pub use capture::{list_input_devices, CpalCaptureFactory};
pub use config::XdgConfigStore;
pub use host::ChannelHost;
pub use worker::{serve_stdio, LocalWorkerSpawner};
