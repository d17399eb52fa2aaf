//! Encoder worker adapters

mod lame;
mod process;
mod service;
mod stdio;
mod thread;

pub use lame::{EncodingError, LameEncoder};
pub use process::ProcessWorker;
pub use service::EncoderService;
pub use stdio::{serve, serve_stdio};
pub use thread::ThreadWorker;

use crate::application::ports::{SpawnedWorker, WorkerError, WorkerSpawner};
use crate::domain::worker::WorkerLocation;

/// Spawns workers on this machine: the builtin thread or a child process
#[derive(Debug, Default, Clone, Copy)]
pub struct LocalWorkerSpawner;

impl LocalWorkerSpawner {
    pub fn new() -> Self {
        Self
    }
}

impl WorkerSpawner for LocalWorkerSpawner {
    fn spawn(&self, location: &WorkerLocation) -> Result<SpawnedWorker, WorkerError> {
        match location {
            WorkerLocation::Builtin => ThreadWorker::spawn(),
            WorkerLocation::Command { program, args } => ProcessWorker::spawn(program, args),
        }
    }
}
