//! Encoder worker protocol and location

mod location;
mod message;

pub use location::{WorkerLocation, BUILTIN_WORKER};
pub use message::{WorkerRequest, WorkerResponse};
