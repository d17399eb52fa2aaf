//! Channel-backed host
//!
//! Forwards engine events to an unbounded channel so an async caller can
//! await the session outcome.

use tokio::sync::mpsc;

use crate::application::ports::{HostEvent, RecorderHost};
use crate::domain::worker::WorkerLocation;

/// Host that queues every triggered event on a channel
pub struct ChannelHost {
    events: mpsc::UnboundedSender<HostEvent>,
    worker_location: WorkerLocation,
}

impl ChannelHost {
    /// Create the host and the receiving end of its event channel
    pub fn new(worker_location: WorkerLocation) -> (Self, mpsc::UnboundedReceiver<HostEvent>) {
        let (tx, rx) = mpsc::unbounded_channel();
        (
            Self {
                events: tx,
                worker_location,
            },
            rx,
        )
    }
}

impl RecorderHost for ChannelHost {
    fn trigger(&self, event: HostEvent) {
        tracing::debug!(event = event.name(), "host event");
        // Receiver gone means nobody is waiting anymore
        let _ = self.events.send(event);
    }

    fn worker_location(&self) -> WorkerLocation {
        self.worker_location.clone()
    }
}
