//! In-process encoder worker running on a dedicated thread

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex as StdMutex, PoisonError};

use tokio::sync::mpsc;
use tracing::debug;

use super::service::EncoderService;
use crate::application::ports::{EncoderWorker, SpawnedWorker, WorkerError};
use crate::domain::worker::{WorkerRequest, BUILTIN_WORKER};

/// Handle to the builtin LAME worker thread
pub struct ThreadWorker {
    requests: StdMutex<Option<mpsc::UnboundedSender<WorkerRequest>>>,
    cancelled: Arc<AtomicBool>,
}

impl ThreadWorker {
    /// Start the encoder thread
    pub fn spawn() -> Result<SpawnedWorker, WorkerError> {
        let (request_tx, mut request_rx) = mpsc::unbounded_channel::<WorkerRequest>();
        let (response_tx, response_rx) = mpsc::unbounded_channel();
        let cancelled = Arc::new(AtomicBool::new(false));
        let thread_cancelled = Arc::clone(&cancelled);

        std::thread::Builder::new()
            .name("lame-encoder".into())
            .spawn(move || {
                let mut service = EncoderService::new();
                while let Some(request) = request_rx.blocking_recv() {
                    if thread_cancelled.load(Ordering::SeqCst) {
                        break;
                    }
                    if let Some(response) = service.handle(request) {
                        if response_tx.send(response).is_err() {
                            break;
                        }
                    }
                }
                debug!("encoder thread exiting");
            })
            .map_err(|e| WorkerError::SpawnFailed {
                location: BUILTIN_WORKER.to_string(),
                reason: e.to_string(),
            })?;

        Ok(SpawnedWorker {
            handle: Box::new(Self {
                requests: StdMutex::new(Some(request_tx)),
                cancelled,
            }),
            messages: response_rx,
        })
    }
}

impl EncoderWorker for ThreadWorker {
    fn post(&self, request: WorkerRequest) -> Result<(), WorkerError> {
        let requests = self.requests.lock().unwrap_or_else(PoisonError::into_inner);
        match requests.as_ref() {
            Some(tx) => tx.send(request).map_err(|_| WorkerError::Terminated),
            None => Err(WorkerError::Terminated),
        }
    }

    fn terminate(&self) {
        self.cancelled.store(true, Ordering::SeqCst);
        // Dropping the sender ends the thread's receive loop
        self.requests
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .take();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::recording::SessionConfig;
    use crate::domain::worker::WorkerResponse;

    #[tokio::test]
    async fn encodes_a_session() {
        let SpawnedWorker {
            handle,
            mut messages,
        } = ThreadWorker::spawn().unwrap();

        handle
            .post(WorkerRequest::Init {
                config: SessionConfig::new(false, 44100),
            })
            .unwrap();
        let block: Vec<f32> = (0..16384).map(|i| f32::sin(i as f32 * 0.05) * 0.3).collect();
        handle.post(WorkerRequest::Encode { buf: block.clone() }).unwrap();
        handle.post(WorkerRequest::Encode { buf: block }).unwrap();
        handle.post(WorkerRequest::Finish).unwrap();

        match messages.recv().await {
            Some(WorkerResponse::End { buf }) => {
                assert!(buf.iter().map(Vec::len).sum::<usize>() > 0)
            }
            other => panic!("expected end, got {:?}", other),
        }
        handle.terminate();
    }

    #[tokio::test]
    async fn terminate_closes_reply_stream() {
        let SpawnedWorker {
            handle,
            mut messages,
        } = ThreadWorker::spawn().unwrap();

        handle.terminate();
        handle.terminate();

        assert!(matches!(
            handle.post(WorkerRequest::Finish),
            Err(WorkerError::Terminated)
        ));
        assert!(messages.recv().await.is_none());
    }
}
