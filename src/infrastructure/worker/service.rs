//! Encoder worker request handling
//!
//! Transport agnostic: the thread worker and the stdio worker both feed
//! requests through an [`EncoderService`] and forward whatever it replies.

use tracing::debug;

use super::lame::LameEncoder;
use crate::domain::worker::{WorkerRequest, WorkerResponse};

enum ServiceState {
    /// Waiting for `init`
    Idle,
    Encoding {
        encoder: LameEncoder,
        chunks: Vec<Vec<u8>>,
        debug: bool,
    },
    /// An error was reported; silent until the next `init`
    Failed,
}

/// Owns the LAME encoder for one worker
pub struct EncoderService {
    state: ServiceState,
}

impl Default for EncoderService {
    fn default() -> Self {
        Self::new()
    }
}

impl EncoderService {
    pub fn new() -> Self {
        Self {
            state: ServiceState::Idle,
        }
    }

    /// Handle one request, returning the reply to post back, if any
    pub fn handle(&mut self, request: WorkerRequest) -> Option<WorkerResponse> {
        match request {
            WorkerRequest::Init { config } => match LameEncoder::new(config.sample_rate) {
                Ok(encoder) => {
                    if config.debug {
                        debug!(sample_rate = config.sample_rate, "encoder initialized");
                    }
                    self.state = ServiceState::Encoding {
                        encoder,
                        chunks: Vec::new(),
                        debug: config.debug,
                    };
                    None
                }
                Err(e) => self.fail(e.to_string()),
            },

            WorkerRequest::Encode { buf } => match &mut self.state {
                ServiceState::Encoding {
                    encoder,
                    chunks,
                    debug,
                } => match encoder.encode(&buf) {
                    Ok(bytes) => {
                        if *debug {
                            debug!(samples = buf.len(), bytes = bytes.len(), "encoded block");
                        }
                        if !bytes.is_empty() {
                            chunks.push(bytes);
                        }
                        None
                    }
                    Err(e) => self.fail(e.to_string()),
                },
                ServiceState::Idle => self.fail("encode received before init"),
                ServiceState::Failed => None,
            },

            WorkerRequest::Finish => {
                match std::mem::replace(&mut self.state, ServiceState::Idle) {
                    ServiceState::Encoding {
                        mut encoder,
                        mut chunks,
                        debug,
                    } => match encoder.flush() {
                        Ok(tail) => {
                            if !tail.is_empty() {
                                chunks.push(tail);
                            }
                            if debug {
                                let total: usize = chunks.iter().map(Vec::len).sum();
                                debug!(chunks = chunks.len(), bytes = total, "encoder flushed");
                            }
                            Some(WorkerResponse::End { buf: chunks })
                        }
                        Err(e) => self.fail(e.to_string()),
                    },
                    ServiceState::Idle => self.fail("finish received before init"),
                    ServiceState::Failed => {
                        self.state = ServiceState::Failed;
                        None
                    }
                }
            }
        }
    }

    fn fail(&mut self, message: impl Into<String>) -> Option<WorkerResponse> {
        self.state = ServiceState::Failed;
        Some(WorkerResponse::error(message))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::recording::SessionConfig;

    fn init(rate: u32) -> WorkerRequest {
        WorkerRequest::Init {
            config: SessionConfig::new(true, rate),
        }
    }

    fn sine_block(len: usize) -> Vec<f32> {
        (0..len).map(|i| f32::sin(i as f32 * 0.06) * 0.4).collect()
    }

    #[test]
    fn full_session_replies_end_with_mp3() {
        let mut service = EncoderService::new();
        assert!(service.handle(init(44100)).is_none());
        for _ in 0..4 {
            assert!(service
                .handle(WorkerRequest::Encode {
                    buf: sine_block(16384)
                })
                .is_none());
        }

        match service.handle(WorkerRequest::Finish) {
            Some(WorkerResponse::End { buf }) => {
                assert!(!buf.is_empty());
                assert!(buf.iter().all(|chunk| !chunk.is_empty()));
            }
            other => panic!("expected end, got {:?}", other),
        }
        assert_eq!(
            service.handle(WorkerRequest::Finish),
            Some(WorkerResponse::error("finish received before init"))
        );
    }

    #[test]
    fn encode_before_init_errors_once() {
        let mut service = EncoderService::new();
        let reply = service.handle(WorkerRequest::Encode { buf: vec![0.0; 8] });
        assert!(matches!(reply, Some(WorkerResponse::Error { .. })));

        assert!(service
            .handle(WorkerRequest::Encode { buf: vec![0.0; 8] })
            .is_none());
        assert!(service.handle(WorkerRequest::Finish).is_none());
    }

    #[test]
    fn finish_before_init_errors() {
        let mut service = EncoderService::new();
        assert_eq!(
            service.handle(WorkerRequest::Finish),
            Some(WorkerResponse::error("finish received before init"))
        );
    }

    #[test]
    fn init_recovers_from_failure() {
        let mut service = EncoderService::new();
        service.handle(WorkerRequest::Finish);

        assert!(service.handle(init(48000)).is_none());
        assert!(matches!(
            service.handle(WorkerRequest::Finish),
            Some(WorkerResponse::End { .. })
        ));
    }
}
