//! MP3 recording engine
//!
//! Bridges a live capture graph to an encoder worker. Audio blocks are
//! relayed to the worker as `encode` requests while recording; `stop`
//! requests a final flush and the outcome reaches the host asynchronously
//! through [`RecorderHost::trigger`].

use std::sync::{Arc, Mutex as StdMutex, MutexGuard, PoisonError};

use thiserror::Error;
use tokio::sync::{mpsc, oneshot};
use tokio::task::JoinHandle;
use tokio::time::Instant;
use tracing::{debug, info, warn};

use crate::domain::audio::{AudioData, AudioMimeType};
use crate::domain::recording::{
    AudioFrame, Duration, InputSource, InvalidStateTransition, RecordingSession, SessionConfig,
    SessionState, PROCESSOR_BUFFER_SIZE,
};
use crate::domain::worker::{WorkerRequest, WorkerResponse};

use super::ports::{
    AudioCaptureFactory, AudioProcessCallback, CaptureError, CaptureGraph, EncoderWorker,
    HostEvent, RecorderError, RecorderHost, WorkerError, WorkerSpawner,
};

/// Errors returned synchronously by the engine
#[derive(Debug, Error)]
pub enum EngineError {
    #[error("{0}")]
    InvalidState(#[from] InvalidStateTransition),

    #[error("Audio capture failed: {0}")]
    Capture(#[from] CaptureError),

    #[error("Encoder worker failed: {0}")]
    Worker(#[from] WorkerError),

    #[error("Audio input reported an invalid sample rate: {0}")]
    InvalidSampleRate(u32),
}

/// Engine tuning
#[derive(Debug, Clone)]
pub struct EngineOptions {
    /// How long to wait for the worker's reply after `stop`
    pub drain_timeout: Duration,
}

impl Default for EngineOptions {
    fn default() -> Self {
        Self {
            drain_timeout: Duration::default_drain_timeout(),
        }
    }
}

type SharedWorker = Arc<dyn EncoderWorker>;

fn lock<T>(mutex: &StdMutex<T>) -> MutexGuard<'_, T> {
    mutex.lock().unwrap_or_else(PoisonError::into_inner)
}

/// State shared by the engine, the audio callback and the message pump.
///
/// Lock order: `session` before `gate`.
struct SessionShared<H: RecorderHost> {
    host: Arc<H>,
    session: StdMutex<RecordingSession>,
    /// Holds the worker while recording; `encode` is posted only through it
    gate: StdMutex<Option<SharedWorker>>,
    worker: SharedWorker,
    debug: bool,
}

impl<H: RecorderHost> SessionShared<H> {
    fn on_audio_process(&self, frame: AudioFrame) {
        let gate = lock(&self.gate);
        let Some(worker) = gate.as_ref() else {
            return;
        };

        let frames = frame.len();
        if let Err(e) = worker.post(WorkerRequest::Encode {
            buf: frame.into_samples(),
        }) {
            warn!(error = %e, "dropping audio block");
        } else if self.debug {
            debug!(frames, "posted audio block");
        }
    }

    /// Handle one worker reply. Returns true once the session has its outcome.
    fn on_worker_message(&self, message: WorkerResponse) -> bool {
        let mut session = lock(&self.session);
        if session.is_terminal() {
            debug!(?message, "ignoring worker message after session outcome");
            return true;
        }

        let event = match message {
            WorkerResponse::End { buf } => match session.complete() {
                Ok(()) => {
                    let audio = AudioData::from_chunks(buf, AudioMimeType::Mp3);
                    info!(bytes = audio.size_bytes(), "recording finished");
                    HostEvent::Finished(audio)
                }
                Err(e) => {
                    warn!(state = %e.current_state, "worker ended before stop");
                    let _ = session.fail();
                    HostEvent::Error(RecorderError::ProtocolViolation(
                        WorkerResponse::End { buf }.to_value(),
                    ))
                }
            },
            WorkerResponse::Error { error } => {
                warn!(%error, "worker reported an error");
                let _ = session.fail();
                HostEvent::Error(RecorderError::Worker(error))
            }
            WorkerResponse::Unrecognized(raw) => {
                warn!(%raw, "unrecognized worker message");
                let _ = session.fail();
                HostEvent::Error(RecorderError::ProtocolViolation(raw))
            }
        };

        self.release();
        drop(session);
        self.host.trigger(event);
        true
    }

    /// Fail the session unless it already has an outcome
    fn fail_with(&self, error: RecorderError) {
        let mut session = lock(&self.session);
        if session.fail().is_err() {
            return;
        }
        warn!(%error, "recording failed");
        self.release();
        drop(session);
        self.host.trigger(HostEvent::Error(error));
    }

    /// Close the gate and let the worker go
    fn release(&self) {
        lock(&self.gate).take();
        self.worker.terminate();
    }
}

/// Relay worker replies to the session until it has an outcome
async fn pump_messages<H: RecorderHost>(
    shared: Arc<SessionShared<H>>,
    mut messages: mpsc::UnboundedReceiver<WorkerResponse>,
    drain_signal: oneshot::Receiver<()>,
    drain_timeout: Duration,
) {
    let mut drain_signal = Some(drain_signal);
    let mut deadline: Option<Instant> = None;

    loop {
        let next = tokio::select! {
            message = messages.recv() => message,
            armed = wait_for_drain(&mut drain_signal) => {
                drain_signal = None;
                if armed {
                    deadline = Some(Instant::now() + drain_timeout.as_std());
                }
                continue;
            }
            _ = wait_until(deadline) => {
                shared.fail_with(RecorderError::DrainTimeout(drain_timeout));
                return;
            }
        };

        match next {
            Some(message) => {
                if shared.on_worker_message(message) {
                    return;
                }
            }
            None => {
                shared.fail_with(RecorderError::WorkerExited);
                return;
            }
        }
    }
}

async fn wait_for_drain(signal: &mut Option<oneshot::Receiver<()>>) -> bool {
    match signal {
        Some(rx) => rx.await.is_ok(),
        None => std::future::pending().await,
    }
}

async fn wait_until(deadline: Option<Instant>) {
    match deadline {
        Some(deadline) => tokio::time::sleep_until(deadline).await,
        None => std::future::pending().await,
    }
}

struct ActiveSession<H: RecorderHost> {
    config: SessionConfig,
    graph: Box<dyn CaptureGraph>,
    shared: Arc<SessionShared<H>>,
    drain_signal: Option<oneshot::Sender<()>>,
    pump: JoinHandle<()>,
}

/// Records a live input to MP3 through an encoder worker.
///
/// One session at a time: `setup` -> `start` -> `stop`, then exactly one
/// [`HostEvent`] reaches the host. Must be used inside a tokio runtime.
pub struct Mp3RecordingEngine<H, C, W>
where
    H: RecorderHost,
    C: AudioCaptureFactory,
    W: WorkerSpawner,
{
    host: Arc<H>,
    capture: C,
    spawner: W,
    options: EngineOptions,
    active: Option<ActiveSession<H>>,
}

impl<H, C, W> Mp3RecordingEngine<H, C, W>
where
    H: RecorderHost,
    C: AudioCaptureFactory,
    W: WorkerSpawner,
{
    /// Create a new engine with injected capture and worker capabilities
    pub fn new(host: Arc<H>, capture: C, spawner: W, options: EngineOptions) -> Self {
        Self {
            host,
            capture,
            spawner,
            options,
            active: None,
        }
    }

    /// Current session state, `Idle` when no session exists
    pub fn state(&self) -> SessionState {
        self.active
            .as_ref()
            .map(|active| lock(&active.shared.session).state())
            .unwrap_or_default()
    }

    /// Configuration of the current session
    pub fn config(&self) -> Option<SessionConfig> {
        self.active.as_ref().map(|active| active.config)
    }

    /// Open the input, spawn the worker and send it `init`.
    ///
    /// Any previous session is disposed first. `media_type_hint` is
    /// advisory only.
    pub fn setup(
        &mut self,
        source: InputSource,
        media_type_hint: &str,
        debug: bool,
    ) -> Result<(), EngineError> {
        self.dispose();

        let mut graph = self.capture.open(&source, PROCESSOR_BUFFER_SIZE)?;
        let sample_rate = graph.sample_rate();
        if sample_rate == 0 {
            graph.close();
            return Err(EngineError::InvalidSampleRate(sample_rate));
        }
        let config = SessionConfig::new(debug, sample_rate);

        let location = self.host.worker_location();
        let spawned = match self.spawner.spawn(&location) {
            Ok(spawned) => spawned,
            Err(e) => {
                graph.close();
                return Err(e.into());
            }
        };
        let worker: SharedWorker = Arc::from(spawned.handle);

        let mut session = RecordingSession::new();
        session.configure()?;

        let shared = Arc::new(SessionShared {
            host: Arc::clone(&self.host),
            session: StdMutex::new(session),
            gate: StdMutex::new(None),
            worker: Arc::clone(&worker),
            debug,
        });

        if let Err(e) = worker.post(WorkerRequest::Init { config }) {
            worker.terminate();
            graph.close();
            return Err(e.into());
        }

        let (drain_tx, drain_rx) = oneshot::channel();
        let pump = tokio::spawn(pump_messages(
            Arc::clone(&shared),
            spawned.messages,
            drain_rx,
            self.options.drain_timeout,
        ));

        info!(
            %source,
            %location,
            sample_rate,
            debug = shared.debug,
            media_type = media_type_hint,
            "recording session configured"
        );

        self.active = Some(ActiveSession {
            config,
            graph,
            shared,
            drain_signal: Some(drain_tx),
            pump,
        });
        Ok(())
    }

    /// Connect the graph so audio blocks flow to the worker
    pub fn start(&mut self) -> Result<(), EngineError> {
        let active = self
            .active
            .as_mut()
            .ok_or_else(|| not_set_up("start recording"))?;

        // Hold the session across opening the gate so a concurrent outcome
        // cannot be followed by a reopened gate
        let mut session = lock(&active.shared.session);
        session.start()?;
        *lock(&active.shared.gate) = Some(Arc::clone(&active.shared.worker));
        drop(session);

        let shared = Arc::clone(&active.shared);
        let callback: AudioProcessCallback =
            Arc::new(move |frame: AudioFrame| shared.on_audio_process(frame));

        if let Err(e) = active.graph.connect(callback) {
            let _ = lock(&active.shared.session).fail();
            active.shared.release();
            return Err(e.into());
        }

        info!("recording started");
        Ok(())
    }

    /// Disconnect the graph and ask the worker to finish.
    ///
    /// The encoded result arrives later as [`HostEvent::Finished`].
    /// Blocks briefly while the capture graph shuts down its thread.
    pub fn stop(&mut self) -> Result<(), EngineError> {
        let active = self
            .active
            .as_mut()
            .ok_or_else(|| not_set_up("stop recording"))?;

        lock(&active.shared.session).stop()?;

        // The graph may deliver its last block while disconnecting; the gate
        // is still open for it.
        active.graph.disconnect();
        let worker = lock(&active.shared.gate).take();
        active.graph.close();

        let Some(worker) = worker else {
            // The session failed concurrently; its outcome is already out.
            return Ok(());
        };

        if let Err(e) = worker.post(WorkerRequest::Finish) {
            active.shared.fail_with(RecorderError::WorkerExited);
            return Err(e.into());
        }

        if let Some(signal) = active.drain_signal.take() {
            let _ = signal.send(());
        }

        info!("recording stopped, waiting for encoder");
        Ok(())
    }

    /// Release the capture context and the worker of the current session.
    /// Safe to call in any state.
    pub fn dispose(&mut self) {
        if let Some(mut active) = self.active.take() {
            lock(&active.shared.gate).take();
            active.graph.close();
            active.shared.worker.terminate();
            active.pump.abort();
            debug!("recording session disposed");
        }
    }
}

impl<H, C, W> Drop for Mp3RecordingEngine<H, C, W>
where
    H: RecorderHost,
    C: AudioCaptureFactory,
    W: WorkerSpawner,
{
    fn drop(&mut self) {
        self.dispose();
    }
}

fn not_set_up(action: &str) -> EngineError {
    EngineError::InvalidState(InvalidStateTransition {
        current_state: SessionState::Idle,
        action: action.to_string(),
    })
}
