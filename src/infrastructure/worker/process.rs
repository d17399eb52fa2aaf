//! Encoder worker in a child process
//!
//! The child speaks the worker protocol as JSON lines: requests on its
//! stdin, replies on its stdout. Its stderr is inherited.

use std::process::Stdio;
use std::sync::{Mutex as StdMutex, PoisonError};

use tokio::io::{AsyncBufReadExt, AsyncWriteExt, BufReader};
use tokio::process::{Child, ChildStdin, ChildStdout, Command};
use tokio::sync::{mpsc, oneshot};
use tracing::{debug, warn};

use crate::application::ports::{EncoderWorker, SpawnedWorker, WorkerError};
use crate::domain::worker::{WorkerRequest, WorkerResponse};

/// Handle to a worker child process
pub struct ProcessWorker {
    requests: StdMutex<Option<mpsc::UnboundedSender<WorkerRequest>>>,
    kill: StdMutex<Option<oneshot::Sender<()>>>,
}

impl ProcessWorker {
    /// Spawn `program args...` and wire its stdio to the protocol channels.
    ///
    /// Must be called within a tokio runtime.
    pub fn spawn(program: &str, args: &[String]) -> Result<SpawnedWorker, WorkerError> {
        let location = std::iter::once(program)
            .chain(args.iter().map(String::as_str))
            .collect::<Vec<_>>()
            .join(" ");
        let spawn_failed = |reason: String| WorkerError::SpawnFailed {
            location: location.clone(),
            reason,
        };

        let mut child = Command::new(program)
            .args(args)
            .stdin(Stdio::piped())
            .stdout(Stdio::piped())
            .stderr(Stdio::inherit())
            .kill_on_drop(true)
            .spawn()
            .map_err(|e| spawn_failed(e.to_string()))?;

        let stdin = child
            .stdin
            .take()
            .ok_or_else(|| spawn_failed("stdin not captured".into()))?;
        let stdout = child
            .stdout
            .take()
            .ok_or_else(|| spawn_failed("stdout not captured".into()))?;

        debug!(worker = %location, pid = ?child.id(), "worker process started");

        let (request_tx, request_rx) = mpsc::unbounded_channel();
        let (response_tx, response_rx) = mpsc::unbounded_channel();
        let (kill_tx, kill_rx) = oneshot::channel();

        tokio::spawn(write_requests(stdin, request_rx));
        tokio::spawn(read_responses(stdout, response_tx));
        tokio::spawn(supervise(child, kill_rx));

        Ok(SpawnedWorker {
            handle: Box::new(Self {
                requests: StdMutex::new(Some(request_tx)),
                kill: StdMutex::new(Some(kill_tx)),
            }),
            messages: response_rx,
        })
    }
}

async fn write_requests(
    mut stdin: ChildStdin,
    mut requests: mpsc::UnboundedReceiver<WorkerRequest>,
) {
    while let Some(request) = requests.recv().await {
        let mut line = match serde_json::to_string(&request) {
            Ok(line) => line,
            Err(e) => {
                warn!("failed to serialize {} request: {}", request.command(), e);
                break;
            }
        };
        line.push('\n');

        if let Err(e) = stdin.write_all(line.as_bytes()).await {
            warn!("failed to write to worker: {}", e);
            break;
        }
    }
    // Dropping stdin signals EOF to the worker
}

async fn read_responses(stdout: ChildStdout, responses: mpsc::UnboundedSender<WorkerResponse>) {
    let mut lines = BufReader::new(stdout).lines();
    loop {
        match lines.next_line().await {
            Ok(Some(line)) => {
                if line.trim().is_empty() {
                    continue;
                }
                if responses.send(WorkerResponse::from_line(&line)).is_err() {
                    break;
                }
            }
            Ok(None) => break,
            Err(e) => {
                warn!("failed to read from worker: {}", e);
                break;
            }
        }
    }
}

async fn supervise(mut child: Child, kill: oneshot::Receiver<()>) {
    tokio::select! {
        status = child.wait() => match status {
            Ok(status) => debug!(%status, "worker process exited"),
            Err(e) => warn!("failed to wait for worker: {}", e),
        },
        _ = kill => {
            if let Err(e) = child.kill().await {
                warn!("failed to kill worker: {}", e);
            }
        }
    }
}

impl EncoderWorker for ProcessWorker {
    fn post(&self, request: WorkerRequest) -> Result<(), WorkerError> {
        let requests = self.requests.lock().unwrap_or_else(PoisonError::into_inner);
        match requests.as_ref() {
            Some(tx) => tx.send(request).map_err(|_| WorkerError::Terminated),
            None => Err(WorkerError::Terminated),
        }
    }

    fn terminate(&self) {
        self.requests
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .take();
        if let Some(kill) = self
            .kill
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .take()
        {
            let _ = kill.send(());
        }
    }
}
