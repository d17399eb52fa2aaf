//! Command runners: record, devices, worker

use std::path::{Path, PathBuf};
use std::process::ExitCode;
use std::sync::Arc;
use std::time::{Duration as StdDuration, Instant, SystemTime, UNIX_EPOCH};

use tokio::sync::mpsc;
use tracing::{debug, info};

use crate::application::ports::{ConfigStore, HostEvent};
use crate::application::{EngineOptions, Mp3RecordingEngine};
use crate::domain::audio::AudioData;
use crate::domain::config::AppConfig;
use crate::infrastructure::{
    list_input_devices, serve_stdio, ChannelHost, CpalCaptureFactory, LocalWorkerSpawner,
    XdgConfigStore,
};

use super::args::RecordOptions;
use super::presenter::Presenter;
use super::signals::ShutdownSignal;

/// Exit codes
pub const EXIT_SUCCESS: u8 = 0;
pub const EXIT_ERROR: u8 = 1;
pub const EXIT_USAGE_ERROR: u8 = 2;

/// Media type hint handed to the engine
const MEDIA_TYPE_HINT: &str = "audio";

const PROGRESS_TICK: StdDuration = StdDuration::from_millis(100);

/// Record from the input device until the duration elapses or Ctrl-C
pub async fn run_record(options: RecordOptions) -> ExitCode {
    let mut presenter = Presenter::new();

    let shutdown = ShutdownSignal::new();
    shutdown.setup();

    let (host, mut events) = ChannelHost::new(options.worker.clone());
    let mut engine = Mp3RecordingEngine::new(
        Arc::new(host),
        CpalCaptureFactory::new(),
        LocalWorkerSpawner::new(),
        EngineOptions {
            drain_timeout: options.drain_timeout,
        },
    );

    if let Err(e) = engine.setup(options.source.clone(), MEDIA_TYPE_HINT, options.debug) {
        presenter.error(&e.to_string());
        return ExitCode::from(EXIT_ERROR);
    }
    if let Err(e) = engine.start() {
        presenter.error(&e.to_string());
        return ExitCode::from(EXIT_ERROR);
    }

    presenter.start_spinner("Recording...");
    let early = wait_for_stop(&presenter, &shutdown, &mut events, &options).await;

    let event = match early {
        Some(event) => Some(event),
        None => {
            // stop joins the capture thread
            if let Err(e) = tokio::task::block_in_place(|| engine.stop()) {
                presenter.spinner_fail(&e.to_string());
                return ExitCode::from(EXIT_ERROR);
            }
            presenter.update_spinner("Encoding...");
            events.recv().await
        }
    };
    tokio::task::block_in_place(|| engine.dispose());

    match event {
        Some(HostEvent::Finished(audio)) => match save_recording(&options.output, &audio).await {
            Ok(()) => {
                presenter.spinner_success(&format!(
                    "Recording saved ({})",
                    audio.human_readable_size()
                ));
                presenter.output(&options.output.to_string_lossy());
                ExitCode::from(EXIT_SUCCESS)
            }
            Err(e) => {
                presenter.spinner_fail(&format!(
                    "Failed to write {}: {}",
                    options.output.display(),
                    e
                ));
                ExitCode::from(EXIT_ERROR)
            }
        },
        Some(HostEvent::Error(e)) => {
            presenter.spinner_fail(&e.to_string());
            ExitCode::from(EXIT_ERROR)
        }
        None => {
            presenter.spinner_fail("Recording ended without a result");
            ExitCode::from(EXIT_ERROR)
        }
    }
}

/// Wait for Ctrl-C, the duration limit, or an early engine event
async fn wait_for_stop(
    presenter: &Presenter,
    shutdown: &ShutdownSignal,
    events: &mut mpsc::UnboundedReceiver<HostEvent>,
    options: &RecordOptions,
) -> Option<HostEvent> {
    let started = Instant::now();
    let total_ms = options.duration.map(|d| d.as_millis());
    let mut ticker = tokio::time::interval(PROGRESS_TICK);

    loop {
        tokio::select! {
            _ = shutdown.wait() => {
                info!("interrupted, stopping");
                return None;
            }
            event = events.recv() => {
                debug!(event = event.as_ref().map(HostEvent::name), "event while recording");
                return event;
            }
            _ = ticker.tick() => {
                let elapsed_ms = started.elapsed().as_millis() as u64;
                if total_ms.is_some_and(|total| elapsed_ms >= total) {
                    return None;
                }
                presenter.update_recording_progress(elapsed_ms, total_ms);
            }
        }
    }
}

async fn save_recording(path: &Path, audio: &AudioData) -> std::io::Result<()> {
    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        tokio::fs::create_dir_all(parent).await?;
    }
    tokio::fs::write(path, audio.data()).await
}

/// Default output path: `<dir>/recording-<unix seconds>.mp3`
pub fn default_output_path(dir: &Path) -> PathBuf {
    let secs = SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map(|d| d.as_secs())
        .unwrap_or(0);
    dir.join(format!("recording-{}.mp3", secs))
}

/// List input devices on stdout
pub fn run_devices(presenter: &Presenter) -> ExitCode {
    match list_input_devices() {
        Ok(devices) if devices.is_empty() => {
            presenter.warn("No audio input devices found");
            ExitCode::from(EXIT_SUCCESS)
        }
        Ok(devices) => {
            for name in devices {
                presenter.device(&name);
            }
            ExitCode::from(EXIT_SUCCESS)
        }
        Err(e) => {
            presenter.error(&e.to_string());
            ExitCode::from(EXIT_ERROR)
        }
    }
}

/// Serve the encoder worker protocol on stdio until stdin closes
pub async fn run_worker() -> ExitCode {
    match serve_stdio().await {
        Ok(()) => ExitCode::from(EXIT_SUCCESS),
        Err(e) => {
            tracing::error!("worker I/O failed: {}", e);
            ExitCode::from(EXIT_ERROR)
        }
    }
}

/// Load and merge configuration from file and CLI
pub async fn load_merged_config(cli_config: AppConfig) -> AppConfig {
    let store = XdgConfigStore::new();
    let file_config = store.load().await.unwrap_or_else(|_| AppConfig::empty());

    // Merge: defaults < file < cli (clap folds MP3_RECORDER_WORKER into the cli layer)
    AppConfig::defaults().merge(file_config).merge(cli_config)
}
