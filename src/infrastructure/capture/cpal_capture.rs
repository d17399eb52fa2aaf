//! Capture graph backed by cpal
//!
//! `cpal::Stream` is not `Send`, so each connected graph owns a dedicated
//! thread that builds, plays and finally drops the stream.

use std::sync::mpsc as std_mpsc;
use std::sync::{Arc, Mutex as StdMutex, PoisonError};
use std::thread::JoinHandle;

use cpal::traits::{DeviceTrait, HostTrait, StreamTrait};
use cpal::{BufferSize, SampleFormat, SampleRate, StreamConfig};
use tracing::{debug, error, warn};

use super::blocker::{i16_to_f32, FrameBlocker};
use crate::application::ports::{
    AudioCaptureFactory, AudioProcessCallback, CaptureError, CaptureGraph,
};
use crate::domain::recording::InputSource;

/// Opens capture graphs on cpal input devices
#[derive(Debug, Default, Clone, Copy)]
pub struct CpalCaptureFactory;

impl CpalCaptureFactory {
    pub fn new() -> Self {
        Self
    }
}

impl AudioCaptureFactory for CpalCaptureFactory {
    fn open(
        &self,
        source: &InputSource,
        frames_per_block: usize,
    ) -> Result<Box<dyn CaptureGraph>, CaptureError> {
        let device = find_device(source)?;
        let supported = device
            .default_input_config()
            .map_err(|e| CaptureError::OpenFailed(e.to_string()))?;

        let sample_format = supported.sample_format();
        if sample_format != SampleFormat::F32 && sample_format != SampleFormat::I16 {
            return Err(CaptureError::OpenFailed(format!(
                "unsupported sample format {:?}",
                sample_format
            )));
        }

        debug!(
            %source,
            sample_rate = supported.sample_rate().0,
            channels = supported.channels(),
            ?sample_format,
            "opened audio input"
        );

        Ok(Box::new(CpalGraph {
            source: source.clone(),
            config: StreamConfig {
                channels: supported.channels(),
                sample_rate: SampleRate(supported.sample_rate().0),
                buffer_size: BufferSize::Default,
            },
            sample_format,
            frames_per_block,
            tap: None,
            running: None,
            closed: false,
        }))
    }
}

/// Names of the available input devices
pub fn list_input_devices() -> Result<Vec<String>, CaptureError> {
    let host = cpal::default_host();
    let devices = host
        .input_devices()
        .map_err(|e| CaptureError::OpenFailed(e.to_string()))?;
    Ok(devices.filter_map(|d| d.name().ok()).collect())
}

fn find_device(source: &InputSource) -> Result<cpal::Device, CaptureError> {
    let host = cpal::default_host();
    match source {
        InputSource::DefaultDevice => host
            .default_input_device()
            .ok_or(CaptureError::NoAudioDevice),
        InputSource::Device(name) => host
            .input_devices()
            .map_err(|e| CaptureError::OpenFailed(e.to_string()))?
            .find(|d| d.name().map(|n| n == *name).unwrap_or(false))
            .ok_or_else(|| CaptureError::DeviceNotFound(name.clone())),
    }
}

/// Processing node state shared with the device callback
struct Tap {
    blocker: FrameBlocker,
    callback: Option<AudioProcessCallback>,
}

impl Tap {
    fn feed(&mut self, data: &[f32]) {
        let Some(callback) = self.callback.as_ref() else {
            return;
        };
        self.blocker.push_interleaved(data, |frame| callback(frame));
    }
}

type SharedTap = Arc<StdMutex<Tap>>;

fn feed(tap: &SharedTap, data: &[f32]) {
    tap.lock().unwrap_or_else(PoisonError::into_inner).feed(data);
}

struct Running {
    stop: std_mpsc::Sender<()>,
    thread: JoinHandle<()>,
}

struct CpalGraph {
    source: InputSource,
    config: StreamConfig,
    sample_format: SampleFormat,
    frames_per_block: usize,
    tap: Option<SharedTap>,
    running: Option<Running>,
    closed: bool,
}

fn build_stream(
    source: &InputSource,
    config: &StreamConfig,
    sample_format: SampleFormat,
    tap: SharedTap,
) -> Result<cpal::Stream, CaptureError> {
    let device = find_device(source)?;
    let on_error = |err: cpal::StreamError| error!("audio stream error: {}", err);

    let stream = match sample_format {
        SampleFormat::F32 => device.build_input_stream(
            config,
            move |data: &[f32], _: &cpal::InputCallbackInfo| feed(&tap, data),
            on_error,
            None,
        ),
        SampleFormat::I16 => device.build_input_stream(
            config,
            move |data: &[i16], _: &cpal::InputCallbackInfo| feed(&tap, &i16_to_f32(data)),
            on_error,
            None,
        ),
        other => {
            return Err(CaptureError::ConnectFailed(format!(
                "unsupported sample format {:?}",
                other
            )))
        }
    };

    stream.map_err(|e| CaptureError::ConnectFailed(e.to_string()))
}

impl CaptureGraph for CpalGraph {
    fn sample_rate(&self) -> u32 {
        self.config.sample_rate.0
    }

    fn connect(&mut self, on_audio_process: AudioProcessCallback) -> Result<(), CaptureError> {
        if self.closed {
            return Err(CaptureError::Closed);
        }
        if self.running.is_some() {
            return Err(CaptureError::ConnectFailed("already connected".into()));
        }

        let tap = Arc::new(StdMutex::new(Tap {
            blocker: FrameBlocker::new(self.frames_per_block, self.config.channels as usize),
            callback: Some(on_audio_process),
        }));

        let (ready_tx, ready_rx) = std_mpsc::sync_channel::<Result<(), CaptureError>>(1);
        let (stop_tx, stop_rx) = std_mpsc::channel::<()>();

        let source = self.source.clone();
        let config = self.config.clone();
        let sample_format = self.sample_format;
        let stream_tap = Arc::clone(&tap);

        let thread = std::thread::Builder::new()
            .name("audio-capture".into())
            .spawn(move || {
                let stream = match build_stream(&source, &config, sample_format, stream_tap) {
                    Ok(stream) => stream,
                    Err(e) => {
                        let _ = ready_tx.send(Err(e));
                        return;
                    }
                };
                if let Err(e) = stream.play() {
                    let _ = ready_tx.send(Err(CaptureError::ConnectFailed(e.to_string())));
                    return;
                }
                let _ = ready_tx.send(Ok(()));

                // Runs until disconnect sends or drops the stop sender
                let _ = stop_rx.recv();
                drop(stream);
            })
            .map_err(|e| CaptureError::ConnectFailed(e.to_string()))?;

        match ready_rx.recv() {
            Ok(Ok(())) => {}
            Ok(Err(e)) => {
                let _ = thread.join();
                return Err(e);
            }
            Err(_) => {
                let _ = thread.join();
                return Err(CaptureError::ConnectFailed(
                    "capture thread exited early".into(),
                ));
            }
        }

        self.tap = Some(tap);
        self.running = Some(Running {
            stop: stop_tx,
            thread,
        });
        Ok(())
    }

    fn disconnect(&mut self) {
        if let Some(running) = self.running.take() {
            let _ = running.stop.send(());
            if running.thread.join().is_err() {
                warn!("audio capture thread panicked");
            }
        }

        // The stream is gone; hand out the trailing partial block and detach
        if let Some(tap) = self.tap.take() {
            let mut tap = tap.lock().unwrap_or_else(PoisonError::into_inner);
            if let Some(callback) = tap.callback.take() {
                if let Some(rest) = tap.blocker.take_remainder() {
                    callback(rest);
                }
            }
        }
    }

    fn close(&mut self) {
        self.disconnect();
        self.closed = true;
    }
}

impl Drop for CpalGraph {
    fn drop(&mut self) {
        self.close();
    }
}
