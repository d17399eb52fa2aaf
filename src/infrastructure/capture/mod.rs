//! Audio capture adapters

mod blocker;
mod cpal_capture;

pub use blocker::{i16_to_f32, FrameBlocker};
pub use cpal_capture::{list_input_devices, CpalCaptureFactory};
