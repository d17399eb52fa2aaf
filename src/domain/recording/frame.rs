//! Captured audio frames and input source selection

use std::fmt;

/// One processing block of single-channel f32 PCM samples.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct AudioFrame {
    samples: Vec<f32>,
}

impl AudioFrame {
    pub fn new(samples: Vec<f32>) -> Self {
        Self { samples }
    }

    /// Samples of the single input channel
    pub fn channel_data(&self) -> &[f32] {
        &self.samples
    }

    pub fn into_samples(self) -> Vec<f32> {
        self.samples
    }

    pub fn len(&self) -> usize {
        self.samples.len()
    }

    pub fn is_empty(&self) -> bool {
        self.samples.is_empty()
    }
}

/// Live audio input to record from
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub enum InputSource {
    /// The host's default input device
    #[default]
    DefaultDevice,
    /// An input device matched by name
    Device(String),
}

impl InputSource {
    /// Build from an optional device name; `None` or "default" selects the default device
    pub fn from_name(name: Option<&str>) -> Self {
        match name.map(str::trim) {
            None | Some("") | Some("default") => Self::DefaultDevice,
            Some(name) => Self::Device(name.to_string()),
        }
    }
}

impl fmt::Display for InputSource {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::DefaultDevice => write!(f, "default input device"),
            Self::Device(name) => write!(f, "input device \"{}\"", name),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn input_source_from_name() {
        assert_eq!(InputSource::from_name(None), InputSource::DefaultDevice);
        assert_eq!(
            InputSource::from_name(Some("default")),
            InputSource::DefaultDevice
        );
        assert_eq!(
            InputSource::from_name(Some("USB Mic")),
            InputSource::Device("USB Mic".to_string())
        );
    }

    #[test]
    fn frame_exposes_channel_data() {
        let frame = AudioFrame::new(vec![0.1, -0.2]);
        assert_eq!(frame.channel_data(), &[0.1, -0.2]);
        assert_eq!(frame.len(), 2);
        assert!(!frame.is_empty());
    }
}
