//! Fixed-size block assembly for device callbacks
//!
//! Devices deliver interleaved buffers of arbitrary length. The processing
//! node hands out mono blocks of exactly `frames_per_block` frames.

use crate::domain::recording::AudioFrame;

/// Mixes interleaved input down to mono and cuts it into fixed blocks
#[derive(Debug)]
pub struct FrameBlocker {
    frames_per_block: usize,
    channels: usize,
    pending: Vec<f32>,
}

impl FrameBlocker {
    pub fn new(frames_per_block: usize, channels: usize) -> Self {
        let frames_per_block = frames_per_block.max(1);
        Self {
            frames_per_block,
            channels: channels.max(1),
            pending: Vec::with_capacity(frames_per_block),
        }
    }

    /// Frames buffered towards the next block
    pub fn pending_frames(&self) -> usize {
        self.pending.len()
    }

    /// Feed interleaved samples, emitting each completed block in order
    pub fn push_interleaved(&mut self, data: &[f32], mut emit: impl FnMut(AudioFrame)) {
        for frame in data.chunks(self.channels) {
            self.pending.push(frame.iter().sum::<f32>() / frame.len() as f32);

            if self.pending.len() == self.frames_per_block {
                let block = std::mem::replace(
                    &mut self.pending,
                    Vec::with_capacity(self.frames_per_block),
                );
                emit(AudioFrame::new(block));
            }
        }
    }

    /// Take whatever partial block is buffered
    pub fn take_remainder(&mut self) -> Option<AudioFrame> {
        if self.pending.is_empty() {
            None
        } else {
            Some(AudioFrame::new(std::mem::take(&mut self.pending)))
        }
    }
}

/// Convert signed 16-bit PCM to f32 in [-1.0, 1.0)
pub fn i16_to_f32(samples: &[i16]) -> Vec<f32> {
    samples.iter().map(|&s| s as f32 / 32768.0).collect()
}
