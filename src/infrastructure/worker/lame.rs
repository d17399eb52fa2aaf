//! MP3 encoder built on LAME
//!
//! Settings:
//! - Mono channel
//! - 128 kbps constant bitrate
//! - Best quality

use mp3lame_encoder::{Bitrate, Builder, Encoder, FlushNoGap, MonoPcm, Quality};

/// Minimum output space LAME requires for a flush
const FLUSH_BUFFER_SIZE: usize = 7200;

/// Streaming mono MP3 encoder
pub struct LameEncoder {
    inner: Encoder,
}

impl LameEncoder {
    pub fn new(sample_rate: u32) -> Result<Self, EncodingError> {
        let mut builder = Builder::new().ok_or(EncodingError::Allocation)?;
        builder
            .set_num_channels(1)
            .map_err(|e| EncodingError::Config(format!("{:?}", e)))?;
        builder
            .set_sample_rate(sample_rate)
            .map_err(|e| EncodingError::Config(format!("{:?}", e)))?;
        builder
            .set_brate(Bitrate::Kbps128)
            .map_err(|e| EncodingError::Config(format!("{:?}", e)))?;
        builder
            .set_quality(Quality::Best)
            .map_err(|e| EncodingError::Config(format!("{:?}", e)))?;

        let inner = builder
            .build()
            .map_err(|e| EncodingError::Config(format!("{:?}", e)))?;

        Ok(Self { inner })
    }

    /// Encode one block of f32 samples. May return no bytes while LAME
    /// buffers internally.
    pub fn encode(&mut self, samples: &[f32]) -> Result<Vec<u8>, EncodingError> {
        let pcm = f32_to_i16(samples);
        let mut out = Vec::with_capacity(mp3lame_encoder::max_required_buffer_size(pcm.len()));
        self.inner
            .encode_to_vec(MonoPcm(&pcm), &mut out)
            .map_err(|e| EncodingError::Encode(format!("{:?}", e)))?;
        Ok(out)
    }

    /// Flush buffered frames
    pub fn flush(&mut self) -> Result<Vec<u8>, EncodingError> {
        let mut out = Vec::with_capacity(FLUSH_BUFFER_SIZE);
        self.inner
            .flush_to_vec::<FlushNoGap>(&mut out)
            .map_err(|e| EncodingError::Flush(format!("{:?}", e)))?;
        Ok(out)
    }
}

/// Convert f32 samples in [-1.0, 1.0] to i16, clamping out-of-range input
pub fn f32_to_i16(samples: &[f32]) -> Vec<i16> {
    samples
        .iter()
        .map(|&s| (s.clamp(-1.0, 1.0) * 32767.0) as i16)
        .collect()
}

/// MP3 encoding errors
#[derive(Debug, thiserror::Error)]
pub enum EncodingError {
    #[error("Failed to allocate LAME encoder")]
    Allocation,

    #[error("LAME config error: {0}")]
    Config(String),

    #[error("MP3 encoding failed: {0}")]
    Encode(String),

    #[error("MP3 flush failed: {0}")]
    Flush(String),
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sine(sample_rate: u32, seconds: f32) -> Vec<f32> {
        let n = (sample_rate as f32 * seconds) as usize;
        (0..n)
            .map(|i| {
                let t = i as f32 / sample_rate as f32;
                f32::sin(2.0 * std::f32::consts::PI * 440.0 * t) * 0.5
            })
            .collect()
    }

    #[test]
    fn encodes_sine_to_mp3() {
        let mut encoder = LameEncoder::new(44100).unwrap();
        let mut mp3 = encoder.encode(&sine(44100, 1.0)).unwrap();
        mp3.extend(encoder.flush().unwrap());

        assert!(mp3.len() > 1000);
        // Frame sync: 11 set bits
        let sync = mp3.windows(2).any(|w| w[0] == 0xff && w[1] & 0xe0 == 0xe0);
        assert!(sync);
    }

    #[test]
    fn empty_block_yields_no_bytes() {
        let mut encoder = LameEncoder::new(48000).unwrap();
        assert!(encoder.encode(&[]).unwrap().is_empty());
    }

    #[test]
    fn conversion_clamps() {
        assert_eq!(
            f32_to_i16(&[0.0, 1.0, -1.0, 2.0, -3.0]),
            vec![0, 32767, -32767, 32767, -32767]
        );
    }
}
