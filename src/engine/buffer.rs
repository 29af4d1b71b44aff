//! Channel buffers
//!
//! Audio is held as one `Vec<f32>` per channel, normalized to nominal
//! [-1.0, 1.0] but never clamped in memory.

use crate::error::{DspError, Result};

/// One channel of normalized samples for the full duration of a file
pub type AudioBuffer = Vec<f32>;

/// One [`AudioBuffer`] per channel; index 0 is left, index 1 is right
pub type MultiChannelBuffer = Vec<AudioBuffer>;

/// Longest buffer a transform may produce: a full mono data chunk at the
/// widest sample size (32-bit)
pub const MAX_FRAMES: usize = (u32::MAX / 4) as usize;

/// Convert a computed output length to a frame count
///
/// # Errors
/// * `InvalidParameter` - naming `param` if `frames` is not finite or
///   exceeds [`MAX_FRAMES`]
pub(crate) fn checked_frames(frames: f64, param: &str, value: impl ToString) -> Result<usize> {
    if frames.is_finite() && (0.0..=MAX_FRAMES as f64).contains(&frames) {
        Ok(frames as usize)
    } else {
        Err(DspError::invalid_parameter(
            param,
            value,
            &format!("a value giving at most {} output frames", MAX_FRAMES),
        ))
    }
}

/// Number of frames shared by every channel
///
/// # Errors
/// * `ChannelLengthMismatch` - naming the first channel whose length differs
///   from channel 0
pub fn frame_count<C: AsRef<[f32]>>(channels: &[C]) -> Result<usize> {
    let Some(first) = channels.first() else {
        return Ok(0);
    };
    let expected = first.as_ref().len();

    for (channel, data) in channels.iter().enumerate().skip(1) {
        let actual = data.as_ref().len();
        if actual != expected {
            return Err(DspError::ChannelLengthMismatch {
                channel,
                expected,
                actual,
            });
        }
    }

    Ok(expected)
}

/// De-interleave samples from [L,R,L,R,...] to [[L,L,...], [R,R,...]]
pub fn deinterleave(samples: &[f32], channels: usize) -> MultiChannelBuffer {
    if channels == 0 {
        return Vec::new();
    }

    let frames = samples.len() / channels;
    let mut result = vec![Vec::with_capacity(frames); channels];

    for frame in samples.chunks_exact(channels) {
        for (channel, sample) in result.iter_mut().zip(frame) {
            channel.push(*sample);
        }
    }

    result
}

/// Interleave channels from [[L,L,...], [R,R,...]] to [L,R,L,R,...]
///
/// Channels must already have equal length; see [`frame_count`].
pub fn interleave<C: AsRef<[f32]>>(channels: &[C]) -> Vec<f32> {
    let Some(first) = channels.first() else {
        return Vec::new();
    };

    let frames = first.as_ref().len();
    let mut result = Vec::with_capacity(frames * channels.len());

    for frame in 0..frames {
        for channel in channels {
            result.push(channel.as_ref()[frame]);
        }
    }

    result
}
