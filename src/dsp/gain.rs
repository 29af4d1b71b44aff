//! Gain, Mix and Balance
//!
//! Per-sample level adjustments. None of these clamp; headroom is the
//! caller's problem and the WAV writer clamps on output.

use crate::engine::buffer::{checked_frames, frame_count};
use crate::engine::{AudioBuffer, MultiChannelBuffer};
use crate::error::{DspError, Result};

const LEFT: usize = 0;
const RIGHT: usize = 1;

/// Scale every sample by a linear gain
pub fn apply_gain(samples: &[f32], gain: f32) -> AudioBuffer {
    samples.iter().map(|&x| gain * x).collect()
}

/// Sum sources sample by sample
///
/// # Arguments
/// * `sources` - Mono buffers to add together
/// * `num_frames` - Output length; defaults to the longest source. Sources
///   shorter than the output contribute silence past their end.
///
/// # Errors
/// * `InvalidParameter` - If `num_frames` exceeds [`MAX_FRAMES`](crate::engine::buffer::MAX_FRAMES)
pub fn mix<C: AsRef<[f32]>>(sources: &[C], num_frames: Option<usize>) -> Result<AudioBuffer> {
    let num_frames = match num_frames {
        Some(n) => checked_frames(n as f64, "num_frames", n)?,
        None => sources
            .iter()
            .map(|s| s.as_ref().len())
            .max()
            .unwrap_or(0),
    };

    let mut output = vec![0.0; num_frames];
    for source in sources {
        for (out, &x) in output.iter_mut().zip(source.as_ref()) {
            *out += x;
        }
    }
    Ok(output)
}

/// Left/right gains for a balance position
///
/// `balance` runs from -1.0 (full left) through 0.0 (centre) to +1.0 (full
/// right). The favoured side stays at unity; the other side is attenuated.
pub fn balance_gains(balance: f32) -> (f32, f32) {
    let gain_left = if balance < 0.0 { 1.0 } else { 1.0 - balance };
    let gain_right = if balance > 0.0 { 1.0 } else { 1.0 + balance };
    (gain_left, gain_right)
}

/// Apply a balance position to a stereo buffer
///
/// # Errors
/// * `ChannelCountMismatch` - If the input is not exactly two channels
/// * `InvalidParameter` - If `balance` is outside [-1.0, 1.0]
/// * `ChannelLengthMismatch` - If left and right differ in length
pub fn apply_balance(channels: &[AudioBuffer], balance: f32) -> Result<MultiChannelBuffer> {
    if channels.len() != 2 {
        return Err(DspError::ChannelCountMismatch {
            expected: 2,
            actual: channels.len(),
        });
    }
    if !(-1.0..=1.0).contains(&balance) {
        return Err(DspError::invalid_parameter("balance", balance, "-1.0 to 1.0"));
    }
    frame_count(channels)?;

    let (gain_left, gain_right) = balance_gains(balance);
    Ok(vec![
        apply_gain(&channels[LEFT], gain_left),
        apply_gain(&channels[RIGHT], gain_right),
    ])
}
