//! Speed Change
//!
//! Plays a buffer back faster or slower using linear interpolation. Pitch
//! moves with speed; there is no time-stretching here.

use crate::engine::buffer::checked_frames;
use crate::engine::AudioBuffer;
use crate::error::{DspError, Result};

const SEMITONES_PER_OCTAVE: f32 = 12.0;

/// Speed ratio that shifts pitch by `semitones` (2^(semitones/12))
pub fn semitones_to_speed(semitones: f32) -> f32 {
    2.0f32.powf(semitones / SEMITONES_PER_OCTAVE)
}

/// Resample `source` at `speed` times the original rate
///
/// The output holds `floor(len / speed)` frames. Interpolation stops once the
/// read position reaches the last source sample, so the final output frames
/// may stay silent rather than reading past the end.
///
/// # Errors
/// * `InvalidParameter` - If `speed` is not a positive finite number, or is
///   so small that the output would exceed [`MAX_FRAMES`](crate::engine::buffer::MAX_FRAMES)
pub fn change_speed(source: &[f32], speed: f32) -> Result<AudioBuffer> {
    if !(speed.is_finite() && speed > 0.0) {
        return Err(DspError::invalid_parameter(
            "speed",
            speed,
            "a positive finite ratio",
        ));
    }

    let source_len = source.len();
    let out_len = checked_frames(source_len as f64 / speed as f64, "speed", speed)?;
    let mut output = vec![0.0; out_len];

    let last = source_len.saturating_sub(1) as f64;
    let mut pos = 0.0f64;
    for out in output.iter_mut() {
        if pos >= last {
            break;
        }

        let int_pos = pos.floor() as usize;
        let frac = (pos - int_pos as f64) as f32;

        let prev = source[int_pos];
        let next = source[int_pos + 1];
        *out = (1.0 - frac) * prev + frac * next;

        pos += speed as f64;
    }

    Ok(output)
}
