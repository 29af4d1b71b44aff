//! Tone Generation
//!
//! Sine tones and harmonic stacks for test signals and demonstrations.

use std::f64::consts::PI;

use crate::engine::buffer::checked_frames;
use crate::engine::AudioBuffer;
use crate::error::Result;

/// Generate a sine tone
///
/// # Arguments
/// * `frequency` - Frequency of the sine wave in Hz
/// * `amplitude` - Peak amplitude (0.3 keeps headroom for mixing)
/// * `duration_secs` - Duration of the tone in seconds
/// * `sample_rate` - Sample rate in Hz
///
/// # Errors
/// * `InvalidParameter` - If the duration is too long to fit in a WAV file
pub fn generate_tone(
    frequency: f32,
    amplitude: f32,
    duration_secs: f32,
    sample_rate: u32,
) -> Result<AudioBuffer> {
    generate_harmonic_tone(frequency, &[amplitude], duration_secs, sample_rate)
}

/// Generate a tone from a stack of harmonics
///
/// `amplitudes[k]` is the amplitude of harmonic `k + 1`, so the first entry
/// is the fundamental. Adding harmonics changes the timbre, not the pitch.
/// A negative duration gives an empty buffer.
pub fn generate_harmonic_tone(
    frequency: f32,
    amplitudes: &[f32],
    duration_secs: f32,
    sample_rate: u32,
) -> Result<AudioBuffer> {
    let num_samples = checked_frames(
        duration_secs.max(0.0) as f64 * sample_rate as f64,
        "duration_secs",
        duration_secs,
    )?;
    let angular_freq = 2.0 * PI * frequency as f64 / sample_rate as f64;

    let samples = (0..num_samples)
        .map(|i| {
            amplitudes
                .iter()
                .enumerate()
                .map(|(k, &amp)| amp as f64 * (angular_freq * (k + 1) as f64 * i as f64).sin())
                .sum::<f64>() as f32
        })
        .collect();
    Ok(samples)
}
