//! DSP Library
//!
//! Per-sample signal processing: the biquad filter plus the simple tone,
//! gain and speed transforms used by the demonstrations.

mod biquad;
mod gain;
mod resample;
mod tone;

pub use biquad::{Biquad, BiquadCoeffs, FilterType, BUTTERWORTH_Q};
pub use gain::{apply_balance, apply_gain, balance_gains, mix};
pub use resample::{change_speed, semitones_to_speed};
pub use tone::{generate_harmonic_tone, generate_tone};
