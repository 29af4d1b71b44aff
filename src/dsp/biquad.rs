//! Biquad Filter
//!
//! Second-order IIR low-pass and high-pass filtering, one sample at a time.
//! Coefficients follow the Audio EQ Cookbook with Q = 1/sqrt(2).

use std::f64::consts::{FRAC_1_SQRT_2, PI};

use crate::error::{DspError, Result};

/// Quality factor for the Butterworth-like response
pub const BUTTERWORTH_Q: f64 = FRAC_1_SQRT_2;

/// Filter response type
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FilterType {
    /// Remove above the cutoff
    LowPass,
    /// Remove below the cutoff
    HighPass,
}

/// Biquad filter coefficients
/// Transfer function: H(z) = (b0 + b1*z^-1 + b2*z^-2) / (1 + a1*z^-1 + a2*z^-2)
/// Normalized: all coefficients divided by a0
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct BiquadCoeffs {
    pub b0: f64,
    pub b1: f64,
    pub b2: f64,
    pub a1: f64,
    pub a2: f64,
}

impl BiquadCoeffs {
    /// Calculate biquad coefficients using Audio EQ Cookbook formulas
    /// Reference: https://www.w3.org/2011/audio/audio-eq-cookbook.html
    ///
    /// The caller is responsible for keeping `cutoff_hz` inside (0, Nyquist).
    pub fn design(filter_type: FilterType, sample_rate: f64, cutoff_hz: f64, q: f64) -> Self {
        let w0 = 2.0 * PI * cutoff_hz / sample_rate;
        let cos_w0 = w0.cos();
        let alpha = w0.sin() / (2.0 * q);

        let (b0, b1, b2) = match filter_type {
            FilterType::LowPass => ((1.0 - cos_w0) / 2.0, 1.0 - cos_w0, (1.0 - cos_w0) / 2.0),
            FilterType::HighPass => ((1.0 + cos_w0) / 2.0, -(1.0 + cos_w0), (1.0 + cos_w0) / 2.0),
        };
        let a0 = 1.0 + alpha;
        let a1 = -2.0 * cos_w0;
        let a2 = 1.0 - alpha;

        BiquadCoeffs {
            b0: b0 / a0,
            b1: b1 / a0,
            b2: b2 / a0,
            a1: a1 / a0,
            a2: a2 / a0,
        }
    }
}

/// Delay lines: two previous inputs and two previous outputs
#[derive(Debug, Clone, Copy, Default)]
struct BiquadHistory {
    x1: f64, // x[n-1]
    x2: f64, // x[n-2]
    y1: f64, // y[n-1]
    y2: f64, // y[n-2]
}

impl BiquadHistory {
    /// Direct Form I
    fn process(&mut self, input: f64, coeffs: &BiquadCoeffs) -> f64 {
        let output = coeffs.b0 * input + coeffs.b1 * self.x1 + coeffs.b2 * self.x2
            - coeffs.a1 * self.y1
            - coeffs.a2 * self.y2;

        self.x2 = self.x1;
        self.x1 = input;
        self.y2 = self.y1;
        self.y1 = output;

        output
    }
}

#[derive(Debug, Clone, Copy)]
enum FilterState {
    Uninitialized,
    Configured {
        filter_type: FilterType,
        cutoff_hz: f64,
        coeffs: BiquadCoeffs,
    },
}

/// Stateful second-order filter
///
/// Starts without coefficients; [`Biquad::tick`] fails with
/// `FilterNotConfigured` until [`Biquad::init_lpf`] or [`Biquad::init_hpf`]
/// has succeeded. Not shared between threads: each instance has a single
/// owner driving it.
///
/// # Example
/// ```
/// use dsp_basics::dsp::Biquad;
///
/// let mut filter = Biquad::new(44100.0).unwrap();
/// filter.init_lpf(400.0).unwrap();
/// let y = filter.tick(1.0).unwrap();
/// assert!(y > 0.0 && y < 1.0);
/// ```
#[derive(Debug, Clone)]
pub struct Biquad {
    sample_rate: f64,
    state: FilterState,
    history: BiquadHistory,
}

impl Biquad {
    /// Create an unconfigured filter for the given sample rate
    ///
    /// # Errors
    /// * `InvalidSampleRate` - If `sample_rate` is not a positive finite number
    pub fn new(sample_rate: f64) -> Result<Self> {
        if !(sample_rate.is_finite() && sample_rate > 0.0) {
            return Err(DspError::InvalidSampleRate { sample_rate });
        }

        Ok(Self {
            sample_rate,
            state: FilterState::Uninitialized,
            history: BiquadHistory::default(),
        })
    }

    /// Configure as a low-pass filter
    pub fn init_lpf(&mut self, cutoff_hz: f64) -> Result<()> {
        self.configure(FilterType::LowPass, cutoff_hz)
    }

    /// Configure as a high-pass filter
    pub fn init_hpf(&mut self, cutoff_hz: f64) -> Result<()> {
        self.configure(FilterType::HighPass, cutoff_hz)
    }

    /// Compute coefficients for `filter_type` at `cutoff_hz` and clear history
    ///
    /// A rejected cutoff leaves the previous configuration and history intact.
    ///
    /// # Errors
    /// * `InvalidCutoff` - If `cutoff_hz` is not strictly between 0 and Nyquist
    pub fn configure(&mut self, filter_type: FilterType, cutoff_hz: f64) -> Result<()> {
        let nyquist_hz = self.nyquist();
        if !(cutoff_hz > 0.0 && cutoff_hz < nyquist_hz) {
            return Err(DspError::InvalidCutoff {
                cutoff_hz,
                nyquist_hz,
            });
        }

        let coeffs = BiquadCoeffs::design(filter_type, self.sample_rate, cutoff_hz, BUTTERWORTH_Q);
        self.state = FilterState::Configured {
            filter_type,
            cutoff_hz,
            coeffs,
        };
        self.history = BiquadHistory::default();
        Ok(())
    }

    /// Filter one sample
    ///
    /// Non-finite input propagates through the recurrence unchanged in kind.
    ///
    /// # Errors
    /// * `FilterNotConfigured` - If no response type has been configured
    pub fn tick(&mut self, x: f32) -> Result<f32> {
        match &self.state {
            FilterState::Configured { coeffs, .. } => {
                Ok(self.history.process(x as f64, coeffs) as f32)
            }
            FilterState::Uninitialized => Err(DspError::FilterNotConfigured),
        }
    }

    /// Filter a buffer in place
    pub fn process(&mut self, samples: &mut [f32]) -> Result<()> {
        let FilterState::Configured { coeffs, .. } = self.state else {
            return Err(DspError::FilterNotConfigured);
        };

        for sample in samples.iter_mut() {
            *sample = self.history.process(*sample as f64, &coeffs) as f32;
        }
        Ok(())
    }

    /// Clear the delay lines, keeping the coefficients
    pub fn reset(&mut self) {
        self.history = BiquadHistory::default();
    }

    pub fn sample_rate(&self) -> f64 {
        self.sample_rate
    }

    pub fn nyquist(&self) -> f64 {
        self.sample_rate / 2.0
    }

    pub fn is_configured(&self) -> bool {
        matches!(self.state, FilterState::Configured { .. })
    }

    pub fn filter_type(&self) -> Option<FilterType> {
        match self.state {
            FilterState::Configured { filter_type, .. } => Some(filter_type),
            FilterState::Uninitialized => None,
        }
    }

    pub fn cutoff_hz(&self) -> Option<f64> {
        match self.state {
            FilterState::Configured { cutoff_hz, .. } => Some(cutoff_hz),
            FilterState::Uninitialized => None,
        }
    }

    pub fn coefficients(&self) -> Option<BiquadCoeffs> {
        match self.state {
            FilterState::Configured { coeffs, .. } => Some(coeffs),
            FilterState::Uninitialized => None,
        }
    }
}
