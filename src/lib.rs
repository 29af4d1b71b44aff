//! DSP Basics - Offline PCM Audio Toolkit
//!
//! Reads and writes uncompressed PCM WAV files and applies simple per-sample
//! processing to them.
//!
//! # Architecture
//!
//! - `engine`: channel buffers and the WAV codec (header parsing, integer to
//!   float scaling, channel interleaving)
//! - `dsp`: the biquad low/high-pass filter plus tone, gain, mix, balance and
//!   speed transforms
//! - `demos`: end-to-end demonstrations driven by a [`Config`]
//! - `cli`: the thin command-line driver behind the `dsp-basics` binary

pub mod cli;
pub mod config;
pub mod demos;
pub mod dsp;
pub mod engine;
pub mod error;

pub use config::Config;
pub use error::{DspError, Result};
