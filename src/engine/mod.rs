//! Audio Engine Module
//!
//! Buffer types and the WAV container codec.

pub mod buffer;
pub mod wav;

pub use buffer::{AudioBuffer, MultiChannelBuffer};
pub use wav::{
    probe, read_mono, read_multi, write_mono, write_multi, BitDepth, ContainerMetadata,
    PcmFormat, DEFAULT_BITS_PER_SAMPLE,
};
