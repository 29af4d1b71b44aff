//! Error handling for dsp_basics
//!
//! Every codec, filter and transform failure surfaces as a [`DspError`].
//! Nothing is retried and nothing is swallowed.

use std::path::PathBuf;

use thiserror::Error;

/// Result type alias for dsp_basics operations
pub type Result<T> = std::result::Result<T, DspError>;

/// Main error type for dsp_basics operations
#[derive(Error, Debug)]
pub enum DspError {
    // File Errors
    #[error("File not found: {}", path.display())]
    FileNotFound { path: PathBuf },

    #[error("Unreadable WAV header in {}: {reason}", path.display())]
    UnreadableHeader { path: PathBuf, reason: String },

    #[error("Unsupported audio format: {format}")]
    UnsupportedFormat { format: String },

    #[error("Corrupt audio payload: {reason}")]
    CorruptPayload { reason: String },

    #[error("Failed to write {}: {source}", path.display())]
    WriteIo {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    // Channel Errors
    #[error("Channel {channel} has {actual} samples, expected {expected}")]
    ChannelLengthMismatch {
        channel: usize,
        expected: usize,
        actual: usize,
    },

    #[error("Expected {expected} channel(s), found {actual}")]
    ChannelCountMismatch { expected: usize, actual: usize },

    // Filter Errors
    #[error("Invalid sample rate: {sample_rate}")]
    InvalidSampleRate { sample_rate: f64 },

    #[error("Invalid cutoff {cutoff_hz} Hz (must be between 0 and {nyquist_hz} Hz exclusive)")]
    InvalidCutoff { cutoff_hz: f64, nyquist_hz: f64 },

    #[error("Filter used before a response type was configured")]
    FilterNotConfigured,

    // Parameter Errors
    #[error("Invalid parameter '{param}': got {value}, expected {expected}")]
    InvalidParameter {
        param: String,
        value: String,
        expected: String,
    },

    // I/O Errors
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    // Configuration Errors
    #[error("Configuration error: {0}")]
    Config(#[from] serde_json::Error),
}

impl DspError {
    /// Get the error code for this error type
    pub fn error_code(&self) -> &'static str {
        match self {
            DspError::FileNotFound { .. } => "FILE_NOT_FOUND",
            DspError::UnreadableHeader { .. } => "UNREADABLE_HEADER",
            DspError::UnsupportedFormat { .. } => "UNSUPPORTED_FORMAT",
            DspError::CorruptPayload { .. } => "CORRUPT_PAYLOAD",
            DspError::WriteIo { .. } => "WRITE_IO_ERROR",
            DspError::ChannelLengthMismatch { .. } => "CHANNEL_LENGTH_MISMATCH",
            DspError::ChannelCountMismatch { .. } => "CHANNEL_COUNT_MISMATCH",
            DspError::InvalidSampleRate { .. } => "INVALID_SAMPLE_RATE",
            DspError::InvalidCutoff { .. } => "INVALID_CUTOFF",
            DspError::FilterNotConfigured => "FILTER_NOT_CONFIGURED",
            DspError::InvalidParameter { .. } => "INVALID_PARAMETER",
            DspError::Io(_) => "IO_ERROR",
            DspError::Config(_) => "CONFIG_ERROR",
        }
    }

    /// Check if this error is recoverable by fixing the input
    ///
    /// I/O failures are terminal for the call that hit them.
    pub fn is_recoverable(&self) -> bool {
        !matches!(self, DspError::WriteIo { .. } | DspError::Io(_))
    }

    pub(crate) fn invalid_parameter(
        param: &str,
        value: impl ToString,
        expected: &str,
    ) -> Self {
        DspError::InvalidParameter {
            param: param.to_string(),
            value: value.to_string(),
            expected: expected.to_string(),
        }
    }
}
