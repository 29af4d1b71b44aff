//! Configuration
//!
//! Input/output directories and default output format. Loaded from JSON,
//! with every field optional.

use std::fs;
use std::io::ErrorKind;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use crate::engine::{BitDepth, PcmFormat, DEFAULT_BITS_PER_SAMPLE};
use crate::error::{DspError, Result};

/// Where demonstrations read from and write to
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    /// Directory that input file names are resolved against
    pub input_dir: PathBuf,
    /// Directory that output files are written into
    pub output_dir: PathBuf,
    /// Sample rate for generated audio in Hz
    pub sample_rate: u32,
    /// Bit depth for every written file
    pub bits_per_sample: u16,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            input_dir: PathBuf::from("input"),
            output_dir: PathBuf::from("output"),
            sample_rate: 44100,
            bits_per_sample: DEFAULT_BITS_PER_SAMPLE,
        }
    }
}

impl Config {
    /// Create a config for the given directories with default format settings
    pub fn new(input_dir: impl Into<PathBuf>, output_dir: impl Into<PathBuf>) -> Self {
        Self {
            input_dir: input_dir.into(),
            output_dir: output_dir.into(),
            ..Default::default()
        }
    }

    /// Load a config from a JSON file
    ///
    /// # Errors
    /// * `FileNotFound` - If the file does not exist
    /// * `Config` - If the JSON is malformed
    /// * plus anything [`Config::validate`] rejects
    pub fn load(path: &Path) -> Result<Self> {
        let text = fs::read_to_string(path).map_err(|e| match e.kind() {
            ErrorKind::NotFound => DspError::FileNotFound {
                path: path.to_path_buf(),
            },
            _ => DspError::Io(e),
        })?;

        let config: Config = serde_json::from_str(&text)?;
        config.validate()?;
        Ok(config)
    }

    /// Check the format settings
    pub fn validate(&self) -> Result<()> {
        if self.sample_rate == 0 {
            return Err(DspError::InvalidSampleRate { sample_rate: 0.0 });
        }
        BitDepth::try_from(self.bits_per_sample)?;
        Ok(())
    }

    /// Resolve an input file name
    pub fn input_path(&self, name: impl AsRef<Path>) -> PathBuf {
        self.input_dir.join(name)
    }

    /// Resolve an output file name
    pub fn output_path(&self, name: impl AsRef<Path>) -> PathBuf {
        self.output_dir.join(name)
    }

    /// Create the output directory if it does not exist
    pub fn ensure_output_dir(&self) -> Result<()> {
        fs::create_dir_all(&self.output_dir).map_err(|source| DspError::WriteIo {
            path: self.output_dir.clone(),
            source,
        })
    }

    /// Output format at the given sample rate and the configured bit depth
    pub fn format(&self, sample_rate: u32) -> PcmFormat {
        PcmFormat::new(sample_rate).with_bits(self.bits_per_sample)
    }
}
