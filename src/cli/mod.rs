//! CLI Module
//!
//! Command-line interface selecting which demonstration to run.

pub mod commands;

use clap::{Parser, Subcommand, ValueEnum};
use std::path::PathBuf;

use crate::dsp::FilterType;

/// Offline WAV processing demonstrations
#[derive(Parser, Debug)]
#[command(name = "dsp-basics")]
#[command(version, about, long_about = None)]
pub struct Cli {
    /// Enable verbose output
    #[arg(short, long, global = true)]
    pub verbose: bool,

    /// JSON config file with input_dir, output_dir, sample_rate, bits_per_sample
    #[arg(long, global = true)]
    pub config: Option<PathBuf>,

    /// Override the input directory
    #[arg(long, global = true)]
    pub input_dir: Option<PathBuf>,

    /// Override the output directory
    #[arg(long, global = true)]
    pub output_dir: Option<PathBuf>,

    /// Override the sample rate for generated audio
    #[arg(long, global = true)]
    pub sample_rate: Option<u32>,

    /// Override the output bit depth (8, 16, 24, 32)
    #[arg(long, global = true)]
    pub bits: Option<u16>,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Generate a sine tone
    #[command(name = "tone")]
    Tone {
        /// Fundamental frequency in Hz
        #[arg(short, long, default_value_t = 440.0)]
        frequency: f32,

        /// Harmonic amplitudes, fundamental first
        #[arg(short, long, value_delimiter = ',', default_value = "0.3")]
        amplitudes: Vec<f32>,

        /// Duration in seconds
        #[arg(short, long, default_value_t = 5.0)]
        duration: f32,

        /// Number of output channels (the tone is duplicated into each)
        #[arg(long, default_value_t = 2)]
        channels: u16,
    },

    /// Copy a mono file with a gain applied
    #[command(name = "copy")]
    Copy {
        /// Input file, relative to the input directory
        input: PathBuf,

        /// Linear gain
        #[arg(short, long, default_value_t = 0.5)]
        gain: f32,
    },

    /// Mix every mono stem in a directory
    #[command(name = "mix")]
    Mix {
        /// Stem directory, relative to the input directory
        stems: PathBuf,

        /// Mix length in seconds (default: longest stem)
        #[arg(short, long)]
        duration: Option<f32>,
    },

    /// Change playback speed (and pitch) by linear interpolation
    #[command(name = "speed")]
    Speed {
        /// Input file, relative to the input directory
        input: PathBuf,

        /// Speed ratio
        #[arg(short, long, default_value_t = 1.0, conflicts_with = "semitones")]
        speed: f32,

        /// Pitch shift in semitones instead of a ratio
        #[arg(long)]
        semitones: Option<f32>,
    },

    /// Apply a low-pass or high-pass biquad
    #[command(name = "filter")]
    Filter {
        /// Input file, relative to the input directory
        input: PathBuf,

        /// Response type
        #[arg(short = 't', long = "type", value_enum, default_value_t = FilterKind::Lowpass)]
        kind: FilterKind,

        /// Cutoff frequency in Hz
        #[arg(short, long, default_value_t = 400.0)]
        cutoff: f64,
    },

    /// Apply left/right balance to a stereo file
    #[command(name = "balance")]
    Balance {
        /// Input file, relative to the input directory
        input: PathBuf,

        /// -1.0 (full left) to 1.0 (full right)
        #[arg(short, long, default_value_t = 0.0, allow_hyphen_values = true)]
        balance: f32,
    },

    /// Print a WAV file's header as JSON
    #[command(name = "info")]
    Info {
        /// Path to the WAV file
        path: PathBuf,
    },
}

/// Filter response as spelled on the command line
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum FilterKind {
    Lowpass,
    Highpass,
}

impl From<FilterKind> for FilterType {
    fn from(kind: FilterKind) -> Self {
        match kind {
            FilterKind::Lowpass => FilterType::LowPass,
            FilterKind::Highpass => FilterType::HighPass,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::CommandFactory;

    #[test]
    fn test_cli_definition_is_valid() {
        Cli::command().debug_assert();
    }

    #[test]
    fn test_parse_filter_command() {
        let cli = Cli::try_parse_from([
            "dsp-basics", "--output-dir", "renders", "filter", "song.wav", "--type", "highpass",
            "--cutoff", "1000",
        ])
        .unwrap();

        assert_eq!(cli.output_dir, Some(PathBuf::from("renders")));
        match cli.command {
            Commands::Filter { input, kind, cutoff } => {
                assert_eq!(input, PathBuf::from("song.wav"));
                assert_eq!(FilterType::from(kind), FilterType::HighPass);
                assert_eq!(cutoff, 1000.0);
            }
            other => panic!("Expected filter command, got: {:?}", other),
        }
    }

    #[test]
    fn test_parse_tone_amplitudes() {
        let cli = Cli::try_parse_from(["dsp-basics", "tone", "-a", "0.3,0.25,0.2"]).unwrap();
        match cli.command {
            Commands::Tone {
                amplitudes,
                channels,
                ..
            } => {
                assert_eq!(amplitudes, vec![0.3, 0.25, 0.2]);
                assert_eq!(channels, 2);
            }
            other => panic!("Expected tone command, got: {:?}", other),
        }
    }

    #[test]
    fn test_parse_negative_balance() {
        let cli = Cli::try_parse_from(["dsp-basics", "balance", "in.wav", "-b", "-0.5"]).unwrap();
        match cli.command {
            Commands::Balance { balance, .. } => assert_eq!(balance, -0.5),
            other => panic!("Expected balance command, got: {:?}", other),
        }
    }
}
