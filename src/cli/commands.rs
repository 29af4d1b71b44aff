//! CLI Command Implementations
//!
//! Resolves configuration and dispatches to the demonstrations.

use std::path::{Path, PathBuf};

use log::info;

use crate::cli::{Cli, Commands};
use crate::config::Config;
use crate::demos;
use crate::dsp::semitones_to_speed;
use crate::engine::probe;
use crate::error::Result;

/// Build the effective config: file (or defaults) overlaid with CLI flags
pub fn resolve_config(cli: &Cli) -> Result<Config> {
    let mut config = match &cli.config {
        Some(path) => {
            info!("Loading config: {}", path.display());
            Config::load(path)?
        }
        None => Config::default(),
    };

    if let Some(dir) = &cli.input_dir {
        config.input_dir = dir.clone();
    }
    if let Some(dir) = &cli.output_dir {
        config.output_dir = dir.clone();
    }
    if let Some(rate) = cli.sample_rate {
        config.sample_rate = rate;
    }
    if let Some(bits) = cli.bits {
        config.bits_per_sample = bits;
    }

    config.validate()?;
    Ok(config)
}

/// Run one command, returning the file it wrote (if any)
pub fn run(command: &Commands, config: &Config) -> Result<Option<PathBuf>> {
    let written = match command {
        Commands::Tone {
            frequency,
            amplitudes,
            duration,
            channels,
        } => demos::create_tone(config, *frequency, amplitudes, *duration, *channels)?,
        Commands::Copy { input, gain } => demos::read_write_audio(config, input, *gain)?,
        Commands::Mix { stems, duration } => demos::mix_audio_files(config, stems, *duration)?,
        Commands::Speed {
            input,
            speed,
            semitones,
        } => {
            let speed = semitones.map_or(*speed, semitones_to_speed);
            demos::change_speed(config, input, speed)?
        }
        Commands::Filter {
            input,
            kind,
            cutoff,
        } => demos::apply_filter(config, input, (*kind).into(), *cutoff)?,
        Commands::Balance { input, balance } => demos::apply_balance(config, input, *balance)?,
        Commands::Info { path } => {
            print_info(path)?;
            return Ok(None);
        }
    };

    println!("Wrote {}", written.display());
    Ok(Some(written))
}

/// Print a WAV header summary as JSON
pub fn print_info(path: &Path) -> Result<()> {
    let (metadata, frames) = probe(path)?;

    let json = serde_json::json!({
        "path": path.display().to_string(),
        "format": metadata,
        "frames": frames,
        "duration_secs": frames as f64 / metadata.sample_rate as f64,
    });
    println!("{}", serde_json::to_string_pretty(&json)?);

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::Parser;
    use tempfile::tempdir;

    #[test]
    fn test_flags_override_config_file() {
        let dir = tempdir().unwrap();
        let config_path = dir.path().join("config.json");
        std::fs::write(
            &config_path,
            r#"{ "input_dir": "from_file", "output_dir": "from_file", "sample_rate": 22050 }"#,
        )
        .unwrap();

        let cli = Cli::try_parse_from([
            "dsp-basics",
            "--config",
            config_path.to_str().unwrap(),
            "--output-dir",
            "from_flag",
            "--bits",
            "24",
            "info",
            "x.wav",
        ])
        .unwrap();

        let config = resolve_config(&cli).unwrap();
        assert_eq!(config.input_dir, PathBuf::from("from_file"));
        assert_eq!(config.output_dir, PathBuf::from("from_flag"));
        assert_eq!(config.sample_rate, 22050);
        assert_eq!(config.bits_per_sample, 24);
    }

    #[test]
    fn test_rejects_unsupported_bits_flag() {
        let cli = Cli::try_parse_from(["dsp-basics", "--bits", "12", "info", "x.wav"]).unwrap();
        assert!(resolve_config(&cli).is_err());
    }

    #[test]
    fn test_run_tone_writes_file() {
        let dir = tempdir().unwrap();
        let cli = Cli::try_parse_from([
            "dsp-basics",
            "--output-dir",
            dir.path().to_str().unwrap(),
            "tone",
            "--duration",
            "0.1",
        ])
        .unwrap();

        let config = resolve_config(&cli).unwrap();
        let written = run(&cli.command, &config).unwrap().unwrap();
        assert_eq!(written, dir.path().join(demos::TONE_OUT));

        let (metadata, frames) = probe(&written).unwrap();
        assert_eq!(metadata.num_channels, 2);
        assert_eq!(frames, 4410);
    }
}
