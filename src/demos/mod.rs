//! Demonstrations
//!
//! Small end-to-end programs that read from `Config::input_dir`, run one
//! transform and write a WAV file into `Config::output_dir`. Each returns the
//! path it wrote.

use std::path::{Path, PathBuf};

use log::{debug, info};
use walkdir::WalkDir;

use crate::config::Config;
use crate::dsp::{self, Biquad, FilterType};
use crate::engine::buffer::checked_frames;
use crate::engine::{read_mono, read_multi, write_mono, write_multi, AudioBuffer};
use crate::error::{DspError, Result};

pub const TONE_OUT: &str = "ToneOut.wav";
pub const COPY_OUT: &str = "MonoCopy.wav";
pub const MIX_OUT: &str = "Mix.wav";
pub const SPEED_OUT: &str = "ChangeSpeedOut.wav";
pub const FILTER_OUT: &str = "FilterOut.wav";
pub const BALANCE_OUT: &str = "BalanceOut.wav";

/// Generate a harmonic tone and write it to [`TONE_OUT`]
///
/// `amplitudes[k]` drives harmonic `k + 1`. The same signal is written to
/// every one of `num_channels` channels.
pub fn create_tone(
    config: &Config,
    frequency: f32,
    amplitudes: &[f32],
    duration_secs: f32,
    num_channels: u16,
) -> Result<PathBuf> {
    info!(
        "createTone: {} Hz, {} harmonic(s), {} s",
        frequency,
        amplitudes.len(),
        duration_secs
    );

    let samples =
        dsp::generate_harmonic_tone(frequency, amplitudes, duration_secs, config.sample_rate)?;

    let out_path = prepare_output(config, TONE_OUT)?;
    write_mono(&out_path, &samples, num_channels, config.format(config.sample_rate))?;
    finish(out_path)
}

/// Copy a mono file through a linear gain into [`COPY_OUT`]
pub fn read_write_audio(config: &Config, input: &Path, gain: f32) -> Result<PathBuf> {
    info!("readWriteAudio: {} at gain {}", input.display(), gain);

    let (source, metadata) = read_mono(config.input_path(input))?;
    let output = dsp::apply_gain(&source, gain);

    let out_path = prepare_output(config, COPY_OUT)?;
    write_mono(&out_path, &output, 1, config.format(metadata.sample_rate))?;
    finish(out_path)
}

/// Sum every mono `.wav` stem under `stems_dir` into [`MIX_OUT`]
///
/// Stems are found recursively and mixed in path order. The mix runs for
/// `duration_secs` if given, otherwise for the longest stem.
///
/// # Errors
/// * `FileNotFound` - If `stems_dir` does not exist
/// * `InvalidParameter` - If no stems are found, their sample rates differ or
///   `duration_secs` is too long for a WAV file
/// * `ChannelCountMismatch` - If a stem is not mono
pub fn mix_audio_files(
    config: &Config,
    stems_dir: &Path,
    duration_secs: Option<f32>,
) -> Result<PathBuf> {
    let stems_dir = config.input_path(stems_dir);
    info!("mixAudioFiles: {}", stems_dir.display());

    let stems = find_stems(&stems_dir)?;
    let mut sources: Vec<AudioBuffer> = Vec::with_capacity(stems.len());
    let mut sample_rate = None;

    for stem in &stems {
        let (samples, metadata) = read_mono(stem)?;
        match sample_rate {
            None => sample_rate = Some(metadata.sample_rate),
            Some(rate) if rate != metadata.sample_rate => {
                return Err(DspError::invalid_parameter(
                    "sample_rate",
                    format!("{} Hz in {}", metadata.sample_rate, stem.display()),
                    &format!("{} Hz like the other stems", rate),
                ));
            }
            Some(_) => {}
        }
        debug!("Loaded stem {} ({} frames)", stem.display(), samples.len());
        sources.push(samples);
    }

    let sample_rate = sample_rate.unwrap_or(config.sample_rate);
    let num_frames = duration_secs
        .map(|secs| {
            let frames = secs.max(0.0) as f64 * sample_rate as f64;
            checked_frames(frames, "duration_secs", secs)
        })
        .transpose()?;
    let output = dsp::mix(&sources, num_frames)?;

    let out_path = prepare_output(config, MIX_OUT)?;
    write_mono(&out_path, &output, 1, config.format(sample_rate))?;
    finish(out_path)
}

/// Play a mono file back at `speed` into [`SPEED_OUT`]
pub fn change_speed(config: &Config, input: &Path, speed: f32) -> Result<PathBuf> {
    info!("changeSpeed: {} at {}x", input.display(), speed);

    let (source, metadata) = read_mono(config.input_path(input))?;
    let output = dsp::change_speed(&source, speed)?;

    let out_path = prepare_output(config, SPEED_OUT)?;
    write_mono(&out_path, &output, 1, config.format(metadata.sample_rate))?;
    finish(out_path)
}

/// Run a mono file through a biquad into [`FILTER_OUT`]
pub fn apply_filter(
    config: &Config,
    input: &Path,
    filter_type: FilterType,
    cutoff_hz: f64,
) -> Result<PathBuf> {
    info!(
        "applyFilter: {} through {:?} at {} Hz",
        input.display(),
        filter_type,
        cutoff_hz
    );

    let (mut samples, metadata) = read_mono(config.input_path(input))?;

    let mut filter = Biquad::new(metadata.sample_rate as f64)?;
    filter.configure(filter_type, cutoff_hz)?;
    for sample in samples.iter_mut() {
        *sample = filter.tick(*sample)?;
    }

    let out_path = prepare_output(config, FILTER_OUT)?;
    write_mono(&out_path, &samples, 1, config.format(metadata.sample_rate))?;
    finish(out_path)
}

/// Apply a left/right balance to a stereo file into [`BALANCE_OUT`]
pub fn apply_balance(config: &Config, input: &Path, balance: f32) -> Result<PathBuf> {
    info!("applyBalance: {} at balance {}", input.display(), balance);

    let (source, metadata) = read_multi(config.input_path(input))?;
    let output = dsp::apply_balance(&source, balance)?;

    let out_path = prepare_output(config, BALANCE_OUT)?;
    write_multi(&out_path, &output, config.format(metadata.sample_rate))?;
    finish(out_path)
}

/// All `.wav` files under `dir`, sorted by path
pub fn find_stems(dir: &Path) -> Result<Vec<PathBuf>> {
    if !dir.is_dir() {
        return Err(DspError::FileNotFound {
            path: dir.to_path_buf(),
        });
    }

    let mut stems = Vec::new();
    for entry in WalkDir::new(dir) {
        let entry = entry.map_err(|e| DspError::Io(e.into()))?;
        let is_wav = entry
            .path()
            .extension()
            .is_some_and(|ext| ext.eq_ignore_ascii_case("wav"));
        if entry.file_type().is_file() && is_wav {
            stems.push(entry.into_path());
        }
    }

    if stems.is_empty() {
        return Err(DspError::invalid_parameter(
            "stems_dir",
            dir.display(),
            "a directory containing .wav files",
        ));
    }

    stems.sort();
    Ok(stems)
}

fn prepare_output(config: &Config, name: &str) -> Result<PathBuf> {
    config.ensure_output_dir()?;
    Ok(config.output_path(name))
}

fn finish(out_path: PathBuf) -> Result<PathBuf> {
    info!("Wrote {}", out_path.display());
    Ok(out_path)
}
