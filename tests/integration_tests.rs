//! Integration Tests
//!
//! End-to-end tests for the read → process → write pipeline and the
//! demonstrations.

use std::fs;
use std::path::Path;

use approx::assert_abs_diff_eq;
use pretty_assertions::assert_eq;
use tempfile::tempdir;

use dsp_basics::demos;
use dsp_basics::dsp::{generate_tone, Biquad, FilterType};
use dsp_basics::engine::{probe, read_mono, read_multi, write_mono, write_multi, PcmFormat};
use dsp_basics::{Config, DspError};

fn peak(samples: &[f32]) -> f32 {
    samples.iter().fold(0.0f32, |p, s| p.max(s.abs()))
}

fn rms(samples: &[f32]) -> f64 {
    let sum: f64 = samples.iter().map(|&s| (s as f64).powi(2)).sum();
    (sum / samples.len() as f64).sqrt()
}

/// Config with separate input and output dirs inside `root`
fn test_config(root: &Path) -> Config {
    let config = Config::new(root.join("in"), root.join("out"));
    fs::create_dir_all(&config.input_dir).unwrap();
    config
}

// === Pipeline Tests ===

#[test]
fn test_filter_pipeline_attenuates_above_cutoff() {
    let dir = tempdir().unwrap();
    let low_path = dir.path().join("low.wav");
    let high_path = dir.path().join("high.wav");

    let low = generate_tone(100.0, 0.5, 0.5, 44100).unwrap();
    let high = generate_tone(8000.0, 0.5, 0.5, 44100).unwrap();
    write_mono(&low_path, &low, 1, PcmFormat::new(44100)).unwrap();
    write_mono(&high_path, &high, 1, PcmFormat::new(44100)).unwrap();

    let mut gains = Vec::new();
    for path in [&low_path, &high_path] {
        let (mut samples, metadata) = read_mono(path).unwrap();
        let before = rms(&samples);

        let mut filter = Biquad::new(metadata.sample_rate as f64).unwrap();
        filter.init_lpf(1000.0).unwrap();
        filter.process(&mut samples).unwrap();

        let out_path = dir.path().join("filtered.wav");
        write_mono(&out_path, &samples, 1, PcmFormat::new(metadata.sample_rate)).unwrap();
        let (filtered, _) = read_mono(&out_path).unwrap();
        gains.push(rms(&filtered) / before);
    }

    assert!(gains[0] > 0.9, "100 Hz should pass, got {}", gains[0]);
    assert!(gains[1] < 0.05, "8 kHz should be attenuated, got {}", gains[1]);
}

#[test]
fn test_stereo_channels_stay_independent() {
    let dir = tempdir().unwrap();
    let path = dir.path().join("stereo.wav");

    let left = generate_tone(440.0, 0.5, 0.2, 48000).unwrap();
    let right = vec![0.0; left.len()];
    write_multi(&path, &[left.clone(), right], PcmFormat::new(48000).with_bits(24)).unwrap();

    let (channels, metadata) = read_multi(&path).unwrap();
    assert_eq!(metadata.num_channels, 2);
    assert!(channels[1].iter().all(|&s| s == 0.0));
    for (orig, read) in left.iter().zip(&channels[0]) {
        assert_abs_diff_eq!(*orig, *read, epsilon = 1.0 / 8388608.0);
    }
}

#[test]
fn test_overwrite_existing_file() {
    let dir = tempdir().unwrap();
    let path = dir.path().join("twice.wav");

    write_mono(&path, &vec![0.25; 1000], 2, PcmFormat::new(44100)).unwrap();
    write_mono(&path, &[0.5; 10], 1, PcmFormat::new(8000)).unwrap();

    let (samples, metadata) = read_mono(&path).unwrap();
    assert_eq!(samples, vec![0.5; 10]);
    assert_eq!(metadata.sample_rate, 8000);
}

// === Demonstration Tests ===

#[test]
fn test_create_tone_duplicates_channels() {
    let dir = tempdir().unwrap();
    let config = test_config(dir.path());

    let out = demos::create_tone(&config, 440.0, &[0.3], 0.5, 2).unwrap();
    assert_eq!(out, config.output_path(demos::TONE_OUT));

    let (channels, metadata) = read_multi(&out).unwrap();
    assert_eq!(metadata.sample_rate, 44100);
    assert_eq!(channels.len(), 2);
    assert_eq!(channels[0].len(), 22050);
    assert_eq!(channels[0], channels[1]);
    assert_abs_diff_eq!(peak(&channels[0]), 0.3, epsilon = 1e-3);
}

#[test]
fn test_read_write_audio_applies_gain() {
    let dir = tempdir().unwrap();
    let config = test_config(dir.path());
    write_mono(
        config.input_path("voice.wav"),
        &[0.5, -0.5, 0.25],
        1,
        PcmFormat::new(22050),
    )
    .unwrap();

    let out = demos::read_write_audio(&config, Path::new("voice.wav"), 0.5).unwrap();
    let (samples, metadata) = read_mono(&out).unwrap();
    assert_eq!(samples, vec![0.25, -0.25, 0.125]);
    assert_eq!(metadata.sample_rate, 22050);
}

#[test]
fn test_mix_audio_files_sums_stems() {
    let dir = tempdir().unwrap();
    let config = test_config(dir.path());
    let stems = config.input_path("stems");
    fs::create_dir_all(stems.join("nested")).unwrap();

    // 8 Hz keeps the duration arithmetic exact
    let format = PcmFormat::new(8);
    write_mono(stems.join("bass.wav"), &[0.25, 0.25, 0.25, 0.25], 1, format).unwrap();
    write_mono(stems.join("keys.wav"), &[0.125, 0.125], 1, format).unwrap();
    write_mono(stems.join("nested").join("kit.WAV"), &[-0.5, 0.5, 0.0], 1, format).unwrap();
    fs::write(stems.join("notes.txt"), "not audio").unwrap();

    let found = demos::find_stems(&stems).unwrap();
    assert_eq!(
        found,
        vec![
            stems.join("bass.wav"),
            stems.join("keys.wav"),
            stems.join("nested").join("kit.WAV"),
        ]
    );

    let out = demos::mix_audio_files(&config, Path::new("stems"), None).unwrap();
    let (mixed, metadata) = read_mono(&out).unwrap();
    assert_eq!(mixed, vec![-0.125, 0.875, 0.25, 0.25]);
    assert_eq!(metadata.sample_rate, 8);

    let out = demos::mix_audio_files(&config, Path::new("stems"), Some(0.25)).unwrap();
    let (mixed, _) = read_mono(&out).unwrap();
    assert_eq!(mixed, vec![-0.125, 0.875]);
}

#[test]
fn test_mix_audio_files_errors() {
    let dir = tempdir().unwrap();
    let config = test_config(dir.path());

    let missing = demos::mix_audio_files(&config, Path::new("nope"), None).unwrap_err();
    assert!(matches!(missing, DspError::FileNotFound { .. }));

    fs::create_dir_all(config.input_path("empty")).unwrap();
    let empty = demos::mix_audio_files(&config, Path::new("empty"), None).unwrap_err();
    assert!(matches!(empty, DspError::InvalidParameter { .. }));

    let mixed_rates = config.input_path("rates");
    fs::create_dir_all(&mixed_rates).unwrap();
    write_mono(mixed_rates.join("a.wav"), &[0.0; 4], 1, PcmFormat::new(44100)).unwrap();
    write_mono(mixed_rates.join("b.wav"), &[0.0; 4], 1, PcmFormat::new(48000)).unwrap();
    let err = demos::mix_audio_files(&config, Path::new("rates"), None).unwrap_err();
    assert!(matches!(err, DspError::InvalidParameter { .. }));

    let stereo = config.input_path("stereo");
    fs::create_dir_all(&stereo).unwrap();
    write_mono(stereo.join("wide.wav"), &[0.0; 4], 2, PcmFormat::default()).unwrap();
    let err = demos::mix_audio_files(&config, Path::new("stereo"), None).unwrap_err();
    assert!(matches!(err, DspError::ChannelCountMismatch { .. }));
}

#[test]
fn test_demos_reject_output_too_long() {
    let dir = tempdir().unwrap();
    let config = test_config(dir.path());
    fs::create_dir_all(config.input_path("stems")).unwrap();
    write_mono(config.input_path("stems").join("a.wav"), &[0.0; 4], 1, PcmFormat::default())
        .unwrap();

    let err = demos::change_speed(&config, Path::new("stems/a.wav"), 1e-30).unwrap_err();
    assert!(matches!(err, DspError::InvalidParameter { .. }));

    let err = demos::mix_audio_files(&config, Path::new("stems"), Some(1e30)).unwrap_err();
    assert!(matches!(err, DspError::InvalidParameter { .. }));

    let err = demos::create_tone(&config, 440.0, &[0.3], 1e30, 2).unwrap_err();
    assert!(matches!(err, DspError::InvalidParameter { .. }));

    assert!(!config.output_dir.exists());
}

#[test]
fn test_change_speed_demo() {
    let dir = tempdir().unwrap();
    let config = test_config(dir.path());
    let ramp: Vec<f32> = (0..8).map(|i| i as f32 / 8.0).collect();
    write_mono(config.input_path("ramp.wav"), &ramp, 1, PcmFormat::new(16000)).unwrap();

    let out = demos::change_speed(&config, Path::new("ramp.wav"), 2.0).unwrap();
    let (samples, metadata) = read_mono(&out).unwrap();
    assert_eq!(samples, vec![0.0, 0.25, 0.5, 0.75]);
    assert_eq!(metadata.sample_rate, 16000);

    let err = demos::change_speed(&config, Path::new("ramp.wav"), 0.0).unwrap_err();
    assert!(matches!(err, DspError::InvalidParameter { .. }));
}

#[test]
fn test_apply_filter_demo() {
    let dir = tempdir().unwrap();
    let config = test_config(dir.path());
    write_mono(
        config.input_path("bright.wav"),
        &generate_tone(10000.0, 0.5, 0.25, 44100).unwrap(),
        1,
        PcmFormat::new(44100),
    )
    .unwrap();

    let out =
        demos::apply_filter(&config, Path::new("bright.wav"), FilterType::LowPass, 400.0).unwrap();
    let (filtered, _) = read_mono(&out).unwrap();
    assert!(peak(&filtered[filtered.len() / 2..]) < 0.01);

    let out =
        demos::apply_filter(&config, Path::new("bright.wav"), FilterType::HighPass, 400.0).unwrap();
    let (filtered, _) = read_mono(&out).unwrap();
    assert!(peak(&filtered[filtered.len() / 2..]) > 0.45);
}

#[test]
fn test_apply_filter_rejects_cutoff_above_file_nyquist() {
    let dir = tempdir().unwrap();
    let config = test_config(dir.path());
    write_mono(config.input_path("phone.wav"), &[0.0; 100], 1, PcmFormat::new(8000)).unwrap();

    let err = demos::apply_filter(&config, Path::new("phone.wav"), FilterType::LowPass, 4000.0)
        .unwrap_err();
    assert!(matches!(err, DspError::InvalidCutoff { .. }));
    assert!(!config.output_path(demos::FILTER_OUT).exists());
}

#[test]
fn test_apply_balance_demo() {
    let dir = tempdir().unwrap();
    let config = test_config(dir.path());
    write_multi(
        config.input_path("stairway.wav"),
        &[vec![0.5; 16], vec![-0.5; 16]],
        PcmFormat::new(44100),
    )
    .unwrap();

    let out = demos::apply_balance(&config, Path::new("stairway.wav"), -1.0).unwrap();
    let (channels, _) = read_multi(&out).unwrap();
    assert_eq!(channels[0], vec![0.5; 16]);
    assert!(channels[1].iter().all(|&s| s == 0.0));

    write_mono(config.input_path("mono.wav"), &[0.0; 16], 1, PcmFormat::default()).unwrap();
    let err = demos::apply_balance(&config, Path::new("mono.wav"), 0.0).unwrap_err();
    assert!(matches!(
        err,
        DspError::ChannelCountMismatch {
            expected: 2,
            actual: 1
        }
    ));
}

#[test]
fn test_demo_missing_input() {
    let dir = tempdir().unwrap();
    let config = test_config(dir.path());

    let err = demos::read_write_audio(&config, Path::new("absent.wav"), 1.0).unwrap_err();
    assert!(matches!(err, DspError::FileNotFound { .. }));
    assert!(err.is_recoverable());
}

#[test]
fn test_demo_writes_configured_bit_depth() {
    let dir = tempdir().unwrap();
    let mut config = test_config(dir.path());
    config.bits_per_sample = 24;
    config.sample_rate = 8000;

    let out = demos::create_tone(&config, 440.0, &[0.3], 0.1, 1).unwrap();
    let (metadata, frames) = probe(&out).unwrap();
    assert_eq!(metadata.bits_per_sample.bits(), 24);
    assert_eq!(metadata.sample_rate, 8000);
    assert_eq!(frames, 800);
}
