//! Integration Tests
//!
//! End-to-end tests for the load -> apply -> save pipeline.

use std::path::{Path, PathBuf};

use hound::{SampleFormat, WavSpec, WavWriter};
use pretty_assertions::assert_eq;
use sndfx::config::Config;
use sndfx::dsp::{EffectParams, FilterKind, ReverbParams};
use sndfx::engine::{decimate, normalize, Representation, WaveformBuffer};
use sndfx::session::{Session, SessionState};
use sndfx::SndfxError;
use tempfile::TempDir;

/// Write a mono 16-bit WAV file
fn write_pcm16(path: &Path, samples: &[i16], sample_rate: u32) {
    let spec = WavSpec {
        channels: 1,
        sample_rate,
        bits_per_sample: 16,
        sample_format: SampleFormat::Int,
    };
    let mut writer = WavWriter::create(path, spec).unwrap();
    for &s in samples {
        writer.write_sample(s).unwrap();
    }
    writer.finalize().unwrap();
}

fn sine_pcm16(frequency: f64, sample_rate: u32, len: usize) -> Vec<i16> {
    (0..len)
        .map(|i| {
            let t = i as f64 / sample_rate as f64;
            ((2.0 * std::f64::consts::PI * frequency * t).sin() * 20000.0) as i16
        })
        .collect()
}

fn read_pcm16(path: &Path) -> (WavSpec, Vec<i16>) {
    let mut reader = hound::WavReader::open(path).unwrap();
    let spec = reader.spec();
    let samples = reader.samples::<i16>().map(|s| s.unwrap()).collect();
    (spec, samples)
}

fn scratch() -> (TempDir, Config) {
    let dir = tempfile::tempdir().unwrap();
    let config = Config {
        preview_dir: dir.path().join("preview"),
        ..Config::default()
    };
    (dir, config)
}

fn file(dir: &TempDir, name: &str) -> PathBuf {
    dir.path().join(name)
}

// === Full Pipeline Tests ===

#[test]
fn test_silent_file_through_reverb_stays_silent() {
    let (dir, config) = scratch();
    let input = file(&dir, "silence.wav");
    let output = file(&dir, "reverb.wav");
    write_pcm16(&input, &vec![0; 44100], 44100);

    let mut session = Session::new(&config);
    session.load(&input).unwrap();
    session
        .apply_with(&EffectParams::Reverb(ReverbParams {
            room_size: 0.2,
            damping: 0.07,
            wet_dry_ratio: 0.2,
        }))
        .unwrap();
    session.save(&output).unwrap();

    let (spec, samples) = read_pcm16(&output);
    assert_eq!(spec.channels, 1);
    assert_eq!(spec.sample_rate, 44100);
    assert_eq!(samples.len(), 44100);
    assert!(samples.iter().all(|&s| s == 0));
}

#[test]
fn test_load_save_round_trip_is_exact() {
    let (dir, config) = scratch();
    let input = file(&dir, "tone.wav");
    let output = file(&dir, "copy.wav");
    let original = sine_pcm16(440.0, 22050, 5000);
    write_pcm16(&input, &original, 22050);

    let mut session = Session::new(&config);
    session.load(&input).unwrap();
    assert_eq!(
        session.preview_buffer().representation(),
        Representation::Fixed { bits_per_sample: 16 }
    );
    session.save(&output).unwrap();

    let (spec, samples) = read_pcm16(&output);
    assert_eq!(spec, read_pcm16(&input).0);
    assert_eq!(samples, original);
}

#[test]
fn test_every_filter_preserves_length() {
    let (dir, config) = scratch();
    let input = file(&dir, "tone.wav");
    write_pcm16(&input, &sine_pcm16(330.0, 44100, 22050), 44100);

    for kind in FilterKind::ALL {
        let output = file(&dir, &format!("{}.wav", kind));
        let mut session = Session::new(&config);
        session.select_filter(kind);
        session.load(&input).unwrap();
        session.apply().unwrap();
        session.save(&output).unwrap();

        let (_, samples) = read_pcm16(&output);
        assert_eq!(samples.len(), 22050, "{} changed the length", kind);
    }
}

#[test]
fn test_stereo_input_is_downmixed() {
    let (dir, config) = scratch();
    let input = file(&dir, "stereo.wav");
    let spec = WavSpec {
        channels: 2,
        sample_rate: 8000,
        bits_per_sample: 16,
        sample_format: SampleFormat::Int,
    };
    let mut writer = WavWriter::create(&input, spec).unwrap();
    for (l, r) in [(1000_i16, 3000_i16), (-400, -600), (0, 0)] {
        writer.write_sample(l).unwrap();
        writer.write_sample(r).unwrap();
    }
    writer.finalize().unwrap();

    let mut session = Session::new(&config);
    session.load(&input).unwrap();
    assert_eq!(session.preview_buffer().raw_values(), vec![2000.0, -500.0, 0.0]);
}

#[test]
fn test_float_input_is_written_as_pcm() {
    let (dir, config) = scratch();
    let input = file(&dir, "float.wav");
    let output = file(&dir, "pcm.wav");
    let spec = WavSpec {
        channels: 1,
        sample_rate: 8000,
        bits_per_sample: 32,
        sample_format: SampleFormat::Float,
    };
    let mut writer = WavWriter::create(&input, spec).unwrap();
    for s in [0.0_f32, 0.5, -0.5, 1.0] {
        writer.write_sample(s).unwrap();
    }
    writer.finalize().unwrap();

    let mut session = Session::new(&config);
    session.load(&input).unwrap();
    assert_eq!(session.preview_buffer().representation(), Representation::Float);
    session.save(&output).unwrap();

    let (spec, samples) = read_pcm16(&output);
    assert_eq!(spec.bits_per_sample, 16);
    assert_eq!(samples, vec![0, 16384, -16384, 32767]);
}

// === State Machine Tests ===

#[test]
fn test_apply_before_load_fails() {
    let (_dir, config) = scratch();
    let mut session = Session::new(&config);

    let err = session.apply().unwrap_err();
    assert!(matches!(err, SndfxError::NoFileLoaded { .. }));
    assert_eq!(session.state(), SessionState::Empty);
    assert!(session.preview_buffer().is_empty());
}

#[test]
fn test_failed_load_keeps_previous_audio() {
    let (dir, config) = scratch();
    let input = file(&dir, "tone.wav");
    let broken = file(&dir, "broken.wav");
    write_pcm16(&input, &sine_pcm16(440.0, 8000, 800), 8000);
    std::fs::write(&broken, b"RIFF not really a wave file").unwrap();

    let mut session = Session::new(&config);
    session.load(&input).unwrap();
    let before = session.preview_buffer().clone();

    let err = session.load(&broken).unwrap_err();
    assert_eq!(err.error_code(), "FORMAT_ERROR");
    assert_eq!(session.state(), SessionState::Loaded);
    assert_eq!(session.preview_buffer(), &before);
}

#[test]
fn test_empty_file_loads_but_cannot_be_processed() {
    let (dir, config) = scratch();
    let input = file(&dir, "empty.wav");
    write_pcm16(&input, &[], 44100);

    let mut session = Session::new(&config);
    session.load(&input).unwrap();
    assert_eq!(session.state(), SessionState::Loaded);

    assert!(matches!(session.apply(), Err(SndfxError::EmptyBuffer)));
    assert!(matches!(
        session.save(file(&dir, "out.wav")),
        Err(SndfxError::EmptyBuffer)
    ));
    assert_eq!(session.state(), SessionState::Loaded);
}

// === Visualization Tests ===

#[test]
fn test_plot_projection_properties() {
    let samples: Vec<f32> = (0..100_000).map(|i| ((i % 200) as f32 - 100.0) * 300.0).collect();
    let buffer = WaveformBuffer::from_raw(samples.clone(), 44100);

    let once = normalize(&samples);
    let twice = normalize(&once);
    for (a, b) in once.iter().zip(&twice) {
        approx::assert_abs_diff_eq!(*a, *b, epsilon = 1e-5);
    }

    let decimated: Vec<f32> = decimate(&samples, 10_000).collect();
    assert!(decimated.len() <= 10_000);
    let mut source = samples.iter();
    assert!(decimated.iter().all(|d| source.any(|s| s == d)));

    let plot = buffer.plot(None, 10_000, 5);
    assert!(plot.points.len() <= 10_000);
    assert_eq!(plot.ticks, vec!["00:00", "00:00", "00:01", "00:01", "00:02"]);
}
