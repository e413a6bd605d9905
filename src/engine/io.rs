//! Audio file I/O for sndfx
//!
//! Reads and writes uncompressed WAV files. Input may be 8/16/24/32-bit
//! integer PCM or 32-bit IEEE float with any channel count; it is reduced to
//! mono on import. Output is always mono fixed-point PCM.

use std::fs::File;
use std::io::BufReader;
use std::path::Path;

use hound::{SampleFormat, WavReader, WavSpec, WavWriter};
use log::{debug, info, warn};
use num_traits::ToPrimitive;

use crate::engine::buffer::{full_scale, SampleData, WaveformBuffer, SUPPORTED_BIT_DEPTHS};
use crate::engine::metadata::{self, Metadata};
use crate::error::{Result, SndfxError};

/// The only file extension accepted for reading and writing
pub const SUPPORTED_EXTENSION: &str = "wav";

/// Reject paths that do not carry the `.wav` extension
pub fn check_extension(path: &Path) -> Result<()> {
    let ok = path
        .extension()
        .and_then(|ext| ext.to_str())
        .map(|ext| ext.eq_ignore_ascii_case(SUPPORTED_EXTENSION))
        .unwrap_or(false);

    if ok {
        Ok(())
    } else {
        Err(SndfxError::Format {
            path: path.display().to_string(),
            reason: "only *.wav files are supported".to_string(),
        })
    }
}

/// Import a WAV file as a mono buffer
///
/// # Errors
/// * `Format` - wrong extension, undecodable header, or unsupported encoding
/// * `Io` - the file cannot be opened or read
pub fn read_wav(path: &Path) -> Result<WaveformBuffer> {
    check_extension(path)?;

    let file = File::open(path).map_err(|source| SndfxError::Io {
        path: path.display().to_string(),
        source,
    })?;
    let reader =
        WavReader::new(BufReader::new(file)).map_err(|e| SndfxError::from_wav(path, e))?;

    let spec = reader.spec();
    let channels = spec.channels as usize;
    if channels == 0 {
        return Err(SndfxError::Format {
            path: path.display().to_string(),
            reason: "file declares zero channels".to_string(),
        });
    }

    debug!(
        "Decoding {}: {} Hz, {} channel(s), {}-bit {:?}",
        path.display(),
        spec.sample_rate,
        channels,
        spec.bits_per_sample,
        spec.sample_format
    );

    let data = match (spec.sample_format, spec.bits_per_sample) {
        (SampleFormat::Float, 32) => {
            let interleaved = read_samples::<f32, _>(reader, path)?;
            SampleData::Float(
                downmix(&interleaved, channels)
                    .into_iter()
                    .map(|s| s as f32)
                    .collect(),
            )
        }
        (SampleFormat::Int, 8) => fixed(read_samples::<i8, _>(reader, path)?, channels, 8),
        (SampleFormat::Int, 16) => fixed(read_samples::<i16, _>(reader, path)?, channels, 16),
        (SampleFormat::Int, bits @ (24 | 32)) => {
            fixed(read_samples::<i32, _>(reader, path)?, channels, bits)
        }
        (format, bits) => {
            return Err(SndfxError::Format {
                path: path.display().to_string(),
                reason: format!("{}-bit {:?} samples are not supported", bits, format),
            })
        }
    };

    let metadata = metadata::read_info(path).unwrap_or_else(|e| {
        warn!("Could not read metadata from {}: {}", path.display(), e);
        Metadata::default()
    });

    let buffer = WaveformBuffer::from_parts(spec.sample_rate, data, metadata);
    info!(
        "Loaded {} ({} samples, {:.2}s, {})",
        path.display(),
        buffer.len(),
        buffer.duration_secs(),
        buffer.representation()
    );
    Ok(buffer)
}

/// Export a buffer as a mono PCM WAV file
///
/// Fixed-point buffers keep their bit depth. Float buffers are converted to
/// `float_target_bits` PCM: non-finite samples become silence and the rest
/// are clamped to [-1, 1] before scaling.
pub fn write_wav(buffer: &WaveformBuffer, path: &Path, float_target_bits: u16) -> Result<()> {
    check_extension(path)?;
    buffer.require_samples()?;

    let bits_per_sample;
    let converted;
    let samples: &[i32] = match buffer.data() {
        SampleData::Fixed {
            samples,
            bits_per_sample: bits,
        } => {
            bits_per_sample = *bits;
            samples
        }
        SampleData::Float(samples) => {
            if !SUPPORTED_BIT_DEPTHS.contains(&float_target_bits) {
                return Err(SndfxError::invalid_param(
                    "output_bits_per_sample",
                    float_target_bits,
                    "8, 16, 24 or 32",
                ));
            }
            bits_per_sample = float_target_bits;
            converted = float_to_fixed(samples, float_target_bits);
            &converted
        }
    };

    let spec = WavSpec {
        channels: 1,
        sample_rate: buffer.sample_rate(),
        bits_per_sample,
        sample_format: SampleFormat::Int,
    };

    let mut writer = WavWriter::create(path, spec).map_err(|e| SndfxError::from_wav(path, e))?;

    for &sample in samples {
        let written = match bits_per_sample {
            8 => writer.write_sample(sample as i8),
            16 => writer.write_sample(sample as i16),
            _ => writer.write_sample(sample),
        };
        written.map_err(|e| SndfxError::from_wav(path, e))?;
    }

    writer
        .finalize()
        .map_err(|e| SndfxError::from_wav(path, e))?;

    info!(
        "Saved {} ({} samples, {}-bit PCM)",
        path.display(),
        samples.len(),
        bits_per_sample
    );
    Ok(())
}

/// Convert float samples to signed fixed point at `bits_per_sample`
pub fn float_to_fixed(samples: &[f32], bits_per_sample: u16) -> Vec<i32> {
    let max = full_scale(bits_per_sample) - 1.0;
    samples
        .iter()
        .map(|&s| {
            let s = if s.is_finite() { s.clamp(-1.0, 1.0) } else { 0.0 };
            (s as f64 * max).round() as i32
        })
        .collect()
}

/// Average interleaved frames down to one channel
pub fn downmix<T: ToPrimitive + Copy>(interleaved: &[T], channels: usize) -> Vec<f64> {
    let channels = channels.max(1);
    interleaved
        .chunks_exact(channels)
        .map(|frame| {
            let sum: f64 = frame.iter().map(|s| s.to_f64().unwrap_or(0.0)).sum();
            sum / channels as f64
        })
        .collect()
}

/// Generate a mono sine wave buffer (float representation)
pub fn generate_test_tone(frequency: f32, duration_secs: f32, sample_rate: u32) -> WaveformBuffer {
    let num_samples = (duration_secs * sample_rate as f32) as usize;
    let angular_freq = 2.0 * std::f32::consts::PI * frequency / sample_rate as f32;
    let samples = (0..num_samples)
        .map(|i| (angular_freq * i as f32).sin())
        .collect();
    WaveformBuffer::from_raw(samples, sample_rate)
}

// ============================================================================
// Internal helper functions
// ============================================================================

fn read_samples<T, R>(reader: WavReader<R>, path: &Path) -> Result<Vec<T>>
where
    T: hound::Sample,
    R: std::io::Read,
{
    reader
        .into_samples::<T>()
        .collect::<std::result::Result<Vec<T>, _>>()
        .map_err(|e| SndfxError::from_wav(path, e))
}

fn fixed<T: ToPrimitive + Copy>(interleaved: Vec<T>, channels: usize, bits: u16) -> SampleData {
    let samples = if channels == 1 {
        interleaved
            .iter()
            .map(|s| s.to_i32().unwrap_or(0))
            .collect()
    } else {
        downmix(&interleaved, channels)
            .into_iter()
            .map(|s| s.round() as i32)
            .collect()
    };
    SampleData::Fixed {
        samples,
        bits_per_sample: bits,
    }
}

// ============================================================================
// Tests
// ============================================================================
