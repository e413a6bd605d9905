//! Waveform Buffer
//!
//! The mono sample container every other component works on. A buffer holds
//! either fixed-point PCM or floating point samples and records which one is
//! active, so the save path never has to guess the representation from the
//! sample magnitudes.

use std::ops::Range;
use std::path::Path;

use crate::engine::io;
use crate::engine::metadata::Metadata;
use crate::engine::plot::{self, PlotData};
use crate::error::{Result, SndfxError};

// ============================================================================
// Constants
// ============================================================================

/// Sample rate given to an empty buffer
pub const DEFAULT_SAMPLE_RATE: u32 = 44100;

/// Bit depth used when float samples are written to a fixed-point file
pub const DEFAULT_OUTPUT_BITS: u16 = 16;

/// Fixed-point bit depths that can be read and written
pub const SUPPORTED_BIT_DEPTHS: [u16; 4] = [8, 16, 24, 32];

/// Full-scale magnitude of a signed fixed-point sample (`2^(bits-1)`)
#[inline]
pub fn full_scale(bits_per_sample: u16) -> f64 {
    (1_u64 << (bits_per_sample.clamp(1, 32) - 1)) as f64
}

// ============================================================================
// Sample Representation
// ============================================================================

/// Which representation a buffer's samples are stored in
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Representation {
    /// Signed fixed-point PCM at the given bit depth
    Fixed { bits_per_sample: u16 },
    /// 32-bit floating point, nominally in [-1.0, 1.0]
    Float,
}

impl std::fmt::Display for Representation {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Representation::Fixed { bits_per_sample } => write!(f, "{}-bit PCM", bits_per_sample),
            Representation::Float => write!(f, "32-bit float"),
        }
    }
}

/// Mono sample storage, tagged by representation
#[derive(Debug, Clone, PartialEq)]
pub enum SampleData {
    /// Fixed-point samples, stored widened to `i32`
    Fixed {
        samples: Vec<i32>,
        bits_per_sample: u16,
    },
    /// Floating point samples
    Float(Vec<f32>),
}

impl SampleData {
    /// Number of samples
    pub fn len(&self) -> usize {
        match self {
            SampleData::Fixed { samples, .. } => samples.len(),
            SampleData::Float(samples) => samples.len(),
        }
    }

    /// Check whether there are no samples
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// The representation tag for this data
    pub fn representation(&self) -> Representation {
        match self {
            SampleData::Fixed {
                bits_per_sample, ..
            } => Representation::Fixed {
                bits_per_sample: *bits_per_sample,
            },
            SampleData::Float(_) => Representation::Float,
        }
    }
}

impl Default for SampleData {
    fn default() -> Self {
        SampleData::Float(Vec::new())
    }
}

// ============================================================================
// Waveform Buffer
// ============================================================================

/// Mono waveform with sample rate, representation tag and metadata
///
/// # Example
/// ```
/// use sndfx::engine::{Representation, WaveformBuffer};
///
/// let buffer = WaveformBuffer::from_raw(vec![0.0, 0.5, -0.5], 44100);
/// assert_eq!(buffer.len(), 3);
/// assert_eq!(buffer.representation(), Representation::Float);
/// ```
#[derive(Debug, Clone, PartialEq)]
pub struct WaveformBuffer {
    sample_rate: u32,
    data: SampleData,
    metadata: Metadata,
}

impl Default for WaveformBuffer {
    fn default() -> Self {
        Self::new()
    }
}

impl WaveformBuffer {
    /// Create an empty buffer
    pub fn new() -> Self {
        Self {
            sample_rate: DEFAULT_SAMPLE_RATE,
            data: SampleData::default(),
            metadata: Metadata::default(),
        }
    }

    /// Wrap floating point samples (typically the output of a transform)
    pub fn from_raw(samples: Vec<f32>, sample_rate: u32) -> Self {
        Self {
            sample_rate,
            data: SampleData::Float(samples),
            metadata: Metadata::default(),
        }
    }

    /// Wrap fixed-point samples at the given bit depth
    pub fn from_fixed(samples: Vec<i32>, bits_per_sample: u16, sample_rate: u32) -> Result<Self> {
        if !SUPPORTED_BIT_DEPTHS.contains(&bits_per_sample) {
            return Err(SndfxError::invalid_param(
                "bits_per_sample",
                bits_per_sample,
                "8, 16, 24 or 32",
            ));
        }
        Ok(Self {
            sample_rate,
            data: SampleData::Fixed {
                samples,
                bits_per_sample,
            },
            metadata: Metadata::default(),
        })
    }

    pub(crate) fn from_parts(sample_rate: u32, data: SampleData, metadata: Metadata) -> Self {
        Self {
            sample_rate,
            data,
            metadata,
        }
    }

    /// Attach metadata to this buffer
    pub fn with_metadata(mut self, metadata: Metadata) -> Self {
        self.metadata = metadata;
        self
    }

    /// Read a WAV file into a new buffer
    ///
    /// Multi-channel files are reduced to mono by averaging each frame.
    ///
    /// # Errors
    /// * `Format` - extension is not `.wav`, or the file is not decodable WAV
    /// * `Io` - the file cannot be read
    pub fn open(path: &Path) -> Result<Self> {
        io::read_wav(path)
    }

    /// Replace this buffer's contents with a WAV file
    ///
    /// On error the buffer is left exactly as it was.
    pub fn load(&mut self, path: &Path) -> Result<()> {
        let loaded = Self::open(path)?;
        *self = loaded;
        Ok(())
    }

    /// Write the buffer to a WAV file
    ///
    /// Float samples are converted to 16-bit PCM; fixed-point samples are
    /// written unchanged at their own bit depth.
    pub fn save(&self, path: &Path) -> Result<()> {
        self.save_with_depth(path, DEFAULT_OUTPUT_BITS)
    }

    /// Write the buffer, converting float samples to `float_target_bits` PCM
    pub fn save_with_depth(&self, path: &Path, float_target_bits: u16) -> Result<()> {
        io::write_wav(self, path, float_target_bits)
    }

    /// Reset to the empty state
    pub fn clear(&mut self) {
        *self = Self::new();
    }

    /// Sample rate in Hz
    #[inline]
    pub fn sample_rate(&self) -> u32 {
        self.sample_rate
    }

    /// Number of samples
    #[inline]
    pub fn len(&self) -> usize {
        self.data.len()
    }

    /// Check whether the buffer holds no samples
    #[inline]
    pub fn is_empty(&self) -> bool {
        self.data.is_empty()
    }

    /// Duration in seconds
    pub fn duration_secs(&self) -> f64 {
        if self.sample_rate == 0 {
            return 0.0;
        }
        self.len() as f64 / self.sample_rate as f64
    }

    /// The active sample representation
    pub fn representation(&self) -> Representation {
        self.data.representation()
    }

    /// Raw sample storage
    pub fn data(&self) -> &SampleData {
        &self.data
    }

    /// Artist/title metadata
    pub fn metadata(&self) -> &Metadata {
        &self.metadata
    }

    /// Samples as floats in [-1.0, 1.0]
    ///
    /// Fixed-point samples are divided by their full-scale value.
    pub fn to_float(&self) -> Vec<f32> {
        match &self.data {
            SampleData::Fixed {
                samples,
                bits_per_sample,
            } => {
                let scale = full_scale(*bits_per_sample);
                samples.iter().map(|&s| (s as f64 / scale) as f32).collect()
            }
            SampleData::Float(samples) => samples.clone(),
        }
    }

    /// Samples in their stored scale (integer values for fixed point)
    pub fn raw_values(&self) -> Vec<f32> {
        match &self.data {
            SampleData::Fixed { samples, .. } => samples.iter().map(|&s| s as f32).collect(),
            SampleData::Float(samples) => samples.clone(),
        }
    }

    /// Ensure the buffer has samples to operate on
    pub fn require_samples(&self) -> Result<()> {
        if self.is_empty() {
            return Err(SndfxError::EmptyBuffer);
        }
        Ok(())
    }

    /// `count` evenly spaced `mm:ss` labels across the buffer's duration
    pub fn time_ticks(&self, count: usize) -> Vec<String> {
        plot::time_ticks(self.len(), self.sample_rate, count)
    }

    /// Normalized, decimated projection of `range` for drawing
    ///
    /// `None` selects the whole buffer; the range is clamped to the buffer.
    pub fn plot(&self, range: Option<Range<usize>>, max_points: usize, tick_count: usize) -> PlotData {
        let values = self.raw_values();
        let len = values.len();
        let range = range.unwrap_or(0..len);
        let start = range.start.min(len);
        let end = range.end.clamp(start, len);

        let normalized = plot::normalize(&values[start..end]);
        let points: Vec<f32> = plot::decimate(&normalized, max_points).collect();

        PlotData {
            points,
            ticks: plot::time_ticks(end - start, self.sample_rate, tick_count),
        }
    }
}

// ============================================================================
// Tests
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    #[test]
    fn test_new_buffer_is_empty() {
        let buffer = WaveformBuffer::new();
        assert!(buffer.is_empty());
        assert_eq!(buffer.sample_rate(), DEFAULT_SAMPLE_RATE);
        assert_eq!(buffer.representation(), Representation::Float);
        assert!(matches!(buffer.require_samples(), Err(SndfxError::EmptyBuffer)));
    }

    #[test]
    fn test_from_raw_is_float() {
        let buffer = WaveformBuffer::from_raw(vec![0.1, -0.2], 22050);
        assert_eq!(buffer.len(), 2);
        assert_eq!(buffer.sample_rate(), 22050);
        assert_eq!(buffer.representation(), Representation::Float);
        assert!(buffer.require_samples().is_ok());
    }

    #[test]
    fn test_from_fixed_rejects_unknown_depth() {
        assert!(WaveformBuffer::from_fixed(vec![1, 2], 12, 44100).is_err());
        let buffer = WaveformBuffer::from_fixed(vec![1, 2], 24, 44100).unwrap();
        assert_eq!(
            buffer.representation(),
            Representation::Fixed { bits_per_sample: 24 }
        );
    }

    #[test]
    fn test_to_float_scales_fixed_point() {
        let buffer = WaveformBuffer::from_fixed(vec![16384, -32768, 0], 16, 44100).unwrap();
        let floats = buffer.to_float();
        assert_relative_eq!(floats[0], 0.5);
        assert_relative_eq!(floats[1], -1.0);
        assert_relative_eq!(floats[2], 0.0);
    }

    #[test]
    fn test_raw_values_keep_integer_scale() {
        let buffer = WaveformBuffer::from_fixed(vec![1000, -1000], 16, 44100).unwrap();
        assert_eq!(buffer.raw_values(), vec![1000.0, -1000.0]);
    }

    #[test]
    fn test_clear_resets_everything() {
        let mut buffer = WaveformBuffer::from_fixed(vec![5; 10], 16, 8000)
            .unwrap()
            .with_metadata(Metadata::new("Artist", "Title"));
        buffer.clear();
        assert_eq!(buffer, WaveformBuffer::new());
    }

    #[test]
    fn test_duration() {
        let buffer = WaveformBuffer::from_raw(vec![0.0; 22050], 44100);
        assert_relative_eq!(buffer.duration_secs(), 0.5);
    }

    #[test]
    fn test_full_scale() {
        assert_eq!(full_scale(8), 128.0);
        assert_eq!(full_scale(16), 32768.0);
        assert_eq!(full_scale(24), 8388608.0);
        assert_eq!(full_scale(32), 2147483648.0);
    }

    #[test]
    fn test_plot_projection_is_bounded_and_normalized() {
        let samples: Vec<i32> = (0..30_000).map(|i| (i % 200) * 100 - 10_000).collect();
        let buffer = WaveformBuffer::from_fixed(samples, 16, 44100).unwrap();

        let plot = buffer.plot(None, 10_000, 5);
        assert!(plot.points.len() <= 10_000);
        assert!(plot.points.iter().all(|p| p.abs() <= 1.0 + 1e-6));
        assert_eq!(plot.ticks.len(), 5);
    }

    #[test]
    fn test_plot_range_is_clamped() {
        let buffer = WaveformBuffer::from_raw(vec![0.25; 100], 100);
        let plot = buffer.plot(Some(50..1000), 10_000, 2);
        assert_eq!(plot.points.len(), 50);
        assert_eq!(plot.ticks, vec!["00:00".to_string(), "00:00".to_string()]);
    }
}
