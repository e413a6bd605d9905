//! Visualization projections
//!
//! Read-only helpers that turn a sample sequence into something small
//! enough to draw: amplitude normalization, decimation and time labels.

use chrono::NaiveTime;

/// Default maximum number of points handed to a plotting surface
pub const DEFAULT_PLOT_POINTS: usize = 10_000;

/// Default number of time labels along the x axis
pub const DEFAULT_TICK_COUNT: usize = 5;

const SECONDS_PER_DAY: u32 = 86_400;

/// Points and axis labels for drawing a waveform
#[derive(Debug, Clone, PartialEq)]
pub struct PlotData {
    /// Normalized, decimated amplitudes
    pub points: Vec<f32>,
    /// `mm:ss` labels evenly spaced across the plotted span
    pub ticks: Vec<String>,
}

/// Rescale out-of-range samples into roughly [-1, 1]
///
/// Samples already inside [-1, 1], and all-zero input, are returned as-is.
/// Otherwise each value becomes `2 * v / (max - min)`, which is not peak-true
/// for asymmetric signals but is idempotent.
pub fn normalize(samples: &[f32]) -> Vec<f32> {
    let (min, max) = samples
        .iter()
        .fold((f64::INFINITY, f64::NEG_INFINITY), |(lo, hi), &s| {
            (lo.min(s as f64), hi.max(s as f64))
        });

    let all_zero = samples.iter().all(|&s| s == 0.0);
    if samples.is_empty() || all_zero || (max <= 1.0 && min >= -1.0) {
        return samples.to_vec();
    }

    // Constant out-of-range input has no span; scale by magnitude instead.
    let span = if max > min { max - min } else { 2.0 * max.abs() };

    samples
        .iter()
        .map(|&s| (2.0 * s as f64 / span) as f32)
        .collect()
}

/// Step between kept samples so that at most `target` samples remain
pub fn decimation_step(len: usize, target: usize) -> usize {
    let target = target.max(1);
    if len <= target {
        1
    } else {
        len.div_ceil(target)
    }
}

/// Every Nth sample of `samples`, bounded to `target` items
///
/// The returned iterator is lazy and cloneable, so it can be restarted.
pub fn decimate(
    samples: &[f32],
    target: usize,
) -> impl Iterator<Item = f32> + ExactSizeIterator + Clone + '_ {
    let step = decimation_step(samples.len(), target);
    samples.iter().copied().step_by(step)
}

/// `count` `mm:ss` labels evenly spaced from the first to the last sample
pub fn time_ticks(num_samples: usize, sample_rate: u32, count: usize) -> Vec<String> {
    if count == 0 || sample_rate == 0 {
        return Vec::new();
    }

    (0..count)
        .map(|i| {
            let index = if count == 1 {
                0.0
            } else {
                num_samples as f64 * i as f64 / (count - 1) as f64
            };
            format_mm_ss((index / sample_rate as f64).floor() as u32)
        })
        .collect()
}

fn format_mm_ss(seconds: u32) -> String {
    NaiveTime::from_num_seconds_from_midnight_opt(seconds % SECONDS_PER_DAY, 0)
        .map(|t| t.format("%M:%S").to_string())
        .unwrap_or_else(|| "00:00".to_string())
}
