//! Pitch Shift Effect
//!
//! Phase-vocoder pitch shifting. Each STFT frame is analysed for the true
//! frequency of every bin, the bins are moved to `k * ratio`, and their phases
//! are re-accumulated at the shifted frequency before overlap-add. Analysis
//! and synthesis use the same hop, so the duration is preserved.

use std::f64::consts::TAU;

use log::debug;
use rustfft::{num_complex::Complex, FftPlanner};
use serde::{Deserialize, Serialize};
use serde_json::Value;

use super::params::{find_spec, ParamSpec};
use crate::error::Result;

/// STFT frame length
const FFT_SIZE: usize = 2048;

/// Hop between frames (75% overlap)
const HOP_SIZE: usize = FFT_SIZE / 4;

/// Overlap-add weights below this are treated as uncovered
const NORM_EPSILON: f32 = 1e-6;

/// Parameter table for the pitch shifter
pub const PITCH_SHIFT_PARAMS: [ParamSpec; 1] = [ParamSpec {
    name: "shift",
    aliases: &["semitones"],
    label: "Shift [semitones]",
    min: -24.0,
    max: 24.0,
    min_exclusive: false,
}];

/// Pitch shift parameters
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PitchShiftParams {
    /// Shift in semitones, 12 = one octave (-24 to 24)
    #[serde(rename = "shift", alias = "semitones")]
    pub semitones: f32,
}

impl Default for PitchShiftParams {
    fn default() -> Self {
        Self { semitones: 12.0 }
    }
}

impl PitchShiftParams {
    pub fn validate(&self) -> Result<()> {
        PITCH_SHIFT_PARAMS[0].check(self.semitones)?;
        Ok(())
    }

    /// Set a single parameter by name, coercing numeric strings
    pub fn set_param(&mut self, name: &str, value: &Value) -> Result<()> {
        let spec = find_spec(&PITCH_SHIFT_PARAMS, name)?;
        self.semitones = spec.coerce(value)?;
        Ok(())
    }

    /// Frequency ratio for the configured shift
    pub fn ratio(&self) -> f64 {
        2.0_f64.powf(self.semitones as f64 / 12.0)
    }

    pub fn values(&self) -> [f32; 1] {
        [self.semitones]
    }
}

fn hann_window(size: usize) -> Vec<f32> {
    (0..size)
        .map(|i| (0.5 - 0.5 * (TAU * i as f64 / size as f64).cos()) as f32)
        .collect()
}

/// Wrap a phase difference into [-pi, pi]
#[inline]
fn wrap_phase(phase: f64) -> f64 {
    phase - TAU * (phase / TAU).round()
}

/// Shift the pitch of a mono signal, preserving its length
///
/// A shift of zero semitones returns the input unchanged. Cost is
/// proportional to the signal length (one 2048-point FFT pair per 512
/// samples).
pub fn pitch_shift(samples: &[f32], sample_rate: u32, params: &PitchShiftParams) -> Vec<f32> {
    if params.semitones == 0.0 || samples.is_empty() {
        return samples.to_vec();
    }

    let ratio = params.ratio();
    let half = FFT_SIZE / 2;
    let len = samples.len();

    debug!(
        "Pitch shift: {} semitones (ratio {:.4}) over {} samples at {} Hz",
        params.semitones, ratio, len, sample_rate
    );

    // Pad a full frame on both sides so every input sample sees full overlap.
    let padded_len = len + 2 * FFT_SIZE;
    let mut padded = vec![0.0_f32; padded_len];
    padded[FFT_SIZE..FFT_SIZE + len].copy_from_slice(samples);

    let window = hann_window(FFT_SIZE);
    let mut planner = FftPlanner::<f32>::new();
    let fft = planner.plan_fft_forward(FFT_SIZE);
    let ifft = planner.plan_fft_inverse(FFT_SIZE);

    let mut output = vec![0.0_f32; padded_len];
    let mut norm = vec![0.0_f32; padded_len];
    let mut spectrum = vec![Complex::new(0.0_f32, 0.0); FFT_SIZE];

    let mut last_phase = vec![0.0_f64; half + 1];
    let mut synth_phase = vec![0.0_f64; half + 1];
    let mut synth_mag = vec![0.0_f64; half + 1];
    let mut synth_freq = vec![0.0_f64; half + 1];

    // Phase advance per hop of a signal sitting exactly on bin 1
    let bin_advance = TAU * HOP_SIZE as f64 / FFT_SIZE as f64;
    let ifft_scale = 1.0 / FFT_SIZE as f32;

    let mut start = 0;
    while start + FFT_SIZE <= padded_len {
        for (i, bin) in spectrum.iter_mut().enumerate() {
            *bin = Complex::new(padded[start + i] * window[i], 0.0);
        }
        fft.process(&mut spectrum);

        // Analysis: true frequency of each bin, in units of bins
        synth_mag.fill(0.0);
        synth_freq.fill(0.0);
        for k in 0..=half {
            let (mag, phase) = spectrum[k].to_polar();
            let phase = phase as f64;
            let deviation = wrap_phase(phase - last_phase[k] - k as f64 * bin_advance);
            last_phase[k] = phase;

            let true_bin = k as f64 + deviation / bin_advance;
            let target = (k as f64 * ratio).round() as usize;
            if target <= half {
                synth_mag[target] += mag as f64;
                synth_freq[target] = true_bin * ratio;
            }
        }

        // Synthesis: accumulate phase at the shifted frequency
        for k in 0..=half {
            synth_phase[k] = wrap_phase(synth_phase[k] + synth_freq[k] * bin_advance);
            let bin = Complex::from_polar(synth_mag[k] as f32, synth_phase[k] as f32);
            spectrum[k] = bin;
            if k > 0 && k < half {
                spectrum[FFT_SIZE - k] = bin.conj();
            }
        }
        ifft.process(&mut spectrum);

        for (i, bin) in spectrum.iter().enumerate() {
            output[start + i] += bin.re * ifft_scale * window[i];
            norm[start + i] += window[i] * window[i];
        }

        start += HOP_SIZE;
    }

    output[FFT_SIZE..FFT_SIZE + len]
        .iter()
        .zip(&norm[FFT_SIZE..FFT_SIZE + len])
        .map(|(&s, &w)| if w > NORM_EPSILON { s / w } else { 0.0 })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    const SR: u32 = 44100;

    fn sine(freq: f64, len: usize) -> Vec<f32> {
        (0..len)
            .map(|i| (TAU * freq * i as f64 / SR as f64).sin() as f32)
            .collect()
    }

    /// Power of `signal` at `freq` (single-bin DFT)
    fn tone_power(signal: &[f32], freq: f64) -> f64 {
        let (re, im) = signal.iter().enumerate().fold((0.0, 0.0), |(re, im), (i, &s)| {
            let angle = TAU * freq * i as f64 / SR as f64;
            (re + s as f64 * angle.cos(), im - s as f64 * angle.sin())
        });
        re * re + im * im
    }

    #[test]
    fn test_pitch_shift_default_params() {
        let params = PitchShiftParams::default();
        assert_eq!(params.semitones, 12.0);
        assert!((params.ratio() - 2.0).abs() < 1e-12);
        assert!(params.validate().is_ok());
    }

    #[test]
    fn test_pitch_shift_param_validation() {
        let mut params = PitchShiftParams::default();
        assert!(params.set_param("shift", &json!("-24")).is_ok());
        assert_eq!(params.semitones, -24.0);
        assert!(params.set_param("semitones", &json!(25)).is_err());
        assert!(params.set_param("shift", &json!("octave")).is_err());
        assert!(PitchShiftParams { semitones: -30.0 }.validate().is_err());
    }

    #[test]
    fn test_zero_shift_is_identity() {
        let input = sine(440.0, 5000);
        let output = pitch_shift(&input, SR, &PitchShiftParams { semitones: 0.0 });
        assert_eq!(output, input);
    }

    #[test]
    fn test_preserves_length() {
        for len in [1, 100, 2048, 10_001] {
            let input = sine(440.0, len);
            let output = pitch_shift(&input, SR, &PitchShiftParams::default());
            assert_eq!(output.len(), len);
            assert!(output.iter().all(|s| s.is_finite()));
        }
    }

    #[test]
    fn test_silence_stays_silent() {
        let output = pitch_shift(&vec![0.0; 8192], SR, &PitchShiftParams { semitones: 5.0 });
        assert!(output.iter().all(|&s| s == 0.0));
    }

    #[test]
    fn test_octave_up_doubles_frequency() {
        let input = sine(440.0, SR as usize);
        let output = pitch_shift(&input, SR, &PitchShiftParams { semitones: 12.0 });

        let middle = &output[8820..35280];
        assert!(tone_power(middle, 880.0) > 10.0 * tone_power(middle, 440.0));
    }

    #[test]
    fn test_octave_down_halves_frequency() {
        let input = sine(440.0, SR as usize);
        let output = pitch_shift(&input, SR, &PitchShiftParams { semitones: -12.0 });

        let middle = &output[8820..35280];
        assert!(tone_power(middle, 220.0) > 10.0 * tone_power(middle, 440.0));
    }

    #[test]
    fn test_wrap_phase() {
        assert!((wrap_phase(3.0 * std::f64::consts::PI) - std::f64::consts::PI).abs() < 1e-9);
        assert!((wrap_phase(0.5) - 0.5).abs() < 1e-12);
    }
}
