//! Chorus Effect
//!
//! A sine LFO sweeps the read position of a fractional delay line around a
//! centre delay. The delayed copy is fed back into the line and mixed with
//! the dry signal.

use std::f64::consts::TAU;

use log::debug;
use serde::{Deserialize, Serialize};
use serde_json::Value;

use super::params::{find_spec, ParamSpec};
use crate::error::Result;

/// Feedback actually applied is capped below unity to keep the loop stable
const MAX_FEEDBACK: f32 = 0.95;

/// Parameter table for the chorus filter
pub const CHORUS_PARAMS: [ParamSpec; 5] = [
    ParamSpec {
        name: "rate",
        aliases: &["rate_hz", "rateHz"],
        label: "Rate [Hz]",
        min: 0.0,
        max: 30.0,
        min_exclusive: true,
    },
    ParamSpec {
        name: "depth",
        aliases: &[],
        label: "Depth (0.0 - 1.0)",
        min: 0.0,
        max: 1.0,
        min_exclusive: false,
    },
    ParamSpec {
        name: "delay",
        aliases: &["centre_delay_ms", "center_delay_ms", "centerDelayMs"],
        label: "Centre delay [ms]",
        min: 1.0,
        max: 100.0,
        min_exclusive: false,
    },
    ParamSpec {
        name: "feedback",
        aliases: &[],
        label: "Feedback (0.0 - 1.0)",
        min: 0.0,
        max: 1.0,
        min_exclusive: false,
    },
    ParamSpec {
        name: "mix",
        aliases: &[],
        label: "Wet Mix (0.0 - 1.0)",
        min: 0.0,
        max: 1.0,
        min_exclusive: false,
    },
];

/// Chorus parameters
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ChorusParams {
    /// LFO rate in Hz (0-30, exclusive of 0)
    #[serde(rename = "rate", alias = "rate_hz")]
    pub rate_hz: f32,
    /// Modulation depth as a fraction of the centre delay (0-1)
    pub depth: f32,
    /// Centre delay in milliseconds (1-100)
    #[serde(rename = "delay", alias = "centre_delay_ms")]
    pub centre_delay_ms: f32,
    /// Feedback amount (0-1, applied capped at 0.95)
    pub feedback: f32,
    /// Wet share of the output (0-1)
    pub mix: f32,
}

impl Default for ChorusParams {
    fn default() -> Self {
        Self {
            rate_hz: 1.0,
            depth: 0.25,
            centre_delay_ms: 3.0,
            feedback: 0.02,
            mix: 0.5,
        }
    }
}

impl ChorusParams {
    /// Validate all parameters are within range
    pub fn validate(&self) -> Result<()> {
        for (spec, value) in CHORUS_PARAMS.iter().zip(self.values()) {
            spec.check(value)?;
        }
        Ok(())
    }

    /// Set a single parameter by name, coercing numeric strings
    pub fn set_param(&mut self, name: &str, value: &Value) -> Result<()> {
        let spec = find_spec(&CHORUS_PARAMS, name)?;
        let v = spec.coerce(value)?;
        match spec.name {
            "rate" => self.rate_hz = v,
            "depth" => self.depth = v,
            "delay" => self.centre_delay_ms = v,
            "feedback" => self.feedback = v,
            _ => self.mix = v,
        }
        Ok(())
    }

    /// Parameter values in table order
    pub fn values(&self) -> [f32; 5] {
        [
            self.rate_hz,
            self.depth,
            self.centre_delay_ms,
            self.feedback,
            self.mix,
        ]
    }
}

/// Circular delay line with linear-interpolated fractional reads
#[derive(Debug, Clone)]
struct DelayLine {
    buffer: Vec<f32>,
    write_pos: usize,
}

impl DelayLine {
    fn new(size: usize) -> Self {
        Self {
            buffer: vec![0.0; size.max(2)],
            write_pos: 0,
        }
    }

    /// Read `delay` samples behind the next write position (`delay >= 1`)
    #[inline]
    fn read(&self, delay: f32) -> f32 {
        let size = self.buffer.len();
        let whole = (delay.floor() as usize).clamp(1, size - 2);
        let frac = delay - whole as f32;

        let newer = self.buffer[(self.write_pos + size - whole) % size];
        let older = self.buffer[(self.write_pos + size - whole - 1) % size];
        newer + (older - newer) * frac
    }

    #[inline]
    fn write(&mut self, sample: f32) {
        self.buffer[self.write_pos] = sample;
        self.write_pos = (self.write_pos + 1) % self.buffer.len();
    }
}

/// Apply chorus to a mono signal
///
/// The output has the same length as the input. With `mix == 0` the input
/// is returned unchanged.
pub fn chorus(samples: &[f32], sample_rate: u32, params: &ChorusParams) -> Vec<f32> {
    let mix = params.mix;
    if mix == 0.0 {
        return samples.to_vec();
    }

    let sr = sample_rate as f32;
    let centre = params.centre_delay_ms * sr / 1000.0;
    let swing = centre * params.depth;
    let feedback = params.feedback.min(MAX_FEEDBACK);

    let mut line = DelayLine::new((centre + swing).ceil() as usize + 3);
    let phase_inc = TAU * params.rate_hz as f64 / sample_rate as f64;
    let mut phase = 0.0_f64;

    debug!(
        "Chorus: centre {:.1} samples, swing {:.1}, feedback {:.2}, mix {:.2}",
        centre, swing, feedback, mix
    );

    samples
        .iter()
        .map(|&input| {
            let lfo = phase.sin() as f32;
            let delay = (centre + swing * lfo).max(1.0);

            let delayed = line.read(delay);
            line.write(input + delayed * feedback);

            phase += phase_inc;
            if phase >= TAU {
                phase -= TAU;
            }

            input * (1.0 - mix) + delayed * mix
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;
    use serde_json::json;

    fn sine(freq: f32, len: usize, sample_rate: u32) -> Vec<f32> {
        (0..len)
            .map(|i| (2.0 * std::f32::consts::PI * freq * i as f32 / sample_rate as f32).sin())
            .collect()
    }

    #[test]
    fn test_chorus_default_params() {
        let params = ChorusParams::default();
        assert_eq!(params.rate_hz, 1.0);
        assert_eq!(params.depth, 0.25);
        assert_eq!(params.centre_delay_ms, 3.0);
        assert_eq!(params.feedback, 0.02);
        assert_eq!(params.mix, 0.5);
        assert!(params.validate().is_ok());
    }

    #[test]
    fn test_chorus_param_validation() {
        let mut params = ChorusParams::default();
        params.rate_hz = 0.0;
        assert!(params.validate().is_err());

        params = ChorusParams::default();
        params.rate_hz = 31.0;
        assert!(params.validate().is_err());

        params = ChorusParams::default();
        params.centre_delay_ms = 0.5;
        assert!(params.validate().is_err());

        params = ChorusParams::default();
        params.mix = -0.1;
        assert!(params.validate().is_err());
    }

    #[test]
    fn test_chorus_set_param_by_alias() {
        let mut params = ChorusParams::default();
        params.set_param("rate_hz", &json!("4")).unwrap();
        params.set_param("centerDelayMs", &json!(7.5)).unwrap();
        assert_eq!(params.rate_hz, 4.0);
        assert_eq!(params.centre_delay_ms, 7.5);
        assert!(params.set_param("speed", &json!(1)).is_err());
    }

    #[test]
    fn test_delay_line_integer_read() {
        let mut line = DelayLine::new(8);
        for i in 1..=5 {
            line.write(i as f32);
        }
        assert_eq!(line.read(1.0), 5.0);
        assert_eq!(line.read(3.0), 3.0);
        assert_relative_eq!(line.read(2.5), 3.5);
    }

    #[test]
    fn test_chorus_zero_mix_is_identity() {
        let input = sine(440.0, 4410, 44100);
        let params = ChorusParams {
            mix: 0.0,
            ..ChorusParams::default()
        };
        assert_eq!(chorus(&input, 44100, &params), input);
    }

    #[test]
    fn test_chorus_without_modulation_is_pure_delay() {
        // 10 ms at 1 kHz is exactly 10 samples
        let input: Vec<f32> = (0..100).map(|i| i as f32).collect();
        let params = ChorusParams {
            rate_hz: 1.0,
            depth: 0.0,
            centre_delay_ms: 10.0,
            feedback: 0.0,
            mix: 1.0,
        };
        let output = chorus(&input, 1000, &params);

        assert_eq!(output.len(), input.len());
        assert!(output[..10].iter().all(|&s| s == 0.0));
        for i in 10..100 {
            assert_relative_eq!(output[i], input[i - 10]);
        }
    }

    #[test]
    fn test_chorus_changes_signal() {
        let input = sine(440.0, 44100, 44100);
        let output = chorus(&input, 44100, &ChorusParams::default());
        assert_eq!(output.len(), input.len());

        let diff: f32 = input.iter().zip(&output).map(|(a, b)| (a - b).abs()).sum();
        assert!(diff > 1.0);
    }

    #[test]
    fn test_chorus_full_feedback_stays_finite() {
        let input = sine(220.0, 44100, 44100);
        let params = ChorusParams {
            depth: 1.0,
            feedback: 1.0,
            mix: 1.0,
            ..ChorusParams::default()
        };
        let output = chorus(&input, 44100, &params);
        assert!(output.iter().all(|s| s.is_finite() && s.abs() < 100.0));
    }
}
