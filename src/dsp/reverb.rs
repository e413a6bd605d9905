//! Reverb effect
//!
//! Implements the Freeverb algorithm for mono signals:
//! - 8 parallel lowpass-feedback comb filters for the reflection tail
//! - 4 series allpass filters for diffusion
//! - Linear wet/dry crossfade controlled by a single ratio

use log::debug;
use serde::{Deserialize, Serialize};
use serde_json::Value;

use super::params::{find_spec, ParamSpec};
use crate::error::Result;

// ============================================================================
// Freeverb Constants
// ============================================================================

/// Reference sample rate for Freeverb delays
const REFERENCE_SAMPLE_RATE: f64 = 44100.0;

/// Comb filter delays at 44100 Hz (8 filters)
const COMB_DELAYS: [usize; 8] = [1116, 1188, 1277, 1356, 1422, 1491, 1557, 1617];

/// Allpass filter delays at 44100 Hz (4 filters)
const ALLPASS_DELAYS: [usize; 4] = [556, 441, 341, 225];

/// Fixed gain for allpass filters (standard Freeverb value)
const ALLPASS_GAIN: f32 = 0.5;

/// Input attenuation before the comb bank
const FIXED_GAIN: f32 = 0.015;

/// Makeup gain applied to the wet signal
const WET_SCALE: f32 = 3.0;

/// Scale factor for room size parameter to feedback
const ROOM_SCALE: f32 = 0.28;

/// Offset for room size parameter to feedback
const ROOM_OFFSET: f32 = 0.7;

/// Scale factor for damping parameter
const DAMP_SCALE: f32 = 0.4;

// ============================================================================
// Parameters
// ============================================================================

/// Parameter table for the reverb filter
pub const REVERB_PARAMS: [ParamSpec; 3] = [
    ParamSpec {
        name: "room_size",
        aliases: &["roomSize"],
        label: "Room size (0.0 - 1.0)",
        min: 0.0,
        max: 1.0,
        min_exclusive: false,
    },
    ParamSpec {
        name: "damping",
        aliases: &[],
        label: "Damping (0.0 - 1.0)",
        min: 0.0,
        max: 1.0,
        min_exclusive: false,
    },
    ParamSpec {
        name: "ratio",
        aliases: &["wet_dry_ratio", "wetDryRatio"],
        label: "Wet/Dry Ratio (0.0 - 1.0)",
        min: 0.0,
        max: 1.0,
        min_exclusive: false,
    },
];

/// Reverb parameters
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ReverbParams {
    /// Room size: 0 (small, short tail) to 1 (large, long tail)
    pub room_size: f32,
    /// Damping: 0 (bright tail) to 1 (dark tail)
    pub damping: f32,
    /// Wet share of the output: 0 (dry only) to 1 (wet only)
    #[serde(rename = "ratio", alias = "wet_dry_ratio")]
    pub wet_dry_ratio: f32,
}

impl Default for ReverbParams {
    fn default() -> Self {
        Self {
            room_size: 0.2,
            damping: 0.07,
            wet_dry_ratio: 0.2,
        }
    }
}

impl ReverbParams {
    /// Validate all parameters are within range
    pub fn validate(&self) -> Result<()> {
        REVERB_PARAMS[0].check(self.room_size)?;
        REVERB_PARAMS[1].check(self.damping)?;
        REVERB_PARAMS[2].check(self.wet_dry_ratio)?;
        Ok(())
    }

    /// Set a single parameter by name, coercing numeric strings
    pub fn set_param(&mut self, name: &str, value: &Value) -> Result<()> {
        let spec = find_spec(&REVERB_PARAMS, name)?;
        let v = spec.coerce(value)?;
        match spec.name {
            "room_size" => self.room_size = v,
            "damping" => self.damping = v,
            _ => self.wet_dry_ratio = v,
        }
        Ok(())
    }

    /// Parameter values in table order
    pub fn values(&self) -> [f32; 3] {
        [self.room_size, self.damping, self.wet_dry_ratio]
    }
}

// ============================================================================
// Filter Components
// ============================================================================

/// Low-pass comb filter for Freeverb
///
/// Implements: y[n] = x[n - delay] + feedback * lowpass(y[n - delay])
#[derive(Debug, Clone)]
struct CombFilter {
    /// Circular buffer for delay line
    buffer: Vec<f32>,
    /// Current write position
    write_pos: usize,
    /// Buffer size mask for efficient wrapping
    mask: usize,
    /// Delay in samples
    delay: usize,
    /// Filter state for damping (low-pass)
    filter_state: f32,
    /// Feedback coefficient (derived from room_size)
    feedback: f32,
    /// Damping coefficient (1 - damp_scale * damping)
    damp1: f32,
    /// Damping coefficient (damp_scale * damping)
    damp2: f32,
}

impl CombFilter {
    fn new(delay: usize, feedback: f32, damping: f32) -> Self {
        // Round up to next power of 2 for efficient wrapping
        let size = (delay + 1).next_power_of_two();
        Self {
            buffer: vec![0.0; size],
            write_pos: 0,
            mask: size - 1,
            delay,
            filter_state: 0.0,
            feedback,
            damp1: 1.0 - damping,
            damp2: damping,
        }
    }

    fn process(&mut self, input: f32) -> f32 {
        let read_pos = (self.write_pos + self.mask + 1 - self.delay) & self.mask;
        let output = self.buffer[read_pos];

        // One-pole low-pass in the feedback path
        self.filter_state = output * self.damp1 + self.filter_state * self.damp2;

        self.buffer[self.write_pos] = input + self.filter_state * self.feedback;
        self.write_pos = (self.write_pos + 1) & self.mask;

        output
    }
}

/// Allpass filter for Freeverb diffusion
#[derive(Debug, Clone)]
struct AllpassFilter {
    buffer: Vec<f32>,
    write_pos: usize,
    mask: usize,
    delay: usize,
}

impl AllpassFilter {
    fn new(delay: usize) -> Self {
        let size = (delay + 1).next_power_of_two();
        Self {
            buffer: vec![0.0; size],
            write_pos: 0,
            mask: size - 1,
            delay,
        }
    }

    fn process(&mut self, input: f32) -> f32 {
        let read_pos = (self.write_pos + self.mask + 1 - self.delay) & self.mask;
        let delayed = self.buffer[read_pos];

        let output = delayed - ALLPASS_GAIN * input;
        self.buffer[self.write_pos] = input + ALLPASS_GAIN * output;
        self.write_pos = (self.write_pos + 1) & self.mask;

        output
    }
}

/// Scale a 44.1 kHz reference delay to `sample_rate`
fn scaled_delay(delay: usize, sample_rate: u32) -> usize {
    let scale = sample_rate as f64 / REFERENCE_SAMPLE_RATE;
    ((delay as f64 * scale).round() as usize).max(1)
}

// ============================================================================
// Transform
// ============================================================================

/// Apply reverb to a mono signal
///
/// The output has the same length as the input; the tail beyond the end of
/// the input is not appended. With `wet_dry_ratio == 0` the input is
/// returned unchanged.
pub fn reverb(samples: &[f32], sample_rate: u32, params: &ReverbParams) -> Vec<f32> {
    let wet = params.wet_dry_ratio;
    let dry = 1.0 - wet;

    if wet == 0.0 {
        return samples.to_vec();
    }

    let feedback = params.room_size * ROOM_SCALE + ROOM_OFFSET;
    let damping = params.damping * DAMP_SCALE;

    let mut combs: Vec<CombFilter> = COMB_DELAYS
        .iter()
        .map(|&d| CombFilter::new(scaled_delay(d, sample_rate), feedback, damping))
        .collect();
    let mut allpasses: Vec<AllpassFilter> = ALLPASS_DELAYS
        .iter()
        .map(|&d| AllpassFilter::new(scaled_delay(d, sample_rate)))
        .collect();

    debug!(
        "Reverb: feedback {:.3}, damping {:.3}, wet {:.2}, dry {:.2}",
        feedback, damping, wet, dry
    );

    samples
        .iter()
        .map(|&input| {
            let attenuated = input * FIXED_GAIN;

            // Sum outputs from all comb filters in parallel
            let mut output: f32 = combs.iter_mut().map(|c| c.process(attenuated)).sum();

            // Process through allpass filters in series
            for allpass in allpasses.iter_mut() {
                output = allpass.process(output);
            }

            input * dry + output * WET_SCALE * wet
        })
        .collect()
}

// ============================================================================
// Tests
// ============================================================================
