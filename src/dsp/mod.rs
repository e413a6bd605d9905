//! Effects Engine
//!
//! Stateless transforms over mono sample sequences. Every transform takes the
//! whole signal and its sample rate and returns a new signal of the same
//! length; the input is never mutated.

mod chorus;
mod effect;
mod params;
mod pitch_shift;
mod reverb;

pub use chorus::{chorus, ChorusParams, CHORUS_PARAMS};
pub use effect::{EffectParams, FilterKind};
pub use params::{coerce_number, find_spec, parse_object, ParamSpec};
pub use pitch_shift::{pitch_shift, PitchShiftParams, PITCH_SHIFT_PARAMS};
pub use reverb::{reverb, ReverbParams, REVERB_PARAMS};

use log::info;

use crate::engine::WaveformBuffer;
use crate::error::{Result, SndfxError};

/// Run the transform selected by `params` over `samples`
///
/// # Errors
/// `InvalidParameter` when a parameter is out of range, `EmptyBuffer` for an
/// empty signal and `Processing` when the result contains non-finite values.
pub fn apply(samples: &[f32], sample_rate: u32, params: &EffectParams) -> Result<Vec<f32>> {
    params.validate()?;
    if samples.is_empty() {
        return Err(SndfxError::EmptyBuffer);
    }

    let output = match params {
        EffectParams::Reverb(p) => reverb(samples, sample_rate, p),
        EffectParams::Chorus(p) => chorus(samples, sample_rate, p),
        EffectParams::PitchShift(p) => pitch_shift(samples, sample_rate, p),
    };

    if let Some(pos) = output.iter().position(|s| !s.is_finite()) {
        return Err(SndfxError::Processing {
            reason: format!(
                "{} produced a non-finite sample at index {}",
                params.kind().display_name(),
                pos
            ),
        });
    }

    Ok(output)
}

/// Apply an effect to a waveform buffer, producing a float buffer
///
/// Fixed-point input is converted to [-1, 1] first. Metadata and sample rate
/// carry over to the result.
pub fn apply_to_buffer(buffer: &WaveformBuffer, params: &EffectParams) -> Result<WaveformBuffer> {
    buffer.require_samples()?;

    info!(
        "Applying {} to {} samples ({})",
        params.kind().display_name(),
        buffer.len(),
        buffer.representation()
    );

    let output = apply(&buffer.to_float(), buffer.sample_rate(), params)?;
    Ok(WaveformBuffer::from_raw(output, buffer.sample_rate()).with_metadata(buffer.metadata().clone()))
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    #[test]
    fn test_apply_rejects_empty_input() {
        let params = EffectParams::defaults(FilterKind::Reverb);
        assert!(matches!(
            apply(&[], 44100, &params),
            Err(SndfxError::EmptyBuffer)
        ));
    }

    #[test]
    fn test_apply_validates_params() {
        let params = EffectParams::Chorus(ChorusParams {
            rate_hz: 0.0,
            ..ChorusParams::default()
        });
        let err = apply(&[0.0; 16], 44100, &params).unwrap_err();
        assert_eq!(err.error_code(), "INVALID_PARAMETER");
    }

    #[test]
    fn test_apply_dispatches_each_filter() {
        let input: Vec<f32> = (0..4410).map(|i| (i as f32 * 0.05).sin() * 0.5).collect();
        for kind in FilterKind::ALL {
            let output = apply(&input, 44100, &EffectParams::defaults(kind)).unwrap();
            assert_eq!(output.len(), input.len());
            assert_ne!(output, input);
        }
    }

    #[test]
    fn test_apply_to_fixed_buffer() {
        let buffer = WaveformBuffer::from_fixed(vec![0, 16384, -16384, 0], 16, 8000).unwrap();
        let params = EffectParams::Reverb(ReverbParams {
            wet_dry_ratio: 0.0,
            ..ReverbParams::default()
        });
        let output = apply_to_buffer(&buffer, &params).unwrap();

        assert_eq!(output.sample_rate(), 8000);
        assert_eq!(output.len(), 4);
        let samples = output.to_float();
        assert_relative_eq!(samples[1], 0.5);
        assert_relative_eq!(samples[2], -0.5);
    }

    #[test]
    fn test_apply_to_empty_buffer() {
        let buffer = WaveformBuffer::new();
        let params = EffectParams::defaults(FilterKind::Chorus);
        assert!(matches!(
            apply_to_buffer(&buffer, &params),
            Err(SndfxError::EmptyBuffer)
        ));
    }
}
