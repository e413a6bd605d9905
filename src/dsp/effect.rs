//! Filter catalog and parameter records
//!
//! [`FilterKind`] names the available filters and carries their static
//! parameter tables. [`EffectParams`] holds the parameter record of exactly
//! one filter, so a value can never be paired with the wrong transform.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};
use serde_json::Value;

use super::chorus::{ChorusParams, CHORUS_PARAMS};
use super::params::{parse_object, ParamSpec};
use super::pitch_shift::{PitchShiftParams, PITCH_SHIFT_PARAMS};
use super::reverb::{ReverbParams, REVERB_PARAMS};
use crate::error::{Result, SndfxError};

/// Available filters
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum FilterKind {
    Reverb,
    Chorus,
    #[serde(rename = "pitchshifter")]
    PitchShifter,
}

impl FilterKind {
    /// All filters in menu order
    pub const ALL: [FilterKind; 3] = [
        FilterKind::Reverb,
        FilterKind::Chorus,
        FilterKind::PitchShifter,
    ];

    /// Identifier used on the command line
    pub fn name(self) -> &'static str {
        match self {
            FilterKind::Reverb => "reverb",
            FilterKind::Chorus => "chorus",
            FilterKind::PitchShifter => "pitchshifter",
        }
    }

    /// Human-readable display name
    pub fn display_name(self) -> &'static str {
        match self {
            FilterKind::Reverb => "Reverb",
            FilterKind::Chorus => "Chorus",
            FilterKind::PitchShifter => "Pitch shifter",
        }
    }

    /// Parameter table in display order
    pub fn params(self) -> &'static [ParamSpec] {
        match self {
            FilterKind::Reverb => &REVERB_PARAMS,
            FilterKind::Chorus => &CHORUS_PARAMS,
            FilterKind::PitchShifter => &PITCH_SHIFT_PARAMS,
        }
    }
}

impl fmt::Display for FilterKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for FilterKind {
    type Err = SndfxError;

    fn from_str(s: &str) -> Result<Self> {
        let wanted = s.trim();
        FilterKind::ALL
            .into_iter()
            .find(|kind| kind.name().eq_ignore_ascii_case(wanted))
            .ok_or_else(|| SndfxError::UnknownFilter {
                name: s.to_string(),
            })
    }
}

/// Parameter record for one filter
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum EffectParams {
    Reverb(ReverbParams),
    Chorus(ChorusParams),
    PitchShift(PitchShiftParams),
}

impl From<ReverbParams> for EffectParams {
    fn from(params: ReverbParams) -> Self {
        EffectParams::Reverb(params)
    }
}

impl From<ChorusParams> for EffectParams {
    fn from(params: ChorusParams) -> Self {
        EffectParams::Chorus(params)
    }
}

impl From<PitchShiftParams> for EffectParams {
    fn from(params: PitchShiftParams) -> Self {
        EffectParams::PitchShift(params)
    }
}

impl EffectParams {
    /// Built-in defaults for a filter
    pub fn defaults(kind: FilterKind) -> Self {
        match kind {
            FilterKind::Reverb => ReverbParams::default().into(),
            FilterKind::Chorus => ChorusParams::default().into(),
            FilterKind::PitchShifter => PitchShiftParams::default().into(),
        }
    }

    pub fn kind(&self) -> FilterKind {
        match self {
            EffectParams::Reverb(_) => FilterKind::Reverb,
            EffectParams::Chorus(_) => FilterKind::Chorus,
            EffectParams::PitchShift(_) => FilterKind::PitchShifter,
        }
    }

    /// Validate all parameters are within range
    pub fn validate(&self) -> Result<()> {
        match self {
            EffectParams::Reverb(p) => p.validate(),
            EffectParams::Chorus(p) => p.validate(),
            EffectParams::PitchShift(p) => p.validate(),
        }
    }

    /// Set a single parameter by name
    pub fn set_param(&mut self, name: &str, value: &Value) -> Result<()> {
        match self {
            EffectParams::Reverb(p) => p.set_param(name, value),
            EffectParams::Chorus(p) => p.set_param(name, value),
            EffectParams::PitchShift(p) => p.set_param(name, value),
        }
    }

    /// Set a single parameter from free text, as typed into an input field
    pub fn set_param_text(&mut self, name: &str, text: &str) -> Result<()> {
        self.set_param(name, &Value::String(text.to_string()))
    }

    /// Merge a JSON object of parameter values
    ///
    /// Either every key is applied or none is: on error the record is left
    /// as it was.
    pub fn merge_json(&mut self, json: &str) -> Result<()> {
        let object = parse_object(json)?;
        let mut updated = *self;
        for (key, value) in &object {
            updated.set_param(key, value)?;
        }
        *self = updated;
        Ok(())
    }

    /// Serialize parameters to a JSON object keyed by canonical names
    pub fn to_json(&self) -> Result<Value> {
        let value = match self {
            EffectParams::Reverb(p) => serde_json::to_value(p)?,
            EffectParams::Chorus(p) => serde_json::to_value(p)?,
            EffectParams::PitchShift(p) => serde_json::to_value(p)?,
        };
        Ok(value)
    }

    /// Parameter specs paired with their current values
    pub fn values(&self) -> Vec<(&'static ParamSpec, f32)> {
        let values: Vec<f32> = match self {
            EffectParams::Reverb(p) => p.values().to_vec(),
            EffectParams::Chorus(p) => p.values().to_vec(),
            EffectParams::PitchShift(p) => p.values().to_vec(),
        };
        self.kind().params().iter().zip(values).collect()
    }
}
