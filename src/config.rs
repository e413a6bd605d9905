//! Application configuration
//!
//! One immutable [`Config`] is built at startup (built-in defaults, optionally
//! overridden by a JSON file) and handed to the session and CLI by reference.

use std::fs;
use std::path::{Path, PathBuf};

use log::{debug, info};
use serde::{Deserialize, Serialize};

use crate::dsp::{ChorusParams, EffectParams, FilterKind, PitchShiftParams, ReverbParams};
use crate::engine::buffer::SUPPORTED_BIT_DEPTHS;
use crate::engine::{DEFAULT_OUTPUT_BITS, DEFAULT_PLOT_POINTS, DEFAULT_TICK_COUNT};
use crate::error::{Result, SndfxError};

/// Name of the preview directory created under the system temp dir
const PREVIEW_DIR_NAME: &str = "sndfx-preview";

/// Default parameter record for each filter
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct FilterDefaults {
    pub reverb: ReverbParams,
    pub chorus: ChorusParams,
    #[serde(rename = "pitchshifter", alias = "pitch_shift")]
    pub pitch_shift: PitchShiftParams,
}

/// sndfx configuration
///
/// Every field is optional in the JSON file; missing fields keep their
/// built-in default.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    /// Parameters a newly selected filter starts with
    pub defaults: FilterDefaults,
    /// Maximum number of points in a waveform plot
    pub plot_points: usize,
    /// Number of time labels under a waveform plot
    pub time_ticks: usize,
    /// Bit depth used when writing floating point (processed) audio
    pub output_bits_per_sample: u16,
    /// Directory for preview files
    pub preview_dir: PathBuf,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            defaults: FilterDefaults::default(),
            plot_points: DEFAULT_PLOT_POINTS,
            time_ticks: DEFAULT_TICK_COUNT,
            output_bits_per_sample: DEFAULT_OUTPUT_BITS,
            preview_dir: std::env::temp_dir().join(PREVIEW_DIR_NAME),
        }
    }
}

impl Config {
    /// Load and validate a JSON configuration file
    ///
    /// # Errors
    /// * `Io` - the file cannot be read
    /// * `Config` - the file is not valid JSON for this structure, or a value
    ///   is out of range
    pub fn load(path: &Path) -> Result<Self> {
        let content = fs::read_to_string(path).map_err(|e| SndfxError::Io {
            path: path.display().to_string(),
            source: e,
        })?;

        let config = Self::from_json(&content).map_err(|e| match e {
            SndfxError::Config { reason } => SndfxError::Config {
                reason: format!("{}: {}", path.display(), reason),
            },
            other => other,
        })?;

        info!("Loaded configuration from {}", path.display());
        Ok(config)
    }

    /// Load `path` when given, otherwise use the built-in defaults
    pub fn load_or_default(path: Option<&Path>) -> Result<Self> {
        match path {
            Some(path) => Self::load(path),
            None => {
                debug!("No configuration file given, using defaults");
                Ok(Self::default())
            }
        }
    }

    /// Parse and validate configuration from a JSON string
    pub fn from_json(json: &str) -> Result<Self> {
        let config: Config = serde_json::from_str(json).map_err(|e| SndfxError::Config {
            reason: e.to_string(),
        })?;
        config.validate()?;
        Ok(config)
    }

    /// Check every value is usable
    pub fn validate(&self) -> Result<()> {
        for kind in FilterKind::ALL {
            self.defaults_for(kind)
                .validate()
                .map_err(|e| SndfxError::Config {
                    reason: format!("default for {}: {}", kind, e),
                })?;
        }

        if self.plot_points == 0 {
            return Err(SndfxError::Config {
                reason: "plot_points must be at least 1".to_string(),
            });
        }

        if !SUPPORTED_BIT_DEPTHS.contains(&self.output_bits_per_sample) {
            return Err(SndfxError::Config {
                reason: format!(
                    "output_bits_per_sample must be one of 8, 16, 24 or 32, got {}",
                    self.output_bits_per_sample
                ),
            });
        }

        Ok(())
    }

    /// Configured starting parameters for `kind`
    pub fn defaults_for(&self, kind: FilterKind) -> EffectParams {
        match kind {
            FilterKind::Reverb => self.defaults.reverb.into(),
            FilterKind::Chorus => self.defaults.chorus.into(),
            FilterKind::PitchShifter => self.defaults.pitch_shift.into(),
        }
    }
}
