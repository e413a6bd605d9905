//! Editing session
//!
//! A [`Session`] owns one waveform buffer and moves through
//! `Empty -> Loaded -> Transformed`, with every successful load returning
//! it to `Loaded`. Failed operations leave the buffer and state untouched.

mod preview;

pub use preview::PreviewFile;

use std::fmt;
use std::ops::Range;
use std::path::{Path, PathBuf};

use log::debug;
use serde_json::Value;

use crate::config::Config;
use crate::dsp::{self, EffectParams, FilterKind};
use crate::engine::{PlotData, WaveformBuffer};
use crate::error::{Result, SndfxError};

/// Where the session is in its lifecycle
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SessionState {
    /// No file has been loaded yet
    Empty,
    /// The buffer holds a file as loaded
    Loaded,
    /// At least one effect has been applied since the last load
    Transformed,
}

impl fmt::Display for SessionState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            SessionState::Empty => "empty",
            SessionState::Loaded => "loaded",
            SessionState::Transformed => "transformed",
        };
        f.write_str(name)
    }
}

/// Single-user editing session
#[derive(Debug)]
pub struct Session<'a> {
    config: &'a Config,
    buffer: WaveformBuffer,
    state: SessionState,
    filter: FilterKind,
    params: EffectParams,
    source_path: Option<PathBuf>,
    preview: Option<PreviewFile>,
}

impl<'a> Session<'a> {
    /// Start an empty session with the reverb filter selected
    pub fn new(config: &'a Config) -> Self {
        let filter = FilterKind::Reverb;
        Self {
            config,
            buffer: WaveformBuffer::new(),
            state: SessionState::Empty,
            filter,
            params: config.defaults_for(filter),
            source_path: None,
            preview: None,
        }
    }

    /// Load a WAV file, replacing the current buffer
    ///
    /// The file is decoded completely before anything is replaced, so a
    /// failed load keeps the previous buffer and state.
    pub fn load(&mut self, path: impl AsRef<Path>) -> Result<()> {
        let path = path.as_ref();
        let loaded = WaveformBuffer::open(path)?;

        debug!(
            "Session buffer replaced: {} samples at {} Hz",
            loaded.len(),
            loaded.sample_rate()
        );

        self.buffer = loaded;
        self.state = SessionState::Loaded;
        self.source_path = Some(path.to_path_buf());
        self.preview = None;
        Ok(())
    }

    /// Apply the selected filter with the current parameters
    pub fn apply(&mut self) -> Result<()> {
        let params = self.params;
        self.apply_with(&params)
    }

    /// Apply an effect with explicit parameters
    ///
    /// The selected filter and parameters are not changed.
    pub fn apply_with(&mut self, params: &EffectParams) -> Result<()> {
        if self.state == SessionState::Empty {
            return Err(SndfxError::no_file_loaded("apply effect"));
        }

        self.buffer = dsp::apply_to_buffer(&self.buffer, params)?;
        self.state = SessionState::Transformed;
        Ok(())
    }

    /// Write the current buffer to a WAV file
    ///
    /// Processed audio is written at the configured output bit depth.
    pub fn save(&self, path: impl AsRef<Path>) -> Result<()> {
        if self.state == SessionState::Empty {
            return Err(SndfxError::no_file_loaded("save"));
        }

        self.buffer
            .save_with_depth(path.as_ref(), self.config.output_bits_per_sample)
    }

    pub fn state(&self) -> SessionState {
        self.state
    }

    /// The current buffer, read-only
    pub fn preview_buffer(&self) -> &WaveformBuffer {
        &self.buffer
    }

    pub fn filter(&self) -> FilterKind {
        self.filter
    }

    pub fn params(&self) -> &EffectParams {
        &self.params
    }

    /// Path of the most recently loaded file
    pub fn source_path(&self) -> Option<&Path> {
        self.source_path.as_deref()
    }

    pub fn config(&self) -> &Config {
        self.config
    }

    /// Select a filter and reset its parameters to the configured defaults
    pub fn select_filter(&mut self, kind: FilterKind) {
        self.filter = kind;
        self.params = self.config.defaults_for(kind);
    }

    /// Set one parameter of the selected filter
    ///
    /// Accepts anything convertible to a JSON value; numeric strings are
    /// coerced. On error the parameter keeps its previous value.
    pub fn set_param(&mut self, name: &str, value: impl Into<Value>) -> Result<()> {
        self.params.set_param(name, &value.into())
    }

    /// Merge a JSON object of parameters for the selected filter
    pub fn merge_params(&mut self, json: &str) -> Result<()> {
        self.params.merge_json(json)
    }

    /// Plot projection of the current buffer
    ///
    /// `None` plots the whole buffer.
    pub fn plot(&self, range: Option<Range<usize>>) -> Result<PlotData> {
        if self.state == SessionState::Empty {
            return Err(SndfxError::no_file_loaded("plot"));
        }
        Ok(self
            .buffer
            .plot(range, self.config.plot_points, self.config.time_ticks))
    }

    /// Write the current buffer to a fresh preview file
    ///
    /// Any previous preview file is removed first. The returned path stays
    /// valid until the next preview, [`clear_preview`](Self::clear_preview),
    /// a new load, or the session being dropped.
    pub fn write_preview(&mut self) -> Result<&Path> {
        if self.state == SessionState::Empty {
            return Err(SndfxError::no_file_loaded("preview"));
        }

        self.preview = None;
        let preview = PreviewFile::write(
            &self.buffer,
            &self.config.preview_dir,
            self.config.output_bits_per_sample,
        )?;
        Ok(self.preview.insert(preview).path())
    }

    /// Path of the current preview file, if one exists
    pub fn preview_path(&self) -> Option<&Path> {
        self.preview.as_ref().map(PreviewFile::path)
    }

    /// Remove the current preview file
    pub fn clear_preview(&mut self) {
        self.preview = None;
    }
}
