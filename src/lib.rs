//! sndfx - audio effects for mono WAV files
//!
//! sndfx loads a WAV file into a [`WaveformBuffer`](engine::WaveformBuffer),
//! applies one of three effects (reverb, chorus, pitch shift) and writes the
//! result back out.
//!
//! # Architecture
//!
//! - [`engine`]: the waveform buffer, WAV import/export and plot projections
//! - [`dsp`]: stateless effect transforms and their parameter records
//! - [`session`]: the `Empty -> Loaded -> Transformed` editing state machine
//! - [`config`]: immutable configuration shared by reference
//! - [`cli`]: batch and interactive front ends
//!
//! # Example
//! ```
//! use sndfx::dsp::{apply, EffectParams, FilterKind};
//!
//! let input = vec![0.0_f32; 4410];
//! let params = EffectParams::defaults(FilterKind::Reverb);
//! let output = apply(&input, 44100, &params).unwrap();
//! assert_eq!(output.len(), input.len());
//! ```

pub mod cli;
pub mod config;
pub mod dsp;
pub mod engine;
pub mod error;
pub mod session;

pub use error::{Result, SndfxError};
