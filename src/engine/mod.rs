//! Audio Engine Module
//!
//! Waveform storage and everything that moves it in and out of files:
//! - Mono waveform buffer with an explicit sample representation
//! - WAV import/export
//! - RIFF INFO metadata
//! - Read-only projections for plotting

pub mod buffer;
pub mod io;
pub mod metadata;
pub mod plot;

pub use buffer::{Representation, SampleData, WaveformBuffer, DEFAULT_OUTPUT_BITS};
pub use io::{check_extension, generate_test_tone, read_wav, write_wav};
pub use metadata::Metadata;
pub use plot::{decimate, normalize, time_ticks, PlotData, DEFAULT_PLOT_POINTS, DEFAULT_TICK_COUNT};
