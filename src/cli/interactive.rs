//! Interactive editor
//!
//! A line-oriented prompt over one [`Session`]. Errors from a command are
//! printed and the prompt continues; only `quit` or end of input stop it.

use std::io::{self, BufRead, Write};

use log::{debug, info};

use super::commands::filter_catalog;
use crate::config::Config;
use crate::dsp::FilterKind;
use crate::engine::PlotData;
use crate::error::{Result, SndfxError};
use crate::session::Session;

const PROMPT: &str = "sndfx> ";

/// Characters used to draw the waveform envelope, quietest first
const LEVELS: [char; 9] = [' ', '▁', '▂', '▃', '▄', '▅', '▆', '▇', '█'];

/// Width of the text waveform in columns
const PLOT_WIDTH: usize = 64;

const HELP: &str = "\
Commands:
  load <path>           load a WAV file
  filter <name>         select reverb, chorus or pitchshifter
  set <param> <value>   set a parameter of the selected filter
  params                show the selected filter's parameters
  apply                 apply the selected filter
  save <path>           save the current audio as WAV
  plot                  draw the current waveform
  preview               write a temporary WAV file for playback
  status                show session state
  filters               list filters and their parameters
  help                  show this help
  quit                  leave the editor";

/// What the loop does after a command
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Flow {
    Continue,
    Quit,
}

const TERMINAL: &str = "<terminal>";

fn terminal_error(source: io::Error) -> SndfxError {
    SndfxError::Io {
        path: TERMINAL.to_string(),
        source,
    }
}

fn is_terminal_error(err: &SndfxError) -> bool {
    matches!(err, SndfxError::Io { path, .. } if path == TERMINAL)
}

/// Run the editor until `quit` or end of input
///
/// # Errors
/// Only failures to read from `input` or write to `out` end the loop with an
/// error; command failures are reported on `out`.
pub fn run_interactive<R: BufRead, W: Write>(config: &Config, input: R, out: &mut W) -> Result<()> {
    info!("Starting interactive editor");
    let mut session = Session::new(config);

    writeln!(out, "sndfx {} - type 'help' for commands", env!("CARGO_PKG_VERSION"))
        .map_err(terminal_error)?;

    let mut lines = input.lines();
    loop {
        write!(out, "{}", PROMPT).map_err(terminal_error)?;
        out.flush().map_err(terminal_error)?;

        let Some(line) = lines.next() else {
            writeln!(out).map_err(terminal_error)?;
            break;
        };
        let line = match line {
            Ok(line) => line,
            // The bad line is already consumed, so the next read starts after it
            Err(e) if e.kind() == io::ErrorKind::InvalidData => {
                debug!("Skipping unreadable input line: {}", e);
                writeln!(out, "Error: input line is not valid UTF-8").map_err(terminal_error)?;
                continue;
            }
            Err(e) => return Err(terminal_error(e)),
        };

        match execute(&mut session, line.trim(), out) {
            Ok(Flow::Quit) => break,
            Ok(Flow::Continue) => {}
            Err(e) if is_terminal_error(&e) => return Err(e),
            Err(e) => {
                debug!("Command '{}' failed: {:?}", line.trim(), e);
                writeln!(out, "Error: {}", e).map_err(terminal_error)?;
                if let Some(hint) = e.recovery_suggestions().first() {
                    writeln!(out, "  hint: {}", hint).map_err(terminal_error)?;
                }
            }
        }
    }

    info!("Interactive editor closed");
    Ok(())
}

fn execute<W: Write>(session: &mut Session<'_>, line: &str, out: &mut W) -> Result<Flow> {
    let (command, rest) = match line.split_once(char::is_whitespace) {
        Some((command, rest)) => (command, rest.trim()),
        None => (line, ""),
    };

    match command.to_ascii_lowercase().as_str() {
        "" => {}
        "load" => {
            let path = required(rest, "load <path>")?;
            session.load(path)?;
            let buffer = session.preview_buffer();
            writeln!(
                out,
                "Loaded {}: {} samples, {} Hz, {:.2}s, {} ({} - {})",
                path,
                buffer.len(),
                buffer.sample_rate(),
                buffer.duration_secs(),
                buffer.representation(),
                buffer.metadata().artist,
                buffer.metadata().title
            )
            .map_err(terminal_error)?;
        }
        "filter" => {
            let kind: FilterKind = required(rest, "filter <name>")?.parse()?;
            session.select_filter(kind);
            writeln!(out, "Selected {}", kind.display_name()).map_err(terminal_error)?;
            print_params(session, out)?;
        }
        "set" => {
            let usage = "set <param> <value>";
            let (name, value) = required(rest, usage)?
                .split_once(char::is_whitespace)
                .ok_or_else(|| missing_argument(usage))?;
            session.set_param(name, value.trim())?;
            print_params(session, out)?;
        }
        "params" => print_params(session, out)?,
        "apply" => {
            session.apply()?;
            writeln!(
                out,
                "Applied {} to {} samples",
                session.filter().display_name(),
                session.preview_buffer().len()
            )
            .map_err(terminal_error)?;
        }
        "save" => {
            let path = required(rest, "save <path>")?;
            session.save(path)?;
            writeln!(out, "Saved to {}", path).map_err(terminal_error)?;
        }
        "plot" => {
            let plot = session.plot(None)?;
            write!(out, "{}", render_plot(&plot, PLOT_WIDTH)).map_err(terminal_error)?;
        }
        "preview" => {
            let path = session.write_preview()?;
            writeln!(out, "Preview written to {}", path.display()).map_err(terminal_error)?;
        }
        "status" => {
            let source = session
                .source_path()
                .map(|p| p.display().to_string())
                .unwrap_or_else(|| "-".to_string());
            writeln!(
                out,
                "State: {}\nFile: {}\nSamples: {}\nFilter: {}",
                session.state(),
                source,
                session.preview_buffer().len(),
                session.filter().display_name()
            )
            .map_err(terminal_error)?;
        }
        "filters" => write!(out, "{}", filter_catalog(session.config())).map_err(terminal_error)?,
        "help" | "?" => writeln!(out, "{}", HELP).map_err(terminal_error)?,
        "quit" | "exit" | "q" => return Ok(Flow::Quit),
        other => {
            writeln!(out, "Unknown command '{}'. Type 'help' for a list of commands.", other)
                .map_err(terminal_error)?;
        }
    }

    Ok(Flow::Continue)
}

fn missing_argument(usage: &str) -> SndfxError {
    SndfxError::invalid_param("arguments", "<missing>", format!("usage: {}", usage))
}

fn required<'l>(rest: &'l str, usage: &str) -> Result<&'l str> {
    if rest.is_empty() {
        Err(missing_argument(usage))
    } else {
        Ok(rest)
    }
}

fn print_params<W: Write>(session: &Session<'_>, out: &mut W) -> Result<()> {
    let params = session.params();
    writeln!(out, "{} parameters:", params.kind().display_name()).map_err(terminal_error)?;
    for (spec, value) in params.values() {
        writeln!(out, "  {:<10} = {:<8} {}", spec.name, value, spec.label).map_err(terminal_error)?;
    }
    Ok(())
}

/// Draw a plot as one row of block characters plus its time labels
///
/// Each column shows the peak magnitude of the points it covers.
pub fn render_plot(plot: &PlotData, width: usize) -> String {
    let width = width.max(1);
    let mut text = String::new();

    if plot.points.is_empty() {
        text.push_str("(no samples)\n");
        return text;
    }

    let per_column = plot.points.len().div_ceil(width);
    let top = (LEVELS.len() - 1) as f32;
    for chunk in plot.points.chunks(per_column) {
        let peak = chunk.iter().fold(0.0_f32, |peak, p| peak.max(p.abs())).min(1.0);
        text.push(LEVELS[(peak * top).round() as usize]);
    }
    text.push('\n');
    text.push_str(&plot.ticks.join("  "));
    text.push('\n');
    text
}
