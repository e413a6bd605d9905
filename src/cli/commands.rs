//! CLI Command Implementations
//!
//! Batch processing and the filter listing.

use std::fmt::Write as _;
use std::path::PathBuf;

use chrono::Local;
use log::info;

use super::Cli;
use crate::config::Config;
use crate::dsp::FilterKind;
use crate::engine::check_extension;
use crate::error::Result;
use crate::session::Session;

/// Printed when batch mode is started without an input file
pub const USAGE_HINT: &str =
    "No input file specified! Use --input <file.wav>, or --gui for the interactive editor.";

/// `chrono` format of the default output file name
pub const DEFAULT_OUTPUT_FORMAT: &str = "%d_%m_%Y_%H_%M_%S.wav";

/// Output file name derived from the current local time
pub fn default_output_path() -> PathBuf {
    PathBuf::from(Local::now().format(DEFAULT_OUTPUT_FORMAT).to_string())
}

/// Load, filter and save one file as described by the command line
///
/// Returns the path written, or `None` when no input was given and only the
/// usage hint was printed. The filter name, parameters and output extension
/// are checked before the input is read, so an invalid request never writes output.
pub fn run_batch(cli: &Cli, config: &Config) -> Result<Option<PathBuf>> {
    let Some(input) = cli.input.as_deref() else {
        println!("{}", USAGE_HINT);
        return Ok(None);
    };

    let kind: FilterKind = cli.filter.parse()?;
    let mut session = Session::new(config);
    session.select_filter(kind);
    if let Some(json) = &cli.params {
        session.merge_params(json)?;
    }

    let output = cli.output.clone().unwrap_or_else(default_output_path);
    check_extension(&output)?;
    info!(
        "Batch: {} -> {} with {}",
        input.display(),
        output.display(),
        kind.display_name()
    );

    session.load(input)?;
    session.apply()?;
    session.save(&output)?;

    println!(
        "{} applied to {}, saved to {}",
        kind.display_name(),
        input.display(),
        output.display()
    );
    Ok(Some(output))
}

/// Text listing every filter with its parameter labels, ranges and defaults
pub fn filter_catalog(config: &Config) -> String {
    let mut text = String::new();
    for kind in FilterKind::ALL {
        let _ = writeln!(text, "{} ({})", kind.display_name(), kind.name());
        for (spec, default) in config.defaults_for(kind).values() {
            let _ = writeln!(
                text,
                "  {:<10} {:<28} {:<22} default {}",
                spec.name,
                spec.label,
                spec.expected(),
                default
            );
        }
    }
    text
}

/// Print the filter catalog
pub fn list_filters(config: &Config) {
    print!("{}", filter_catalog(config));
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::Parser;
    use crate::engine::generate_test_tone;
    use crate::error::SndfxError;

    fn cli(args: &[&str]) -> Cli {
        Cli::try_parse_from(std::iter::once("sndfx").chain(args.iter().copied())).unwrap()
    }

    #[test]
    fn test_default_output_path_format() {
        let path = default_output_path();
        let name = path.to_str().unwrap();
        assert!(name.ends_with(".wav"));
        // dd_mm_yyyy_HH_MM_SS
        assert_eq!(name.trim_end_matches(".wav").split('_').count(), 6);
    }

    #[test]
    fn test_run_batch_without_input() {
        let config = Config::default();
        assert!(run_batch(&cli(&[]), &config).unwrap().is_none());
    }

    #[test]
    fn test_run_batch_writes_output() {
        let dir = tempfile::tempdir().unwrap();
        let input = dir.path().join("in.wav");
        let output = dir.path().join("out.wav");
        generate_test_tone(220.0, 0.1, 8000).save(&input).unwrap();

        let written = run_batch(
            &cli(&[
                "-i",
                input.to_str().unwrap(),
                "-o",
                output.to_str().unwrap(),
                "-f",
                "chorus",
                "-p",
                r#"{"mix": "0.3"}"#,
            ]),
            &Config::default(),
        )
        .unwrap();

        assert_eq!(written, Some(output.clone()));
        assert!(output.exists());
    }

    #[test]
    fn test_run_batch_rejects_bad_params_before_writing() {
        let dir = tempfile::tempdir().unwrap();
        let input = dir.path().join("in.wav");
        let output = dir.path().join("out.wav");
        generate_test_tone(220.0, 0.1, 8000).save(&input).unwrap();

        let err = run_batch(
            &cli(&[
                "-i",
                input.to_str().unwrap(),
                "-o",
                output.to_str().unwrap(),
                "-p",
                r#"{"rate": 2}"#,
            ]),
            &Config::default(),
        )
        .unwrap_err();

        assert!(matches!(err, SndfxError::InvalidParameter { .. }));
        assert!(!output.exists());
    }

    #[test]
    fn test_run_batch_rejects_output_extension_before_reading() {
        let dir = tempfile::tempdir().unwrap();
        let missing = dir.path().join("missing.wav");
        let output = dir.path().join("out.mp3");

        let err = run_batch(
            &cli(&["-i", missing.to_str().unwrap(), "-o", output.to_str().unwrap()]),
            &Config::default(),
        )
        .unwrap_err();

        // The missing input would be an IO_ERROR had it been read first
        assert_eq!(err.error_code(), "FORMAT_ERROR");
        assert!(!output.exists());
    }

    #[test]
    fn test_filter_catalog_lists_every_parameter() {
        let catalog = filter_catalog(&Config::default());
        for kind in FilterKind::ALL {
            assert!(catalog.contains(kind.display_name()));
            for spec in kind.params() {
                assert!(catalog.contains(spec.label));
            }
        }
    }
}
