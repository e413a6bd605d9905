//! sndfx CLI
//!
//! Batch and interactive front ends for the sndfx effects library.

use std::io;

use anyhow::Context;
use clap::Parser;
use env_logger::Env;
use log::info;

use sndfx::cli::{commands, interactive, Cli, Mode};
use sndfx::config::Config;

fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    // Initialize logger
    env_logger::Builder::from_env(Env::default().default_filter_or(cli.log_level())).init();

    info!("sndfx v{}", env!("CARGO_PKG_VERSION"));

    let config = Config::load_or_default(cli.config.as_deref())
        .context("failed to load configuration")?;

    match cli.mode() {
        Mode::Interactive => {
            let stdin = io::stdin();
            let mut stdout = io::stdout();
            interactive::run_interactive(&config, stdin.lock(), &mut stdout)
                .context("interactive editor failed")?;
            return Ok(());
        }
        Mode::ListFilters => {
            commands::list_filters(&config);
            return Ok(());
        }
        Mode::Batch => {}
    }

    let input = cli
        .input
        .as_ref()
        .map(|p| p.display().to_string())
        .unwrap_or_default();
    commands::run_batch(&cli, &config)
        .with_context(|| format!("failed to process '{}' with {}", input, cli.filter))?;
    Ok(())
}
