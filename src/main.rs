//! dsp-basics CLI
//!
//! Runs one offline WAV processing demonstration per invocation.

use anyhow::Context;
use clap::Parser;
use env_logger::Env;
use log::info;

use dsp_basics::cli::commands::{resolve_config, run};
use dsp_basics::cli::Cli;

fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    let default_filter = if cli.verbose { "debug" } else { "info" };
    env_logger::Builder::from_env(Env::default().default_filter_or(default_filter)).init();

    info!("DSP Basics v{}", env!("CARGO_PKG_VERSION"));

    let config = resolve_config(&cli).context("invalid configuration")?;
    run(&cli.command, &config).with_context(|| format!("{:?} failed", cli.command))?;

    Ok(())
}
