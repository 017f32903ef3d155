//! Plume - render markdown with heading anchors and highlighted code.

use anyhow::Result;
use clap::{ColorChoice, Parser};
use plume::{
    cli::{Cli, Commands, check, render},
    config::PlumeConfig,
};

fn main() -> Result<()> {
    let cli = Cli::parse();

    // Set global color override based on CLI option
    match cli.color {
        ColorChoice::Always => owo_colors::set_override(true),
        ColorChoice::Never => owo_colors::set_override(false),
        ColorChoice::Auto => {} // owo-colors auto-detects TTY
    }

    let config = PlumeConfig::load(&cli)?;

    match &cli.command {
        Commands::Render { args } => render::render_docs(args, &config).map(|_| ()),
        Commands::Check { .. } => check::check_config(&config).map(|_| ()),
    }
}
