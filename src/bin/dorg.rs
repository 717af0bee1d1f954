// SPDX-FileCopyrightText: 2025 Jason Pena <jasonpena@awkless.com>
// SPDX-License-Identifier: MIT

use dorg::{CheckOutcome, Syncer};

use anyhow::Result;
use clap::{Parser, Subcommand};
use std::{path::PathBuf, process::exit};
use tracing::{error, warn};
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

/// Exit status of a `check` that found drift.
const DRIFT_EXIT_CODE: i32 = 2;

/// 🚥 Organize macOS Dock items with YAML.
#[derive(Debug, Clone, Parser)]
#[command(
    about,
    override_usage = "dorg <command> [options]",
    subcommand_help_heading = "Commands",
    version
)]
struct Cli {
    #[command(subcommand)]
    pub command: Command,
}

impl Cli {
    fn verbose(&self) -> bool {
        match &self.command {
            Command::Save(opts) => opts.verbose,
            Command::Load(opts) => opts.verbose,
            Command::Check(opts) => opts.verbose,
        }
    }

    fn run(self) -> Result<i32> {
        match self.command {
            Command::Save(opts) => run_save(opts),
            Command::Load(opts) => run_load(opts),
            Command::Check(opts) => run_check(opts),
        }
    }
}

#[derive(Debug, Clone, Subcommand)]
enum Command {
    /// Save the current Dock items and settings to YAML file.
    #[command(override_usage = "dorg save [options]")]
    Save(SaveOptions),

    /// Load Dock settings config from YAML file.
    #[command(override_usage = "dorg load [options]")]
    Load(LoadOptions),

    /// Check the Dock items are up-to-date.
    #[command(override_usage = "dorg check [options]")]
    Check(CheckOptions),
}

#[derive(Parser, Clone, Debug)]
#[command(author, about, long_about)]
struct SaveOptions {
    /// Dock file to write.
    #[arg(short, long, value_name = "path", default_value = "dorg.yml")]
    pub file: PathBuf,

    /// Verbose output.
    #[arg(short = 'V', long)]
    pub verbose: bool,
}

#[derive(Parser, Clone, Debug)]
#[command(author, about, long_about)]
struct LoadOptions {
    /// Dock file to apply.
    #[arg(short, long, value_name = "path", default_value = "dorg.yml")]
    pub file: PathBuf,

    /// Verbose output.
    #[arg(short = 'V', long)]
    pub verbose: bool,
}

#[derive(Parser, Clone, Debug)]
#[command(author, about, long_about)]
struct CheckOptions {
    /// Dock file to compare against.
    #[arg(short, long, value_name = "path", default_value = "dorg.yml")]
    pub file: PathBuf,

    /// Verbose output.
    #[arg(short = 'V', long)]
    pub verbose: bool,
}

fn main() {
    let cli = Cli::parse();

    let layer = fmt::layer()
        .compact()
        .with_writer(std::io::stderr)
        .with_target(false)
        .without_time();
    let fallback = if cli.verbose() { "debug" } else { "info" };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(fallback));
    tracing_subscriber::registry()
        .with(layer)
        .with(filter)
        .init();

    match cli.run() {
        Ok(code) => exit(code),
        Err(error) => {
            error!("{error:?}");
            exit(1);
        }
    }
}

fn run_save(opts: SaveOptions) -> Result<i32> {
    Syncer::try_default()?.save(opts.file)?;
    Ok(0)
}

fn run_load(opts: LoadOptions) -> Result<i32> {
    Syncer::try_default()?.load(opts.file)?;
    Ok(0)
}

fn run_check(opts: CheckOptions) -> Result<i32> {
    match Syncer::try_default()?.check(opts.file)? {
        CheckOutcome::UpToDate => Ok(0),
        drift @ CheckOutcome::Drifted(_) => {
            warn!("{drift}");
            Ok(DRIFT_EXIT_CODE)
        }
    }
}
