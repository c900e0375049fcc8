//! guidelint CLI tool.
//!
//! Usage:
//! ```bash
//! guidelint check [OPTIONS] [PATHS]...
//! guidelint list-rules [--verbose]
//! guidelint init [--force] [--with-defaults]
//! ```
//!
//! Exit codes: 0 pass, 1 violations at or above the failure threshold,
//! 2 fatal error (configuration, change scope, I/O).

use clap::{Parser, Subcommand};
use guidelint_core::ConfigError;
use std::path::PathBuf;
use std::process::ExitCode;
use tracing_subscriber::EnvFilter;

mod commands;
mod config_resolver;
mod github;

use commands::check::CheckArgs;

/// Guideline linter for C and C++ sources
#[derive(Parser)]
#[command(name = "guidelint")]
#[command(author, version, about, long_about = None)]
struct Cli {
    /// Enable verbose output
    #[arg(short, long, global = true)]
    verbose: bool,

    /// Path to configuration file (TOML, or JSON with a .json extension)
    #[arg(short, long, global = true)]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Run guideline checks
    Check(CheckArgs),

    /// List the effective rules
    ListRules,

    /// Initialize configuration file
    Init {
        /// Overwrite existing config
        #[arg(long)]
        force: bool,

        /// Write the full built-in rule set into the file
        #[arg(long)]
        with_defaults: bool,
    },
}

const FATAL: u8 = 2;

fn main() -> ExitCode {
    let cli = Cli::parse();

    let filter = if cli.verbose {
        EnvFilter::new("debug")
    } else {
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"))
    };

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .with_writer(std::io::stderr)
        .init();

    let config = cli.config.as_deref();
    let outcome = match cli.command {
        Commands::Check(args) => commands::check::run(&args, config).map(ExitCode::from),
        Commands::ListRules => {
            commands::list_rules::run(config, cli.verbose).map(|()| ExitCode::SUCCESS)
        }
        Commands::Init {
            force,
            with_defaults,
        } => commands::init::run(force, with_defaults).map(|()| ExitCode::SUCCESS),
    };

    outcome.unwrap_or_else(|err| {
        report_fatal(err);
        ExitCode::from(FATAL)
    })
}

fn report_fatal(err: anyhow::Error) {
    match err.downcast::<ConfigError>() {
        Ok(config) => eprintln!("{:?}", miette::Report::new(config)),
        Err(other) => eprintln!("Error: {other:#}"),
    }
}
