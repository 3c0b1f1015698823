//! # sqc CLI entry point
//!
//! Parses command-line arguments, installs logging and dispatches to the
//! subcommand handlers.

use std::path::PathBuf;
use std::process::ExitCode;

use clap::{Parser, Subcommand};
use tracing_subscriber::EnvFilter;

use sqc_cli::check::{run_check, CheckArgs};
use sqc_cli::check_all::{run_check_all, CheckAllArgs};
use sqc_cli::{GlobalOptions, EXIT_OPERATIONAL};

/// Scenario quality checker for OpenSCENARIO files.
///
/// Checks well-formedness, schema conformance and model loading, then
/// reports missing entity definitions, duplicate and overlapping spawn
/// positions, add/remove accounting, and implausible trajectories.
#[derive(Parser, Debug)]
#[command(name = "sqc", version, about, long_about = None)]
struct Cli {
    /// Enable verbose output. Repeat for more verbosity (-v, -vv, -vvv).
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    verbose: u8,

    /// Emit log lines as JSON.
    #[arg(long, global = true)]
    log_json: bool,

    /// Path to a YAML quality configuration file.
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    /// Directory containing the OpenSCENARIO_<major>-<minor>.xsd files.
    #[arg(long, global = true, default_value = "schemas")]
    schema_dir: PathBuf,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Validate a single scenario file.
    Check(CheckArgs),

    /// Validate every .xosc file in a directory.
    CheckAll(CheckAllArgs),
}

fn main() -> ExitCode {
    let cli = Cli::parse();

    let filter = match cli.verbose {
        0 => EnvFilter::new("warn"),
        1 => EnvFilter::new("info"),
        2 => EnvFilter::new("debug"),
        _ => EnvFilter::new("trace"),
    };
    let subscriber = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .with_writer(std::io::stderr);
    if cli.log_json {
        subscriber.json().init();
    } else {
        subscriber.init();
    }

    tracing::debug!(version = env!("CARGO_PKG_VERSION"), "sqc starting");

    let options = GlobalOptions {
        config: cli.config,
        schema_dir: cli.schema_dir,
    };

    let result = match cli.command {
        Commands::Check(args) => run_check(&args, &options),
        Commands::CheckAll(args) => run_check_all(&args, &options),
    };

    match result {
        Ok(code) => ExitCode::from(code),
        Err(e) => {
            tracing::error!("{e:#}");
            ExitCode::from(EXIT_OPERATIONAL)
        }
    }
}
