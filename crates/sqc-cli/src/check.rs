//! # Check Subcommand
//!
//! Validates a single scenario file and prints its verdict.

use std::path::PathBuf;

use anyhow::Result;
use clap::Args;

use crate::{
    print_aborted, print_verdict, write_file_reports, GlobalOptions, ReportFormats, EXIT_CLEAN,
    EXIT_FINDINGS, EXIT_OPERATIONAL,
};

/// Arguments for the `sqc check` subcommand.
#[derive(Args, Debug)]
pub struct CheckArgs {
    /// Scenario file to validate.
    #[arg(value_name = "FILE")]
    pub file: PathBuf,

    /// Directory for the per-file reports.
    #[arg(long, default_value = "reports/single_reports")]
    pub out_dir: PathBuf,

    /// Write a CSV report.
    #[arg(long)]
    pub csv: bool,

    /// Write a JSON report.
    #[arg(long)]
    pub json: bool,
}

/// Execute the check subcommand.
///
/// Returns exit code: 0 when clean, 1 on gate failures or findings, 2 when
/// the file could not be validated.
pub fn run_check(args: &CheckArgs, options: &GlobalOptions) -> Result<u8> {
    let config = options.load_config()?;
    let validator = options.validator(&config);

    let result = match validator.validate(&args.file) {
        Ok(result) => result,
        Err(e) => {
            print_aborted(&args.file, &e);
            return Ok(EXIT_OPERATIONAL);
        }
    };

    let formats = ReportFormats { csv: args.csv, json: args.json };
    write_file_reports(&result, &args.out_dir, formats)?;
    print_verdict(&result);

    tracing::info!(file = %args.file.display(), "analysis completed");
    Ok(if result.is_clean() { EXIT_CLEAN } else { EXIT_FINDINGS })
}
