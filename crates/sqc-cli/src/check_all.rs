//! # Check-All Subcommand
//!
//! Validates every `*.xosc` file directly inside a directory. Files are
//! processed in parallel, each with its own pipeline instance; reports and
//! verdicts are emitted in file name order.

use std::path::{Path, PathBuf};

use anyhow::{bail, Context, Result};
use clap::Args;
use rayon::prelude::*;

use sqc_check::SummaryRow;

use crate::{
    print_aborted, print_verdict, write_file_reports, GlobalOptions, ReportFormats, EXIT_CLEAN,
    EXIT_FINDINGS, EXIT_OPERATIONAL,
};

/// Scenario file extension.
const SCENARIO_EXTENSION: &str = "xosc";

/// Arguments for the `sqc check-all` subcommand.
#[derive(Args, Debug)]
pub struct CheckAllArgs {
    /// Directory containing `.xosc` files.
    #[arg(value_name = "DIR")]
    pub dir: PathBuf,

    /// Output directory. Per-file reports go to `single_reports/` inside it.
    #[arg(long, default_value = "reports")]
    pub out_dir: PathBuf,

    /// Write per-file reports.
    #[arg(long)]
    pub single: bool,

    /// Write the aggregated summary.
    #[arg(long)]
    pub aggregated: bool,

    /// Use CSV for the selected reports.
    #[arg(long)]
    pub csv: bool,

    /// Also write per-file JSON reports.
    #[arg(long)]
    pub json: bool,
}

/// Execute the check-all subcommand.
///
/// Returns exit code: 0 when every file is clean, 1 on gate failures or
/// findings, 2 when any file could not be validated.
pub fn run_check_all(args: &CheckAllArgs, options: &GlobalOptions) -> Result<u8> {
    if !args.dir.is_dir() {
        bail!("{} is not a directory", args.dir.display());
    }
    let config = options.load_config()?;
    let files = find_scenarios(&args.dir)?;
    tracing::info!(dir = %args.dir.display(), files = files.len(), "starting analysis");

    let outcomes: Vec<_> = files
        .par_iter()
        .map(|file| (file, options.validator(&config).validate(file)))
        .collect();

    let single_dir = args.out_dir.join("single_reports");
    let formats = ReportFormats {
        csv: args.single && args.csv,
        json: args.single && args.json,
    };

    let mut rows: Vec<SummaryRow> = Vec::with_capacity(outcomes.len());
    let mut code = EXIT_CLEAN;
    for (file, outcome) in outcomes {
        match outcome {
            Ok(result) => {
                write_file_reports(&result, &single_dir, formats)?;
                print_verdict(&result);
                if !result.is_clean() {
                    code = code.max(EXIT_FINDINGS);
                }
                rows.push(result.summary_row());
            }
            Err(e) => {
                print_aborted(file, &e);
                code = EXIT_OPERATIONAL;
            }
        }
    }

    if args.aggregated && args.csv {
        std::fs::create_dir_all(&args.out_dir).with_context(|| {
            format!("failed to create output directory {}", args.out_dir.display())
        })?;
        sqc_report::write_summary(&rows, &args.out_dir)?;
    }

    println!("Scenarios: {}/{} clean", rows.iter().filter(|r| is_clean_row(r)).count(), files.len());
    tracing::info!(dir = %args.dir.display(), "analysis completed");
    Ok(code)
}

fn is_clean_row(row: &SummaryRow) -> bool {
    row.markup_ok && row.schema_ok && row.structural_errors == Some(0) && row.kinematic_errors == Some(0)
}

/// `*.xosc` files directly inside `dir`, sorted by path.
fn find_scenarios(dir: &Path) -> Result<Vec<PathBuf>> {
    let entries = std::fs::read_dir(dir)
        .with_context(|| format!("failed to read directory {}", dir.display()))?;
    let mut files = Vec::new();
    for entry in entries {
        let entry = match entry {
            Ok(e) => e,
            Err(e) => {
                tracing::warn!(dir = %dir.display(), error = %e, "failed to read directory entry");
                continue;
            }
        };
        let path = entry.path();
        if path.is_file() && path.extension().and_then(|e| e.to_str()) == Some(SCENARIO_EXTENSION) {
            files.push(path);
        }
    }
    files.sort();
    Ok(files)
}
