//! # sqc-cli — Scenario Quality Checker CLI
//!
//! Provides the `sqc` command-line interface.
//!
//! ## Subcommands
//!
//! - `sqc check <FILE>`: validate one scenario, optionally writing its CSV
//!   and JSON reports.
//! - `sqc check-all <DIR>`: validate every `*.xosc` file of a directory in
//!   parallel, optionally writing per-file reports and `aggregate_data.csv`.
//!
//! ```bash
//! sqc --schema-dir schemas/ check scenarios/cut_in.xosc --csv
//! sqc -v check-all scenarios/ --single --aggregated --csv
//! ```
//!
//! ## Exit Codes
//!
//! | code | meaning |
//! |---|---|
//! | 0 | every file passed all gates without findings |
//! | 1 | at least one gate failure or finding |
//! | 2 | operational error (unreadable config, schema definition, output directory) |

pub mod check;
pub mod check_all;

use std::path::{Path, PathBuf};

use anyhow::{Context, Result};

use sqc_check::{CheckError, ValidationResult, Validator};
use sqc_core::QualityConfig;

pub const EXIT_CLEAN: u8 = 0;
pub const EXIT_FINDINGS: u8 = 1;
pub const EXIT_OPERATIONAL: u8 = 2;

/// Options shared by every subcommand.
#[derive(Debug, Clone)]
pub struct GlobalOptions {
    pub config: Option<PathBuf>,
    pub schema_dir: PathBuf,
}

impl GlobalOptions {
    /// Load the quality configuration, falling back to defaults when no
    /// file was given.
    pub fn load_config(&self) -> Result<QualityConfig> {
        match &self.config {
            Some(path) => QualityConfig::from_yaml_file(path)
                .with_context(|| format!("failed to load configuration {}", path.display())),
            None => Ok(QualityConfig::default()),
        }
    }

    /// A fresh pipeline instance.
    pub fn validator(&self, config: &QualityConfig) -> Validator {
        Validator::new(&self.schema_dir).with_config(config.clone())
    }
}

/// Which per-file reports to write.
#[derive(Debug, Clone, Copy, Default)]
pub struct ReportFormats {
    pub csv: bool,
    pub json: bool,
}

impl ReportFormats {
    pub fn any(&self) -> bool {
        self.csv || self.json
    }
}

/// Write the selected per-file reports into `out_dir`, creating it.
pub fn write_file_reports(result: &ValidationResult, out_dir: &Path, formats: ReportFormats) -> Result<()> {
    if !formats.any() {
        return Ok(());
    }
    std::fs::create_dir_all(out_dir)
        .with_context(|| format!("failed to create output directory {}", out_dir.display()))?;
    if formats.csv {
        sqc_report::write_csv_report(result, out_dir)?;
    }
    if formats.json {
        sqc_report::write_json_report(result, out_dir)?;
    }
    Ok(())
}

/// Print the one-line verdict for a validated file.
pub fn print_verdict(result: &ValidationResult) {
    let status = if result.is_clean() { "OK" } else { "FAIL" };
    println!("{status}: {}", result.summary_row());
}

/// Print an aborted file.
pub fn print_aborted(file: &Path, error: &CheckError) {
    println!("ERROR: {}: {error}", file.display());
}
