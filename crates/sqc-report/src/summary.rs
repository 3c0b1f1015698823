//! # Aggregated Summary
//!
//! One CSV row per validated scenario:
//!
//! | column | content |
//! |---|---|
//! | `scenario_file` | path as given |
//! | `xml_loadable` | markup gate passed |
//! | `xsd_valid` | schema gate passed |
//! | `n_file_errors` | structural finding count, or `-` |
//! | `n_dynamic_errors` | kinematic finding count, or `-` |
//!
//! Counts are `-` for files that did not reach the checkers.

use std::fs::File;
use std::io::Write;
use std::path::{Path, PathBuf};

use serde::Serialize;
use sqc_check::{CountCell, SummaryRow};

use crate::error::ReportError;

/// File name of the aggregated summary inside the output directory.
pub const AGGREGATE_FILE_NAME: &str = "aggregate_data.csv";

#[derive(Serialize)]
struct AggregateRecord {
    scenario_file: String,
    xml_loadable: bool,
    xsd_valid: bool,
    n_file_errors: String,
    n_dynamic_errors: String,
}

impl From<&SummaryRow> for AggregateRecord {
    fn from(row: &SummaryRow) -> Self {
        Self {
            scenario_file: row.file_path.display().to_string(),
            xml_loadable: row.markup_ok,
            xsd_valid: row.schema_ok,
            n_file_errors: CountCell(row.structural_errors).to_string(),
            n_dynamic_errors: CountCell(row.kinematic_errors).to_string(),
        }
    }
}

/// Render the summary table with its header row.
pub fn render_summary<W: Write>(rows: &[SummaryRow], writer: W) -> Result<(), ReportError> {
    let mut wtr = csv::WriterBuilder::new().has_headers(false).from_writer(writer);
    wtr.write_record([
        "scenario_file",
        "xml_loadable",
        "xsd_valid",
        "n_file_errors",
        "n_dynamic_errors",
    ])?;
    for row in rows {
        wtr.serialize(AggregateRecord::from(row))?;
    }
    wtr.flush()?;
    Ok(())
}

/// Write `<out_dir>/aggregate_data.csv` and return its path.
pub fn write_summary(rows: &[SummaryRow], out_dir: &Path) -> Result<PathBuf, ReportError> {
    let path = out_dir.join(AGGREGATE_FILE_NAME);
    let file = File::create(&path).map_err(|source| ReportError::Write {
        path: path.clone(),
        source,
    })?;
    render_summary(rows, file)?;
    tracing::info!(report = %path.display(), rows = rows.len(), "aggregate summary written");
    Ok(path)
}
