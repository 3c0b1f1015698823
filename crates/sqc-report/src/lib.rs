//! # sqc-report — Validation Report Writers
//!
//! Renders [`sqc_check::ValidationResult`] records. Writers only read the
//! results they are given.
//!
//! ## Formats
//!
//! - `per_file`: one sectioned CSV per scenario: metadata, road-user
//!   counts, file errors by category, dynamic errors by category.
//! - `json`: the full result record (without the loaded model).
//! - `summary`: `aggregate_data.csv`, one row per scenario with gate
//!   outcomes and finding counts (`-` when the checks did not run).
//!
//! Output files are named after the full scenario file name, so
//! `cut_in.xosc` reports to `cut_in.xosc.csv`.

pub mod error;
pub mod json;
pub mod per_file;
pub mod summary;

use std::path::{Path, PathBuf};

pub use error::ReportError;
pub use json::{render_json, write_json_report};
pub use per_file::{render_csv, write_csv_report};
pub use summary::{render_summary, write_summary, AGGREGATE_FILE_NAME};

/// `<out_dir>/<scenario file name>.<extension>`.
pub(crate) fn report_path(out_dir: &Path, scenario: &Path, extension: &str) -> PathBuf {
    let name = scenario
        .file_name()
        .map(|s| s.to_string_lossy().into_owned())
        .unwrap_or_else(|| "scenario".to_string());
    out_dir.join(format!("{name}.{extension}"))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn report_path_keeps_file_name() {
        let path = report_path(Path::new("/out"), Path::new("/data/cut_in.xosc"), "csv");
        assert_eq!(path, PathBuf::from("/out/cut_in.xosc.csv"));
    }

    #[test]
    fn same_stem_different_extension_do_not_collide() {
        let out = Path::new("/out");
        assert_ne!(
            report_path(out, Path::new("a.xosc"), "csv"),
            report_path(out, Path::new("a.XOSC"), "csv")
        );
    }
}
