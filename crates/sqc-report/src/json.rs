//! Per-file JSON report: the serialized [`ValidationResult`].

use std::fs::File;
use std::io::{BufWriter, Write};
use std::path::{Path, PathBuf};

use sqc_check::ValidationResult;

use crate::error::ReportError;
use crate::report_path;

/// Pretty-printed JSON of one result.
pub fn render_json<W: Write>(result: &ValidationResult, writer: W) -> Result<(), ReportError> {
    serde_json::to_writer_pretty(writer, result)?;
    Ok(())
}

/// Write `<out_dir>/<scenario file name>.json` and return its path.
pub fn write_json_report(result: &ValidationResult, out_dir: &Path) -> Result<PathBuf, ReportError> {
    let path = report_path(out_dir, &result.file_path, "json");
    let file = File::create(&path).map_err(|source| ReportError::Write {
        path: path.clone(),
        source,
    })?;
    let mut writer = BufWriter::new(file);
    render_json(result, &mut writer)?;
    writer.write_all(b"\n")?;
    writer.flush()?;
    tracing::info!(report = %path.display(), "JSON report written");
    Ok(path)
}
