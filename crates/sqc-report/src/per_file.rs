//! # Per-File CSV Report
//!
//! Sectioned two-column layout, one record per line:
//!
//! ```text
//! scenario_file,<path>
//! xml_loadable,<bool>
//! xsd_valid,<bool>
//! version,<major-minor>
//! author,<author>
//! date,<DD.MM.YYYY>
//! <vehicle category>,<count>      (one row per category, then total)
//!
//! file_errors
//! missing_entity_definitions
//! <entity>
//! identical_initposition_entities
//! <entity>,<entity>,...           (one row per cluster)
//! intersecting_entities
//! <entity>,<entity>
//! missing_in
//! <entity>
//!
//! dynamic_errors
//! acceleration_errors
//! ...
//! ```
//!
//! Absent values are empty cells. Entities without a category are counted
//! under an empty label.

use std::fs::File;
use std::io::Write;
use std::path::{Path, PathBuf};

use sqc_check::ValidationResult;

use crate::error::ReportError;
use crate::report_path;

type CsvWriter<W> = csv::Writer<W>;

fn bool_cell(value: bool) -> &'static str {
    if value {
        "true"
    } else {
        "false"
    }
}

fn section<'a, W: Write>(
    wtr: &mut CsvWriter<W>,
    title: &str,
    rows: impl IntoIterator<Item = Vec<&'a str>>,
) -> Result<(), ReportError> {
    wtr.write_record([title])?;
    for row in rows {
        wtr.write_record(&row)?;
    }
    Ok(())
}

fn blank<W: Write>(wtr: &mut CsvWriter<W>) -> Result<(), ReportError> {
    wtr.write_record(std::iter::empty::<&str>())?;
    Ok(())
}

/// Render the report for one result into `writer`.
pub fn render_csv<W: Write>(result: &ValidationResult, writer: W) -> Result<(), ReportError> {
    let mut wtr = csv::WriterBuilder::new().flexible(true).from_writer(writer);

    let path = result.file_path.display().to_string();
    let version = result.schema_version.map(|v| v.to_string()).unwrap_or_default();
    wtr.write_record(["scenario_file", path.as_str()])?;
    wtr.write_record(["xml_loadable", bool_cell(result.markup_ok)])?;
    wtr.write_record(["xsd_valid", bool_cell(result.schema_ok)])?;
    wtr.write_record(["version", version.as_str()])?;
    wtr.write_record(["author", result.author.as_deref().unwrap_or_default()])?;
    wtr.write_record(["date", result.date.as_deref().unwrap_or_default()])?;

    if result.is_checked() {
        for (ty, count) in &result.entity_counts.by_type {
            let count = count.to_string();
            wtr.write_record([ty.as_deref().unwrap_or_default(), count.as_str()])?;
        }
        let total = result.entity_counts.total.to_string();
        wtr.write_record(["total", total.as_str()])?;
    }

    let structural = &result.structural_errors;
    blank(&mut wtr)?;
    wtr.write_record(["file_errors"])?;
    section(
        &mut wtr,
        "missing_entity_definitions",
        structural.missing_definitions.iter().map(|e| vec![e.as_str()]),
    )?;
    section(
        &mut wtr,
        "identical_initposition_entities",
        structural
            .duplicate_positions
            .iter()
            .map(|cluster| cluster.iter().map(String::as_str).collect::<Vec<_>>()),
    )?;
    section(
        &mut wtr,
        "intersecting_entities",
        structural
            .intersections
            .iter()
            .map(|[a, b]| vec![a.as_str(), b.as_str()]),
    )?;
    section(
        &mut wtr,
        "missing_in",
        structural.unbalanced.iter().map(|e| vec![e.as_str()]),
    )?;

    let kinematic = &result.kinematic_errors;
    blank(&mut wtr)?;
    wtr.write_record(["dynamic_errors"])?;
    let categories = [
        ("acceleration_errors", &kinematic.accel_errors),
        ("acceleration_warnings", &kinematic.accel_warnings),
        ("swimangle_errors", &kinematic.heading_errors),
        ("swimangle_warnings", &kinematic.heading_warnings),
    ];
    for (title, entities) in categories {
        section(&mut wtr, title, entities.iter().map(|e| vec![e.as_str()]))?;
    }

    wtr.flush()?;
    Ok(())
}

/// Write `<out_dir>/<scenario file name>.csv` and return its path.
pub fn write_csv_report(result: &ValidationResult, out_dir: &Path) -> Result<PathBuf, ReportError> {
    let path = report_path(out_dir, &result.file_path, "csv");
    let file = File::create(&path).map_err(|source| ReportError::Write {
        path: path.clone(),
        source,
    })?;
    render_csv(result, file)?;
    tracing::info!(report = %path.display(), "CSV report written");
    Ok(path)
}

#[cfg(test)]
mod tests {
    use super::*;
    use sqc_core::{Scenario, SchemaVersion};
    use sqc_check::EntityCounts;

    fn records(bytes: &[u8]) -> Vec<Vec<String>> {
        csv::ReaderBuilder::new()
            .has_headers(false)
            .flexible(true)
            .from_reader(bytes)
            .records()
            .map(|r| r.unwrap().iter().map(str::to_string).collect::<Vec<_>>())
            .filter(|r| r.iter().any(|c| !c.is_empty()))
            .collect()
    }

    fn row(cells: &[&str]) -> Vec<String> {
        cells.iter().map(|c| c.to_string()).collect()
    }

    fn checked_result() -> ValidationResult {
        let mut result = ValidationResult::new("/data/cut_in.xosc");
        result.markup_ok = true;
        result.schema_ok = true;
        result.schema_version = Some(SchemaVersion::new(1, 2));
        result.model = Some(Scenario::default());
        result.author = Some("tester".to_string());
        result.date = Some("05.03.2024".to_string());
        result.spec_version = Some("1.2".to_string());
        result.entity_counts = EntityCounts::tally([Some("car"), Some("car"), Some("truck")]);
        result.structural_errors.duplicate_positions =
            vec![vec!["a".to_string(), "b".to_string(), "c".to_string()]];
        result.structural_errors.intersections = vec![["ego".to_string(), "car_1".to_string()]];
        result.kinematic_errors.heading_warnings = vec!["ego".to_string()];
        result
    }

    #[test]
    fn checked_result_layout() {
        let mut out = Vec::new();
        render_csv(&checked_result(), &mut out).unwrap();
        let rows = records(&out);

        assert_eq!(rows[0], row(&["scenario_file", "/data/cut_in.xosc"]));
        assert_eq!(rows[1], row(&["xml_loadable", "true"]));
        assert_eq!(rows[3], row(&["version", "1-2"]));
        assert_eq!(rows[5], row(&["date", "05.03.2024"]));
        assert_eq!(rows[6], row(&["car", "2"]));
        assert_eq!(rows[7], row(&["truck", "1"]));
        assert_eq!(rows[8], row(&["total", "3"]));
        assert_eq!(rows[9], row(&["file_errors"]));

        let cluster = rows.iter().position(|r| r[0] == "identical_initposition_entities").unwrap();
        assert_eq!(rows[cluster + 1], row(&["a", "b", "c"]));
        let pairs = rows.iter().position(|r| r[0] == "intersecting_entities").unwrap();
        assert_eq!(rows[pairs + 1], row(&["ego", "car_1"]));
        let warnings = rows.iter().position(|r| r[0] == "swimangle_warnings").unwrap();
        assert_eq!(rows[warnings + 1], row(&["ego"]));
        assert_eq!(rows.len(), warnings + 2);
    }

    #[test]
    fn unchecked_result_has_empty_sections() {
        let result = ValidationResult::new("broken.xosc");
        let mut out = Vec::new();
        render_csv(&result, &mut out).unwrap();
        let rows = records(&out);
        assert_eq!(rows[1], vec!["xml_loadable".to_string(), "false".to_string()]);
        assert!(rows.iter().all(|r| r[0] != "total"));
        let titles: Vec<&str> = rows[6..].iter().map(|r| r[0].as_str()).collect();
        assert_eq!(
            titles,
            vec![
                "file_errors",
                "missing_entity_definitions",
                "identical_initposition_entities",
                "intersecting_entities",
                "missing_in",
                "dynamic_errors",
                "acceleration_errors",
                "acceleration_warnings",
                "swimangle_errors",
                "swimangle_warnings",
            ]
        );
    }

    #[test]
    fn write_names_file_after_scenario() {
        let dir = tempfile::tempdir().unwrap();
        let path = write_csv_report(&checked_result(), dir.path()).unwrap();
        assert_eq!(path, dir.path().join("cut_in.xosc.csv"));
        let content = std::fs::read_to_string(&path).unwrap();
        assert!(content.starts_with("scenario_file,/data/cut_in.xosc"));
    }

    #[test]
    fn missing_out_dir_is_a_write_error() {
        let dir = tempfile::tempdir().unwrap();
        let err = write_csv_report(&checked_result(), &dir.path().join("absent")).unwrap_err();
        assert!(matches!(err, ReportError::Write { .. }));
    }
}
