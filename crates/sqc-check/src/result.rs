//! # Validation Result Record
//!
//! One [`ValidationResult`] per scenario file. It is created with every
//! downstream field empty and filled in by the pipeline only after the last
//! gate and both checkers succeed, so a failed gate never leaves a partially
//! populated record.

use std::fmt;
use std::path::PathBuf;

use serde::{Deserialize, Serialize};
use sqc_core::{Scenario, SchemaVersion};

/// Findings of the structural consistency checker.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct StructuralFindings {
    /// Referenced but undeclared entities, and entities with an unresolved
    /// initial speed.
    pub missing_definitions: Vec<String>,
    /// Clusters of entities spawned at the identical position.
    pub duplicate_positions: Vec<Vec<String>>,
    /// Pairs of entities whose spawn footprints overlap.
    pub intersections: Vec<[String; 2]>,
    /// Entities that break the add/remove accounting.
    pub unbalanced: Vec<String>,
}

impl StructuralFindings {
    /// Total number of reported items across all categories.
    pub fn count(&self) -> usize {
        self.missing_definitions.len()
            + self.duplicate_positions.len()
            + self.intersections.len()
            + self.unbalanced.len()
    }
}

/// Entities per kinematic category.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct KinematicFindings {
    pub accel_errors: Vec<String>,
    pub accel_warnings: Vec<String>,
    pub heading_errors: Vec<String>,
    pub heading_warnings: Vec<String>,
}

impl KinematicFindings {
    pub fn count(&self) -> usize {
        self.accel_errors.len()
            + self.accel_warnings.len()
            + self.heading_errors.len()
            + self.heading_warnings.len()
    }
}

/// Tally of declared entities by vehicle category.
///
/// `None` collects every entity without a known category. Categories appear
/// in first-seen order.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct EntityCounts {
    pub by_type: Vec<(Option<String>, usize)>,
    pub total: usize,
}

impl EntityCounts {
    pub fn tally<'a>(types: impl IntoIterator<Item = Option<&'a str>>) -> Self {
        let mut counts = Self::default();
        for ty in types {
            counts.total += 1;
            match counts.by_type.iter_mut().find(|(t, _)| t.as_deref() == ty) {
                Some((_, n)) => *n += 1,
                None => counts.by_type.push((ty.map(str::to_string), 1)),
            }
        }
        counts
    }

    pub fn get(&self, ty: Option<&str>) -> usize {
        self.by_type
            .iter()
            .find(|(t, _)| t.as_deref() == ty)
            .map_or(0, |(_, n)| *n)
    }
}

/// Outcome of validating one scenario file.
#[derive(Debug, Clone, Default, Serialize)]
pub struct ValidationResult {
    pub file_path: PathBuf,
    pub markup_ok: bool,
    pub schema_ok: bool,
    /// Revision declared in the header. Recorded even when the schema gate
    /// fails.
    pub schema_version: Option<SchemaVersion>,
    #[serde(skip)]
    pub model: Option<Scenario>,
    pub author: Option<String>,
    /// Header date as `DD.MM.YYYY`.
    pub date: Option<String>,
    /// `major.minor` of the loaded model.
    pub spec_version: Option<String>,
    pub entity_counts: EntityCounts,
    pub structural_errors: StructuralFindings,
    pub kinematic_errors: KinematicFindings,
}

impl ValidationResult {
    pub fn new(file_path: impl Into<PathBuf>) -> Self {
        Self {
            file_path: file_path.into(),
            ..Self::default()
        }
    }

    /// Whether all gates passed and the model was checked.
    pub fn is_checked(&self) -> bool {
        self.markup_ok && self.schema_ok && self.model.is_some()
    }

    /// Whether the file passed every gate without any finding.
    pub fn is_clean(&self) -> bool {
        self.is_checked()
            && self.structural_errors.count() == 0
            && self.kinematic_errors.count() == 0
    }

    pub fn summary_row(&self) -> SummaryRow {
        let checked = self.is_checked();
        SummaryRow {
            file_path: self.file_path.clone(),
            markup_ok: self.markup_ok,
            schema_ok: self.markup_ok && self.schema_ok,
            structural_errors: checked.then(|| self.structural_errors.count()),
            kinematic_errors: checked.then(|| self.kinematic_errors.count()),
        }
    }
}

/// One line of the aggregated summary. Counts are `None` when the file did
/// not reach the checkers.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SummaryRow {
    pub file_path: PathBuf,
    pub markup_ok: bool,
    pub schema_ok: bool,
    pub structural_errors: Option<usize>,
    pub kinematic_errors: Option<usize>,
}

/// Count rendering used by the summary: a number, or `-`.
pub struct CountCell(pub Option<usize>);

impl fmt::Display for CountCell {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.0 {
            Some(n) => write!(f, "{n}"),
            None => f.write_str("-"),
        }
    }
}

impl fmt::Display for SummaryRow {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{}: markup={} schema={} structural={} kinematic={}",
            self.file_path.display(),
            self.markup_ok,
            self.schema_ok,
            CountCell(self.structural_errors),
            CountCell(self.kinematic_errors),
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn tally_keeps_first_seen_order_and_total() {
        let counts = EntityCounts::tally([Some("car"), Some("truck"), Some("car"), None]);
        assert_eq!(counts.total, 4);
        assert_eq!(
            counts.by_type,
            vec![
                (Some("car".to_string()), 2),
                (Some("truck".to_string()), 1),
                (None, 1),
            ]
        );
        assert_eq!(counts.get(Some("car")), 2);
        assert_eq!(counts.get(Some("bus")), 0);
    }

    #[test]
    fn unchecked_result_has_dash_counts() {
        let mut result = ValidationResult::new("a.xosc");
        result.markup_ok = true;
        let row = result.summary_row();
        assert!(row.markup_ok);
        assert!(!row.schema_ok);
        assert_eq!(row.structural_errors, None);
        assert_eq!(row.to_string(), "a.xosc: markup=true schema=false structural=- kinematic=-");
    }

    #[test]
    fn checked_result_counts_findings() {
        let mut result = ValidationResult::new("b.xosc");
        result.markup_ok = true;
        result.schema_ok = true;
        result.model = Some(Scenario::default());
        result.structural_errors.duplicate_positions = vec![vec!["a".into(), "b".into()]];
        result.structural_errors.unbalanced = vec!["c".into()];
        result.kinematic_errors.heading_warnings = vec!["ego".into()];
        let row = result.summary_row();
        assert_eq!(row.structural_errors, Some(2));
        assert_eq!(row.kinematic_errors, Some(1));
        assert!(!result.is_clean());
    }

    #[test]
    fn model_is_not_serialized() {
        let mut result = ValidationResult::new("c.xosc");
        result.model = Some(Scenario::default());
        let json = serde_json::to_value(&result).unwrap();
        assert!(json.get("model").is_none());
        assert_eq!(json["markup_ok"], false);
    }
}
