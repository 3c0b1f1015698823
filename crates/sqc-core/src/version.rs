//! # Schema Versions
//!
//! The `(revMajor, revMinor)` pair declared in a scenario header and the
//! naming convention that maps it to an XSD file:
//! `OpenSCENARIO_<major>-<minor>.xsd`.

use std::fmt;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use crate::error::QualityError;

/// Major revisions from this value on have no XSD definition.
pub const FIRST_UNSUPPORTED_MAJOR: u32 = 2;

/// A declared schema revision.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct SchemaVersion {
    pub major: u32,
    pub minor: u32,
}

impl SchemaVersion {
    pub fn new(major: u32, minor: u32) -> Self {
        Self { major, minor }
    }

    /// Parse the decimal `revMajor` / `revMinor` attribute strings.
    pub fn parse(major: &str, minor: &str) -> Result<Self, QualityError> {
        let parse = |s: &str| {
            s.trim()
                .parse::<u32>()
                .map_err(|_| QualityError::InvalidVersion(s.to_string()))
        };
        Ok(Self::new(parse(major)?, parse(minor)?))
    }

    /// Whether an XSD definition can exist for this revision at all.
    pub fn has_known_schema(&self) -> bool {
        self.major < FIRST_UNSUPPORTED_MAJOR
    }

    /// `OpenSCENARIO_1-2.xsd` style file name.
    pub fn schema_file_name(&self) -> String {
        format!("OpenSCENARIO_{}-{}.xsd", self.major, self.minor)
    }

    /// Location of the XSD for this revision under `schema_dir`.
    pub fn schema_path(&self, schema_dir: &Path) -> PathBuf {
        schema_dir.join(self.schema_file_name())
    }

    /// Dotted form used for display in reports, e.g. `1.2`.
    pub fn dotted(&self) -> String {
        format!("{}.{}", self.major, self.minor)
    }
}

/// Formats as `<major>-<minor>`, matching the schema file suffix.
impl fmt::Display for SchemaVersion {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}-{}", self.major, self.minor)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parse_decimal_strings() {
        let v = SchemaVersion::parse("1", " 2 ").unwrap();
        assert_eq!(v, SchemaVersion::new(1, 2));
        assert_eq!(v.to_string(), "1-2");
        assert_eq!(v.dotted(), "1.2");
    }

    #[test]
    fn parse_rejects_non_numeric() {
        assert!(matches!(
            SchemaVersion::parse("one", "0"),
            Err(QualityError::InvalidVersion(_))
        ));
        assert!(SchemaVersion::parse("1", "-1").is_err());
    }

    #[test]
    fn schema_file_convention() {
        let v = SchemaVersion::new(1, 0);
        assert_eq!(v.schema_file_name(), "OpenSCENARIO_1-0.xsd");
        assert_eq!(
            v.schema_path(Path::new("schemas")),
            PathBuf::from("schemas/OpenSCENARIO_1-0.xsd")
        );
    }

    #[test]
    fn only_major_one_and_below_have_schemas() {
        assert!(SchemaVersion::new(0, 9).has_known_schema());
        assert!(SchemaVersion::new(1, 3).has_known_schema());
        assert!(!SchemaVersion::new(2, 0).has_known_schema());
    }
}
