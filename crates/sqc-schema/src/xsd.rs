//! # Schema Gate
//!
//! Second pipeline gate. The declared revision is read from the root's
//! first child element (the `FileHeader`), mapped to an XSD file name, and
//! the document is checked by a [`SchemaOracle`].
//!
//! ## Verdicts, Not Errors
//!
//! | situation | verdict |
//! |---|---|
//! | header or revision attributes missing / non-numeric | not valid, no version |
//! | major revision ≥ 2 | not valid, version recorded |
//! | no `OpenSCENARIO_<major>-<minor>.xsd` in the schema directory | not valid, version recorded |
//! | oracle reports violations | not valid, version recorded |
//! | oracle reports nothing | valid |
//!
//! Only a schema file that exists but cannot be parsed is an error.
//!
//! ## Default Oracle
//!
//! [`LibxmlSchemaOracle`] runs full XML Schema 1.0 validation through
//! libxml2: content models, required attributes and simple types are all
//! evaluated. libxml2 calls are serialized across threads.

use std::fmt;
use std::path::Path;

use libxml::error::StructuredError;
use libxml::parser::Parser;
use libxml::schemas::{SchemaParserContext, SchemaValidationContext};
use parking_lot::Mutex;
use roxmltree::Document;

use sqc_core::SchemaVersion;

use crate::error::SchemaError;

// ---------------------------------------------------------------------------
// Violations
// ---------------------------------------------------------------------------

/// A single schema violation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Violation {
    /// Where the violation was found, e.g. `line 12`. Empty when unknown.
    pub location: String,
    /// Human-readable description of the violation.
    pub message: String,
}

impl fmt::Display for Violation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.location.is_empty() {
            write!(f, "  (document): {}", self.message)
        } else {
            write!(f, "  {}: {}", self.location, self.message)
        }
    }
}

/// Collection of schema violations.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ValidationViolations {
    violations: Vec<Violation>,
}

impl ValidationViolations {
    pub fn new(violations: Vec<Violation>) -> Self {
        Self { violations }
    }

    pub fn len(&self) -> usize {
        self.violations.len()
    }

    pub fn is_empty(&self) -> bool {
        self.violations.is_empty()
    }

    pub fn violations(&self) -> &[Violation] {
        &self.violations
    }
}

impl fmt::Display for ValidationViolations {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for (i, v) in self.violations.iter().enumerate() {
            if i > 0 {
                writeln!(f)?;
            }
            write!(f, "{v}")?;
        }
        Ok(())
    }
}

// ---------------------------------------------------------------------------
// Oracle
// ---------------------------------------------------------------------------

/// Decides whether a parsed document conforms to a schema file.
pub trait SchemaOracle {
    /// Return the violations of `document` against the XSD at `schema_path`.
    /// An empty collection means the document is valid.
    fn violations(
        &self,
        schema_path: &Path,
        document: &Document<'_>,
    ) -> Result<ValidationViolations, SchemaError>;
}

/// XSD validation backed by libxml2.
#[derive(Debug, Default, Clone, Copy)]
pub struct LibxmlSchemaOracle;

/// libxml2 error handlers and parser globals are process-wide.
static LIBXML: Mutex<()> = parking_lot::const_mutex(());

impl SchemaOracle for LibxmlSchemaOracle {
    fn violations(
        &self,
        schema_path: &Path,
        document: &Document<'_>,
    ) -> Result<ValidationViolations, SchemaError> {
        let schema_name = schema_path
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_else(|| schema_path.display().to_string());
        let load_error = |reason: String| SchemaError::SchemaLoadError {
            schema_name: schema_name.clone(),
            reason,
        };
        let schema_file = schema_path
            .to_str()
            .ok_or_else(|| load_error("schema path is not valid UTF-8".to_string()))?;

        let _guard = LIBXML.lock();
        let mut parser = SchemaParserContext::from_file(schema_file);
        let mut context = SchemaValidationContext::from_parser(&mut parser)
            .map_err(|errors| load_error(join_messages(&errors)))?;

        let instance = match Parser::default().parse_string(document.input_text()) {
            Ok(instance) => instance,
            Err(e) => {
                return Ok(ValidationViolations::new(vec![Violation {
                    location: String::new(),
                    message: format!("document rejected by libxml2: {e:?}"),
                }]));
            }
        };

        match context.validate_document(&instance) {
            Ok(()) => Ok(ValidationViolations::default()),
            Err(errors) if errors.is_empty() => Ok(ValidationViolations::new(vec![Violation {
                location: String::new(),
                message: "document is not valid".to_string(),
            }])),
            Err(errors) => Ok(ValidationViolations::new(
                errors.iter().map(violation_from).collect(),
            )),
        }
    }
}

fn error_message(error: &StructuredError) -> String {
    error
        .message
        .as_deref()
        .map(str::trim)
        .filter(|m| !m.is_empty())
        .unwrap_or("unspecified error")
        .to_string()
}

fn join_messages(errors: &[StructuredError]) -> String {
    if errors.is_empty() {
        return "not a usable XML schema".to_string();
    }
    errors.iter().map(error_message).collect::<Vec<_>>().join("; ")
}

fn violation_from(error: &StructuredError) -> Violation {
    Violation {
        location: error.line.map(|l| format!("line {l}")).unwrap_or_default(),
        message: error_message(error),
    }
}

// ---------------------------------------------------------------------------
// Gate
// ---------------------------------------------------------------------------

/// Outcome of the schema gate.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SchemaCheck {
    pub valid: bool,
    /// Declared revision, recorded even when the document is not valid.
    pub version: Option<SchemaVersion>,
    pub violations: ValidationViolations,
}

impl SchemaCheck {
    fn invalid(version: Option<SchemaVersion>) -> Self {
        Self {
            valid: false,
            version,
            violations: ValidationViolations::default(),
        }
    }
}

/// Revision declared by the root's first child element.
pub fn declared_version(document: &Document<'_>) -> Option<SchemaVersion> {
    let header = document.root_element().first_element_child()?;
    let major = header.attribute("revMajor")?;
    let minor = header.attribute("revMinor")?;
    match SchemaVersion::parse(major, minor) {
        Ok(v) => Some(v),
        Err(e) => {
            tracing::debug!(error = %e, "header revision is not numeric");
            None
        }
    }
}

/// Run the schema gate on a parsed document.
pub fn check_schema(
    document: &Document<'_>,
    schema_dir: &Path,
    oracle: &dyn SchemaOracle,
) -> Result<SchemaCheck, SchemaError> {
    let Some(version) = declared_version(document) else {
        tracing::info!("no usable revision in file header");
        return Ok(SchemaCheck::invalid(None));
    };

    if !version.has_known_schema() {
        tracing::info!(%version, "no schema is known for this revision");
        return Ok(SchemaCheck::invalid(Some(version)));
    }

    let schema_path = version.schema_path(schema_dir);
    if !schema_path.is_file() {
        tracing::info!(schema = %schema_path.display(), "schema file not available");
        return Ok(SchemaCheck::invalid(Some(version)));
    }

    let violations = oracle.violations(&schema_path, document)?;
    if !violations.is_empty() {
        tracing::info!(%version, count = violations.len(), "document violates schema:\n{violations}");
    }
    Ok(SchemaCheck {
        valid: violations.is_empty(),
        version: Some(version),
        violations,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::markup::parse_document;

    const XSD: &str = r#"<?xml version="1.0"?>
<xsd:schema xmlns:xsd="http://www.w3.org/2001/XMLSchema">
  <xsd:element name="OpenSCENARIO" type="OpenScenario"/>
  <xsd:complexType name="OpenScenario">
    <xsd:sequence>
      <xsd:element name="FileHeader" type="FileHeader"/>
      <xsd:element name="Entities" type="Entities"/>
    </xsd:sequence>
  </xsd:complexType>
  <xsd:complexType name="FileHeader">
    <xsd:attribute name="revMajor" type="xsd:unsignedShort"/>
    <xsd:attribute name="revMinor" type="xsd:unsignedShort"/>
    <xsd:attribute name="author" type="xsd:string" use="required"/>
  </xsd:complexType>
  <xsd:complexType name="Entities"/>
</xsd:schema>"#;

    fn write_schema(dir: &Path, name: &str, content: &str) {
        std::fs::write(dir.join(name), content).unwrap();
    }

    #[test]
    fn valid_document_passes() {
        let dir = tempfile::tempdir().unwrap();
        write_schema(dir.path(), "OpenSCENARIO_1-0.xsd", XSD);
        let text = r#"<OpenSCENARIO><FileHeader revMajor="1" revMinor="0" author="a"/><Entities/></OpenSCENARIO>"#;
        let doc = parse_document(text).unwrap();
        let check = check_schema(&doc, dir.path(), &LibxmlSchemaOracle).unwrap();
        assert!(check.valid, "{}", check.violations);
        assert_eq!(check.version, Some(SchemaVersion::new(1, 0)));
    }

    #[test]
    fn undeclared_element_and_attribute_fail() {
        let dir = tempfile::tempdir().unwrap();
        write_schema(dir.path(), "OpenSCENARIO_1-0.xsd", XSD);
        let text = r#"<OpenSCENARIO><FileHeader revMajor="1" revMinor="0" author="a" colour="red"/><Bogus/></OpenSCENARIO>"#;
        let doc = parse_document(text).unwrap();
        let check = check_schema(&doc, dir.path(), &LibxmlSchemaOracle).unwrap();
        assert!(!check.valid);
        assert!(!check.violations.is_empty());
        assert!(check.violations.to_string().contains("colour"), "{}", check.violations);
    }

    #[test]
    fn missing_required_child_fails() {
        let dir = tempfile::tempdir().unwrap();
        write_schema(dir.path(), "OpenSCENARIO_1-0.xsd", XSD);
        let text = r#"<OpenSCENARIO><FileHeader revMajor="1" revMinor="0" author="a"/></OpenSCENARIO>"#;
        let doc = parse_document(text).unwrap();
        let check = check_schema(&doc, dir.path(), &LibxmlSchemaOracle).unwrap();
        assert!(!check.valid);
        assert_eq!(check.version, Some(SchemaVersion::new(1, 0)));
        assert!(check.violations.to_string().contains("Entities"), "{}", check.violations);
    }

    #[test]
    fn missing_required_attribute_fails() {
        let dir = tempfile::tempdir().unwrap();
        write_schema(dir.path(), "OpenSCENARIO_1-0.xsd", XSD);
        let text = r#"<OpenSCENARIO><FileHeader revMajor="1" revMinor="0"/><Entities/></OpenSCENARIO>"#;
        let doc = parse_document(text).unwrap();
        let check = check_schema(&doc, dir.path(), &LibxmlSchemaOracle).unwrap();
        assert!(!check.valid);
        assert!(check.violations.to_string().contains("author"), "{}", check.violations);
    }

    #[test]
    fn mistyped_attribute_fails() {
        let dir = tempfile::tempdir().unwrap();
        write_schema(dir.path(), "OpenSCENARIO_1-0.xsd", XSD);
        let text = r#"<OpenSCENARIO><FileHeader revMajor="one" revMinor="0" author="a"/><Entities/></OpenSCENARIO>"#;
        let doc = parse_document(text).unwrap();
        let check = check_schema(&doc, dir.path(), &LibxmlSchemaOracle).unwrap();
        assert!(!check.valid);
    }

    #[test]
    fn undeclared_root_fails() {
        let dir = tempfile::tempdir().unwrap();
        write_schema(dir.path(), "OpenSCENARIO_1-0.xsd", XSD);
        let text = r#"<FileHeader revMajor="1" revMinor="0"><FileHeader revMajor="1" revMinor="0"/></FileHeader>"#;
        let doc = parse_document(text).unwrap();
        let check = check_schema(&doc, dir.path(), &LibxmlSchemaOracle).unwrap();
        assert!(!check.valid);
        assert!(!check.violations.is_empty());
    }

    #[test]
    fn major_two_is_not_valid_but_recorded() {
        let dir = tempfile::tempdir().unwrap();
        let text = r#"<OpenSCENARIO><FileHeader revMajor="2" revMinor="0"/></OpenSCENARIO>"#;
        let doc = parse_document(text).unwrap();
        let check = check_schema(&doc, dir.path(), &LibxmlSchemaOracle).unwrap();
        assert!(!check.valid);
        assert_eq!(check.version, Some(SchemaVersion::new(2, 0)));
    }

    #[test]
    fn missing_schema_file_is_not_valid_but_recorded() {
        let dir = tempfile::tempdir().unwrap();
        let text = r#"<OpenSCENARIO><FileHeader revMajor="1" revMinor="3"/></OpenSCENARIO>"#;
        let doc = parse_document(text).unwrap();
        let check = check_schema(&doc, dir.path(), &LibxmlSchemaOracle).unwrap();
        assert!(!check.valid);
        assert_eq!(check.version, Some(SchemaVersion::new(1, 3)));
    }

    #[test]
    fn missing_revision_has_no_version() {
        let dir = tempfile::tempdir().unwrap();
        let doc = parse_document("<OpenSCENARIO><FileHeader author=\"x\"/></OpenSCENARIO>").unwrap();
        let check = check_schema(&doc, dir.path(), &LibxmlSchemaOracle).unwrap();
        assert!(!check.valid);
        assert_eq!(check.version, None);
    }

    #[test]
    fn unparseable_schema_is_an_error() {
        let dir = tempfile::tempdir().unwrap();
        write_schema(dir.path(), "OpenSCENARIO_1-1.xsd", "<xsd:schema");
        let text = r#"<OpenSCENARIO><FileHeader revMajor="1" revMinor="1"/></OpenSCENARIO>"#;
        let doc = parse_document(text).unwrap();
        let err = check_schema(&doc, dir.path(), &LibxmlSchemaOracle).unwrap_err();
        assert!(matches!(err, SchemaError::SchemaLoadError { .. }));
    }

    #[test]
    fn violation_display_format() {
        let v = Violation {
            location: "line 3".to_string(),
            message: "Element 'Bogus': This element is not expected.".to_string(),
        };
        assert_eq!(v.to_string(), "  line 3: Element 'Bogus': This element is not expected.");
        let whole = Violation { location: String::new(), message: "x".to_string() };
        assert!(whole.to_string().contains("(document)"));
    }
}
