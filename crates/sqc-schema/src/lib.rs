//! # sqc-schema — Markup, Schema & Model Gates
//!
//! Everything the validation pipeline needs before the quality checks can
//! run on a loaded model.
//!
//! ## Markup (`markup`)
//!
//! Well-formedness of the raw file. DTDs are accepted but not expanded.
//!
//! ## Schema (`xsd`)
//!
//! Reads `revMajor`/`revMinor` from the header, resolves
//! `OpenSCENARIO_<major>-<minor>.xsd` under the schema directory, and asks a
//! [`SchemaOracle`] for violations. The default [`LibxmlSchemaOracle`]
//! validates against the full schema with libxml2. Revisions with major ≥ 2
//! and missing schema files are reported as "not valid", never as errors.
//!
//! ## Parameters (`params`)
//!
//! Substitutes `$name` references of parameters declared outside the
//! storyboard into the raw text.
//!
//! ## Loader (`loader`)
//!
//! Builds an [`sqc_core::Scenario`] from substituted XML.
//!
//! ## Crate Policy
//!
//! - Depends only on `sqc-core` internally.
//! - A document that fails a gate is data, not an error. Errors are reserved
//!   for broken environments (unreadable schema definitions).

pub mod error;
pub mod loader;
pub mod markup;
pub mod params;
pub mod xsd;

pub use error::{LoadError, SchemaError};
pub use loader::{parse_scenario, ModelLoader, XoscLoader};
pub use markup::{parse_document, read_text};
pub use params::{collect_parameters, substitute_parameters, ParameterDeclaration};
pub use xsd::{
    check_schema, declared_version, LibxmlSchemaOracle, SchemaCheck, SchemaOracle,
    ValidationViolations, Violation,
};
