//! Error types for the schema and loader gates.

use thiserror::Error;

/// Error while preparing or running schema validation.
///
/// An invalid *document* is never a `SchemaError`; it is a verdict. These
/// variants describe a schema definition that cannot be used at all.
#[derive(Error, Debug)]
pub enum SchemaError {
    /// The schema file exists but could not be read or parsed.
    #[error("schema load error for '{schema_name}': {reason}")]
    SchemaLoadError {
        /// Schema filename.
        schema_name: String,
        /// Reason the schema could not be loaded.
        reason: String,
    },

    /// IO error reading the schema.
    #[error("io error: {0}")]
    Io(#[from] std::io::Error),
}

/// Error while building the scenario model from XML.
///
/// The pipeline turns every `LoadError` into a failed model gate.
#[derive(Error, Debug)]
pub enum LoadError {
    /// The file could not be read.
    #[error("cannot read scenario '{path}': {source}")]
    Read {
        /// Path of the scenario file.
        path: String,
        /// Underlying IO error.
        #[source]
        source: std::io::Error,
    },

    /// The text is not well-formed XML.
    #[error("malformed XML: {0}")]
    Xml(#[from] roxmltree::Error),

    /// The root element is not `OpenSCENARIO`.
    #[error("unexpected root element '{0}'")]
    UnexpectedRoot(String),

    /// A required element is absent, e.g. the document is a parameter
    /// variation file without a storyboard.
    #[error("missing required element '{element}' in '{parent}'")]
    MissingElement {
        /// Name of the missing element.
        element: String,
        /// Name of the parent element.
        parent: String,
    },

    /// A required attribute is absent or has the wrong type.
    #[error("invalid attribute '{attribute}' on '{element}': {reason}")]
    InvalidAttribute {
        /// Element carrying the attribute.
        element: String,
        /// Attribute name.
        attribute: String,
        /// What was wrong with it.
        reason: String,
    },
}
