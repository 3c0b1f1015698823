//! # Error Types
//!
//! Errors raised by the foundational layer. All errors use `thiserror`
//! for derive-based `Display` and `Error` implementations.
//!
//! ## Design
//!
//! - Gate failures of the validation pipeline are NOT errors; they are
//!   recorded as result fields by `sqc-check`.
//! - The variants here cover configuration loading and header value
//!   parsing, which callers may choose to degrade.

use thiserror::Error;

/// Top-level error type for the foundational crate.
#[derive(Error, Debug)]
pub enum QualityError {
    /// A configuration value is out of range or inconsistent.
    #[error("invalid configuration: {0}")]
    InvalidConfig(String),

    /// The configuration document could not be parsed.
    #[error("configuration parse error: {0}")]
    ConfigParse(#[from] serde_yaml::Error),

    /// A header date could not be interpreted as ISO-8601.
    #[error("invalid header date {value:?}: {reason}")]
    InvalidDate {
        /// The raw header value.
        value: String,
        /// Why parsing failed.
        reason: String,
    },

    /// A revision attribute was not a decimal number.
    #[error("invalid revision number {0:?}")]
    InvalidVersion(String),

    /// IO error.
    #[error("io error: {0}")]
    Io(#[from] std::io::Error),
}
