//! Error type for the quality checks and the pipeline.

use thiserror::Error;

use sqc_schema::SchemaError;

/// A fault that aborts validation of one file.
///
/// Gate failures and findings are never reported through this type.
#[derive(Error, Debug)]
pub enum CheckError {
    /// The schema definition for the declared revision is unusable.
    #[error("schema error: {0}")]
    Schema(#[from] SchemaError),

    /// The scratch copy for the model gate could not be written.
    #[error("scratch file error: {0}")]
    Scratch(#[from] std::io::Error),

    /// The loaded model contradicts the loader contract.
    #[error("malformed scenario model: {0}")]
    MalformedModel(String),
}
