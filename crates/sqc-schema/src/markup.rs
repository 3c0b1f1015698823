//! # Markup Gate
//!
//! First pipeline gate: the file must be readable UTF-8 text that parses as
//! well-formed XML.

use std::path::Path;

use roxmltree::{Document, ParsingOptions};

/// Parse XML text, accepting (but not expanding) a DOCTYPE declaration.
pub fn parse_document(text: &str) -> Result<Document<'_>, roxmltree::Error> {
    let opts = ParsingOptions {
        allow_dtd: true,
        ..ParsingOptions::default()
    };
    Document::parse_with_options(text, opts)
}

/// Read a scenario file as text.
///
/// Unreadable or non-UTF-8 files yield `None`; the reason is logged at
/// debug level. Well-formedness is checked separately by [`parse_document`].
pub fn read_text(path: &Path) -> Option<String> {
    match std::fs::read_to_string(path) {
        Ok(text) => Some(text),
        Err(e) => {
            tracing::debug!(path = %path.display(), error = %e, "scenario file not readable");
            None
        }
    }
}
