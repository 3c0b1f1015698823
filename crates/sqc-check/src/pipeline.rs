//! # Validation Pipeline
//!
//! Runs the three gates on one scenario file and, when all pass, both
//! checkers on the loaded model.
//!
//! ## Gates
//!
//! | gate | passes when | on failure |
//! |---|---|---|
//! | markup | the file is readable and well-formed XML | `markup_ok = false` |
//! | schema | the declared revision has a schema and the document conforms | `schema_ok = false`, version kept |
//! | model | the parameter-substituted copy loads | `model = None` |
//!
//! Gate failures end validation with `Ok(result)`. Only environment faults
//! and models that contradict the loader contract return `Err`.
//!
//! The substituted copy is written to a scratch `.xosc` file that is removed
//! when it goes out of scope, on every exit path.

use std::io::Write;
use std::path::{Path, PathBuf};

use sqc_core::{format_header_date, QualityConfig, Scenario, ScenarioView, SchemaVersion};
use sqc_schema::{
    check_schema, collect_parameters, parse_document, read_text, substitute_parameters,
    LibxmlSchemaOracle, ModelLoader, SchemaOracle, XoscLoader,
};

use crate::error::CheckError;
use crate::events::{EventClassifier, LegacyNaming};
use crate::kinematics::check_kinematics;
use crate::result::{EntityCounts, ValidationResult};
use crate::structural;

/// One validation pipeline instance.
///
/// Instances hold no per-file state; create one per worker when validating
/// files in parallel.
pub struct Validator {
    schema_dir: PathBuf,
    config: QualityConfig,
    oracle: Box<dyn SchemaOracle>,
    loader: Box<dyn ModelLoader>,
    classifier: Box<dyn EventClassifier>,
}

impl std::fmt::Debug for Validator {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Validator")
            .field("schema_dir", &self.schema_dir)
            .field("config", &self.config)
            .finish_non_exhaustive()
    }
}

impl Validator {
    /// Pipeline with the default configuration, the libxml2 schema
    /// oracle, the XML loader and legacy event naming.
    pub fn new(schema_dir: impl Into<PathBuf>) -> Self {
        Self {
            schema_dir: schema_dir.into(),
            config: QualityConfig::default(),
            oracle: Box::new(LibxmlSchemaOracle),
            loader: Box::new(XoscLoader),
            classifier: Box::new(LegacyNaming),
        }
    }

    pub fn with_config(mut self, config: QualityConfig) -> Self {
        self.config = config;
        self
    }

    pub fn with_oracle(mut self, oracle: impl SchemaOracle + 'static) -> Self {
        self.oracle = Box::new(oracle);
        self
    }

    pub fn with_loader(mut self, loader: impl ModelLoader + 'static) -> Self {
        self.loader = Box::new(loader);
        self
    }

    pub fn with_classifier(mut self, classifier: impl EventClassifier + 'static) -> Self {
        self.classifier = Box::new(classifier);
        self
    }

    pub fn config(&self) -> &QualityConfig {
        &self.config
    }

    pub fn schema_dir(&self) -> &Path {
        &self.schema_dir
    }

    /// Validate one scenario file.
    pub fn validate(&self, file: &Path) -> Result<ValidationResult, CheckError> {
        let mut result = ValidationResult::new(file);

        // Markup
        let Some(text) = read_text(file) else {
            tracing::info!(file = %file.display(), "markup gate failed: file not readable");
            return Ok(result);
        };
        let document = match parse_document(&text) {
            Ok(document) => document,
            Err(e) => {
                tracing::info!(file = %file.display(), error = %e, "markup gate failed");
                return Ok(result);
            }
        };
        result.markup_ok = true;

        // Schema
        let schema = check_schema(&document, &self.schema_dir, self.oracle.as_ref())?;
        result.schema_version = schema.version;
        if !schema.valid {
            tracing::info!(file = %file.display(), version = ?schema.version, "schema gate failed");
            return Ok(result);
        }
        result.schema_ok = true;

        // Model
        let params = collect_parameters(&document);
        tracing::debug!(count = params.len(), "substituting file-level parameters");
        let substituted = substitute_parameters(&text, &params);
        let Some(model) = self.load_scratch(&substituted)? else {
            tracing::info!(file = %file.display(), "model gate failed");
            return Ok(result);
        };

        // Checks
        let structure = structural::check(&model, &self.config, self.classifier.as_ref())?;
        let kinematics = check_kinematics(&model, &self.config, self.classifier.as_ref())?;

        let header = model.header();
        result.author = header.author.clone();
        result.date = header.date.as_deref().and_then(|raw| match format_header_date(raw) {
            Ok(date) => Some(date),
            Err(e) => {
                tracing::warn!(file = %file.display(), error = %e, "ignoring unparseable header date");
                None
            }
        });
        result.spec_version = Some(SchemaVersion::new(header.rev_major, header.rev_minor).dotted());
        result.entity_counts =
            EntityCounts::tally(structure.entities.iter().map(|(_, ty)| ty.as_deref()));
        result.structural_errors = structure.findings;
        result.kinematic_errors = kinematics;
        result.model = Some(model);

        tracing::info!(
            file = %file.display(),
            entities = result.entity_counts.total,
            structural = result.structural_errors.count(),
            kinematic = result.kinematic_errors.count(),
            "scenario checked"
        );
        Ok(result)
    }

    /// Load the substituted text through a scratch file. `None` when the
    /// loader rejects it.
    fn load_scratch(&self, content: &str) -> Result<Option<Scenario>, CheckError> {
        let mut scratch = tempfile::Builder::new()
            .prefix("sqc-")
            .suffix(".xosc")
            .tempfile()?;
        scratch.write_all(content.as_bytes())?;
        scratch.flush()?;

        match self.loader.load(scratch.path()) {
            Ok(model) => Ok(Some(model)),
            Err(e) => {
                tracing::debug!(error = %e, "scenario model not loadable");
                Ok(None)
            }
        }
    }
}

/// Validate one file with the default pipeline.
pub fn validate(file: &Path, schema_dir: &Path) -> Result<ValidationResult, CheckError> {
    Validator::new(schema_dir).validate(file)
}
