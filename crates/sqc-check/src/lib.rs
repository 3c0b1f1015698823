//! # sqc-check — Scenario Quality Checks
//!
//! The validation pipeline and the two checkers it runs on a loaded model.
//!
//! ## Pipeline (`pipeline`)
//!
//! [`Validator::validate`] runs three gates in order and stops at the first
//! one that fails:
//!
//! 1. markup: the file is well-formed XML,
//! 2. schema: the document conforms to the XSD of its declared revision,
//! 3. model: the parameter-substituted document loads as a scenario.
//!
//! When all gates pass, the structural and kinematic checks run and the
//! [`ValidationResult`] is completed. A failed gate is a result, not an
//! error.
//!
//! ## Structural Checks (`structural`)
//!
//! Missing entity definitions, identical spawn positions, overlapping spawn
//! footprints (`geometry`), and add/remove accounting (`events`).
//!
//! ## Kinematic Checks (`kinematics`)
//!
//! Finite-difference speed, acceleration and swim angle per trajectory,
//! classified against the configured thresholds.
//!
//! ## Crate Policy
//!
//! - Checkers read the model only through [`sqc_core::ScenarioView`].
//! - Findings are data. `CheckError` is reserved for model structure that
//!   contradicts the loader contract and for environment faults.

pub mod error;
pub mod events;
pub mod geometry;
pub mod kinematics;
pub mod pipeline;
pub mod result;
pub mod structural;

pub use error::CheckError;
pub use events::{EventClassifier, EventKind, LegacyNaming};
pub use geometry::{intersecting_pairs, Footprint, Point};
pub use kinematics::{
    check_kinematics, classify, classify_values, collect_trajectories, derive, KinematicCategory,
    KinematicSeries, Severity,
};
pub use pipeline::{validate, Validator};
pub use result::{
    CountCell, EntityCounts, KinematicFindings, StructuralFindings, SummaryRow, ValidationResult,
};
pub use structural::{check as check_structure, InitPosition, StructuralReport};
