//! # sqc-core — Foundational Types for the Scenario Quality Checker
//!
//! This crate defines the vocabulary shared by every other crate in the
//! workspace. It depends on nothing internal.
//!
//! ## Key Design Principles
//!
//! 1. **Narrow model access.** The checkers never walk the scenario tree
//!    directly. They read it through [`ScenarioView`], which exposes entities,
//!    init actions per entity, and the flattened maneuver groups. Tests build
//!    [`Scenario`] values by hand instead of parsing XML.
//!
//! 2. **Explicit configuration.** Error/warning thresholds and intersection
//!    options live in an immutable [`QualityConfig`] that is passed into the
//!    checkers. There is no process-wide mutable state.
//!
//! 3. **Degrade, don't fail.** Optional model data (bounding boxes, world
//!    positions, header dates) is represented with `Option` or sentinel enum
//!    variants so that checks can skip it instead of raising.
//!
//! ## Crate Policy
//!
//! - No dependencies on other `sqc-*` crates (this is the leaf of the DAG).
//! - No `unsafe` code.
//! - No `panic!()` or `.unwrap()` outside tests.

pub mod config;
pub mod error;
pub mod model;
pub mod temporal;
pub mod version;

pub use config::{IntersectionOptions, QualityConfig, Thresholds};
pub use error::QualityError;
pub use model::{
    ActionKind, BoundingBox, EntityDecl, EntityObject, Event, EventAction, FileHeader,
    InitAction, Maneuver, ManeuverGroup, Position, PrivateInit, Scenario, ScenarioView,
    SpeedValue, Storyboard, Story, Act, TrajectorySample, PLACEHOLDER_MARKER,
};
pub use temporal::format_header_date;
pub use version::SchemaVersion;
