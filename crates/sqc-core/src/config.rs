//! # Check Configuration
//!
//! Immutable configuration consumed by the structural checker and the
//! kinematics classifier. Every field has a default so an empty YAML
//! document, or no document at all, yields the standard rule set:
//!
//! | setting | default |
//! |---|---|
//! | acceleration error | 19.6 m/s² (2 g) |
//! | acceleration warning | 9.8 m/s² (1 g) |
//! | heading deviation error | 0.2 rad |
//! | heading deviation warning | 0.1 rad |
//! | intersection prefilter | enabled |
//! | intersection noise floor | 1e-6 m |
//! | parked speed | 1e-6 m/s |
//! | ego marker | `ego` |

use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::error::QualityError;

/// Standard gravity, used to express the acceleration limits.
pub const GRAVITY: f64 = 9.8;

/// Error/warning limits for the kinematic classification.
///
/// A series is classified as an error when any absolute sample exceeds
/// the error limit; otherwise as a warning when any exceeds the warning
/// limit.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct Thresholds {
    /// Acceleration error limit in m/s².
    pub acceleration_error: f64,
    /// Acceleration warning limit in m/s².
    pub acceleration_warning: f64,
    /// Heading deviation (swim angle) error limit in radians.
    pub heading_error: f64,
    /// Heading deviation (swim angle) warning limit in radians.
    pub heading_warning: f64,
}

impl Default for Thresholds {
    fn default() -> Self {
        Self {
            acceleration_error: 2.0 * GRAVITY,
            acceleration_warning: GRAVITY,
            heading_error: 0.2,
            heading_warning: 0.1,
        }
    }
}

impl Thresholds {
    /// Reject negative or NaN limits and warning limits above error limits.
    pub fn validate(&self) -> Result<(), QualityError> {
        let pairs = [
            ("acceleration", self.acceleration_warning, self.acceleration_error),
            ("heading", self.heading_warning, self.heading_error),
        ];
        for (name, warning, error) in pairs {
            if !(warning >= 0.0 && error >= 0.0) {
                return Err(QualityError::InvalidConfig(format!(
                    "{name} thresholds must be non-negative numbers"
                )));
            }
            if warning > error {
                return Err(QualityError::InvalidConfig(format!(
                    "{name} warning threshold {warning} exceeds error threshold {error}"
                )));
            }
        }
        Ok(())
    }
}

/// Options for the spawn-time footprint intersection check.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct IntersectionOptions {
    /// Skip the exact polygon test for pairs whose centers are farther
    /// apart than twice the largest footprint radius.
    pub prefilter: bool,
    /// Center distances at or below this value are treated as identical
    /// positions and left to the duplicate-position check.
    pub noise_floor: f64,
}

impl Default for IntersectionOptions {
    fn default() -> Self {
        Self {
            prefilter: true,
            noise_floor: 1e-6,
        }
    }
}

/// Complete configuration for one validation run.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct QualityConfig {
    /// Kinematic classification limits.
    pub thresholds: Thresholds,
    /// Footprint intersection options.
    pub intersection: IntersectionOptions,
    /// Initial absolute speeds below this value mark an entity as parked.
    pub parked_speed: f64,
    /// Entity names containing this marker are ego entities.
    pub ego_marker: String,
}

impl Default for QualityConfig {
    fn default() -> Self {
        Self {
            thresholds: Thresholds::default(),
            intersection: IntersectionOptions::default(),
            parked_speed: 1e-6,
            ego_marker: "ego".to_string(),
        }
    }
}

impl QualityConfig {
    /// Parse a configuration from a YAML document and validate it.
    pub fn from_yaml_str(content: &str) -> Result<Self, QualityError> {
        // An empty document deserializes to null; treat it as all defaults.
        if content.trim().is_empty() {
            return Ok(Self::default());
        }
        let config: Self = serde_yaml::from_str(content)?;
        config.validate()?;
        Ok(config)
    }

    /// Load a configuration file.
    pub fn from_yaml_file(path: &Path) -> Result<Self, QualityError> {
        let content = std::fs::read_to_string(path)?;
        Self::from_yaml_str(&content)
    }

    /// Check internal consistency of all sections.
    pub fn validate(&self) -> Result<(), QualityError> {
        self.thresholds.validate()?;
        if !(self.intersection.noise_floor >= 0.0) {
            return Err(QualityError::InvalidConfig(
                "intersection noise floor must be non-negative".to_string(),
            ));
        }
        if self.ego_marker.is_empty() {
            return Err(QualityError::InvalidConfig(
                "ego marker must not be empty".to_string(),
            ));
        }
        Ok(())
    }

    /// Whether an entity name denotes an ego entity.
    pub fn is_ego(&self, entity: &str) -> bool {
        entity.contains(&self.ego_marker)
    }
}
