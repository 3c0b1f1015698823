//! # Kinematics Derivation & Classification
//!
//! Turns the timed polyline of a followed trajectory into finite-difference
//! series and classifies them against [`Thresholds`].
//!
//! ## Series
//!
//! For `n` samples with `dt[i] = t[i+1] - t[i]`:
//!
//! | series | length | definition |
//! |---|---|---|
//! | speed | n-1 | `hypot(dx[i], dy[i]) / dt[i]` |
//! | acceleration | n-2 | `(speed[i+1] - speed[i]) / dt[i]` |
//! | movement angle | n-1 | `atan2(dy[i], dx[i])` mapped into `[0, 2π)` |
//! | swim angle | n-1 | `heading[i] - movement[i]`, not wrapped |
//!
//! Non-finite values follow IEEE arithmetic. A zero time step produces an
//! infinite speed, which classifies as an error; `NaN` never exceeds a
//! threshold.
//!
//! ## Classification
//!
//! Error if any absolute value exceeds the error limit, else warning if any
//! exceeds the warning limit, else clean. Ego and non-ego entities use the
//! same limits.

use std::f64::consts::TAU;

use serde::{Deserialize, Serialize};
use sqc_core::{ActionKind, QualityConfig, ScenarioView, Thresholds, TrajectorySample};

use crate::error::CheckError;
use crate::events::EventClassifier;
use crate::result::KinematicFindings;

/// Finite-difference series of one trajectory.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct KinematicSeries {
    pub speed: Vec<f64>,
    pub acceleration: Vec<f64>,
    pub movement_angle: Vec<f64>,
    pub swim_angle: Vec<f64>,
}

/// Derive speed, acceleration, movement and swim angle series.
///
/// Fewer than two samples yield empty series.
pub fn derive(samples: &[TrajectorySample]) -> KinematicSeries {
    if samples.len() < 2 {
        return KinematicSeries::default();
    }

    let mut series = KinematicSeries::default();
    let mut dts = Vec::with_capacity(samples.len() - 1);
    for pair in samples.windows(2) {
        let (a, b) = (pair[0], pair[1]);
        let dt = b.time - a.time;
        let dx = b.x - a.x;
        let dy = b.y - a.y;
        dts.push(dt);
        series.speed.push(dx.hypot(dy) / dt);
        let movement = dy.atan2(dx).rem_euclid(TAU);
        series.movement_angle.push(movement);
        series.swim_angle.push(a.heading - movement);
    }
    series.acceleration = series
        .speed
        .windows(2)
        .zip(&dts)
        .map(|(v, dt)| (v[1] - v[0]) / dt)
        .collect();
    series
}

// ---------------------------------------------------------------------------
// Classification
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum Severity {
    Clean,
    Warning,
    Error,
}

/// Classify one series against an error and a warning limit.
pub fn classify_values(values: &[f64], error: f64, warning: f64) -> Severity {
    if values.iter().any(|v| v.abs() > error) {
        Severity::Error
    } else if values.iter().any(|v| v.abs() > warning) {
        Severity::Warning
    } else {
        Severity::Clean
    }
}

/// Severity of the two checked series of one entity.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct KinematicCategory {
    pub acceleration: Severity,
    pub heading: Severity,
}

/// Classify derived series. `is_ego` only affects logging.
pub fn classify(series: &KinematicSeries, thresholds: &Thresholds, is_ego: bool) -> KinematicCategory {
    let category = KinematicCategory {
        acceleration: classify_values(
            &series.acceleration,
            thresholds.acceleration_error,
            thresholds.acceleration_warning,
        ),
        heading: classify_values(
            &series.swim_angle,
            thresholds.heading_error,
            thresholds.heading_warning,
        ),
    };
    tracing::trace!(
        is_ego,
        acceleration = ?category.acceleration,
        heading = ?category.heading,
        samples = series.speed.len() + 1,
        "classified trajectory"
    );
    category
}

// ---------------------------------------------------------------------------
// Scenario-level check
// ---------------------------------------------------------------------------

/// Trajectories per actor in first-seen order.
///
/// Each trajectory event contributes its last `FollowTrajectory` action for
/// the first actor of its maneuver group. A later trajectory for the same
/// actor replaces the earlier one.
pub fn collect_trajectories(
    view: &dyn ScenarioView,
    classifier: &dyn EventClassifier,
) -> Result<Vec<(String, Vec<TrajectorySample>)>, CheckError> {
    let mut trajectories: Vec<(String, Vec<TrajectorySample>)> = Vec::new();

    for group in view.maneuver_groups() {
        for event in group.events().filter(|e| classifier.is_trajectory(e)) {
            let Some(actor) = group.actors.first() else {
                return Err(CheckError::MalformedModel(format!(
                    "trajectory event '{}' in maneuver group '{}' has no actor",
                    event.name, group.name
                )));
            };
            let samples = event.actions.iter().rev().find_map(|action| match &action.kind {
                ActionKind::FollowTrajectory(samples) => Some(samples),
                ActionKind::Other(_) => None,
            });
            let Some(samples) = samples else {
                tracing::debug!(event = %event.name, "trajectory event without a followed trajectory");
                continue;
            };

            match trajectories.iter_mut().find(|(name, _)| name == actor) {
                Some((_, existing)) => *existing = samples.clone(),
                None => trajectories.push((actor.clone(), samples.clone())),
            }
        }
    }
    Ok(trajectories)
}

/// Derive and classify every trajectory of the scenario.
pub fn check_kinematics(
    view: &dyn ScenarioView,
    config: &QualityConfig,
    classifier: &dyn EventClassifier,
) -> Result<KinematicFindings, CheckError> {
    let mut findings = KinematicFindings::default();

    for (entity, samples) in collect_trajectories(view, classifier)? {
        let is_ego = config.is_ego(&entity);
        let series = derive(&samples);
        let category = classify(&series, &config.thresholds, is_ego);

        match category.acceleration {
            Severity::Error => findings.accel_errors.push(entity.clone()),
            Severity::Warning => findings.accel_warnings.push(entity.clone()),
            Severity::Clean => {}
        }
        match category.heading {
            Severity::Error => findings.heading_errors.push(entity.clone()),
            Severity::Warning => findings.heading_warnings.push(entity.clone()),
            Severity::Clean => {}
        }
        tracing::debug!(
            entity = %entity,
            is_ego,
            samples = samples.len(),
            acceleration = ?category.acceleration,
            heading = ?category.heading,
            "kinematic classification"
        );
    }
    Ok(findings)
}
