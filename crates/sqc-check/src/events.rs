//! # Event Classification
//!
//! Storyboard events are attributed to entity lifecycles (spawned, removed)
//! and to trajectories by an [`EventClassifier`]. The accounting and
//! kinematics code only sees [`EventKind`] values and never inspects event
//! names itself.
//!
//! [`LegacyNaming`] is the encoding used by existing scenario generators:
//!
//! | substring in event name | meaning |
//! |---|---|
//! | `Add_` | the group's actors are added |
//! | `Remove_` | the group's actors are removed (checked after `Add_`) |
//! | `Trajectory_event_` | the event's `FollowTrajectoryAction` is the actor's trajectory |
//!
//! The trajectory tag is independent of the lifecycle kind.

use sqc_core::Event;

/// Lifecycle meaning of an event.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum EventKind {
    Add,
    Remove,
    Other,
}

/// Assigns meaning to storyboard events.
pub trait EventClassifier {
    /// Lifecycle meaning of the event for every actor of its maneuver group.
    fn kind(&self, event: &Event) -> EventKind;

    /// Whether the event's trajectory actions describe the actor's motion.
    fn is_trajectory(&self, event: &Event) -> bool;
}

/// Substring naming convention for event names.
#[derive(Debug, Clone, Copy, Default)]
pub struct LegacyNaming;

impl LegacyNaming {
    pub const ADD_MARKER: &'static str = "Add_";
    pub const REMOVE_MARKER: &'static str = "Remove_";
    pub const TRAJECTORY_MARKER: &'static str = "Trajectory_event_";
}

impl EventClassifier for LegacyNaming {
    fn kind(&self, event: &Event) -> EventKind {
        if event.name.contains(Self::ADD_MARKER) {
            EventKind::Add
        } else if event.name.contains(Self::REMOVE_MARKER) {
            EventKind::Remove
        } else {
            EventKind::Other
        }
    }

    fn is_trajectory(&self, event: &Event) -> bool {
        event.name.contains(Self::TRAJECTORY_MARKER)
    }
}
