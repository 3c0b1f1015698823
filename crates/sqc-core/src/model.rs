//! # Scenario Model
//!
//! A read-only representation of a loaded scenario: header, declared
//! entities, init actions, and the storyboard hierarchy
//! (stories → acts → maneuver groups → maneuvers → events).
//!
//! The checkers read the model only through [`ScenarioView`]. The concrete
//! [`Scenario`] struct is what the XML loader in `sqc-schema` produces and
//! what tests construct directly.

use serde::{Deserialize, Serialize};

/// Marker that prefixes unresolved parameter references (`$speed`).
pub const PLACEHOLDER_MARKER: char = '$';

// ---------------------------------------------------------------------------
// Header & Entities
// ---------------------------------------------------------------------------

/// The `FileHeader` element.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct FileHeader {
    pub rev_major: u32,
    pub rev_minor: u32,
    pub author: Option<String>,
    /// Raw ISO-8601 date as written in the file.
    pub date: Option<String>,
    pub description: Option<String>,
}

/// Declared physical dimensions of an entity.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct BoundingBox {
    /// Extent along the entity's longitudinal axis, in meters.
    pub length: f64,
    /// Extent along the entity's lateral axis, in meters.
    pub width: f64,
    pub height: f64,
}

/// The object behind a `ScenarioObject` declaration.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum EntityObject {
    Vehicle {
        /// `vehicleCategory` attribute, e.g. `car` or `truck`.
        category: String,
        bounding_box: Option<BoundingBox>,
    },
    Pedestrian {
        bounding_box: Option<BoundingBox>,
    },
    MiscObject {
        bounding_box: Option<BoundingBox>,
    },
    /// Defined in an external catalog; no geometry or type available.
    CatalogReference { catalog: String, entry: String },
    /// Any other object kind (e.g. an `ExternalObjectReference`).
    Other(String),
}

impl EntityObject {
    /// Vehicle category, available only for inline vehicle definitions.
    pub fn vehicle_type(&self) -> Option<&str> {
        match self {
            EntityObject::Vehicle { category, .. } => Some(category),
            _ => None,
        }
    }

    /// Declared bounding box, if the object carries one.
    pub fn bounding_box(&self) -> Option<BoundingBox> {
        match self {
            EntityObject::Vehicle { bounding_box, .. }
            | EntityObject::Pedestrian { bounding_box }
            | EntityObject::MiscObject { bounding_box } => *bounding_box,
            EntityObject::CatalogReference { .. } | EntityObject::Other(_) => None,
        }
    }
}

/// A `ScenarioObject` declaration.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EntityDecl {
    pub name: String,
    pub object: EntityObject,
}

// ---------------------------------------------------------------------------
// Init Actions
// ---------------------------------------------------------------------------

/// Target of a teleport action.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum Position {
    /// Absolute world coordinates.
    World { x: f64, y: f64, z: f64, h: f64 },
    /// Any position that is not expressed in world coordinates (lane, road,
    /// relative positions). Carries the element name.
    Other(String),
}

/// Value of an absolute speed target.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum SpeedValue {
    Numeric(f64),
    /// The raw text could not be read as a number, typically an unresolved
    /// `$parameter` reference.
    Unresolved(String),
}

/// A private init action relevant to the quality checks.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum InitAction {
    Teleport(Position),
    AbsoluteSpeed(SpeedValue),
    /// Any other private action. Carries the element name.
    Other(String),
}

/// The `Private` block of the init section for one entity.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PrivateInit {
    pub entity_ref: String,
    pub actions: Vec<InitAction>,
}

// ---------------------------------------------------------------------------
// Storyboard
// ---------------------------------------------------------------------------

/// One timed polyline vertex of a followed trajectory.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct TrajectorySample {
    pub time: f64,
    pub x: f64,
    pub y: f64,
    /// Heading in radians.
    pub heading: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum ActionKind {
    /// A `FollowTrajectoryAction` with a polyline shape. Vertices without
    /// a `time` attribute are not included.
    FollowTrajectory(Vec<TrajectorySample>),
    /// Any other action. Carries the element name.
    Other(String),
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EventAction {
    pub name: String,
    pub kind: ActionKind,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Event {
    pub name: String,
    pub actions: Vec<EventAction>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Maneuver {
    pub name: String,
    pub events: Vec<Event>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ManeuverGroup {
    pub name: String,
    /// Entity names referenced by the group's `Actors` element.
    pub actors: Vec<String>,
    pub maneuvers: Vec<Maneuver>,
}

impl ManeuverGroup {
    /// All events of all maneuvers, in document order.
    pub fn events(&self) -> impl Iterator<Item = &Event> {
        self.maneuvers.iter().flat_map(|m| m.events.iter())
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Act {
    pub name: String,
    pub maneuver_groups: Vec<ManeuverGroup>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Story {
    pub name: String,
    pub acts: Vec<Act>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Storyboard {
    pub init: Vec<PrivateInit>,
    pub stories: Vec<Story>,
}

/// A loaded scenario.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Scenario {
    pub header: FileHeader,
    pub entities: Vec<EntityDecl>,
    pub storyboard: Storyboard,
}

// ---------------------------------------------------------------------------
// Accessor Trait
// ---------------------------------------------------------------------------

/// Read-only access to the parts of a scenario the checkers consume.
pub trait ScenarioView {
    fn header(&self) -> &FileHeader;

    /// Declared entities in document order.
    fn entities(&self) -> &[EntityDecl];

    /// Entity names referenced by the init section, in document order.
    fn init_targets(&self) -> Vec<&str>;

    /// Init actions of one entity, or `None` if the entity has no `Private`
    /// block.
    fn init_actions(&self, entity: &str) -> Option<&[InitAction]>;

    /// Every maneuver group of every act of every story, in document order.
    fn maneuver_groups(&self) -> Vec<&ManeuverGroup>;

    /// Declared entity names in document order.
    fn entity_names(&self) -> Vec<&str> {
        self.entities().iter().map(|e| e.name.as_str()).collect()
    }
}

impl ScenarioView for Scenario {
    fn header(&self) -> &FileHeader {
        &self.header
    }

    fn entities(&self) -> &[EntityDecl] {
        &self.entities
    }

    fn init_targets(&self) -> Vec<&str> {
        self.storyboard
            .init
            .iter()
            .map(|p| p.entity_ref.as_str())
            .collect()
    }

    fn init_actions(&self, entity: &str) -> Option<&[InitAction]> {
        self.storyboard
            .init
            .iter()
            .find(|p| p.entity_ref == entity)
            .map(|p| p.actions.as_slice())
    }

    fn maneuver_groups(&self) -> Vec<&ManeuverGroup> {
        self.storyboard
            .stories
            .iter()
            .flat_map(|s| s.acts.iter())
            .flat_map(|a| a.maneuver_groups.iter())
            .collect()
    }
}
