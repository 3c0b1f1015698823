//! # Scenario Loader
//!
//! Builds an [`sqc_core::Scenario`] from OpenSCENARIO 1.x XML. Only the
//! parts the quality checks consume are materialized:
//!
//! - `FileHeader` revision, author, date, description.
//! - `Entities/ScenarioObject` with vehicle category and bounding box
//!   dimensions (inline `Vehicle`, `Pedestrian`, `MiscObject`) or the
//!   catalog reference.
//! - `Storyboard/Init/Actions/Private` teleport and absolute speed actions.
//! - `Story/Act/ManeuverGroup` actors, maneuvers, events and actions, with
//!   polyline vertices of `FollowTrajectoryAction`s.
//!
//! Optional data that cannot be read (non-numeric dimensions or
//! coordinates, vertices without a time) is dropped or represented by a
//! sentinel variant; only a document without the mandatory
//! `FileHeader`/`Entities`/`Storyboard` skeleton fails to load.

use std::path::Path;

use roxmltree::{Document, Node};

use sqc_core::{
    Act, ActionKind, BoundingBox, EntityDecl, EntityObject, Event, EventAction, FileHeader,
    InitAction, Maneuver, ManeuverGroup, Position, PrivateInit, Scenario, SpeedValue, Story,
    Storyboard, TrajectorySample,
};

use crate::error::LoadError;
use crate::markup::parse_document;

/// Loads a scenario model from a file.
pub trait ModelLoader {
    fn load(&self, path: &Path) -> Result<Scenario, LoadError>;
}

/// Loader for `.xosc` files.
#[derive(Debug, Default, Clone, Copy)]
pub struct XoscLoader;

impl ModelLoader for XoscLoader {
    fn load(&self, path: &Path) -> Result<Scenario, LoadError> {
        let text = std::fs::read_to_string(path).map_err(|source| LoadError::Read {
            path: path.display().to_string(),
            source,
        })?;
        parse_scenario(&text)
    }
}

/// Parse scenario XML text into the model.
pub fn parse_scenario(text: &str) -> Result<Scenario, LoadError> {
    let doc = parse_document(text)?;
    scenario_from_document(&doc)
}

fn scenario_from_document(doc: &Document<'_>) -> Result<Scenario, LoadError> {
    let root = doc.root_element();
    if !root.has_tag_name("OpenSCENARIO") {
        return Err(LoadError::UnexpectedRoot(root.tag_name().name().to_string()));
    }

    let header = parse_file_header(&required_child(&root, "FileHeader")?)?;
    let entities = parse_entities(&required_child(&root, "Entities")?);
    let storyboard = parse_storyboard(&required_child(&root, "Storyboard")?);

    Ok(Scenario {
        header,
        entities,
        storyboard,
    })
}

// ---------------------------------------------------------------------------
// Node helpers
// ---------------------------------------------------------------------------

fn child<'a, 'input>(node: &Node<'a, 'input>, name: &str) -> Option<Node<'a, 'input>> {
    node.children().find(|n| n.has_tag_name(name))
}

fn children<'a, 'input: 'a>(
    node: &Node<'a, 'input>,
    name: &'a str,
) -> impl Iterator<Item = Node<'a, 'input>> + 'a {
    node.children().filter(move |n| n.has_tag_name(name))
}

fn required_child<'a, 'input>(
    node: &Node<'a, 'input>,
    name: &str,
) -> Result<Node<'a, 'input>, LoadError> {
    child(node, name).ok_or_else(|| LoadError::MissingElement {
        element: name.to_string(),
        parent: node.tag_name().name().to_string(),
    })
}

fn first_element<'a, 'input>(node: &Node<'a, 'input>) -> Option<Node<'a, 'input>> {
    node.first_element_child()
}

fn attr_string(node: &Node<'_, '_>, name: &str) -> String {
    node.attribute(name).unwrap_or_default().to_string()
}

fn attr_f64(node: &Node<'_, '_>, name: &str) -> Option<f64> {
    node.attribute(name)?.trim().parse::<f64>().ok()
}

// ---------------------------------------------------------------------------
// Header & entities
// ---------------------------------------------------------------------------

fn parse_file_header(node: &Node<'_, '_>) -> Result<FileHeader, LoadError> {
    let rev = |attribute: &str| -> Result<u32, LoadError> {
        let raw = node.attribute(attribute).ok_or_else(|| LoadError::InvalidAttribute {
            element: "FileHeader".to_string(),
            attribute: attribute.to_string(),
            reason: "missing".to_string(),
        })?;
        raw.trim().parse::<u32>().map_err(|e| LoadError::InvalidAttribute {
            element: "FileHeader".to_string(),
            attribute: attribute.to_string(),
            reason: e.to_string(),
        })
    };
    Ok(FileHeader {
        rev_major: rev("revMajor")?,
        rev_minor: rev("revMinor")?,
        author: node.attribute("author").map(str::to_string),
        date: node.attribute("date").map(str::to_string),
        description: node.attribute("description").map(str::to_string),
    })
}

fn parse_entities(node: &Node<'_, '_>) -> Vec<EntityDecl> {
    children(node, "ScenarioObject")
        .filter_map(|obj| {
            let name = obj.attribute("name")?.to_string();
            Some(EntityDecl {
                name,
                object: parse_entity_object(&obj),
            })
        })
        .collect()
}

fn parse_entity_object(scenario_object: &Node<'_, '_>) -> EntityObject {
    // Controllers (ObjectController) may follow the object definition.
    let Some(object) = scenario_object
        .children()
        .find(|n| n.is_element() && !n.has_tag_name("ObjectController"))
    else {
        return EntityObject::Other(String::new());
    };

    let bounding_box = child(&object, "BoundingBox").and_then(|bb| parse_bounding_box(&bb));
    match object.tag_name().name() {
        "Vehicle" => EntityObject::Vehicle {
            category: attr_string(&object, "vehicleCategory"),
            bounding_box,
        },
        "Pedestrian" => EntityObject::Pedestrian { bounding_box },
        "MiscObject" => EntityObject::MiscObject { bounding_box },
        "CatalogReference" => EntityObject::CatalogReference {
            catalog: attr_string(&object, "catalogName"),
            entry: attr_string(&object, "entryName"),
        },
        other => EntityObject::Other(other.to_string()),
    }
}

fn parse_bounding_box(node: &Node<'_, '_>) -> Option<BoundingBox> {
    let dims = child(node, "Dimensions")?;
    Some(BoundingBox {
        length: attr_f64(&dims, "length")?,
        width: attr_f64(&dims, "width")?,
        height: attr_f64(&dims, "height").unwrap_or(0.0),
    })
}

// ---------------------------------------------------------------------------
// Storyboard
// ---------------------------------------------------------------------------

fn parse_storyboard(node: &Node<'_, '_>) -> Storyboard {
    let init = match child(node, "Init").and_then(|i| child(&i, "Actions")) {
        Some(actions) => parse_init(&actions),
        None => Vec::new(),
    };
    let stories = children(node, "Story").map(|s| parse_story(&s)).collect();
    Storyboard { init, stories }
}

fn parse_init(actions: &Node<'_, '_>) -> Vec<PrivateInit> {
    let mut inits: Vec<PrivateInit> = Vec::new();
    for private in children(actions, "Private") {
        let entity_ref = attr_string(&private, "entityRef");
        let parsed: Vec<InitAction> = children(&private, "PrivateAction")
            .filter_map(|pa| first_element(&pa))
            .map(|action| parse_init_action(&action))
            .collect();
        // Several Private blocks for one entity accumulate.
        match inits.iter_mut().find(|p| p.entity_ref == entity_ref) {
            Some(existing) => existing.actions.extend(parsed),
            None => inits.push(PrivateInit {
                entity_ref,
                actions: parsed,
            }),
        }
    }
    inits
}

fn parse_init_action(action: &Node<'_, '_>) -> InitAction {
    match action.tag_name().name() {
        "TeleportAction" => {
            let position = child(action, "Position")
                .and_then(|p| first_element(&p))
                .map(|p| parse_position(&p))
                .unwrap_or_else(|| Position::Other(String::new()));
            InitAction::Teleport(position)
        }
        "LongitudinalAction" => {
            let absolute = child(action, "SpeedAction")
                .and_then(|s| child(&s, "SpeedActionTarget"))
                .and_then(|t| child(&t, "AbsoluteTargetSpeed"));
            match absolute {
                Some(target) => {
                    let raw = attr_string(&target, "value");
                    let value = match raw.trim().parse::<f64>() {
                        Ok(v) => SpeedValue::Numeric(v),
                        Err(_) => SpeedValue::Unresolved(raw),
                    };
                    InitAction::AbsoluteSpeed(value)
                }
                None => InitAction::Other("LongitudinalAction".to_string()),
            }
        }
        other => InitAction::Other(other.to_string()),
    }
}

fn parse_position(node: &Node<'_, '_>) -> Position {
    if node.has_tag_name("WorldPosition") {
        if let (Some(x), Some(y)) = (attr_f64(node, "x"), attr_f64(node, "y")) {
            return Position::World {
                x,
                y,
                z: attr_f64(node, "z").unwrap_or(0.0),
                h: attr_f64(node, "h").unwrap_or(0.0),
            };
        }
    }
    Position::Other(node.tag_name().name().to_string())
}

fn parse_story(node: &Node<'_, '_>) -> Story {
    Story {
        name: attr_string(node, "name"),
        acts: children(node, "Act").map(|a| parse_act(&a)).collect(),
    }
}

fn parse_act(node: &Node<'_, '_>) -> Act {
    Act {
        name: attr_string(node, "name"),
        maneuver_groups: children(node, "ManeuverGroup")
            .map(|g| parse_maneuver_group(&g))
            .collect(),
    }
}

fn parse_maneuver_group(node: &Node<'_, '_>) -> ManeuverGroup {
    let actors = child(node, "Actors")
        .map(|actors| {
            children(&actors, "EntityRef")
                .map(|e| attr_string(&e, "entityRef"))
                .collect()
        })
        .unwrap_or_default();
    ManeuverGroup {
        name: attr_string(node, "name"),
        actors,
        maneuvers: children(node, "Maneuver").map(|m| parse_maneuver(&m)).collect(),
    }
}

fn parse_maneuver(node: &Node<'_, '_>) -> Maneuver {
    Maneuver {
        name: attr_string(node, "name"),
        events: children(node, "Event").map(|e| parse_event(&e)).collect(),
    }
}

fn parse_event(node: &Node<'_, '_>) -> Event {
    Event {
        name: attr_string(node, "name"),
        actions: children(node, "Action").map(|a| parse_event_action(&a)).collect(),
    }
}

fn parse_event_action(node: &Node<'_, '_>) -> EventAction {
    let kind = match node.descendants().find(|n| n.has_tag_name("FollowTrajectoryAction")) {
        Some(follow) => ActionKind::FollowTrajectory(parse_trajectory_samples(&follow)),
        None => {
            // Action → PrivateAction/GlobalAction/UserDefinedAction → concrete action.
            let concrete = first_element(node)
                .and_then(|wrapper| first_element(&wrapper).or(Some(wrapper)))
                .map(|n| n.tag_name().name().to_string())
                .unwrap_or_default();
            ActionKind::Other(concrete)
        }
    };
    EventAction {
        name: attr_string(node, "name"),
        kind,
    }
}

fn parse_trajectory_samples(follow: &Node<'_, '_>) -> Vec<TrajectorySample> {
    let Some(polyline) = follow.descendants().find(|n| n.has_tag_name("Polyline")) else {
        return Vec::new();
    };
    children(&polyline, "Vertex")
        .filter_map(|vertex| {
            let time = attr_f64(&vertex, "time")?;
            let position = child(&vertex, "Position").and_then(|p| first_element(&p))?;
            match parse_position(&position) {
                Position::World { x, y, h, .. } => Some(TrajectorySample {
                    time,
                    x,
                    y,
                    heading: h,
                }),
                Position::Other(_) => None,
            }
        })
        .collect()
}
