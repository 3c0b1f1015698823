//! # Structural Consistency Checker
//!
//! Cross-references declared entities, init placements and lifecycle events
//! of a loaded scenario.
//!
//! ## Findings
//!
//! | finding | rule |
//! |---|---|
//! | missing definition | a maneuver-group actor (without `$`) or init target is not declared, or an entity's initial speed is not numeric |
//! | duplicate position | two or more entities are teleported to the identical world `(x, y)`, or to positions outside world coordinates |
//! | intersection | spawn footprints overlap (see [`crate::geometry`]) |
//! | unbalanced | `added + initialized != removed + parked`; lists the entities only ever removed |
//!
//! Every list is deduplicated and ordered by first occurrence.
//!
//! ## Accounting
//!
//! *Initialized* entities are declared entities with a teleport init action,
//! whatever the position kind. *Parked* entities are declared entities with
//! a numeric initial absolute speed below the configured parked speed.
//! *Added* and *removed* entities are the actors of maneuver groups with
//! events the [`EventClassifier`] reports as [`EventKind::Add`] or
//! [`EventKind::Remove`].

use serde::{Deserialize, Serialize};
use sqc_core::{InitAction, Position, QualityConfig, ScenarioView, SpeedValue, PLACEHOLDER_MARKER};

use crate::error::CheckError;
use crate::events::{EventClassifier, EventKind};
use crate::geometry::{intersecting_pairs, Footprint};
use crate::result::StructuralFindings;

/// Spawn position of an initialized entity.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub enum InitPosition {
    World { x: f64, y: f64 },
    /// Teleported to a position not expressed in world coordinates.
    Unplaced,
}

/// Output of the structural checker.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct StructuralReport {
    /// Declared entities with their vehicle category, in declaration order.
    pub entities: Vec<(String, Option<String>)>,
    pub findings: StructuralFindings,
    /// `added + initialized - removed - parked`.
    pub balance: i64,
}

/// Run every structural check on a loaded scenario.
pub fn check(
    view: &dyn ScenarioView,
    config: &QualityConfig,
    classifier: &dyn EventClassifier,
) -> Result<StructuralReport, CheckError> {
    ensure_references_named(view)?;

    let entities = extract_entities(view);
    let names: Vec<&str> = entities.iter().map(|(n, _)| n.as_str()).collect();

    let missing_definitions = missing_definitions(view, &names);
    let (positions, parked) = initial_state(view, &names, config.parked_speed);
    let duplicate_positions = duplicate_positions(&positions);
    let intersections = intersections(view, &positions, config);
    let (added, removed) = lifecycle(view, classifier);

    let initialized: Vec<&str> = positions.iter().map(|(n, _)| n.as_str()).collect();
    let (balance, unbalanced) = accounting(&added, &initialized, &removed, &parked);

    tracing::debug!(
        entities = entities.len(),
        initialized = initialized.len(),
        parked = parked.len(),
        added = added.len(),
        removed = removed.len(),
        balance,
        "structural accounting"
    );

    Ok(StructuralReport {
        entities,
        findings: StructuralFindings {
            missing_definitions,
            duplicate_positions,
            intersections,
            unbalanced,
        },
        balance,
    })
}

fn ensure_references_named(view: &dyn ScenarioView) -> Result<(), CheckError> {
    if view.init_targets().iter().any(|t| t.is_empty()) {
        return Err(CheckError::MalformedModel(
            "init Private block without an entity reference".to_string(),
        ));
    }
    for group in view.maneuver_groups() {
        if group.actors.iter().any(String::is_empty) {
            return Err(CheckError::MalformedModel(format!(
                "maneuver group '{}' has an actor without an entity reference",
                group.name
            )));
        }
    }
    Ok(())
}

fn push_unique(list: &mut Vec<String>, name: &str) {
    if !list.iter().any(|n| n == name) {
        list.push(name.to_string());
    }
}

// ---------------------------------------------------------------------------
// Entities & Definitions
// ---------------------------------------------------------------------------

/// Declared entities mapped to their vehicle category.
///
/// Categories are reported only when every declared object is an inline
/// vehicle; otherwise every entity maps to `None`. A repeated name keeps its
/// first position and its last object.
pub fn extract_entities(view: &dyn ScenarioView) -> Vec<(String, Option<String>)> {
    let all_typed = view.entities().iter().all(|e| e.object.vehicle_type().is_some());

    let mut entities: Vec<(String, Option<String>)> = Vec::new();
    for decl in view.entities() {
        let ty = all_typed
            .then(|| decl.object.vehicle_type().map(str::to_string))
            .flatten();
        match entities.iter_mut().find(|(n, _)| *n == decl.name) {
            Some(entry) => entry.1 = ty,
            None => entities.push((decl.name.clone(), ty)),
        }
    }
    entities
}

/// Undeclared references and entities with an unresolved initial speed.
pub fn missing_definitions(view: &dyn ScenarioView, declared: &[&str]) -> Vec<String> {
    let is_declared = |name: &str| declared.contains(&name);
    let mut missing = Vec::new();

    for group in view.maneuver_groups() {
        if group.actors.len() > 1 {
            tracing::warn!(
                group = %group.name,
                actors = ?group.actors,
                "multiple actors in maneuver group; events apply to all of them"
            );
        }
        for actor in &group.actors {
            if !actor.contains(PLACEHOLDER_MARKER) && !is_declared(actor.as_str()) {
                push_unique(&mut missing, actor);
            }
        }
    }

    for target in view.init_targets() {
        if !is_declared(target) {
            push_unique(&mut missing, target);
        }
    }

    for entity in declared {
        let unresolved = view
            .init_actions(entity)
            .unwrap_or_default()
            .iter()
            .any(|a| matches!(a, InitAction::AbsoluteSpeed(SpeedValue::Unresolved(_))));
        if unresolved {
            push_unique(&mut missing, entity);
        }
    }
    missing
}

// ---------------------------------------------------------------------------
// Initial State
// ---------------------------------------------------------------------------

/// Spawn positions of initialized entities and the parked entities.
///
/// The last teleport action of an entity determines its position.
pub fn initial_state(
    view: &dyn ScenarioView,
    declared: &[&str],
    parked_speed: f64,
) -> (Vec<(String, InitPosition)>, Vec<String>) {
    let mut positions: Vec<(String, InitPosition)> = Vec::new();
    let mut parked = Vec::new();

    for entity in declared {
        let Some(actions) = view.init_actions(entity) else {
            continue;
        };
        let mut position = None;
        for action in actions {
            match action {
                InitAction::Teleport(Position::World { x, y, .. }) => {
                    position = Some(InitPosition::World { x: *x, y: *y });
                }
                InitAction::Teleport(Position::Other(_)) => position = Some(InitPosition::Unplaced),
                InitAction::AbsoluteSpeed(SpeedValue::Numeric(speed)) if *speed < parked_speed => {
                    push_unique(&mut parked, entity);
                }
                InitAction::AbsoluteSpeed(_) | InitAction::Other(_) => {}
            }
        }
        if let Some(position) = position {
            positions.push((entity.to_string(), position));
        }
    }
    (positions, parked)
}

/// Clusters of entities sharing an identical spawn position.
///
/// Clusters are ordered by their first member; members keep spawn order.
/// Unplaced entities share one position, so two or more of them form a
/// cluster of their own.
pub fn duplicate_positions(positions: &[(String, InitPosition)]) -> Vec<Vec<String>> {
    let mut clusters: Vec<(InitPosition, Vec<String>)> = Vec::new();
    for (name, position) in positions {
        match clusters.iter_mut().find(|(p, _)| p == position) {
            Some((_, members)) => members.push(name.clone()),
            None => clusters.push((*position, vec![name.clone()])),
        }
    }
    clusters
        .into_iter()
        .filter(|(_, members)| members.len() > 1)
        .map(|(_, members)| members)
        .collect()
}

/// Pairs of entities whose spawn footprints overlap.
///
/// Only entities with a world position and a declared bounding box have a
/// footprint.
pub fn intersections(
    view: &dyn ScenarioView,
    positions: &[(String, InitPosition)],
    config: &QualityConfig,
) -> Vec<[String; 2]> {
    let footprints: Vec<Footprint> = positions
        .iter()
        .filter_map(|(name, position)| {
            let InitPosition::World { x, y } = *position else {
                return None;
            };
            let bounding_box = view
                .entities()
                .iter()
                .rev()
                .find(|e| e.name == *name)
                .and_then(|e| e.object.bounding_box())?;
            Some(Footprint::axis_aligned(name.clone(), x, y, &bounding_box))
        })
        .collect();

    intersecting_pairs(&footprints, &config.intersection)
        .into_iter()
        .map(|(i, j)| [footprints[i].entity.clone(), footprints[j].entity.clone()])
        .collect()
}

// ---------------------------------------------------------------------------
// Lifecycle Accounting
// ---------------------------------------------------------------------------

/// Actors of add and remove events, each deduplicated. Unresolved `$`
/// actors are skipped.
pub fn lifecycle(view: &dyn ScenarioView, classifier: &dyn EventClassifier) -> (Vec<String>, Vec<String>) {
    let mut added = Vec::new();
    let mut removed = Vec::new();
    let mut duplicate_add = false;
    let mut duplicate_remove = false;

    for group in view.maneuver_groups() {
        for event in group.events() {
            let (list, duplicate) = match classifier.kind(event) {
                EventKind::Add => (&mut added, &mut duplicate_add),
                EventKind::Remove => (&mut removed, &mut duplicate_remove),
                EventKind::Other => continue,
            };
            for actor in group.actors.iter().filter(|a| !a.contains(PLACEHOLDER_MARKER)) {
                if list.contains(actor) {
                    *duplicate = true;
                } else {
                    list.push(actor.clone());
                }
            }
        }
    }

    if duplicate_add {
        tracing::warn!("duplicate add events detected for one or more entities");
    }
    if duplicate_remove {
        tracing::warn!("duplicate remove events detected for one or more entities");
    }
    (added, removed)
}

/// Balance of the lifecycle accounting and the entities that break it.
pub fn accounting(
    added: &[String],
    initialized: &[&str],
    removed: &[String],
    parked: &[String],
) -> (i64, Vec<String>) {
    if added.iter().any(|a| initialized.contains(&a.as_str())) {
        tracing::warn!("entities appear both in init positions and add events");
    }
    if removed.iter().any(|r| parked.contains(r)) {
        tracing::warn!("entities appear both in remove events and parked entities");
    }

    let balance = added.len() as i64 + initialized.len() as i64
        - removed.len() as i64
        - parked.len() as i64;
    if balance == 0 {
        return (balance, Vec::new());
    }

    let mut unbalanced = Vec::new();
    for name in removed {
        let entered = added.contains(name) || initialized.contains(&name.as_str());
        if !entered {
            push_unique(&mut unbalanced, name);
        }
    }
    (balance, unbalanced)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::events::LegacyNaming;
    use proptest::prelude::*;
    use sqc_core::{
        Act, BoundingBox, EntityDecl, EntityObject, Event, Maneuver, ManeuverGroup, PrivateInit,
        Scenario, Story, Storyboard,
    };

    fn car(name: &str) -> EntityDecl {
        EntityDecl {
            name: name.to_string(),
            object: EntityObject::Vehicle {
                category: "car".to_string(),
                bounding_box: Some(BoundingBox { length: 4.0, width: 2.0, height: 1.5 }),
            },
        }
    }

    fn walker(name: &str) -> EntityDecl {
        EntityDecl {
            name: name.to_string(),
            object: EntityObject::Pedestrian {
                bounding_box: Some(BoundingBox { length: 0.5, width: 0.5, height: 1.8 }),
            },
        }
    }

    fn at(entity: &str, x: f64, y: f64, speed: f64) -> PrivateInit {
        PrivateInit {
            entity_ref: entity.to_string(),
            actions: vec![
                InitAction::Teleport(Position::World { x, y, z: 0.0, h: 0.0 }),
                InitAction::AbsoluteSpeed(SpeedValue::Numeric(speed)),
            ],
        }
    }

    fn group(actors: &[&str], events: &[&str]) -> ManeuverGroup {
        ManeuverGroup {
            name: format!("group_{}", actors.join("_")),
            actors: actors.iter().map(|a| a.to_string()).collect(),
            maneuvers: vec![Maneuver {
                name: "m".to_string(),
                events: events
                    .iter()
                    .map(|e| Event { name: e.to_string(), actions: vec![] })
                    .collect(),
            }],
        }
    }

    fn scenario(entities: Vec<EntityDecl>, init: Vec<PrivateInit>, groups: Vec<ManeuverGroup>) -> Scenario {
        Scenario {
            entities,
            storyboard: Storyboard {
                init,
                stories: vec![Story {
                    name: "s".to_string(),
                    acts: vec![Act { name: "a".to_string(), maneuver_groups: groups }],
                }],
            },
            ..Scenario::default()
        }
    }

    fn run(model: &Scenario) -> StructuralReport {
        check(model, &QualityConfig::default(), &LegacyNaming).unwrap()
    }

    #[test]
    fn entity_types_are_all_or_nothing() {
        let typed = scenario(vec![car("a"), car("b")], vec![], vec![]);
        assert_eq!(
            extract_entities(&typed),
            vec![("a".to_string(), Some("car".to_string())), ("b".to_string(), Some("car".to_string()))]
        );

        let mixed = scenario(vec![car("a"), walker("p")], vec![], vec![]);
        assert_eq!(
            extract_entities(&mixed),
            vec![("a".to_string(), None), ("p".to_string(), None)]
        );
    }

    #[test]
    fn missing_definitions_cover_actors_targets_and_speeds() {
        let mut model = scenario(
            vec![car("ego"), car("car_1")],
            vec![
                at("ego", 0.0, 0.0, 10.0),
                at("ghost", 50.0, 0.0, 10.0),
                PrivateInit {
                    entity_ref: "car_1".to_string(),
                    actions: vec![InitAction::AbsoluteSpeed(SpeedValue::Unresolved("$v".to_string()))],
                },
            ],
            vec![
                group(&["ego"], &[]),
                group(&["phantom"], &[]),
                group(&["$owner"], &[]),
                group(&["phantom"], &[]),
            ],
        );
        assert_eq!(
            run(&model).findings.missing_definitions,
            vec!["phantom".to_string(), "ghost".to_string(), "car_1".to_string()]
        );

        model.storyboard.init.truncate(1);
        model.storyboard.stories[0].acts[0].maneuver_groups.truncate(1);
        assert!(run(&model).findings.missing_definitions.is_empty());
    }

    #[test]
    fn three_entities_at_one_point_form_one_cluster() {
        let model = scenario(
            vec![car("a"), car("b"), car("c"), car("d")],
            vec![at("a", 1.0, 2.0, 5.0), at("b", 1.0, 2.0, 5.0), at("d", 30.0, 0.0, 5.0), at("c", 1.0, 2.0, 5.0)],
            vec![],
        );
        let report = run(&model);
        assert_eq!(
            report.findings.duplicate_positions,
            vec![vec!["a".to_string(), "b".to_string(), "c".to_string()]]
        );
        // Coincident centers are not double-reported as intersections.
        assert!(report.findings.intersections.is_empty());
    }

    #[test]
    fn unplaced_entities_share_one_duplicate_cluster() {
        let init = |name: &str| PrivateInit {
            entity_ref: name.to_string(),
            actions: vec![InitAction::Teleport(Position::Other("LanePosition".to_string()))],
        };
        let model = scenario(
            vec![car("a"), car("b"), car("c")],
            vec![init("a"), at("c", 0.0, 0.0, 5.0), init("b")],
            vec![],
        );
        let (positions, _) = initial_state(&model, &["a", "b", "c"], 1e-6);
        assert_eq!(positions.len(), 3);
        assert_eq!(
            duplicate_positions(&positions),
            vec![vec!["a".to_string(), "b".to_string()]]
        );
        // Unplaced entities have no footprint.
        assert!(intersections(&model, &positions, &QualityConfig::default()).is_empty());
        assert_eq!(run(&model).findings.duplicate_positions.len(), 1);
    }

    #[test]
    fn overlapping_spawns_are_reported_in_pairs() {
        let model = scenario(
            vec![car("a"), car("b"), car("c"), car("far")],
            vec![
                at("a", 0.0, 0.0, 5.0),
                at("b", 3.0, 0.0, 5.0),
                at("c", 3.0, 1.5, 5.0),
                at("far", 100.0, 0.0, 5.0),
            ],
            vec![],
        );
        assert_eq!(
            run(&model).findings.intersections,
            vec![
                ["a".to_string(), "b".to_string()],
                ["a".to_string(), "c".to_string()],
                ["b".to_string(), "c".to_string()],
            ]
        );
    }

    #[test]
    fn entities_without_bounding_box_have_no_footprint() {
        let catalog = EntityDecl {
            name: "cat".to_string(),
            object: EntityObject::CatalogReference {
                catalog: "VehicleCatalog".to_string(),
                entry: "car_white".to_string(),
            },
        };
        let model = scenario(
            vec![car("a"), catalog],
            vec![at("a", 0.0, 0.0, 5.0), at("cat", 1.0, 0.0, 5.0)],
            vec![],
        );
        assert!(run(&model).findings.intersections.is_empty());
    }

    #[test]
    fn parked_entities_use_numeric_speed_only() {
        let model = scenario(
            vec![car("a"), car("b"), car("c")],
            vec![
                at("a", 0.0, 0.0, 0.0),
                at("b", 10.0, 0.0, 13.9),
                PrivateInit {
                    entity_ref: "c".to_string(),
                    actions: vec![InitAction::AbsoluteSpeed(SpeedValue::Unresolved("$v".to_string()))],
                },
            ],
            vec![],
        );
        let (_, parked) = initial_state(&model, &["a", "b", "c"], 1e-6);
        assert_eq!(parked, vec!["a".to_string()]);
    }

    #[test]
    fn accounting_three_initialized_one_added_one_removed() {
        let model = scenario(
            vec![car("a"), car("b"), car("c"), car("d"), car("e")],
            vec![at("a", 0.0, 0.0, 5.0), at("b", 10.0, 0.0, 5.0), at("c", 20.0, 0.0, 5.0)],
            vec![group(&["d"], &["Add_d"]), group(&["e"], &["Remove_e"])],
        );
        let report = run(&model);
        assert_eq!(report.balance, 3);
        assert_eq!(report.findings.unbalanced, vec!["e".to_string()]);
    }

    #[test]
    fn balanced_accounting_has_no_findings() {
        let model = scenario(
            vec![car("a"), car("b")],
            vec![at("a", 0.0, 0.0, 0.0)],
            vec![group(&["b"], &["Add_b", "Remove_b"])],
        );
        // added 1 + initialized 1 - removed 1 - parked 1
        let report = run(&model);
        assert_eq!(report.balance, 0);
        assert!(report.findings.unbalanced.is_empty());
    }

    #[test]
    fn unbalanced_list_may_be_empty_when_balance_fails() {
        let model = scenario(vec![car("a")], vec![at("a", 0.0, 0.0, 5.0)], vec![]);
        let report = run(&model);
        assert_eq!(report.balance, 1);
        assert!(report.findings.unbalanced.is_empty());
    }

    #[test]
    fn lifecycle_events_apply_to_every_actor_once() {
        let model = scenario(
            vec![car("a"), car("b")],
            vec![],
            vec![group(&["a", "b"], &["Add_pair", "Add_pair_again"]), group(&["a"], &["Remove_a"])],
        );
        let (added, removed) = lifecycle(&model, &LegacyNaming);
        assert_eq!(added, vec!["a".to_string(), "b".to_string()]);
        assert_eq!(removed, vec!["a".to_string()]);
    }

    #[test]
    fn placeholder_actors_are_not_accounted() {
        let model = scenario(
            vec![car("a")],
            vec![],
            vec![group(&["$owner"], &["Remove_owner"]), group(&["$owner", "a"], &["Add_a"])],
        );
        let (added, removed) = lifecycle(&model, &LegacyNaming);
        assert_eq!(added, vec!["a".to_string()]);
        assert!(removed.is_empty());

        let report = run(&model);
        assert!(report.findings.unbalanced.is_empty());
        assert!(report.findings.missing_definitions.is_empty());
        assert_eq!(report.balance, 1);
    }

    #[test]
    fn unnamed_actor_is_malformed() {
        let model = scenario(vec![car("a")], vec![], vec![group(&[""], &[])]);
        let err = check(&model, &QualityConfig::default(), &LegacyNaming).unwrap_err();
        assert!(matches!(err, CheckError::MalformedModel(_)));
    }

    proptest! {
        #[test]
        fn clusters_partition_shared_positions(
            cells in proptest::collection::vec((0u8..4, 0u8..4), 0..12),
        ) {
            let positions: Vec<(String, InitPosition)> = cells
                .iter()
                .enumerate()
                .map(|(i, (x, y))| (format!("e{i}"), InitPosition::World { x: *x as f64, y: *y as f64 }))
                .collect();
            let clusters = duplicate_positions(&positions);

            let mut seen = std::collections::HashSet::new();
            for cluster in &clusters {
                prop_assert!(cluster.len() >= 2);
                let first = positions.iter().find(|(n, _)| *n == cluster[0]).map(|(_, p)| *p);
                for member in cluster {
                    prop_assert!(seen.insert(member.clone()));
                    let p = positions.iter().find(|(n, _)| n == member).map(|(_, p)| *p);
                    prop_assert_eq!(p, first);
                }
            }
            let shared = positions
                .iter()
                .filter(|(_, p)| positions.iter().filter(|(_, q)| q == p).count() > 1)
                .count();
            prop_assert_eq!(seen.len(), shared);
        }
    }
}
