use skyweave_core::{
    Command, EditError, Event, FormationIndex, FormationSection, PathIndex, ShipModel, Vec3,
    Waypoint,
};
use skyweave_world::{self as world, query, Config, EntityLayout, Partition, World};

fn apply_all(world: &mut World, commands: Vec<Command>) -> Vec<Event> {
    let mut events = Vec::new();
    for command in commands {
        world::apply(world, command, &mut events);
    }
    events
}

#[test]
fn formation_spawn_staggers_birth_times() {
    let mut world = World::new();
    let _ = apply_all(
        &mut world,
        vec![Command::CreatePath, Command::CreateFormation],
    );
    let events = apply_all(
        &mut world,
        vec![
            Command::UpdateSection {
                formation: FormationIndex::new(1),
                position: 0,
                section: FormationSection::new(PathIndex::new(1), 3, ShipModel::Fighter),
            },
            Command::SpawnFormation {
                formation: FormationIndex::new(1),
                at_time_s: 4.0,
            },
        ],
    );

    let births: Vec<f32> = events
        .iter()
        .filter_map(|event| match event {
            Event::EnemySpawned { birth_time_s, .. } => Some(*birth_time_s),
            _ => None,
        })
        .collect();
    assert_eq!(births, vec![4.0, 4.5, 5.0]);

    let start = query::choreography(&world)
        .path(PathIndex::new(1))
        .expect("path exists")
        .start();
    let view = query::enemy_view(&world);
    assert_eq!(view.len(), 3);
    assert!(view.iter().all(|enemy| enemy.position == start));
    assert!(view.iter().all(|enemy| enemy.model == ShipModel::Fighter));
}

#[test]
fn spawns_land_in_enemy_partition_and_wrap() {
    let layout = EntityLayout::new(2, 1, 1, 4);
    let mut world = World::with_config(Config::new(Default::default(), layout));
    let events = apply_all(
        &mut world,
        vec![Command::SpawnSectionPreview {
            section: FormationSection::new(PathIndex::SENTINEL, 6, ShipModel::Drone),
            at_time_s: 0.0,
        }],
    );

    let range = query::partition_range(&world, Partition::Enemies);
    assert_eq!(range, 4..8);
    let slots: Vec<usize> = events
        .iter()
        .filter_map(|event| match event {
            Event::EnemySpawned { enemy, .. } => Some(enemy.get()),
            _ => None,
        })
        .collect();
    assert_eq!(slots, vec![4, 5, 6, 7, 4, 5]);
    assert_eq!(query::live_enemies(&world).len(), 4);
}

#[test]
fn path_followed_by_live_enemy_cannot_be_deleted() {
    let mut world = World::new();
    let _ = apply_all(
        &mut world,
        vec![
            Command::CreatePath,
            Command::SpawnSectionPreview {
                section: FormationSection::new(PathIndex::new(1), 2, ShipModel::Drone),
                at_time_s: 0.0,
            },
        ],
    );

    let events = apply_all(
        &mut world,
        vec![Command::DeletePath {
            path: PathIndex::new(1),
        }],
    );
    assert_eq!(
        events,
        vec![Event::EditRejected {
            reason: EditError::PathInUse {
                path: PathIndex::new(1),
                enemies: 2,
            }
        }]
    );

    let _ = apply_all(&mut world, vec![Command::ClearEnemies]);
    let events = apply_all(
        &mut world,
        vec![Command::DeletePath {
            path: PathIndex::new(1),
        }],
    );
    assert_eq!(
        events,
        vec![Event::PathDeleted {
            path: PathIndex::new(1)
        }]
    );
}

#[test]
fn live_enemies_follow_repaired_path_indices() {
    let mut world = World::new();
    let _ = apply_all(
        &mut world,
        vec![
            Command::CreatePath,
            Command::CreatePath,
            Command::SpawnSectionPreview {
                section: FormationSection::new(PathIndex::new(2), 1, ShipModel::Gunship),
                at_time_s: 0.0,
            },
            Command::DeletePath {
                path: PathIndex::new(1),
            },
        ],
    );

    let view = query::enemy_view(&world);
    let enemy = view.iter().next().expect("enemy alive");
    assert_eq!(enemy.path, PathIndex::new(1));
    assert_eq!(query::enemies_following(&world, PathIndex::new(1)), 1);
}

#[test]
fn reset_discards_pools_and_enemies() {
    let mut world = World::new();
    let _ = apply_all(
        &mut world,
        vec![
            Command::CreatePath,
            Command::CreateFormation,
            Command::CreateLevel,
            Command::SpawnFormation {
                formation: FormationIndex::new(1),
                at_time_s: 0.0,
            },
        ],
    );
    assert!(query::any_enemy_alive(&world));

    let events = apply_all(&mut world, vec![Command::ResetLevelData]);

    assert_eq!(events.last(), Some(&Event::LevelDataReset));
    assert!(!query::any_enemy_alive(&world));
    let choreography = query::choreography(&world);
    assert_eq!(choreography.paths().len(), 1);
    assert_eq!(choreography.formations().len(), 1);
    assert!(choreography.levels().is_empty());
}

#[test]
fn waypoint_edits_report_path_edited() {
    let mut world = World::new();
    let _ = apply_all(&mut world, vec![Command::CreatePath]);
    let events = apply_all(
        &mut world,
        vec![
            Command::InsertWaypoint {
                path: PathIndex::new(1),
                position: 2,
                waypoint: Waypoint::new(Vec3::new(5.0, 0.0, 0.0), Vec3::new(5.0, -5.0, 0.0)),
            },
            Command::RemoveWaypoint {
                path: PathIndex::new(1),
                position: 7,
            },
        ],
    );

    assert_eq!(
        events,
        vec![
            Event::PathEdited {
                path: PathIndex::new(1)
            },
            Event::EditRejected {
                reason: EditError::WaypointOutOfRange {
                    path: PathIndex::new(1),
                    position: 7,
                }
            },
        ]
    );
    let path = query::choreography(&world)
        .path(PathIndex::new(1))
        .expect("path exists");
    assert_eq!(path.waypoints().len(), 3);
}

#[test]
fn spawning_missing_formation_is_rejected() {
    let mut world = World::new();
    let events = apply_all(
        &mut world,
        vec![Command::SpawnFormation {
            formation: FormationIndex::new(9),
            at_time_s: 0.0,
        }],
    );
    assert_eq!(
        events,
        vec![Event::EditRejected {
            reason: EditError::FormationOutOfRange {
                formation: FormationIndex::new(9)
            }
        }]
    );
}
