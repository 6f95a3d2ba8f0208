#![deny(
    unsafe_code,
    missing_docs,
    dead_code,
    unused_results,
    non_snake_case,
    unreachable_pub
)]

//! Authoritative choreography and entity state for Skyweave.
//!
//! The world owns the path, formation and level pools, the shared entity
//! array and the total elapsed time. Every mutation goes through [`apply`],
//! which reports its outcome as [`Event`] values.

use skyweave_core::{
    Choreography, Command, EditError, Event, FormationIndex, FormationSection, LevelIndex, Path,
    PathIndex, Tuning,
};

mod entities;

pub use entities::{EntityLayout, Partition};

use entities::EntityArray;

/// Configuration parameters required to construct the world.
#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub struct Config {
    tuning: Tuning,
    layout: EntityLayout,
}

impl Config {
    /// Creates a new configuration from timing constants and array capacities.
    #[must_use]
    pub const fn new(tuning: Tuning, layout: EntityLayout) -> Self {
        Self { tuning, layout }
    }
}

/// Represents the authoritative Skyweave world state.
#[derive(Debug)]
pub struct World {
    choreography: Choreography,
    tuning: Tuning,
    entities: EntityArray,
    elapsed_s: f32,
    tick_index: u64,
}

impl World {
    /// Creates a world with sentinel-only pools and default configuration.
    #[must_use]
    pub fn new() -> Self {
        Self::with_config(Config::default())
    }

    /// Creates a world with sentinel-only pools and the provided configuration.
    #[must_use]
    pub fn with_config(config: Config) -> Self {
        Self {
            choreography: Choreography::new(),
            tuning: config.tuning,
            entities: EntityArray::new(config.layout),
            elapsed_s: 0.0,
            tick_index: 0,
        }
    }

    fn clear_enemies(&mut self, out_events: &mut Vec<Event>) {
        for enemy in self.entities.live_enemy_slots() {
            if self.entities.retire_enemy(enemy) {
                out_events.push(Event::EnemyRetired { enemy });
            }
        }
    }

    fn install(&mut self, choreography: Choreography, out_events: &mut Vec<Event>) {
        self.clear_enemies(out_events);
        self.entities.clear();
        self.choreography = choreography;
        out_events.push(Event::LevelDataReset);
    }

    fn spawn_section(
        &mut self,
        section: FormationSection,
        at_time_s: f32,
        out_events: &mut Vec<Event>,
    ) {
        let Some(start) = self.choreography.path(section.path).map(Path::start) else {
            log::warn!(
                "skipping section that follows missing path {}",
                section.path.get()
            );
            return;
        };

        let stagger = self.tuning.ship_stagger_s();
        for ship in 0..section.ship_count {
            let birth_time_s = at_time_s + ship as f32 * stagger;
            let Some(enemy) =
                self.entities
                    .spawn_enemy(section.path, birth_time_s, section.model, start)
            else {
                return;
            };
            out_events.push(Event::EnemySpawned {
                enemy,
                path: section.path,
                birth_time_s,
                model: section.model,
            });
        }
    }

    fn spawn_formation(
        &mut self,
        formation: FormationIndex,
        at_time_s: f32,
        out_events: &mut Vec<Event>,
    ) -> Result<(), EditError> {
        let sections = self
            .choreography
            .formation(formation)
            .map(|entry| entry.sections().to_vec())
            .ok_or(EditError::FormationOutOfRange { formation })?;
        log::debug!(
            "spawning formation {} ({} sections) at {at_time_s:.2}s",
            formation.get(),
            sections.len()
        );
        for section in sections {
            self.spawn_section(section, at_time_s, out_events);
        }
        Ok(())
    }

    fn delete_path(&mut self, path: PathIndex) -> Result<(), EditError> {
        if path != PathIndex::SENTINEL {
            let enemies = self.entities.enemies_following(path);
            if enemies > 0 {
                return Err(EditError::PathInUse { path, enemies });
            }
        }
        let _removed = self.choreography.delete_path(path)?;
        self.entities.repair_paths(path);
        Ok(())
    }

    fn jump(
        &mut self,
        level: LevelIndex,
        wave: Option<usize>,
        out_events: &mut Vec<Event>,
    ) -> Result<(), EditError> {
        let entry = self
            .choreography
            .level(level)
            .ok_or(EditError::LevelOutOfRange { level })?;
        let (wave, clock_s) = match wave {
            None => (0, 0.0),
            Some(position) => {
                let target = entry
                    .waves()
                    .get(position)
                    .ok_or(EditError::WaveOutOfRange { level, position })?;
                (position, target.spawn_time_s)
            }
        };
        self.clear_enemies(out_events);
        out_events.push(Event::TimelineJumped {
            level,
            wave,
            clock_s,
        });
        Ok(())
    }
}

impl Default for World {
    fn default() -> Self {
        Self::new()
    }
}

fn report(result: Result<(), EditError>, accepted: Event, out_events: &mut Vec<Event>) {
    match result {
        Ok(()) => out_events.push(accepted),
        Err(reason) => {
            log::warn!("rejected edit: {reason}");
            out_events.push(Event::EditRejected { reason });
        }
    }
}

/// Applies the provided command to the world, mutating state deterministically.
pub fn apply(world: &mut World, command: Command, out_events: &mut Vec<Event>) {
    match command {
        Command::ResetLevelData => world.install(Choreography::new(), out_events),
        Command::ReplaceChoreography { choreography } => world.install(*choreography, out_events),
        Command::Tick { dt } => {
            world.tick_index = world.tick_index.saturating_add(1);
            world.elapsed_s += dt.as_secs_f32();
            out_events.push(Event::TimeAdvanced { dt });
        }
        Command::CreatePath => {
            let path = world.choreography.create_path();
            out_events.push(Event::PathCreated { path });
        }
        Command::CreateFormation => {
            let formation = world.choreography.create_formation();
            out_events.push(Event::FormationCreated { formation });
        }
        Command::CreateLevel => {
            let level = world.choreography.create_level();
            out_events.push(Event::LevelCreated { level });
        }
        Command::DeletePath { path } => {
            let result = world.delete_path(path);
            report(result, Event::PathDeleted { path }, out_events);
        }
        Command::DeleteFormation { formation } => {
            let result = world.choreography.delete_formation(formation).map(drop);
            report(result, Event::FormationDeleted { formation }, out_events);
        }
        Command::DeleteLevel { level } => {
            let result = world.choreography.delete_level(level).map(drop);
            report(result, Event::LevelDeleted { level }, out_events);
        }
        Command::RenamePath { path, id } => {
            let result = world.choreography.rename_path(path, &id);
            report(result, Event::PathRenamed { path }, out_events);
        }
        Command::RenameFormation { formation, id } => {
            let result = world.choreography.rename_formation(formation, &id);
            report(result, Event::FormationRenamed { formation }, out_events);
        }
        Command::InsertWaypoint {
            path,
            position,
            waypoint,
        } => {
            let result = world.choreography.insert_waypoint(path, position, waypoint);
            report(result, Event::PathEdited { path }, out_events);
        }
        Command::UpdateWaypoint {
            path,
            position,
            waypoint,
        } => {
            let result = world.choreography.update_waypoint(path, position, waypoint);
            report(result, Event::PathEdited { path }, out_events);
        }
        Command::RemoveWaypoint { path, position } => {
            let result = world.choreography.remove_waypoint(path, position).map(drop);
            report(result, Event::PathEdited { path }, out_events);
        }
        Command::InsertSection {
            formation,
            position,
            section,
        } => {
            let result = world
                .choreography
                .insert_section(formation, position, section);
            report(result, Event::FormationEdited { formation }, out_events);
        }
        Command::UpdateSection {
            formation,
            position,
            section,
        } => {
            let result = world
                .choreography
                .update_section(formation, position, section);
            report(result, Event::FormationEdited { formation }, out_events);
        }
        Command::RemoveSection {
            formation,
            position,
        } => {
            let result = world
                .choreography
                .remove_section(formation, position)
                .map(drop);
            report(result, Event::FormationEdited { formation }, out_events);
        }
        Command::InsertWave { level, wave } => {
            let result = world.choreography.insert_wave(level, wave).map(drop);
            report(result, Event::LevelEdited { level }, out_events);
        }
        Command::UpdateWave {
            level,
            position,
            wave,
        } => {
            let result = world.choreography.update_wave(level, position, wave);
            report(result, Event::LevelEdited { level }, out_events);
        }
        Command::RemoveWave { level, position } => {
            let result = world.choreography.remove_wave(level, position).map(drop);
            report(result, Event::LevelEdited { level }, out_events);
        }
        Command::SpawnFormation {
            formation,
            at_time_s,
        } => {
            if let Err(reason) = world.spawn_formation(formation, at_time_s, out_events) {
                log::warn!("rejected spawn: {reason}");
                out_events.push(Event::EditRejected { reason });
            }
        }
        Command::SpawnSectionPreview { section, at_time_s } => {
            if section.ship_count == 0 {
                out_events.push(Event::EditRejected {
                    reason: EditError::InvalidShipCount,
                });
            } else if !world.choreography.paths().contains(section.path) {
                out_events.push(Event::EditRejected {
                    reason: EditError::PathOutOfRange { path: section.path },
                });
            } else {
                world.spawn_section(section, at_time_s, out_events);
            }
        }
        Command::MoveEnemy { enemy, position } => world.entities.move_enemy(enemy, position),
        Command::RetireEnemy { enemy } => {
            if world.entities.retire_enemy(enemy) {
                out_events.push(Event::EnemyRetired { enemy });
            }
        }
        Command::ClearEnemies => world.clear_enemies(out_events),
        Command::JumpToLevel { level } => {
            if let Err(reason) = world.jump(level, None, out_events) {
                out_events.push(Event::EditRejected { reason });
            }
        }
        Command::JumpToWave { level, wave } => {
            if let Err(reason) = world.jump(level, Some(wave), out_events) {
                out_events.push(Event::EditRejected { reason });
            }
        }
    }
}

/// Query functions that provide read-only access to the world state.
pub mod query {
    use std::ops::Range;

    use super::{Partition, World};
    use skyweave_core::{Choreography, EnemySlot, EnemyView, PathIndex, Tuning};

    /// Provides read-only access to the path, formation and level pools.
    #[must_use]
    pub fn choreography(world: &World) -> &Choreography {
        &world.choreography
    }

    /// Timing constants the world was configured with.
    #[must_use]
    pub fn tuning(world: &World) -> Tuning {
        world.tuning
    }

    /// Total simulated time accumulated from ticks, in seconds.
    #[must_use]
    pub fn elapsed_s(world: &World) -> f32 {
        world.elapsed_s
    }

    /// Number of ticks applied since the world was created.
    #[must_use]
    pub fn tick_index(world: &World) -> u64 {
        world.tick_index
    }

    /// Captures a read-only view of the live enemies.
    #[must_use]
    pub fn enemy_view(world: &World) -> EnemyView {
        EnemyView::from_snapshots(world.entities.snapshots())
    }

    /// Reports whether any enemy is alive.
    #[must_use]
    pub fn any_enemy_alive(world: &World) -> bool {
        !world.entities.live_enemy_slots().is_empty()
    }

    /// Slots of the live enemies in ascending order.
    #[must_use]
    pub fn live_enemies(world: &World) -> Vec<EnemySlot> {
        world.entities.live_enemy_slots()
    }

    /// Number of live enemies following the path.
    #[must_use]
    pub fn enemies_following(world: &World, path: PathIndex) -> usize {
        world.entities.enemies_following(path)
    }

    /// Absolute slot range of an entity array partition.
    #[must_use]
    pub fn partition_range(world: &World, partition: Partition) -> Range<usize> {
        world.entities.layout().range(partition)
    }
}
