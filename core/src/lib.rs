#![deny(
    unsafe_code,
    missing_docs,
    dead_code,
    unused_results,
    non_snake_case,
    unreachable_pub
)]

//! Core contracts shared across the Skyweave choreography engine.
//!
//! This crate defines the data model for enemy choreography (paths,
//! formations and levels), the [`Choreography`] store that keeps the three
//! pools referentially consistent, and the message surface that connects
//! adapters, the authoritative world, and pure systems. Adapters and systems
//! submit [`Command`] values describing desired mutations, the world executes
//! those commands via its `apply` entry point, and then broadcasts [`Event`]
//! values for systems to react to deterministically.

use std::time::Duration;

use serde::{Deserialize, Serialize};

mod choreography;

pub use choreography::{
    Choreography, EditError, Formation, FormationSection, Level, Path, Pool, PoolIndex, Wave,
    Waypoint,
};
pub use glam::Vec3;

/// Default duration of a single path segment measured in seconds.
pub const DEFAULT_SEGMENT_DURATION_S: f32 = 1.0;

/// Delay between consecutive ships of one formation section, in seconds.
pub const DEFAULT_SHIP_STAGGER_S: f32 = 0.5;

/// Timing constants shared by the spawn routine and the path animator.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Tuning {
    segment_duration_s: f32,
    ship_stagger_s: f32,
}

impl Tuning {
    /// Creates a tuning descriptor from explicit values.
    ///
    /// Non-finite or non-positive segment durations fall back to the default
    /// so the animator never divides by zero. Negative staggers clamp to zero.
    #[must_use]
    pub fn new(segment_duration_s: f32, ship_stagger_s: f32) -> Self {
        let segment_duration_s = if segment_duration_s.is_finite() && segment_duration_s > 0.0 {
            segment_duration_s
        } else {
            DEFAULT_SEGMENT_DURATION_S
        };
        let ship_stagger_s = if ship_stagger_s.is_finite() {
            ship_stagger_s.max(0.0)
        } else {
            DEFAULT_SHIP_STAGGER_S
        };
        Self {
            segment_duration_s,
            ship_stagger_s,
        }
    }

    /// Time an enemy spends travelling between two consecutive waypoints.
    #[must_use]
    pub const fn segment_duration_s(&self) -> f32 {
        self.segment_duration_s
    }

    /// Delay between the births of consecutive ships in one section.
    #[must_use]
    pub const fn ship_stagger_s(&self) -> f32 {
        self.ship_stagger_s
    }
}

impl Default for Tuning {
    fn default() -> Self {
        Self {
            segment_duration_s: DEFAULT_SEGMENT_DURATION_S,
            ship_stagger_s: DEFAULT_SHIP_STAGGER_S,
        }
    }
}

/// Position of a path within the path pool.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct PathIndex(usize);

impl PathIndex {
    /// Reserved sentinel path that every unresolved reference falls back to.
    pub const SENTINEL: Self = Self(0);

    /// Creates a new path index with the provided numeric value.
    #[must_use]
    pub const fn new(value: usize) -> Self {
        Self(value)
    }

    /// Retrieves the numeric representation of the index.
    #[must_use]
    pub const fn get(&self) -> usize {
        self.0
    }
}

/// Position of a formation within the formation pool.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct FormationIndex(usize);

impl FormationIndex {
    /// Reserved sentinel formation that every unresolved reference falls back to.
    pub const SENTINEL: Self = Self(0);

    /// Creates a new formation index with the provided numeric value.
    #[must_use]
    pub const fn new(value: usize) -> Self {
        Self(value)
    }

    /// Retrieves the numeric representation of the index.
    #[must_use]
    pub const fn get(&self) -> usize {
        self.0
    }
}

/// Position of a level within the level pool.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct LevelIndex(usize);

impl LevelIndex {
    /// Creates a new level index with the provided numeric value.
    #[must_use]
    pub const fn new(value: usize) -> Self {
        Self(value)
    }

    /// Retrieves the numeric representation of the index.
    #[must_use]
    pub const fn get(&self) -> usize {
        self.0
    }

    /// Index of the level that follows this one.
    #[must_use]
    pub const fn next(&self) -> Self {
        Self(self.0 + 1)
    }
}

/// Absolute slot within the shared entity array occupied by an enemy.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct EnemySlot(usize);

impl EnemySlot {
    /// Creates a new enemy slot with the provided numeric value.
    #[must_use]
    pub const fn new(value: usize) -> Self {
        Self(value)
    }

    /// Retrieves the numeric representation of the slot.
    #[must_use]
    pub const fn get(&self) -> usize {
        self.0
    }
}

/// Visual model assigned to the ships of a formation section.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ShipModel {
    /// Small, fast scout.
    #[default]
    Drone,
    /// Standard attack craft.
    Fighter,
    /// Heavy, slow craft.
    Bomber,
    /// Large armoured craft.
    Gunship,
}

impl ShipModel {
    /// Every model in on-disk enumeration order.
    pub const ALL: [Self; 4] = [Self::Drone, Self::Fighter, Self::Bomber, Self::Gunship];

    /// Enumeration index used by the level file.
    #[must_use]
    pub const fn index(self) -> u32 {
        match self {
            Self::Drone => 0,
            Self::Fighter => 1,
            Self::Bomber => 2,
            Self::Gunship => 3,
        }
    }

    /// Resolves a model from its enumeration index.
    #[must_use]
    pub fn from_index(index: u64) -> Option<Self> {
        usize::try_from(index)
            .ok()
            .and_then(|index| Self::ALL.get(index).copied())
    }

    /// Model that follows this one, wrapping around. Used by editor cycling.
    #[must_use]
    pub fn next(self) -> Self {
        let index = (self.index() as usize + 1) % Self::ALL.len();
        Self::ALL[index]
    }
}

/// Commands that express all permissible world mutations.
#[derive(Clone, Debug, PartialEq)]
pub enum Command {
    /// Discards every pool entry and the live enemies, keeping only the sentinels.
    ResetLevelData,
    /// Replaces the choreography wholesale, typically after a file load.
    ReplaceChoreography {
        /// Store that becomes authoritative.
        choreography: Box<Choreography>,
    },
    /// Advances the simulation clock by the provided delta time.
    Tick {
        /// Duration of simulated time that elapsed since the previous tick.
        dt: Duration,
    },
    /// Appends a default-initialised path.
    CreatePath,
    /// Appends a default-initialised formation.
    CreateFormation,
    /// Appends an empty level.
    CreateLevel,
    /// Removes a path and repairs every reference to later paths.
    DeletePath {
        /// Path to remove.
        path: PathIndex,
    },
    /// Removes a formation and repairs every reference to later formations.
    DeleteFormation {
        /// Formation to remove.
        formation: FormationIndex,
    },
    /// Removes a level.
    DeleteLevel {
        /// Level to remove.
        level: LevelIndex,
    },
    /// Assigns a new human-readable identifier to a path.
    RenamePath {
        /// Path to rename.
        path: PathIndex,
        /// Identifier to assign.
        id: String,
    },
    /// Assigns a new human-readable identifier to a formation.
    RenameFormation {
        /// Formation to rename.
        formation: FormationIndex,
        /// Identifier to assign.
        id: String,
    },
    /// Inserts a waypoint into a path at the given position.
    InsertWaypoint {
        /// Path receiving the waypoint.
        path: PathIndex,
        /// Position the waypoint will occupy.
        position: usize,
        /// Waypoint to insert.
        waypoint: Waypoint,
    },
    /// Overwrites a waypoint of a path.
    UpdateWaypoint {
        /// Path owning the waypoint.
        path: PathIndex,
        /// Position of the waypoint.
        position: usize,
        /// Replacement waypoint.
        waypoint: Waypoint,
    },
    /// Removes a waypoint from a path.
    RemoveWaypoint {
        /// Path owning the waypoint.
        path: PathIndex,
        /// Position of the waypoint.
        position: usize,
    },
    /// Inserts a section into a formation at the given position.
    InsertSection {
        /// Formation receiving the section.
        formation: FormationIndex,
        /// Position the section will occupy.
        position: usize,
        /// Section to insert.
        section: FormationSection,
    },
    /// Overwrites a section of a formation.
    UpdateSection {
        /// Formation owning the section.
        formation: FormationIndex,
        /// Position of the section.
        position: usize,
        /// Replacement section.
        section: FormationSection,
    },
    /// Removes a section from a formation.
    RemoveSection {
        /// Formation owning the section.
        formation: FormationIndex,
        /// Position of the section.
        position: usize,
    },
    /// Inserts a wave into a level, keeping waves ordered by spawn time.
    InsertWave {
        /// Level receiving the wave.
        level: LevelIndex,
        /// Wave to insert.
        wave: Wave,
    },
    /// Overwrites a wave of a level.
    UpdateWave {
        /// Level owning the wave.
        level: LevelIndex,
        /// Position of the wave.
        position: usize,
        /// Replacement wave.
        wave: Wave,
    },
    /// Removes a wave from a level.
    RemoveWave {
        /// Level owning the wave.
        level: LevelIndex,
        /// Position of the wave.
        position: usize,
    },
    /// Spawns every section of a formation into the enemy range.
    SpawnFormation {
        /// Formation to spawn.
        formation: FormationIndex,
        /// Birth time of the first ship of each section.
        at_time_s: f32,
    },
    /// Spawns a single, possibly unsaved, section for editor preview.
    SpawnSectionPreview {
        /// Section describing ship count, path and model.
        section: FormationSection,
        /// Birth time of the first ship.
        at_time_s: f32,
    },
    /// Moves a live enemy to a freshly evaluated position.
    MoveEnemy {
        /// Enemy to move.
        enemy: EnemySlot,
        /// New world-space position.
        position: Vec3,
    },
    /// Marks an enemy as no longer alive.
    RetireEnemy {
        /// Enemy to retire.
        enemy: EnemySlot,
    },
    /// Retires every live enemy.
    ClearEnemies,
    /// Restarts the timeline of a level from its first wave.
    JumpToLevel {
        /// Level to run.
        level: LevelIndex,
    },
    /// Restarts the timeline of a level at one of its waves.
    JumpToWave {
        /// Level owning the wave.
        level: LevelIndex,
        /// Position of the wave within the level.
        wave: usize,
    },
}

/// Events broadcast by the world after processing commands.
#[derive(Clone, Debug, PartialEq)]
pub enum Event {
    /// Indicates that the simulation clock advanced.
    TimeAdvanced {
        /// Duration of simulated time that elapsed in the tick.
        dt: Duration,
    },
    /// Announces that the pools were rebuilt, either reset or replaced.
    LevelDataReset,
    /// Confirms that a path was appended.
    PathCreated {
        /// Index assigned to the new path.
        path: PathIndex,
    },
    /// Confirms that a path was removed and references repaired.
    PathDeleted {
        /// Index the path occupied before removal.
        path: PathIndex,
    },
    /// Confirms that a path received a new identifier.
    PathRenamed {
        /// Path that was renamed.
        path: PathIndex,
    },
    /// Confirms that the waypoints of a path changed.
    PathEdited {
        /// Path that changed.
        path: PathIndex,
    },
    /// Confirms that a formation was appended.
    FormationCreated {
        /// Index assigned to the new formation.
        formation: FormationIndex,
    },
    /// Confirms that a formation was removed and references repaired.
    FormationDeleted {
        /// Index the formation occupied before removal.
        formation: FormationIndex,
    },
    /// Confirms that a formation received a new identifier.
    FormationRenamed {
        /// Formation that was renamed.
        formation: FormationIndex,
    },
    /// Confirms that the sections of a formation changed.
    FormationEdited {
        /// Formation that changed.
        formation: FormationIndex,
    },
    /// Confirms that a level was appended.
    LevelCreated {
        /// Index assigned to the new level.
        level: LevelIndex,
    },
    /// Confirms that a level was removed.
    LevelDeleted {
        /// Index the level occupied before removal.
        level: LevelIndex,
    },
    /// Confirms that the waves of a level changed.
    LevelEdited {
        /// Level that changed.
        level: LevelIndex,
    },
    /// Confirms that an enemy was written into the enemy range.
    EnemySpawned {
        /// Slot the enemy occupies.
        enemy: EnemySlot,
        /// Path the enemy follows.
        path: PathIndex,
        /// Time at which the enemy starts moving.
        birth_time_s: f32,
        /// Visual model of the enemy.
        model: ShipModel,
    },
    /// Confirms that an enemy stopped being alive.
    EnemyRetired {
        /// Slot the enemy occupied.
        enemy: EnemySlot,
    },
    /// Instructs the scheduler to resume a level at the provided wave.
    TimelineJumped {
        /// Level to run.
        level: LevelIndex,
        /// Next unfired wave.
        wave: usize,
        /// Level-local clock value to resume from.
        clock_s: f32,
    },
    /// Reports that an editing command was rejected without side effects.
    EditRejected {
        /// Specific reason the command failed.
        reason: EditError,
    },
}

/// Immutable representation of a single enemy used for queries.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct EnemySnapshot {
    /// Slot within the shared entity array.
    pub slot: EnemySlot,
    /// Path the enemy follows.
    pub path: PathIndex,
    /// Time at which the enemy starts moving along its path.
    pub birth_time_s: f32,
    /// Last evaluated world-space position.
    pub position: Vec3,
    /// Visual model of the enemy.
    pub model: ShipModel,
}

/// Read-only snapshot describing every live enemy.
#[derive(Clone, Debug, Default)]
pub struct EnemyView {
    snapshots: Vec<EnemySnapshot>,
}

impl EnemyView {
    /// Creates a new enemy view from the provided snapshots.
    #[must_use]
    pub fn from_snapshots(mut snapshots: Vec<EnemySnapshot>) -> Self {
        snapshots.sort_by_key(|snapshot| snapshot.slot);
        Self { snapshots }
    }

    /// Iterator over the captured snapshots in slot order.
    pub fn iter(&self) -> impl Iterator<Item = &EnemySnapshot> {
        self.snapshots.iter()
    }

    /// Number of live enemies captured by the view.
    #[must_use]
    pub fn len(&self) -> usize {
        self.snapshots.len()
    }

    /// Reports whether no enemy is alive.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.snapshots.is_empty()
    }

    /// Consumes the view, yielding the underlying snapshots.
    #[must_use]
    pub fn into_vec(self) -> Vec<EnemySnapshot> {
        self.snapshots
    }
}
