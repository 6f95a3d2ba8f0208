//! Relational store holding the path, formation and level pools.
//!
//! Formations reference paths and waves reference formations by pool index.
//! Indices shift when an entry is removed, so every removal goes through the
//! store, which repairs the affected references in the same step.

use std::{cmp::Ordering, marker::PhantomData};

use glam::Vec3;
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::{FormationIndex, LevelIndex, PathIndex, ShipModel};

const DEFAULT_PATH_PREFIX: &str = "path";
const DEFAULT_FORMATION_PREFIX: &str = "formation";

/// Typed position within a [`Pool`].
pub trait PoolIndex: Copy + Eq + Ord {
    /// Wraps a raw position.
    fn from_position(position: usize) -> Self;

    /// Raw position within the pool.
    fn position(self) -> usize;

    /// Shifts the index to account for the removal of `removed`.
    ///
    /// Returns `None` when the index pointed at the removed entry itself.
    fn repaired_after_removal(self, removed: Self) -> Option<Self> {
        match self.position().cmp(&removed.position()) {
            Ordering::Less => Some(self),
            Ordering::Equal => None,
            Ordering::Greater => Some(Self::from_position(self.position() - 1)),
        }
    }
}

impl PoolIndex for PathIndex {
    fn from_position(position: usize) -> Self {
        Self::new(position)
    }

    fn position(self) -> usize {
        self.get()
    }
}

impl PoolIndex for FormationIndex {
    fn from_position(position: usize) -> Self {
        Self::new(position)
    }

    fn position(self) -> usize {
        self.get()
    }
}

impl PoolIndex for LevelIndex {
    fn from_position(position: usize) -> Self {
        Self::new(position)
    }

    fn position(self) -> usize {
        self.get()
    }
}

/// Insertion-ordered, index-addressable sequence of records.
#[derive(Clone, Debug, PartialEq)]
pub struct Pool<I, T> {
    entries: Vec<T>,
    index: PhantomData<I>,
}

impl<I: PoolIndex, T> Pool<I, T> {
    fn from_entries(entries: Vec<T>) -> Self {
        Self {
            entries,
            index: PhantomData,
        }
    }

    /// Number of entries, sentinel included.
    #[must_use]
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Reports whether the pool holds no entries at all.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Reports whether the index addresses an existing entry.
    #[must_use]
    pub fn contains(&self, index: I) -> bool {
        index.position() < self.entries.len()
    }

    /// Retrieves the entry stored at the index.
    #[must_use]
    pub fn get(&self, index: I) -> Option<&T> {
        self.entries.get(index.position())
    }

    /// Index of the last entry, if any.
    #[must_use]
    pub fn last_index(&self) -> Option<I> {
        self.entries.len().checked_sub(1).map(I::from_position)
    }

    /// Iterator over the entries in pool order.
    pub fn iter(&self) -> impl Iterator<Item = &T> {
        self.entries.iter()
    }

    /// Iterator over the entries paired with their typed index.
    pub fn iter_indexed(&self) -> impl Iterator<Item = (I, &T)> {
        self.entries
            .iter()
            .enumerate()
            .map(|(position, entry)| (I::from_position(position), entry))
    }

    fn get_mut(&mut self, index: I) -> Option<&mut T> {
        self.entries.get_mut(index.position())
    }

    fn iter_mut(&mut self) -> impl Iterator<Item = &mut T> {
        self.entries.iter_mut()
    }

    fn push(&mut self, entry: T) -> I {
        self.entries.push(entry);
        I::from_position(self.entries.len() - 1)
    }

    fn remove(&mut self, index: I) -> Option<T> {
        if self.contains(index) {
            Some(self.entries.remove(index.position()))
        } else {
            None
        }
    }
}

/// Curve anchor plus the control handle steering the segment that ends here.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct Waypoint {
    /// Anchor the curve passes through.
    pub point: Vec3,
    /// Quadratic Bézier control point of the segment ending at `point`.
    pub control: Vec3,
}

impl Waypoint {
    /// Creates a waypoint from an anchor and a control point.
    #[must_use]
    pub const fn new(point: Vec3, control: Vec3) -> Self {
        Self { point, control }
    }

    /// Creates a waypoint whose control point coincides with its anchor.
    #[must_use]
    pub const fn at(point: Vec3) -> Self {
        Self {
            point,
            control: point,
        }
    }
}

/// Named route made of at least one waypoint.
#[derive(Clone, Debug, PartialEq)]
pub struct Path {
    id: String,
    waypoints: Vec<Waypoint>,
}

impl Path {
    /// Creates a path, inserting a waypoint at the origin when none are given.
    #[must_use]
    pub fn new(id: impl Into<String>, mut waypoints: Vec<Waypoint>) -> Self {
        if waypoints.is_empty() {
            waypoints.push(Waypoint::at(Vec3::ZERO));
        }
        Self {
            id: id.into(),
            waypoints,
        }
    }

    fn sentinel() -> Self {
        Self::new(String::new(), Vec::new())
    }

    /// Human-readable identifier persisted to disk.
    #[must_use]
    pub fn id(&self) -> &str {
        &self.id
    }

    /// Ordered waypoints of the route.
    #[must_use]
    pub fn waypoints(&self) -> &[Waypoint] {
        &self.waypoints
    }

    /// Anchor of the first waypoint.
    #[must_use]
    pub fn start(&self) -> Vec3 {
        self.waypoints.first().map_or(Vec3::ZERO, |first| first.point)
    }

    /// Number of curve segments, one per pair of consecutive waypoints.
    #[must_use]
    pub fn segment_count(&self) -> usize {
        self.waypoints.len().saturating_sub(1)
    }
}

/// Ships sharing one path and one model within a formation.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct FormationSection {
    /// Path followed by every ship of the section.
    pub path: PathIndex,
    /// Number of ships spawned, at least one.
    pub ship_count: u32,
    /// Visual model of the ships.
    pub model: ShipModel,
}

impl FormationSection {
    /// Creates a new section descriptor.
    #[must_use]
    pub const fn new(path: PathIndex, ship_count: u32, model: ShipModel) -> Self {
        Self {
            path,
            ship_count,
            model,
        }
    }
}

/// Named group of sections sharing one activation time.
#[derive(Clone, Debug, PartialEq)]
pub struct Formation {
    id: String,
    sections: Vec<FormationSection>,
}

impl Formation {
    /// Creates a formation, inserting a single-ship section on the sentinel
    /// path when none are given.
    #[must_use]
    pub fn new(id: impl Into<String>, mut sections: Vec<FormationSection>) -> Self {
        if sections.is_empty() {
            sections.push(FormationSection::new(
                PathIndex::SENTINEL,
                1,
                ShipModel::default(),
            ));
        }
        Self {
            id: id.into(),
            sections,
        }
    }

    fn sentinel() -> Self {
        Self::new(String::new(), Vec::new())
    }

    /// Human-readable identifier persisted to disk.
    #[must_use]
    pub fn id(&self) -> &str {
        &self.id
    }

    /// Ordered sections of the formation.
    #[must_use]
    pub fn sections(&self) -> &[FormationSection] {
        &self.sections
    }

    /// Total number of ships spawned by the formation.
    #[must_use]
    pub fn ship_count(&self) -> u32 {
        self.sections
            .iter()
            .map(|section| section.ship_count)
            .sum()
    }
}

/// Scheduled activation of a formation.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct Wave {
    /// Level-local time at which the formation spawns.
    pub spawn_time_s: f32,
    /// Formation spawned by the wave.
    pub formation: FormationIndex,
}

impl Wave {
    /// Creates a new wave descriptor.
    #[must_use]
    pub const fn new(spawn_time_s: f32, formation: FormationIndex) -> Self {
        Self {
            spawn_time_s,
            formation,
        }
    }
}

/// Ordered waves making up one stage.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct Level {
    waves: Vec<Wave>,
}

impl Level {
    /// Creates a level from its waves, ordering them by spawn time.
    ///
    /// Waves sharing a spawn time keep their relative order.
    #[must_use]
    pub fn new(mut waves: Vec<Wave>) -> Self {
        waves.sort_by(|a, b| a.spawn_time_s.total_cmp(&b.spawn_time_s));
        Self { waves }
    }

    /// Waves in timeline order.
    #[must_use]
    pub fn waves(&self) -> &[Wave] {
        &self.waves
    }
}

/// Reasons an editing operation may be rejected.
#[derive(Clone, Debug, PartialEq, Eq, Hash, Error, Serialize, Deserialize)]
pub enum EditError {
    /// No path exists at the index.
    #[error("path {} does not exist", .path.get())]
    PathOutOfRange {
        /// Offending index.
        path: PathIndex,
    },
    /// No formation exists at the index.
    #[error("formation {} does not exist", .formation.get())]
    FormationOutOfRange {
        /// Offending index.
        formation: FormationIndex,
    },
    /// No level exists at the index.
    #[error("level {} does not exist", .level.get())]
    LevelOutOfRange {
        /// Offending index.
        level: LevelIndex,
    },
    /// The waypoint position lies outside the path.
    #[error("waypoint {position} does not exist on path {}", .path.get())]
    WaypointOutOfRange {
        /// Path addressed by the edit.
        path: PathIndex,
        /// Offending position.
        position: usize,
    },
    /// The section position lies outside the formation.
    #[error("section {position} does not exist in formation {}", .formation.get())]
    SectionOutOfRange {
        /// Formation addressed by the edit.
        formation: FormationIndex,
        /// Offending position.
        position: usize,
    },
    /// The wave position lies outside the level.
    #[error("wave {position} does not exist in level {}", .level.get())]
    WaveOutOfRange {
        /// Level addressed by the edit.
        level: LevelIndex,
        /// Offending position.
        position: usize,
    },
    /// The reserved entry at index zero is read-only.
    #[error("the reserved sentinel entry cannot be edited")]
    SentinelEntry,
    /// Identifiers must contain at least one visible character.
    #[error("identifiers cannot be empty")]
    EmptyId,
    /// Another entry of the same pool already uses the identifier.
    #[error("identifier '{id}' is already in use")]
    DuplicateId {
        /// Identifier that collided.
        id: String,
    },
    /// A path keeps at least one waypoint.
    #[error("path {} must keep at least one waypoint", .path.get())]
    LastWaypoint {
        /// Path addressed by the edit.
        path: PathIndex,
    },
    /// A formation keeps at least one section.
    #[error("formation {} must keep at least one section", .formation.get())]
    LastSection {
        /// Formation addressed by the edit.
        formation: FormationIndex,
    },
    /// Sections spawn at least one ship.
    #[error("formation sections need at least one ship")]
    InvalidShipCount,
    /// Spawn times are finite and non-negative.
    #[error("wave spawn times must be finite and non-negative")]
    InvalidSpawnTime,
    /// Live enemies still follow the path.
    #[error("path {} is followed by {enemies} live enemies", .path.get())]
    PathInUse {
        /// Path addressed by the edit.
        path: PathIndex,
        /// Number of live enemies following the path.
        enemies: usize,
    },
}

/// The three choreography pools with their reserved sentinel entries.
#[derive(Clone, Debug, PartialEq)]
pub struct Choreography {
    paths: Pool<PathIndex, Path>,
    formations: Pool<FormationIndex, Formation>,
    levels: Pool<LevelIndex, Level>,
}

impl Default for Choreography {
    fn default() -> Self {
        Self::new()
    }
}

impl Choreography {
    /// Creates a store holding only the sentinel path and formation.
    #[must_use]
    pub fn new() -> Self {
        Self {
            paths: Pool::from_entries(vec![Path::sentinel()]),
            formations: Pool::from_entries(vec![Formation::sentinel()]),
            levels: Pool::from_entries(Vec::new()),
        }
    }

    /// Builds a store from records whose references are already resolved.
    ///
    /// Indices are interpreted relative to the final pools, sentinels
    /// included. References that fall outside the pools are reset to the
    /// sentinel entry.
    #[must_use]
    pub fn from_parts(paths: Vec<Path>, formations: Vec<Formation>, levels: Vec<Level>) -> Self {
        let mut choreography = Self::new();
        choreography.paths.entries.extend(paths);
        choreography.formations.entries.extend(formations);
        choreography.levels.entries.extend(levels);

        let path_count = choreography.paths.len();
        for formation in choreography.formations.iter_mut() {
            for section in &mut formation.sections {
                if section.path.get() >= path_count {
                    section.path = PathIndex::SENTINEL;
                }
                section.ship_count = section.ship_count.max(1);
            }
        }

        let formation_count = choreography.formations.len();
        for level in choreography.levels.iter_mut() {
            for wave in &mut level.waves {
                if wave.formation.get() >= formation_count {
                    wave.formation = FormationIndex::SENTINEL;
                }
            }
        }

        choreography
    }

    /// Path pool, sentinel included.
    #[must_use]
    pub fn paths(&self) -> &Pool<PathIndex, Path> {
        &self.paths
    }

    /// Formation pool, sentinel included.
    #[must_use]
    pub fn formations(&self) -> &Pool<FormationIndex, Formation> {
        &self.formations
    }

    /// Level pool.
    #[must_use]
    pub fn levels(&self) -> &Pool<LevelIndex, Level> {
        &self.levels
    }

    /// Retrieves a path by index.
    #[must_use]
    pub fn path(&self, path: PathIndex) -> Option<&Path> {
        self.paths.get(path)
    }

    /// Retrieves a formation by index.
    #[must_use]
    pub fn formation(&self, formation: FormationIndex) -> Option<&Formation> {
        self.formations.get(formation)
    }

    /// Retrieves a level by index.
    #[must_use]
    pub fn level(&self, level: LevelIndex) -> Option<&Level> {
        self.levels.get(level)
    }

    /// Paths visible to editors and persisted to disk.
    pub fn editable_paths(&self) -> impl Iterator<Item = (PathIndex, &Path)> {
        self.paths.iter_indexed().skip(1)
    }

    /// Formations visible to editors and persisted to disk.
    pub fn editable_formations(&self) -> impl Iterator<Item = (FormationIndex, &Formation)> {
        self.formations.iter_indexed().skip(1)
    }

    /// Index of the first non-sentinel path carrying the identifier.
    #[must_use]
    pub fn find_path(&self, id: &str) -> Option<PathIndex> {
        self.editable_paths()
            .find(|(_, path)| path.id == id)
            .map(|(index, _)| index)
    }

    /// Index of the first non-sentinel formation carrying the identifier.
    #[must_use]
    pub fn find_formation(&self, id: &str) -> Option<FormationIndex> {
        self.editable_formations()
            .find(|(_, formation)| formation.id == id)
            .map(|(index, _)| index)
    }

    /// Appends a path with a unique identifier and a single straight segment.
    pub fn create_path(&mut self) -> PathIndex {
        let id = unique_id(
            DEFAULT_PATH_PREFIX,
            self.paths.len(),
            self.paths.iter().map(Path::id),
        );
        self.paths.push(Path::new(
            id,
            vec![
                Waypoint::at(Vec3::new(0.0, 10.0, 0.0)),
                Waypoint::new(Vec3::new(0.0, -10.0, 0.0), Vec3::ZERO),
            ],
        ))
    }

    /// Appends a formation with a unique identifier and one single-ship section.
    pub fn create_formation(&mut self) -> FormationIndex {
        let id = unique_id(
            DEFAULT_FORMATION_PREFIX,
            self.formations.len(),
            self.formations.iter().map(Formation::id),
        );
        let path = if self.paths.len() > 1 {
            PathIndex::new(1)
        } else {
            PathIndex::SENTINEL
        };
        self.formations.push(Formation::new(
            id,
            vec![FormationSection::new(path, 1, ShipModel::default())],
        ))
    }

    /// Appends an empty level.
    pub fn create_level(&mut self) -> LevelIndex {
        self.levels.push(Level::default())
    }

    /// Removes a path and repairs the formation sections referencing paths.
    ///
    /// Sections that referenced the removed path fall back to the sentinel.
    pub fn delete_path(&mut self, path: PathIndex) -> Result<Path, EditError> {
        self.check_path_editable(path)?;
        let removed = self
            .paths
            .remove(path)
            .ok_or(EditError::PathOutOfRange { path })?;
        for formation in self.formations.iter_mut() {
            for section in &mut formation.sections {
                section.path = section
                    .path
                    .repaired_after_removal(path)
                    .unwrap_or(PathIndex::SENTINEL);
            }
        }
        Ok(removed)
    }

    /// Removes a formation and repairs the waves referencing formations.
    ///
    /// Waves that referenced the removed formation fall back to the sentinel.
    pub fn delete_formation(&mut self, formation: FormationIndex) -> Result<Formation, EditError> {
        self.check_formation_editable(formation)?;
        let removed = self
            .formations
            .remove(formation)
            .ok_or(EditError::FormationOutOfRange { formation })?;
        for level in self.levels.iter_mut() {
            for wave in &mut level.waves {
                wave.formation = wave
                    .formation
                    .repaired_after_removal(formation)
                    .unwrap_or(FormationIndex::SENTINEL);
            }
        }
        Ok(removed)
    }

    /// Removes a level. Nothing in the store references levels.
    pub fn delete_level(&mut self, level: LevelIndex) -> Result<Level, EditError> {
        self.levels
            .remove(level)
            .ok_or(EditError::LevelOutOfRange { level })
    }

    /// Assigns a new identifier to a path.
    pub fn rename_path(&mut self, path: PathIndex, id: &str) -> Result<(), EditError> {
        self.check_path_editable(path)?;
        let id = validate_id(id, path, self.editable_paths().map(|(i, p)| (i, p.id())))?;
        if let Some(entry) = self.paths.get_mut(path) {
            entry.id = id;
        }
        Ok(())
    }

    /// Assigns a new identifier to a formation.
    pub fn rename_formation(
        &mut self,
        formation: FormationIndex,
        id: &str,
    ) -> Result<(), EditError> {
        self.check_formation_editable(formation)?;
        let id = validate_id(
            id,
            formation,
            self.editable_formations().map(|(i, f)| (i, f.id())),
        )?;
        if let Some(entry) = self.formations.get_mut(formation) {
            entry.id = id;
        }
        Ok(())
    }

    /// Inserts a waypoint so that it occupies `position`.
    pub fn insert_waypoint(
        &mut self,
        path: PathIndex,
        position: usize,
        waypoint: Waypoint,
    ) -> Result<(), EditError> {
        let waypoints = self.waypoints_mut(path)?;
        if position > waypoints.len() {
            return Err(EditError::WaypointOutOfRange { path, position });
        }
        waypoints.insert(position, waypoint);
        Ok(())
    }

    /// Overwrites the waypoint at `position`.
    pub fn update_waypoint(
        &mut self,
        path: PathIndex,
        position: usize,
        waypoint: Waypoint,
    ) -> Result<(), EditError> {
        let slot = self
            .waypoints_mut(path)?
            .get_mut(position)
            .ok_or(EditError::WaypointOutOfRange { path, position })?;
        *slot = waypoint;
        Ok(())
    }

    /// Removes the waypoint at `position`, keeping at least one.
    pub fn remove_waypoint(
        &mut self,
        path: PathIndex,
        position: usize,
    ) -> Result<Waypoint, EditError> {
        let waypoints = self.waypoints_mut(path)?;
        if position >= waypoints.len() {
            return Err(EditError::WaypointOutOfRange { path, position });
        }
        if waypoints.len() == 1 {
            return Err(EditError::LastWaypoint { path });
        }
        Ok(waypoints.remove(position))
    }

    /// Inserts a section so that it occupies `position`.
    pub fn insert_section(
        &mut self,
        formation: FormationIndex,
        position: usize,
        section: FormationSection,
    ) -> Result<(), EditError> {
        self.check_section(section)?;
        let sections = self.sections_mut(formation)?;
        if position > sections.len() {
            return Err(EditError::SectionOutOfRange {
                formation,
                position,
            });
        }
        sections.insert(position, section);
        Ok(())
    }

    /// Overwrites the section at `position`.
    pub fn update_section(
        &mut self,
        formation: FormationIndex,
        position: usize,
        section: FormationSection,
    ) -> Result<(), EditError> {
        self.check_section(section)?;
        let slot = self
            .sections_mut(formation)?
            .get_mut(position)
            .ok_or(EditError::SectionOutOfRange {
                formation,
                position,
            })?;
        *slot = section;
        Ok(())
    }

    /// Removes the section at `position`, keeping at least one.
    pub fn remove_section(
        &mut self,
        formation: FormationIndex,
        position: usize,
    ) -> Result<FormationSection, EditError> {
        let sections = self.sections_mut(formation)?;
        if position >= sections.len() {
            return Err(EditError::SectionOutOfRange {
                formation,
                position,
            });
        }
        if sections.len() == 1 {
            return Err(EditError::LastSection { formation });
        }
        Ok(sections.remove(position))
    }

    /// Inserts a wave after every wave spawning at the same time or earlier.
    ///
    /// Returns the position the wave landed on.
    pub fn insert_wave(&mut self, level: LevelIndex, wave: Wave) -> Result<usize, EditError> {
        self.check_wave(wave)?;
        let waves = self.waves_mut(level)?;
        let position = waves.partition_point(|existing| existing.spawn_time_s <= wave.spawn_time_s);
        waves.insert(position, wave);
        Ok(position)
    }

    /// Overwrites the wave at `position`, re-sorting the level by spawn time.
    pub fn update_wave(
        &mut self,
        level: LevelIndex,
        position: usize,
        wave: Wave,
    ) -> Result<(), EditError> {
        self.check_wave(wave)?;
        let waves = self.waves_mut(level)?;
        let slot = waves
            .get_mut(position)
            .ok_or(EditError::WaveOutOfRange { level, position })?;
        *slot = wave;
        waves.sort_by(|a, b| a.spawn_time_s.total_cmp(&b.spawn_time_s));
        Ok(())
    }

    /// Removes the wave at `position`.
    pub fn remove_wave(&mut self, level: LevelIndex, position: usize) -> Result<Wave, EditError> {
        let waves = self.waves_mut(level)?;
        if position >= waves.len() {
            return Err(EditError::WaveOutOfRange { level, position });
        }
        Ok(waves.remove(position))
    }

    fn check_path_editable(&self, path: PathIndex) -> Result<(), EditError> {
        if path == PathIndex::SENTINEL {
            return Err(EditError::SentinelEntry);
        }
        if !self.paths.contains(path) {
            return Err(EditError::PathOutOfRange { path });
        }
        Ok(())
    }

    fn check_formation_editable(&self, formation: FormationIndex) -> Result<(), EditError> {
        if formation == FormationIndex::SENTINEL {
            return Err(EditError::SentinelEntry);
        }
        if !self.formations.contains(formation) {
            return Err(EditError::FormationOutOfRange { formation });
        }
        Ok(())
    }

    fn check_section(&self, section: FormationSection) -> Result<(), EditError> {
        if section.ship_count == 0 {
            return Err(EditError::InvalidShipCount);
        }
        if !self.paths.contains(section.path) {
            return Err(EditError::PathOutOfRange { path: section.path });
        }
        Ok(())
    }

    fn check_wave(&self, wave: Wave) -> Result<(), EditError> {
        if !wave.spawn_time_s.is_finite() || wave.spawn_time_s < 0.0 {
            return Err(EditError::InvalidSpawnTime);
        }
        if !self.formations.contains(wave.formation) {
            return Err(EditError::FormationOutOfRange {
                formation: wave.formation,
            });
        }
        Ok(())
    }

    fn waypoints_mut(&mut self, path: PathIndex) -> Result<&mut Vec<Waypoint>, EditError> {
        self.check_path_editable(path)?;
        self.paths
            .get_mut(path)
            .map(|entry| &mut entry.waypoints)
            .ok_or(EditError::PathOutOfRange { path })
    }

    fn sections_mut(
        &mut self,
        formation: FormationIndex,
    ) -> Result<&mut Vec<FormationSection>, EditError> {
        self.check_formation_editable(formation)?;
        self.formations
            .get_mut(formation)
            .map(|entry| &mut entry.sections)
            .ok_or(EditError::FormationOutOfRange { formation })
    }

    fn waves_mut(&mut self, level: LevelIndex) -> Result<&mut Vec<Wave>, EditError> {
        self.levels
            .get_mut(level)
            .map(|entry| &mut entry.waves)
            .ok_or(EditError::LevelOutOfRange { level })
    }
}

fn unique_id<'a>(prefix: &str, start: usize, taken: impl Iterator<Item = &'a str>) -> String {
    let taken: Vec<&str> = taken.collect();
    let mut suffix = start;
    loop {
        let candidate = format!("{prefix}{suffix}");
        if !taken.contains(&candidate.as_str()) {
            return candidate;
        }
        suffix += 1;
    }
}

fn validate_id<'a, I: PoolIndex>(
    id: &str,
    owner: I,
    existing: impl Iterator<Item = (I, &'a str)>,
) -> Result<String, EditError> {
    let id = id.trim();
    if id.is_empty() {
        return Err(EditError::EmptyId);
    }
    if existing
        .filter(|(index, _)| *index != owner)
        .any(|(_, other)| other == id)
    {
        return Err(EditError::DuplicateId { id: id.to_owned() });
    }
    Ok(id.to_owned())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn store_with_paths(count: usize) -> Choreography {
        let mut choreography = Choreography::new();
        for _ in 0..count {
            let _ = choreography.create_path();
        }
        choreography
    }

    fn section_paths(choreography: &Choreography, formation: FormationIndex) -> Vec<usize> {
        choreography
            .formation(formation)
            .expect("formation exists")
            .sections()
            .iter()
            .map(|section| section.path.get())
            .collect()
    }

    #[test]
    fn new_store_holds_only_sentinels() {
        let choreography = Choreography::new();
        assert_eq!(choreography.paths().len(), 1);
        assert_eq!(choreography.formations().len(), 1);
        assert!(choreography.levels().is_empty());
        assert_eq!(choreography.editable_paths().count(), 0);
        assert_eq!(choreography.editable_formations().count(), 0);
    }

    #[test]
    fn deleting_path_decrements_later_references() {
        let mut choreography = store_with_paths(7);
        let formation = choreography.create_formation();
        for (position, path) in [2, 5, 7].into_iter().enumerate() {
            choreography
                .insert_section(
                    formation,
                    position,
                    FormationSection::new(PathIndex::new(path), 1, ShipModel::Fighter),
                )
                .expect("section inserted");
        }
        let _ = choreography
            .remove_section(formation, 3)
            .expect("default section removed");
        assert_eq!(section_paths(&choreography, formation), vec![2, 5, 7]);

        let _ = choreography
            .delete_path(PathIndex::new(3))
            .expect("path deleted");

        assert_eq!(section_paths(&choreography, formation), vec![2, 4, 6]);
    }

    #[test]
    fn deleting_referenced_path_falls_back_to_sentinel() {
        let mut choreography = store_with_paths(2);
        let formation = choreography.create_formation();
        choreography
            .update_section(
                formation,
                0,
                FormationSection::new(PathIndex::new(2), 3, ShipModel::Bomber),
            )
            .expect("section updated");

        let _ = choreography
            .delete_path(PathIndex::new(2))
            .expect("path deleted");

        assert_eq!(section_paths(&choreography, formation), vec![0]);
    }

    #[test]
    fn deleting_formation_repairs_waves() {
        let mut choreography = store_with_paths(1);
        let first = choreography.create_formation();
        let second = choreography.create_formation();
        let third = choreography.create_formation();
        let level = choreography.create_level();
        for (time, formation) in [(1.0, first), (2.0, second), (3.0, third)] {
            let _ = choreography
                .insert_wave(level, Wave::new(time, formation))
                .expect("wave inserted");
        }

        let _ = choreography.delete_formation(second).expect("deleted");

        let formations: Vec<usize> = choreography
            .level(level)
            .expect("level exists")
            .waves()
            .iter()
            .map(|wave| wave.formation.get())
            .collect();
        assert_eq!(formations, vec![1, 0, 2]);
    }

    #[test]
    fn sentinel_entries_are_read_only() {
        let mut choreography = store_with_paths(1);
        assert_eq!(
            choreography.delete_path(PathIndex::SENTINEL),
            Err(EditError::SentinelEntry)
        );
        assert_eq!(
            choreography.rename_formation(FormationIndex::SENTINEL, "x"),
            Err(EditError::SentinelEntry)
        );
        assert_eq!(
            choreography.remove_waypoint(PathIndex::SENTINEL, 0),
            Err(EditError::SentinelEntry)
        );
    }

    #[test]
    fn out_of_range_edits_are_rejected() {
        let mut choreography = Choreography::new();
        assert_eq!(
            choreography.delete_path(PathIndex::new(4)),
            Err(EditError::PathOutOfRange {
                path: PathIndex::new(4)
            })
        );
        assert_eq!(
            choreography.delete_level(LevelIndex::new(0)),
            Err(EditError::LevelOutOfRange {
                level: LevelIndex::new(0)
            })
        );
    }

    #[test]
    fn rename_rejects_empty_and_duplicate_ids() {
        let mut choreography = store_with_paths(2);
        let first = PathIndex::new(1);
        let second = PathIndex::new(2);

        choreography.rename_path(first, " swoop ").expect("renamed");
        assert_eq!(choreography.path(first).map(Path::id), Some("swoop"));
        assert_eq!(choreography.find_path("swoop"), Some(first));

        assert_eq!(
            choreography.rename_path(second, "swoop"),
            Err(EditError::DuplicateId {
                id: "swoop".to_owned()
            })
        );
        assert_eq!(
            choreography.rename_path(second, "   "),
            Err(EditError::EmptyId)
        );
        choreography
            .rename_path(first, "swoop")
            .expect("renaming to the same id is allowed");
    }

    #[test]
    fn created_ids_stay_unique_after_deletion() {
        let mut choreography = store_with_paths(3);
        let _ = choreography
            .delete_path(PathIndex::new(1))
            .expect("deleted");
        let created = choreography.create_path();
        let ids: Vec<&str> = choreography.editable_paths().map(|(_, p)| p.id()).collect();
        assert_eq!(created, PathIndex::new(3));
        assert_eq!(ids, vec!["path2", "path3", "path4"]);
    }

    #[test]
    fn waypoint_edits_keep_at_least_one_waypoint() {
        let mut choreography = store_with_paths(1);
        let path = PathIndex::new(1);
        let _ = choreography.remove_waypoint(path, 1).expect("removed");
        assert_eq!(
            choreography.remove_waypoint(path, 0),
            Err(EditError::LastWaypoint { path })
        );
        assert_eq!(
            choreography.insert_waypoint(path, 3, Waypoint::at(Vec3::ONE)),
            Err(EditError::WaypointOutOfRange { path, position: 3 })
        );
        choreography
            .insert_waypoint(path, 1, Waypoint::at(Vec3::ONE))
            .expect("inserted");
        assert_eq!(choreography.path(path).map(Path::segment_count), Some(1));
    }

    #[test]
    fn inserted_waves_stay_sorted_by_spawn_time() {
        let mut choreography = Choreography::new();
        let level = choreography.create_level();
        let formation = FormationIndex::SENTINEL;
        for time in [3.0, 1.0, 2.0, 1.0] {
            let _ = choreography
                .insert_wave(level, Wave::new(time, formation))
                .expect("inserted");
        }
        let times: Vec<f32> = choreography
            .level(level)
            .expect("level exists")
            .waves()
            .iter()
            .map(|wave| wave.spawn_time_s)
            .collect();
        assert_eq!(times, vec![1.0, 1.0, 2.0, 3.0]);

        assert_eq!(
            choreography.insert_wave(level, Wave::new(-1.0, formation)),
            Err(EditError::InvalidSpawnTime)
        );
    }

    #[test]
    fn formations_always_keep_a_section() {
        let formation = Formation::new("empty", Vec::new());
        assert_eq!(
            formation.sections(),
            &[FormationSection::new(PathIndex::SENTINEL, 1, ShipModel::Drone)]
        );

        let choreography = Choreography::from_parts(Vec::new(), vec![formation], Vec::new());
        let loaded = choreography
            .formation(FormationIndex::new(1))
            .expect("formation exists");
        assert_eq!(loaded.sections().len(), 1);
        assert_eq!(loaded.ship_count(), 1);
    }

    #[test]
    fn updated_wave_moves_to_keep_order() {
        let mut choreography = Choreography::new();
        let level = choreography.create_level();
        for time in [1.0, 2.0, 3.0] {
            let _ = choreography
                .insert_wave(level, Wave::new(time, FormationIndex::SENTINEL))
                .expect("inserted");
        }

        choreography
            .update_wave(level, 0, Wave::new(2.5, FormationIndex::SENTINEL))
            .expect("updated");

        let times: Vec<f32> = choreography
            .level(level)
            .expect("level exists")
            .waves()
            .iter()
            .map(|wave| wave.spawn_time_s)
            .collect();
        assert_eq!(times, vec![2.0, 2.5, 3.0]);
    }

    #[test]
    fn sections_validate_ship_count_and_path() {
        let mut choreography = store_with_paths(1);
        let formation = choreography.create_formation();
        assert_eq!(
            choreography.update_section(
                formation,
                0,
                FormationSection::new(PathIndex::new(1), 0, ShipModel::Drone)
            ),
            Err(EditError::InvalidShipCount)
        );
        assert_eq!(
            choreography.update_section(
                formation,
                0,
                FormationSection::new(PathIndex::new(8), 1, ShipModel::Drone)
            ),
            Err(EditError::PathOutOfRange {
                path: PathIndex::new(8)
            })
        );
        assert_eq!(
            choreography.remove_section(formation, 0),
            Err(EditError::LastSection { formation })
        );
    }

    #[test]
    fn from_parts_resets_dangling_references() {
        let choreography = Choreography::from_parts(
            vec![Path::new("a", Vec::new())],
            vec![Formation::new(
                "f",
                vec![FormationSection::new(PathIndex::new(9), 0, ShipModel::Drone)],
            )],
            vec![Level::new(vec![Wave::new(0.5, FormationIndex::new(5))])],
        );

        let section = choreography.formation(FormationIndex::new(1)).expect("f").sections()[0];
        assert_eq!(section.path, PathIndex::SENTINEL);
        assert_eq!(section.ship_count, 1);
        let wave = choreography.level(LevelIndex::new(0)).expect("level").waves()[0];
        assert_eq!(wave.formation, FormationIndex::SENTINEL);
        assert_eq!(
            choreography.path(PathIndex::new(1)).map(|p| p.waypoints().len()),
            Some(1)
        );
    }
}
