#![deny(
    unsafe_code,
    missing_docs,
    dead_code,
    unused_results,
    non_snake_case,
    unreachable_pub
)]

//! Pure editor system that translates discrete UI input into choreography commands.
//!
//! The editor is a small state machine over listing and editing screens for
//! each pool. Listing screens cache the selectable index range and refresh it
//! whenever the world reports a structural change.

use skyweave_core::{
    Choreography, Command, EditError, Event, FormationIndex, FormationSection, Level, LevelIndex,
    PathIndex, PoolIndex, ShipModel, Wave, Waypoint,
};

/// Gap between the last wave of a level and a wave appended after it.
const NEW_WAVE_SPACING_S: f32 = 1.0;

/// Pool that a group of editor screens operates on.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum Tab {
    /// Path listing and waypoint editing.
    Paths,
    /// Formation listing and section editing.
    Formations,
    /// Level listing and wave editing.
    Levels,
}

impl Tab {
    /// Tab that follows this one, wrapping around.
    #[must_use]
    pub const fn next(self) -> Self {
        match self {
            Self::Paths => Self::Formations,
            Self::Formations => Self::Levels,
            Self::Levels => Self::Paths,
        }
    }
}

/// Active editor screen together with the cursor relevant to it.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum EditorMode {
    /// Lists the editable paths.
    PathList {
        /// Highlighted path.
        selected: PathIndex,
    },
    /// Edits the waypoints of one path.
    PathEdit {
        /// Path being edited.
        path: PathIndex,
        /// Highlighted waypoint.
        waypoint: usize,
    },
    /// Lists the editable formations.
    FormationList {
        /// Highlighted formation.
        selected: FormationIndex,
    },
    /// Edits the sections of one formation.
    FormationEdit {
        /// Formation being edited.
        formation: FormationIndex,
        /// Highlighted section.
        section: usize,
    },
    /// Lists the levels.
    LevelList {
        /// Highlighted level.
        selected: LevelIndex,
    },
    /// Edits the waves of one level.
    LevelEdit {
        /// Level being edited.
        level: LevelIndex,
        /// Highlighted wave.
        wave: usize,
    },
}

impl EditorMode {
    /// Pool the mode operates on.
    #[must_use]
    pub const fn tab(&self) -> Tab {
        match self {
            Self::PathList { .. } | Self::PathEdit { .. } => Tab::Paths,
            Self::FormationList { .. } | Self::FormationEdit { .. } => Tab::Formations,
            Self::LevelList { .. } | Self::LevelEdit { .. } => Tab::Levels,
        }
    }

    /// Reports whether the mode is a listing screen.
    #[must_use]
    pub const fn is_listing(&self) -> bool {
        matches!(
            self,
            Self::PathList { .. } | Self::FormationList { .. } | Self::LevelList { .. }
        )
    }

    fn list(tab: Tab, position: usize) -> Self {
        match tab {
            Tab::Paths => Self::PathList {
                selected: PathIndex::new(position),
            },
            Tab::Formations => Self::FormationList {
                selected: FormationIndex::new(position),
            },
            Tab::Levels => Self::LevelList {
                selected: LevelIndex::new(position),
            },
        }
    }
}

/// Selectable index range of a listing screen.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct ListBounds {
    first_index: usize,
    last_index: Option<usize>,
}

impl ListBounds {
    /// Computes the selectable range of the pool behind `tab`.
    ///
    /// Path and formation listings start at 1 so the sentinel is never
    /// offered; level listings start at 0.
    #[must_use]
    pub fn of(tab: Tab, choreography: &Choreography) -> Self {
        let (first_index, len) = match tab {
            Tab::Paths => (1, choreography.paths().len()),
            Tab::Formations => (1, choreography.formations().len()),
            Tab::Levels => (0, choreography.levels().len()),
        };
        let last_index = len.checked_sub(1).filter(|last| *last >= first_index);
        Self {
            first_index,
            last_index,
        }
    }

    /// First selectable index.
    #[must_use]
    pub const fn first_index(&self) -> usize {
        self.first_index
    }

    /// Last selectable index, or `None` when nothing can be selected.
    #[must_use]
    pub const fn last_index(&self) -> Option<usize> {
        self.last_index
    }

    /// Reports whether `index` can be selected.
    #[must_use]
    pub fn contains(&self, index: usize) -> bool {
        self.last_index
            .is_some_and(|last| (self.first_index..=last).contains(&index))
    }

    fn clamp(&self, index: usize) -> usize {
        match self.last_index {
            Some(last) => index.clamp(self.first_index, last),
            None => self.first_index,
        }
    }
}

/// Discrete user intent delivered by the editing UI.
#[derive(Clone, Debug, PartialEq)]
pub enum EditorInput {
    /// Moves the cursor towards the start of the list.
    Up,
    /// Moves the cursor towards the end of the list.
    Down,
    /// Opens the highlighted entry for editing.
    Select,
    /// Returns from an editing screen to its listing.
    Back,
    /// Appends an entry or inserts an element after the cursor.
    Create,
    /// Removes the highlighted entry or element.
    Delete,
    /// Assigns a new identifier to the highlighted path or formation.
    Rename(String),
    /// Switches to the listing of the next pool.
    NextTab,
    /// Spawns enemies or scrubs the timeline to show the highlighted entry.
    Preview,
    /// Restarts the highlighted level from its first wave.
    Jump,
    /// Overwrites the waypoint under the cursor.
    SetWaypoint(Waypoint),
    /// Changes the ship count of the section under the cursor, never below one.
    AdjustShips(i32),
    /// Gives the section under the cursor the next ship model.
    CycleModel,
    /// Moves the section under the cursor onto the next editable path.
    CyclePath,
    /// Moves the wave under the cursor to a new spawn time.
    SetSpawnTime(f32),
    /// Gives the wave under the cursor the next editable formation.
    CycleFormation,
}

/// Editor system that tracks the active screen and emits editing commands.
#[derive(Clone, Debug, PartialEq)]
pub struct Editor {
    mode: EditorMode,
    bounds: ListBounds,
    last_rejection: Option<EditError>,
}

impl Editor {
    /// Creates an editor showing the path listing of `choreography`.
    #[must_use]
    pub fn new(choreography: &Choreography) -> Self {
        let bounds = ListBounds::of(Tab::Paths, choreography);
        Self {
            mode: EditorMode::list(Tab::Paths, bounds.first_index()),
            bounds,
            last_rejection: None,
        }
    }

    /// Active screen.
    #[must_use]
    pub const fn mode(&self) -> EditorMode {
        self.mode
    }

    /// Cached selectable range of the active tab's listing.
    #[must_use]
    pub const fn bounds(&self) -> ListBounds {
        self.bounds
    }

    /// Most recent rejection reported by the world, cleared by the next accepted edit.
    #[must_use]
    pub fn last_rejection(&self) -> Option<&EditError> {
        self.last_rejection.as_ref()
    }

    /// Consumes world events and UI input to emit editing commands.
    ///
    /// `now_s` is the world's elapsed time and becomes the birth time of
    /// preview spawns.
    pub fn handle(
        &mut self,
        events: &[Event],
        input: Option<EditorInput>,
        choreography: &Choreography,
        now_s: f32,
        out: &mut Vec<Command>,
    ) {
        let mut structural = false;
        for event in events {
            match event {
                Event::PathCreated { path } => {
                    structural = true;
                    if let EditorMode::PathList { selected } = &mut self.mode {
                        *selected = *path;
                    }
                }
                Event::FormationCreated { formation } => {
                    structural = true;
                    if let EditorMode::FormationList { selected } = &mut self.mode {
                        *selected = *formation;
                    }
                }
                Event::LevelCreated { level } => {
                    structural = true;
                    if let EditorMode::LevelList { selected } = &mut self.mode {
                        *selected = *level;
                    }
                }
                Event::PathDeleted { path } => {
                    structural = true;
                    self.forget_path(*path);
                }
                Event::FormationDeleted { formation } => {
                    structural = true;
                    self.forget_formation(*formation);
                }
                Event::LevelDeleted { level } => {
                    structural = true;
                    self.forget_level(*level);
                }
                Event::PathRenamed { .. }
                | Event::FormationRenamed { .. }
                | Event::PathEdited { .. }
                | Event::FormationEdited { .. }
                | Event::LevelEdited { .. } => structural = true,
                Event::LevelDataReset => {
                    structural = true;
                    self.mode = EditorMode::list(self.mode.tab(), 0);
                }
                Event::EditRejected { reason } => self.last_rejection = Some(reason.clone()),
                _ => {}
            }
        }

        if structural {
            if !events
                .iter()
                .any(|event| matches!(event, Event::EditRejected { .. }))
            {
                self.last_rejection = None;
            }
            self.refresh(choreography);
        }

        let Some(input) = input else {
            return;
        };
        match input {
            EditorInput::Up => self.step(choreography, false),
            EditorInput::Down => self.step(choreography, true),
            EditorInput::Select => self.select(),
            EditorInput::Back => self.back(),
            EditorInput::NextTab => {
                let tab = self.mode.tab().next();
                self.bounds = ListBounds::of(tab, choreography);
                self.mode = EditorMode::list(tab, self.bounds.first_index());
            }
            EditorInput::Create => self.create(choreography, out),
            EditorInput::Delete => self.delete(out),
            EditorInput::Rename(id) => self.rename(id, out),
            EditorInput::Preview => self.preview(choreography, now_s, out),
            EditorInput::Jump => match self.mode {
                EditorMode::LevelList { selected: level } | EditorMode::LevelEdit { level, .. } => {
                    out.push(Command::JumpToLevel { level });
                }
                _ => log::debug!("jump only applies to levels"),
            },
            EditorInput::SetWaypoint(waypoint) => match self.mode {
                EditorMode::PathEdit {
                    path,
                    waypoint: position,
                } => out.push(Command::UpdateWaypoint {
                    path,
                    position,
                    waypoint,
                }),
                _ => log::debug!("waypoints are only edited inside a path"),
            },
            EditorInput::AdjustShips(delta) => self.update_section(choreography, out, |section| {
                section.ship_count = section.ship_count.saturating_add_signed(delta).max(1);
            }),
            EditorInput::CycleModel => self.update_section(choreography, out, |section| {
                section.model = section.model.next();
            }),
            EditorInput::CyclePath => {
                let paths: Vec<PathIndex> = choreography
                    .editable_paths()
                    .map(|(index, _)| index)
                    .collect();
                self.update_section(choreography, out, |section| {
                    if let Some(path) = cycle_after(section.path, &paths) {
                        section.path = path;
                    }
                });
            }
            EditorInput::SetSpawnTime(spawn_time_s) => {
                self.update_wave(choreography, out, |wave| wave.spawn_time_s = spawn_time_s);
            }
            EditorInput::CycleFormation => {
                let formations: Vec<FormationIndex> = choreography
                    .editable_formations()
                    .map(|(index, _)| index)
                    .collect();
                self.update_wave(choreography, out, |wave| {
                    if let Some(formation) = cycle_after(wave.formation, &formations) {
                        wave.formation = formation;
                    }
                });
            }
        }
    }

    fn update_section(
        &self,
        choreography: &Choreography,
        out: &mut Vec<Command>,
        change: impl FnOnce(&mut FormationSection),
    ) {
        let EditorMode::FormationEdit { formation, section } = self.mode else {
            log::debug!("sections are only edited inside a formation");
            return;
        };
        let Some(mut current) = choreography
            .formation(formation)
            .and_then(|entry| entry.sections().get(section))
            .copied()
        else {
            return;
        };
        change(&mut current);
        out.push(Command::UpdateSection {
            formation,
            position: section,
            section: current,
        });
    }

    fn update_wave(
        &self,
        choreography: &Choreography,
        out: &mut Vec<Command>,
        change: impl FnOnce(&mut Wave),
    ) {
        let EditorMode::LevelEdit { level, wave } = self.mode else {
            log::debug!("waves are only edited inside a level");
            return;
        };
        let Some(mut current) = choreography
            .level(level)
            .and_then(|entry| entry.waves().get(wave))
            .copied()
        else {
            return;
        };
        change(&mut current);
        out.push(Command::UpdateWave {
            level,
            position: wave,
            wave: current,
        });
    }

    fn refresh(&mut self, choreography: &Choreography) {
        self.bounds = ListBounds::of(self.mode.tab(), choreography);
        let bounds = self.bounds;
        self.mode = match self.mode {
            EditorMode::PathList { selected } => EditorMode::PathList {
                selected: PathIndex::new(bounds.clamp(selected.get())),
            },
            EditorMode::FormationList { selected } => EditorMode::FormationList {
                selected: FormationIndex::new(bounds.clamp(selected.get())),
            },
            EditorMode::LevelList { selected } => EditorMode::LevelList {
                selected: LevelIndex::new(bounds.clamp(selected.get())),
            },
            EditorMode::PathEdit { path, waypoint } => match choreography.path(path) {
                Some(entry) if bounds.contains(path.get()) => EditorMode::PathEdit {
                    path,
                    waypoint: clamp_position(waypoint, entry.waypoints().len()),
                },
                _ => EditorMode::PathList {
                    selected: PathIndex::new(bounds.clamp(path.get())),
                },
            },
            EditorMode::FormationEdit { formation, section } => {
                match choreography.formation(formation) {
                    Some(entry) if bounds.contains(formation.get()) => EditorMode::FormationEdit {
                        formation,
                        section: clamp_position(section, entry.sections().len()),
                    },
                    _ => EditorMode::FormationList {
                        selected: FormationIndex::new(bounds.clamp(formation.get())),
                    },
                }
            }
            EditorMode::LevelEdit { level, wave } => match choreography.level(level) {
                Some(entry) => EditorMode::LevelEdit {
                    level,
                    wave: clamp_position(wave, entry.waves().len()),
                },
                None => EditorMode::LevelList {
                    selected: LevelIndex::new(bounds.clamp(level.get())),
                },
            },
        };
    }

    fn forget_path(&mut self, removed: PathIndex) {
        if let EditorMode::PathEdit { path, waypoint } = self.mode {
            self.mode = match path.repaired_after_removal(removed) {
                Some(path) => EditorMode::PathEdit { path, waypoint },
                None => EditorMode::PathList { selected: removed },
            };
        }
    }

    fn forget_formation(&mut self, removed: FormationIndex) {
        if let EditorMode::FormationEdit { formation, section } = self.mode {
            self.mode = match formation.repaired_after_removal(removed) {
                Some(formation) => EditorMode::FormationEdit { formation, section },
                None => EditorMode::FormationList { selected: removed },
            };
        }
    }

    fn forget_level(&mut self, removed: LevelIndex) {
        if let EditorMode::LevelEdit { level, wave } = self.mode {
            self.mode = match level.repaired_after_removal(removed) {
                Some(level) => EditorMode::LevelEdit { level, wave },
                None => EditorMode::LevelList { selected: removed },
            };
        }
    }

    fn step(&mut self, choreography: &Choreography, forward: bool) {
        let shift = |value: usize| {
            if forward {
                value.saturating_add(1)
            } else {
                value.saturating_sub(1)
            }
        };
        let bounds = self.bounds;
        self.mode = match self.mode {
            EditorMode::PathList { selected } => EditorMode::PathList {
                selected: PathIndex::new(bounds.clamp(shift(selected.get()))),
            },
            EditorMode::FormationList { selected } => EditorMode::FormationList {
                selected: FormationIndex::new(bounds.clamp(shift(selected.get()))),
            },
            EditorMode::LevelList { selected } => EditorMode::LevelList {
                selected: LevelIndex::new(bounds.clamp(shift(selected.get()))),
            },
            EditorMode::PathEdit { path, waypoint } => {
                let len = choreography
                    .path(path)
                    .map_or(0, |entry| entry.waypoints().len());
                EditorMode::PathEdit {
                    path,
                    waypoint: clamp_position(shift(waypoint), len),
                }
            }
            EditorMode::FormationEdit { formation, section } => {
                let len = choreography
                    .formation(formation)
                    .map_or(0, |entry| entry.sections().len());
                EditorMode::FormationEdit {
                    formation,
                    section: clamp_position(shift(section), len),
                }
            }
            EditorMode::LevelEdit { level, wave } => {
                let len = choreography
                    .level(level)
                    .map_or(0, |entry| entry.waves().len());
                EditorMode::LevelEdit {
                    level,
                    wave: clamp_position(shift(wave), len),
                }
            }
        };
    }

    fn select(&mut self) {
        let bounds = self.bounds;
        self.mode = match self.mode {
            EditorMode::PathList { selected } if bounds.contains(selected.get()) => {
                EditorMode::PathEdit {
                    path: selected,
                    waypoint: 0,
                }
            }
            EditorMode::FormationList { selected } if bounds.contains(selected.get()) => {
                EditorMode::FormationEdit {
                    formation: selected,
                    section: 0,
                }
            }
            EditorMode::LevelList { selected } if bounds.contains(selected.get()) => {
                EditorMode::LevelEdit {
                    level: selected,
                    wave: 0,
                }
            }
            other => other,
        };
    }

    fn back(&mut self) {
        self.mode = match self.mode {
            EditorMode::PathEdit { path, .. } => EditorMode::PathList { selected: path },
            EditorMode::FormationEdit { formation, .. } => EditorMode::FormationList {
                selected: formation,
            },
            EditorMode::LevelEdit { level, .. } => EditorMode::LevelList { selected: level },
            listing => listing,
        };
    }

    fn create(&self, choreography: &Choreography, out: &mut Vec<Command>) {
        match self.mode {
            EditorMode::PathList { .. } => out.push(Command::CreatePath),
            EditorMode::FormationList { .. } => out.push(Command::CreateFormation),
            EditorMode::LevelList { .. } => out.push(Command::CreateLevel),
            EditorMode::PathEdit { path, waypoint } => {
                let current = choreography
                    .path(path)
                    .and_then(|entry| entry.waypoints().get(waypoint));
                if let Some(current) = current {
                    out.push(Command::InsertWaypoint {
                        path,
                        position: waypoint + 1,
                        waypoint: *current,
                    });
                }
            }
            EditorMode::FormationEdit { formation, section } => {
                let current = choreography
                    .formation(formation)
                    .and_then(|entry| entry.sections().get(section));
                let (position, template) = match current {
                    Some(current) => (section + 1, *current),
                    None => {
                        let path = choreography
                            .editable_paths()
                            .next()
                            .map_or(PathIndex::SENTINEL, |(index, _)| index);
                        (0, FormationSection::new(path, 1, ShipModel::default()))
                    }
                };
                out.push(Command::InsertSection {
                    formation,
                    position,
                    section: template,
                });
            }
            EditorMode::LevelEdit { level, wave } => {
                let waves = choreography
                    .level(level)
                    .map(Level::waves)
                    .unwrap_or_default();
                let spawn_time_s = waves
                    .last()
                    .map_or(0.0, |last| last.spawn_time_s + NEW_WAVE_SPACING_S);
                let formation = waves
                    .get(wave)
                    .map(|current| current.formation)
                    .or_else(|| choreography.editable_formations().next().map(|(index, _)| index))
                    .unwrap_or(FormationIndex::SENTINEL);
                out.push(Command::InsertWave {
                    level,
                    wave: Wave::new(spawn_time_s, formation),
                });
            }
        }
    }

    fn delete(&self, out: &mut Vec<Command>) {
        let command = match self.mode {
            EditorMode::PathList { selected } if self.bounds.contains(selected.get()) => {
                Command::DeletePath { path: selected }
            }
            EditorMode::FormationList { selected } if self.bounds.contains(selected.get()) => {
                Command::DeleteFormation {
                    formation: selected,
                }
            }
            EditorMode::LevelList { selected } if self.bounds.contains(selected.get()) => {
                Command::DeleteLevel { level: selected }
            }
            EditorMode::PathEdit { path, waypoint } => Command::RemoveWaypoint {
                path,
                position: waypoint,
            },
            EditorMode::FormationEdit { formation, section } => Command::RemoveSection {
                formation,
                position: section,
            },
            EditorMode::LevelEdit { level, wave } => Command::RemoveWave {
                level,
                position: wave,
            },
            _ => return,
        };
        out.push(command);
    }

    fn rename(&self, id: String, out: &mut Vec<Command>) {
        match self.mode {
            EditorMode::PathList { selected: path } | EditorMode::PathEdit { path, .. } => {
                out.push(Command::RenamePath { path, id });
            }
            EditorMode::FormationList {
                selected: formation,
            }
            | EditorMode::FormationEdit { formation, .. } => {
                out.push(Command::RenameFormation { formation, id });
            }
            EditorMode::LevelList { .. } | EditorMode::LevelEdit { .. } => {
                log::debug!("levels are addressed by position and cannot be renamed");
            }
        }
    }

    fn preview(&self, choreography: &Choreography, now_s: f32, out: &mut Vec<Command>) {
        let command = match self.mode {
            EditorMode::PathList { selected } if self.bounds.contains(selected.get()) => {
                path_preview(selected, now_s)
            }
            EditorMode::PathEdit { path, .. } => path_preview(path, now_s),
            EditorMode::FormationList { selected } if self.bounds.contains(selected.get()) => {
                Command::SpawnFormation {
                    formation: selected,
                    at_time_s: now_s,
                }
            }
            EditorMode::FormationEdit { formation, section } => {
                match choreography
                    .formation(formation)
                    .and_then(|entry| entry.sections().get(section))
                {
                    Some(current) => Command::SpawnSectionPreview {
                        section: *current,
                        at_time_s: now_s,
                    },
                    None => Command::SpawnFormation {
                        formation,
                        at_time_s: now_s,
                    },
                }
            }
            EditorMode::LevelList { selected } if self.bounds.contains(selected.get()) => {
                Command::JumpToLevel { level: selected }
            }
            EditorMode::LevelEdit { level, wave } => Command::JumpToWave { level, wave },
            _ => return,
        };
        out.push(command);
    }
}

fn path_preview(path: PathIndex, now_s: f32) -> Command {
    Command::SpawnSectionPreview {
        section: FormationSection::new(path, 1, ShipModel::default()),
        at_time_s: now_s,
    }
}

/// Entry following `current` in `candidates`, wrapping around. An entry that
/// is not listed, such as a sentinel, moves to the first candidate.
fn cycle_after<I: Copy + PartialEq>(current: I, candidates: &[I]) -> Option<I> {
    let next = candidates
        .iter()
        .position(|candidate| *candidate == current)
        .map_or(0, |position| (position + 1) % candidates.len());
    candidates.get(next).copied()
}

fn clamp_position(position: usize, len: usize) -> usize {
    position.min(len.saturating_sub(1))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn sentinel_is_never_selectable() {
        let choreography = Choreography::new();
        let paths = ListBounds::of(Tab::Paths, &choreography);
        assert_eq!(paths.first_index(), 1);
        assert_eq!(paths.last_index(), None);
        assert!(!paths.contains(0));
        assert!(!paths.contains(1));

        let levels = ListBounds::of(Tab::Levels, &choreography);
        assert_eq!(levels.first_index(), 0);
        assert_eq!(levels.last_index(), None);
    }

    #[test]
    fn bounds_track_pool_growth() {
        let mut choreography = Choreography::new();
        let _ = choreography.create_path();
        let _ = choreography.create_path();
        let _ = choreography.create_level();

        let paths = ListBounds::of(Tab::Paths, &choreography);
        assert_eq!(paths.last_index(), Some(2));
        assert_eq!(paths.clamp(9), 2);
        assert_eq!(paths.clamp(0), 1);
        assert_eq!(ListBounds::of(Tab::Levels, &choreography).last_index(), Some(0));
    }

    #[test]
    fn cycling_wraps_and_leaves_sentinels() {
        let paths = [PathIndex::new(1), PathIndex::new(2)];
        assert_eq!(cycle_after(PathIndex::new(1), &paths), Some(PathIndex::new(2)));
        assert_eq!(cycle_after(PathIndex::new(2), &paths), Some(PathIndex::new(1)));
        assert_eq!(cycle_after(PathIndex::SENTINEL, &paths), Some(PathIndex::new(1)));
        assert_eq!(cycle_after(PathIndex::SENTINEL, &[]), None);
    }

    #[test]
    fn tabs_cycle_through_every_pool() {
        assert_eq!(Tab::Paths.next(), Tab::Formations);
        assert_eq!(Tab::Formations.next(), Tab::Levels);
        assert_eq!(Tab::Levels.next(), Tab::Paths);
    }

    #[test]
    fn deleting_edited_entry_returns_to_listing() {
        let mut choreography = Choreography::new();
        let _ = choreography.create_path();
        let mut editor = Editor::new(&choreography);
        editor.mode = EditorMode::PathEdit {
            path: PathIndex::new(1),
            waypoint: 1,
        };

        editor.forget_path(PathIndex::new(1));

        assert_eq!(
            editor.mode(),
            EditorMode::PathList {
                selected: PathIndex::new(1)
            }
        );
    }

    #[test]
    fn deleting_earlier_entry_shifts_edited_index() {
        let choreography = Choreography::new();
        let mut editor = Editor::new(&choreography);
        editor.mode = EditorMode::LevelEdit {
            level: LevelIndex::new(3),
            wave: 2,
        };

        editor.forget_level(LevelIndex::new(1));

        assert_eq!(
            editor.mode(),
            EditorMode::LevelEdit {
                level: LevelIndex::new(2),
                wave: 2
            }
        );
    }
}
