#![deny(
    unsafe_code,
    missing_docs,
    dead_code,
    unused_results,
    non_snake_case,
    unreachable_pub
)]

//! Spawn scheduler that walks level timelines and emits formation spawns.
//!
//! The scheduler idles until every enemy has left the field, then starts the
//! next level with its clock at zero. While a level runs, each tick adds the
//! elapsed time to the clock and fires at most one wave whose spawn time has
//! been reached. Once every wave has fired the scheduler returns to idle and
//! moves on to the following level.
//!
//! Edits to the running level keep the timeline in place: the scheduler
//! remembers the spawn time it has fired through and resumes after it, so
//! waves inserted behind the clock count as passed and fired waves never
//! fire twice.

use skyweave_core::{Choreography, Command, Event, LevelIndex, Wave};

/// Coarse state of the scheduler.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum Phase {
    /// Waiting for live enemies to clear before starting the next level.
    Idle,
    /// Running the timeline of the current level.
    Active,
}

/// Pure system that advances level timelines and emits spawn commands.
#[derive(Clone, Debug, PartialEq)]
pub struct Scheduler {
    phase: Phase,
    level: LevelIndex,
    wave: usize,
    clock_s: f32,
    fired: Option<FiredMark>,
}

/// Spawn time of the last fired wave and how many fired waves share it.
#[derive(Clone, Copy, Debug, PartialEq)]
struct FiredMark {
    spawn_time_s: f32,
    ties: usize,
}

impl FiredMark {
    /// Mark left behind once the first `fired` waves have fired.
    fn after(waves: &[Wave], fired: usize) -> Option<Self> {
        let fired = fired.min(waves.len());
        let last = waves.get(fired.checked_sub(1)?)?;
        let ties = waves[..fired]
            .iter()
            .rev()
            .take_while(|wave| wave.spawn_time_s == last.spawn_time_s)
            .count();
        Some(Self {
            spawn_time_s: last.spawn_time_s,
            ties,
        })
    }

    /// Position of the first unfired wave in a possibly edited timeline.
    fn resume_position(mark: Option<Self>, waves: &[Wave]) -> usize {
        let Some(mark) = mark else {
            return 0;
        };
        let before = waves.partition_point(|wave| wave.spawn_time_s < mark.spawn_time_s);
        let equal = waves[before..]
            .iter()
            .take_while(|wave| wave.spawn_time_s == mark.spawn_time_s)
            .count();
        before + mark.ties.min(equal)
    }
}

impl Default for Scheduler {
    fn default() -> Self {
        Self::new()
    }
}

impl Scheduler {
    /// Creates an idle scheduler positioned before the first level.
    #[must_use]
    pub const fn new() -> Self {
        Self {
            phase: Phase::Idle,
            level: LevelIndex::new(0),
            wave: 0,
            clock_s: 0.0,
            fired: None,
        }
    }

    /// Current phase.
    #[must_use]
    pub const fn phase(&self) -> Phase {
        self.phase
    }

    /// Reports whether a level timeline is running.
    #[must_use]
    pub fn is_level_active(&self) -> bool {
        self.phase == Phase::Active
    }

    /// Level that is running, or that starts next while idle.
    #[must_use]
    pub const fn level(&self) -> LevelIndex {
        self.level
    }

    /// Position of the next unfired wave within the current level.
    #[must_use]
    pub const fn wave(&self) -> usize {
        self.wave
    }

    /// Level-local clock in seconds.
    #[must_use]
    pub const fn clock_s(&self) -> f32 {
        self.clock_s
    }

    /// Consumes world events and the choreography to emit spawn commands.
    ///
    /// `now_s` is the world's total elapsed time and becomes the birth time
    /// of the spawned formation.
    pub fn handle(
        &mut self,
        events: &[Event],
        choreography: &Choreography,
        enemies_alive: bool,
        now_s: f32,
        out: &mut Vec<Command>,
    ) {
        let mut ticked = false;
        let mut elapsed_s = 0.0;
        for event in events {
            match event {
                Event::TimeAdvanced { dt } => {
                    ticked = true;
                    elapsed_s += dt.as_secs_f32();
                }
                Event::TimelineJumped {
                    level,
                    wave,
                    clock_s,
                } => {
                    self.phase = Phase::Active;
                    self.level = *level;
                    self.wave = *wave;
                    self.clock_s = *clock_s;
                    self.fired = choreography
                        .level(*level)
                        .and_then(|level| FiredMark::after(level.waves(), *wave));
                }
                Event::LevelEdited { level } => self.resume_edited_level(*level, choreography),
                Event::LevelDeleted { level } => self.forget_level(*level),
                Event::LevelDataReset => *self = Self::new(),
                _ => {}
            }
        }

        if !ticked {
            return;
        }

        match self.phase {
            Phase::Idle => {
                if enemies_alive || choreography.level(self.level).is_none() {
                    return;
                }
                self.phase = Phase::Active;
                self.wave = 0;
                self.clock_s = 0.0;
                self.fired = None;
                log::info!("level {} started", self.level.get());
            }
            Phase::Active => self.clock_s += elapsed_s,
        }

        self.fire_due_wave(choreography, now_s, out);
    }

    fn fire_due_wave(&mut self, choreography: &Choreography, now_s: f32, out: &mut Vec<Command>) {
        let Some(level) = choreography.level(self.level) else {
            self.phase = Phase::Idle;
            return;
        };

        if let Some(wave) = level.waves().get(self.wave) {
            if self.clock_s >= wave.spawn_time_s {
                log::debug!(
                    "level {} wave {} fired at {:.2}s",
                    self.level.get(),
                    self.wave,
                    self.clock_s
                );
                out.push(Command::SpawnFormation {
                    formation: wave.formation,
                    at_time_s: now_s,
                });
                self.wave += 1;
                self.fired = FiredMark::after(level.waves(), self.wave);
            }
        }

        if self.wave >= level.waves().len() {
            log::info!("level {} complete", self.level.get());
            self.phase = Phase::Idle;
            self.level = self.level.next();
            self.wave = 0;
            self.fired = None;
        }
    }

    fn resume_edited_level(&mut self, edited: LevelIndex, choreography: &Choreography) {
        if edited != self.level || self.phase != Phase::Active {
            return;
        }
        let Some(level) = choreography.level(edited) else {
            return;
        };
        let resumed = FiredMark::resume_position(self.fired, level.waves());
        if resumed != self.wave {
            log::debug!(
                "level {} edited, next wave moves from {} to {resumed}",
                edited.get(),
                self.wave
            );
        }
        self.wave = resumed;
    }

    fn forget_level(&mut self, removed: LevelIndex) {
        if self.level > removed {
            self.level = LevelIndex::new(self.level.get() - 1);
        } else if self.level == removed && self.phase == Phase::Active {
            self.phase = Phase::Idle;
            self.wave = 0;
            self.clock_s = 0.0;
            self.fired = None;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use skyweave_core::FormationIndex;

    #[test]
    fn deleting_running_level_stops_timeline() {
        let mut scheduler = Scheduler::new();
        scheduler.phase = Phase::Active;
        scheduler.level = LevelIndex::new(2);
        scheduler.wave = 3;

        scheduler.forget_level(LevelIndex::new(2));

        assert_eq!(scheduler.phase(), Phase::Idle);
        assert_eq!(scheduler.level(), LevelIndex::new(2));
        assert_eq!(scheduler.wave(), 0);
    }

    #[test]
    fn deleting_earlier_level_shifts_current_level() {
        let mut scheduler = Scheduler::new();
        scheduler.level = LevelIndex::new(2);

        scheduler.forget_level(LevelIndex::new(0));

        assert_eq!(scheduler.level(), LevelIndex::new(1));
    }

    #[test]
    fn resume_position_skips_fired_waves_sharing_a_spawn_time() {
        let waves = [1.0, 1.0, 1.0, 2.0].map(|time| Wave::new(time, FormationIndex::SENTINEL));
        let mark = FiredMark::after(&waves, 2);

        assert_eq!(
            mark,
            Some(FiredMark {
                spawn_time_s: 1.0,
                ties: 2
            })
        );
        assert_eq!(FiredMark::resume_position(mark, &waves), 2);
        assert_eq!(FiredMark::resume_position(mark, &waves[1..]), 2);
        assert_eq!(FiredMark::resume_position(None, &waves), 0);
    }
}
