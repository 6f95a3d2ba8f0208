//! Headless frame loop wiring the world to the scheduler and the animator.

use std::time::Duration;

use skyweave_core::{Choreography, Command, Event};
use skyweave_system_path_animation::PathAnimation;
use skyweave_system_scheduling::Scheduler;
use skyweave_world::{self as world, query, Config, World};

/// World plus the pure systems that drive it, advanced one frame at a time.
#[derive(Debug)]
pub struct Simulation {
    world: World,
    scheduler: Scheduler,
    animation: PathAnimation,
    pending: Vec<Event>,
}

impl Simulation {
    /// Creates a simulation running `choreography` under `config`.
    #[must_use]
    pub fn new(config: Config, choreography: Choreography) -> Self {
        let mut world = World::with_config(config);
        let animation = PathAnimation::new(query::tuning(&world));
        let mut pending = Vec::new();
        world::apply(
            &mut world,
            Command::ReplaceChoreography {
                choreography: Box::new(choreography),
            },
            &mut pending,
        );
        Self {
            world,
            scheduler: Scheduler::new(),
            animation,
            pending,
        }
    }

    /// Authoritative world state.
    #[must_use]
    pub fn world(&self) -> &World {
        &self.world
    }

    /// Scheduler state.
    #[must_use]
    pub fn scheduler(&self) -> &Scheduler {
        &self.scheduler
    }

    /// Applies a command outside the frame loop.
    ///
    /// The resulting events are returned and also queued, so the systems
    /// observe them at the start of the next frame.
    pub fn submit(&mut self, command: Command) -> Vec<Event> {
        let start = self.pending.len();
        world::apply(&mut self.world, command, &mut self.pending);
        self.pending[start..].to_vec()
    }

    /// Events queued for the next frame.
    #[must_use]
    pub fn queued_events(&self) -> &[Event] {
        &self.pending
    }

    /// Advances the simulation by `dt`, returning every event of the frame.
    ///
    /// The scheduler runs first so that enemies it spawns are animated in
    /// the same frame.
    pub fn step(&mut self, dt: Duration) -> Vec<Event> {
        let mut events = std::mem::take(&mut self.pending);
        world::apply(&mut self.world, Command::Tick { dt }, &mut events);

        let mut commands = Vec::new();
        self.scheduler.handle(
            &events,
            query::choreography(&self.world),
            query::any_enemy_alive(&self.world),
            query::elapsed_s(&self.world),
            &mut commands,
        );
        let frame = events.clone();
        self.apply_all(commands, &mut events);

        let mut commands = Vec::new();
        self.animation.handle(
            &frame,
            query::choreography(&self.world),
            &query::enemy_view(&self.world),
            query::elapsed_s(&self.world),
            &mut commands,
        );
        self.apply_all(commands, &mut events);

        events
    }

    fn apply_all(&mut self, commands: Vec<Command>, events: &mut Vec<Event>) {
        for command in commands {
            world::apply(&mut self.world, command, events);
        }
    }
}

/// Tally of the notable events produced by a run.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct RunSummary {
    /// Frames stepped.
    pub frames: u64,
    /// Enemies written into the entity array.
    pub spawned: usize,
    /// Enemies that left the field.
    pub retired: usize,
    /// Commands the world rejected.
    pub rejected: usize,
}

impl RunSummary {
    /// Folds one frame's events into the tally.
    pub fn record(&mut self, events: &[Event]) {
        self.frames += 1;
        for event in events {
            match event {
                Event::EnemySpawned { .. } => self.spawned += 1,
                Event::EnemyRetired { .. } => self.retired += 1,
                Event::EditRejected { .. } => self.rejected += 1,
                _ => {}
            }
        }
    }
}
