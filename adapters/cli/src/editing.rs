//! Scripted editing sessions driven by one editor input per line.
//!
//! A session runs the editor on top of a live [`Simulation`], so previews
//! spawn enemies that fly their paths and level jumps restart the scheduler.
//! Time only passes when a script waits.

use std::time::Duration;

use anyhow::{bail, Context, Result};
use skyweave_core::{Choreography, Event, Vec3, Waypoint};
use skyweave_system_editor::{Editor, EditorInput};
use skyweave_world::{query, Config};

use crate::Simulation;

/// Longest frame simulated while a script waits.
const SCRIPT_FRAME: Duration = Duration::from_millis(16);

/// One parsed line of an editor script.
#[derive(Clone, Debug, PartialEq)]
pub enum ScriptStep {
    /// Delivers an input to the editor.
    Input(EditorInput),
    /// Lets simulated time pass so previews and jumps play out.
    Wait(Duration),
}

/// Simulation plus the editor system, fed discrete inputs.
#[derive(Debug)]
pub struct EditSession {
    simulation: Simulation,
    editor: Editor,
    observed: usize,
}

impl EditSession {
    /// Opens an editing session over `choreography`.
    #[must_use]
    pub fn new(config: Config, choreography: Choreography) -> Self {
        let simulation = Simulation::new(config, choreography);
        let editor = Editor::new(query::choreography(simulation.world()));
        let observed = simulation.queued_events().len();
        Self {
            simulation,
            editor,
            observed,
        }
    }

    /// Editor state.
    #[must_use]
    pub fn editor(&self) -> &Editor {
        &self.editor
    }

    /// Simulation the editor works on.
    #[must_use]
    pub fn simulation(&self) -> &Simulation {
        &self.simulation
    }

    /// Current choreography.
    #[must_use]
    pub fn choreography(&self) -> &Choreography {
        query::choreography(self.simulation.world())
    }

    /// Runs one script step, returning the events it produced.
    pub fn run(&mut self, step: ScriptStep) -> Vec<Event> {
        match step {
            ScriptStep::Input(input) => self.press(input),
            ScriptStep::Wait(duration) => self.wait(duration),
        }
    }

    /// Delivers one input and lets the editor observe its outcome.
    ///
    /// Returns the events the world produced in response.
    pub fn press(&mut self, input: EditorInput) -> Vec<Event> {
        let events = self.dispatch(&[], Some(input));
        self.observe(&events);
        events
    }

    /// Advances the simulation by `duration` in frames of at most 16 ms.
    pub fn wait(&mut self, duration: Duration) -> Vec<Event> {
        let mut events = Vec::new();
        let mut remaining = duration;
        while !remaining.is_zero() {
            let dt = remaining.min(SCRIPT_FRAME);
            remaining -= dt;
            let frame = self.simulation.step(dt);
            let unseen = frame.get(self.observed..).unwrap_or_default();
            self.observed = 0;
            self.observe(unseen);
            events.extend(frame);
        }
        events
    }

    /// Shows events to the editor until its reactions settle.
    fn observe(&mut self, events: &[Event]) {
        let mut follow_up = self.dispatch(events, None);
        while !follow_up.is_empty() {
            follow_up = self.dispatch(&follow_up, None);
        }
    }

    /// Runs the editor once and submits its commands, returning their events.
    fn dispatch(&mut self, events: &[Event], input: Option<EditorInput>) -> Vec<Event> {
        let world = self.simulation.world();
        let mut commands = Vec::new();
        self.editor.handle(
            events,
            input,
            query::choreography(world),
            query::elapsed_s(world),
            &mut commands,
        );

        let mut produced = Vec::new();
        for command in commands {
            produced.extend(self.simulation.submit(command));
        }
        self.observed += produced.len();
        produced
    }
}

/// Parses `x y z cx cy cz` into an anchor and its control point.
fn parse_waypoint(argument: &str) -> Result<Waypoint> {
    let numbers = argument
        .split_whitespace()
        .map(|field| {
            field
                .parse::<f32>()
                .with_context(|| format!("waypoint coordinate `{field}` is not a number"))
        })
        .collect::<Result<Vec<_>>>()?;
    let &[x, y, z, cx, cy, cz] = numbers.as_slice() else {
        bail!("a waypoint needs six coordinates, got {}", numbers.len());
    };
    Ok(Waypoint::new(Vec3::new(x, y, z), Vec3::new(cx, cy, cz)))
}

/// Parses one script line; blank lines and `#` comments yield `None`.
pub fn parse_line(line: &str) -> Result<Option<ScriptStep>> {
    let line = line.trim();
    if line.is_empty() || line.starts_with('#') {
        return Ok(None);
    }
    let (verb, argument) = match line.split_once(char::is_whitespace) {
        Some((verb, rest)) => (verb, rest.trim()),
        None => (line, ""),
    };
    let input = match verb.to_ascii_lowercase().as_str() {
        "wait" => {
            let seconds: f32 = argument
                .parse()
                .with_context(|| format!("wait `{argument}` is not a number of seconds"))?;
            let duration = Duration::try_from_secs_f32(seconds)
                .with_context(|| format!("cannot wait {seconds} seconds"))?;
            return Ok(Some(ScriptStep::Wait(duration)));
        }
        "up" => EditorInput::Up,
        "down" => EditorInput::Down,
        "select" => EditorInput::Select,
        "back" => EditorInput::Back,
        "create" => EditorInput::Create,
        "delete" => EditorInput::Delete,
        "rename" if !argument.is_empty() => EditorInput::Rename(argument.to_owned()),
        "rename" => bail!("rename needs an identifier"),
        "next-tab" | "tab" => EditorInput::NextTab,
        "preview" => EditorInput::Preview,
        "jump" => EditorInput::Jump,
        "waypoint" => EditorInput::SetWaypoint(parse_waypoint(argument)?),
        "ships" => EditorInput::AdjustShips(
            argument
                .parse()
                .with_context(|| format!("ship count change `{argument}` is not an integer"))?,
        ),
        "model" => EditorInput::CycleModel,
        "path" => EditorInput::CyclePath,
        "time" => EditorInput::SetSpawnTime(
            argument
                .parse()
                .with_context(|| format!("spawn time `{argument}` is not a number"))?,
        ),
        "formation" => EditorInput::CycleFormation,
        other => bail!("unknown editor input `{other}`"),
    };
    Ok(Some(ScriptStep::Input(input)))
}

#[cfg(test)]
mod tests {
    use super::*;
    use skyweave_core::{LevelIndex, Wave};

    fn input(line: &str) -> Option<ScriptStep> {
        parse_line(line).expect("parses")
    }

    #[test]
    fn script_lines_parse_into_steps() {
        assert_eq!(input("  "), None);
        assert_eq!(input("# note"), None);
        assert_eq!(input("Create"), Some(ScriptStep::Input(EditorInput::Create)));
        assert_eq!(
            input("rename  big swoop "),
            Some(ScriptStep::Input(EditorInput::Rename("big swoop".to_owned())))
        );
        assert_eq!(
            input("ships -2"),
            Some(ScriptStep::Input(EditorInput::AdjustShips(-2)))
        );
        assert_eq!(
            input("time 4.5"),
            Some(ScriptStep::Input(EditorInput::SetSpawnTime(4.5)))
        );
        assert_eq!(
            input("waypoint 1 2 3 4 5 6"),
            Some(ScriptStep::Input(EditorInput::SetWaypoint(Waypoint::new(
                Vec3::new(1.0, 2.0, 3.0),
                Vec3::new(4.0, 5.0, 6.0)
            ))))
        );
        assert_eq!(
            input("wait 0.25"),
            Some(ScriptStep::Wait(Duration::from_millis(250)))
        );
        assert!(parse_line("rename").is_err());
        assert!(parse_line("waypoint 1 2 3").is_err());
        assert!(parse_line("ships many").is_err());
        assert!(parse_line("wait -1").is_err());
        assert!(parse_line("explode").is_err());
    }

    #[test]
    fn session_applies_editor_commands() {
        let mut session = EditSession::new(Config::default(), Choreography::new());

        let events = session.press(EditorInput::Create);

        assert!(matches!(events.as_slice(), [Event::PathCreated { .. }]));
        assert_eq!(session.choreography().paths().len(), 2);
        assert_eq!(session.editor().bounds().last_index(), Some(1));
    }

    #[test]
    fn waiting_keeps_the_open_screen() {
        let mut session = EditSession::new(Config::default(), Choreography::new());
        let _ = session.press(EditorInput::Create);
        let _ = session.press(EditorInput::Select);
        let mode = session.editor().mode();

        let _ = session.wait(Duration::from_millis(100));

        assert_eq!(session.editor().mode(), mode, "queued events are seen once");
    }

    #[test]
    fn previewed_path_ship_flies_its_route() {
        let mut session = EditSession::new(Config::default(), Choreography::new());
        let _ = session.press(EditorInput::Create);
        let spawned = session.press(EditorInput::Preview);
        assert!(spawned
            .iter()
            .any(|event| matches!(event, Event::EnemySpawned { .. })));
        let start = query::enemy_view(session.simulation().world())
            .iter()
            .next()
            .map(|enemy| enemy.position)
            .expect("ship spawned");

        let _ = session.wait(Duration::from_millis(500));

        let moved = query::enemy_view(session.simulation().world())
            .iter()
            .next()
            .map(|enemy| enemy.position)
            .expect("ship still flying");
        assert_ne!(moved, start);
    }

    #[test]
    fn level_preview_runs_from_the_selected_wave() {
        let mut choreography = Choreography::new();
        let _ = choreography.create_path();
        let formation = choreography.create_formation();
        let level = choreography.create_level();
        for spawn_time_s in [5.0, 9.0] {
            let _ = choreography
                .insert_wave(level, Wave::new(spawn_time_s, formation))
                .expect("wave inserted");
        }
        let mut session = EditSession::new(Config::default(), choreography);
        for step in [EditorInput::NextTab, EditorInput::NextTab, EditorInput::Select] {
            let _ = session.press(step);
        }

        let jumped = session.press(EditorInput::Preview);
        assert!(jumped.contains(&Event::TimelineJumped {
            level: LevelIndex::new(0),
            wave: 0,
            clock_s: 5.0,
        }));

        let _ = session.wait(Duration::from_millis(50));

        assert_eq!(session.simulation().scheduler().wave(), 1);
        assert!(query::any_enemy_alive(session.simulation().world()));
    }
}
