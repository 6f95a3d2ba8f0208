#![deny(
    unsafe_code,
    missing_docs,
    dead_code,
    unused_results,
    non_snake_case,
    unreachable_pub
)]

//! Command-line adapter for inspecting, editing and running Skyweave level files.

use std::{
    fs,
    path::{Path, PathBuf},
    time::Duration,
};

use anyhow::{bail, Context, Result};
use clap::{Parser, Subcommand};
use skyweave_cli::{parse_line, EditSession, RunSummary, Settings, Simulation};
use skyweave_core::{Choreography, Event, FormationSection, ShipModel, Vec3, Wave, Waypoint};
use skyweave_persistence as persistence;
use skyweave_system_path_animation::trace;
use skyweave_world::query;

#[derive(Debug, Parser)]
#[command(name = "skyweave")]
#[command(about = "Enemy choreography tools for arcade shooters", long_about = None)]
#[command(version)]
struct Cli {
    /// TOML settings file
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    /// Level file, overriding the settings
    #[arg(long, global = true)]
    data: Option<PathBuf>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Debug, Subcommand)]
enum Commands {
    /// Load the level file and report what it contains
    Check,

    /// Write a starter level file
    New {
        /// Overwrite an existing file
        #[arg(long)]
        force: bool,
    },

    /// Run every level headlessly and report spawns and retirements
    Simulate {
        /// Simulated seconds to run
        #[arg(long, default_value_t = 60.0)]
        seconds: f32,

        /// Frame length in milliseconds
        #[arg(long, default_value_t = 16)]
        frame_ms: u64,
    },

    /// Print sampled points along a path
    Trace {
        /// Identifier of the path
        path: String,

        /// Samples per segment
        #[arg(long, default_value_t = 16)]
        samples: usize,
    },

    /// Apply an editor input script and save the result
    Edit {
        /// File with one editor input or `wait <seconds>` per line
        script: PathBuf,
    },

    /// Print the level file in normalised form
    Dump,
}

/// Entry point for the Skyweave command-line interface.
fn main() -> Result<()> {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    let cli = Cli::parse();
    let settings = match &cli.config {
        Some(path) => Settings::load(path)?,
        None => Settings::default(),
    };
    let data_path = settings.data_path(cli.data.as_deref());

    match cli.command {
        Commands::Check => check(&data_path),
        Commands::New { force } => create(&data_path, force),
        Commands::Simulate { seconds, frame_ms } => {
            simulate(&settings, &data_path, seconds, frame_ms)
        }
        Commands::Trace { path, samples } => print_trace(&data_path, &path, samples),
        Commands::Edit { script } => edit(&settings, &data_path, &script),
        Commands::Dump => dump(&data_path),
    }
}

fn load(data_path: &Path) -> Result<Choreography> {
    persistence::load(data_path)
        .with_context(|| format!("failed to load level file {}", data_path.display()))
}

fn check(data_path: &Path) -> Result<()> {
    let choreography = load(data_path)?;
    println!(
        "{}: {} paths, {} formations, {} levels",
        data_path.display(),
        choreography.paths().len().saturating_sub(1),
        choreography.formations().len().saturating_sub(1),
        choreography.levels().len()
    );
    for (index, level) in choreography.levels().iter_indexed() {
        let ships: u32 = level
            .waves()
            .iter()
            .filter_map(|wave| choreography.formation(wave.formation))
            .map(|formation| formation.ship_count())
            .sum();
        println!(
            "  level {}: {} waves, {} ships",
            index.get(),
            level.waves().len(),
            ships
        );
    }
    Ok(())
}

fn create(data_path: &Path, force: bool) -> Result<()> {
    if data_path.exists() && !force {
        bail!(
            "{} already exists, pass --force to overwrite it",
            data_path.display()
        );
    }
    let choreography = starter_choreography().context("failed to build starter level")?;
    persistence::save(&choreography, data_path)
        .with_context(|| format!("failed to write {}", data_path.display()))?;
    println!("wrote {}", data_path.display());
    Ok(())
}

/// One swooping path, a three-ship formation and a two-wave level.
fn starter_choreography() -> Result<Choreography> {
    let mut choreography = Choreography::new();
    let path = choreography.create_path();
    choreography.rename_path(path, "swoop")?;
    choreography.insert_waypoint(
        path,
        2,
        Waypoint::new(Vec3::new(8.0, -20.0, 0.0), Vec3::new(-8.0, -20.0, 0.0)),
    )?;
    let formation = choreography.create_formation();
    choreography.rename_formation(formation, "trio")?;
    choreography.update_section(
        formation,
        0,
        FormationSection::new(path, 3, ShipModel::Fighter),
    )?;
    let level = choreography.create_level();
    for spawn_time_s in [2.0, 6.0] {
        let _ = choreography.insert_wave(level, Wave::new(spawn_time_s, formation))?;
    }
    Ok(choreography)
}

fn simulate(settings: &Settings, data_path: &Path, seconds: f32, frame_ms: u64) -> Result<()> {
    if frame_ms == 0 {
        bail!("frame length must be positive");
    }
    let choreography = load(data_path)?;
    let mut simulation = Simulation::new(settings.world_config(), choreography);
    let dt = Duration::from_millis(frame_ms);
    let mut summary = RunSummary::default();

    while query::elapsed_s(simulation.world()) < seconds {
        let events = simulation.step(dt);
        for event in &events {
            if let Event::EnemySpawned {
                enemy,
                path,
                birth_time_s,
                model,
            } = event
            {
                log::debug!(
                    "enemy {} on path {} born at {birth_time_s:.2}s as {model:?}",
                    enemy.get(),
                    path.get()
                );
            }
        }
        summary.record(&events);
    }

    let scheduler = simulation.scheduler();
    println!(
        "{} frames over {:.2}s: {} spawned, {} retired, {} alive, {} rejected",
        summary.frames,
        query::elapsed_s(simulation.world()),
        summary.spawned,
        summary.retired,
        query::live_enemies(simulation.world()).len(),
        summary.rejected
    );
    println!(
        "scheduler {:?} at level {} wave {}",
        scheduler.phase(),
        scheduler.level().get(),
        scheduler.wave()
    );
    Ok(())
}

fn print_trace(data_path: &Path, id: &str, samples: usize) -> Result<()> {
    let choreography = load(data_path)?;
    let Some(path) = choreography
        .find_path(id)
        .and_then(|index| choreography.path(index))
    else {
        bail!("no path named `{id}` in {}", data_path.display());
    };
    for point in trace(path, samples) {
        println!("{:.3} {:.3} {:.3}", point.x, point.y, point.z);
    }
    Ok(())
}

fn edit(settings: &Settings, data_path: &Path, script: &Path) -> Result<()> {
    let text = fs::read_to_string(script)
        .with_context(|| format!("failed to read editor script {}", script.display()))?;
    let (choreography, _) = persistence::load_or_empty(data_path);
    let mut session = EditSession::new(settings.world_config(), choreography);

    for (number, line) in text.lines().enumerate() {
        let Some(step) =
            parse_line(line).with_context(|| format!("line {} of script", number + 1))?
        else {
            continue;
        };
        for event in session.run(step) {
            match event {
                Event::EditRejected { reason } => log::warn!("line {}: {reason}", number + 1),
                Event::EnemySpawned { path, .. } => {
                    log::info!("line {}: enemy launched on path {}", number + 1, path.get());
                }
                _ => {}
            }
        }
    }

    persistence::save(session.choreography(), data_path)
        .with_context(|| format!("failed to write {}", data_path.display()))?;
    println!(
        "saved {} in mode {:?}",
        data_path.display(),
        session.editor().mode()
    );
    Ok(())
}

fn dump(data_path: &Path) -> Result<()> {
    let choreography = load(data_path)?;
    println!("{}", persistence::to_json_string(&choreography)?);
    Ok(())
}
