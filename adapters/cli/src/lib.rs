#![deny(
    unsafe_code,
    missing_docs,
    dead_code,
    unused_results,
    non_snake_case,
    unreachable_pub
)]

//! Headless front end for the Skyweave choreography engine.
//!
//! Provides the settings file, a frame loop that runs levels without a
//! renderer, and scripted editing sessions.

mod config;
mod editing;
mod simulation;

pub use config::{EntitySettings, Settings, TuningSettings, DEFAULT_DATA_PATH};
pub use editing::{parse_line, EditSession, ScriptStep};
pub use simulation::{RunSummary, Simulation};
