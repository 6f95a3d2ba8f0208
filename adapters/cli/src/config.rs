//! Optional TOML settings file.

use std::{
    fs,
    path::{Path, PathBuf},
};

use anyhow::{Context, Result};
use serde::Deserialize;
use skyweave_core::{Tuning, DEFAULT_SEGMENT_DURATION_S, DEFAULT_SHIP_STAGGER_S};
use skyweave_world::{Config, EntityLayout, Partition};

/// Level file used when neither the settings nor the command line name one.
pub const DEFAULT_DATA_PATH: &str = "levels.json";

/// Settings read from the TOML file; every key is optional.
#[derive(Clone, Debug, Default, PartialEq, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct Settings {
    /// Level file to load and save.
    pub data_path: Option<PathBuf>,
    /// Timing constants.
    pub tuning: TuningSettings,
    /// Entity array capacities.
    pub entities: EntitySettings,
}

/// `[tuning]` table.
#[derive(Clone, Copy, Debug, PartialEq, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct TuningSettings {
    /// Seconds spent on each path segment.
    pub segment_duration_s: f32,
    /// Seconds between consecutive ships of a section.
    pub ship_stagger_s: f32,
}

impl Default for TuningSettings {
    fn default() -> Self {
        Self {
            segment_duration_s: DEFAULT_SEGMENT_DURATION_S,
            ship_stagger_s: DEFAULT_SHIP_STAGGER_S,
        }
    }
}

/// `[entities]` table.
#[derive(Clone, Copy, Debug, PartialEq, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct EntitySettings {
    /// Player ship slots.
    pub players: usize,
    /// Player projectile slots.
    pub player_shots: usize,
    /// Enemy projectile slots.
    pub enemy_shots: usize,
    /// Enemy ship slots.
    pub enemies: usize,
}

impl Default for EntitySettings {
    fn default() -> Self {
        let layout = EntityLayout::default();
        Self {
            players: layout.range(Partition::Players).len(),
            player_shots: layout.range(Partition::PlayerShots).len(),
            enemy_shots: layout.range(Partition::EnemyShots).len(),
            enemies: layout.range(Partition::Enemies).len(),
        }
    }
}

impl Settings {
    /// Parses settings from TOML text.
    pub fn from_toml_str(text: &str) -> Result<Self> {
        toml::from_str(text).context("failed to parse settings toml contents")
    }

    /// Reads settings from the file at `path`.
    pub fn load(path: &Path) -> Result<Self> {
        let text = fs::read_to_string(path)
            .with_context(|| format!("failed to read settings at {}", path.display()))?;
        Self::from_toml_str(&text)
    }

    /// Timing constants, sanitised.
    #[must_use]
    pub fn tuning(&self) -> Tuning {
        Tuning::new(self.tuning.segment_duration_s, self.tuning.ship_stagger_s)
    }

    /// World configuration derived from the settings.
    #[must_use]
    pub fn world_config(&self) -> Config {
        let entities = self.entities;
        Config::new(
            self.tuning(),
            EntityLayout::new(
                entities.players,
                entities.player_shots,
                entities.enemy_shots,
                entities.enemies,
            ),
        )
    }

    /// Level file, preferring `explicit` over the configured path.
    #[must_use]
    pub fn data_path(&self, explicit: Option<&Path>) -> PathBuf {
        explicit
            .map(Path::to_path_buf)
            .or_else(|| self.data_path.clone())
            .unwrap_or_else(|| PathBuf::from(DEFAULT_DATA_PATH))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn empty_file_yields_defaults() {
        let settings = Settings::from_toml_str("").expect("parses");
        assert_eq!(settings, Settings::default());
        assert_eq!(settings.tuning(), Tuning::default());
        assert_eq!(settings.world_config(), Config::default());
    }

    #[test]
    fn partial_tables_keep_remaining_defaults() {
        let settings = Settings::from_toml_str(
            r#"
                data_path = "stages.json"

                [tuning]
                segment_duration_s = 2.5

                [entities]
                enemies = 8
            "#,
        )
        .expect("parses");

        assert_eq!(settings.tuning().segment_duration_s(), 2.5);
        assert_eq!(settings.tuning().ship_stagger_s(), DEFAULT_SHIP_STAGGER_S);
        assert_eq!(settings.entities.enemies, 8);
        assert_eq!(settings.entities.players, EntitySettings::default().players);
        assert_eq!(settings.data_path(None), PathBuf::from("stages.json"));
        assert_eq!(
            settings.data_path(Some(Path::new("override.json"))),
            PathBuf::from("override.json")
        );
    }

    #[test]
    fn unknown_keys_are_rejected() {
        assert!(Settings::from_toml_str("[tuning]\nsegment = 1.0\n").is_err());
    }
}
