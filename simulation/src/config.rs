//! TOML game configuration.

use std::{
    collections::BTreeSet,
    fs,
    path::{Path, PathBuf},
};

use glam::Vec2;
use serde::{Deserialize, Serialize};
use slime_defence_core::{EnemyArchetype, TowerKind};
use slime_defence_system_economy::Rewards;
use slime_defence_system_wave_scheduler::WaveSchedule;
use slime_defence_world::{SessionRules, WorldSettings};
use thiserror::Error;

/// Errors raised while loading a configuration.
#[derive(Debug, Error)]
pub enum ConfigError {
    /// The configuration file could not be read.
    #[error("failed to read config file {}", path.display())]
    Io {
        /// File that was requested.
        path: PathBuf,
        /// Underlying I/O failure.
        #[source]
        source: std::io::Error,
    },
    /// The file is not valid TOML or does not match the expected layout.
    #[error("failed to parse config")]
    Parse(#[from] toml::de::Error),
    /// The configuration parsed but describes an unplayable game.
    #[error("invalid config: {0}")]
    Validation(String),
}

/// Starting values of the player session.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct SessionConfig {
    /// Player health when a game starts.
    pub starting_health: i32,
    /// Player money when a game starts.
    pub starting_money: i32,
}

impl Default for SessionConfig {
    fn default() -> Self {
        let rules = SessionRules::default();
        Self {
            starting_health: rules.starting_health,
            starting_money: rules.starting_money,
        }
    }
}

impl From<SessionConfig> for SessionRules {
    fn from(config: SessionConfig) -> Self {
        Self {
            starting_health: config.starting_health,
            starting_money: config.starting_money,
        }
    }
}

/// Named polyline enemies can follow.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct PathConfig {
    /// Name used when spawning onto the path.
    pub name: String,
    /// Points from spawn to exit.
    pub waypoints: Vec<Vec2>,
}

/// Tower placed when the simulation is created.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct TowerConfig {
    /// Kind of tower.
    #[serde(default = "default_tower_kind")]
    pub kind: TowerKind,
    /// Centre of the tower.
    pub position: Vec2,
    /// Detection radius override.
    #[serde(default)]
    pub range: Option<f32>,
}

fn default_tower_kind() -> TowerKind {
    TowerKind::Basic
}

/// Complete description of a game.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct GameConfig {
    /// Seed for random path selection.
    pub seed: u64,
    /// Starting values of the player session.
    pub session: SessionConfig,
    /// Money, score, and damage exchanged on enemy outcomes.
    pub rewards: Rewards,
    /// Archetypes registered in addition to the built-in ones.
    pub archetypes: Vec<EnemyArchetype>,
    /// Paths enemies follow.
    pub paths: Vec<PathConfig>,
    /// Towers placed at start-up.
    pub towers: Vec<TowerConfig>,
    /// Wave schedule.
    pub waves: WaveSchedule,
}

impl Default for GameConfig {
    fn default() -> Self {
        Self {
            seed: WorldSettings::default().rng_seed,
            session: SessionConfig::default(),
            rewards: Rewards::default(),
            archetypes: Vec::new(),
            paths: vec![
                PathConfig {
                    name: "path_up".to_owned(),
                    waypoints: vec![
                        Vec2::new(0.0, 280.0),
                        Vec2::new(420.0, 280.0),
                        Vec2::new(420.0, 140.0),
                        Vec2::new(1280.0, 140.0),
                    ],
                },
                PathConfig {
                    name: "path_down".to_owned(),
                    waypoints: vec![
                        Vec2::new(0.0, 440.0),
                        Vec2::new(420.0, 440.0),
                        Vec2::new(420.0, 580.0),
                        Vec2::new(1280.0, 580.0),
                    ],
                },
            ],
            towers: vec![TowerConfig {
                kind: TowerKind::Basic,
                position: Vec2::new(640.0, 360.0),
                range: None,
            }],
            waves: WaveSchedule::default(),
        }
    }
}

impl GameConfig {
    /// Reads and validates a configuration file.
    pub fn load(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let path = path.as_ref();
        let contents = fs::read_to_string(path).map_err(|source| ConfigError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        Self::from_toml_str(&contents)
    }

    /// Parses and validates a configuration from TOML text.
    pub fn from_toml_str(contents: &str) -> Result<Self, ConfigError> {
        let config: Self = toml::from_str(contents)?;
        config.validate()?;
        Ok(config)
    }

    /// Settings for the world this configuration describes.
    #[must_use]
    pub fn world_settings(&self) -> WorldSettings {
        WorldSettings {
            session: self.session.into(),
            rng_seed: self.seed,
        }
    }

    /// Rejects configurations that cannot produce a playable game.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.session.starting_health <= 0 {
            return Err(invalid("session.starting_health must be positive"));
        }
        if self.session.starting_money < 0 {
            return Err(invalid("session.starting_money must not be negative"));
        }

        let rewards = self.rewards;
        if rewards.kill_money < 0 || rewards.kill_score < 0 || rewards.leak_damage < 0 {
            return Err(invalid("rewards must not be negative"));
        }

        let mut archetypes: BTreeSet<&str> = BTreeSet::from(["slime", "orc"]);
        for archetype in &self.archetypes {
            if archetype.name.trim().is_empty() {
                return Err(invalid("archetype names must not be empty"));
            }
            let _ = archetypes.insert(archetype.name.as_str());
        }

        let mut paths = BTreeSet::new();
        for path in &self.paths {
            if !paths.insert(path.name.as_str()) {
                return Err(invalid(format!("path `{}` is defined twice", path.name)));
            }
            if path.waypoints.len() < 2 {
                return Err(invalid(format!(
                    "path `{}` needs at least two waypoints",
                    path.name
                )));
            }
        }

        let waves = &self.waves;
        if !(waves.growth.is_finite() && waves.growth > 0.0) {
            return Err(invalid("waves.growth must be a positive number"));
        }
        if !(waves.min_spawn_interval.is_finite() && waves.min_spawn_interval >= 0.0) {
            return Err(invalid("waves.min_spawn_interval must not be negative"));
        }
        for (index, wave) in waves.waves.iter().enumerate() {
            let number = index + 1;
            if !archetypes.contains(wave.archetype.as_str()) {
                return Err(invalid(format!(
                    "wave {number} uses unknown archetype `{}`",
                    wave.archetype
                )));
            }
            let timings_valid = wave.spawn_interval.is_finite()
                && wave.spawn_interval >= 0.0
                && wave.start_delay.is_finite()
                && wave.start_delay >= 0.0;
            if !timings_valid {
                return Err(invalid(format!(
                    "wave {number} timings must be non-negative numbers"
                )));
            }
        }

        Ok(())
    }
}

fn invalid(message: impl Into<String>) -> ConfigError {
    ConfigError::Validation(message.into())
}
