//! Game configuration read from `bubble-arena.toml`.

use std::{
    fs,
    path::{Path, PathBuf},
    time::Duration,
};

use bubble_arena_core::{ItemKind, DEFAULT_DROP_CHANCE, EXPLOSION_LIFETIME, FUSE_DURATION};
use bubble_arena_world::{DropTable, PlayerDefaults, WorldConfig};
use serde::Deserialize;
use thiserror::Error;

/// Name of the configuration file looked up by adapters.
pub const DEFAULT_CONFIG_FILE: &str = "bubble-arena.toml";

/// Errors raised while loading the configuration.
#[derive(Debug, Error)]
pub enum ConfigError {
    /// The file could not be read.
    #[error("failed to read config at {}", path.display())]
    Read {
        /// Location of the file.
        path: PathBuf,
        /// Underlying I/O failure.
        #[source]
        source: std::io::Error,
    },
    /// The file is not valid TOML for [`GameConfig`].
    #[error("failed to parse config toml")]
    Parse(#[from] toml::de::Error),
    /// A value is outside its accepted range.
    #[error("invalid config value for `{field}`: {reason}")]
    Invalid {
        /// Offending key.
        field: &'static str,
        /// Accepted range.
        reason: &'static str,
    },
}

/// Item drop settings.
#[derive(Clone, Debug, PartialEq, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct DropConfig {
    /// Probability that a shattered block leaves an item.
    pub chance: f64,
    /// Kinds chosen uniformly when an item drops.
    pub kinds: Vec<ItemKind>,
}

impl Default for DropConfig {
    fn default() -> Self {
        Self {
            chance: DEFAULT_DROP_CHANCE,
            kinds: ItemKind::ALL.to_vec(),
        }
    }
}

/// Starting statistics of spawned players.
#[derive(Clone, Debug, PartialEq, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct PlayerConfig {
    /// Bubbles available after spawning.
    pub num_bubbles: u32,
    /// Blast range of dropped bubbles.
    pub explosion_range: u32,
    /// Distance covered per movement step.
    pub speed: f32,
    /// Distance covered per movement step while trapped.
    pub trapped_speed: f32,
}

impl Default for PlayerConfig {
    fn default() -> Self {
        let defaults = PlayerDefaults::default();
        Self {
            num_bubbles: defaults.num_bubbles,
            explosion_range: defaults.explosion_range,
            speed: defaults.speed,
            trapped_speed: defaults.trapped_speed,
        }
    }
}

/// Complete game configuration. Every key is optional.
#[derive(Clone, Debug, PartialEq, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct GameConfig {
    /// Number of tiles per side.
    pub grid_size: u32,
    /// Side length of a tile in world units.
    pub tile_size: f32,
    /// Fuse of bubble groups in milliseconds.
    pub fuse_ms: u64,
    /// Lifetime of explosion groups in milliseconds.
    pub explosion_lifetime_ms: u64,
    /// Simulation ticks per second.
    pub tick_rate_hz: u32,
    /// Seed of the item drop generator.
    pub rng_seed: u64,
    /// Directory holding level files.
    pub level_dir: PathBuf,
    /// Level to load; an empty arena is used when absent.
    pub level: Option<String>,
    /// Item drop settings.
    pub drops: DropConfig,
    /// Player defaults.
    pub player: PlayerConfig,
}

impl Default for GameConfig {
    fn default() -> Self {
        let world = WorldConfig::default();
        Self {
            grid_size: world.grid_size,
            tile_size: world.tile_size,
            fuse_ms: millis(FUSE_DURATION),
            explosion_lifetime_ms: millis(EXPLOSION_LIFETIME),
            tick_rate_hz: 60,
            rng_seed: world.rng_seed,
            level_dir: PathBuf::from("levels"),
            level: None,
            drops: DropConfig::default(),
            player: PlayerConfig::default(),
        }
    }
}

impl GameConfig {
    /// Loads the configuration from `path`, or returns the defaults when no
    /// path is given.
    pub fn load(path: Option<&Path>) -> Result<Self, ConfigError> {
        let Some(path) = path else {
            log::info!("no config file given, using defaults");
            return Ok(Self::default());
        };
        let contents = fs::read_to_string(path).map_err(|source| ConfigError::Read {
            path: path.to_path_buf(),
            source,
        })?;
        let config = Self::from_toml(&contents)?;
        log::info!("loaded config from {}", path.display());
        Ok(config)
    }

    /// Parses and validates a configuration document.
    pub fn from_toml(contents: &str) -> Result<Self, ConfigError> {
        let config: Self = toml::from_str(contents)?;
        config.validate()?;
        Ok(config)
    }

    fn validate(&self) -> Result<(), ConfigError> {
        if self.grid_size == 0 {
            return Err(ConfigError::Invalid {
                field: "grid_size",
                reason: "must be at least 1",
            });
        }
        if !(self.tile_size > 0.0) {
            return Err(ConfigError::Invalid {
                field: "tile_size",
                reason: "must be positive",
            });
        }
        if self.tick_rate_hz == 0 {
            return Err(ConfigError::Invalid {
                field: "tick_rate_hz",
                reason: "must be at least 1",
            });
        }
        if !(0.0..=1.0).contains(&self.drops.chance) {
            return Err(ConfigError::Invalid {
                field: "drops.chance",
                reason: "must lie within 0.0..=1.0",
            });
        }
        Ok(())
    }

    /// Simulated time covered by a single tick.
    #[must_use]
    pub fn tick_duration(&self) -> Duration {
        Duration::from_secs(1) / self.tick_rate_hz.max(1)
    }

    /// World settings derived from the configuration.
    #[must_use]
    pub fn world_config(&self) -> WorldConfig {
        WorldConfig {
            grid_size: self.grid_size,
            tile_size: self.tile_size,
            fuse: Duration::from_millis(self.fuse_ms),
            explosion_lifetime: Duration::from_millis(self.explosion_lifetime_ms),
            drop_table: DropTable::new(self.drops.chance, self.drops.kinds.clone()),
            rng_seed: self.rng_seed,
            player: PlayerDefaults {
                num_bubbles: self.player.num_bubbles,
                explosion_range: self.player.explosion_range,
                speed: self.player.speed,
                trapped_speed: self.player.trapped_speed,
            },
        }
    }
}

fn millis(duration: Duration) -> u64 {
    u64::try_from(duration.as_millis()).unwrap_or(u64::MAX)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_match_the_simulation_constants() {
        let config = GameConfig::default();
        assert_eq!(config.grid_size, 15);
        assert_eq!(config.tile_size, 80.0);
        assert_eq!(config.fuse_ms, 3000);
        assert_eq!(config.explosion_lifetime_ms, 500);
        assert_eq!(config.drops.chance, 0.25);
        assert_eq!(config.player.explosion_range, 7);
        assert_eq!(config.world_config(), WorldConfig::default());
    }

    #[test]
    fn empty_document_yields_defaults() {
        assert_eq!(GameConfig::from_toml("").expect("parse"), GameConfig::default());
    }

    #[test]
    fn partial_document_overrides_selected_keys() {
        let config = GameConfig::from_toml(
            r#"
            tick_rate_hz = 120
            level = "crossroads"

            [drops]
            chance = 1.0
            kinds = ["Needle"]

            [player]
            explosion_range = 2
            "#,
        )
        .expect("parse");

        assert_eq!(config.tick_duration(), Duration::from_secs(1) / 120);
        assert_eq!(config.level.as_deref(), Some("crossroads"));
        assert_eq!(config.drops.kinds, vec![ItemKind::Needle]);
        assert_eq!(config.player.explosion_range, 2);
        assert_eq!(config.player.num_bubbles, 1);
        assert_eq!(config.grid_size, 15);
    }

    #[test]
    fn out_of_range_values_are_rejected() {
        let error = GameConfig::from_toml("[drops]\nchance = 1.5").expect_err("invalid");
        assert!(matches!(
            error,
            ConfigError::Invalid {
                field: "drops.chance",
                ..
            }
        ));
        assert!(matches!(
            GameConfig::from_toml("tick_rate_hz = 0"),
            Err(ConfigError::Invalid { .. })
        ));
        assert!(matches!(
            GameConfig::from_toml("unknown_key = 1"),
            Err(ConfigError::Parse(_))
        ));
    }

    #[test]
    fn missing_file_is_a_read_error() {
        let error = GameConfig::load(Some(Path::new("definitely/not/here.toml")))
            .expect_err("missing file");
        assert!(matches!(error, ConfigError::Read { .. }));
    }
}
