//! Runtime configuration loaded from `space-arena.toml`.
//!
//! Every field defaults to the tuning the game ships with, so a config file
//! only needs the keys it wants to override.

use std::path::{Path, PathBuf};

use log::info;
use serde::Deserialize;

use crate::error::ArenaError;

/// File looked up in the working directory when no `--config` is given.
pub const DEFAULT_CONFIG_FILE: &str = "space-arena.toml";

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct ArenaConfig {
    pub world: WorldConfig,
    pub player: PlayerConfig,
    pub bots: BotConfig,
    pub spawning: SpawnConfig,
    pub pickups: PickupConfig,
    pub render: RenderConfig,
    pub audio: AudioConfig,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct WorldConfig {
    /// Side length of the square world
    pub size: f32,
    /// Velocity damping applied to ships every frame
    pub friction: f32,
    pub grid_spacing: f32,
}

impl Default for WorldConfig {
    fn default() -> Self {
        Self {
            size: 4000.0,
            friction: 0.95,
            grid_spacing: 100.0,
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct PlayerConfig {
    pub name: String,
    pub radius: f32,
    pub max_hp: f32,
    pub speed: f32,
    /// Acceleration per held movement key at base speed
    pub thrust: f32,
    pub damage: f32,
    /// Frames between shots
    pub fire_rate: f32,
    /// Radians between neighbouring projectiles of one volley
    pub spread: f32,
    pub color: [u8; 3],
}

impl Default for PlayerConfig {
    fn default() -> Self {
        Self {
            name: "Player".to_string(),
            radius: 20.0,
            max_hp: 100.0,
            speed: 5.0,
            thrust: 0.5,
            damage: 10.0,
            fire_rate: 30.0,
            spread: 0.1,
            color: [0x00, 0xf2, 0xff],
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct BotConfig {
    pub speed: f32,
    pub max_speed: f32,
    pub aggro_radius: f32,
    pub fire_range: f32,
    pub wander_min_frames: u32,
    pub wander_max_frames: u32,
    pub chase_thrust: f32,
    pub wander_thrust: f32,
    pub names: Vec<String>,
    pub colors: Vec<[u8; 3]>,
}

impl Default for BotConfig {
    fn default() -> Self {
        let names = [
            "ProGamer",
            "NoobMaster",
            "SpaceAce",
            "GalaxyKing",
            "Destroyer",
            "Luna",
            "StarLord",
            "Viper",
            "Falcon",
            "Guest_832",
            "Zero",
            "Neo",
            "Trinity",
            "Xenon",
            "Quasar",
            "Nebula",
            "Void",
            "Cyber",
            "Glitch",
            "Kratos",
        ];

        Self {
            speed: 2.0,
            max_speed: 8.0,
            aggro_radius: 800.0,
            fire_range: 400.0,
            wander_min_frames: 60,
            wander_max_frames: 180,
            chase_thrust: 0.1,
            wander_thrust: 0.05,
            names: names.iter().map(|n| n.to_string()).collect(),
            colors: vec![
                [0x00, 0xf2, 0xff],
                [0xbd, 0x00, 0xff],
                [0xff, 0x00, 0x55],
                [0x00, 0xff, 0x88],
                [0xff, 0xcc, 0x00],
                [0xff, 0xff, 0xff],
            ],
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct SpawnConfig {
    /// Disables both the initial population and the per-frame spawn rolls
    pub enabled: bool,
    pub initial_bots: usize,
    pub initial_asteroids: usize,
    /// Ship cap (player included) at frame zero
    pub base_ship_cap: usize,
    /// The ship cap grows by one every this many frames
    pub frames_per_extra_ship: u64,
    pub bot_spawn_chance: f64,
    pub asteroid_cap: usize,
    pub asteroid_spawn_chance: f64,
    pub min_spawn_distance: f32,
    /// Bot difficulty grows by 1.0 every this many frames
    pub difficulty_frames: u64,
}

impl Default for SpawnConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            initial_bots: 10,
            initial_asteroids: 50,
            base_ship_cap: 20,
            frames_per_extra_ship: 600,
            bot_spawn_chance: 0.05,
            asteroid_cap: 50,
            asteroid_spawn_chance: 0.02,
            min_spawn_distance: 1000.0,
            difficulty_frames: 3600,
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct PickupConfig {
    pub base_magnet_radius: f32,
    pub magnet_per_size: f32,
    /// Fraction of the remaining distance an orb closes per frame
    pub magnet_pull: f32,
    /// Max offset of dropped orbs from the death position, per axis
    pub drop_jitter: f32,
}

impl Default for PickupConfig {
    fn default() -> Self {
        Self {
            base_magnet_radius: 150.0,
            magnet_per_size: 50.0,
            magnet_pull: 0.15,
            drop_jitter: 20.0,
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct RenderConfig {
    /// World units covered by one terminal column
    pub cell_width: f32,
    /// World units covered by one terminal row
    pub cell_height: f32,
    pub frame_millis: u64,
    /// Minimap side in terminal rows (twice as many columns)
    pub minimap_size: u16,
}

impl Default for RenderConfig {
    fn default() -> Self {
        Self {
            cell_width: 16.0,
            cell_height: 32.0,
            frame_millis: 16,
            minimap_size: 10,
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct AudioConfig {
    pub enabled: bool,
    pub volume: f32,
}

impl Default for AudioConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            volume: 0.05,
        }
    }
}

impl ArenaConfig {
    /// Parses a config from TOML text.
    pub fn from_toml(contents: &str, path: &Path) -> Result<Self, ArenaError> {
        toml::from_str(contents).map_err(|source| ArenaError::Parse {
            path: path.to_path_buf(),
            source,
        })
    }

    /// Reads and parses the config at `path`.
    pub fn load(path: &Path) -> Result<Self, ArenaError> {
        let contents = std::fs::read_to_string(path).map_err(|source| ArenaError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        let config = Self::from_toml(&contents, path)?;
        info!("loaded config from {}", path.display());
        Ok(config)
    }

    /// Loads an explicitly requested config, or the default file if it exists.
    pub fn load_or_default(path: Option<&Path>) -> Result<Self, ArenaError> {
        if let Some(path) = path {
            return Self::load(path);
        }

        let default_path = PathBuf::from(DEFAULT_CONFIG_FILE);
        if default_path.exists() {
            Self::load(&default_path)
        } else {
            info!("no {DEFAULT_CONFIG_FILE} found; using built-in defaults");
            Ok(Self::default())
        }
    }
}
