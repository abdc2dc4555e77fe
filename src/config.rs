//! Tunable values, loaded from an optional `invaders.toml`.
//!
//! Every field has a default, so a partial file only overrides what it names.

use std::collections::BTreeMap;
use std::path::Path;

use serde::Deserialize;

use crate::error::ConfigError;

pub const DEFAULT_CONFIG_PATH: &str = "invaders.toml";

/// Play-field extents in world units, centred on the origin.
#[derive(Clone, Debug, Deserialize, PartialEq)]
#[serde(default)]
pub struct FieldConfig {
    pub half_width: f32,
    pub top: f32,
    pub bottom: f32,
}

impl Default for FieldConfig {
    fn default() -> Self {
        FieldConfig {
            half_width: 7.5,
            top: 5.0,
            bottom: -5.0,
        }
    }
}

#[derive(Clone, Debug, Deserialize, PartialEq)]
#[serde(default)]
pub struct GridConfig {
    pub rows: usize,
    pub cols: usize,
    pub start_x: f32,
    pub start_y: f32,
    pub spacing_x: f32,
    pub spacing_y: f32,
}

impl Default for GridConfig {
    fn default() -> Self {
        GridConfig {
            rows: 5,
            cols: 12,
            start_x: -5.0,
            start_y: 4.0,
            spacing_x: 0.8,
            spacing_y: 0.8,
        }
    }
}

#[derive(Clone, Debug, Deserialize, PartialEq)]
#[serde(default)]
pub struct EnemyConfig {
    /// Units moved per formation step at level 1.
    pub base_speed: f32,
    /// Extra units per step for every level above the first.
    pub speed_increment: f32,
    /// Pause between full formation steps, in seconds.
    pub move_delay: f32,
    /// Pause before each row moves, in seconds.
    pub row_delay: f32,
    pub shot_interval_min: f32,
    pub shot_interval_max: f32,
    /// A live enemy at or below this y has invaded.
    pub limit_y: f32,
    pub half_extent: f32,
}

impl Default for EnemyConfig {
    fn default() -> Self {
        EnemyConfig {
            base_speed: 0.2,
            speed_increment: 0.05,
            move_delay: 0.5,
            row_delay: 0.05,
            shot_interval_min: 0.8,
            shot_interval_max: 1.2,
            limit_y: -3.5,
            half_extent: 0.3,
        }
    }
}

#[derive(Clone, Debug, Deserialize, PartialEq)]
#[serde(default)]
pub struct PlayerConfig {
    pub start_health: i32,
    pub y: f32,
    /// Units per second.
    pub move_speed: f32,
    /// The ship is clamped to ±screen_border.
    pub screen_border: f32,
    pub shoot_cooldown: f32,
    pub half_extent: f32,
    /// Offset above the ship where its projectiles appear.
    pub muzzle_offset: f32,
}

impl Default for PlayerConfig {
    fn default() -> Self {
        PlayerConfig {
            start_health: 3,
            y: -4.0,
            move_speed: 6.0,
            screen_border: 7.0,
            shoot_cooldown: 0.5,
            half_extent: 0.35,
            muzzle_offset: 1.0,
        }
    }
}

#[derive(Clone, Debug, Deserialize, PartialEq)]
#[serde(default)]
pub struct ProjectileConfig {
    pub player_speed: f32,
    pub enemy_speed: f32,
    pub lifetime: f32,
    /// Instances created up front in each pool.
    pub pool_size: usize,
    pub half_extent: f32,
}

impl Default for ProjectileConfig {
    fn default() -> Self {
        ProjectileConfig {
            player_speed: 9.0,
            enemy_speed: 5.0,
            lifetime: 2.0,
            pool_size: 10,
            half_extent: 0.1,
        }
    }
}

#[derive(Clone, Debug, Deserialize, PartialEq)]
#[serde(default)]
pub struct ObstacleConfig {
    pub count: usize,
    pub spacing: f32,
    pub y: f32,
    /// Parts per bunker, horizontally and vertically.
    pub part_cols: usize,
    pub part_rows: usize,
    pub part_size: f32,
}

impl Default for ObstacleConfig {
    fn default() -> Self {
        ObstacleConfig {
            count: 5,
            spacing: 3.0,
            y: -2.5,
            part_cols: 4,
            part_rows: 2,
            part_size: 0.25,
        }
    }
}

#[derive(Clone, Debug, Deserialize, PartialEq)]
#[serde(default)]
pub struct SessionConfig {
    pub max_level: u32,
    /// Whole seconds shown before each wave.
    pub countdown_seconds: u32,
    /// Health granted for clearing a level.
    pub level_bonus_health: i32,
}

impl Default for SessionConfig {
    fn default() -> Self {
        SessionConfig {
            max_level: 10,
            countdown_seconds: 5,
            level_bonus_health: 1,
        }
    }
}

/// One named audio cue.
#[derive(Clone, Debug, Deserialize, PartialEq)]
#[serde(default)]
pub struct SoundCue {
    pub volume: f32,
    /// Ring the terminal bell when played.
    pub bell: bool,
}

impl Default for SoundCue {
    fn default() -> Self {
        SoundCue {
            volume: 1.0,
            bell: false,
        }
    }
}

#[derive(Clone, Debug, Deserialize, PartialEq)]
#[serde(default)]
pub struct SoundConfig {
    pub sfx_volume: f32,
    pub music_volume: f32,
    pub cues: BTreeMap<String, SoundCue>,
}

impl Default for SoundConfig {
    fn default() -> Self {
        let mut cues = BTreeMap::new();
        cues.insert("Projectile".to_string(), SoundCue { volume: 0.6, bell: false });
        cues.insert("Explosion".to_string(), SoundCue { volume: 0.8, bell: true });
        cues.insert("PlayerHit".to_string(), SoundCue { volume: 1.0, bell: true });
        cues.insert("BackgroundMusic".to_string(), SoundCue::default());
        SoundConfig {
            sfx_volume: 1.0,
            music_volume: 1.0,
            cues,
        }
    }
}

#[derive(Clone, Debug, Deserialize, PartialEq)]
#[serde(default)]
pub struct TimingConfig {
    /// Physics step in seconds.
    pub fixed_step: f32,
}

impl Default for TimingConfig {
    fn default() -> Self {
        TimingConfig { fixed_step: 0.02 }
    }
}

#[derive(Clone, Debug, Default, Deserialize, PartialEq)]
#[serde(default)]
pub struct GameConfig {
    pub field: FieldConfig,
    pub grid: GridConfig,
    pub enemy: EnemyConfig,
    pub player: PlayerConfig,
    pub projectile: ProjectileConfig,
    pub obstacle: ObstacleConfig,
    pub session: SessionConfig,
    pub sound: SoundConfig,
    pub timing: TimingConfig,
}

impl GameConfig {
    pub fn from_toml_str(content: &str, origin: &str) -> Result<Self, ConfigError> {
        let config: GameConfig = toml::from_str(content).map_err(|e| ConfigError::Parse {
            path: origin.to_string(),
            details: e.to_string(),
        })?;
        config.validate()?;
        Ok(config)
    }

    pub fn load(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let path = path.as_ref();
        let content = std::fs::read_to_string(path).map_err(|e| ConfigError::Read {
            path: path.display().to_string(),
            details: e.to_string(),
        })?;
        Self::from_toml_str(&content, &path.display().to_string())
    }

    /// Defaults when the file does not exist; any other failure is an error.
    pub fn load_or_default(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let path = path.as_ref();
        if !path.exists() {
            log::info!("{} not found, using default configuration", path.display());
            return Ok(GameConfig::default());
        }
        let config = Self::load(path)?;
        log::info!("Loaded configuration from {}", path.display());
        Ok(config)
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.grid.rows == 0 || self.grid.cols == 0 {
            return Err(ConfigError::Invalid(format!(
                "grid must have at least one row and column, got {}x{}",
                self.grid.rows, self.grid.cols
            )));
        }
        if self.session.max_level == 0 {
            return Err(ConfigError::Invalid("max_level must be at least 1".into()));
        }
        if self.enemy.shot_interval_min < 0.0
            || self.enemy.shot_interval_min > self.enemy.shot_interval_max
        {
            return Err(ConfigError::Invalid(format!(
                "shot interval {}..{} is not a valid range",
                self.enemy.shot_interval_min, self.enemy.shot_interval_max
            )));
        }
        if self.timing.fixed_step <= 0.0 {
            return Err(ConfigError::Invalid("fixed_step must be positive".into()));
        }
        if self.field.top <= self.field.bottom || self.field.half_width <= 0.0 {
            return Err(ConfigError::Invalid("play field has no area".into()));
        }
        Ok(())
    }
}
