//! Gameplay Configuration
//!
//! Centralized tuning parameters. Every magic number in the simulation
//! lives here so game balance can be adjusted (or loaded from a JSON file)
//! without touching system code. Defaults reproduce the classic feel:
//! slow opening march, heartbeat acceleration as ranks thin, fire pressure
//! ramping with each wave.

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Configuration validation or parse failure.
#[derive(Debug, Error)]
pub enum ConfigError {
    /// A field holds a value the simulation cannot run with.
    #[error("invalid config: {0}")]
    Invalid(String),

    /// The JSON document could not be parsed.
    #[error("config parse error: {0}")]
    Parse(#[from] serde_json::Error),
}

/// Play-field dimensions and tick policy.
#[derive(Clone, Debug, Serialize, Deserialize)]
#[serde(default)]
pub struct WorldConfig {
    /// Play-field width in pixels
    pub width: f32,
    /// Play-field height in pixels
    pub height: f32,
    /// Upper bound on a single tick's delta, in seconds. Unclamped deltas
    /// let entities tunnel through collision checks after a stalled frame.
    pub max_delta_seconds: f32,
    /// How far off-screen a bullet may travel before removal
    pub offscreen_margin: f32,
    /// Fraction of world height at which the formation triggers invasion
    pub invasion_line_fraction: f32,
    /// Seconds the wave-clear celebration lasts before the next wave
    pub level_clear_seconds: f32,
}

impl Default for WorldConfig {
    fn default() -> Self {
        Self {
            width: 900.0,
            height: 700.0,
            max_delta_seconds: 0.1,
            offscreen_margin: 50.0,
            invasion_line_fraction: 0.85,
            level_clear_seconds: 3.0,
        }
    }
}

/// Player ship tuning.
#[derive(Clone, Debug, Serialize, Deserialize)]
#[serde(default)]
pub struct PlayerConfig {
    /// Horizontal speed in pixels per second
    pub speed: f32,
    /// Ship width
    pub width: f32,
    /// Ship height
    pub height: f32,
    /// Seconds between shots
    pub fire_cooldown_seconds: f32,
    /// Maximum simultaneous player bullets (classic style: 1)
    pub max_bullets: usize,
    /// Lives at game start
    pub starting_lives: u32,
    /// Seconds of invulnerability after losing a life
    pub invulnerability_seconds: f32,
}

impl Default for PlayerConfig {
    fn default() -> Self {
        Self {
            speed: 340.0,
            width: 50.0,
            height: 28.0,
            fire_cooldown_seconds: 0.28,
            max_bullets: 1,
            starting_lives: 3,
            invulnerability_seconds: 1.2,
        }
    }
}

/// Invader formation layout and movement tuning.
#[derive(Clone, Debug, Serialize, Deserialize)]
#[serde(default)]
pub struct FormationConfig {
    /// Grid rows
    pub rows: usize,
    /// Grid columns
    pub columns: usize,
    /// Invader width
    pub invader_width: f32,
    /// Invader height
    pub invader_height: f32,
    /// Horizontal gap between invaders
    pub gap_x: f32,
    /// Vertical gap between invaders
    pub gap_y: f32,
    /// X of the leftmost column at spawn
    pub start_x: f32,
    /// Y of the top row at spawn
    pub start_y: f32,
    /// Horizontal speed with a full formation on wave 1, pixels per second
    pub base_speed: f32,
    /// Hard cap on horizontal speed after all multipliers
    pub max_speed: f32,
    /// Vertical drop applied on each direction flip
    pub drop_distance: f32,
    /// Distance from the world edge at which the formation turns
    pub edge_margin: f32,
    /// Multiplicative speed growth per wave: `(1 + increase)^(wave - 1)`
    pub level_speed_increase: f32,
    /// Speed multiplier once the surviving fraction hits the threshold
    pub population_speedup_max: f32,
    /// Surviving fraction at or below which the speedup is maximal
    pub population_speedup_threshold: f32,
}

impl Default for FormationConfig {
    fn default() -> Self {
        Self {
            rows: 5,
            columns: 10,
            invader_width: 42.0,
            invader_height: 28.0,
            gap_x: 14.0,
            gap_y: 14.0,
            start_x: 90.0,
            start_y: 80.0,
            base_speed: 36.0,
            max_speed: 160.0,
            drop_distance: 18.0,
            edge_margin: 12.0,
            level_speed_increase: 0.15,
            population_speedup_max: 3.0,
            population_speedup_threshold: 0.2,
        }
    }
}

/// Bullet sizes and speeds for both owners.
#[derive(Clone, Debug, Serialize, Deserialize)]
#[serde(default)]
pub struct BulletConfig {
    /// Player bullet upward speed, pixels per second (stored positive)
    pub player_speed: f32,
    /// Enemy bullet downward speed, pixels per second
    pub enemy_speed: f32,
    /// Bullet width
    pub width: f32,
    /// Bullet height
    pub height: f32,
}

impl Default for BulletConfig {
    fn default() -> Self {
        Self {
            player_speed: 560.0,
            enemy_speed: 280.0,
            width: 4.0,
            height: 14.0,
        }
    }
}

/// Enemy fire control tuning.
///
/// The controller fires on a countdown re-randomized inside
/// `[min_interval, max_interval]`; the window narrows each wave, down to
/// the configured floors, and the concurrent bullet cap grows.
#[derive(Clone, Debug, Serialize, Deserialize)]
#[serde(default)]
pub struct FireConfig {
    /// Wave-1 minimum seconds between enemy shots
    pub min_interval_seconds: f32,
    /// Wave-1 maximum seconds between enemy shots
    pub max_interval_seconds: f32,
    /// Per-wave reduction of the minimum interval
    pub min_interval_shrink_per_wave: f32,
    /// Per-wave reduction of the maximum interval
    pub max_interval_shrink_per_wave: f32,
    /// Floor for the minimum interval
    pub min_interval_floor: f32,
    /// Floor for the maximum interval
    pub max_interval_floor: f32,
    /// Concurrent enemy bullets on wave 1
    pub max_enemy_bullets: usize,
    /// Hard cap on concurrent enemy bullets at any wave
    pub max_enemy_bullets_cap: usize,
}

impl Default for FireConfig {
    fn default() -> Self {
        Self {
            min_interval_seconds: 0.5,
            max_interval_seconds: 1.4,
            min_interval_shrink_per_wave: 0.03,
            max_interval_shrink_per_wave: 0.08,
            min_interval_floor: 0.18,
            max_interval_floor: 0.45,
            max_enemy_bullets: 4,
            max_enemy_bullets_cap: 8,
        }
    }
}

impl FireConfig {
    /// Shot interval range for a given 1-based wave number.
    pub fn interval_for_wave(&self, wave: u32) -> (f32, f32) {
        let steps = wave.saturating_sub(1) as f32;
        let min = (self.min_interval_seconds - steps * self.min_interval_shrink_per_wave)
            .max(self.min_interval_floor);
        let max = (self.max_interval_seconds - steps * self.max_interval_shrink_per_wave)
            .max(self.max_interval_floor);
        (min, max.max(min))
    }

    /// Concurrent enemy bullet cap for a given 1-based wave number.
    pub fn cap_for_wave(&self, wave: u32) -> usize {
        let extra = (wave.saturating_sub(1) / 2) as usize;
        (self.max_enemy_bullets + extra).min(self.max_enemy_bullets_cap)
    }
}

/// Destructible shield tuning.
#[derive(Clone, Debug, Serialize, Deserialize)]
#[serde(default)]
pub struct ShieldConfig {
    /// Number of shields spread across the field
    pub count: usize,
    /// Side length of one destructible block, in pixels
    pub block_size: f32,
    /// Hits a block takes before it disappears
    pub block_health: u8,
    /// Distance of the shield row from the bottom of the screen
    pub y_offset: f32,
    /// Damage neighborhood around the impact point, in block units
    pub impact_radius_blocks: i32,
}

impl Default for ShieldConfig {
    fn default() -> Self {
        Self {
            count: 4,
            block_size: 3.0,
            block_health: 2,
            y_offset: 200.0,
            impact_radius_blocks: 1,
        }
    }
}

/// Bonus enemy tuning.
///
/// A Valentine-themed courier (ring, chocolate box, or love letter) crosses
/// the top of the field on a randomized schedule; shooting it awards a
/// randomized point prize.
#[derive(Clone, Debug, Serialize, Deserialize)]
#[serde(default)]
pub struct BonusConfig {
    /// Minimum seconds between despawn and the next spawn
    pub min_spawn_seconds: f32,
    /// Maximum seconds between despawn and the next spawn
    pub max_spawn_seconds: f32,
    /// Horizontal flight speed, pixels per second
    pub speed: f32,
    /// Flight altitude: Y of the bonus top edge
    pub y: f32,
    /// Bonus width
    pub width: f32,
    /// Bonus height
    pub height: f32,
    /// Smallest prize
    pub min_points: u32,
    /// Largest prize
    pub max_points: u32,
    /// Prize granularity; awards land on `min_points + k * points_step`
    pub points_step: u32,
}

impl Default for BonusConfig {
    fn default() -> Self {
        Self {
            min_spawn_seconds: 20.0,
            max_spawn_seconds: 30.0,
            speed: 100.0,
            y: 40.0,
            width: 40.0,
            height: 40.0,
            min_points: 100,
            max_points: 300,
            points_step: 50,
        }
    }
}

/// Particle system limits.
#[derive(Clone, Debug, Serialize, Deserialize)]
#[serde(default)]
pub struct ParticleConfig {
    /// Hard cap on live particles; oldest are evicted first past the cap
    pub max_particles: usize,
    /// Minimum particles in a heart burst
    pub burst_min: u32,
    /// Maximum particles in a heart burst
    pub burst_max: u32,
}

impl Default for ParticleConfig {
    fn default() -> Self {
        Self {
            max_particles: 256,
            burst_min: 6,
            burst_max: 8,
        }
    }
}

/// Score values and hitbox adjustments.
#[derive(Clone, Debug, Serialize, Deserialize)]
#[serde(default)]
pub struct ScoringConfig {
    /// Points awarded per invader, indexed by row from the top. Rows past
    /// the end of the table score the last entry.
    pub points_by_row: Vec<u32>,
    /// Player hitbox shrink factor (forgiving collisions)
    pub player_hitbox_scale: f32,
    /// Invader hitbox shrink factor
    pub invader_hitbox_scale: f32,
}

impl Default for ScoringConfig {
    fn default() -> Self {
        Self {
            points_by_row: vec![50, 40, 30, 20, 10],
            player_hitbox_scale: 0.8,
            invader_hitbox_scale: 0.9,
        }
    }
}

/// Complete game configuration.
#[derive(Clone, Debug, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct GameConfig {
    /// Play-field and tick policy
    pub world: WorldConfig,
    /// Player ship
    pub player: PlayerConfig,
    /// Invader formation
    pub formation: FormationConfig,
    /// Bullets
    pub bullets: BulletConfig,
    /// Enemy fire control
    pub fire: FireConfig,
    /// Shields
    pub shields: ShieldConfig,
    /// Bonus enemy
    pub bonus: BonusConfig,
    /// Particles
    pub particles: ParticleConfig,
    /// Scoring and hitboxes
    pub scoring: ScoringConfig,
}

impl GameConfig {
    /// Parse a configuration from a JSON document and validate it.
    pub fn from_json(json: &str) -> Result<Self, ConfigError> {
        let config: Self = serde_json::from_str(json)?;
        config.validate()?;
        Ok(config)
    }

    /// Reject configurations the simulation cannot run with.
    pub fn validate(&self) -> Result<(), ConfigError> {
        fn positive(name: &str, value: f32) -> Result<(), ConfigError> {
            if value > 0.0 && value.is_finite() {
                Ok(())
            } else {
                Err(ConfigError::Invalid(format!("{name} must be positive, got {value}")))
            }
        }

        positive("world.width", self.world.width)?;
        positive("world.height", self.world.height)?;
        positive("world.max_delta_seconds", self.world.max_delta_seconds)?;
        positive("player.speed", self.player.speed)?;
        positive("formation.base_speed", self.formation.base_speed)?;
        positive("formation.drop_distance", self.formation.drop_distance)?;
        positive("bullets.player_speed", self.bullets.player_speed)?;
        positive("bullets.enemy_speed", self.bullets.enemy_speed)?;
        positive("shields.block_size", self.shields.block_size)?;

        if self.formation.rows == 0 || self.formation.columns == 0 {
            return Err(ConfigError::Invalid(
                "formation grid must have at least one row and column".into(),
            ));
        }
        if self.fire.min_interval_seconds > self.fire.max_interval_seconds {
            return Err(ConfigError::Invalid(
                "fire interval minimum exceeds maximum".into(),
            ));
        }
        if !(0.0..=1.0).contains(&self.world.invasion_line_fraction) {
            return Err(ConfigError::Invalid(
                "world.invasion_line_fraction must be within [0, 1]".into(),
            ));
        }
        if !(0.0..1.0).contains(&self.formation.population_speedup_threshold) {
            return Err(ConfigError::Invalid(
                "formation.population_speedup_threshold must be within [0, 1)".into(),
            ));
        }
        if self.formation.population_speedup_max < 1.0 {
            return Err(ConfigError::Invalid(
                "formation.population_speedup_max must be at least 1.0".into(),
            ));
        }
        if self.player.max_bullets == 0 {
            return Err(ConfigError::Invalid("player.max_bullets must be at least 1".into()));
        }
        if self.shields.block_health == 0 {
            return Err(ConfigError::Invalid("shields.block_health must be at least 1".into()));
        }
        if self.scoring.points_by_row.is_empty() {
            return Err(ConfigError::Invalid("scoring.points_by_row must not be empty".into()));
        }
        positive("bonus.speed", self.bonus.speed)?;
        positive("bonus.width", self.bonus.width)?;
        positive("bonus.height", self.bonus.height)?;
        if self.bonus.min_spawn_seconds > self.bonus.max_spawn_seconds {
            return Err(ConfigError::Invalid(
                "bonus spawn interval minimum exceeds maximum".into(),
            ));
        }
        if self.bonus.points_step == 0 {
            return Err(ConfigError::Invalid("bonus.points_step must be at least 1".into()));
        }
        if self.bonus.min_points > self.bonus.max_points {
            return Err(ConfigError::Invalid("bonus.min_points exceeds max_points".into()));
        }

        Ok(())
    }

    /// World-space Y of the invasion line.
    pub fn invasion_line_y(&self) -> f32 {
        self.world.height * self.world.invasion_line_fraction
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults_are_valid() {
        GameConfig::default().validate().expect("defaults must validate");
    }

    #[test]
    fn test_zero_world_rejected() {
        let mut config = GameConfig::default();
        config.world.width = 0.0;
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_inverted_fire_interval_rejected() {
        let mut config = GameConfig::default();
        config.fire.min_interval_seconds = 2.0;
        config.fire.max_interval_seconds = 1.0;
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_fire_interval_narrows_with_wave() {
        let config = FireConfig::default();
        let (min1, max1) = config.interval_for_wave(1);
        let (min5, max5) = config.interval_for_wave(5);

        assert_eq!((min1, max1), (0.5, 1.4));
        assert!(min5 < min1);
        assert!(max5 < max1);

        // Floors hold for absurd wave numbers
        let (min99, max99) = config.interval_for_wave(99);
        assert_eq!(min99, config.min_interval_floor);
        assert_eq!(max99, config.max_interval_floor);
        assert!(min99 <= max99);
    }

    #[test]
    fn test_bullet_cap_grows_then_saturates() {
        let config = FireConfig::default();
        assert_eq!(config.cap_for_wave(1), 4);
        assert_eq!(config.cap_for_wave(3), 5);
        assert_eq!(config.cap_for_wave(9), 8);
        assert_eq!(config.cap_for_wave(50), 8);
    }

    #[test]
    fn test_json_round_trip() {
        let config = GameConfig::default();
        let json = serde_json::to_string(&config).expect("serialize");
        let parsed = GameConfig::from_json(&json).expect("parse back");
        assert_eq!(parsed.world.width, config.world.width);
        assert_eq!(parsed.scoring.points_by_row, config.scoring.points_by_row);
    }

    #[test]
    fn test_partial_json_fills_defaults() {
        let parsed = GameConfig::from_json(r#"{"world": {"width": 1200.0}}"#).expect("parse");
        assert_eq!(parsed.world.width, 1200.0);
        assert_eq!(parsed.world.height, 700.0);
        assert_eq!(parsed.formation.rows, 5);
    }
}
