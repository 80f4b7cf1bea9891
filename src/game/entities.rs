//! Entity Records
//!
//! Plain data for the things that move: invaders, bullets, and the player
//! ship. All positions are top-left-corner rectangles (see `core::geom`).
//! Formation movement, fire decisions, and collision resolution live in
//! their own modules; entities only know how to advance themselves.

use serde::{Deserialize, Serialize};

use crate::core::geom::Rect;
use crate::game::config::{BulletConfig, PlayerConfig, WorldConfig};

/// Who fired a bullet. Fixed at construction and never changes.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum BulletOwner {
    /// Fired by the player, travels upward
    Player,
    /// Fired by an invader, travels downward
    Enemy,
}

/// A single invader in the formation grid.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct Invader {
    /// Position and size
    pub rect: Rect,
    /// Row index in the formation, 0 at the top. Determines point value.
    pub row: usize,
    /// Column index in the formation. Stable for the lifetime of a wave;
    /// the fire controller uses it to find the bottom-most shooter per
    /// column.
    pub column: usize,
    /// False once destroyed by a player bullet
    pub alive: bool,
}

impl Invader {
    /// Create a live invader at a grid slot.
    pub fn new(rect: Rect, row: usize, column: usize) -> Self {
        Self {
            rect,
            row,
            column,
            alive: true,
        }
    }

    /// Point value for destroying this invader. Rows past the end of the
    /// table score the last entry.
    pub fn points(&self, points_by_row: &[u32]) -> u32 {
        let index = self.row.min(points_by_row.len().saturating_sub(1));
        points_by_row.get(index).copied().unwrap_or(0)
    }
}

/// A projectile, owned by either side.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct Bullet {
    /// Position and size
    pub rect: Rect,
    /// Vertical velocity in pixels per second; negative is upward
    pub velocity_y: f32,
    /// Owner tag, fixed at construction
    pub owner: BulletOwner,
    /// False once the bullet has hit something or left the field
    pub active: bool,
}

impl Bullet {
    /// Spawn a player bullet centered on `x`, with its bottom at `y`.
    pub fn player(x: f32, y: f32, config: &BulletConfig) -> Self {
        Self {
            rect: Rect::new(x - config.width / 2.0, y - config.height, config.width, config.height),
            velocity_y: -config.player_speed,
            owner: BulletOwner::Player,
            active: true,
        }
    }

    /// Spawn an enemy bullet centered on `x`, with its top at `y`.
    pub fn enemy(x: f32, y: f32, config: &BulletConfig) -> Self {
        Self {
            rect: Rect::new(x - config.width / 2.0, y, config.width, config.height),
            velocity_y: config.enemy_speed,
            owner: BulletOwner::Enemy,
            active: true,
        }
    }

    /// Integrate one tick of movement.
    pub fn advance(&mut self, dt_seconds: f32) {
        self.rect.y += self.velocity_y * dt_seconds;
    }

    /// True once the bullet is past the cleanup margin above or below the
    /// play field.
    pub fn is_offscreen(&self, world: &WorldConfig) -> bool {
        self.rect.bottom() < -world.offscreen_margin
            || self.rect.top() > world.height + world.offscreen_margin
    }
}

/// The player ship.
///
/// Lives and invulnerability are tracked by the world's lives manager, not
/// here; the ship only knows its position and fire cooldown.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct PlayerShip {
    /// Position and size
    pub rect: Rect,
    /// Horizontal speed in pixels per second
    pub speed: f32,
    /// Seconds until the next shot is allowed
    pub fire_cooldown_remaining: f32,
}

impl PlayerShip {
    /// Create the ship at its spawn point.
    pub fn new(config: &PlayerConfig, world: &WorldConfig) -> Self {
        let (x, y) = Self::spawn_position(config, world);
        Self {
            rect: Rect::new(x, y, config.width, config.height),
            speed: config.speed,
            fire_cooldown_remaining: 0.0,
        }
    }

    /// Spawn point: horizontally centered, near the bottom of the field.
    pub fn spawn_position(config: &PlayerConfig, world: &WorldConfig) -> (f32, f32) {
        ((world.width - config.width) / 2.0, world.height - 70.0)
    }

    /// Move horizontally from input (`direction` in {-1, 0, +1}), clamped
    /// to the play field, and cool the fire timer.
    pub fn advance(&mut self, dt_seconds: f32, direction: f32, world_width: f32) {
        self.rect.x += direction * self.speed * dt_seconds;
        self.rect.x = self.rect.x.clamp(0.0, world_width - self.rect.w);
        self.fire_cooldown_remaining = (self.fire_cooldown_remaining - dt_seconds).max(0.0);
    }

    /// Put the ship back at its spawn point and clear the fire cooldown.
    pub fn reset_position(&mut self, config: &PlayerConfig, world: &WorldConfig) {
        let (x, y) = Self::spawn_position(config, world);
        self.rect.x = x;
        self.rect.y = y;
        self.fire_cooldown_remaining = 0.0;
    }

    /// Whether the fire cooldown has elapsed. The concurrent-bullet cap is
    /// enforced by the world, which owns the bullet list.
    pub fn can_fire(&self) -> bool {
        self.fire_cooldown_remaining <= 0.0
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_invader_points_by_row() {
        let points = [50, 40, 30, 20, 10];
        let rect = Rect::new(0.0, 0.0, 42.0, 28.0);

        assert_eq!(Invader::new(rect, 0, 0).points(&points), 50);
        assert_eq!(Invader::new(rect, 4, 0).points(&points), 10);
        // Rows past the table clamp to the last entry
        assert_eq!(Invader::new(rect, 9, 0).points(&points), 10);
    }

    #[test]
    fn test_bullet_owner_direction() {
        let config = BulletConfig::default();
        let up = Bullet::player(100.0, 500.0, &config);
        let down = Bullet::enemy(100.0, 100.0, &config);

        assert!(up.velocity_y < 0.0);
        assert!(down.velocity_y > 0.0);
        assert_eq!(up.owner, BulletOwner::Player);
        assert_eq!(down.owner, BulletOwner::Enemy);
    }

    #[test]
    fn test_bullet_offscreen() {
        let world = WorldConfig::default();
        let config = BulletConfig::default();

        let mut bullet = Bullet::player(100.0, 100.0, &config);
        assert!(!bullet.is_offscreen(&world));

        bullet.rect.y = -world.offscreen_margin - config.height - 1.0;
        assert!(bullet.is_offscreen(&world));

        let mut falling = Bullet::enemy(100.0, 100.0, &config);
        falling.rect.y = world.height + world.offscreen_margin + 1.0;
        assert!(falling.is_offscreen(&world));
    }

    #[test]
    fn test_player_clamped_to_field() {
        let player_config = PlayerConfig::default();
        let world = WorldConfig::default();
        let mut ship = PlayerShip::new(&player_config, &world);

        ship.advance(100.0, 1.0, world.width);
        assert_eq!(ship.rect.right(), world.width);

        ship.advance(100.0, -1.0, world.width);
        assert_eq!(ship.rect.x, 0.0);
    }

    #[test]
    fn test_fire_cooldown_counts_down() {
        let player_config = PlayerConfig::default();
        let world = WorldConfig::default();
        let mut ship = PlayerShip::new(&player_config, &world);

        ship.fire_cooldown_remaining = 0.28;
        assert!(!ship.can_fire());

        ship.advance(0.3, 0.0, world.width);
        assert!(ship.can_fire());
    }
}
