//! Bonus Enemy
//!
//! A Valentine courier that periodically crosses the top of the field:
//! an engagement ring, a chocolate box, or a love letter, worth a
//! randomized prize when shot. Spawn direction, variant, and prize all
//! come from the world RNG, so bonus appearances replay with the rest of
//! the game. The spawn countdown only runs while no bonus is in flight.

use serde::{Deserialize, Serialize};

use crate::core::geom::Rect;
use crate::core::rng::GameRng;
use crate::game::config::BonusConfig;

/// Visual variant of the bonus courier.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum BonusKind {
    /// Engagement ring
    Ring,
    /// Chocolate box
    Chocolate,
    /// Love letter
    Letter,
}

impl BonusKind {
    const ALL: [BonusKind; 3] = [BonusKind::Ring, BonusKind::Chocolate, BonusKind::Letter];
}

/// A bonus courier in flight.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct BonusShip {
    /// Position and size
    pub rect: Rect,
    /// Horizontal velocity, pixels per second; sign is the flight direction
    pub velocity_x: f32,
    /// Visual variant
    pub kind: BonusKind,
    /// Prize for shooting it down
    pub points: u32,
}

/// Spawn scheduler and flight state for the bonus enemy.
///
/// At most one bonus exists at a time. After a despawn or a kill the
/// countdown re-rolls inside the configured window.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct BonusControl {
    active: Option<BonusShip>,
    time_until_spawn: f32,
}

impl BonusControl {
    /// Create a controller with its first spawn countdown rolled.
    pub fn new(config: &BonusConfig, rng: &mut GameRng) -> Self {
        Self {
            active: None,
            time_until_spawn: roll_spawn_interval(config, rng),
        }
    }

    /// Clear any in-flight bonus and re-roll the countdown, e.g. at wave
    /// start.
    pub fn reset(&mut self, config: &BonusConfig, rng: &mut GameRng) {
        self.active = None;
        self.time_until_spawn = roll_spawn_interval(config, rng);
    }

    /// The bonus currently in flight, if any.
    pub fn active(&self) -> Option<&BonusShip> {
        self.active.as_ref()
    }

    /// Remove the in-flight bonus (it was shot down) and re-arm the
    /// countdown. Returns the downed ship for scoring.
    pub fn shoot_down(&mut self, config: &BonusConfig, rng: &mut GameRng) -> Option<BonusShip> {
        let downed = self.active.take();
        if downed.is_some() {
            self.time_until_spawn = roll_spawn_interval(config, rng);
        }
        downed
    }

    /// Advance one tick: fly and despawn the active bonus, or run the
    /// spawn countdown while none is up.
    pub fn update(
        &mut self,
        dt_seconds: f32,
        config: &BonusConfig,
        world_width: f32,
        rng: &mut GameRng,
    ) {
        if let Some(bonus) = &mut self.active {
            bonus.rect.x += bonus.velocity_x * dt_seconds;

            let gone_right = bonus.velocity_x > 0.0 && bonus.rect.x > world_width + config.width;
            let gone_left = bonus.velocity_x < 0.0 && bonus.rect.x < -config.width;
            if gone_right || gone_left {
                self.active = None;
                self.time_until_spawn = roll_spawn_interval(config, rng);
            }
            return;
        }

        self.time_until_spawn -= dt_seconds;
        if self.time_until_spawn <= 0.0 {
            self.active = Some(spawn(config, world_width, rng));
            self.time_until_spawn = roll_spawn_interval(config, rng);
        }
    }
}

fn roll_spawn_interval(config: &BonusConfig, rng: &mut GameRng) -> f32 {
    rng.range_f32(config.min_spawn_seconds, config.max_spawn_seconds)
}

fn spawn(config: &BonusConfig, world_width: f32, rng: &mut GameRng) -> BonusShip {
    let direction = if rng.next_f32() < 0.5 { 1.0 } else { -1.0 };
    let x = if direction > 0.0 {
        -config.width
    } else {
        world_width + config.width
    };

    let steps = (config.max_points - config.min_points) / config.points_step;
    let points = config.min_points + config.points_step * rng.range_u32(0, steps);

    let kind = *rng.choose(&BonusKind::ALL).unwrap_or(&BonusKind::Ring);

    BonusShip {
        rect: Rect::new(x, config.y, config.width, config.height),
        velocity_x: config.speed * direction,
        kind,
        points,
    }
}
