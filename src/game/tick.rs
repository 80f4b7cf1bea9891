//! Tick Orchestration
//!
//! One fixed-order simulation step: timers, player, formation, enemy fire,
//! bullet flight, collision resolution, impact application, terminal
//! checks. The order never varies, which together with the seeded RNG
//! makes a whole game replayable from its input script.

use tracing::debug;

use crate::game::collision::{self, CollisionContext, Impact};
use crate::game::config::GameConfig;
use crate::game::entities::BulletOwner;
use crate::game::events::{sort_events, GameEvent, GameEventData, GameOverReason};
use crate::game::formation::FormationStep;
use crate::game::input::{Action, InputFrame};
use crate::game::state::World;

/// What one tick produced, for the session to act on.
#[derive(Clone, Debug, Default)]
pub struct TickResult {
    /// Events emitted this tick, priority-sorted
    pub events: Vec<GameEvent>,
    /// The last invader died this tick
    pub wave_cleared: bool,
    /// A terminal condition was reached this tick
    pub game_over: Option<GameOverReason>,
}

/// Advance the world by one frame.
///
/// `dt_seconds` is clamped to the configured maximum so a backgrounded
/// or suspended host cannot produce a teleporting frame. The tick itself
/// never changes phase; wave clears and game overs are reported through
/// the result and the session decides what they mean.
pub fn tick(world: &mut World, input: &InputFrame, config: &GameConfig, dt_seconds: f32) -> TickResult {
    let dt = dt_seconds.clamp(0.0, config.world.max_delta_seconds);
    world.tick_count += 1;

    // Timers first so this frame's grace window is accurate.
    world.lives.advance(dt);

    // Player movement and fire.
    world
        .player
        .advance(dt, input.move_direction(), config.world.width);
    if input.is_down(Action::Shoot) {
        world.try_player_fire(config);
    }

    // Formation march.
    let step = world
        .formation
        .advance(dt, &config.formation, config.world.width, world.wave);
    if step == FormationStep::Dropped {
        debug!(tick = world.tick_count, "formation dropped a row");
    }

    // Enemy fire.
    let active_enemy_bullets = world.count_bullets(BulletOwner::Enemy);
    if let Some(shot) = world.fire_control.update(
        dt,
        &config.fire,
        &world.formation,
        active_enemy_bullets,
        &mut world.rng,
        world.wave,
    ) {
        world.spawn_enemy_bullet(shot.x, shot.y, shot.row, shot.column, config);
    }

    // Bonus courier flight and spawn scheduling.
    world
        .bonus
        .update(dt, &config.bonus, config.world.width, &mut world.rng);

    // Bullet flight and offscreen culling.
    for bullet in &mut world.bullets {
        if !bullet.active {
            continue;
        }
        bullet.advance(dt);
        if bullet.is_offscreen(&config.world) {
            bullet.active = false;
        }
    }

    world.particles.advance(dt);

    // Resolve this frame's snapshot, then apply.
    let outcome = collision::resolve(&CollisionContext {
        player: &world.player,
        player_invulnerable: world.lives.is_invulnerable(),
        invaders: &world.formation.invaders,
        bullets: &world.bullets,
        shields: &world.shields,
        bonus: world.bonus.active(),
        invasion_line_y: config.invasion_line_y(),
        shield_impact_radius: config.shields.impact_radius_blocks,
        scoring: &config.scoring,
    });
    world.malformed_skipped += u64::from(outcome.skipped_malformed);
    apply_impacts(world, &outcome.impacts, config);

    world.bullets.retain(|bullet| bullet.active);

    // Terminal checks. Lives exhaustion outranks invasion, and any game
    // over outranks a wave clear in the same frame.
    let mut wave_cleared = false;
    if world.game_over.is_none() && world.formation.alive_count() == 0 {
        wave_cleared = true;
        world.push_event(GameEventData::WaveCleared { wave: world.wave });
    }
    if let Some(reason) = world.game_over {
        world.push_event(GameEventData::GameOver { reason });
        wave_cleared = false;
    }

    let mut events = world.take_events();
    sort_events(&mut events);

    TickResult {
        events,
        wave_cleared,
        game_over: world.game_over,
    }
}

/// Apply resolved impacts to the world, re-checking liveness so applying
/// is safe even if a guard turns out to be stale.
fn apply_impacts(world: &mut World, impacts: &[Impact], config: &GameConfig) {
    let mut lives_exhausted = false;
    let mut invasion = false;

    for impact in impacts {
        match *impact {
            Impact::BulletHitInvader { bullet, invader } => {
                if !world.bullets[bullet].active || !world.formation.invaders[invader].alive {
                    continue;
                }
                world.bullets[bullet].active = false;
                world.formation.invaders[invader].alive = false;

                let target = &world.formation.invaders[invader];
                let points = target.points(&config.scoring.points_by_row);
                let center = target.rect.center();
                let (row, column) = (target.row, target.column);

                let score = world.add_score(points);
                world
                    .particles
                    .spawn_heart_burst(center.x, center.y, &config.particles, &mut world.rng);
                world.push_event(GameEventData::InvaderDestroyed { row, column, points, score });
            }
            Impact::BulletHitBonus { bullet } => {
                if !world.bullets[bullet].active {
                    continue;
                }
                let Some(downed) = world.bonus.shoot_down(&config.bonus, &mut world.rng) else {
                    continue;
                };
                world.bullets[bullet].active = false;

                let center = downed.rect.center();
                let score = world.add_score(downed.points);
                world
                    .particles
                    .spawn_heart_burst(center.x, center.y, &config.particles, &mut world.rng);
                world.push_event(GameEventData::BonusDestroyed {
                    kind: downed.kind,
                    points: downed.points,
                    score,
                });
            }
            Impact::BulletHitShield { bullet, shield } => {
                if !world.bullets[bullet].active {
                    continue;
                }
                world.bullets[bullet].active = false;

                let center = world.bullets[bullet].rect.center();
                let report = world.shields[shield].damage_at(
                    center.x,
                    center.y,
                    config.shields.impact_radius_blocks,
                );
                world.particles.spawn_sparks(center.x, center.y, &mut world.rng);
                world.push_event(GameEventData::ShieldDamaged {
                    shield,
                    blocks_destroyed: report.cells_destroyed,
                    shield_destroyed: world.shields[shield].is_destroyed(),
                });
            }
            Impact::BulletHitPlayer { bullet } => {
                if !world.bullets[bullet].active {
                    continue;
                }
                let outcome = world.lives.register_hit();
                if outcome.ignored {
                    continue;
                }
                world.bullets[bullet].active = false;

                let center = world.player.rect.center();
                world.particles.spawn_sparks(center.x, center.y, &mut world.rng);
                world.player.reset_position(&config.player, &config.world);
                world.push_event(GameEventData::PlayerHit {
                    lives_remaining: world.lives.lives(),
                });
                if outcome.game_over {
                    lives_exhausted = true;
                }
            }
            Impact::BulletsParried { player_bullet, enemy_bullet } => {
                if !world.bullets[player_bullet].active || !world.bullets[enemy_bullet].active {
                    continue;
                }
                world.bullets[player_bullet].active = false;
                world.bullets[enemy_bullet].active = false;

                let a = world.bullets[player_bullet].rect.center();
                let b = world.bullets[enemy_bullet].rect.center();
                let (x, y) = ((a.x + b.x) / 2.0, (a.y + b.y) / 2.0);
                world.particles.spawn_sparks(x, y, &mut world.rng);
                world.push_event(GameEventData::BulletsParried { x, y });
            }
            Impact::InvasionLineBreached { invader } => {
                if world.formation.invaders[invader].alive {
                    invasion = true;
                }
            }
        }
    }

    if world.game_over.is_none() {
        if lives_exhausted {
            world.game_over = Some(GameOverReason::LivesExhausted);
        } else if invasion {
            world.game_over = Some(GameOverReason::Invasion);
        }
    }
}

/// Drive a world through a fixed input script at 60 Hz, restarting the
/// next wave immediately on each clear. Returns the world and every
/// event emitted, in order. Used by determinism tests and the demo.
pub fn run_scripted(
    world: &mut World,
    config: &GameConfig,
    frames: &[InputFrame],
) -> Vec<GameEvent> {
    const STEP: f32 = 1.0 / 60.0;
    let mut all_events = Vec::new();

    for frame in frames {
        let result = tick(world, frame, config, STEP);
        all_events.extend(result.events);
        if result.game_over.is_some() {
            break;
        }
        if result.wave_cleared {
            let next = world.wave + 1;
            world.start_wave(config, next);
        }
    }

    all_events
}
