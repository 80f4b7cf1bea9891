//! Collision Resolution
//!
//! One pure pass over a tick's entity snapshot, producing an ordered list
//! of impacts for the orchestrator to apply. The resolver never mutates
//! entities, so resolving the same snapshot twice yields identical
//! results. Within each category a bullet resolves at most once; a bullet
//! consumed by an earlier category never reaches a later one.
//!
//! All rectangles are top-left-corner based (see `core::geom`); hitbox
//! forgiveness is applied by shrinking about the center at the comparison
//! boundary, never by mixing positioning conventions.

use crate::game::bonus::BonusShip;
use crate::game::config::ScoringConfig;
use crate::game::entities::{Bullet, BulletOwner, Invader, PlayerShip};
use crate::game::shield::Shield;

/// Borrowed view of everything the resolver needs for one tick.
pub struct CollisionContext<'a> {
    /// The player ship
    pub player: &'a PlayerShip,
    /// Whether the player is currently invulnerable (post-hit grace)
    pub player_invulnerable: bool,
    /// The formation's invaders, dead ones included
    pub invaders: &'a [Invader],
    /// All bullets, both owners
    pub bullets: &'a [Bullet],
    /// All shields
    pub shields: &'a [Shield],
    /// The bonus courier in flight, if any
    pub bonus: Option<&'a BonusShip>,
    /// World-space Y of the invasion line
    pub invasion_line_y: f32,
    /// Damage neighborhood for shield impacts, in block units
    pub shield_impact_radius: i32,
    /// Hitbox scales
    pub scoring: &'a ScoringConfig,
}

/// A detected intersection, identified by snapshot indices.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Impact {
    /// A player bullet struck a live invader; both die
    BulletHitInvader {
        /// Bullet index
        bullet: usize,
        /// Invader index
        invader: usize,
    },
    /// A player bullet struck the bonus courier
    BulletHitBonus {
        /// Bullet index
        bullet: usize,
    },
    /// A bullet struck an intact shield cell
    BulletHitShield {
        /// Bullet index
        bullet: usize,
        /// Shield index
        shield: usize,
    },
    /// An enemy bullet struck the (vulnerable) player
    BulletHitPlayer {
        /// Bullet index
        bullet: usize,
    },
    /// A player bullet and an enemy bullet struck each other
    BulletsParried {
        /// Player bullet index
        player_bullet: usize,
        /// Enemy bullet index
        enemy_bullet: usize,
    },
    /// A live invader reached the invasion line
    InvasionLineBreached {
        /// Invader index
        invader: usize,
    },
}

/// Result of a resolution pass.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct ResolveOutcome {
    /// Impacts in resolution order
    pub impacts: Vec<Impact>,
    /// Entities skipped this tick for non-finite geometry
    pub skipped_malformed: u32,
}

/// Run the full resolution order over a snapshot.
///
/// Order: player bullets vs invaders, player bullets vs the bonus
/// courier, player bullets vs shields, enemy bullets vs shields, enemy
/// bullets vs player, invasion line, parries.
/// Entities with non-finite rectangles are skipped and counted rather
/// than crashing the tick.
pub fn resolve(ctx: &CollisionContext<'_>) -> ResolveOutcome {
    let mut outcome = ResolveOutcome::default();
    let mut bullet_consumed = vec![false; ctx.bullets.len()];
    let mut invader_claimed = vec![false; ctx.invaders.len()];

    outcome.skipped_malformed = count_malformed(ctx);

    let bullet_usable = |index: usize, bullet: &Bullet, consumed: &[bool]| {
        bullet.active && !consumed[index] && bullet.rect.is_finite()
    };

    // 1. Player bullets vs invaders: first live invader wins the bullet.
    for (bullet_index, bullet) in ctx.bullets.iter().enumerate() {
        if bullet.owner != BulletOwner::Player
            || !bullet_usable(bullet_index, bullet, &bullet_consumed)
        {
            continue;
        }
        for (invader_index, invader) in ctx.invaders.iter().enumerate() {
            if !invader.alive || invader_claimed[invader_index] || !invader.rect.is_finite() {
                continue;
            }
            let hitbox = invader.rect.scaled_about_center(ctx.scoring.invader_hitbox_scale);
            if bullet.rect.intersects(&hitbox) {
                outcome.impacts.push(Impact::BulletHitInvader {
                    bullet: bullet_index,
                    invader: invader_index,
                });
                bullet_consumed[bullet_index] = true;
                invader_claimed[invader_index] = true;
                break;
            }
        }
    }

    // 1b. Player bullets vs the bonus courier. One hit downs it.
    if let Some(bonus) = ctx.bonus {
        if bonus.rect.is_finite() {
            for (bullet_index, bullet) in ctx.bullets.iter().enumerate() {
                if bullet.owner != BulletOwner::Player
                    || !bullet_usable(bullet_index, bullet, &bullet_consumed)
                {
                    continue;
                }
                if bullet.rect.intersects(&bonus.rect) {
                    outcome.impacts.push(Impact::BulletHitBonus { bullet: bullet_index });
                    bullet_consumed[bullet_index] = true;
                    break;
                }
            }
        }
    }

    // 2 + 3. Bullets vs shields, player bullets first.
    for owner in [BulletOwner::Player, BulletOwner::Enemy] {
        for (bullet_index, bullet) in ctx.bullets.iter().enumerate() {
            if bullet.owner != owner || !bullet_usable(bullet_index, bullet, &bullet_consumed) {
                continue;
            }
            for (shield_index, shield) in ctx.shields.iter().enumerate() {
                if shield.is_destroyed() || !bullet.rect.intersects(&shield.rect()) {
                    continue;
                }
                let center = bullet.rect.center();
                if shield.intact_block_near(center.x, center.y, ctx.shield_impact_radius) {
                    outcome.impacts.push(Impact::BulletHitShield {
                        bullet: bullet_index,
                        shield: shield_index,
                    });
                    bullet_consumed[bullet_index] = true;
                    break;
                }
                // Overlapping a carved-out notch: the bullet flies through
            }
        }
    }

    // 4. Enemy bullets vs player. Skipped entirely while invulnerable.
    if !ctx.player_invulnerable && ctx.player.rect.is_finite() {
        let hitbox = ctx.player.rect.scaled_about_center(ctx.scoring.player_hitbox_scale);
        for (bullet_index, bullet) in ctx.bullets.iter().enumerate() {
            if bullet.owner != BulletOwner::Enemy
                || !bullet_usable(bullet_index, bullet, &bullet_consumed)
            {
                continue;
            }
            if bullet.rect.intersects(&hitbox) {
                outcome.impacts.push(Impact::BulletHitPlayer { bullet: bullet_index });
                bullet_consumed[bullet_index] = true;
            }
        }
    }

    // 5. Invasion line: one breach is terminal, report the first.
    for (invader_index, invader) in ctx.invaders.iter().enumerate() {
        if invader.alive
            && invader.rect.is_finite()
            && invader.rect.bottom() >= ctx.invasion_line_y
        {
            outcome.impacts.push(Impact::InvasionLineBreached { invader: invader_index });
            break;
        }
    }

    // 6. Parry: surviving player bullets vs surviving enemy bullets.
    for (player_index, player_bullet) in ctx.bullets.iter().enumerate() {
        if player_bullet.owner != BulletOwner::Player
            || !bullet_usable(player_index, player_bullet, &bullet_consumed)
        {
            continue;
        }
        for (enemy_index, enemy_bullet) in ctx.bullets.iter().enumerate() {
            if enemy_bullet.owner != BulletOwner::Enemy
                || !bullet_usable(enemy_index, enemy_bullet, &bullet_consumed)
            {
                continue;
            }
            if player_bullet.rect.intersects(&enemy_bullet.rect) {
                outcome.impacts.push(Impact::BulletsParried {
                    player_bullet: player_index,
                    enemy_bullet: enemy_index,
                });
                bullet_consumed[player_index] = true;
                bullet_consumed[enemy_index] = true;
                break;
            }
        }
    }

    outcome
}

fn count_malformed(ctx: &CollisionContext<'_>) -> u32 {
    let bad_bullets = ctx
        .bullets
        .iter()
        .filter(|bullet| bullet.active && !bullet.rect.is_finite())
        .count();
    let bad_invaders = ctx
        .invaders
        .iter()
        .filter(|invader| invader.alive && !invader.rect.is_finite())
        .count();
    let bad_player = usize::from(!ctx.player.rect.is_finite());

    (bad_bullets + bad_invaders + bad_player) as u32
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::geom::Rect;
    use crate::game::config::{
        BulletConfig, FormationConfig, PlayerConfig, ShieldConfig, WorldConfig,
    };
    use crate::game::formation::Formation;

    struct Fixture {
        player: PlayerShip,
        invaders: Vec<Invader>,
        bullets: Vec<Bullet>,
        shields: Vec<Shield>,
        bonus: Option<BonusShip>,
        scoring: ScoringConfig,
    }

    impl Fixture {
        fn new() -> Self {
            let world = WorldConfig::default();
            Self {
                player: PlayerShip::new(&PlayerConfig::default(), &world),
                invaders: Formation::spawn(&FormationConfig::default()).invaders,
                bullets: Vec::new(),
                shields: vec![Shield::new(400.0, 500.0, &ShieldConfig::default())],
                bonus: None,
                scoring: ScoringConfig::default(),
            }
        }

        fn context(&self, invulnerable: bool) -> CollisionContext<'_> {
            CollisionContext {
                player: &self.player,
                player_invulnerable: invulnerable,
                invaders: &self.invaders,
                bullets: &self.bullets,
                shields: &self.shields,
                bonus: self.bonus.as_ref(),
                invasion_line_y: 595.0,
                shield_impact_radius: 1,
                scoring: &self.scoring,
            }
        }
    }

    fn bullet_at(rect: Rect, owner: BulletOwner) -> Bullet {
        Bullet {
            rect,
            velocity_y: if owner == BulletOwner::Player { -560.0 } else { 280.0 },
            owner,
            active: true,
        }
    }

    #[test]
    fn test_player_bullet_hits_one_invader() {
        let mut fixture = Fixture::new();
        let target = fixture.invaders[0].rect;
        fixture.bullets.push(bullet_at(
            Rect::new(target.center_x(), target.center_y(), 4.0, 14.0),
            BulletOwner::Player,
        ));

        let outcome = resolve(&fixture.context(false));

        let hits: Vec<_> = outcome
            .impacts
            .iter()
            .filter(|impact| matches!(impact, Impact::BulletHitInvader { .. }))
            .collect();
        assert_eq!(hits.len(), 1);
        assert_eq!(*hits[0], Impact::BulletHitInvader { bullet: 0, invader: 0 });
    }

    #[test]
    fn test_two_bullets_cannot_claim_same_invader() {
        let mut fixture = Fixture::new();
        let target = fixture.invaders[0].rect;
        for _ in 0..2 {
            fixture.bullets.push(bullet_at(
                Rect::new(target.center_x(), target.center_y(), 4.0, 14.0),
                BulletOwner::Player,
            ));
        }

        let outcome = resolve(&fixture.context(false));

        let claimed: Vec<_> = outcome
            .impacts
            .iter()
            .filter_map(|impact| match impact {
                Impact::BulletHitInvader { invader, .. } => Some(*invader),
                _ => None,
            })
            .collect();
        // Both bullets overlap invader 0, but only the first claims it;
        // the second finds no other target there.
        assert_eq!(claimed, vec![0]);
    }

    #[test]
    fn test_player_bullet_downs_the_bonus() {
        use crate::game::bonus::BonusKind;

        let mut fixture = Fixture::new();
        fixture.bonus = Some(BonusShip {
            rect: Rect::new(300.0, 40.0, 40.0, 40.0),
            velocity_x: 100.0,
            kind: BonusKind::Ring,
            points: 150,
        });
        fixture.bullets.push(bullet_at(
            Rect::new(318.0, 53.0, 4.0, 14.0),
            BulletOwner::Player,
        ));
        // An enemy bullet in the same spot never collects the prize
        fixture.bullets.push(bullet_at(
            Rect::new(318.0, 53.0, 4.0, 14.0),
            BulletOwner::Enemy,
        ));

        let outcome = resolve(&fixture.context(false));

        let hits: Vec<_> = outcome
            .impacts
            .iter()
            .filter(|impact| matches!(impact, Impact::BulletHitBonus { .. }))
            .collect();
        assert_eq!(hits.len(), 1);
        assert_eq!(*hits[0], Impact::BulletHitBonus { bullet: 0 });
    }

    #[test]
    fn test_bullet_spent_on_invader_cannot_also_down_bonus() {
        use crate::game::bonus::BonusKind;

        let mut fixture = Fixture::new();
        let target = fixture.invaders[0].rect;
        // Bonus parked directly on top of invader 0
        fixture.bonus = Some(BonusShip {
            rect: Rect::new(target.x, target.y, 40.0, 40.0),
            velocity_x: 100.0,
            kind: BonusKind::Letter,
            points: 100,
        });
        fixture.bullets.push(bullet_at(
            Rect::new(target.center_x(), target.center_y(), 4.0, 14.0),
            BulletOwner::Player,
        ));

        let outcome = resolve(&fixture.context(false));

        assert!(outcome
            .impacts
            .iter()
            .any(|impact| matches!(impact, Impact::BulletHitInvader { .. })));
        assert!(!outcome
            .impacts
            .iter()
            .any(|impact| matches!(impact, Impact::BulletHitBonus { .. })));
    }

    #[test]
    fn test_enemy_bullet_skips_invulnerable_player() {
        let mut fixture = Fixture::new();
        let player = fixture.player.rect;
        fixture.bullets.push(bullet_at(
            Rect::new(player.center_x(), player.center_y(), 4.0, 14.0),
            BulletOwner::Enemy,
        ));

        let vulnerable = resolve(&fixture.context(false));
        assert!(vulnerable
            .impacts
            .iter()
            .any(|impact| matches!(impact, Impact::BulletHitPlayer { .. })));

        let invulnerable = resolve(&fixture.context(true));
        assert!(!invulnerable
            .impacts
            .iter()
            .any(|impact| matches!(impact, Impact::BulletHitPlayer { .. })));
    }

    #[test]
    fn test_bullet_hits_shield_block() {
        let mut fixture = Fixture::new();
        let shield_rect = fixture.shields[0].rect();
        fixture.bullets.push(bullet_at(
            Rect::new(shield_rect.center_x() - 2.0, shield_rect.center_y() - 7.0, 4.0, 14.0),
            BulletOwner::Enemy,
        ));

        let outcome = resolve(&fixture.context(false));
        assert!(outcome
            .impacts
            .iter()
            .any(|impact| matches!(impact, Impact::BulletHitShield { shield: 0, .. })));
    }

    #[test]
    fn test_bullet_passes_through_carved_notch() {
        let mut fixture = Fixture::new();

        // The template's top corners are empty cells: a thin bullet
        // overlapping only that region connects with nothing.
        let shield = &fixture.shields[0];
        fixture.bullets.push(bullet_at(
            Rect::new(shield.x + 0.5, shield.y + 0.5, 1.0, 1.0),
            BulletOwner::Enemy,
        ));
        // Radius 0 probes only the corner cell itself
        let mut ctx = fixture.context(false);
        ctx.shield_impact_radius = 0;

        let outcome = resolve(&ctx);
        assert!(!outcome
            .impacts
            .iter()
            .any(|impact| matches!(impact, Impact::BulletHitShield { .. })));
    }

    #[test]
    fn test_invasion_breach_reported_once() {
        let mut fixture = Fixture::new();
        for invader in &mut fixture.invaders {
            invader.rect.y += 600.0;
        }

        let outcome = resolve(&fixture.context(false));
        let breaches = outcome
            .impacts
            .iter()
            .filter(|impact| matches!(impact, Impact::InvasionLineBreached { .. }))
            .count();
        assert_eq!(breaches, 1);
    }

    #[test]
    fn test_parry_consumes_both_bullets() {
        let mut fixture = Fixture::new();
        // Place the duel away from invaders and shields
        fixture.bullets.push(bullet_at(Rect::new(50.0, 450.0, 4.0, 14.0), BulletOwner::Player));
        fixture.bullets.push(bullet_at(Rect::new(51.0, 455.0, 4.0, 14.0), BulletOwner::Enemy));

        let outcome = resolve(&fixture.context(false));
        assert_eq!(
            outcome.impacts,
            vec![Impact::BulletsParried { player_bullet: 0, enemy_bullet: 1 }]
        );
    }

    #[test]
    fn test_resolution_is_idempotent() {
        let mut fixture = Fixture::new();
        let target = fixture.invaders[5].rect;
        fixture.bullets.push(bullet_at(
            Rect::new(target.center_x(), target.center_y(), 4.0, 14.0),
            BulletOwner::Player,
        ));
        let player = fixture.player.rect;
        fixture.bullets.push(bullet_at(
            Rect::new(player.center_x(), player.center_y(), 4.0, 14.0),
            BulletOwner::Enemy,
        ));

        let first = resolve(&fixture.context(false));
        let second = resolve(&fixture.context(false));
        assert_eq!(first, second);
    }

    #[test]
    fn test_malformed_entities_skipped_not_fatal() {
        let mut fixture = Fixture::new();
        fixture.bullets.push(bullet_at(
            Rect::new(f32::NAN, 100.0, 4.0, 14.0),
            BulletOwner::Player,
        ));

        let outcome = resolve(&fixture.context(false));
        assert_eq!(outcome.skipped_malformed, 1);
        assert!(outcome.impacts.is_empty());
    }
}
