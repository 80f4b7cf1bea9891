//! Game State
//!
//! The phase machine, the lives manager, and the world aggregate that owns
//! every entity collection. All mutation of shared collections happens
//! synchronously inside the tick; there is no hidden module-level state,
//! so multiple worlds can coexist (and tests stay isolated).

use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::info;

use crate::core::rng::GameRng;
use crate::game::bonus::BonusControl;
use crate::game::config::GameConfig;
use crate::game::entities::{Bullet, BulletOwner, PlayerShip};
use crate::game::events::{GameEvent, GameEventData, GameOverReason};
use crate::game::fire::FireControl;
use crate::game::formation::Formation;
use crate::game::particles::ParticleSystem;
use crate::game::shield::{layout_shields, Shield};

/// Top-level game phase.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Phase {
    /// Title screen, waiting for the start action
    Start,
    /// Simulation running
    Playing,
    /// Simulation frozen; rendering may continue
    Paused,
    /// Wave cleared, celebratory delay before the next wave
    LevelClear,
    /// Terminal screen until restart
    GameOver,
}

impl Phase {
    /// Whether the edge `self -> to` is legal.
    ///
    /// Only the listed edges exist; anything else is a caller bug and is
    /// rejected loudly rather than coerced.
    pub fn can_transition(self, to: Phase) -> bool {
        use Phase::*;
        matches!(
            (self, to),
            (Start, Playing)
                | (Playing, Paused)
                | (Paused, Playing)
                | (Playing, LevelClear)
                | (LevelClear, Playing)
                | (Playing, GameOver)
                | (GameOver, Start)
        )
    }
}

/// Attempted an edge the phase machine does not have.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Error)]
#[error("illegal phase transition: {from:?} -> {to:?}")]
pub struct PhaseError {
    /// Phase the machine was in
    pub from: Phase,
    /// Phase the caller asked for
    pub to: Phase,
}

/// The phase machine. Owned by the session; the world never changes phase
/// itself.
#[derive(Clone, Copy, Debug)]
pub struct PhaseMachine {
    current: Phase,
}

impl Default for PhaseMachine {
    fn default() -> Self {
        Self::new()
    }
}

impl PhaseMachine {
    /// Start at the title screen.
    pub fn new() -> Self {
        Self { current: Phase::Start }
    }

    /// Current phase.
    pub fn current(&self) -> Phase {
        self.current
    }

    /// Take a legal edge, or fail loudly.
    pub fn transition(&mut self, to: Phase) -> Result<(), PhaseError> {
        if !self.current.can_transition(to) {
            return Err(PhaseError { from: self.current, to });
        }
        info!(from = ?self.current, to = ?to, "phase transition");
        self.current = to;
        Ok(())
    }
}

/// Outcome of registering a hit on the player.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct HitOutcome {
    /// A life was actually deducted
    pub lost_life: bool,
    /// Lives reached zero
    pub game_over: bool,
    /// The hit was absorbed (invulnerable or already dead)
    pub ignored: bool,
}

/// Lives and the post-hit invulnerability window.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct Lives {
    lives: u32,
    invulnerability_remaining: f32,
    starting_lives: u32,
    invulnerability_seconds: f32,
}

impl Lives {
    /// Fresh lives pool from config.
    pub fn new(starting_lives: u32, invulnerability_seconds: f32) -> Self {
        Self {
            lives: starting_lives,
            invulnerability_remaining: 0.0,
            starting_lives,
            invulnerability_seconds,
        }
    }

    /// Restore the starting pool (full game restart only).
    pub fn reset(&mut self) {
        self.lives = self.starting_lives;
        self.invulnerability_remaining = 0.0;
    }

    /// Cool the invulnerability timer.
    pub fn advance(&mut self, dt_seconds: f32) {
        self.invulnerability_remaining = (self.invulnerability_remaining - dt_seconds).max(0.0);
    }

    /// Whether hits are currently absorbed.
    pub fn is_invulnerable(&self) -> bool {
        self.invulnerability_remaining > 0.0
    }

    /// Remaining lives.
    pub fn lives(&self) -> u32 {
        self.lives
    }

    /// Register an unblocked hit.
    ///
    /// Invulnerable hits are ignored. A deducted life opens the grace
    /// window only when lives remain; at zero the game is over anyway.
    pub fn register_hit(&mut self) -> HitOutcome {
        if self.lives == 0 {
            return HitOutcome { lost_life: false, game_over: true, ignored: true };
        }
        if self.is_invulnerable() {
            return HitOutcome { lost_life: false, game_over: false, ignored: true };
        }

        self.lives -= 1;
        if self.lives > 0 {
            self.invulnerability_remaining = self.invulnerability_seconds;
        }

        HitOutcome {
            lost_life: true,
            game_over: self.lives == 0,
            ignored: false,
        }
    }
}

/// Everything that exists while a game runs.
///
/// The world has no phase awareness: it is advanced by `tick` only while
/// the session is in `Playing`, and the session decides what wave-clear
/// and game-over mean for the phase machine.
#[derive(Clone, Debug)]
pub struct World {
    /// Ticks simulated since the last full reset
    pub tick_count: u64,
    /// Current 1-based wave number
    pub wave: u32,
    /// Monotonic score; never decreases within a game
    pub score: u32,
    /// The player ship
    pub player: PlayerShip,
    /// Lives and invulnerability
    pub lives: Lives,
    /// The invader formation
    pub formation: Formation,
    /// Enemy fire scheduler
    pub fire_control: FireControl,
    /// Bonus courier scheduler and flight state
    pub bonus: BonusControl,
    /// Destructible shields
    pub shields: Vec<Shield>,
    /// All bullets, both owners
    pub bullets: Vec<Bullet>,
    /// Cosmetic particles
    pub particles: ParticleSystem,
    /// The single source of gameplay randomness
    pub rng: GameRng,
    /// Terminal condition reached this game, if any
    pub game_over: Option<GameOverReason>,
    /// Running count of entities skipped for malformed geometry
    pub malformed_skipped: u64,
    pending_events: Vec<GameEvent>,
}

impl World {
    /// Build a wave-1 world from the given seed.
    pub fn new(config: &GameConfig, seed: u64) -> Self {
        let mut rng = GameRng::new(seed);
        let formation = Formation::spawn(&config.formation);
        let fire_control = FireControl::new(&config.fire, &mut rng, 1);
        let bonus = BonusControl::new(&config.bonus, &mut rng);

        Self {
            tick_count: 0,
            wave: 1,
            score: 0,
            player: PlayerShip::new(&config.player, &config.world),
            lives: Lives::new(config.player.starting_lives, config.player.invulnerability_seconds),
            formation,
            fire_control,
            bonus,
            shields: layout_shields(&config.shields, &config.world),
            bullets: Vec::new(),
            particles: ParticleSystem::new(&config.particles),
            rng,
            game_over: None,
            malformed_skipped: 0,
            pending_events: Vec::new(),
        }
    }

    /// Full game restart: score, lives, and wave all reset. The RNG keeps
    /// rolling so restarted games differ.
    pub fn reset(&mut self, config: &GameConfig) {
        self.score = 0;
        self.lives.reset();
        self.game_over = None;
        self.tick_count = 0;
        self.particles.clear();
        self.pending_events.clear();
        self.start_wave(config, 1);
    }

    /// Begin the given wave: rebuild the formation and shields, clear
    /// bullets and particles, re-arm the fire scheduler, and reposition
    /// the player. Score and lives are untouched.
    pub fn start_wave(&mut self, config: &GameConfig, wave: u32) {
        info!(wave, "starting wave");
        self.wave = wave;
        self.bullets.clear();
        self.particles.clear();
        self.formation.reset(&config.formation);
        for shield in &mut self.shields {
            shield.rebuild();
        }
        self.fire_control.reset(&config.fire, &mut self.rng, wave);
        self.bonus.reset(&config.bonus, &mut self.rng);
        self.player.reset_position(&config.player, &config.world);
    }

    /// Count of active bullets with the given owner.
    pub fn count_bullets(&self, owner: BulletOwner) -> usize {
        self.bullets
            .iter()
            .filter(|bullet| bullet.active && bullet.owner == owner)
            .count()
    }

    /// Attempt a player shot: respects the fire cooldown and the
    /// concurrent-bullet cap. Emits `PlayerFired` on success.
    pub fn try_player_fire(&mut self, config: &GameConfig) -> bool {
        if !self.player.can_fire() {
            return false;
        }
        if self.count_bullets(BulletOwner::Player) >= config.player.max_bullets {
            return false;
        }

        let x = self.player.rect.center_x();
        let y = self.player.rect.top();
        self.bullets.push(Bullet::player(x, y, &config.bullets));
        self.player.fire_cooldown_remaining = config.player.fire_cooldown_seconds;
        self.push_event(GameEventData::PlayerFired { x, y });
        true
    }

    /// Spawn an enemy bullet at a fire-controller-chosen muzzle and emit
    /// `EnemyFired`.
    pub fn spawn_enemy_bullet(&mut self, x: f32, y: f32, row: usize, column: usize, config: &GameConfig) {
        self.bullets.push(Bullet::enemy(x, y, &config.bullets));
        self.push_event(GameEventData::EnemyFired { row, column });
    }

    /// Award points. Score is monotonic by construction.
    pub fn add_score(&mut self, points: u32) -> u32 {
        self.score = self.score.saturating_add(points);
        self.score
    }

    /// Queue an event for this tick.
    pub fn push_event(&mut self, data: GameEventData) {
        self.pending_events.push(GameEvent::new(self.tick_count, data));
    }

    /// Drain the events queued this tick.
    pub fn take_events(&mut self) -> Vec<GameEvent> {
        std::mem::take(&mut self.pending_events)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_only_listed_edges_are_legal() {
        use Phase::*;
        let legal = [
            (Start, Playing),
            (Playing, Paused),
            (Paused, Playing),
            (Playing, LevelClear),
            (LevelClear, Playing),
            (Playing, GameOver),
            (GameOver, Start),
        ];
        let all = [Start, Playing, Paused, LevelClear, GameOver];

        for from in all {
            for to in all {
                let expected = legal.contains(&(from, to));
                assert_eq!(from.can_transition(to), expected, "{from:?} -> {to:?}");
            }
        }
    }

    #[test]
    fn test_illegal_transition_fails_loudly() {
        let mut machine = PhaseMachine::new();
        assert_eq!(machine.current(), Phase::Start);

        let err = machine.transition(Phase::LevelClear).unwrap_err();
        assert_eq!(err, PhaseError { from: Phase::Start, to: Phase::LevelClear });
        // Machine did not move
        assert_eq!(machine.current(), Phase::Start);

        machine.transition(Phase::Playing).unwrap();
        machine.transition(Phase::Paused).unwrap();
        assert!(machine.transition(Phase::GameOver).is_err());
    }

    #[test]
    fn test_lives_hit_sequence() {
        let mut lives = Lives::new(3, 1.2);

        let outcome = lives.register_hit();
        assert!(outcome.lost_life && !outcome.game_over);
        assert_eq!(lives.lives(), 2);
        assert!(lives.is_invulnerable());

        // Invulnerable: absorbed, no life lost
        let outcome = lives.register_hit();
        assert!(outcome.ignored);
        assert_eq!(lives.lives(), 2);

        lives.advance(1.2);
        assert!(!lives.is_invulnerable());

        lives.register_hit();
        let outcome = lives.register_hit();
        assert!(outcome.ignored, "second hit lands in the grace window");

        lives.advance(5.0);
        let outcome = lives.register_hit();
        assert!(outcome.lost_life && outcome.game_over);
        assert_eq!(lives.lives(), 0);
        // Last life does not open a grace window
        assert!(!lives.is_invulnerable());
    }

    #[test]
    fn test_world_reset_restores_everything() {
        let config = GameConfig::default();
        let mut world = World::new(&config, 11);

        world.score = 990;
        world.wave = 4;
        world.lives.register_hit();
        world.formation.invaders[0].alive = false;
        world.game_over = Some(GameOverReason::Invasion);

        world.reset(&config);

        assert_eq!(world.score, 0);
        assert_eq!(world.wave, 1);
        assert_eq!(world.lives.lives(), config.player.starting_lives);
        assert_eq!(world.formation.alive_count(), 50);
        assert!(world.game_over.is_none());
    }

    #[test]
    fn test_start_wave_preserves_score_and_lives() {
        let config = GameConfig::default();
        let mut world = World::new(&config, 11);

        world.score = 500;
        world.lives.register_hit();
        world.bullets.push(Bullet::player(100.0, 100.0, &config.bullets));

        world.start_wave(&config, 2);

        assert_eq!(world.wave, 2);
        assert_eq!(world.score, 500);
        assert_eq!(world.lives.lives(), 2);
        assert!(world.bullets.is_empty());
        assert_eq!(world.formation.alive_count(), 50);
    }

    #[test]
    fn test_player_fire_respects_cap() {
        let config = GameConfig::default();
        let mut world = World::new(&config, 11);

        assert!(world.try_player_fire(&config));
        assert_eq!(world.count_bullets(BulletOwner::Player), 1);

        // Cooldown elapsed but the cap (1) is full
        world.player.fire_cooldown_remaining = 0.0;
        assert!(!world.try_player_fire(&config));

        // Bullet cleared: firing succeeds again
        world.bullets[0].active = false;
        assert!(world.try_player_fire(&config));
    }

    #[test]
    fn test_score_is_monotonic() {
        let config = GameConfig::default();
        let mut world = World::new(&config, 11);

        world.add_score(30);
        world.add_score(0);
        world.add_score(u32::MAX);

        assert_eq!(world.score, u32::MAX);
    }
}
