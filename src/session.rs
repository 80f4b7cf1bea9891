//! Game Session
//!
//! The layer between a host (renderer, input source, audio backend) and
//! the simulation. The session owns the phase machine, routes input by
//! phase, runs the level-clear delay, tracks the high score, and exposes
//! a serializable snapshot for rendering. Hosts plug in behind the
//! `AudioSink` and `HighScoreStore` traits; the simulation itself never
//! touches the filesystem or an audio device.

use std::fs;
use std::path::PathBuf;

use serde::{Deserialize, Serialize};
use tracing::{error, info, warn};

use crate::core::geom::Rect;
use crate::game::bonus::BonusKind;
use crate::game::config::GameConfig;
use crate::game::entities::BulletOwner;
use crate::game::events::{GameEvent, GameEventData};
use crate::game::input::{Action, InputFrame};
use crate::game::state::{Phase, PhaseMachine, World};
use crate::game::tick;

/// Receiver for gameplay sounds. The session reports every event; the
/// sink decides what is audible.
pub trait AudioSink {
    /// An event occurred this frame.
    fn play(&mut self, event: &GameEvent);
}

/// An `AudioSink` that discards everything. Used headless and in tests.
#[derive(Clone, Copy, Debug, Default)]
pub struct NullAudio;

impl AudioSink for NullAudio {
    fn play(&mut self, _event: &GameEvent) {}
}

/// Persistent high-score storage.
///
/// Failures are a host concern: `load` answers `None` and `store`
/// answers `false` when the backend is unavailable, and the game keeps
/// running either way.
pub trait HighScoreStore {
    /// The stored record, if any.
    fn load(&mut self) -> Option<u32>;
    /// Persist a new record. Returns whether the write succeeded.
    fn store(&mut self, score: u32) -> bool;
}

/// High scores kept only for the lifetime of the process.
#[derive(Clone, Copy, Debug, Default)]
pub struct InMemoryHighScoreStore {
    score: Option<u32>,
}

impl HighScoreStore for InMemoryHighScoreStore {
    fn load(&mut self) -> Option<u32> {
        self.score
    }

    fn store(&mut self, score: u32) -> bool {
        self.score = Some(score);
        true
    }
}

#[derive(Serialize, Deserialize)]
struct HighScoreFile {
    high_score: u32,
}

/// High scores persisted as a small JSON file.
///
/// Read and write failures are logged and swallowed; a broken disk must
/// never take the game down.
#[derive(Clone, Debug)]
pub struct JsonHighScoreStore {
    path: PathBuf,
}

impl JsonHighScoreStore {
    /// Store backed by the given file path.
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }
}

impl HighScoreStore for JsonHighScoreStore {
    fn load(&mut self) -> Option<u32> {
        let raw = fs::read_to_string(&self.path).ok()?;
        match serde_json::from_str::<HighScoreFile>(&raw) {
            Ok(file) => Some(file.high_score),
            Err(err) => {
                warn!(path = %self.path.display(), %err, "ignoring unreadable high-score file");
                None
            }
        }
    }

    fn store(&mut self, score: u32) -> bool {
        let file = HighScoreFile { high_score: score };
        let json = match serde_json::to_string(&file) {
            Ok(json) => json,
            Err(err) => {
                warn!(%err, "failed to serialize high score");
                return false;
            }
        };
        match fs::write(&self.path, json) {
            Ok(()) => true,
            Err(err) => {
                warn!(path = %self.path.display(), %err, "failed to persist high score");
                false
            }
        }
    }
}

/// One shield, as the renderer sees it.
#[derive(Clone, Debug, Serialize)]
pub struct ShieldView {
    /// Anchor (top-left) of the shield
    pub x: f32,
    /// Anchor (top-left) of the shield
    pub y: f32,
    /// Intact blocks remaining
    pub remaining_blocks: usize,
}

/// One bullet, as the renderer sees it.
#[derive(Clone, Debug, Serialize)]
pub struct BulletView {
    /// Bullet rectangle
    pub rect: Rect,
    /// Whose bullet it is
    pub owner: BulletOwner,
}

/// The bonus courier, as the renderer sees it.
#[derive(Clone, Debug, Serialize)]
pub struct BonusView {
    /// Courier rectangle
    pub rect: Rect,
    /// Which Valentine variant is flying
    pub kind: BonusKind,
}

/// One particle, as the renderer sees it.
#[derive(Clone, Debug, Serialize)]
pub struct ParticleView {
    /// Center X
    pub x: f32,
    /// Center Y
    pub y: f32,
    /// Particle size
    pub size: f32,
    /// 1.0 freshly spawned, fading to 0.0 at expiry
    pub life_fraction: f32,
}

/// Everything a renderer needs for one frame, with no references into
/// the live world.
#[derive(Clone, Debug, Serialize)]
pub struct RenderSnapshot {
    /// Current phase
    pub phase: Phase,
    /// Current score
    pub score: u32,
    /// Best score seen, this game included
    pub high_score: u32,
    /// Lives remaining
    pub lives: u32,
    /// Whether the player is in the post-hit grace window
    pub player_invulnerable: bool,
    /// Current wave
    pub wave: u32,
    /// Player rectangle
    pub player: Rect,
    /// Rectangles of live invaders only
    pub invaders: Vec<Rect>,
    /// Active bullets
    pub bullets: Vec<BulletView>,
    /// Shields, destroyed ones included (remaining_blocks == 0)
    pub shields: Vec<ShieldView>,
    /// The bonus courier, while one is in flight
    pub bonus: Option<BonusView>,
    /// Live particles
    pub particles: Vec<ParticleView>,
    /// Audio muted
    pub muted: bool,
}

/// A running game: world, phase machine, and host hooks.
pub struct GameSession {
    config: GameConfig,
    world: World,
    phase: PhaseMachine,
    audio: Box<dyn AudioSink>,
    store: Box<dyn HighScoreStore>,
    high_score: u32,
    high_score_beaten: bool,
    level_clear_remaining: f32,
    muted: bool,
    stopped: bool,
}

impl GameSession {
    /// Build a session at the title screen.
    pub fn new(
        config: GameConfig,
        seed: u64,
        audio: Box<dyn AudioSink>,
        mut store: Box<dyn HighScoreStore>,
    ) -> Self {
        let high_score = store.load().unwrap_or(0);
        let world = World::new(&config, seed);

        Self {
            config,
            world,
            phase: PhaseMachine::new(),
            audio,
            store,
            high_score,
            high_score_beaten: false,
            level_clear_remaining: 0.0,
            muted: false,
            stopped: false,
        }
    }

    /// Current phase.
    pub fn phase(&self) -> Phase {
        self.phase.current()
    }

    /// Best score seen, this game included.
    pub fn high_score(&self) -> u32 {
        self.high_score.max(self.world.score)
    }

    /// Read access to the world, mainly for tests and debug overlays.
    pub fn world(&self) -> &World {
        &self.world
    }

    /// Advance the session by one frame.
    ///
    /// Input is routed by phase: the title and game-over screens only
    /// listen for the start action, pause freezes the world but still
    /// listens for unpause, and the level-clear delay ignores input
    /// entirely. Returns the frame's events, already reported to audio.
    pub fn update(&mut self, input: &InputFrame, dt_seconds: f32) -> Vec<GameEvent> {
        if self.stopped {
            return Vec::new();
        }
        if input.was_pressed(Action::Mute) {
            self.muted = !self.muted;
            info!(muted = self.muted, "mute toggled");
        }

        let events = match self.phase.current() {
            Phase::Start => {
                if input.was_pressed(Action::Start) {
                    self.begin_game();
                }
                Vec::new()
            }
            Phase::Playing => {
                if input.was_pressed(Action::Pause) {
                    self.set_phase(Phase::Paused);
                    Vec::new()
                } else {
                    self.run_tick(input, dt_seconds)
                }
            }
            Phase::Paused => {
                if input.was_pressed(Action::Pause) {
                    self.set_phase(Phase::Playing);
                }
                Vec::new()
            }
            Phase::LevelClear => {
                self.level_clear_remaining -= dt_seconds;
                if self.level_clear_remaining <= 0.0 {
                    let next = self.world.wave + 1;
                    self.world.start_wave(&self.config, next);
                    self.set_phase(Phase::Playing);
                }
                Vec::new()
            }
            Phase::GameOver => {
                if input.was_pressed(Action::Start) {
                    self.set_phase(Phase::Start);
                }
                Vec::new()
            }
        };

        if !self.muted {
            for event in &events {
                self.audio.play(event);
            }
        }
        events
    }

    /// Stop the session for good. Safe to call more than once.
    pub fn stop(&mut self) {
        if self.stopped {
            return;
        }
        self.stopped = true;
        self.persist_high_score();
        info!(score = self.world.score, "session stopped");
    }

    /// Snapshot the world for rendering.
    pub fn snapshot(&self) -> RenderSnapshot {
        RenderSnapshot {
            phase: self.phase.current(),
            score: self.world.score,
            high_score: self.high_score(),
            lives: self.world.lives.lives(),
            player_invulnerable: self.world.lives.is_invulnerable(),
            wave: self.world.wave,
            player: self.world.player.rect,
            invaders: self
                .world
                .formation
                .alive()
                .map(|invader| invader.rect)
                .collect(),
            bullets: self
                .world
                .bullets
                .iter()
                .filter(|bullet| bullet.active)
                .map(|bullet| BulletView { rect: bullet.rect, owner: bullet.owner })
                .collect(),
            shields: self
                .world
                .shields
                .iter()
                .map(|shield| ShieldView {
                    x: shield.x,
                    y: shield.y,
                    remaining_blocks: shield.remaining_blocks(),
                })
                .collect(),
            bonus: self
                .world
                .bonus
                .active()
                .map(|bonus| BonusView { rect: bonus.rect, kind: bonus.kind }),
            particles: self
                .world
                .particles
                .iter()
                .map(|particle| ParticleView {
                    x: particle.position.x,
                    y: particle.position.y,
                    size: particle.size,
                    life_fraction: particle.life_fraction(),
                })
                .collect(),
            muted: self.muted,
        }
    }

    fn begin_game(&mut self) {
        self.world.reset(&self.config);
        self.high_score_beaten = false;
        self.set_phase(Phase::Playing);
    }

    fn run_tick(&mut self, input: &InputFrame, dt_seconds: f32) -> Vec<GameEvent> {
        let result = tick::tick(&mut self.world, input, &self.config, dt_seconds);
        let mut events = result.events;

        if !self.high_score_beaten && self.high_score > 0 && self.world.score > self.high_score {
            self.high_score_beaten = true;
            events.push(GameEvent::new(
                self.world.tick_count,
                GameEventData::HighScore { score: self.world.score },
            ));
        }

        if result.game_over.is_some() {
            self.persist_high_score();
            self.set_phase(Phase::GameOver);
        } else if result.wave_cleared {
            self.level_clear_remaining = self.config.world.level_clear_seconds;
            self.set_phase(Phase::LevelClear);
        }

        events
    }

    fn persist_high_score(&mut self) {
        if self.world.score > self.high_score {
            self.high_score = self.world.score;
            if !self.store.store(self.high_score) {
                warn!(score = self.high_score, "high score not persisted");
            }
        }
    }

    // Every call site takes a legal edge; an illegal one is a bug worth
    // a loud log, not a crash mid-frame.
    fn set_phase(&mut self, to: Phase) {
        if let Err(err) = self.phase.transition(to) {
            error!(%err, "refused phase transition");
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::game::events::GameOverReason;

    fn session() -> GameSession {
        GameSession::new(
            GameConfig::default(),
            42,
            Box::new(NullAudio),
            Box::new(InMemoryHighScoreStore::default()),
        )
    }

    fn start_press() -> InputFrame {
        InputFrame::with_pressed(&[Action::Start])
    }

    #[test]
    fn test_start_press_begins_the_game() {
        let mut session = session();
        assert_eq!(session.phase(), Phase::Start);

        session.update(&InputFrame::new(), 1.0 / 60.0);
        assert_eq!(session.phase(), Phase::Start);

        session.update(&start_press(), 1.0 / 60.0);
        assert_eq!(session.phase(), Phase::Playing);
        assert_eq!(session.world().score, 0);
    }

    #[test]
    fn test_pause_freezes_the_world() {
        let mut session = session();
        session.update(&start_press(), 1.0 / 60.0);

        session.update(&InputFrame::with_pressed(&[Action::Pause]), 1.0 / 60.0);
        assert_eq!(session.phase(), Phase::Paused);

        let tick_count = session.world().tick_count;
        for _ in 0..30 {
            session.update(&InputFrame::new(), 1.0 / 60.0);
        }
        assert_eq!(session.world().tick_count, tick_count);

        session.update(&InputFrame::with_pressed(&[Action::Pause]), 1.0 / 60.0);
        assert_eq!(session.phase(), Phase::Playing);
    }

    #[test]
    fn test_level_clear_delay_then_next_wave() {
        let mut session = session();
        session.update(&start_press(), 1.0 / 60.0);

        for invader in &mut session.world.formation.invaders {
            invader.alive = false;
        }
        let events = session.update(&InputFrame::new(), 1.0 / 60.0);
        assert!(events
            .iter()
            .any(|e| matches!(e.data, GameEventData::WaveCleared { wave: 1 })));
        assert_eq!(session.phase(), Phase::LevelClear);

        // Delay runs in LevelClear without ticking the world.
        let mut elapsed = 0.0;
        while session.phase() == Phase::LevelClear {
            session.update(&InputFrame::new(), 0.5);
            elapsed += 0.5;
            assert!(elapsed < 10.0, "level clear delay never ended");
        }

        assert_eq!(session.phase(), Phase::Playing);
        assert_eq!(session.world().wave, 2);
        assert_eq!(session.world().formation.alive_count(), 50);
    }

    #[test]
    fn test_game_over_persists_high_score() {
        let mut session = session();
        session.update(&start_press(), 1.0 / 60.0);

        session.world.score = 730;
        session.world.game_over = Some(GameOverReason::Invasion);
        // Invaders on the line so the tick confirms the terminal state.
        for invader in &mut session.world.formation.invaders {
            invader.rect.y += 600.0;
        }
        session.update(&InputFrame::new(), 1.0 / 60.0);

        assert_eq!(session.phase(), Phase::GameOver);
        assert_eq!(session.high_score(), 730);
        assert!(session.store.load().is_some());

        // Restart path: game over -> title -> playing, score reset.
        session.update(&start_press(), 1.0 / 60.0);
        assert_eq!(session.phase(), Phase::Start);
        session.update(&start_press(), 1.0 / 60.0);
        assert_eq!(session.phase(), Phase::Playing);
        assert_eq!(session.world().score, 0);
        assert_eq!(session.high_score(), 730);
    }

    #[test]
    fn test_stop_is_idempotent() {
        let mut session = session();
        session.update(&start_press(), 1.0 / 60.0);
        session.world.score = 100;

        session.stop();
        session.stop();

        assert!(session.update(&start_press(), 1.0 / 60.0).is_empty());
        assert_eq!(session.store.load(), Some(100));
    }

    #[test]
    fn test_snapshot_reflects_world() {
        let mut session = session();
        session.update(&start_press(), 1.0 / 60.0);
        session.update(&InputFrame::new(), 1.0 / 60.0);

        let snapshot = session.snapshot();
        assert_eq!(snapshot.phase, Phase::Playing);
        assert_eq!(snapshot.invaders.len(), 50);
        assert_eq!(snapshot.shields.len(), 4);
        assert_eq!(snapshot.lives, 3);

        // Snapshot must serialize cleanly for host transport.
        let json = serde_json::to_string(&snapshot).unwrap();
        assert!(json.contains("\"wave\":1"));
    }

    #[test]
    fn test_mute_toggle() {
        let mut session = session();
        assert!(!session.snapshot().muted);
        session.update(&InputFrame::with_pressed(&[Action::Mute]), 1.0 / 60.0);
        assert!(session.snapshot().muted);
        session.update(&InputFrame::with_pressed(&[Action::Mute]), 1.0 / 60.0);
        assert!(!session.snapshot().muted);
    }
}
