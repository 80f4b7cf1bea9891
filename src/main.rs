//! Headless demo: runs a scripted game at 60 Hz and logs what happens.
//!
//! Seed and duration come from the command line:
//!
//! ```text
//! love-invaders [seed] [seconds]
//! ```

use anyhow::{Context, Result};
use tracing::{info, Level};
use tracing_subscriber::FmtSubscriber;

use love_invaders::game::config::GameConfig;
use love_invaders::game::events::GameEventData;
use love_invaders::game::input::{Action, InputFrame};
use love_invaders::game::state::World;
use love_invaders::game::tick::run_scripted;

fn main() -> Result<()> {
    let subscriber = FmtSubscriber::builder()
        .with_max_level(Level::INFO)
        .finish();
    tracing::subscriber::set_global_default(subscriber)
        .context("failed to install tracing subscriber")?;

    let mut args = std::env::args().skip(1);
    let seed: u64 = match args.next() {
        Some(raw) => raw.parse().context("seed must be an unsigned integer")?,
        None => 0x14EA_57,
    };
    let seconds: u32 = match args.next() {
        Some(raw) => raw.parse().context("seconds must be an unsigned integer")?,
        None => 60,
    };

    info!(version = love_invaders::VERSION, seed, seconds, "love-invaders demo");

    let config = GameConfig::default();
    config.validate().context("default config failed validation")?;

    // A simple sweep-and-shoot script: hold fire, strafe side to side.
    let frames: Vec<InputFrame> = (0..seconds * 60)
        .map(|i| {
            let phase = (i / 90) % 2;
            if phase == 0 {
                InputFrame::with_held(&[Action::Shoot, Action::Right])
            } else {
                InputFrame::with_held(&[Action::Shoot, Action::Left])
            }
        })
        .collect();

    let mut world = World::new(&config, seed);
    let events = run_scripted(&mut world, &config, &frames);

    for event in &events {
        match &event.data {
            GameEventData::InvaderDestroyed { row, column, points, score } => {
                info!(tick = event.tick, row, column, points, score, "invader destroyed");
            }
            GameEventData::BonusDestroyed { kind, points, score } => {
                info!(tick = event.tick, ?kind, points, score, "bonus shot down");
            }
            GameEventData::PlayerHit { lives_remaining } => {
                info!(tick = event.tick, lives_remaining, "player hit");
            }
            GameEventData::BulletsParried { x, y } => {
                info!(tick = event.tick, x, y, "bullets parried");
            }
            GameEventData::WaveCleared { wave } => {
                info!(tick = event.tick, wave, "wave cleared");
            }
            GameEventData::GameOver { reason } => {
                info!(tick = event.tick, ?reason, "game over");
            }
            _ => {}
        }
    }

    info!(
        score = world.score,
        wave = world.wave,
        ticks = world.tick_count,
        lives = world.lives.lives(),
        "demo finished"
    );
    Ok(())
}
