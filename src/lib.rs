//! # Love Invaders
//!
//! A deterministic, headless simulation of a Valentine-flavored fixed
//! shooter: a marching invader formation, heart-shaped destructible
//! shields, countdown-scheduled enemy fire, and a bullet-parry twist.
//! The whole game advances through a single pure-ish `tick` over plain
//! data, so a seed plus an input script replays an identical game.
//!
//! ## Architecture
//!
//! ```text
//!   +-----------------------------------------------------------+
//!   |                       GameSession                         |
//!   |   phase machine, level-clear delay, high-score store,     |
//!   |   audio routing, render snapshots                         |
//!   +-----------------------------+-----------------------------+
//!                                 |
//!                          tick(world, input)
//!                                 |
//!   +-----------------------------v-----------------------------+
//!   |                          World                            |
//!   |  formation --- fire control --- shields --- bullets       |
//!   |       \             |              |           /          |
//!   |        +------ collision resolve (pure) ------+           |
//!   |                        |                                  |
//!   |                 impacts + events                          |
//!   +-----------------------------------------------------------+
//! ```
//!
//! Rendering, audio devices, and input capture live in the host; this
//! crate is the complete game behind those seams, testable without any
//! of them.

#![warn(missing_docs)]
#![deny(unsafe_code)]

pub mod core;
pub mod game;
pub mod session;

pub use game::config::GameConfig;
pub use game::events::{GameEvent, GameEventData, GameOverReason};
pub use game::input::{Action, ActionState, InputFrame};
pub use game::state::{Phase, World};
pub use game::tick::{tick, TickResult};
pub use session::{GameSession, HighScoreStore, RenderSnapshot};

/// Crate version, for hosts that display it.
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
