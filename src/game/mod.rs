//! Game Simulation
//!
//! The whole playable simulation: configuration, entities, the invader
//! formation, enemy fire scheduling, destructible shields, particles,
//! collision resolution, world state, and the tick orchestrator.

pub mod bonus;
pub mod collision;
pub mod config;
pub mod entities;
pub mod events;
pub mod fire;
pub mod formation;
pub mod input;
pub mod particles;
pub mod shield;
pub mod state;
pub mod tick;

pub use config::GameConfig;
pub use events::{GameEvent, GameEventData, GameOverReason};
pub use input::{Action, InputFrame};
pub use state::{Phase, World};
pub use tick::{tick, TickResult};
