//! Core deterministic primitives.
//!
//! Geometry and randomness shared by every game system. Everything here is
//! free of simulation state and safe to use from tests in isolation.

pub mod geom;
pub mod rng;

// Re-export core types
pub use geom::{Rect, Vec2};
pub use rng::GameRng;
