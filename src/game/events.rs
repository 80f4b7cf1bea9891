//! Game Events
//!
//! Observable consequences of a tick, reported to the caller for audio,
//! UI, and replay logging. Events never mutate game state; they describe
//! what already happened.

use serde::{Deserialize, Serialize};

use crate::game::bonus::BonusKind;

/// Why the game ended.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum GameOverReason {
    /// The player ran out of lives
    LivesExhausted,
    /// The formation reached the invasion line
    Invasion,
}

/// Ordering bucket for events that land on the same tick.
///
/// Lower value = reported first.
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
#[repr(u8)]
pub enum EventPriority {
    /// Terminal transitions come first
    GameOver = 0,
    /// Then player damage
    PlayerHit = 1,
    /// Then invader kills
    InvaderDestroyed = 2,
    /// Then shield chipping
    ShieldDamage = 3,
    /// Then bullet-on-bullet parries
    Parry = 4,
    /// Then shots fired
    Fire = 5,
    /// Then wave bookkeeping
    Wave = 6,
    /// Lowest priority
    Other = 255,
}

/// Event payload.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub enum GameEventData {
    /// The player fired a bullet
    PlayerFired {
        /// Muzzle X
        x: f32,
        /// Muzzle Y
        y: f32,
    },

    /// An invader fired a bullet
    EnemyFired {
        /// Shooter's formation row
        row: usize,
        /// Shooter's formation column
        column: usize,
    },

    /// A player bullet destroyed an invader
    InvaderDestroyed {
        /// Formation row of the destroyed invader
        row: usize,
        /// Formation column of the destroyed invader
        column: usize,
        /// Points awarded
        points: u32,
        /// Score after the award
        score: u32,
    },

    /// A player bullet shot down the bonus courier
    BonusDestroyed {
        /// Variant that was flying
        kind: BonusKind,
        /// Prize awarded
        points: u32,
        /// Score after the award
        score: u32,
    },

    /// A bullet chipped a shield
    ShieldDamaged {
        /// Index of the shield that was hit
        shield: usize,
        /// Blocks removed by this impact
        blocks_destroyed: u32,
        /// True if the whole shield is now gone
        shield_destroyed: bool,
    },

    /// A player bullet and an enemy bullet destroyed each other
    BulletsParried {
        /// Impact X
        x: f32,
        /// Impact Y
        y: f32,
    },

    /// The player lost a life
    PlayerHit {
        /// Lives remaining after the hit
        lives_remaining: u32,
    },

    /// Every invader in the wave was destroyed
    WaveCleared {
        /// The wave that was cleared
        wave: u32,
    },

    /// The game ended
    GameOver {
        /// Terminal condition that fired
        reason: GameOverReason,
    },

    /// The score passed the stored high score
    HighScore {
        /// The new record
        score: u32,
    },
}

/// A game event with its tick and reporting priority.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct GameEvent {
    /// Tick on which the event occurred
    pub tick: u64,
    /// Reporting priority within the tick
    pub priority: EventPriority,
    /// Payload
    pub data: GameEventData,
}

impl GameEvent {
    /// Create an event, deriving the priority from the payload.
    pub fn new(tick: u64, data: GameEventData) -> Self {
        let priority = match &data {
            GameEventData::GameOver { .. } => EventPriority::GameOver,
            GameEventData::PlayerHit { .. } => EventPriority::PlayerHit,
            GameEventData::InvaderDestroyed { .. } | GameEventData::BonusDestroyed { .. } => {
                EventPriority::InvaderDestroyed
            }
            GameEventData::ShieldDamaged { .. } => EventPriority::ShieldDamage,
            GameEventData::BulletsParried { .. } => EventPriority::Parry,
            GameEventData::PlayerFired { .. } | GameEventData::EnemyFired { .. } => {
                EventPriority::Fire
            }
            GameEventData::WaveCleared { .. } => EventPriority::Wave,
            GameEventData::HighScore { .. } => EventPriority::Other,
        };

        Self {
            tick,
            priority,
            data,
        }
    }

    /// Sort key: tick first, then priority. Used with a stable sort so
    /// same-priority events keep their resolution order.
    pub fn sort_key(&self) -> (u64, EventPriority) {
        (self.tick, self.priority)
    }
}

/// Sort a batch of events into reporting order.
pub fn sort_events(events: &mut [GameEvent]) {
    events.sort_by_key(GameEvent::sort_key);
}
