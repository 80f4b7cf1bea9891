//! Input Capture
//!
//! Per-tick input frames with separate held and edge-triggered bit sets,
//! plus the accumulator a real input backend feeds between ticks. The
//! simulation only ever sees an `InputFrame`; where the keystrokes came
//! from is the driver's business.

use serde::{Deserialize, Serialize};

/// A player action. Bit positions in `InputFrame`.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[repr(u8)]
pub enum Action {
    /// Move left
    Left = 0,
    /// Move right
    Right = 1,
    /// Fire
    Shoot = 2,
    /// Start / restart the game
    Start = 3,
    /// Toggle pause
    Pause = 4,
    /// Toggle audio mute
    Mute = 5,
    /// Toggle debug overlays
    Debug = 6,
}

impl Action {
    /// All actions, for iteration.
    pub const ALL: [Action; 7] = [
        Action::Left,
        Action::Right,
        Action::Shoot,
        Action::Start,
        Action::Pause,
        Action::Mute,
        Action::Debug,
    ];

    #[inline]
    fn bit(self) -> u8 {
        1 << (self as u8)
    }
}

/// Input snapshot for a single tick.
///
/// `held` carries level-triggered state (movement); `pressed` carries
/// edge-triggered state (a key that went down since the previous frame).
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct InputFrame {
    /// Actions currently held down
    pub held: u8,
    /// Actions pressed since the last frame
    pub pressed: u8,
}

impl InputFrame {
    /// An idle frame.
    pub const fn new() -> Self {
        Self { held: 0, pressed: 0 }
    }

    /// Frame with the given actions held down.
    pub fn with_held(actions: &[Action]) -> Self {
        let mut frame = Self::new();
        for action in actions {
            frame.held |= action.bit();
        }
        frame
    }

    /// Frame with the given actions freshly pressed (and held).
    pub fn with_pressed(actions: &[Action]) -> Self {
        let mut frame = Self::with_held(actions);
        frame.pressed = frame.held;
        frame
    }

    /// Level-triggered query.
    #[inline]
    pub fn is_down(&self, action: Action) -> bool {
        self.held & action.bit() != 0
    }

    /// Edge-triggered query.
    #[inline]
    pub fn was_pressed(&self, action: Action) -> bool {
        self.pressed & action.bit() != 0
    }

    /// True if nothing is held or pressed.
    #[inline]
    pub fn is_idle(&self) -> bool {
        self.held == 0 && self.pressed == 0
    }

    /// Horizontal movement direction in {-1, 0, +1}. Opposite keys cancel.
    pub fn move_direction(&self) -> f32 {
        let right = self.is_down(Action::Right) as i32;
        let left = self.is_down(Action::Left) as i32;
        (right - left) as f32
    }
}

/// Accumulates raw key transitions between ticks and emits one
/// `InputFrame` per tick.
///
/// Edge-triggered presses are cleared when the frame is taken; held state
/// persists until the backend reports a release or the window loses focus
/// (`reset_all`, which prevents stuck keys).
#[derive(Clone, Debug, Default)]
pub struct ActionState {
    held: u8,
    pressed: u8,
}

impl ActionState {
    /// Create an idle accumulator.
    pub fn new() -> Self {
        Self::default()
    }

    /// Report a key-down transition.
    pub fn press(&mut self, action: Action) {
        if self.held & action.bit() == 0 {
            self.pressed |= action.bit();
        }
        self.held |= action.bit();
    }

    /// Report a key-up transition.
    pub fn release(&mut self, action: Action) {
        self.held &= !action.bit();
    }

    /// Level-triggered query.
    pub fn is_down(&self, action: Action) -> bool {
        self.held & action.bit() != 0
    }

    /// Edge-triggered query, cleared on read.
    pub fn consume_pressed(&mut self, action: Action) -> bool {
        let hit = self.pressed & action.bit() != 0;
        self.pressed &= !action.bit();
        hit
    }

    /// Drop all state. Called on window blur / visibility loss so keys
    /// held across a focus change do not stick.
    pub fn reset_all(&mut self) {
        self.held = 0;
        self.pressed = 0;
    }

    /// Emit the frame for this tick and clear the edge-triggered set.
    pub fn take_frame(&mut self) -> InputFrame {
        let frame = InputFrame {
            held: self.held,
            pressed: self.pressed,
        };
        self.pressed = 0;
        frame
    }
}
