//! Seeded Random Number Generator
//!
//! Xorshift128+ PRNG seeded through SplitMix64. All gameplay randomness
//! (enemy fire intervals, shooter selection, particle bursts) flows through
//! one instance owned by the world, so a game started from the same seed
//! replays identically.

use serde::{Deserialize, Serialize};

/// Seeded PRNG using the Xorshift128+ algorithm.
///
/// Given the same seed, produces the same sequence on every platform.
///
/// # Example
///
/// ```
/// use love_invaders::core::rng::GameRng;
///
/// let mut a = GameRng::new(777);
/// let mut b = GameRng::new(777);
/// assert_eq!(a.next_u64(), b.next_u64());
/// ```
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct GameRng {
    state: [u64; 2],
}

impl Default for GameRng {
    fn default() -> Self {
        Self::new(0)
    }
}

impl GameRng {
    /// Create a new RNG from a 64-bit seed.
    ///
    /// Uses SplitMix64 to initialize the internal state, ensuring good
    /// distribution even from weak seeds.
    pub fn new(seed: u64) -> Self {
        let mut s = seed;
        let state0 = splitmix64(&mut s);
        let state1 = splitmix64(&mut s);

        // Xorshift128+ must never start from an all-zero state
        let state = if state0 == 0 && state1 == 0 {
            [0x9E3779B97F4A7C15, 0xBF58476D1CE4E5B9]
        } else {
            [state0, state1]
        };

        Self { state }
    }

    /// Generate the next 64-bit random value.
    #[inline]
    pub fn next_u64(&mut self) -> u64 {
        let s0 = self.state[0];
        let mut s1 = self.state[1];
        let result = s0.wrapping_add(s1);

        s1 ^= s0;
        self.state[0] = s0.rotate_left(24) ^ s1 ^ (s1 << 16);
        self.state[1] = s1.rotate_left(37);

        result
    }

    /// Generate a random `f32` in `[0, 1)`.
    #[inline]
    pub fn next_f32(&mut self) -> f32 {
        // Top 24 bits give the full f32 mantissa precision
        let bits = (self.next_u64() >> 40) as u32;
        bits as f32 / (1u32 << 24) as f32
    }

    /// Generate a random `f32` in `[min, max)`. Returns `min` when the
    /// range is empty or inverted.
    #[inline]
    pub fn range_f32(&mut self, min: f32, max: f32) -> f32 {
        if min >= max {
            return min;
        }
        min + self.next_f32() * (max - min)
    }

    /// Generate a random index in `[0, len)`.
    ///
    /// Modulo bias is negligible for gameplay-sized ranges.
    #[inline]
    pub fn next_index(&mut self, len: usize) -> usize {
        if len == 0 {
            return 0;
        }
        (self.next_u64() % len as u64) as usize
    }

    /// Generate a random integer in `[min, max]`.
    #[inline]
    pub fn range_u32(&mut self, min: u32, max: u32) -> u32 {
        if min >= max {
            return min;
        }
        min + (self.next_u64() % (max - min + 1) as u64) as u32
    }

    /// Select a random element from a slice.
    pub fn choose<'a, T>(&mut self, slice: &'a [T]) -> Option<&'a T> {
        if slice.is_empty() {
            None
        } else {
            Some(&slice[self.next_index(slice.len())])
        }
    }
}

/// SplitMix64 - used for seeding the main RNG state.
#[inline]
fn splitmix64(state: &mut u64) -> u64 {
    *state = state.wrapping_add(0x9E3779B97F4A7C15);
    let mut z = *state;
    z = (z ^ (z >> 30)).wrapping_mul(0xBF58476D1CE4E5B9);
    z = (z ^ (z >> 27)).wrapping_mul(0x94D049BB133111EB);
    z ^ (z >> 31)
}
