//! Deterministic random number generation.
//!
//! Each session owns one RNG seeded at creation, so a recorded intent
//! sequence replays to an identical game.

use rand::SeedableRng;
use rand_chacha::ChaCha8Rng;

/// Deterministic RNG for deck shuffles and other chance effects.
#[derive(Clone, Debug)]
pub struct GameRng {
    inner: ChaCha8Rng,
}

impl GameRng {
    /// Create a new RNG with the given seed.
    #[must_use]
    pub fn new(seed: u64) -> Self {
        Self {
            inner: ChaCha8Rng::seed_from_u64(seed),
        }
    }

    /// Shuffle a slice in place.
    pub fn shuffle<T>(&mut self, slice: &mut [T]) {
        use rand::seq::SliceRandom;
        slice.shuffle(&mut self.inner);
    }
}
