//! RNG module - seedable randomness for the board
//!
//! Every random decision the simulation makes (unit tiles, special flags,
//! initial grid, hint selection, explosion lifetimes, gravity kicks) is drawn
//! from one [`GameRng`]. Two boards built with the same seed and fed the same
//! inputs evolve identically.

use rand::distributions::uniform::SampleRange;
use rand::{Rng, SeedableRng};
use rand_chacha::ChaCha8Rng;

/// Deterministic RNG backed by ChaCha8.
#[derive(Debug, Clone)]
pub struct GameRng {
    inner: ChaCha8Rng,
    seed: u64,
}

impl GameRng {
    /// Create a new RNG with the given seed
    #[must_use]
    pub fn new(seed: u64) -> Self {
        Self {
            inner: ChaCha8Rng::seed_from_u64(seed),
            seed,
        }
    }

    /// Seed this generator was created with.
    pub fn seed(&self) -> u64 {
        self.seed
    }

    /// Rewind to the start of the seeded sequence.
    pub fn reseed(&mut self, seed: u64) {
        *self = Self::new(seed);
    }

    /// Uniform value in `range`.
    pub fn gen_range_usize(&mut self, range: std::ops::Range<usize>) -> usize {
        self.inner.gen_range(range)
    }

    /// Uniform value in `range`.
    pub fn gen_range_u32<R: SampleRange<u32>>(&mut self, range: R) -> u32 {
        self.inner.gen_range(range)
    }

    /// Uniform `f32` in `[0, 1)`.
    pub fn gen_f32(&mut self) -> f32 {
        self.inner.gen()
    }

    /// True with probability `1/n`. `n == 0` is treated as `1`.
    pub fn one_in(&mut self, n: u32) -> bool {
        n <= 1 || self.inner.gen_range(0..n) == 0
    }
}

impl Default for GameRng {
    fn default() -> Self {
        Self::new(1)
    }
}
