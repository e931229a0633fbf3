// Copyright (c) 2025 Felix Kahle.
//
// Permission is hereby granted, free of charge, to any person obtaining
// a copy of this software and associated documentation files (the
// "Software"), to deal in the Software without restriction, including
// without limitation the rights to use, copy, modify, merge, publish,
// distribute, sublicense, and/or sell copies of the Software, and to
// permit persons to whom the Software is furnished to do so, subject to
// the following conditions:
//
// The above copyright notice and this permission notice shall be
// included in all copies or substantial portions of the Software.
//
// THE SOFTWARE IS PROVIDED "AS IS", WITHOUT WARRANTY OF ANY KIND,
// EXPRESS OR IMPLIED, INCLUDING BUT NOT LIMITED TO THE WARRANTIES OF
// MERCHANTABILITY, FITNESS FOR A PARTICULAR PURPOSE AND
// NONINFRINGEMENT. IN NO EVENT SHALL THE AUTHORS OR COPYRIGHT HOLDERS BE
// LIABLE FOR ANY CLAIM, DAMAGES OR OTHER LIABILITY, WHETHER IN AN ACTION
// OF CONTRACT, TORT OR OTHERWISE, ARISING FROM, OUT OF OR IN CONNECTION
// WITH THE SOFTWARE OR THE USE OR OTHER DEALINGS IN THE SOFTWARE.

//! # Seeding Context
//!
//! Every stochastic decision in rudder (instance sampling, solver
//! randomization, candidate subsampling) draws from a [`RandomEngine`]. Engines
//! are never created from ambient global state inside the engine crates;
//! instead a [`RandomContext`] is passed explicitly to whoever needs to spawn
//! a new stream.
//!
//! A context is a pair `(user_seed, spawn_count)`. Re-seeding resets the spawn
//! counter, so the sequence of engines spawned after `seed(s)` is a pure
//! function of `s`.
//!
//! ```rust
//! use rudder_core::random::RandomContext;
//! use rand::Rng;
//!
//! let mut a = RandomContext::new(42);
//! let mut b = RandomContext::new(42);
//! assert_eq!(a.spawn_engine().random::<u64>(), b.spawn_engine().random::<u64>());
//! ```

use rand::{Rng, SeedableRng};

/// Seed type accepted by every seedable component.
pub type Seed = u64;

/// The concrete random engine used across the workspace.
pub type RandomEngine = rand_chacha::ChaCha8Rng;

/// Builds an engine from a seed.
#[inline]
pub fn engine_from_seed(seed: Seed) -> RandomEngine {
    RandomEngine::seed_from_u64(seed)
}

/// Mixes a base seed with a stream number (splitmix64 finalizer).
///
/// Distinct stream numbers under the same base yield unrelated seeds.
#[inline]
pub const fn derive_seed(base: Seed, stream: u64) -> Seed {
    let mut z = base
        .wrapping_add(stream.wrapping_mul(0x9E37_79B9_7F4A_7C15))
        .wrapping_add(0x9E37_79B9_7F4A_7C15);
    z = (z ^ (z >> 30)).wrapping_mul(0xBF58_476D_1CE4_E5B9);
    z = (z ^ (z >> 27)).wrapping_mul(0x94D0_49BB_1331_11EB);
    z ^ (z >> 31)
}

/// Explicit seeding state from which independent engines are spawned.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RandomContext {
    user_seed: Seed,
    spawn_count: u64,
}

impl RandomContext {
    /// Creates a context rooted at `seed`.
    #[inline]
    pub const fn new(seed: Seed) -> Self {
        Self {
            user_seed: seed,
            spawn_count: 0,
        }
    }

    /// Creates a context rooted at a seed drawn from the thread-local OS-seeded generator.
    pub fn from_entropy() -> Self {
        Self::new(rand::rng().random())
    }

    /// Re-roots the context and restarts the spawn sequence.
    #[inline]
    pub fn seed(&mut self, seed: Seed) {
        self.user_seed = seed;
        self.spawn_count = 0;
    }

    /// Returns the root seed.
    #[inline]
    pub fn user_seed(&self) -> Seed {
        self.user_seed
    }

    /// Returns how many seeds have been spawned since the last re-seed.
    #[inline]
    pub fn spawn_count(&self) -> u64 {
        self.spawn_count
    }

    /// Returns the next derived seed in the spawn sequence.
    #[inline]
    pub fn spawn_seed(&mut self) -> Seed {
        self.spawn_count += 1;
        derive_seed(self.user_seed, self.spawn_count)
    }

    /// Returns a fresh engine seeded with the next derived seed.
    #[inline]
    pub fn spawn_engine(&mut self) -> RandomEngine {
        engine_from_seed(self.spawn_seed())
    }
}

impl Default for RandomContext {
    fn default() -> Self {
        Self::from_entropy()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_same_seed_spawns_same_sequence() {
        let mut a = RandomContext::new(7);
        let mut b = RandomContext::new(7);
        for _ in 0..5 {
            assert_eq!(a.spawn_seed(), b.spawn_seed());
        }
    }

    #[test]
    fn test_spawned_seeds_are_distinct() {
        let mut ctx = RandomContext::new(7);
        let first = ctx.spawn_seed();
        let second = ctx.spawn_seed();
        assert_ne!(first, second);
        assert_eq!(ctx.spawn_count(), 2);
    }

    #[test]
    fn test_reseed_restarts_sequence() {
        let mut ctx = RandomContext::new(1);
        let first = ctx.spawn_seed();
        ctx.spawn_seed();
        ctx.seed(1);
        assert_eq!(ctx.spawn_count(), 0);
        assert_eq!(ctx.spawn_seed(), first);
    }

    #[test]
    fn test_engines_from_equal_seeds_agree() {
        let mut a = engine_from_seed(99);
        let mut b = engine_from_seed(99);
        let xs: Vec<u32> = (0..4).map(|_| a.random()).collect();
        let ys: Vec<u32> = (0..4).map(|_| b.random()).collect();
        assert_eq!(xs, ys);
    }

    #[test]
    fn test_derive_seed_depends_on_both_inputs() {
        assert_ne!(derive_seed(1, 1), derive_seed(1, 2));
        assert_ne!(derive_seed(1, 1), derive_seed(2, 1));
        assert_eq!(derive_seed(3, 4), derive_seed(3, 4));
    }
}
