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

//! Process-wide seeding for application code.
//!
//! Engine components never read this; they take seeds and engines
//! explicitly. It only supplies defaults for environments and instance
//! sources built without a seed.

use parking_lot::Mutex;
use rudder_core::random::{RandomContext, RandomEngine, Seed};
use std::sync::LazyLock;

static GLOBAL: LazyLock<Mutex<RandomContext>> =
    LazyLock::new(|| Mutex::new(RandomContext::from_entropy()));

/// Re-roots the process-wide context.
pub fn seed(value: Seed) {
    GLOBAL.lock().seed(value);
}

/// The next seed of the process-wide context.
pub fn spawn_seed() -> Seed {
    GLOBAL.lock().spawn_seed()
}

/// A fresh engine from the process-wide context.
pub fn spawn_engine() -> RandomEngine {
    GLOBAL.lock().spawn_engine()
}

#[cfg(test)]
mod tests {
    use super::*;
    use rudder_core::random::derive_seed;

    #[test]
    fn test_spawned_seeds_follow_context() {
        // Hold the lock across the sequence so other tests cannot interleave.
        let mut ctx = GLOBAL.lock();
        ctx.seed(11);
        let first = ctx.spawn_seed();
        assert_eq!(first, derive_seed(11, 1));
        assert_ne!(ctx.spawn_seed(), first);
    }
}
