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

//! # Weighted Sampling Without Replacement
//!
//! [`arg_choice`] draws `n_samples` distinct positions from a weight vector,
//! each draw proportional to the remaining weights. It uses the
//! Efraimidis–Spirakis key scheme: every item gets the key `w / E` with
//! `E ~ Exp(1)` and the `n_samples` largest keys win. A zero weight always
//! gets key zero, so such items are only ever picked when fewer than
//! `n_samples` positive-weight items exist.

use rand::Rng;
use rand_distr::{Distribution, Exp1};

/// Errors raised by the sampling helpers.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum SamplingError {
    #[error("cannot sample {requested} items from a population of {available}")]
    TooManySamples { requested: usize, available: usize },
    #[error("weight at position {index} is invalid: {weight}")]
    InvalidWeight { index: usize, weight: f64 },
}

/// Samples `n_samples` distinct positions of `weights` without replacement.
///
/// The returned positions are ordered from the largest sampling key to the
/// smallest, which is the order in which a sequential draw would have picked
/// them.
///
/// # Errors
///
/// Returns [`SamplingError::TooManySamples`] if `n_samples > weights.len()`,
/// and [`SamplingError::InvalidWeight`] for negative or non-finite weights.
pub fn arg_choice<R>(
    n_samples: usize,
    weights: &[f64],
    rng: &mut R,
) -> Result<Vec<usize>, SamplingError>
where
    R: Rng + ?Sized,
{
    if n_samples > weights.len() {
        return Err(SamplingError::TooManySamples {
            requested: n_samples,
            available: weights.len(),
        });
    }

    let mut keyed: Vec<(f64, usize)> = Vec::with_capacity(weights.len());
    for (index, &weight) in weights.iter().enumerate() {
        if !weight.is_finite() || weight < 0.0 {
            return Err(SamplingError::InvalidWeight { index, weight });
        }
        let key = if weight == 0.0 {
            0.0
        } else {
            let e: f64 = Exp1.sample(rng);
            weight / e
        };
        keyed.push((key, index));
    }

    if n_samples == 0 {
        return Ok(Vec::new());
    }

    let by_key_desc =
        |a: &(f64, usize), b: &(f64, usize)| b.0.total_cmp(&a.0).then_with(|| a.1.cmp(&b.1));
    if n_samples < keyed.len() {
        keyed.select_nth_unstable_by(n_samples - 1, by_key_desc);
        keyed.truncate(n_samples);
    }
    keyed.sort_unstable_by(by_key_desc);

    Ok(keyed.into_iter().map(|(_, index)| index).collect())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::random::engine_from_seed;
    use std::collections::HashSet;

    #[test]
    fn test_returns_distinct_indices() {
        let mut rng = engine_from_seed(3);
        let weights = [1.0, 2.0, 3.0, 4.0, 5.0, 6.0];
        for k in 0..=weights.len() {
            let picked = arg_choice(k, &weights, &mut rng).unwrap();
            assert_eq!(picked.len(), k);
            let unique: HashSet<usize> = picked.iter().copied().collect();
            assert_eq!(unique.len(), k, "duplicates in {picked:?}");
            assert!(picked.iter().all(|&i| i < weights.len()));
        }
    }

    #[test]
    fn test_too_many_samples_is_rejected() {
        let mut rng = engine_from_seed(3);
        let err = arg_choice(4, &[1.0, 1.0, 1.0], &mut rng).unwrap_err();
        assert_eq!(
            err,
            SamplingError::TooManySamples {
                requested: 4,
                available: 3
            }
        );
    }

    #[test]
    fn test_zero_weight_is_never_selected() {
        let mut rng = engine_from_seed(11);
        let weights = [0.5, 0.0, 2.0, 0.0, 1.0];
        for _ in 0..500 {
            let picked = arg_choice(3, &weights, &mut rng).unwrap();
            assert!(!picked.contains(&1));
            assert!(!picked.contains(&3));
        }
    }

    #[test]
    fn test_negative_and_nan_weights_are_rejected() {
        let mut rng = engine_from_seed(0);
        assert!(matches!(
            arg_choice(1, &[1.0, -1.0], &mut rng),
            Err(SamplingError::InvalidWeight { index: 1, .. })
        ));
        assert!(matches!(
            arg_choice(1, &[f64::NAN], &mut rng),
            Err(SamplingError::InvalidWeight { index: 0, .. })
        ));
    }

    #[test]
    fn test_heavier_items_are_picked_first_more_often() {
        let mut rng = engine_from_seed(5);
        let weights = [1.0, 9.0];
        let heavy_first = (0..2000)
            .filter(|_| arg_choice(1, &weights, &mut rng).unwrap()[0] == 1)
            .count();
        // Expected share is 0.9.
        assert!(heavy_first > 1600, "heavy item picked first {heavy_first} times");
    }

    #[test]
    fn test_same_seed_same_draw() {
        let weights = [0.3, 0.1, 0.4, 0.2];
        let a = arg_choice(2, &weights, &mut engine_from_seed(8)).unwrap();
        let b = arg_choice(2, &weights, &mut engine_from_seed(8)).unwrap();
        assert_eq!(a, b);
    }
}
