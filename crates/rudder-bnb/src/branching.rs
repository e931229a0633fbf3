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

//! Default branching rules
//!
//! When no decision callback takes over a branching decision, the search
//! picks a variable with one of these rules, selected through the
//! `branching/rule` parameter:
//! - `'f'` most fractional: largest distance to the nearest integer, ties
//!   broken by the (possibly permuted) variable order.
//! - `'i'` first index: the candidate with the smallest index.
//! - `'r'` random: one candidate drawn with probability proportional to its
//!   fractionality.
//!
//! Child order is configured separately by `nodeselection/childsel`.

use rand::Rng;
use rudder_core::{random::RandomEngine, sampling::arg_choice, tolerance::fractionality};
use rudder_model::index::VariableIndex;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum BranchingRule {
    #[default]
    MostFractional,
    FirstIndex,
    Random,
}

impl BranchingRule {
    /// Parses the `branching/rule` character.
    pub fn from_char(c: char) -> Option<Self> {
        match c {
            'f' => Some(BranchingRule::MostFractional),
            'i' => Some(BranchingRule::FirstIndex),
            'r' => Some(BranchingRule::Random),
            _ => None,
        }
    }

    /// Picks a branching variable among `candidates`.
    ///
    /// `values` are the node LP values indexed by variable, `rank` the
    /// tie-breaking position of each variable. Returns `None` only for an
    /// empty candidate list.
    pub fn select(
        self,
        candidates: &[VariableIndex],
        values: &[f64],
        rank: &[usize],
        rng: &mut RandomEngine,
    ) -> Option<VariableIndex> {
        match self {
            BranchingRule::FirstIndex => candidates.iter().min().copied(),
            BranchingRule::MostFractional => {
                let mut best: Option<(VariableIndex, f64)> = None;
                for &var in candidates {
                    let score = fractionality(values[var.get()]);
                    best = match best {
                        Some((b, s))
                            if s > score || (s == score && rank[b.get()] < rank[var.get()]) =>
                        {
                            Some((b, s))
                        }
                        _ => Some((var, score)),
                    };
                }
                best.map(|(var, _)| var)
            }
            BranchingRule::Random => {
                let weights: Vec<f64> = candidates
                    .iter()
                    .map(|var| fractionality(values[var.get()]))
                    .collect();
                match arg_choice(1, &weights, rng) {
                    Ok(picked) if weights.iter().any(|&w| w > 0.0) => {
                        picked.first().map(|&i| candidates[i])
                    }
                    // All weights zero or unusable: uniform over the candidates.
                    _ => {
                        if candidates.is_empty() {
                            None
                        } else {
                            Some(candidates[rng.random_range(0..candidates.len())])
                        }
                    }
                }
            }
        }
    }
}

impl std::fmt::Display for BranchingRule {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            BranchingRule::MostFractional => write!(f, "most fractional"),
            BranchingRule::FirstIndex => write!(f, "first index"),
            BranchingRule::Random => write!(f, "random"),
        }
    }
}

/// Which child of a branching is explored first.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum ChildSelection {
    /// The child with the tightened upper bound.
    #[default]
    Down,
    /// The child with the tightened lower bound.
    Up,
}

impl ChildSelection {
    /// Parses the `nodeselection/childsel` character.
    pub fn from_char(c: char) -> Option<Self> {
        match c {
            'd' => Some(ChildSelection::Down),
            'u' => Some(ChildSelection::Up),
            _ => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rudder_core::random::engine_from_seed;

    fn vars(ids: &[usize]) -> Vec<VariableIndex> {
        ids.iter().map(|&i| VariableIndex::new(i)).collect()
    }

    #[test]
    fn test_parse_rules() {
        assert_eq!(BranchingRule::from_char('f'), Some(BranchingRule::MostFractional));
        assert_eq!(BranchingRule::from_char('r'), Some(BranchingRule::Random));
        assert_eq!(BranchingRule::from_char('x'), None);
        assert_eq!(ChildSelection::from_char('u'), Some(ChildSelection::Up));
    }

    #[test]
    fn test_most_fractional_with_rank_ties() {
        let values = [0.5, 0.2, 1.5, 3.0];
        let candidates = vars(&[0, 1, 2]);
        let mut rng = engine_from_seed(0);

        let natural = [0, 1, 2, 3];
        assert_eq!(
            BranchingRule::MostFractional.select(&candidates, &values, &natural, &mut rng),
            Some(VariableIndex::new(0))
        );

        let permuted = [3, 1, 0, 2];
        assert_eq!(
            BranchingRule::MostFractional.select(&candidates, &values, &permuted, &mut rng),
            Some(VariableIndex::new(2))
        );
    }

    #[test]
    fn test_first_index() {
        let mut rng = engine_from_seed(0);
        let candidates = vars(&[4, 2, 7]);
        let values = [0.0; 8];
        let rank: Vec<usize> = (0..8).collect();
        assert_eq!(
            BranchingRule::FirstIndex.select(&candidates, &values, &rank, &mut rng),
            Some(VariableIndex::new(2))
        );
    }

    #[test]
    fn test_random_is_reproducible_and_picks_candidates() {
        let candidates = vars(&[0, 1, 2]);
        let values = [0.5, 0.3, 0.1];
        let rank = [0, 1, 2];
        let pick = |seed| {
            let mut rng = engine_from_seed(seed);
            BranchingRule::Random.select(&candidates, &values, &rank, &mut rng)
        };
        for seed in 0..20 {
            let picked = pick(seed);
            assert_eq!(picked, pick(seed));
            assert!(candidates.contains(&picked.unwrap()));
        }
    }

    #[test]
    fn test_empty_candidates() {
        let mut rng = engine_from_seed(0);
        for rule in [
            BranchingRule::MostFractional,
            BranchingRule::FirstIndex,
            BranchingRule::Random,
        ] {
            assert_eq!(rule.select(&[], &[], &[], &mut rng), None);
        }
    }
}
