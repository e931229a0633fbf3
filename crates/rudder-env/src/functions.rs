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

//! Observation, reward, termination and information functions.
//!
//! The environment calls each function once per reset and once per step,
//! after the dynamics have acted, including on the transition that ends the
//! episode. Functions see the model once at the start
//! of an episode through `before_episode` and an owned [`SolverState`]
//! snapshot afterwards, so they work the same whether the solver is
//! suspended on another thread or at rest.

use rudder_bnb::{model::Model, state::SolverState};
use std::collections::BTreeMap;

/// Named side information of a transition.
pub type InformationMap<I> = BTreeMap<String, I>;

/// Extracts what the agent observes.
///
/// `extract` also runs on the terminal transition with `done == true`;
/// functions with nothing to observe there return an `Option`.
pub trait ObservationFunction {
    type Observation;

    /// Called on the fresh model of a new episode.
    fn before_episode(&mut self, _model: &Model) {}

    fn extract(&mut self, state: &SolverState, done: bool) -> Self::Observation;
}

/// Extracts the scalar reward of a transition.
pub trait RewardFunction {
    fn before_episode(&mut self, _model: &Model) {}

    fn extract(&mut self, state: &SolverState, done: bool) -> f64;
}

/// Decides whether an episode ends early.
pub trait TerminationFunction {
    fn before_episode(&mut self, _model: &Model) {}

    fn extract(&mut self, state: &SolverState, done: bool) -> bool;
}

/// Extracts information the agent may log but should not learn from.
pub trait InformationFunction {
    type Information;

    fn before_episode(&mut self, _model: &Model) {}

    fn extract(&mut self, state: &SolverState, done: bool) -> InformationMap<Self::Information>;
}

/// Observes nothing.
#[derive(Debug, Clone, Copy, Default)]
pub struct NoObservation;

impl ObservationFunction for NoObservation {
    type Observation = ();

    #[inline]
    fn extract(&mut self, _state: &SolverState, _done: bool) {}
}

/// Observes the solver state snapshot itself, or nothing once the episode
/// is done.
#[derive(Debug, Clone, Copy, Default)]
pub struct SolverStateObservation;

impl ObservationFunction for SolverStateObservation {
    type Observation = Option<SolverState>;

    #[inline]
    fn extract(&mut self, state: &SolverState, done: bool) -> Option<SolverState> {
        (!done).then(|| state.clone())
    }
}

impl<A, B> ObservationFunction for (A, B)
where
    A: ObservationFunction,
    B: ObservationFunction,
{
    type Observation = (A::Observation, B::Observation);

    fn before_episode(&mut self, model: &Model) {
        self.0.before_episode(model);
        self.1.before_episode(model);
    }

    fn extract(&mut self, state: &SolverState, done: bool) -> Self::Observation {
        (self.0.extract(state, done), self.1.extract(state, done))
    }
}

/// Returns an empty information map.
#[derive(Debug, Clone, Copy, Default)]
pub struct NoInformation;

impl InformationFunction for NoInformation {
    type Information = ();

    #[inline]
    fn extract(&mut self, _state: &SolverState, _done: bool) -> InformationMap<()> {
        InformationMap::new()
    }
}

/// `1.0` on the transition that ends the episode, `0.0` otherwise.
#[derive(Debug, Clone, Copy, Default)]
pub struct IsDone;

impl RewardFunction for IsDone {
    #[inline]
    fn extract(&mut self, _state: &SolverState, done: bool) -> f64 {
        if done { 1.0 } else { 0.0 }
    }
}

/// Minus the number of nodes solved since the previous transition.
#[derive(Debug, Clone, Copy, Default)]
pub struct NodeCount {
    last: u64,
}

impl RewardFunction for NodeCount {
    fn before_episode(&mut self, _model: &Model) {
        self.last = 0;
    }

    fn extract(&mut self, state: &SolverState, _done: bool) -> f64 {
        let delta = state.n_nodes.saturating_sub(self.last);
        self.last = state.n_nodes;
        -(delta as f64)
    }
}

/// Minus the number of simplex iterations since the previous transition.
#[derive(Debug, Clone, Copy, Default)]
pub struct LpIterations {
    last: u64,
}

impl RewardFunction for LpIterations {
    fn before_episode(&mut self, _model: &Model) {
        self.last = 0;
    }

    fn extract(&mut self, state: &SolverState, _done: bool) -> f64 {
        let delta = state.n_lp_iterations.saturating_sub(self.last);
        self.last = state.n_lp_iterations;
        -(delta as f64)
    }
}

/// The same reward on every transition.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Constant(pub f64);

impl Default for Constant {
    fn default() -> Self {
        Constant(0.0)
    }
}

impl RewardFunction for Constant {
    #[inline]
    fn extract(&mut self, _state: &SolverState, _done: bool) -> f64 {
        self.0
    }
}

/// Never ends an episode early.
#[derive(Debug, Clone, Copy, Default)]
pub struct Never;

impl TerminationFunction for Never {
    #[inline]
    fn extract(&mut self, _state: &SolverState, _done: bool) -> bool {
        false
    }
}

/// Ends the episode once the solver has solved `limit` nodes.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct NodeLimit(pub u64);

impl TerminationFunction for NodeLimit {
    #[inline]
    fn extract(&mut self, state: &SolverState, _done: bool) -> bool {
        state.n_nodes >= self.0
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn state(n_nodes: u64, n_lp_iterations: u64) -> SolverState {
        SolverState {
            n_nodes,
            n_lp_iterations,
            ..SolverState::default()
        }
    }

    #[test]
    fn test_node_count_rewards_deltas() {
        let mut reward = NodeCount::default();
        assert_eq!(reward.extract(&state(3, 0), false), -3.0);
        assert_eq!(reward.extract(&state(3, 0), false), 0.0);
        assert_eq!(reward.extract(&state(10, 0), true), -7.0);
    }

    #[test]
    fn test_lp_iterations_rewards_deltas() {
        let mut reward = LpIterations::default();
        assert_eq!(reward.extract(&state(0, 5), false), -5.0);
        assert_eq!(reward.extract(&state(0, 12), false), -7.0);
    }

    #[test]
    fn test_is_done_and_constant() {
        assert_eq!(IsDone.extract(&state(0, 0), false), 0.0);
        assert_eq!(IsDone.extract(&state(0, 0), true), 1.0);
        assert_eq!(Constant(2.5).extract(&state(0, 0), false), 2.5);
    }

    #[test]
    fn test_terminations() {
        assert!(!Never.extract(&state(100, 0), false));
        let mut limit = NodeLimit(4);
        assert!(!limit.extract(&state(3, 0), false));
        assert!(limit.extract(&state(4, 0), false));
    }

    #[test]
    fn test_tuple_observation() {
        let mut obs = (NoObservation, SolverStateObservation);
        let ((), snapshot) = obs.extract(&state(2, 1), false);
        assert_eq!(snapshot.unwrap().n_nodes, 2);
        let ((), terminal) = obs.extract(&state(2, 1), true);
        assert!(terminal.is_none());
    }

    #[test]
    fn test_no_information_is_empty() {
        assert!(NoInformation.extract(&state(1, 1), false).is_empty());
        assert!(NoInformation.extract(&state(1, 1), true).is_empty());
    }
}
