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

//! Solver stages and owned state snapshots.
//!
//! A [`SolverState`] is what leaves the solver: the decision callback builds
//! one from its borrowed context, the model builds one from its own fields,
//! and the episode engine hands them to observation and reward functions.

use crate::{callback::DecisionPoint, callback::TrialResult, result::SolveStatus};
use rudder_model::index::VariableIndex;
use std::time::Duration;

/// Lifecycle stage of a model.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum Stage {
    /// The problem is loaded and no solve has started.
    #[default]
    Problem,
    /// A solve is in progress.
    Solving,
    /// A solve has finished, successfully or not.
    Solved,
}

impl std::fmt::Display for Stage {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Stage::Problem => write!(f, "problem"),
            Stage::Solving => write!(f, "solving"),
            Stage::Solved => write!(f, "solved"),
        }
    }
}

/// An owned snapshot of the solver.
///
/// Node-specific fields (`lp_*`, candidates, `depth`) are only populated while
/// the solver is suspended at a decision point.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct SolverState {
    pub stage: Stage,
    pub status: SolveStatus,
    /// The decision point the solver is suspended at, if any.
    pub decision: Option<DecisionPoint>,
    pub node_number: u64,
    pub depth: usize,
    /// Nodes whose relaxation has been solved.
    pub n_nodes: u64,
    pub open_nodes: usize,
    pub primal_bound: f64,
    pub dual_bound: f64,
    pub lp_objective: Option<f64>,
    pub lp_values: Vec<f64>,
    /// Integral variables with a fractional LP value, by index.
    pub lp_candidates: Vec<VariableIndex>,
    /// Distance to the nearest integer of each LP candidate, in order.
    pub lp_candidate_fractionalities: Vec<f64>,
    /// Integral variables that are not fixed at the current node, by index.
    pub pseudo_candidates: Vec<VariableIndex>,
    pub n_solutions: u64,
    pub n_lp_iterations: u64,
    pub solving_time: Duration,
    /// Outcome of the most recent partial assignment tried at this decision point.
    pub last_trial: Option<TrialResult>,
}

impl SolverState {
    /// Relative gap between primal and dual bound, `inf` while either is unknown.
    pub fn gap(&self) -> f64 {
        if !self.primal_bound.is_finite() || !self.dual_bound.is_finite() {
            return f64::INFINITY;
        }
        let diff = (self.primal_bound - self.dual_bound).abs();
        if diff == 0.0 {
            return 0.0;
        }
        let scale = self.primal_bound.abs().min(self.dual_bound.abs());
        if scale == 0.0 {
            f64::INFINITY
        } else {
            diff / scale
        }
    }

    #[inline]
    pub fn is_solved(&self) -> bool {
        self.stage == Stage::Solved
    }
}
