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

use std::time::Duration;

/// Statistics collected during a solve.
#[derive(Debug, Clone, PartialEq)]
pub struct SolveStatistics {
    /// Total nodes whose LP relaxation was solved.
    pub nodes_explored: u64,
    /// Total branchings performed.
    pub branchings: u64,
    /// The deepest level reached in the tree.
    pub max_depth: u64,
    /// Nodes discarded because their relaxation was infeasible.
    pub prunings_infeasible: u64,
    /// Nodes discarded because their relaxation could not beat the incumbent.
    pub prunings_bound: u64,
    /// Improving solutions installed as incumbent.
    pub solutions_found: u64,
    /// LP relaxations solved, probing included.
    pub lp_solves: u64,
    /// Simplex pivots over all LP solves.
    pub lp_iterations: u64,
    /// Partial assignments tried by heuristic callbacks.
    pub probing_trials: u64,
    /// Decision callback invocations.
    pub callback_calls: u64,
    /// Objective of the root LP relaxation, if it was solved.
    pub root_lp_objective: Option<f64>,
    /// Total time spent in the solver.
    pub time_total: Duration,
}

impl Default for SolveStatistics {
    fn default() -> Self {
        Self {
            nodes_explored: 0,
            branchings: 0,
            max_depth: 0,
            prunings_infeasible: 0,
            prunings_bound: 0,
            solutions_found: 0,
            lp_solves: 0,
            lp_iterations: 0,
            probing_trials: 0,
            callback_calls: 0,
            root_lp_objective: None,
            time_total: Duration::ZERO,
        }
    }
}

impl SolveStatistics {
    #[inline]
    pub fn on_node_explored(&mut self, depth: usize) {
        self.nodes_explored = self.nodes_explored.saturating_add(1);
        self.max_depth = self.max_depth.max(depth as u64);
    }

    #[inline]
    pub fn on_branch(&mut self) {
        self.branchings = self.branchings.saturating_add(1);
    }

    #[inline]
    pub fn on_pruning_infeasible(&mut self) {
        self.prunings_infeasible = self.prunings_infeasible.saturating_add(1);
    }

    #[inline]
    pub fn on_pruning_bound(&mut self) {
        self.prunings_bound = self.prunings_bound.saturating_add(1);
    }

    #[inline]
    pub fn on_solution_found(&mut self) {
        self.solutions_found = self.solutions_found.saturating_add(1);
    }

    #[inline]
    pub fn on_lp_solved(&mut self, iterations: u64) {
        self.lp_solves = self.lp_solves.saturating_add(1);
        self.lp_iterations = self.lp_iterations.saturating_add(iterations);
    }

    #[inline]
    pub fn on_probing_trial(&mut self) {
        self.probing_trials = self.probing_trials.saturating_add(1);
    }

    #[inline]
    pub fn on_callback(&mut self) {
        self.callback_calls = self.callback_calls.saturating_add(1);
    }

    #[inline]
    pub fn set_total_time(&mut self, duration: Duration) {
        self.time_total = duration;
    }
}

impl std::fmt::Display for SolveStatistics {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        writeln!(f, "Rudder-BnB Solver Statistics:")?;
        writeln!(f, "  Nodes explored:       {}", self.nodes_explored)?;
        writeln!(f, "  Branchings:           {}", self.branchings)?;
        writeln!(f, "  Max depth reached:    {}", self.max_depth)?;
        writeln!(f, "  Prunings (infeasible):{}", self.prunings_infeasible)?;
        writeln!(f, "  Prunings (bound):     {}", self.prunings_bound)?;
        writeln!(f, "  Solutions found:      {}", self.solutions_found)?;
        writeln!(f, "  LP solves:            {}", self.lp_solves)?;
        writeln!(f, "  LP iterations:        {}", self.lp_iterations)?;
        writeln!(f, "  Probing trials:       {}", self.probing_trials)?;
        writeln!(f, "  Callback calls:       {}", self.callback_calls)?;
        match self.root_lp_objective {
            Some(v) => writeln!(f, "  Root LP objective:    {}", v)?,
            None => writeln!(f, "  Root LP objective:    -")?,
        }
        writeln!(f, "  Total time:           {:.2?}", self.time_total)?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_counters_and_depth() {
        let mut s = SolveStatistics::default();
        s.on_node_explored(0);
        s.on_node_explored(3);
        s.on_node_explored(1);
        s.on_lp_solved(7);
        s.on_lp_solved(5);
        assert_eq!(s.nodes_explored, 3);
        assert_eq!(s.max_depth, 3);
        assert_eq!(s.lp_solves, 2);
        assert_eq!(s.lp_iterations, 12);
    }

    #[test]
    fn test_display_mentions_counters() {
        let mut s = SolveStatistics::default();
        s.on_branch();
        let text = s.to_string();
        assert!(text.contains("Branchings:           1"));
        assert!(text.contains("Root LP objective:    -"));
    }
}
