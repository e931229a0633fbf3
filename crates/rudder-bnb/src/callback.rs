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

//! Decision points and the callback that may take them over.
//!
//! The search stops at two kinds of decision points:
//! - `Branching`: the node LP is solved and fractional; the callback may name
//!   the variable to branch on.
//! - `Heuristic`: the node LP is solved, before branching; the callback may try
//!   partial assignments as primal solutions through
//!   [`DecisionContext::try_assignment`].
//!
//! A single [`DecisionCallback`] is installed per model together with a
//! [`CallbackConfig`] naming the points it wants to see. At each point it
//! receives a [`DecisionContext`], a borrowed view of the current node that
//! is only valid for the duration of the call.

use crate::{
    error::SolverError,
    lp::{LocalRow, LpSolver},
    monitor::search_monitor::SearchMonitor,
    params::SolverSettings,
    result::SolveStatus,
    search::{can_improve, install_incumbent},
    state::{Stage, SolverState},
    stats::SolveStatistics,
};
use rudder_core::tolerance::{fractionality, is_integral};
use rudder_model::{index::VariableIndex, problem::Problem, solution::Solution};
use std::{
    sync::atomic::{AtomicBool, Ordering},
    time::Instant,
};

/// The kind of decision the solver is about to take.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum DecisionPoint {
    Branching,
    Heuristic,
}

impl std::fmt::Display for DecisionPoint {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            DecisionPoint::Branching => write!(f, "branching"),
            DecisionPoint::Heuristic => write!(f, "heuristic"),
        }
    }
}

/// Depth filter for heuristic decision points.
///
/// - `freq < 0`: never.
/// - `freq == 0`: only at depth `start`.
/// - otherwise: at depths `start, start + freq, ...` up to `stop` (`stop < 0` means no bound).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct HeuristicSchedule {
    pub freq: i32,
    pub start: i32,
    pub stop: i32,
}

impl Default for HeuristicSchedule {
    fn default() -> Self {
        Self {
            freq: 1,
            start: 0,
            stop: -1,
        }
    }
}

impl HeuristicSchedule {
    #[inline]
    pub fn new(freq: i32, start: i32, stop: i32) -> Self {
        Self { freq, start, stop }
    }

    /// Whether the heuristic point fires at `depth`.
    pub fn applies(&self, depth: usize) -> bool {
        let depth = i64::try_from(depth).unwrap_or(i64::MAX);
        let (freq, start, stop) = (
            i64::from(self.freq),
            i64::from(self.start),
            i64::from(self.stop),
        );
        if freq < 0 {
            return false;
        }
        if freq == 0 {
            return depth == start;
        }
        depth >= start && (stop < 0 || depth <= stop) && (depth - start) % freq == 0
    }
}

/// Which decision points an installed callback is called at.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub struct CallbackConfig {
    pub branching: bool,
    pub heuristic: Option<HeuristicSchedule>,
}

impl CallbackConfig {
    /// Branching decisions only.
    #[inline]
    pub fn branching() -> Self {
        Self {
            branching: true,
            heuristic: None,
        }
    }

    /// Heuristic decisions only, filtered by `schedule`.
    #[inline]
    pub fn heuristic(schedule: HeuristicSchedule) -> Self {
        Self {
            branching: false,
            heuristic: Some(schedule),
        }
    }
}

/// What a callback tells the solver.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum CallbackResult {
    /// Let the solver decide.
    DidNotRun,
    /// Branch on the given variable. Branching points only.
    Branched(VariableIndex),
    /// Branch on the sum of the given variables: one child gets
    /// `sum <= floor(s)`, the other `sum >= ceil(s)`, where `s` is the sum of
    /// their LP values. Branching points only.
    BranchedSum(Vec<VariableIndex>),
    /// A trial installed a new incumbent. Heuristic points only.
    FoundSolution,
    /// Trials ran without improvement. Heuristic points only.
    DidNotFind,
    /// Stop the solve.
    Interrupt,
}

impl CallbackResult {
    /// Whether the result may be returned at `point`.
    pub fn is_valid_at(&self, point: DecisionPoint) -> bool {
        match self {
            CallbackResult::DidNotRun | CallbackResult::Interrupt => true,
            CallbackResult::Branched(_) | CallbackResult::BranchedSum(_) => {
                point == DecisionPoint::Branching
            }
            CallbackResult::FoundSolution | CallbackResult::DidNotFind => {
                point == DecisionPoint::Heuristic
            }
        }
    }
}

impl std::fmt::Display for CallbackResult {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            CallbackResult::DidNotRun => write!(f, "DidNotRun"),
            CallbackResult::Branched(var) => write!(f, "Branched({var})"),
            CallbackResult::BranchedSum(vars) => write!(f, "BranchedSum({} variables)", vars.len()),
            CallbackResult::FoundSolution => write!(f, "FoundSolution"),
            CallbackResult::DidNotFind => write!(f, "DidNotFind"),
            CallbackResult::Interrupt => write!(f, "Interrupt"),
        }
    }
}

/// Outcome of one partial assignment tried at a heuristic point.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum TrialResult {
    /// The completed solution was installed as the new incumbent.
    Accepted,
    /// The completed solution is integral but not better than the incumbent.
    NotImproving,
    /// The relaxation with the assignment fixed is not integral.
    Fractional,
    /// The assignment leaves no feasible completion.
    Infeasible,
}

/// User hook called at the configured decision points.
pub trait DecisionCallback: Send {
    fn on_decision(
        &mut self,
        point: DecisionPoint,
        ctx: &mut DecisionContext<'_>,
    ) -> Result<CallbackResult, SolverError>;
}

impl<F> DecisionCallback for F
where
    F: FnMut(DecisionPoint, &mut DecisionContext<'_>) -> Result<CallbackResult, SolverError> + Send,
{
    #[inline]
    fn on_decision(
        &mut self,
        point: DecisionPoint,
        ctx: &mut DecisionContext<'_>,
    ) -> Result<CallbackResult, SolverError> {
        self(point, ctx)
    }
}

/// The solver as seen from inside a decision callback.
pub struct DecisionContext<'a> {
    pub(crate) point: DecisionPoint,
    pub(crate) problem: &'a Problem,
    pub(crate) settings: &'a SolverSettings,
    pub(crate) lp: &'a LpSolver,
    pub(crate) node_number: u64,
    pub(crate) depth: usize,
    pub(crate) lower: &'a [f64],
    pub(crate) upper: &'a [f64],
    pub(crate) local_rows: &'a [LocalRow],
    pub(crate) lp_objective: f64,
    pub(crate) lp_values: &'a [f64],
    pub(crate) lp_candidates: &'a [VariableIndex],
    pub(crate) pseudo_candidates: &'a [VariableIndex],
    pub(crate) stats: &'a mut SolveStatistics,
    pub(crate) incumbent: &'a mut Option<Solution>,
    pub(crate) monitor: &'a mut dyn SearchMonitor,
    pub(crate) interrupt: &'a AtomicBool,
    pub(crate) open_nodes: usize,
    pub(crate) dual_bound: f64,
    pub(crate) start: Instant,
    pub(crate) found_solution: bool,
    pub(crate) last_trial: Option<TrialResult>,
}

impl std::fmt::Debug for DecisionContext<'_> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("DecisionContext")
            .field("point", &self.point)
            .field("node_number", &self.node_number)
            .field("depth", &self.depth)
            .field("lp_objective", &self.lp_objective)
            .field("lp_candidates", &self.lp_candidates.len())
            .finish_non_exhaustive()
    }
}

impl<'a> DecisionContext<'a> {
    #[inline]
    pub fn point(&self) -> DecisionPoint {
        self.point
    }

    #[inline]
    pub fn depth(&self) -> usize {
        self.depth
    }

    #[inline]
    pub fn node_number(&self) -> u64 {
        self.node_number
    }

    #[inline]
    pub fn lp_objective(&self) -> f64 {
        self.lp_objective
    }

    #[inline]
    pub fn lp_values(&self) -> &[f64] {
        self.lp_values
    }

    #[inline]
    pub fn lp_candidates(&self) -> &[VariableIndex] {
        self.lp_candidates
    }

    #[inline]
    pub fn pseudo_candidates(&self) -> &[VariableIndex] {
        self.pseudo_candidates
    }

    /// Node-local lower and upper bounds.
    #[inline]
    pub fn bounds(&self) -> (&[f64], &[f64]) {
        (self.lower, self.upper)
    }

    /// Objective of the incumbent, or the worst value of the sense.
    #[inline]
    pub fn primal_bound(&self) -> f64 {
        self.incumbent
            .as_ref()
            .map_or(self.problem.sense().worst_value(), Solution::objective_value)
    }

    #[inline]
    pub fn dual_bound(&self) -> f64 {
        self.dual_bound
    }

    #[inline]
    pub fn problem(&self) -> &Problem {
        self.problem
    }

    /// Whether an interrupt or a limit asks the solve to stop.
    #[inline]
    pub fn is_stopped(&self) -> bool {
        self.interrupt.load(Ordering::Relaxed) || self.monitor.search_command().is_terminate()
    }

    /// Asks the solver to stop after this decision point.
    #[inline]
    pub fn interrupt(&self) {
        self.interrupt.store(true, Ordering::Relaxed);
    }

    /// Outcome of the last [`DecisionContext::try_assignment`] at this point.
    #[inline]
    pub fn last_trial(&self) -> Option<TrialResult> {
        self.last_trial
    }

    /// The result a heuristic callback should report after its trials.
    #[inline]
    pub fn heuristic_result(&self) -> CallbackResult {
        if self.found_solution {
            CallbackResult::FoundSolution
        } else {
            CallbackResult::DidNotFind
        }
    }

    /// Fixes the given variables, solves the relaxation of the rest and
    /// installs the result as incumbent if it is integral and improving.
    ///
    /// # Errors
    ///
    /// Returns [`SolverError::InvalidAssignment`] for an unknown variable or a
    /// non-finite value, and propagates LP failures.
    pub fn try_assignment(
        &mut self,
        assignment: &[(VariableIndex, f64)],
    ) -> Result<TrialResult, SolverError> {
        let n = self.problem.num_variables();
        for &(var, value) in assignment {
            if var.get() >= n {
                return Err(SolverError::InvalidAssignment(format!(
                    "{var} is out of range for {n} variables"
                )));
            }
            if !value.is_finite() {
                return Err(SolverError::InvalidAssignment(format!(
                    "{var} assigned non-finite value {value}"
                )));
            }
        }

        self.stats.on_probing_trial();
        let result = self.probe(assignment)?;
        self.last_trial = Some(result);
        log::trace!(
            target: "rudder_bnb::callback",
            node = self.node_number,
            fixed = assignment.len();
            "trial {result:?}"
        );
        Ok(result)
    }

    fn probe(&mut self, assignment: &[(VariableIndex, f64)]) -> Result<TrialResult, SolverError> {
        let tol = self.settings.feastol;
        let mut lower = self.lower.to_vec();
        let mut upper = self.upper.to_vec();
        for &(var, value) in assignment {
            let j = var.get();
            let out_of_bounds = value < lower[j] - tol || value > upper[j] + tol;
            let fractional = self.problem.is_integral(var) && !is_integral(value, tol);
            if out_of_bounds || fractional {
                return Ok(TrialResult::Infeasible);
            }
            let value = if self.problem.is_integral(var) {
                value.round()
            } else {
                value
            };
            lower[j] = value;
            upper[j] = value;
        }

        let outcome = self
            .lp
            .solve_with_rows(self.problem, &lower, &upper, self.local_rows)?;
        self.stats.on_lp_solved(outcome.iterations);
        if !outcome.is_optimal() {
            return Ok(TrialResult::Infeasible);
        }
        if self
            .problem
            .variables()
            .any(|var| self.problem.is_integral(var) && !is_integral(outcome.values[var.get()], tol))
        {
            return Ok(TrialResult::Fractional);
        }
        if !can_improve(self.problem, outcome.objective, self.incumbent.as_ref(), tol) {
            return Ok(TrialResult::NotImproving);
        }

        install_incumbent(
            self.problem,
            outcome.values,
            self.incumbent,
            self.stats,
            self.monitor,
        );
        self.found_solution = true;
        Ok(TrialResult::Accepted)
    }

    /// An owned snapshot of the solver at this decision point.
    pub fn state(&self) -> SolverState {
        SolverState {
            stage: Stage::Solving,
            status: SolveStatus::Unknown,
            decision: Some(self.point),
            node_number: self.node_number,
            depth: self.depth,
            n_nodes: self.stats.nodes_explored,
            open_nodes: self.open_nodes,
            primal_bound: self.primal_bound(),
            dual_bound: self.dual_bound,
            lp_objective: Some(self.lp_objective),
            lp_values: self.lp_values.to_vec(),
            lp_candidates: self.lp_candidates.to_vec(),
            lp_candidate_fractionalities: self
                .lp_candidates
                .iter()
                .map(|var| fractionality(self.lp_values[var.get()]))
                .collect(),
            pseudo_candidates: self.pseudo_candidates.to_vec(),
            n_solutions: self.stats.solutions_found,
            n_lp_iterations: self.stats.lp_iterations,
            solving_time: self.start.elapsed(),
            last_trial: self.last_trial,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_schedule_every_level() {
        let s = HeuristicSchedule::default();
        assert!((0..10).all(|d| s.applies(d)));
    }

    #[test]
    fn test_schedule_frequency_window() {
        let s = HeuristicSchedule::new(2, 1, 5);
        let fired: Vec<usize> = (0..10).filter(|&d| s.applies(d)).collect();
        assert_eq!(fired, vec![1, 3, 5]);
    }

    #[test]
    fn test_schedule_zero_and_negative_frequency() {
        let root_only = HeuristicSchedule::new(0, 0, -1);
        assert!(root_only.applies(0));
        assert!(!root_only.applies(1));
        let never = HeuristicSchedule::new(-1, 0, -1);
        assert!(!(0..10).any(|d| never.applies(d)));
    }

    #[test]
    fn test_result_validity() {
        let v = VariableIndex::new(0);
        assert!(CallbackResult::Branched(v).is_valid_at(DecisionPoint::Branching));
        assert!(!CallbackResult::Branched(v).is_valid_at(DecisionPoint::Heuristic));
        assert!(CallbackResult::FoundSolution.is_valid_at(DecisionPoint::Heuristic));
        assert!(!CallbackResult::DidNotFind.is_valid_at(DecisionPoint::Branching));
        assert!(CallbackResult::Interrupt.is_valid_at(DecisionPoint::Branching));
        assert_eq!(CallbackResult::Branched(v).to_string(), "Branched(VariableIndex(0))");
        let sum = CallbackResult::BranchedSum(vec![v, VariableIndex::new(1)]);
        assert!(sum.is_valid_at(DecisionPoint::Branching));
        assert!(!sum.is_valid_at(DecisionPoint::Heuristic));
        assert_eq!(sum.to_string(), "BranchedSum(2 variables)");
    }
}
