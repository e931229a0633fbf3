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

//! Depth-first branch-and-bound over LP relaxations.
//!
//! Open nodes live on an explicit LIFO stack. Processing a node:
//! 1. prune if the parent bound cannot beat the incumbent,
//! 2. solve the relaxation (infeasible: prune, unbounded: stop),
//! 3. prune by bound, or install an integral relaxation as incumbent,
//! 4. call the heuristic decision point if the schedule fires at this depth,
//! 5. call the branching decision point, or apply the default rule,
//! 6. push both children so the preferred one is popped first.

use crate::{
    branching::ChildSelection,
    callback::{CallbackConfig, CallbackResult, DecisionCallback, DecisionContext, DecisionPoint},
    error::SolverError,
    lp::{LocalRow, LpSolver, LpStatus},
    monitor::{
        composite::CompositeMonitor,
        interrupt::InterruptMonitor,
        limits::{NodeLimitMonitor, SolutionLimitMonitor},
        search_monitor::{SearchCommand, SearchMonitor},
        time_limit::TimeLimitMonitor,
    },
    node::{BoundChange, Node},
    params::SolverSettings,
    result::SolveStatus,
    stats::SolveStatistics,
};
use log::{debug, info, trace};
use rand::seq::SliceRandom;
use rudder_core::{
    random::{derive_seed, engine_from_seed},
    tolerance::is_integral,
};
use rudder_model::{
    index::VariableIndex,
    problem::{ConstraintSense, ObjectiveSense, Problem},
    solution::Solution,
};
use std::{sync::atomic::AtomicBool, time::Instant};

/// The callback taken out of the model for the duration of a solve.
pub(crate) type InstalledCallback = (CallbackConfig, Box<dyn DecisionCallback>);

/// Whether a node with relaxation value `bound` may still improve on `incumbent`.
#[inline]
pub(crate) fn can_improve(
    problem: &Problem,
    bound: f64,
    incumbent: Option<&Solution>,
    tol: f64,
) -> bool {
    match incumbent {
        None => true,
        Some(best) => problem
            .sense()
            .is_better(bound, best.objective_value(), tol),
    }
}

/// Rounds integral variables and installs `values` as the new incumbent.
pub(crate) fn install_incumbent(
    problem: &Problem,
    mut values: Vec<f64>,
    incumbent: &mut Option<Solution>,
    stats: &mut SolveStatistics,
    monitor: &mut dyn SearchMonitor,
) {
    for var in problem.variables() {
        if problem.is_integral(var) {
            values[var.get()] = values[var.get()].round();
        }
    }
    let solution = Solution::new(problem.objective_value(&values), values);
    stats.on_solution_found();
    monitor.on_solution_found(&solution);
    trace!(
        target: "rudder_bnb::search",
        objective = solution.objective_value();
        "new incumbent"
    );
    *incumbent = Some(solution);
}

/// The weaker of two dual bounds in the direction of `sense`.
#[inline]
fn weaker(sense: ObjectiveSense, a: f64, b: f64) -> f64 {
    match sense {
        ObjectiveSense::Minimize => a.min(b),
        ObjectiveSense::Maximize => a.max(b),
    }
}

/// Variable order used to break ties, shuffled when `permutevars` is on.
fn variable_rank(settings: &SolverSettings, n: usize) -> Vec<usize> {
    let mut rank: Vec<usize> = (0..n).collect();
    if settings.permute_vars {
        let mut order: Vec<usize> = (0..n).collect();
        order.shuffle(&mut engine_from_seed(settings.permutation_seed));
        for (position, &var) in order.iter().enumerate() {
            rank[var] = position;
        }
    }
    rank
}

fn row_order(settings: &SolverSettings, m: usize) -> Vec<usize> {
    let mut order: Vec<usize> = (0..m).collect();
    if settings.permute_conss {
        order.shuffle(&mut engine_from_seed(derive_seed(
            settings.permutation_seed,
            1,
        )));
    }
    order
}

pub(crate) struct Search<'a> {
    pub(crate) problem: &'a Problem,
    pub(crate) settings: &'a SolverSettings,
    pub(crate) interrupt: &'a AtomicBool,
    pub(crate) callback: Option<&'a mut InstalledCallback>,
    pub(crate) stats: &'a mut SolveStatistics,
    pub(crate) incumbent: &'a mut Option<Solution>,
}

/// Result of a finished search.
#[derive(Debug, Clone, Copy, PartialEq)]
pub(crate) struct SearchOutcome {
    pub(crate) status: SolveStatus,
    pub(crate) dual_bound: f64,
}

impl<'a> Search<'a> {
    fn log_verbose(&self, level: i32, message: std::fmt::Arguments<'_>) {
        if self.settings.verbosity >= level {
            info!(target: "rudder_bnb::search", "{}{}", self.settings.prefix, message);
        }
    }

    fn build_monitor(&self) -> CompositeMonitor<'a> {
        let mut monitor = CompositeMonitor::new();
        monitor.add_monitor(InterruptMonitor::new(self.interrupt));
        if let Some(limit) = self.settings.time_limit {
            monitor.add_monitor(TimeLimitMonitor::new(limit));
        }
        if let Some(limit) = self.settings.node_limit {
            monitor.add_monitor(NodeLimitMonitor::new(limit));
        }
        if let Some(limit) = self.settings.solution_limit {
            monitor.add_monitor(SolutionLimitMonitor::new(limit));
        }
        monitor
    }

    pub(crate) fn run(mut self) -> Result<SearchOutcome, SolverError> {
        let problem = self.problem;
        let settings = self.settings;
        let sense = problem.sense();
        let tol = settings.feastol;
        let n = problem.num_variables();
        let start = Instant::now();

        let lp = LpSolver::new(problem, tol)
            .with_lp_seed(settings.lp_seed)
            .with_row_order(row_order(settings, problem.num_constraints()));
        let rank = variable_rank(settings, n);
        let mut rng = engine_from_seed(settings.random_seed_shift);

        let mut monitor = self.build_monitor();
        monitor.on_enter_search(problem);
        debug!(
            target: "rudder_bnb::search",
            variables = n,
            constraints = problem.num_constraints();
            "search started on {} ({} branching)", problem.name(), settings.branching_rule
        );
        self.log_verbose(
            1,
            format_args!(
                "solving {} ({} variables, {} constraints)",
                problem.name(),
                n,
                problem.num_constraints()
            ),
        );

        let best_possible = -sense.worst_value();
        let mut stack: Vec<Node> = vec![Node::root(best_possible)];
        let mut last_number = 1u64;
        let mut stopped: Option<SolveStatus> = None;
        let mut unbounded = false;

        while let Some(node) = stack.pop() {
            if !can_improve(problem, node.parent_bound, self.incumbent.as_ref(), tol) {
                self.stats.on_pruning_bound();
                continue;
            }

            monitor.on_step();
            if let SearchCommand::Terminate(reason) = monitor.search_command() {
                stack.push(node);
                stopped = Some(reason.into());
                break;
            }

            let (lower, upper) = node.bounds(problem.lower_bounds(), problem.upper_bounds());
            let relaxation = lp.solve_with_rows(problem, &lower, &upper, &node.rows)?;
            self.stats.on_lp_solved(relaxation.iterations);
            self.stats.on_node_explored(node.depth);
            if node.depth == 0 {
                self.stats.root_lp_objective =
                    relaxation.is_optimal().then_some(relaxation.objective);
            }

            match relaxation.status {
                LpStatus::Infeasible => {
                    trace!(target: "rudder_bnb::search", node = node.number; "infeasible");
                    self.stats.on_pruning_infeasible();
                    continue;
                }
                LpStatus::Unbounded => {
                    unbounded = true;
                    break;
                }
                LpStatus::Optimal => {}
            }

            let bound = relaxation.objective;
            let values = relaxation.values;
            trace!(
                target: "rudder_bnb::search",
                node = node.number,
                depth = node.depth,
                bound = bound;
                "node solved"
            );
            self.log_verbose(
                2,
                format_args!(
                    "node {} depth {} bound {} open {}",
                    node.number,
                    node.depth,
                    bound,
                    stack.len()
                ),
            );

            if !can_improve(problem, bound, self.incumbent.as_ref(), tol) {
                self.stats.on_pruning_bound();
                continue;
            }

            let lp_candidates: Vec<VariableIndex> = problem
                .variables()
                .filter(|&var| problem.is_integral(var) && !is_integral(values[var.get()], tol))
                .collect();
            if lp_candidates.is_empty() {
                install_incumbent(problem, values, self.incumbent, self.stats, &mut monitor);
                continue;
            }
            let pseudo_candidates: Vec<VariableIndex> = problem
                .variables()
                .filter(|&var| problem.is_integral(var) && upper[var.get()] - lower[var.get()] > tol)
                .collect();
            let dual_bound = stack
                .iter()
                .map(|open| open.parent_bound)
                .fold(bound, |acc, b| weaker(sense, acc, b));

            let mut choice: Option<BranchChoice> = None;
            for point in [DecisionPoint::Heuristic, DecisionPoint::Branching] {
                let Some((config, callback)) = self.callback.as_deref_mut() else {
                    break;
                };
                let fires = match point {
                    DecisionPoint::Heuristic => config
                        .heuristic
                        .is_some_and(|schedule| schedule.applies(node.depth)),
                    DecisionPoint::Branching => config.branching,
                };
                if !fires {
                    continue;
                }

                self.stats.on_callback();
                let mut ctx = DecisionContext {
                    point,
                    problem,
                    settings,
                    lp: &lp,
                    node_number: node.number,
                    depth: node.depth,
                    lower: &lower,
                    upper: &upper,
                    local_rows: &node.rows,
                    lp_objective: bound,
                    lp_values: &values,
                    lp_candidates: &lp_candidates,
                    pseudo_candidates: &pseudo_candidates,
                    stats: self.stats,
                    incumbent: self.incumbent,
                    monitor: &mut monitor,
                    interrupt: self.interrupt,
                    open_nodes: stack.len(),
                    dual_bound,
                    start,
                    found_solution: false,
                    last_trial: None,
                };
                let result = callback.on_decision(point, &mut ctx)?;
                if !result.is_valid_at(point) {
                    return Err(SolverError::InvalidCallbackResult { result, point });
                }
                match result {
                    CallbackResult::Interrupt => {
                        stopped = Some(SolveStatus::UserInterrupt);
                        break;
                    }
                    CallbackResult::Branched(var) => {
                        validate_branching(problem, var, &lower, &upper, tol)?;
                        choice = Some(BranchChoice::Variable(var));
                    }
                    CallbackResult::BranchedSum(vars) => {
                        let sum = validate_sum_branching(problem, &vars, &lower, &upper, &values, tol)?;
                        choice = Some(BranchChoice::Sum(vars, sum));
                    }
                    CallbackResult::DidNotRun
                    | CallbackResult::FoundSolution
                    | CallbackResult::DidNotFind => {}
                }

                if let SearchCommand::Terminate(reason) = monitor.search_command() {
                    stopped = Some(reason.into());
                    break;
                }
                if !can_improve(problem, bound, self.incumbent.as_ref(), tol) {
                    break;
                }
            }
            if stopped.is_some() {
                stack.push(node);
                break;
            }
            if !can_improve(problem, bound, self.incumbent.as_ref(), tol) {
                self.stats.on_pruning_bound();
                continue;
            }

            let var = match choice {
                Some(BranchChoice::Variable(var)) => var,
                Some(BranchChoice::Sum(vars, sum)) => {
                    let (down, up) = (sum.floor(), sum.ceil());
                    self.stats.on_branch();
                    let down_child = node.child_with_row(
                        last_number + 1,
                        bound,
                        LocalRow::sum(&vars, ConstraintSense::LessEqual, down),
                    );
                    let up_child = node.child_with_row(
                        last_number + 2,
                        bound,
                        LocalRow::sum(&vars, ConstraintSense::GreaterEqual, up),
                    );
                    last_number += 2;
                    trace!(
                        target: "rudder_bnb::search",
                        node = node.number,
                        vars = vars.len(),
                        down = down,
                        up = up;
                        "branched on sum"
                    );
                    push_children(&mut stack, settings.child_selection, down_child, up_child);
                    continue;
                }
                None => {
                    let Some(var) =
                        settings
                            .branching_rule
                            .select(&lp_candidates, &values, &rank, &mut rng)
                    else {
                        continue;
                    };
                    var
                }
            };

            let j = var.get();
            let value = values[j];
            let (down, up) = if !is_integral(value, tol) {
                (value.floor(), value.ceil())
            } else {
                let r = value.round();
                if r < upper[j] { (r, r + 1.0) } else { (r - 1.0, r) }
            };
            self.stats.on_branch();
            let down_child = node.child(last_number + 1, bound, BoundChange::Upper(var, down));
            let up_child = node.child(last_number + 2, bound, BoundChange::Lower(var, up));
            last_number += 2;
            trace!(
                target: "rudder_bnb::search",
                node = node.number,
                var = j,
                down = down,
                up = up;
                "branched"
            );
            push_children(&mut stack, settings.child_selection, down_child, up_child);
        }

        monitor.on_exit_search();
        self.stats.set_total_time(start.elapsed());

        let status = if unbounded {
            SolveStatus::Unbounded
        } else if let Some(status) = stopped {
            status
        } else if self.incumbent.is_some() {
            SolveStatus::Optimal
        } else {
            SolveStatus::Infeasible
        };

        let primal = self
            .incumbent
            .as_ref()
            .map_or(sense.worst_value(), Solution::objective_value);
        let dual_bound = if stopped.is_some() {
            stack
                .iter()
                .map(|open| open.parent_bound)
                .fold(primal, |acc, b| weaker(sense, acc, b))
        } else {
            primal
        };

        debug!(
            target: "rudder_bnb::search",
            nodes = self.stats.nodes_explored,
            solutions = self.stats.solutions_found;
            "search finished: {status}"
        );
        self.log_verbose(
            1,
            format_args!(
                "{status}: primal bound {primal}, {} nodes in {:.2?}",
                self.stats.nodes_explored, self.stats.time_total
            ),
        );

        Ok(SearchOutcome { status, dual_bound })
    }
}

/// How the search splits the current node.
enum BranchChoice {
    Variable(VariableIndex),
    /// The variables and the fractional sum of their LP values.
    Sum(Vec<VariableIndex>, f64),
}

/// Pushes both children so the preferred one is popped first.
#[inline]
fn push_children(stack: &mut Vec<Node>, selection: ChildSelection, down: Node, up: Node) {
    match selection {
        ChildSelection::Down => {
            stack.push(up);
            stack.push(down);
        }
        ChildSelection::Up => {
            stack.push(down);
            stack.push(up);
        }
    }
}

/// Checks every variable like a single-variable branching and returns the
/// sum of their LP values, which must be fractional.
fn validate_sum_branching(
    problem: &Problem,
    vars: &[VariableIndex],
    lower: &[f64],
    upper: &[f64],
    values: &[f64],
    tol: f64,
) -> Result<f64, SolverError> {
    if vars.is_empty() {
        return Err(SolverError::InvalidSumBranching("empty variable set"));
    }
    let mut seen = vec![false; problem.num_variables()];
    let mut sum = 0.0;
    for &var in vars {
        validate_branching(problem, var, lower, upper, tol)?;
        if std::mem::replace(&mut seen[var.get()], true) {
            return Err(SolverError::InvalidBranching {
                variable: var,
                reason: "variable appears twice in the sum",
            });
        }
        sum += values[var.get()];
    }
    if is_integral(sum, tol) {
        return Err(SolverError::InvalidSumBranching(
            "the LP values sum to an integer",
        ));
    }
    Ok(sum)
}

fn validate_branching(
    problem: &Problem,
    var: VariableIndex,
    lower: &[f64],
    upper: &[f64],
    tol: f64,
) -> Result<(), SolverError> {
    if var.get() >= problem.num_variables() {
        return Err(SolverError::InvalidBranching {
            variable: var,
            reason: "index out of range",
        });
    }
    if !problem.is_integral(var) {
        return Err(SolverError::InvalidBranching {
            variable: var,
            reason: "variable is continuous",
        });
    }
    if upper[var.get()] - lower[var.get()] <= tol {
        return Err(SolverError::InvalidBranching {
            variable: var,
            reason: "variable is fixed at this node",
        });
    }
    Ok(())
}
