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

//! Dense two-phase simplex for node relaxations.
//!
//! Each node of the search hands the solver its current variable bounds. The
//! relaxation is rewritten in standard form over the shifted columns
//! `y_j = x_j - l_j >= 0`; finite upper bounds become explicit rows and
//! variables whose bounds coincide are substituted out. Phase 1 minimizes the
//! sum of the artificial columns, phase 2 the (sign-adjusted) objective.
//!
//! Pivoting follows Bland's rule over a column priority order, which both
//! prevents cycling and makes the result a deterministic function of the
//! priority order. Shuffling that order through `randomization/lpseed`
//! changes which of several optimal vertices is reported.

use rand::seq::SliceRandom;
use rudder_core::random::engine_from_seed;
use rudder_model::{
    index::VariableIndex,
    problem::{ConstraintSense, ObjectiveSense, Problem},
};

/// Errors raised by the LP relaxation.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum LpError {
    #[error("simplex iteration limit of {limit} reached")]
    IterationLimit { limit: u64 },
    #[error("numerical trouble: {0}")]
    Numerical(&'static str),
}

/// Outcome classification of an LP solve.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum LpStatus {
    Optimal,
    Infeasible,
    Unbounded,
}

/// Result of solving one relaxation.
#[derive(Debug, Clone, PartialEq)]
pub struct LpOutcome {
    pub status: LpStatus,
    /// Objective value in the problem's own sense; meaningful only if optimal.
    pub objective: f64,
    /// Primal values, empty unless optimal.
    pub values: Vec<f64>,
    /// Pivots performed over both phases.
    pub iterations: u64,
}

impl LpOutcome {
    #[inline]
    fn without_solution(status: LpStatus, iterations: u64) -> Self {
        Self {
            status,
            objective: f64::NAN,
            values: Vec::new(),
            iterations,
        }
    }

    #[inline]
    pub fn is_optimal(&self) -> bool {
        self.status == LpStatus::Optimal
    }
}

/// A linear row that holds only in one subtree, on top of the problem's
/// own constraints.
#[derive(Debug, Clone, PartialEq)]
pub struct LocalRow {
    pub coefficients: Vec<(VariableIndex, f64)>,
    pub sense: ConstraintSense,
    pub rhs: f64,
}

impl LocalRow {
    /// `sum(vars) <sense> rhs` with unit coefficients.
    pub fn sum(vars: &[VariableIndex], sense: ConstraintSense, rhs: f64) -> Self {
        Self {
            coefficients: vars.iter().map(|&var| (var, 1.0)).collect(),
            sense,
            rhs,
        }
    }

    /// Whether `values` satisfy the row within `tol`.
    pub fn is_satisfied(&self, values: &[f64], tol: f64) -> bool {
        let activity: f64 = self
            .coefficients
            .iter()
            .map(|&(var, a)| a * values[var.get()])
            .sum();
        match self.sense {
            ConstraintSense::LessEqual => activity <= self.rhs + tol,
            ConstraintSense::GreaterEqual => activity >= self.rhs - tol,
            ConstraintSense::Equal => (activity - self.rhs).abs() <= tol,
        }
    }
}

/// Precomputed orderings and tolerances for solving relaxations of one problem.
#[derive(Debug, Clone)]
pub struct LpSolver {
    feastol: f64,
    max_iterations: u64,
    column_rank: Vec<usize>,
    row_order: Vec<usize>,
}

const PIVOT_TOL: f64 = 1e-9;
const RATIO_TOL: f64 = 1e-12;

impl LpSolver {
    pub const DEFAULT_MAX_ITERATIONS: u64 = 100_000;

    /// Creates a solver using the natural row and column order.
    pub fn new(problem: &Problem, feastol: f64) -> Self {
        Self {
            feastol,
            max_iterations: Self::DEFAULT_MAX_ITERATIONS,
            column_rank: (0..problem.num_variables()).collect(),
            row_order: (0..problem.num_constraints()).collect(),
        }
    }

    /// Shuffles the column priority order with the given seed. A zero seed
    /// keeps the natural order.
    pub fn with_lp_seed(mut self, seed: u64) -> Self {
        if seed != 0 {
            let mut order: Vec<usize> = (0..self.column_rank.len()).collect();
            order.shuffle(&mut engine_from_seed(seed));
            for (rank, &column) in order.iter().enumerate() {
                self.column_rank[column] = rank;
            }
        }
        self
    }

    /// Uses `order` as the row order of the tableau.
    ///
    /// `order` must be a permutation of the constraint indices.
    pub fn with_row_order(mut self, order: Vec<usize>) -> Self {
        debug_assert_eq!(order.len(), self.row_order.len());
        self.row_order = order;
        self
    }

    #[inline]
    pub fn with_max_iterations(mut self, max_iterations: u64) -> Self {
        self.max_iterations = max_iterations;
        self
    }

    #[inline]
    pub fn feastol(&self) -> f64 {
        self.feastol
    }

    /// Solves the relaxation of `problem` under the bounds `lower`/`upper`.
    #[inline]
    pub fn solve(
        &self,
        problem: &Problem,
        lower: &[f64],
        upper: &[f64],
    ) -> Result<LpOutcome, LpError> {
        self.solve_with_rows(problem, lower, upper, &[])
    }

    /// Solves the relaxation with the node-local rows `local` appended.
    pub fn solve_with_rows(
        &self,
        problem: &Problem,
        lower: &[f64],
        upper: &[f64],
        local: &[LocalRow],
    ) -> Result<LpOutcome, LpError> {
        let n = problem.num_variables();
        debug_assert_eq!(lower.len(), n);
        debug_assert_eq!(upper.len(), n);

        if (0..n).any(|j| lower[j] > upper[j] + self.feastol) {
            return Ok(LpOutcome::without_solution(LpStatus::Infeasible, 0));
        }

        let free: Vec<usize> = (0..n)
            .filter(|&j| upper[j] - lower[j] > self.feastol)
            .collect();
        let mut column_of = vec![usize::MAX; n];
        for (k, &j) in free.iter().enumerate() {
            column_of[j] = k;
        }

        let shifted = |terms: &[(VariableIndex, f64)], sense: ConstraintSense, rhs: f64| {
            let mut coefficients = vec![0.0; free.len()];
            let mut rhs = rhs;
            for &(var, a) in terms {
                let j = var.get();
                rhs -= a * lower[j];
                if column_of[j] != usize::MAX {
                    coefficients[column_of[j]] += a;
                }
            }
            RowSpec {
                coefficients,
                sense,
                rhs,
            }
        };

        let mut rows: Vec<RowSpec> =
            Vec::with_capacity(problem.num_constraints() + local.len() + free.len());
        for &i in &self.row_order {
            let constraint = &problem.constraints()[i];
            rows.push(shifted(
                constraint.coefficients(),
                constraint.sense(),
                constraint.rhs(),
            ));
        }
        for row in local {
            rows.push(shifted(&row.coefficients, row.sense, row.rhs));
        }
        for (k, &j) in free.iter().enumerate() {
            if upper[j].is_finite() {
                let mut coefficients = vec![0.0; free.len()];
                coefficients[k] = 1.0;
                rows.push(RowSpec {
                    coefficients,
                    sense: ConstraintSense::LessEqual,
                    rhs: upper[j] - lower[j],
                });
            }
        }

        // Rows without free columns are decided by their right-hand side alone.
        let mut kept = Vec::with_capacity(rows.len());
        for row in rows {
            if row.coefficients.iter().all(|a| a.abs() <= PIVOT_TOL) {
                let satisfied = match row.sense {
                    ConstraintSense::LessEqual => row.rhs >= -self.feastol,
                    ConstraintSense::GreaterEqual => row.rhs <= self.feastol,
                    ConstraintSense::Equal => row.rhs.abs() <= self.feastol,
                };
                if !satisfied {
                    return Ok(LpOutcome::without_solution(LpStatus::Infeasible, 0));
                }
            } else {
                kept.push(row.normalized());
            }
        }

        let sign = match problem.sense() {
            ObjectiveSense::Minimize => 1.0,
            ObjectiveSense::Maximize => -1.0,
        };
        let structural_cost: Vec<f64> = free
            .iter()
            .map(|&j| sign * problem.objective()[j])
            .collect();
        let structural_rank: Vec<usize> = free.iter().map(|&j| self.column_rank[j]).collect();

        let mut tableau = Tableau::build(&kept, &structural_rank, n);
        let mut iterations = 0u64;

        if tableau.num_artificial() > 0 {
            let phase1_cost = tableau.artificial_cost();
            let bounded = self.run(&mut tableau, &phase1_cost, true, &mut iterations)?;
            if !bounded {
                return Err(LpError::Numerical("phase 1 reported an unbounded ray"));
            }
            if tableau.objective(&phase1_cost) > self.feastol {
                return Ok(LpOutcome::without_solution(
                    LpStatus::Infeasible,
                    iterations,
                ));
            }
            tableau.drive_out_artificials();
        }

        let mut phase2_cost = vec![0.0; tableau.width - 1];
        phase2_cost[..free.len()].copy_from_slice(&structural_cost);
        if !self.run(&mut tableau, &phase2_cost, false, &mut iterations)? {
            return Ok(LpOutcome::without_solution(LpStatus::Unbounded, iterations));
        }

        let mut values = lower.to_vec();
        for (i, &basic) in tableau.basis.iter().enumerate() {
            if basic < free.len() {
                values[free[basic]] += tableau.rhs(i);
            }
        }
        for j in 0..n {
            if upper[j] >= lower[j] {
                values[j] = values[j].clamp(lower[j], upper[j]);
            }
            if !values[j].is_finite() {
                return Err(LpError::Numerical("non-finite primal value"));
            }
        }

        Ok(LpOutcome {
            status: LpStatus::Optimal,
            objective: problem.objective_value(&values),
            values,
            iterations,
        })
    }

    /// Runs primal simplex iterations until optimality or an unbounded ray.
    /// Returns `Ok(false)` if the objective is unbounded.
    fn run(
        &self,
        tableau: &mut Tableau,
        cost: &[f64],
        allow_artificial: bool,
        iterations: &mut u64,
    ) -> Result<bool, LpError> {
        let candidate_columns = if allow_artificial {
            tableau.width - 1
        } else {
            tableau.artificial_start
        };
        loop {
            let mut entering: Option<usize> = None;
            for j in 0..candidate_columns {
                if tableau.is_basic[j] {
                    continue;
                }
                if tableau.reduced_cost(cost, j) < -PIVOT_TOL
                    && entering.is_none_or(|e| tableau.rank[j] < tableau.rank[e])
                {
                    entering = Some(j);
                }
            }
            let Some(entering) = entering else {
                return Ok(true);
            };

            let mut leaving: Option<(usize, f64)> = None;
            for i in 0..tableau.basis.len() {
                let a = tableau.at(i, entering);
                if a <= PIVOT_TOL {
                    continue;
                }
                let ratio = tableau.rhs(i) / a;
                leaving = match leaving {
                    None => Some((i, ratio)),
                    Some((r, best)) => {
                        if ratio < best - RATIO_TOL
                            || ((ratio - best).abs() <= RATIO_TOL
                                && tableau.rank[tableau.basis[i]] < tableau.rank[tableau.basis[r]])
                        {
                            Some((i, ratio))
                        } else {
                            Some((r, best))
                        }
                    }
                };
            }
            let Some((row, _)) = leaving else {
                return Ok(false);
            };

            if *iterations >= self.max_iterations {
                return Err(LpError::IterationLimit {
                    limit: self.max_iterations,
                });
            }
            tableau.pivot(row, entering);
            *iterations += 1;
        }
    }
}

#[derive(Debug)]
struct RowSpec {
    coefficients: Vec<f64>,
    sense: ConstraintSense,
    rhs: f64,
}

impl RowSpec {
    /// Flips the row so the right-hand side is non-negative.
    fn normalized(mut self) -> Self {
        if self.rhs < 0.0 {
            self.rhs = -self.rhs;
            for a in &mut self.coefficients {
                *a = -*a;
            }
            self.sense = match self.sense {
                ConstraintSense::LessEqual => ConstraintSense::GreaterEqual,
                ConstraintSense::GreaterEqual => ConstraintSense::LessEqual,
                ConstraintSense::Equal => ConstraintSense::Equal,
            };
        }
        self
    }
}

/// Row-major dense tableau in `B^-1 A | B^-1 b` form.
#[derive(Debug)]
struct Tableau {
    data: Vec<f64>,
    width: usize,
    basis: Vec<usize>,
    is_basic: Vec<bool>,
    rank: Vec<usize>,
    artificial_start: usize,
}

impl Tableau {
    fn build(rows: &[RowSpec], structural_rank: &[usize], num_variables: usize) -> Self {
        let structural = structural_rank.len();
        let num_slack = rows
            .iter()
            .filter(|r| r.sense != ConstraintSense::Equal)
            .count();
        let num_artificial = rows
            .iter()
            .filter(|r| r.sense != ConstraintSense::LessEqual)
            .count();
        let artificial_start = structural + num_slack;
        let columns = artificial_start + num_artificial;
        let width = columns + 1;

        let mut rank = Vec::with_capacity(columns);
        rank.extend_from_slice(structural_rank);
        rank.extend((0..num_slack + num_artificial).map(|k| num_variables + k));

        let mut data = vec![0.0; rows.len() * width];
        let mut basis = Vec::with_capacity(rows.len());
        let (mut slack, mut artificial) = (structural, artificial_start);
        for (i, row) in rows.iter().enumerate() {
            let line = &mut data[i * width..(i + 1) * width];
            line[..structural].copy_from_slice(&row.coefficients);
            line[columns] = row.rhs;
            match row.sense {
                ConstraintSense::LessEqual => {
                    line[slack] = 1.0;
                    basis.push(slack);
                    slack += 1;
                }
                ConstraintSense::GreaterEqual => {
                    line[slack] = -1.0;
                    slack += 1;
                    line[artificial] = 1.0;
                    basis.push(artificial);
                    artificial += 1;
                }
                ConstraintSense::Equal => {
                    line[artificial] = 1.0;
                    basis.push(artificial);
                    artificial += 1;
                }
            }
        }

        let mut is_basic = vec![false; columns];
        for &b in &basis {
            is_basic[b] = true;
        }

        Self {
            data,
            width,
            basis,
            is_basic,
            rank,
            artificial_start,
        }
    }

    #[inline]
    fn num_artificial(&self) -> usize {
        self.width - 1 - self.artificial_start
    }

    fn artificial_cost(&self) -> Vec<f64> {
        let mut cost = vec![0.0; self.width - 1];
        for c in &mut cost[self.artificial_start..] {
            *c = 1.0;
        }
        cost
    }

    #[inline]
    fn at(&self, row: usize, column: usize) -> f64 {
        self.data[row * self.width + column]
    }

    #[inline]
    fn rhs(&self, row: usize) -> f64 {
        self.data[row * self.width + self.width - 1]
    }

    fn reduced_cost(&self, cost: &[f64], column: usize) -> f64 {
        let mut d = cost[column];
        for (i, &b) in self.basis.iter().enumerate() {
            let cb = cost[b];
            if cb != 0.0 {
                d -= cb * self.at(i, column);
            }
        }
        d
    }

    fn objective(&self, cost: &[f64]) -> f64 {
        self.basis
            .iter()
            .enumerate()
            .map(|(i, &b)| cost[b] * self.rhs(i))
            .sum()
    }

    fn pivot(&mut self, row: usize, column: usize) {
        let width = self.width;
        let pivot = self.at(row, column);
        for v in &mut self.data[row * width..(row + 1) * width] {
            *v /= pivot;
        }
        let pivot_row: Vec<f64> = self.data[row * width..(row + 1) * width].to_vec();
        for i in 0..self.basis.len() {
            if i == row {
                continue;
            }
            let factor = self.at(i, column);
            if factor == 0.0 {
                continue;
            }
            let line = &mut self.data[i * width..(i + 1) * width];
            for (v, p) in line.iter_mut().zip(&pivot_row) {
                *v -= factor * p;
            }
            line[column] = 0.0;
            if line[width - 1] < 0.0 && line[width - 1] > -RATIO_TOL {
                line[width - 1] = 0.0;
            }
        }
        self.is_basic[self.basis[row]] = false;
        self.is_basic[column] = true;
        self.basis[row] = column;
    }

    /// Pivots zero-valued artificial columns out of the basis where a
    /// non-artificial column can replace them. Rows where none can are
    /// redundant and keep their artificial at zero.
    fn drive_out_artificials(&mut self) {
        for i in 0..self.basis.len() {
            if self.basis[i] < self.artificial_start {
                continue;
            }
            let replacement = (0..self.artificial_start)
                .filter(|&j| !self.is_basic[j] && self.at(i, j).abs() > PIVOT_TOL)
                .min_by_key(|&j| self.rank[j]);
            if let Some(j) = replacement {
                self.pivot(i, j);
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rudder_model::problem::{ProblemBuilder, VariableKind};

    fn close(a: f64, b: f64) -> bool {
        (a - b).abs() < 1e-7
    }

    fn classic() -> Problem {
        // max 5x + 4y + 3z; optimum 13 at (2, 0, 1).
        let mut b = ProblemBuilder::new("classic");
        b.set_sense(ObjectiveSense::Maximize);
        let x = b
            .add_variable("x", VariableKind::Continuous, 5.0, 0.0, f64::INFINITY)
            .unwrap();
        let y = b
            .add_variable("y", VariableKind::Continuous, 4.0, 0.0, f64::INFINITY)
            .unwrap();
        let z = b
            .add_variable("z", VariableKind::Continuous, 3.0, 0.0, f64::INFINITY)
            .unwrap();
        b.add_constraint(
            "c1",
            [(x, 2.0), (y, 3.0), (z, 1.0)],
            ConstraintSense::LessEqual,
            5.0,
        )
        .unwrap();
        b.add_constraint(
            "c2",
            [(x, 4.0), (y, 1.0), (z, 2.0)],
            ConstraintSense::LessEqual,
            11.0,
        )
        .unwrap();
        b.add_constraint(
            "c3",
            [(x, 3.0), (y, 4.0), (z, 2.0)],
            ConstraintSense::LessEqual,
            8.0,
        )
        .unwrap();
        b.build()
    }

    fn solve(problem: &Problem) -> LpOutcome {
        LpSolver::new(problem, 1e-6)
            .solve(problem, problem.lower_bounds(), problem.upper_bounds())
            .unwrap()
    }

    #[test]
    fn test_classic_maximization() {
        let p = classic();
        let out = solve(&p);
        assert!(out.is_optimal());
        assert!(close(out.objective, 13.0), "{}", out.objective);
        assert!(close(out.values[0], 2.0));
        assert!(close(out.values[1], 0.0));
        assert!(close(out.values[2], 1.0));
        assert!(out.iterations > 0);
    }

    #[test]
    fn test_node_bounds_are_respected() {
        let p = classic();
        let lower = vec![0.0, 0.0, 0.0];
        let upper = vec![1.0, f64::INFINITY, f64::INFINITY];
        let out = LpSolver::new(&p, 1e-6).solve(&p, &lower, &upper).unwrap();
        assert!(out.is_optimal());
        assert!(out.values[0] <= 1.0 + 1e-9);
        assert!(p.is_feasible(&out.values, 1e-6));
    }

    #[test]
    fn test_equality_and_greater_equal_rows() {
        // min x + 2y s.t. x + y = 4, x - y >= 1, x <= 3.
        let mut b = ProblemBuilder::new("eq");
        let x = b
            .add_variable("x", VariableKind::Continuous, 1.0, 0.0, 3.0)
            .unwrap();
        let y = b
            .add_variable("y", VariableKind::Continuous, 2.0, 0.0, f64::INFINITY)
            .unwrap();
        b.add_constraint("sum", [(x, 1.0), (y, 1.0)], ConstraintSense::Equal, 4.0)
            .unwrap();
        b.add_constraint(
            "diff",
            [(x, 1.0), (y, -1.0)],
            ConstraintSense::GreaterEqual,
            1.0,
        )
        .unwrap();
        let p = b.build();
        let out = solve(&p);
        assert!(out.is_optimal());
        assert!(close(out.values[0], 3.0));
        assert!(close(out.values[1], 1.0));
        assert!(close(out.objective, 5.0));
    }

    #[test]
    fn test_infeasible_rows() {
        let mut b = ProblemBuilder::new("infeasible");
        let x = b
            .add_variable("x", VariableKind::Continuous, 1.0, 0.0, 10.0)
            .unwrap();
        b.add_constraint("lo", [(x, 1.0)], ConstraintSense::GreaterEqual, 5.0)
            .unwrap();
        b.add_constraint("hi", [(x, 1.0)], ConstraintSense::LessEqual, 3.0)
            .unwrap();
        let p = b.build();
        assert_eq!(solve(&p).status, LpStatus::Infeasible);
    }

    #[test]
    fn test_local_rows_cut_the_relaxation() {
        let p = classic();
        let lp = LpSolver::new(&p, 1e-6);
        let (x, z) = (VariableIndex::new(0), VariableIndex::new(2));
        let cap = LocalRow::sum(&[x, z], ConstraintSense::LessEqual, 2.0);
        let out = lp
            .solve_with_rows(&p, p.lower_bounds(), p.upper_bounds(), std::slice::from_ref(&cap))
            .unwrap();
        assert!(out.is_optimal());
        assert!(cap.is_satisfied(&out.values, 1e-6));
        assert!(p.is_feasible(&out.values, 1e-6));
        assert!(out.objective < 13.0 - 1e-6);

        // Every row of `classic` has coefficients of at least one.
        let vars = [x, VariableIndex::new(1), z];
        let floor = LocalRow::sum(&vars, ConstraintSense::GreaterEqual, 10.0);
        let out = lp
            .solve_with_rows(&p, p.lower_bounds(), p.upper_bounds(), &[floor])
            .unwrap();
        assert_eq!(out.status, LpStatus::Infeasible);
    }

    #[test]
    fn test_crossed_bounds_are_infeasible() {
        let p = classic();
        let out = LpSolver::new(&p, 1e-6)
            .solve(&p, &[2.0, 0.0, 0.0], &[1.0, 5.0, 5.0])
            .unwrap();
        assert_eq!(out.status, LpStatus::Infeasible);
        assert_eq!(out.iterations, 0);
    }

    #[test]
    fn test_unbounded() {
        let mut b = ProblemBuilder::new("unbounded");
        b.set_sense(ObjectiveSense::Maximize);
        let x = b
            .add_variable("x", VariableKind::Continuous, 1.0, 0.0, f64::INFINITY)
            .unwrap();
        let y = b
            .add_variable("y", VariableKind::Continuous, 0.0, 0.0, f64::INFINITY)
            .unwrap();
        b.add_constraint("c", [(x, 1.0), (y, -1.0)], ConstraintSense::LessEqual, 1.0)
            .unwrap();
        let p = b.build();
        assert_eq!(solve(&p).status, LpStatus::Unbounded);
    }

    #[test]
    fn test_fixed_variables_are_substituted() {
        let p = classic();
        let out = LpSolver::new(&p, 1e-6)
            .solve(&p, &[1.0, 0.0, 0.0], &[1.0, 0.0, f64::INFINITY])
            .unwrap();
        assert!(out.is_optimal());
        assert!(close(out.values[0], 1.0));
        assert!(close(out.values[1], 0.0));
        // 2 + z <= 5, 4 + 2z <= 11, 3 + 2z <= 8 -> z = 2.5
        assert!(close(out.values[2], 2.5));
        assert!(close(out.objective, 12.5));
    }

    #[test]
    fn test_iteration_limit() {
        let p = classic();
        let err = LpSolver::new(&p, 1e-6)
            .with_max_iterations(0)
            .solve(&p, p.lower_bounds(), p.upper_bounds())
            .unwrap_err();
        assert_eq!(err, LpError::IterationLimit { limit: 0 });
    }

    #[test]
    fn test_lp_seed_keeps_optimal_value() {
        let p = classic();
        for seed in [1u64, 7, 42] {
            let out = LpSolver::new(&p, 1e-6)
                .with_lp_seed(seed)
                .with_row_order(vec![2, 0, 1])
                .solve(&p, p.lower_bounds(), p.upper_bounds())
                .unwrap();
            assert!(close(out.objective, 13.0));
        }
    }
}
