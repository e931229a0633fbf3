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

//! Mixed-integer linear problem formulation.
//!
//! A [`Problem`] is immutable once built. Variable data lives in parallel
//! vectors indexed by [`VariableIndex`]; constraints are sparse rows indexed
//! by [`ConstraintIndex`]. All construction goes through [`ProblemBuilder`],
//! which rejects duplicate names, empty domains, infinite lower bounds,
//! non-finite coefficients and dangling variable references.

use crate::index::{ConstraintIndex, VariableIndex};
use fixedbitset::FixedBitSet;
use rudder_core::tolerance::{is_integral, is_le};
use rustc_hash::FxHashMap;

/// The domain type of a variable.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum VariableKind {
    Binary,
    Integer,
    Continuous,
}

impl VariableKind {
    /// Whether values of this kind must be integral.
    #[inline]
    pub fn is_integral(self) -> bool {
        !matches!(self, VariableKind::Continuous)
    }
}

impl std::fmt::Display for VariableKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            VariableKind::Binary => write!(f, "binary"),
            VariableKind::Integer => write!(f, "integer"),
            VariableKind::Continuous => write!(f, "continuous"),
        }
    }
}

/// Direction of optimization.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Default)]
pub enum ObjectiveSense {
    #[default]
    Minimize,
    Maximize,
}

impl ObjectiveSense {
    /// Whether `candidate` is strictly better than `reference` by more than `tol`.
    #[inline]
    pub fn is_better(self, candidate: f64, reference: f64, tol: f64) -> bool {
        match self {
            ObjectiveSense::Minimize => candidate < reference - tol,
            ObjectiveSense::Maximize => candidate > reference + tol,
        }
    }

    /// The worst possible objective value in this direction.
    #[inline]
    pub fn worst_value(self) -> f64 {
        match self {
            ObjectiveSense::Minimize => f64::INFINITY,
            ObjectiveSense::Maximize => f64::NEG_INFINITY,
        }
    }
}

impl std::fmt::Display for ObjectiveSense {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ObjectiveSense::Minimize => write!(f, "minimize"),
            ObjectiveSense::Maximize => write!(f, "maximize"),
        }
    }
}

/// Relation between a row activity and its right-hand side.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum ConstraintSense {
    LessEqual,
    GreaterEqual,
    Equal,
}

impl std::fmt::Display for ConstraintSense {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ConstraintSense::LessEqual => write!(f, "<="),
            ConstraintSense::GreaterEqual => write!(f, ">="),
            ConstraintSense::Equal => write!(f, "="),
        }
    }
}

/// A sparse linear constraint `sum(a_j * x_j) (sense) rhs`.
#[derive(Clone, Debug, PartialEq)]
pub struct Constraint {
    name: String,
    coefficients: Vec<(VariableIndex, f64)>,
    sense: ConstraintSense,
    rhs: f64,
}

impl Constraint {
    #[inline]
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Nonzero entries ordered by variable index, without duplicates.
    #[inline]
    pub fn coefficients(&self) -> &[(VariableIndex, f64)] {
        &self.coefficients
    }

    #[inline]
    pub fn sense(&self) -> ConstraintSense {
        self.sense
    }

    #[inline]
    pub fn rhs(&self) -> f64 {
        self.rhs
    }

    /// Evaluates the row activity for a dense assignment.
    #[inline]
    pub fn activity(&self, values: &[f64]) -> f64 {
        self.coefficients
            .iter()
            .map(|(var, coef)| coef * values[var.get()])
            .sum()
    }

    /// Amount by which `values` violates this row, zero when satisfied.
    pub fn violation(&self, values: &[f64]) -> f64 {
        let activity = self.activity(values);
        match self.sense {
            ConstraintSense::LessEqual => (activity - self.rhs).max(0.0),
            ConstraintSense::GreaterEqual => (self.rhs - activity).max(0.0),
            ConstraintSense::Equal => (activity - self.rhs).abs(),
        }
    }
}

/// Errors raised while assembling a [`Problem`].
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum ProblemError {
    #[error("variable name '{0}' is used twice")]
    DuplicateVariable(String),
    #[error("constraint name '{0}' is used twice")]
    DuplicateConstraint(String),
    #[error("variable '{name}' has an empty domain [{lower}, {upper}]")]
    EmptyDomain { name: String, lower: f64, upper: f64 },
    #[error("variable '{0}' needs a finite lower bound")]
    InfiniteLowerBound(String),
    #[error("non-finite coefficient {value} in '{context}'")]
    NonFiniteCoefficient { context: String, value: f64 },
    #[error("constraint '{constraint}' references unknown {variable}")]
    UnknownVariable {
        constraint: String,
        variable: VariableIndex,
    },
}

/// An immutable mixed-integer linear program.
#[derive(Clone, Debug)]
pub struct Problem {
    name: String,
    sense: ObjectiveSense,
    variable_names: Vec<String>,
    variable_kinds: Vec<VariableKind>,
    objective: Vec<f64>,
    lower_bounds: Vec<f64>,
    upper_bounds: Vec<f64>,
    integral: FixedBitSet,
    constraints: Vec<Constraint>,
    lookup: FxHashMap<String, VariableIndex>,
}

impl Problem {
    #[inline]
    pub fn name(&self) -> &str {
        &self.name
    }

    #[inline]
    pub fn sense(&self) -> ObjectiveSense {
        self.sense
    }

    #[inline]
    pub fn num_variables(&self) -> usize {
        self.variable_names.len()
    }

    #[inline]
    pub fn num_constraints(&self) -> usize {
        self.constraints.len()
    }

    /// Number of binary and general integer variables.
    #[inline]
    pub fn num_integral_variables(&self) -> usize {
        self.integral.count_ones(..)
    }

    #[inline]
    pub fn variable_name(&self, var: VariableIndex) -> &str {
        &self.variable_names[var.get()]
    }

    #[inline]
    pub fn variable_kind(&self, var: VariableIndex) -> VariableKind {
        self.variable_kinds[var.get()]
    }

    #[inline]
    pub fn is_integral(&self, var: VariableIndex) -> bool {
        self.integral.contains(var.get())
    }

    /// Bit set of the integral variables.
    #[inline]
    pub fn integral_mask(&self) -> &FixedBitSet {
        &self.integral
    }

    #[inline]
    pub fn objective_coefficient(&self, var: VariableIndex) -> f64 {
        self.objective[var.get()]
    }

    #[inline]
    pub fn objective(&self) -> &[f64] {
        &self.objective
    }

    #[inline]
    pub fn lower_bounds(&self) -> &[f64] {
        &self.lower_bounds
    }

    #[inline]
    pub fn upper_bounds(&self) -> &[f64] {
        &self.upper_bounds
    }

    #[inline]
    pub fn constraints(&self) -> &[Constraint] {
        &self.constraints
    }

    #[inline]
    pub fn constraint(&self, index: ConstraintIndex) -> &Constraint {
        &self.constraints[index.get()]
    }

    /// Looks a variable up by its name.
    #[inline]
    pub fn variable_by_name(&self, name: &str) -> Option<VariableIndex> {
        self.lookup.get(name).copied()
    }

    /// Iterates over all variable indices.
    #[inline]
    pub fn variables(&self) -> impl ExactSizeIterator<Item = VariableIndex> + DoubleEndedIterator {
        VariableIndex::range(self.num_variables())
    }

    /// Objective value of a dense assignment.
    pub fn objective_value(&self, values: &[f64]) -> f64 {
        debug_assert_eq!(
            values.len(),
            self.num_variables(),
            "called `Problem::objective_value` with {} values for {} variables",
            values.len(),
            self.num_variables()
        );
        self.objective.iter().zip(values).map(|(c, x)| c * x).sum()
    }

    /// Whether a dense assignment satisfies bounds, integrality and every row within `tol`.
    pub fn is_feasible(&self, values: &[f64], tol: f64) -> bool {
        if values.len() != self.num_variables() {
            return false;
        }
        let within_bounds = values.iter().enumerate().all(|(j, &x)| {
            is_le(self.lower_bounds[j], x, tol) && is_le(x, self.upper_bounds[j], tol)
        });
        let integral = self.integral.ones().all(|j| is_integral(values[j], tol));
        within_bounds
            && integral
            && self
                .constraints
                .iter()
                .all(|row| row.violation(values) <= tol)
    }
}

impl std::fmt::Display for Problem {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        writeln!(f, "Problem '{}' ({})", self.name, self.sense)?;
        writeln!(
            f,
            "   Variables:   {} ({} integral)",
            self.num_variables(),
            self.num_integral_variables()
        )?;
        write!(f, "   Constraints: {}", self.num_constraints())
    }
}

/// Incrementally assembles a [`Problem`].
#[derive(Clone, Debug, Default)]
pub struct ProblemBuilder {
    name: String,
    sense: ObjectiveSense,
    variable_names: Vec<String>,
    variable_kinds: Vec<VariableKind>,
    objective: Vec<f64>,
    lower_bounds: Vec<f64>,
    upper_bounds: Vec<f64>,
    constraints: Vec<Constraint>,
    lookup: FxHashMap<String, VariableIndex>,
    constraint_names: FxHashMap<String, ConstraintIndex>,
}

impl ProblemBuilder {
    /// Creates an empty minimization problem called `name`.
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            ..Self::default()
        }
    }

    #[inline]
    pub fn set_name(&mut self, name: impl Into<String>) -> &mut Self {
        self.name = name.into();
        self
    }

    #[inline]
    pub fn set_sense(&mut self, sense: ObjectiveSense) -> &mut Self {
        self.sense = sense;
        self
    }

    #[inline]
    pub fn num_variables(&self) -> usize {
        self.variable_names.len()
    }

    /// Looks up a variable added earlier.
    #[inline]
    pub fn variable_by_name(&self, name: &str) -> Option<VariableIndex> {
        self.lookup.get(name).copied()
    }

    /// Adds a variable and returns its index.
    ///
    /// Binary variables have their bounds intersected with `[0, 1]`; integral
    /// bounds are rounded inwards.
    pub fn add_variable(
        &mut self,
        name: impl Into<String>,
        kind: VariableKind,
        objective: f64,
        lower: f64,
        upper: f64,
    ) -> Result<VariableIndex, ProblemError> {
        let name = name.into();
        if self.lookup.contains_key(&name) {
            return Err(ProblemError::DuplicateVariable(name));
        }
        if !objective.is_finite() {
            return Err(ProblemError::NonFiniteCoefficient {
                context: name,
                value: objective,
            });
        }
        if !lower.is_finite() {
            return Err(ProblemError::InfiniteLowerBound(name));
        }

        let (mut lower, mut upper) = (lower, upper);
        if kind == VariableKind::Binary {
            lower = lower.max(0.0);
            upper = upper.min(1.0);
        }
        if kind.is_integral() {
            lower = lower.ceil();
            if upper.is_finite() {
                upper = upper.floor();
            }
        }
        if lower > upper || upper.is_nan() {
            return Err(ProblemError::EmptyDomain { name, lower, upper });
        }

        let index = VariableIndex::new(self.variable_names.len());
        self.lookup.insert(name.clone(), index);
        self.variable_names.push(name);
        self.variable_kinds.push(kind);
        self.objective.push(objective);
        self.lower_bounds.push(lower);
        self.upper_bounds.push(upper);
        Ok(index)
    }

    /// Adds a constraint and returns its index.
    ///
    /// Repeated entries for the same variable are summed; zero entries are dropped.
    pub fn add_constraint(
        &mut self,
        name: impl Into<String>,
        coefficients: impl IntoIterator<Item = (VariableIndex, f64)>,
        sense: ConstraintSense,
        rhs: f64,
    ) -> Result<ConstraintIndex, ProblemError> {
        let name = name.into();
        if self.constraint_names.contains_key(&name) {
            return Err(ProblemError::DuplicateConstraint(name));
        }
        if !rhs.is_finite() {
            return Err(ProblemError::NonFiniteCoefficient {
                context: name,
                value: rhs,
            });
        }

        let mut entries: Vec<(VariableIndex, f64)> = Vec::new();
        for (var, coef) in coefficients {
            if var.get() >= self.variable_names.len() {
                return Err(ProblemError::UnknownVariable {
                    constraint: name,
                    variable: var,
                });
            }
            if !coef.is_finite() {
                return Err(ProblemError::NonFiniteCoefficient {
                    context: name,
                    value: coef,
                });
            }
            entries.push((var, coef));
        }
        entries.sort_by_key(|(var, _)| *var);
        let mut merged: Vec<(VariableIndex, f64)> = Vec::with_capacity(entries.len());
        for (var, coef) in entries {
            match merged.last_mut() {
                Some((last, acc)) if *last == var => *acc += coef,
                _ => merged.push((var, coef)),
            }
        }
        merged.retain(|(_, coef)| *coef != 0.0);

        let index = ConstraintIndex::new(self.constraints.len());
        self.constraint_names.insert(name.clone(), index);
        self.constraints.push(Constraint {
            name,
            coefficients: merged,
            sense,
            rhs,
        });
        Ok(index)
    }

    /// Finalizes the problem.
    pub fn build(self) -> Problem {
        let mut integral = FixedBitSet::with_capacity(self.variable_kinds.len());
        for (j, kind) in self.variable_kinds.iter().enumerate() {
            integral.set(j, kind.is_integral());
        }
        Problem {
            name: self.name,
            sense: self.sense,
            variable_names: self.variable_names,
            variable_kinds: self.variable_kinds,
            objective: self.objective,
            lower_bounds: self.lower_bounds,
            upper_bounds: self.upper_bounds,
            integral,
            constraints: self.constraints,
            lookup: self.lookup,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn knapsack() -> Problem {
        let mut b = ProblemBuilder::new("knapsack");
        b.set_sense(ObjectiveSense::Maximize);
        let x = b
            .add_variable("x", VariableKind::Binary, 5.0, 0.0, 1.0)
            .unwrap();
        let y = b
            .add_variable("y", VariableKind::Integer, 4.0, 0.0, 3.0)
            .unwrap();
        let z = b
            .add_variable("z", VariableKind::Continuous, 1.0, 0.0, f64::INFINITY)
            .unwrap();
        b.add_constraint(
            "cap",
            [(x, 2.0), (y, 3.0), (z, 1.0)],
            ConstraintSense::LessEqual,
            7.5,
        )
        .unwrap();
        b.build()
    }

    #[test]
    fn test_builder_records_dimensions_and_kinds() {
        let p = knapsack();
        assert_eq!(p.name(), "knapsack");
        assert_eq!(p.num_variables(), 3);
        assert_eq!(p.num_constraints(), 1);
        assert_eq!(p.num_integral_variables(), 2);
        assert!(p.is_integral(VariableIndex::new(0)));
        assert!(!p.is_integral(VariableIndex::new(2)));
        assert_eq!(p.variable_by_name("y"), Some(VariableIndex::new(1)));
        assert_eq!(p.variable_by_name("w"), None);
    }

    #[test]
    fn test_duplicate_variable_is_rejected() {
        let mut b = ProblemBuilder::new("p");
        b.add_variable("x", VariableKind::Integer, 0.0, 0.0, 1.0)
            .unwrap();
        let err = b
            .add_variable("x", VariableKind::Integer, 0.0, 0.0, 1.0)
            .unwrap_err();
        assert_eq!(err, ProblemError::DuplicateVariable("x".into()));
    }

    #[test]
    fn test_integer_bounds_are_rounded_inwards() {
        let mut b = ProblemBuilder::new("p");
        b.add_variable("x", VariableKind::Integer, 0.0, 0.5, 3.7)
            .unwrap();
        let p = b.build();
        assert_eq!(p.lower_bounds(), &[1.0]);
        assert_eq!(p.upper_bounds(), &[3.0]);
    }

    #[test]
    fn test_empty_domain_and_infinite_lower_bound() {
        let mut b = ProblemBuilder::new("p");
        assert!(matches!(
            b.add_variable("x", VariableKind::Integer, 0.0, 0.2, 0.8),
            Err(ProblemError::EmptyDomain { .. })
        ));
        assert!(matches!(
            b.add_variable("y", VariableKind::Continuous, 0.0, f64::NEG_INFINITY, 0.0),
            Err(ProblemError::InfiniteLowerBound(_))
        ));
    }

    #[test]
    fn test_constraint_entries_are_merged_and_validated() {
        let mut b = ProblemBuilder::new("p");
        let x = b
            .add_variable("x", VariableKind::Continuous, 0.0, 0.0, 1.0)
            .unwrap();
        let c = b
            .add_constraint(
                "row",
                [(x, 1.0), (x, 2.0)],
                ConstraintSense::GreaterEqual,
                1.0,
            )
            .unwrap();
        let err = b
            .add_constraint(
                "bad",
                [(VariableIndex::new(5), 1.0)],
                ConstraintSense::Equal,
                0.0,
            )
            .unwrap_err();
        assert!(matches!(err, ProblemError::UnknownVariable { .. }));

        let p = b.build();
        assert_eq!(p.constraint(c).coefficients(), &[(x, 3.0)]);
    }

    #[test]
    fn test_feasibility_and_objective() {
        let p = knapsack();
        assert!(p.is_feasible(&[1.0, 1.0, 2.5], 1e-6));
        assert!(!p.is_feasible(&[1.0, 2.0, 0.0], 1e-6), "row violated");
        assert!(!p.is_feasible(&[1.0, 0.5, 0.0], 1e-6), "fractional integer");
        assert_eq!(p.objective_value(&[1.0, 1.0, 2.5]), 11.5);
    }

    #[test]
    fn test_sense_comparison() {
        assert!(ObjectiveSense::Minimize.is_better(1.0, 2.0, 1e-9));
        assert!(ObjectiveSense::Maximize.is_better(2.0, 1.0, 1e-9));
        assert!(!ObjectiveSense::Maximize.is_better(1.0, 1.0, 1e-9));
        assert_eq!(ObjectiveSense::Minimize.worst_value(), f64::INFINITY);
    }
}
