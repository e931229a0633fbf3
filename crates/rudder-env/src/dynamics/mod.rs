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

//! # Dynamics
//!
//! A [`Dynamics`] decides what an episode is about: which decision points of
//! the solve are exposed, which actions are legal at each of them and how an
//! action is carried out on the solver.
//!
//! Every dynamics works on a [`SolverSession`]. Those that expose decision
//! points start a controlled solve in [`Dynamics::reset_dynamics`] and resume
//! it in [`Dynamics::step_dynamics`]; the others act on the idle model.
//!
//! | dynamics                  | action                        | action set              |
//! |---------------------------|-------------------------------|-------------------------|
//! | [`BranchingDynamics`]     | variable to branch on         | branching candidates    |
//! | [`BranchingSumDynamics`]  | variables whose sum to branch on | branching candidates |
//! | [`ConfiguringDynamics`]   | parameter values              | none                    |
//! | [`PrimalSearchDynamics`]  | partial assignment to try     | unfixed integral variables |

mod branching;
mod branching_sum;
mod configuring;
mod primal_search;

pub use branching::{BranchAction, BranchingDynamics};
pub use branching_sum::BranchingSumDynamics;
pub use configuring::{Configuration, ConfiguringDynamics};
pub use primal_search::{PartialAssignment, PrimalSearchDynamics};

use crate::{error::EnvError, session::SolverSession};
use rand::Rng;
use rudder_bnb::model::Model;
use rudder_core::random::RandomEngine;
use rudder_model::param::ParamValue;

/// Smallest seed drawn for the solver's randomization parameters.
pub const MIN_SOLVER_SEED: i32 = 1;
/// Largest seed drawn for the solver's randomization parameters.
pub const MAX_SOLVER_SEED: i32 = i32::MAX;

/// The result of resetting or stepping a dynamics: whether the episode is
/// over and, if not, the legal actions.
pub type DynamicsOutcome<A> = (bool, Option<A>);

/// The task-specific part of an environment.
pub trait Dynamics {
    type Action;
    type ActionSet: Clone;

    /// Randomizes `model` for a new episode.
    ///
    /// The default enables variable and constraint permutation and draws the
    /// solver seeds from `rng`.
    fn set_random_state(
        &mut self,
        model: &mut Model,
        rng: &mut RandomEngine,
    ) -> Result<(), EnvError> {
        set_default_random_state(model, rng)
    }

    /// Starts an episode on the session's idle model.
    fn reset_dynamics(
        &mut self,
        session: &mut SolverSession,
    ) -> Result<DynamicsOutcome<Self::ActionSet>, EnvError>;

    /// Carries out `action` and advances to the next decision.
    fn step_dynamics(
        &mut self,
        session: &mut SolverSession,
        action: Self::Action,
    ) -> Result<DynamicsOutcome<Self::ActionSet>, EnvError>;
}

/// Turns permutation on and draws permutation, random shift and LP seeds
/// uniformly from `[MIN_SOLVER_SEED, MAX_SOLVER_SEED]`.
pub fn set_default_random_state(model: &mut Model, rng: &mut RandomEngine) -> Result<(), EnvError> {
    let mut seed = || rng.random_range(MIN_SOLVER_SEED..=MAX_SOLVER_SEED);
    let values: [(&str, ParamValue); 5] = [
        ("randomization/permutevars", true.into()),
        ("randomization/permuteconss", true.into()),
        ("randomization/permutationseed", seed().into()),
        ("randomization/randomseedshift", seed().into()),
        ("randomization/lpseed", seed().into()),
    ];
    model.set_params(values)?;
    Ok(())
}

/// Fails unless `session` has a suspended controlled solve.
pub(crate) fn ensure_suspended(session: &SolverSession) -> Result<(), EnvError> {
    if session.is_suspended() {
        Ok(())
    } else {
        Err(EnvError::Sequencing(
            "the solver is not suspended at a decision point".to_owned(),
        ))
    }
}

#[cfg(test)]
pub(crate) mod test_problems {
    use rudder_bnb::model::Model;
    use rudder_model::problem::{ConstraintSense, ObjectiveSense, ProblemBuilder, VariableKind};

    /// A knapsack whose root relaxation is fractional.
    pub fn knapsack() -> Model {
        let mut b = ProblemBuilder::new("knapsack");
        b.set_sense(ObjectiveSense::Maximize);
        let items = [(5.0, 2.0), (4.0, 3.0), (3.0, 1.0), (7.0, 4.0)];
        let mut row = Vec::new();
        for (i, (profit, weight)) in items.into_iter().enumerate() {
            let v = b
                .add_variable(format!("x{i}"), VariableKind::Binary, profit, 0.0, 1.0)
                .unwrap();
            row.push((v, weight));
        }
        b.add_constraint("capacity", row, ConstraintSense::LessEqual, 6.5)
            .unwrap();
        Model::from_problem(b.build())
    }

    /// Two integer variables whose root LP values are 1.5 and 0.5.
    pub fn two_fractional() -> Model {
        let mut b = ProblemBuilder::new("two-fractional");
        b.set_sense(ObjectiveSense::Maximize);
        let x = b
            .add_variable("x", VariableKind::Integer, 1.0, 0.0, 3.0)
            .unwrap();
        let y = b
            .add_variable("y", VariableKind::Integer, 1.0, 0.0, 3.0)
            .unwrap();
        b.add_constraint("x-cap", [(x, 1.0)], ConstraintSense::LessEqual, 1.5)
            .unwrap();
        b.add_constraint("y-cap", [(y, 1.0)], ConstraintSense::LessEqual, 0.5)
            .unwrap();
        Model::from_problem(b.build())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rudder_core::random::engine_from_seed;

    #[test]
    fn test_default_random_state_is_reproducible() {
        let mut a = test_problems::knapsack();
        let mut b = test_problems::knapsack();
        set_default_random_state(&mut a, &mut engine_from_seed(5)).unwrap();
        set_default_random_state(&mut b, &mut engine_from_seed(5)).unwrap();
        for name in [
            "randomization/permutationseed",
            "randomization/randomseedshift",
            "randomization/lpseed",
        ] {
            let value = a.get_param(name).unwrap();
            assert_eq!(value, b.get_param(name).unwrap());
            assert!(matches!(value, ParamValue::Int(v) if v >= MIN_SOLVER_SEED));
        }
        assert_eq!(
            a.get_param("randomization/permutevars").unwrap(),
            ParamValue::Bool(true)
        );
    }

    #[test]
    fn test_default_random_state_differs_between_seeds() {
        let mut a = test_problems::knapsack();
        let mut b = test_problems::knapsack();
        set_default_random_state(&mut a, &mut engine_from_seed(1)).unwrap();
        set_default_random_state(&mut b, &mut engine_from_seed(2)).unwrap();
        assert_ne!(
            a.get_param("randomization/lpseed").unwrap(),
            b.get_param("randomization/lpseed").unwrap()
        );
    }
}
