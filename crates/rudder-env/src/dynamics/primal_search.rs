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

use crate::{
    control::{Decision, Resolution},
    dynamics::{Dynamics, DynamicsOutcome, ensure_suspended},
    error::EnvError,
    session::SolverSession,
};
use log::debug;
use rudder_bnb::{
    callback::{CallbackConfig, HeuristicSchedule, TrialResult},
    state::SolverState,
};
use rudder_model::index::VariableIndex;

/// Variables and the values to fix them to, position by position.
pub type PartialAssignment = (Vec<VariableIndex>, Vec<f64>);

/// Exposes the solver's primal heuristic decisions.
///
/// At every heuristic decision point the controller may try up to
/// `trials_per_node` partial assignments (`-1` for no limit). Each one fixes
/// the given variables, solves the relaxation of the rest and keeps the result
/// if it is an improving integral solution. An empty assignment spends a trial
/// without probing. The solve continues once the trials are exhausted or the
/// solver was asked to stop.
///
/// The heuristic fires at depths `depth_start, depth_start + depth_freq, ...`
/// up to `depth_stop` (`-1` for no bound).
#[derive(Debug, Clone)]
pub struct PrimalSearchDynamics {
    trials_per_node: i32,
    schedule: HeuristicSchedule,
    trials_spent: u32,
    last_node: Option<u64>,
    last_result: Option<TrialResult>,
}

impl PrimalSearchDynamics {
    /// # Errors
    ///
    /// Returns [`EnvError::InvalidArgument`] for `trials_per_node < -1`.
    pub fn new(
        trials_per_node: i32,
        depth_freq: i32,
        depth_start: i32,
        depth_stop: i32,
    ) -> Result<Self, EnvError> {
        if trials_per_node < -1 {
            return Err(EnvError::InvalidArgument(format!(
                "illegal number of trials per node: {trials_per_node}"
            )));
        }
        Ok(Self {
            trials_per_node,
            schedule: HeuristicSchedule::new(depth_freq, depth_start, depth_stop),
            trials_spent: 0,
            last_node: None,
            last_result: None,
        })
    }

    #[inline]
    pub fn trials_per_node(&self) -> i32 {
        self.trials_per_node
    }

    /// Trials spent at the current decision point.
    #[inline]
    pub fn trials_spent(&self) -> u32 {
        self.trials_spent
    }

    /// Outcome of the last probing trial at the current decision point.
    #[inline]
    pub fn last_result(&self) -> Option<TrialResult> {
        self.last_result
    }

    fn exhausts_trials(&self) -> bool {
        u32::try_from(self.trials_per_node)
            .is_ok_and(|limit| self.trials_spent.saturating_add(1) >= limit)
    }

    fn track(&mut self, state: &SolverState) {
        if self.last_node != Some(state.node_number) {
            self.trials_spent = 0;
            self.last_result = None;
            self.last_node = Some(state.node_number);
        }
    }

    fn outcome(
        &mut self,
        session: &SolverSession,
        done: bool,
    ) -> Result<DynamicsOutcome<Vec<VariableIndex>>, EnvError> {
        if done {
            return Ok((true, None));
        }
        let state = session.state()?;
        self.track(&state);
        Ok((false, Some(state.pseudo_candidates)))
    }
}

fn validate(action: &PartialAssignment, n_variables: usize) -> Result<(), EnvError> {
    let (vars, values) = action;
    if vars.len() != values.len() {
        return Err(EnvError::InvalidAction(format!(
            "{} variable indices for {} values",
            vars.len(),
            values.len()
        )));
    }
    if let Some(var) = vars.iter().find(|var| var.get() >= n_variables) {
        return Err(EnvError::InvalidAction(format!(
            "variable index {var} is out of range"
        )));
    }
    if let Some(value) = values.iter().find(|value| !value.is_finite()) {
        return Err(EnvError::InvalidAction(format!("non-finite value {value}")));
    }
    Ok(())
}

impl Dynamics for PrimalSearchDynamics {
    type Action = PartialAssignment;
    type ActionSet = Vec<VariableIndex>;

    fn reset_dynamics(
        &mut self,
        session: &mut SolverSession,
    ) -> Result<DynamicsOutcome<Self::ActionSet>, EnvError> {
        self.trials_spent = 0;
        self.last_node = None;
        self.last_result = None;
        if self.trials_per_node == 0 {
            session.solve()?;
            return Ok((true, None));
        }
        let done = session.start(CallbackConfig::heuristic(self.schedule))?;
        self.outcome(session, done)
    }

    fn step_dynamics(
        &mut self,
        session: &mut SolverSession,
        action: Self::Action,
    ) -> Result<DynamicsOutcome<Self::ActionSet>, EnvError> {
        ensure_suspended(session)?;
        let state = session.state()?;
        validate(&action, state.lp_values.len())?;

        let exhausted = self.exhausts_trials();
        let (vars, values) = action;
        let decision = Decision::act(move |ctx| {
            if !vars.is_empty() {
                let assignment: Vec<_> = vars.into_iter().zip(values).collect();
                ctx.try_assignment(&assignment)?;
            }
            if exhausted || ctx.is_stopped() {
                Ok(Resolution::Return(ctx.heuristic_result()))
            } else {
                Ok(Resolution::Hold)
            }
        });

        let done = session.resume(decision)?;
        let trial = if done {
            None
        } else {
            session.state()?.last_trial
        };
        self.trials_spent = self.trials_spent.saturating_add(1);
        debug!(
            target: "rudder_env::dynamics",
            spent = self.trials_spent;
            "primal search trial {trial:?}"
        );
        let outcome = self.outcome(session, done)?;
        if !done && self.last_node == Some(state.node_number) {
            self.last_result = trial;
        }
        Ok(outcome)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::dynamics::test_problems::knapsack;
    use rudder_bnb::result::SolveStatus;

    #[test]
    fn test_negative_trials_rejected() {
        assert!(matches!(
            PrimalSearchDynamics::new(-2, 1, 0, -1),
            Err(EnvError::InvalidArgument(_))
        ));
        assert!(PrimalSearchDynamics::new(-1, 1, 0, -1).is_ok());
    }

    #[test]
    fn test_zero_trials_solves_in_reset() {
        let mut dynamics = PrimalSearchDynamics::new(0, 1, 0, -1).unwrap();
        let mut session = SolverSession::new(knapsack());
        assert_eq!(dynamics.reset_dynamics(&mut session).unwrap(), (true, None));
        assert_eq!(session.model().unwrap().status(), SolveStatus::Optimal);
    }

    #[test]
    fn test_trials_are_counted_per_node() {
        let mut dynamics = PrimalSearchDynamics::new(2, 1, 0, -1).unwrap();
        let mut session = SolverSession::new(knapsack());
        let (done, set) = dynamics.reset_dynamics(&mut session).unwrap();
        assert!(!done);
        assert_eq!(set.unwrap().len(), 4);
        let root = session.state().unwrap().node_number;

        // Fixing a and c to one and b to zero leaves d at 3.5 / 4.
        let action = (
            vec![VariableIndex::new(0), VariableIndex::new(1), VariableIndex::new(2)],
            vec![1.0, 0.0, 1.0],
        );
        let (done, _) = dynamics.step_dynamics(&mut session, action).unwrap();
        assert!(!done);
        assert_eq!(session.state().unwrap().node_number, root);
        assert_eq!(dynamics.trials_spent(), 1);
        assert_eq!(dynamics.last_result(), Some(TrialResult::Fractional));

        // The second trial exhausts the node; the solve moves on.
        let action = (
            vec![VariableIndex::new(0), VariableIndex::new(2), VariableIndex::new(3)],
            vec![1.0, 1.0, 0.0],
        );
        let (done, _) = dynamics.step_dynamics(&mut session, action).unwrap();
        if !done {
            assert_ne!(session.state().unwrap().node_number, root);
            assert_eq!(dynamics.trials_spent(), 0);
        }
    }

    #[test]
    fn test_mismatched_action_is_invalid() {
        let mut dynamics = PrimalSearchDynamics::new(1, 1, 0, -1).unwrap();
        let mut session = SolverSession::new(knapsack());
        dynamics.reset_dynamics(&mut session).unwrap();
        let err = dynamics
            .step_dynamics(&mut session, (vec![VariableIndex::new(0)], vec![]))
            .unwrap_err();
        assert!(matches!(err, EnvError::InvalidAction(_)));
        let err = dynamics
            .step_dynamics(&mut session, (vec![VariableIndex::new(9)], vec![1.0]))
            .unwrap_err();
        assert!(matches!(err, EnvError::InvalidAction(_)));
    }

    #[test]
    fn test_empty_actions_run_to_completion() {
        let mut dynamics = PrimalSearchDynamics::new(1, 1, 0, -1).unwrap();
        let mut session = SolverSession::new(knapsack());
        let (mut done, _) = dynamics.reset_dynamics(&mut session).unwrap();
        while !done {
            (done, _) = dynamics
                .step_dynamics(&mut session, (Vec::new(), Vec::new()))
                .unwrap();
        }
        assert_eq!(session.model().unwrap().status(), SolveStatus::Optimal);
    }
}
