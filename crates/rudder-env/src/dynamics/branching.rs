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
    control::Decision,
    dynamics::{Dynamics, DynamicsOutcome, ensure_suspended, set_default_random_state},
    error::EnvError,
    session::SolverSession,
};
use log::debug;
use rand::Rng;
use rudder_bnb::{
    callback::{CallbackConfig, CallbackResult},
    model::Model,
    state::SolverState,
};
use rudder_core::{
    random::{RandomEngine, engine_from_seed},
    sampling::arg_choice,
    tolerance::fractionality,
};
use rudder_model::index::VariableIndex;

/// What to branch on at a branching decision point.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum BranchAction {
    Variable(VariableIndex),
    /// Let the solver's own rule choose.
    SolverDefault,
}

impl From<VariableIndex> for BranchAction {
    #[inline]
    fn from(var: VariableIndex) -> Self {
        BranchAction::Variable(var)
    }
}

/// Exposes every branching decision of the solve.
///
/// The action set holds the branching candidates at the current node: the
/// integral variables with a fractional LP value, or with `pseudo_candidates`
/// every integral variable not fixed at the node. With a candidate limit, at
/// most `k` of them are offered, sampled without replacement with weights
/// equal to their LP fractionality.
#[derive(Debug, Clone)]
pub struct BranchingDynamics {
    pseudo_candidates: bool,
    candidate_limit: Option<usize>,
    rng: RandomEngine,
    action_set: Option<Vec<VariableIndex>>,
}

impl Default for BranchingDynamics {
    fn default() -> Self {
        Self::new(false)
    }
}

impl BranchingDynamics {
    pub fn new(pseudo_candidates: bool) -> Self {
        Self {
            pseudo_candidates,
            candidate_limit: None,
            rng: engine_from_seed(0),
            action_set: None,
        }
    }

    /// Offers at most `k` candidates per decision.
    ///
    /// # Errors
    ///
    /// Returns [`EnvError::InvalidArgument`] for `k == 0`.
    pub fn with_candidate_limit(mut self, k: usize) -> Result<Self, EnvError> {
        if k == 0 {
            return Err(EnvError::InvalidArgument(
                "candidate limit must be positive".to_owned(),
            ));
        }
        self.candidate_limit = Some(k);
        Ok(self)
    }

    #[inline]
    pub fn pseudo_candidates(&self) -> bool {
        self.pseudo_candidates
    }

    /// The action set returned by the last reset or step.
    #[inline]
    pub fn action_set(&self) -> Option<&[VariableIndex]> {
        self.action_set.as_deref()
    }

    fn candidates(&mut self, state: &SolverState) -> Result<Vec<VariableIndex>, EnvError> {
        let (candidates, weights): (&[VariableIndex], Vec<f64>) = if self.pseudo_candidates {
            let weights = state
                .pseudo_candidates
                .iter()
                .map(|var| {
                    state
                        .lp_values
                        .get(var.get())
                        .map_or(0.0, |&value| fractionality(value))
                })
                .collect();
            (state.pseudo_candidates.as_slice(), weights)
        } else {
            (
                state.lp_candidates.as_slice(),
                state.lp_candidate_fractionalities.clone(),
            )
        };

        match self.candidate_limit {
            Some(k) if k < candidates.len() => {
                let mut picked = arg_choice(k, &weights, &mut self.rng)
                    .map_err(|e| EnvError::InvalidArgument(e.to_string()))?;
                picked.sort_unstable();
                Ok(picked.into_iter().map(|i| candidates[i]).collect())
            }
            _ => Ok(candidates.to_vec()),
        }
    }

    fn outcome(
        &mut self,
        session: &SolverSession,
        done: bool,
    ) -> Result<DynamicsOutcome<Vec<VariableIndex>>, EnvError> {
        self.action_set = if done {
            None
        } else {
            Some(self.candidates(&session.state()?)?)
        };
        Ok((done, self.action_set.clone()))
    }
}

impl Dynamics for BranchingDynamics {
    type Action = BranchAction;
    type ActionSet = Vec<VariableIndex>;

    fn set_random_state(
        &mut self,
        model: &mut Model,
        rng: &mut RandomEngine,
    ) -> Result<(), EnvError> {
        set_default_random_state(model, rng)?;
        self.rng = engine_from_seed(rng.random());
        Ok(())
    }

    fn reset_dynamics(
        &mut self,
        session: &mut SolverSession,
    ) -> Result<DynamicsOutcome<Self::ActionSet>, EnvError> {
        self.action_set = None;
        let done = session.start(CallbackConfig::branching())?;
        self.outcome(session, done)
    }

    fn step_dynamics(
        &mut self,
        session: &mut SolverSession,
        action: Self::Action,
    ) -> Result<DynamicsOutcome<Self::ActionSet>, EnvError> {
        ensure_suspended(session)?;
        let decision = match action {
            BranchAction::SolverDefault => Decision::Default,
            BranchAction::Variable(var) => {
                let legal = self
                    .action_set
                    .as_deref()
                    .is_some_and(|set| set.contains(&var));
                if !legal {
                    return Err(EnvError::InvalidAction(format!(
                        "{var} is not a branching candidate"
                    )));
                }
                Decision::resolve(CallbackResult::Branched(var))
            }
        };
        debug!(target: "rudder_env::dynamics", "branching on {action:?}");
        let done = session.resume(decision)?;
        self.outcome(session, done)
    }
}
