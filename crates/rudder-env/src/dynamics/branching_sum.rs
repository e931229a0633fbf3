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
    dynamics::{Dynamics, DynamicsOutcome, ensure_suspended},
    error::EnvError,
    session::SolverSession,
};
use log::debug;
use rudder_bnb::callback::{CallbackConfig, CallbackResult};
use rudder_core::tolerance::is_integral;
use rudder_model::index::VariableIndex;

/// Branches on the sum of a set of variables.
///
/// The action set holds the LP branching candidates at the current node. An
/// action is a non-empty subset of them whose LP values do not sum to an
/// integer; the solver then creates one child with `sum <= floor(s)` and one
/// with `sum >= ceil(s)`.
#[derive(Debug, Clone, Default)]
pub struct BranchingSumDynamics {
    action_set: Option<Vec<VariableIndex>>,
    lp_values: Vec<f64>,
    feastol: f64,
}

impl BranchingSumDynamics {
    pub fn new() -> Self {
        Self::default()
    }

    /// The action set returned by the last reset or step.
    #[inline]
    pub fn action_set(&self) -> Option<&[VariableIndex]> {
        self.action_set.as_deref()
    }

    fn outcome(
        &mut self,
        session: &SolverSession,
        done: bool,
    ) -> Result<DynamicsOutcome<Vec<VariableIndex>>, EnvError> {
        if done {
            self.action_set = None;
            self.lp_values.clear();
        } else {
            let state = session.state()?;
            self.action_set = Some(state.lp_candidates);
            self.lp_values = state.lp_values;
        }
        Ok((done, self.action_set.clone()))
    }

    /// Checks `vars` against the action set and returns the sum of their LP values.
    fn validate(&self, vars: &[VariableIndex]) -> Result<f64, EnvError> {
        let set = self.action_set.as_deref().unwrap_or_default();
        if vars.is_empty() {
            return Err(EnvError::InvalidAction(
                "cannot branch on an empty set of variables".to_owned(),
            ));
        }
        let mut sum = 0.0;
        for (i, var) in vars.iter().enumerate() {
            if !set.contains(var) {
                return Err(EnvError::InvalidAction(format!(
                    "{var} is not a branching candidate"
                )));
            }
            if vars[..i].contains(var) {
                return Err(EnvError::InvalidAction(format!("{var} appears twice")));
            }
            sum += self.lp_values.get(var.get()).copied().unwrap_or_default();
        }
        if is_integral(sum, self.feastol) {
            return Err(EnvError::InvalidAction(format!(
                "the LP values of the variables sum to the integer {sum}"
            )));
        }
        Ok(sum)
    }
}

impl Dynamics for BranchingSumDynamics {
    type Action = Vec<VariableIndex>;
    type ActionSet = Vec<VariableIndex>;

    fn reset_dynamics(
        &mut self,
        session: &mut SolverSession,
    ) -> Result<DynamicsOutcome<Self::ActionSet>, EnvError> {
        self.action_set = None;
        self.feastol = session.model()?.params().get_as::<f64>("numerics/feastol")?;
        let done = session.start(CallbackConfig::branching())?;
        self.outcome(session, done)
    }

    fn step_dynamics(
        &mut self,
        session: &mut SolverSession,
        action: Self::Action,
    ) -> Result<DynamicsOutcome<Self::ActionSet>, EnvError> {
        ensure_suspended(session)?;
        let sum = self.validate(&action)?;
        debug!(
            target: "rudder_env::dynamics",
            vars = action.len(),
            sum = sum;
            "branching on sum"
        );
        let done = session.resume(Decision::resolve(CallbackResult::BranchedSum(action)))?;
        self.outcome(session, done)
    }
}
