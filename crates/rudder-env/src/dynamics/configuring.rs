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
    dynamics::{Dynamics, DynamicsOutcome},
    error::EnvError,
    session::SolverSession,
};
use log::debug;
use rudder_model::param::ParamValue;
use std::collections::BTreeMap;

/// Parameter values by name, applied in name order.
pub type Configuration = BTreeMap<String, ParamValue>;

/// Single-step episodes: the action configures the solver, which then runs
/// to completion.
#[derive(Debug, Clone, Copy, Default)]
pub struct ConfiguringDynamics;

impl ConfiguringDynamics {
    #[inline]
    pub fn new() -> Self {
        Self
    }
}

impl Dynamics for ConfiguringDynamics {
    type Action = Configuration;
    type ActionSet = ();

    fn reset_dynamics(
        &mut self,
        _session: &mut SolverSession,
    ) -> Result<DynamicsOutcome<Self::ActionSet>, EnvError> {
        Ok((false, None))
    }

    fn step_dynamics(
        &mut self,
        session: &mut SolverSession,
        action: Self::Action,
    ) -> Result<DynamicsOutcome<Self::ActionSet>, EnvError> {
        let model = session.model_mut()?;
        model.set_params(action)?;
        let status = model.solve()?;
        debug!(target: "rudder_env::dynamics", "configured solve finished: {status}");
        Ok((true, None))
    }
}
