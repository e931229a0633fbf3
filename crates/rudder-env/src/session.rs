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

//! A model that is either at rest or being solved under reverse control.

use crate::{
    control::{ControlError, ControlToken, Decision, ReverseControl},
    error::EnvError,
};
use log::debug;
use rudder_bnb::{
    callback::CallbackConfig, model::Model, result::SolveStatus, state::SolverState,
};

enum Inner {
    /// The model is not being solved under control.
    Idle(Model),
    /// A controlled solve is suspended and the caller holds the turn.
    Controlled(ReverseControl, ControlToken),
    /// The model was lost to a failure.
    Vacant,
}

/// Owns the model of one episode and, while a controlled solve runs, the
/// channel driving it.
///
/// When a controlled solve finishes, the session joins the worker and returns
/// to rest with the solved model.
pub struct SolverSession {
    inner: Inner,
}

impl std::fmt::Debug for SolverSession {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match &self.inner {
            Inner::Idle(model) => f.debug_tuple("Idle").field(model).finish(),
            Inner::Controlled(channel, _) => f.debug_tuple("Controlled").field(channel).finish(),
            Inner::Vacant => f.write_str("Vacant"),
        }
    }
}

fn owned_by_solve() -> EnvError {
    EnvError::Sequencing("the model is owned by a controlled solve".to_owned())
}

fn vacant() -> EnvError {
    EnvError::Sequencing("the session lost its model to a failure".to_owned())
}

fn recover(channel: &mut ReverseControl) -> Inner {
    if let Err(err) = channel.shutdown() {
        debug!(target: "rudder_env::session", "discarding failure during recovery: {err}");
    }
    channel.take_model().map_or(Inner::Vacant, Inner::Idle)
}

impl SolverSession {
    #[inline]
    pub fn new(model: Model) -> Self {
        Self {
            inner: Inner::Idle(model),
        }
    }

    /// Starts a controlled solve and blocks until its first decision point.
    ///
    /// Returns `true` if the solve finished without suspending.
    pub fn start(&mut self, config: CallbackConfig) -> Result<bool, EnvError> {
        let model = match std::mem::replace(&mut self.inner, Inner::Vacant) {
            Inner::Idle(model) => model,
            other => {
                self.inner = other;
                return Err(EnvError::Sequencing(
                    "a controlled solve can only start from an idle session".to_owned(),
                ));
            }
        };
        let mut channel = match ReverseControl::new(model, config) {
            Ok(channel) => channel,
            Err(err) => return Err(self.lose_model(err)),
        };
        let waited = channel.wait();
        self.settle(channel, waited)
    }

    /// Hands `decision` to the suspended solve and blocks until the next
    /// decision point or the end of the solve.
    ///
    /// Returns `true` once the solve has finished.
    pub fn resume(&mut self, decision: Decision) -> Result<bool, EnvError> {
        let (mut channel, token) = match std::mem::replace(&mut self.inner, Inner::Vacant) {
            Inner::Controlled(channel, token) => (channel, token),
            other => {
                self.inner = other;
                return Err(EnvError::Sequencing(
                    "no controlled solve is suspended".to_owned(),
                ));
            }
        };
        if let Err(err) = channel.resume(decision, token) {
            self.inner = recover(&mut channel);
            return Err(err.into());
        }
        let waited = channel.wait();
        self.settle(channel, waited)
    }

    /// Leaves the session vacant after the model went down with `err`.
    fn lose_model(&mut self, err: ControlError) -> EnvError {
        debug!(target: "rudder_env::session", "model lost, the controlled solve could not start: {err}");
        self.inner = Inner::Vacant;
        err.into()
    }

    fn settle(
        &mut self,
        mut channel: ReverseControl,
        waited: Result<ControlToken, ControlError>,
    ) -> Result<bool, EnvError> {
        let waited = waited.and_then(|token| channel.is_done(&token).map(|done| (token, done)));
        match waited {
            Ok((token, false)) => {
                self.inner = Inner::Controlled(channel, token);
                Ok(false)
            }
            Ok((token, true)) => {
                let joined = channel.join(token);
                self.inner = recover(&mut channel);
                joined?;
                Ok(true)
            }
            Err(err) => {
                self.inner = recover(&mut channel);
                Err(err.into())
            }
        }
    }

    /// Whether a controlled solve is suspended at a decision point.
    #[inline]
    pub fn is_suspended(&self) -> bool {
        matches!(self.inner, Inner::Controlled(..))
    }

    /// Whether no controlled solve is in progress.
    #[inline]
    pub fn is_done(&self) -> bool {
        !self.is_suspended()
    }

    /// Snapshot of the solver, taken at the current decision point while
    /// suspended.
    pub fn state(&self) -> Result<SolverState, EnvError> {
        match &self.inner {
            Inner::Idle(model) => Ok(model.state()),
            Inner::Controlled(channel, token) => Ok(channel.state(token)?),
            Inner::Vacant => Err(vacant()),
        }
    }

    /// The model, unless a controlled solve owns it.
    pub fn model(&self) -> Result<&Model, EnvError> {
        match &self.inner {
            Inner::Idle(model) => Ok(model),
            Inner::Controlled(..) => Err(owned_by_solve()),
            Inner::Vacant => Err(vacant()),
        }
    }

    pub fn model_mut(&mut self) -> Result<&mut Model, EnvError> {
        match &mut self.inner {
            Inner::Idle(model) => Ok(model),
            Inner::Controlled(..) => Err(owned_by_solve()),
            Inner::Vacant => Err(vacant()),
        }
    }

    /// Solves the idle model to completion without suspending.
    pub fn solve(&mut self) -> Result<SolveStatus, EnvError> {
        Ok(self.model_mut()?.solve()?)
    }

    /// Ends any controlled solve and returns the model.
    pub fn into_model(self) -> Option<Model> {
        match self.inner {
            Inner::Idle(model) => Some(model),
            Inner::Controlled(mut channel, token) => {
                if let Err(err) = channel.join(token) {
                    debug!(target: "rudder_env::session", "discarding failure of abandoned solve: {err}");
                }
                channel.take_model()
            }
            Inner::Vacant => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rudder_bnb::{callback::CallbackResult, state::Stage};
    use rudder_model::problem::{ConstraintSense, ObjectiveSense, ProblemBuilder, VariableKind};

    fn model() -> Model {
        let mut b = ProblemBuilder::new("pair");
        b.set_sense(ObjectiveSense::Maximize);
        let x = b
            .add_variable("x", VariableKind::Integer, 3.0, 0.0, 5.0)
            .unwrap();
        let y = b
            .add_variable("y", VariableKind::Integer, 2.0, 0.0, 5.0)
            .unwrap();
        b.add_constraint("c", [(x, 2.0), (y, 3.0)], ConstraintSense::LessEqual, 8.5)
            .unwrap();
        Model::from_problem(b.build())
    }

    #[test]
    fn test_controlled_solve_returns_to_idle() {
        let mut session = SolverSession::new(model());
        let mut done = session.start(CallbackConfig::branching()).unwrap();
        assert!(session.model().is_err());
        while !done {
            assert!(session.is_suspended());
            assert!(session.state().unwrap().decision.is_some());
            done = session.resume(Decision::Default).unwrap();
        }
        let model = session.model().unwrap();
        assert_eq!(model.stage(), Stage::Solved);
        assert_eq!(model.status(), SolveStatus::Optimal);
    }

    #[test]
    fn test_resume_while_idle_is_sequencing_error() {
        let mut session = SolverSession::new(model());
        let err = session.resume(Decision::Default).unwrap_err();
        assert!(matches!(err, EnvError::Sequencing(_)));
        assert!(session.model().is_ok());
    }

    #[test]
    fn test_interrupt_decision_finishes_solve() {
        let mut session = SolverSession::new(model());
        assert!(!session.start(CallbackConfig::branching()).unwrap());
        let done = session
            .resume(Decision::resolve(CallbackResult::Interrupt))
            .unwrap();
        assert!(done);
        assert_eq!(session.model().unwrap().status(), SolveStatus::UserInterrupt);
    }

    #[test]
    fn test_failed_solve_recovers_model() {
        let mut session = SolverSession::new(model());
        session.start(CallbackConfig::branching()).unwrap();
        let var = rudder_model::index::VariableIndex::new(42);
        let err = session
            .resume(Decision::resolve(CallbackResult::Branched(var)))
            .unwrap_err();
        assert!(matches!(err, EnvError::Solver(_)));
        assert!(session.model().is_ok());
        assert!(session.resume(Decision::Default).is_err());
    }

    #[test]
    fn test_spawn_failure_leaves_session_vacant() {
        let mut session = SolverSession::new(model());
        let err = session.lose_model(ControlError::Spawn(std::io::Error::other("no threads left")));
        assert!(matches!(err, EnvError::Control(ControlError::Spawn(_))));
        assert!(!err.is_usage_error());

        assert!(!session.is_suspended());
        let err = session.model().unwrap_err();
        assert!(err.to_string().contains("lost its model"));
        assert!(session.state().is_err());
        assert!(matches!(
            session.start(CallbackConfig::branching()),
            Err(EnvError::Sequencing(_))
        ));
        assert!(session.into_model().is_none());
    }

    #[test]
    fn test_into_model_abandons_suspended_solve() {
        let mut session = SolverSession::new(model());
        session.start(CallbackConfig::branching()).unwrap();
        let model = session.into_model().unwrap();
        assert_eq!(model.status(), SolveStatus::UserInterrupt);
    }
}
