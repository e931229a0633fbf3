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

use crate::{control::ControlError, instance::InstanceError};
use rudder_bnb::error::SolverError;
use rudder_model::param::ParamError;

/// Errors raised by the episode engine.
///
/// Usage errors ([`EnvError::Sequencing`], [`EnvError::InvalidAction`],
/// [`EnvError::InvalidArgument`]) are kept apart from failures of the solver
/// itself and from resource errors of instance sources.
#[derive(Debug, thiserror::Error)]
pub enum EnvError {
    #[error("out of sequence: {0}")]
    Sequencing(String),
    #[error("invalid action: {0}")]
    InvalidAction(String),
    #[error("invalid argument: {0}")]
    InvalidArgument(String),
    #[error(transparent)]
    Param(ParamError),
    #[error(transparent)]
    Solver(SolverError),
    #[error(transparent)]
    Control(ControlError),
    #[error(transparent)]
    Instance(#[from] InstanceError),
}

impl EnvError {
    /// Whether the error is a misuse of the engine rather than a failure.
    #[inline]
    pub fn is_usage_error(&self) -> bool {
        matches!(
            self,
            EnvError::Sequencing(_) | EnvError::InvalidAction(_) | EnvError::InvalidArgument(_)
        )
    }
}

impl From<SolverError> for EnvError {
    fn from(err: SolverError) -> Self {
        match err {
            SolverError::Param(err) => EnvError::Param(err),
            err => EnvError::Solver(err),
        }
    }
}

impl From<ParamError> for EnvError {
    #[inline]
    fn from(err: ParamError) -> Self {
        EnvError::Param(err)
    }
}

impl From<ControlError> for EnvError {
    fn from(err: ControlError) -> Self {
        match err {
            ControlError::Solver(err) => EnvError::from(err),
            ControlError::Sequencing(msg) => EnvError::Sequencing(msg.to_owned()),
            ControlError::ForeignToken => EnvError::Sequencing(ControlError::ForeignToken.to_string()),
            err => EnvError::Control(err),
        }
    }
}
