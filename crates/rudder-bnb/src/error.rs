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
    callback::{CallbackResult, DecisionPoint},
    lp::LpError,
    state::Stage,
};
use rudder_model::{index::VariableIndex, loading::LoadError, param::ParamError};

/// Errors raised by the solver.
#[derive(Debug, thiserror::Error)]
pub enum SolverError {
    #[error(transparent)]
    Param(#[from] ParamError),
    #[error("failed to read problem: {0}")]
    Load(#[from] LoadError),
    #[error("LP relaxation failed: {0}")]
    Lp(#[from] LpError),
    #[error("parameter {name} has unsupported value {value}")]
    InvalidSetting { name: &'static str, value: String },
    #[error("cannot {operation} in stage {stage}")]
    InvalidStage {
        stage: Stage,
        operation: &'static str,
    },
    #[error("a decision callback is already installed")]
    CallbackInstalled,
    #[error("cannot branch on {variable}: {reason}")]
    InvalidBranching {
        variable: VariableIndex,
        reason: &'static str,
    },
    #[error("cannot branch on a sum of variables: {0}")]
    InvalidSumBranching(&'static str),
    #[error("callback returned {result} at a {point} decision point")]
    InvalidCallbackResult {
        result: CallbackResult,
        point: DecisionPoint,
    },
    #[error("invalid assignment: {0}")]
    InvalidAssignment(String),
    #[error("decision callback failed: {0}")]
    Callback(String),
    #[error("solver thread panicked: {0}")]
    Panicked(String),
}
