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

//! # Reverse Control
//!
//! Turns a synchronous, callback-driven solve into something a controller can
//! step through. The solve runs on a dedicated worker thread; an installed
//! decision callback publishes a [`SolverState`](rudder_bnb::state::SolverState)
//! snapshot, hands control to the controller and blocks until it is resumed.
//!
//! ## Protocol
//!
//! ```text
//! controller                          worker
//! ----------                          ------
//! ReverseControl::new(model) ──spawn──► solve()
//! wait() ◄───────────── suspended ──── callback at decision point
//! resume(decision, token) ───────────► callback applies decision
//! wait() ◄───────────── suspended ──── next decision point, or finished
//! join(token) / drop ── terminate ───► callback returns Interrupt, solve ends
//! ```
//!
//! Exactly one side is active at any time. The controller proves it is its
//! turn with a [`ControlToken`] that only `wait` creates and only `resume` or
//! `join` consume.
//!
//! ## Failures
//!
//! Errors and panics inside the worker's solve are captured and reported
//! exactly once, by the next `wait` or `join`. Dropping a channel in any state
//! terminates and joins the worker.

mod channel;
mod token;

pub use channel::{Decision, ReverseControl, Resolution, WorkerAction};
pub use token::ControlToken;

use rudder_bnb::error::SolverError;

/// Errors raised by the reverse-control channel.
#[derive(Debug, thiserror::Error)]
pub enum ControlError {
    #[error("out of sequence: {0}")]
    Sequencing(&'static str),
    #[error("control token was issued by another channel")]
    ForeignToken,
    #[error("the solver has already finished")]
    Finished,
    #[error("failed to spawn the solver thread: {0}")]
    Spawn(#[source] std::io::Error),
    #[error(transparent)]
    Solver(#[from] SolverError),
}
