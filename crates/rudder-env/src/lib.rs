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

//! Rudder-Env: solver decisions as sequential decision processes
//!
//! The branch-and-bound solver in `rudder_bnb` runs synchronously and only
//! hands out decisions through a callback. This crate inverts that control:
//! the solve runs on a worker thread that suspends at every decision point,
//! and the caller drives it one decision at a time.
//!
//! Core flow
//! - Pick a `dynamics::Dynamics` for the task (branching, sum branching,
//!   primal search, configuring) and build an `environment::Environment` around it.
//! - `reset` an episode with a model, a problem file or an
//!   `instance::InstanceSource`; receive the first action set.
//! - `step` with an action from that set until the transition is done.
//!
//! Design highlights
//! - `control::ReverseControl` runs the solve on a dedicated thread and hands
//!   control back and forth under one mutex and condition variable. A
//!   non-copyable `control::ControlToken` marks whose turn it is.
//! - Solver errors and panics on the worker surface exactly once on the
//!   controller side. Dropping a channel in any state stops and joins its
//!   worker.
//! - Per-episode randomness derives from an explicit episode seed; the
//!   process-wide context in `random` is only a default.
//!
//! Module map
//! - `control`: reverse-control channel and its control token.
//! - `session`: a model at rest or under controlled solve.
//! - `dynamics`: task definitions.
//! - `functions`: observation, reward, termination and information functions.
//! - `environment`: the episode driver.
//! - `instance`: problem instance sources.
//! - `random`: process-wide seeding.
//! - `error`: the engine's error type.

pub mod control;
pub mod dynamics;
pub mod environment;
pub mod error;
pub mod functions;
pub mod instance;
pub mod random;
pub mod session;
