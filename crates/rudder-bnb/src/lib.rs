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

//! Rudder-BnB: LP-based branch-and-bound with interceptable decisions
//!
//! This crate is the solver behind every rudder episode. It solves mixed
//! integer linear programs by depth-first branch-and-bound over LP
//! relaxations, and it exposes the two choices a policy may want to take
//! over, *which variable to branch on* and *which partial assignment to try
//! as a primal solution*, through a single installable decision callback.
//!
//! Core flow
//! - Build a `model::Model` from a `rudder_model::problem::Problem` or a file.
//! - Configure it through named parameters (`limits/time`, `branching/rule`, ...).
//! - Optionally install a `callback::DecisionCallback` with a `CallbackConfig`
//!   saying which decision points it wants to see.
//! - Call `Model::solve`, which runs synchronously to completion or until a
//!   limit, an interrupt, or the callback stops it.
//!
//! Design highlights
//! - The callback sees a `callback::DecisionContext`, a borrowed view of the
//!   current node that can also probe partial assignments.
//! - Owned `state::SolverState` snapshots decouple observers from the
//!   search's borrowed internals.
//! - Limits and interrupts are search monitors composed at solve start.
//! - Deterministic given equal parameters, including the randomization seeds.
//!
//! Module map
//! - `model`: the solver handle and its lifecycle.
//! - `callback`: decision points, callback trait and context.
//! - `branching`: default variable selection rules.
//! - `lp`: dense bounded simplex for node relaxations.
//! - `monitor`: search monitors (interrupt, limits, composite).
//! - `params`: the registered parameter table and its typed view.
//! - `result`: solve status.
//! - `state`: stages and solver state snapshots.
//! - `stats`: counters and timing.

pub mod branching;
pub mod callback;
pub mod error;
pub mod lp;
pub mod model;
pub mod monitor;
mod node;
pub mod params;
pub mod result;
mod search;
pub mod state;
pub mod stats;
