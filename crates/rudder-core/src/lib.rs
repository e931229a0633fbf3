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

//! # Rudder Core
//!
//! Foundational utilities shared by every crate of the rudder workspace.
//!
//! ## Modules
//!
//! - `utils`: phantom-tagged, strongly typed indices (`TypedIndex<T>`).
//! - `random`: the explicit seeding context (`RandomContext`) and the
//!   concrete engine type used for every stochastic decision.
//! - `sampling`: weighted sampling without replacement (`arg_choice`).
//! - `tolerance`: floating point feasibility and integrality checks.
//!
//! Nothing in here knows about solvers or episodes; higher crates build on
//! these primitives.

pub mod random;
pub mod sampling;
pub mod tolerance;
pub mod utils;
