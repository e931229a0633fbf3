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

//! # Rudder Model
//!
//! **The problem formulation layer of the rudder workspace.**
//!
//! This crate describes *what* is being solved: a mixed-integer linear
//! program, the typed parameters a solver run is configured with, and the
//! solutions it produces. It knows nothing about search or episodes; the
//! solver in `rudder_bnb` consumes these types and the episode engine in
//! `rudder_env` only ever touches them through the solver.
//!
//! ## Architecture
//!
//! * **`index`**: strongly typed `VariableIndex` and `ConstraintIndex`.
//! * **`problem`**: the immutable `Problem` and its validating `ProblemBuilder`.
//! * **`loading`**: `ProblemLoader`, a whitespace-token text format reader.
//! * **`param`**: `ParamSet`, a registry of named, typed parameters with casting.
//! * **`solution`**: a primal solution with its objective value.
//!
//! ## Design Philosophy
//!
//! 1.  **Type Safety**: variable and constraint positions are distinct types.
//! 2.  **Memory Layout**: variable data is stored as parallel vectors so the
//!     LP relaxation can borrow bounds and costs as slices.
//! 3.  **Fail-Fast**: builders and the loader validate eagerly, so the solver
//!     never sees an ill-formed problem.

pub mod index;
pub mod loading;
pub mod param;
pub mod problem;
pub mod solution;
