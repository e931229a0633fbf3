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

use crate::monitor::search_monitor::StopReason;

/// Final status of a solve.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum SolveStatus {
    /// No solve has finished yet.
    #[default]
    Unknown,
    /// A solution was found and proven optimal.
    Optimal,
    /// The problem was proven to have no feasible solution.
    Infeasible,
    /// The LP relaxation is unbounded.
    Unbounded,
    /// The solve was interrupted by the decision callback or an interrupt handle.
    UserInterrupt,
    TimeLimit,
    NodeLimit,
    SolutionLimit,
}

impl SolveStatus {
    /// Whether the search space was fully explored.
    #[inline]
    pub fn is_proven(self) -> bool {
        matches!(
            self,
            SolveStatus::Optimal | SolveStatus::Infeasible | SolveStatus::Unbounded
        )
    }

    /// Whether the solve stopped early.
    #[inline]
    pub fn is_aborted(self) -> bool {
        matches!(
            self,
            SolveStatus::UserInterrupt
                | SolveStatus::TimeLimit
                | SolveStatus::NodeLimit
                | SolveStatus::SolutionLimit
        )
    }
}

impl From<StopReason> for SolveStatus {
    fn from(reason: StopReason) -> Self {
        match reason {
            StopReason::Interrupt => SolveStatus::UserInterrupt,
            StopReason::TimeLimit => SolveStatus::TimeLimit,
            StopReason::NodeLimit => SolveStatus::NodeLimit,
            StopReason::SolutionLimit => SolveStatus::SolutionLimit,
        }
    }
}

impl std::fmt::Display for SolveStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let text = match self {
            SolveStatus::Unknown => "unknown",
            SolveStatus::Optimal => "optimal solution found",
            SolveStatus::Infeasible => "problem is infeasible",
            SolveStatus::Unbounded => "problem is unbounded",
            SolveStatus::UserInterrupt => "user interrupt",
            SolveStatus::TimeLimit => "time limit reached",
            SolveStatus::NodeLimit => "node limit reached",
            SolveStatus::SolutionLimit => "solution limit reached",
        };
        f.write_str(text)
    }
}
