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

//! Count-based limits: explored nodes and found solutions.

use crate::monitor::search_monitor::{SearchCommand, SearchMonitor, StopReason};
use rudder_model::{problem::Problem, solution::Solution};

/// Stops the search before node `limit + 1` would be processed.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NodeLimitMonitor {
    limit: u64,
    steps: u64,
}

impl NodeLimitMonitor {
    #[inline]
    pub fn new(limit: u64) -> Self {
        Self { limit, steps: 0 }
    }
}

impl SearchMonitor for NodeLimitMonitor {
    fn name(&self) -> &str {
        "NodeLimitMonitor"
    }

    fn on_enter_search(&mut self, _problem: &Problem) {
        self.steps = 0;
    }

    fn on_exit_search(&mut self) {}
    fn on_solution_found(&mut self, _solution: &Solution) {}

    #[inline]
    fn on_step(&mut self) {
        self.steps = self.steps.saturating_add(1);
    }

    #[inline]
    fn search_command(&self) -> SearchCommand {
        if self.steps > self.limit {
            SearchCommand::Terminate(StopReason::NodeLimit)
        } else {
            SearchCommand::Continue
        }
    }
}

/// Stops the search once `limit` improving solutions have been found.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SolutionLimitMonitor {
    limit: u64,
    found: u64,
}

impl SolutionLimitMonitor {
    #[inline]
    pub fn new(limit: u64) -> Self {
        Self { limit, found: 0 }
    }

    #[inline]
    pub fn found(&self) -> u64 {
        self.found
    }
}

impl SearchMonitor for SolutionLimitMonitor {
    fn name(&self) -> &str {
        "SolutionLimitMonitor"
    }

    fn on_enter_search(&mut self, _problem: &Problem) {
        self.found = 0;
    }

    fn on_exit_search(&mut self) {}

    fn on_solution_found(&mut self, _solution: &Solution) {
        self.found = self.found.saturating_add(1);
    }

    fn on_step(&mut self) {}

    #[inline]
    fn search_command(&self) -> SearchCommand {
        if self.found >= self.limit {
            SearchCommand::Terminate(StopReason::SolutionLimit)
        } else {
            SearchCommand::Continue
        }
    }
}
