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

//! The solver handle.
//!
//! A [`Model`] owns one problem, its parameters and the results of at most
//! one solve. It moves freely between threads, which is what lets the
//! episode engine run a solve on a worker while the controller waits.

use crate::{
    callback::{CallbackConfig, DecisionCallback},
    error::SolverError,
    params::{SolverSettings, default_params},
    result::SolveStatus,
    search::{InstalledCallback, Search},
    state::{SolverState, Stage},
    stats::SolveStatistics,
};
use log::debug;
use rudder_model::{
    loading::ProblemLoader,
    param::{ParamSet, ParamValue},
    problem::Problem,
    solution::Solution,
};
use std::{
    path::Path,
    sync::{Arc, atomic::AtomicBool},
};

pub struct Model {
    problem: Arc<Problem>,
    params: ParamSet,
    stage: Stage,
    status: SolveStatus,
    incumbent: Option<Solution>,
    stats: SolveStatistics,
    dual_bound: f64,
    interrupt: Arc<AtomicBool>,
    callback: Option<InstalledCallback>,
}

impl std::fmt::Debug for Model {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Model")
            .field("problem", &self.problem.name())
            .field("stage", &self.stage)
            .field("status", &self.status)
            .field("has_callback", &self.callback.is_some())
            .finish_non_exhaustive()
    }
}

impl Model {
    /// Wraps an in-memory problem with default parameters.
    pub fn from_problem(problem: Problem) -> Self {
        Self::with_shared_problem(Arc::new(problem), default_params())
    }

    /// Reads a problem file.
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self, SolverError> {
        let problem = ProblemLoader::new().from_path(path.as_ref())?;
        debug!(
            target: "rudder_bnb::model",
            "loaded {} from {}", problem.name(), path.as_ref().display()
        );
        Ok(Self::from_problem(problem))
    }

    fn with_shared_problem(problem: Arc<Problem>, params: ParamSet) -> Self {
        let sense = problem.sense();
        Self {
            problem,
            params,
            stage: Stage::Problem,
            status: SolveStatus::Unknown,
            incumbent: None,
            stats: SolveStatistics::default(),
            dual_bound: -sense.worst_value(),
            interrupt: Arc::new(AtomicBool::new(false)),
            callback: None,
        }
    }

    /// A fresh model over the same problem with the same parameters.
    ///
    /// Solve results and the decision callback are not copied.
    ///
    /// # Errors
    ///
    /// Returns [`SolverError::InvalidStage`] while a solve is in progress.
    pub fn copy_orig(&self) -> Result<Self, SolverError> {
        if self.stage == Stage::Solving {
            return Err(SolverError::InvalidStage {
                stage: self.stage,
                operation: "copy the original problem",
            });
        }
        Ok(Self::with_shared_problem(
            Arc::clone(&self.problem),
            self.params.clone(),
        ))
    }

    #[inline]
    pub fn problem(&self) -> &Problem {
        &self.problem
    }

    #[inline]
    pub fn params(&self) -> &ParamSet {
        &self.params
    }

    /// Sets one parameter, casting the value to its registered type.
    pub fn set_param(
        &mut self,
        name: &str,
        value: impl Into<ParamValue>,
    ) -> Result<(), SolverError> {
        self.params.set(name, value)?;
        Ok(())
    }

    pub fn get_param(&self, name: &str) -> Result<ParamValue, SolverError> {
        Ok(self.params.get(name)?.clone())
    }

    /// Sets several parameters, stopping at the first failure.
    pub fn set_params<I, K, V>(&mut self, values: I) -> Result<(), SolverError>
    where
        I: IntoIterator<Item = (K, V)>,
        K: AsRef<str>,
        V: Into<ParamValue>,
    {
        self.params.set_many(values)?;
        Ok(())
    }

    #[inline]
    pub fn stage(&self) -> Stage {
        self.stage
    }

    #[inline]
    pub fn status(&self) -> SolveStatus {
        self.status
    }

    #[inline]
    pub fn best_solution(&self) -> Option<&Solution> {
        self.incumbent.as_ref()
    }

    #[inline]
    pub fn statistics(&self) -> &SolveStatistics {
        &self.stats
    }

    /// Flag that stops the solve when set, usable from any thread.
    #[inline]
    pub fn interrupt_handle(&self) -> Arc<AtomicBool> {
        Arc::clone(&self.interrupt)
    }

    /// Snapshot of the model outside of any decision point.
    pub fn state(&self) -> SolverState {
        SolverState {
            stage: self.stage,
            status: self.status,
            decision: None,
            node_number: self.stats.nodes_explored,
            depth: 0,
            n_nodes: self.stats.nodes_explored,
            open_nodes: 0,
            primal_bound: self
                .incumbent
                .as_ref()
                .map_or(self.problem.sense().worst_value(), Solution::objective_value),
            dual_bound: self.dual_bound,
            lp_objective: None,
            lp_values: Vec::new(),
            lp_candidates: Vec::new(),
            lp_candidate_fractionalities: Vec::new(),
            pseudo_candidates: Vec::new(),
            n_solutions: self.stats.solutions_found,
            n_lp_iterations: self.stats.lp_iterations,
            solving_time: self.stats.time_total,
            last_trial: None,
        }
    }

    /// Installs the decision callback.
    ///
    /// # Errors
    ///
    /// Returns [`SolverError::CallbackInstalled`] if one is already installed.
    pub fn include_callback(
        &mut self,
        config: CallbackConfig,
        callback: Box<dyn DecisionCallback>,
    ) -> Result<(), SolverError> {
        if self.callback.is_some() {
            return Err(SolverError::CallbackInstalled);
        }
        self.callback = Some((config, callback));
        Ok(())
    }

    /// Removes the decision callback, returning whether one was installed.
    pub fn remove_callback(&mut self) -> bool {
        self.callback.take().is_some()
    }

    #[inline]
    pub fn has_callback(&self) -> bool {
        self.callback.is_some()
    }

    /// Runs the solve to completion, a limit, or an interrupt.
    ///
    /// Solving an already solved model returns its status again. A failed
    /// solve leaves the model in [`Stage::Solved`] with an unknown status.
    pub fn solve(&mut self) -> Result<SolveStatus, SolverError> {
        match self.stage {
            Stage::Solved => return Ok(self.status),
            Stage::Solving => {
                return Err(SolverError::InvalidStage {
                    stage: self.stage,
                    operation: "start a solve",
                });
            }
            Stage::Problem => {}
        }
        let settings = SolverSettings::from_params(&self.params)?;

        self.stage = Stage::Solving;
        let mut callback = self.callback.take();
        let outcome = Search {
            problem: &self.problem,
            settings: &settings,
            interrupt: &self.interrupt,
            callback: callback.as_mut(),
            stats: &mut self.stats,
            incumbent: &mut self.incumbent,
        }
        .run();
        self.callback = callback;
        self.stage = Stage::Solved;

        match outcome {
            Ok(outcome) => {
                self.status = outcome.status;
                self.dual_bound = outcome.dual_bound;
                Ok(outcome.status)
            }
            Err(err) => {
                debug!(target: "rudder_bnb::model", "solve failed: {err}");
                self.status = SolveStatus::Unknown;
                Err(err)
            }
        }
    }
}
