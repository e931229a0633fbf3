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

//! # Episode Driver
//!
//! [`Environment`] turns a [`Dynamics`] and four extraction functions into
//! the usual reset/step loop:
//!
//! ```text
//! Created ──reset──► AwaitingAction ──step──► AwaitingAction
//!    │                    │                        │
//!    │                    └────────step────────► Terminal
//!    └──reset──► Terminal                          │
//! any error ─────────────► Poisoned ◄──────────────┘ step
//! ```
//!
//! `reset` is legal in every phase and starts a new episode. `step` is legal
//! only while awaiting an action; calling it anywhere else is a sequencing
//! error. Any error poisons the environment and drops its episode, after
//! which only `reset` is legal.
//!
//! Every reset increments the episode seed and derives the episode's random
//! engine from it, so two environments seeded alike produce the same episodes.

use crate::{
    dynamics::{Configuration, Dynamics},
    error::EnvError,
    functions::{
        InformationFunction, InformationMap, IsDone, Never, NoInformation, NoObservation,
        ObservationFunction, RewardFunction, TerminationFunction,
    },
    instance::InstanceSource,
    random,
    session::SolverSession,
};
use log::debug;
use rudder_bnb::{model::Model, state::SolverState};
use rudder_core::random::{RandomEngine, Seed, engine_from_seed};
use rudder_model::param::ParamValue;
use std::path::Path;

/// Where an environment is in its episode.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum Phase {
    /// No episode was started yet.
    #[default]
    Created,
    AwaitingAction,
    /// The episode is over; only `reset` is legal.
    Terminal,
    /// The last reset or step failed; only `reset` is legal.
    Poisoned,
}

impl std::fmt::Display for Phase {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let text = match self {
            Phase::Created => "created",
            Phase::AwaitingAction => "awaiting action",
            Phase::Terminal => "terminal",
            Phase::Poisoned => "poisoned",
        };
        f.write_str(text)
    }
}

/// What the agent receives from `reset` and `step`.
///
/// The action set is absent once the episode is done. The observation is
/// whatever the observation function extracts, terminal transitions included.
#[derive(Debug, Clone, PartialEq)]
pub struct Transition<O, A, I = ()> {
    pub observation: O,
    pub action_set: Option<A>,
    pub reward: f64,
    pub done: bool,
    pub information: InformationMap<I>,
}

/// Builds an [`Environment`].
#[derive(Debug, Clone)]
pub struct EnvironmentBuilder<D, O, R, T, I> {
    dynamics: D,
    observation: O,
    reward: R,
    termination: T,
    information: I,
    params: Configuration,
    seed: Option<Seed>,
}

impl<D, O, R, T, I> EnvironmentBuilder<D, O, R, T, I> {
    pub fn observation<O2: ObservationFunction>(
        self,
        observation: O2,
    ) -> EnvironmentBuilder<D, O2, R, T, I> {
        EnvironmentBuilder {
            dynamics: self.dynamics,
            observation,
            reward: self.reward,
            termination: self.termination,
            information: self.information,
            params: self.params,
            seed: self.seed,
        }
    }

    pub fn reward<R2: RewardFunction>(self, reward: R2) -> EnvironmentBuilder<D, O, R2, T, I> {
        EnvironmentBuilder {
            dynamics: self.dynamics,
            observation: self.observation,
            reward,
            termination: self.termination,
            information: self.information,
            params: self.params,
            seed: self.seed,
        }
    }

    pub fn termination<T2: TerminationFunction>(
        self,
        termination: T2,
    ) -> EnvironmentBuilder<D, O, R, T2, I> {
        EnvironmentBuilder {
            dynamics: self.dynamics,
            observation: self.observation,
            reward: self.reward,
            termination,
            information: self.information,
            params: self.params,
            seed: self.seed,
        }
    }

    pub fn information<I2: InformationFunction>(
        self,
        information: I2,
    ) -> EnvironmentBuilder<D, O, R, T, I2> {
        EnvironmentBuilder {
            dynamics: self.dynamics,
            observation: self.observation,
            reward: self.reward,
            termination: self.termination,
            information,
            params: self.params,
            seed: self.seed,
        }
    }

    /// Parameters applied to every model before its episode starts.
    pub fn params(mut self, params: Configuration) -> Self {
        self.params = params;
        self
    }

    pub fn param(mut self, name: impl Into<String>, value: impl Into<ParamValue>) -> Self {
        self.params.insert(name.into(), value.into());
        self
    }

    /// Fixes the initial episode seed instead of drawing one from the
    /// process-wide context.
    pub fn seed(mut self, seed: Seed) -> Self {
        self.seed = Some(seed);
        self
    }

    pub fn build(self) -> Environment<D, O, R, T, I> {
        Environment {
            dynamics: self.dynamics,
            observation: self.observation,
            reward: self.reward,
            termination: self.termination,
            information: self.information,
            params: self.params,
            seed: self.seed.unwrap_or_else(random::spawn_seed),
            phase: Phase::Created,
            session: None,
        }
    }
}

/// A solver task exposed as a sequential decision process.
pub struct Environment<D, O = NoObservation, R = IsDone, T = Never, I = NoInformation> {
    dynamics: D,
    observation: O,
    reward: R,
    termination: T,
    information: I,
    params: Configuration,
    seed: Seed,
    phase: Phase,
    session: Option<SolverSession>,
}

impl<D: std::fmt::Debug, O, R, T, I> std::fmt::Debug for Environment<D, O, R, T, I> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Environment")
            .field("dynamics", &self.dynamics)
            .field("params", &self.params)
            .field("seed", &self.seed)
            .field("phase", &self.phase)
            .field("session", &self.session)
            .finish_non_exhaustive()
    }
}

impl<D: Dynamics> Environment<D> {
    pub fn builder(dynamics: D) -> EnvironmentBuilder<D, NoObservation, IsDone, Never, NoInformation> {
        EnvironmentBuilder {
            dynamics,
            observation: NoObservation,
            reward: IsDone,
            termination: Never,
            information: NoInformation,
            params: Configuration::new(),
            seed: None,
        }
    }

    /// An environment with default functions and a seed from the
    /// process-wide context.
    pub fn new(dynamics: D) -> Self {
        Self::builder(dynamics).build()
    }
}

type Step<D, O, I> = Transition<
    <O as ObservationFunction>::Observation,
    <D as Dynamics>::ActionSet,
    <I as InformationFunction>::Information,
>;

impl<D, O, R, T, I> Environment<D, O, R, T, I>
where
    D: Dynamics,
    O: ObservationFunction,
    R: RewardFunction,
    T: TerminationFunction,
    I: InformationFunction,
{
    /// Sets the episode seed; the next reset uses `value + 1`.
    #[inline]
    pub fn seed(&mut self, value: Seed) {
        self.seed = value;
    }

    /// The seed of the current episode.
    #[inline]
    pub fn episode_seed(&self) -> Seed {
        self.seed
    }

    #[inline]
    pub fn phase(&self) -> Phase {
        self.phase
    }

    #[inline]
    pub fn dynamics(&self) -> &D {
        &self.dynamics
    }

    /// Snapshot of the solver of the current episode.
    pub fn state(&self) -> Result<SolverState, EnvError> {
        self.session
            .as_ref()
            .ok_or_else(|| EnvError::Sequencing("no episode in progress".to_owned()))?
            .state()
    }

    /// The model of the current episode, unless a suspended solve owns it.
    pub fn model(&self) -> Result<&Model, EnvError> {
        self.session
            .as_ref()
            .ok_or_else(|| EnvError::Sequencing("no episode in progress".to_owned()))?
            .model()
    }

    /// Starts a new episode on `model`.
    pub fn reset(&mut self, model: Model) -> Result<Step<D, O, I>, EnvError> {
        self.session = None;
        self.seed = self.seed.wrapping_add(1);
        let mut rng = engine_from_seed(self.seed);
        debug!(target: "rudder_env::environment", seed = self.seed; "reset");

        match self.try_reset(model, &mut rng) {
            Ok((session, transition)) => {
                self.session = Some(session);
                self.phase = if transition.done {
                    Phase::Terminal
                } else {
                    Phase::AwaitingAction
                };
                Ok(transition)
            }
            Err(err) => {
                self.phase = Phase::Poisoned;
                debug!(target: "rudder_env::environment", "reset failed: {err}");
                Err(err)
            }
        }
    }

    /// Starts a new episode on the problem stored at `path`.
    pub fn reset_from_file<P: AsRef<Path>>(&mut self, path: P) -> Result<Step<D, O, I>, EnvError> {
        match Model::from_file(path) {
            Ok(model) => self.reset(model),
            Err(err) => {
                self.session = None;
                self.phase = Phase::Poisoned;
                Err(err.into())
            }
        }
    }

    /// Starts a new episode on the next instance of `source`.
    pub fn reset_from_source<S>(&mut self, source: &mut S) -> Result<Step<D, O, I>, EnvError>
    where
        S: InstanceSource + ?Sized,
    {
        match source.next() {
            Ok(model) => self.reset(model),
            Err(err) => {
                self.session = None;
                self.phase = Phase::Poisoned;
                Err(err.into())
            }
        }
    }

    fn try_reset(
        &mut self,
        mut model: Model,
        rng: &mut RandomEngine,
    ) -> Result<(SolverSession, Step<D, O, I>), EnvError> {
        model.set_params(self.params.iter().map(|(name, value)| (name, value.clone())))?;
        self.dynamics.set_random_state(&mut model, rng)?;
        self.observation.before_episode(&model);
        self.reward.before_episode(&model);
        self.termination.before_episode(&model);
        self.information.before_episode(&model);

        let mut session = SolverSession::new(model);
        let (done, action_set) = self.dynamics.reset_dynamics(&mut session)?;
        let transition = self.transition(&session, done, action_set)?;
        Ok((session, transition))
    }

    /// Carries out `action` in the current episode.
    pub fn step(&mut self, action: D::Action) -> Result<Step<D, O, I>, EnvError> {
        let result = match (self.phase, self.session.take()) {
            (Phase::AwaitingAction, Some(mut session)) => {
                let result = self
                    .dynamics
                    .step_dynamics(&mut session, action)
                    .and_then(|(done, action_set)| self.transition(&session, done, action_set));
                self.session = Some(session);
                result
            }
            (phase, _) => Err(EnvError::Sequencing(format!(
                "step is not allowed in the {phase} phase"
            ))),
        };

        match result {
            Ok(transition) => {
                if transition.done {
                    self.phase = Phase::Terminal;
                    debug!(target: "rudder_env::environment", seed = self.seed; "episode done");
                }
                Ok(transition)
            }
            Err(err) => {
                self.phase = Phase::Poisoned;
                self.session = None;
                debug!(target: "rudder_env::environment", "step failed: {err}");
                Err(err)
            }
        }
    }

    fn transition(
        &mut self,
        session: &SolverSession,
        done: bool,
        action_set: Option<D::ActionSet>,
    ) -> Result<Step<D, O, I>, EnvError> {
        let state = session.state()?;
        let done = self.termination.extract(&state, done) || done;
        let reward = self.reward.extract(&state, done);
        let observation = self.observation.extract(&state, done);
        let information = self.information.extract(&state, done);
        Ok(Transition {
            observation,
            action_set: if done { None } else { action_set },
            reward,
            done,
            information,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{
        dynamics::{BranchingDynamics, ConfiguringDynamics},
        functions::{NodeLimit, SolverStateObservation},
    };
    use rudder_bnb::result::SolveStatus;
    use rudder_model::problem::{ConstraintSense, ObjectiveSense, ProblemBuilder, VariableKind};

    fn knapsack() -> Model {
        let mut b = ProblemBuilder::new("knapsack");
        b.set_sense(ObjectiveSense::Maximize);
        let items = [(5.0, 2.0), (4.0, 3.0), (3.0, 1.0), (7.0, 4.0)];
        let mut row = Vec::new();
        for (i, (profit, weight)) in items.into_iter().enumerate() {
            let v = b
                .add_variable(format!("x{i}"), VariableKind::Binary, profit, 0.0, 1.0)
                .unwrap();
            row.push((v, weight));
        }
        b.add_constraint("capacity", row, ConstraintSense::LessEqual, 6.5)
            .unwrap();
        Model::from_problem(b.build())
    }

    #[test]
    fn test_step_before_reset_poisons() {
        let mut env = Environment::builder(ConfiguringDynamics).seed(0).build();
        assert_eq!(env.phase(), Phase::Created);
        let err = env.step(Configuration::new()).unwrap_err();
        assert!(matches!(err, EnvError::Sequencing(_)));
        assert_eq!(env.phase(), Phase::Poisoned);
    }

    #[test]
    fn test_reset_increments_seed() {
        let mut env = Environment::builder(ConfiguringDynamics).seed(10).build();
        env.reset(knapsack()).unwrap();
        assert_eq!(env.episode_seed(), 11);
        env.reset(knapsack()).unwrap();
        assert_eq!(env.episode_seed(), 12);
        env.seed(3);
        env.reset(knapsack()).unwrap();
        assert_eq!(env.episode_seed(), 4);
    }

    #[test]
    fn test_params_applied_on_reset() {
        let mut env = Environment::builder(ConfiguringDynamics)
            .param("nodeselection/childsel", 'u')
            .seed(0)
            .build();
        env.reset(knapsack()).unwrap();
        let model = env.model().unwrap();
        assert_eq!(
            model.get_param("nodeselection/childsel").unwrap(),
            ParamValue::Char('u')
        );
        assert_eq!(
            model.get_param("randomization/permutevars").unwrap(),
            ParamValue::Bool(true)
        );
    }

    #[test]
    fn test_invalid_param_poisons_reset() {
        let mut env = Environment::builder(ConfiguringDynamics)
            .param("limits/nodes", "many")
            .seed(0)
            .build();
        assert!(matches!(env.reset(knapsack()), Err(EnvError::Param(_))));
        assert_eq!(env.phase(), Phase::Poisoned);
        assert!(env.state().is_err());
    }

    #[test]
    fn test_branching_episode_with_observations() {
        let mut env = Environment::builder(BranchingDynamics::default())
            .observation(SolverStateObservation)
            .seed(1)
            .build();
        let mut transition = env.reset(knapsack()).unwrap();
        assert_eq!(env.phase(), Phase::AwaitingAction);
        while !transition.done {
            let obs = transition.observation.unwrap();
            assert!(obs.decision.is_some());
            let var = transition.action_set.unwrap()[0];
            transition = env.step(var.into()).unwrap();
        }
        assert!(transition.observation.is_none());
        assert_eq!(transition.reward, 1.0);
        assert_eq!(env.phase(), Phase::Terminal);
        assert_eq!(env.model().unwrap().status(), SolveStatus::Optimal);
        assert!(matches!(
            env.step(crate::dynamics::BranchAction::SolverDefault),
            Err(EnvError::Sequencing(_))
        ));
    }

    /// Observes the `done` flags it was called with so far.
    #[derive(Debug, Default)]
    struct DoneFlags(Vec<bool>);

    impl ObservationFunction for DoneFlags {
        type Observation = Vec<bool>;

        fn before_episode(&mut self, _model: &Model) {
            self.0.clear();
        }

        fn extract(&mut self, _state: &SolverState, done: bool) -> Vec<bool> {
            self.0.push(done);
            self.0.clone()
        }
    }

    struct NodesAndDone;

    impl InformationFunction for NodesAndDone {
        type Information = f64;

        fn extract(&mut self, state: &SolverState, done: bool) -> InformationMap<f64> {
            InformationMap::from([
                ("nodes".to_owned(), state.n_nodes as f64),
                ("done".to_owned(), if done { 1.0 } else { 0.0 }),
            ])
        }
    }

    #[test]
    fn test_terminal_step_is_observed() {
        let mut env = Environment::builder(ConfiguringDynamics)
            .observation(DoneFlags::default())
            .information(NodesAndDone)
            .seed(0)
            .build();
        let transition = env.reset(knapsack()).unwrap();
        assert!(!transition.done);
        assert_eq!(transition.observation, vec![false]);
        assert_eq!(transition.information["done"], 0.0);

        let transition = env.step(Configuration::new()).unwrap();
        assert!(transition.done);
        assert_eq!(transition.observation, vec![false, true]);
        assert_eq!(transition.information["done"], 1.0);
        assert!(transition.information["nodes"] >= 1.0);

        // A new episode starts from a clean observation function.
        let transition = env.reset(knapsack()).unwrap();
        assert_eq!(transition.observation, vec![false]);
    }

    #[test]
    fn test_default_information_is_empty() {
        let mut env = Environment::builder(ConfiguringDynamics).seed(0).build();
        assert!(env.reset(knapsack()).unwrap().information.is_empty());
        assert!(env.step(Configuration::new()).unwrap().information.is_empty());
    }

    #[test]
    fn test_termination_ends_episode_early() {
        let mut env = Environment::builder(BranchingDynamics::default())
            .termination(NodeLimit(1))
            .seed(1)
            .build();
        let transition = env.reset(knapsack()).unwrap();
        assert!(transition.done);
        assert!(transition.action_set.is_none());
        assert_eq!(env.phase(), Phase::Terminal);
    }
}
