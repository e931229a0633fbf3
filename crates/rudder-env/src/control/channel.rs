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

use crate::control::{ControlError, ControlToken};
use log::{debug, trace};
use parking_lot::{Condvar, Mutex};
use rudder_bnb::{
    callback::{CallbackConfig, CallbackResult, DecisionCallback, DecisionContext, DecisionPoint},
    error::SolverError,
    model::Model,
    state::SolverState,
};
use std::{
    panic::{AssertUnwindSafe, catch_unwind},
    sync::{
        Arc,
        atomic::{AtomicU64, Ordering},
    },
    thread::{self, JoinHandle},
};

static NEXT_CHANNEL_ID: AtomicU64 = AtomicU64::new(1);

/// Work the controller sends to the worker, run inside the decision callback.
pub type WorkerAction =
    Box<dyn FnOnce(&mut DecisionContext<'_>) -> Result<Resolution, SolverError> + Send>;

/// The value a suspended callback is resumed with.
pub enum Decision {
    /// Let the solver decide.
    Default,
    /// Run the action on the worker at the current decision point.
    Act(WorkerAction),
}

impl Decision {
    /// Wraps a closure as a [`Decision::Act`].
    #[inline]
    pub fn act<F>(action: F) -> Self
    where
        F: FnOnce(&mut DecisionContext<'_>) -> Result<Resolution, SolverError> + Send + 'static,
    {
        Decision::Act(Box::new(action))
    }

    /// Resolves the decision point with `result` directly.
    #[inline]
    pub fn resolve(result: CallbackResult) -> Self {
        Decision::act(move |_| Ok(Resolution::Return(result)))
    }
}

impl std::fmt::Debug for Decision {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Decision::Default => write!(f, "Default"),
            Decision::Act(_) => write!(f, "Act(..)"),
        }
    }
}

/// What a [`Decision::Act`] closure asks of the callback.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Resolution {
    /// Leave the decision point with this result.
    Return(CallbackResult),
    /// Suspend again at the same decision point.
    Hold,
}

/// State shared between the controller and the worker, guarded by one mutex.
#[derive(Default)]
struct Cell {
    /// `true` while the worker runs; the controller runs otherwise.
    worker_active: bool,
    terminate: bool,
    finished: bool,
    token_out: bool,
    pending: Option<Decision>,
    snapshot: Option<SolverState>,
    failure: Option<SolverError>,
    model: Option<Model>,
}

#[derive(Default)]
struct Shared {
    cell: Mutex<Cell>,
    turn: Condvar,
}

/// The decision callback installed on the worker's model.
struct SuspendingCallback {
    shared: Arc<Shared>,
}

impl DecisionCallback for SuspendingCallback {
    fn on_decision(
        &mut self,
        point: DecisionPoint,
        ctx: &mut DecisionContext<'_>,
    ) -> Result<CallbackResult, SolverError> {
        loop {
            let snapshot = ctx.state();
            let decision = {
                let mut cell = self.shared.cell.lock();
                if cell.terminate {
                    return Ok(CallbackResult::Interrupt);
                }
                cell.snapshot = Some(snapshot);
                cell.worker_active = false;
                self.shared.turn.notify_all();
                self.shared.turn.wait_while(&mut cell, |c| !c.worker_active);
                if cell.terminate {
                    return Ok(CallbackResult::Interrupt);
                }
                cell.pending.take().unwrap_or(Decision::Default)
            };

            trace!(
                target: "rudder_env::control",
                node = ctx.node_number();
                "resumed at {point} point with {decision:?}"
            );
            match decision {
                Decision::Default => return Ok(CallbackResult::DidNotRun),
                Decision::Act(action) => match action(ctx)? {
                    Resolution::Return(result) => return Ok(result),
                    Resolution::Hold => continue,
                },
            }
        }
    }
}

fn panic_message(payload: &(dyn std::any::Any + Send)) -> String {
    if let Some(s) = payload.downcast_ref::<&str>() {
        (*s).to_owned()
    } else if let Some(s) = payload.downcast_ref::<String>() {
        s.clone()
    } else {
        "unknown panic payload".to_owned()
    }
}

fn run_worker(shared: Arc<Shared>, mut model: Model, config: CallbackConfig) {
    let callback = SuspendingCallback {
        shared: Arc::clone(&shared),
    };
    let outcome = model
        .include_callback(config, Box::new(callback))
        .and_then(|()| {
            catch_unwind(AssertUnwindSafe(|| model.solve()))
                .unwrap_or_else(|payload| Err(SolverError::Panicked(panic_message(&*payload))))
        });
    model.remove_callback();

    match &outcome {
        Ok(status) => debug!(target: "rudder_env::control", "solver thread finished: {status}"),
        Err(err) => debug!(target: "rudder_env::control", "solver thread failed: {err}"),
    }

    let mut cell = shared.cell.lock();
    cell.snapshot = Some(model.state());
    cell.failure = outcome.err();
    cell.model = Some(model);
    cell.finished = true;
    cell.worker_active = false;
    shared.turn.notify_all();
}

/// A solve running on its own thread, suspended at every decision point.
pub struct ReverseControl {
    id: u64,
    shared: Arc<Shared>,
    handle: Option<JoinHandle<()>>,
}

impl std::fmt::Debug for ReverseControl {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ReverseControl")
            .field("id", &self.id)
            .field("joined", &self.handle.is_none())
            .finish_non_exhaustive()
    }
}

impl ReverseControl {
    /// Moves `model` onto a new worker thread and starts solving it with a
    /// suspending callback at the points named by `config`. Does not block.
    pub fn new(model: Model, config: CallbackConfig) -> Result<Self, ControlError> {
        let id = NEXT_CHANNEL_ID.fetch_add(1, Ordering::Relaxed);
        let shared = Arc::new(Shared::default());
        shared.cell.lock().worker_active = true;

        let worker_shared = Arc::clone(&shared);
        let handle = thread::Builder::new()
            .name(format!("rudder-solve-{id}"))
            .spawn(move || run_worker(worker_shared, model, config))
            .map_err(ControlError::Spawn)?;
        debug!(target: "rudder_env::control", "spawned solver thread for channel {id}");

        Ok(Self {
            id,
            shared,
            handle: Some(handle),
        })
    }

    #[inline]
    pub fn id(&self) -> u64 {
        self.id
    }

    #[inline]
    fn check_token(&self, token: &ControlToken) -> Result<(), ControlError> {
        if token.channel_id() == self.id {
            Ok(())
        } else {
            Err(ControlError::ForeignToken)
        }
    }

    /// Blocks until the worker is suspended or finished and hands the turn to
    /// the caller.
    ///
    /// # Errors
    ///
    /// - [`ControlError::Sequencing`] if the caller already holds the token.
    /// - [`ControlError::Solver`] once, if the solve failed or panicked.
    pub fn wait(&mut self) -> Result<ControlToken, ControlError> {
        let mut cell = self.shared.cell.lock();
        if cell.token_out {
            return Err(ControlError::Sequencing(
                "wait called while holding the control token",
            ));
        }
        self.shared.turn.wait_while(&mut cell, |c| c.worker_active);
        if let Some(err) = cell.failure.take() {
            return Err(ControlError::Solver(err));
        }
        cell.token_out = true;
        Ok(ControlToken::new(self.id))
    }

    /// Gives the turn back to the worker with `decision`. Returns immediately.
    ///
    /// # Errors
    ///
    /// - [`ControlError::ForeignToken`] for a token of another channel.
    /// - [`ControlError::Finished`] if the worker has already finished.
    pub fn resume(&mut self, decision: Decision, token: ControlToken) -> Result<(), ControlError> {
        self.check_token(&token)?;
        let mut cell = self.shared.cell.lock();
        cell.token_out = false;
        if cell.finished {
            return Err(ControlError::Finished);
        }
        cell.pending = Some(decision);
        cell.worker_active = true;
        self.shared.turn.notify_all();
        Ok(())
    }

    /// Whether the worker has permanently finished.
    ///
    /// # Errors
    ///
    /// Returns [`ControlError::ForeignToken`] for a token of another channel.
    pub fn is_done(&self, token: &ControlToken) -> Result<bool, ControlError> {
        self.check_token(token)?;
        Ok(self.shared.cell.lock().finished)
    }

    /// The latest snapshot published by the worker.
    pub fn state(&self, token: &ControlToken) -> Result<SolverState, ControlError> {
        self.check_token(token)?;
        Ok(self.shared.cell.lock().snapshot.clone().unwrap_or_default())
    }

    /// Stops the worker if it is still solving and joins it.
    ///
    /// Reports a captured failure that no `wait` delivered yet. Joining a
    /// finished channel again succeeds without effect.
    pub fn join(&mut self, token: ControlToken) -> Result<(), ControlError> {
        self.check_token(&token)?;
        self.shared.cell.lock().token_out = false;
        self.shutdown()
    }

    /// The model, once the worker has finished and until it is taken.
    pub fn take_model(&mut self) -> Option<Model> {
        let mut cell = self.shared.cell.lock();
        if cell.finished { cell.model.take() } else { None }
    }

    /// Stops and joins the worker without a token.
    ///
    /// Used to recover the model when the caller gave up its turn on an error.
    pub(crate) fn shutdown(&mut self) -> Result<(), ControlError> {
        {
            let mut cell = self.shared.cell.lock();
            self.shared.turn.wait_while(&mut cell, |c| c.worker_active);
            if !cell.finished {
                debug!(target: "rudder_env::control", "terminating solver thread of channel {}", self.id);
                cell.terminate = true;
                cell.pending = Some(Decision::Default);
                cell.worker_active = true;
                self.shared.turn.notify_all();
                self.shared.turn.wait_while(&mut cell, |c| !c.finished);
            }
        }

        if let Some(handle) = self.handle.take() {
            if handle.join().is_err() {
                return Err(ControlError::Solver(SolverError::Panicked(
                    "solver thread panicked outside of the solve".to_owned(),
                )));
            }
            debug!(target: "rudder_env::control", "joined solver thread of channel {}", self.id);
        }

        match self.shared.cell.lock().failure.take() {
            Some(err) => Err(ControlError::Solver(err)),
            None => Ok(()),
        }
    }
}

impl Drop for ReverseControl {
    fn drop(&mut self) {
        if let Err(err) = self.shutdown() {
            debug!(target: "rudder_env::control", "discarding failure of dropped channel {}: {err}", self.id);
        }
    }
}
