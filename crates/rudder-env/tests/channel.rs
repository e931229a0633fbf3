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

mod common;

use common::{init_logging, knapsack};
use rudder_bnb::{
    callback::{CallbackConfig, CallbackResult},
    error::SolverError,
    result::SolveStatus,
};
use rudder_env::control::{ControlError, Decision, Resolution, ReverseControl};
use std::time::Duration;

#[test]
fn test_controller_and_worker_alternate() {
    init_logging();
    let mut channel = ReverseControl::new(knapsack(), CallbackConfig::branching()).unwrap();
    let mut token = channel.wait().unwrap();
    let mut suspensions = 0;
    let mut last_node = None;
    while !channel.is_done(&token).unwrap() {
        let state = channel.state(&token).unwrap();
        // Each suspension is a distinct branching decision.
        assert_ne!(last_node, Some(state.node_number));
        last_node = Some(state.node_number);
        suspensions += 1;
        channel.resume(Decision::Default, token).unwrap();
        token = channel.wait().unwrap();
    }
    assert!(suspensions >= 1);
    channel.join(token).unwrap();
    assert_eq!(channel.take_model().unwrap().status(), SolveStatus::Optimal);
}

#[test]
fn test_wait_while_holding_token_fails() {
    let mut channel = ReverseControl::new(knapsack(), CallbackConfig::branching()).unwrap();
    let token = channel.wait().unwrap();
    assert!(matches!(channel.wait(), Err(ControlError::Sequencing(_))));
    // The held token is still valid.
    channel.resume(Decision::Default, token).unwrap();
    let token = channel.wait().unwrap();
    channel.join(token).unwrap();
}

#[test]
fn test_foreign_token_is_rejected() {
    let mut a = ReverseControl::new(knapsack(), CallbackConfig::branching()).unwrap();
    let mut b = ReverseControl::new(knapsack(), CallbackConfig::branching()).unwrap();
    let token_a = a.wait().unwrap();
    let token_b = b.wait().unwrap();
    assert!(matches!(a.state(&token_b), Err(ControlError::ForeignToken)));
    assert!(matches!(a.is_done(&token_b), Err(ControlError::ForeignToken)));
    assert!(!a.is_done(&token_a).unwrap());
    assert!(matches!(
        a.resume(Decision::Default, token_b),
        Err(ControlError::ForeignToken)
    ));
    a.join(token_a).unwrap();
    drop(b);
}

#[test]
fn test_solver_error_is_delivered_once() {
    let mut channel = ReverseControl::new(knapsack(), CallbackConfig::branching()).unwrap();
    let token = channel.wait().unwrap();
    let bogus = rudder_model::index::VariableIndex::new(1000);
    channel
        .resume(Decision::resolve(CallbackResult::Branched(bogus)), token)
        .unwrap();

    let err = channel.wait().unwrap_err();
    assert!(matches!(
        err,
        ControlError::Solver(SolverError::InvalidBranching { .. })
    ));
    // The failure was consumed; the channel now reports a finished solve.
    let token = channel.wait().unwrap();
    assert!(channel.is_done(&token).unwrap());
    channel.join(token).unwrap();
}

#[test]
fn test_callback_error_surfaces_on_wait() {
    let mut channel = ReverseControl::new(knapsack(), CallbackConfig::branching()).unwrap();
    let token = channel.wait().unwrap();
    channel
        .resume(
            Decision::act(|_| Err(SolverError::Callback("policy failed".to_owned()))),
            token,
        )
        .unwrap();
    let err = channel.wait().unwrap_err();
    assert!(matches!(err, ControlError::Solver(SolverError::Callback(_))));
}

#[test]
fn test_worker_panic_is_captured() {
    let mut channel = ReverseControl::new(knapsack(), CallbackConfig::branching()).unwrap();
    let token = channel.wait().unwrap();
    channel
        .resume(Decision::act(|_| panic!("policy exploded")), token)
        .unwrap();
    match channel.wait() {
        Err(ControlError::Solver(SolverError::Panicked(msg))) => {
            assert!(msg.contains("policy exploded"));
        }
        other => panic!("expected a captured panic, got {other:?}"),
    }
}

#[test]
fn test_drop_without_wait_does_not_deadlock() {
    init_logging();
    for _ in 0..8 {
        let channel = ReverseControl::new(knapsack(), CallbackConfig::branching()).unwrap();
        drop(channel);
    }
}

#[test]
fn test_drop_while_worker_runs_does_not_deadlock() {
    let mut channel = ReverseControl::new(knapsack(), CallbackConfig::branching()).unwrap();
    let token = channel.wait().unwrap();
    channel
        .resume(
            Decision::act(|_| {
                std::thread::sleep(Duration::from_millis(20));
                Ok(Resolution::Return(CallbackResult::DidNotRun))
            }),
            token,
        )
        .unwrap();
    drop(channel);
}

#[test]
fn test_hold_suspends_at_same_point() {
    let mut channel = ReverseControl::new(knapsack(), CallbackConfig::branching()).unwrap();
    let token = channel.wait().unwrap();
    let before = channel.state(&token).unwrap();
    channel
        .resume(Decision::act(|_| Ok(Resolution::Hold)), token)
        .unwrap();
    let token = channel.wait().unwrap();
    let after = channel.state(&token).unwrap();
    assert_eq!(before.node_number, after.node_number);
    assert_eq!(before.lp_candidates, after.lp_candidates);
    channel.join(token).unwrap();
}

#[test]
fn test_join_is_idempotent() {
    let mut channel = ReverseControl::new(knapsack(), CallbackConfig::branching()).unwrap();
    let token = channel.wait().unwrap();
    channel.join(token).unwrap();
    let token = channel.wait().unwrap();
    assert!(channel.is_done(&token).unwrap());
    channel.join(token).unwrap();
    assert!(matches!(
        channel.wait().map(|token| channel.resume(Decision::Default, token)),
        Ok(Err(ControlError::Finished))
    ));
}
