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

use criterion::{BenchmarkId, Criterion, Throughput, criterion_group, criterion_main};
use rudder_bnb::{callback::CallbackConfig, model::Model};
use rudder_env::{
    control::{Decision, ReverseControl},
    dynamics::{BranchAction, BranchingDynamics},
    environment::Environment,
};
use rudder_model::problem::{ConstraintSense, ObjectiveSense, ProblemBuilder, VariableKind};
use std::hint::black_box;

fn instance(n: usize) -> Model {
    let mut b = ProblemBuilder::new(format!("bench{n}"));
    b.set_sense(ObjectiveSense::Maximize);
    let vars: Vec<_> = (0..n)
        .map(|i| {
            let profit = 3.0 + ((i * 7) % 11) as f64;
            b.add_variable(format!("x{i}"), VariableKind::Integer, profit, 0.0, 3.0)
                .expect("valid variable")
        })
        .collect();
    for k in 0..3 {
        let row: Vec<_> = vars
            .iter()
            .enumerate()
            .map(|(i, &v)| (v, 2.0 + ((i + 3 * k) % 5) as f64))
            .collect();
        b.add_constraint(format!("c{k}"), row, ConstraintSense::LessEqual, 4.5 * n as f64)
            .expect("valid constraint");
    }
    Model::from_problem(b.build())
}

fn bench_branching_episodes(c: &mut Criterion) {
    let _ = env_logger::builder().is_test(true).try_init();
    let mut group = c.benchmark_group("branching_episode");
    group.sample_size(20);

    for n in [4usize, 8, 12] {
        group.throughput(Throughput::Elements(n as u64));
        group.bench_with_input(BenchmarkId::from_parameter(n), &n, |b, &n| {
            let mut env = Environment::builder(BranchingDynamics::default())
                .seed(0)
                .build();
            b.iter(|| {
                let mut transition = env.reset(instance(n)).expect("reset");
                let mut steps = 0u64;
                while !transition.done {
                    transition = env
                        .step(BranchAction::SolverDefault)
                        .expect("step");
                    steps += 1;
                }
                black_box(steps)
            });
        });
    }
    group.finish();
}

fn bench_channel_handoff(c: &mut Criterion) {
    let mut group = c.benchmark_group("channel_handoff");
    group.bench_function("resume_wait_round_trip", |b| {
        b.iter(|| {
            let mut channel =
                ReverseControl::new(instance(8), CallbackConfig::branching()).expect("spawn");
            let mut token = channel.wait().expect("wait");
            let mut handoffs = 0u64;
            while !channel.is_done(&token).expect("is_done") {
                channel.resume(Decision::Default, token).expect("resume");
                token = channel.wait().expect("wait");
                handoffs += 1;
            }
            channel.join(token).expect("join");
            black_box(handoffs)
        });
    });
    group.finish();
}

criterion_group!(benches, bench_branching_episodes, bench_channel_handoff);
criterion_main!(benches);
