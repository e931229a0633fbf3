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

#![allow(dead_code)]

use rudder_bnb::model::Model;
use rudder_model::problem::{ConstraintSense, ObjectiveSense, ProblemBuilder, VariableKind};
use std::{fs, path::Path};

pub fn init_logging() {
    let _ = env_logger::builder().is_test(true).try_init();
}

/// A knapsack whose root relaxation is fractional. Optimum 12.
pub fn knapsack() -> Model {
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

/// A set of knapsack constraints over `n` integer variables.
pub fn multi_knapsack(n: usize) -> Model {
    let mut b = ProblemBuilder::new(format!("multi{n}"));
    b.set_sense(ObjectiveSense::Maximize);
    let vars: Vec<_> = (0..n)
        .map(|i| {
            let profit = 3.0 + ((i * 7) % 11) as f64;
            b.add_variable(format!("x{i}"), VariableKind::Integer, profit, 0.0, 3.0)
                .unwrap()
        })
        .collect();
    for k in 0..3 {
        let row: Vec<_> = vars
            .iter()
            .enumerate()
            .map(|(i, &v)| (v, 2.0 + ((i + 3 * k) % 5) as f64))
            .collect();
        b.add_constraint(format!("c{k}"), row, ConstraintSense::LessEqual, 4.5 * n as f64)
            .unwrap();
    }
    Model::from_problem(b.build())
}

/// Writes a small knapsack problem file named `name` into `dir`.
pub fn write_problem(dir: &Path, name: &str, capacity: f64) {
    let text = format!(
        "problem {name}\n\
         maximize\n\
         variables 3\n\
         \x20 a binary 5 0 1\n\
         \x20 b binary 4 0 1\n\
         \x20 c binary 3 0 1\n\
         constraints 1\n\
         \x20 cap le {capacity} 3 a 2 b 3 c 1\n\
         end\n"
    );
    fs::write(dir.join(format!("{name}.lp")), text).unwrap();
}
