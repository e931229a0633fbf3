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

use crate::index::VariableIndex;

/// A primal solution of a problem.
///
/// Values are indexed directly by `VariableIndex` (position `j` holds the
/// value of variable `j`).
#[derive(Clone, Debug, PartialEq)]
pub struct Solution {
    /// Objective value in the problem's own sense.
    objective_value: f64,
    values: Vec<f64>,
}

impl Solution {
    /// Constructs a new `Solution`.
    #[inline]
    pub fn new(objective_value: f64, values: Vec<f64>) -> Self {
        Self {
            objective_value,
            values,
        }
    }

    /// Returns the value assigned to a variable.
    ///
    /// # Panics
    ///
    /// Panics if `var` is out of bounds.
    #[inline]
    pub fn value(&self, var: VariableIndex) -> f64 {
        debug_assert!(
            var.get() < self.num_variables(),
            "called `Solution::value` with variable index out of bounds: the len is {} but the index is {}",
            self.num_variables(),
            var.get()
        );
        self.values[var.get()]
    }

    #[inline]
    pub fn num_variables(&self) -> usize {
        self.values.len()
    }

    #[inline]
    pub fn objective_value(&self) -> f64 {
        self.objective_value
    }

    #[inline]
    pub fn values(&self) -> &[f64] {
        &self.values
    }
}

impl std::fmt::Display for Solution {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        writeln!(f, "Solution Summary")?;
        writeln!(f, "   Objective Value: {}", self.objective_value)?;
        if self.values.is_empty() {
            return writeln!(f, "   (No variables)");
        }
        for (j, value) in self.values.iter().enumerate() {
            if *value != 0.0 {
                writeln!(f, "   x[{j}] = {value}")?;
            }
        }
        Ok(())
    }
}
