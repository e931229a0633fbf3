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

use crate::lp::LocalRow;
use rudder_model::index::VariableIndex;
use smallvec::SmallVec;

/// A tightened bound on one variable.
#[derive(Debug, Clone, Copy, PartialEq)]
pub(crate) enum BoundChange {
    Lower(VariableIndex, f64),
    Upper(VariableIndex, f64),
}

impl BoundChange {
    /// Applies the change on top of the given bound vectors, keeping the tighter bound.
    #[inline]
    pub(crate) fn apply(self, lower: &mut [f64], upper: &mut [f64]) {
        match self {
            BoundChange::Lower(var, value) => {
                let j = var.get();
                lower[j] = lower[j].max(value);
            }
            BoundChange::Upper(var, value) => {
                let j = var.get();
                upper[j] = upper[j].min(value);
            }
        }
    }
}

/// An open node of the branch-and-bound tree.
///
/// A node stores the full path of bound changes from the root, so it can be
/// resumed after any number of siblings were explored in between.
#[derive(Debug, Clone)]
pub(crate) struct Node {
    pub(crate) number: u64,
    pub(crate) depth: usize,
    /// LP bound of the parent, used to prune before solving.
    pub(crate) parent_bound: f64,
    pub(crate) changes: SmallVec<[BoundChange; 8]>,
    /// Rows added by sum branching on the path from the root.
    pub(crate) rows: Vec<LocalRow>,
}

impl Node {
    #[inline]
    pub(crate) fn root(bound: f64) -> Self {
        Self {
            number: 1,
            depth: 0,
            parent_bound: bound,
            changes: SmallVec::new(),
            rows: Vec::new(),
        }
    }

    /// A child of `self` with one additional bound change.
    #[inline]
    pub(crate) fn child(&self, number: u64, bound: f64, change: BoundChange) -> Self {
        let mut changes = self.changes.clone();
        changes.push(change);
        Self {
            number,
            depth: self.depth + 1,
            parent_bound: bound,
            changes,
            rows: self.rows.clone(),
        }
    }

    /// A child of `self` with one additional local row.
    pub(crate) fn child_with_row(&self, number: u64, bound: f64, row: LocalRow) -> Self {
        let mut rows = self.rows.clone();
        rows.push(row);
        Self {
            number,
            depth: self.depth + 1,
            parent_bound: bound,
            changes: self.changes.clone(),
            rows,
        }
    }

    /// Node-local bounds derived from the global ones.
    pub(crate) fn bounds(&self, global_lower: &[f64], global_upper: &[f64]) -> (Vec<f64>, Vec<f64>) {
        let mut lower = global_lower.to_vec();
        let mut upper = global_upper.to_vec();
        for change in &self.changes {
            change.apply(&mut lower, &mut upper);
        }
        (lower, upper)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_child_accumulates_changes() {
        let root = Node::root(f64::NEG_INFINITY);
        let x = VariableIndex::new(0);
        let a = root.child(2, 1.0, BoundChange::Upper(x, 3.0));
        let b = a.child(3, 1.0, BoundChange::Lower(x, 1.0));
        assert_eq!(b.depth, 2);
        assert_eq!(b.changes.len(), 2);

        let (lo, up) = b.bounds(&[0.0], &[10.0]);
        assert_eq!(lo, vec![1.0]);
        assert_eq!(up, vec![3.0]);
    }

    #[test]
    fn test_row_child_keeps_bound_changes() {
        let x = VariableIndex::new(0);
        let y = VariableIndex::new(1);
        let a = Node::root(0.0).child(2, 0.0, BoundChange::Lower(x, 1.0));
        let b = a.child_with_row(
            3,
            0.0,
            LocalRow::sum(&[x, y], rudder_model::problem::ConstraintSense::LessEqual, 1.0),
        );
        assert_eq!(b.depth, 2);
        assert_eq!(b.changes.len(), 1);
        assert_eq!(b.rows.len(), 1);
        assert!(a.rows.is_empty());
    }

    #[test]
    fn test_looser_change_is_ignored() {
        let x = VariableIndex::new(0);
        let mut lo = vec![2.0];
        let mut up = vec![4.0];
        BoundChange::Lower(x, 1.0).apply(&mut lo, &mut up);
        BoundChange::Upper(x, 5.0).apply(&mut lo, &mut up);
        assert_eq!((lo[0], up[0]), (2.0, 4.0));
    }
}
