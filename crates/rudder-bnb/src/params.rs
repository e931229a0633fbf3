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

//! The solver's parameter table and its typed, validated view.

use crate::{
    branching::{BranchingRule, ChildSelection},
    error::SolverError,
};
use rudder_model::param::ParamSet;
use std::time::Duration;

/// Time limits at or above this value mean "no limit".
pub const INFINITE_TIME: f64 = 1e20;

const SEED_RANGE: Option<(f64, f64)> = Some((0.0, i32::MAX as f64));

/// Returns the registry of every parameter the solver understands, at its default.
pub fn default_params() -> ParamSet {
    ParamSet::new()
        .with(
            "limits/time",
            "maximal time in seconds to run",
            INFINITE_TIME,
            Some((0.0, INFINITE_TIME)),
        )
        .with(
            "limits/nodes",
            "maximal number of nodes to process (-1: no limit)",
            -1i64,
            Some((-1.0, i64::MAX as f64)),
        )
        .with(
            "limits/solutions",
            "solving stops if this many improving solutions were found (-1: no limit)",
            -1i32,
            Some((-1.0, i32::MAX as f64)),
        )
        .with(
            "numerics/feastol",
            "feasibility and integrality tolerance",
            rudder_core::tolerance::DEFAULT_FEASTOL,
            Some((1e-12, 1e-1)),
        )
        .with(
            "branching/rule",
            "default branching rule ('f'ractional, 'i'ndex, 'r'andom)",
            'f',
            None,
        )
        .with(
            "nodeselection/childsel",
            "child explored first ('d'own, 'u'p)",
            'd',
            None,
        )
        .with(
            "randomization/permutevars",
            "permute the variable order used to break ties",
            false,
            None,
        )
        .with(
            "randomization/permuteconss",
            "permute the constraint order of the relaxation",
            false,
            None,
        )
        .with(
            "randomization/permutationseed",
            "seed for the variable and constraint permutations",
            0i32,
            SEED_RANGE,
        )
        .with(
            "randomization/randomseedshift",
            "seed for randomized default branching",
            0i32,
            SEED_RANGE,
        )
        .with(
            "randomization/lpseed",
            "seed for the simplex column order (0: natural order)",
            0i32,
            SEED_RANGE,
        )
        .with(
            "display/verblevel",
            "verbosity of solver logging (0: none, 1: summary, 2+: per node)",
            0i32,
            Some((0.0, 5.0)),
        )
        .with("display/prefix", "prefix of solver log lines", "", None)
}

/// Typed solver configuration read from a [`ParamSet`] at solve start.
#[derive(Debug, Clone, PartialEq)]
pub struct SolverSettings {
    pub time_limit: Option<Duration>,
    pub node_limit: Option<u64>,
    pub solution_limit: Option<u64>,
    pub feastol: f64,
    pub branching_rule: BranchingRule,
    pub child_selection: ChildSelection,
    pub permute_vars: bool,
    pub permute_conss: bool,
    pub permutation_seed: u64,
    pub random_seed_shift: u64,
    pub lp_seed: u64,
    pub verbosity: i32,
    pub prefix: String,
}

impl Default for SolverSettings {
    fn default() -> Self {
        Self {
            time_limit: None,
            node_limit: None,
            solution_limit: None,
            feastol: rudder_core::tolerance::DEFAULT_FEASTOL,
            branching_rule: BranchingRule::default(),
            child_selection: ChildSelection::default(),
            permute_vars: false,
            permute_conss: false,
            permutation_seed: 0,
            random_seed_shift: 0,
            lp_seed: 0,
            verbosity: 0,
            prefix: String::new(),
        }
    }
}

impl SolverSettings {
    pub fn from_params(params: &ParamSet) -> Result<Self, SolverError> {
        let time = params.get_as::<f64>("limits/time")?;
        let nodes = params.get_as::<i64>("limits/nodes")?;
        let solutions = params.get_as::<i32>("limits/solutions")?;

        let rule = params.get_as::<char>("branching/rule")?;
        let branching_rule =
            BranchingRule::from_char(rule).ok_or_else(|| SolverError::InvalidSetting {
                name: "branching/rule",
                value: rule.to_string(),
            })?;
        let childsel = params.get_as::<char>("nodeselection/childsel")?;
        let child_selection =
            ChildSelection::from_char(childsel).ok_or_else(|| SolverError::InvalidSetting {
                name: "nodeselection/childsel",
                value: childsel.to_string(),
            })?;

        Ok(Self {
            time_limit: (time < INFINITE_TIME).then(|| Duration::from_secs_f64(time)),
            node_limit: u64::try_from(nodes).ok(),
            solution_limit: u64::try_from(solutions).ok(),
            feastol: params.get_as::<f64>("numerics/feastol")?,
            branching_rule,
            child_selection,
            permute_vars: params.get_as::<bool>("randomization/permutevars")?,
            permute_conss: params.get_as::<bool>("randomization/permuteconss")?,
            permutation_seed: seed(params, "randomization/permutationseed")?,
            random_seed_shift: seed(params, "randomization/randomseedshift")?,
            lp_seed: seed(params, "randomization/lpseed")?,
            verbosity: params.get_as::<i32>("display/verblevel")?,
            prefix: params.get_as::<String>("display/prefix")?,
        })
    }
}

#[inline]
fn seed(params: &ParamSet, name: &str) -> Result<u64, SolverError> {
    // Range-checked to [0, i32::MAX] on registration.
    Ok(params.get_as::<i32>(name)?.max(0) as u64)
}
