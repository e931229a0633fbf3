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

//! Problem file loader.
//!
//! This module turns whitespace-delimited text streams into a validated
//! [`Problem`]. The format is keyword driven, so sections can be separated by
//! arbitrary whitespace and annotated with `#` comments:
//!
//! ```raw
//! problem <name>
//! minimize | maximize
//! variables <n>
//!   <name> <binary|integer|continuous> <objective> <lower> <upper>     (n times)
//! constraints <m>
//!   <name> <le|ge|eq> <rhs> <k> (<variable> <coefficient>){k}           (m times)
//! end
//! ```
//!
//! Bounds accept `inf` and `-inf`. The trailing `end` is optional. Variables
//! must be declared before a constraint references them; sections may appear
//! several times.
//!
//! The parser accepts any `BufRead`, file path, raw reader, or string slice.
//! Every parse error carries the line it was found on.

use crate::problem::{
    ConstraintSense, ObjectiveSense, Problem, ProblemBuilder, ProblemError, VariableKind,
};
use log::debug;
use std::{
    fs::File,
    io::{BufRead, BufReader, Read},
    path::Path,
    str::FromStr,
};

/// The error type for the problem loading process.
#[derive(Debug, thiserror::Error)]
pub enum LoadError {
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
    #[error("unexpected end of file while parsing problem")]
    UnexpectedEof,
    #[error("line {line}: could not parse token '{token}' as {type_name}")]
    Parse {
        token: String,
        type_name: &'static str,
        line: usize,
    },
    #[error("line {line}: expected {expected}, found '{token}'")]
    UnexpectedToken {
        token: String,
        expected: &'static str,
        line: usize,
    },
    #[error("line {line}: unknown variable '{name}'")]
    UnknownVariable { name: String, line: usize },
    #[error("problem declares no variables")]
    NoVariables,
    #[error("invalid problem: {0}")]
    Problem(#[from] ProblemError),
}

/// A configurable loader for problem files.
///
/// # Configuration
/// * `allow_empty`: accept files that declare no variables (rejected by default).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct ProblemLoader {
    allow_empty: bool,
}

impl ProblemLoader {
    /// Creates a new `ProblemLoader` with default settings.
    #[inline]
    pub fn new() -> Self {
        Self::default()
    }

    /// Configures whether a problem without variables is accepted.
    #[inline]
    pub fn allow_empty(mut self, yes: bool) -> Self {
        self.allow_empty = yes;
        self
    }

    /// Loads a problem from a type implementing `BufRead`.
    pub fn from_bufread<R: BufRead>(&self, rdr: R) -> Result<Problem, LoadError> {
        let mut sc = Scanner::new(rdr);
        let mut builder = ProblemBuilder::new("unnamed");

        while let Some(keyword) = sc.next_token()? {
            match keyword.as_str() {
                "problem" => {
                    let name = sc.next_required()?;
                    builder.set_name(name);
                }
                "minimize" | "min" => {
                    builder.set_sense(ObjectiveSense::Minimize);
                }
                "maximize" | "max" => {
                    builder.set_sense(ObjectiveSense::Maximize);
                }
                "variables" => {
                    let count: usize = sc.next()?;
                    for _ in 0..count {
                        self.read_variable(&mut sc, &mut builder)?;
                    }
                }
                "constraints" => {
                    let count: usize = sc.next()?;
                    for _ in 0..count {
                        self.read_constraint(&mut sc, &mut builder)?;
                    }
                }
                "end" => break,
                _ => {
                    return Err(LoadError::UnexpectedToken {
                        token: keyword,
                        expected: "a section keyword",
                        line: sc.line(),
                    });
                }
            }
        }

        if !self.allow_empty && builder.num_variables() == 0 {
            return Err(LoadError::NoVariables);
        }

        let problem = builder.build();
        debug!(
            "loaded problem '{}': {} variables, {} constraints",
            problem.name(),
            problem.num_variables(),
            problem.num_constraints()
        );
        Ok(problem)
    }

    fn read_variable<R: BufRead>(
        &self,
        sc: &mut Scanner<R>,
        builder: &mut ProblemBuilder,
    ) -> Result<(), LoadError> {
        let name = sc.next_required()?;
        let kind_token = sc.next_required()?;
        let kind = match kind_token.as_str() {
            "binary" | "bin" => VariableKind::Binary,
            "integer" | "int" => VariableKind::Integer,
            "continuous" | "cont" => VariableKind::Continuous,
            _ => {
                return Err(LoadError::UnexpectedToken {
                    token: kind_token,
                    expected: "a variable kind",
                    line: sc.line(),
                });
            }
        };
        let objective: f64 = sc.next()?;
        let lower: f64 = sc.next()?;
        let upper: f64 = sc.next()?;
        builder.add_variable(name, kind, objective, lower, upper)?;
        Ok(())
    }

    fn read_constraint<R: BufRead>(
        &self,
        sc: &mut Scanner<R>,
        builder: &mut ProblemBuilder,
    ) -> Result<(), LoadError> {
        let name = sc.next_required()?;
        let sense_token = sc.next_required()?;
        let sense = match sense_token.as_str() {
            "le" | "<=" => ConstraintSense::LessEqual,
            "ge" | ">=" => ConstraintSense::GreaterEqual,
            "eq" | "=" => ConstraintSense::Equal,
            _ => {
                return Err(LoadError::UnexpectedToken {
                    token: sense_token,
                    expected: "a constraint sense",
                    line: sc.line(),
                });
            }
        };
        let rhs: f64 = sc.next()?;
        let nonzeros: usize = sc.next()?;

        let mut entries = Vec::with_capacity(nonzeros);
        for _ in 0..nonzeros {
            let var_name = sc.next_required()?;
            let var = builder
                .variable_by_name(&var_name)
                .ok_or_else(|| LoadError::UnknownVariable {
                    name: var_name,
                    line: sc.line(),
                })?;
            let coef: f64 = sc.next()?;
            entries.push((var, coef));
        }
        builder.add_constraint(name, entries, sense, rhs)?;
        Ok(())
    }

    /// Loads a problem from a file path.
    #[inline]
    pub fn from_path<P: AsRef<Path>>(&self, path: P) -> Result<Problem, LoadError> {
        let file = File::open(path)?;
        self.from_bufread(BufReader::new(file))
    }

    /// Loads a problem from a generic reader.
    #[inline]
    pub fn from_reader<R: Read>(&self, r: R) -> Result<Problem, LoadError> {
        self.from_bufread(BufReader::new(r))
    }

    /// Loads a problem from a string slice.
    #[inline]
    pub fn from_str(&self, s: &str) -> Result<Problem, LoadError> {
        self.from_reader(s.as_bytes())
    }
}

/// Reads whitespace-delimited tokens, skipping `#` comments and tracking lines.
struct Scanner<R> {
    rdr: R,
    buf: String,
    pos: usize,
    line: usize,
}

impl<R: BufRead> Scanner<R> {
    #[inline]
    fn new(rdr: R) -> Self {
        Self {
            rdr,
            buf: String::new(),
            pos: 0,
            line: 0,
        }
    }

    /// The 1-based line of the last token read.
    #[inline]
    fn line(&self) -> usize {
        self.line
    }

    /// Refills the line buffer. `Ok(false)` on EOF.
    fn fill_line(&mut self) -> Result<bool, LoadError> {
        self.buf.clear();
        self.pos = 0;
        let n = self.rdr.read_line(&mut self.buf)?;
        if n > 0 {
            self.line += 1;
            if let Some(comment) = self.buf.find('#') {
                self.buf.truncate(comment);
            }
        }
        Ok(n > 0)
    }

    /// Next token, or `None` at end of input.
    fn next_token(&mut self) -> Result<Option<String>, LoadError> {
        loop {
            let rest = &self.buf[self.pos..];
            let trimmed = rest.trim_start();
            if trimmed.is_empty() {
                if !self.fill_line()? {
                    return Ok(None);
                }
                continue;
            }
            let start = self.pos + (rest.len() - trimmed.len());
            let len = trimmed
                .find(char::is_whitespace)
                .unwrap_or(trimmed.len());
            self.pos = start + len;
            return Ok(Some(self.buf[start..start + len].to_owned()));
        }
    }

    /// Next token; end of input is an error.
    #[inline]
    fn next_required(&mut self) -> Result<String, LoadError> {
        self.next_token()?.ok_or(LoadError::UnexpectedEof)
    }

    /// Next token parsed into `T`.
    fn next<T: FromStr>(&mut self) -> Result<T, LoadError> {
        let token = self.next_required()?;
        token.parse::<T>().map_err(|_| LoadError::Parse {
            token,
            type_name: std::any::type_name::<T>(),
            line: self.line,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::index::VariableIndex;

    const SMALL_PROBLEM: &str = r#"
        # a tiny knapsack
        problem knap
        maximize
        variables 3
          a binary 5 0 1
          b binary 4 0 1
          c integer 3 0 inf   # unbounded above
        constraints 1
          cap le 6 3  a 4  b 3  c 2
        end
    "#;

    #[test]
    fn test_loads_and_maps_correctly() {
        let p = ProblemLoader::new().from_str(SMALL_PROBLEM).unwrap();
        assert_eq!(p.name(), "knap");
        assert_eq!(p.sense(), ObjectiveSense::Maximize);
        assert_eq!(p.num_variables(), 3);
        assert_eq!(p.num_constraints(), 1);
        assert_eq!(p.upper_bounds()[2], f64::INFINITY);

        let row = &p.constraints()[0];
        assert_eq!(row.rhs(), 6.0);
        assert_eq!(row.sense(), ConstraintSense::LessEqual);
        assert_eq!(
            row.coefficients(),
            &[
                (VariableIndex::new(0), 4.0),
                (VariableIndex::new(1), 3.0),
                (VariableIndex::new(2), 2.0)
            ]
        );
    }

    #[test]
    fn test_parse_error_reports_token_and_line() {
        let data = "problem p\nvariables 1\n x integer five 0 1\n";
        match ProblemLoader::new().from_str(data) {
            Err(LoadError::Parse {
                token,
                type_name,
                line,
            }) => {
                assert_eq!(token, "five");
                assert!(type_name.contains("f64"));
                assert_eq!(line, 3);
            }
            other => panic!("expected parse error, got {other:?}"),
        }
    }

    #[test]
    fn test_unknown_variable_in_constraint() {
        let data = "variables 1 x integer 1 0 1 constraints 1 r le 1 1 y 1";
        assert!(matches!(
            ProblemLoader::new().from_str(data),
            Err(LoadError::UnknownVariable { ref name, .. }) if name == "y"
        ));
    }

    #[test]
    fn test_truncated_input_is_unexpected_eof() {
        let data = "variables 2 x integer 1 0 1";
        assert!(matches!(
            ProblemLoader::new().from_str(data),
            Err(LoadError::UnexpectedEof)
        ));
    }

    #[test]
    fn test_empty_problem_rejected_unless_allowed() {
        assert!(matches!(
            ProblemLoader::new().from_str("problem empty"),
            Err(LoadError::NoVariables)
        ));
        let p = ProblemLoader::new()
            .allow_empty(true)
            .from_str("problem empty")
            .unwrap();
        assert_eq!(p.num_variables(), 0);
    }

    #[test]
    fn test_unknown_keyword() {
        assert!(matches!(
            ProblemLoader::new().from_str("objective 3"),
            Err(LoadError::UnexpectedToken { .. })
        ));
    }

    #[test]
    fn test_missing_file_is_io_error() {
        assert!(matches!(
            ProblemLoader::new().from_path("/definitely/not/here.rp"),
            Err(LoadError::Io(_))
        ));
    }
}
