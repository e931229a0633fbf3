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

//! # Typed Solver Parameters
//!
//! Solver behaviour is configured through named parameters such as
//! `limits/time` or `randomization/permutationseed`. Every parameter has a
//! fixed [`ParamType`], a default, and for numeric types an optional range.
//!
//! Values handed to [`ParamSet::set`] are cast to the registered type when
//! the conversion is meaningful (an `i32` for a real parameter, a one-letter
//! string for a char parameter, ...). Conversions that would lose information
//! are rejected with [`ParamError::InvalidCast`].
//!
//! ```rust
//! use rudder_model::param::{ParamSet, ParamValue};
//!
//! let mut params = ParamSet::new();
//! params.register("limits/time", "time budget in seconds", 1e20, Some((0.0, 1e20))).unwrap();
//! params.set("limits/time", 10).unwrap();
//! assert_eq!(params.get_as::<f64>("limits/time").unwrap(), 10.0);
//! ```

use rustc_hash::FxHashMap;

/// The storage type of a parameter.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ParamType {
    Bool,
    Int,
    LongInt,
    Real,
    Char,
    String,
}

impl std::fmt::Display for ParamType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let name = match self {
            ParamType::Bool => "bool",
            ParamType::Int => "int",
            ParamType::LongInt => "long int",
            ParamType::Real => "real",
            ParamType::Char => "char",
            ParamType::String => "string",
        };
        f.write_str(name)
    }
}

/// A parameter value of any supported type.
#[derive(Debug, Clone, PartialEq)]
pub enum ParamValue {
    Bool(bool),
    Int(i32),
    LongInt(i64),
    Real(f64),
    Char(char),
    String(String),
}

/// Errors raised by parameter access.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum ParamError {
    #[error("parameter {0} unknown")]
    Unknown(String),
    #[error("parameter {0} is already registered")]
    Duplicate(String),
    #[error("cannot convert {value} ({from}) to {to}")]
    InvalidCast {
        value: String,
        from: ParamType,
        to: ParamType,
    },
    #[error("parameter {name}: {source}")]
    Rejected {
        name: String,
        #[source]
        source: Box<ParamError>,
    },
    #[error("value {value} out of range [{min}, {max}]")]
    OutOfRange { value: f64, min: f64, max: f64 },
}

impl ParamValue {
    /// The type this value is stored as.
    #[inline]
    pub fn param_type(&self) -> ParamType {
        match self {
            ParamValue::Bool(_) => ParamType::Bool,
            ParamValue::Int(_) => ParamType::Int,
            ParamValue::LongInt(_) => ParamType::LongInt,
            ParamValue::Real(_) => ParamType::Real,
            ParamValue::Char(_) => ParamType::Char,
            ParamValue::String(_) => ParamType::String,
        }
    }

    /// Numeric view used for range checks, `None` for text values.
    #[inline]
    pub fn as_f64(&self) -> Option<f64> {
        match *self {
            ParamValue::Bool(b) => Some(f64::from(u8::from(b))),
            ParamValue::Int(v) => Some(f64::from(v)),
            ParamValue::LongInt(v) => Some(v as f64),
            ParamValue::Real(v) => Some(v),
            ParamValue::Char(_) | ParamValue::String(_) => None,
        }
    }

    /// Converts the value to `to`, failing when information would be lost.
    pub fn cast(self, to: ParamType) -> Result<ParamValue, ParamError> {
        let from = self.param_type();
        if from == to {
            return Ok(self);
        }
        let fail = |value: &ParamValue| ParamError::InvalidCast {
            value: value.to_string(),
            from,
            to,
        };

        let integral = |value: &ParamValue| -> Option<i64> {
            match *value {
                ParamValue::Bool(b) => Some(i64::from(b)),
                ParamValue::Int(v) => Some(i64::from(v)),
                ParamValue::LongInt(v) => Some(v),
                ParamValue::Real(v) if v.fract() == 0.0 && v.abs() < 9.0e15 => Some(v as i64),
                _ => None,
            }
        };

        let cast = match to {
            ParamType::Bool => match integral(&self) {
                Some(0) => Some(ParamValue::Bool(false)),
                Some(1) => Some(ParamValue::Bool(true)),
                _ => None,
            },
            ParamType::Int => integral(&self)
                .and_then(|v| i32::try_from(v).ok())
                .map(ParamValue::Int),
            ParamType::LongInt => integral(&self).map(ParamValue::LongInt),
            ParamType::Real => match self {
                ParamValue::Int(v) => Some(ParamValue::Real(f64::from(v))),
                ParamValue::LongInt(v) => Some(ParamValue::Real(v as f64)),
                _ => None,
            },
            ParamType::Char => match &self {
                ParamValue::String(s) => {
                    let mut chars = s.chars();
                    match (chars.next(), chars.next()) {
                        (Some(c), None) => Some(ParamValue::Char(c)),
                        _ => None,
                    }
                }
                _ => None,
            },
            ParamType::String => match self {
                ParamValue::Char(c) => Some(ParamValue::String(c.to_string())),
                _ => None,
            },
        };
        cast.ok_or_else(|| fail(&self))
    }
}

impl std::fmt::Display for ParamValue {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ParamValue::Bool(v) => write!(f, "{v}"),
            ParamValue::Int(v) => write!(f, "{v}"),
            ParamValue::LongInt(v) => write!(f, "{v}"),
            ParamValue::Real(v) => write!(f, "{v}"),
            ParamValue::Char(v) => write!(f, "'{v}'"),
            ParamValue::String(v) => write!(f, "\"{v}\""),
        }
    }
}

impl From<bool> for ParamValue {
    fn from(v: bool) -> Self {
        ParamValue::Bool(v)
    }
}

impl From<i32> for ParamValue {
    fn from(v: i32) -> Self {
        ParamValue::Int(v)
    }
}

impl From<i64> for ParamValue {
    fn from(v: i64) -> Self {
        ParamValue::LongInt(v)
    }
}

impl From<f64> for ParamValue {
    fn from(v: f64) -> Self {
        ParamValue::Real(v)
    }
}

impl From<char> for ParamValue {
    fn from(v: char) -> Self {
        ParamValue::Char(v)
    }
}

impl From<&str> for ParamValue {
    fn from(v: &str) -> Self {
        ParamValue::String(v.to_owned())
    }
}

impl From<String> for ParamValue {
    fn from(v: String) -> Self {
        ParamValue::String(v)
    }
}

/// Types that can be read out of a [`ParamValue`].
pub trait FromParamValue: Sized {
    const TYPE: ParamType;

    fn from_param(value: ParamValue) -> Option<Self>;
}

macro_rules! impl_from_param_value {
    ($ty:ty, $variant:ident) => {
        impl FromParamValue for $ty {
            const TYPE: ParamType = ParamType::$variant;

            #[inline]
            fn from_param(value: ParamValue) -> Option<Self> {
                match value {
                    ParamValue::$variant(v) => Some(v),
                    _ => None,
                }
            }
        }
    };
}

impl_from_param_value!(bool, Bool);
impl_from_param_value!(i32, Int);
impl_from_param_value!(i64, LongInt);
impl_from_param_value!(f64, Real);
impl_from_param_value!(char, Char);
impl_from_param_value!(String, String);

#[derive(Debug, Clone, PartialEq)]
struct ParamEntry {
    description: &'static str,
    default: ParamValue,
    value: ParamValue,
    range: Option<(f64, f64)>,
}

/// A registry of named, typed parameters.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ParamSet {
    entries: FxHashMap<String, ParamEntry>,
}

impl ParamSet {
    /// Creates an empty registry.
    #[inline]
    pub fn new() -> Self {
        Self::default()
    }

    /// Registers a parameter with its default value and an optional inclusive range.
    pub fn register(
        &mut self,
        name: &str,
        description: &'static str,
        default: impl Into<ParamValue>,
        range: Option<(f64, f64)>,
    ) -> Result<(), ParamError> {
        if self.entries.contains_key(name) {
            return Err(ParamError::Duplicate(name.to_owned()));
        }
        let default = default.into();
        check_range(&default, range).map_err(|e| reject(name, e))?;
        self.entries.insert(
            name.to_owned(),
            ParamEntry {
                description,
                value: default.clone(),
                default,
                range,
            },
        );
        Ok(())
    }

    /// Builder form of [`ParamSet::register`] for static parameter tables.
    ///
    /// A duplicate name or an out-of-range default is a programming error in
    /// the table; it trips a debug assertion and leaves the set unchanged.
    pub fn with(
        mut self,
        name: &str,
        description: &'static str,
        default: impl Into<ParamValue>,
        range: Option<(f64, f64)>,
    ) -> Self {
        let registered = self.register(name, description, default, range);
        debug_assert!(
            registered.is_ok(),
            "invalid parameter table entry {name}: {registered:?}"
        );
        self
    }

    #[inline]
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    #[inline]
    pub fn contains(&self, name: &str) -> bool {
        self.entries.contains_key(name)
    }

    /// Registered names in lexicographic order.
    pub fn names(&self) -> Vec<&str> {
        let mut names: Vec<&str> = self.entries.keys().map(String::as_str).collect();
        names.sort_unstable();
        names
    }

    /// The registered type of `name`.
    pub fn param_type(&self, name: &str) -> Result<ParamType, ParamError> {
        self.entry(name).map(|e| e.default.param_type())
    }

    /// One-line description of `name`.
    pub fn description(&self, name: &str) -> Result<&'static str, ParamError> {
        self.entry(name).map(|e| e.description)
    }

    /// Current value of `name`.
    pub fn get(&self, name: &str) -> Result<&ParamValue, ParamError> {
        self.entry(name).map(|e| &e.value)
    }

    /// Current value of `name`, cast to `T`.
    pub fn get_as<T: FromParamValue>(&self, name: &str) -> Result<T, ParamError> {
        let value = self.get(name)?.clone();
        let from = value.param_type();
        let display = value.to_string();
        value
            .cast(T::TYPE)
            .ok()
            .and_then(T::from_param)
            .ok_or_else(|| {
                reject(
                    name,
                    ParamError::InvalidCast {
                        value: display,
                        from,
                        to: T::TYPE,
                    },
                )
            })
    }

    /// Sets `name`, casting `value` to the registered type.
    pub fn set(&mut self, name: &str, value: impl Into<ParamValue>) -> Result<(), ParamError> {
        let entry = self
            .entries
            .get_mut(name)
            .ok_or_else(|| ParamError::Unknown(name.to_owned()))?;
        let value = value
            .into()
            .cast(entry.default.param_type())
            .map_err(|e| reject(name, e))?;
        check_range(&value, entry.range).map_err(|e| reject(name, e))?;
        entry.value = value;
        Ok(())
    }

    /// Sets several parameters, stopping at the first failure.
    pub fn set_many<I, K, V>(&mut self, values: I) -> Result<(), ParamError>
    where
        I: IntoIterator<Item = (K, V)>,
        K: AsRef<str>,
        V: Into<ParamValue>,
    {
        for (name, value) in values {
            self.set(name.as_ref(), value)?;
        }
        Ok(())
    }

    /// Restores the default of `name`.
    pub fn reset(&mut self, name: &str) -> Result<(), ParamError> {
        let entry = self
            .entries
            .get_mut(name)
            .ok_or_else(|| ParamError::Unknown(name.to_owned()))?;
        entry.value = entry.default.clone();
        Ok(())
    }

    /// Restores every default.
    pub fn reset_all(&mut self) {
        for entry in self.entries.values_mut() {
            entry.value = entry.default.clone();
        }
    }

    /// Parameters whose value differs from the default, sorted by name.
    pub fn changed(&self) -> Vec<(&str, &ParamValue)> {
        let mut changed: Vec<(&str, &ParamValue)> = self
            .entries
            .iter()
            .filter(|(_, e)| e.value != e.default)
            .map(|(name, e)| (name.as_str(), &e.value))
            .collect();
        changed.sort_unstable_by_key(|(name, _)| *name);
        changed
    }

    #[inline]
    fn entry(&self, name: &str) -> Result<&ParamEntry, ParamError> {
        self.entries
            .get(name)
            .ok_or_else(|| ParamError::Unknown(name.to_owned()))
    }
}

fn reject(name: &str, source: ParamError) -> ParamError {
    ParamError::Rejected {
        name: name.to_owned(),
        source: Box::new(source),
    }
}

fn check_range(value: &ParamValue, range: Option<(f64, f64)>) -> Result<(), ParamError> {
    match (value.as_f64(), range) {
        (Some(v), Some((min, max))) if v.is_nan() || v < min || v > max => {
            Err(ParamError::OutOfRange { value: v, min, max })
        }
        _ => Ok(()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn registry() -> ParamSet {
        let mut p = ParamSet::new();
        p.register("limits/time", "time", 1e20, Some((0.0, 1e20)))
            .unwrap();
        p.register("limits/nodes", "nodes", -1i64, Some((-1.0, 9.0e15)))
            .unwrap();
        p.register("display/verblevel", "verbosity", 0, Some((0.0, 5.0)))
            .unwrap();
        p.register("randomization/permutevars", "permute", false, None)
            .unwrap();
        p.register("branching/rule", "rule", 'f', None).unwrap();
        p.register("display/prefix", "prefix", "", None).unwrap();
        p
    }

    #[test]
    fn test_unknown_parameter_message() {
        let p = registry();
        let err = p.get("no/such").unwrap_err();
        assert_eq!(err.to_string(), "parameter no/such unknown");
    }

    #[test]
    fn test_set_casts_numeric_types() {
        let mut p = registry();
        p.set("limits/time", 5).unwrap();
        assert_eq!(p.get("limits/time").unwrap(), &ParamValue::Real(5.0));

        p.set("limits/nodes", 100).unwrap();
        assert_eq!(p.get("limits/nodes").unwrap(), &ParamValue::LongInt(100));

        p.set("display/verblevel", 3i64).unwrap();
        assert_eq!(p.get_as::<i32>("display/verblevel").unwrap(), 3);

        p.set("randomization/permutevars", 1).unwrap();
        assert!(p.get_as::<bool>("randomization/permutevars").unwrap());
    }

    #[test]
    fn test_lossy_casts_are_rejected() {
        let mut p = registry();
        assert!(p.set("display/verblevel", 2.5).is_err());
        assert!(p.set("randomization/permutevars", 2).is_err());
        assert!(p.set("branching/rule", "ab").is_err());
        assert!(p.set("limits/time", "fast").is_err());
    }

    #[test]
    fn test_text_casts() {
        let mut p = registry();
        p.set("branching/rule", "r").unwrap();
        assert_eq!(p.get_as::<char>("branching/rule").unwrap(), 'r');
        p.set("display/prefix", 'x').unwrap();
        assert_eq!(p.get_as::<String>("display/prefix").unwrap(), "x");
    }

    #[test]
    fn test_range_is_enforced() {
        let mut p = registry();
        let err = p.set("display/verblevel", 9).unwrap_err();
        assert!(matches!(err, ParamError::Rejected { ref source, .. }
            if matches!(**source, ParamError::OutOfRange { .. })));
        assert_eq!(p.get_as::<i32>("display/verblevel").unwrap(), 0);
    }

    #[test]
    fn test_get_as_widens() {
        let p = registry();
        assert_eq!(p.get_as::<i64>("display/verblevel").unwrap(), 0);
        assert!(p.get_as::<f64>("limits/nodes").is_ok());
        assert!(p.get_as::<char>("limits/time").is_err());
    }

    #[test]
    fn test_reset_and_changed() {
        let mut p = registry();
        p.set_many([("limits/time", 3.0), ("limits/nodes", 10.0)])
            .unwrap();
        assert_eq!(p.changed().len(), 2);
        p.reset("limits/time").unwrap();
        assert_eq!(p.changed(), vec![("limits/nodes", &ParamValue::LongInt(10))]);
        p.reset_all();
        assert!(p.changed().is_empty());
    }

    #[test]
    fn test_duplicate_registration() {
        let mut p = registry();
        assert_eq!(
            p.register("limits/time", "again", 1.0, None).unwrap_err(),
            ParamError::Duplicate("limits/time".into())
        );
    }
}
