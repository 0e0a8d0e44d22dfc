//! FILENAME: engine/src/value.rs
//! PURPOSE: Defines the dynamically-typed cell value stored in every table cell.
//! CONTEXT: The same `Value` type is used for cell contents, row/column names,
//! group keys and join keys, so it carries a total order and a hash that agree
//! with each other. Numbers compare numerically across `Int` and `Float`; NaN
//! values are treated as equal to each other.

use std::cmp::Ordering;
use std::fmt;
use std::hash::{Hash, Hasher};

use chrono::{NaiveDate, NaiveDateTime, Timelike};
use serde::{Deserialize, Serialize};

/// Coarse classification of a value, computed once per column where a
/// decision depends on the column's type (default reducers, numeric subsets,
/// model matrix encoding).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum CellKind {
    Null,
    Number,
    Boolean,
    Text,
    Date,
}

/// The calculated result or raw data within a table cell.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub enum Value {
    Null,
    Int(i64),
    Float(f64),
    Bool(bool),
    Text(String),
    Date(NaiveDateTime),
    /// Ordered tuple, used for multi-column group and join keys.
    Tuple(Vec<Value>),
}

impl Default for Value {
    fn default() -> Self {
        Value::Null
    }
}

impl Value {
    pub fn kind(&self) -> CellKind {
        match self {
            Value::Null => CellKind::Null,
            Value::Int(_) | Value::Float(_) => CellKind::Number,
            Value::Bool(_) => CellKind::Boolean,
            Value::Text(_) | Value::Tuple(_) => CellKind::Text,
            Value::Date(_) => CellKind::Date,
        }
    }

    pub fn is_null(&self) -> bool {
        matches!(self, Value::Null)
    }

    /// Numeric view of the value. Booleans count as 0/1; everything else that
    /// is not a number yields `None`.
    pub fn as_f64(&self) -> Option<f64> {
        match self {
            Value::Int(i) => Some(*i as f64),
            Value::Float(f) => Some(*f),
            Value::Bool(b) => Some(if *b { 1.0 } else { 0.0 }),
            _ => None,
        }
    }

    /// Integral view of the value (integers and booleans only).
    pub fn as_i64(&self) -> Option<i64> {
        match self {
            Value::Int(i) => Some(*i),
            Value::Bool(b) => Some(*b as i64),
            _ => None,
        }
    }

    pub fn as_str(&self) -> Option<&str> {
        match self {
            Value::Text(s) => Some(s),
            _ => None,
        }
    }

    /// Builds a key from several values: a single value stays as-is, several
    /// become a `Tuple`.
    pub fn key_of(mut parts: Vec<Value>) -> Value {
        if parts.len() == 1 {
            parts.pop().unwrap_or_default()
        } else {
            Value::Tuple(parts)
        }
    }

    /// Flattens a key back into its parts (a non-tuple is a one-part key).
    pub fn key_parts(&self) -> Vec<Value> {
        match self {
            Value::Tuple(parts) => parts.clone(),
            other => vec![other.clone()],
        }
    }

    /// Sort rank between kinds: Null < Number < Text < Bool < Date < Tuple.
    fn rank(&self) -> u8 {
        match self {
            Value::Null => 0,
            Value::Int(_) | Value::Float(_) => 1,
            Value::Text(_) => 2,
            Value::Bool(_) => 3,
            Value::Date(_) => 4,
            Value::Tuple(_) => 5,
        }
    }
}

/// Total order on floats where NaN equals NaN and sorts after every number.
fn compare_f64(a: f64, b: f64) -> Ordering {
    match (a.is_nan(), b.is_nan()) {
        (true, true) => Ordering::Equal,
        (true, false) => Ordering::Greater,
        (false, true) => Ordering::Less,
        (false, false) => a.partial_cmp(&b).unwrap_or(Ordering::Equal),
    }
}

/// Exact order between an integer and a float. Casting the integer to `f64`
/// would round above 2^53 and make equality non-transitive.
fn compare_int_f64(i: i64, f: f64) -> Ordering {
    // 2^63 as f64; every finite float in [-2^63, 2^63) truncates to an i64.
    const BOUND: f64 = 9_223_372_036_854_775_808.0;
    if f.is_nan() || f >= BOUND {
        return Ordering::Less;
    }
    if f < -BOUND {
        return Ordering::Greater;
    }
    let whole = f.trunc();
    i.cmp(&(whole as i64)).then_with(|| {
        let fraction = f - whole;
        if fraction > 0.0 {
            Ordering::Less
        } else if fraction < 0.0 {
            Ordering::Greater
        } else {
            Ordering::Equal
        }
    })
}

impl Ord for Value {
    fn cmp(&self, other: &Self) -> Ordering {
        match (self, other) {
            (Value::Null, Value::Null) => Ordering::Equal,
            (Value::Int(a), Value::Int(b)) => a.cmp(b),
            (Value::Int(a), Value::Float(b)) => compare_int_f64(*a, *b),
            (Value::Float(a), Value::Int(b)) => compare_int_f64(*b, *a).reverse(),
            (Value::Float(a), Value::Float(b)) => compare_f64(*a, *b),
            (Value::Text(a), Value::Text(b)) => a.cmp(b),
            (Value::Bool(a), Value::Bool(b)) => a.cmp(b),
            (Value::Date(a), Value::Date(b)) => a.cmp(b),
            (Value::Tuple(a), Value::Tuple(b)) => a.cmp(b),
            _ => self.rank().cmp(&other.rank()),
        }
    }
}

impl PartialOrd for Value {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl PartialEq for Value {
    fn eq(&self, other: &Self) -> bool {
        self.cmp(other) == Ordering::Equal
    }
}

impl Eq for Value {}

impl Hash for Value {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.rank().hash(state);
        match self {
            Value::Null => {}
            Value::Int(i) => hash_number(*i as f64, state),
            Value::Float(f) => hash_number(*f, state),
            Value::Text(s) => s.hash(state),
            Value::Bool(b) => b.hash(state),
            Value::Date(d) => d.hash(state),
            Value::Tuple(parts) => parts.hash(state),
        }
    }
}

/// Numbers that compare equal must hash equal: -0.0 folds into 0.0 and every
/// NaN hashes the same.
fn hash_number<H: Hasher>(n: f64, state: &mut H) {
    if n.is_nan() {
        u64::MAX.hash(state);
    } else if n == 0.0 {
        0u64.hash(state);
    } else {
        n.to_bits().hash(state);
    }
}

impl fmt::Display for Value {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Value::Null => Ok(()),
            Value::Int(i) => write!(f, "{}", i),
            Value::Float(n) => {
                // Format without unnecessary decimal places
                if n.fract() == 0.0 && n.abs() < 1e15 {
                    write!(f, "{:.0}", n)
                } else {
                    write!(f, "{}", n)
                }
            }
            Value::Bool(b) => write!(f, "{}", b),
            Value::Text(s) => f.write_str(s),
            Value::Date(d) => {
                if d.num_seconds_from_midnight() == 0 {
                    write!(f, "{}", d.format("%Y-%m-%d"))
                } else {
                    write!(f, "{}", d.format("%Y-%m-%d %H:%M:%S"))
                }
            }
            Value::Tuple(parts) => {
                f.write_str("(")?;
                for (i, part) in parts.iter().enumerate() {
                    if i > 0 {
                        f.write_str(", ")?;
                    }
                    write!(f, "{}", part)?;
                }
                f.write_str(")")
            }
        }
    }
}

// ============================================================================
// CONVERSIONS
// ============================================================================

impl From<i64> for Value {
    fn from(v: i64) -> Self {
        Value::Int(v)
    }
}

impl From<i32> for Value {
    fn from(v: i32) -> Self {
        Value::Int(v as i64)
    }
}

impl From<usize> for Value {
    fn from(v: usize) -> Self {
        Value::Int(v as i64)
    }
}

impl From<f64> for Value {
    fn from(v: f64) -> Self {
        Value::Float(v)
    }
}

impl From<bool> for Value {
    fn from(v: bool) -> Self {
        Value::Bool(v)
    }
}

impl From<&str> for Value {
    fn from(v: &str) -> Self {
        Value::Text(v.to_string())
    }
}

impl From<String> for Value {
    fn from(v: String) -> Self {
        Value::Text(v)
    }
}

impl From<&String> for Value {
    fn from(v: &String) -> Self {
        Value::Text(v.clone())
    }
}

impl From<NaiveDateTime> for Value {
    fn from(v: NaiveDateTime) -> Self {
        Value::Date(v)
    }
}

impl From<NaiveDate> for Value {
    fn from(v: NaiveDate) -> Self {
        Value::Date(v.and_hms_opt(0, 0, 0).unwrap_or_default())
    }
}

impl From<Vec<Value>> for Value {
    fn from(v: Vec<Value>) -> Self {
        Value::Tuple(v)
    }
}

impl From<&Value> for Value {
    fn from(v: &Value) -> Self {
        v.clone()
    }
}

impl<T: Into<Value>> From<Option<T>> for Value {
    fn from(v: Option<T>) -> Self {
        v.map(Into::into).unwrap_or(Value::Null)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::hash_map::DefaultHasher;

    fn hash_of(v: &Value) -> u64 {
        let mut h = DefaultHasher::new();
        v.hash(&mut h);
        h.finish()
    }

    #[test]
    fn test_int_and_float_compare_numerically() {
        assert_eq!(Value::Int(1), Value::Float(1.0));
        assert_eq!(hash_of(&Value::Int(1)), hash_of(&Value::Float(1.0)));
        assert!(Value::Int(2) > Value::Float(1.5));
        assert_eq!(hash_of(&Value::Float(0.0)), hash_of(&Value::Float(-0.0)));
    }

    #[test]
    fn test_int_float_compare_is_exact_above_f64_precision() {
        let low = Value::Int(1 << 53);
        let high = Value::Int((1 << 53) + 1);
        let float = Value::Float((1i64 << 53) as f64);

        assert_eq!(low, float);
        assert_ne!(high, float);
        assert!(high > float);
        assert!(float < high);
        assert_ne!(low, high);

        let mut sorted = vec![high.clone(), float.clone(), low.clone()];
        sorted.sort();
        assert_eq!(sorted[2], high);

        assert!(Value::Int(i64::MAX) < Value::Float(9.3e18));
        assert!(Value::Int(i64::MIN) > Value::Float(-9.3e18));
        assert!(Value::Int(2) < Value::Float(2.5));
        assert!(Value::Int(-2) > Value::Float(-2.5));
        assert!(Value::Int(i64::MAX) < Value::Float(f64::NAN));
    }

    #[test]
    fn test_nan_equals_nan() {
        let a = Value::Float(f64::NAN);
        let b = Value::Float(f64::NAN);
        assert_eq!(a, b);
        assert_eq!(hash_of(&a), hash_of(&b));
        assert!(a > Value::Float(f64::INFINITY));
    }

    #[test]
    fn test_cross_kind_order() {
        let mut values = vec![
            Value::Bool(true),
            Value::from("b"),
            Value::Null,
            Value::Int(3),
            Value::from("a"),
        ];
        values.sort();
        assert_eq!(
            values,
            vec![
                Value::Null,
                Value::Int(3),
                Value::from("a"),
                Value::from("b"),
                Value::Bool(true),
            ]
        );
    }

    #[test]
    fn test_kind_and_numeric_view() {
        assert_eq!(Value::Int(4).kind(), CellKind::Number);
        assert_eq!(Value::Tuple(vec![]).kind(), CellKind::Text);
        assert_eq!(Value::Bool(true).as_f64(), Some(1.0));
        assert_eq!(Value::from("x").as_f64(), None);
    }

    #[test]
    fn test_display() {
        assert_eq!(Value::Float(3.0).to_string(), "3");
        assert_eq!(Value::Float(2.5).to_string(), "2.5");
        assert_eq!(Value::Null.to_string(), "");
        let date = NaiveDate::from_ymd_opt(2024, 3, 1).unwrap();
        assert_eq!(Value::from(date).to_string(), "2024-03-01");
        let key = Value::Tuple(vec![Value::from("a"), Value::Int(1)]);
        assert_eq!(key.to_string(), "(a, 1)");
    }

    #[test]
    fn test_key_of() {
        assert_eq!(Value::key_of(vec![Value::Int(1)]), Value::Int(1));
        assert_eq!(
            Value::key_of(vec![Value::Int(1), Value::Int(2)]),
            Value::Tuple(vec![Value::Int(1), Value::Int(2)])
        );
    }
}
