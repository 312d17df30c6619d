//! Operand value types for predicates.
//!
//! The [`Value`] enum is the value model every predicate operand is drawn
//! from: strings, numbers, booleans, date literals and date math
//! expressions.

use std::cmp::Ordering;
use std::fmt;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::datemath::DateMath;
use crate::error::{QueryError, Result};

/// Operand of a predicate.
///
/// Values are owned so they can be stored in the clause-group tree and
/// serialized long after the caller's data is gone.
///
/// # Example
///
/// ```
/// use quarry::{Number, Value};
///
/// assert_eq!(Value::from("news"), Value::String("news".to_string()));
/// assert_eq!(Value::from(50), Value::Number(Number::I64(50)));
/// assert_eq!(Value::from(true), Value::Boolean(true));
/// ```
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", content = "value", rename_all = "snake_case")]
pub enum Value {
    /// Free text or keyword.
    String(String),
    /// Numeric value.
    Number(Number),
    /// Boolean value.
    Boolean(bool),
    /// Fixed instant.
    Date(DateTime<Utc>),
    /// Relative date anchored at "now" or a literal.
    DateMath(DateMath),
}

impl Value {
    /// Returns the name of this value's kind.
    pub fn kind(&self) -> &'static str {
        match self {
            Value::String(_) => "string",
            Value::Number(_) => "number",
            Value::Boolean(_) => "boolean",
            Value::Date(_) => "date",
            Value::DateMath(_) => "date math",
        }
    }

    /// Returns `true` if this is a `String` value.
    pub fn is_string(&self) -> bool {
        matches!(self, Value::String(_))
    }

    /// Returns `true` for dates and date math expressions.
    pub fn is_temporal(&self) -> bool {
        matches!(self, Value::Date(_) | Value::DateMath(_))
    }

    /// Extracts the string value, if present.
    pub fn as_str(&self) -> Option<&str> {
        match self {
            Value::String(s) => Some(s),
            _ => None,
        }
    }

    /// Checks that this value can be used as an operand on `field`.
    ///
    /// Rejects blank strings and non-finite numbers.
    pub fn validate(&self, field: &str) -> Result<()> {
        match self {
            Value::String(s) if s.trim().is_empty() => Err(QueryError::EmptyValue {
                field: field.to_string(),
            }),
            Value::Number(n) if !n.is_finite() => Err(QueryError::NonFiniteNumber {
                field: field.to_string(),
            }),
            _ => Ok(()),
        }
    }

    /// Compares two values when their order is known without evaluating
    /// date math.
    ///
    /// Returns `None` for mismatched kinds, strings, booleans and date math.
    pub fn compare(&self, other: &Value) -> Option<Ordering> {
        match (self, other) {
            (Value::Number(a), Value::Number(b)) => a.compare(*b),
            (Value::Date(a), Value::Date(b)) => Some(a.cmp(b)),
            _ => None,
        }
    }
}

/// Numeric value supporting all common numeric types.
///
/// Numbers are stored in one of three variants to preserve precision:
/// - `I64` for signed integers
/// - `U64` for unsigned integers
/// - `F64` for floating point
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum Number {
    /// Signed 64-bit integer.
    I64(i64),
    /// Unsigned 64-bit integer.
    U64(u64),
    /// 64-bit floating point.
    F64(f64),
}

impl Number {
    /// Converts the number to f64 for comparison.
    pub fn to_f64(self) -> f64 {
        match self {
            Number::I64(n) => n as f64,
            Number::U64(n) => n as f64,
            Number::F64(n) => n,
        }
    }

    /// Returns `false` for NaN and infinite floats.
    pub fn is_finite(self) -> bool {
        match self {
            Number::F64(n) => n.is_finite(),
            _ => true,
        }
    }

    /// Compares two numbers, handling mixed types.
    pub fn compare(self, other: Number) -> Option<Ordering> {
        match (self, other) {
            (Number::I64(a), Number::I64(b)) => Some(a.cmp(&b)),
            (Number::U64(a), Number::U64(b)) => Some(a.cmp(&b)),
            (Number::F64(a), Number::F64(b)) => a.partial_cmp(&b),
            (Number::I64(a), Number::U64(b)) => Some(i128::from(a).cmp(&i128::from(b))),
            (Number::U64(a), Number::I64(b)) => Some(i128::from(a).cmp(&i128::from(b))),
            _ => self.to_f64().partial_cmp(&other.to_f64()),
        }
    }
}

impl fmt::Display for Number {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Number::I64(n) => write!(f, "{n}"),
            Number::U64(n) => write!(f, "{n}"),
            Number::F64(n) => write!(f, "{n}"),
        }
    }
}

macro_rules! number_from {
    ($variant:ident as $target:ty: $($source:ty),+) => {
        $(
            impl From<$source> for Number {
                fn from(n: $source) -> Self {
                    Number::$variant(n as $target)
                }
            }

            impl From<$source> for Value {
                fn from(n: $source) -> Self {
                    Value::Number(Number::from(n))
                }
            }
        )+
    };
}

number_from!(I64 as i64: i8, i16, i32, i64, isize);
number_from!(U64 as u64: u8, u16, u32, u64, usize);
number_from!(F64 as f64: f32, f64);

impl From<Number> for Value {
    fn from(n: Number) -> Self {
        Value::Number(n)
    }
}

impl From<String> for Value {
    fn from(s: String) -> Self {
        Value::String(s)
    }
}

impl From<&str> for Value {
    fn from(s: &str) -> Self {
        Value::String(s.to_string())
    }
}

impl From<bool> for Value {
    fn from(b: bool) -> Self {
        Value::Boolean(b)
    }
}

impl From<DateTime<Utc>> for Value {
    fn from(d: DateTime<Utc>) -> Self {
        Value::Date(d)
    }
}

impl From<DateMath> for Value {
    fn from(d: DateMath) -> Self {
        Value::DateMath(d)
    }
}
