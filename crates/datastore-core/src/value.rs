//! Typed literal values used by filters and sort keys.

use std::cmp::Ordering;
use std::fmt;

use serde::{Deserialize, Serialize};

use crate::error::{QueryError, QueryResult};

/// A typed scalar resolved from a record field or supplied as a filter
/// reference value.
///
/// Serialized untagged, so `true`, `3`, `3.5` and `"x"` in JSON or TOML map
/// directly onto [`Bool`](Value::Bool), [`Int`](Value::Int),
/// [`Float`](Value::Float) and [`Text`](Value::Text).
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(untagged)]
pub enum Value {
    /// Boolean.
    Bool(bool),
    /// Signed 64-bit integer.
    Int(i64),
    /// 64-bit float.
    Float(f64),
    /// UTF-8 text.
    Text(String),
}

impl Value {
    /// Name of the variant, used in error messages.
    #[must_use]
    pub fn type_name(&self) -> &'static str {
        match self {
            Self::Bool(_) => "bool",
            Self::Int(_) => "int",
            Self::Float(_) => "float",
            Self::Text(_) => "text",
        }
    }

    /// Coerce this value into the variant of `target`.
    ///
    /// The conversions are a fixed table; anything outside it fails rather
    /// than guessing.
    ///
    /// # Errors
    ///
    /// Returns [`QueryError::TypeCoercion`] if no conversion applies.
    #[allow(clippy::cast_precision_loss, clippy::cast_possible_truncation)]
    pub fn coerce_to(&self, target: &Self, field: &str) -> QueryResult<Self> {
        let coerced = match (self, target) {
            (Self::Bool(_), Self::Bool(_))
            | (Self::Int(_), Self::Int(_))
            | (Self::Float(_), Self::Float(_))
            | (Self::Text(_), Self::Text(_)) => Some(self.clone()),

            (Self::Bool(b), Self::Int(_)) => Some(Self::Int(i64::from(*b))),
            (Self::Bool(b), Self::Float(_)) => Some(Self::Float(if *b { 1.0 } else { 0.0 })),
            (Self::Bool(b), Self::Text(_)) => Some(Self::Text(b.to_string())),

            (Self::Int(i), Self::Bool(_)) => Some(Self::Bool(*i != 0)),
            (Self::Int(i), Self::Float(_)) => Some(Self::Float(*i as f64)),
            (Self::Int(i), Self::Text(_)) => Some(Self::Text(i.to_string())),

            (Self::Float(f), Self::Bool(_)) => (!f.is_nan()).then(|| Self::Bool(*f != 0.0)),
            (Self::Float(f), Self::Int(_)) => {
                let in_range = f.is_finite() && *f >= i64::MIN as f64 && *f < i64::MAX as f64;
                in_range.then(|| Self::Int(f.trunc() as i64))
            },
            (Self::Float(f), Self::Text(_)) => Some(Self::Text(f.to_string())),

            (Self::Text(s), Self::Bool(_)) => parse_bool(s).map(Self::Bool),
            (Self::Text(s), Self::Int(_)) => s.trim().parse().ok().map(Self::Int),
            (Self::Text(s), Self::Float(_)) => s.trim().parse().ok().map(Self::Float),
        };

        coerced.ok_or_else(|| QueryError::TypeCoercion {
            field: field.to_owned(),
            from: self.type_name(),
            to: target.type_name(),
        })
    }

    /// Total comparison for sort keys.
    ///
    /// # Errors
    ///
    /// Returns [`QueryError::Comparison`] when the two values have no
    /// defined order (mismatched types, or NaN).
    pub fn try_cmp(&self, other: &Self, field: &str) -> QueryResult<Ordering> {
        self.partial_cmp(other)
            .ok_or_else(|| QueryError::Comparison {
                field: field.to_owned(),
                left: self.type_name(),
                right: other.type_name(),
            })
    }
}

fn parse_bool(s: &str) -> Option<bool> {
    let s = s.trim();
    if s.eq_ignore_ascii_case("true") || s == "1" {
        Some(true)
    } else if s.eq_ignore_ascii_case("false") || s == "0" {
        Some(false)
    } else {
        None
    }
}

/// Smallest float above every `i64` (2^63).
const I64_CEILING: f64 = 9_223_372_036_854_775_808.0;
/// `i64::MIN` as a float (-2^63).
const I64_FLOOR: f64 = -9_223_372_036_854_775_808.0;

/// Exact numeric comparison of an integer against a float.
#[allow(clippy::cast_possible_truncation)]
fn cmp_int_float(int: i64, float: f64) -> Option<Ordering> {
    if float.is_nan() {
        return None;
    }
    if float >= I64_CEILING {
        return Some(Ordering::Less);
    }
    if float < I64_FLOOR {
        return Some(Ordering::Greater);
    }
    let whole = float.trunc();
    // In range, so the cast is exact.
    Some(int.cmp(&(whole as i64)).then_with(|| {
        if float > whole {
            Ordering::Less
        } else if float < whole {
            Ordering::Greater
        } else {
            Ordering::Equal
        }
    }))
}

impl PartialOrd for Value {
    /// Same-type values compare naturally and integers compare exactly
    /// against floats. Every other pairing is unordered.
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        match (self, other) {
            (Self::Bool(a), Self::Bool(b)) => Some(a.cmp(b)),
            (Self::Int(a), Self::Int(b)) => Some(a.cmp(b)),
            (Self::Text(a), Self::Text(b)) => Some(a.cmp(b)),
            (Self::Float(a), Self::Float(b)) => a.partial_cmp(b),
            (Self::Int(a), Self::Float(b)) => cmp_int_float(*a, *b),
            (Self::Float(a), Self::Int(b)) => cmp_int_float(*b, *a).map(Ordering::reverse),
            _ => None,
        }
    }
}

/// Equality agrees with [`PartialOrd`]: `Int(3) == Float(3.0)`, NaN equals
/// nothing.
impl PartialEq for Value {
    fn eq(&self, other: &Self) -> bool {
        self.partial_cmp(other) == Some(Ordering::Equal)
    }
}

impl fmt::Display for Value {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Bool(b) => write!(f, "{b}"),
            Self::Int(i) => write!(f, "{i}"),
            Self::Float(x) => write!(f, "{x}"),
            Self::Text(s) => write!(f, "{s:?}"),
        }
    }
}

impl From<bool> for Value {
    fn from(b: bool) -> Self {
        Self::Bool(b)
    }
}

impl From<i64> for Value {
    fn from(i: i64) -> Self {
        Self::Int(i)
    }
}

impl From<i32> for Value {
    fn from(i: i32) -> Self {
        Self::Int(i64::from(i))
    }
}

impl From<u32> for Value {
    fn from(i: u32) -> Self {
        Self::Int(i64::from(i))
    }
}

impl From<f64> for Value {
    fn from(f: f64) -> Self {
        Self::Float(f)
    }
}

impl From<&str> for Value {
    fn from(s: &str) -> Self {
        Self::Text(s.to_owned())
    }
}

impl From<String> for Value {
    fn from(s: String) -> Self {
        Self::Text(s)
    }
}
