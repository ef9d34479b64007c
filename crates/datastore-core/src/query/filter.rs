//! Single-field predicates.

use std::cmp::Ordering;
use std::fmt;
use std::str::FromStr;

use crate::error::{QueryError, QueryResult};
use crate::query::cursor::Cursor;
use crate::record::{DefaultAccessor, FieldAccessor, Record};
use crate::value::Value;

/// Comparison operator of a [`Filter`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Operator {
    /// `<`
    Lt,
    /// `<=`
    Le,
    /// `=`
    Eq,
    /// `!=`
    Ne,
    /// `>=`
    Ge,
    /// `>`
    Gt,
}

impl Operator {
    /// All operators, in their canonical order.
    pub const ALL: [Self; 6] = [Self::Lt, Self::Le, Self::Eq, Self::Ne, Self::Ge, Self::Gt];

    /// The operator's symbol.
    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Lt => "<",
            Self::Le => "<=",
            Self::Eq => "=",
            Self::Ne => "!=",
            Self::Ge => ">=",
            Self::Gt => ">",
        }
    }

    /// Apply the operator to `(value, reference)`.
    ///
    /// Unordered pairs (NaN) fail every ordering test and pass `!=`.
    #[must_use]
    pub fn evaluate(self, value: &Value, reference: &Value) -> bool {
        match self {
            Self::Eq => value == reference,
            Self::Ne => value != reference,
            Self::Lt => value.partial_cmp(reference) == Some(Ordering::Less),
            Self::Le => matches!(
                value.partial_cmp(reference),
                Some(Ordering::Less | Ordering::Equal)
            ),
            Self::Ge => matches!(
                value.partial_cmp(reference),
                Some(Ordering::Greater | Ordering::Equal)
            ),
            Self::Gt => value.partial_cmp(reference) == Some(Ordering::Greater),
        }
    }
}

impl FromStr for Operator {
    type Err = QueryError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::ALL
            .into_iter()
            .find(|op| op.as_str() == s)
            .ok_or_else(|| QueryError::InvalidOperator(s.to_owned()))
    }
}

impl fmt::Display for Operator {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A predicate `field op value`, e.g. `age > 15`.
///
/// Filters are plain data. Evaluation resolves the field through a
/// [`FieldAccessor`]; [`matches`](Self::matches) uses [`DefaultAccessor`].
#[derive(Debug, Clone, PartialEq)]
pub struct Filter {
    field: String,
    op: Operator,
    value: Value,
}

impl Filter {
    /// Build a filter from an operator symbol.
    ///
    /// # Errors
    ///
    /// Returns [`QueryError::InvalidOperator`] if `op` is not one of the six
    /// comparison operators.
    pub fn new(field: impl Into<String>, op: &str, value: impl Into<Value>) -> QueryResult<Self> {
        Ok(Self::with_operator(field, op.parse()?, value))
    }

    /// Build a filter from an already-parsed operator.
    #[must_use]
    pub fn with_operator(field: impl Into<String>, op: Operator, value: impl Into<Value>) -> Self {
        Self {
            field: field.into(),
            op,
            value: value.into(),
        }
    }

    /// The field this filter inspects.
    #[must_use]
    pub fn field(&self) -> &str {
        &self.field
    }

    /// The comparison operator.
    #[must_use]
    pub fn op(&self) -> Operator {
        self.op
    }

    /// The reference value.
    #[must_use]
    pub fn value(&self) -> &Value {
        &self.value
    }

    /// Whether `record` passes, resolving fields with [`DefaultAccessor`].
    ///
    /// # Errors
    ///
    /// See [`matches_with`](Self::matches_with).
    pub fn matches<R: Record + ?Sized>(&self, record: &R) -> QueryResult<bool> {
        self.matches_with(&DefaultAccessor, record)
    }

    /// Whether `record` passes, resolving fields with `accessor`.
    ///
    /// A record without the field never passes. A resolved value of a
    /// different type is coerced into the reference value's type first.
    ///
    /// # Errors
    ///
    /// Returns [`QueryError::TypeCoercion`] if the resolved value cannot be
    /// coerced.
    pub fn matches_with<R, A>(&self, accessor: &A, record: &R) -> QueryResult<bool>
    where
        R: ?Sized,
        A: FieldAccessor<R> + ?Sized,
    {
        let Some(resolved) = accessor.resolve(record, &self.field) else {
            return Ok(false);
        };
        let coerced = resolved.coerce_to(&self.value, &self.field)?;
        Ok(self.op.evaluate(&coerced, &self.value))
    }
}

impl fmt::Display for Filter {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} {} {}", self.field, self.op, self.value)
    }
}

impl<F, V> TryFrom<(F, &str, V)> for Filter
where
    F: Into<String>,
    V: Into<Value>,
{
    type Error = QueryError;

    fn try_from((field, op, value): (F, &str, V)) -> Result<Self, Self::Error> {
        Self::new(field, op, value)
    }
}

/// Lazily keep the records that pass every filter.
///
/// Each filter becomes one pipeline stage; the result is the intersection
/// of the per-filter pass sets whatever order the filters come in. The
/// sequence is single-pass and may be infinite.
pub fn filter_sequence<'a, R, A, I>(filters: &'a [Filter], accessor: &'a A, records: I) -> Cursor<'a, R>
where
    R: 'a,
    A: FieldAccessor<R> + ?Sized,
    I: IntoIterator<Item = R>,
    I::IntoIter: 'a,
{
    let mut cursor = Cursor::new(records.into_iter().map(Ok));
    for filter in filters {
        cursor = cursor.try_filter(move |record| filter.matches_with(accessor, record));
    }
    cursor
}
