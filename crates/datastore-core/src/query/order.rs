//! Sort keys.

use std::cmp::Ordering;
use std::fmt;
use std::str::FromStr;

use crate::error::{QueryError, QueryResult};
use crate::record::{DefaultAccessor, FieldAccessor, Record};
use crate::value::Value;

/// Sort direction.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash)]
pub enum Direction {
    /// Smallest first (`+field`).
    #[default]
    Ascending,
    /// Largest first (`-field`).
    Descending,
}

impl Direction {
    fn sign(self) -> char {
        match self {
            Self::Ascending => '+',
            Self::Descending => '-',
        }
    }

    fn apply(self, ordering: Ordering) -> Ordering {
        match self {
            Self::Ascending => ordering,
            Self::Descending => ordering.reverse(),
        }
    }
}

/// One sort key: a field and a direction, written `+field` or `-field`.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Order {
    field: String,
    direction: Direction,
}

impl Order {
    /// Parse a signed field name. Unsigned names sort ascending.
    ///
    /// # Errors
    ///
    /// Returns [`QueryError::InvalidOrder`] if `spec` is empty or is only a
    /// sign.
    pub fn parse(spec: &str) -> QueryResult<Self> {
        let (direction, field) = match spec.chars().next() {
            Some('+') => (Direction::Ascending, &spec[1..]),
            Some('-') => (Direction::Descending, &spec[1..]),
            Some(_) => (Direction::Ascending, spec),
            None => return Err(QueryError::InvalidOrder("empty order".to_owned())),
        };
        if field.is_empty() {
            return Err(QueryError::InvalidOrder(format!(
                "'{spec}' does not name a field"
            )));
        }
        Ok(Self::new(field, direction))
    }

    /// Build an order from its parts.
    #[must_use]
    pub fn new(field: impl Into<String>, direction: Direction) -> Self {
        Self {
            field: field.into(),
            direction,
        }
    }

    /// Ascending order on `field`.
    #[must_use]
    pub fn ascending(field: impl Into<String>) -> Self {
        Self::new(field, Direction::Ascending)
    }

    /// Descending order on `field`.
    #[must_use]
    pub fn descending(field: impl Into<String>) -> Self {
        Self::new(field, Direction::Descending)
    }

    /// The field sorted on.
    #[must_use]
    pub fn field(&self) -> &str {
        &self.field
    }

    /// The sort direction.
    #[must_use]
    pub fn direction(&self) -> Direction {
        self.direction
    }

    /// Whether this order sorts ascending.
    #[must_use]
    pub fn is_ascending(&self) -> bool {
        self.direction == Direction::Ascending
    }

    /// Extract the sort key of `record`.
    pub fn key_with<R, A>(&self, accessor: &A, record: &R) -> Option<Value>
    where
        R: ?Sized,
        A: FieldAccessor<R> + ?Sized,
    {
        accessor.resolve(record, &self.field)
    }

    /// Compare two records on this key with [`DefaultAccessor`].
    ///
    /// # Errors
    ///
    /// See [`compare_with`](Self::compare_with).
    pub fn compare<R: Record + ?Sized>(&self, a: &R, b: &R) -> QueryResult<Ordering> {
        self.compare_with(&DefaultAccessor, a, b)
    }

    /// Compare two records on this key, honoring the direction.
    ///
    /// A missing key sorts before any present one.
    ///
    /// # Errors
    ///
    /// Returns [`QueryError::Comparison`] if the two keys have no defined
    /// order.
    pub fn compare_with<R, A>(&self, accessor: &A, a: &R, b: &R) -> QueryResult<Ordering>
    where
        R: ?Sized,
        A: FieldAccessor<R> + ?Sized,
    {
        let ordering = match (self.key_with(accessor, a), self.key_with(accessor, b)) {
            (None, None) => Ordering::Equal,
            (None, Some(_)) => Ordering::Less,
            (Some(_), None) => Ordering::Greater,
            (Some(x), Some(y)) => x.try_cmp(&y, &self.field)?,
        };
        Ok(self.direction.apply(ordering))
    }
}

/// Compare two records under `orders`, highest priority first.
///
/// Returns the first non-equal comparison, or [`Ordering::Equal`] if every
/// key ties.
///
/// # Errors
///
/// Returns [`QueryError::Comparison`] from the first incomparable key.
pub fn compare_multi<R, A>(orders: &[Order], accessor: &A, a: &R, b: &R) -> QueryResult<Ordering>
where
    R: ?Sized,
    A: FieldAccessor<R> + ?Sized,
{
    for order in orders {
        let ordering = order.compare_with(accessor, a, b)?;
        if ordering != Ordering::Equal {
            return Ok(ordering);
        }
    }
    Ok(Ordering::Equal)
}

/// Stable-sort `records` under `orders`.
///
/// Every sort key is resolved once and checked up front, so the sort
/// itself runs on a total order.
///
/// # Errors
///
/// Returns [`QueryError::Comparison`] if any two present keys of one order
/// have no defined ordering (mixed types, or NaN). The slice is left
/// untouched in that case.
pub fn sort<R, A>(orders: &[Order], accessor: &A, records: &mut [R]) -> QueryResult<()>
where
    A: FieldAccessor<R> + ?Sized,
{
    if orders.is_empty() || records.len() < 2 {
        return Ok(());
    }
    let keys = comparable_keys(orders, accessor, records)?;
    let mut ranked: Vec<usize> = (0..records.len()).collect();
    ranked.sort_by(|&a, &b| compare_keys(orders, &keys[a], &keys[b]));
    permute(records, &ranked);
    Ok(())
}

/// Resolve the sort keys of every record, one row per record.
///
/// A column is sortable when each present key is comparable with itself
/// (no NaN) and with the column's first present key (no mixed types).
fn comparable_keys<R, A>(
    orders: &[Order],
    accessor: &A,
    records: &[R],
) -> QueryResult<Vec<Vec<Option<Value>>>>
where
    A: FieldAccessor<R> + ?Sized,
{
    let keys: Vec<Vec<Option<Value>>> = records
        .iter()
        .map(|record| {
            orders
                .iter()
                .map(|order| order.key_with(accessor, record))
                .collect()
        })
        .collect();

    for (column, order) in orders.iter().enumerate() {
        let mut anchor: Option<&Value> = None;
        let present = keys
            .iter()
            .filter_map(|row| row.get(column).and_then(Option::as_ref));
        for value in present {
            value.try_cmp(value, order.field())?;
            match anchor {
                Some(anchor) => {
                    anchor.try_cmp(value, order.field())?;
                },
                None => anchor = Some(value),
            }
        }
    }
    Ok(keys)
}

fn compare_keys(orders: &[Order], a: &[Option<Value>], b: &[Option<Value>]) -> Ordering {
    orders
        .iter()
        .zip(a.iter().zip(b))
        .map(|(order, pair)| {
            let ordering = match pair {
                (None, None) => Ordering::Equal,
                (None, Some(_)) => Ordering::Less,
                (Some(_), None) => Ordering::Greater,
                (Some(x), Some(y)) => x.partial_cmp(y).unwrap_or(Ordering::Equal),
            };
            order.direction.apply(ordering)
        })
        .find(|ordering| ordering.is_ne())
        .unwrap_or(Ordering::Equal)
}

/// Reorder `records` so position `i` holds the record previously at
/// `ranked[i]`.
fn permute<R>(records: &mut [R], ranked: &[usize]) {
    // destination[k] is where the record currently at k belongs.
    let mut destination = vec![0; ranked.len()];
    for (position, &source) in ranked.iter().enumerate() {
        destination[source] = position;
    }
    for i in 0..records.len() {
        while destination[i] != i {
            let target = destination[i];
            records.swap(i, target);
            destination.swap(i, target);
        }
    }
}

impl FromStr for Order {
    type Err = QueryError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse(s)
    }
}

impl TryFrom<&str> for Order {
    type Error = QueryError;

    fn try_from(s: &str) -> Result<Self, Self::Error> {
        Self::parse(s)
    }
}

impl fmt::Display for Order {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}{}", self.direction.sign(), self.field)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn ages(records: &[serde_json::Value]) -> Vec<i64> {
        records.iter().filter_map(|r| r["age"].as_i64()).collect()
    }

    #[test]
    fn test_parse() {
        assert_eq!(Order::parse("+age").unwrap(), Order::ascending("age"));
        assert_eq!(Order::parse("-age").unwrap(), Order::descending("age"));
        assert_eq!(Order::parse("age").unwrap(), Order::ascending("age"));
        assert_eq!("-age".parse::<Order>().unwrap().to_string(), "-age");
        assert_eq!(Order::parse("age").unwrap().to_string(), "+age");
    }

    #[test]
    fn test_parse_rejects_empty() {
        assert!(matches!(Order::parse(""), Err(QueryError::InvalidOrder(_))));
        assert!(matches!(Order::parse("+"), Err(QueryError::InvalidOrder(_))));
        assert!(matches!(Order::parse("-"), Err(QueryError::InvalidOrder(_))));
    }

    #[test]
    fn test_sort_by_age() {
        let mut records = vec![json!({"age": 30}), json!({"age": 10}), json!({"age": 20})];
        sort(&[Order::parse("+age").unwrap()], &DefaultAccessor, &mut records).unwrap();
        assert_eq!(ages(&records), vec![10, 20, 30]);

        sort(&[Order::parse("-age").unwrap()], &DefaultAccessor, &mut records).unwrap();
        assert_eq!(ages(&records), vec![30, 20, 10]);
    }

    #[test]
    fn test_compare_multi_tie_breaks() {
        let mut records = vec![
            json!({"name": "b", "age": 1}),
            json!({"name": "a", "age": 2}),
            json!({"name": "b", "age": 3}),
            json!({"name": "a", "age": 1}),
        ];
        let orders = [Order::parse("+name").unwrap(), Order::parse("-age").unwrap()];
        sort(&orders, &DefaultAccessor, &mut records).unwrap();
        assert_eq!(ages(&records), vec![2, 1, 3, 1]);

        for pair in records.windows(2) {
            let ordering = compare_multi(&orders, &DefaultAccessor, &pair[0], &pair[1]).unwrap();
            assert_ne!(ordering, Ordering::Greater);
        }
    }

    #[test]
    fn test_compare_multi_all_equal() {
        let a = json!({"x": 1});
        let orders = [Order::ascending("x"), Order::descending("y")];
        assert_eq!(
            compare_multi(&orders, &DefaultAccessor, &a, &a.clone()).unwrap(),
            Ordering::Equal
        );
        assert_eq!(compare_multi(&[], &DefaultAccessor, &a, &a).unwrap(), Ordering::Equal);
    }

    #[test]
    fn test_missing_key_sorts_first() {
        let mut records = vec![json!({"age": 5}), json!({}), json!({"age": 1})];
        sort(&[Order::ascending("age")], &DefaultAccessor, &mut records).unwrap();
        assert_eq!(records[0], json!({}));
        assert_eq!(ages(&records), vec![1, 5]);
    }

    #[test]
    fn test_incompatible_keys_fail() {
        let mut records = vec![json!({"age": 5}), json!({"age": "five"})];
        let err = sort(&[Order::ascending("age")], &DefaultAccessor, &mut records).unwrap_err();
        assert!(matches!(err, QueryError::Comparison { .. }));

        let err = Order::ascending("age")
            .compare(&records[0], &records[1])
            .unwrap_err();
        assert!(matches!(err, QueryError::Comparison { .. }));
    }

    #[test]
    fn test_large_mixed_type_sort_fails_cleanly() {
        let mut records: Vec<_> = (0..64_i64)
            .map(|i| {
                if i % 7 == 3 {
                    json!({"age": format!("x{i}")})
                } else {
                    json!({"age": i % 13})
                }
            })
            .collect();
        let before = records.clone();

        let err = sort(&[Order::ascending("age")], &DefaultAccessor, &mut records).unwrap_err();
        assert!(matches!(err, QueryError::Comparison { .. }));
        assert_eq!(records, before);
    }

    #[test]
    fn test_mixed_type_on_secondary_key_fails() {
        let mut records: Vec<_> = (0..40_i64)
            .map(|i| {
                let tag = if i == 17 { json!(1) } else { json!(format!("t{i}")) };
                json!({"group": i % 3, "tag": tag})
            })
            .collect();
        let orders = [Order::ascending("group"), Order::descending("tag")];
        let err = sort(&orders, &DefaultAccessor, &mut records).unwrap_err();
        assert!(matches!(err, QueryError::Comparison { .. }));
    }

    #[test]
    fn test_nan_key_fails() {
        let mut records: Vec<i64> = (0..20).collect();
        let accessor = |record: &i64, _: &str| {
            Some(if *record == 11 { Value::Float(f64::NAN) } else { Value::Int(*record) })
        };
        let err = sort(&[Order::ascending("v")], &accessor, &mut records).unwrap_err();
        assert!(matches!(err, QueryError::Comparison { .. }));
    }

    #[test]
    fn test_large_sort_is_stable_and_ordered() {
        let mut records: Vec<_> = (0..100_i32)
            .map(|i| {
                let score = if i % 2 == 0 { json!(i % 10) } else { json!(f64::from(i % 10) + 0.5) };
                json!({"i": i, "score": score})
            })
            .collect();
        sort(&[Order::descending("score")], &DefaultAccessor, &mut records).unwrap();

        for pair in records.windows(2) {
            let ordering = Order::descending("score").compare(&pair[0], &pair[1]).unwrap();
            assert_ne!(ordering, Ordering::Greater);
            if ordering == Ordering::Equal {
                assert!(pair[0]["i"].as_i64() < pair[1]["i"].as_i64());
            }
        }
        assert_eq!(records.len(), 100);
    }

    #[test]
    fn test_mixed_numeric_keys_compare() {
        let a = json!({"v": 1});
        let b = json!({"v": 1.5});
        assert_eq!(Order::ascending("v").compare(&a, &b).unwrap(), Ordering::Less);
    }
}
