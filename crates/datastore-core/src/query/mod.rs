//! Generic query engine.
//!
//! A [`Query`] describes a set of records: filters (combined with AND),
//! sort keys (in priority order), and pagination (`offset`, then `limit`).
//! It knows nothing about record shapes; fields are resolved through the
//! query's [`FieldAccessor`].
//!
//! Queries are descriptions. Stores that can evaluate them natively should
//! translate them; [`Query::apply`] is the naive fallback that runs over any
//! sequence of records.
//!
//! # Ordering cost
//!
//! Filtering and pagination stream. Sorting cannot: when a query has orders,
//! `apply` materializes the whole (filtered) input before yielding the first
//! record. Backends with large result sets should sort natively.
//!
//! # Example
//!
//! ```rust
//! use datastore_core::Query;
//! use serde_json::json;
//!
//! let records = vec![json!({"age": 30}), json!({"age": 10}), json!({"age": 20})];
//!
//! let mut query: Query<serde_json::Value> = Query::new();
//! query.filter_by("age", ">", 15)?.order_by("-age")?;
//!
//! let ages: Vec<_> = query
//!     .apply(records)
//!     .map(|r| r.map(|r| r["age"].as_i64()))
//!     .collect::<Result<_, _>>()?;
//! assert_eq!(ages, vec![Some(30), Some(20)]);
//! # Ok::<(), datastore_core::QueryError>(())
//! ```

mod cursor;
mod filter;
mod order;
pub mod paginate;

use std::fmt;
use std::sync::Arc;

use serde::{Deserialize, Serialize};
use tracing::trace;

pub use cursor::Cursor;
pub use filter::{Filter, Operator, filter_sequence};
pub use order::{Direction, Order, compare_multi, sort};

use crate::error::{QueryError, QueryResult};
use crate::key::Key;
use crate::record::{DefaultAccessor, FieldAccessor, Record};
use crate::value::Value;

/// A filter/order/paginate description over records of type `R`.
///
/// Built incrementally: every builder method appends and returns the same
/// query, so calls chain and keep their order.
pub struct Query<R> {
    key: Option<Key>,
    limit: Option<usize>,
    offset: usize,
    filters: Vec<Filter>,
    orders: Vec<Order>,
    accessor: Arc<dyn FieldAccessor<R>>,
}

impl<R: Record> Query<R> {
    /// An empty query resolving fields with [`DefaultAccessor`].
    #[must_use]
    pub fn new() -> Self {
        Self::with_accessor(DefaultAccessor)
    }

    /// Rebuild a query from its mapping form.
    ///
    /// # Errors
    ///
    /// Returns [`QueryError::InvalidOperator`] or [`QueryError::InvalidOrder`]
    /// for malformed entries.
    pub fn from_mapping(mapping: &QueryMapping) -> QueryResult<Self> {
        Self::from_mapping_with(mapping, DefaultAccessor)
    }

    /// Parse a query from the JSON form of its mapping.
    ///
    /// # Errors
    ///
    /// Returns [`QueryError::Serialization`] if the JSON does not describe a
    /// mapping, plus any error from [`from_mapping`](Self::from_mapping).
    pub fn from_json(json: &str) -> QueryResult<Self> {
        let mapping: QueryMapping =
            serde_json::from_str(json).map_err(|e| QueryError::Serialization(e.to_string()))?;
        Self::from_mapping(&mapping)
    }
}

impl<R: Record> Default for Query<R> {
    fn default() -> Self {
        Self::new()
    }
}

impl<R> Query<R> {
    /// An empty query resolving fields with `accessor`.
    pub fn with_accessor(accessor: impl FieldAccessor<R> + 'static) -> Self {
        Self {
            key: None,
            limit: None,
            offset: 0,
            filters: Vec::new(),
            orders: Vec::new(),
            accessor: Arc::new(accessor),
        }
    }

    /// Rebuild a query from its mapping form with a custom accessor.
    ///
    /// # Errors
    ///
    /// Returns [`QueryError::InvalidOperator`] or [`QueryError::InvalidOrder`]
    /// for malformed entries.
    pub fn from_mapping_with(
        mapping: &QueryMapping,
        accessor: impl FieldAccessor<R> + 'static,
    ) -> QueryResult<Self> {
        let mut query = Self::with_accessor(accessor);
        query.key.clone_from(&mapping.key);
        query.limit = mapping.limit;
        query.offset = mapping.offset;
        for FilterSpec(field, op, value) in &mapping.filter {
            query.filter_by(field.as_str(), op, value.clone())?;
        }
        for order in &mapping.order {
            query.order_by(order)?;
        }
        Ok(query)
    }

    /// Key whose descendants the query is scoped to, if any.
    #[must_use]
    pub fn key(&self) -> Option<&Key> {
        self.key.as_ref()
    }

    /// Maximum number of records to yield.
    #[must_use]
    pub fn limit(&self) -> Option<usize> {
        self.limit
    }

    /// Number of leading records to skip.
    #[must_use]
    pub fn offset(&self) -> usize {
        self.offset
    }

    /// Filters, in insertion order.
    #[must_use]
    pub fn filters(&self) -> &[Filter] {
        &self.filters
    }

    /// Sort keys, highest priority first.
    #[must_use]
    pub fn orders(&self) -> &[Order] {
        &self.orders
    }

    /// The accessor used for every filter and order of this query.
    #[must_use]
    pub fn accessor(&self) -> &dyn FieldAccessor<R> {
        self.accessor.as_ref()
    }

    /// Scope the query to descendants of `key`.
    pub fn set_key(&mut self, key: Key) -> &mut Self {
        self.key = Some(key);
        self
    }

    /// Cap the number of yielded records.
    pub fn set_limit(&mut self, limit: usize) -> &mut Self {
        self.limit = Some(limit);
        self
    }

    /// Skip the first `offset` records.
    pub fn set_offset(&mut self, offset: usize) -> &mut Self {
        self.offset = offset;
        self
    }

    /// Append a filter.
    pub fn filter(&mut self, filter: Filter) -> &mut Self {
        self.filters.push(filter);
        self
    }

    /// Build and append a filter.
    ///
    /// # Errors
    ///
    /// Returns [`QueryError::InvalidOperator`] if `op` is not a comparison
    /// operator. The query is unchanged in that case.
    pub fn filter_by(
        &mut self,
        field: impl Into<String>,
        op: &str,
        value: impl Into<Value>,
    ) -> QueryResult<&mut Self> {
        let filter = Filter::new(field, op, value)?;
        Ok(self.filter(filter))
    }

    /// Append a sort key.
    pub fn order(&mut self, order: Order) -> &mut Self {
        self.orders.push(order);
        self
    }

    /// Parse and append a sort key such as `-age`.
    ///
    /// # Errors
    ///
    /// Returns [`QueryError::InvalidOrder`] for an empty specification.
    pub fn order_by(&mut self, spec: &str) -> QueryResult<&mut Self> {
        let order = Order::parse(spec)?;
        Ok(self.order(order))
    }

    /// Naively evaluate the query over `records`.
    ///
    /// Runs filters lazily, sorts (materializing everything) if the query
    /// has orders, then applies offset and limit lazily. Coercion and
    /// comparison errors end the returned cursor.
    pub fn apply<'a, I>(&'a self, records: I) -> Cursor<'a, R>
    where
        R: 'a,
        I: IntoIterator<Item = R>,
        I::IntoIter: 'a,
    {
        trace!(
            filters = self.filters.len(),
            orders = self.orders.len(),
            offset = self.offset,
            limit = ?self.limit,
            "applying query"
        );
        let accessor = self.accessor();

        let mut cursor = if self.filters.is_empty() {
            Cursor::from_records(records)
        } else {
            filter_sequence(&self.filters, accessor, records)
        };

        if !self.orders.is_empty() {
            let mut items = match cursor.collect::<QueryResult<Vec<R>>>() {
                Ok(items) => items,
                Err(e) => return Cursor::failed(e),
            };
            if let Err(e) = sort(&self.orders, accessor, &mut items) {
                return Cursor::failed(e);
            }
            cursor = Cursor::from_records(items);
        }

        if self.offset > 0 {
            cursor = cursor.skip_records(self.offset);
        }
        if let Some(limit) = self.limit {
            cursor = cursor.take_records(limit);
        }
        cursor
    }

    /// The mapping form of this query.
    ///
    /// `limit` and `key` appear only when set, `offset` only when non-zero,
    /// `filter` and `order` only when non-empty.
    #[must_use]
    pub fn to_mapping(&self) -> QueryMapping {
        QueryMapping {
            key: self.key.clone(),
            limit: self.limit,
            offset: self.offset,
            filter: self.filters.iter().map(FilterSpec::from).collect(),
            order: self.orders.iter().map(ToString::to_string).collect(),
        }
    }

    /// The JSON form of [`to_mapping`](Self::to_mapping).
    ///
    /// # Errors
    ///
    /// Returns [`QueryError::Serialization`] if encoding fails.
    pub fn to_json(&self) -> QueryResult<String> {
        serde_json::to_string(&self.to_mapping())
            .map_err(|e| QueryError::Serialization(e.to_string()))
    }
}

impl<R> Clone for Query<R> {
    fn clone(&self) -> Self {
        Self {
            key: self.key.clone(),
            limit: self.limit,
            offset: self.offset,
            filters: self.filters.clone(),
            orders: self.orders.clone(),
            accessor: Arc::clone(&self.accessor),
        }
    }
}

/// Queries compare by their effective description; accessors are ignored.
impl<R> PartialEq for Query<R> {
    fn eq(&self, other: &Self) -> bool {
        self.key == other.key
            && self.limit == other.limit
            && self.offset == other.offset
            && self.filters == other.filters
            && self.orders == other.orders
    }
}

impl<R> fmt::Debug for Query<R> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Query")
            .field("key", &self.key)
            .field("limit", &self.limit)
            .field("offset", &self.offset)
            .field("filters", &self.filters)
            .field("orders", &self.orders)
            .finish_non_exhaustive()
    }
}

/// Renders the JSON mapping form, e.g. `{"limit":3,"order":["-age"]}`.
impl<R> fmt::Display for Query<R> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let json = serde_json::to_string(&self.to_mapping()).map_err(|_| fmt::Error)?;
        f.write_str(&json)
    }
}

/// A `[field, op, value]` triple in a [`QueryMapping`].
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FilterSpec(pub String, pub String, pub Value);

impl From<&Filter> for FilterSpec {
    fn from(filter: &Filter) -> Self {
        Self(
            filter.field().to_owned(),
            filter.op().as_str().to_owned(),
            filter.value().clone(),
        )
    }
}

impl From<Filter> for FilterSpec {
    fn from(filter: Filter) -> Self {
        Self::from(&filter)
    }
}

/// Plain structural form of a [`Query`].
///
/// ```json
/// {"limit": 3, "offset": 4, "filter": [["age", ">", 15]], "order": ["-age"]}
/// ```
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct QueryMapping {
    /// Scope key.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub key: Option<Key>,
    /// Maximum number of records.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub limit: Option<usize>,
    /// Records to skip.
    #[serde(default, skip_serializing_if = "is_zero")]
    pub offset: usize,
    /// Filters as `[field, op, value]` triples.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub filter: Vec<FilterSpec>,
    /// Orders as signed field names.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub order: Vec<String>,
}

#[allow(clippy::trivially_copy_pass_by_ref)]
fn is_zero(n: &usize) -> bool {
    *n == 0
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn indexed(n: i64) -> Vec<serde_json::Value> {
        (0..n).map(|i| json!({"i": i})).collect()
    }

    fn field(records: &[serde_json::Value], name: &str) -> Vec<i64> {
        records.iter().filter_map(|r| r[name].as_i64()).collect()
    }

    fn run(query: &Query<serde_json::Value>, records: Vec<serde_json::Value>) -> Vec<serde_json::Value> {
        query.apply(records).collect::<QueryResult<_>>().unwrap()
    }

    #[test]
    fn test_empty_query_passes_everything() {
        let query = Query::new();
        assert_eq!(field(&run(&query, indexed(5)), "i"), vec![0, 1, 2, 3, 4]);
    }

    #[test]
    fn test_filter_scenario() {
        let records = vec![json!({"age": 10}), json!({"age": 20}), json!({"age": 30})];
        let mut query = Query::new();
        query.filter_by("age", ">", 15).unwrap();
        assert_eq!(field(&run(&query, records), "age"), vec![20, 30]);
    }

    #[test]
    fn test_order_scenario() {
        let records = vec![json!({"age": 30}), json!({"age": 10}), json!({"age": 20})];

        let mut asc = Query::new();
        asc.order_by("+age").unwrap();
        assert_eq!(field(&run(&asc, records.clone()), "age"), vec![10, 20, 30]);

        let mut desc = Query::new();
        desc.order_by("-age").unwrap();
        assert_eq!(field(&run(&desc, records), "age"), vec![30, 20, 10]);
    }

    #[test]
    fn test_pagination_scenario() {
        let mut query = Query::new();
        query.set_limit(3).set_offset(4);
        assert_eq!(field(&run(&query, indexed(10)), "i"), vec![4, 5, 6]);
    }

    #[test]
    fn test_limit_uses_limit_not_offset() {
        let mut query = Query::new();
        query.set_offset(1).set_limit(5);
        assert_eq!(field(&run(&query, indexed(10)), "i"), vec![1, 2, 3, 4, 5]);
    }

    #[test]
    fn test_limit_zero() {
        let mut query = Query::new();
        query.set_limit(0);
        assert!(run(&query, indexed(3)).is_empty());
    }

    #[test]
    fn test_offset_past_end() {
        let mut query = Query::new();
        query.set_offset(20);
        assert!(run(&query, indexed(3)).is_empty());
    }

    #[test]
    fn test_full_pipeline() {
        let records: Vec<_> = (0..20).map(|i| json!({"i": i, "g": i % 3})).collect();
        let mut query = Query::new();
        query
            .filter_by("i", ">=", 5)
            .unwrap()
            .filter_by("g", "!=", 1)
            .unwrap()
            .order_by("-g")
            .unwrap()
            .order_by("+i")
            .unwrap()
            .set_offset(1)
            .set_limit(4);
        // g=2: 5, 8, 11, 14, 17 then g=0: 6, 9, 12, 15, 18
        assert_eq!(field(&run(&query, records), "i"), vec![8, 11, 14, 17]);
    }

    #[test]
    fn test_streaming_without_orders() {
        let mut query = Query::new();
        query.filter_by("i", ">", 1).unwrap().set_limit(2);
        let infinite = (0..).map(|i| json!({"i": i}));
        let out: Vec<_> = query.apply(infinite).collect::<QueryResult<_>>().unwrap();
        assert_eq!(field(&out, "i"), vec![2, 3]);
    }

    #[test]
    fn test_coercion_error_aborts() {
        let records = vec![json!({"age": 1}), json!({"age": "x"}), json!({"age": 3})];
        let mut query = Query::new();
        query.filter_by("age", ">", 0).unwrap();
        let out: Vec<_> = query.apply(records).collect();
        assert_eq!(out.len(), 2);
        assert!(matches!(out[1], Err(QueryError::TypeCoercion { .. })));
    }

    #[test]
    fn test_comparison_error_surfaces() {
        let records = vec![json!({"age": 1}), json!({"age": "x"})];
        let mut query = Query::new();
        query.order_by("age").unwrap();
        let out: Vec<_> = query.apply(records).collect();
        assert_eq!(out.len(), 1);
        assert!(matches!(out[0], Err(QueryError::Comparison { .. })));
    }

    #[test]
    fn test_display_renders_mapping() {
        let mut query: Query<serde_json::Value> = Query::new();
        assert_eq!(query.to_string(), "{}");

        query
            .set_limit(3)
            .set_offset(4)
            .filter_by("age", ">", 15)
            .unwrap()
            .order_by("-age")
            .unwrap();
        assert_eq!(
            query.to_string(),
            r#"{"limit":3,"offset":4,"filter":[["age",">",15]],"order":["-age"]}"#
        );
        assert_eq!(Query::from_json(&query.to_string()).unwrap(), query);
    }

    #[test]
    fn test_custom_accessor() {
        let mut query: Query<(String, i64)> =
            Query::with_accessor(|record: &(String, i64), field: &str| {
                (field == "score").then(|| Value::Int(record.1))
            });
        query.filter_by("score", ">=", 2).unwrap().order_by("-score").unwrap();
        let records = vec![("a".to_owned(), 1), ("b".to_owned(), 3), ("c".to_owned(), 2)];
        let names: Vec<String> = query
            .apply(records)
            .map(|r| r.map(|(name, _)| name))
            .collect::<QueryResult<_>>()
            .unwrap();
        assert_eq!(names, vec!["b", "c"]);
    }

    #[test]
    fn test_builder_preserves_order_and_rejects_bad_input() {
        let mut query: Query<serde_json::Value> = Query::new();
        query.filter_by("a", "=", 1).unwrap().filter_by("b", "<", 2).unwrap();
        assert!(query.filter_by("c", "=>", 3).is_err());
        assert!(query.order_by("").is_err());
        let fields: Vec<_> = query.filters().iter().map(Filter::field).collect();
        assert_eq!(fields, vec!["a", "b"]);
        assert!(query.orders().is_empty());
    }

    #[test]
    fn test_to_mapping_omits_defaults() {
        let query: Query<serde_json::Value> = Query::new();
        assert_eq!(serde_json::to_value(query.to_mapping()).unwrap(), json!({}));

        let mut query: Query<serde_json::Value> = Query::new();
        query.set_limit(0);
        assert_eq!(serde_json::to_value(query.to_mapping()).unwrap(), json!({"limit": 0}));
    }

    #[test]
    fn test_to_mapping_shape() {
        let mut query: Query<serde_json::Value> = Query::new();
        query
            .set_limit(3)
            .set_offset(4)
            .filter_by("age", ">", 15)
            .unwrap()
            .order_by("-age")
            .unwrap()
            .order_by("name")
            .unwrap();
        assert_eq!(
            serde_json::to_value(query.to_mapping()).unwrap(),
            json!({
                "limit": 3,
                "offset": 4,
                "filter": [["age", ">", 15]],
                "order": ["-age", "+name"],
            })
        );
    }

    #[test]
    fn test_mapping_round_trip() {
        let mut query: Query<serde_json::Value> = Query::new();
        query
            .set_key(Key::new("/people"))
            .set_offset(2)
            .filter_by("name", "!=", "bob")
            .unwrap()
            .filter_by("score", "<=", 2.5)
            .unwrap()
            .order_by("-score")
            .unwrap();

        let rebuilt = Query::from_mapping(&query.to_mapping()).unwrap();
        assert_eq!(rebuilt, query);

        let rebuilt: Query<serde_json::Value> = Query::from_json(&query.to_json().unwrap()).unwrap();
        assert_eq!(rebuilt, query);
    }

    #[test]
    fn test_from_mapping_accepts_constructed_filters() {
        let filter = Filter::new("age", ">", 15).unwrap();
        let mapping = QueryMapping {
            filter: vec![filter.clone().into(), FilterSpec("age".into(), "<".into(), Value::Int(40))],
            ..QueryMapping::default()
        };
        let query: Query<serde_json::Value> = Query::from_mapping(&mapping).unwrap();
        assert_eq!(query.filters()[0], filter);
        assert_eq!(query.filters().len(), 2);
    }

    #[test]
    fn test_from_json_rejects_bad_input() {
        assert!(matches!(
            Query::<serde_json::Value>::from_json(r#"{"filter": [["age", "~", 1]]}"#),
            Err(QueryError::InvalidOperator(_))
        ));
        assert!(matches!(
            Query::<serde_json::Value>::from_json(r#"{"order": [""]}"#),
            Err(QueryError::InvalidOrder(_))
        ));
        assert!(matches!(
            Query::<serde_json::Value>::from_json(r#"{"limit": -1}"#),
            Err(QueryError::Serialization(_))
        ));
    }
}
