//! Record field resolution.
//!
//! The query engine never assumes a record shape. Field values are pulled
//! out through a [`FieldAccessor`], so callers with their own data model can
//! plug in a resolver instead of adapting their types.
//!
//! The [`DefaultAccessor`] works on any [`Record`]: it tries named-attribute
//! access first and falls back to keyed (mapping) access.

use std::collections::{BTreeMap, HashMap};

use crate::value::Value;

/// A record whose fields can be looked up by name.
///
/// Both methods default to `None`; implement whichever matches the type.
/// Structs implement [`attribute`](Self::attribute), map-like types
/// implement [`item`](Self::item).
pub trait Record {
    /// Named-attribute lookup.
    fn attribute(&self, _name: &str) -> Option<Value> {
        None
    }

    /// Keyed lookup.
    fn item(&self, _name: &str) -> Option<Value> {
        None
    }
}

/// Strategy that resolves a named field from a record.
///
/// Returning `None` means the record has no value for the field. Filters
/// treat that as a non-match and orders sort it before every present value.
pub trait FieldAccessor<R: ?Sized>: Send + Sync {
    /// Resolve `field` on `record`.
    fn resolve(&self, record: &R, field: &str) -> Option<Value>;
}

impl<R, F> FieldAccessor<R> for F
where
    R: ?Sized,
    F: Fn(&R, &str) -> Option<Value> + Send + Sync,
{
    fn resolve(&self, record: &R, field: &str) -> Option<Value> {
        self(record, field)
    }
}

/// Attribute-then-keyed lookup over any [`Record`].
#[derive(Debug, Clone, Copy, Default)]
pub struct DefaultAccessor;

impl<R: Record + ?Sized> FieldAccessor<R> for DefaultAccessor {
    fn resolve(&self, record: &R, field: &str) -> Option<Value> {
        record.attribute(field).or_else(|| record.item(field))
    }
}

/// Convert a JSON scalar into a [`Value`].
///
/// `null`, arrays and objects have no scalar form and map to `None`.
#[must_use]
pub fn value_from_json(json: &serde_json::Value) -> Option<Value> {
    match json {
        serde_json::Value::Bool(b) => Some(Value::Bool(*b)),
        serde_json::Value::Number(n) => n
            .as_i64()
            .map(Value::Int)
            .or_else(|| n.as_f64().map(Value::Float)),
        serde_json::Value::String(s) => Some(Value::Text(s.clone())),
        serde_json::Value::Null | serde_json::Value::Array(_) | serde_json::Value::Object(_) => {
            None
        },
    }
}

impl Record for serde_json::Value {
    fn item(&self, name: &str) -> Option<Value> {
        self.get(name).and_then(value_from_json)
    }
}

impl Record for serde_json::Map<String, serde_json::Value> {
    fn item(&self, name: &str) -> Option<Value> {
        self.get(name).and_then(value_from_json)
    }
}

impl<S: std::hash::BuildHasher> Record for HashMap<String, Value, S> {
    fn item(&self, name: &str) -> Option<Value> {
        self.get(name).cloned()
    }
}

impl Record for BTreeMap<String, Value> {
    fn item(&self, name: &str) -> Option<Value> {
        self.get(name).cloned()
    }
}
