//! Test fixtures: record types, datasets and keys.

use serde::{Deserialize, Serialize};
use serde_json::json;

use datastore_core::{Key, Query, Record, Value};

/// A struct record exposing its fields as attributes.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Person {
    /// Display name.
    pub name: String,
    /// Age in years.
    pub age: i64,
    /// Home city.
    pub city: String,
}

impl Person {
    /// Create a person.
    #[must_use]
    pub fn new(name: &str, age: i64, city: &str) -> Self {
        Self {
            name: name.to_owned(),
            age,
            city: city.to_owned(),
        }
    }
}

impl Record for Person {
    fn attribute(&self, name: &str) -> Option<Value> {
        match name {
            "name" => Some(Value::from(self.name.as_str())),
            "age" => Some(Value::Int(self.age)),
            "city" => Some(Value::from(self.city.as_str())),
            _ => None,
        }
    }
}

/// A small, fixed set of people.
#[must_use]
pub fn people() -> Vec<Person> {
    vec![
        Person::new("alice", 34, "lisbon"),
        Person::new("bob", 27, "oslo"),
        Person::new("carol", 41, "lisbon"),
        Person::new("dave", 27, "berlin"),
        Person::new("erin", 19, "oslo"),
    ]
}

/// JSON records `{"age": a}` for each of `ages`, in order.
#[must_use]
pub fn aged_records(ages: &[i64]) -> Vec<serde_json::Value> {
    ages.iter().map(|age| json!({ "age": age })).collect()
}

/// JSON records `{"index": i}` for `i` in `0..n`.
#[must_use]
pub fn indexed_records(n: i64) -> Vec<serde_json::Value> {
    (0..n).map(|i| json!({ "index": i })).collect()
}

/// Read an integer field back out of JSON records.
#[must_use]
pub fn int_field(records: &[serde_json::Value], field: &str) -> Vec<i64> {
    records.iter().filter_map(|r| r[field].as_i64()).collect()
}

/// Accessor for integer values: the field `value` is the integer itself.
#[must_use]
pub fn int_value_accessor(value: &i64, field: &str) -> Option<Value> {
    (field == "value").then_some(Value::Int(*value))
}

/// An empty query over integer values, using [`int_value_accessor`].
#[must_use]
pub fn int_query() -> Query<i64> {
    Query::with_accessor(int_value_accessor)
}

/// Parent key used by the conformance harness.
#[must_use]
pub fn test_key_prefix() -> Key {
    Key::new("/dfadasfdsafdas")
}
