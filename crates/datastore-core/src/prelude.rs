//! Prelude module - commonly used types for convenient import.
//!
//! Use `use datastore_core::prelude::*;` to import all essential types.

pub use crate::{
    Cursor, DefaultAccessor, Direction, FieldAccessor, Filter, Key, Operator, Order, Query,
    QueryError, QueryResult, Record, SharedStore, Store, StoreError, StoreResult, Value,
};
