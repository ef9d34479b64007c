//! Datastore Core - keys, values, the query engine, and the store trait.
//!
//! This crate defines the vocabulary every datastore crate shares:
//!
//! - [`Key`]: hierarchical path addressing values in a store
//! - [`Value`], [`Record`], [`FieldAccessor`]: shape-agnostic field access
//! - [`Filter`], [`Order`], [`Query`]: filter, sort and paginate any
//!   sequence of records
//! - [`Store`]: the `put` / `get` / `delete` / `contains` / `query`
//!   capability implemented by backends and decorators alike
//!
//! Concrete stores live in `datastore-storage`.

#![deny(unsafe_code)]
#![deny(missing_docs)]
#![deny(clippy::all)]
#![warn(unreachable_pub)]
#![deny(clippy::unwrap_used)]
#![cfg_attr(test, allow(clippy::unwrap_used))]

pub mod prelude;

pub mod error;
pub mod key;
pub mod query;
pub mod record;
pub mod store;
pub mod value;

pub use error::{QueryError, QueryResult, StoreError, StoreResult};
pub use key::Key;
pub use query::{
    Cursor, Direction, Filter, FilterSpec, Operator, Order, Query, QueryMapping, compare_multi,
    filter_sequence, sort,
};
pub use record::{DefaultAccessor, FieldAccessor, Record, value_from_json};
pub use store::{SharedStore, Store};
pub use value::Value;
