//! Datastore - backend-agnostic key/value stores.
//!
//! This crate re-exports the whole stack behind one import:
//!
//! - `datastore-core`: keys, values, the [`Store`] trait and the query
//!   engine
//! - `datastore-storage`: the in-memory store and the decorators
//! - `datastore-config`: TOML config with a declarative store topology
//! - `datastore-telemetry`: log subscriber setup
//!
//! and adds [`build_store`], which turns a [`StoreConfig`] into a live store
//! graph.
//!
//! # Example
//!
//! ```rust
//! use datastore::prelude::*;
//!
//! let config = Config::from_toml_str(
//!     r#"
//!     [store]
//!     kind = "tiered"
//!
//!     [[store.tiers]]
//!     kind = "memory"
//!
//!     [[store.tiers]]
//!     kind = "sharded"
//!     shards = [{ kind = "memory" }, { kind = "memory" }, { kind = "memory" }]
//!     "#,
//! )?;
//! let store: SharedStore<serde_json::Value> = build_store(&config.store)?;
//!
//! for (name, age) in [("ann", 31), ("bob", 17), ("cy", 45)] {
//!     let key = Key::new("/people").child(name);
//!     store.put(&key, serde_json::json!({ "name": name, "age": age }))?;
//! }
//!
//! let mut query = Query::new();
//! query.filter_by("age", ">=", 18)?.order_by("-age")?;
//! let adults: Vec<_> = store.query(&query)?.collect::<QueryResult<_>>()?;
//! assert_eq!(adults.len(), 2);
//! assert_eq!(adults[0]["name"], "cy");
//! # Ok::<(), Box<dyn std::error::Error>>(())
//! ```

#![deny(unsafe_code)]
#![deny(missing_docs)]
#![deny(clippy::all)]
#![warn(unreachable_pub)]
#![deny(clippy::unwrap_used)]
#![cfg_attr(test, allow(clippy::unwrap_used))]

pub mod error;
pub mod prelude;
pub mod topology;

pub use datastore_config as config;
pub use datastore_storage as storage;
pub use datastore_telemetry as telemetry;

pub use error::{DatastoreError, DatastoreResult};
pub use topology::{build_store, init_logging, open};

pub use datastore_config::{Config, StoreConfig};
pub use datastore_core::{
    Cursor, Filter, Key, Order, Query, QueryError, QueryResult, SharedStore, Store, StoreError,
    StoreResult, Value,
};
