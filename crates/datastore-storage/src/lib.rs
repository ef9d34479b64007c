//! Datastore Storage - concrete stores and store decorators.
//!
//! Every type here implements [`Store`](datastore_core::Store):
//!
//! - [`MemoryStore`]: map-backed leaf store, for tests and ephemeral data
//! - [`KeyTransformStore`]: rewrites keys before delegating
//! - [`NamespaceStore`]: nests every key under a prefix
//! - [`LowercaseKeyStore`]: case-folds every key
//! - [`TieredStore`]: ordered cache tiers with read promotion
//! - [`ShardedStore`]: routes each key to exactly one shard
//!
//! Decorators own no data. They compose freely:
//!
//! ```rust
//! use std::sync::Arc;
//!
//! use datastore_core::{Key, SharedStore, Store};
//! use datastore_storage::{MemoryStore, NamespaceStore, TieredStore};
//!
//! let cache: SharedStore<String> = Arc::new(MemoryStore::<String>::new());
//! let backing: SharedStore<String> =
//!     Arc::new(NamespaceStore::new(Key::new("/app"), MemoryStore::<String>::new()));
//! let store = TieredStore::new(vec![cache, backing])?;
//!
//! store.put(&Key::new("/greeting"), "hello".to_owned())?;
//! assert_eq!(store.get(&Key::new("/greeting"))?, "hello");
//! # Ok::<(), datastore_core::StoreError>(())
//! ```

#![deny(unsafe_code)]
#![deny(missing_docs)]
#![deny(clippy::all)]
#![warn(unreachable_pub)]
#![deny(clippy::unwrap_used)]
#![cfg_attr(test, allow(clippy::unwrap_used))]

pub mod memory;
pub mod sharded;
pub mod tiered;
pub mod transform;

pub use memory::MemoryStore;
pub use sharded::{ShardedStore, ShardingFn, default_sharding_fn};
pub use tiered::TieredStore;
pub use transform::{KeyTransformFn, KeyTransformStore, LowercaseKeyStore, NamespaceStore};
