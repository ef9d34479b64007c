//! Prelude module - commonly used types for convenient import.
//!
//! Use `use datastore::prelude::*;` to bring in the core types, every store,
//! the config types and the topology builder.

pub use datastore_core::prelude::*;

// Stores
pub use datastore_storage::{
    KeyTransformStore, LowercaseKeyStore, MemoryStore, NamespaceStore, ShardedStore, TieredStore,
};

// Configuration
pub use datastore_config::{Config, ConfigError, LoggingSection, StoreConfig};

// Logging
pub use datastore_telemetry::{LogConfig, LogFormat, setup_logging};

// Facade
pub use crate::{DatastoreError, DatastoreResult, build_store, init_logging};
