//! Store graphs from declarative config.

use std::path::Path;
use std::sync::Arc;

use tracing::{debug, info};

use datastore_config::{Config, StoreConfig};
use datastore_core::{Key, SharedStore, StoreResult};
use datastore_storage::{
    LowercaseKeyStore, MemoryStore, NamespaceStore, ShardedStore, TieredStore,
};
use datastore_telemetry::{LogConfig, setup_logging};

use crate::error::DatastoreResult;

/// Build the store graph described by `config`.
///
/// Every `memory` node becomes a fresh, empty [`MemoryStore`].
///
/// # Errors
///
/// Returns [`StoreError::InvalidTopology`](datastore_core::StoreError::InvalidTopology)
/// for an empty tier or shard list.
pub fn build_store<V>(config: &StoreConfig) -> StoreResult<SharedStore<V>>
where
    V: Clone + Send + Sync + 'static,
{
    let store: SharedStore<V> = match config {
        StoreConfig::Memory => Arc::new(MemoryStore::<V>::new()),
        StoreConfig::Lowercase { inner } => {
            Arc::new(LowercaseKeyStore::new(build_store::<V>(inner)?))
        },
        StoreConfig::Namespace { prefix, inner } => Arc::new(NamespaceStore::new(
            Key::new(prefix),
            build_store::<V>(inner)?,
        )),
        StoreConfig::Tiered { tiers } => Arc::new(TieredStore::new(build_all::<V>(tiers)?)?),
        StoreConfig::Sharded { shards } => {
            Arc::new(ShardedStore::new(build_all::<V>(shards)?)?)
        },
    };
    debug!(kind = config.kind(), "built store");
    Ok(store)
}

fn build_all<V>(configs: &[StoreConfig]) -> StoreResult<Vec<SharedStore<V>>>
where
    V: Clone + Send + Sync + 'static,
{
    configs.iter().map(build_store).collect()
}

/// Install the log subscriber described by `config.logging`.
///
/// # Errors
///
/// Returns an error if the logging section is unusable or a subscriber is
/// already installed.
pub fn init_logging(config: &Config) -> DatastoreResult<()> {
    setup_logging(&LogConfig::from_section(&config.logging)?)?;
    Ok(())
}

/// Load a config file and build its store graph.
///
/// Logging is left alone; call [`init_logging`] with the same config to
/// install it.
///
/// # Errors
///
/// Returns an error if the file cannot be loaded or the graph cannot be
/// built.
pub fn open<V>(path: &Path) -> DatastoreResult<(Config, SharedStore<V>)>
where
    V: Clone + Send + Sync + 'static,
{
    let config = Config::load_file(path)?;
    let store = build_store(&config.store)?;
    info!(
        path = %path.display(),
        kind = config.store.kind(),
        leaves = config.store.leaf_count(),
        "opened store"
    );
    Ok((config, store))
}

#[cfg(test)]
mod tests {
    use std::io::Write;

    use super::*;
    use crate::error::DatastoreError;
    use datastore_core::{QueryResult, Store, StoreError};
    use datastore_telemetry::TelemetryError;
    use datastore_test::{exercise_store, int_query};

    #[test]
    fn test_build_memory() {
        let store: SharedStore<i64> = build_store(&StoreConfig::Memory).unwrap();
        store.put(&Key::new("/a"), 1).unwrap();
        assert_eq!(store.get(&Key::new("/a")).unwrap(), 1);
    }

    #[test]
    fn test_build_nested_graph() {
        let config = Config::from_toml_str(
            r#"
            [store]
            kind = "lowercase"
            inner = { kind = "namespace", prefix = "/app", inner = { kind = "memory" } }
            "#,
        )
        .unwrap();
        let store: SharedStore<i64> = build_store(&config.store).unwrap();
        store.put(&Key::new("/Users/Ann"), 3).unwrap();
        assert_eq!(store.get(&Key::new("/users/ann")).unwrap(), 3);

        let mut query = int_query();
        query.set_key(Key::new("/app/users"));
        let values: Vec<i64> = store
            .query(&query)
            .unwrap()
            .collect::<QueryResult<_>>()
            .unwrap();
        assert_eq!(values, vec![3]);
    }

    #[test]
    fn test_empty_topology_rejected() {
        let err =
            build_store::<i64>(&StoreConfig::Sharded { shards: Vec::new() }).err().unwrap();
        assert!(matches!(err, StoreError::InvalidTopology(_)));
    }

    #[test]
    fn test_built_graphs_conform() {
        let tiered: SharedStore<i64> = build_store(&StoreConfig::Tiered {
            tiers: vec![StoreConfig::Memory, StoreConfig::Memory],
        })
        .unwrap();
        let sharded: SharedStore<i64> = build_store(&StoreConfig::Sharded {
            shards: vec![StoreConfig::Memory; 4],
        })
        .unwrap();
        exercise_store(&[&tiered, &sharded], 100);
    }

    #[test]
    fn test_init_logging_rejects_unknown_format() {
        let mut config = Config::default();
        config.logging.format = "xml".to_owned();
        let err = init_logging(&config).unwrap_err();
        assert!(matches!(
            err,
            DatastoreError::Telemetry(TelemetryError::ConfigError(ref msg)) if msg.contains("xml")
        ));
    }

    #[test]
    fn test_open_file() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        writeln!(
            file,
            "[logging]\nlevel = \"debug\"\n\n[store]\nkind = \"tiered\"\ntiers = [{{ kind = \"memory\" }}, {{ kind = \"memory\" }}]"
        )
        .unwrap();

        let (config, store) = open::<String>(file.path()).unwrap();
        assert_eq!(config.logging.level, "debug");
        store.put(&Key::new("/k"), "v".to_owned()).unwrap();
        assert_eq!(store.get(&Key::new("/k")).unwrap(), "v");
    }
}
