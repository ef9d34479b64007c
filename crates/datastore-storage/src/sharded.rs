//! Hash-routed sharding.

use std::fmt;
use std::sync::Arc;

use tracing::debug;

use datastore_core::{Cursor, Key, Query, SharedStore, Store, StoreError, StoreResult};

/// Maps a key to a shard hash. The shard index is `hash mod N`.
pub type ShardingFn = Arc<dyn Fn(&Key) -> u64 + Send + Sync>;

/// The default sharding function: the first eight bytes (little-endian) of
/// the BLAKE3 digest of the key's string form.
///
/// Stable across processes, platforms and releases.
#[must_use]
pub fn default_sharding_fn(key: &Key) -> u64 {
    let digest = blake3::hash(key.to_string().as_bytes());
    let mut head = [0u8; 8];
    head.copy_from_slice(&digest.as_bytes()[..8]);
    u64::from_le_bytes(head)
}

/// Routes every key to exactly one of N shards.
///
/// No broadcast and no fallback scan: a value placed in the wrong shard by
/// going around the wrapper stays invisible through it. Shard assignment
/// only changes if the shard list or sharding function does.
pub struct ShardedStore<V> {
    shards: Arc<[SharedStore<V>]>,
    sharding: ShardingFn,
}

impl<V> ShardedStore<V> {
    /// Shard over `shards` with [`default_sharding_fn`].
    ///
    /// # Errors
    ///
    /// Returns [`StoreError::InvalidTopology`] if `shards` is empty.
    pub fn new(shards: Vec<SharedStore<V>>) -> StoreResult<Self> {
        Self::with_sharding_fn(shards, default_sharding_fn)
    }

    /// Shard over `shards` with a custom sharding function.
    ///
    /// # Errors
    ///
    /// Returns [`StoreError::InvalidTopology`] if `shards` is empty.
    pub fn with_sharding_fn<F>(
        shards: Vec<SharedStore<V>>,
        sharding: F,
    ) -> StoreResult<Self>
    where
        F: Fn(&Key) -> u64 + Send + Sync + 'static,
    {
        if shards.is_empty() {
            return Err(StoreError::InvalidTopology(
                "sharded store needs at least one shard".to_owned(),
            ));
        }
        Ok(Self {
            shards: Arc::from(shards),
            sharding: Arc::new(sharding),
        })
    }

    /// The shard list, shared with every clone of this store.
    #[must_use]
    pub fn shards(&self) -> &Arc<[SharedStore<V>]> {
        &self.shards
    }

    /// Index of the shard that owns `key`.
    #[must_use]
    pub fn shard_index(&self, key: &Key) -> usize {
        let hash = (self.sharding)(key);
        u64::try_from(self.shards.len())
            .ok()
            .and_then(|n| hash.checked_rem(n))
            .and_then(|i| usize::try_from(i).ok())
            .unwrap_or_default()
    }

    /// The shard that owns `key`.
    fn shard(&self, key: &Key) -> StoreResult<&SharedStore<V>> {
        let index = self.shard_index(key);
        debug!(%key, shard = index, "routing to shard");
        self.shards.get(index).ok_or_else(|| {
            StoreError::Internal(format!("shard index {index} out of range"))
        })
    }
}

impl<V> Clone for ShardedStore<V> {
    fn clone(&self) -> Self {
        Self {
            shards: Arc::clone(&self.shards),
            sharding: Arc::clone(&self.sharding),
        }
    }
}

impl<V> fmt::Debug for ShardedStore<V> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ShardedStore")
            .field("shards", &self.shards.len())
            .finish_non_exhaustive()
    }
}

impl<V> Store<V> for ShardedStore<V> {
    fn put(&self, key: &Key, value: V) -> StoreResult<()> {
        self.shard(key)?.put(key, value)
    }

    fn get(&self, key: &Key) -> StoreResult<V> {
        self.shard(key)?.get(key)
    }

    fn delete(&self, key: &Key) -> StoreResult<()> {
        self.shard(key)?.delete(key)
    }

    fn contains(&self, key: &Key) -> StoreResult<bool> {
        self.shard(key)?.contains(key)
    }

    fn query<'q>(&self, _query: &'q Query<V>) -> StoreResult<Cursor<'q, V>> {
        Err(StoreError::NotImplemented(
            "sharded store cannot answer a query from a single shard".to_owned(),
        ))
    }
}
