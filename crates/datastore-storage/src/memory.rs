//! In-memory leaf store.

use std::collections::BTreeMap;
use std::fmt;
use std::sync::RwLock;

use tracing::trace;

use datastore_core::{Cursor, Key, Query, Store, StoreError, StoreResult};

/// Map-backed store for tests and ephemeral data.
///
/// Values live in a `BTreeMap`, so queries see them in key order.
pub struct MemoryStore<V> {
    data: RwLock<BTreeMap<Key, V>>,
}

impl<V> MemoryStore<V> {
    /// Create a new empty store.
    #[must_use]
    pub fn new() -> Self {
        Self {
            data: RwLock::new(BTreeMap::new()),
        }
    }

    /// Number of stored values.
    ///
    /// # Errors
    ///
    /// Returns [`StoreError::Internal`] if the lock is poisoned.
    pub fn len(&self) -> StoreResult<usize> {
        let data = self
            .data
            .read()
            .map_err(|e| StoreError::Internal(e.to_string()))?;
        Ok(data.len())
    }

    /// Whether the store holds no values.
    ///
    /// # Errors
    ///
    /// Returns [`StoreError::Internal`] if the lock is poisoned.
    pub fn is_empty(&self) -> StoreResult<bool> {
        Ok(self.len()? == 0)
    }

    /// All stored keys, in order.
    ///
    /// # Errors
    ///
    /// Returns [`StoreError::Internal`] if the lock is poisoned.
    pub fn keys(&self) -> StoreResult<Vec<Key>> {
        let data = self
            .data
            .read()
            .map_err(|e| StoreError::Internal(e.to_string()))?;
        Ok(data.keys().cloned().collect())
    }
}

impl<V> Default for MemoryStore<V> {
    fn default() -> Self {
        Self::new()
    }
}

impl<V> fmt::Debug for MemoryStore<V> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("MemoryStore").finish_non_exhaustive()
    }
}

impl<V> Store<V> for MemoryStore<V>
where
    V: Clone + Send + Sync,
{
    fn put(&self, key: &Key, value: V) -> StoreResult<()> {
        trace!(%key, "memory put");
        let mut data = self
            .data
            .write()
            .map_err(|e| StoreError::Internal(e.to_string()))?;
        data.insert(key.clone(), value);
        Ok(())
    }

    fn get(&self, key: &Key) -> StoreResult<V> {
        let data = self
            .data
            .read()
            .map_err(|e| StoreError::Internal(e.to_string()))?;
        data.get(key)
            .cloned()
            .ok_or_else(|| StoreError::NotFound(key.to_string()))
    }

    fn delete(&self, key: &Key) -> StoreResult<()> {
        trace!(%key, "memory delete");
        let mut data = self
            .data
            .write()
            .map_err(|e| StoreError::Internal(e.to_string()))?;
        data.remove(key);
        Ok(())
    }

    fn contains(&self, key: &Key) -> StoreResult<bool> {
        let data = self
            .data
            .read()
            .map_err(|e| StoreError::Internal(e.to_string()))?;
        Ok(data.contains_key(key))
    }

    /// Snapshots the values in scope, then runs the generic query engine.
    fn query<'q>(&self, query: &'q Query<V>) -> StoreResult<Cursor<'q, V>> {
        let data = self
            .data
            .read()
            .map_err(|e| StoreError::Internal(e.to_string()))?;
        let values: Vec<V> = match query.key() {
            Some(scope) => data
                .iter()
                .filter(|(key, _)| scope.is_ancestor_of(key))
                .map(|(_, value)| value.clone())
                .collect(),
            None => data.values().cloned().collect(),
        };
        drop(data);
        Ok(query.apply(values))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use datastore_core::QueryResult;
    use datastore_test::{exercise_store, int_query};

    #[test]
    fn test_memory_put_get() {
        let store = MemoryStore::new();
        store.put(&Key::new("/a"), 1).unwrap();
        assert_eq!(store.get(&Key::new("/a")).unwrap(), 1);
    }

    #[test]
    fn test_memory_get_missing() {
        let store: MemoryStore<i64> = MemoryStore::new();
        let err = store.get(&Key::new("/missing")).unwrap_err();
        assert!(err.is_not_found());
    }

    #[test]
    fn test_memory_overwrite() {
        let store = MemoryStore::new();
        store.put(&Key::new("/k"), 1).unwrap();
        store.put(&Key::new("/k"), 2).unwrap();
        assert_eq!(store.get(&Key::new("/k")).unwrap(), 2);
        assert_eq!(store.len().unwrap(), 1);
    }

    #[test]
    fn test_memory_delete_is_idempotent() {
        let store = MemoryStore::new();
        store.put(&Key::new("/k"), 1).unwrap();
        store.delete(&Key::new("/k")).unwrap();
        store.delete(&Key::new("/k")).unwrap();
        assert!(!store.contains(&Key::new("/k")).unwrap());
        assert!(store.is_empty().unwrap());
    }

    #[test]
    fn test_memory_query_in_key_order() {
        let store = MemoryStore::new();
        for (name, value) in [("c", 3), ("a", 1), ("b", 2)] {
            store.put(&Key::new("/n").child(name), value).unwrap();
        }
        let query = int_query();
        let values: Vec<i64> = store
            .query(&query)
            .unwrap()
            .collect::<QueryResult<_>>()
            .unwrap();
        assert_eq!(values, vec![1, 2, 3]);
        assert_eq!(
            store.keys().unwrap(),
            vec![Key::new("/n/a"), Key::new("/n/b"), Key::new("/n/c")]
        );
    }

    #[test]
    fn test_memory_query_scoped_to_key() {
        let store = MemoryStore::new();
        store.put(&Key::new("/users/a"), 1).unwrap();
        store.put(&Key::new("/users/b"), 2).unwrap();
        store.put(&Key::new("/groups/a"), 3).unwrap();
        store.put(&Key::new("/users"), 4).unwrap();

        let mut query = int_query();
        query.set_key(Key::new("/users"));
        let values: Vec<i64> = store
            .query(&query)
            .unwrap()
            .collect::<QueryResult<_>>()
            .unwrap();
        assert_eq!(values, vec![1, 2]);
    }

    #[test]
    fn test_memory_query_filters_json_records() {
        let store = MemoryStore::new();
        for age in [10, 20, 30] {
            store
                .put(&Key::new("/p").child(age), serde_json::json!({ "age": age }))
                .unwrap();
        }
        let mut query = Query::new();
        query.filter_by("age", ">", 15).unwrap().order_by("-age").unwrap();
        let ages: Vec<i64> = store
            .query(&query)
            .unwrap()
            .map(|r| r.map(|v| v["age"].as_i64().unwrap_or_default()))
            .collect::<QueryResult<_>>()
            .unwrap();
        assert_eq!(ages, vec![30, 20]);
    }

    #[test]
    fn test_memory_conformance() {
        let s1: MemoryStore<i64> = MemoryStore::new();
        let s2: MemoryStore<i64> = MemoryStore::new();
        let s3: MemoryStore<i64> = MemoryStore::new();
        exercise_store(&[&s1, &s2, &s3], 200);
    }
}
