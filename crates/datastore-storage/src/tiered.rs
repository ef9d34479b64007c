//! Ordered cache tiers with read promotion.

use std::fmt;

use tracing::{debug, warn};

use datastore_core::{Cursor, Key, Query, SharedStore, Store, StoreError, StoreResult};

/// Delegates to an ordered list of stores, tier 0 nearest.
///
/// - `put` writes every tier in order and stops at the first failure.
///   Tiers written before the failure keep the value; there is no rollback.
/// - `get` scans in order and promotes a hit into every earlier tier.
/// - `contains` scans without promoting.
/// - `delete` removes from every tier.
/// - `query` runs against tier 0 only. Results are never merged across
///   tiers.
///
/// Tiers need not be disjoint; a key may live in several at once.
pub struct TieredStore<V> {
    tiers: Vec<SharedStore<V>>,
}

impl<V> TieredStore<V> {
    /// Build a tiered store over `tiers`, nearest first.
    ///
    /// # Errors
    ///
    /// Returns [`StoreError::InvalidTopology`] if `tiers` is empty.
    pub fn new(tiers: Vec<SharedStore<V>>) -> StoreResult<Self> {
        if tiers.is_empty() {
            return Err(StoreError::InvalidTopology(
                "tiered store needs at least one tier".to_owned(),
            ));
        }
        Ok(Self { tiers })
    }

    /// The tiers, nearest first.
    #[must_use]
    pub fn tiers(&self) -> &[SharedStore<V>] {
        &self.tiers
    }
}

impl<V> fmt::Debug for TieredStore<V> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("TieredStore")
            .field("tiers", &self.tiers.len())
            .finish()
    }
}

impl<V: Clone> Store<V> for TieredStore<V> {
    fn put(&self, key: &Key, value: V) -> StoreResult<()> {
        for (index, tier) in self.tiers.iter().enumerate() {
            if let Err(e) = tier.put(key, value.clone()) {
                if index > 0 {
                    warn!(
                        %key,
                        tier = index,
                        error = %e,
                        "tiered put failed, earlier tiers keep the value"
                    );
                }
                return Err(e);
            }
        }
        Ok(())
    }

    fn get(&self, key: &Key) -> StoreResult<V> {
        for (index, tier) in self.tiers.iter().enumerate() {
            let value = match tier.get(key) {
                Ok(value) => value,
                Err(StoreError::NotFound(_)) => continue,
                Err(e) => return Err(e),
            };
            debug!(%key, tier = index, "tiered hit");
            for earlier in &self.tiers[..index] {
                earlier.put(key, value.clone())?;
            }
            if index > 0 {
                debug!(%key, tiers = index, "promoted into earlier tiers");
            }
            return Ok(value);
        }
        Err(StoreError::NotFound(key.to_string()))
    }

    fn delete(&self, key: &Key) -> StoreResult<()> {
        let mut first_error = None;
        for (index, tier) in self.tiers.iter().enumerate() {
            if let Err(e) = tier.delete(key) {
                warn!(%key, tier = index, error = %e, "tiered delete failed");
                first_error.get_or_insert(e);
            }
        }
        first_error.map_or(Ok(()), Err)
    }

    fn contains(&self, key: &Key) -> StoreResult<bool> {
        for tier in &self.tiers {
            if tier.contains(key)? {
                return Ok(true);
            }
        }
        Ok(false)
    }

    fn query<'q>(&self, query: &'q Query<V>) -> StoreResult<Cursor<'q, V>> {
        match self.tiers.first() {
            Some(nearest) => nearest.query(query),
            None => Err(StoreError::InvalidTopology(
                "tiered store has no tiers".to_owned(),
            )),
        }
    }
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use super::*;
    use crate::memory::MemoryStore;
    use datastore_core::QueryResult;
    use datastore_test::{FailOn, MockStore, exercise_store, int_query};

    fn memory_tiers(n: usize) -> (Vec<Arc<MemoryStore<String>>>, TieredStore<String>) {
        let tiers: Vec<Arc<MemoryStore<String>>> =
            (0..n).map(|_| Arc::new(MemoryStore::new())).collect();
        let shared = tiers
            .iter()
            .map(|t| Arc::clone(t) as SharedStore<String>)
            .collect();
        (tiers, TieredStore::new(shared).unwrap())
    }

    #[test]
    fn test_empty_tiers_rejected() {
        let err = TieredStore::<i64>::new(Vec::new()).unwrap_err();
        assert!(matches!(err, StoreError::InvalidTopology(_)));
    }

    #[test]
    fn test_get_promotes_into_earlier_tiers() {
        let (tiers, store) = memory_tiers(3);
        let key = Key::new("/k");
        tiers[1].put(&key, "v".to_owned()).unwrap();

        assert_eq!(store.get(&key).unwrap(), "v");
        assert!(tiers[0].contains(&key).unwrap());
        assert!(tiers[1].contains(&key).unwrap());
        assert!(!tiers[2].contains(&key).unwrap());
    }

    #[test]
    fn test_tier_by_tier_promotion() {
        let (tiers, store) = memory_tiers(3);
        let k1 = Key::new("/1");
        let k2 = Key::new("/2");
        let k3 = Key::new("/3");
        tiers[0].put(&k1, "1".to_owned()).unwrap();
        tiers[1].put(&k2, "2".to_owned()).unwrap();
        tiers[2].put(&k3, "3".to_owned()).unwrap();

        // contains never promotes
        for key in [&k1, &k2, &k3] {
            assert!(store.contains(key).unwrap());
        }
        assert!(!tiers[0].contains(&k2).unwrap());
        assert!(!tiers[0].contains(&k3).unwrap());

        assert_eq!(store.get(&k1).unwrap(), "1");
        assert!(!tiers[1].contains(&k1).unwrap());

        assert_eq!(store.get(&k3).unwrap(), "3");
        for tier in &tiers {
            assert_eq!(tier.get(&k3).unwrap(), "3");
        }

        for key in [&k1, &k2, &k3] {
            store.delete(key).unwrap();
            assert!(!store.contains(key).unwrap());
        }
        for tier in &tiers {
            assert!(tier.is_empty().unwrap());
        }
    }

    #[test]
    fn test_put_writes_every_tier() {
        let (tiers, store) = memory_tiers(2);
        store.put(&Key::new("/k"), "v".to_owned()).unwrap();
        for tier in &tiers {
            assert_eq!(tier.get(&Key::new("/k")).unwrap(), "v");
        }
    }

    #[test]
    fn test_get_miss_everywhere() {
        let (_, store) = memory_tiers(3);
        assert!(store.get(&Key::new("/missing")).unwrap_err().is_not_found());
    }

    #[test]
    fn test_partial_put_is_not_rolled_back() {
        let near = Arc::new(MockStore::<i64>::new());
        let broken = Arc::new(MockStore::<i64>::new().failing(FailOn::Put));
        let far = Arc::new(MockStore::<i64>::new());
        let store = TieredStore::new(vec![
            Arc::clone(&near) as SharedStore<i64>,
            Arc::clone(&broken) as SharedStore<i64>,
            Arc::clone(&far) as SharedStore<i64>,
        ])
        .unwrap();

        let key = Key::new("/k");
        let err = store.put(&key, 1).unwrap_err();
        assert!(matches!(err, StoreError::Internal(_)));
        assert_eq!(near.get(&key).unwrap(), 1);
        assert_eq!(far.put_count(), 0);
    }

    #[test]
    fn test_get_propagates_tier_errors() {
        let broken = Arc::new(MockStore::<i64>::new().failing(FailOn::Get));
        let far = Arc::new(MockStore::<i64>::new());
        far.put(&Key::new("/k"), 1).unwrap();
        let store = TieredStore::new(vec![
            Arc::clone(&broken) as SharedStore<i64>,
            Arc::clone(&far) as SharedStore<i64>,
        ])
        .unwrap();

        assert!(matches!(store.get(&Key::new("/k")), Err(StoreError::Internal(_))));
        assert_eq!(far.get_count(), 1);
    }

    #[test]
    fn test_delete_attempts_every_tier() {
        let broken = Arc::new(MockStore::<i64>::new().failing(FailOn::Delete));
        let far = Arc::new(MockStore::<i64>::new());
        far.put(&Key::new("/k"), 1).unwrap();
        let store = TieredStore::new(vec![
            Arc::clone(&broken) as SharedStore<i64>,
            Arc::clone(&far) as SharedStore<i64>,
        ])
        .unwrap();

        assert!(store.delete(&Key::new("/k")).is_err());
        assert!(!far.contains(&Key::new("/k")).unwrap());
    }

    #[test]
    fn test_query_uses_first_tier_only() {
        let near: SharedStore<i64> = Arc::new(MemoryStore::<i64>::new());
        let far: SharedStore<i64> = Arc::new(MemoryStore::<i64>::new());
        far.put(&Key::new("/only-far"), 9).unwrap();
        near.put(&Key::new("/near"), 1).unwrap();
        let store = TieredStore::new(vec![near, far]).unwrap();

        let query = int_query();
        let values: Vec<i64> = store
            .query(&query)
            .unwrap()
            .collect::<QueryResult<_>>()
            .unwrap();
        assert_eq!(values, vec![1]);
    }

    #[test]
    fn test_tiered_conformance() {
        let tiers: Vec<SharedStore<i64>> = (0..3)
            .map(|_| Arc::new(MemoryStore::<i64>::new()) as SharedStore<i64>)
            .collect();
        let store = TieredStore::new(tiers).unwrap();
        exercise_store(&[&store], 100);
    }
}
