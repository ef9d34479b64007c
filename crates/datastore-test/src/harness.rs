//! Conformance harness shared by every store implementation.
//!
//! [`exercise_store`] drives one or more stores through the same sequence
//! of writes, reads, queries and deletes and asserts the store contract at
//! each step. Passing several stores checks that they do not share state.

use tracing::warn;

use datastore_core::{Cursor, Key, Query, QueryResult, Store, StoreError, StoreResult};

use crate::fixtures::{int_query, test_key_prefix};

/// Run the store contract against `stores` with `numelems` values each.
///
/// Every store must start empty. Queries run unscoped, so decorators that
/// move keys around in their inner key space are checked the same way as
/// leaf stores. Stores whose `query` returns [`StoreError::NotImplemented`] skip the
/// query checks.
///
/// # Panics
///
/// Panics on the first contract violation.
pub fn exercise_store(stores: &[&dyn Store<i64>], numelems: i64) {
    assert!(!stores.is_empty(), "exercise_store needs at least one store");
    let prefix = test_key_prefix();
    let keys: Vec<(Key, i64)> = (0..numelems).map(|v| (prefix.child(v), v)).collect();

    // Deleting absent keys is allowed and leaves them absent.
    for (key, _) in &keys {
        for store in stores {
            assert!(!store.contains(key).unwrap(), "{key} present before put");
            store.delete(key).unwrap();
            assert!(!store.contains(key).unwrap(), "{key} present after delete");
        }
    }

    for (key, value) in &keys {
        for store in stores {
            assert!(!store.contains(key).unwrap());
            store.put(key, *value).unwrap();
            assert!(store.contains(key).unwrap(), "{key} missing after put");
            assert_eq!(store.get(key).unwrap(), *value);
        }
    }

    for (key, value) in &keys {
        for store in stores {
            assert!(store.contains(key).unwrap());
            assert_eq!(store.get(key).unwrap(), *value);
        }
    }

    check_query_slices(stores, keys.len());

    for (key, value) in &keys {
        let bumped = value.saturating_add(1);
        for store in stores {
            store.put(key, bumped).unwrap();
            assert!(store.contains(key).unwrap());
            assert_eq!(store.get(key).unwrap(), bumped, "{key} not overwritten");
        }
    }

    for (key, _) in &keys {
        for store in stores {
            store.delete(key).unwrap();
            assert!(!store.contains(key).unwrap(), "{key} present after delete");
            assert!(store.get(key).unwrap_err().is_not_found());
        }
    }
}

/// Check offset and limit against the unpaginated query contents.
fn check_query_slices(stores: &[&dyn Store<i64>], n: usize) {
    let half = n / 2;
    let third = n / 3;
    let slices: [(usize, Option<usize>); 5] = [
        (0, None),
        (0, Some(n)),
        (0, Some(half)),
        (half, None),
        (third, Some(third)),
    ];

    for store in stores {
        let unpaged = int_query();
        let Some(contents) = collect(store.query(&unpaged)) else {
            continue;
        };
        assert_eq!(contents.len(), n, "query returned wrong count");

        for (offset, limit) in slices {
            let mut query: Query<i64> = unpaged.clone();
            query.set_offset(offset);
            if let Some(limit) = limit {
                query.set_limit(limit);
            }
            let end = limit.map_or(n, |l| offset.saturating_add(l).min(n));
            let expected = &contents[offset.min(n)..end];

            let Some(result) = collect(store.query(&query)) else {
                continue;
            };
            assert_eq!(
                result.len(),
                expected.len(),
                "offset={offset} limit={limit:?}"
            );
            for value in expected {
                assert!(result.contains(value), "{value} missing from slice");
            }
        }
    }
}

/// Drain a query result, or `None` if the store does not support queries.
fn collect(result: StoreResult<Cursor<'_, i64>>) -> Option<Vec<i64>> {
    match result {
        Ok(cursor) => Some(cursor.collect::<QueryResult<Vec<_>>>().unwrap()),
        Err(StoreError::NotImplemented(reason)) => {
            warn!(%reason, "store does not support queries, skipping query checks");
            None
        },
        Err(e) => panic!("query failed: {e}"),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::init_test_logging;
    use crate::mocks::{FailOn, MockStore};

    #[test]
    fn test_mock_store_conforms() {
        init_test_logging();
        let a: MockStore<i64> = MockStore::new();
        let b: MockStore<i64> = MockStore::new();
        exercise_store(&[&a, &b], 30);
    }

    #[test]
    fn test_not_implemented_query_is_skipped() {
        init_test_logging();
        assert!(collect(Err(StoreError::NotImplemented("sharded".into()))).is_none());
    }

    #[test]
    #[should_panic(expected = "query failed")]
    fn test_failing_query_panics() {
        init_test_logging();
        let store: MockStore<i64> = MockStore::new();
        store.set_failing(FailOn::Query, true);
        exercise_store(&[&store], 5);
    }

    #[test]
    #[should_panic(expected = "at least one store")]
    fn test_requires_a_store() {
        exercise_store(&[], 1);
    }
}
