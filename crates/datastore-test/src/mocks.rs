//! Mock stores for exercising error paths.

use std::collections::HashMap;
use std::fmt;
use std::sync::Mutex;
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};

use datastore_core::{Cursor, Key, Query, Store, StoreError, StoreResult};

/// Which operation a [`MockStore`] should fail.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FailOn {
    /// `put`
    Put,
    /// `get` and `contains`
    Get,
    /// `delete`
    Delete,
    /// `query`
    Query,
}

/// A working in-memory store that can be told to fail and counts calls.
///
/// Injected failures surface as [`StoreError::Internal`] so they are never
/// mistaken for a miss.
pub struct MockStore<V> {
    data: Mutex<HashMap<Key, V>>,
    fail_put: AtomicBool,
    fail_get: AtomicBool,
    fail_delete: AtomicBool,
    fail_query: AtomicBool,
    puts: AtomicUsize,
    gets: AtomicUsize,
    deletes: AtomicUsize,
}

impl<V> MockStore<V> {
    /// Create an empty store that fails nothing.
    #[must_use]
    pub fn new() -> Self {
        Self {
            data: Mutex::new(HashMap::new()),
            fail_put: AtomicBool::new(false),
            fail_get: AtomicBool::new(false),
            fail_delete: AtomicBool::new(false),
            fail_query: AtomicBool::new(false),
            puts: AtomicUsize::new(0),
            gets: AtomicUsize::new(0),
            deletes: AtomicUsize::new(0),
        }
    }

    /// Make `op` fail from now on.
    #[must_use]
    pub fn failing(self, op: FailOn) -> Self {
        self.set_failing(op, true);
        self
    }

    /// Toggle failure injection for `op`.
    pub fn set_failing(&self, op: FailOn, fail: bool) {
        self.flag(op).store(fail, Ordering::SeqCst);
    }

    /// Number of `put` calls, failed ones included.
    #[must_use]
    pub fn put_count(&self) -> usize {
        self.puts.load(Ordering::SeqCst)
    }

    /// Number of `get` calls, failed ones included.
    #[must_use]
    pub fn get_count(&self) -> usize {
        self.gets.load(Ordering::SeqCst)
    }

    /// Number of `delete` calls, failed ones included.
    #[must_use]
    pub fn delete_count(&self) -> usize {
        self.deletes.load(Ordering::SeqCst)
    }

    fn flag(&self, op: FailOn) -> &AtomicBool {
        match op {
            FailOn::Put => &self.fail_put,
            FailOn::Get => &self.fail_get,
            FailOn::Delete => &self.fail_delete,
            FailOn::Query => &self.fail_query,
        }
    }

    fn check(&self, op: FailOn) -> StoreResult<()> {
        if self.flag(op).load(Ordering::SeqCst) {
            return Err(StoreError::Internal(format!("injected {op:?} failure")));
        }
        Ok(())
    }

    fn lock(&self) -> StoreResult<std::sync::MutexGuard<'_, HashMap<Key, V>>> {
        self.data
            .lock()
            .map_err(|e| StoreError::Internal(e.to_string()))
    }
}

impl<V> Default for MockStore<V> {
    fn default() -> Self {
        Self::new()
    }
}

impl<V> fmt::Debug for MockStore<V> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("MockStore")
            .field("puts", &self.put_count())
            .field("gets", &self.get_count())
            .field("deletes", &self.delete_count())
            .finish_non_exhaustive()
    }
}

impl<V: Clone + Send> Store<V> for MockStore<V> {
    fn put(&self, key: &Key, value: V) -> StoreResult<()> {
        self.puts.fetch_add(1, Ordering::SeqCst);
        self.check(FailOn::Put)?;
        self.lock()?.insert(key.clone(), value);
        Ok(())
    }

    fn get(&self, key: &Key) -> StoreResult<V> {
        self.gets.fetch_add(1, Ordering::SeqCst);
        self.check(FailOn::Get)?;
        self.lock()?
            .get(key)
            .cloned()
            .ok_or_else(|| StoreError::NotFound(key.to_string()))
    }

    fn delete(&self, key: &Key) -> StoreResult<()> {
        self.deletes.fetch_add(1, Ordering::SeqCst);
        self.check(FailOn::Delete)?;
        self.lock()?.remove(key);
        Ok(())
    }

    fn contains(&self, key: &Key) -> StoreResult<bool> {
        self.check(FailOn::Get)?;
        Ok(self.lock()?.contains_key(key))
    }

    fn query<'q>(&self, query: &'q Query<V>) -> StoreResult<Cursor<'q, V>> {
        self.check(FailOn::Query)?;
        let mut entries: Vec<(Key, V)> = self
            .lock()?
            .iter()
            .filter(|(key, _)| query.key().is_none_or(|scope| scope.is_ancestor_of(key)))
            .map(|(key, value)| (key.clone(), value.clone()))
            .collect();
        entries.sort_by(|a, b| a.0.cmp(&b.0));
        Ok(query.apply(entries.into_iter().map(|(_, value)| value)))
    }
}
