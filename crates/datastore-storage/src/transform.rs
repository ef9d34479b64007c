//! Key-rewriting decorators.
//!
//! [`KeyTransformStore`] rewrites every key argument through a function
//! before delegating to the wrapped store. [`NamespaceStore`] and
//! [`LowercaseKeyStore`] are the two fixed transforms built on it.
//!
//! Query results are never mapped back: a query runs in the inner store's
//! key space. A transform that is not injective makes distinct caller keys
//! alias the same stored value, last writer wins.

use std::fmt;
use std::sync::Arc;

use tracing::trace;

use datastore_core::{Cursor, Key, Query, Store, StoreResult};

/// A key rewrite, shared between clones of a decorator.
pub type KeyTransformFn = Arc<dyn Fn(&Key) -> Key + Send + Sync>;

/// Wraps a store and rewrites every key through a transform.
pub struct KeyTransformStore<S> {
    inner: S,
    transform: KeyTransformFn,
}

impl<S> KeyTransformStore<S> {
    /// Wrap `inner` with the identity transform.
    #[must_use]
    pub fn new(inner: S) -> Self {
        Self::with_transform(inner, Key::clone)
    }

    /// Wrap `inner` with `transform`.
    #[must_use]
    pub fn with_transform<F>(inner: S, transform: F) -> Self
    where
        F: Fn(&Key) -> Key + Send + Sync + 'static,
    {
        Self {
            inner,
            transform: Arc::new(transform),
        }
    }

    /// The wrapped store.
    #[must_use]
    pub fn inner(&self) -> &S {
        &self.inner
    }

    /// Unwrap into the inner store.
    #[must_use]
    pub fn into_inner(self) -> S {
        self.inner
    }

    /// The key `key` is stored under in the inner store.
    #[must_use]
    pub fn transform_key(&self, key: &Key) -> Key {
        (self.transform)(key)
    }
}

impl<S: fmt::Debug> fmt::Debug for KeyTransformStore<S> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("KeyTransformStore")
            .field("inner", &self.inner)
            .finish_non_exhaustive()
    }
}

impl<V, S: Store<V>> Store<V> for KeyTransformStore<S> {
    fn put(&self, key: &Key, value: V) -> StoreResult<()> {
        let key = self.transform_key(key);
        trace!(%key, "transformed put");
        self.inner.put(&key, value)
    }

    fn get(&self, key: &Key) -> StoreResult<V> {
        self.inner.get(&self.transform_key(key))
    }

    fn delete(&self, key: &Key) -> StoreResult<()> {
        self.inner.delete(&self.transform_key(key))
    }

    fn contains(&self, key: &Key) -> StoreResult<bool> {
        self.inner.contains(&self.transform_key(key))
    }

    fn query<'q>(&self, query: &'q Query<V>) -> StoreResult<Cursor<'q, V>> {
        self.inner.query(query)
    }
}

/// Case-folds every key before delegating.
///
/// `/Foo` and `/foo` name the same value.
pub struct LowercaseKeyStore<S>(KeyTransformStore<S>);

impl<S> LowercaseKeyStore<S> {
    /// Wrap `inner`.
    #[must_use]
    pub fn new(inner: S) -> Self {
        Self(KeyTransformStore::with_transform(inner, Key::to_lowercase))
    }

    /// The wrapped store.
    #[must_use]
    pub fn inner(&self) -> &S {
        self.0.inner()
    }
}

impl<S: fmt::Debug> fmt::Debug for LowercaseKeyStore<S> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_tuple("LowercaseKeyStore").field(self.inner()).finish()
    }
}

impl<V, S: Store<V>> Store<V> for LowercaseKeyStore<S> {
    fn put(&self, key: &Key, value: V) -> StoreResult<()> {
        self.0.put(key, value)
    }

    fn get(&self, key: &Key) -> StoreResult<V> {
        self.0.get(key)
    }

    fn delete(&self, key: &Key) -> StoreResult<()> {
        self.0.delete(key)
    }

    fn contains(&self, key: &Key) -> StoreResult<bool> {
        self.0.contains(key)
    }

    fn query<'q>(&self, query: &'q Query<V>) -> StoreResult<Cursor<'q, V>> {
        self.0.query(query)
    }
}

/// Nests every key under a fixed prefix.
///
/// `/a/b` under prefix `/ns` is stored as `/ns/a/b`. Several namespaces can
/// share one inner store without colliding.
pub struct NamespaceStore<S> {
    prefix: Key,
    store: KeyTransformStore<S>,
}

impl<S> NamespaceStore<S> {
    /// Wrap `inner`, nesting keys under `prefix`.
    #[must_use]
    pub fn new(prefix: Key, inner: S) -> Self {
        let nest_under = prefix.clone();
        Self {
            prefix,
            store: KeyTransformStore::with_transform(inner, move |key: &Key| {
                nest_under.child(key)
            }),
        }
    }

    /// The namespace prefix.
    #[must_use]
    pub fn prefix(&self) -> &Key {
        &self.prefix
    }

    /// The wrapped store.
    #[must_use]
    pub fn inner(&self) -> &S {
        self.store.inner()
    }

    /// The key `key` is stored under in the inner store.
    #[must_use]
    pub fn namespaced_key(&self, key: &Key) -> Key {
        self.store.transform_key(key)
    }
}

impl<S: fmt::Debug> fmt::Debug for NamespaceStore<S> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("NamespaceStore")
            .field("prefix", &self.prefix.to_string())
            .field("inner", self.inner())
            .finish()
    }
}

impl<V, S: Store<V>> Store<V> for NamespaceStore<S> {
    fn put(&self, key: &Key, value: V) -> StoreResult<()> {
        self.store.put(key, value)
    }

    fn get(&self, key: &Key) -> StoreResult<V> {
        self.store.get(key)
    }

    fn delete(&self, key: &Key) -> StoreResult<()> {
        self.store.delete(key)
    }

    fn contains(&self, key: &Key) -> StoreResult<bool> {
        self.store.contains(key)
    }

    fn query<'q>(&self, query: &'q Query<V>) -> StoreResult<Cursor<'q, V>> {
        self.store.query(query)
    }
}
