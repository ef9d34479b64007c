//! The store capability.
//!
//! Every backend and every decorator implements [`Store`]. Decorators hold
//! their inner stores either by value (exclusive) or behind an [`Arc`]
//! (shared), and forward calls without knowing what they wrap.

use std::sync::Arc;

use crate::error::{StoreError, StoreResult};
use crate::key::Key;
use crate::query::{Cursor, Query};

/// Uniform key/value capability over values of type `V`.
///
/// All methods take `&self`; implementations that mutate state use interior
/// mutability. Nothing here is transactional: a call that touches several
/// inner stores can fail halfway.
pub trait Store<V>: Send + Sync {
    /// Store `value` under `key`, replacing any previous value.
    ///
    /// # Errors
    ///
    /// Returns a backend-specific error if the write fails.
    fn put(&self, key: &Key, value: V) -> StoreResult<()>;

    /// Fetch the value under `key`.
    ///
    /// # Errors
    ///
    /// Returns [`StoreError::NotFound`] if the key is absent.
    fn get(&self, key: &Key) -> StoreResult<V>;

    /// Remove `key`. Removing an absent key is not an error.
    ///
    /// # Errors
    ///
    /// Returns a backend-specific error if the delete fails.
    fn delete(&self, key: &Key) -> StoreResult<()>;

    /// Whether a value exists under `key`.
    ///
    /// # Errors
    ///
    /// Returns a backend-specific error if the lookup fails.
    fn contains(&self, key: &Key) -> StoreResult<bool>;

    /// Evaluate `query` over the stored values.
    ///
    /// # Errors
    ///
    /// The default implementation returns [`StoreError::NotImplemented`].
    fn query<'q>(&self, query: &'q Query<V>) -> StoreResult<Cursor<'q, V>> {
        let _ = query;
        Err(StoreError::NotImplemented(
            "query is not supported by this store".to_owned(),
        ))
    }
}

impl<V, S> Store<V> for Arc<S>
where
    S: Store<V> + ?Sized,
{
    fn put(&self, key: &Key, value: V) -> StoreResult<()> {
        (**self).put(key, value)
    }

    fn get(&self, key: &Key) -> StoreResult<V> {
        (**self).get(key)
    }

    fn delete(&self, key: &Key) -> StoreResult<()> {
        (**self).delete(key)
    }

    fn contains(&self, key: &Key) -> StoreResult<bool> {
        (**self).contains(key)
    }

    fn query<'q>(&self, query: &'q Query<V>) -> StoreResult<Cursor<'q, V>> {
        (**self).query(query)
    }
}

impl<V, S> Store<V> for Box<S>
where
    S: Store<V> + ?Sized,
{
    fn put(&self, key: &Key, value: V) -> StoreResult<()> {
        (**self).put(key, value)
    }

    fn get(&self, key: &Key) -> StoreResult<V> {
        (**self).get(key)
    }

    fn delete(&self, key: &Key) -> StoreResult<()> {
        (**self).delete(key)
    }

    fn contains(&self, key: &Key) -> StoreResult<bool> {
        (**self).contains(key)
    }

    fn query<'q>(&self, query: &'q Query<V>) -> StoreResult<Cursor<'q, V>> {
        (**self).query(query)
    }
}

/// A store shared between several owners.
pub type SharedStore<V> = Arc<dyn Store<V>>;
