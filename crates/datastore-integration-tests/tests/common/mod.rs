//! Shared helpers for integration tests.

use std::sync::Arc;

use datastore_core::{SharedStore, Store};
use datastore_storage::MemoryStore;

/// `n` fresh memory stores, both as concrete handles (for inspecting what
/// landed where) and as shared trait objects (for wiring decorators).
#[allow(dead_code)]
pub fn memory_stores<V>(n: usize) -> (Vec<Arc<MemoryStore<V>>>, Vec<SharedStore<V>>)
where
    V: Clone + Send + Sync + 'static,
{
    let concrete: Vec<Arc<MemoryStore<V>>> =
        (0..n).map(|_| Arc::new(MemoryStore::new())).collect();
    let shared = concrete
        .iter()
        .map(|s| Arc::clone(s) as Arc<dyn Store<V>>)
        .collect();
    (concrete, shared)
}
