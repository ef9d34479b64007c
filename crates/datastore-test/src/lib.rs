//! Datastore Test - Shared test utilities for datastore crates.
//!
//! This crate provides fixtures, a conformance harness and mock stores that
//! can be used across datastore crates as a dev-dependency.
//!
//! # Usage
//!
//! ```toml
//! [dev-dependencies]
//! datastore-test.workspace = true
//! ```
//!
//! ```rust,ignore
//! use datastore_test::exercise_store;
//!
//! #[test]
//! fn test_my_store_conforms() {
//!     let store = MyStore::new();
//!     exercise_store(&[&store], 100);
//! }
//! ```

#![deny(unsafe_code)]
#![warn(missing_docs)]
#![deny(clippy::all)]
#![warn(unreachable_pub)]

pub mod fixtures;
pub mod harness;
pub mod mocks;

pub use fixtures::*;
pub use harness::*;
pub use mocks::*;

/// Route `tracing` output to the test harness's captured writer.
///
/// Safe to call from every test; only the first call installs a subscriber.
/// Honors `RUST_LOG`.
pub fn init_test_logging() {
    let _ = tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .with_test_writer()
        .try_init();
}
