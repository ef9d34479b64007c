#![deny(unsafe_code)]
#![warn(missing_docs)]
#![deny(clippy::all)]
#![warn(unreachable_pub)]
#![deny(clippy::unwrap_used)]
#![cfg_attr(test, allow(clippy::unwrap_used))]
//! Configuration for datastore: logging settings and a declarative store
//! topology, read from TOML.
//!
//! # Usage
//!
//! ```rust
//! use datastore_config::{Config, StoreConfig};
//!
//! let config = Config::from_toml_str(
//!     r#"
//!     [store]
//!     kind = "namespace"
//!     prefix = "/app"
//!     inner = { kind = "memory" }
//!     "#,
//! )?;
//! assert_eq!(config.store.kind(), "namespace");
//! # Ok::<(), datastore_config::ConfigError>(())
//! ```
//!
//! # Environment
//!
//! `DATASTORE_LOG_LEVEL` and `DATASTORE_LOG_FORMAT` fill `logging.level` and
//! `logging.format` when [`Config::load_file`] reads a file that leaves them
//! unset. They never override a value the file sets.
//!
//! # Design
//!
//! This crate has **no dependencies on other internal datastore crates**.
//! Turning a [`StoreConfig`] into live stores happens in the `datastore`
//! facade crate.

/// Configuration error types.
pub mod error;
/// Configuration parsing and file loading.
pub mod loader;
/// Configuration struct definitions.
pub mod types;
/// Configuration validation rules.
pub mod validate;

// Re-export primary types at the crate root.
pub use error::{ConfigError, ConfigResult};
pub use types::*;

impl Config {
    /// Parse and validate a TOML string. No env fallbacks are applied.
    ///
    /// # Errors
    ///
    /// Returns a [`ConfigError`] if the TOML is malformed or fails
    /// validation.
    pub fn from_toml_str(content: &str) -> ConfigResult<Self> {
        loader::from_toml_str(content)
    }

    /// Load a config file, applying env var fallbacks.
    ///
    /// # Errors
    ///
    /// Returns a [`ConfigError`] if the file cannot be read, parsed, or fails
    /// validation.
    pub fn load_file(path: &std::path::Path) -> ConfigResult<Self> {
        loader::load_file(path)
    }

    /// Validate this config.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::ValidationError`] for the first invalid field.
    pub fn validate(&self) -> ConfigResult<()> {
        validate::validate(self)
    }
}
