//! Facade error type.

use thiserror::Error;

use datastore_config::ConfigError;
use datastore_core::StoreError;
use datastore_telemetry::TelemetryError;

/// Errors from assembling a store graph or logging from config.
#[derive(Debug, Error)]
pub enum DatastoreError {
    /// Reading or validating the config failed.
    #[error(transparent)]
    Config(#[from] ConfigError),

    /// Building a store failed.
    #[error(transparent)]
    Store(#[from] StoreError),

    /// Installing the log subscriber failed.
    #[error(transparent)]
    Telemetry(#[from] TelemetryError),
}

/// Result type for facade operations.
pub type DatastoreResult<T> = Result<T, DatastoreError>;
