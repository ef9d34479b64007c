//! Datastore Telemetry - logging setup for datastore.
//!
//! The library crates only emit `tracing` events. This crate installs a
//! subscriber for them: an `EnvFilter` built from a level plus per-target
//! directives, feeding one formatting layer.
//!
//! # Example
//!
//! ```rust,no_run
//! use datastore_telemetry::{LogConfig, LogFormat, setup_logging};
//!
//! # fn main() -> Result<(), datastore_telemetry::TelemetryError> {
//! let config = LogConfig::new("info")
//!     .with_format(LogFormat::Compact)
//!     .with_directive("datastore_storage=debug");
//!
//! setup_logging(&config)?;
//! tracing::info!("logging ready");
//! # Ok(())
//! # }
//! ```
//!
//! With the `config` feature, [`LogConfig::from_section`] converts a
//! `datastore_config::LoggingSection`.

#![deny(unsafe_code)]
#![deny(missing_docs)]
#![deny(clippy::all)]
#![warn(unreachable_pub)]
#![deny(clippy::unwrap_used)]
#![cfg_attr(test, allow(clippy::unwrap_used))]

pub mod prelude;

mod error;
mod logging;

pub use error::{TelemetryError, TelemetryResult};
pub use logging::{LogConfig, LogFormat, LogTarget, setup_default_logging, setup_logging};
