//! Configuration validation rules.

use crate::error::{ConfigError, ConfigResult};
use crate::types::{Config, StoreConfig};

/// Validate a deserialized [`Config`].
///
/// # Errors
///
/// Returns [`ConfigError::ValidationError`] naming the first offending
/// field by its dotted path, e.g. `store.tiers[1].prefix`.
pub fn validate(config: &Config) -> ConfigResult<()> {
    validate_logging(config)?;
    validate_store(&config.store, "store")?;
    Ok(())
}

fn validate_logging(config: &Config) -> ConfigResult<()> {
    let valid_levels = ["trace", "debug", "info", "warn", "error"];
    if !valid_levels.contains(&config.logging.level.as_str()) {
        return Err(ConfigError::ValidationError {
            field: "logging.level".to_owned(),
            message: format!(
                "unsupported log level '{}'; expected one of: {}",
                config.logging.level,
                valid_levels.join(", ")
            ),
        });
    }

    let valid_formats = ["pretty", "compact", "json", "full"];
    if !valid_formats.contains(&config.logging.format.as_str()) {
        return Err(ConfigError::ValidationError {
            field: "logging.format".to_owned(),
            message: format!(
                "unsupported log format '{}'; expected one of: {}",
                config.logging.format,
                valid_formats.join(", ")
            ),
        });
    }

    for (i, directive) in config.logging.directives.iter().enumerate() {
        if directive.trim().is_empty() {
            return Err(ConfigError::ValidationError {
                field: format!("logging.directives[{i}]"),
                message: "directive must not be empty".to_owned(),
            });
        }
    }

    Ok(())
}

fn validate_store(store: &StoreConfig, path: &str) -> ConfigResult<()> {
    match store {
        StoreConfig::Memory => Ok(()),
        StoreConfig::Lowercase { inner } => validate_store(inner, &format!("{path}.inner")),
        StoreConfig::Namespace { prefix, inner } => {
            if prefix.split('/').all(str::is_empty) {
                return Err(ConfigError::ValidationError {
                    field: format!("{path}.prefix"),
                    message: format!("namespace prefix '{prefix}' names the root key"),
                });
            }
            validate_store(inner, &format!("{path}.inner"))
        },
        StoreConfig::Tiered { tiers } => validate_children(tiers, path, "tiers"),
        StoreConfig::Sharded { shards } => validate_children(shards, path, "shards"),
    }
}

fn validate_children(children: &[StoreConfig], path: &str, field: &str) -> ConfigResult<()> {
    if children.is_empty() {
        return Err(ConfigError::ValidationError {
            field: format!("{path}.{field}"),
            message: format!("at least one entry is required in '{field}'"),
        });
    }
    for (i, child) in children.iter().enumerate() {
        validate_store(child, &format!("{path}.{field}[{i}]"))?;
    }
    Ok(())
}
