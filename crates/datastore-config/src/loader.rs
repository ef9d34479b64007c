//! Config parsing and file loading.
//!
//! Loading runs in four steps:
//! 1. Read the file (size-capped) or take the given string
//! 2. Parse into a raw TOML tree
//! 3. Apply `DATASTORE_*` env var fallbacks for fields the TOML left unset
//! 4. Deserialize into [`Config`] and validate

use std::collections::HashMap;
use std::hash::BuildHasher;
use std::path::Path;

use tracing::debug;

use crate::error::{ConfigError, ConfigResult};
use crate::types::Config;
use crate::validate;

/// Maximum allowed config file size (1 MB).
const MAX_CONFIG_FILE_SIZE: u64 = 1_048_576;

/// Prefix shared by every recognized environment variable.
const ENV_PREFIX: &str = "DATASTORE_";

/// Maps an environment variable onto a `section.field` path.
struct EnvMapping {
    var_name: &'static str,
    section: &'static str,
    field: &'static str,
}

const ENV_MAPPINGS: &[EnvMapping] = &[
    EnvMapping {
        var_name: "DATASTORE_LOG_LEVEL",
        section: "logging",
        field: "level",
    },
    EnvMapping {
        var_name: "DATASTORE_LOG_FORMAT",
        section: "logging",
        field: "format",
    },
];

/// Snapshot the `DATASTORE_*` environment variables.
#[must_use]
pub fn collect_env_vars() -> HashMap<String, String> {
    std::env::vars()
        .filter(|(k, _)| k.starts_with(ENV_PREFIX))
        .collect()
}

/// Fill fields the TOML tree leaves unset from `env_vars`.
///
/// Returns how many fields were filled.
///
/// # Errors
///
/// Returns [`ConfigError::EnvError`] if a recognized variable is set but
/// empty.
pub fn apply_env_fallbacks<S: BuildHasher>(
    tree: &mut toml::Value,
    env_vars: &HashMap<String, String, S>,
) -> ConfigResult<usize> {
    let Some(root) = tree.as_table_mut() else {
        return Ok(0);
    };
    let mut count: usize = 0;

    for mapping in ENV_MAPPINGS {
        let Some(val) = env_vars.get(mapping.var_name) else {
            continue;
        };
        if val.trim().is_empty() {
            return Err(ConfigError::EnvError {
                var_name: mapping.var_name.to_owned(),
                message: "set but empty".to_owned(),
            });
        }

        let section = root
            .entry(mapping.section)
            .or_insert_with(|| toml::Value::Table(toml::map::Map::new()));
        // A non-table section is a type error the deserializer reports.
        let Some(section) = section.as_table_mut() else {
            continue;
        };
        if section.contains_key(mapping.field) {
            continue;
        }

        debug!(
            var = mapping.var_name,
            field = %format!("{}.{}", mapping.section, mapping.field),
            "applying env var fallback"
        );
        section.insert(
            mapping.field.to_owned(),
            toml::Value::String(val.trim().to_owned()),
        );
        count = count.saturating_add(1);
    }

    Ok(count)
}

/// Parse and validate `content`, with env fallbacks from `env_vars`.
///
/// `origin` names the source in error messages.
///
/// # Errors
///
/// Returns a [`ConfigError`] if the TOML is malformed, an env var is
/// unusable, or the result fails validation.
pub fn parse_with_env<S: BuildHasher>(
    content: &str,
    origin: &str,
    env_vars: &HashMap<String, String, S>,
) -> ConfigResult<Config> {
    let parse_err = |source| ConfigError::ParseError {
        path: origin.to_owned(),
        source,
    };

    let table: toml::Table = toml::from_str(content).map_err(parse_err)?;
    let mut tree = toml::Value::Table(table);
    let applied = apply_env_fallbacks(&mut tree, env_vars)?;
    if applied > 0 {
        debug!(origin, applied, "env var fallbacks applied");
    }

    let config: Config = tree.try_into().map_err(parse_err)?;
    validate::validate(&config)?;
    Ok(config)
}

/// Parse and validate a TOML string, without env fallbacks.
///
/// # Errors
///
/// Returns a [`ConfigError`] if the TOML is malformed or fails validation.
pub fn from_toml_str(content: &str) -> ConfigResult<Config> {
    parse_with_env(content, "<string>", &HashMap::new())
}

/// Load a config from a file, with env fallbacks from the process
/// environment.
///
/// # Errors
///
/// Returns a [`ConfigError`] if the file cannot be read, is larger than
/// 1 MB, cannot be parsed, or fails validation.
pub fn load_file(path: &Path) -> ConfigResult<Config> {
    let content = read_capped(path)?;
    let config = parse_with_env(&content, &path.display().to_string(), &collect_env_vars())?;
    debug!(path = %path.display(), kind = config.store.kind(), "loaded config file");
    Ok(config)
}

/// Read a file, refusing anything over [`MAX_CONFIG_FILE_SIZE`].
fn read_capped(path: &Path) -> ConfigResult<String> {
    // Check file size before reading to prevent OOM.
    let metadata = std::fs::metadata(path).map_err(|e| ConfigError::ReadError {
        path: path.display().to_string(),
        source: e,
    })?;
    check_size(path, metadata.len())?;

    let content = std::fs::read_to_string(path).map_err(|e| ConfigError::ReadError {
        path: path.display().to_string(),
        source: e,
    })?;

    // The file may have grown between stat and read.
    check_size(path, u64::try_from(content.len()).unwrap_or(u64::MAX))?;
    Ok(content)
}

fn check_size(path: &Path, len: u64) -> ConfigResult<()> {
    if len > MAX_CONFIG_FILE_SIZE {
        return Err(ConfigError::ValidationError {
            field: path.display().to_string(),
            message: format!(
                "config file is {len} bytes, exceeding the {MAX_CONFIG_FILE_SIZE} byte limit"
            ),
        });
    }
    Ok(())
}
