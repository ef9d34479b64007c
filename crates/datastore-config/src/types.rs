use serde::{Deserialize, Serialize};

/// Top-level configuration.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    /// Logging and tracing.
    pub logging: LoggingSection,
    /// Store topology.
    pub store: StoreConfig,
}

// ---------------------------------------------------------------------------
// LoggingSection
// ---------------------------------------------------------------------------

/// Logging and tracing configuration.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct LoggingSection {
    /// Global log level filter (`"trace"`, `"debug"`, `"info"`, `"warn"`,
    /// `"error"`).
    pub level: String,
    /// Output format: `"pretty"` (human-friendly), `"compact"` (one-line),
    /// `"json"` (structured), or `"full"` (verbose).
    pub format: String,
    /// Per-crate tracing directives (e.g. `["datastore_storage=debug"]`).
    pub directives: Vec<String>,
}

impl Default for LoggingSection {
    fn default() -> Self {
        Self {
            level: "info".to_owned(),
            format: "compact".to_owned(),
            directives: Vec::new(),
        }
    }
}

// ---------------------------------------------------------------------------
// StoreConfig
// ---------------------------------------------------------------------------

/// A node in the store topology, tagged by `kind`.
///
/// Decorators nest their inner stores, so a whole graph is one value:
///
/// ```toml
/// [store]
/// kind = "tiered"
///
/// [[store.tiers]]
/// kind = "memory"
///
/// [[store.tiers]]
/// kind = "namespace"
/// prefix = "/cache"
/// inner = { kind = "memory" }
/// ```
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "lowercase")]
pub enum StoreConfig {
    /// An in-memory leaf store.
    #[default]
    Memory,
    /// Case-folds keys before delegating to `inner`.
    Lowercase {
        /// The wrapped store.
        inner: Box<StoreConfig>,
    },
    /// Nests keys under `prefix` before delegating to `inner`.
    Namespace {
        /// Key prefix, e.g. `"/cache"`.
        prefix: String,
        /// The wrapped store.
        inner: Box<StoreConfig>,
    },
    /// Ordered cache tiers, nearest first.
    Tiered {
        /// The tiers.
        tiers: Vec<StoreConfig>,
    },
    /// Hash-routed shards.
    Sharded {
        /// The shards.
        shards: Vec<StoreConfig>,
    },
}

impl StoreConfig {
    /// The `kind` tag of this node.
    #[must_use]
    pub fn kind(&self) -> &'static str {
        match self {
            Self::Memory => "memory",
            Self::Lowercase { .. } => "lowercase",
            Self::Namespace { .. } => "namespace",
            Self::Tiered { .. } => "tiered",
            Self::Sharded { .. } => "sharded",
        }
    }

    /// Number of leaf stores in this subtree.
    #[must_use]
    pub fn leaf_count(&self) -> usize {
        match self {
            Self::Memory => 1,
            Self::Lowercase { inner } | Self::Namespace { inner, .. } => inner.leaf_count(),
            Self::Tiered { tiers: children } | Self::Sharded { shards: children } => children
                .iter()
                .map(Self::leaf_count)
                .fold(0, usize::saturating_add),
        }
    }
}
