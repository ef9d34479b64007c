//! Hierarchical keys.
//!
//! A [`Key`] is a `/`-separated path such as `/users/alice/profile`. It is
//! the only addressing unit stores understand. Keys are normalized on
//! construction: empty segments are dropped, so `"a//b/"` and `"/a/b"` are
//! the same key. The root key has no segments and renders as `/`.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

const SEPARATOR: char = '/';

/// An immutable hierarchical key.
#[derive(Debug, Clone, Default, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub struct Key {
    segments: Vec<String>,
}

impl Key {
    /// Parse and normalize a key from its path form.
    #[must_use]
    pub fn new(path: impl AsRef<str>) -> Self {
        Self {
            segments: split(path.as_ref()),
        }
    }

    /// The root key `/`.
    #[must_use]
    pub fn root() -> Self {
        Self::default()
    }

    /// Derive a child key.
    ///
    /// `name` is normalized like a path, so passing another key nests it
    /// whole: `Key::new("/a").child(Key::new("/b/c"))` is `/a/b/c`.
    #[must_use]
    pub fn child(&self, name: impl fmt::Display) -> Self {
        let mut segments = self.segments.clone();
        segments.extend(split(&name.to_string()));
        Self { segments }
    }

    /// The key with its path segments in reverse order.
    #[must_use]
    pub fn reverse(&self) -> Self {
        Self {
            segments: self.segments.iter().rev().cloned().collect(),
        }
    }

    /// The last path segment, or `""` for the root key.
    #[must_use]
    pub fn name(&self) -> &str {
        self.segments.last().map_or("", String::as_str)
    }

    /// The parent key, or `None` for the root key.
    #[must_use]
    pub fn parent(&self) -> Option<Self> {
        let (_, init) = self.segments.split_last()?;
        Some(Self {
            segments: init.to_vec(),
        })
    }

    /// The normalized path segments.
    #[must_use]
    pub fn segments(&self) -> &[String] {
        &self.segments
    }

    /// Whether this is the root key.
    #[must_use]
    pub fn is_root(&self) -> bool {
        self.segments.is_empty()
    }

    /// Whether `other` lies strictly below this key.
    #[must_use]
    pub fn is_ancestor_of(&self, other: &Self) -> bool {
        other.segments.len() > self.segments.len() && other.segments.starts_with(&self.segments)
    }

    /// The key with every segment lowercased.
    #[must_use]
    pub fn to_lowercase(&self) -> Self {
        Self {
            segments: self.segments.iter().map(|s| s.to_lowercase()).collect(),
        }
    }
}

fn split(path: &str) -> Vec<String> {
    path.split(SEPARATOR)
        .filter(|s| !s.is_empty())
        .map(String::from)
        .collect()
}

impl fmt::Display for Key {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.segments.is_empty() {
            return f.write_str("/");
        }
        for segment in &self.segments {
            write!(f, "{SEPARATOR}{segment}")?;
        }
        Ok(())
    }
}

impl FromStr for Key {
    type Err = std::convert::Infallible;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Ok(Self::new(s))
    }
}

impl From<&str> for Key {
    fn from(s: &str) -> Self {
        Self::new(s)
    }
}

impl From<String> for Key {
    fn from(s: String) -> Self {
        Self::new(s)
    }
}

impl From<Key> for String {
    fn from(key: Key) -> Self {
        key.to_string()
    }
}
