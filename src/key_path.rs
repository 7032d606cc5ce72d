//! Dotted configuration key decomposition.

use crate::error::{ReloadError, Result};

/// Split a dotted key into its segments.
///
/// Splits strictly on `.`, so empty segments are preserved.
pub fn split_key(key: &str) -> Vec<&str> {
    key.split('.').collect()
}

/// Join segments back into a dotted key.
pub fn join_key(segments: &[&str]) -> String {
    segments.join(".")
}

/// A configuration key decomposed into a module name and a nested field path.
///
/// # Examples
///
/// ```rust
/// use hotswap_reload::key_path::KeyPath;
///
/// let path = KeyPath::parse("server.features.rate_limit.rate").unwrap();
/// assert_eq!(path.module(), "server");
/// assert_eq!(path.field_path(), "features.rate_limit.rate");
/// ```
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct KeyPath {
    module: String,
    field_path: String,
}

impl KeyPath {
    /// Decompose `key` into `(module, field_path)`.
    ///
    /// # Errors
    ///
    /// Returns [`ReloadError::InvalidKeyFormat`] when the key has fewer than
    /// two segments.
    pub fn parse(key: &str) -> Result<Self> {
        let segments = split_key(key);
        if segments.len() < 2 {
            return Err(ReloadError::InvalidKeyFormat(key.to_string()));
        }

        Ok(Self {
            module: segments[0].to_string(),
            field_path: join_key(&segments[1..]),
        })
    }

    /// The module name (first segment).
    pub fn module(&self) -> &str {
        &self.module
    }

    /// The nested field path (remaining segments, dotted).
    pub fn field_path(&self) -> &str {
        &self.field_path
    }

    /// Render the path as a JSON pointer, e.g. `/server/http/port`.
    ///
    /// `~` and `/` inside segments are escaped as `~0` and `~1`.
    pub fn json_pointer(&self) -> String {
        let mut pointer = String::new();
        for segment in std::iter::once(self.module.as_str()).chain(self.field_path.split('.')) {
            pointer.push('/');
            pointer.push_str(&segment.replace('~', "~0").replace('/', "~1"));
        }
        pointer
    }
}
