//! Subscription pattern matching.
//!
//! A pattern is one of:
//! - an exact key (`server.http.port`),
//! - a prefix wildcard ending in `.*` (`server.features.*`), which matches the
//!   prefix and everything nested under it,
//! - a single-level wildcard with exactly one `*` (`server.*.rate`), where the
//!   `*` stands for one segment that contains no `.`.
//!
//! The prefix form compares plain string prefixes: `server.feat.*` also
//! matches `server.features.x`. Patterns with more than one `*` never match.

/// The shape of a subscription pattern.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PatternKind {
    /// The empty string, which matches nothing.
    Empty,
    /// No wildcard; matches only the identical key.
    Exact,
    /// Ends in `.*`; matches every key starting with the stripped prefix.
    Prefix,
    /// Exactly one `*` standing for a single dot-free segment.
    SingleLevel,
    /// More than one `*` outside the trailing `.*` form.
    Unsupported,
}

impl PatternKind {
    /// Classify a pattern.
    ///
    /// # Examples
    ///
    /// ```rust
    /// use hotswap_reload::pattern::PatternKind;
    ///
    /// assert_eq!(PatternKind::of("server.features.*"), PatternKind::Prefix);
    /// assert_eq!(PatternKind::of("server.*.rate"), PatternKind::SingleLevel);
    /// assert_eq!(PatternKind::of("a.*.c.*"), PatternKind::Prefix);
    /// assert_eq!(PatternKind::of("a.*.*.d"), PatternKind::Unsupported);
    /// ```
    pub fn of(pattern: &str) -> Self {
        if pattern.is_empty() {
            Self::Empty
        } else if strip_prefix_wildcard(pattern).is_some() {
            Self::Prefix
        } else {
            match pattern.matches('*').count() {
                0 => Self::Exact,
                1 => Self::SingleLevel,
                _ => Self::Unsupported,
            }
        }
    }
}

/// Check whether `pattern` matches the concrete configuration `key`.
///
/// # Examples
///
/// ```rust
/// use hotswap_reload::pattern::matches;
///
/// assert!(matches("server.features.*", "server.features.rate_limit.rate"));
/// assert!(matches("server.*.rate", "server.api.rate"));
/// assert!(!matches("server.*.rate", "server.api.v2.rate"));
/// assert!(!matches("", ""));
/// ```
pub fn matches(pattern: &str, key: &str) -> bool {
    if pattern.is_empty() {
        return false;
    }

    if pattern == key {
        return true;
    }

    if let Some(prefix) = strip_prefix_wildcard(pattern) {
        if key.starts_with(prefix) {
            return true;
        }
    }

    if pattern.contains('*') {
        let mut parts = pattern.split('*');
        if let (Some(prefix), Some(suffix), None) = (parts.next(), parts.next(), parts.next()) {
            return matches_single_level(prefix, suffix, key);
        }
    }

    false
}

/// Check whether `key` falls under an allowed structured-routing prefix.
///
/// A prefix admits a key when `prefix.*` matches it as a pattern or when the
/// key literally starts with the prefix.
pub fn matches_allowed_prefix(prefix: &str, key: &str) -> bool {
    matches(&format!("{prefix}.*"), key) || key.starts_with(prefix)
}

/// Strip a trailing `.*`, keeping at least one byte of prefix.
fn strip_prefix_wildcard(pattern: &str) -> Option<&str> {
    if pattern.len() > 2 {
        pattern.strip_suffix(".*")
    } else {
        None
    }
}

fn matches_single_level(prefix: &str, suffix: &str, key: &str) -> bool {
    if key.len() < prefix.len() + suffix.len() {
        return false;
    }
    match key
        .strip_prefix(prefix)
        .and_then(|rest| rest.strip_suffix(suffix))
    {
        Some(middle) => !middle.contains('.'),
        None => false,
    }
}
