//! Pattern-indexed storage of change handlers.

use crate::core::reloader::{ChangeHandler, Reloader, reloader_handler};
use crate::pattern;
use std::collections::HashMap;
use std::sync::Arc;

/// Append-only map from subscription pattern to its ordered handlers.
///
/// The registry itself is not synchronized; [`Manager`](crate::core::Manager)
/// guards it with a read/write lock.
#[derive(Default)]
pub(crate) struct SubscriptionRegistry {
    handlers: HashMap<String, Vec<ChangeHandler>>,
    reloaders: Vec<Arc<dyn Reloader>>,
}

impl SubscriptionRegistry {
    pub(crate) fn new() -> Self {
        Self::default()
    }

    /// Append `handler` to the list for `pattern`.
    pub(crate) fn add_handler(&mut self, pattern: impl Into<String>, handler: ChangeHandler) {
        self.handlers.entry(pattern.into()).or_default().push(handler);
    }

    /// Register one validate-then-apply handler per reloader pattern.
    ///
    /// Returns the patterns that were registered.
    pub(crate) fn add_reloader(&mut self, reloader: Arc<dyn Reloader>) -> Vec<String> {
        let patterns = reloader.patterns();
        for pattern in &patterns {
            self.add_handler(pattern.as_str(), reloader_handler(Arc::clone(&reloader)));
        }
        self.reloaders.push(reloader);
        patterns
    }

    /// Collect the handlers interested in `key`.
    ///
    /// Handlers registered under the exact key come first, in registration
    /// order, followed by the handlers of every other matching pattern.
    /// Order across distinct wildcard patterns is unspecified.
    pub(crate) fn matching(&self, key: &str) -> Vec<ChangeHandler> {
        let mut matched = Vec::new();

        if let Some(exact) = self.handlers.get(key) {
            matched.extend(exact.iter().cloned());
        }

        for (candidate, handlers) in &self.handlers {
            if candidate != key && pattern::matches(candidate, key) {
                matched.extend(handlers.iter().cloned());
            }
        }

        matched
    }

    pub(crate) fn patterns(&self) -> Vec<String> {
        self.handlers.keys().cloned().collect()
    }

    pub(crate) fn handler_count(&self, pattern: &str) -> usize {
        self.handlers.get(pattern).map_or(0, Vec::len)
    }

    pub(crate) fn total_handlers(&self) -> usize {
        self.handlers.values().map(Vec::len).sum()
    }

    pub(crate) fn reloader_count(&self) -> usize {
        self.reloaders.len()
    }
}
