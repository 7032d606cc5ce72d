//! The change dispatcher.

use crate::core::builder::ManagerBuilder;
use crate::core::registry::SubscriptionRegistry;
use crate::core::reloader::{ChangeHandler, FieldSetter, Reloader};
use crate::core::router::FieldBinding;
use crate::error::{ReloadError, Result};
use crate::pattern::PatternKind;
use parking_lot::RwLock;
use std::sync::{Arc, Weak};
use tracing::{debug, error, info};

#[cfg(feature = "metrics")]
use crate::metrics::DispatchMetrics;

/// Registry and field binding, guarded together by one lock.
struct ManagerState {
    registry: SubscriptionRegistry,
    binding: Option<Arc<FieldBinding>>,
}

struct Shared {
    state: RwLock<ManagerState>,
    suppress_unchanged: bool,
    #[cfg(feature = "metrics")]
    metrics: Option<DispatchMetrics>,
}

/// Routes configuration change notifications to registered subscribers.
///
/// A configuration source calls [`handle_change`](Self::handle_change) once
/// per detected change. The manager invokes, in order:
///
/// 1. handlers registered under the exact key, in registration order,
/// 2. handlers of every wildcard pattern matching the key,
/// 3. the structured field setter, if one is bound and the key falls under
///    an allowed prefix.
///
/// Dispatch stops at the first failing handler and returns its error. Effects
/// of handlers that already ran are not rolled back, so a failed change may
/// be partially applied.
///
/// Handlers run on the caller's thread with no lock held; a handler may
/// register further subscriptions on the same manager.
///
/// Cloning a `Manager` is cheap and yields a handle to the same dispatcher.
///
/// # Examples
///
/// ```rust
/// use hotswap_reload::prelude::*;
///
/// # fn example() -> hotswap_reload::error::Result<()> {
/// let manager = Manager::new();
///
/// manager.register_handler("server.features.*", |key, old, new| {
///     println!("{key}: {old} -> {new}");
///     Ok(())
/// })?;
///
/// manager.handle_change("server.features.rate_limit.rate", "100", "200")?;
/// # Ok(())
/// # }
/// # example().unwrap();
/// ```
#[derive(Clone)]
pub struct Manager {
    inner: Arc<Shared>,
}

impl Manager {
    /// Create an empty dispatcher with default settings.
    pub fn new() -> Self {
        ManagerBuilder::new().build()
    }

    /// Create a builder for a dispatcher with custom settings.
    pub fn builder() -> ManagerBuilder {
        ManagerBuilder::new()
    }

    pub(crate) fn with_parts(
        suppress_unchanged: bool,
        #[cfg(feature = "metrics")] metrics: Option<DispatchMetrics>,
    ) -> Self {
        Self {
            inner: Arc::new(Shared {
                state: RwLock::new(ManagerState {
                    registry: SubscriptionRegistry::new(),
                    binding: None,
                }),
                suppress_unchanged,
                #[cfg(feature = "metrics")]
                metrics,
            }),
        }
    }

    /// Create a weak handle that does not keep the dispatcher alive.
    ///
    /// Handlers that need to register further subscriptions should capture a
    /// `ManagerRef` rather than a `Manager`.
    pub fn downgrade(&self) -> ManagerRef {
        ManagerRef {
            inner: Arc::downgrade(&self.inner),
        }
    }

    /// Subscribe a validating component.
    ///
    /// For every pattern returned by [`Reloader::patterns`], a handler is
    /// appended that calls `validate` and, only if it succeeds, `on_change`.
    ///
    /// # Errors
    ///
    /// Never fails on a live manager; see [`ManagerRef::register_reloader`].
    pub fn register_reloader(&self, reloader: Arc<dyn Reloader>) -> Result<()> {
        let patterns = self.inner.state.write().registry.add_reloader(reloader);

        info!(
            pattern_count = patterns.len(),
            patterns = ?patterns,
            "Config reloader registered"
        );

        Ok(())
    }

    /// Subscribe a raw handler to `pattern`.
    ///
    /// Handlers registered later for the same pattern run later.
    ///
    /// # Errors
    ///
    /// Never fails on a live manager; see [`ManagerRef::register_handler`].
    pub fn register_handler<F>(&self, pattern: impl Into<String>, handler: F) -> Result<()>
    where
        F: Fn(&str, &str, &str) -> Result<()> + Send + Sync + 'static,
    {
        self.register_shared_handler(pattern, Arc::new(handler))
    }

    /// Subscribe an already shared handler to `pattern`.
    pub fn register_shared_handler(
        &self,
        pattern: impl Into<String>,
        handler: ChangeHandler,
    ) -> Result<()> {
        let pattern = pattern.into();
        debug!(
            pattern = %pattern,
            kind = ?PatternKind::of(&pattern),
            "Config change handler registered"
        );

        self.inner.state.write().registry.add_handler(pattern, handler);
        Ok(())
    }

    /// Bind or replace the structured field setter.
    ///
    /// Keys under any of `allowed_prefixes` are decomposed into
    /// `module.field_path` and forwarded to `setter` after all pattern
    /// handlers. The setter and prefixes are replaced together. An empty
    /// prefix list disables routing.
    pub fn set_field_setter<S, I, P>(&self, setter: S, allowed_prefixes: I)
    where
        S: FieldSetter + 'static,
        I: IntoIterator<Item = P>,
        P: Into<String>,
    {
        self.bind(Arc::new(setter), allowed_prefixes.into_iter().map(Into::into).collect());
    }

    pub(crate) fn bind(&self, setter: Arc<dyn FieldSetter>, allowed_prefixes: Vec<String>) {
        debug!(allowed_prefixes = ?allowed_prefixes, "Field setter bound");

        #[allow(unused_mut)]
        let mut binding = FieldBinding::new(setter, allowed_prefixes, self.inner.suppress_unchanged);

        #[cfg(feature = "metrics")]
        {
            binding.metrics = self.inner.metrics.clone();
        }

        self.inner.state.write().binding = Some(Arc::new(binding));
    }

    /// Dispatch one configuration change.
    ///
    /// A change with no interested subscribers succeeds.
    ///
    /// # Errors
    ///
    /// Returns the first error raised by a handler, in execution order.
    /// Handlers after the failing one are not invoked.
    pub fn handle_change(&self, key: &str, old_value: &str, new_value: &str) -> Result<()> {
        #[cfg(feature = "metrics")]
        let timer = self.inner.metrics.as_ref().map(DispatchMetrics::start_dispatch);

        let result = self.dispatch(key, old_value, new_value);

        #[cfg(feature = "metrics")]
        if let (Some(metrics), Some(timer)) = (&self.inner.metrics, timer) {
            match &result {
                Ok(()) => metrics.record_dispatch_success(timer),
                Err(err) => metrics.record_dispatch_failure(timer, err),
            }
        }

        result
    }

    fn dispatch(&self, key: &str, old_value: &str, new_value: &str) -> Result<()> {
        for handler in self.matched_handlers(key) {
            if let Err(err) = handler(key, old_value, new_value) {
                error!(
                    key,
                    old_value,
                    new_value,
                    error = %err,
                    "Failed to handle config change"
                );
                return Err(err);
            }
        }

        Ok(())
    }

    /// Snapshot the handlers for `key`; the lock is released on return.
    fn matched_handlers(&self, key: &str) -> Vec<ChangeHandler> {
        let (mut handlers, binding) = {
            let state = self.inner.state.read();
            (state.registry.matching(key), state.binding.clone())
        };

        if let Some(binding) = binding.filter(|binding| binding.admits(key)) {
            handlers.push(binding.handler());
        }

        handlers
    }

    /// Patterns that currently have at least one handler.
    pub fn patterns(&self) -> Vec<String> {
        self.inner.state.read().registry.patterns()
    }

    /// Number of handlers registered under exactly `pattern`.
    pub fn handler_count(&self, pattern: &str) -> usize {
        self.inner.state.read().registry.handler_count(pattern)
    }

    /// Total number of handlers across all patterns.
    pub fn total_handlers(&self) -> usize {
        self.inner.state.read().registry.total_handlers()
    }

    /// Number of registered reloaders.
    pub fn reloader_count(&self) -> usize {
        self.inner.state.read().registry.reloader_count()
    }

    /// Prefixes routed to the field setter, or `None` if no setter is bound.
    pub fn allowed_prefixes(&self) -> Option<Vec<String>> {
        self.inner
            .state
            .read()
            .binding
            .as_ref()
            .map(|binding| binding.allowed_prefixes().to_vec())
    }
}

impl Default for Manager {
    fn default() -> Self {
        Self::new()
    }
}

/// A weak handle to a [`Manager`].
///
/// Once every `Manager` clone is dropped the handle refers to an absent
/// dispatcher: registrations fail with [`ReloadError::InvalidArgument`],
/// rebinding the field setter does nothing, and dispatch fails with
/// [`ReloadError::InvalidState`].
#[derive(Clone)]
pub struct ManagerRef {
    inner: Weak<Shared>,
}

impl ManagerRef {
    /// Upgrade to a strong handle if the dispatcher is still alive.
    pub fn upgrade(&self) -> Option<Manager> {
        self.inner.upgrade().map(|inner| Manager { inner })
    }

    /// See [`Manager::register_reloader`].
    ///
    /// # Errors
    ///
    /// Returns [`ReloadError::InvalidArgument`] if the manager is gone.
    pub fn register_reloader(&self, reloader: Arc<dyn Reloader>) -> Result<()> {
        self.upgrade()
            .ok_or_else(|| ReloadError::InvalidArgument("manager or reloader is absent".to_string()))?
            .register_reloader(reloader)
    }

    /// See [`Manager::register_handler`].
    ///
    /// # Errors
    ///
    /// Returns [`ReloadError::InvalidArgument`] if the manager is gone.
    pub fn register_handler<F>(&self, pattern: impl Into<String>, handler: F) -> Result<()>
    where
        F: Fn(&str, &str, &str) -> Result<()> + Send + Sync + 'static,
    {
        self.upgrade()
            .ok_or_else(|| ReloadError::InvalidArgument("manager or handler is absent".to_string()))?
            .register_handler(pattern, handler)
    }

    /// See [`Manager::set_field_setter`]. Does nothing if the manager is gone.
    pub fn set_field_setter<S, I, P>(&self, setter: S, allowed_prefixes: I)
    where
        S: FieldSetter + 'static,
        I: IntoIterator<Item = P>,
        P: Into<String>,
    {
        if let Some(manager) = self.upgrade() {
            manager.set_field_setter(setter, allowed_prefixes);
        }
    }

    /// See [`Manager::handle_change`].
    ///
    /// # Errors
    ///
    /// Returns [`ReloadError::InvalidState`] if the manager is gone, otherwise
    /// the first handler error.
    pub fn handle_change(&self, key: &str, old_value: &str, new_value: &str) -> Result<()> {
        self.upgrade()
            .ok_or_else(|| ReloadError::InvalidState("manager is absent".to_string()))?
            .handle_change(key, old_value, new_value)
    }
}
