//! Builder for constructing Manager instances.

use crate::core::{DispatchSettings, FieldSetter, Manager};
use std::sync::Arc;

#[cfg(feature = "metrics")]
use crate::metrics::DispatchMetrics;

/// Builder for constructing a [`Manager`].
///
/// # Examples
///
/// ```rust
/// use hotswap_reload::prelude::*;
/// use hotswap_reload::error::BoxError;
///
/// let manager = Manager::builder()
///     .with_allowed_prefixes(["server.features."])
///     .with_field_setter(|module: &str, path: &str, value: &str| -> Result<(), BoxError> {
///         println!("{module}/{path} = {value}");
///         Ok(())
///     })
///     .build();
///
/// assert_eq!(manager.allowed_prefixes(), Some(vec!["server.features.".to_string()]));
/// ```
pub struct ManagerBuilder {
    settings: DispatchSettings,
    setter: Option<Arc<dyn FieldSetter>>,
    #[cfg(feature = "metrics")]
    metrics: Option<DispatchMetrics>,
}

impl ManagerBuilder {
    /// Create a new builder with default settings.
    pub fn new() -> Self {
        Self {
            settings: DispatchSettings::default(),
            setter: None,
            #[cfg(feature = "metrics")]
            metrics: None,
        }
    }

    /// Use previously loaded settings.
    ///
    /// Replaces any prefixes set with [`with_allowed_prefixes`](Self::with_allowed_prefixes).
    pub fn with_settings(mut self, settings: DispatchSettings) -> Self {
        self.settings = settings;
        self
    }

    /// Set the key prefixes routed to the field setter.
    pub fn with_allowed_prefixes<I, P>(mut self, prefixes: I) -> Self
    where
        I: IntoIterator<Item = P>,
        P: Into<String>,
    {
        self.settings.allowed_prefixes = prefixes.into_iter().map(Into::into).collect();
        self
    }

    /// Bind a field setter when the manager is built.
    ///
    /// Without allowed prefixes the setter is bound but never receives keys.
    pub fn with_field_setter<S: FieldSetter + 'static>(mut self, setter: S) -> Self {
        self.setter = Some(Arc::new(setter));
        self
    }

    /// Record dispatch metrics with the provided meter.
    #[cfg(feature = "metrics")]
    pub fn with_metrics(mut self, meter: opentelemetry::metrics::Meter) -> Self {
        self.metrics = Some(DispatchMetrics::new(meter));
        self
    }

    /// Build the manager.
    pub fn build(self) -> Manager {
        #[cfg(feature = "metrics")]
        let manager = Manager::with_parts(self.settings.suppress_unchanged, self.metrics);

        #[cfg(not(feature = "metrics"))]
        let manager = Manager::with_parts(self.settings.suppress_unchanged);

        if let Some(setter) = self.setter {
            manager.bind(setter, self.settings.allowed_prefixes);
        }

        manager
    }
}

impl Default for ManagerBuilder {
    fn default() -> Self {
        Self::new()
    }
}
