//! Structured field routing.
//!
//! When a [`FieldSetter`] is bound together with a list of allowed prefixes,
//! any key under one of those prefixes is decomposed into `module.field_path`
//! and written straight into the live target.

use crate::core::reloader::{ChangeHandler, FieldSetter};
use crate::error::{ReloadError, Result};
use crate::key_path::KeyPath;
use crate::pattern;
use std::sync::Arc;
use tracing::{debug, info};

#[cfg(feature = "metrics")]
use crate::metrics::DispatchMetrics;

/// A field setter together with the key prefixes it is allowed to receive.
///
/// A manager holds at most one binding; rebinding replaces the setter and
/// prefixes together.
pub(crate) struct FieldBinding {
    setter: Arc<dyn FieldSetter>,
    allowed_prefixes: Vec<String>,
    suppress_unchanged: bool,
    #[cfg(feature = "metrics")]
    pub(crate) metrics: Option<DispatchMetrics>,
}

impl FieldBinding {
    pub(crate) fn new(
        setter: Arc<dyn FieldSetter>,
        allowed_prefixes: Vec<String>,
        suppress_unchanged: bool,
    ) -> Self {
        Self {
            setter,
            allowed_prefixes,
            suppress_unchanged,
            #[cfg(feature = "metrics")]
            metrics: None,
        }
    }

    pub(crate) fn allowed_prefixes(&self) -> &[String] {
        &self.allowed_prefixes
    }

    /// Whether `key` should be routed to the setter.
    ///
    /// Always false for a binding without prefixes.
    pub(crate) fn admits(&self, key: &str) -> bool {
        self.allowed_prefixes
            .iter()
            .any(|prefix| pattern::matches_allowed_prefix(prefix, key))
    }

    /// Decompose `key` and forward `new_value` to the setter.
    pub(crate) fn apply(&self, key: &str, old_value: &str, new_value: &str) -> Result<bool> {
        if self.suppress_unchanged && old_value == new_value {
            debug!(key, "Skipping unchanged structured config value");
            return Ok(false);
        }

        let path = KeyPath::parse(key)?;

        self.setter
            .set_field(path.module(), path.field_path(), new_value)
            .map_err(|source| ReloadError::FieldApply {
                module: path.module().to_string(),
                field_path: path.field_path().to_string(),
                source,
            })?;

        info!(
            key,
            module = path.module(),
            field_path = path.field_path(),
            old_value,
            new_value,
            "System config updated via hot-reload"
        );

        Ok(true)
    }

    /// Wrap this binding as the handler appended after all pattern matches.
    pub(crate) fn handler(self: Arc<Self>) -> ChangeHandler {
        Arc::new(move |key: &str, old_value: &str, new_value: &str| -> Result<()> {
            let applied = self.apply(key, old_value, new_value)?;

            #[cfg(feature = "metrics")]
            if let (true, Some(metrics)) = (applied, &self.metrics) {
                metrics.record_field_update();
            }

            #[cfg(not(feature = "metrics"))]
            let _ = applied;

            Ok(())
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::BoxError;
    use parking_lot::Mutex;

    type Calls = Arc<Mutex<Vec<(String, String, String)>>>;

    fn recording_setter(calls: &Calls) -> Arc<dyn FieldSetter> {
        let calls = Arc::clone(calls);
        Arc::new(
            move |module: &str, field_path: &str, value: &str| -> std::result::Result<(), BoxError> {
                calls
                    .lock()
                    .push((module.to_string(), field_path.to_string(), value.to_string()));
                Ok(())
            },
        )
    }

    fn binding(calls: &Calls, prefixes: &[&str]) -> FieldBinding {
        FieldBinding::new(
            recording_setter(calls),
            prefixes.iter().map(|p| p.to_string()).collect(),
            true,
        )
    }

    #[test]
    fn test_admits_keys_under_allowed_prefix() {
        let calls = Calls::default();
        let binding = binding(&calls, &["server.features.", "gateway"]);
        assert!(binding.admits("server.features.rate_limit.rate"));
        assert!(binding.admits("gateway.timeout"));
        assert!(!binding.admits("database.url"));
    }

    #[test]
    fn test_empty_prefix_list_admits_nothing() {
        let calls = Calls::default();
        let binding = binding(&calls, &[]);
        assert!(!binding.admits("server.port"));
    }

    #[test]
    fn test_apply_decomposes_key() {
        let calls = Calls::default();
        let binding = binding(&calls, &["server.features."]);

        assert!(binding.apply("server.features.rate_limit.rate", "100", "200").unwrap());
        assert_eq!(
            *calls.lock(),
            vec![(
                "server".to_string(),
                "features.rate_limit.rate".to_string(),
                "200".to_string()
            )]
        );
    }

    #[test]
    fn test_unchanged_value_is_suppressed() {
        let calls = Calls::default();
        let binding = binding(&calls, &["server"]);

        assert!(!binding.apply("server.port", "8080", "8080").unwrap());
        assert!(calls.lock().is_empty());
    }

    #[test]
    fn test_unchanged_value_forwarded_when_suppression_disabled() {
        let calls = Calls::default();
        let binding = FieldBinding::new(recording_setter(&calls), vec!["server".to_string()], false);

        assert!(binding.apply("server.port", "8080", "8080").unwrap());
        assert_eq!(calls.lock().len(), 1);
    }

    #[test]
    fn test_single_segment_key_is_rejected() {
        let calls = Calls::default();
        let binding = binding(&calls, &["server"]);

        let err = binding.apply("server", "a", "b").unwrap_err();
        assert!(matches!(err, ReloadError::InvalidKeyFormat(_)));
        assert!(calls.lock().is_empty());
    }

    #[test]
    fn test_setter_failure_carries_context() {
        let setter: Arc<dyn FieldSetter> = Arc::new(
            |_: &str, _: &str, _: &str| -> std::result::Result<(), BoxError> {
                Err("unknown field".into())
            },
        );
        let binding = FieldBinding::new(setter, vec!["server.".to_string()], true);

        let err = binding.apply("server.http.port", "80", "81").unwrap_err();
        match err {
            ReloadError::FieldApply {
                module, field_path, ..
            } => {
                assert_eq!(module, "server");
                assert_eq!(field_path, "http.port");
            }
            other => panic!("unexpected error: {other}"),
        }
    }
}
