//! Live configuration targets updated one field at a time.
//!
//! [`LiveConfig`] holds a serde struct behind `arc-swap` and implements
//! [`FieldSetter`], so it can be bound to a [`Manager`](crate::core::Manager)
//! as the destination of structured field routing.

use crate::core::FieldSetter;
use crate::error::{BoxError, ReloadError, Result, ValidationError};
use crate::key_path::KeyPath;
use arc_swap::ArcSwap;
use parking_lot::Mutex;
use serde::{Serialize, de::DeserializeOwned};
use serde_json::Value;
use std::sync::Arc;

#[cfg(feature = "validation")]
use crate::core::Validate;

/// Type alias for validator functions.
type Validator<T> = Arc<dyn Fn(&T) -> std::result::Result<(), ValidationError> + Send + Sync>;

/// A lock-free configuration handle whose fields can be set by dotted path.
///
/// Reads never block. Field updates serialize the current value to JSON,
/// apply a JSON Patch `replace`, deserialize, validate, then atomically swap
/// the new value in. Readers never observe a partially applied update.
///
/// # Examples
///
/// ```rust
/// use hotswap_reload::prelude::*;
/// use serde::{Deserialize, Serialize};
///
/// #[derive(Debug, Clone, Serialize, Deserialize)]
/// struct AppConfig {
///     server: ServerConfig,
/// }
///
/// #[derive(Debug, Clone, Serialize, Deserialize)]
/// struct ServerConfig {
///     port: u16,
/// }
///
/// let live = LiveConfig::new(AppConfig { server: ServerConfig { port: 8080 } });
///
/// let manager = Manager::new();
/// manager.set_field_setter(live.clone(), ["server."]);
///
/// manager.handle_change("server.port", "8080", "9090").unwrap();
/// assert_eq!(live.get().server.port, 9090);
/// ```
pub struct LiveConfig<T> {
    current: Arc<ArcSwap<T>>,
    validator: Option<Validator<T>>,
    write_lock: Arc<Mutex<()>>,
}

impl<T> LiveConfig<T> {
    /// Create a live target with an initial value and no validation.
    pub fn new(initial: T) -> Self {
        Self {
            current: Arc::new(ArcSwap::new(Arc::new(initial))),
            validator: None,
            write_lock: Arc::new(Mutex::new(())),
        }
    }

    /// Create a live target that validates every update with [`Validate`].
    #[cfg(feature = "validation")]
    pub fn validated(initial: T) -> Self
    where
        T: Validate + Send + Sync + 'static,
    {
        Self::new(initial).with_validation(T::validate)
    }

    /// Reject updates for which `validator` fails.
    pub fn with_validation<F>(mut self, validator: F) -> Self
    where
        F: Fn(&T) -> std::result::Result<(), ValidationError> + Send + Sync + 'static,
    {
        self.validator = Some(Arc::new(validator));
        self
    }

    /// Get a reference-counted handle to the current value.
    pub fn get(&self) -> Arc<T> {
        self.current.load_full()
    }

    /// Replace the whole value, subject to validation.
    ///
    /// `source` names where the value came from (a file path, a remote key)
    /// and is reported as the key of a validation failure.
    ///
    /// # Errors
    ///
    /// Returns [`ReloadError::Validation`] if the validator rejects the value;
    /// the previous value is kept.
    pub fn store(&self, source: &str, new_value: T) -> Result<()> {
        let _guard = self.write_lock.lock();
        self.validate_and_swap(new_value, source)
    }

    fn validate_and_swap(&self, new_value: T, key: &str) -> Result<()> {
        if let Some(validator) = &self.validator {
            validator(&new_value).map_err(|source| ReloadError::Validation {
                key: key.to_string(),
                source,
            })?;
        }

        self.current.store(Arc::new(new_value));
        Ok(())
    }
}

impl<T> LiveConfig<T>
where
    T: Serialize + DeserializeOwned,
{
    /// Set `module.field_path` to the string-encoded `raw_value`.
    ///
    /// A field currently holding a string receives `raw_value` verbatim.
    /// Any other field reads it as JSON first (`8080`, `true`, `["a"]`) and
    /// falls back to a plain string when that does not fit.
    ///
    /// # Errors
    ///
    /// Returns an error if:
    /// - The path does not exist in the current value
    /// - The value does not fit the field's type
    /// - Validation fails
    pub fn set_field(&self, module: &str, field_path: &str, raw_value: &str) -> Result<()> {
        let key = format!("{module}.{field_path}");
        let path = KeyPath::parse(&key)?;
        let pointer = path.json_pointer();

        let _guard = self.write_lock.lock();

        let current = serde_json::to_value(&*self.get())
            .map_err(|e| ReloadError::Patch(format!("Failed to serialize config: {}", e)))?;

        let mut last_error = None;
        for candidate in candidate_values(current.pointer(&pointer), raw_value) {
            match patched(&current, &pointer, candidate) {
                Ok(new_value) => return self.validate_and_swap(new_value, &key),
                Err(err @ ReloadError::Patch(_)) => return Err(err),
                Err(err) => last_error = Some(err),
            }
        }

        Err(last_error.unwrap_or_else(|| {
            ReloadError::Deserialization(format!("No usable value for {key}"))
        }))
    }
}

impl<T> Clone for LiveConfig<T> {
    fn clone(&self) -> Self {
        Self {
            current: Arc::clone(&self.current),
            validator: self.validator.clone(),
            write_lock: Arc::clone(&self.write_lock),
        }
    }
}

impl<T> FieldSetter for LiveConfig<T>
where
    T: Serialize + DeserializeOwned + Send + Sync + 'static,
{
    fn set_field(
        &self,
        module: &str,
        field_path: &str,
        value: &str,
    ) -> std::result::Result<(), BoxError> {
        LiveConfig::set_field(self, module, field_path, value).map_err(Into::into)
    }
}

/// JSON readings of a raw value for the field at `existing`, most specific first.
fn candidate_values(existing: Option<&Value>, raw: &str) -> Vec<Value> {
    if let Some(Value::String(_)) = existing {
        return vec![Value::String(raw.to_string())];
    }

    match serde_json::from_str::<Value>(raw) {
        Ok(Value::String(s)) => vec![Value::String(s)],
        Ok(parsed) => vec![parsed, Value::String(raw.to_string())],
        Err(_) => vec![Value::String(raw.to_string())],
    }
}

fn patched<T: DeserializeOwned>(current: &Value, pointer: &str, value: Value) -> Result<T> {
    let mut doc = current.clone();

    let patch: json_patch::Patch = serde_json::from_value(serde_json::json!([
        { "op": "replace", "path": pointer, "value": value }
    ]))
    .map_err(|e| ReloadError::Patch(format!("Invalid JSON Patch: {}", e)))?;

    json_patch::patch(&mut doc, &patch)
        .map_err(|e| ReloadError::Patch(format!("Failed to apply patch: {}", e)))?;

    serde_json::from_value(doc).map_err(|e| {
        ReloadError::Deserialization(format!("Failed to deserialize patched config: {}", e))
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde::Deserialize;

    #[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
    struct TestConfig {
        server: ServerConfig,
        features: Features,
    }

    #[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
    struct ServerConfig {
        port: u16,
        host: String,
        tag: Option<String>,
    }

    #[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
    struct Features {
        rate_limit: RateLimit,
        enabled: Vec<String>,
    }

    #[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
    struct RateLimit {
        rate: u32,
        burst: u32,
    }

    fn initial() -> TestConfig {
        TestConfig {
            server: ServerConfig {
                port: 8080,
                host: "localhost".to_string(),
                tag: Some("blue".to_string()),
            },
            features: Features {
                rate_limit: RateLimit { rate: 100, burst: 200 },
                enabled: vec!["metrics".to_string()],
            },
        }
    }

    #[test]
    fn test_set_numeric_field() {
        let config = LiveConfig::new(initial());
        config.set_field("server", "port", "9090").unwrap();
        assert_eq!(config.get().server.port, 9090);
        assert_eq!(config.get().server.host, "localhost");
    }

    #[test]
    fn test_set_nested_field() {
        let config = LiveConfig::new(initial());
        config
            .set_field("features", "rate_limit.rate", "150")
            .unwrap();
        assert_eq!(config.get().features.rate_limit.rate, 150);
    }

    #[test]
    fn test_numeric_looking_string_field() {
        let config = LiveConfig::new(initial());
        config.set_field("server", "host", "10").unwrap();
        assert_eq!(config.get().server.host, "10");
    }

    #[test]
    fn test_plain_string_field() {
        let config = LiveConfig::new(initial());
        config.set_field("server", "host", "0.0.0.0").unwrap();
        assert_eq!(config.get().server.host, "0.0.0.0");
    }

    #[test]
    fn test_string_field_keeps_raw_value() {
        let config = LiveConfig::new(initial());
        config.set_field("server", "host", r#""quoted""#).unwrap();
        assert_eq!(config.get().server.host, r#""quoted""#);

        config.set_field("server", "tag", "null").unwrap();
        assert_eq!(config.get().server.tag.as_deref(), Some("null"));
    }

    #[test]
    fn test_unset_optional_field_reads_json() {
        let mut untagged = initial();
        untagged.server.tag = None;
        let config = LiveConfig::new(untagged);

        config.set_field("server", "tag", "null").unwrap();
        assert_eq!(config.get().server.tag, None);

        config.set_field("server", "tag", "green").unwrap();
        assert_eq!(config.get().server.tag.as_deref(), Some("green"));
    }

    #[test]
    fn test_store_replaces_whole_value() {
        let config = LiveConfig::new(initial());
        let mut next = initial();
        next.server.port = 9443;
        next.features.enabled.push("tracing".to_string());

        config.store("reload.yaml", next.clone()).unwrap();
        assert_eq!(*config.get(), next);
    }

    #[test]
    fn test_store_validation_reports_source() {
        let config = LiveConfig::new(initial()).with_validation(|cfg: &TestConfig| {
            if cfg.server.port == 0 {
                return Err(ValidationError::invalid_field("port", "must be non-zero"));
            }
            Ok(())
        });
        let mut next = initial();
        next.server.port = 0;

        let err = config.store("reload.yaml", next).unwrap_err();
        assert!(matches!(err, ReloadError::Validation { ref key, .. } if key == "reload.yaml"));
        assert_eq!(*config.get(), initial());
    }

    #[test]
    fn test_json_list_field() {
        let config = LiveConfig::new(initial());
        config
            .set_field("features", "enabled", r#"["metrics","tracing"]"#)
            .unwrap();
        assert_eq!(config.get().features.enabled, vec!["metrics", "tracing"]);
    }

    #[test]
    fn test_unknown_field_is_rejected() {
        let config = LiveConfig::new(initial());
        let err = config.set_field("server", "nonexistent", "1").unwrap_err();
        assert!(matches!(err, ReloadError::Patch(_)));
        assert_eq!(*config.get(), initial());
    }

    #[test]
    fn test_type_mismatch_is_rejected() {
        let config = LiveConfig::new(initial());
        let err = config.set_field("server", "port", "not-a-port").unwrap_err();
        assert!(matches!(err, ReloadError::Deserialization(_)));
        assert_eq!(config.get().server.port, 8080);
    }

    #[test]
    fn test_validation_keeps_previous_value() {
        let config = LiveConfig::new(initial()).with_validation(|cfg: &TestConfig| {
            if cfg.features.rate_limit.burst < cfg.features.rate_limit.rate {
                return Err(ValidationError::invalid_field("burst", "must be >= rate"));
            }
            Ok(())
        });

        let err = config
            .set_field("features", "rate_limit.rate", "500")
            .unwrap_err();
        assert!(matches!(err, ReloadError::Validation { ref key, .. } if key == "features.rate_limit.rate"));
        assert_eq!(config.get().features.rate_limit.rate, 100);
    }

    #[cfg(feature = "validation")]
    #[test]
    fn test_validate_trait() {
        impl Validate for TestConfig {
            fn validate(&self) -> std::result::Result<(), ValidationError> {
                if self.server.port < 1024 {
                    return Err(ValidationError::invalid_field("port", "must be >= 1024"));
                }
                Ok(())
            }
        }

        let config = LiveConfig::validated(initial());
        assert!(config.set_field("server", "port", "80").is_err());
        config.set_field("server", "port", "8443").unwrap();
        assert_eq!(config.get().server.port, 8443);
    }

    #[test]
    fn test_clone_shares_value() {
        let config = LiveConfig::new(initial());
        let config2 = config.clone();
        config.set_field("server", "port", "9090").unwrap();
        assert_eq!(config2.get().server.port, 9090);
    }

    #[test]
    fn test_field_setter_impl() {
        let config = LiveConfig::new(initial());
        let setter: &dyn FieldSetter = &config;
        setter.set_field("server", "port", "7070").unwrap();
        assert_eq!(config.get().server.port, 7070);
    }
}
