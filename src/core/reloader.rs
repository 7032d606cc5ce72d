//! Subscriber capabilities: raw handlers, reloaders and field setters.

use crate::error::{BoxError, ReloadError, Result, ValidationError};
use std::sync::Arc;

/// A raw change handler, invoked as `handler(key, old_value, new_value)`.
///
/// Returning an error stops dispatch for the current change and surfaces the
/// error to the caller of `handle_change`.
pub type ChangeHandler = Arc<dyn Fn(&str, &str, &str) -> Result<()> + Send + Sync>;

/// A component that validates and applies configuration changes for a set of
/// key patterns.
///
/// # Examples
///
/// ```rust
/// use hotswap_reload::core::Reloader;
/// use hotswap_reload::error::{BoxError, ValidationError};
/// use std::sync::atomic::{AtomicU64, Ordering};
///
/// struct RateLimiter {
///     rate: AtomicU64,
/// }
///
/// impl Reloader for RateLimiter {
///     fn patterns(&self) -> Vec<String> {
///         vec!["server.features.rate_limit.*".to_string()]
///     }
///
///     fn validate(&self, _key: &str, value: &str) -> Result<(), ValidationError> {
///         value
///             .parse::<u64>()
///             .map(|_| ())
///             .map_err(|_| ValidationError::invalid_field("rate", "must be an integer"))
///     }
///
///     fn on_change(&self, _key: &str, _old: &str, new: &str) -> Result<(), BoxError> {
///         self.rate.store(new.parse()?, Ordering::SeqCst);
///         Ok(())
///     }
/// }
/// ```
pub trait Reloader: Send + Sync {
    /// Key patterns this reloader subscribes to.
    fn patterns(&self) -> Vec<String>;

    /// Check a proposed value before it is applied.
    ///
    /// # Errors
    ///
    /// Returning an error prevents `on_change` from being called.
    fn validate(&self, key: &str, value: &str) -> std::result::Result<(), ValidationError>;

    /// Apply a change that passed validation.
    ///
    /// # Errors
    ///
    /// Any error is surfaced to the dispatcher as [`ReloadError::Apply`].
    fn on_change(&self, key: &str, old_value: &str, new_value: &str)
    -> std::result::Result<(), BoxError>;
}

/// Writes a value into a live structure at `module` / `field_path`.
///
/// Implemented for any `Fn(&str, &str, &str) -> Result<(), BoxError>`.
pub trait FieldSetter: Send + Sync {
    /// Set `field_path` inside `module` to the string-encoded `value`.
    fn set_field(
        &self,
        module: &str,
        field_path: &str,
        value: &str,
    ) -> std::result::Result<(), BoxError>;
}

impl<F> FieldSetter for F
where
    F: Fn(&str, &str, &str) -> std::result::Result<(), BoxError> + Send + Sync,
{
    fn set_field(
        &self,
        module: &str,
        field_path: &str,
        value: &str,
    ) -> std::result::Result<(), BoxError> {
        self(module, field_path, value)
    }
}

/// Build the validate-then-apply handler registered for each reloader pattern.
pub(crate) fn reloader_handler(reloader: Arc<dyn Reloader>) -> ChangeHandler {
    Arc::new(move |key: &str, old_value: &str, new_value: &str| -> Result<()> {
        reloader
            .validate(key, new_value)
            .map_err(|source| ReloadError::Validation {
                key: key.to_string(),
                source,
            })?;

        reloader
            .on_change(key, old_value, new_value)
            .map_err(|source| ReloadError::Apply {
                key: key.to_string(),
                source,
            })
    })
}
