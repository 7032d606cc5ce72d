//! Validation of live targets after a field update.

use crate::error::ValidationError;

/// Trait for validating a live configuration target.
///
/// Implement this on the struct behind a
/// [`LiveConfig`](crate::features::LiveConfig) so that field updates producing
/// an invalid value are rejected and the previous value is kept.
///
/// # Examples
///
/// ```rust
/// use hotswap_reload::core::Validate;
/// use hotswap_reload::error::ValidationError;
///
/// struct RateLimit {
///     rate: u32,
///     burst: u32,
/// }
///
/// impl Validate for RateLimit {
///     fn validate(&self) -> Result<(), ValidationError> {
///         if self.burst < self.rate {
///             return Err(ValidationError::invalid_field(
///                 "burst",
///                 "must be at least the sustained rate",
///             ));
///         }
///         Ok(())
///     }
/// }
/// ```
pub trait Validate {
    /// Validate the configuration.
    ///
    /// # Errors
    ///
    /// Should return a `ValidationError` describing what validation failed.
    fn validate(&self) -> Result<(), ValidationError>;
}
