//! Error types for hotswap-reload.

use std::fmt;

/// Boxed error returned by subscriber callbacks and field setters.
pub type BoxError = Box<dyn std::error::Error + Send + Sync + 'static>;

/// Result type alias for hotswap-reload operations.
pub type Result<T> = std::result::Result<T, ReloadError>;

/// Errors that can occur while registering subscribers or dispatching changes.
#[derive(Debug, thiserror::Error)]
pub enum ReloadError {
    /// A registration call was made against a manager that no longer exists.
    #[error("Invalid argument: {0}")]
    InvalidArgument(String),

    /// A reloader rejected the proposed value; its `on_change` was not called.
    #[error("Validation failed for key {key}: {source}")]
    Validation {
        /// The configuration key being changed
        key: String,
        /// The reloader's validation error
        source: ValidationError,
    },

    /// A reloader accepted the value but failed to apply it.
    #[error("Failed to apply change for key {key}: {source}")]
    Apply {
        /// The configuration key being changed
        key: String,
        /// The error returned by `on_change`
        source: BoxError,
    },

    /// A structured key did not decompose into `module.field_path`.
    #[error("Invalid config key format: {0}")]
    InvalidKeyFormat(String),

    /// The field setter failed to write the value.
    #[error("Failed to set field {module}.{field_path}: {source}")]
    FieldApply {
        /// Module name (first key segment)
        module: String,
        /// Remaining dotted field path
        field_path: String,
        /// The error returned by the setter
        source: BoxError,
    },

    /// A change was dispatched through a manager that no longer exists.
    #[error("Invalid state: {0}")]
    InvalidState(String),

    /// A raw change handler failed.
    #[error("Change handler failed: {0}")]
    Handler(#[source] BoxError),

    /// Dispatcher settings could not be loaded.
    #[error("Failed to load settings: {0}")]
    Settings(String),

    #[cfg(feature = "partial-updates")]
    /// JSON patch operation against a live target failed.
    #[error("Patch operation failed: {0}")]
    Patch(String),

    #[cfg(feature = "partial-updates")]
    /// A patched live target could not be deserialized back into its type.
    #[error("Failed to deserialize configuration: {0}")]
    Deserialization(String),
}

impl ReloadError {
    /// Wrap an arbitrary error as a handler failure.
    ///
    /// # Examples
    ///
    /// ```rust
    /// use hotswap_reload::error::ReloadError;
    ///
    /// let err = ReloadError::handler("connection pool is draining");
    /// assert!(err.to_string().contains("draining"));
    /// ```
    pub fn handler(err: impl Into<BoxError>) -> Self {
        Self::Handler(err.into())
    }
}

/// Validation error returned by reloaders and live targets.
#[derive(Debug)]
pub enum ValidationError {
    /// Custom validation error with a message.
    Custom(String),

    /// A specific field has an invalid value.
    InvalidField {
        /// The field name/path
        field: String,
        /// The reason why it's invalid
        reason: String,
    },

    /// Multiple validation errors occurred.
    Multiple(Vec<ValidationError>),
}

impl ValidationError {
    /// Create a custom validation error.
    pub fn custom(msg: impl Into<String>) -> Self {
        Self::Custom(msg.into())
    }

    /// Create an invalid field error.
    pub fn invalid_field(field: impl Into<String>, reason: impl Into<String>) -> Self {
        Self::InvalidField {
            field: field.into(),
            reason: reason.into(),
        }
    }
}

impl fmt::Display for ValidationError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Custom(msg) => write!(f, "{}", msg),
            Self::InvalidField { field, reason } => {
                write!(f, "Field '{}' is invalid: {}", field, reason)
            }
            Self::Multiple(errors) => {
                writeln!(f, "Multiple validation errors:")?;
                for (i, err) in errors.iter().enumerate() {
                    writeln!(f, "  {}. {}", i + 1, err)?;
                }
                Ok(())
            }
        }
    }
}

impl std::error::Error for ValidationError {}
