//! # hotswap-reload
//!
//! Pattern-based dispatch of configuration change notifications.
//!
//! ## Overview
//!
//! A configuration source (a file watcher, a remote config center, an admin
//! API) detects that `key` changed from `old_value` to `new_value` and hands
//! the change to a [`Manager`](core::Manager). The manager decides which
//! subscribers care about the key and invokes them synchronously:
//!
//! - raw handlers registered under an exact key or a wildcard pattern,
//! - [`Reloader`](core::Reloader)s, which validate a value before applying it,
//! - an optional [`FieldSetter`](core::FieldSetter) that writes values under
//!   allowed prefixes straight into a live structure.
//!
//! ## Quick Start
//!
//! ```rust
//! use hotswap_reload::prelude::*;
//! use hotswap_reload::error::BoxError;
//! use std::sync::Arc;
//! use std::sync::atomic::{AtomicU32, Ordering};
//!
//! struct RateLimiter {
//!     rate: AtomicU32,
//! }
//!
//! impl Reloader for RateLimiter {
//!     fn patterns(&self) -> Vec<String> {
//!         vec!["server.features.rate_limit.*".to_string()]
//!     }
//!
//!     fn validate(&self, _key: &str, value: &str) -> Result<(), ValidationError> {
//!         match value.parse::<u32>() {
//!             Ok(rate) if rate > 0 => Ok(()),
//!             _ => Err(ValidationError::invalid_field("rate", "must be a positive integer")),
//!         }
//!     }
//!
//!     fn on_change(&self, _key: &str, _old: &str, new: &str) -> Result<(), BoxError> {
//!         self.rate.store(new.parse()?, Ordering::SeqCst);
//!         Ok(())
//!     }
//! }
//!
//! let limiter = Arc::new(RateLimiter { rate: AtomicU32::new(100) });
//!
//! let manager = Manager::new();
//! manager.register_reloader(limiter.clone()).unwrap();
//!
//! // Called by the configuration source for every detected change
//! manager
//!     .handle_change("server.features.rate_limit.rate", "100", "250")
//!     .unwrap();
//! assert_eq!(limiter.rate.load(Ordering::SeqCst), 250);
//!
//! // Invalid values never reach `on_change`
//! assert!(manager.handle_change("server.features.rate_limit.rate", "250", "0").is_err());
//! assert_eq!(limiter.rate.load(Ordering::SeqCst), 250);
//! ```
//!
//! ## Patterns
//!
//! - `server.http.port` matches only that key
//! - `server.features.*` matches every key starting with `server.features`
//! - `server.*.rate` matches `server.api.rate` but not `server.api.v2.rate`
//!
//! See [`pattern`] for the exact rules.
//!
//! ## Diagnostics
//!
//! Registrations, structured updates and dispatch failures are reported
//! through [`tracing`]; install any subscriber to collect them.
//!
//! ## Feature Flags
//!
//! - `validation` (default): the [`Validate`](core::Validate) trait for live targets
//! - `partial-updates` (default): [`LiveConfig`](features::LiveConfig), a lock-free field-settable target
//! - `metrics`: OpenTelemetry dispatch metrics

#![warn(missing_docs, rust_2024_compatibility)]
#![deny(unsafe_code)]

pub mod core;
pub mod error;
pub mod key_path;
pub mod pattern;

#[cfg(feature = "partial-updates")]
pub mod features;

#[cfg(feature = "metrics")]
pub mod metrics;

/// Convenient re-exports for common usage patterns.
pub mod prelude {
    pub use crate::core::{
        ChangeHandler, DispatchSettings, FieldSetter, Manager, ManagerBuilder, ManagerRef,
        Reloader,
    };
    pub use crate::error::{ReloadError, ValidationError};

    #[cfg(feature = "validation")]
    pub use crate::core::Validate;

    #[cfg(feature = "partial-updates")]
    pub use crate::features::LiveConfig;
}
