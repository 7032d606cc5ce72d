//! Built-in metrics for change dispatch.
//!
//! Provides OpenTelemetry metrics tracking:
//! - Dispatched changes and their duration
//! - Handler failures
//! - Validation failures
//! - Structured field updates
//!
//! # Examples
//!
//! ```rust,no_run
//! use hotswap_reload::prelude::*;
//! use opentelemetry::global;
//!
//! let meter = global::meter("my-app");
//!
//! let manager = Manager::builder().with_metrics(meter).build();
//! manager.handle_change("server.http.port", "8080", "9090").unwrap();
//! ```

mod dispatch_metrics;

pub use dispatch_metrics::DispatchMetrics;
