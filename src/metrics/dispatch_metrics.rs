//! Dispatch metrics tracking using OpenTelemetry.

use crate::error::ReloadError;
use opentelemetry::KeyValue;
use opentelemetry::metrics::{Counter, Histogram, Meter};
use std::time::Instant;

/// Metrics collector for change dispatch.
///
/// # Examples
///
/// ```rust,no_run
/// use hotswap_reload::metrics::DispatchMetrics;
/// use opentelemetry::global;
///
/// let metrics = DispatchMetrics::new(global::meter("hotswap-reload"));
///
/// let timer = metrics.start_dispatch();
/// // ... invoke handlers ...
/// metrics.record_dispatch_success(timer);
/// ```
#[derive(Clone)]
pub struct DispatchMetrics {
    changes: Counter<u64>,
    handler_failures: Counter<u64>,
    validation_failures: Counter<u64>,
    field_updates: Counter<u64>,
    dispatch_duration: Histogram<f64>,
}

impl DispatchMetrics {
    /// Create a new metrics collector with the provided meter.
    pub fn new(meter: Meter) -> Self {
        let changes = meter
            .u64_counter("hotswap_reload.changes")
            .with_description("Total number of dispatched configuration changes")
            .build();

        let handler_failures = meter
            .u64_counter("hotswap_reload.handler.failures")
            .with_description("Number of changes stopped by a failing handler")
            .build();

        let validation_failures = meter
            .u64_counter("hotswap_reload.validation.failures")
            .with_description("Number of values rejected by a reloader")
            .build();

        let field_updates = meter
            .u64_counter("hotswap_reload.field.updates")
            .with_description("Number of values written through the field setter")
            .build();

        let dispatch_duration = meter
            .f64_histogram("hotswap_reload.dispatch.duration")
            .with_description("Duration of change dispatch in seconds")
            .with_unit("s")
            .build();

        Self {
            changes,
            handler_failures,
            validation_failures,
            field_updates,
            dispatch_duration,
        }
    }

    /// Start a dispatch timer and count the change.
    pub fn start_dispatch(&self) -> Instant {
        self.changes.add(1, &[]);
        Instant::now()
    }

    /// Record a dispatch where every handler succeeded.
    pub fn record_dispatch_success(&self, start: Instant) {
        self.dispatch_duration
            .record(start.elapsed().as_secs_f64(), &[KeyValue::new("outcome", "ok")]);
    }

    /// Record a dispatch stopped by `error`.
    ///
    /// Validation rejections are also counted separately.
    pub fn record_dispatch_failure(&self, start: Instant, error: &ReloadError) {
        self.handler_failures.add(1, &[]);
        if matches!(error, ReloadError::Validation { .. }) {
            self.validation_failures.add(1, &[]);
        }
        self.dispatch_duration
            .record(start.elapsed().as_secs_f64(), &[KeyValue::new("outcome", "error")]);
    }

    /// Record a value written through the field setter.
    pub fn record_field_update(&self) {
        self.field_updates.add(1, &[]);
    }
}
