//! End-to-end routing of structured keys into a live configuration target.

#![cfg(feature = "partial-updates")]

use hotswap_reload::error::{ReloadError, ValidationError};
use hotswap_reload::prelude::*;
use serde::{Deserialize, Serialize};
use std::fs;
use std::sync::Arc;
use std::sync::atomic::{AtomicUsize, Ordering};
use tempfile::TempDir;

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
struct SystemConfig {
    server: ServerConfig,
    gateway: GatewayConfig,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
struct ServerConfig {
    http: HttpConfig,
    features: Features,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
struct HttpConfig {
    port: u16,
    host: String,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
struct Features {
    rate_limit: RateLimit,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
struct RateLimit {
    enabled: bool,
    rate: u32,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
struct GatewayConfig {
    timeout_ms: u64,
}

fn initial() -> SystemConfig {
    SystemConfig {
        server: ServerConfig {
            http: HttpConfig {
                port: 8080,
                host: "localhost".to_string(),
            },
            features: Features {
                rate_limit: RateLimit {
                    enabled: false,
                    rate: 100,
                },
            },
        },
        gateway: GatewayConfig { timeout_ms: 3000 },
    }
}

#[test]
fn test_changes_flow_into_live_config() {
    let live = LiveConfig::new(initial());
    let manager = Manager::new();
    manager.set_field_setter(live.clone(), ["server.", "gateway."]);

    manager
        .handle_change("server.features.rate_limit.rate", "100", "250")
        .unwrap();
    manager
        .handle_change("server.features.rate_limit.enabled", "false", "true")
        .unwrap();
    manager
        .handle_change("gateway.timeout_ms", "3000", "5000")
        .unwrap();

    let cfg = live.get();
    assert_eq!(cfg.server.features.rate_limit.rate, 250);
    assert!(cfg.server.features.rate_limit.enabled);
    assert_eq!(cfg.gateway.timeout_ms, 5000);
    assert_eq!(cfg.server.http.port, 8080);
}

#[test]
fn test_wildcard_handlers_observe_value_before_commit() {
    let live = LiveConfig::new(initial());
    let manager = Manager::new();
    manager.set_field_setter(live.clone(), ["server."]);

    let observed = Arc::new(AtomicUsize::new(0));
    let observed_clone = Arc::clone(&observed);
    let reader = live.clone();
    manager
        .register_handler("server.http.*", move |_, _, _| {
            observed_clone.store(reader.get().server.http.port as usize, Ordering::SeqCst);
            Ok(())
        })
        .unwrap();

    manager.handle_change("server.http.port", "8080", "9090").unwrap();

    assert_eq!(observed.load(Ordering::SeqCst), 8080);
    assert_eq!(live.get().server.http.port, 9090);
}

#[test]
fn test_unknown_field_surfaces_field_apply_error() {
    let live = LiveConfig::new(initial());
    let manager = Manager::new();
    manager.set_field_setter(live.clone(), ["server."]);

    let err = manager
        .handle_change("server.http.tls", "false", "true")
        .unwrap_err();
    assert!(matches!(err, ReloadError::FieldApply { .. }));
    assert_eq!(*live.get(), initial());
}

#[test]
fn test_validated_live_config_rejects_bad_value() {
    let live = LiveConfig::new(initial()).with_validation(|cfg: &SystemConfig| {
        if cfg.server.http.port < 1024 {
            return Err(ValidationError::invalid_field("port", "must be >= 1024"));
        }
        Ok(())
    });
    let manager = Manager::new();
    manager.set_field_setter(live.clone(), ["server."]);

    let err = manager.handle_change("server.http.port", "8080", "80").unwrap_err();
    assert!(matches!(err, ReloadError::FieldApply { .. }));
    assert_eq!(live.get().server.http.port, 8080);
}

#[test]
fn test_settings_file_drives_routing() {
    let temp_dir = TempDir::new().unwrap();
    let path = temp_dir.path().join("reload.yaml");
    fs::write(
        &path,
        r#"
allowed_prefixes:
  - "gateway."
"#,
    )
    .unwrap();

    let settings = DispatchSettings::load(Some(&path), "HOTSWAP_RELOAD_IT").unwrap();
    let live = LiveConfig::new(initial());
    let manager = Manager::builder()
        .with_settings(settings)
        .with_field_setter(live.clone())
        .build();

    manager.handle_change("gateway.timeout_ms", "3000", "100").unwrap();
    manager.handle_change("server.http.port", "8080", "9999").unwrap();

    let cfg = live.get();
    assert_eq!(cfg.gateway.timeout_ms, 100);
    assert_eq!(cfg.server.http.port, 8080);
}
