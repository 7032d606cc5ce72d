//! Example wiring a configuration source to reloaders and a live target.
//!
//! This example shows how to:
//! - Register a validating reloader for a family of keys
//! - Route structured keys straight into a live config struct
//! - Observe dispatch diagnostics through `tracing`
//!
//! Run with: RUST_LOG=debug cargo run --example field_routing

use hotswap_reload::error::BoxError;
use hotswap_reload::prelude::*;
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use std::sync::atomic::{AtomicU32, Ordering};
use tracing_subscriber::EnvFilter;

#[derive(Debug, Clone, Serialize, Deserialize)]
struct AppConfig {
    server: ServerConfig,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
struct ServerConfig {
    port: u16,
    features: Features,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
struct Features {
    rate_limit: RateLimit,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
struct RateLimit {
    rate: u32,
}

struct RateLimiter {
    rate: AtomicU32,
}

impl Reloader for RateLimiter {
    fn patterns(&self) -> Vec<String> {
        vec!["server.features.rate_limit.*".to_string()]
    }

    fn validate(&self, _key: &str, value: &str) -> Result<(), ValidationError> {
        match value.parse::<u32>() {
            Ok(rate) if rate > 0 => Ok(()),
            _ => Err(ValidationError::invalid_field(
                "rate",
                "must be a positive integer",
            )),
        }
    }

    fn on_change(&self, key: &str, old: &str, new: &str) -> Result<(), BoxError> {
        println!("[RateLimiter] {key}: {old} -> {new}");
        self.rate.store(new.parse()?, Ordering::SeqCst);
        Ok(())
    }
}

fn main() -> hotswap_reload::error::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .init();

    println!("=== Field Routing Example ===\n");

    let live = LiveConfig::new(AppConfig {
        server: ServerConfig {
            port: 8080,
            features: Features {
                rate_limit: RateLimit { rate: 100 },
            },
        },
    });

    let manager = Manager::builder()
        .with_allowed_prefixes(["server."])
        .with_field_setter(live.clone())
        .build();

    let limiter = Arc::new(RateLimiter {
        rate: AtomicU32::new(100),
    });
    manager.register_reloader(limiter.clone())?;

    manager.register_handler("server.port", |_, old, new| {
        println!("[Handler] port changing {old} -> {new}, draining listeners");
        Ok(())
    })?;

    // Simulated events from a configuration source
    let events = [
        ("server.port", "8080", "9090"),
        ("server.features.rate_limit.rate", "100", "250"),
        ("server.features.rate_limit.rate", "250", "0"),
        ("server.port", "9090", "9090"),
    ];

    for (key, old, new) in events {
        match manager.handle_change(key, old, new) {
            Ok(()) => println!("  applied {key} = {new}"),
            Err(err) => println!("  rejected {key} = {new}: {err}"),
        }
    }

    let cfg = live.get();
    println!("\nLive config: {:?}", cfg);
    println!("Limiter rate: {}", limiter.rate.load(Ordering::SeqCst));

    println!("\n=== Example Complete ===");
    Ok(())
}
