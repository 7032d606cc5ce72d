//! Dispatcher settings loaded from files and environment variables.

use crate::error::{ReloadError, Result};
use serde::Deserialize;
use std::path::Path;

/// Tunables for a [`Manager`](crate::core::Manager).
///
/// # Examples
///
/// ```yaml
/// allowed_prefixes:
///   - "server.features."
///   - "gateway."
/// suppress_unchanged: true
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct DispatchSettings {
    /// Key prefixes routed to the bound field setter.
    pub allowed_prefixes: Vec<String>,

    /// Skip the field setter when the old and new values are identical.
    pub suppress_unchanged: bool,
}

impl Default for DispatchSettings {
    fn default() -> Self {
        Self {
            allowed_prefixes: Vec::new(),
            suppress_unchanged: true,
        }
    }
}

impl DispatchSettings {
    /// Load settings from an optional file overlaid by environment variables.
    ///
    /// The file format (YAML, TOML, JSON) is detected from its extension.
    /// Environment variables use `<ENV_PREFIX>__<FIELD>`; `allowed_prefixes`
    /// takes a comma-separated list.
    ///
    /// # Errors
    ///
    /// Returns [`ReloadError::Settings`] if the file cannot be read or parsed,
    /// or if a value has the wrong type.
    ///
    /// # Examples
    ///
    /// ```rust,no_run
    /// use hotswap_reload::core::DispatchSettings;
    ///
    /// # fn example() -> hotswap_reload::error::Result<()> {
    /// // HOTRELOAD__ALLOWED_PREFIXES="server.,gateway." overrides the file
    /// let settings = DispatchSettings::load(Some("config/reload.yaml".as_ref()), "HOTRELOAD")?;
    /// # Ok(())
    /// # }
    /// ```
    pub fn load(path: Option<&Path>, env_prefix: &str) -> Result<Self> {
        let mut builder = config::Config::builder();

        if let Some(path) = path {
            builder = builder.add_source(config::File::from(path).required(true));
        }

        builder = builder.add_source(
            config::Environment::with_prefix(env_prefix)
                .prefix_separator("__")
                .separator("__")
                .list_separator(",")
                .with_list_parse_key("allowed_prefixes")
                .try_parsing(true),
        );

        let config = builder
            .build()
            .map_err(|e| ReloadError::Settings(format!("Failed to build settings: {}", e)))?;

        config
            .try_deserialize::<Self>()
            .map_err(|e| ReloadError::Settings(format!("Failed to deserialize settings: {}", e)))
    }
}
