//! Configuration loading from TOML with environment variable resolution.
//!
//! Reads `config.toml` and deserializes into strongly-typed structs.
//! Secrets (the lookup API key) are referenced by env-var name in the
//! config and resolved at runtime via `std::env::var`.

use anyhow::{Context, Result};
use serde::Deserialize;
use std::fs;

/// Top-level application configuration.
#[derive(Debug, Deserialize, Clone)]
pub struct AppConfig {
    pub shop: ShopConfig,
    pub lookup: LookupConfig,
    pub catalog: CatalogConfig,
    pub inventory: InventoryConfig,
    pub dashboard: DashboardConfig,
}

#[derive(Debug, Deserialize, Clone)]
pub struct ShopConfig {
    pub name: String,
}

#[derive(Debug, Deserialize, Clone)]
pub struct LookupConfig {
    /// Env var holding the Pokémon TCG API key. The API works without a
    /// key at a lower rate limit, so this is optional.
    #[serde(default)]
    pub api_key_env: Option<String>,
    /// Override the API base URL (used by tests against a local stub).
    #[serde(default)]
    pub base_url: Option<String>,
    /// Max results per search request.
    pub page_size: u32,
}

#[derive(Debug, Deserialize, Clone)]
pub struct CatalogConfig {
    /// Path to the upcoming-release catalog TOML file.
    pub path: String,
}

#[derive(Debug, Deserialize, Clone)]
pub struct InventoryConfig {
    /// Path to the seed inventory TOML file.
    pub path: String,
}

#[derive(Debug, Deserialize, Clone)]
pub struct DashboardConfig {
    pub enabled: bool,
    pub port: u16,
}

impl AppConfig {
    /// Load configuration from a TOML file.
    pub fn load(path: &str) -> Result<Self> {
        let contents = fs::read_to_string(path)
            .with_context(|| format!("Failed to read config file: {path}"))?;
        let config: AppConfig = toml::from_str(&contents)
            .with_context(|| format!("Failed to parse config file: {path}"))?;
        Ok(config)
    }

    /// Resolve an environment variable name to its value.
    /// Useful for loading secrets referenced in the config.
    pub fn resolve_env(env_name: &str) -> Result<String> {
        std::env::var(env_name)
            .with_context(|| format!("Environment variable not set: {env_name}"))
    }
}
