// SPDX-License-Identifier: GPL-3.0-or-later
use std::path::Path;

use anyhow::Result;
use figment::{
    providers::{Env, Format, Serialized, Toml},
    Figment,
};
use serde::{Deserialize, Serialize};
use tracing::info;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct HttpConfig {
    pub host: String,
    pub port: u16,
}

impl Default for HttpConfig {
    fn default() -> Self {
        Self {
            host: "127.0.0.1".to_string(),
            port: 5001,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TelemetryConfig {
    pub log_level: String,
    /// Emit log lines as JSON objects instead of the human-readable format.
    pub json: bool,
}

impl Default for TelemetryConfig {
    fn default() -> Self {
        Self {
            log_level: "info".to_string(),
            json: false,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SpotifyConfig {
    pub api_base_url: String,
    pub timeout_secs: u64,
    /// Minimum delay between two consecutive Web API calls.
    pub min_request_interval_ms: u64,
}

impl Default for SpotifyConfig {
    fn default() -> Self {
        Self {
            api_base_url: "https://api.spotify.com/v1".to_string(),
            timeout_secs: 30,
            min_request_interval_ms: 50,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ResolverConfig {
    /// Number of album candidates requested per search query (at most 50).
    pub search_limit: u32,
    /// Number of tracks fetched per resolved album (at most 50).
    pub track_page_size: u32,
    /// Track references submitted per add-to-playlist call (API ceiling is 100).
    pub upload_batch_size: usize,
    /// Releases resolved in parallel; 1 keeps the run strictly sequential.
    pub max_concurrent_releases: usize,
}

impl Default for ResolverConfig {
    fn default() -> Self {
        Self {
            search_limit: 5,
            track_page_size: 50,
            upload_batch_size: 100,
            max_concurrent_releases: 1,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct AppConfig {
    pub http: HttpConfig,
    pub telemetry: TelemetryConfig,
    pub spotify: SpotifyConfig,
    pub resolver: ResolverConfig,
}

/// Load configuration from defaults, optional TOML file, and environment overrides (prefix: CRATEDIG_).
pub fn load(config_path: Option<&Path>) -> Result<AppConfig> {
    let mut figment = Figment::from(Serialized::defaults(AppConfig::default()));

    if let Some(path) = config_path {
        figment = figment.merge(Toml::file(path));
    }

    figment = figment.merge(Env::prefixed("CRATEDIG_").split("__"));

    let config: AppConfig = figment.extract()?;
    info!(target: "config", "configuration loaded");
    Ok(config)
}
