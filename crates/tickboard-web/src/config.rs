//! Server configuration, loaded from TOML with sensible defaults.

use std::path::{Path, PathBuf};

use serde::Deserialize;
use thiserror::Error;

/// Display-only label→symbol pair for the dashboard's world index strip.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct IndexLabel {
    pub label: String,
    pub symbol: String,
}

/// Root configuration.
///
/// Every field has a default, so an absent or partial file still yields a
/// runnable server.
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct Config {
    /// Socket address the HTTP server binds to.
    pub listen: String,
    /// Cache TTL for assembled summaries, in seconds.
    pub cache_ttl_secs: u64,
    /// Per-request timeout against the upstream provider, in milliseconds.
    pub upstream_timeout_ms: u64,
    /// Bound on concurrent upstream fetches during basket aggregation.
    pub basket_parallelism: usize,
    /// Exchange suffix appended to regional members.
    pub regional_suffix: String,
    /// Regional membership set; doubles as the dashboard basket.
    pub regional_symbols: Vec<String>,
    /// World indices shown on the dashboard, display only.
    pub world_indices: Vec<IndexLabel>,
    /// Whether company profiles are run through the localizer.
    pub translate_profiles: bool,
    pub profile_source_lang: String,
    pub profile_target_lang: String,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            listen: String::from("127.0.0.1:8000"),
            cache_ttl_secs: 600,
            upstream_timeout_ms: 10_000,
            basket_parallelism: 4,
            regional_suffix: String::from(".SA"),
            regional_symbols: [
                "PETR4", "VALE3", "ITUB4", "BBDC4", "ABEV3", "BBAS3", "B3SA3", "WEGE3", "MGLU3",
                "SUZB3",
            ]
            .iter()
            .map(|s| (*s).to_owned())
            .collect(),
            world_indices: vec![
                index("S&P 500", "^GSPC"),
                index("Dow Jones", "^DJI"),
                index("Nasdaq", "^IXIC"),
                index("FTSE 100", "^FTSE"),
                index("Nikkei 225", "^N225"),
                index("Ibovespa", "^BVSP"),
            ],
            translate_profiles: true,
            profile_source_lang: String::from("en"),
            profile_target_lang: String::from("pt"),
        }
    }
}

fn index(label: &str, symbol: &str) -> IndexLabel {
    IndexLabel {
        label: label.to_owned(),
        symbol: symbol.to_owned(),
    }
}

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("failed to read config {path}: {source}")]
    Io {
        path: PathBuf,
        source: std::io::Error,
    },
    #[error("failed to parse config {path}: {source}")]
    Parse {
        path: PathBuf,
        source: toml::de::Error,
    },
}

impl Config {
    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        let raw = std::fs::read_to_string(path).map_err(|source| ConfigError::Io {
            path: path.to_owned(),
            source,
        })?;
        toml::from_str(&raw).map_err(|source| ConfigError::Parse {
            path: path.to_owned(),
            source,
        })
    }
}
