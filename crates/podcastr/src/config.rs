//! Configuration loading and parsing.
//!
//! Defines the client config schema and resolves defaults.

use std::path::{Path, PathBuf};
use std::time::Duration;

use anyhow::{Context, Result, anyhow};
use serde::Deserialize;

const DEFAULT_API_URL: &str = "http://localhost:3333";
const DEFAULT_EPISODE_LIMIT: usize = 12;
const DEFAULT_LATEST_COUNT: usize = 2;
const DEFAULT_SEEK_STEP_SECS: u64 = 5;
const DEFAULT_LOG_FILTER: &str = "info,podcastr=info";
const DEFAULT_MAX_MEDIA_BYTES: u64 = 512 * 1024 * 1024;
const DEFAULT_TICK_MS: u64 = 33;

/// Top-level client configuration loaded from TOML.
#[derive(Debug, Default, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct ClientConfig {
    /// Base URL of the episodes API.
    pub api_url: Option<String>,
    /// Number of episodes requested for the home page.
    pub episode_limit: Option<usize>,
    /// How many of those are shown under "Latest releases".
    pub latest_count: Option<usize>,
    /// Seconds moved by one seek key press.
    pub seek_step_secs: Option<u64>,
    /// Fallback tracing filter when `RUST_LOG` is unset.
    pub log_filter: Option<String>,
    /// Largest media file the player will buffer, in bytes.
    pub max_media_bytes: Option<u64>,
    /// UI redraw interval in milliseconds.
    pub tick_ms: Option<u64>,
}

impl ClientConfig {
    /// Load a config file from disk.
    pub fn load(path: &Path) -> Result<Self> {
        let raw = std::fs::read_to_string(path)
            .with_context(|| format!("read config {:?}", path))?;
        Self::parse(&raw).with_context(|| format!("parse config {:?}", path))
    }

    pub fn parse(raw: &str) -> Result<Self> {
        toml::from_str(raw).context("invalid config")
    }

    /// Load `explicit` when given, otherwise `config.toml` next to the executable if present.
    pub fn locate(explicit: Option<&Path>) -> Result<(Self, Option<PathBuf>)> {
        if let Some(path) = explicit {
            return Ok((Self::load(path)?, Some(path.to_path_buf())));
        }
        let auto_path = std::env::current_exe()
            .ok()
            .and_then(|path| path.parent().map(|dir| dir.join("config.toml")));
        match auto_path {
            Some(path) if path.exists() => Ok((Self::load(&path)?, Some(path))),
            _ => Ok((Self::default(), None)),
        }
    }
}

/// Config with defaults applied and values validated.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Settings {
    pub api_url: String,
    pub episode_limit: usize,
    pub latest_count: usize,
    pub seek_step_secs: u64,
    pub log_filter: String,
    pub max_media_bytes: u64,
    pub tick: Duration,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            api_url: DEFAULT_API_URL.to_string(),
            episode_limit: DEFAULT_EPISODE_LIMIT,
            latest_count: DEFAULT_LATEST_COUNT,
            seek_step_secs: DEFAULT_SEEK_STEP_SECS,
            log_filter: DEFAULT_LOG_FILTER.to_string(),
            max_media_bytes: DEFAULT_MAX_MEDIA_BYTES,
            tick: Duration::from_millis(DEFAULT_TICK_MS),
        }
    }
}

impl Settings {
    /// Apply defaults to `cfg`; `api_url_override` (from the CLI) wins over the file.
    pub fn resolve(cfg: &ClientConfig, api_url_override: Option<&str>) -> Result<Self> {
        let api_url = api_url_override
            .or(cfg.api_url.as_deref())
            .map(normalize_api_url)
            .transpose()?
            .unwrap_or_else(|| DEFAULT_API_URL.to_string());

        let episode_limit = cfg.episode_limit.unwrap_or(DEFAULT_EPISODE_LIMIT);
        if episode_limit == 0 {
            return Err(anyhow!("episode_limit must be at least 1"));
        }
        let latest_count = cfg
            .latest_count
            .unwrap_or(DEFAULT_LATEST_COUNT)
            .min(episode_limit);

        let tick_ms = cfg.tick_ms.unwrap_or(DEFAULT_TICK_MS);
        if tick_ms == 0 {
            return Err(anyhow!("tick_ms must be at least 1"));
        }
        let max_media_bytes = cfg.max_media_bytes.unwrap_or(DEFAULT_MAX_MEDIA_BYTES);
        if max_media_bytes == 0 {
            return Err(anyhow!("max_media_bytes must be positive"));
        }

        Ok(Self {
            api_url,
            episode_limit,
            latest_count,
            seek_step_secs: cfg.seek_step_secs.unwrap_or(DEFAULT_SEEK_STEP_SECS).max(1),
            log_filter: cfg
                .log_filter
                .clone()
                .filter(|f| !f.trim().is_empty())
                .unwrap_or_else(|| DEFAULT_LOG_FILTER.to_string()),
            max_media_bytes,
            tick: Duration::from_millis(tick_ms),
        })
    }
}

fn normalize_api_url(raw: &str) -> Result<String> {
    let trimmed = raw.trim().trim_end_matches('/');
    let lower = trimmed.to_ascii_lowercase();
    let rest = lower
        .strip_prefix("http://")
        .or_else(|| lower.strip_prefix("https://"))
        .ok_or_else(|| anyhow!("api_url must start with http:// or https://: {raw}"))?;
    if rest.is_empty() {
        return Err(anyhow!("api_url has no host: {raw}"));
    }
    Ok(trimmed.to_string())
}
