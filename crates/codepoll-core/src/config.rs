use anyhow::{bail, Context, Result};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};
use std::time::Duration;

use crate::fetch::HttpTimeouts;

/// Lowest accepted `min_refresh_interval_ms`.
pub const MIN_REFRESH_FLOOR_MS: u64 = 100;

/// Retry policy parameters (optional section in config.toml).
///
/// Absent means a failed fetch halts polling for good.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RetryConfig {
    /// Maximum number of consecutive attempts (including the first).
    pub max_attempts: u32,
    /// Base delay in seconds for exponential backoff (e.g. 0.5 = 500ms).
    pub base_delay_secs: f64,
    /// Maximum backoff delay in seconds.
    pub max_delay_secs: u64,
}

impl RetryConfig {
    /// Reject values that do not describe a usable backoff.
    pub fn validate(&self) -> Result<()> {
        if !self.base_delay_secs.is_finite() || self.base_delay_secs < 0.0 {
            bail!(
                "retry.base_delay_secs must be a non-negative number, got {}",
                self.base_delay_secs
            );
        }
        Duration::try_from_secs_f64(self.base_delay_secs)
            .with_context(|| format!("retry.base_delay_secs = {}", self.base_delay_secs))?;
        Ok(())
    }
}

impl Default for RetryConfig {
    fn default() -> Self {
        Self {
            max_attempts: 5,
            base_delay_secs: 1.0,
            max_delay_secs: 30,
        }
    }
}

/// Global configuration loaded from `~/.config/codepoll/config.toml`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CodepollConfig {
    /// Origin serving the `/codes/` endpoint.
    pub server: String,
    /// Countdown is shown once fewer than this many seconds remain.
    pub countdown_threshold_secs: u64,
    /// Countdown tick period in milliseconds.
    pub tick_interval_ms: u64,
    /// Floor for the delay before the next refresh, in milliseconds.
    pub min_refresh_interval_ms: u64,
    /// Curl connect timeout in seconds.
    pub connect_timeout_secs: u64,
    /// Curl total request timeout in seconds.
    pub request_timeout_secs: u64,
    /// Optional retry policy; if missing, the first failure is final.
    #[serde(default)]
    pub retry: Option<RetryConfig>,
}

impl Default for CodepollConfig {
    fn default() -> Self {
        Self {
            server: "http://localhost:8000".to_string(),
            countdown_threshold_secs: 10,
            tick_interval_ms: 1000,
            min_refresh_interval_ms: 250,
            connect_timeout_secs: 5,
            request_timeout_secs: 10,
            retry: None,
        }
    }
}

impl CodepollConfig {
    pub fn countdown_threshold(&self) -> Duration {
        Duration::from_secs(self.countdown_threshold_secs)
    }

    pub fn tick_interval(&self) -> Duration {
        // A zero period would spin the ticker.
        Duration::from_millis(self.tick_interval_ms.max(1))
    }

    pub fn min_refresh_interval(&self) -> Duration {
        // With `Valid: 0` this is the whole polling period.
        Duration::from_millis(self.min_refresh_interval_ms.max(MIN_REFRESH_FLOOR_MS))
    }

    pub fn http_timeouts(&self) -> HttpTimeouts {
        HttpTimeouts {
            connect: Duration::from_secs(self.connect_timeout_secs),
            total: Duration::from_secs(self.request_timeout_secs),
        }
    }
}

pub fn config_path() -> Result<PathBuf> {
    let xdg_dirs = xdg::BaseDirectories::with_prefix("codepoll")?;
    Ok(xdg_dirs.place_config_file("config.toml")?)
}

/// Load configuration from disk, creating a default file if none exists.
pub fn load_or_init() -> Result<CodepollConfig> {
    load_or_init_at(&config_path()?)
}

/// Like `load_or_init` but for an explicit path.
pub fn load_or_init_at(path: &Path) -> Result<CodepollConfig> {
    if !path.exists() {
        let default_cfg = CodepollConfig::default();
        let toml = toml::to_string_pretty(&default_cfg)?;
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent)?;
        }
        fs::write(path, toml).with_context(|| format!("write {}", path.display()))?;
        tracing::info!("created default config at {}", path.display());
        return Ok(default_cfg);
    }

    let data = fs::read_to_string(path).with_context(|| format!("read {}", path.display()))?;
    let cfg: CodepollConfig =
        toml::from_str(&data).with_context(|| format!("parse {}", path.display()))?;
    if let Some(retry) = &cfg.retry {
        retry
            .validate()
            .with_context(|| format!("invalid [retry] in {}", path.display()))?;
    }
    Ok(cfg)
}
