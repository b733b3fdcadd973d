use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};
use std::time::Duration;

use crate::api::ApiOptions;
use crate::logging::{LogConfig, LogLevel};
use crate::token::PollPolicy;

/// Registration-token poll parameters (optional `[poll]` section in config.toml).
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PollConfig {
    /// Maximum number of token list calls; 0 polls until the state changes.
    pub max_attempts: u32,
    /// Base delay in seconds for exponential backoff (e.g. 0.25 = 250ms).
    pub base_delay_secs: f64,
    /// Maximum delay between polls in seconds.
    pub max_delay_secs: u64,
}

impl Default for PollConfig {
    fn default() -> Self {
        let p = PollPolicy::default();
        Self {
            max_attempts: p.max_attempts,
            base_delay_secs: p.base_delay.as_secs_f64(),
            max_delay_secs: p.max_delay.as_secs(),
        }
    }
}

impl PollConfig {
    pub fn policy(&self) -> PollPolicy {
        let fallback = PollPolicy::default();
        PollPolicy {
            max_attempts: self.max_attempts,
            base_delay: Duration::try_from_secs_f64(self.base_delay_secs)
                .unwrap_or(fallback.base_delay),
            max_delay: Duration::from_secs(self.max_delay_secs),
        }
    }
}

/// Global configuration loaded from `~/.config/mcfetch/config.toml`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct McfetchConfig {
    /// API root without `/v1`, e.g. `https://rancher.example/api`.
    #[serde(default)]
    pub base_url: Option<String>,
    /// Where archives are written when the command line names no directory.
    #[serde(default)]
    pub download_dir: Option<PathBuf>,
    #[serde(default)]
    pub log_level: LogLevel,
    /// Log to the XDG state file instead of stderr.
    #[serde(default)]
    pub log_to_file: bool,
    /// TCP/TLS connect timeout per request.
    #[serde(default = "default_connect_timeout_secs")]
    pub connect_timeout_secs: u64,
    /// Whole-request timeout; 0 disables it.
    #[serde(default = "default_request_timeout_secs")]
    pub request_timeout_secs: u64,
    /// Optional poll policy; if missing, built-in defaults are used.
    #[serde(default)]
    pub poll: Option<PollConfig>,
}

fn default_connect_timeout_secs() -> u64 {
    ApiOptions::default().connect_timeout.as_secs()
}

fn default_request_timeout_secs() -> u64 {
    ApiOptions::default().timeout.map_or(0, |t| t.as_secs())
}

impl Default for McfetchConfig {
    fn default() -> Self {
        Self {
            base_url: None,
            download_dir: None,
            log_level: LogLevel::default(),
            log_to_file: false,
            connect_timeout_secs: default_connect_timeout_secs(),
            request_timeout_secs: default_request_timeout_secs(),
            poll: None,
        }
    }
}

impl McfetchConfig {
    pub fn api_options(&self) -> ApiOptions {
        ApiOptions {
            connect_timeout: Duration::from_secs(self.connect_timeout_secs),
            timeout: (self.request_timeout_secs > 0)
                .then(|| Duration::from_secs(self.request_timeout_secs)),
        }
    }

    pub fn poll_policy(&self) -> PollPolicy {
        self.poll.clone().unwrap_or_default().policy()
    }

    pub fn log_config(&self) -> LogConfig {
        LogConfig::new(self.log_level)
    }
}

pub fn config_path() -> Result<PathBuf> {
    let xdg_dirs = xdg::BaseDirectories::with_prefix("mcfetch")?;
    Ok(xdg_dirs.place_config_file("config.toml")?)
}

/// Load configuration from disk, creating a default file if none exists.
pub fn load_or_init() -> Result<McfetchConfig> {
    load_or_init_at(&config_path()?)
}

pub fn load_or_init_at(path: &Path) -> Result<McfetchConfig> {
    if !path.exists() {
        let default_cfg = McfetchConfig::default();
        let toml = toml::to_string_pretty(&default_cfg)?;
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent)?;
        }
        fs::write(path, toml).with_context(|| format!("write {}", path.display()))?;
        return Ok(default_cfg);
    }

    let data = fs::read_to_string(path).with_context(|| format!("read {}", path.display()))?;
    let cfg: McfetchConfig =
        toml::from_str(&data).with_context(|| format!("parse {}", path.display()))?;
    Ok(cfg)
}
