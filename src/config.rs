//! Layered configuration: defaults, then the TOML file, then `LOGSCOPE_*`
//! environment variables, then command line flags.

use std::env;
use std::fs;
use std::num::NonZeroU32;
use std::path::{Path, PathBuf};
use std::time::Duration;

use serde::Deserialize;
use thiserror::Error;

use logscope_types::{DEFAULT_PAGE_SIZE, Interval};

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("failed reading {path}: {source}")]
    Read {
        path: PathBuf,
        source: std::io::Error,
    },

    #[error("failed parsing {path}: {source}")]
    Parse {
        path: PathBuf,
        source: toml::de::Error,
    },

    #[error("bad {key} in {origin}: {message} (value={value})")]
    Invalid {
        key: &'static str,
        origin: &'static str,
        value: String,
        message: String,
    },
}

type Result<T> = std::result::Result<T, ConfigError>;

#[derive(Debug, Clone, PartialEq)]
pub struct Config {
    /// Backend base URL, without trailing slash
    pub base_url: String,
    pub page_size: NonZeroU32,
    pub interval: Interval,
    pub request_timeout: Duration,
    /// How often the UI redraws without input
    pub tick_rate: Duration,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            base_url: "http://127.0.0.1:5000".to_string(),
            page_size: NonZeroU32::new(DEFAULT_PAGE_SIZE).unwrap_or(NonZeroU32::MIN),
            interval: Interval::Daily,
            request_timeout: Duration::from_secs(10),
            tick_rate: Duration::from_millis(250),
        }
    }
}

/// Optional values from one configuration layer
#[derive(Debug, Default, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct ConfigOverrides {
    pub base_url: Option<String>,
    pub page_size: Option<u32>,
    pub interval: Option<String>,
    pub request_timeout: Option<String>,
    pub tick_rate_ms: Option<u64>,
}

impl Config {
    /// Load defaults, file and environment. `explicit` must exist when given.
    pub fn load(explicit: Option<&Path>) -> Result<Self> {
        Self::load_with(explicit, |key| env::var(key).ok())
    }

    fn load_with(explicit: Option<&Path>, var: impl Fn(&str) -> Option<String>) -> Result<Self> {
        let mut cfg = Self::default();

        let (path, required) = match explicit {
            Some(path) => (Some(path.to_path_buf()), true),
            None => (default_config_path(&var), false),
        };
        if let Some(path) = path {
            if let Some(file) = load_file_overrides(&path, required)? {
                tracing::debug!(path = %path.display(), "loaded config file");
                cfg.apply(file, "config file")?;
            }
        }

        cfg.apply(env_overrides(&var)?, "environment")?;
        Ok(cfg)
    }

    /// Apply every value present in `overrides`
    pub fn apply(&mut self, overrides: ConfigOverrides, origin: &'static str) -> Result<()> {
        if let Some(v) = overrides.base_url {
            let trimmed = v.trim().trim_end_matches('/');
            if !(trimmed.starts_with("http://") || trimmed.starts_with("https://")) {
                return Err(ConfigError::Invalid {
                    key: "base_url",
                    origin,
                    message: "expected an http:// or https:// URL".to_string(),
                    value: v,
                });
            }
            self.base_url = trimmed.to_string();
        }
        if let Some(v) = overrides.page_size {
            self.page_size = NonZeroU32::new(v).ok_or_else(|| ConfigError::Invalid {
                key: "page_size",
                origin,
                message: "must be at least 1".to_string(),
                value: v.to_string(),
            })?;
        }
        if let Some(v) = overrides.interval {
            self.interval = v.parse().map_err(|message| ConfigError::Invalid {
                key: "interval",
                origin,
                message,
                value: v.clone(),
            })?;
        }
        if let Some(v) = overrides.request_timeout {
            self.request_timeout =
                humantime::parse_duration(&v).map_err(|e| ConfigError::Invalid {
                    key: "request_timeout",
                    origin,
                    message: e.to_string(),
                    value: v.clone(),
                })?;
        }
        if let Some(v) = overrides.tick_rate_ms {
            if v == 0 {
                return Err(ConfigError::Invalid {
                    key: "tick_rate_ms",
                    origin,
                    message: "must be at least 1".to_string(),
                    value: v.to_string(),
                });
            }
            self.tick_rate = Duration::from_millis(v);
        }
        Ok(())
    }
}

fn default_config_path(var: &impl Fn(&str) -> Option<String>) -> Option<PathBuf> {
    if let Some(path) = var("LOGSCOPE_CONFIG") {
        return Some(PathBuf::from(path));
    }

    let config_home = var("XDG_CONFIG_HOME")
        .map(PathBuf::from)
        .or_else(|| var("HOME").map(|home| PathBuf::from(home).join(".config")))?;
    Some(config_home.join("logscope/config.toml"))
}

fn load_file_overrides(path: &Path, required: bool) -> Result<Option<ConfigOverrides>> {
    if !required && !path.exists() {
        return Ok(None);
    }

    let raw = fs::read_to_string(path).map_err(|source| ConfigError::Read {
        path: path.to_path_buf(),
        source,
    })?;
    let parsed = toml::from_str(&raw).map_err(|source| ConfigError::Parse {
        path: path.to_path_buf(),
        source,
    })?;
    Ok(Some(parsed))
}

fn env_overrides(var: &impl Fn(&str) -> Option<String>) -> Result<ConfigOverrides> {
    let page_size = match var("LOGSCOPE_PAGE_SIZE") {
        Some(v) => Some(v.trim().parse::<u32>().map_err(|e| ConfigError::Invalid {
            key: "page_size",
            origin: "environment",
            message: e.to_string(),
            value: v.clone(),
        })?),
        None => None,
    };

    Ok(ConfigOverrides {
        base_url: var("LOGSCOPE_BASE_URL"),
        page_size,
        interval: var("LOGSCOPE_INTERVAL"),
        request_timeout: var("LOGSCOPE_TIMEOUT"),
        tick_rate_ms: None,
    })
}
