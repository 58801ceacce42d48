//! Configuration management for the V2EX client
//!
//! This module handles loading and validating configuration from environment variables
//! and TOML files.

use anyhow::{Context, Result};
use regex::Regex;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use std::sync::LazyLock;
use std::time::Duration;

/// Browser User-Agent sent to the site; some pages reject unknown agents.
pub const DEFAULT_USER_AGENT: &str = "Mozilla/5.0 (Macintosh; Intel Mac OS X 10_15_7) AppleWebKit/537.36 (KHTML, like Gecko) Chrome/137.0.0.0 Safari/537.36";

/// Accepted proxy URL shape: scheme://host:port
static PROXY_URL_REGEX: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^(http|https|socks|socks5|socks5h)://(.+):(\d+)$").unwrap());

/// Main configuration structure
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Config {
    /// Target site configuration
    pub site: SiteConfig,

    /// Outbound proxy (optional)
    #[serde(default)]
    pub proxy: Option<ProxyConfig>,

    /// Session state configuration
    pub session: SessionConfig,

    /// Logging configuration
    pub logging: LoggingConfig,
}

/// Target site configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SiteConfig {
    /// Origin every relative path is resolved against
    pub base_url: String,

    /// Domain that receives the session credential (subdomains included)
    pub home_domain: String,

    /// User agent string
    pub user_agent: String,

    /// Request timeout in seconds
    pub request_timeout_secs: u64,

    /// External search API endpoint
    pub search_url: String,
}

/// Outbound proxy configuration
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct ProxyConfig {
    /// Proxy URL, e.g. `socks5://127.0.0.1:1080`
    pub url: String,

    /// Which destinations go through the proxy
    #[serde(default)]
    pub mode: ProxyMode,
}

/// Proxy routing mode
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(tag = "type", rename_all = "lowercase")]
pub enum ProxyMode {
    /// Every request is proxied
    All,

    /// Only hosts ending with one of the suffixes are proxied
    Hosts { suffixes: Vec<String> },
}

impl Default for ProxyMode {
    fn default() -> Self {
        Self::Hosts {
            suffixes: vec!["v2ex.com".to_string()],
        }
    }
}

impl ProxyConfig {
    /// Check the URL shape accepted by the fetcher
    #[must_use]
    pub fn is_valid_url(&self) -> bool {
        PROXY_URL_REGEX.is_match(&self.url)
    }
}

/// Session state configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SessionConfig {
    /// JSON file holding the credential and notice timestamp
    pub state_path: PathBuf,

    /// Minimum seconds between two unread-message notices
    pub notice_cooldown_secs: u64,
}

/// Logging configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LoggingConfig {
    /// Log level (trace, debug, info, warn, error)
    pub level: String,

    /// Log format (text, json)
    pub format: String,
}

impl Config {
    /// Load configuration from environment variables
    pub fn from_env() -> Result<Self> {
        let defaults = Self::default();

        let base_url = std::env::var("V2EX_BASE_URL").unwrap_or(defaults.site.base_url);

        let home_domain = std::env::var("V2EX_HOME_DOMAIN").unwrap_or(defaults.site.home_domain);

        let user_agent = std::env::var("V2EX_USER_AGENT").unwrap_or(defaults.site.user_agent);

        let request_timeout_secs = std::env::var("V2EX_REQUEST_TIMEOUT")
            .ok()
            .and_then(|v| v.parse::<u64>().ok())
            .unwrap_or(defaults.site.request_timeout_secs);

        let search_url = std::env::var("V2EX_SEARCH_URL").unwrap_or(defaults.site.search_url);

        let proxy = std::env::var("V2EX_PROXY_URL")
            .ok()
            .filter(|v| !v.trim().is_empty())
            .map(|url| {
                let mode = match std::env::var("V2EX_PROXY_HOSTS") {
                    Ok(hosts) if hosts.trim() == "*" => ProxyMode::All,
                    Ok(hosts) => ProxyMode::Hosts {
                        suffixes: hosts
                            .split(',')
                            .map(|s| s.trim().to_string())
                            .filter(|s| !s.is_empty())
                            .collect(),
                    },
                    Err(_) => ProxyMode::default(),
                };
                ProxyConfig {
                    url: url.trim().to_string(),
                    mode,
                }
            });

        let state_path = std::env::var("V2EX_STATE_PATH")
            .map(PathBuf::from)
            .unwrap_or(defaults.session.state_path);

        let notice_cooldown_secs = std::env::var("V2EX_NOTICE_COOLDOWN")
            .ok()
            .and_then(|v| v.parse::<u64>().ok())
            .unwrap_or(defaults.session.notice_cooldown_secs);

        let log_level = std::env::var("V2EX_LOG_LEVEL").unwrap_or(defaults.logging.level);

        let log_format = std::env::var("V2EX_LOG_FORMAT").unwrap_or(defaults.logging.format);

        Ok(Self {
            site: SiteConfig {
                base_url,
                home_domain,
                user_agent,
                request_timeout_secs,
                search_url,
            },
            proxy,
            session: SessionConfig {
                state_path,
                notice_cooldown_secs,
            },
            logging: LoggingConfig {
                level: log_level,
                format: log_format,
            },
        })
    }

    /// Load configuration from a file
    pub fn from_file(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read config file: {}", path.display()))?;

        let config: Self = toml::from_str(&content)
            .with_context(|| format!("Failed to parse TOML config file: {}", path.display()))?;

        Ok(config)
    }

    /// Validate configuration values
    pub fn validate(&self) -> Result<()> {
        let base = url::Url::parse(&self.site.base_url)
            .with_context(|| format!("base_url is not a valid URL: {}", self.site.base_url))?;

        if !matches!(base.scheme(), "http" | "https") {
            anyhow::bail!("base_url must use http or https");
        }

        if self.site.home_domain.trim().is_empty() {
            anyhow::bail!("home_domain must not be empty");
        }

        if self.site.request_timeout_secs == 0 {
            anyhow::bail!("request_timeout_secs must be greater than 0");
        }

        url::Url::parse(&self.site.search_url)
            .with_context(|| format!("search_url is not a valid URL: {}", self.site.search_url))?;

        if let Some(proxy) = &self.proxy {
            if !proxy.is_valid_url() {
                anyhow::bail!("proxy url must look like scheme://host:port, got {}", proxy.url);
            }
        }

        Ok(())
    }

    /// Get request timeout as Duration
    #[must_use]
    pub fn request_timeout(&self) -> Duration {
        Duration::from_secs(self.site.request_timeout_secs)
    }

    /// Get unread-notice cooldown as Duration
    #[must_use]
    pub fn notice_cooldown(&self) -> Duration {
        Duration::from_secs(self.session.notice_cooldown_secs)
    }
}

impl Default for Config {
    fn default() -> Self {
        Self {
            site: SiteConfig {
                base_url: String::from("https://www.v2ex.com"),
                home_domain: String::from("v2ex.com"),
                user_agent: String::from(DEFAULT_USER_AGENT),
                request_timeout_secs: 15,
                search_url: String::from("https://www.sov2ex.com/api/search"),
            },
            proxy: None,
            session: SessionConfig {
                state_path: PathBuf::from("data/session.json"),
                notice_cooldown_secs: 300,
            },
            logging: LoggingConfig {
                level: String::from("info"),
                format: String::from("text"),
            },
        }
    }
}
