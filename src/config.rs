//! Configuration Module
//!
//! Loads server configuration from environment variables once at startup.

use std::env;
use std::str::FromStr;
use std::time::Duration;

use crate::rate_limit::LimitTable;

pub const DEFAULT_GITHUB_API_URL: &str = "https://api.github.com";

/// Server configuration parameters.
///
/// All values can be configured via environment variables with sensible defaults.
#[derive(Debug, Clone)]
pub struct Config {
    /// Default TTL in seconds for entries without explicit TTL
    pub default_ttl: u64,
    /// HTTP server port
    pub server_port: u16,
    /// Seconds between expired-entry sweeps
    pub cache_sweep_interval: u64,
    /// Seconds between idle rate-limit bucket sweeps
    pub rate_limit_sweep_interval: u64,
    /// Per-category quotas
    pub limits: LimitTable,
    pub upstream: UpstreamConfig,
}

/// Where and how to reach GitHub and Jira.
#[derive(Debug, Clone)]
pub struct UpstreamConfig {
    pub github_api_url: String,
    pub github_token: Option<String>,
    /// Jira routes answer 503 while this is unset
    pub jira_base_url: Option<String>,
    pub jira_email: Option<String>,
    pub jira_api_token: Option<String>,
    pub timeout: Duration,
}

impl Config {
    /// Creates a new Config by loading values from environment variables.
    ///
    /// # Environment Variables
    /// - `DEFAULT_TTL` - Default TTL in seconds (default: 300)
    /// - `SERVER_PORT` - HTTP server port (default: 3000)
    /// - `CACHE_SWEEP_INTERVAL` - Cache sweep frequency in seconds (default: 600)
    /// - `RATE_LIMIT_SWEEP_INTERVAL` - Bucket sweep frequency in seconds (default: 300)
    /// - `GITHUB_API_URL`, `GITHUB_TOKEN`
    /// - `JIRA_BASE_URL`, `JIRA_EMAIL`, `JIRA_API_TOKEN`
    /// - `UPSTREAM_TIMEOUT` - Upstream request timeout in seconds (default: 10)
    pub fn from_env() -> Self {
        let defaults = Self::default();

        Self {
            default_ttl: parse_var("DEFAULT_TTL")
                .filter(|ttl| *ttl > 0)
                .unwrap_or(defaults.default_ttl),
            server_port: parse_var("SERVER_PORT").unwrap_or(defaults.server_port),
            cache_sweep_interval: parse_var("CACHE_SWEEP_INTERVAL")
                .filter(|secs| *secs > 0)
                .unwrap_or(defaults.cache_sweep_interval),
            rate_limit_sweep_interval: parse_var("RATE_LIMIT_SWEEP_INTERVAL")
                .filter(|secs| *secs > 0)
                .unwrap_or(defaults.rate_limit_sweep_interval),
            limits: defaults.limits,
            upstream: UpstreamConfig {
                github_api_url: string_var("GITHUB_API_URL")
                    .unwrap_or(defaults.upstream.github_api_url),
                github_token: string_var("GITHUB_TOKEN"),
                jira_base_url: string_var("JIRA_BASE_URL"),
                jira_email: string_var("JIRA_EMAIL"),
                jira_api_token: string_var("JIRA_API_TOKEN"),
                timeout: parse_var::<u64>("UPSTREAM_TIMEOUT")
                    .filter(|secs| *secs > 0)
                    .map(Duration::from_secs)
                    .unwrap_or(defaults.upstream.timeout),
            },
        }
    }
}

fn parse_var<T: FromStr>(name: &str) -> Option<T> {
    env::var(name).ok().and_then(|v| v.trim().parse().ok())
}

fn string_var(name: &str) -> Option<String> {
    env::var(name)
        .ok()
        .map(|v| v.trim().to_string())
        .filter(|v| !v.is_empty())
}

impl Default for Config {
    fn default() -> Self {
        Self {
            default_ttl: 300,
            server_port: 3000,
            cache_sweep_interval: 600,
            rate_limit_sweep_interval: 300,
            limits: LimitTable::default(),
            upstream: UpstreamConfig::default(),
        }
    }
}

impl Default for UpstreamConfig {
    fn default() -> Self {
        Self {
            github_api_url: DEFAULT_GITHUB_API_URL.to_string(),
            github_token: None,
            jira_base_url: None,
            jira_email: None,
            jira_api_token: None,
            timeout: Duration::from_secs(10),
        }
    }
}
