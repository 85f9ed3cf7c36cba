//! Response DTOs for the proxy API
//!
//! Upstream payloads are returned as-is; these cover the bodies the proxy
//! produces itself.

use serde::Serialize;
use serde_json::Value;

use crate::cache::CacheStats;
use crate::rate_limit::EndpointLimit;

/// Body of a 429 response.
#[derive(Debug, Clone, Serialize)]
pub struct RateLimitedResponse {
    /// Always false
    pub success: bool,
    /// Machine-readable error code
    pub error: String,
    pub message: String,
    /// Seconds until the window reopens
    pub retry_after: u64,
    /// Current timestamp in ISO 8601 format
    pub timestamp: String,
}

impl RateLimitedResponse {
    pub fn new(limit: &EndpointLimit, retry_after: u64) -> Self {
        Self {
            success: false,
            error: "rate_limit_exceeded".to_string(),
            message: format!(
                "Rate limit exceeded: {} requests per {} seconds",
                limit.max_requests,
                limit.window.as_secs()
            ),
            retry_after,
            timestamp: chrono::Utc::now().to_rfc3339(),
        }
    }
}

/// Response body for the health endpoint (GET /api/health)
#[derive(Debug, Clone, Serialize)]
pub struct HealthResponse {
    /// "healthy", or "degraded" when a configured integration is unreachable
    pub status: String,
    /// Current timestamp in ISO 8601 format
    pub timestamp: String,
    /// Per-integration reachability, cached briefly
    pub services: Value,
}

impl HealthResponse {
    /// Derives the overall status from per-service probe results.
    ///
    /// Unconfigured services are ignored; any configured one reporting
    /// `reachable: false` degrades the whole response.
    pub fn from_services(services: Value) -> Self {
        let degraded = services.as_object().is_some_and(|services| {
            services.values().any(|probe| {
                probe["configured"].as_bool().unwrap_or(true)
                    && probe["reachable"] == Value::Bool(false)
            })
        });

        Self {
            status: if degraded { "degraded" } else { "healthy" }.to_string(),
            timestamp: chrono::Utc::now().to_rfc3339(),
            services,
        }
    }
}

/// Response body for the stats endpoint (GET /stats)
#[derive(Debug, Clone, Serialize)]
pub struct StatsResponse {
    pub hits: u64,
    pub misses: u64,
    pub expirations: u64,
    /// Current number of entries in cache
    pub total_entries: usize,
    /// Hit rate (hits / (hits + misses))
    pub hit_rate: f64,
    /// Live rate-limit buckets
    pub rate_limit_buckets: usize,
}

impl StatsResponse {
    pub fn new(stats: &CacheStats, rate_limit_buckets: usize) -> Self {
        Self {
            hits: stats.hits,
            misses: stats.misses,
            expirations: stats.expirations,
            total_entries: stats.total_entries,
            hit_rate: stats.hit_rate(),
            rate_limit_buckets,
        }
    }
}
