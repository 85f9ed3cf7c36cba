//! quota_cache - TTL caching and per-client rate limiting for GitHub and Jira
//!
//! Every outbound call to a rate-limited service passes through a
//! [`RateLimiter`](rate_limit::RateLimiter) check and a
//! [`SharedCache::with_cache`](cache::SharedCache::with_cache) lookup before
//! the real fetch runs.

pub mod api;
pub mod cache;
pub mod clock;
pub mod config;
pub mod error;
pub mod models;
pub mod rate_limit;
pub mod tasks;
pub mod upstream;

#[cfg(test)]
mod test_support;

pub use api::AppState;
pub use config::Config;
pub use tasks::CleanupScheduler;
