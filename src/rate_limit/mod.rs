//! Rate Limit Module
//!
//! Per-client admission control for the proxy and per-server quota tracking
//! for the upstream APIs.

mod headers;
mod limiter;
mod limits;

pub use headers::{rate_limit_headers, X_RATELIMIT_LIMIT, X_RATELIMIT_REMAINING, X_RATELIMIT_RESET};
pub use limiter::{RateDecision, RateLimiter, RateWindow};
pub use limits::{EndpointCategory, EndpointLimit, LimitTable};

/// Identifier used for this server's own upstream quota buckets
pub const SERVER_IDENTIFIER: &str = "server";
