//! Rate-limit response headers.

use axum::http::{header::RETRY_AFTER, HeaderMap, HeaderName, HeaderValue};

use crate::rate_limit::RateDecision;

pub const X_RATELIMIT_LIMIT: HeaderName = HeaderName::from_static("x-ratelimit-limit");
pub const X_RATELIMIT_REMAINING: HeaderName = HeaderName::from_static("x-ratelimit-remaining");
pub const X_RATELIMIT_RESET: HeaderName = HeaderName::from_static("x-ratelimit-reset");

/// Informational headers for every checked response, plus `Retry-After`
/// when the request was denied.
pub fn rate_limit_headers(decision: &RateDecision) -> HeaderMap {
    let mut headers = HeaderMap::new();

    headers.insert(X_RATELIMIT_LIMIT, HeaderValue::from(decision.limit));
    headers.insert(X_RATELIMIT_REMAINING, HeaderValue::from(decision.remaining));
    headers.insert(X_RATELIMIT_RESET, HeaderValue::from(decision.reset_at_secs()));

    if let Some(secs) = decision.retry_after_secs {
        headers.insert(RETRY_AFTER, HeaderValue::from(secs));
    }

    headers
}
