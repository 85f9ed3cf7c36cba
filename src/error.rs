//! Error types for the proxy server
//!
//! Provides unified error handling using thiserror.

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde_json::json;
use thiserror::Error;

use crate::models::RateLimitedResponse;
use crate::rate_limit::{rate_limit_headers, EndpointCategory, EndpointLimit, RateDecision};
use crate::upstream::UpstreamError;

// == App Error Enum ==
/// Unified error type for the HTTP layer.
#[derive(Error, Debug)]
pub enum AppError {
    /// Client exceeded its quota for an endpoint category
    #[error("Rate limit exceeded for {category}")]
    RateLimited {
        category: EndpointCategory,
        limit: EndpointLimit,
        decision: RateDecision,
    },

    /// This server exhausted its own quota with an upstream API
    #[error("Upstream quota exhausted for {category}")]
    UpstreamQuota {
        category: EndpointCategory,
        decision: RateDecision,
    },

    /// Upstream call failed
    #[error(transparent)]
    Upstream(#[from] UpstreamError),

    /// Invalid request data
    #[error("Invalid request: {0}")]
    InvalidRequest(String),
}

// == IntoResponse Implementation ==
impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        match self {
            AppError::RateLimited {
                limit, decision, ..
            } => {
                let body = RateLimitedResponse::new(&limit, decision.retry_after_secs.unwrap_or(1));
                (
                    StatusCode::TOO_MANY_REQUESTS,
                    rate_limit_headers(&decision),
                    Json(body),
                )
                    .into_response()
            }
            AppError::UpstreamQuota { category, decision } => {
                let retry_after = decision.retry_after_secs.unwrap_or(1);
                let body = Json(json!({
                    "error": format!("Upstream quota exhausted for {category}, retry in {retry_after}s")
                }));
                (
                    StatusCode::SERVICE_UNAVAILABLE,
                    [(axum::http::header::RETRY_AFTER, retry_after.to_string())],
                    body,
                )
                    .into_response()
            }
            AppError::Upstream(err) => {
                let status = match err {
                    UpstreamError::NotConfigured(_) => StatusCode::SERVICE_UNAVAILABLE,
                    _ => StatusCode::BAD_GATEWAY,
                };
                (status, Json(json!({ "error": err.to_string() }))).into_response()
            }
            AppError::InvalidRequest(msg) => {
                (StatusCode::BAD_REQUEST, Json(json!({ "error": msg }))).into_response()
            }
        }
    }
}

// == Result Type Alias ==
/// Convenience Result type for the HTTP layer.
pub type Result<T> = std::result::Result<T, AppError>;
