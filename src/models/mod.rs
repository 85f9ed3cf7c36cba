//! Response models for the proxy API

pub mod responses;

// Re-export commonly used types
pub use responses::{HealthResponse, RateLimitedResponse, StatsResponse};
