//! Upstream Module
//!
//! The real integrations behind the cache. Responses are passed through as
//! opaque JSON; shaping them for display is left to consumers.

mod client;

use async_trait::async_trait;
use serde_json::Value;
use thiserror::Error;

pub use client::HttpUpstream;

// == Upstream Error ==
#[derive(Error, Debug)]
pub enum UpstreamError {
    /// Transport failure or undecodable body
    #[error("request to {service} failed: {source}")]
    Request {
        service: &'static str,
        #[source]
        source: reqwest::Error,
    },

    /// Non-success HTTP status from the upstream
    #[error("{service} responded with status {status}")]
    Status { service: &'static str, status: u16 },

    /// Integration has no base URL or credentials configured
    #[error("{0} integration is not configured")]
    NotConfigured(&'static str),
}

// == Upstream Trait ==
/// Fetches raw resources from GitHub and Jira.
#[async_trait]
pub trait Upstream: Send + Sync {
    async fn github_commits(&self, owner: &str, repo: &str) -> Result<Value, UpstreamError>;

    async fn github_releases(&self, owner: &str, repo: &str) -> Result<Value, UpstreamError>;

    async fn github_milestones(&self, owner: &str, repo: &str) -> Result<Value, UpstreamError>;

    async fn jira_issues(&self, project_key: &str) -> Result<Value, UpstreamError>;

    async fn jira_project(&self, project_key: &str) -> Result<Value, UpstreamError>;

    /// Reachability summary for every integration.
    async fn health(&self) -> Value;
}
