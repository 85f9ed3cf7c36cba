//! reqwest-backed [`Upstream`] implementation.

use async_trait::async_trait;
use reqwest::{header, Client, RequestBuilder};
use serde_json::{json, Value};
use tracing::{debug, warn};

use crate::config::UpstreamConfig;
use crate::upstream::{Upstream, UpstreamError};

const GITHUB: &str = "github";
const JIRA: &str = "jira";
const USER_AGENT: &str = concat!("quota_cache/", env!("CARGO_PKG_VERSION"));

// == HTTP Upstream ==
#[derive(Debug, Clone)]
pub struct HttpUpstream {
    client: Client,
    config: UpstreamConfig,
}

impl HttpUpstream {
    pub fn new(config: UpstreamConfig) -> Result<Self, UpstreamError> {
        let client = Client::builder()
            .user_agent(USER_AGENT)
            .timeout(config.timeout)
            .build()
            .map_err(|source| UpstreamError::Request {
                service: "client",
                source,
            })?;

        Ok(Self { client, config })
    }

    fn github_get(&self, path: &str) -> RequestBuilder {
        let url = format!(
            "{}/{}",
            self.config.github_api_url.trim_end_matches('/'),
            path.trim_start_matches('/')
        );

        let request = self
            .client
            .get(url)
            .header(header::ACCEPT, "application/vnd.github+json");

        match &self.config.github_token {
            Some(token) => request.bearer_auth(token),
            None => request,
        }
    }

    fn jira_get(&self, path: &str) -> Result<RequestBuilder, UpstreamError> {
        let base = self
            .config
            .jira_base_url
            .as_deref()
            .ok_or(UpstreamError::NotConfigured(JIRA))?;

        let url = format!(
            "{}/{}",
            base.trim_end_matches('/'),
            path.trim_start_matches('/')
        );
        let request = self.client.get(url).header(header::ACCEPT, "application/json");

        Ok(match (&self.config.jira_email, &self.config.jira_api_token) {
            (Some(email), Some(token)) => request.basic_auth(email, Some(token)),
            _ => request,
        })
    }

    async fn send_json(service: &'static str, request: RequestBuilder) -> Result<Value, UpstreamError> {
        let response = request
            .send()
            .await
            .map_err(|source| UpstreamError::Request { service, source })?;

        let status = response.status();
        if !status.is_success() {
            warn!(service, status = status.as_u16(), "upstream returned an error status");
            return Err(UpstreamError::Status {
                service,
                status: status.as_u16(),
            });
        }

        debug!(service, status = status.as_u16(), "upstream request succeeded");
        response
            .json::<Value>()
            .await
            .map_err(|source| UpstreamError::Request { service, source })
    }

    async fn probe(&self, service: &'static str, request: Result<RequestBuilder, UpstreamError>) -> Value {
        let request = match request {
            Ok(request) => request,
            Err(_) => return json!({ "configured": false, "reachable": false }),
        };

        let reachable = Self::send_json(service, request).await.is_ok();
        json!({ "configured": true, "reachable": reachable })
    }
}

#[async_trait]
impl Upstream for HttpUpstream {
    async fn github_commits(&self, owner: &str, repo: &str) -> Result<Value, UpstreamError> {
        let request = self.github_get(&format!("repos/{owner}/{repo}/commits?per_page=30"));
        Self::send_json(GITHUB, request).await
    }

    async fn github_releases(&self, owner: &str, repo: &str) -> Result<Value, UpstreamError> {
        let request = self.github_get(&format!("repos/{owner}/{repo}/releases?per_page=30"));
        Self::send_json(GITHUB, request).await
    }

    async fn github_milestones(&self, owner: &str, repo: &str) -> Result<Value, UpstreamError> {
        let request = self.github_get(&format!("repos/{owner}/{repo}/milestones?state=all"));
        Self::send_json(GITHUB, request).await
    }

    async fn jira_issues(&self, project_key: &str) -> Result<Value, UpstreamError> {
        let request = self
            .jira_get("rest/api/3/search")?
            .query(&[("jql", format!("project = \"{project_key}\" ORDER BY updated DESC"))])
            .query(&[("maxResults", "50")]);
        Self::send_json(JIRA, request).await
    }

    async fn jira_project(&self, project_key: &str) -> Result<Value, UpstreamError> {
        let request = self.jira_get(&format!("rest/api/3/project/{project_key}"))?;
        Self::send_json(JIRA, request).await
    }

    async fn health(&self) -> Value {
        let github = self.probe(GITHUB, Ok(self.github_get("rate_limit"))).await;
        let jira = self.probe(JIRA, self.jira_get("rest/api/3/serverInfo")).await;

        json!({ "github": github, "jira": jira })
    }
}
