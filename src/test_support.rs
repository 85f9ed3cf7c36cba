//! Test doubles shared by unit tests.

use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};

use async_trait::async_trait;
use serde_json::{json, Value};

use crate::upstream::{Upstream, UpstreamError};

/// Upstream that answers from memory and counts calls.
#[derive(Debug, Default)]
pub struct FakeUpstream {
    calls: AtomicUsize,
    health_calls: AtomicUsize,
    fail: AtomicBool,
}

impl FakeUpstream {
    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }

    pub fn health_calls(&self) -> usize {
        self.health_calls.load(Ordering::SeqCst)
    }

    /// Makes subsequent resource fetches fail with a 500, and health probes
    /// report GitHub unreachable, until reset.
    pub fn fail_next(&self, fail: bool) {
        self.fail.store(fail, Ordering::SeqCst);
    }

    fn respond(&self, service: &'static str, resource: String) -> Result<Value, UpstreamError> {
        let n = self.calls.fetch_add(1, Ordering::SeqCst) + 1;
        if self.fail.load(Ordering::SeqCst) {
            return Err(UpstreamError::Status {
                service,
                status: 500,
            });
        }
        Ok(json!({ "resource": resource, "fetch": n }))
    }
}

#[async_trait]
impl Upstream for FakeUpstream {
    async fn github_commits(&self, owner: &str, repo: &str) -> Result<Value, UpstreamError> {
        self.respond("github", format!("commits:{owner}/{repo}"))
    }

    async fn github_releases(&self, owner: &str, repo: &str) -> Result<Value, UpstreamError> {
        self.respond("github", format!("releases:{owner}/{repo}"))
    }

    async fn github_milestones(&self, owner: &str, repo: &str) -> Result<Value, UpstreamError> {
        self.respond("github", format!("milestones:{owner}/{repo}"))
    }

    async fn jira_issues(&self, project_key: &str) -> Result<Value, UpstreamError> {
        self.respond("jira", format!("issues:{project_key}"))
    }

    async fn jira_project(&self, project_key: &str) -> Result<Value, UpstreamError> {
        self.respond("jira", format!("project:{project_key}"))
    }

    async fn health(&self) -> Value {
        self.health_calls.fetch_add(1, Ordering::SeqCst);
        let reachable = !self.fail.load(Ordering::SeqCst);
        json!({ "github": { "configured": true, "reachable": reachable } })
    }
}
