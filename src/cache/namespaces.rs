//! Namespaced Cache Facades
//!
//! Thin wrappers over [`SharedCache`] that pair each resource with its key
//! builder and default TTL. They hold no logic of their own.

use std::future::Future;

use crate::cache::keys::{
    github_commits_key, github_milestones_key, github_releases_key, health_key, jira_issues_key,
    jira_project_key,
};
use crate::cache::SharedCache;

// == Resource TTLs (seconds) ==
pub const COMMITS_TTL: u64 = 5 * 60;
pub const RELEASES_TTL: u64 = 15 * 60;
pub const MILESTONES_TTL: u64 = 15 * 60;
pub const JIRA_ISSUES_TTL: u64 = 2 * 60;
pub const HEALTH_TTL: u64 = 60;

// == GitHub ==
/// Commits, releases and milestones keyed by `owner/repo`.
#[derive(Debug)]
pub struct GithubCache<V> {
    cache: SharedCache<V>,
}

impl<V> Clone for GithubCache<V> {
    fn clone(&self) -> Self {
        Self {
            cache: self.cache.clone(),
        }
    }
}

impl<V: Clone> GithubCache<V> {
    pub fn new(cache: SharedCache<V>) -> Self {
        Self { cache }
    }

    pub async fn set_commits(&self, owner: &str, repo: &str, data: V) {
        self.cache
            .set(github_commits_key(owner, repo), data, Some(COMMITS_TTL))
            .await;
    }

    pub async fn get_commits(&self, owner: &str, repo: &str) -> Option<V> {
        self.cache.get(&github_commits_key(owner, repo)).await
    }

    pub async fn commits_with<F, Fut, E>(&self, owner: &str, repo: &str, fetch: F) -> Result<V, E>
    where
        F: FnOnce() -> Fut,
        Fut: Future<Output = Result<V, E>>,
    {
        let key = github_commits_key(owner, repo);
        self.cache.with_cache(&key, Some(COMMITS_TTL), fetch).await
    }

    pub async fn set_releases(&self, owner: &str, repo: &str, data: V) {
        self.cache
            .set(github_releases_key(owner, repo), data, Some(RELEASES_TTL))
            .await;
    }

    pub async fn get_releases(&self, owner: &str, repo: &str) -> Option<V> {
        self.cache.get(&github_releases_key(owner, repo)).await
    }

    pub async fn releases_with<F, Fut, E>(&self, owner: &str, repo: &str, fetch: F) -> Result<V, E>
    where
        F: FnOnce() -> Fut,
        Fut: Future<Output = Result<V, E>>,
    {
        let key = github_releases_key(owner, repo);
        self.cache.with_cache(&key, Some(RELEASES_TTL), fetch).await
    }

    pub async fn set_milestones(&self, owner: &str, repo: &str, data: V) {
        self.cache
            .set(github_milestones_key(owner, repo), data, Some(MILESTONES_TTL))
            .await;
    }

    pub async fn get_milestones(&self, owner: &str, repo: &str) -> Option<V> {
        self.cache.get(&github_milestones_key(owner, repo)).await
    }

    pub async fn milestones_with<F, Fut, E>(
        &self,
        owner: &str,
        repo: &str,
        fetch: F,
    ) -> Result<V, E>
    where
        F: FnOnce() -> Fut,
        Fut: Future<Output = Result<V, E>>,
    {
        let key = github_milestones_key(owner, repo);
        self.cache.with_cache(&key, Some(MILESTONES_TTL), fetch).await
    }
}

// == Jira ==
/// Issues and project metadata keyed by project key.
#[derive(Debug)]
pub struct JiraCache<V> {
    cache: SharedCache<V>,
}

impl<V> Clone for JiraCache<V> {
    fn clone(&self) -> Self {
        Self {
            cache: self.cache.clone(),
        }
    }
}

impl<V: Clone> JiraCache<V> {
    pub fn new(cache: SharedCache<V>) -> Self {
        Self { cache }
    }

    pub async fn set_issues(&self, project_key: &str, data: V) {
        self.cache
            .set(jira_issues_key(project_key), data, Some(JIRA_ISSUES_TTL))
            .await;
    }

    pub async fn get_issues(&self, project_key: &str) -> Option<V> {
        self.cache.get(&jira_issues_key(project_key)).await
    }

    pub async fn issues_with<F, Fut, E>(&self, project_key: &str, fetch: F) -> Result<V, E>
    where
        F: FnOnce() -> Fut,
        Fut: Future<Output = Result<V, E>>,
    {
        let key = jira_issues_key(project_key);
        self.cache.with_cache(&key, Some(JIRA_ISSUES_TTL), fetch).await
    }

    /// Project metadata uses the store's default TTL.
    pub async fn set_project(&self, project_key: &str, data: V) {
        self.cache.set(jira_project_key(project_key), data, None).await;
    }

    pub async fn get_project(&self, project_key: &str) -> Option<V> {
        self.cache.get(&jira_project_key(project_key)).await
    }

    pub async fn project_with<F, Fut, E>(&self, project_key: &str, fetch: F) -> Result<V, E>
    where
        F: FnOnce() -> Fut,
        Fut: Future<Output = Result<V, E>>,
    {
        let key = jira_project_key(project_key);
        self.cache.with_cache(&key, None, fetch).await
    }
}

// == Health ==
#[derive(Debug)]
pub struct HealthCache<V> {
    cache: SharedCache<V>,
}

impl<V> Clone for HealthCache<V> {
    fn clone(&self) -> Self {
        Self {
            cache: self.cache.clone(),
        }
    }
}

impl<V: Clone> HealthCache<V> {
    pub fn new(cache: SharedCache<V>) -> Self {
        Self { cache }
    }

    pub async fn set(&self, service: &str, data: V) {
        self.cache.set(health_key(service), data, Some(HEALTH_TTL)).await;
    }

    pub async fn get(&self, service: &str) -> Option<V> {
        self.cache.get(&health_key(service)).await
    }

    pub async fn check_with<F, Fut, E>(&self, service: &str, fetch: F) -> Result<V, E>
    where
        F: FnOnce() -> Fut,
        Fut: Future<Output = Result<V, E>>,
    {
        let key = health_key(service);
        self.cache.with_cache(&key, Some(HEALTH_TTL), fetch).await
    }
}
