//! Cache Key Builders
//!
//! Every key the proxy writes is composed here so call sites cannot drift
//! from the shared `service:resource:identifier` layout.

/// GitHub key prefix
const GITHUB_PREFIX: &str = "github";

/// Jira key prefix
const JIRA_PREFIX: &str = "jira";

/// Health check key prefix
const HEALTH_PREFIX: &str = "health";

fn repo_key(resource: &str, owner: &str, repo: &str) -> String {
    format!("{}:{}:{}/{}", GITHUB_PREFIX, resource, owner, repo)
}

/// `github:commits:{owner}/{repo}`
pub fn github_commits_key(owner: &str, repo: &str) -> String {
    repo_key("commits", owner, repo)
}

/// `github:releases:{owner}/{repo}`
pub fn github_releases_key(owner: &str, repo: &str) -> String {
    repo_key("releases", owner, repo)
}

/// `github:milestones:{owner}/{repo}`
pub fn github_milestones_key(owner: &str, repo: &str) -> String {
    repo_key("milestones", owner, repo)
}

/// `jira:issues:{project}`
pub fn jira_issues_key(project_key: &str) -> String {
    format!("{}:issues:{}", JIRA_PREFIX, project_key)
}

/// `jira:project:{project}`
pub fn jira_project_key(project_key: &str) -> String {
    format!("{}:project:{}", JIRA_PREFIX, project_key)
}

/// `health:{service}`
pub fn health_key(service: &str) -> String {
    format!("{}:{}", HEALTH_PREFIX, service)
}
