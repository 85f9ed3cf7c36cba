//! Endpoint Limits
//!
//! Static quota table. Server-side categories mirror the quotas of the
//! wrapped APIs; public categories cap what a single client may ask of the
//! proxy.

use std::collections::HashMap;
use std::fmt;
use std::time::Duration;

use serde::Serialize;

// == Endpoint Category ==
/// Logical endpoint group. Several routes may share one bucket.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum EndpointCategory {
    /// Calls from this server to the GitHub REST API
    GithubServer,
    /// Calls from this server to Jira
    JiraServer,
    /// Public GitHub proxy routes
    PublicGithub,
    /// Public Jira proxy routes
    PublicJira,
    /// Public health check
    PublicHealth,
}

impl EndpointCategory {
    pub const ALL: [EndpointCategory; 5] = [
        EndpointCategory::GithubServer,
        EndpointCategory::JiraServer,
        EndpointCategory::PublicGithub,
        EndpointCategory::PublicJira,
        EndpointCategory::PublicHealth,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            EndpointCategory::GithubServer => "github",
            EndpointCategory::JiraServer => "jira",
            EndpointCategory::PublicGithub => "api:github",
            EndpointCategory::PublicJira => "api:jira",
            EndpointCategory::PublicHealth => "api:health",
        }
    }
}

impl fmt::Display for EndpointCategory {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

// == Endpoint Limit ==
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct EndpointLimit {
    pub max_requests: u32,
    pub window: Duration,
}

impl EndpointLimit {
    pub const fn new(max_requests: u32, window: Duration) -> Self {
        Self {
            max_requests,
            window,
        }
    }

    pub const fn per_minute(max_requests: u32) -> Self {
        Self::new(max_requests, Duration::from_secs(60))
    }

    pub const fn per_hour(max_requests: u32) -> Self {
        Self::new(max_requests, Duration::from_secs(3600))
    }

    pub fn window_ms(&self) -> u64 {
        self.window.as_millis() as u64
    }
}

// == Limit Table ==
/// Category → limit mapping, fixed once built.
#[derive(Debug, Clone)]
pub struct LimitTable {
    limits: HashMap<EndpointCategory, EndpointLimit>,
}

impl LimitTable {
    /// Builds a table from the defaults, replacing any category in
    /// `overrides`.
    pub fn with_overrides(
        overrides: impl IntoIterator<Item = (EndpointCategory, EndpointLimit)>,
    ) -> Self {
        let mut table = Self::default();
        table.limits.extend(overrides);
        table
    }

    pub fn get(&self, category: EndpointCategory) -> EndpointLimit {
        self.limits
            .get(&category)
            .copied()
            .unwrap_or_else(|| default_limit(category))
    }
}

fn default_limit(category: EndpointCategory) -> EndpointLimit {
    match category {
        EndpointCategory::GithubServer => EndpointLimit::per_hour(5000),
        EndpointCategory::JiraServer => EndpointLimit::per_minute(100),
        EndpointCategory::PublicGithub => EndpointLimit::per_minute(30),
        EndpointCategory::PublicJira => EndpointLimit::per_minute(20),
        EndpointCategory::PublicHealth => EndpointLimit::per_minute(60),
    }
}

impl Default for LimitTable {
    fn default() -> Self {
        Self {
            limits: EndpointCategory::ALL
                .into_iter()
                .map(|c| (c, default_limit(c)))
                .collect(),
        }
    }
}
