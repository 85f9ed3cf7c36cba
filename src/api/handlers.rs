//! API Handlers
//!
//! Every proxied route follows the same sequence: admit the client against
//! its endpoint category, serve from cache if fresh, and only on a miss
//! spend this server's own upstream quota on a real fetch.

use std::convert::Infallible;
use std::future::Future;
use std::sync::Arc;

use axum::{
    extract::{Path, State},
    http::HeaderMap,
    Json,
};
use serde_json::Value;
use tokio::sync::RwLock;

use crate::api::ClientId;
use crate::cache::{GithubCache, HealthCache, JiraCache, SharedCache};
use crate::clock::{SharedClock, SystemClock};
use crate::config::Config;
use crate::error::{AppError, Result};
use crate::models::{HealthResponse, StatsResponse};
use crate::rate_limit::{
    rate_limit_headers, EndpointCategory, RateDecision, RateLimiter, SERVER_IDENTIFIER,
};
use crate::upstream::Upstream;

/// Application state shared across all handlers.
#[derive(Clone)]
pub struct AppState {
    pub cache: SharedCache<Value>,
    pub limiter: Arc<RwLock<RateLimiter>>,
    pub upstream: Arc<dyn Upstream>,
}

impl AppState {
    pub fn new(cache: SharedCache<Value>, limiter: RateLimiter, upstream: Arc<dyn Upstream>) -> Self {
        Self {
            cache,
            limiter: Arc::new(RwLock::new(limiter)),
            upstream,
        }
    }

    /// Builds the cache and limiter from configuration on the system clock.
    pub fn from_config(config: &Config, upstream: Arc<dyn Upstream>) -> Self {
        Self::with_clock(config, upstream, Arc::new(SystemClock))
    }

    /// Same as [`AppState::from_config`] with both stores reading `clock`.
    pub fn with_clock(config: &Config, upstream: Arc<dyn Upstream>, clock: SharedClock) -> Self {
        let cache = SharedCache::with_clock(config.default_ttl, clock.clone());
        let limiter = RateLimiter::with_clock(config.limits.clone(), clock);
        Self::new(cache, limiter, upstream)
    }

    pub fn github(&self) -> GithubCache<Value> {
        GithubCache::new(self.cache.clone())
    }

    pub fn jira(&self) -> JiraCache<Value> {
        JiraCache::new(self.cache.clone())
    }

    pub fn health(&self) -> HealthCache<Value> {
        HealthCache::new(self.cache.clone())
    }

    // == Admission ==
    /// Counts a client request, failing with 429 details when denied.
    pub async fn admit(&self, client: &str, category: EndpointCategory) -> Result<RateDecision> {
        let mut limiter = self.limiter.write().await;
        let decision = limiter.check(client, category);

        if decision.allowed {
            Ok(decision)
        } else {
            Err(AppError::RateLimited {
                category,
                limit: limiter.limits().get(category),
                decision,
            })
        }
    }

    /// Spends one unit of this server's quota with an upstream.
    async fn reserve_upstream(&self, category: EndpointCategory) -> Result<()> {
        let decision = self.limiter.write().await.check(SERVER_IDENTIFIER, category);

        if decision.allowed {
            Ok(())
        } else {
            Err(AppError::UpstreamQuota { category, decision })
        }
    }
}

/// Repo owners, repo names and project keys: letters, digits, `-`, `_`, `.`.
fn validate_segment(kind: &str, value: &str) -> Result<()> {
    let valid = !value.is_empty()
        && value.len() <= 100
        && value
            .chars()
            .all(|c| c.is_ascii_alphanumeric() || matches!(c, '-' | '_' | '.'));

    if valid {
        Ok(())
    } else {
        Err(AppError::InvalidRequest(format!("Invalid {kind}: '{value}'")))
    }
}

/// Handler outcome. Anything that goes wrong after admission still carries
/// the client's rate-limit headers.
pub type Proxied<T> = std::result::Result<(HeaderMap, Json<T>), (HeaderMap, AppError)>;

/// Admits `client` under `category`, then runs `serve` and attaches the
/// decision's headers to its outcome.
async fn rate_limited<T, Fut>(
    state: &AppState,
    client: &str,
    category: EndpointCategory,
    serve: Fut,
) -> Proxied<T>
where
    Fut: Future<Output = Result<T>>,
{
    // A denial renders its own headers
    let decision = state
        .admit(client, category)
        .await
        .map_err(|err| (HeaderMap::new(), err))?;
    let headers = rate_limit_headers(&decision);

    match serve.await {
        Ok(body) => Ok((headers, Json(body))),
        Err(err) => Err((headers, err)),
    }
}

/// Handler for GET /api/github/:owner/:repo/commits
pub async fn github_commits_handler(
    State(state): State<AppState>,
    ClientId(client): ClientId,
    Path((owner, repo)): Path<(String, String)>,
) -> Proxied<Value> {
    rate_limited(&state, &client, EndpointCategory::PublicGithub, async {
        validate_segment("owner", &owner)?;
        validate_segment("repo", &repo)?;

        state
            .github()
            .commits_with(&owner, &repo, || async {
                state.reserve_upstream(EndpointCategory::GithubServer).await?;
                Ok::<_, AppError>(state.upstream.github_commits(&owner, &repo).await?)
            })
            .await
    })
    .await
}

/// Handler for GET /api/github/:owner/:repo/releases
pub async fn github_releases_handler(
    State(state): State<AppState>,
    ClientId(client): ClientId,
    Path((owner, repo)): Path<(String, String)>,
) -> Proxied<Value> {
    rate_limited(&state, &client, EndpointCategory::PublicGithub, async {
        validate_segment("owner", &owner)?;
        validate_segment("repo", &repo)?;

        state
            .github()
            .releases_with(&owner, &repo, || async {
                state.reserve_upstream(EndpointCategory::GithubServer).await?;
                Ok::<_, AppError>(state.upstream.github_releases(&owner, &repo).await?)
            })
            .await
    })
    .await
}

/// Handler for GET /api/github/:owner/:repo/milestones
pub async fn github_milestones_handler(
    State(state): State<AppState>,
    ClientId(client): ClientId,
    Path((owner, repo)): Path<(String, String)>,
) -> Proxied<Value> {
    rate_limited(&state, &client, EndpointCategory::PublicGithub, async {
        validate_segment("owner", &owner)?;
        validate_segment("repo", &repo)?;

        state
            .github()
            .milestones_with(&owner, &repo, || async {
                state.reserve_upstream(EndpointCategory::GithubServer).await?;
                Ok::<_, AppError>(state.upstream.github_milestones(&owner, &repo).await?)
            })
            .await
    })
    .await
}

/// Handler for GET /api/jira/:project/issues
pub async fn jira_issues_handler(
    State(state): State<AppState>,
    ClientId(client): ClientId,
    Path(project): Path<String>,
) -> Proxied<Value> {
    rate_limited(&state, &client, EndpointCategory::PublicJira, async {
        validate_segment("project key", &project)?;

        state
            .jira()
            .issues_with(&project, || async {
                state.reserve_upstream(EndpointCategory::JiraServer).await?;
                Ok::<_, AppError>(state.upstream.jira_issues(&project).await?)
            })
            .await
    })
    .await
}

/// Handler for GET /api/jira/:project
pub async fn jira_project_handler(
    State(state): State<AppState>,
    ClientId(client): ClientId,
    Path(project): Path<String>,
) -> Proxied<Value> {
    rate_limited(&state, &client, EndpointCategory::PublicJira, async {
        validate_segment("project key", &project)?;

        state
            .jira()
            .project_with(&project, || async {
                state.reserve_upstream(EndpointCategory::JiraServer).await?;
                Ok::<_, AppError>(state.upstream.jira_project(&project).await?)
            })
            .await
    })
    .await
}

/// Handler for GET /api/health
///
/// Upstream reachability is probed at most once per health TTL.
pub async fn health_handler(
    State(state): State<AppState>,
    ClientId(client): ClientId,
) -> Proxied<HealthResponse> {
    rate_limited(&state, &client, EndpointCategory::PublicHealth, async {
        let services = state
            .health()
            .check_with("upstream", || async {
                Ok::<_, Infallible>(state.upstream.health().await)
            })
            .await
            .unwrap_or_else(|never| match never {});

        Ok::<_, AppError>(HealthResponse::from_services(services))
    })
    .await
}

/// Handler for GET /stats
pub async fn stats_handler(State(state): State<AppState>) -> Json<StatsResponse> {
    let stats = state.cache.stats().await;
    let buckets = state.limiter.read().await.bucket_count();

    Json(StatsResponse::new(&stats, buckets))
}
