//! Integration Tests for API Endpoints
//!
//! Tests the full request/response cycle: rate-limit headers, 429 handling,
//! caching in front of the upstream and expiry driven by a manual clock.

use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use axum::{
    body::Body,
    http::{Request, StatusCode},
    response::Response,
    Router,
};
use quota_cache::{
    api::create_router,
    clock::ManualClock,
    config::Config,
    rate_limit::{EndpointCategory, EndpointLimit, LimitTable},
    upstream::{Upstream, UpstreamError},
    AppState,
};
use serde_json::{json, Value};
use tower::ServiceExt;

// == Helper Types ==

#[derive(Default)]
struct CountingUpstream {
    calls: AtomicUsize,
}

impl CountingUpstream {
    fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }

    fn hit(&self, resource: String) -> Result<Value, UpstreamError> {
        let n = self.calls.fetch_add(1, Ordering::SeqCst) + 1;
        Ok(json!({ "resource": resource, "fetch": n }))
    }
}

#[async_trait]
impl Upstream for CountingUpstream {
    async fn github_commits(&self, owner: &str, repo: &str) -> Result<Value, UpstreamError> {
        self.hit(format!("commits:{owner}/{repo}"))
    }

    async fn github_releases(&self, owner: &str, repo: &str) -> Result<Value, UpstreamError> {
        self.hit(format!("releases:{owner}/{repo}"))
    }

    async fn github_milestones(&self, owner: &str, repo: &str) -> Result<Value, UpstreamError> {
        self.hit(format!("milestones:{owner}/{repo}"))
    }

    async fn jira_issues(&self, project_key: &str) -> Result<Value, UpstreamError> {
        self.hit(format!("issues:{project_key}"))
    }

    async fn jira_project(&self, _project_key: &str) -> Result<Value, UpstreamError> {
        Err(UpstreamError::NotConfigured("jira"))
    }

    async fn health(&self) -> Value {
        json!({ "github": { "configured": true, "reachable": true } })
    }
}

struct TestApp {
    router: Router,
    upstream: Arc<CountingUpstream>,
    clock: Arc<ManualClock>,
}

// == Helper Functions ==

fn create_test_app(config: Config) -> TestApp {
    let upstream = Arc::new(CountingUpstream::default());
    let clock = Arc::new(ManualClock::new(1_700_000_000_000));
    let state = AppState::with_clock(&config, upstream.clone(), clock.clone());

    TestApp {
        router: create_router(state),
        upstream,
        clock,
    }
}

async fn get(app: &TestApp, uri: &str, client: &str) -> Response {
    app.router
        .clone()
        .oneshot(
            Request::builder()
                .uri(uri)
                .header("x-forwarded-for", client)
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap()
}

async fn body_to_json(response: Response) -> Value {
    let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .unwrap();
    serde_json::from_slice(&bytes).unwrap()
}

fn header(response: &Response, name: &str) -> String {
    response.headers()[name].to_str().unwrap().to_string()
}

// == Caching ==

#[tokio::test]
async fn test_commits_served_from_cache() {
    let app = create_test_app(Config::default());

    let first = get(&app, "/api/github/acme/repo/commits", "10.0.0.1").await;
    assert_eq!(first.status(), StatusCode::OK);
    let first = body_to_json(first).await;

    let second = get(&app, "/api/github/acme/repo/commits", "10.0.0.2").await;
    let second = body_to_json(second).await;

    assert_eq!(first, second);
    assert_eq!(first["resource"], "commits:acme/repo");
    assert_eq!(app.upstream.calls(), 1);
}

#[tokio::test]
async fn test_cache_entry_expires() {
    let app = create_test_app(Config::default());

    get(&app, "/api/jira/KRN/issues", "10.0.0.1").await;
    app.clock.advance(Duration::from_secs(119));
    get(&app, "/api/jira/KRN/issues", "10.0.0.1").await;
    assert_eq!(app.upstream.calls(), 1);

    app.clock.advance(Duration::from_secs(1));
    let response = get(&app, "/api/jira/KRN/issues", "10.0.0.1").await;
    assert_eq!(body_to_json(response).await["fetch"], 2);
}

#[tokio::test]
async fn test_distinct_resources_distinct_entries() {
    let app = create_test_app(Config::default());

    for uri in [
        "/api/github/acme/repo/commits",
        "/api/github/acme/repo/releases",
        "/api/github/acme/repo/milestones",
        "/api/github/acme/other/commits",
    ] {
        assert_eq!(get(&app, uri, "10.0.0.1").await.status(), StatusCode::OK);
    }

    assert_eq!(app.upstream.calls(), 4);
}

// == Rate Limiting ==

#[tokio::test]
async fn test_rate_limit_headers_on_success() {
    let app = create_test_app(Config::default());

    let response = get(&app, "/api/health", "10.0.0.1").await;

    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(header(&response, "x-ratelimit-limit"), "60");
    assert_eq!(header(&response, "x-ratelimit-remaining"), "59");
    assert_eq!(header(&response, "x-ratelimit-reset"), "1700000060");
    assert!(response.headers().get("retry-after").is_none());
}

#[tokio::test]
async fn test_rate_limit_denies_then_resets() {
    let app = create_test_app(Config::default());

    for expected_remaining in (0..20).rev() {
        let response = get(&app, "/api/jira/KRN/issues", "10.0.0.9").await;
        assert_eq!(response.status(), StatusCode::OK);
        assert_eq!(
            header(&response, "x-ratelimit-remaining"),
            expected_remaining.to_string()
        );
    }

    app.clock.advance(Duration::from_secs(15));
    let denied = get(&app, "/api/jira/KRN/issues", "10.0.0.9").await;
    assert_eq!(denied.status(), StatusCode::TOO_MANY_REQUESTS);
    assert_eq!(header(&denied, "retry-after"), "45");
    assert_eq!(header(&denied, "x-ratelimit-remaining"), "0");

    let body = body_to_json(denied).await;
    assert_eq!(body["success"], false);
    assert_eq!(body["error"], "rate_limit_exceeded");
    assert_eq!(body["retry_after"], 45);

    // Another client is unaffected
    let other = get(&app, "/api/jira/KRN/issues", "10.0.0.10").await;
    assert_eq!(other.status(), StatusCode::OK);

    app.clock.advance(Duration::from_secs(45));
    let reopened = get(&app, "/api/jira/KRN/issues", "10.0.0.9").await;
    assert_eq!(reopened.status(), StatusCode::OK);
    assert_eq!(header(&reopened, "x-ratelimit-remaining"), "19");
}

#[tokio::test]
async fn test_routes_share_category_bucket() {
    let mut config = Config::default();
    config.limits = LimitTable::with_overrides([(
        EndpointCategory::PublicGithub,
        EndpointLimit::new(2, Duration::from_secs(60)),
    )]);
    let app = create_test_app(config);

    assert_eq!(
        get(&app, "/api/github/a/b/commits", "1.1.1.1").await.status(),
        StatusCode::OK
    );
    assert_eq!(
        get(&app, "/api/github/a/b/releases", "1.1.1.1").await.status(),
        StatusCode::OK
    );
    assert_eq!(
        get(&app, "/api/github/a/b/milestones", "1.1.1.1").await.status(),
        StatusCode::TOO_MANY_REQUESTS
    );
    // Jira has its own bucket
    assert_eq!(
        get(&app, "/api/jira/KRN/issues", "1.1.1.1").await.status(),
        StatusCode::OK
    );
}

#[tokio::test]
async fn test_server_quota_exhaustion() {
    let mut config = Config::default();
    config.limits = LimitTable::with_overrides([(
        EndpointCategory::GithubServer,
        EndpointLimit::new(1, Duration::from_secs(3600)),
    )]);
    let app = create_test_app(config);

    let ok = get(&app, "/api/github/a/b/commits", "1.1.1.1").await;
    assert_eq!(ok.status(), StatusCode::OK);

    // Cached resource does not spend upstream quota
    let cached = get(&app, "/api/github/a/b/commits", "1.1.1.1").await;
    assert_eq!(cached.status(), StatusCode::OK);

    let exhausted = get(&app, "/api/github/a/b/releases", "1.1.1.1").await;
    assert_eq!(exhausted.status(), StatusCode::SERVICE_UNAVAILABLE);
    assert!(exhausted.headers().get("retry-after").is_some());
    // The client was admitted, so its own quota is still reported
    assert_eq!(header(&exhausted, "x-ratelimit-limit"), "30");
    assert_eq!(header(&exhausted, "x-ratelimit-remaining"), "27");
    assert_eq!(app.upstream.calls(), 1);
}

// == Errors ==

#[tokio::test]
async fn test_unconfigured_upstream() {
    let app = create_test_app(Config::default());

    let response = get(&app, "/api/jira/KRN", "10.0.0.1").await;
    assert_eq!(response.status(), StatusCode::SERVICE_UNAVAILABLE);
    assert_eq!(header(&response, "x-ratelimit-remaining"), "19");

    let json = body_to_json(response).await;
    assert!(json["error"].as_str().unwrap().contains("not configured"));
}

#[tokio::test]
async fn test_stats_endpoint() {
    let app = create_test_app(Config::default());

    get(&app, "/api/github/acme/repo/commits", "10.0.0.1").await;
    get(&app, "/api/github/acme/repo/commits", "10.0.0.1").await;

    let response = get(&app, "/stats", "10.0.0.1").await;
    assert_eq!(response.status(), StatusCode::OK);

    let json = body_to_json(response).await;
    assert_eq!(json["hits"], 1);
    assert_eq!(json["misses"], 1);
    assert_eq!(json["total_entries"], 1);
    // client bucket + server github bucket
    assert_eq!(json["rate_limit_buckets"], 2);
}
