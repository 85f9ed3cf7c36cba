//! API Routes
//!
//! Configures the Axum router with all proxy endpoints.

use axum::{routing::get, Router};
use tower_http::{
    cors::{Any, CorsLayer},
    trace::TraceLayer,
};

use super::handlers::{
    github_commits_handler, github_milestones_handler, github_releases_handler, health_handler,
    jira_issues_handler, jira_project_handler, stats_handler, AppState,
};

/// Creates the main router with all endpoints configured.
///
/// # Endpoints
/// - `GET /api/github/:owner/:repo/commits`
/// - `GET /api/github/:owner/:repo/releases`
/// - `GET /api/github/:owner/:repo/milestones`
/// - `GET /api/jira/:project/issues`
/// - `GET /api/jira/:project`
/// - `GET /api/health`
/// - `GET /stats`
pub fn create_router(state: AppState) -> Router {
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any);

    Router::new()
        .route("/api/github/:owner/:repo/commits", get(github_commits_handler))
        .route("/api/github/:owner/:repo/releases", get(github_releases_handler))
        .route(
            "/api/github/:owner/:repo/milestones",
            get(github_milestones_handler),
        )
        .route("/api/jira/:project/issues", get(jira_issues_handler))
        .route("/api/jira/:project", get(jira_project_handler))
        .route("/api/health", get(health_handler))
        .route("/stats", get(stats_handler))
        .layer(cors)
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}
