//! API Module
//!
//! HTTP handlers and routing for the caching, rate-limited proxy.
//!
//! # Endpoints
//! - `GET /api/github/:owner/:repo/{commits,releases,milestones}`
//! - `GET /api/jira/:project/issues`, `GET /api/jira/:project`
//! - `GET /api/health` - Health check endpoint
//! - `GET /stats` - Cache and limiter statistics

pub mod client;
pub mod handlers;
pub mod routes;

pub use client::{client_identifier, ClientId};
pub use handlers::*;
pub use routes::create_router;
