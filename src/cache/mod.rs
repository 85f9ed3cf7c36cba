//! Cache Module
//!
//! In-memory TTL cache with lazy expiry, a get-or-populate helper and
//! namespaced facades for GitHub and Jira resources.

mod entry;
pub mod keys;
mod namespaces;
mod shared;
mod stats;
mod store;


// Re-export public types
pub use entry::CacheEntry;
pub use namespaces::{
    GithubCache, HealthCache, JiraCache, COMMITS_TTL, HEALTH_TTL, JIRA_ISSUES_TTL, MILESTONES_TTL,
    RELEASES_TTL,
};
pub use shared::SharedCache;
pub use stats::CacheStats;
pub use store::CacheStore;

// == Public Constants ==
/// TTL in seconds applied when neither the caller nor the config gives one
pub const DEFAULT_TTL_SECS: u64 = 300;
