//! Cleanup Scheduler
//!
//! Background sweeps that bound memory: expired cache entries and idle
//! rate-limit buckets. Reads already ignore stale data, so these only
//! reclaim space.

use std::future::Future;
use std::sync::Arc;
use std::time::Duration;

use tokio::sync::RwLock;
use tokio::task::{AbortHandle, JoinHandle};
use tracing::{debug, error, info};

use crate::cache::SharedCache;
use crate::config::Config;
use crate::rate_limit::RateLimiter;

/// How often each sweep runs.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SweepIntervals {
    pub cache: Duration,
    pub rate_limit: Duration,
}

impl SweepIntervals {
    pub fn from_config(config: &Config) -> Self {
        Self {
            cache: Duration::from_secs(config.cache_sweep_interval),
            rate_limit: Duration::from_secs(config.rate_limit_sweep_interval),
        }
    }
}

impl Default for SweepIntervals {
    fn default() -> Self {
        Self {
            cache: Duration::from_secs(600),
            rate_limit: Duration::from_secs(300),
        }
    }
}

/// Aborts the wrapped task when dropped.
struct AbortOnDrop(AbortHandle);

impl Drop for AbortOnDrop {
    fn drop(&mut self) {
        self.0.abort();
    }
}

/// Spawns a task that runs `sweep` every `interval` until aborted.
///
/// Each run executes in its own task so a panicking sweep is logged and the
/// next tick still happens. Aborting the returned handle also aborts a run
/// that is still in flight.
///
/// # Example
/// ```ignore
/// let handle = spawn_sweep_task("cache", Duration::from_secs(600), move || {
///     let cache = cache.clone();
///     async move { cache.cleanup_expired().await }
/// });
/// // Later, during shutdown:
/// handle.abort();
/// ```
pub fn spawn_sweep_task<F, Fut>(name: &'static str, interval: Duration, sweep: F) -> JoinHandle<()>
where
    F: Fn() -> Fut + Send + 'static,
    Fut: Future<Output = usize> + Send + 'static,
{
    tokio::spawn(async move {
        info!(
            "Starting {} sweep task with interval of {} seconds",
            name,
            interval.as_secs()
        );

        loop {
            tokio::time::sleep(interval).await;

            let run = tokio::spawn(sweep());
            let _in_flight = AbortOnDrop(run.abort_handle());

            match run.await {
                Ok(0) => debug!("{} sweep: nothing to remove", name),
                Ok(removed) => info!("{} sweep: removed {} entries", name, removed),
                Err(err) if err.is_panic() => {
                    error!("{} sweep panicked, continuing on next tick: {}", name, err)
                }
                Err(err) => {
                    debug!("{} sweep cancelled: {}", name, err);
                    break;
                }
            }
        }
    })
}

// == Cleanup Scheduler ==
/// Owns the two sweep tasks; drop them with [`CleanupScheduler::shutdown`].
#[derive(Debug)]
pub struct CleanupScheduler {
    cache_task: JoinHandle<()>,
    rate_limit_task: JoinHandle<()>,
}

impl CleanupScheduler {
    pub fn start<V>(
        cache: SharedCache<V>,
        limiter: Arc<RwLock<RateLimiter>>,
        intervals: SweepIntervals,
    ) -> Self
    where
        V: Clone + Send + Sync + 'static,
    {
        let cache_task = spawn_sweep_task("cache", intervals.cache, move || {
            let cache = cache.clone();
            async move { cache.cleanup_expired().await }
        });

        let rate_limit_task = spawn_sweep_task("rate-limit", intervals.rate_limit, move || {
            let limiter = Arc::clone(&limiter);
            async move { limiter.write().await.cleanup_idle() }
        });

        Self {
            cache_task,
            rate_limit_task,
        }
    }

    /// Aborts both sweep tasks, including any run in progress.
    pub fn shutdown(&self) {
        self.cache_task.abort();
        self.rate_limit_task.abort();
    }

    pub fn is_finished(&self) -> bool {
        self.cache_task.is_finished() && self.rate_limit_task.is_finished()
    }
}
