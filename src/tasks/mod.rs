//! Background Tasks Module
//!
//! Contains background tasks that run periodically during server operation.
//!
//! # Tasks
//! - Cache sweep: removes expired cache entries (default every 10 minutes)
//! - Rate-limit sweep: removes idle buckets (default every 5 minutes)

mod cleanup;

pub use cleanup::{spawn_sweep_task, CleanupScheduler, SweepIntervals};
