//! # Migration Engine Module
//!
//! This module implements the library migration engine: everything needed to
//! move followed artists, liked albums, liked tracks and user playlists from
//! a source account to a destination account while preserving the
//! chronological "date added" order the user built up over the years.
//!
//! ## Overview
//!
//! The destination service records its own "added" timestamp at write time,
//! so the only way to reproduce the source chronology is to insert items in
//! the same relative order as the originals, oldest first. The engine
//! therefore collects each listing in explicit newest-first date order,
//! reverses it, and replays it against the destination one call at a time.
//!
//! ## Architecture
//!
//! ```text
//! Orchestrator (plan sequencing, aggregate report)
//!     ├── Wipe Engine (destructive, explicit, runs before track copy)
//!     └── Entity Migrators (artists, albums, tracks, playlists)
//!             ├── Paginated Collector (offset/limit pagination)
//!             ├── Order Reconciler (newest-first -> oldest-first)
//!             └── per-item destination writes
//!                     └── Rate Limiter (spacing + bounded backoff)
//!                             └── LibraryService (remote boundary)
//! ```
//!
//! Data flows one way: source service into the collector, through the
//! reconciler, out through per-item writes to the destination service. The
//! orchestrator holds no library data itself.
//!
//! ## Failure Policy
//!
//! - A single item's failure is recorded and the stage continues, so one bad
//!   identifier cannot block an entire migration.
//! - A collection failure aborts only its stage and is reported in the
//!   aggregate result.
//! - An expired session aborts the whole run immediately. There is no silent
//!   continuation with a broken session.
//!
//! ## Concurrency
//!
//! One logical sequence of calls per run. Remote calls are never issued
//! concurrently; total counts are unknown before pagination completes and
//! concurrent calls would defeat the rate limiter's spacing guarantees. The
//! run suspends only inside rate-limiter delays and retry backoff, and it
//! honors a cooperative [`CancelToken`] at every page and item boundary.

use std::sync::{
    Arc,
    atomic::{AtomicBool, Ordering},
};

pub mod albums;
pub mod artists;
pub mod collector;
pub mod error;
pub mod limiter;
pub mod orchestrator;
pub mod playlists;
pub mod reconcile;
pub mod service;
pub mod tracks;
pub mod wipe;

pub use collector::collect;
pub use error::{CollectionError, MigrationError, ServiceError};
pub use limiter::{CallClass, RateLimiter};
pub use orchestrator::{MigrationReport, run_plan};
pub use reconcile::reconcile;
pub use service::LibraryService;

/// Cooperative cancellation flag for a migration run.
///
/// Cloned into the Ctrl-C handler by the caller; the engine checks it at
/// every per-item boundary and stops without rolling anything back.
#[derive(Debug, Clone, Default)]
pub struct CancelToken {
    flag: Arc<AtomicBool>,
}

impl CancelToken {
    pub fn new() -> Self {
        CancelToken::default()
    }

    pub fn cancel(&self) {
        self.flag.store(true, Ordering::Relaxed);
    }

    pub fn is_cancelled(&self) -> bool {
        self.flag.load(Ordering::Relaxed)
    }
}
