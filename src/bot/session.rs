//! Per-user search sessions
//!
//! Keeps each user's most recent result list so inline buttons can page
//! through it. A new search replaces the previous list entirely.

use crate::config::Settings;
use crate::search::SearchResult;
use async_trait::async_trait;
use moka::future::Cache;
use std::sync::Arc;
use std::time::Duration;
use tracing::debug;

/// Storage backend for search sessions
#[async_trait]
pub trait SessionStore: Send + Sync {
    /// Replace the stored results of `user_id`. An empty list is ignored.
    async fn set(&self, user_id: i64, results: Vec<SearchResult>);
    /// Results of the latest search of `user_id`, if any
    async fn get(&self, user_id: i64) -> Option<Arc<Vec<SearchResult>>>;
}

/// In-process session store backed by a concurrent `moka` cache
///
/// Entries expire after the configured idle time and the cache is bounded by
/// `max_capacity`, so abandoned sessions do not accumulate.
#[derive(Clone)]
pub struct InMemorySessionStore {
    cache: Cache<i64, Arc<Vec<SearchResult>>>,
}

impl InMemorySessionStore {
    /// Creates a store holding at most `max_capacity` sessions, each dropped
    /// after `idle` without access
    ///
    /// # Examples
    ///
    /// ```
    /// use nasur_bot::bot::session::InMemorySessionStore;
    /// use std::time::Duration;
    ///
    /// let store = InMemorySessionStore::new(10_000, Duration::from_secs(3600));
    /// ```
    #[must_use]
    pub fn new(max_capacity: u64, idle: Duration) -> Self {
        let cache = Cache::builder()
            .max_capacity(max_capacity)
            .time_to_idle(idle)
            .build();
        Self { cache }
    }

    /// Creates a store from application settings
    #[must_use]
    pub fn from_settings(settings: &Settings) -> Self {
        Self::new(
            settings.session_max_capacity,
            Duration::from_secs(settings.session_idle_secs),
        )
    }

    /// Number of live sessions
    #[must_use]
    pub fn entry_count(&self) -> u64 {
        self.cache.entry_count()
    }
}

#[async_trait]
impl SessionStore for InMemorySessionStore {
    async fn set(&self, user_id: i64, results: Vec<SearchResult>) {
        if results.is_empty() {
            debug!(user_id, "Not storing an empty result list");
            return;
        }
        self.cache.insert(user_id, Arc::new(results)).await;
    }

    async fn get(&self, user_id: i64) -> Option<Arc<Vec<SearchResult>>> {
        self.cache.get(&user_id).await
    }
}
