//! YouTube search
//!
//! Result records and the [`MediaSearch`] seam the bot searches through.
//! The production backend is [`YtdlpSearch`].

mod ytdlp;

pub use ytdlp::YtdlpSearch;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Base URL of a YouTube watch page
const WATCH_URL: &str = "https://www.youtube.com/watch?v=";

/// One search hit, as reported by the extractor
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SearchResult {
    /// YouTube video id
    pub id: String,
    /// Video title
    #[serde(default)]
    pub title: Option<String>,
    /// Channel name
    #[serde(default)]
    pub uploader: Option<String>,
    /// Duration in seconds
    #[serde(default, deserialize_with = "deserialize_duration")]
    pub duration: Option<u64>,
}

impl SearchResult {
    /// Watch page URL of this video
    ///
    /// # Examples
    ///
    /// ```
    /// use nasur_bot::search::SearchResult;
    ///
    /// let result = SearchResult {
    ///     id: "JGwWNGJdvx8".to_string(),
    ///     title: None,
    ///     uploader: None,
    ///     duration: None,
    /// };
    /// assert_eq!(result.url(), "https://www.youtube.com/watch?v=JGwWNGJdvx8");
    /// ```
    #[must_use]
    pub fn url(&self) -> String {
        format!("{WATCH_URL}{}", self.id)
    }
}

// Flat-playlist entries report duration as a float (e.g. 263.0) or null.
#[allow(clippy::cast_possible_truncation, clippy::cast_sign_loss)]
fn deserialize_duration<'de, D>(deserializer: D) -> Result<Option<u64>, D::Error>
where
    D: serde::Deserializer<'de>,
{
    let value = Option::<f64>::deserialize(deserializer)?;
    Ok(value.filter(|v| v.is_finite() && *v >= 0.0).map(|v| v as u64))
}

/// Errors raised while running a search backend
#[derive(Error, Debug)]
pub enum SearchError {
    /// The extractor process could not be started
    #[error("failed to run yt-dlp: {0}")]
    Spawn(#[from] std::io::Error),
    /// The extractor exited with a failure status
    #[error("yt-dlp exited with {status}: {stderr}")]
    Failed {
        /// Exit status description
        status: String,
        /// Captured standard error
        stderr: String,
    },
    /// The extractor did not finish in time
    #[error("yt-dlp timed out after {0}s")]
    Timeout(u64),
}

/// Interface for search backends
///
/// Failures never reach the caller: a backend logs them and returns an empty list.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait MediaSearch: Send + Sync {
    /// Search for `query`, returning at most the backend's configured number of hits
    async fn search(&self, query: &str) -> Vec<SearchResult>;
}
