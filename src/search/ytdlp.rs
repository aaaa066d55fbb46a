//! yt-dlp search backend
//!
//! Runs `yt-dlp` in flat-playlist mode (metadata only, nothing downloaded)
//! against a `ytsearchN:` pseudo-URL and parses its NDJSON output.

use super::{MediaSearch, SearchError, SearchResult};
use crate::config::Settings;
use async_trait::async_trait;
use std::process::Stdio;
use std::time::Duration;
use tokio::process::Command;
use tracing::{debug, error, info};

/// Search backend that shells out to yt-dlp
#[derive(Debug, Clone)]
pub struct YtdlpSearch {
    program: String,
    limit: usize,
    timeout: Duration,
}

impl YtdlpSearch {
    /// Create a backend running `program` with the given result limit and timeout
    #[must_use]
    pub fn new(program: impl Into<String>, limit: usize, timeout: Duration) -> Self {
        Self {
            program: program.into(),
            limit: limit.max(1),
            timeout,
        }
    }

    /// Create a backend from application settings
    #[must_use]
    pub fn from_settings(settings: &Settings) -> Self {
        Self::new(
            settings.ytdlp_path.clone(),
            settings.search_limit,
            Duration::from_secs(settings.search_timeout_secs),
        )
    }

    /// Configured maximum number of results
    #[must_use]
    pub const fn limit(&self) -> usize {
        self.limit
    }

    fn build_args(&self, query: &str) -> Vec<String> {
        vec![
            "--dump-json".to_string(),
            "--flat-playlist".to_string(),
            "--skip-download".to_string(),
            "--no-warnings".to_string(),
            "--quiet".to_string(),
            format!("ytsearch{}:{query}", self.limit),
        ]
    }

    async fn run(&self, query: &str) -> Result<String, SearchError> {
        let args = self.build_args(query);
        debug!(program = %self.program, ?args, "Executing yt-dlp search");

        let mut cmd = Command::new(&self.program);
        cmd.args(&args).stdin(Stdio::null()).kill_on_drop(true);

        let output = tokio::time::timeout(self.timeout, cmd.output())
            .await
            .map_err(|_| SearchError::Timeout(self.timeout.as_secs()))??;

        if !output.status.success() {
            return Err(SearchError::Failed {
                status: output.status.to_string(),
                stderr: String::from_utf8_lossy(&output.stderr).trim().to_string(),
            });
        }

        Ok(String::from_utf8_lossy(&output.stdout).into_owned())
    }
}

/// Parse yt-dlp NDJSON output, keeping at most `limit` entries
fn parse_entries(output: &str, limit: usize) -> Vec<SearchResult> {
    output
        .lines()
        .map(str::trim)
        .filter(|line| !line.is_empty())
        .filter_map(|line| match serde_json::from_str::<SearchResult>(line) {
            Ok(result) => Some(result),
            Err(e) => {
                debug!(error = %e, "Skipping unparsable yt-dlp line");
                None
            }
        })
        .take(limit)
        .collect()
}

#[async_trait]
impl MediaSearch for YtdlpSearch {
    async fn search(&self, query: &str) -> Vec<SearchResult> {
        match self.run(query).await {
            Ok(output) => {
                let results = parse_entries(&output, self.limit);
                info!(query = %query, count = results.len(), "yt-dlp search finished");
                results
            }
            Err(e) => {
                error!(query = %query, error = %e, "yt-dlp search failed");
                Vec::new()
            }
        }
    }
}
