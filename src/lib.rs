#![deny(missing_docs)]
//! Nasur bot library.
//!
//! YouTube search over Telegram: a yt-dlp search adapter, result rendering,
//! per-user sessions and the liveness endpoint.

/// Telegram bot logic (handlers, views, sessions).
pub mod bot;
/// Configuration management.
pub mod config;
/// Liveness HTTP server.
pub mod health;
/// Telegram runtime entrypoint.
pub mod runner;
/// YouTube search via yt-dlp.
pub mod search;
/// Utility functions.
pub mod utils;
