/// Inline button payload parsing and pagination
pub mod callback;
/// Command, search and button handlers
pub mod handlers;
/// Resilient messaging with automatic retry for Telegram API operations
pub mod resilient;
/// Per-user search result sessions
pub mod session;
/// View layer for UI components (keyboards, messages)
pub mod views;

pub use session::{InMemorySessionStore, SessionStore};
