//! Resilient messaging utilities with automatic retry for Telegram API operations.
//!
//! Wrappers around send/edit calls that retry on transient network failures
//! using exponential backoff with jitter.
//!
//! # Usage
//!
//! ```ignore
//! use nasur_bot::bot::resilient::{send_message_resilient, edit_message_safe_resilient};
//!
//! let msg = send_message_resilient(&bot, chat_id, "Hello!", None, None).await?;
//! let edited = edit_message_safe_resilient(&bot, chat_id, msg.id, "Updated!", None).await;
//! ```

use anyhow::Result;
use std::fmt::Display;
use teloxide::prelude::*;
use teloxide::types::{ChatId, InlineKeyboardMarkup, Message, MessageId, ParseMode, ReplyParameters};
use tracing::{debug, warn};

const ERROR_NOT_MODIFIED: &str = "message is not modified";
const ERROR_NOT_FOUND: &str = "message to edit not found";

/// Send a message with automatic retry on network failures.
///
/// # Errors
///
/// Returns an error after all retries are exhausted.
pub async fn send_message_resilient(
    bot: &Bot,
    chat_id: ChatId,
    text: impl Into<String>,
    parse_mode: Option<ParseMode>,
    keyboard: Option<InlineKeyboardMarkup>,
) -> Result<Message> {
    let text = text.into();
    crate::utils::retry_telegram_operation(|| async {
        let mut req = bot.send_message(chat_id, text.clone());
        if let Some(pm) = parse_mode {
            req = req.parse_mode(pm);
        }
        if let Some(markup) = keyboard.clone() {
            req = req.reply_markup(markup);
        }
        req.await
            .map_err(|e| anyhow::anyhow!("Telegram send error: {e}"))
    })
    .await
}

/// Send a plain-text reply threaded under `reply_to`, with automatic retry.
///
/// # Errors
///
/// Returns an error after all retries are exhausted.
pub async fn reply_message_resilient(
    bot: &Bot,
    chat_id: ChatId,
    reply_to: MessageId,
    text: impl Into<String>,
) -> Result<Message> {
    let text = text.into();
    crate::utils::retry_telegram_operation(|| async {
        bot.send_message(chat_id, text.clone())
            .reply_parameters(ReplyParameters::new(reply_to))
            .await
            .map_err(|e| anyhow::anyhow!("Telegram send error: {e}"))
    })
    .await
}

/// Edit a message's text and inline keyboard with automatic retry on network failures.
///
/// "Not modified" and "not found" are permanent and end the retry loop at once.
///
/// # Returns
///
/// `Some(message)` when edited, `None` when Telegram skipped the edit.
///
/// # Errors
///
/// Returns an error after all retries are exhausted.
pub async fn edit_message_resilient(
    bot: &Bot,
    chat_id: ChatId,
    msg_id: MessageId,
    text: impl Into<String>,
    keyboard: Option<InlineKeyboardMarkup>,
) -> Result<Option<Message>> {
    let text = text.into();
    crate::utils::retry_telegram_operation(|| async {
        let mut req = bot
            .edit_message_text(chat_id, msg_id, text.clone())
            .parse_mode(ParseMode::Html);
        if let Some(markup) = keyboard.clone() {
            req = req.reply_markup(markup);
        }
        skip_unmodified(req.await)
    })
    .await
}

/// Edit a message, treating "not modified" and "not found" as a skipped edit.
///
/// Clamped navigation at either end of a result list re-renders the same
/// page, which Telegram rejects as "message is not modified".
///
/// # Returns
///
/// - `true` if the message was edited
/// - `false` if the edit was skipped or failed after retries
pub async fn edit_message_safe_resilient(
    bot: &Bot,
    chat_id: ChatId,
    msg_id: MessageId,
    text: &str,
    keyboard: Option<InlineKeyboardMarkup>,
) -> bool {
    match edit_message_resilient(bot, chat_id, msg_id, text, keyboard).await {
        Ok(Some(_)) => true,
        Ok(None) => {
            debug!(message_id = msg_id.0, "Message update skipped");
            false
        }
        Err(e) => {
            warn!("Failed to edit message after retries: {e}");
            false
        }
    }
}

fn skip_unmodified<T, E: Display>(result: Result<T, E>) -> Result<Option<T>> {
    match result {
        Ok(value) => Ok(Some(value)),
        Err(e) => {
            let err_msg = e.to_string();
            if is_skippable_edit_error(&err_msg) {
                debug!("Edit rejected without retry: {err_msg}");
                return Ok(None);
            }
            Err(anyhow::anyhow!("Telegram edit error: {e}"))
        }
    }
}

fn is_skippable_edit_error(err_msg: &str) -> bool {
    err_msg.contains(ERROR_NOT_MODIFIED) || err_msg.contains(ERROR_NOT_FOUND)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicUsize, Ordering};

    #[test]
    fn test_skippable_edit_errors() {
        assert!(is_skippable_edit_error(
            "Telegram edit error: A request to the Telegram server was unsuccessful: Bad Request: message is not modified"
        ));
        assert!(is_skippable_edit_error("Bad Request: message to edit not found"));
        assert!(!is_skippable_edit_error("Telegram edit error: network error"));
    }

    #[tokio::test]
    async fn test_unmodified_edit_is_not_retried() {
        let calls = AtomicUsize::new(0);
        let result = crate::utils::retry_telegram_operation(|| {
            calls.fetch_add(1, Ordering::SeqCst);
            async { skip_unmodified::<(), _>(Err("Bad Request: message is not modified")) }
        })
        .await;

        assert!(matches!(result, Ok(None)));
        assert_eq!(calls.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn test_missing_message_is_not_retried() {
        let calls = AtomicUsize::new(0);
        let result = crate::utils::retry_telegram_operation(|| {
            calls.fetch_add(1, Ordering::SeqCst);
            async { skip_unmodified::<(), _>(Err("Bad Request: message to edit not found")) }
        })
        .await;

        assert!(matches!(result, Ok(None)));
        assert_eq!(calls.load(Ordering::SeqCst), 1);
    }

    #[test]
    fn test_other_edit_errors_stay_errors() {
        let result = skip_unmodified::<(), _>(Err("network error"));
        assert!(result
            .err()
            .is_some_and(|e| e.to_string() == "Telegram edit error: network error"));
        assert!(matches!(skip_unmodified::<u8, &str>(Ok(3)), Ok(Some(3))));
    }
}
