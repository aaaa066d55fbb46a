use crate::bot::callback::{step_index, CallbackAction};
use crate::bot::resilient::{
    edit_message_safe_resilient, reply_message_resilient, send_message_resilient,
};
use crate::bot::session::SessionStore;
use crate::bot::views::{render_result, star_keyboard, DefaultSearchView, RenderedResult, SearchView};
use crate::config::TRIGGER_WORD;
use crate::search::MediaSearch;
use crate::utils::truncate_str;
use anyhow::Result;
use std::future::Future;
use std::sync::Arc;
use teloxide::{prelude::*, types::ParseMode, utils::command::BotCommands};
use tracing::{debug, info};

// Helper function to get user name from Message
fn get_user_name(msg: &Message) -> String {
    if let Some(ref user) = msg.from {
        if let Some(ref username) = user.username {
            return username.clone();
        }
        if !user.first_name.is_empty() {
            return user.first_name.clone();
        }
    }
    "Unknown".to_string()
}

/// Safe extraction of user ID from a message.
/// Returns 0 if the user information is missing.
pub fn get_user_id_safe(msg: &Message) -> i64 {
    msg.from.as_ref().map_or(0, |u| u.id.0.cast_signed())
}

/// Supported commands for the bot
#[derive(BotCommands, Clone, Debug, PartialEq, Eq)]
#[command(rename_rule = "lowercase", description = "Supported commands:")]
pub enum Command {
    /// Show the welcome message
    #[command(description = "Start the bot.")]
    Start,
    /// Show usage instructions
    #[command(description = "How to search.")]
    Help,
    /// Show developer information
    #[command(description = "About the developer.", aliases = ["مطور"])]
    Developer,
}

/// Start handler
///
/// # Errors
///
/// Returns an error if the welcome message cannot be sent.
pub async fn start(bot: Bot, msg: Message) -> Result<()> {
    let user_id = get_user_id_safe(&msg);
    let first_name = msg
        .from
        .as_ref()
        .map(|u| u.first_name.clone())
        .unwrap_or_default();

    info!("User {user_id} ({}) initiated /start command.", get_user_name(&msg));

    send_message_resilient(
        &bot,
        msg.chat.id,
        DefaultSearchView::welcome_message(&first_name),
        Some(ParseMode::Html),
        Some(star_keyboard()),
    )
    .await?;

    Ok(())
}

/// Help handler
///
/// # Errors
///
/// Returns an error if the help text cannot be sent.
pub async fn help(bot: Bot, msg: Message) -> Result<()> {
    info!("Help command received from user {}.", get_user_id_safe(&msg));
    send_message_resilient(
        &bot,
        msg.chat.id,
        DefaultSearchView::help_message(),
        Some(ParseMode::Html),
        None,
    )
    .await?;
    Ok(())
}

/// Developer info handler
///
/// # Errors
///
/// Returns an error if the attribution text cannot be sent.
pub async fn developer(bot: Bot, msg: Message) -> Result<()> {
    info!("Developer command received from user {}.", get_user_id_safe(&msg));
    send_message_resilient(
        &bot,
        msg.chat.id,
        DefaultSearchView::developer_message(),
        Some(ParseMode::Html),
        None,
    )
    .await?;
    Ok(())
}

/// Extract the search query from a trigger message.
///
/// Returns `None` when the text does not start with the trigger word.
/// Otherwise every occurrence of the trigger is removed and the rest trimmed,
/// which may leave an empty query.
///
/// # Examples
///
/// ```
/// use nasur_bot::bot::handlers::extract_query;
///
/// assert_eq!(extract_query("نصور shape of you").as_deref(), Some("shape of you"));
/// assert_eq!(extract_query("نصور   ").as_deref(), Some(""));
/// assert_eq!(extract_query("hello"), None);
/// ```
#[must_use]
pub fn extract_query(text: &str) -> Option<String> {
    if !text.starts_with(TRIGGER_WORD) {
        return None;
    }
    Some(text.replace(TRIGGER_WORD, "").trim().to_string())
}

/// Run a search for `user_id`, store the hits as their session and render the first one.
///
/// Returns `None` when nothing was found; the previous session is then kept.
pub async fn search_and_store(
    search: &dyn MediaSearch,
    sessions: &dyn SessionStore,
    user_id: i64,
    query: &str,
) -> Option<RenderedResult> {
    let results = search.search(query).await;
    let first = results.first()?;
    let rendered = render_result(first, 0, results.len());
    sessions.set(user_id, results).await;
    Some(rendered)
}

/// What a text message leads to
#[derive(Debug, Clone)]
pub enum TextOutcome {
    /// The message does not start with the trigger word
    NotTrigger,
    /// Only the trigger word was sent
    EmptyQuery,
    /// The search found nothing; the previous session is kept
    NoResults,
    /// First result of the new session
    Found(RenderedResult),
}

/// Decide the reply to a text message of `user_id`.
///
/// `before_search` runs once, right before the backend is queried, and never
/// for messages that do not lead to a search.
///
/// # Errors
///
/// Returns the error of `before_search`; the search itself is not run then.
pub async fn plan_text<F, Fut>(
    text: &str,
    search: &dyn MediaSearch,
    sessions: &dyn SessionStore,
    user_id: i64,
    before_search: F,
) -> Result<TextOutcome>
where
    F: FnOnce(&str) -> Fut,
    Fut: Future<Output = Result<()>>,
{
    let Some(query) = extract_query(text) else {
        return Ok(TextOutcome::NotTrigger);
    };
    if query.is_empty() {
        return Ok(TextOutcome::EmptyQuery);
    }

    before_search(&query).await?;

    Ok(search_and_store(search, sessions, user_id, &query)
        .await
        .map_or(TextOutcome::NoResults, TextOutcome::Found))
}

/// Text message handler: searches when the message starts with the trigger word
///
/// # Errors
///
/// Returns an error if a reply cannot be sent.
pub async fn handle_text(
    bot: Bot,
    msg: Message,
    search: Arc<dyn MediaSearch>,
    sessions: Arc<dyn SessionStore>,
) -> Result<()> {
    let Some(text) = msg.text() else {
        return Ok(());
    };

    let user_id = get_user_id_safe(&msg);
    let chat_id = msg.chat.id;
    let user_name = get_user_name(&msg);
    let bot_ref = &bot;

    let outcome = plan_text(text, search.as_ref(), sessions.as_ref(), user_id, move |query| {
        info!(
            "User {user_id} ({user_name}) searching for '{}'",
            truncate_str(query, 100)
        );
        async move {
            send_message_resilient(bot_ref, chat_id, DefaultSearchView::searching(), None, None)
                .await
                .map(|_| ())
        }
    })
    .await?;

    match outcome {
        TextOutcome::NotTrigger => {}
        TextOutcome::EmptyQuery => {
            send_message_resilient(&bot, chat_id, DefaultSearchView::empty_query(), None, None)
                .await?;
        }
        TextOutcome::NoResults => {
            send_message_resilient(&bot, chat_id, DefaultSearchView::no_results(), None, None)
                .await?;
        }
        TextOutcome::Found(rendered) => {
            send_message_resilient(
                &bot,
                chat_id,
                rendered.text,
                Some(ParseMode::Html),
                Some(rendered.keyboard),
            )
            .await?;
        }
    }

    Ok(())
}

/// What to do in response to a button press
#[derive(Debug, Clone)]
pub enum CallbackOutcome {
    /// Thank the user for the star
    Thanks,
    /// Replace the pressed message with the result at `index`
    Edit {
        /// Index of the result now shown
        index: usize,
        /// Rendered result
        rendered: RenderedResult,
    },
    /// Send the link of a result as a new message
    Share {
        /// Watch page URL
        url: String,
    },
    /// Nothing to do
    Ignore,
}

/// Decide the response to a button press of `user_id` against their stored session.
pub async fn resolve_callback(
    action: CallbackAction,
    user_id: i64,
    sessions: &dyn SessionStore,
) -> CallbackOutcome {
    let (index, forward) = match action {
        CallbackAction::Star => return CallbackOutcome::Thanks,
        CallbackAction::Next(index) => (index, true),
        CallbackAction::Prev(index) => (index, false),
        CallbackAction::Share(index) => {
            let Some(results) = sessions.get(user_id).await else {
                return CallbackOutcome::Ignore;
            };
            return results
                .get(index)
                .map_or(CallbackOutcome::Ignore, |result| CallbackOutcome::Share {
                    url: result.url(),
                });
        }
    };

    let Some(results) = sessions.get(user_id).await else {
        debug!(user_id, "No session for navigation callback");
        return CallbackOutcome::Ignore;
    };

    // Always re-render: the pressed message may show an entry of a replaced session.
    let new_index = step_index(index, forward, results.len());
    match results.get(new_index) {
        Some(result) => CallbackOutcome::Edit {
            index: new_index,
            rendered: render_result(result, new_index, results.len()),
        },
        None => CallbackOutcome::Ignore,
    }
}

/// Inline button handler
///
/// # Errors
///
/// Returns an error if the callback cannot be answered or a reply cannot be sent.
pub async fn handle_callback(
    bot: Bot,
    q: CallbackQuery,
    sessions: Arc<dyn SessionStore>,
) -> Result<()> {
    bot.answer_callback_query(q.id.clone()).await?;

    let Some(data) = q.data.as_deref() else {
        return Ok(());
    };
    let action = match data.parse::<CallbackAction>() {
        Ok(action) => action,
        Err(e) => {
            debug!("Ignoring callback: {e}");
            return Ok(());
        }
    };
    let Some(message) = q.message.as_ref() else {
        return Ok(());
    };

    let user_id = q.from.id.0.cast_signed();
    let chat_id = message.chat().id;

    match resolve_callback(action, user_id, sessions.as_ref()).await {
        CallbackOutcome::Thanks => {
            reply_message_resilient(
                &bot,
                chat_id,
                message.id(),
                DefaultSearchView::star_thanks(&q.from.first_name),
            )
            .await?;
        }
        CallbackOutcome::Edit { index, rendered } => {
            debug!(user_id, index, "Showing search result");
            edit_message_safe_resilient(
                &bot,
                chat_id,
                message.id(),
                &rendered.text,
                Some(rendered.keyboard),
            )
            .await;
        }
        CallbackOutcome::Share { url } => {
            info!(user_id, %url, "Sharing search result");
            reply_message_resilient(&bot, chat_id, message.id(), DefaultSearchView::share_link(&url))
                .await?;
        }
        CallbackOutcome::Ignore => {}
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::bot::session::InMemorySessionStore;
    use crate::bot::views::callback_payloads;
    use crate::search::{MockMediaSearch, SearchResult};
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::time::Duration;

    fn results(n: usize) -> Vec<SearchResult> {
        (0..n)
            .map(|i| SearchResult {
                id: format!("vid{i}"),
                title: Some(format!("Song {i}")),
                uploader: Some("Channel".to_string()),
                duration: Some(125),
            })
            .collect()
    }

    fn sessions() -> InMemorySessionStore {
        InMemorySessionStore::new(100, Duration::from_secs(60))
    }

    #[test]
    fn test_command_parsing() {
        assert_eq!(Command::parse("/start", "bot").ok(), Some(Command::Start));
        assert_eq!(Command::parse("/help", "bot").ok(), Some(Command::Help));
        assert_eq!(Command::parse("/developer", "bot").ok(), Some(Command::Developer));
        assert_eq!(Command::parse("/مطور", "bot").ok(), Some(Command::Developer));
        assert!(Command::parse("/unknown", "bot").is_err());
    }

    #[test]
    fn test_extract_query() {
        assert_eq!(extract_query("نصور").as_deref(), Some(""));
        assert_eq!(extract_query("نصورadele").as_deref(), Some("adele"));
        assert_eq!(extract_query("shape of you نصور"), None);
        assert_eq!(extract_query(" نصور adele"), None);
    }

    #[tokio::test]
    async fn test_search_and_store_renders_first_result() {
        let mut search = MockMediaSearch::new();
        search.expect_search().times(1).returning(|query| {
            assert_eq!(query, "adele");
            results(5)
        });
        let store = sessions();

        let rendered = search_and_store(&search, &store, 7, "adele")
            .await
            .expect("results found");

        assert!(rendered.text.contains("Song 0"));
        assert_eq!(
            callback_payloads(&rendered.keyboard),
            vec!["prev_0", "next_0", "share_0"]
        );
        assert_eq!(store.get(7).await.map(|r| r.len()), Some(5));
    }

    #[tokio::test]
    async fn test_search_without_results_keeps_session() {
        let mut search = MockMediaSearch::new();
        search.expect_search().times(1).returning(|_| Vec::new());
        let store = sessions();
        store.set(7, results(2)).await;

        assert!(search_and_store(&search, &store, 7, "nothing").await.is_none());
        assert_eq!(store.get(7).await.map(|r| r.len()), Some(2));
    }

    #[tokio::test]
    async fn test_resolve_navigation() {
        let store = sessions();
        store.set(1, results(3)).await;

        match resolve_callback(CallbackAction::Next(0), 1, &store).await {
            CallbackOutcome::Edit { index, rendered } => {
                assert_eq!(index, 1);
                assert!(rendered.text.contains("Song 1"));
            }
            other => panic!("unexpected outcome {other:?}"),
        }

        // Edges are clamped and still re-rendered
        assert!(matches!(
            resolve_callback(CallbackAction::Prev(0), 1, &store).await,
            CallbackOutcome::Edit { index: 0, .. }
        ));
        assert!(matches!(
            resolve_callback(CallbackAction::Next(2), 1, &store).await,
            CallbackOutcome::Edit { index: 2, .. }
        ));
    }

    #[tokio::test]
    async fn test_stale_message_is_rerendered_after_new_search() {
        let store = sessions();
        let old: Vec<_> = results(5)
            .into_iter()
            .map(|mut r| {
                r.title = Some(format!("Old {}", r.id));
                r
            })
            .collect();
        store.set(1, old).await;
        store.set(1, results(2)).await;

        // Old card shows index 1; the new list ends there
        match resolve_callback(CallbackAction::Next(1), 1, &store).await {
            CallbackOutcome::Edit { index, rendered } => {
                assert_eq!(index, 1);
                assert!(rendered.text.contains("Song 1"));
                assert!(!rendered.text.contains("Old"));
            }
            other => panic!("unexpected outcome {other:?}"),
        }
    }

    #[tokio::test]
    async fn test_plan_text_empty_query_never_searches() {
        let mut search = MockMediaSearch::new();
        search.expect_search().times(0);
        let store = sessions();
        let acks = AtomicUsize::new(0);

        for text in ["نصور", "نصور   ", "نصور نصور", "hello", "/start"] {
            let outcome = plan_text(text, &search, &store, 1, |_| {
                acks.fetch_add(1, Ordering::SeqCst);
                async { Ok(()) }
            })
            .await
            .expect("no acknowledgement error");
            assert!(matches!(
                outcome,
                TextOutcome::EmptyQuery | TextOutcome::NotTrigger
            ));
        }

        assert!(matches!(
            plan_text("نصور", &search, &store, 1, |_| async { Ok(()) }).await,
            Ok(TextOutcome::EmptyQuery)
        ));
        assert!(matches!(
            plan_text("hello", &search, &store, 1, |_| async { Ok(()) }).await,
            Ok(TextOutcome::NotTrigger)
        ));
        assert_eq!(acks.load(Ordering::SeqCst), 0);
        assert!(store.get(1).await.is_none());
    }

    #[tokio::test]
    async fn test_plan_text_acknowledges_then_searches() {
        let mut search = MockMediaSearch::new();
        search.expect_search().times(1).returning(|query| {
            assert_eq!(query, "adele hello");
            results(3)
        });
        let store = sessions();
        let acked = Arc::new(std::sync::Mutex::new(Vec::new()));

        let log = Arc::clone(&acked);
        let outcome = plan_text("نصور adele hello", &search, &store, 1, move |query| {
            if let Ok(mut log) = log.lock() {
                log.push(query.to_string());
            }
            async { Ok(()) }
        })
        .await
        .expect("search planned");

        match outcome {
            TextOutcome::Found(rendered) => assert!(rendered.text.contains("Song 0")),
            other => panic!("unexpected outcome {other:?}"),
        }
        assert_eq!(
            acked.lock().map(|log| log.clone()).unwrap_or_default(),
            vec!["adele hello".to_string()]
        );
        assert_eq!(store.get(1).await.map(|r| r.len()), Some(3));
    }

    #[tokio::test]
    async fn test_plan_text_reports_no_results() {
        let mut search = MockMediaSearch::new();
        search.expect_search().times(1).returning(|_| Vec::new());
        let store = sessions();

        assert!(matches!(
            plan_text("نصور nothing", &search, &store, 1, |_| async { Ok(()) }).await,
            Ok(TextOutcome::NoResults)
        ));
    }

    #[tokio::test]
    async fn test_plan_text_stops_when_acknowledgement_fails() {
        let mut search = MockMediaSearch::new();
        search.expect_search().times(0);
        let store = sessions();

        let outcome = plan_text("نصور adele", &search, &store, 1, |_| async {
            anyhow::bail!("chat unavailable")
        })
        .await;
        assert!(outcome.is_err());
    }

    #[tokio::test]
    async fn test_resolve_without_session() {
        let store = sessions();
        assert!(matches!(
            resolve_callback(CallbackAction::Next(0), 1, &store).await,
            CallbackOutcome::Ignore
        ));
        assert!(matches!(
            resolve_callback(CallbackAction::Share(0), 1, &store).await,
            CallbackOutcome::Ignore
        ));
        assert!(matches!(
            resolve_callback(CallbackAction::Star, 1, &store).await,
            CallbackOutcome::Thanks
        ));
    }

    #[tokio::test]
    async fn test_resolve_share() {
        let store = sessions();
        store.set(1, results(3)).await;

        match resolve_callback(CallbackAction::Share(2), 1, &store).await {
            CallbackOutcome::Share { url } => {
                assert_eq!(url, "https://www.youtube.com/watch?v=vid2");
            }
            other => panic!("unexpected outcome {other:?}"),
        }
        assert!(matches!(
            resolve_callback(CallbackAction::Share(3), 1, &store).await,
            CallbackOutcome::Ignore
        ));
    }
}
