use crate::bot;
use crate::bot::handlers::Command;
use crate::bot::{InMemorySessionStore, SessionStore};
use crate::config::Settings;
use crate::search::{MediaSearch, YtdlpSearch};
use std::sync::Arc;
use teloxide::dispatching::UpdateHandler;
use teloxide::prelude::*;
use tracing::{error, info};

/// Run the Telegram transport runtime with the yt-dlp backend and in-memory sessions.
pub async fn run_bot(settings: Arc<Settings>) {
    let search: Arc<dyn MediaSearch> = Arc::new(YtdlpSearch::from_settings(&settings));
    let sessions: Arc<dyn SessionStore> = Arc::new(InMemorySessionStore::from_settings(&settings));

    info!(
        "Search backend: {} (limit {}, timeout {}s)",
        settings.ytdlp_path, settings.search_limit, settings.search_timeout_secs
    );
    info!(
        "Session store: max {} entries, idle expiry {}s",
        settings.session_max_capacity, settings.session_idle_secs
    );

    run_bot_with(&settings.telegram_bot_token, search, sessions).await;
}

/// Run the Telegram transport runtime with explicit backends.
pub async fn run_bot_with(
    token: &str,
    search: Arc<dyn MediaSearch>,
    sessions: Arc<dyn SessionStore>,
) {
    let bot = Bot::new(token);
    let handler = setup_handler();

    info!("Bot is running...");

    Dispatcher::builder(bot, handler)
        .dependencies(dptree::deps![search, sessions])
        .enable_ctrlc_handler()
        .build()
        .dispatch()
        .await;
}

fn setup_handler() -> UpdateHandler<teloxide::RequestError> {
    dptree::entry()
        .branch(Update::filter_callback_query().endpoint(handle_callback))
        .branch(
            Update::filter_message()
                .branch(
                    dptree::entry()
                        .filter_command::<Command>()
                        .endpoint(handle_command),
                )
                .branch(
                    dptree::filter(|msg: Message| {
                        msg.text().is_some_and(|text| !text.starts_with('/'))
                    })
                    .endpoint(handle_text),
                ),
        )
}

async fn handle_command(bot: Bot, msg: Message, cmd: Command) -> Result<(), teloxide::RequestError> {
    let res = match cmd {
        Command::Start => bot::handlers::start(bot, msg).await,
        Command::Help => bot::handlers::help(bot, msg).await,
        Command::Developer => bot::handlers::developer(bot, msg).await,
    };
    if let Err(e) = res {
        error!("Command error: {}", e);
    }
    respond(())
}

async fn handle_text(
    bot: Bot,
    msg: Message,
    search: Arc<dyn MediaSearch>,
    sessions: Arc<dyn SessionStore>,
) -> Result<(), teloxide::RequestError> {
    if let Err(e) = bot::handlers::handle_text(bot, msg, search, sessions).await {
        error!("Text handler error: {}", e);
    }
    respond(())
}

async fn handle_callback(
    bot: Bot,
    q: CallbackQuery,
    sessions: Arc<dyn SessionStore>,
) -> Result<(), teloxide::RequestError> {
    if let Err(e) = bot::handlers::handle_callback(bot, q, sessions).await {
        error!("Callback handler error: {}", e);
    }
    respond(())
}
