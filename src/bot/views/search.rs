//! Search UI components
//!
//! Contains keyboards, text messages, and the result card renderer.

use crate::bot::callback::CallbackAction;
use crate::config::{DEVELOPER_NAME, TRIGGER_WORD};
use crate::search::SearchResult;
use teloxide::types::{InlineKeyboardButton, InlineKeyboardMarkup};

/// Fallback title for results without one
const UNKNOWN_TITLE: &str = "بدون عنوان";
/// Fallback channel for results without an uploader
const UNKNOWN_CHANNEL: &str = "غير معروف";

// ─────────────────────────────────────────────────────────────────────────────
// Trait definition
// ─────────────────────────────────────────────────────────────────────────────

/// Trait for search UI text rendering
///
/// Texts returned as HTML are meant for `ParseMode::Html`; the others are plain.
pub trait SearchView {
    /// Welcome message for `/start` (HTML)
    fn welcome_message(first_name: &str) -> String;

    /// Usage text for `/help` (HTML)
    fn help_message() -> String;

    /// Attribution text for `/developer` (HTML)
    fn developer_message() -> String;

    /// Prompt shown when the trigger word is sent without a query
    fn empty_query() -> String;

    /// Acknowledgement sent before searching
    fn searching() -> &'static str;

    /// Reply when a search finds nothing
    fn no_results() -> &'static str;

    /// Reply to the star button
    fn star_thanks(first_name: &str) -> String;

    /// Message carrying a shared video link
    fn share_link(url: &str) -> String;
}

// ─────────────────────────────────────────────────────────────────────────────
// Default implementation
// ─────────────────────────────────────────────────────────────────────────────

/// Default Arabic-language implementation of `SearchView`
pub struct DefaultSearchView;

impl SearchView for DefaultSearchView {
    fn welcome_message(first_name: &str) -> String {
        let name = html_escape::encode_text(first_name);
        format!(
            "✨ أهلاً {name}!\n\n\
             اكتب:\n\
             {TRIGGER_WORD} اسم الأغنية\n\n\
             للبحث عن أغنية 🎵\n\n\
             📱 المطور: {DEVELOPER_NAME}"
        )
    }

    fn help_message() -> String {
        format!(
            "📖 <b>طريقة الاستخدام</b>\n\n\
             اكتب:\n\
             {TRIGGER_WORD} اسم الأغنية\n\n\
             وسيعرض لك النتائج.\n\n\
             📱 المطور: {DEVELOPER_NAME}"
        )
    }

    fn developer_message() -> String {
        format!(
            "👨‍💻 <b>معلومات المطور</b>\n\n\
             الاسم: {DEVELOPER_NAME}\n\
             بوت بحث أغاني من YouTube\n"
        )
    }

    fn empty_query() -> String {
        format!("اكتب اسم الأغنية بعد كلمة {TRIGGER_WORD}")
    }

    fn searching() -> &'static str {
        "🔎 جاري البحث..."
    }

    fn no_results() -> &'static str {
        "❌ لم يتم العثور على نتائج"
    }

    fn star_thanks(first_name: &str) -> String {
        format!(
            "✨ أهلاً وسهلاً {first_name}! ✨\n\
             شكراً لإعجابك بالبوت 🌟\n\
             اكتب {TRIGGER_WORD} + اسم الأغنية للبحث.\n\n\
             📱 المطور: {DEVELOPER_NAME}"
        )
    }

    fn share_link(url: &str) -> String {
        format!("🎵 {url}")
    }
}

// ─────────────────────────────────────────────────────────────────────────────
// Result card
// ─────────────────────────────────────────────────────────────────────────────

/// A search result ready to be sent or edited into a message
#[derive(Debug, Clone)]
pub struct RenderedResult {
    /// Message text (HTML)
    pub text: String,
    /// Navigation and share buttons
    pub keyboard: InlineKeyboardMarkup,
    /// Watch page URL of the result
    pub url: String,
}

/// Format a duration in seconds as `m:ss`
///
/// # Examples
///
/// ```
/// use nasur_bot::bot::views::format_duration;
///
/// assert_eq!(format_duration(125), "2:05");
/// assert_eq!(format_duration(3600), "60:00");
/// ```
#[must_use]
pub fn format_duration(seconds: u64) -> String {
    format!("{}:{:02}", seconds / 60, seconds % 60)
}

/// Render the result at `index` as a message with its button grid.
///
/// `_total` is the size of the result list; the card does not show it.
#[must_use]
pub fn render_result(result: &SearchResult, index: usize, _total: usize) -> RenderedResult {
    let title = html_escape::encode_text(result.title.as_deref().unwrap_or(UNKNOWN_TITLE));
    let channel = html_escape::encode_text(result.uploader.as_deref().unwrap_or(UNKNOWN_CHANNEL));
    let duration = format_duration(result.duration.unwrap_or(0));
    let url = result.url();

    let text = format!(
        "🎶 <b>{title}</b>\n\
         📺 القناة: {channel}\n\
         ⏳ المدة: {duration}\n\n\
         📱 المطور: {DEVELOPER_NAME}"
    );

    RenderedResult {
        text,
        keyboard: result_keyboard(index, &url),
        url,
    }
}

// ─────────────────────────────────────────────────────────────────────────────
// Keyboards
// ─────────────────────────────────────────────────────────────────────────────

/// Get the 2×2 result keyboard: prev/next, then open/share
#[must_use]
pub fn result_keyboard(index: usize, url: &str) -> InlineKeyboardMarkup {
    let mut rows = vec![vec![
        InlineKeyboardButton::callback("⬅️ السابق", CallbackAction::Prev(index).to_string()),
        InlineKeyboardButton::callback("➡️ التالي", CallbackAction::Next(index).to_string()),
    ]];

    let share = InlineKeyboardButton::callback(
        "📤 إرسال للقروب",
        CallbackAction::Share(index).to_string(),
    );
    let second_row = match url.parse() {
        Ok(parsed) => vec![InlineKeyboardButton::url("🎵 استمع على YouTube", parsed), share],
        Err(_) => vec![share],
    };
    rows.push(second_row);

    InlineKeyboardMarkup::new(rows)
}

/// Get the welcome keyboard with the single star button
#[must_use]
pub fn star_keyboard() -> InlineKeyboardMarkup {
    InlineKeyboardMarkup::new(vec![vec![InlineKeyboardButton::callback(
        "⭐",
        CallbackAction::Star.to_string(),
    )]])
}

/// Collect the callback payloads of a keyboard, row by row
#[must_use]
pub fn callback_payloads(keyboard: &InlineKeyboardMarkup) -> Vec<String> {
    use teloxide::types::InlineKeyboardButtonKind;

    keyboard
        .inline_keyboard
        .iter()
        .flatten()
        .filter_map(|button| match &button.kind {
            InlineKeyboardButtonKind::CallbackData(data) => Some(data.clone()),
            _ => None,
        })
        .collect()
}
