//! Inline button payloads
//!
//! Button callback data is parsed once into [`CallbackAction`] when a
//! callback query arrives; everything downstream matches on the enum.

use std::fmt;
use std::str::FromStr;
use thiserror::Error;

/// Payload of the decorative star button
pub const CALLBACK_STAR: &str = "star";
const PREFIX_NEXT: &str = "next_";
const PREFIX_PREV: &str = "prev_";
const PREFIX_SHARE: &str = "share_";

/// Action encoded in an inline button
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CallbackAction {
    /// Star button on the welcome message
    Star,
    /// Move forward from the given index
    Next(usize),
    /// Move back from the given index
    Prev(usize),
    /// Share the link of the result at the given index
    Share(usize),
}

/// Error returned for callback data that is not a known payload
#[derive(Error, Debug, PartialEq, Eq)]
#[error("unrecognized callback payload: {0:?}")]
pub struct CallbackParseError(pub String);

impl FromStr for CallbackAction {
    type Err = CallbackParseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let invalid = || CallbackParseError(s.to_string());

        if s == CALLBACK_STAR {
            return Ok(Self::Star);
        }

        let (ctor, index): (fn(usize) -> Self, &str) =
            if let Some(rest) = s.strip_prefix(PREFIX_NEXT) {
                (Self::Next, rest)
            } else if let Some(rest) = s.strip_prefix(PREFIX_PREV) {
                (Self::Prev, rest)
            } else if let Some(rest) = s.strip_prefix(PREFIX_SHARE) {
                (Self::Share, rest)
            } else {
                return Err(invalid());
            };

        index.parse::<usize>().map(ctor).map_err(|_| invalid())
    }
}

impl fmt::Display for CallbackAction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Star => f.write_str(CALLBACK_STAR),
            Self::Next(i) => write!(f, "{PREFIX_NEXT}{i}"),
            Self::Prev(i) => write!(f, "{PREFIX_PREV}{i}"),
            Self::Share(i) => write!(f, "{PREFIX_SHARE}{i}"),
        }
    }
}

/// Step `index` by one in the given direction, clamped to `[0, len - 1]`.
///
/// Returns 0 for an empty list.
///
/// # Examples
///
/// ```
/// use nasur_bot::bot::callback::step_index;
///
/// assert_eq!(step_index(0, true, 5), 1);
/// assert_eq!(step_index(4, true, 5), 4);
/// assert_eq!(step_index(0, false, 5), 0);
/// ```
#[must_use]
pub fn step_index(index: usize, forward: bool, len: usize) -> usize {
    let stepped = if forward {
        index.saturating_add(1)
    } else {
        index.saturating_sub(1)
    };
    stepped.min(len.saturating_sub(1))
}
