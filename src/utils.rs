//! Utility functions for text splitting, truncation and retrying
//! Telegram API calls.

use anyhow::Result;
use std::time::Duration;
use tokio_retry::strategy::{jitter, ExponentialBackoff};
use tokio_retry::Retry;
use tracing::warn;
use unicode_segmentation::UnicodeSegmentation;

/// Splits a long message into parts that fit within Telegram's message limit.
///
/// Lines are kept whole where possible. A single line longer than
/// `max_length` is split by grapheme clusters (Unicode-safe).
///
/// # Examples
///
/// ```
/// use paper_poll_bot::utils::split_long_message;
/// let long_msg = "A paper title\n\nhttp://x.test/a\n".repeat(300);
/// let parts = split_long_message(&long_msg, 4000);
/// assert!(parts.len() > 1);
/// ```
#[must_use]
pub fn split_long_message(message: &str, max_length: usize) -> Vec<String> {
    if message.is_empty() {
        return Vec::new();
    }

    if message.len() <= max_length {
        return vec![message.to_string()];
    }

    let mut parts = Vec::new();
    let mut current_message = String::new();

    for line in message.lines() {
        if line.len() > max_length {
            if !current_message.is_empty() {
                parts.push(current_message.trim_end().to_string());
                current_message.clear();
            }

            let mut chunk = String::new();
            for grapheme in line.graphemes(true) {
                if chunk.len() + grapheme.len() > max_length {
                    parts.push(chunk.trim_end().to_string());
                    chunk.clear();
                }
                chunk.push_str(grapheme);
            }
            if !chunk.is_empty() {
                current_message.push_str(&chunk);
                current_message.push('\n');
            }
            continue;
        }

        let new_length = current_message.len() + line.len() + 1; // +1 for newline
        if new_length > max_length && !current_message.is_empty() {
            parts.push(current_message.trim_end().to_string());
            current_message.clear();
        }
        current_message.push_str(line);
        current_message.push('\n');
    }

    if !current_message.trim().is_empty() {
        parts.push(current_message.trim_end().to_string());
    }

    parts
}

/// Safely truncates a string to a maximum character length (not bytes).
///
/// # Examples
///
/// ```
/// use paper_poll_bot::utils::truncate_str;
/// let s = "Привет, мир!";
/// assert_eq!(truncate_str(s, 6), "Привет");
/// ```
pub fn truncate_str(s: impl AsRef<str>, max_chars: usize) -> String {
    let s = s.as_ref();
    s.char_indices()
        .nth(max_chars)
        .map_or_else(|| s.to_string(), |(pos, _)| s[..pos].to_string())
}

/// Retry a Telegram API operation with exponential backoff and jitter.
///
/// - Initial delay: 500ms
/// - Max delay: 4s
/// - Max attempts: 3 (see `config.rs`)
///
/// # Errors
///
/// Returns the last error if every attempt fails.
pub async fn retry_telegram_operation<F, Fut, T>(operation: F) -> Result<T>
where
    F: FnMut() -> Fut,
    Fut: std::future::Future<Output = Result<T>>,
{
    use crate::config::{
        TELEGRAM_API_INITIAL_BACKOFF_MS, TELEGRAM_API_MAX_BACKOFF_MS, TELEGRAM_API_MAX_RETRIES,
    };

    let retry_strategy = ExponentialBackoff::from_millis(TELEGRAM_API_INITIAL_BACKOFF_MS)
        .max_delay(Duration::from_millis(TELEGRAM_API_MAX_BACKOFF_MS))
        .map(jitter)
        .take(TELEGRAM_API_MAX_RETRIES);

    Retry::spawn(retry_strategy, operation).await.map_err(|e| {
        warn!(
            "Telegram API operation failed after {} attempts: {}",
            TELEGRAM_API_MAX_RETRIES, e
        );
        e
    })
}
