//! Resilient messaging with automatic retry for Telegram API operations.
//!
//! Wraps the sends the bot makes (plain replies and polls) with
//! [`crate::utils::retry_telegram_operation`], which retries transient
//! failures with exponential backoff and jitter.

use crate::utils::{retry_telegram_operation, split_long_message};
use anyhow::Result;
use teloxide::prelude::*;
use teloxide::types::{ChatId, InputPollOption, LinkPreviewOptions, Message};

/// Maximum message length for Telegram with safety margin.
/// Telegram's limit is 4096 characters.
pub const TELEGRAM_MESSAGE_LIMIT: usize = 4000;

fn disabled_link_preview() -> LinkPreviewOptions {
    LinkPreviewOptions {
        is_disabled: true,
        url: None,
        prefer_small_media: false,
        prefer_large_media: false,
        show_above_text: false,
    }
}

/// Send a plain text message with automatic retry on failures.
///
/// # Errors
///
/// Returns an error after all retries are exhausted.
pub async fn send_text_resilient(
    bot: &Bot,
    chat_id: ChatId,
    text: impl Into<String>,
    disable_link_preview: bool,
) -> Result<Message> {
    let text = text.into();
    let text = &text;
    retry_telegram_operation(move || async move {
        let mut req = bot.send_message(chat_id, text.clone());
        if disable_link_preview {
            req = req.link_preview_options(disabled_link_preview());
        }
        req.await
            .map_err(|e| anyhow::anyhow!("Telegram send error: {e}"))
    })
    .await
}

/// Send text of any length as consecutive messages without link previews.
///
/// # Errors
///
/// Returns an error if any part fails to send after retries.
pub async fn send_long_text_resilient(bot: &Bot, chat_id: ChatId, text: &str) -> Result<()> {
    for part in split_long_message(text, TELEGRAM_MESSAGE_LIMIT) {
        send_text_resilient(bot, chat_id, part, true).await?;
    }
    Ok(())
}

/// Post an anonymous poll that allows multiple answers.
///
/// # Errors
///
/// Returns an error after all retries are exhausted, including when
/// Telegram rejects the option list.
pub async fn send_poll_resilient(
    bot: &Bot,
    chat_id: ChatId,
    question: &str,
    options: &[String],
) -> Result<Message> {
    retry_telegram_operation(move || async move {
        bot.send_poll(
            chat_id,
            question,
            options.iter().map(|o| InputPollOption::new(o.clone())),
        )
        .is_anonymous(true)
        .allows_multiple_answers(true)
        .await
        .map_err(|e| anyhow::anyhow!("Telegram poll error: {e}"))
    })
    .await
}
