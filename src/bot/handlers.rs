//! Handlers for each [`PaperRequest`](super::request::PaperRequest).

use super::resilient::{send_long_text_resilient, send_poll_resilient, send_text_resilient};
use crate::config::{Settings, MIN_POLL_OPTIONS};
use crate::papers::projection::{build_digest, build_poll_options, fit_poll_options};
use crate::papers::{ingest, IngestError, PaperRegistry, TitleError, TitleResolver};
use anyhow::Result;
use std::sync::Arc;
use teloxide::prelude::*;
use tracing::{error, info};

/// Reply sent when the registry is empty
pub const NO_PAPERS_TEXT: &str = "No papers in the log currently";
/// Reply sent after a successful submission
pub const ADDED_TEXT: &str = "Added";
/// Reply sent after clearing the registry
pub const CLEARED_TEXT: &str = "Cleared the papers";

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

/// Usage text listing the commands and how to submit a paper.
#[must_use]
pub fn usage_text(tag: &str) -> String {
    format!(
        "This is a bot for creating polls of papers.\n\n\
         Submit a paper by posting a message with {tag} and a link.\n\n\
         Available commands:\n\
         /poll - Post the poll to the current chat\n\
         /info - Post the descriptions of all the papers\n\
         /clear - Clear the papers\n"
    )
}

/// User-facing explanation of a failed submission.
#[must_use]
pub fn ingest_failure_text(err: &IngestError) -> String {
    match err {
        IngestError::Link(_) => "Could not add the paper: no link found in the message.".to_string(),
        IngestError::Title(TitleError::Fetch(detail)) => {
            format!("Could not add the paper: failed to fetch the page ({detail}).")
        }
        IngestError::Title(TitleError::TitleMissing) => {
            "Could not add the paper: the page has no title.".to_string()
        }
        IngestError::Store(_) => {
            "Could not add the paper: the papers log could not be saved.".to_string()
        }
    }
}

/// Usage handler (`/start`, `/help`)
///
/// # Errors
///
/// Returns an error if the usage message cannot be sent.
pub async fn usage(bot: Bot, msg: Message, settings: Arc<Settings>) -> Result<()> {
    info!(
        "User {} requested usage in chat {}.",
        get_user_name(&msg),
        msg.chat.id.0
    );
    send_text_resilient(&bot, msg.chat.id, usage_text(&settings.submission_tag), false).await?;
    Ok(())
}

/// Submission handler: store the paper and confirm, or explain the failure.
///
/// # Errors
///
/// Returns the ingestion error after the failure reply is sent, or an
/// error if a reply cannot be sent.
pub async fn submit(
    bot: Bot,
    msg: Message,
    text: String,
    registry: Arc<PaperRegistry>,
    resolver: Arc<dyn TitleResolver>,
    settings: Arc<Settings>,
) -> Result<()> {
    let user_name = get_user_name(&msg);
    info!("User {user_name} submitted a paper in chat {}.", msg.chat.id.0);

    match ingest(
        &text,
        &settings.submission_tag,
        settings.schema,
        resolver.as_ref(),
        &registry,
    )
    .await
    {
        Ok(record) => {
            info!("Paper {} from {user_name} added.", record.url);
            send_text_resilient(&bot, msg.chat.id, ADDED_TEXT, true).await?;
            Ok(())
        }
        Err(e) => {
            if let Err(send_err) =
                send_text_resilient(&bot, msg.chat.id, ingest_failure_text(&e), true).await
            {
                error!("Failed to report submission failure to {user_name}: {send_err}");
            }
            Err(e.into())
        }
    }
}

/// Poll handler
///
/// # Errors
///
/// Returns an error if the registry cannot be read or a message or the
/// poll cannot be sent.
pub async fn poll(
    bot: Bot,
    msg: Message,
    registry: Arc<PaperRegistry>,
    settings: Arc<Settings>,
) -> Result<()> {
    let records = registry.list().await?;
    if records.is_empty() {
        send_text_resilient(&bot, msg.chat.id, NO_PAPERS_TEXT, false).await?;
        return Ok(());
    }

    let fitted = fit_poll_options(build_poll_options(&records), settings.max_poll_options);
    if fitted.options.len() < MIN_POLL_OPTIONS {
        send_text_resilient(
            &bot,
            msg.chat.id,
            format!(
                "A poll needs at least {MIN_POLL_OPTIONS} papers, the log has {}.",
                fitted.options.len()
            ),
            false,
        )
        .await?;
        return Ok(());
    }

    info!(
        "Posting poll with {} options to chat {}.",
        fitted.options.len(),
        msg.chat.id.0
    );
    send_poll_resilient(&bot, msg.chat.id, &settings.poll_question, &fitted.options).await?;

    if fitted.omitted > 0 {
        send_text_resilient(
            &bot,
            msg.chat.id,
            format!(
                "{} papers did not fit in the poll (limit is {}).",
                fitted.omitted, settings.max_poll_options
            ),
            false,
        )
        .await?;
    }
    Ok(())
}

/// Digest handler (`/info`)
///
/// # Errors
///
/// Returns an error if the registry cannot be read or the digest cannot be sent.
pub async fn info(bot: Bot, msg: Message, registry: Arc<PaperRegistry>) -> Result<()> {
    let records = registry.list().await?;
    if records.is_empty() {
        send_text_resilient(&bot, msg.chat.id, NO_PAPERS_TEXT, false).await?;
        return Ok(());
    }

    info!(
        "Sending digest of {} papers to chat {}.",
        records.len(),
        msg.chat.id.0
    );
    send_long_text_resilient(&bot, msg.chat.id, &build_digest(&records)).await
}

/// Clear handler
///
/// # Errors
///
/// Returns an error if the registry cannot be cleared or the reply cannot be sent.
pub async fn clear(bot: Bot, msg: Message, registry: Arc<PaperRegistry>) -> Result<()> {
    info!(
        "User {} cleared the papers in chat {}.",
        get_user_name(&msg),
        msg.chat.id.0
    );

    match registry.clear().await {
        Ok(()) => {
            send_text_resilient(&bot, msg.chat.id, CLEARED_TEXT, false).await?;
            Ok(())
        }
        Err(e) => {
            error!("Error clearing the papers: {e}");
            send_text_resilient(
                &bot,
                msg.chat.id,
                "An error occurred while clearing the papers.",
                false,
            )
            .await?;
            Err(e.into())
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::papers::{LinkError, StoreError};

    #[test]
    fn test_usage_lists_commands() {
        let text = usage_text("#статья146");
        for cmd in ["/poll", "/info", "/clear", "#статья146"] {
            assert!(text.contains(cmd), "usage text lacks {cmd}");
        }
    }

    #[test]
    fn test_failure_text_names_cause() {
        let text = ingest_failure_text(&IngestError::Link(LinkError::NoLinkFound));
        assert!(text.contains("no link"));

        let text = ingest_failure_text(&IngestError::Title(TitleError::Fetch(
            "server answered 404 Not Found".to_string(),
        )));
        assert!(text.contains("404"));

        let text = ingest_failure_text(&IngestError::Store(StoreError::Io(
            std::io::Error::other("disk full"),
        )));
        assert!(text.contains("could not be saved"));
    }
}
