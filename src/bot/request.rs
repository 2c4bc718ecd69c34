//! Classification of incoming chat text into a closed set of requests.

use teloxide::utils::command::BotCommands;

/// Supported commands for the bot
#[derive(BotCommands, Clone, Debug, PartialEq, Eq)]
#[command(rename_rule = "lowercase", description = "Supported commands:")]
pub enum Command {
    /// Show usage
    #[command(description = "Show usage.")]
    Start,
    /// Show usage
    #[command(description = "Show usage.")]
    Help,
    /// Post the poll
    #[command(description = "Post the poll to the current chat.")]
    Poll,
    /// Post the digest
    #[command(description = "Post the descriptions of all the papers.")]
    Info,
    /// Clear the registry
    #[command(description = "Clear the papers.")]
    Clear,
}

/// Everything the bot reacts to.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum PaperRequest {
    /// `/start` or `/help`
    Usage,
    /// `/poll`
    Poll,
    /// `/info`
    Info,
    /// `/clear`
    Clear,
    /// A message carrying the submission tag; holds the full text
    Submit(String),
}

impl From<Command> for PaperRequest {
    fn from(cmd: Command) -> Self {
        match cmd {
            Command::Start | Command::Help => Self::Usage,
            Command::Poll => Self::Poll,
            Command::Info => Self::Info,
            Command::Clear => Self::Clear,
        }
    }
}

impl PaperRequest {
    /// Classify `text`. Commands take precedence over submissions;
    /// anything else yields `None` and is ignored.
    ///
    /// # Examples
    ///
    /// ```
    /// use paper_poll_bot::bot::request::PaperRequest;
    /// assert_eq!(PaperRequest::classify("/poll", "jc_bot", "#paper"), Some(PaperRequest::Poll));
    /// assert_eq!(PaperRequest::classify("good morning", "jc_bot", "#paper"), None);
    /// ```
    #[must_use]
    pub fn classify(text: &str, bot_username: &str, tag: &str) -> Option<Self> {
        if let Ok(cmd) = Command::parse(text, bot_username) {
            return Some(cmd.into());
        }
        (!tag.is_empty() && text.contains(tag)).then(|| Self::Submit(text.to_string()))
    }
}
