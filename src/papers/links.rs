//! Link extraction from free-text submissions.

// lazy_regex! validates the pattern at compile time
#![allow(clippy::non_std_lazy_statics)]

use lazy_regex::lazy_regex;
use thiserror::Error;

/// Match an http(s) link: scheme followed by non-whitespace characters.
///
/// Trailing punctuation is captured as part of the link.
static RE_LINK: lazy_regex::Lazy<regex::Regex> = lazy_regex!(r"https?://\S+");

/// Errors returned by link extraction
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum LinkError {
    /// The text contains no http(s) link
    #[error("no link found in the message")]
    NoLinkFound,
}

/// Returns the first http(s) link in `text`, verbatim.
///
/// # Errors
///
/// Returns [`LinkError::NoLinkFound`] if the text has no link.
///
/// # Examples
///
/// ```
/// use paper_poll_bot::papers::links::extract_link;
/// let url = extract_link("see http://x.test/a, thanks");
/// assert_eq!(url, Ok("http://x.test/a,"));
/// ```
pub fn extract_link(text: &str) -> Result<&str, LinkError> {
    RE_LINK
        .find(text)
        .map(|m| m.as_str())
        .ok_or(LinkError::NoLinkFound)
}

/// Removes links from `text` and trims surrounding whitespace.
///
/// Every link is removed, so the result never contains the link
/// returned by [`extract_link`].
#[must_use]
pub fn strip_link(text: &str) -> String {
    RE_LINK.replace_all(text, "").trim().to_string()
}

/// Removes the submission tag from `text` and trims surrounding whitespace.
#[must_use]
pub fn strip_tag(text: &str, tag: &str) -> String {
    if tag.is_empty() {
        return text.trim().to_string();
    }
    text.replace(tag, "").trim().to_string()
}
