//! Projections of the registry into poll options and a text digest.

use super::record::PaperRecord;
use crate::utils::truncate_str;

/// Telegram limit on the length of a poll option, in characters.
pub const POLL_OPTION_MAX_CHARS: usize = 100;

/// Titles this long or longer are shortened.
const POLL_OPTION_TRUNCATE_AT: usize = 99;

/// Characters kept from a shortened title, before the ellipsis.
const POLL_OPTION_KEEP_CHARS: usize = 97;

/// Separator placed between digest entries.
pub const DIGEST_SEPARATOR: &str = "\n\n####################\n\n";

/// One poll option per record, in registry order.
///
/// Titles of 99 characters or more are cut to 97 characters followed by
/// `...`, so every option fits the platform limit of 100 characters.
#[must_use]
pub fn build_poll_options(records: &[PaperRecord]) -> Vec<String> {
    records
        .iter()
        .map(|record| poll_option(&record.title))
        .collect()
}

fn poll_option(title: &str) -> String {
    if title.chars().count() < POLL_OPTION_TRUNCATE_AT {
        return title.to_string();
    }
    format!("{}...", truncate_str(title, POLL_OPTION_KEEP_CHARS))
}

/// Poll options trimmed to what one poll can carry.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FittedPoll {
    /// Options to post
    pub options: Vec<String>,
    /// Number of papers that did not fit
    pub omitted: usize,
}

/// Keep the first `max_options` options.
#[must_use]
pub fn fit_poll_options(mut options: Vec<String>, max_options: usize) -> FittedPoll {
    let omitted = options.len().saturating_sub(max_options);
    options.truncate(max_options);
    FittedPoll { options, omitted }
}

/// Human-readable summary of all records.
///
/// Each entry is the title, a blank line, then the link, or the original
/// message when the record keeps one. Entries are joined by
/// [`DIGEST_SEPARATOR`]. Titles are not escaped.
#[must_use]
pub fn build_digest(records: &[PaperRecord]) -> String {
    records
        .iter()
        .map(|record| {
            let body = record.message.as_deref().unwrap_or(&record.url);
            format!("{}\n\n{}", record.title, body)
        })
        .collect::<Vec<_>>()
        .join(DIGEST_SEPARATOR)
}
