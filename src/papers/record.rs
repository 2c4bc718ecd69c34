//! Paper record and the persisted schema versions.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// One submitted article.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct PaperRecord {
    /// Original submitting text (absent in the `link_title` schema)
    pub message: Option<String>,
    /// Extracted link
    pub url: String,
    /// Resolved page title, empty when the page had no `<title>`
    pub title: String,
    /// Submitting text with the tag and link removed
    /// (only in the `message_link_title_description` schema)
    pub description: Option<String>,
}

impl PaperRecord {
    /// Build a record carrying only the fields stored by `schema`.
    #[must_use]
    pub fn for_schema(
        schema: SchemaVersion,
        message: &str,
        url: String,
        title: String,
        description: String,
    ) -> Self {
        Self {
            message: schema.has_message().then(|| message.to_string()),
            url,
            title,
            description: schema.has_description().then_some(description),
        }
    }
}

/// Column layout of the papers table.
///
/// All rows in one store share the same layout; switching layouts
/// requires clearing the store first.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SchemaVersion {
    /// `link, title`
    LinkTitle,
    /// `message, link, title`
    MessageLinkTitle,
    /// `message, link, title, description`
    #[default]
    MessageLinkTitleDescription,
}

impl SchemaVersion {
    /// Column names in table order, excluding the leading index column.
    #[must_use]
    pub const fn columns(self) -> &'static [&'static str] {
        match self {
            Self::LinkTitle => &["link", "title"],
            Self::MessageLinkTitle => &["message", "link", "title"],
            Self::MessageLinkTitleDescription => &["message", "link", "title", "description"],
        }
    }

    /// Whether rows keep the original message.
    #[must_use]
    pub const fn has_message(self) -> bool {
        !matches!(self, Self::LinkTitle)
    }

    /// Whether rows keep the cleaned description.
    #[must_use]
    pub const fn has_description(self) -> bool {
        matches!(self, Self::MessageLinkTitleDescription)
    }

    /// Find the schema whose columns are exactly `columns`.
    #[must_use]
    pub fn from_columns(columns: &[&str]) -> Option<Self> {
        [
            Self::LinkTitle,
            Self::MessageLinkTitle,
            Self::MessageLinkTitleDescription,
        ]
        .into_iter()
        .find(|schema| schema.columns() == columns)
    }

    /// Config/CLI name of the schema.
    #[must_use]
    pub const fn name(self) -> &'static str {
        match self {
            Self::LinkTitle => "link_title",
            Self::MessageLinkTitle => "message_link_title",
            Self::MessageLinkTitleDescription => "message_link_title_description",
        }
    }
}

impl fmt::Display for SchemaVersion {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for SchemaVersion {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim() {
            "link_title" => Ok(Self::LinkTitle),
            "message_link_title" => Ok(Self::MessageLinkTitle),
            "message_link_title_description" => Ok(Self::MessageLinkTitleDescription),
            other => Err(format!("unknown papers schema: {other}")),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_for_schema_drops_unstored_fields() {
        let record = PaperRecord::for_schema(
            SchemaVersion::LinkTitle,
            "#tag see http://x.test/a",
            "http://x.test/a".to_string(),
            "A".to_string(),
            "see".to_string(),
        );
        assert_eq!(record.message, None);
        assert_eq!(record.description, None);

        let record = PaperRecord::for_schema(
            SchemaVersion::MessageLinkTitle,
            "#tag see http://x.test/a",
            "http://x.test/a".to_string(),
            "A".to_string(),
            "see".to_string(),
        );
        assert_eq!(record.message.as_deref(), Some("#tag see http://x.test/a"));
        assert_eq!(record.description, None);

        let record = PaperRecord::for_schema(
            SchemaVersion::MessageLinkTitleDescription,
            "#tag see http://x.test/a",
            "http://x.test/a".to_string(),
            "A".to_string(),
            "see".to_string(),
        );
        assert_eq!(record.description.as_deref(), Some("see"));
    }

    #[test]
    fn test_schema_columns_lookup() {
        assert_eq!(
            SchemaVersion::from_columns(&["message", "link", "title"]),
            Some(SchemaVersion::MessageLinkTitle)
        );
        assert_eq!(SchemaVersion::from_columns(&["title", "link"]), None);
    }

    #[test]
    fn test_schema_parse() {
        assert_eq!(
            "link_title".parse::<SchemaVersion>(),
            Ok(SchemaVersion::LinkTitle)
        );
        assert!("links".parse::<SchemaVersion>().is_err());
        assert_eq!(
            SchemaVersion::MessageLinkTitleDescription.to_string(),
            "message_link_title_description"
        );
    }
}
