//! Submission pipeline: tagged chat text in, stored paper record out.

use super::links::{extract_link, strip_link, strip_tag, LinkError};
use super::record::{PaperRecord, SchemaVersion};
use super::registry::PaperRegistry;
use super::store::StoreError;
use super::title::{TitleError, TitleResolver};
use thiserror::Error;
use tracing::{info, warn};

/// Errors that abort a submission. Nothing is stored when one occurs.
#[derive(Error, Debug)]
pub enum IngestError {
    /// The message has no link
    #[error(transparent)]
    Link(#[from] LinkError),
    /// The page title could not be fetched
    #[error(transparent)]
    Title(#[from] TitleError),
    /// The registry could not be updated
    #[error("storage error: {0}")]
    Store(#[from] StoreError),
}

/// Turn a submission message into a record and append it to `registry`.
///
/// The tag is removed before the link is extracted. A page without a
/// `<title>` is stored with an empty title.
///
/// # Errors
///
/// Returns [`IngestError::Link`] if there is no link (no fetch is made),
/// [`IngestError::Title`] if the page cannot be fetched, or
/// [`IngestError::Store`] if the registry cannot be written.
pub async fn ingest(
    text: &str,
    tag: &str,
    schema: SchemaVersion,
    resolver: &dyn TitleResolver,
    registry: &PaperRegistry,
) -> Result<PaperRecord, IngestError> {
    let untagged = strip_tag(text, tag);
    let url = extract_link(&untagged)?;

    let title = match resolver.resolve_title(url).await {
        Ok(title) => title,
        Err(TitleError::TitleMissing) => {
            warn!("Page {url} has no <title>, storing an empty title.");
            String::new()
        }
        Err(e) => return Err(e.into()),
    };

    let record = PaperRecord::for_schema(
        schema,
        text,
        url.to_string(),
        title,
        strip_link(&untagged),
    );
    registry.add(record.clone()).await?;

    info!("Stored paper {} ({}).", record.url, record.title);
    Ok(record)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::papers::store::MockPaperStore;
    use crate::papers::title::MockTitleResolver;

    const TAG: &str = "#статья146";

    fn resolver_returning(result: Result<String, TitleError>) -> MockTitleResolver {
        let mut resolver = MockTitleResolver::new();
        resolver
            .expect_resolve_title()
            .withf(|url: &str| url == "http://x.test/a")
            .times(1)
            .returning(move |_| result.clone());
        resolver
    }

    fn accepting_store() -> MockPaperStore {
        let mut store = MockPaperStore::new();
        store.expect_load().returning(|| Ok(Vec::new()));
        store.expect_save().returning(|_| Ok(()));
        store
    }

    #[tokio::test]
    async fn test_ingest_builds_full_record() -> Result<(), IngestError> {
        let resolver = resolver_returning(Ok("Example".to_string()));
        let registry = PaperRegistry::new(accepting_store());
        let text = "#статья146 check this out http://x.test/a";

        let record = ingest(
            text,
            TAG,
            SchemaVersion::MessageLinkTitleDescription,
            &resolver,
            &registry,
        )
        .await?;

        assert_eq!(record.url, "http://x.test/a");
        assert_eq!(record.title, "Example");
        assert_eq!(record.description.as_deref(), Some("check this out"));
        assert_eq!(record.message.as_deref(), Some(text));
        Ok(())
    }

    #[tokio::test]
    async fn test_ingest_missing_title_stores_empty() -> Result<(), IngestError> {
        let resolver = resolver_returning(Err(TitleError::TitleMissing));
        let registry = PaperRegistry::new(accepting_store());

        let record = ingest(
            "#статья146 http://x.test/a",
            TAG,
            SchemaVersion::LinkTitle,
            &resolver,
            &registry,
        )
        .await?;

        assert_eq!(record.title, "");
        assert_eq!(record.message, None);
        Ok(())
    }

    #[tokio::test]
    async fn test_ingest_without_link_skips_fetch_and_store() {
        let mut resolver = MockTitleResolver::new();
        resolver.expect_resolve_title().never();
        let mut store = MockPaperStore::new();
        store.expect_load().never();
        store.expect_save().never();
        let registry = PaperRegistry::new(store);

        let result = ingest(
            "#статья146 no link here",
            TAG,
            SchemaVersion::LinkTitle,
            &resolver,
            &registry,
        )
        .await;

        assert!(matches!(result, Err(IngestError::Link(LinkError::NoLinkFound))));
    }

    #[tokio::test]
    async fn test_ingest_fetch_failure_skips_store() {
        let resolver = resolver_returning(Err(TitleError::Fetch("timed out".to_string())));
        let mut store = MockPaperStore::new();
        store.expect_load().never();
        store.expect_save().never();
        let registry = PaperRegistry::new(store);

        let result = ingest(
            "#статья146 http://x.test/a",
            TAG,
            SchemaVersion::LinkTitle,
            &resolver,
            &registry,
        )
        .await;

        assert!(matches!(result, Err(IngestError::Title(TitleError::Fetch(_)))));
    }
}
