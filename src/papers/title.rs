//! Page title resolution.
//!
//! Fetches the HTML behind a submitted link and extracts the text of its
//! first `<title>` element.

use crate::config::{TITLE_FETCH_MAX_REDIRECTS, TITLE_FETCH_RETRIES, TITLE_FETCH_RETRY_DELAY_MS};
use async_trait::async_trait;
use reqwest::Client as HttpClient;
use scraper::{Html, Selector};
use std::time::Duration;
use thiserror::Error;
use tokio_retry::strategy::FixedInterval;
use tokio_retry::RetryIf;
use tracing::{debug, warn};

/// Errors that can occur while resolving a page title
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum TitleError {
    /// Network failure, non-success status or undecodable body
    #[error("failed to fetch the page: {0}")]
    Fetch(String),
    /// The page has no `<title>` element
    #[error("the page has no title")]
    TitleMissing,
}

impl TitleError {
    /// Only fetch failures are worth another attempt.
    #[must_use]
    pub const fn is_retryable(&self) -> bool {
        matches!(self, Self::Fetch(_))
    }
}

/// Interface for title resolvers
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait TitleResolver: Send + Sync {
    /// Resolve the page title behind `url`.
    async fn resolve_title(&self, url: &str) -> Result<String, TitleError>;
}

/// Title resolver backed by an HTTP GET.
pub struct HttpTitleResolver {
    client: HttpClient,
    retry_delay: Duration,
}

impl HttpTitleResolver {
    /// Create a resolver whose requests time out after `timeout`.
    #[must_use]
    pub fn new(timeout: Duration) -> Self {
        let client = HttpClient::builder()
            .timeout(timeout)
            .user_agent(concat!("paper-poll-bot/", env!("CARGO_PKG_VERSION")))
            .redirect(reqwest::redirect::Policy::limited(TITLE_FETCH_MAX_REDIRECTS))
            .build()
            .unwrap_or_else(|_| HttpClient::new());
        Self {
            client,
            retry_delay: Duration::from_millis(TITLE_FETCH_RETRY_DELAY_MS),
        }
    }

    /// Override the pause before the retry attempt.
    #[must_use]
    pub const fn with_retry_delay(mut self, delay: Duration) -> Self {
        self.retry_delay = delay;
        self
    }

    async fn fetch_html(&self, url: &str) -> Result<String, TitleError> {
        let response = self
            .client
            .get(url)
            .send()
            .await
            .map_err(|e| TitleError::Fetch(e.to_string()))?;

        let status = response.status();
        if !status.is_success() {
            return Err(TitleError::Fetch(format!("server answered {status}")));
        }

        let body = response
            .bytes()
            .await
            .map_err(|e| TitleError::Fetch(e.to_string()))?;

        String::from_utf8(body.to_vec())
            .map_err(|e| TitleError::Fetch(format!("body is not valid UTF-8: {e}")))
    }

    async fn resolve_once(&self, url: &str) -> Result<String, TitleError> {
        let html = self.fetch_html(url).await?;
        parse_title(&html)
    }
}

#[async_trait]
impl TitleResolver for HttpTitleResolver {
    async fn resolve_title(&self, url: &str) -> Result<String, TitleError> {
        let strategy = FixedInterval::new(self.retry_delay).take(TITLE_FETCH_RETRIES);

        RetryIf::spawn(
            strategy,
            move || async move {
                let result = self.resolve_once(url).await;
                if let Err(e) = &result {
                    debug!("Title fetch attempt for {url} failed: {e}");
                }
                result
            },
            TitleError::is_retryable,
        )
        .await
        .map_err(|e| {
            warn!("Title resolution for {url} failed: {e}");
            e
        })
    }
}

/// Extracts the text of the first `<title>` element, whitespace-trimmed.
///
/// # Errors
///
/// Returns [`TitleError::TitleMissing`] if the document has no `<title>`.
///
/// # Examples
///
/// ```
/// use paper_poll_bot::papers::title::parse_title;
/// let html = "<html><head><title> Example </title></head></html>";
/// assert_eq!(parse_title(html), Ok("Example".to_string()));
/// ```
pub fn parse_title(html: &str) -> Result<String, TitleError> {
    let document = Html::parse_document(html);
    let selector = Selector::parse("title").map_err(|_| TitleError::TitleMissing)?;

    document
        .select(&selector)
        .next()
        .map(|el| el.text().collect::<String>().trim().to_string())
        .ok_or(TitleError::TitleMissing)
}
