//! Page acquisition.
//!
//! [`PageFetcher`] is the production [`PageSource`]: one GET, no retries,
//! redirects followed, body capped at [`ExtractionLimits::fetch_max_bytes`].
//! Transport errors never leave this module; they are mapped onto
//! [`FetchError`] with a message fit for end users.
use crate::error::FetchError;
use crate::limits::ExtractionLimits;
use async_trait::async_trait;
use reqwest::header::{HeaderMap, HeaderValue, ACCEPT, USER_AGENT};
use std::time::Duration;
use tailor_common::{Result, TailorError};
use tailor_http::{HttpClient, HttpError, RequestOpts};

pub const FETCH_USER_AGENT: &str =
    "Mozilla/5.0 (compatible; ResumeMatcher/1.0; +https://github.com/resume-matcher)";
pub const FETCH_ACCEPT: &str = "text/html,application/xhtml+xml";

/// A fetched document, possibly truncated to the byte cap.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RawPage {
    /// The URL as requested (trimmed), not the post-redirect location.
    pub url: String,
    pub body: String,
    pub truncated: bool,
}

/// Anything that can turn a URL into a [`RawPage`].
#[async_trait]
pub trait PageSource: Send + Sync {
    async fn fetch(&self, url: &str) -> std::result::Result<RawPage, FetchError>;
}

/// Check presence and scheme before any network traffic; returns the trimmed URL.
///
/// ```
/// use tailor_extract::fetch::validate_url;
/// use tailor_extract::FetchError;
///
/// assert_eq!(validate_url("  https://jobs.example.com/1 ").unwrap(), "https://jobs.example.com/1");
/// assert!(matches!(validate_url("ftp://example.com"), Err(FetchError::InvalidUrl(_))));
/// ```
pub fn validate_url(url: &str) -> std::result::Result<&str, FetchError> {
    let url = url.trim();
    if url.is_empty() {
        return Err(FetchError::InvalidUrl("URL is required".into()));
    }
    if !(url.starts_with("http://") || url.starts_with("https://")) {
        return Err(FetchError::InvalidUrl(
            "URL must start with http:// or https://".into(),
        ));
    }
    Ok(url)
}

pub struct PageFetcher {
    client: HttpClient,
    timeout: Duration,
    max_bytes: usize,
}

impl PageFetcher {
    pub fn new(limits: &ExtractionLimits) -> Result<Self> {
        // One deadline covers connect and body alike.
        let client = HttpClient::detached_with_connect_timeout(limits.fetch_timeout)
            .map_err(|e| TailorError::Config(format!("page fetcher init failed: {e}")))?
            .with_timeout(limits.fetch_timeout)
            .with_retries(0);
        Ok(Self {
            client,
            timeout: limits.fetch_timeout,
            max_bytes: limits.fetch_max_bytes,
        })
    }

    pub fn connect_timeout(&self) -> Duration {
        self.client.connect_timeout
    }

    fn request_opts(&self) -> RequestOpts<'static> {
        let mut headers = HeaderMap::new();
        headers.insert(USER_AGENT, HeaderValue::from_static(FETCH_USER_AGENT));
        headers.insert(ACCEPT, HeaderValue::from_static(FETCH_ACCEPT));
        RequestOpts {
            timeout: Some(self.timeout),
            retries: Some(0),
            headers: Some(headers),
            ..Default::default()
        }
    }
}

#[async_trait]
impl PageSource for PageFetcher {
    async fn fetch(&self, url: &str) -> std::result::Result<RawPage, FetchError> {
        let url = validate_url(url)?;

        let page = self
            .client
            .get_text(url, self.request_opts(), self.max_bytes)
            .await
            .map_err(|err| map_http_error(url, err))?;

        if page.truncated {
            tracing::info!(%url, max_bytes = self.max_bytes, "extract.fetch.truncated");
        }
        tracing::debug!(
            %url,
            final_url = %page.url,
            status = %page.status,
            body_len = page.text.len(),
            "extract.fetch.ok"
        );

        Ok(RawPage {
            url: url.to_string(),
            body: page.text,
            truncated: page.truncated,
        })
    }
}

fn map_http_error(url: &str, err: HttpError) -> FetchError {
    let mapped = match &err {
        HttpError::Timeout(_) => FetchError::Timeout,
        HttpError::Api { status, .. } => FetchError::HttpStatus(status.as_u16()),
        HttpError::Url(_) => FetchError::InvalidUrl("URL is not a valid web address".into()),
        HttpError::Build(_) | HttpError::Network(_) | HttpError::Decode(..) => {
            FetchError::Unreachable
        }
    };
    tracing::warn!(%url, error = %err, kind = ?mapped.kind(), "extract.fetch.failed");
    mapped
}

#[cfg(test)]
mod tests {
    use super::*;
    use reqwest::StatusCode;

    #[test]
    fn blank_url_is_required() {
        assert_eq!(
            validate_url("   "),
            Err(FetchError::InvalidUrl("URL is required".into()))
        );
    }

    #[test]
    fn scheme_is_checked_case_sensitively() {
        assert!(validate_url("HTTPS://example.com").is_err());
        assert!(validate_url("example.com/jobs").is_err());
        assert!(validate_url("http://example.com").is_ok());
    }

    #[test]
    fn http_errors_map_onto_closed_set() {
        let api = HttpError::Api {
            status: StatusCode::FORBIDDEN,
            message: "denied".into(),
            request_id: "-".into(),
        };
        assert_eq!(map_http_error("u", api), FetchError::HttpStatus(403));
        assert_eq!(
            map_http_error("u", HttpError::Timeout("slow".into())),
            FetchError::Timeout
        );
        assert_eq!(
            map_http_error("u", HttpError::Network("dns".into())),
            FetchError::Unreachable
        );
        assert!(matches!(
            map_http_error("u", HttpError::Url("bad".into())),
            FetchError::InvalidUrl(_)
        ));
    }
}
