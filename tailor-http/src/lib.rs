//! Minimal HTTP client with safe logging, retries, and body caps.
//!
//! - Request options: headers, `Auth`, timeout, retries
//! - JSON helpers for provider APIs and a capped text GET for web pages
//! - Retries network failures and 429/5xx with exponential backoff and
//!   `Retry-After` support
//! - Optional *raw* response logging via `TAILOR_HTTP_RAW=1`
//!
//! Example (no_run):
//! ```rust
//! # async fn demo() -> Result<(), tailor_http::HttpError> {
//! let client = tailor_http::HttpClient::detached()?;
//! let page = client
//!     .get_text("https://example.com/jobs/42", tailor_http::RequestOpts::default(), 1_000_000)
//!     .await?;
//! println!("{} bytes (truncated: {})", page.text.len(), page.truncated);
//! # Ok(()) }
//! ```
//!
//! Security: bearer tokens are sanitized before use, and logs only ever
//! include the auth kind (bearer/header/none), never the secret.

use reqwest::header::{CONTENT_TYPE, HeaderMap, HeaderName, HeaderValue, RETRY_AFTER};
use reqwest::{Client, Method, StatusCode, Url};
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use std::env;
use std::sync::atomic::{AtomicU64, Ordering};
use std::time::{Duration, Instant};
use thiserror::Error;
use tokio::time::sleep;

const RAW_ENV: &str = "TAILOR_HTTP_RAW";
const RAW_MAX_BODY: usize = 64 * 1024;
const SNIPPET_MAX: usize = 500;
const DEFAULT_CONNECT_TIMEOUT: Duration = Duration::from_secs(10);

static REQUEST_SEQ: AtomicU64 = AtomicU64::new(1);

fn raw_enabled() -> bool {
    matches!(
        env::var(RAW_ENV).as_deref(),
        Ok("1") | Ok("true") | Ok("yes")
    )
}

// ==============================
// Errors
// ==============================

#[derive(Debug, Error)]
pub enum HttpError {
    #[error("invalid URL: {0}")]
    Url(String),
    #[error("request build failed: {0}")]
    Build(String),
    #[error("request timed out: {0}")]
    Timeout(String),
    #[error("network error: {0}")]
    Network(String),
    #[error("decode error: {0}, body_snippet: {1}")]
    Decode(String, String),
    #[error("server returned error {status}: {message}, request_id={request_id}")]
    Api {
        status: StatusCode,
        message: String,
        request_id: String,
    },
}

impl HttpError {
    /// HTTP status for [`HttpError::Api`], `None` for transport-level failures.
    pub fn status(&self) -> Option<StatusCode> {
        match self {
            HttpError::Api { status, .. } => Some(*status),
            _ => None,
        }
    }

    fn from_transport(err: &reqwest::Error) -> Self {
        if err.is_timeout() {
            HttpError::Timeout(err.to_string())
        } else {
            HttpError::Network(err.to_string())
        }
    }
}

// ==============================
// Auth & Request Options
// ==============================

/// Authentication strategies supported by the HTTP client helpers.
///
/// ```
/// use tailor_http::Auth;
///
/// let bearer = Auth::Bearer("token");
/// match bearer {
///     Auth::Bearer(value) => assert_eq!(value, "token"),
///     _ => unreachable!(),
/// }
/// ```
#[derive(Clone, Debug)]
pub enum Auth<'a> {
    /// Authorization: Bearer <token>
    Bearer(&'a str),
    /// Custom header, e.g. `api-key` for gateways.
    Header {
        name: HeaderName,
        value: HeaderValue,
    },
    None,
}

/// Per-request tuning knobs for the HTTP client.
///
/// ```
/// use tailor_http::RequestOpts;
/// use std::time::Duration;
///
/// let opts = RequestOpts {
///     timeout: Some(Duration::from_secs(25)),
///     retries: Some(0),
///     ..Default::default()
/// };
///
/// assert_eq!(opts.timeout.unwrap().as_secs(), 25);
/// assert!(opts.headers.is_none());
/// ```
#[derive(Clone, Debug, Default)]
pub struct RequestOpts<'a> {
    pub timeout: Option<Duration>,
    pub retries: Option<usize>,
    pub auth: Option<Auth<'a>>,
    pub headers: Option<HeaderMap>,
}

/// Body of a text GET after capping and lenient UTF-8 decoding.
#[derive(Debug, Clone)]
pub struct TextBody {
    /// Final URL after redirects.
    pub url: Url,
    pub status: StatusCode,
    pub content_type: Option<String>,
    pub text: String,
    /// True when the body exceeded the byte cap and was cut.
    pub truncated: bool,
}

struct RawResponse {
    url: Url,
    status: StatusCode,
    headers: HeaderMap,
    body: Vec<u8>,
    truncated: bool,
    req_id: String,
}

// ==============================
// Client
// ==============================

#[derive(Clone)]
pub struct HttpClient {
    base: Option<Url>,
    inner: Client,
    pub default_timeout: Duration,
    pub connect_timeout: Duration,
    pub max_retries: usize,
}

impl HttpClient {
    /// Construct a client anchored to a base URL.
    ///
    /// ```no_run
    /// use tailor_http::{HttpClient, HttpError};
    /// use std::time::Duration;
    ///
    /// let client = HttpClient::new("https://api.example.com/v1/")?;
    /// assert_eq!(client.default_timeout, Duration::from_secs(60));
    /// assert_eq!(client.max_retries, 2);
    /// # Ok::<(), HttpError>(())
    /// ```
    pub fn new(base: &str) -> Result<Self, HttpError> {
        let base = Url::parse(base).map_err(|e| HttpError::Url(e.to_string()))?;
        let mut client = Self::detached()?;
        client.base = Some(base);
        Ok(client)
    }

    /// Construct a client without a base URL; every path must be absolute.
    ///
    /// Redirects follow reqwest's default policy (up to 10 hops).
    pub fn detached() -> Result<Self, HttpError> {
        Self::detached_with_connect_timeout(DEFAULT_CONNECT_TIMEOUT)
    }

    /// Like [`detached`](Self::detached) with an explicit budget for the
    /// connect phase. Callers with one overall deadline pass that deadline.
    ///
    /// ```
    /// use tailor_http::{HttpClient, HttpError};
    /// use std::time::Duration;
    ///
    /// let client = HttpClient::detached_with_connect_timeout(Duration::from_secs(25))?;
    /// assert_eq!(client.connect_timeout, Duration::from_secs(25));
    /// # Ok::<(), HttpError>(())
    /// ```
    pub fn detached_with_connect_timeout(connect_timeout: Duration) -> Result<Self, HttpError> {
        let inner = Client::builder()
            .connect_timeout(connect_timeout)
            .build()
            .map_err(|e| HttpError::Build(e.to_string()))?;
        Ok(Self {
            base: None,
            inner,
            default_timeout: Duration::from_secs(60),
            connect_timeout,
            max_retries: 2,
        })
    }

    /// Override the default timeout.
    ///
    /// ```no_run
    /// use tailor_http::{HttpClient, HttpError};
    /// use std::time::Duration;
    ///
    /// let client = HttpClient::detached()?.with_timeout(Duration::from_secs(2));
    /// assert_eq!(client.default_timeout, Duration::from_secs(2));
    /// # Ok::<(), HttpError>(())
    /// ```
    pub fn with_timeout(mut self, dur: Duration) -> Self {
        self.default_timeout = dur;
        self
    }

    /// Override the default retry budget.
    pub fn with_retries(mut self, n: usize) -> Self {
        self.max_retries = n;
        self
    }

    /// POST JSON using optional Bearer auth.
    pub async fn post_json<B, T>(
        &self,
        path: &str,
        bearer: Option<&str>,
        body: &B,
    ) -> Result<T, HttpError>
    where
        B: Serialize + ?Sized,
        T: DeserializeOwned,
    {
        let opts = RequestOpts {
            auth: bearer.map(Auth::Bearer),
            ..Default::default()
        };
        self.post_json_opts(path, body, opts).await
    }

    /// POST JSON with per-request options.
    pub async fn post_json_opts<B, T>(
        &self,
        path: &str,
        body: &B,
        opts: RequestOpts<'_>,
    ) -> Result<T, HttpError>
    where
        B: Serialize + ?Sized,
        T: DeserializeOwned,
    {
        let bytes = serde_json::to_vec(body).map_err(|e| HttpError::Build(e.to_string()))?;
        let raw = self
            .execute(Method::POST, path, Some(bytes), &opts, None)
            .await?;
        decode_json(raw)
    }

    /// GET JSON with per-request options.
    pub async fn get_json<T>(&self, path: &str, opts: RequestOpts<'_>) -> Result<T, HttpError>
    where
        T: DeserializeOwned,
    {
        let raw = self.execute(Method::GET, path, None, &opts, None).await?;
        decode_json(raw)
    }

    /// GET a text document, keeping at most `max_bytes` of the body.
    ///
    /// Bytes past the cap are never read. The kept prefix is decoded
    /// leniently: an incomplete trailing UTF-8 sequence is dropped and other
    /// invalid bytes become U+FFFD.
    pub async fn get_text(
        &self,
        path: &str,
        opts: RequestOpts<'_>,
        max_bytes: usize,
    ) -> Result<TextBody, HttpError> {
        let raw = self
            .execute(Method::GET, path, None, &opts, Some(max_bytes))
            .await?;
        let content_type = raw
            .headers
            .get(CONTENT_TYPE)
            .and_then(|v| v.to_str().ok())
            .map(str::to_string);
        tracing::debug!(
            req_id=%raw.req_id,
            final_url=%raw.url,
            body_len=raw.body.len(),
            truncated=raw.truncated,
            content_type=?content_type,
            "http.response.text"
        );
        Ok(TextBody {
            text: decode_with_charset(&raw.body, content_type.as_deref(), raw.truncated),
            url: raw.url,
            status: raw.status,
            content_type,
            truncated: raw.truncated,
        })
    }

    fn resolve(&self, path: &str) -> Result<Url, HttpError> {
        if let Ok(abs) = Url::parse(path) {
            return Ok(abs);
        }
        match &self.base {
            Some(base) => base.join(path).map_err(|e| HttpError::Url(e.to_string())),
            None => Err(HttpError::Url(format!("relative path without base: {path}"))),
        }
    }

    // ==============================
    // Core request implementation
    // ==============================

    async fn execute(
        &self,
        method: Method,
        path: &str,
        body: Option<Vec<u8>>,
        opts: &RequestOpts<'_>,
        max_body: Option<usize>,
    ) -> Result<RawResponse, HttpError> {
        let url = self.resolve(path)?;
        let max_retries = opts.retries.unwrap_or(self.max_retries);
        let timeout = opts.timeout.unwrap_or(self.default_timeout);
        let auth_kind = match &opts.auth {
            Some(Auth::Bearer(_)) => "bearer",
            Some(Auth::Header { .. }) => "header",
            Some(Auth::None) | None => "none",
        };
        let mut attempt = 0usize;

        loop {
            let mut rb = self
                .inner
                .request(method.clone(), url.clone())
                .timeout(timeout);
            if let Some(bytes) = &body {
                rb = rb
                    .header(CONTENT_TYPE, "application/json")
                    .body(bytes.clone());
            }
            if let Some(hdrs) = &opts.headers {
                rb = rb.headers(hdrs.clone());
            }
            match &opts.auth {
                Some(Auth::Bearer(tok)) => rb = rb.bearer_auth(sanitize_api_key(tok)?),
                Some(Auth::Header { name, value }) => rb = rb.header(name, value),
                Some(Auth::None) | None => {}
            }

            let req_id = format!("r{:x}", REQUEST_SEQ.fetch_add(1, Ordering::Relaxed));
            tracing::debug!(
                req_id=%req_id,
                attempt=attempt + 1,
                max_retries,
                method=%method,
                host_path=%format!("{}{}", url.host_str().unwrap_or("-"), url.path()),
                timeout_ms=timeout.as_millis() as u64,
                auth_kind,
                has_body=%body.is_some(),
                "http.request.start"
            );

            let t0 = Instant::now();
            let sent = rb.send().await;
            let outcome = match sent {
                Ok(mut resp) => {
                    let status = resp.status();
                    let headers = resp.headers().clone();
                    let final_url = resp.url().clone();
                    read_capped(&mut resp, max_body)
                        .await
                        .map(|(bytes, truncated)| (status, headers, final_url, bytes, truncated))
                }
                Err(err) => Err(err),
            };

            let (status, headers, final_url, bytes, truncated) = match outcome {
                Ok(parts) => parts,
                Err(err) => {
                    let mapped = HttpError::from_transport(&err);
                    if attempt < max_retries {
                        attempt += 1;
                        let delay = backoff(attempt);
                        tracing::warn!(
                            req_id=%req_id,
                            attempt,
                            max_retries,
                            backoff_ms=delay.as_millis() as u64,
                            error=%mapped,
                            "http.retrying.transport"
                        );
                        sleep(delay).await;
                        continue;
                    }
                    tracing::warn!(req_id=%req_id, attempt, error=%mapped, "http.transport_error");
                    return Err(mapped);
                }
            };
            let dur_ms = t0.elapsed().as_millis() as u64;

            let x_request_id = headers
                .get("x-request-id")
                .or_else(|| headers.get("x-correlation-id"))
                .and_then(|v| v.to_str().ok())
                .unwrap_or("-")
                .to_string();

            tracing::debug!(
                req_id=%req_id,
                %status,
                duration_ms=dur_ms,
                body_len=bytes.len(),
                truncated,
                x_request_id=%x_request_id,
                "http.response.headers"
            );

            if raw_enabled() {
                let cut = bytes.len().min(RAW_MAX_BODY);
                let log_truncated = bytes.len() > RAW_MAX_BODY;
                tracing::info!(
                    target: "http.raw",
                    %req_id,
                    %status,
                    duration_ms=dur_ms,
                    body=%String::from_utf8_lossy(&bytes[..cut]),
                    truncated=log_truncated,
                    "response"
                );
            }

            if status.is_success() {
                return Ok(RawResponse {
                    url: final_url,
                    status,
                    headers,
                    body: bytes,
                    truncated,
                    req_id,
                });
            }

            let message = extract_error_message(&bytes);
            let snippet = snip_body(&bytes);
            let retryable = status == StatusCode::TOO_MANY_REQUESTS || status.is_server_error();

            if retryable && attempt < max_retries {
                attempt += 1;
                let delay = match retry_after_delay_secs(&headers) {
                    Some(secs) => Duration::from_secs(secs),
                    None if status == StatusCode::TOO_MANY_REQUESTS => {
                        backoff(attempt).max(Duration::from_millis(1100))
                    }
                    None => backoff(attempt),
                };
                tracing::warn!(
                    req_id=%req_id,
                    %status,
                    attempt,
                    max_retries,
                    backoff_ms=delay.as_millis() as u64,
                    message=%message,
                    "http.retrying"
                );
                sleep(delay).await;
                continue;
            }

            tracing::warn!(
                req_id=%req_id,
                %status,
                message=%message,
                x_request_id=%x_request_id,
                body_snippet=%snippet,
                "http.error"
            );
            return Err(HttpError::Api {
                status,
                message,
                request_id: x_request_id,
            });
        }
    }
}

// ==============================
// Helpers
// ==============================

async fn read_capped(
    resp: &mut reqwest::Response,
    cap: Option<usize>,
) -> Result<(Vec<u8>, bool), reqwest::Error> {
    let mut buf = Vec::new();
    while let Some(chunk) = resp.chunk().await? {
        if let Some(cap) = cap {
            let room = cap - buf.len();
            if chunk.len() > room {
                buf.extend_from_slice(&chunk[..room]);
                return Ok((buf, true));
            }
        }
        buf.extend_from_slice(&chunk);
    }
    Ok((buf, false))
}

fn decode_json<T: DeserializeOwned>(raw: RawResponse) -> Result<T, HttpError> {
    serde_json::from_slice::<T>(&raw.body).map_err(|e| {
        let snippet = snip_body(&raw.body);
        tracing::warn!(
            req_id=%raw.req_id,
            serde_line=%e.line(),
            serde_col=%e.column(),
            serde_err=%e,
            body_snippet=%snippet,
            "http.response.decode_error"
        );
        HttpError::Decode(e.to_string(), snippet)
    })
}

fn backoff(attempt: usize) -> Duration {
    Duration::from_millis(200u64.saturating_mul(1 << (attempt.saturating_sub(1)).min(16)))
}

/// Decode bytes as UTF-8, dropping an incomplete multi-byte sequence at the
/// end and replacing any other invalid bytes with U+FFFD.
///
/// ```
/// let bytes = "caf\u{e9}".as_bytes();
/// // cut in the middle of the two-byte `é`
/// assert_eq!(tailor_http::decode_lenient(&bytes[..bytes.len() - 1]), "caf");
/// ```
pub fn decode_lenient(bytes: &[u8]) -> String {
    String::from_utf8_lossy(trim_incomplete_tail(bytes)).into_owned()
}

/// Decode a body using the `charset` parameter of its `Content-Type`.
///
/// Missing, unknown or UTF-8 charsets go through [`decode_lenient`]. With any
/// other encoding a body cut at the byte cap may end in half a character; the
/// trailing U+FFFD that produces is dropped when `truncated` is set.
///
/// ```
/// let body = b"<p>Caf\xE9</p>";
/// assert_eq!(
///     tailor_http::decode_with_charset(body, Some("text/html; charset=ISO-8859-1"), false),
///     "<p>Café</p>"
/// );
/// assert_eq!(tailor_http::decode_with_charset(b"caf\xC3", Some("text/html"), true), "caf");
/// ```
pub fn decode_with_charset(bytes: &[u8], content_type: Option<&str>, truncated: bool) -> String {
    let encoding = content_type
        .and_then(charset_param)
        .and_then(|label| encoding_rs::Encoding::for_label(label.as_bytes()));
    let encoding = match encoding {
        Some(enc) if enc != encoding_rs::UTF_8 => enc,
        _ => return decode_lenient(bytes),
    };

    let (text, _, had_errors) = encoding.decode(bytes);
    let mut text = text.into_owned();
    if truncated && had_errors && text.ends_with('\u{fffd}') {
        text.pop();
    }
    text
}

fn charset_param(content_type: &str) -> Option<&str> {
    content_type.split(';').skip(1).find_map(|param| {
        let (key, value) = param.split_once('=')?;
        key.trim()
            .eq_ignore_ascii_case("charset")
            .then(|| value.trim().trim_matches('"'))
    })
}

fn trim_incomplete_tail(bytes: &[u8]) -> &[u8] {
    let floor = bytes.len().saturating_sub(4);
    for i in (floor..bytes.len()).rev() {
        let b = bytes[i];
        if b & 0b1100_0000 == 0b1000_0000 {
            continue;
        }
        let width = match b {
            0xC0..=0xDF => 2,
            0xE0..=0xEF => 3,
            0xF0..=0xF7 => 4,
            _ => 1,
        };
        return if bytes.len() - i < width {
            &bytes[..i]
        } else {
            bytes
        };
    }
    bytes
}

fn extract_error_message(body: &[u8]) -> String {
    // OpenAI style: {"error":{"message":"..."}}
    #[derive(Deserialize)]
    struct OpenAiEnv {
        error: OpenAiDetail,
    }
    #[derive(Deserialize)]
    struct OpenAiDetail {
        message: String,
    }

    // Generic: {"message":"..."} or {"detail":"..."} or {"error":"..."}
    #[derive(Deserialize)]
    struct Msg {
        #[serde(default)]
        message: String,
        #[serde(default)]
        detail: String,
        #[serde(default)]
        error: String,
    }

    if let Ok(env) = serde_json::from_slice::<OpenAiEnv>(body) {
        return env.error.message;
    }
    if let Ok(m) = serde_json::from_slice::<Msg>(body) {
        for candidate in [m.message, m.detail, m.error] {
            if !candidate.is_empty() {
                return candidate;
            }
        }
    }
    snip_body(body)
}

fn retry_after_delay_secs(h: &HeaderMap) -> Option<u64> {
    h.get(RETRY_AFTER)
        .and_then(|v| v.to_str().ok())?
        .parse()
        .ok()
}

fn snip_body(body: &[u8]) -> String {
    let cut = body.len().min(SNIPPET_MAX);
    let mut snip = decode_lenient(&body[..cut]);
    if body.len() > SNIPPET_MAX {
        snip.push_str("...");
    }
    snip
}

fn sanitize_api_key(raw: &str) -> Result<String, HttpError> {
    let mut s = raw
        .trim()
        .trim_matches(|c| c == '"' || c == '\'')
        .to_string();
    s.retain(|ch| !ch.is_ascii_whitespace());

    if !s.is_ascii() {
        return Err(HttpError::Build("API key contains non-ASCII bytes".into()));
    }
    if s.bytes().any(|b| b < 0x20 || b == 0x7F) {
        return Err(HttpError::Build(
            "API key contains control characters".into(),
        ));
    }
    HeaderValue::from_str(&format!("Bearer {}", s))
        .map_err(|e| HttpError::Build(format!("invalid Authorization header: {e}")))?;
    Ok(s)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn lenient_decode_drops_split_sequence_only_at_the_end() {
        let word = "naïve résumé";
        let bytes = word.as_bytes();
        // last byte belongs to the two-byte `é`
        assert_eq!(decode_lenient(&bytes[..bytes.len() - 1]), "naïve résum");
        assert_eq!(decode_lenient(bytes), word);

        let euro = "€".as_bytes();
        assert_eq!(decode_lenient(&euro[..2]), "");
        assert_eq!(decode_lenient(b"ok\xffok"), "ok\u{fffd}ok");
    }

    #[test]
    fn declared_charset_drives_decoding() {
        assert_eq!(
            decode_with_charset(b"Caf\xe9 \x93quoted\x94", Some("text/html; charset=windows-1252"), false),
            "Café \u{201c}quoted\u{201d}"
        );
        // A Latin-1 byte at the cut is a whole character, not a split sequence.
        assert_eq!(
            decode_with_charset(b"Caf\xe9", Some("text/html;charset=\"iso-8859-1\""), true),
            "Café"
        );
        assert_eq!(
            decode_with_charset("café".as_bytes(), Some("text/html; charset=utf-8"), false),
            "café"
        );
        assert_eq!(decode_with_charset(b"plain", Some("text/html; charset=bogus"), false), "plain");
        assert_eq!(decode_with_charset(b"plain", None, false), "plain");
    }

    #[test]
    fn multibyte_charset_split_at_cap_loses_only_the_tail() {
        // Shift_JIS "日本" is 93 FA 96 7B; cut inside the second character.
        let cut = b"\x93\xfa\x96";
        assert_eq!(decode_with_charset(cut, Some("text/html; charset=shift_jis"), true), "日");
    }

    #[test]
    fn connect_timeout_is_configurable() {
        assert_eq!(HttpClient::detached().unwrap().connect_timeout, Duration::from_secs(10));
        let client = HttpClient::detached_with_connect_timeout(Duration::from_secs(25)).unwrap();
        assert_eq!(client.connect_timeout, Duration::from_secs(25));
    }

    #[test]
    fn sanitize_strips_quotes_and_whitespace() {
        assert_eq!(sanitize_api_key(" \"sk-ab c\"\n").unwrap(), "sk-abc");
        assert!(matches!(
            sanitize_api_key("sk-ü"),
            Err(HttpError::Build(_))
        ));
    }

    #[test]
    fn error_message_prefers_structured_fields() {
        let openai = br#"{"error":{"message":"quota exceeded","type":"insufficient_quota"}}"#;
        assert_eq!(extract_error_message(openai), "quota exceeded");
        assert_eq!(extract_error_message(br#"{"detail":"nope"}"#), "nope");
        assert_eq!(extract_error_message(b"<html>Not Found</html>"), "<html>Not Found</html>");
    }

    #[test]
    fn snippet_is_bounded() {
        let body = vec![b'a'; SNIPPET_MAX * 2];
        let snip = snip_body(&body);
        assert_eq!(snip.len(), SNIPPET_MAX + 3);
        assert!(snip.ends_with("..."));
    }

    #[test]
    fn relative_paths_need_a_base() {
        let detached = HttpClient::detached().unwrap();
        assert!(matches!(detached.resolve("responses"), Err(HttpError::Url(_))));

        let based = HttpClient::new("https://api.example.com/v1/").unwrap();
        assert_eq!(
            based.resolve("responses").unwrap().as_str(),
            "https://api.example.com/v1/responses"
        );
    }
}
