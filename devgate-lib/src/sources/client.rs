//! Minimal JSON-over-HTTP client shared by the REST-backed sources.
//!
//! Responses are classified into [`SourceError`] variants so providers only deal with
//! decoded payloads and typed failures.

use super::SourceError;
use super::resilient_http::resilient_get;
use chrono::{DateTime, Utc};
use core::time::Duration;
use ohno::{IntoAppError, app_err, bail};
use reqwest::StatusCode;
use reqwest::header::{HeaderMap, LINK, RETRY_AFTER};
use serde::de::DeserializeOwned;
use url::Url;

const LOG_TARGET: &str = "      http";

/// Rate limit information from response headers
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RateLimitInfo {
    pub remaining: Option<u64>,
    pub reset_at: Option<DateTime<Utc>>,

    /// The server asked the client to back off via `retry-after`.
    pub retry_after: bool,
}

impl RateLimitInfo {
    /// Whether the quota is used up.
    #[must_use]
    pub fn is_exhausted(&self) -> bool {
        self.retry_after || self.remaining == Some(0)
    }
}

/// A decoded response body plus the bits of response metadata providers care about.
#[derive(Debug)]
pub struct ApiResponse<T> {
    pub data: T,
    pub has_next_page: bool,
}

/// HTTP client bound to one REST API base URL.
#[derive(Debug, Clone)]
pub struct ApiClient {
    http: reqwest::Client,
    base_url: Url,
    max_retries: usize,
}

impl ApiClient {
    /// Create a client for `base_url`, optionally authenticating with a bearer token.
    ///
    /// The token is stored as a sensitive header value so it never shows up in debug output.
    pub fn new(token: Option<&str>, base_url: &str, timeout: Duration, max_retries: usize) -> crate::Result<Self> {
        use reqwest::header::{AUTHORIZATION, HeaderValue};

        let base_url = Url::parse(base_url).into_app_err_with(|| format!("invalid API base URL '{base_url}'"))?;
        if base_url.cannot_be_a_base() {
            bail!("API base URL '{base_url}' cannot be used as a base");
        }

        let mut client_builder = reqwest::Client::builder()
            .user_agent(concat!("devgate/", env!("CARGO_PKG_VERSION")))
            .timeout(timeout);

        if let Some(t) = token.map(str::trim).filter(|t| !t.is_empty()) {
            let mut auth_val = HeaderValue::from_str(&format!("Bearer {t}")).into_app_err("invalid API token")?;
            auth_val.set_sensitive(true);

            let mut headers = HeaderMap::new();
            let _ = headers.insert(AUTHORIZATION, auth_val);

            client_builder = client_builder.default_headers(headers);
        }

        Ok(Self {
            http: client_builder.build().into_app_err("unable to create HTTP client")?,
            base_url,
            max_retries,
        })
    }

    #[must_use]
    pub fn base_url(&self) -> &Url {
        &self.base_url
    }

    /// Build an endpoint URL below the base URL.
    ///
    /// Path segments are percent-encoded, so user-supplied names cannot escape the API root.
    #[must_use]
    pub fn endpoint(&self, segments: &[&str], query: &[(&str, &str)]) -> Url {
        let mut url = self.base_url.clone();
        if let Ok(mut path) = url.path_segments_mut() {
            let _ = path.pop_if_empty().extend(segments);
        }

        if !query.is_empty() {
            let _ = url.query_pairs_mut().extend_pairs(query);
        }

        url
    }

    /// GET `url` and decode its JSON body.
    ///
    /// `subject` names what is being fetched and is used for [`SourceError::NotFound`].
    pub async fn get_json<T>(&self, url: &Url, subject: &str) -> Result<ApiResponse<T>, SourceError>
    where
        T: DeserializeOwned,
    {
        log::debug!(target: LOG_TARGET, "GET {url}");

        let resp = resilient_get(&self.http, url.as_str(), self.max_retries)
            .await
            .map_err(SourceError::unavailable)?;

        let status = resp.status();
        let rate_limit = extract_rate_limit_from_headers(resp.headers(), Utc::now());
        if let Some(rl) = rate_limit.as_ref().and_then(|rl| rl.remaining) {
            log::trace!(target: LOG_TARGET, "{rl} request(s) remaining for {}", self.base_url);
        }

        if !status.is_success() {
            return Err(classify_failure(status, rate_limit, url, subject));
        }

        let has_next_page = resp
            .headers()
            .get(LINK)
            .and_then(|h| h.to_str().ok())
            .is_some_and(|link_str| link_str.contains(r#"rel="next""#));

        let body = resp
            .bytes()
            .await
            .into_app_err_with(|| format!("reading response body from {url}"))
            .map_err(SourceError::unavailable)?;

        let data = serde_json::from_slice(&body)
            .into_app_err_with(|| format!("decoding response from {url}"))
            .map_err(SourceError::malformed)?;

        Ok(ApiResponse { data, has_next_page })
    }
}

fn classify_failure(status: StatusCode, rate_limit: Option<RateLimitInfo>, url: &Url, subject: &str) -> SourceError {
    let reset_at = rate_limit.and_then(|rl| rl.reset_at);
    match status {
        StatusCode::NOT_FOUND => SourceError::NotFound(subject.to_string()),
        StatusCode::TOO_MANY_REQUESTS => SourceError::RateLimited(reset_at),
        StatusCode::FORBIDDEN if rate_limit.is_some_and(|rl| rl.is_exhausted()) => SourceError::RateLimited(reset_at),
        _ => SourceError::unavailable(app_err!("HTTP {status} from {url}")),
    }
}

/// Extract rate limit information from API response headers
///
/// Understands the `x-ratelimit-*` headers used by GitHub as well as a
/// `retry-after` header expressed in seconds.
pub fn extract_rate_limit_from_headers(headers: &HeaderMap, now: DateTime<Utc>) -> Option<RateLimitInfo> {
    let header_str = |name: &str| headers.get(name).and_then(|v| v.to_str().ok()).map(str::trim);

    let remaining = header_str("x-ratelimit-remaining").and_then(|v| v.parse::<u64>().ok());
    let mut reset_at = header_str("x-ratelimit-reset")
        .and_then(|v| v.parse::<i64>().ok())
        .and_then(|secs| DateTime::from_timestamp(secs, 0));

    let retry_after_secs = headers
        .get(RETRY_AFTER)
        .and_then(|v| v.to_str().ok())
        .and_then(|v| v.trim().parse::<i64>().ok());
    if let Some(secs) = retry_after_secs {
        // a delay past the representable range means the reset time is unknown
        reset_at = chrono::TimeDelta::try_seconds(secs.max(0)).and_then(|delay| now.checked_add_signed(delay));
    }

    if remaining.is_none() && reset_at.is_none() && retry_after_secs.is_none() {
        return None;
    }

    Some(RateLimitInfo {
        remaining,
        reset_at,
        retry_after: retry_after_secs.is_some(),
    })
}
