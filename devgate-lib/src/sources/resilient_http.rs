//! HTTP GET with automatic retry of transient failures.
//!
//! Network errors and 5xx responses are retried with exponential backoff. Every other
//! response, including rate-limit responses, is handed back to the caller so that it
//! can be classified; rate limits are a policy decision made further up.

use core::time::Duration;
use ohno::IntoAppError;
use tokio_retry::RetryIf;
use tokio_retry::strategy::{ExponentialBackoff, jitter};

const LOG_TARGET: &str = "      http";

/// First retry delay; later retries double it.
const RETRY_BASE_DELAY_MS: u64 = 250;

/// Upper bound for a single retry delay.
const RETRY_MAX_DELAY: Duration = Duration::from_secs(5);

/// Failure of a single attempt.
enum Attempt {
    Transport(reqwest::Error),
    ServerError(reqwest::Response),
}

/// Send an HTTP GET request, retrying up to `max_retries` times on transient failures.
///
/// When retries are exhausted on a 5xx response, that last response is returned so
/// the caller sees the real status code.
pub async fn resilient_get(client: &reqwest::Client, url: &str, max_retries: usize) -> crate::Result<reqwest::Response> {
    let strategy = ExponentialBackoff::from_millis(2)
        .factor(RETRY_BASE_DELAY_MS / 2)
        .max_delay(RETRY_MAX_DELAY)
        .map(jitter)
        .take(max_retries);

    let attempt = || async move {
        match client.get(url).send().await {
            Ok(resp) if resp.status().is_server_error() => Err(Attempt::ServerError(resp)),
            Ok(resp) => Ok(resp),
            Err(e) => Err(Attempt::Transport(e)),
        }
    };

    let should_retry = |attempt: &Attempt| {
        match attempt {
            Attempt::Transport(e) => log::debug!(target: LOG_TARGET, "Retrying GET {url} after transport error: {e}"),
            Attempt::ServerError(resp) => log::debug!(target: LOG_TARGET, "Retrying GET {url} after HTTP {}", resp.status()),
        }
        true
    };

    match RetryIf::spawn(strategy, attempt, should_retry).await {
        Ok(resp) | Err(Attempt::ServerError(resp)) => Ok(resp),
        Err(Attempt::Transport(e)) => Err(e).into_app_err_with(|| format!("GET {url} failed")),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use wiremock::matchers::{method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    #[tokio::test]
    async fn returns_success_without_retry() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/ok"))
            .respond_with(ResponseTemplate::new(200).set_body_string("fine"))
            .expect(1)
            .mount(&server)
            .await;

        let client = reqwest::Client::new();
        let resp = resilient_get(&client, &format!("{}/ok", server.uri()), 3).await.unwrap();
        assert_eq!(resp.status(), 200);
    }

    #[tokio::test]
    async fn client_errors_are_not_retried() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/missing"))
            .respond_with(ResponseTemplate::new(404))
            .expect(1)
            .mount(&server)
            .await;

        let client = reqwest::Client::new();
        let resp = resilient_get(&client, &format!("{}/missing", server.uri()), 3).await.unwrap();
        assert_eq!(resp.status(), 404);
    }

    #[tokio::test]
    async fn server_errors_are_retried_then_returned() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/flaky"))
            .respond_with(ResponseTemplate::new(503))
            .expect(3)
            .mount(&server)
            .await;

        let client = reqwest::Client::new();
        let resp = resilient_get(&client, &format!("{}/flaky", server.uri()), 2).await.unwrap();
        assert_eq!(resp.status(), 503);
    }

    #[tokio::test]
    async fn transport_errors_surface_after_retries() {
        let client = reqwest::Client::builder().timeout(Duration::from_millis(200)).build().unwrap();
        let result = resilient_get(&client, "http://127.0.0.1:9/unreachable", 1).await;
        assert!(result.is_err());
    }
}
