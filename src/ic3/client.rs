// src/ic3/client.rs
use std::ops::RangeInclusive;
use std::time::Duration;

use reqwest::header;

use crate::utils::error::FetchError;

// The portal rejects non-browser agents, so present a desktop browser.
const BROWSER_USER_AGENT: &str = "Mozilla/5.0 (Windows NT 10.0; Win64; x64) \
     AppleWebKit/537.36 (KHTML, like Gecko) Chrome/127.0.0.1 Safari/537.36";

/// Retry schedule applied to connection-level failures. HTTP statuses are
/// never retried; any response the server actually returns is final.
#[derive(Debug, Clone)]
pub struct RetryPolicy {
    pub max_retries: u32,
    pub initial_backoff: Duration,
    pub backoff_multiplier: f64,
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self {
            max_retries: 3,
            initial_backoff: Duration::from_secs(2),
            backoff_multiplier: 2.0,
        }
    }
}

impl RetryPolicy {
    /// Backoff before retry `attempt` (1-based): 2s, 4s, 8s under defaults.
    pub fn backoff(&self, attempt: u32) -> Duration {
        let secs = self.initial_backoff.as_secs_f64()
            * self.backoff_multiplier.powi(attempt as i32 - 1);
        Duration::from_secs_f64(secs)
    }
}

/// HTTP client for the report portal. Owns the connection pool, the retry
/// policy, and the post-fetch throttle bounds; constructed once per process
/// and shared by reference across the whole sweep.
pub struct Ic3Client {
    http: reqwest::Client,
    retry: RetryPolicy,
    throttle_secs: RangeInclusive<f64>,
}

impl Ic3Client {
    pub fn new() -> Result<Self, FetchError> {
        Self::with_policy(RetryPolicy::default(), 1.0..=3.0)
    }

    /// Builds a client with explicit retry and throttle settings. Tests use
    /// this to shrink the backoff schedule and zero out the throttle.
    pub fn with_policy(
        retry: RetryPolicy,
        throttle_secs: RangeInclusive<f64>,
    ) -> Result<Self, FetchError> {
        let http = reqwest::Client::builder()
            .user_agent(BROWSER_USER_AGENT)
            .build()?;
        Ok(Self {
            http,
            retry,
            throttle_secs,
        })
    }

    /// Fetches a report page, returning its HTML body.
    ///
    /// Connection-level failures are retried per the policy; a non-200 status
    /// or an exhausted retry budget is terminal for this URL. Terminal
    /// failures are logged here and surface as `None`, never as an error, so
    /// one bad page cannot abort the sweep.
    pub async fn fetch(&self, url: &str) -> Option<String> {
        match self.try_fetch(url).await {
            Ok(body) => {
                // Pace outgoing requests. Scraping back-to-back got the
                // client blocked with 403s, so sleep before handing the
                // page back rather than trusting the caller to wait.
                let delay = rand::random_range(self.throttle_secs.clone());
                tokio::time::sleep(Duration::from_secs_f64(delay)).await;
                Some(body)
            }
            Err(err) => {
                tracing::error!("Request to {} failed: {}", url, err);
                None
            }
        }
    }

    async fn try_fetch(&self, url: &str) -> Result<String, FetchError> {
        let response = self.send_with_retries(url).await?;

        let status = response.status();
        if status != reqwest::StatusCode::OK {
            return Err(FetchError::Http(status));
        }

        let body = response.text().await?;
        tracing::debug!("Downloaded {} bytes from {}", body.len(), url);
        Ok(body)
    }

    async fn send_with_retries(&self, url: &str) -> Result<reqwest::Response, FetchError> {
        let mut attempt = 0u32;
        loop {
            match self
                .http
                .get(url)
                .header(header::ACCEPT, "text/html,application/xhtml+xml,*/*")
                .send()
                .await
            {
                Ok(response) => return Ok(response),
                Err(err) if is_connection_error(&err) && attempt < self.retry.max_retries => {
                    attempt += 1;
                    let backoff = self.retry.backoff(attempt);
                    tracing::warn!(
                        "Connection to {} failed ({}), retry {}/{} in {:?}",
                        url,
                        err,
                        attempt,
                        self.retry.max_retries,
                        backoff
                    );
                    tokio::time::sleep(backoff).await;
                }
                Err(err) => return Err(FetchError::Network(err)),
            }
        }
    }
}

fn is_connection_error(err: &reqwest::Error) -> bool {
    err.is_connect() || err.is_timeout() || err.is_request()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn test_client() -> Ic3Client {
        Ic3Client::with_policy(
            RetryPolicy {
                max_retries: 2,
                initial_backoff: Duration::from_millis(10),
                backoff_multiplier: 2.0,
            },
            0.0..=0.0,
        )
        .unwrap()
    }

    #[test]
    fn test_backoff_schedule_doubles() {
        let policy = RetryPolicy::default();
        assert_eq!(policy.backoff(1), Duration::from_secs(2));
        assert_eq!(policy.backoff(2), Duration::from_secs(4));
        assert_eq!(policy.backoff(3), Duration::from_secs(8));
    }

    #[tokio::test]
    async fn test_fetch_returns_body_on_success() {
        let mut server = mockito::Server::new_async().await;
        let mock = server
            .mock("GET", "/report")
            .with_status(200)
            .with_body("<html><body>report</body></html>")
            .create_async()
            .await;

        let client = test_client();
        let url = format!("{}/report", server.url());
        let body = client.fetch(&url).await;

        mock.assert_async().await;
        assert_eq!(body.as_deref(), Some("<html><body>report</body></html>"));
    }

    #[tokio::test]
    async fn test_fetch_returns_none_on_403() {
        let mut server = mockito::Server::new_async().await;
        let mock = server
            .mock("GET", "/blocked")
            .with_status(403)
            .create_async()
            .await;

        let client = test_client();
        let url = format!("{}/blocked", server.url());
        assert!(client.fetch(&url).await.is_none());
        mock.assert_async().await;
    }

    #[tokio::test]
    async fn test_fetch_returns_none_when_retries_exhausted() {
        // Discard port, nothing is listening.
        let client = test_client();
        assert!(client.fetch("http://127.0.0.1:9/report").await.is_none());
    }
}
