//! HTTP fetcher implementation
//!
//! This module handles all HTTP requests, including:
//! - Building HTTP clients with the identifying user agent
//! - GET requests for whole-document retrieval
//! - Bounded retries with linear backoff
//! - Rate limiting through a shared [`RateLimiter`]

use crate::config::FetcherConfig;
use crate::fetch::rate_limiter::RateLimiter;

use reqwest::Client;
use std::time::Duration;
use thiserror::Error;

/// Result of a fetch operation
#[derive(Debug)]
pub enum FetchResult {
    /// Successfully fetched the page
    Success {
        /// Final URL after redirects
        final_url: String,
        /// Page body content
        body: String,
        /// Attempts used, including the successful one
        attempts: u32,
    },

    /// Every attempt failed
    Exhausted {
        /// Attempts made
        attempts: u32,
        /// Description of the final failure
        last_error: String,
    },
}

impl FetchResult {
    /// Returns whether the page was retrieved
    pub fn is_success(&self) -> bool {
        matches!(self, FetchResult::Success { .. })
    }

    /// Number of attempts made
    pub fn attempts(&self) -> u32 {
        match self {
            FetchResult::Success { attempts, .. } | FetchResult::Exhausted { attempts, .. } => {
                *attempts
            }
        }
    }

    /// Borrows the body, if any
    pub fn body(&self) -> Option<&str> {
        match self {
            FetchResult::Success { body, .. } => Some(body),
            FetchResult::Exhausted { .. } => None,
        }
    }

    /// Consumes the result, yielding the body or the absence signal
    pub fn into_body(self) -> Option<String> {
        match self {
            FetchResult::Success { body, .. } => Some(body),
            FetchResult::Exhausted { .. } => None,
        }
    }
}

/// Why a single attempt failed
#[derive(Debug, Error)]
pub enum AttemptError {
    #[error("HTTP status {0}")]
    Status(u16),

    #[error("request failed: {0}")]
    Transport(#[source] reqwest::Error),

    #[error("failed to read body: {0}")]
    Body(#[source] reqwest::Error),
}

/// Builds an HTTP client with proper configuration
///
/// # Arguments
///
/// * `config` - The fetcher configuration (user agent and timeout)
///
/// # Returns
///
/// * `Ok(Client)` - Successfully built HTTP client
/// * `Err(reqwest::Error)` - Failed to build client
pub fn build_http_client(config: &FetcherConfig) -> Result<Client, reqwest::Error> {
    Client::builder()
        .user_agent(config.user_agent.clone())
        .timeout(config.timeout())
        .connect_timeout(Duration::from_secs(10))
        .gzip(true)
        .brotli(true)
        .build()
}

/// Sleep before the retry that follows failed attempt `attempt` (1-based)
///
/// Linear: `base * attempt`.
pub fn backoff_delay(base: Duration, attempt: u32) -> Duration {
    base.saturating_mul(attempt)
}

/// Retrieves whole documents with retries, backoff and rate limiting
#[derive(Debug)]
pub struct Fetcher {
    client: Client,
    limiter: RateLimiter,
    max_attempts: u32,
    retry_delay: Duration,
}

impl Fetcher {
    /// Creates a fetcher from its parts
    ///
    /// `max_attempts` is clamped to at least one.
    pub fn new(
        client: Client,
        limiter: RateLimiter,
        max_attempts: u32,
        retry_delay: Duration,
    ) -> Self {
        Self {
            client,
            limiter,
            max_attempts: max_attempts.max(1),
            retry_delay,
        }
    }

    /// Creates a fetcher from configuration
    pub fn from_config(config: &FetcherConfig) -> crate::Result<Self> {
        let client = build_http_client(config)?;
        let limiter = RateLimiter::per_second(config.calls_per_second)?;
        Ok(Self::new(
            client,
            limiter,
            config.max_attempts,
            config.retry_delay(),
        ))
    }

    pub fn max_attempts(&self) -> u32 {
        self.max_attempts
    }

    /// Fetches a URL, retrying transport and status failures
    ///
    /// # Retry Logic
    ///
    /// | Step | Action |
    /// |------|--------|
    /// | Before each attempt | Wait on the rate limiter |
    /// | Non-2xx status or transport error | Log, sleep `delay * attempt`, retry |
    /// | 2xx with readable body | Return immediately |
    /// | Attempts exhausted | Log and return [`FetchResult::Exhausted`] |
    ///
    /// Every attempt is a fresh request; nothing is cached between attempts.
    pub async fn fetch(&self, url: &str) -> FetchResult {
        let mut last_error = String::new();

        for attempt in 1..=self.max_attempts {
            self.limiter.wait().await;

            match self.attempt(url).await {
                Ok((final_url, status_code, body)) => {
                    tracing::info!(
                        "Fetched {} (status {}, {} bytes, attempt {}/{})",
                        url,
                        status_code,
                        body.len(),
                        attempt,
                        self.max_attempts
                    );
                    return FetchResult::Success {
                        final_url,
                        body,
                        attempts: attempt,
                    };
                }
                Err(e) => {
                    tracing::error!(
                        "Attempt {}/{} failed for {}: {}",
                        attempt,
                        self.max_attempts,
                        url,
                        e
                    );
                    last_error = e.to_string();

                    if attempt < self.max_attempts {
                        let delay = backoff_delay(self.retry_delay, attempt);
                        tracing::debug!("Retrying {} in {:?}", url, delay);
                        tokio::time::sleep(delay).await;
                    }
                }
            }
        }

        tracing::error!(
            "Giving up on {} after {} attempts",
            url,
            self.max_attempts
        );

        FetchResult::Exhausted {
            attempts: self.max_attempts,
            last_error,
        }
    }

    /// Issues one GET request
    async fn attempt(&self, url: &str) -> Result<(String, u16, String), AttemptError> {
        let response = self
            .client
            .get(url)
            .send()
            .await
            .map_err(AttemptError::Transport)?;

        let status = response.status();
        if !status.is_success() {
            return Err(AttemptError::Status(status.as_u16()));
        }

        let final_url = response.url().to_string();
        let body = response.text().await.map_err(AttemptError::Body)?;

        Ok((final_url, status.as_u16(), body))
    }
}
