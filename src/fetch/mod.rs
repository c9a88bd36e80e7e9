//! Fetch module: page retrieval over HTTP
//!
//! This module contains:
//! - The shared minimum-interval rate limiter
//! - The retrying fetcher and its result type
//! - HTTP client construction

mod fetcher;
mod rate_limiter;

pub use fetcher::{backoff_delay, build_http_client, AttemptError, FetchResult, Fetcher};
pub use rate_limiter::RateLimiter;
