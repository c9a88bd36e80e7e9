//! Minimum-interval rate limiting
//!
//! One [`RateLimiter`] is shared by every caller issuing requests through a
//! single fetcher, so scheduled runs and manual runs draw from the same budget.

use crate::ConfigError;
use std::time::{Duration, Instant};
use tokio::sync::Mutex;

/// Enforces a minimum interval between permitted calls
///
/// The check-and-update of the last call time happens under one lock, and the
/// lock is held while sleeping, so concurrent callers are released one at a
/// time with every pair of consecutive releases spaced by at least
/// [`RateLimiter::min_interval`]. A caller arriving after the interval has
/// already elapsed proceeds immediately; idle time is never banked.
#[derive(Debug)]
pub struct RateLimiter {
    min_interval: Duration,
    last_call: Mutex<Option<Instant>>,
}

impl RateLimiter {
    /// Creates a limiter with an explicit minimum interval
    pub fn new(min_interval: Duration) -> Self {
        Self {
            min_interval,
            last_call: Mutex::new(None),
        }
    }

    /// Creates a limiter permitting at most `calls` calls per second
    ///
    /// # Returns
    ///
    /// * `Ok(RateLimiter)` - interval of `1 / calls` seconds
    /// * `Err(ConfigError)` - `calls` is zero, negative, or not finite
    pub fn per_second(calls: f64) -> Result<Self, ConfigError> {
        if !calls.is_finite() || calls <= 0.0 {
            return Err(ConfigError::Validation(format!(
                "calls per second must be a positive number, got {}",
                calls
            )));
        }

        Ok(Self::new(Duration::from_secs_f64(1.0 / calls)))
    }

    /// The enforced spacing between permitted calls
    pub fn min_interval(&self) -> Duration {
        self.min_interval
    }

    /// Waits until a call is permitted, then records it
    ///
    /// Returns the instant at which the call was permitted.
    pub async fn wait(&self) -> Instant {
        let mut last_call = self.last_call.lock().await;

        if let Some(last) = *last_call {
            let elapsed = last.elapsed();
            if elapsed < self.min_interval {
                let remaining = self.min_interval - elapsed;
                tracing::trace!("Rate limit: sleeping {:?}", remaining);
                tokio::time::sleep(remaining).await;
            }
        }

        let now = Instant::now();
        *last_call = Some(now);
        now
    }
}
