use crate::config::RateLimitConfig;
use async_trait::async_trait;
use std::time::Duration;
use tracing::debug;

/// Injectable sleep policy for all remote-call pacing.
///
/// Control flow in the callers never depends on how long these take, so
/// tests can substitute a zero-delay or recording policy.
#[async_trait]
pub trait DelayPolicy: Send + Sync {
    /// Ordinary exponential backoff before retry `attempt` (attempt > 0)
    async fn backoff(&self, attempt: u32);

    /// Pacing sleep after every successful completion call
    async fn pace_llm(&self);

    /// Steeper hold after a detected rate-limit error on 0-indexed `attempt`
    async fn rate_limit_hold(&self, attempt: u32);

    /// Pacing sleep after a successful web search
    async fn pace_search(&self);

    /// Fixed pacing sleep after a successful news search
    async fn pace_news(&self);
}

/// Production policy: blocking-style sleeps driven by the rate limiting config
pub struct SleepDelayPolicy {
    llm_delay_seconds: f64,
    search_delay_seconds: f64,
    backoff_multiplier: f64,
}

impl SleepDelayPolicy {
    pub fn from_config(rate: &RateLimitConfig) -> Self {
        Self {
            llm_delay_seconds: rate.llm_delay_seconds,
            search_delay_seconds: rate.search_delay_seconds,
            backoff_multiplier: rate.backoff_multiplier,
        }
    }

    /// Backoff wait for a retry attempt: llm_delay * multiplier^attempt
    pub fn backoff_duration(&self, attempt: u32) -> Duration {
        Duration::from_secs_f64(self.llm_delay_seconds * self.backoff_multiplier.powi(attempt as i32))
    }

    /// Rate-limit hold schedule: 30 * (attempt + 1) seconds
    pub fn rate_limit_duration(attempt: u32) -> Duration {
        Duration::from_secs(30 * (attempt as u64 + 1))
    }
}

#[async_trait]
impl DelayPolicy for SleepDelayPolicy {
    async fn backoff(&self, attempt: u32) {
        let wait = self.backoff_duration(attempt);
        debug!("Backoff: waiting {:?} before retry", wait);
        tokio::time::sleep(wait).await;
    }

    async fn pace_llm(&self) {
        tokio::time::sleep(Duration::from_secs_f64(self.llm_delay_seconds)).await;
    }

    async fn rate_limit_hold(&self, attempt: u32) {
        let wait = Self::rate_limit_duration(attempt);
        debug!("Rate limit: holding {:?} before retry", wait);
        tokio::time::sleep(wait).await;
    }

    async fn pace_search(&self) {
        tokio::time::sleep(Duration::from_secs_f64(self.search_delay_seconds)).await;
    }

    async fn pace_news(&self) {
        tokio::time::sleep(Duration::from_secs(1)).await;
    }
}

/// Zero-delay policy for tests
pub struct NoDelayPolicy;

#[async_trait]
impl DelayPolicy for NoDelayPolicy {
    async fn backoff(&self, _attempt: u32) {}
    async fn pace_llm(&self) {}
    async fn rate_limit_hold(&self, _attempt: u32) {}
    async fn pace_search(&self) {}
    async fn pace_news(&self) {}
}
