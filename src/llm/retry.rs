use super::client::TextGenerator;
use crate::{Result, config::RetryConfig};
use async_trait::async_trait;
use std::{sync::Arc, time::Duration};
use tracing::warn;

#[derive(Debug, Clone, PartialEq)]
pub struct RetryPolicy {
    pub max_attempts: u32,
    pub initial_backoff: Duration,
}

impl RetryPolicy {
    /// Backoff before attempt `attempt` (1-based retries): 1x, 2x, 4x, ...
    pub fn backoff_for(&self, attempt: u32) -> Duration {
        let factor = 1u32.checked_shl(attempt.saturating_sub(1)).unwrap_or(u32::MAX);
        self.initial_backoff.saturating_mul(factor)
    }
}

impl From<&RetryConfig> for RetryPolicy {
    fn from(config: &RetryConfig) -> Self {
        Self {
            max_attempts: config.max_attempts.max(1),
            initial_backoff: Duration::from_millis(config.initial_backoff_ms),
        }
    }
}

/// Wraps a generator with a uniform retry policy.
///
/// Only transient failures are retried (see [`Error::is_transient`]).
/// Requests the backend rejected outright are returned on first occurrence.
///
/// [`Error::is_transient`]: crate::Error::is_transient
pub struct RetryingGenerator {
    inner: Arc<dyn TextGenerator>,
    policy: RetryPolicy,
}

impl RetryingGenerator {
    pub fn new(inner: Arc<dyn TextGenerator>, policy: RetryPolicy) -> Self {
        Self { inner, policy }
    }
}

#[async_trait]
impl TextGenerator for RetryingGenerator {
    async fn generate(&self, prompt: &str, temperature: f32) -> Result<String> {
        let mut attempt = 0;
        loop {
            if attempt > 0 {
                let delay = self.policy.backoff_for(attempt);
                tokio::time::sleep(delay).await;
            }

            match self.inner.generate(prompt, temperature).await {
                Ok(text) => return Ok(text),
                Err(e) if e.is_transient() && attempt + 1 < self.policy.max_attempts => {
                    attempt += 1;
                    warn!(
                        "Generation attempt {} of {} failed, retrying after {}ms: {}",
                        attempt,
                        self.policy.max_attempts,
                        self.policy.backoff_for(attempt).as_millis(),
                        e
                    );
                }
                Err(e) => return Err(e),
            }
        }
    }
}
