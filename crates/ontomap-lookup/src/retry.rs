//! Retry with exponential backoff for idempotent GETs
//!
//! Only connection failures are retried. A server that answers, even
//! with an error status, is not asked again.

use std::time::Duration;

use ontomap_core::{MapError, OxoConfig, Result};
use reqwest::{RequestBuilder, Response};
use tracing::{debug, warn};

/// Configuration for retry behavior
#[derive(Debug, Clone)]
pub struct RetryPolicy {
    /// Reconnect attempts after the first try
    pub max_retries: u32,
    /// Base of the exponential backoff
    pub backoff_factor: Duration,
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self {
            max_retries: 3,
            backoff_factor: Duration::from_millis(500),
        }
    }
}

impl RetryPolicy {
    /// A policy that never retries
    pub fn none() -> Self {
        Self {
            max_retries: 0,
            backoff_factor: Duration::ZERO,
        }
    }

    pub fn from_config(config: &OxoConfig) -> Self {
        Self {
            max_retries: config.max_retries,
            backoff_factor: Duration::from_millis(config.backoff_factor_ms),
        }
    }

    /// Sleep before retry number `attempt` (1-based): factor * 2^(attempt-1)
    pub fn backoff(&self, attempt: u32) -> Duration {
        let exponent = attempt.saturating_sub(1).min(16);
        self.backoff_factor.saturating_mul(1u32 << exponent)
    }

    /// Send a request, rebuilding it for every attempt
    pub async fn send<F>(&self, service: &str, mut build: F) -> Result<Response>
    where
        F: FnMut() -> RequestBuilder,
    {
        let mut attempt = 0;

        loop {
            match build().send().await {
                Ok(response) => return Ok(response),
                Err(e) if e.is_connect() && attempt < self.max_retries => {
                    attempt += 1;
                    let delay = self.backoff(attempt);
                    warn!(
                        "{} connection failed ({}), retry {}/{} in {:?}",
                        service, e, attempt, self.max_retries, delay
                    );
                    tokio::time::sleep(delay).await;
                }
                Err(e) => {
                    debug!("{} request failed after {} retries", service, attempt);
                    return Err(MapError::transport(service, e.to_string()));
                }
            }
        }
    }
}
