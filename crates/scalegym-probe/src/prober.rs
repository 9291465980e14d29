//! Latency probes with retry and exponential backoff.

use std::future::Future;
use std::time::Duration;

use tracing::{debug, warn};

use scalegym_core::{BurstPlan, ProbeConfig, SENTINEL_LATENCY_SECS, StressOutcome};

use crate::burst::run_burst;
use crate::endpoint::Endpoint;
use crate::payload::selection_payload;
use crate::request::send_request;

/// Load generation against the target service.
///
/// Neither method fails: a probe that never succeeds is a maximal latency,
/// and a burst reports its failure rate.
pub trait LoadProber: Send + Sync {
    /// Latency of one (retried) request in seconds, or the sentinel.
    fn probe_once(&self, endpoint: &Endpoint, realistic: bool) -> impl Future<Output = f64> + Send;

    /// Fire `plan.requests` unretried requests, at most `plan.concurrency` at a time.
    fn burst(
        &self,
        endpoint: &Endpoint,
        realistic: bool,
        plan: BurstPlan,
    ) -> impl Future<Output = StressOutcome> + Send;
}

/// Attempt budget and backoff schedule for a single probe.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RetryPolicy {
    pub max_attempts: u32,
    pub initial_backoff: Duration,
    /// Per-attempt request timeout.
    pub timeout: Duration,
}

impl RetryPolicy {
    pub fn from_config(config: &ProbeConfig) -> Self {
        Self {
            max_attempts: config.max_attempts.max(1),
            initial_backoff: config.initial_backoff,
            timeout: config.timeout,
        }
    }

    /// Sleep after failed attempt `attempt` (1-based), `None` after the last.
    pub fn backoff_after(&self, attempt: u32) -> Option<Duration> {
        if attempt >= self.max_attempts {
            return None;
        }
        let factor = 2u32.saturating_pow(attempt.saturating_sub(1));
        Some(self.initial_backoff.saturating_mul(factor))
    }

    /// Total time spent sleeping when every attempt fails.
    pub fn total_backoff(&self) -> Duration {
        (1..self.max_attempts)
            .filter_map(|a| self.backoff_after(a))
            .fold(Duration::ZERO, |acc, d| acc.saturating_add(d))
    }
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self::from_config(&ProbeConfig::default())
    }
}

/// [`LoadProber`] issuing real HTTP requests.
#[derive(Debug, Clone)]
pub struct HttpProber {
    retry: RetryPolicy,
    feature_len: usize,
}

impl HttpProber {
    pub fn new(config: &ProbeConfig) -> Self {
        Self {
            retry: RetryPolicy::from_config(config),
            feature_len: config.feature_len,
        }
    }
}

impl Default for HttpProber {
    fn default() -> Self {
        Self::new(&ProbeConfig::default())
    }
}

impl LoadProber for HttpProber {
    async fn probe_once(&self, endpoint: &Endpoint, realistic: bool) -> f64 {
        // One payload for every attempt of this probe.
        let payload = realistic.then(|| selection_payload(&mut rand::rng(), self.feature_len));

        for attempt in 1..=self.retry.max_attempts {
            debug!(attempt, url = %endpoint, "sending probe");

            match send_request(endpoint, payload.clone(), self.retry.timeout).await {
                Ok(resp) if resp.is_success() => {
                    // Never report a success as slower than a failure.
                    let secs = resp.elapsed.as_secs_f64().min(SENTINEL_LATENCY_SECS);
                    debug!(attempt, elapsed_secs = secs, "probe succeeded");
                    return secs;
                }
                Ok(resp) => {
                    warn!(attempt, status = %resp.status, url = %endpoint, "probe got non-success status");
                }
                Err(e) => {
                    warn!(attempt, error = %e, url = %endpoint, "probe failed");
                }
            }

            if let Some(backoff) = self.retry.backoff_after(attempt) {
                tokio::time::sleep(backoff).await;
            }
        }

        warn!(
            attempts = self.retry.max_attempts,
            backoff_ms = self.retry.total_backoff().as_millis() as u64,
            sentinel = SENTINEL_LATENCY_SECS,
            url = %endpoint,
            "all probe attempts failed"
        );
        SENTINEL_LATENCY_SECS
    }

    async fn burst(&self, endpoint: &Endpoint, realistic: bool, plan: BurstPlan) -> StressOutcome {
        run_burst(endpoint, realistic, plan, self.retry.timeout, self.feature_len).await
    }
}
