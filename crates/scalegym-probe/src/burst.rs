//! Stress bursts: a fixed worker pool draining a job queue.
//!
//! ```text
//! job queue (plan.requests slots)
//!   └── N workers, N = min(concurrency, requests)
//!         └── send_request() → Sample → result channel → aggregator
//! ```
//!
//! Workers never retry. A request that errors, times out, or returns a
//! non-2xx status is recorded as a failure at the sentinel latency.

use std::sync::Arc;
use std::time::Duration;

use tokio::sync::{Mutex, mpsc};
use tokio::task::JoinSet;
use tracing::{debug, info};

use scalegym_core::{BurstPlan, Sample, StressOutcome};

use crate::endpoint::Endpoint;
use crate::payload::selection_payload;
use crate::request::send_request;

pub(crate) async fn run_burst(
    endpoint: &Endpoint,
    realistic: bool,
    plan: BurstPlan,
    timeout: Duration,
    feature_len: usize,
) -> StressOutcome {
    if plan.requests == 0 {
        return StressOutcome::from_samples(&[]);
    }

    let workers = plan.concurrency.clamp(1, plan.requests);
    info!(
        requests = plan.requests,
        concurrency = plan.concurrency,
        workers,
        url = %endpoint,
        "starting stress burst"
    );

    // Fill the queue up front; capacity equals the number of jobs.
    let (job_tx, job_rx) = mpsc::channel::<usize>(plan.requests);
    for slot in 0..plan.requests {
        if job_tx.try_send(slot).is_err() {
            break;
        }
    }
    drop(job_tx);

    let jobs = Arc::new(Mutex::new(job_rx));
    let endpoint = Arc::new(endpoint.clone());
    let (result_tx, mut result_rx) = mpsc::unbounded_channel::<Sample>();

    let mut pool = JoinSet::new();
    for worker in 0..workers {
        let jobs = Arc::clone(&jobs);
        let endpoint = Arc::clone(&endpoint);
        let results = result_tx.clone();

        pool.spawn(async move {
            loop {
                let next = jobs.lock().await.recv().await;
                let Some(slot) = next else { break };

                let payload = realistic.then(|| selection_payload(&mut rand::rng(), feature_len));
                let sample = match send_request(&endpoint, payload, timeout).await {
                    Ok(resp) if resp.is_success() => Sample::success(resp.elapsed.as_secs_f64()),
                    Ok(resp) => {
                        debug!(worker, slot, status = %resp.status, "burst request rejected");
                        Sample::failure()
                    }
                    Err(e) => {
                        debug!(worker, slot, error = %e, "burst request failed");
                        Sample::failure()
                    }
                };

                if results.send(sample).is_err() {
                    break;
                }
            }
        });
    }
    drop(result_tx);

    let mut samples = Vec::with_capacity(plan.requests);
    while let Some(sample) = result_rx.recv().await {
        samples.push(sample);
    }
    while pool.join_next().await.is_some() {}

    let outcome = StressOutcome::from_samples(&samples);
    info!(
        requests = outcome.requests,
        failures = outcome.failures,
        avg_response_secs = outcome.average_response_time,
        success_rate = outcome.success_rate,
        "stress burst finished"
    );
    outcome
}
