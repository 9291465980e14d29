use std::time::Duration;

use serde::Serialize;
use tokio::time::MissedTickBehavior;
use tracing::{info, warn};

use scalegym_core::GymConfig;
use scalegym_orchestrator::{Kubectl, Orchestrator, OrchestratorError, PodInfo};
use scalegym_probe::{Endpoint, RequestError, Response, send_request};

use super::service_base_url;

/// One monitoring tick.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct MonitorSample {
    /// Seconds for the bare GET, `None` if it never completed.
    pub response_time: Option<f64>,
    pub status: Option<u16>,
    pub pod_count: usize,
    pub pods: Vec<PodInfo>,
}

impl MonitorSample {
    fn new(http: Result<Response, RequestError>, pods: Result<Vec<PodInfo>, OrchestratorError>) -> Self {
        let (response_time, status) = match http {
            Ok(resp) => (Some(resp.elapsed.as_secs_f64()), Some(resp.status.as_u16())),
            Err(e) => {
                warn!(error = %e, "http monitoring failed");
                (None, None)
            }
        };
        let pods = pods.unwrap_or_else(|e| {
            warn!(error = %e, "pod listing failed");
            Vec::new()
        });
        Self {
            response_time,
            status,
            pod_count: pods.len(),
            pods,
        }
    }
}

pub async fn monitor(config: &GymConfig, interval: Duration) -> anyhow::Result<()> {
    // Plain GETs against the service root, no retries.
    let endpoint = Endpoint::for_mode(&service_base_url(config).await?, false)?;
    let kubectl = Kubectl::new(config.orchestrator.clone());

    info!(url = %endpoint, interval_ms = interval.as_millis() as u64, "monitoring started");

    let mut ticker = tokio::time::interval(interval);
    ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);
    let shutdown = tokio::signal::ctrl_c();
    tokio::pin!(shutdown);

    loop {
        tokio::select! {
            _ = ticker.tick() => {
                let http = send_request(&endpoint, None, config.probe.timeout).await;
                let pods = kubectl.list_pods().await;
                let sample = MonitorSample::new(http, pods);

                info!(
                    response_time = sample.response_time,
                    status = sample.status,
                    pod_count = sample.pod_count,
                    "monitor sample"
                );
                println!("{}", serde_json::to_string(&sample)?);
            }
            result = &mut shutdown => {
                result?;
                info!("shutdown signal received");
                break;
            }
        }
    }
    Ok(())
}
