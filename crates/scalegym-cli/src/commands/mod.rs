pub mod evaluate;
pub mod monitor;
pub mod pods;
pub mod probe;

use anyhow::Context;
use tracing::info;

use scalegym_core::GymConfig;
use scalegym_orchestrator::{Kubectl, Orchestrator};

/// Base URL of the target service: the configured override, else the
/// cluster's node address and service node port.
pub async fn service_base_url(config: &GymConfig) -> anyhow::Result<String> {
    if let Some(url) = &config.env.endpoint {
        return Ok(url.clone());
    }
    let kubectl = Kubectl::new(config.orchestrator.clone());
    let url = kubectl
        .resolve_service_endpoint()
        .await
        .with_context(|| {
            format!(
                "unable to determine a reachable url for service {}",
                config.orchestrator.service
            )
        })?;
    info!(%url, "resolved service endpoint");
    Ok(url)
}
