//! The orchestrator surface the control loop depends on.

use std::future::Future;

use serde::{Deserialize, Serialize};
use tracing::{debug, warn};

use crate::error::OrchestratorError;

/// Pod count reported when the orchestrator cannot be queried.
pub const FALLBACK_POD_COUNT: u32 = 1;

/// One pod matching the deployment's label selector.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PodInfo {
    pub name: String,
    pub ip: Option<String>,
    /// Pod phase (`Running`, `Pending`, ...), `Unknown` if not reported.
    pub phase: String,
}

/// Cluster-control commands for a single deployment.
///
/// Query methods degrade instead of failing: the control loop must keep
/// producing rewards while the cluster misbehaves.
pub trait Orchestrator: Send + Sync {
    /// Pods matching the deployment's label selector.
    fn list_pods(&self) -> impl Future<Output = Result<Vec<PodInfo>, OrchestratorError>> + Send;

    /// Base URL of the target service, `None` if it cannot be resolved.
    fn resolve_service_endpoint(&self) -> impl Future<Output = Option<String>> + Send;

    /// Ask the orchestrator to run exactly `replicas` instances.
    ///
    /// Returns once the command is accepted, not once pods are ready.
    fn apply_replica_count(
        &self,
        replicas: u32,
    ) -> impl Future<Output = Result<(), OrchestratorError>> + Send;

    /// Number of matching pods, [`FALLBACK_POD_COUNT`] if the query fails.
    fn current_pod_count(&self) -> impl Future<Output = u32> + Send {
        async move {
            match self.list_pods().await {
                Ok(pods) => {
                    let count = u32::try_from(pods.len()).unwrap_or(u32::MAX);
                    debug!(pods = count, "retrieved pod count");
                    count
                }
                Err(e) => {
                    warn!(error = %e, fallback = FALLBACK_POD_COUNT, "pod count query failed");
                    FALLBACK_POD_COUNT
                }
            }
        }
    }
}
