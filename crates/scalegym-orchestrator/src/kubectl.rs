//! [`Orchestrator`] backed by the `kubectl` CLI.
//!
//! Every call spawns one short-lived process with a bounded runtime.
//! Pod and service state are read as JSON (`-o json`) so the output
//! format does not depend on column layout.

use std::process::Stdio;

use serde::Deserialize;
use tokio::process::Command;
use tracing::{debug, info, warn};

use scalegym_core::OrchestratorConfig;

use crate::client::{Orchestrator, PodInfo};
use crate::error::OrchestratorError;

/// Talks to the cluster through `kubectl` (and `minikube ip` for the node
/// address when none is configured).
#[derive(Debug, Clone)]
pub struct Kubectl {
    config: OrchestratorConfig,
}

impl Kubectl {
    pub fn new(config: OrchestratorConfig) -> Self {
        Self { config }
    }

    /// Arguments for listing the deployment's pods.
    pub fn pods_args(&self) -> Vec<String> {
        self.with_namespace(vec![
            "get".to_string(),
            "pods".to_string(),
            "-l".to_string(),
            self.config.label_selector.clone(),
            "-o".to_string(),
            "json".to_string(),
        ])
    }

    /// Arguments for reading the service object.
    pub fn service_args(&self) -> Vec<String> {
        self.with_namespace(vec![
            "get".to_string(),
            "svc".to_string(),
            self.config.service.clone(),
            "-o".to_string(),
            "json".to_string(),
        ])
    }

    /// Arguments for scaling the deployment.
    pub fn scale_args(&self, replicas: u32) -> Vec<String> {
        self.with_namespace(vec![
            "scale".to_string(),
            format!("deployment/{}", self.config.deployment),
            format!("--replicas={replicas}"),
        ])
    }

    fn with_namespace(&self, mut args: Vec<String>) -> Vec<String> {
        if let Some(ns) = &self.config.namespace {
            args.push("-n".to_string());
            args.push(ns.clone());
        }
        args
    }

    async fn kubectl(&self, args: &[String]) -> Result<Vec<u8>, OrchestratorError> {
        self.run(&self.config.kubectl, args).await
    }

    /// Run a command to completion within the configured timeout.
    async fn run(&self, program: &str, args: &[String]) -> Result<Vec<u8>, OrchestratorError> {
        let command = format!("{program} {}", args.join(" "));
        let mut cmd = Command::new(program);
        cmd.args(args)
            .stdin(Stdio::null())
            .stdout(Stdio::piped())
            .stderr(Stdio::piped())
            .kill_on_drop(true);

        debug!(%command, "running orchestrator command");

        let output = match tokio::time::timeout(self.config.command_timeout, cmd.output()).await {
            Ok(Ok(output)) => output,
            Ok(Err(source)) => return Err(OrchestratorError::Spawn { command, source }),
            Err(_) => {
                return Err(OrchestratorError::Timeout {
                    command,
                    after: self.config.command_timeout,
                });
            }
        };

        if !output.status.success() {
            return Err(OrchestratorError::Failed {
                command,
                status: output.status.to_string(),
                stderr: String::from_utf8_lossy(&output.stderr).trim().to_string(),
            });
        }

        Ok(output.stdout)
    }

    async fn node_address(&self) -> Result<String, OrchestratorError> {
        if let Some(addr) = &self.config.node_address {
            return Ok(addr.clone());
        }
        let stdout = self.run("minikube", &["ip".to_string()]).await?;
        let addr = String::from_utf8_lossy(&stdout).trim().to_string();
        if addr.is_empty() {
            return Err(OrchestratorError::EmptyNodeAddress);
        }
        Ok(addr)
    }

    async fn try_resolve_endpoint(&self) -> Result<String, OrchestratorError> {
        let svc = self.kubectl(&self.service_args()).await?;
        let node_port = parse_node_port(&svc)?
            .ok_or_else(|| OrchestratorError::MissingNodePort(self.config.service.clone()))?;
        let addr = self.node_address().await?;
        Ok(format!("http://{addr}:{node_port}"))
    }
}

impl Orchestrator for Kubectl {
    async fn list_pods(&self) -> Result<Vec<PodInfo>, OrchestratorError> {
        let stdout = self.kubectl(&self.pods_args()).await?;
        parse_pod_list(&stdout)
    }

    async fn resolve_service_endpoint(&self) -> Option<String> {
        match self.try_resolve_endpoint().await {
            Ok(url) => {
                info!(%url, service = %self.config.service, "detected service url");
                Some(url)
            }
            Err(e) => {
                warn!(service = %self.config.service, error = %e, "service url resolution failed");
                None
            }
        }
    }

    async fn apply_replica_count(&self, replicas: u32) -> Result<(), OrchestratorError> {
        info!(
            deployment = %self.config.deployment,
            replicas,
            "scaling deployment"
        );
        self.kubectl(&self.scale_args(replicas)).await?;
        debug!(deployment = %self.config.deployment, replicas, "scale command accepted");
        Ok(())
    }
}

// ── kubectl JSON ───────────────────────────────────────────────────

#[derive(Deserialize)]
struct PodList {
    #[serde(default)]
    items: Vec<Pod>,
}

#[derive(Deserialize)]
struct Pod {
    metadata: PodMetadata,
    #[serde(default)]
    status: PodStatus,
}

#[derive(Deserialize)]
struct PodMetadata {
    name: String,
}

#[derive(Deserialize, Default)]
struct PodStatus {
    #[serde(rename = "podIP")]
    pod_ip: Option<String>,
    phase: Option<String>,
}

#[derive(Deserialize)]
struct Service {
    spec: ServiceSpec,
}

#[derive(Deserialize)]
struct ServiceSpec {
    #[serde(default)]
    ports: Vec<ServicePort>,
}

#[derive(Deserialize)]
struct ServicePort {
    #[serde(rename = "nodePort")]
    node_port: Option<u16>,
}

/// Parse `kubectl get pods -o json` output.
pub fn parse_pod_list(json: &[u8]) -> Result<Vec<PodInfo>, OrchestratorError> {
    let list: PodList = serde_json::from_slice(json).map_err(|source| OrchestratorError::Parse {
        what: "pod list",
        source,
    })?;
    Ok(list
        .items
        .into_iter()
        .map(|pod| PodInfo {
            name: pod.metadata.name,
            ip: pod.status.pod_ip,
            phase: pod.status.phase.unwrap_or_else(|| "Unknown".to_string()),
        })
        .collect())
}

/// Node port of the service's first port, if it has one.
pub fn parse_node_port(json: &[u8]) -> Result<Option<u16>, OrchestratorError> {
    let svc: Service = serde_json::from_slice(json).map_err(|source| OrchestratorError::Parse {
        what: "service",
        source,
    })?;
    Ok(svc.spec.ports.first().and_then(|p| p.node_port))
}
