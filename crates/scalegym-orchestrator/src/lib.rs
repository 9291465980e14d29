//! scalegym-orchestrator: the cluster side of the control loop.
//!
//! Reads pod counts, resolves the service endpoint, and applies replica
//! counts for one deployment. Query failures degrade to safe defaults
//! (see [`Orchestrator::current_pod_count`]); command failures are
//! returned so the caller can log them and re-measure.
//!
//! # Architecture
//!
//! ```text
//! Orchestrator (trait)
//!   ├── list_pods()                → Vec<PodInfo>
//!   ├── current_pod_count()        → u32, 1 on failure
//!   ├── resolve_service_endpoint() → Option<url>
//!   └── apply_replica_count(n)
//!
//! Kubectl
//!   ├── kubectl get pods -l <selector> -o json
//!   ├── kubectl get svc <service> -o json + minikube ip
//!   └── kubectl scale deployment/<name> --replicas=<n>
//! ```

pub mod client;
pub mod error;
pub mod kubectl;

pub use client::{FALLBACK_POD_COUNT, Orchestrator, PodInfo};
pub use error::OrchestratorError;
pub use kubectl::Kubectl;
