//! scalegym-env: the autoscaling environment.
//!
//! Ties the orchestrator client, the load prober and the reward model into
//! a reset/step control loop that a learning agent drives one action at a
//! time.
//!
//! # Architecture
//!
//! ```text
//! Policy / learner
//!   └── DeploymentEnv::step(action)
//!         ├── Orchestrator::apply_replica_count()   (scale)
//!         ├── LoadProber::probe_once()              (latency)
//!         ├── Orchestrator::current_pod_count()     (pods)
//!         ├── LoadProber::burst()                   (every N steps)
//!         └── RewardModel::assess()                 (reward)
//! ```
//!
//! [`run_episodes`] plays a [`Policy`] against any [`Environment`] and
//! [`render_prometheus`] turns the resulting summaries into exposition
//! text.

pub mod env;
pub mod error;
pub mod evaluate;
pub mod policy;
pub mod prometheus;

pub use env::{Correction, DeploymentEnv, Environment, Info, StepResult, correction_target};
pub use error::EnvError;
pub use evaluate::{EpisodeSummary, EvaluationReport, run_episodes};
pub use policy::{FixedPolicy, Policy, RandomPolicy, ThresholdPolicy};
pub use prometheus::render_prometheus;
