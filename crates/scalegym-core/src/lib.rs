//! scalegym-core: shared types and configuration for scalegym.
//!
//! Holds the vocabulary every other crate speaks: [`Action`],
//! [`Observation`], [`BurstPlan`], [`StressOutcome`], and the
//! [`GymConfig`] loaded from `scalegym.toml`.

pub mod config;
pub mod error;
pub mod types;

pub use config::{EnvConfig, GymConfig, OrchestratorConfig, ProbeConfig, RewardConfig};
pub use error::ConfigError;
pub use types::*;
