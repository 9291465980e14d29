//! scalegym-reward: turns measurements into a scalar reward.
//!
//! # Reward
//!
//! ```text
//! base     = -response_time - pod_weight * pod_count
//! stress   = failure_weight * (1 - success_rate)
//!          + max(0, avg_response - latency_threshold) * latency_weight
//! resource = max(0, replicas - soft_cap) * overprovision_weight
//!
//! total    = base - stress (stress steps only) - resource
//! ```
//!
//! Defaults: `pod_weight = 0.1`, `failure_weight = 5`,
//! `latency_threshold = 2s`, `latency_weight = 2`, `soft_cap = 5`,
//! `overprovision_weight = 2`. Nothing is clamped; the reward is unbounded
//! below.

pub mod model;

pub use model::{RewardBreakdown, RewardModel, StressReport};
