//! Reward computation. Pure functions of the measurements.

use serde::{Deserialize, Serialize};
use tracing::debug;

use scalegym_core::{Observation, RewardConfig, StressOutcome};

/// A stress outcome together with the penalty it earned.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct StressReport {
    pub outcome: StressOutcome,
    pub penalty: f64,
}

/// The components of one step's reward.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct RewardBreakdown {
    pub base: f64,
    /// Present only on stress-test steps.
    pub stress_penalty: Option<f64>,
    pub resource_penalty: f64,
    pub total: f64,
}

/// Reward weights plus the soft replica cap.
#[derive(Debug, Clone, PartialEq)]
pub struct RewardModel {
    weights: RewardConfig,
    soft_cap: u32,
}

impl RewardModel {
    pub fn new(weights: RewardConfig, soft_cap: u32) -> Self {
        Self { weights, soft_cap }
    }

    /// `-latency - pod_weight * pods`.
    pub fn base(&self, observation: &Observation) -> f64 {
        -observation.response_time_secs - self.weights.pod_weight * f64::from(observation.pod_count)
    }

    /// Availability term plus latency-over-threshold term. Never negative.
    pub fn stress_penalty(&self, outcome: &StressOutcome) -> f64 {
        let success_rate = outcome.success_rate.clamp(0.0, 1.0);
        let availability = self.weights.failure_weight * (1.0 - success_rate);
        let latency = (outcome.average_response_time - self.weights.latency_threshold).max(0.0)
            * self.weights.latency_weight;
        availability.max(0.0) + latency
    }

    pub fn stress_report(&self, outcome: StressOutcome) -> StressReport {
        StressReport {
            penalty: self.stress_penalty(&outcome),
            outcome,
        }
    }

    /// Standing cost for replicas above the soft cap.
    pub fn resource_penalty(&self, replicas: u32) -> f64 {
        f64::from(replicas.saturating_sub(self.soft_cap)) * self.weights.overprovision_weight
    }

    /// Combine every term for one step.
    pub fn assess(
        &self,
        observation: &Observation,
        replicas: u32,
        stress_penalty: Option<f64>,
    ) -> RewardBreakdown {
        let base = self.base(observation);
        let resource_penalty = self.resource_penalty(replicas);
        let total = base - stress_penalty.unwrap_or(0.0) - resource_penalty;

        if resource_penalty > 0.0 {
            debug!(replicas, soft_cap = self.soft_cap, resource_penalty, "over-provisioned");
        }

        RewardBreakdown {
            base,
            stress_penalty,
            resource_penalty,
            total,
        }
    }
}

impl Default for RewardModel {
    fn default() -> Self {
        Self::new(RewardConfig::default(), 5)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn outcome(requests: usize, failures: usize, avg: f64) -> StressOutcome {
        StressOutcome {
            requests,
            failures,
            average_response_time: avg,
            success_rate: (requests - failures) as f64 / requests as f64,
        }
    }

    fn approx(a: f64, b: f64) -> bool {
        (a - b).abs() < 1e-9
    }

    #[test]
    fn base_reward_penalizes_latency_and_pods() {
        let model = RewardModel::default();
        assert!(approx(model.base(&Observation::new(0.5, 3)), -0.8));
        assert!(approx(model.base(&Observation::new(10.0, 1)), -10.1));
    }

    #[test]
    fn base_reward_decreases_with_pod_count() {
        let model = RewardModel::default();
        let mut last = f64::INFINITY;
        for pods in 1..=10 {
            let r = model.base(&Observation::new(0.3, pods));
            assert!(r < last);
            last = r;
        }
    }

    #[test]
    fn ten_percent_failures_under_threshold() {
        let model = RewardModel::default();
        let penalty = model.stress_penalty(&outcome(100, 10, 1.0));
        assert!(approx(penalty, 0.5), "got {penalty}");
    }

    #[test]
    fn slow_burst_adds_latency_term() {
        let model = RewardModel::default();
        // 5 * 0 + (3.5 - 2.0) * 2
        assert!(approx(model.stress_penalty(&outcome(80, 0, 3.5)), 3.0));
        // 5 * 1 + (10 - 2) * 2
        assert!(approx(model.stress_penalty(&outcome(50, 50, 10.0)), 21.0));
    }

    #[test]
    fn stress_penalty_zero_iff_clean_and_fast() {
        let model = RewardModel::default();
        assert_eq!(model.stress_penalty(&outcome(100, 0, 2.0)), 0.0);
        assert_eq!(model.stress_penalty(&outcome(100, 0, 0.1)), 0.0);
        assert!(model.stress_penalty(&outcome(100, 1, 0.1)) > 0.0);
        assert!(model.stress_penalty(&outcome(100, 0, 2.01)) > 0.0);
    }

    #[test]
    fn stress_penalty_is_never_negative() {
        let model = RewardModel::default();
        for failures in 0..=100 {
            for avg in [0.0, 0.5, 1.9, 2.0, 2.5, 10.0] {
                assert!(model.stress_penalty(&outcome(100, failures, avg)) >= 0.0);
            }
        }
    }

    #[test]
    fn resource_penalty_above_soft_cap() {
        let model = RewardModel::default();
        for replicas in 0..=5 {
            assert_eq!(model.resource_penalty(replicas), 0.0);
        }
        assert_eq!(model.resource_penalty(6), 2.0);
        assert_eq!(model.resource_penalty(10), 10.0);
        assert_eq!(model.resource_penalty(13), 16.0);
    }

    #[test]
    fn resource_penalty_is_monotone() {
        let model = RewardModel::default();
        let mut last = 0.0;
        for replicas in 1..=20 {
            let p = model.resource_penalty(replicas);
            assert!(p >= last);
            last = p;
        }
    }

    #[test]
    fn assess_subtracts_all_terms() {
        let model = RewardModel::default();
        let obs = Observation::new(1.0, 7);
        let b = model.assess(&obs, 7, Some(0.5));
        assert!(approx(b.base, -1.7));
        assert_eq!(b.resource_penalty, 4.0);
        assert_eq!(b.stress_penalty, Some(0.5));
        assert!(approx(b.total, -1.7 - 0.5 - 4.0));

        let b = model.assess(&obs, 7, None);
        assert!(approx(b.total, -5.7));
    }

    #[test]
    fn custom_weights() {
        let model = RewardModel::new(
            RewardConfig {
                pod_weight: 1.0,
                overprovision_weight: 0.5,
                ..RewardConfig::default()
            },
            2,
        );
        assert!(approx(model.base(&Observation::new(0.0, 4)), -4.0));
        assert_eq!(model.resource_penalty(4), 1.0);
    }

    #[test]
    fn stress_report_carries_penalty() {
        let model = RewardModel::default();
        let report = model.stress_report(outcome(100, 10, 1.0));
        assert!(approx(report.penalty, 0.5));
        assert_eq!(report.outcome.failures, 10);
    }
}
