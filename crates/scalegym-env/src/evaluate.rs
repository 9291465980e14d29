//! Episode runner for scoring a policy against an environment.

use serde::{Deserialize, Serialize};
use tracing::info;

use crate::env::Environment;
use crate::policy::Policy;

/// Per-episode totals.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EpisodeSummary {
    pub episode: usize,
    pub steps: u64,
    pub total_reward: f64,
    /// Mean observed latency over the episode's steps.
    pub mean_response_time: f64,
    pub stress_tests: u64,
    pub corrections: u64,
    pub final_pod_count: u32,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EvaluationReport {
    pub policy: String,
    pub episodes: Vec<EpisodeSummary>,
    /// Mean of the episode totals, 0 for an empty run.
    pub average_reward: f64,
}

/// Play `episodes` episodes of at most `max_steps` steps each.
///
/// An episode also ends early once the environment reports it terminated
/// or truncated.
pub async fn run_episodes<E, P>(
    env: &mut E,
    policy: &mut P,
    episodes: usize,
    max_steps: u64,
) -> EvaluationReport
where
    E: Environment,
    P: Policy + ?Sized,
{
    let mut summaries = Vec::with_capacity(episodes);

    for episode in 0..episodes {
        let (mut observation, _info) = env.reset(None).await;
        let mut summary = EpisodeSummary {
            episode,
            steps: 0,
            total_reward: 0.0,
            mean_response_time: 0.0,
            stress_tests: 0,
            corrections: 0,
            final_pod_count: observation.pod_count,
        };
        let mut latency_sum = 0.0;

        while summary.steps < max_steps {
            let action = policy.act(&observation);
            let result = env.step(action).await;

            summary.steps += 1;
            summary.total_reward += result.reward;
            latency_sum += result.observation.response_time_secs;
            summary.stress_tests += u64::from(result.stress.is_some());
            summary.corrections += u64::from(result.correction.is_some());
            summary.final_pod_count = result.observation.pod_count;
            observation = result.observation;

            if result.done() {
                break;
            }
        }

        if summary.steps > 0 {
            summary.mean_response_time = latency_sum / summary.steps as f64;
        }

        info!(
            episode,
            policy = policy.name(),
            steps = summary.steps,
            total_reward = summary.total_reward,
            corrections = summary.corrections,
            "episode finished"
        );
        summaries.push(summary);
    }

    let average_reward = if summaries.is_empty() {
        0.0
    } else {
        summaries.iter().map(|s| s.total_reward).sum::<f64>() / summaries.len() as f64
    };

    EvaluationReport {
        policy: policy.name().to_string(),
        episodes: summaries,
        average_reward,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::env::{Info, StepResult};
    use crate::policy::FixedPolicy;
    use scalegym_core::{Action, ActionSpace, Observation, ObservationSpace};
    use scalegym_reward::RewardBreakdown;

    /// Counts steps; reward is minus the step index; truncates at `limit`.
    struct Counter {
        pods: u32,
        steps: u64,
        limit: Option<u64>,
        resets: usize,
    }

    impl Environment for Counter {
        fn action_space(&self) -> ActionSpace {
            ActionSpace::default()
        }

        fn observation_space(&self) -> ObservationSpace {
            ObservationSpace::new(10)
        }

        async fn reset(&mut self, _seed: Option<u64>) -> (Observation, Info) {
            self.pods = 1;
            self.steps = 0;
            self.resets += 1;
            (Observation::new(0.2, 1), Info::new())
        }

        async fn step(&mut self, action: Action) -> StepResult {
            self.steps += 1;
            self.pods = action.apply(self.pods);
            let reward = -(self.steps as f64);
            StepResult {
                observation: Observation::new(0.4, self.pods),
                reward,
                terminated: false,
                truncated: self.limit.is_some_and(|l| self.steps >= l),
                info: Info::new(),
                breakdown: RewardBreakdown {
                    total: reward,
                    ..RewardBreakdown::default()
                },
                stress: None,
                correction: None,
            }
        }
    }

    fn counter(limit: Option<u64>) -> Counter {
        Counter {
            pods: 1,
            steps: 0,
            limit,
            resets: 0,
        }
    }

    #[tokio::test]
    async fn runs_each_episode_to_max_steps() {
        let mut env = counter(None);
        let mut policy = FixedPolicy(Action::ScaleUp);

        let report = run_episodes(&mut env, &mut policy, 2, 4).await;

        assert_eq!(env.resets, 2);
        assert_eq!(report.episodes.len(), 2);
        for summary in &report.episodes {
            assert_eq!(summary.steps, 4);
            assert_eq!(summary.total_reward, -10.0);
            assert_eq!(summary.final_pod_count, 5);
            assert!((summary.mean_response_time - 0.4).abs() < 1e-12);
        }
        assert_eq!(report.average_reward, -10.0);
        assert_eq!(report.policy, "fixed");
    }

    #[tokio::test]
    async fn stops_on_truncation() {
        let mut env = counter(Some(2));
        let mut policy = FixedPolicy(Action::NoOp);

        let report = run_episodes(&mut env, &mut policy, 1, 100).await;

        assert_eq!(report.episodes[0].steps, 2);
        assert_eq!(report.episodes[0].total_reward, -3.0);
    }

    #[tokio::test]
    async fn zero_steps_keeps_reset_observation() {
        let mut env = counter(None);
        let mut policy = FixedPolicy(Action::ScaleUp);

        let report = run_episodes(&mut env, &mut policy, 1, 0).await;

        let summary = &report.episodes[0];
        assert_eq!(summary.steps, 0);
        assert_eq!(summary.mean_response_time, 0.0);
        assert_eq!(summary.final_pod_count, 1);
    }

    #[tokio::test]
    async fn empty_run_averages_to_zero() {
        let mut env = counter(None);
        let mut policy = FixedPolicy(Action::NoOp);

        let report = run_episodes(&mut env, &mut policy, 0, 10).await;
        assert!(report.episodes.is_empty());
        assert_eq!(report.average_reward, 0.0);
    }
}
