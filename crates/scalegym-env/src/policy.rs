//! Baseline (non-learning) policies for evaluation runs.

use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use serde::{Deserialize, Serialize};
use tracing::debug;

use scalegym_core::{Action, MIN_REPLICAS, Observation};

/// Picks an action from the latest observation.
pub trait Policy {
    fn act(&mut self, observation: &Observation) -> Action;

    fn name(&self) -> &str;
}

/// Always plays the same action.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FixedPolicy(pub Action);

impl Policy for FixedPolicy {
    fn act(&mut self, _observation: &Observation) -> Action {
        self.0
    }

    fn name(&self) -> &str {
        "fixed"
    }
}

/// Uniform over the three actions.
#[derive(Debug, Clone)]
pub struct RandomPolicy {
    rng: StdRng,
}

impl RandomPolicy {
    pub fn new(seed: Option<u64>) -> Self {
        let rng = match seed {
            Some(seed) => StdRng::seed_from_u64(seed),
            None => StdRng::from_os_rng(),
        };
        Self { rng }
    }
}

impl Policy for RandomPolicy {
    fn act(&mut self, _observation: &Observation) -> Action {
        Action::ALL[self.rng.random_range(0..Action::ALL.len())]
    }

    fn name(&self) -> &str {
        "random"
    }
}

/// Latency band controller.
///
/// Scales up while latency sits above `scale_up_above`, scales down while
/// it sits below `scale_down_below` and more than `min_pods` are running.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ThresholdPolicy {
    pub scale_up_above: f64,
    pub scale_down_below: f64,
    pub min_pods: u32,
}

impl Default for ThresholdPolicy {
    fn default() -> Self {
        Self {
            scale_up_above: 1.0,
            scale_down_below: 0.3,
            min_pods: MIN_REPLICAS,
        }
    }
}

impl Policy for ThresholdPolicy {
    fn act(&mut self, observation: &Observation) -> Action {
        let latency = observation.response_time_secs;
        let action = if latency > self.scale_up_above {
            Action::ScaleUp
        } else if latency < self.scale_down_below && observation.pod_count > self.min_pods {
            Action::ScaleDown
        } else {
            Action::NoOp
        };
        debug!(latency, pods = observation.pod_count, %action, "threshold decision");
        action
    }

    fn name(&self) -> &str {
        "threshold"
    }
}
