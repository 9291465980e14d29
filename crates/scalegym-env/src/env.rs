//! Deployment environment: the reset/step control loop.
//!
//! Each step applies a scaling action through the orchestrator, waits for
//! the deployment to settle, measures latency and pod count, and charges
//! the reward model. Every `stress_interval` steps a stress burst runs;
//! if it earns a penalty the environment scales up on its own before
//! returning.
//!
//! # Step
//!
//! ```text
//! replicas ← action.apply(replicas)
//! apply(replicas); sleep(settle)
//! obs ← [probe_once(), pod_count()]
//! steps += 1
//! stress ← burst() if steps % stress_interval == 0
//! reward ← base(obs) - stress.penalty - resource(replicas)
//! if stress.penalty > 0:
//!     replicas ← min(replicas + max(1, ⌊penalty / 2⌋), hard_cap)
//!     apply(replicas); sleep(settle)   // visible from the next step on
//! ```

use std::collections::BTreeMap;
use std::future::Future;

use rand::SeedableRng;
use rand::rngs::StdRng;
use serde::{Deserialize, Serialize};
use tracing::{debug, info, warn};

use scalegym_core::{
    Action, ActionSpace, BurstPlan, EnvConfig, GymConfig, MIN_REPLICAS, Observation,
    ObservationSpace,
};
use scalegym_orchestrator::{Kubectl, Orchestrator};
use scalegym_probe::{Endpoint, HttpProber, LoadProber};
use scalegym_reward::{RewardBreakdown, RewardModel, StressReport};

use crate::error::EnvError;

/// Auxiliary per-step information handed to the learner.
pub type Info = BTreeMap<String, serde_json::Value>;

/// An emergency scale-up performed after a penalized stress burst.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Correction {
    pub from: u32,
    pub to: u32,
    /// Pod count read after the correction settled.
    pub pod_count: u32,
}

/// Everything one step produces.
#[derive(Debug, Clone, PartialEq)]
pub struct StepResult {
    pub observation: Observation,
    pub reward: f64,
    /// Always false: the task never ends on its own.
    pub terminated: bool,
    /// True once `max_episode_steps` is reached, if configured.
    pub truncated: bool,
    pub info: Info,
    pub breakdown: RewardBreakdown,
    pub stress: Option<StressReport>,
    pub correction: Option<Correction>,
}

impl StepResult {
    pub fn done(&self) -> bool {
        self.terminated || self.truncated
    }
}

/// Single-agent, discrete-action, continuing-task environment contract.
///
/// Calls must not overlap; `&mut self` enforces that.
pub trait Environment {
    fn action_space(&self) -> ActionSpace;

    fn observation_space(&self) -> ObservationSpace;

    /// Start a new episode. `seed` reseeds any internal randomness.
    fn reset(&mut self, seed: Option<u64>) -> impl Future<Output = (Observation, Info)> + Send;

    fn step(&mut self, action: Action) -> impl Future<Output = StepResult> + Send;
}

/// Replica count the emergency correction moves to.
///
/// Scales up by `max(1, ⌊penalty / 2⌋)`, capped at `hard_cap`. Returns
/// `replicas` unchanged when the penalty is not positive.
pub fn correction_target(replicas: u32, stress_penalty: f64, hard_cap: u32) -> u32 {
    if stress_penalty.is_nan() || stress_penalty <= 0.0 {
        return replicas;
    }
    // Float-to-int casts saturate, so huge penalties just hit the cap.
    let increase = ((stress_penalty / 2.0).floor() as u32).max(1);
    replicas.saturating_add(increase).min(hard_cap)
}

/// The autoscaling environment over one deployment.
pub struct DeploymentEnv<O, P> {
    orchestrator: O,
    prober: P,
    endpoint: Endpoint,
    settings: EnvConfig,
    burst_range: std::ops::Range<usize>,
    reward: RewardModel,
    replicas: u32,
    steps: u64,
    rng: StdRng,
}

impl DeploymentEnv<Kubectl, HttpProber> {
    /// Build an environment against the configured cluster over real HTTP.
    pub async fn connect(config: &GymConfig) -> Result<Self, EnvError> {
        let orchestrator = Kubectl::new(config.orchestrator.clone());
        let prober = HttpProber::new(&config.probe);
        Self::new(config, orchestrator, prober).await
    }
}

impl<O: Orchestrator, P: LoadProber> DeploymentEnv<O, P> {
    /// Resolve the target endpoint and read the starting replica count.
    ///
    /// Fails only if the configuration is invalid or no endpoint can be
    /// determined.
    pub async fn new(config: &GymConfig, orchestrator: O, prober: P) -> Result<Self, EnvError> {
        config.validate()?;

        let base_url = match &config.env.endpoint {
            Some(url) => url.clone(),
            None => orchestrator.resolve_service_endpoint().await.ok_or_else(|| {
                EnvError::ServiceUnreachable {
                    service: config.orchestrator.service.clone(),
                }
            })?,
        };
        let endpoint = Endpoint::for_mode(&base_url, config.env.realistic_usage)?;
        info!(%endpoint, realistic = config.env.realistic_usage, "using service endpoint");

        let replicas = orchestrator.current_pod_count().await.max(MIN_REPLICAS);
        info!(replicas, "initial pod count");

        let rng = match config.env.seed {
            Some(seed) => StdRng::seed_from_u64(seed),
            None => StdRng::from_os_rng(),
        };

        Ok(Self {
            orchestrator,
            prober,
            endpoint,
            settings: config.env.clone(),
            burst_range: config.probe.burst_range(),
            reward: RewardModel::new(config.reward.clone(), config.env.soft_replica_cap),
            replicas,
            steps: 0,
            rng,
        })
    }

    /// Replica count most recently commanded.
    pub fn replicas(&self) -> u32 {
        self.replicas
    }

    /// Steps taken since the last reset.
    pub fn steps(&self) -> u64 {
        self.steps
    }

    pub fn endpoint(&self) -> &Endpoint {
        &self.endpoint
    }

    pub fn orchestrator(&self) -> &O {
        &self.orchestrator
    }

    pub fn prober(&self) -> &P {
        &self.prober
    }

    pub fn action_space(&self) -> ActionSpace {
        ActionSpace::default()
    }

    pub fn observation_space(&self) -> ObservationSpace {
        ObservationSpace::new(self.settings.hard_replica_cap)
    }

    /// Scale back to one replica and take a fresh measurement.
    pub async fn reset(&mut self, seed: Option<u64>) -> (Observation, Info) {
        if let Some(seed) = seed {
            self.rng = StdRng::seed_from_u64(seed);
        }
        info!(replicas = MIN_REPLICAS, "resetting environment");

        self.replicas = MIN_REPLICAS;
        self.apply_replicas(self.replicas).await;
        self.settle().await;

        let observation = self.observe().await;
        self.steps = 0;

        info!(
            response_time_secs = observation.response_time_secs,
            pod_count = observation.pod_count,
            "initial state"
        );
        (observation, Info::new())
    }

    /// Apply `action`, measure, and score the result.
    pub async fn step(&mut self, action: Action) -> StepResult {
        let previous = self.replicas;
        self.replicas = action.apply(self.replicas);
        info!(%action, from = previous, to = self.replicas, "applying action");

        self.apply_replicas(self.replicas).await;
        self.settle().await;

        let observation = self.observe().await;
        self.steps += 1;

        let stress = if self.steps % self.settings.stress_interval == 0 {
            Some(self.stress_test().await)
        } else {
            None
        };

        let breakdown = self
            .reward
            .assess(&observation, self.replicas, stress.map(|s| s.penalty));

        // The reward above is final; the correction only shows in later steps.
        let correction = match stress {
            Some(report) if report.penalty > 0.0 => self.emergency_scale_up(report.penalty).await,
            _ => None,
        };

        let truncated = self
            .settings
            .max_episode_steps
            .is_some_and(|max| self.steps >= max);

        info!(
            step = self.steps,
            response_time_secs = observation.response_time_secs,
            pod_count = observation.pod_count,
            reward = breakdown.total,
            resource_penalty = breakdown.resource_penalty,
            stress_penalty = breakdown.stress_penalty,
            truncated,
            "step complete"
        );

        StepResult {
            observation,
            reward: breakdown.total,
            terminated: false,
            truncated,
            info: Info::new(),
            breakdown,
            stress,
            correction,
        }
    }

    pub fn close(&mut self) {
        info!(steps = self.steps, replicas = self.replicas, "closing environment");
    }

    async fn observe(&self) -> Observation {
        let response_time = self
            .prober
            .probe_once(&self.endpoint, self.settings.realistic_usage)
            .await;
        let pod_count = self.orchestrator.current_pod_count().await;
        Observation::new(response_time, pod_count)
    }

    /// Command a replica count; failures are logged and the loop carries on.
    async fn apply_replicas(&self, replicas: u32) {
        if let Err(e) = self.orchestrator.apply_replica_count(replicas).await {
            warn!(replicas, error = %e, "scale command failed, continuing with measured state");
        }
    }

    async fn settle(&self) {
        if self.settings.settle.is_zero() {
            return;
        }
        debug!(settle_ms = self.settings.settle.as_millis() as u64, "waiting for deployment update");
        tokio::time::sleep(self.settings.settle).await;
    }

    async fn stress_test(&mut self) -> StressReport {
        let plan = BurstPlan::sample(&mut self.rng, self.burst_range.clone());
        let outcome = self
            .prober
            .burst(&self.endpoint, self.settings.realistic_usage, plan)
            .await;
        let report = self.reward.stress_report(outcome);
        info!(
            requests = outcome.requests,
            concurrency = plan.concurrency,
            avg_response_secs = outcome.average_response_time,
            success_rate = outcome.success_rate,
            penalty = report.penalty,
            "stress test"
        );
        report
    }

    async fn emergency_scale_up(&mut self, stress_penalty: f64) -> Option<Correction> {
        let from = self.replicas;
        let to = correction_target(from, stress_penalty, self.settings.hard_replica_cap);
        if to <= from {
            debug!(replicas = from, cap = self.settings.hard_replica_cap, "at hard cap, no correction");
            return None;
        }

        warn!(from, to, stress_penalty, "severe stress detected, scaling up");
        self.replicas = to;
        self.apply_replicas(to).await;
        self.settle().await;
        let pod_count = self.orchestrator.current_pod_count().await;

        Some(Correction { from, to, pod_count })
    }
}

impl<O: Orchestrator, P: LoadProber> Environment for DeploymentEnv<O, P> {
    fn action_space(&self) -> ActionSpace {
        DeploymentEnv::action_space(self)
    }

    fn observation_space(&self) -> ObservationSpace {
        DeploymentEnv::observation_space(self)
    }

    async fn reset(&mut self, seed: Option<u64>) -> (Observation, Info) {
        DeploymentEnv::reset(self, seed).await
    }

    async fn step(&mut self, action: Action) -> StepResult {
        DeploymentEnv::step(self, action).await
    }
}
