//! scalegym.toml configuration parser.
//!
//! Every section and field is optional; missing values fall back to the
//! defaults of the reference deployment (`movie-app` on minikube).

use std::ops::Range;
use std::path::Path;
use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::error::ConfigError;

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct GymConfig {
    pub env: EnvConfig,
    pub orchestrator: OrchestratorConfig,
    pub probe: ProbeConfig,
    pub reward: RewardConfig,
}

/// Control-loop settings.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct EnvConfig {
    /// Base URL of the target service. Resolved from the cluster when unset.
    pub endpoint: Option<String>,
    /// POST random feature vectors to `/recommend` instead of bare GETs.
    pub realistic_usage: bool,
    /// Wait after every scaling command before measuring.
    #[serde(with = "duration_str")]
    pub settle: Duration,
    /// Run a stress burst every this many steps.
    pub stress_interval: u64,
    /// Replicas above this are charged a resource penalty.
    pub soft_replica_cap: u32,
    /// Emergency scale-up never goes past this.
    pub hard_replica_cap: u32,
    /// Report `truncated` once this many steps have run in an episode.
    pub max_episode_steps: Option<u64>,
    /// Seed for burst sizing. Drawn from the OS when unset.
    pub seed: Option<u64>,
}

impl Default for EnvConfig {
    fn default() -> Self {
        Self {
            endpoint: None,
            realistic_usage: true,
            settle: Duration::from_secs(1),
            stress_interval: 3,
            soft_replica_cap: 5,
            hard_replica_cap: 10,
            max_episode_steps: None,
            seed: None,
        }
    }
}

/// How to reach the cluster.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct OrchestratorConfig {
    /// Path or name of the kubectl binary.
    pub kubectl: String,
    pub namespace: Option<String>,
    pub deployment: String,
    pub label_selector: String,
    pub service: String,
    /// Node address used with the service's node port. `minikube ip` when unset.
    pub node_address: Option<String>,
    #[serde(with = "duration_str")]
    pub command_timeout: Duration,
}

impl Default for OrchestratorConfig {
    fn default() -> Self {
        Self {
            kubectl: "kubectl".to_string(),
            namespace: None,
            deployment: "movie-app".to_string(),
            label_selector: "app=movie-app".to_string(),
            service: "movie-app-service".to_string(),
            node_address: None,
            command_timeout: Duration::from_secs(30),
        }
    }
}

/// Load probe behaviour.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct ProbeConfig {
    /// Per-request timeout.
    #[serde(with = "duration_str")]
    pub timeout: Duration,
    /// Attempts per single probe, first try included.
    pub max_attempts: u32,
    /// First backoff; doubles after each failed attempt.
    #[serde(with = "duration_str")]
    pub initial_backoff: Duration,
    /// Length of the random `selection` vector.
    pub feature_len: usize,
    /// Burst request count and concurrency are drawn from `burst_min..burst_max`.
    pub burst_min: usize,
    pub burst_max: usize,
}

impl Default for ProbeConfig {
    fn default() -> Self {
        Self {
            timeout: Duration::from_secs(5),
            max_attempts: 3,
            initial_backoff: Duration::from_secs(1),
            feature_len: 50,
            burst_min: 50,
            burst_max: 150,
        }
    }
}

impl ProbeConfig {
    pub fn burst_range(&self) -> Range<usize> {
        self.burst_min..self.burst_max
    }
}

/// Reward weights.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct RewardConfig {
    /// Cost per observed pod in the base reward.
    pub pod_weight: f64,
    /// Penalty for a fully failed burst, scaled by the failure fraction.
    pub failure_weight: f64,
    /// Burst mean latency above this is penalized.
    pub latency_threshold: f64,
    pub latency_weight: f64,
    /// Penalty per replica above the soft cap.
    pub overprovision_weight: f64,
}

impl Default for RewardConfig {
    fn default() -> Self {
        Self {
            pod_weight: 0.1,
            failure_weight: 5.0,
            latency_threshold: 2.0,
            latency_weight: 2.0,
            overprovision_weight: 2.0,
        }
    }
}

impl GymConfig {
    pub fn from_file(path: &Path) -> Result<Self, ConfigError> {
        let content = std::fs::read_to_string(path).map_err(|source| ConfigError::Read {
            path: path.display().to_string(),
            source,
        })?;
        let config: GymConfig = toml::from_str(&content)?;
        config.validate()?;
        Ok(config)
    }

    pub fn to_toml_string(&self) -> Result<String, ConfigError> {
        Ok(toml::to_string_pretty(self)?)
    }

    /// Reject settings the control loop cannot run with.
    pub fn validate(&self) -> Result<(), ConfigError> {
        let env = &self.env;
        if env.stress_interval == 0 {
            return Err(ConfigError::Invalid(
                "env.stress_interval must be at least 1".to_string(),
            ));
        }
        if env.hard_replica_cap < crate::types::MIN_REPLICAS {
            return Err(ConfigError::Invalid(
                "env.hard_replica_cap must be at least 1".to_string(),
            ));
        }
        if env.soft_replica_cap > env.hard_replica_cap {
            return Err(ConfigError::Invalid(format!(
                "env.soft_replica_cap ({}) exceeds env.hard_replica_cap ({})",
                env.soft_replica_cap, env.hard_replica_cap
            )));
        }
        if self.probe.timeout > max_probe_timeout() {
            return Err(ConfigError::Invalid(format!(
                "probe.timeout ({}) exceeds the {}s failure latency",
                format_duration(self.probe.timeout),
                crate::types::SENTINEL_LATENCY_SECS
            )));
        }
        if self.probe.max_attempts == 0 {
            return Err(ConfigError::Invalid(
                "probe.max_attempts must be at least 1".to_string(),
            ));
        }
        if self.probe.burst_range().is_empty() {
            return Err(ConfigError::Invalid(format!(
                "probe burst range {}..{} is empty",
                self.probe.burst_min, self.probe.burst_max
            )));
        }
        Ok(())
    }
}

/// Longest per-request timeout whose latency still fits the observation bounds.
fn max_probe_timeout() -> Duration {
    Duration::from_secs_f64(crate::types::SENTINEL_LATENCY_SECS)
}

/// Parse a duration string like "5s", "500ms", "2m". Bare numbers are seconds.
pub fn parse_duration(s: &str) -> Option<Duration> {
    let s = s.trim();
    if let Some(secs) = s.strip_suffix('s') {
        if let Some(ms) = secs.strip_suffix('m') {
            ms.parse::<u64>().ok().map(Duration::from_millis)
        } else {
            secs.parse::<u64>().ok().map(Duration::from_secs)
        }
    } else if let Some(mins) = s.strip_suffix('m') {
        mins.parse::<u64>()
            .ok()
            .and_then(|m| m.checked_mul(60))
            .map(Duration::from_secs)
    } else {
        s.parse::<u64>().ok().map(Duration::from_secs)
    }
}

/// Inverse of [`parse_duration`], at millisecond resolution.
pub fn format_duration(d: Duration) -> String {
    let ms = d.as_millis();
    if ms % 1000 == 0 {
        format!("{}s", ms / 1000)
    } else {
        format!("{ms}ms")
    }
}

/// Serde adapter for duration strings.
pub mod duration_str {
    use std::time::Duration;

    use serde::{Deserialize, Deserializer, Serializer};

    pub fn serialize<S: Serializer>(d: &Duration, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(&super::format_duration(*d))
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(deserializer: D) -> Result<Duration, D::Error> {
        let s = String::deserialize(deserializer)?;
        super::parse_duration(&s)
            .ok_or_else(|| serde::de::Error::custom(format!("invalid duration `{s}`")))
    }
}
