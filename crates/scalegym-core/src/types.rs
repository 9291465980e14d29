//! Domain types shared by the scalegym crates.
//!
//! These are the values that cross crate boundaries: the discrete action a
//! policy picks, the observation the environment hands back, and the
//! aggregate result of a stress burst.

use std::fmt;
use std::ops::Range;
use std::str::FromStr;

use rand::Rng;
use serde::{Deserialize, Serialize};

/// Latency (seconds) reported for a request that never succeeded.
pub const SENTINEL_LATENCY_SECS: f64 = 10.0;

/// Lowest replica count the control loop will ever apply.
pub const MIN_REPLICAS: u32 = 1;

// ── Actions ────────────────────────────────────────────────────────

/// A scaling decision for a single step.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Action {
    /// Remove one replica (never below [`MIN_REPLICAS`]).
    ScaleDown,
    /// Keep the current replica count.
    NoOp,
    /// Add one replica.
    ScaleUp,
}

impl Action {
    /// All actions in discrete-index order.
    pub const ALL: [Action; 3] = [Action::ScaleDown, Action::NoOp, Action::ScaleUp];

    /// Map a discrete action index (0, 1, 2) to an action.
    pub fn from_index(index: usize) -> Option<Self> {
        Self::ALL.get(index).copied()
    }

    /// The discrete index of this action.
    pub fn index(self) -> usize {
        match self {
            Action::ScaleDown => 0,
            Action::NoOp => 1,
            Action::ScaleUp => 2,
        }
    }

    /// Replica count after applying this action to `replicas`.
    ///
    /// Scale-up is not capped here; the floor of one replica always holds.
    pub fn apply(self, replicas: u32) -> u32 {
        match self {
            Action::ScaleDown => replicas.saturating_sub(1).max(MIN_REPLICAS),
            Action::NoOp => replicas.max(MIN_REPLICAS),
            Action::ScaleUp => replicas.saturating_add(1).max(MIN_REPLICAS),
        }
    }
}

impl fmt::Display for Action {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Action::ScaleDown => "scale_down",
            Action::NoOp => "no_op",
            Action::ScaleUp => "scale_up",
        };
        f.write_str(name)
    }
}

impl FromStr for Action {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "0" | "down" | "scale_down" => Ok(Action::ScaleDown),
            "1" | "noop" | "no_op" => Ok(Action::NoOp),
            "2" | "up" | "scale_up" => Ok(Action::ScaleUp),
            other => Err(format!("unknown action `{other}`")),
        }
    }
}

// ── Observation ────────────────────────────────────────────────────

/// What the environment reports after each reset or step.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Observation {
    /// Single-probe latency in seconds, [`SENTINEL_LATENCY_SECS`] on failure.
    pub response_time_secs: f64,
    /// Pod count as reported by the orchestrator.
    pub pod_count: u32,
}

impl Observation {
    pub fn new(response_time_secs: f64, pod_count: u32) -> Self {
        Self {
            response_time_secs,
            pod_count,
        }
    }

    /// The `[response_time, pod_count]` vector handed to learners.
    pub fn to_array(&self) -> [f32; 2] {
        [self.response_time_secs as f32, self.pod_count as f32]
    }
}

/// Discrete action space descriptor.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct ActionSpace {
    pub n: usize,
}

impl Default for ActionSpace {
    fn default() -> Self {
        Self {
            n: Action::ALL.len(),
        }
    }
}

/// Box-shaped observation space: `[0, 10] x [1, hard_cap]`.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ObservationSpace {
    pub low: [f32; 2],
    pub high: [f32; 2],
}

impl ObservationSpace {
    pub fn new(hard_replica_cap: u32) -> Self {
        Self {
            low: [0.0, MIN_REPLICAS as f32],
            high: [SENTINEL_LATENCY_SECS as f32, hard_replica_cap as f32],
        }
    }

    /// Whether `obs` lies inside the bounds.
    pub fn contains(&self, obs: &[f32; 2]) -> bool {
        obs.iter()
            .zip(self.low.iter().zip(self.high.iter()))
            .all(|(v, (lo, hi))| v >= lo && v <= hi)
    }
}

// ── Stress bursts ──────────────────────────────────────────────────

/// Size and fan-out of one stress burst.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct BurstPlan {
    /// Total requests to issue.
    pub requests: usize,
    /// Upper bound on requests in flight at once.
    pub concurrency: usize,
}

impl BurstPlan {
    pub fn new(requests: usize, concurrency: usize) -> Self {
        Self {
            requests,
            concurrency,
        }
    }

    /// Draw request count and concurrency independently from `range`.
    ///
    /// `range` must be non-empty.
    pub fn sample<R: Rng + ?Sized>(rng: &mut R, range: Range<usize>) -> Self {
        Self {
            requests: rng.random_range(range.clone()),
            concurrency: rng.random_range(range),
        }
    }
}

/// One request's contribution to a burst.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Sample {
    pub latency_secs: f64,
    pub failed: bool,
}

impl Sample {
    pub fn success(latency_secs: f64) -> Self {
        Self {
            latency_secs,
            failed: false,
        }
    }

    /// A failed request, charged the sentinel latency.
    pub fn failure() -> Self {
        Self {
            latency_secs: SENTINEL_LATENCY_SECS,
            failed: true,
        }
    }
}

/// Aggregate statistics of a stress burst.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct StressOutcome {
    pub requests: usize,
    pub failures: usize,
    /// Mean latency over every attempt, failures included.
    pub average_response_time: f64,
    /// `(requests - failures) / requests`, in `[0, 1]`.
    pub success_rate: f64,
}

impl StressOutcome {
    /// Aggregate per-request samples. An empty burst counts as fully successful.
    pub fn from_samples(samples: &[Sample]) -> Self {
        let requests = samples.len();
        if requests == 0 {
            return Self {
                requests: 0,
                failures: 0,
                average_response_time: 0.0,
                success_rate: 1.0,
            };
        }

        let failures = samples.iter().filter(|s| s.failed).count();
        let total: f64 = samples.iter().map(|s| s.latency_secs).sum();

        Self {
            requests,
            failures,
            average_response_time: total / requests as f64,
            success_rate: (requests - failures) as f64 / requests as f64,
        }
    }
}
