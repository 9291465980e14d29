use std::path::PathBuf;
use std::time::Duration;

use anyhow::Context;
use clap::{Args, ValueEnum};
use tracing::info;

use scalegym_core::{Action, GymConfig};
use scalegym_env::{
    DeploymentEnv, FixedPolicy, Policy, RandomPolicy, ThresholdPolicy, render_prometheus,
    run_episodes,
};

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum PolicyKind {
    /// Never change the replica count.
    Noop,
    /// Always add a replica.
    Up,
    /// Always remove a replica.
    Down,
    /// Uniformly random actions.
    Random,
    /// Scale on latency thresholds.
    Threshold,
}

#[derive(Args, Debug)]
pub struct EvaluateArgs {
    /// Baseline policy to play.
    #[arg(long, value_enum, default_value_t = PolicyKind::Threshold)]
    pub policy: PolicyKind,

    /// Number of episodes.
    #[arg(long, default_value_t = 1)]
    pub episodes: usize,

    /// Step limit per episode.
    #[arg(long, default_value_t = 20)]
    pub max_steps: u64,

    /// Seed for the burst planner and the random policy.
    #[arg(long)]
    pub seed: Option<u64>,

    /// Override the settle wait after each scale command.
    #[arg(long, value_parser = crate::duration_arg)]
    pub settle: Option<Duration>,

    /// Latency (seconds) above which the threshold policy scales up.
    #[arg(long, default_value_t = 1.0)]
    pub scale_up_above: f64,

    /// Latency (seconds) below which the threshold policy scales down.
    #[arg(long, default_value_t = 0.3)]
    pub scale_down_below: f64,

    /// Write per-episode Prometheus metrics to this file.
    #[arg(long)]
    pub metrics_out: Option<PathBuf>,
}

impl EvaluateArgs {
    fn build_policy(&self) -> Box<dyn Policy> {
        match self.policy {
            PolicyKind::Noop => Box::new(FixedPolicy(Action::NoOp)),
            PolicyKind::Up => Box::new(FixedPolicy(Action::ScaleUp)),
            PolicyKind::Down => Box::new(FixedPolicy(Action::ScaleDown)),
            PolicyKind::Random => Box::new(RandomPolicy::new(self.seed)),
            PolicyKind::Threshold => Box::new(ThresholdPolicy {
                scale_up_above: self.scale_up_above,
                scale_down_below: self.scale_down_below,
                ..ThresholdPolicy::default()
            }),
        }
    }
}

pub async fn evaluate(mut config: GymConfig, args: EvaluateArgs) -> anyhow::Result<()> {
    if args.seed.is_some() {
        config.env.seed = args.seed;
    }
    if let Some(settle) = args.settle {
        config.env.settle = settle;
    }

    let mut env = DeploymentEnv::connect(&config)
        .await
        .context("building environment")?;
    let mut policy = args.build_policy();

    info!(
        policy = policy.name(),
        episodes = args.episodes,
        max_steps = args.max_steps,
        endpoint = %env.endpoint(),
        "starting evaluation"
    );

    let report = run_episodes(&mut env, policy.as_mut(), args.episodes, args.max_steps).await;
    env.close();

    println!("{}", serde_json::to_string_pretty(&report)?);

    if let Some(path) = &args.metrics_out {
        std::fs::write(path, render_prometheus(&report.episodes))
            .with_context(|| format!("writing metrics to {}", path.display()))?;
        info!(path = %path.display(), "metrics written");
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use scalegym_core::Observation;

    fn args(policy: PolicyKind) -> EvaluateArgs {
        EvaluateArgs {
            policy,
            episodes: 1,
            max_steps: 5,
            seed: Some(1),
            settle: None,
            scale_up_above: 2.0,
            scale_down_below: 0.5,
            metrics_out: None,
        }
    }

    #[test]
    fn fixed_policies_map_to_actions() {
        let obs = Observation::new(0.4, 3);
        assert_eq!(args(PolicyKind::Noop).build_policy().act(&obs), Action::NoOp);
        assert_eq!(args(PolicyKind::Up).build_policy().act(&obs), Action::ScaleUp);
        assert_eq!(args(PolicyKind::Down).build_policy().act(&obs), Action::ScaleDown);
    }

    #[test]
    fn threshold_policy_uses_flag_values() {
        let mut policy = args(PolicyKind::Threshold).build_policy();
        assert_eq!(policy.name(), "threshold");
        // Above the default ceiling but below the configured one.
        assert_eq!(policy.act(&Observation::new(1.5, 3)), Action::NoOp);
        assert_eq!(policy.act(&Observation::new(2.5, 3)), Action::ScaleUp);
        assert_eq!(policy.act(&Observation::new(0.4, 3)), Action::ScaleDown);
    }
}
