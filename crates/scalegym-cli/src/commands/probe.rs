use serde_json::json;
use tracing::info;

use scalegym_core::{BurstPlan, GymConfig, SENTINEL_LATENCY_SECS};
use scalegym_probe::{Endpoint, HttpProber, LoadProber};
use scalegym_reward::RewardModel;

use super::service_base_url;

async fn target(config: &GymConfig) -> anyhow::Result<Endpoint> {
    let base = service_base_url(config).await?;
    Ok(Endpoint::for_mode(&base, config.env.realistic_usage)?)
}

pub async fn probe(config: &GymConfig) -> anyhow::Result<()> {
    let endpoint = target(config).await?;
    let prober = HttpProber::new(&config.probe);

    let latency = prober.probe_once(&endpoint, config.env.realistic_usage).await;
    let failed = latency >= SENTINEL_LATENCY_SECS;
    info!(url = %endpoint, response_time_secs = latency, failed, "probe finished");

    println!(
        "{}",
        serde_json::to_string_pretty(&json!({
            "url": endpoint.url(),
            "response_time_secs": latency,
            "failed": failed,
        }))?
    );
    Ok(())
}

/// Burst plan from explicit flags, drawing whatever is missing.
fn plan_burst(config: &GymConfig, requests: Option<usize>, concurrency: Option<usize>) -> BurstPlan {
    let drawn = BurstPlan::sample(&mut rand::rng(), config.probe.burst_range());
    BurstPlan::new(
        requests.unwrap_or(drawn.requests),
        concurrency.unwrap_or(drawn.concurrency),
    )
}

pub async fn stress(
    config: &GymConfig,
    requests: Option<usize>,
    concurrency: Option<usize>,
) -> anyhow::Result<()> {
    let endpoint = target(config).await?;
    let prober = HttpProber::new(&config.probe);
    let plan = plan_burst(config, requests, concurrency);

    let outcome = prober.burst(&endpoint, config.env.realistic_usage, plan).await;
    let report = RewardModel::new(config.reward.clone(), config.env.soft_replica_cap)
        .stress_report(outcome);

    println!(
        "{}",
        serde_json::to_string_pretty(&json!({
            "url": endpoint.url(),
            "plan": plan,
            "outcome": report.outcome,
            "penalty": report.penalty,
        }))?
    );
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn explicit_plan_is_kept() {
        let plan = plan_burst(&GymConfig::default(), Some(10), Some(2));
        assert_eq!(plan, BurstPlan::new(10, 2));
    }

    #[test]
    fn missing_values_come_from_configured_range() {
        let mut config = GymConfig::default();
        config.probe.burst_min = 20;
        config.probe.burst_max = 30;

        let plan = plan_burst(&config, None, Some(5));
        assert!((20..30).contains(&plan.requests));
        assert_eq!(plan.concurrency, 5);
    }
}
