use anyhow::Context;

use scalegym_core::GymConfig;
use scalegym_orchestrator::{Kubectl, Orchestrator, PodInfo};

pub async fn pods(config: &GymConfig) -> anyhow::Result<()> {
    let kubectl = Kubectl::new(config.orchestrator.clone());
    let pods = kubectl.list_pods().await.context("listing pods")?;

    println!("{} pod(s) matching {}", pods.len(), config.orchestrator.label_selector);
    for pod in &pods {
        println!("{}", format_pod(pod));
    }
    Ok(())
}

fn format_pod(pod: &PodInfo) -> String {
    format!(
        "  - {}: {} (IP: {})",
        pod.name,
        pod.phase,
        pod.ip.as_deref().unwrap_or("none")
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn pod_line_shows_phase_and_ip() {
        let pod = PodInfo {
            name: "movie-app-7d9f".to_string(),
            ip: Some("172.17.0.4".to_string()),
            phase: "Running".to_string(),
        };
        assert_eq!(format_pod(&pod), "  - movie-app-7d9f: Running (IP: 172.17.0.4)");
    }

    #[test]
    fn pod_line_without_ip() {
        let pod = PodInfo {
            name: "movie-app-x".to_string(),
            ip: None,
            phase: "Pending".to_string(),
        };
        assert_eq!(format_pod(&pod), "  - movie-app-x: Pending (IP: none)");
    }
}
