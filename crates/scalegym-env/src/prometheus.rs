//! Prometheus text exposition for evaluation results.
//!
//! Each metric carries an `episode` label so a whole evaluation run can be
//! written to a file and picked up by a textfile collector.

use crate::evaluate::EpisodeSummary;

/// Render episode summaries into Prometheus text format.
pub fn render_prometheus(episodes: &[EpisodeSummary]) -> String {
    let mut out = String::new();

    out.push_str("# HELP scalegym_episode_reward Sum of step rewards in the episode.\n");
    out.push_str("# TYPE scalegym_episode_reward gauge\n");
    for e in episodes {
        out.push_str(&format!(
            "scalegym_episode_reward{{episode=\"{}\"}} {:.4}\n",
            e.episode, e.total_reward
        ));
    }

    out.push_str("# HELP scalegym_episode_steps Steps taken in the episode.\n");
    out.push_str("# TYPE scalegym_episode_steps gauge\n");
    for e in episodes {
        out.push_str(&format!(
            "scalegym_episode_steps{{episode=\"{}\"}} {}\n",
            e.episode, e.steps
        ));
    }

    out.push_str("# HELP scalegym_episode_mean_response_seconds Mean observed latency in seconds.\n");
    out.push_str("# TYPE scalegym_episode_mean_response_seconds gauge\n");
    for e in episodes {
        out.push_str(&format!(
            "scalegym_episode_mean_response_seconds{{episode=\"{}\"}} {:.4}\n",
            e.episode, e.mean_response_time
        ));
    }

    out.push_str("# HELP scalegym_episode_stress_tests Stress bursts run in the episode.\n");
    out.push_str("# TYPE scalegym_episode_stress_tests gauge\n");
    for e in episodes {
        out.push_str(&format!(
            "scalegym_episode_stress_tests{{episode=\"{}\"}} {}\n",
            e.episode, e.stress_tests
        ));
    }

    out.push_str("# HELP scalegym_episode_corrections Emergency scale-ups in the episode.\n");
    out.push_str("# TYPE scalegym_episode_corrections gauge\n");
    for e in episodes {
        out.push_str(&format!(
            "scalegym_episode_corrections{{episode=\"{}\"}} {}\n",
            e.episode, e.corrections
        ));
    }

    out.push_str("# HELP scalegym_episode_final_pods Pod count at the end of the episode.\n");
    out.push_str("# TYPE scalegym_episode_final_pods gauge\n");
    for e in episodes {
        out.push_str(&format!(
            "scalegym_episode_final_pods{{episode=\"{}\"}} {}\n",
            e.episode, e.final_pod_count
        ));
    }

    out
}
