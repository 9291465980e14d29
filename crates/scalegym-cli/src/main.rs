//! scalegym: drive the autoscaling environment from the command line.
//!
//! # Usage
//!
//! ```text
//! scalegym --config gym.toml evaluate --policy threshold --episodes 3
//! scalegym --endpoint http://192.168.49.2:30080 stress --requests 100
//! scalegym monitor --interval 5s
//! ```

use std::path::PathBuf;
use std::time::Duration;

use anyhow::Context;
use clap::{Parser, Subcommand};
use tracing_subscriber::EnvFilter;

use scalegym_core::GymConfig;
use scalegym_core::config::parse_duration;

mod commands;

use commands::evaluate::EvaluateArgs;

#[derive(Parser, Debug)]
#[command(
    name = "scalegym",
    about = "Reinforcement-learning environment for replica autoscaling",
    version,
    propagate_version = true
)]
struct Cli {
    /// TOML configuration file. Defaults apply when omitted.
    #[arg(short, long, global = true)]
    config: Option<PathBuf>,

    /// Emit logs as JSON lines.
    #[arg(long, global = true)]
    json: bool,

    /// Target service URL. Skips resolving it from the cluster.
    #[arg(long, global = true)]
    endpoint: Option<String>,

    /// Send bare GETs instead of recommendation requests.
    #[arg(long, global = true)]
    synthetic: bool,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Run a baseline policy for a number of episodes and report rewards.
    Evaluate(EvaluateArgs),

    /// Measure latency with a single retried probe.
    Probe,

    /// Fire one stress burst and report its outcome and penalty.
    Stress {
        /// Requests to send. Drawn from the configured range when omitted.
        #[arg(long)]
        requests: Option<usize>,

        /// Requests in flight at once. Drawn from the configured range when omitted.
        #[arg(long)]
        concurrency: Option<usize>,
    },

    /// Periodically sample latency and pods until Ctrl-C.
    Monitor {
        /// Time between samples, e.g. `5s` or `500ms`.
        #[arg(long, default_value = "5s", value_parser = duration_arg)]
        interval: Duration,
    },

    /// List the deployment's pods.
    Pods,
}

fn duration_arg(s: &str) -> Result<Duration, String> {
    parse_duration(s).ok_or_else(|| format!("invalid duration `{s}`, expected e.g. 5s, 500ms or 2m"))
}

fn init_tracing(json: bool) {
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new("info,scalegym=debug"));
    let builder = tracing_subscriber::fmt().with_env_filter(filter);
    if json {
        builder.json().init();
    } else {
        builder.init();
    }
}

/// Load the config file (if any) and apply global flag overrides.
fn load_config(cli: &Cli) -> anyhow::Result<GymConfig> {
    let mut config = match &cli.config {
        Some(path) => GymConfig::from_file(path)
            .with_context(|| format!("loading config from {}", path.display()))?,
        None => GymConfig::default(),
    };
    if let Some(endpoint) = &cli.endpoint {
        config.env.endpoint = Some(endpoint.clone());
    }
    if cli.synthetic {
        config.env.realistic_usage = false;
    }
    config.validate()?;
    Ok(config)
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();
    init_tracing(cli.json);

    let config = load_config(&cli)?;

    match cli.command {
        Command::Evaluate(args) => commands::evaluate::evaluate(config, args).await,
        Command::Probe => commands::probe::probe(&config).await,
        Command::Stress {
            requests,
            concurrency,
        } => commands::probe::stress(&config, requests, concurrency).await,
        Command::Monitor { interval } => commands::monitor::monitor(&config, interval).await,
        Command::Pods => commands::pods::pods(&config).await,
    }
}

#[cfg(test)]
mod tests {
    use std::io::Write;

    use clap::CommandFactory;

    use super::*;
    use commands::evaluate::PolicyKind;

    #[test]
    fn cli_definition_is_consistent() {
        Cli::command().debug_assert();
    }

    #[test]
    fn parses_evaluate_with_defaults() {
        let cli = Cli::try_parse_from(["scalegym", "evaluate"]).unwrap();
        let Command::Evaluate(args) = cli.command else {
            panic!("expected evaluate");
        };
        assert_eq!(args.policy, PolicyKind::Threshold);
        assert_eq!(args.episodes, 1);
        assert_eq!(args.max_steps, 20);
        assert!(args.seed.is_none());
    }

    #[test]
    fn parses_global_flags_after_subcommand() {
        let cli = Cli::try_parse_from([
            "scalegym",
            "probe",
            "--endpoint",
            "http://10.0.0.5:30080",
            "--synthetic",
            "--json",
        ])
        .unwrap();
        assert!(cli.synthetic);
        assert!(cli.json);
        assert_eq!(cli.endpoint.as_deref(), Some("http://10.0.0.5:30080"));
    }

    #[test]
    fn parses_monitor_interval() {
        let cli = Cli::try_parse_from(["scalegym", "monitor", "--interval", "500ms"]).unwrap();
        let Command::Monitor { interval } = cli.command else {
            panic!("expected monitor");
        };
        assert_eq!(interval, Duration::from_millis(500));

        assert!(Cli::try_parse_from(["scalegym", "monitor", "--interval", "soon"]).is_err());
    }

    #[test]
    fn parses_evaluate_options() {
        let cli = Cli::try_parse_from([
            "scalegym",
            "evaluate",
            "--policy",
            "random",
            "--episodes",
            "4",
            "--max-steps",
            "50",
            "--seed",
            "9",
            "--settle",
            "2s",
        ])
        .unwrap();
        let Command::Evaluate(args) = cli.command else {
            panic!("expected evaluate");
        };
        assert_eq!(args.policy, PolicyKind::Random);
        assert_eq!(args.episodes, 4);
        assert_eq!(args.max_steps, 50);
        assert_eq!(args.seed, Some(9));
        assert_eq!(args.settle, Some(Duration::from_secs(2)));
    }

    #[test]
    fn flags_override_config_file() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        writeln!(file, "[env]\nendpoint = \"http://from-file:80\"\nstress_interval = 5").unwrap();
        let path = file.path().to_str().unwrap().to_string();

        let cli = Cli::try_parse_from([
            "scalegym",
            "--config",
            path.as_str(),
            "--endpoint",
            "http://from-flag:80",
            "--synthetic",
            "pods",
        ])
        .unwrap();
        let config = load_config(&cli).unwrap();

        assert_eq!(config.env.endpoint.as_deref(), Some("http://from-flag:80"));
        assert!(!config.env.realistic_usage);
        assert_eq!(config.env.stress_interval, 5);
    }

    #[test]
    fn missing_config_file_is_an_error() {
        let cli = Cli::try_parse_from(["scalegym", "--config", "/nonexistent/gym.toml", "pods"]).unwrap();
        assert!(load_config(&cli).is_err());
    }
}
