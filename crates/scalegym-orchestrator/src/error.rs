//! Error types for orchestrator commands.

use std::time::Duration;

use thiserror::Error;

/// Errors that can occur while talking to the orchestrator.
#[derive(Debug, Error)]
pub enum OrchestratorError {
    #[error("failed to spawn `{command}`: {source}")]
    Spawn {
        command: String,
        #[source]
        source: std::io::Error,
    },

    #[error("`{command}` failed ({status}): {stderr}")]
    Failed {
        command: String,
        status: String,
        stderr: String,
    },

    #[error("`{command}` timed out after {after:?}")]
    Timeout { command: String, after: Duration },

    #[error("failed to parse {what}: {source}")]
    Parse {
        what: &'static str,
        #[source]
        source: serde_json::Error,
    },

    #[error("service {0} exposes no node port")]
    MissingNodePort(String),

    #[error("empty node address")]
    EmptyNodeAddress,
}
