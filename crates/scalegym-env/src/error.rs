//! Error types for building an environment.

use thiserror::Error;

use scalegym_core::ConfigError;
use scalegym_probe::ProbeError;

/// Errors that prevent an environment from being constructed.
///
/// Nothing after construction fails: per-step problems surface as
/// degraded observations and penalized rewards.
#[derive(Debug, Error)]
pub enum EnvError {
    #[error("unable to determine a reachable url for service {service}")]
    ServiceUnreachable { service: String },

    #[error(transparent)]
    Endpoint(#[from] ProbeError),

    #[error(transparent)]
    Config(#[from] ConfigError),
}
