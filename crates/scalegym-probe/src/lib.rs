//! scalegym-probe: latency measurement against the inference service.
//!
//! Two kinds of load:
//!
//! - **Probe**: one request, retried up to `max_attempts` times with
//!   exponential backoff (1s → 2s by default). A probe that never succeeds
//!   reports [`SENTINEL_LATENCY_SECS`](scalegym_core::SENTINEL_LATENCY_SECS)
//!   instead of an error, so the caller always gets a number.
//! - **Burst**: a stress test of many concurrent, unretried requests run on
//!   a bounded worker pool, summarized as a
//!   [`StressOutcome`](scalegym_core::StressOutcome).
//!
//! In realistic mode requests are `POST /recommend` with a random
//! `{"selection": [0|1, ...]}` body; otherwise they are bare GETs.

mod burst;
pub mod endpoint;
pub mod error;
pub mod payload;
pub mod prober;
pub mod request;

pub use endpoint::{Endpoint, RECOMMEND_PATH};
pub use error::{ProbeError, RequestError};
pub use prober::{HttpProber, LoadProber, RetryPolicy};
pub use request::{Response, send_request};
