//! A single timed HTTP request against the target service.
//!
//! Opens a fresh HTTP/1 connection per request (`Connection: close`) so
//! measured latency includes connection setup, the way an external client
//! would see it.

use std::time::{Duration, Instant};

use bytes::Bytes;
use http::header::{CONNECTION, CONTENT_TYPE, HOST, USER_AGENT};
use http::{Method, Request, StatusCode};
use http_body_util::{BodyExt, Full};
use tracing::debug;

use crate::endpoint::Endpoint;
use crate::error::RequestError;

/// A response that arrived in time, successful or not.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Response {
    pub status: StatusCode,
    /// Time from connect until the whole body was read.
    pub elapsed: Duration,
}

impl Response {
    pub fn is_success(&self) -> bool {
        self.status.is_success()
    }
}

/// Send one request: POST `payload` as JSON if given, otherwise GET.
pub async fn send_request(
    endpoint: &Endpoint,
    payload: Option<Bytes>,
    timeout: Duration,
) -> Result<Response, RequestError> {
    let start = Instant::now();

    let exchange = async {
        let stream = tokio::net::TcpStream::connect(endpoint.socket_addr())
            .await
            .map_err(RequestError::Connect)?;

        let io = hyper_util::rt::TokioIo::new(stream);
        let (mut sender, conn) = hyper::client::conn::http1::handshake(io)
            .await
            .map_err(RequestError::Handshake)?;

        // Drive the connection in the background.
        tokio::spawn(async move {
            let _ = conn.await;
        });

        let builder = Request::builder()
            .uri(endpoint.path())
            .header(HOST, endpoint.authority())
            .header(USER_AGENT, "scalegym-probe/0.1")
            .header(CONNECTION, "close");

        let req = match payload {
            Some(body) => builder
                .method(Method::POST)
                .header(CONTENT_TYPE, "application/json")
                .body(Full::new(body))?,
            None => builder.method(Method::GET).body(Full::new(Bytes::new()))?,
        };

        let resp = sender.send_request(req).await.map_err(RequestError::Send)?;
        let status = resp.status();
        resp.into_body().collect().await.map_err(RequestError::Body)?;
        Ok::<_, RequestError>(status)
    };

    match tokio::time::timeout(timeout, exchange).await {
        Ok(Ok(status)) => {
            let elapsed = start.elapsed();
            debug!(%status, elapsed_ms = elapsed.as_millis() as u64, url = %endpoint, "request completed");
            Ok(Response { status, elapsed })
        }
        Ok(Err(e)) => Err(e),
        Err(_) => Err(RequestError::Timeout(timeout)),
    }
}
