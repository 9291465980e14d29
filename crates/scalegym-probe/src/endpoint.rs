//! Target endpoint parsing.

use std::fmt;

use http::Uri;

use crate::error::ProbeError;

/// Path the inference service serves recommendations on.
pub const RECOMMEND_PATH: &str = "/recommend";

/// A parsed `http://host[:port]/path` target.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Endpoint {
    url: String,
    host: String,
    port: u16,
    authority: String,
    path: String,
}

impl Endpoint {
    /// Parse an absolute `http://` URL.
    pub fn parse(url: &str) -> Result<Self, ProbeError> {
        let invalid = |reason: &str| ProbeError::InvalidEndpoint {
            url: url.to_string(),
            reason: reason.to_string(),
        };

        let uri: Uri = url.trim().parse().map_err(|e: http::uri::InvalidUri| invalid(&e.to_string()))?;

        match uri.scheme_str() {
            Some("http") => {}
            Some(other) => return Err(ProbeError::UnsupportedScheme(other.to_string())),
            None => return Err(invalid("missing scheme")),
        }

        let authority = uri.authority().ok_or_else(|| invalid("missing host"))?;
        let host = authority.host().to_string();
        if host.is_empty() {
            return Err(invalid("missing host"));
        }
        let port = authority.port_u16().unwrap_or(80);
        let path = uri
            .path_and_query()
            .map(|pq| pq.as_str().to_string())
            .unwrap_or_else(|| "/".to_string());

        Ok(Self {
            url: uri.to_string(),
            authority: authority.as_str().to_string(),
            host,
            port,
            path,
        })
    }

    /// Parse `base`, appending [`RECOMMEND_PATH`] in realistic mode unless
    /// the URL already ends with it.
    pub fn for_mode(base: &str, realistic: bool) -> Result<Self, ProbeError> {
        let base = base.trim();
        if realistic && !base.ends_with(RECOMMEND_PATH) {
            Self::parse(&format!("{}{RECOMMEND_PATH}", base.trim_end_matches('/')))
        } else {
            Self::parse(base)
        }
    }

    pub fn url(&self) -> &str {
        &self.url
    }

    /// `host[:port]` as written, for the `Host` header.
    pub fn authority(&self) -> &str {
        &self.authority
    }

    /// Origin-form request target.
    pub fn path(&self) -> &str {
        &self.path
    }

    /// `host:port` for opening a TCP connection.
    pub fn socket_addr(&self) -> String {
        if self.host.starts_with('[') {
            format!("{}:{}", self.host, self.port)
        } else if self.host.contains(':') {
            format!("[{}]:{}", self.host, self.port)
        } else {
            format!("{}:{}", self.host, self.port)
        }
    }
}

impl fmt::Display for Endpoint {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.url)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_host_port_and_path() {
        let ep = Endpoint::parse("http://192.168.49.2:30507/recommend").unwrap();
        assert_eq!(ep.authority(), "192.168.49.2:30507");
        assert_eq!(ep.socket_addr(), "192.168.49.2:30507");
        assert_eq!(ep.path(), "/recommend");
    }

    #[test]
    fn default_port_and_root_path() {
        let ep = Endpoint::parse("http://inference.local").unwrap();
        assert_eq!(ep.socket_addr(), "inference.local:80");
        assert_eq!(ep.path(), "/");
    }

    #[test]
    fn realistic_mode_appends_recommend() {
        let ep = Endpoint::for_mode("http://127.0.0.1:5000", true).unwrap();
        assert_eq!(ep.path(), "/recommend");

        let ep = Endpoint::for_mode("http://127.0.0.1:5000/", true).unwrap();
        assert_eq!(ep.path(), "/recommend");
    }

    #[test]
    fn realistic_mode_does_not_double_append() {
        let ep = Endpoint::for_mode("http://127.0.0.1:5000/recommend", true).unwrap();
        assert_eq!(ep.path(), "/recommend");
    }

    #[test]
    fn synthetic_mode_keeps_path() {
        let ep = Endpoint::for_mode("http://127.0.0.1:5000/healthz", false).unwrap();
        assert_eq!(ep.path(), "/healthz");
    }

    #[test]
    fn rejects_https() {
        let err = Endpoint::parse("https://example.com").unwrap_err();
        assert!(matches!(err, ProbeError::UnsupportedScheme(s) if s == "https"));
    }

    #[test]
    fn rejects_relative_url() {
        assert!(Endpoint::parse("/recommend").is_err());
        assert!(Endpoint::parse("not a url").is_err());
    }
}
