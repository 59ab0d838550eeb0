//! Pull channel: anonymous HTTP GET with a blocking reqwest client.
//!
//! Environment hostnames often present wildcard or self-signed certificates
//! and may redirect http to https, so certificate checks can be disabled and
//! redirects are followed.

use super::{FetchOutcome, PullChannel};
use crate::error::{DibsError, Result};
use reqwest::StatusCode;
use reqwest::blocking::Client;
use reqwest::redirect::Policy;
use std::time::Duration;
use tracing::debug;

/// Maximum redirects followed before giving up.
const MAX_REDIRECTS: usize = 10;

/// [`PullChannel`] over HTTP.
#[derive(Debug, Clone)]
pub struct HttpPullChannel {
    client: Client,
}

impl HttpPullChannel {
    /// Build a client with the given timeout and certificate policy.
    pub fn new(timeout: Duration, accept_invalid_certs: bool) -> Result<Self> {
        let client = Client::builder()
            .timeout(timeout)
            .redirect(Policy::limited(MAX_REDIRECTS))
            .danger_accept_invalid_certs(accept_invalid_certs)
            .build()
            .map_err(|e| DibsError::ConfigError(format!("failed to build HTTP client: {}", e)))?;
        Ok(Self { client })
    }
}

impl PullChannel for HttpPullChannel {
    fn fetch(&self, url: &str) -> FetchOutcome {
        let response = match self.client.get(url).send() {
            Ok(response) => response,
            Err(e) => {
                debug!(url, error = %e, "fetch failed");
                return FetchOutcome::Unavailable(e.to_string());
            }
        };

        let status = response.status();
        if status != StatusCode::OK {
            debug!(url, %status, "fetch returned non-200");
            return FetchOutcome::Unavailable(format!("HTTP status {}", status));
        }

        match response.text() {
            Ok(body) if body.trim().is_empty() => {
                FetchOutcome::Unavailable("empty response body".to_string())
            }
            Ok(body) => FetchOutcome::Body(body),
            Err(e) => {
                debug!(url, error = %e, "reading body failed");
                FetchOutcome::Unavailable(e.to_string())
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::{BufRead, BufReader, Write};
    use std::net::TcpListener;
    use std::thread;

    /// Serve exactly one canned HTTP response on a loopback port.
    fn serve_once(response: &'static str) -> String {
        let listener = TcpListener::bind("127.0.0.1:0").unwrap();
        let addr = listener.local_addr().unwrap();
        thread::spawn(move || {
            if let Ok((mut stream, _)) = listener.accept() {
                let mut reader = BufReader::new(stream.try_clone().unwrap());
                let mut line = String::new();
                while reader.read_line(&mut line).unwrap_or(0) > 0 {
                    if line == "\r\n" {
                        break;
                    }
                    line.clear();
                }
                let _ = stream.write_all(response.as_bytes());
            }
        });
        format!("http://{}/files/__dibs.json?cb=1", addr)
    }

    fn channel() -> HttpPullChannel {
        HttpPullChannel::new(Duration::from_secs(5), true).unwrap()
    }

    #[test]
    fn ok_with_body_is_returned() {
        let url = serve_once(
            "HTTP/1.1 200 OK\r\nContent-Length: 9\r\nConnection: close\r\n\r\n{\"a\":\"b\"}",
        );
        assert_eq!(
            channel().fetch(&url),
            FetchOutcome::Body("{\"a\":\"b\"}".to_string())
        );
    }

    #[test]
    fn not_found_is_unavailable() {
        let url =
            serve_once("HTTP/1.1 404 Not Found\r\nContent-Length: 0\r\nConnection: close\r\n\r\n");
        assert!(matches!(channel().fetch(&url), FetchOutcome::Unavailable(_)));
    }

    #[test]
    fn empty_ok_is_unavailable() {
        let url = serve_once("HTTP/1.1 200 OK\r\nContent-Length: 0\r\nConnection: close\r\n\r\n");
        assert_eq!(
            channel().fetch(&url),
            FetchOutcome::Unavailable("empty response body".to_string())
        );
    }

    #[test]
    fn connection_refused_is_unavailable() {
        let listener = TcpListener::bind("127.0.0.1:0").unwrap();
        let addr = listener.local_addr().unwrap();
        drop(listener);
        let url = format!("http://{}/__dibs.json", addr);
        assert!(matches!(channel().fetch(&url), FetchOutcome::Unavailable(_)));
    }
}
