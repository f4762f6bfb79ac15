//! The I/O seam between `OcsClient` and the network.
//!
//! `Transport` executes one fully-built [`HttpRequest`]. `UreqTransport` is
//! the production implementation; tests substitute a recording transport.

use std::time::Duration;

use ureq::{Agent, RequestBuilder};

use crate::http::{HttpMethod, HttpRequest, HttpResponse};

/// Boxed cause of a transport-level failure.
pub type BoxError = Box<dyn std::error::Error + Send + Sync + 'static>;

/// Total time allowed for a single round trip, connect through body read.
pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(10);

/// Executes a single HTTP request and returns the raw response.
///
/// Implementations must hand back non-2xx responses as data. Only failures
/// to produce a response at all (DNS, connect, timeout, body read) are
/// errors.
pub trait Transport {
    fn execute(&self, request: HttpRequest) -> Result<HttpResponse, BoxError>;
}

/// Blocking transport backed by a `ureq` agent.
#[derive(Debug, Clone)]
pub struct UreqTransport {
    agent: Agent,
}

impl UreqTransport {
    pub fn new() -> Self {
        Self::with_timeout(DEFAULT_TIMEOUT)
    }

    pub fn with_timeout(timeout: Duration) -> Self {
        let agent = Agent::config_builder()
            .timeout_global(Some(timeout))
            .http_status_as_error(false)
            .build()
            .new_agent();
        Self { agent }
    }
}

impl Default for UreqTransport {
    fn default() -> Self {
        Self::new()
    }
}

impl Transport for UreqTransport {
    fn execute(&self, request: HttpRequest) -> Result<HttpResponse, BoxError> {
        let HttpRequest {
            method,
            url,
            headers,
            body,
        } = request;

        let mut response = match (method, body) {
            (HttpMethod::Get, _) => with_headers(self.agent.get(&url), &headers).call(),
            (HttpMethod::Delete, None) => with_headers(self.agent.delete(&url), &headers).call(),
            // Group removal sends `groupid` in the body of a DELETE.
            (HttpMethod::Delete, Some(body)) => with_headers(self.agent.delete(&url), &headers)
                .force_send_body()
                .send(body.as_bytes()),
            (HttpMethod::Post, Some(body)) => {
                with_headers(self.agent.post(&url), &headers).send(body.as_bytes())
            }
            (HttpMethod::Post, None) => with_headers(self.agent.post(&url), &headers).send_empty(),
            (HttpMethod::Put, Some(body)) => {
                with_headers(self.agent.put(&url), &headers).send(body.as_bytes())
            }
            (HttpMethod::Put, None) => with_headers(self.agent.put(&url), &headers).send_empty(),
        }?;

        let status = response.status().as_u16();
        let headers = response
            .headers()
            .iter()
            .filter_map(|(name, value)| {
                value
                    .to_str()
                    .ok()
                    .map(|value| (name.as_str().to_string(), value.to_string()))
            })
            .collect();
        let body = response.body_mut().read_to_string()?;

        Ok(HttpResponse {
            status,
            headers,
            body,
        })
    }
}

fn with_headers<B>(builder: RequestBuilder<B>, headers: &[(String, String)]) -> RequestBuilder<B> {
    headers
        .iter()
        .fold(builder, |builder, (name, value)| builder.header(name.as_str(), value.as_str()))
}

#[cfg(test)]
mod tests {
    use std::net::TcpListener;
    use std::thread;
    use std::time::Instant;

    use super::*;

    /// Accepts one connection and holds it open without answering.
    fn silent_server(hold: Duration) -> std::net::SocketAddr {
        let listener = TcpListener::bind("127.0.0.1:0").unwrap();
        let addr = listener.local_addr().unwrap();
        thread::spawn(move || {
            if let Ok((_stream, _)) = listener.accept() {
                thread::sleep(hold);
            }
        });
        addr
    }

    #[test]
    fn default_timeout_is_ten_seconds() {
        assert_eq!(DEFAULT_TIMEOUT, Duration::from_secs(10));
    }

    #[test]
    fn stalled_server_hits_the_timeout() {
        let addr = silent_server(Duration::from_secs(5));
        let transport = UreqTransport::with_timeout(Duration::from_millis(200));

        let started = Instant::now();
        let result = transport.execute(HttpRequest {
            method: HttpMethod::Get,
            url: format!("http://{addr}/ocs/v1.php/cloud/users"),
            headers: Vec::new(),
            body: None,
        });
        assert!(result.is_err());
        assert!(started.elapsed() < Duration::from_secs(2), "took {:?}", started.elapsed());
    }

    #[test]
    fn refused_connection_is_an_error() {
        // Bind then drop to get a port nothing listens on.
        let listener = std::net::TcpListener::bind("127.0.0.1:0").unwrap();
        let addr = listener.local_addr().unwrap();
        drop(listener);

        let transport = UreqTransport::with_timeout(Duration::from_secs(2));
        let result = transport.execute(HttpRequest {
            method: HttpMethod::Get,
            url: format!("http://{addr}/ocs/v1.php/cloud/users"),
            headers: Vec::new(),
            body: None,
        });
        assert!(result.is_err());
    }
}
