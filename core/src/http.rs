//! HTTP request/response values exchanged with a [`Transport`](crate::Transport).
//!
//! # Design
//! Requests and responses are plain data. `OcsClient` builds an
//! `HttpRequest` with every header already attached, hands it to its
//! transport, and decodes whatever body comes back. Keeping the values
//! owned (`String`, `Vec`) lets a test transport record them verbatim.

use std::fmt;

/// HTTP method for a request.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum HttpMethod {
    Get,
    Post,
    Put,
    Delete,
}

impl HttpMethod {
    pub fn as_str(self) -> &'static str {
        match self {
            HttpMethod::Get => "GET",
            HttpMethod::Post => "POST",
            HttpMethod::Put => "PUT",
            HttpMethod::Delete => "DELETE",
        }
    }
}

impl fmt::Display for HttpMethod {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// An authenticated OCS request described as plain data.
///
/// `url` is absolute (base URL, API root and route joined). `body` holds an
/// `application/x-www-form-urlencoded` string for writes that carry
/// parameters.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HttpRequest {
    pub method: HttpMethod,
    pub url: String,
    pub headers: Vec<(String, String)>,
    pub body: Option<String>,
}

impl HttpRequest {
    /// First header value whose name matches `name` exactly.
    pub fn header(&self, name: &str) -> Option<&str> {
        self.headers
            .iter()
            .find(|(key, _)| key == name)
            .map(|(_, value)| value.as_str())
    }
}

/// An HTTP response described as plain data.
///
/// The status code is carried for diagnostics only; the client decodes the
/// body regardless of it.
#[derive(Debug, Clone)]
pub struct HttpResponse {
    pub status: u16,
    pub headers: Vec<(String, String)>,
    pub body: String,
}
