//! # Transport provider
//!
//! This module defines the transport provider trait used to reach the
//! credential backend. While the backend is oriented towards HTTP, the trait
//! keeps the library (and tests) transport layer agnostic.

use std::future::Future;

use http::Method;

use crate::provider::Result;

/// A transport-level request.
#[derive(Clone, Debug)]
pub struct HttpRequest {
    /// HTTP method.
    pub method: Method,

    /// Absolute request URL.
    pub url: String,

    /// Header name/value pairs, in insertion order.
    pub headers: Vec<(String, String)>,

    /// Request body, if any.
    pub body: Option<Vec<u8>>,
}

impl HttpRequest {
    fn new(method: Method, url: impl Into<String>) -> Self {
        Self {
            method,
            url: url.into(),
            headers: Vec::new(),
            body: None,
        }
    }

    /// Start building a GET request.
    #[must_use]
    pub fn get(url: impl Into<String>) -> Self {
        Self::new(Method::GET, url)
    }

    /// Start building a POST request.
    #[must_use]
    pub fn post(url: impl Into<String>) -> Self {
        Self::new(Method::POST, url)
    }

    /// Append a header.
    #[must_use]
    pub fn header(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.headers.push((name.into(), value.into()));
        self
    }

    /// Set the request body.
    #[must_use]
    pub fn body(mut self, body: Vec<u8>) -> Self {
        self.body = Some(body);
        self
    }
}

/// A settled transport-level response. A response is returned for any HTTP
/// status; only a request that produced no response at all is a transport
/// error.
#[derive(Clone, Debug, Default)]
pub struct HttpResponse {
    /// HTTP status code.
    pub status: u16,

    /// Raw response body.
    pub body: Vec<u8>,
}

impl HttpResponse {
    /// Construct a response from a status and body.
    #[must_use]
    pub fn new(status: u16, body: impl Into<Vec<u8>>) -> Self {
        Self {
            status,
            body: body.into(),
        }
    }

    /// Whether the status is a success (2xx).
    #[must_use]
    pub const fn is_success(&self) -> bool {
        self.status >= 200 && self.status < 300
    }
}

/// This provider executes requests against the credential backend.
/// Implementations decide the actual transport.
#[allow(clippy::module_name_repetitions)]
pub trait HttpClient: Send + Sync {
    /// Execute a single request. Return `Err` only when no HTTP response was
    /// produced (network unreachable, request aborted); a response carrying
    /// an error status is returned as `Ok`.
    fn send(&self, request: HttpRequest) -> impl Future<Output = Result<HttpResponse>> + Send;
}
