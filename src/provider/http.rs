//! # HTTP transport
//!
//! A `reqwest`-backed implementation of the [`HttpClient`] provider trait.
//! Applications compose it into their own provider; the library never
//! constructs one on its own.

use std::time::Duration;

use anyhow::anyhow;

use super::{HttpClient, HttpRequest, HttpResponse};

const TIMEOUT: Duration = Duration::from_secs(5);

/// `HttpTransport` sends requests with a shared `reqwest` client.
#[derive(Clone, Debug)]
pub struct HttpTransport {
    client: reqwest::Client,
}

impl HttpTransport {
    /// Construct a transport with the default request timeout.
    #[must_use]
    pub fn new() -> Self {
        let client = reqwest::Client::builder()
            .timeout(TIMEOUT)
            .build()
            .expect("should build HTTP client");
        Self { client }
    }
}

impl Default for HttpTransport {
    fn default() -> Self {
        Self::new()
    }
}

impl HttpClient for HttpTransport {
    async fn send(
        &self,
        HttpRequest {
            method,
            url,
            headers,
            body,
        }: HttpRequest,
    ) -> anyhow::Result<HttpResponse> {
        let mut request = self.client.request(method.clone(), &url);
        for (name, value) in headers {
            request = request.header(name, value);
        }
        if let Some(body) = body {
            request = request.body(body);
        }

        let response = request.send().await.map_err(|e| anyhow!("{method} {url}: {e}"))?;
        let status = response.status().as_u16();
        let body = response.bytes().await.map_err(|e| anyhow!("{method} {url}: {e}"))?;

        Ok(HttpResponse::new(status, body.to_vec()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn builds_with_the_default_timeout() {
        let _transport = HttpTransport::new();
        let _transport = HttpTransport::default();
    }
}
