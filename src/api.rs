//! # Credential API
//!
//! Uniform request execution against the credential backend. Every operation
//! attaches the caller's bearer token, none retries, and failures are
//! reported through [`ApiError`] so transport failures, error statuses and
//! malformed bodies stay distinct for callers. The POST operations may have
//! server-side side effects and must not be re-issued automatically on an
//! ambiguous failure.

use http::header;
use serde::de::DeserializeOwned;
use serde_json::Value;
use thiserror::Error;

use crate::credential::{Diploma, VerifiableForm, VerificationStatus};
use crate::provider::{HttpClient, HttpRequest, HttpResponse};
use crate::session::Person;

/// Collection endpoint for diplomas, relative to the entry point.
pub(crate) const DIPLOMAS_PATH: &str = "/educationalcredentials/diplomas";

/// Profile endpoint prefix, relative to the entry point.
const PEOPLE_PATH: &str = "/base/people";

/// Errors surfaced by the credential API client.
#[derive(Debug, Error)]
pub enum ApiError {
    /// The request produced no HTTP response (network unreachable, aborted).
    #[error("transport failure: {0}")]
    Transport(anyhow::Error),

    /// The server responded with a non-success status.
    #[error("status {status}")]
    Status {
        /// HTTP status code.
        status: u16,
        /// Response body, for diagnostics.
        body: String,
    },

    /// A request or response body could not be (de)serialized.
    #[error("malformed body: {0}")]
    Decode(serde_json::Error),
}

/// Result type for credential API operations.
pub type ApiResult<T> = Result<T, ApiError>;

/// `ApiClient` executes credential operations through the injected transport
/// against a configured API entry point.
#[derive(Clone, Debug)]
pub struct ApiClient<P> {
    provider: P,
    entry_point: String,
}

impl<P> ApiClient<P> {
    /// Create a client for the API rooted at `entry_point`.
    pub fn new(provider: P, entry_point: impl Into<String>) -> Self {
        let mut entry_point = entry_point.into();
        while entry_point.ends_with('/') {
            entry_point.pop();
        }
        Self {
            provider,
            entry_point,
        }
    }

    /// The injected provider.
    pub const fn provider(&self) -> &P {
        &self.provider
    }

    fn url(&self, path: &str) -> String {
        format!("{}{path}", self.entry_point)
    }
}

impl<P: HttpClient> ApiClient<P> {
    // Execute a request, separating transport failures from error statuses.
    async fn request(&self, request: HttpRequest) -> ApiResult<HttpResponse> {
        let response = self.provider.send(request).await.map_err(ApiError::Transport)?;
        if !response.is_success() {
            return Err(ApiError::Status {
                status: response.status,
                body: String::from_utf8_lossy(&response.body).into_owned(),
            });
        }
        Ok(response)
    }

    fn get(&self, path: &str, token: &str) -> HttpRequest {
        HttpRequest::get(self.url(path))
            .header(header::CONTENT_TYPE.as_str(), "application/ld+json")
            .header(header::AUTHORIZATION.as_str(), format!("Bearer {token}"))
    }

    fn post(&self, path: &str, token: &str) -> HttpRequest {
        HttpRequest::post(self.url(path))
            .header(header::CONTENT_TYPE.as_str(), "application/ld+json")
            .header(header::AUTHORIZATION.as_str(), format!("Bearer {token}"))
    }

    fn decode<T: DeserializeOwned>(response: &HttpResponse) -> ApiResult<T> {
        serde_json::from_slice(&response.body).map_err(ApiError::Decode)
    }

    /// Fetch the profile of the authenticated person.
    ///
    /// # Errors
    /// Returns an error when the request does not settle with a decodable
    /// 2xx response.
    pub async fn get_person(&self, token: &str, person_id: &str) -> ApiResult<Person> {
        let request = self.get(&format!("{PEOPLE_PATH}/{person_id}"), token);
        let response = self.request(request).await?;
        Self::decode(&response)
    }

    /// Fetch the holder's diploma collection, in server response order.
    ///
    /// # Errors
    /// Returns an error when the request does not settle with a decodable
    /// 2xx response.
    pub async fn list_diplomas(&self, token: &str) -> ApiResult<Vec<Diploma>> {
        let request = self.get(DIPLOMAS_PATH, token);
        let response = self.request(request).await?;
        let envelope: HydraCollection = Self::decode(&response)?;
        envelope.items()
    }

    /// Fetch a single diploma by its bare identifier.
    ///
    /// # Errors
    /// Returns an error when the request does not settle with a decodable
    /// 2xx response.
    pub async fn get_diploma(&self, token: &str, id: &str) -> ApiResult<Diploma> {
        let request = self.get(&format!("{DIPLOMAS_PATH}/{id}"), token);
        let response = self.request(request).await?;
        Self::decode(&response)
    }

    /// Fetch the verifiable form of a diploma, addressed to the wallet named
    /// by `did`. When `as_jwt` is set the credential is requested in the
    /// compact JWT format.
    ///
    /// # Errors
    /// Returns an error when the request does not settle with a decodable
    /// 2xx response.
    pub async fn verifiable_form(
        &self, token: &str, id: &str, did: &str, as_jwt: bool,
    ) -> ApiResult<VerifiableForm> {
        let body = serde_json::json!({
            "did": did,
            "format": if as_jwt { "jsonldjwt" } else { "" },
        });
        let request = self
            .post(&format!("{DIPLOMAS_PATH}/{id}/verifiable"), token)
            .body(serde_json::to_vec(&body).map_err(ApiError::Decode)?);
        let response = self.request(request).await?;
        Self::decode(&response)
    }

    /// Submit credential text for verification and classify the outcome.
    ///
    /// HTTP 400 is a recognized domain outcome (the credential was rejected),
    /// not a failure. Every other non-success outcome, transport failures
    /// included, reads as unverified.
    pub async fn submit_for_verification(&self, token: &str, text: &str) -> VerificationStatus {
        let body = url::form_urlencoded::Serializer::new(String::new())
            .append_pair("text", text)
            .finish();
        let request = HttpRequest::post(self.url(DIPLOMAS_PATH))
            .header(header::CONTENT_TYPE.as_str(), "application/x-www-form-urlencoded")
            .header(header::AUTHORIZATION.as_str(), format!("Bearer {token}"))
            .body(body.into_bytes());

        match self.provider.send(request).await {
            Ok(response) if response.is_success() => VerificationStatus::Verified,
            Ok(response) if response.status == 400 => VerificationStatus::Rejected,
            Ok(response) => {
                tracing::debug!("verification settled with status {}", response.status);
                VerificationStatus::Unverified
            }
            Err(e) => {
                tracing::error!(target: "ApiClient::submit_for_verification", ?e);
                VerificationStatus::Unverified
            }
        }
    }
}

/// Paginated JSON-LD collection envelope.
#[derive(Clone, Debug, Default, serde::Deserialize)]
struct HydraCollection {
    /// Total number of entries the server reports for the collection. The
    /// server has been observed to serve this as either a number or a
    /// string.
    #[serde(rename = "hydra:totalItems", default)]
    total_items: Value,

    /// Collection entries.
    #[serde(rename = "hydra:member", default)]
    member: Vec<Value>,
}

impl HydraCollection {
    // The reported count governs how many entries are read; an unparseable
    // count reads as zero.
    fn len(&self) -> usize {
        match &self.total_items {
            Value::Number(n) => usize::try_from(n.as_u64().unwrap_or(0)).unwrap_or(0),
            Value::String(s) => s.trim().parse().unwrap_or(0),
            _ => 0,
        }
    }

    fn items(&self) -> ApiResult<Vec<Diploma>> {
        let count = self.len();
        if count > self.member.len() {
            tracing::debug!(
                "collection reports {count} entries but carries {}",
                self.member.len()
            );
        }
        self.member
            .iter()
            .take(count)
            .map(|entry| serde_json::from_value(entry.clone()).map_err(ApiError::Decode))
            .collect()
    }
}
