//! # Example Provider
//!
//! The session gate and flows require a provider that implements a number of
//! traits to supply transport, wallet access and callbacks. This module has a
//! sample provider that is useful for self-contained testing (no external
//! services are required), and as an example of how to implement the
//! required traits.
//!
//! Responses are canned per method and path; a request with no canned
//! outcome fails as if the backend were unreachable.

use std::collections::{HashMap, VecDeque};
use std::sync::{Arc, Mutex};

use anyhow::anyhow;
use serde_json::Value;

use super::{HolderProvider, HttpClient, HttpRequest, HttpResponse, SessionListener, Wallet};
use crate::session::Person;

const HOLDER_DID: &str = "did:key:z6MkhaXgBZDvotDkL5257faiztiGiC2QtKLGpbnnEGta2doK";

type Hook = Box<dyn Fn(&HttpRequest) + Send + Sync>;

#[derive(Clone, Debug)]
enum Canned {
    Response(HttpResponse),
    Transport,
}

/// Sample provider. Used for testing and as an example of how to implement
/// the super trait needed by the session gate and flows.
#[derive(Clone, Default)]
pub struct Provider {
    responses: Arc<Mutex<HashMap<String, VecDeque<Canned>>>>,
    requests: Arc<Mutex<Vec<HttpRequest>>>,
    state_changes: Arc<Mutex<Vec<(bool, bool)>>>,
    usable: Arc<Mutex<Vec<Person>>>,
    presentations: Arc<Mutex<Vec<Value>>>,
    on_request: Arc<Mutex<Option<Hook>>>,
}

impl std::fmt::Debug for Provider {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Provider")
            .field("requests", &self.requests.lock().expect("should lock").len())
            .finish_non_exhaustive()
    }
}

impl Provider {
    /// Constructor
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Queue a response for requests matching `method` and `path`.
    pub fn respond(&self, method: &str, path: &str, status: u16, body: impl Into<Vec<u8>>) {
        self.queue(method, path, Canned::Response(HttpResponse::new(status, body)));
    }

    /// Queue a transport failure for requests matching `method` and `path`.
    pub fn fail(&self, method: &str, path: &str) {
        self.queue(method, path, Canned::Transport);
    }

    fn queue(&self, method: &str, path: &str, canned: Canned) {
        self.responses
            .lock()
            .expect("should lock")
            .entry(format!("{method} {path}"))
            .or_default()
            .push_back(canned);
    }

    /// Invoke `hook` on every request before it settles. Useful for
    /// interleaving session changes with an in-flight request.
    pub fn on_request(&self, hook: impl Fn(&HttpRequest) + Send + Sync + 'static) {
        *self.on_request.lock().expect("should lock") = Some(Box::new(hook));
    }

    /// Requests seen so far.
    #[must_use]
    pub fn requests(&self) -> Vec<HttpRequest> {
        self.requests.lock().expect("should lock").clone()
    }

    /// Login-state change signals seen so far.
    #[must_use]
    pub fn state_changes(&self) -> Vec<(bool, bool)> {
        self.state_changes.lock().expect("should lock").clone()
    }

    /// Usable signals seen so far.
    #[must_use]
    pub fn usable_calls(&self) -> Vec<Person> {
        self.usable.lock().expect("should lock").clone()
    }

    /// Seed the wallet with a stored presentation.
    pub fn seed_presentation(&self, presentation: Value) {
        self.presentations.lock().expect("should lock").push(presentation);
    }

    /// Presentations currently held by the wallet.
    #[must_use]
    pub fn stored_presentations(&self) -> Vec<Value> {
        self.presentations.lock().expect("should lock").clone()
    }

    // Requests are matched on method and URL path so callers need not repeat
    // the configured entry point.
    fn key(request: &HttpRequest) -> String {
        let path = request
            .url
            .splitn(4, '/')
            .nth(3)
            .map_or_else(|| request.url.clone(), |p| format!("/{p}"));
        format!("{} {path}", request.method)
    }
}

impl HttpClient for Provider {
    async fn send(&self, request: HttpRequest) -> anyhow::Result<HttpResponse> {
        if let Some(hook) = self.on_request.lock().expect("should lock").as_ref() {
            hook(&request);
        }

        let key = Self::key(&request);
        self.requests.lock().expect("should lock").push(request.clone());

        let canned = self
            .responses
            .lock()
            .expect("should lock")
            .get_mut(&key)
            .and_then(VecDeque::pop_front);

        match canned {
            Some(Canned::Response(response)) => Ok(response),
            Some(Canned::Transport) | None => Err(anyhow!("connection refused: {}", request.url)),
        }
    }
}

impl SessionListener for Provider {
    fn state_changed(&self, logged_in: bool, loading: bool) {
        self.state_changes.lock().expect("should lock").push((logged_in, loading));
    }

    fn usable(&self, person: &Person) {
        self.usable.lock().expect("should lock").push(person.clone());
    }
}

impl Wallet for Provider {
    async fn holder_did(&self) -> anyhow::Result<String> {
        Ok(HOLDER_DID.to_string())
    }

    async fn store(&self, presentation: &Value) -> anyhow::Result<()> {
        self.presentations.lock().expect("should lock").push(presentation.clone());
        Ok(())
    }

    async fn retrieve(&self) -> anyhow::Result<Vec<Value>> {
        Ok(self.presentations.lock().expect("should lock").clone())
    }
}

impl HolderProvider for Provider {}
