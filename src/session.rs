//! # Session
//!
//! The session gate reconciles authentication events pushed by an external
//! identity provider into a stable local view of the user's session. It
//! fetches the authenticated person's profile at most once per login, gates
//! feature access on a permission check, and signals the surrounding client
//! when the visible login state changes or the session first becomes usable.
//!
//! The gate never initiates login, logout or token refresh; it only consumes
//! the resulting events.

use std::sync::{Arc, Mutex};

use serde::{Deserialize, Serialize};
use tracing::instrument;

use crate::api::ApiClient;
use crate::provider::{HolderProvider, SessionListener};

/// Login status pushed by the identity collaborator.
#[derive(Clone, Debug, Default, Deserialize, Serialize, PartialEq, Eq)]
pub enum LoginStatus {
    /// No definitive status has been observed yet.
    #[default]
    #[serde(rename = "")]
    Unknown,

    /// The identity provider considers the user logged in.
    #[serde(rename = "logged-in")]
    LoggedIn,

    /// The identity provider considers the user logged out.
    #[serde(rename = "logged-out")]
    LoggedOut,
}

/// An authentication event as pushed by the identity collaborator on every
/// change. Read-only to this library.
#[derive(Clone, Debug, Default, Deserialize, Serialize)]
pub struct AuthEvent {
    /// The provider's view of the login state.
    #[serde(rename = "login-status", default)]
    pub login_status: LoginStatus,

    /// Bearer token for backend requests, when one is available.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub token: Option<String>,

    /// Identifier of the authenticated person.
    #[serde(rename = "person-id", skip_serializing_if = "Option::is_none")]
    pub person_id: Option<String>,
}

/// Profile of the authenticated person, fetched at most once per login
/// transition and cleared on logout.
#[derive(Clone, Debug, Default, Deserialize, Serialize, PartialEq, Eq)]
pub struct Person {
    /// Unique identifier assigned by the base registry.
    #[serde(default)]
    pub identifier: String,

    /// Given name, for display.
    #[serde(rename = "givenName", default)]
    pub given_name: String,

    /// Family name, for display.
    #[serde(rename = "familyName", default)]
    pub family_name: String,

    /// Roles granted to the person.
    #[serde(default)]
    pub roles: Vec<String>,
}

/// Session status values.
#[derive(Clone, Copy, Debug, Default, Deserialize, Serialize, PartialEq, Eq)]
pub enum Status {
    /// No authenticated user and no authentication under way.
    #[default]
    Anonymous,

    /// A token has been observed but the identity provider has not reported
    /// a completed login.
    Authenticating,

    /// The user is logged in but the profile has not been retrieved.
    AuthenticatedNoProfile,

    /// The profile has been retrieved; the session is fully established.
    /// Left only by an explicit logged-out event.
    Ready,
}

/// Get a string representation of the `Status`.
impl std::fmt::Display for Status {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Anonymous => write!(f, "Anonymous"),
            Self::Authenticating => write!(f, "Authenticating"),
            Self::AuthenticatedNoProfile => write!(f, "AuthenticatedNoProfile"),
            Self::Ready => write!(f, "Ready"),
        }
    }
}

/// Session state owned by the gate.
#[derive(Clone, Debug, Default)]
struct Session {
    status: Status,
    person: Option<Person>,
    token: Option<String>,
    person_id: Option<String>,
    last_login_status: LoginStatus,
    last_visible: Option<(bool, bool)>,
    generation: u64,
}

impl Session {
    fn logged_in(&self) -> bool {
        self.person.is_some()
    }

    fn loading(&self) -> bool {
        if self.last_login_status == LoginStatus::LoggedOut {
            return false;
        }
        !self.logged_in() && self.token.is_some()
    }
}

/// `SessionGate` is a shared handle to one user session. Clones refer to the
/// same session; independent sessions are created with separate gates. The
/// lock is held only across state mutation, never across I/O.
#[derive(Clone, Debug, Default)]
pub struct SessionGate {
    inner: Arc<Mutex<Session>>,
    required_role: Option<String>,
}

impl SessionGate {
    /// Create a gate with the simplified permission policy: any person with
    /// a profile is permitted.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a gate that requires `role` to be present in the person's role
    /// list before the session is considered permitted.
    #[must_use]
    pub fn with_required_role(role: impl Into<String>) -> Self {
        Self {
            inner: Arc::default(),
            required_role: Some(role.into()),
        }
    }

    /// Process one authentication event from the identity collaborator.
    ///
    /// A logged-out event clears the profile and supersedes any in-flight
    /// request. A logged-in event triggers the profile fetch when no profile
    /// is held; a fetch failure leaves the session non-ready so that a later
    /// identical event retries. After the event settles, the listener is
    /// signalled if the visible login state changed, and the usable signal
    /// fires on the transition into [`Status::Ready`] when the permission
    /// check holds.
    #[instrument(level = "debug", skip(self, api))]
    pub async fn handle_event<P: HolderProvider>(&self, api: &ApiClient<P>, event: &AuthEvent) {
        tracing::debug!("SessionGate::handle_event");

        let fetch = self.apply_event(event);

        let mut newly_usable = None;
        if let Some((token, person_id, generation)) = fetch {
            match api.get_person(&token, &person_id).await {
                Ok(person) => newly_usable = self.profile_received(person, generation),
                Err(e) => {
                    // Fail soft: the profile stays empty, so a later
                    // identical event re-triggers the fetch.
                    tracing::error!(target: "SessionGate::handle_event", ?e);
                }
            }
        }

        self.signal_if_changed(api.provider());
        if let Some(person) = newly_usable {
            api.provider().usable(&person);
        }
    }

    // Apply the event to session state; returns the fetch to issue, if any.
    fn apply_event(&self, event: &AuthEvent) -> Option<(String, String, u64)> {
        let mut session = self.inner.lock().expect("should lock");
        session.last_login_status = event.login_status.clone();

        match event.login_status {
            LoginStatus::LoggedOut => {
                session.person = None;
                session.token = None;
                session.person_id = None;
                session.generation += 1;
                session.status = Status::Anonymous;
                None
            }
            LoginStatus::LoggedIn => {
                session.token.clone_from(&event.token);
                session.person_id.clone_from(&event.person_id);
                if session.person.is_some() {
                    return None;
                }
                session.status = Status::AuthenticatedNoProfile;
                match (&session.token, &session.person_id) {
                    (Some(token), Some(person_id)) => {
                        Some((token.clone(), person_id.clone(), session.generation))
                    }
                    _ => None,
                }
            }
            LoginStatus::Unknown => {
                session.token.clone_from(&event.token);
                if session.person.is_none() {
                    session.status = if session.token.is_some() {
                        Status::Authenticating
                    } else {
                        Status::Anonymous
                    };
                }
                None
            }
        }
    }

    // The single transition into `Ready`. Returns the person when the
    // session became usable with this transition.
    fn profile_received(&self, person: Person, generation: u64) -> Option<Person> {
        let mut session = self.inner.lock().expect("should lock");
        if session.generation != generation || session.status != Status::AuthenticatedNoProfile {
            tracing::debug!("discarding profile for a superseded session");
            return None;
        }
        session.person = Some(person.clone());
        session.status = Status::Ready;
        self.permitted(&session).then_some(person)
    }

    fn signal_if_changed(&self, listener: &impl SessionListener) {
        let changed = {
            let mut session = self.inner.lock().expect("should lock");
            let visible = (session.logged_in(), session.loading());
            if session.last_visible == Some(visible) {
                None
            } else {
                session.last_visible = Some(visible);
                Some(visible)
            }
        };
        if let Some((logged_in, loading)) = changed {
            listener.state_changed(logged_in, loading);
        }
    }

    fn permitted(&self, session: &Session) -> bool {
        let Some(person) = &session.person else {
            return false;
        };
        match &self.required_role {
            Some(role) => person.roles.iter().any(|r| r == role),
            None => true,
        }
    }

    /// True iff a profile is held for the current session.
    #[must_use]
    pub fn is_logged_in(&self) -> bool {
        self.inner.lock().expect("should lock").logged_in()
    }

    /// True iff authentication is in flight: a token is present, no profile
    /// is held, and the last observed status was not logged-out.
    #[must_use]
    pub fn is_loading(&self) -> bool {
        self.inner.lock().expect("should lock").loading()
    }

    /// True iff a profile is held and the permission policy is satisfied.
    #[must_use]
    pub fn has_permission(&self) -> bool {
        let session = self.inner.lock().expect("should lock");
        self.permitted(&session)
    }

    /// The authenticated person's profile, if held.
    #[must_use]
    pub fn person(&self) -> Option<Person> {
        self.inner.lock().expect("should lock").person.clone()
    }

    /// The current bearer token, if one has been pushed.
    #[must_use]
    pub fn token(&self) -> Option<String> {
        self.inner.lock().expect("should lock").token.clone()
    }

    /// Current session status.
    #[must_use]
    pub fn status(&self) -> Status {
        self.inner.lock().expect("should lock").status
    }

    /// Monotonic counter identifying the current login session. Bumped on
    /// every logged-out event; flows stamp requests with it and discard
    /// responses whose generation has been superseded.
    #[must_use]
    pub fn generation(&self) -> u64 {
        self.inner.lock().expect("should lock").generation
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn loading_follows_token_and_status() {
        let mut session = Session::default();
        assert!(!session.loading());

        session.token = Some("token".into());
        assert!(session.loading());

        session.person = Some(Person::default());
        assert!(!session.loading());

        session.person = None;
        session.last_login_status = LoginStatus::LoggedOut;
        assert!(!session.loading());
    }

    #[test]
    fn auth_events_use_the_pushed_wire_names() {
        let event: AuthEvent = serde_json::from_str(
            r#"{"login-status": "logged-in", "token": "t", "person-id": "p"}"#,
        )
        .expect("should deserialize");
        assert_eq!(event.login_status, LoginStatus::LoggedIn);
        assert_eq!(event.person_id.as_deref(), Some("p"));

        let event: AuthEvent =
            serde_json::from_str(r#"{"login-status": ""}"#).expect("should deserialize");
        assert_eq!(event.login_status, LoginStatus::Unknown);
    }

    #[test]
    fn permission_requires_role_when_configured() {
        let gate = SessionGate::with_required_role("ROLE_SCOPE_EDUCRED");
        let mut session = Session::default();
        session.person = Some(Person {
            roles: vec!["ROLE_SOMETHING_ELSE".into()],
            ..Person::default()
        });
        assert!(!gate.permitted(&session));

        session.person = Some(Person {
            roles: vec!["ROLE_SCOPE_EDUCRED".into()],
            ..Person::default()
        });
        assert!(gate.permitted(&session));
    }
}
