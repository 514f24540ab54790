//! # Verification
//!
//! The verification flow accepts externally supplied credential text,
//! submits it to the backend and classifies the outcome. Beyond
//! non-emptiness there is no client-side validation; malformed text is the
//! server's concern, surfaced only through the resulting status. Credential
//! text can also be pulled from the holder's wallet for submission.

use serde_json::Value;
use tracing::instrument;

use crate::api::ApiClient;
pub use crate::credential::VerificationStatus;
use crate::credential::Diploma;
use crate::provider::{HolderProvider, Wallet};
use crate::session::SessionGate;

/// `Verification` maintains flow state across submissions.
#[derive(Clone, Debug, Default)]
pub struct Verification {
    /// Outcome of the last submission. Holds until the next submission.
    status: VerificationStatus,

    /// Set while a submission is in flight.
    submitting: bool,

    /// Presentations retrieved from the wallet, available for selection.
    presentations: Vec<Value>,

    /// Summary of the presentation selected from the wallet.
    selected: Option<Diploma>,
}

impl Verification {
    /// Constructor
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Outcome of the last submission.
    #[must_use]
    pub const fn status(&self) -> VerificationStatus {
        self.status
    }

    /// True while a submission is in flight.
    #[must_use]
    pub const fn is_submitting(&self) -> bool {
        self.submitting
    }

    /// Presentations retrieved from the wallet.
    #[must_use]
    pub fn presentations(&self) -> &[Value] {
        &self.presentations
    }

    /// Summary of the presentation selected from the wallet.
    #[must_use]
    pub const fn selected(&self) -> Option<&Diploma> {
        self.selected.as_ref()
    }

    /// Submit credential text for verification. Empty input and sessions
    /// that are not logged in are not submitted. The prior outcome holds
    /// only until the submission settles.
    #[instrument(level = "debug", skip(self, api, session, text))]
    pub async fn submit<P: HolderProvider>(
        &mut self, api: &ApiClient<P>, session: &SessionGate, text: &str,
    ) {
        tracing::debug!("Verification::submit");

        if text.trim().is_empty() {
            tracing::debug!("nothing to submit");
            return;
        }
        if !session.is_logged_in() {
            return;
        }
        let Some(token) = session.token() else {
            return;
        };

        self.submitting = true;
        let generation = session.generation();
        let status = api.submit_for_verification(&token, text).await;
        self.submitting = false;

        if session.generation() == generation {
            self.status = status;
        } else {
            tracing::debug!("discarding verification outcome for a superseded session");
        }
    }

    /// Retrieve the presentations the wallet shares with this application
    /// and select the first one. Returns the selected presentation
    /// serialized for submission, or `None` when the wallet is empty.
    ///
    /// # Errors
    /// Will return an error if the wallet exchange fails.
    pub async fn from_wallet(&mut self, wallet: &impl Wallet) -> anyhow::Result<Option<String>> {
        self.presentations = wallet.retrieve().await?;
        let Some(first) = self.presentations.first() else {
            return Ok(None);
        };
        self.selected = Some(Diploma::from_presentation(first));
        Ok(Some(serde_json::to_string_pretty(first)?))
    }

    /// Select one of the retrieved presentations by credential or subject
    /// identifier. Returns the serialized presentation when a match is
    /// found.
    pub fn select(&mut self, id: &str) -> Option<String> {
        for item in &self.presentations {
            let matches = item.get("id").and_then(Value::as_str) == Some(id)
                || item.pointer("/credentialSubject/id").and_then(Value::as_str) == Some(id);
            if matches {
                self.selected = Some(Diploma::from_presentation(item));
                return serde_json::to_string_pretty(item).ok();
            }
        }
        None
    }
}
