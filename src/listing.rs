//! # Diploma Listing
//!
//! The listing flow maintains the holder's diploma collection and drives
//! per-item export of the verifiable form. The collection is rebuilt
//! wholesale from each successful list fetch; nothing is cached across
//! fetches. An empty collection is a valid, displayable terminal state, not
//! an error.

use anyhow::bail;
use tracing::instrument;

use crate::api::{ApiClient, DIPLOMAS_PATH};
use crate::credential::{Diploma, VerifiableForm};
use crate::provider::{HolderProvider, Wallet};
use crate::session::SessionGate;

/// `Listing` maintains flow state across refresh and export.
#[derive(Clone, Debug, Default)]
pub struct Listing {
    /// Diplomas last retrieved, in server response order. `None` until the
    /// first successful refresh; an empty list afterwards means the holder
    /// has no diplomas.
    diplomas: Option<Vec<Diploma>>,

    /// Set while a list fetch is in flight.
    loading: bool,

    /// The verifiable form most recently exported, the caller's cue to open
    /// a detail presentation.
    current: Option<VerifiableForm>,
}

impl Listing {
    /// Constructor
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// The current collection, or `None` when no fetch has succeeded yet.
    #[must_use]
    pub fn diplomas(&self) -> Option<&[Diploma]> {
        self.diplomas.as_deref()
    }

    /// True while a list fetch is in flight.
    #[must_use]
    pub const fn is_loading(&self) -> bool {
        self.loading
    }

    /// The most recently exported verifiable form.
    #[must_use]
    pub const fn current(&self) -> Option<&VerifiableForm> {
        self.current.as_ref()
    }

    /// Replace the collection from the server. A no-op unless the session is
    /// logged in. Failures keep the previous collection; the loading flag is
    /// cleared however the fetch settles, and a response that arrives after
    /// the session was superseded is discarded.
    #[instrument(level = "debug", skip(self, api, session))]
    pub async fn refresh<P: HolderProvider>(&mut self, api: &ApiClient<P>, session: &SessionGate) {
        tracing::debug!("Listing::refresh");

        if !session.is_logged_in() {
            return;
        }
        let Some(token) = session.token() else {
            return;
        };

        self.loading = true;
        let generation = session.generation();
        let result = api.list_diplomas(&token).await;
        self.loading = false;

        if session.generation() != generation {
            tracing::debug!("discarding diploma list for a superseded session");
            return;
        }
        match result {
            Ok(diplomas) => self.diplomas = Some(diplomas),
            Err(e) => {
                // Fail soft: keep the previous collection.
                tracing::error!(target: "Listing::refresh", ?e);
            }
        }
    }

    /// Fetch the verifiable form of one diploma and make it current.
    /// `diploma_id` may be a bare identifier or a full collection `@id`
    /// path. A no-op unless the session is logged in.
    #[instrument(level = "debug", skip(self, api, session))]
    pub async fn export_one<P: HolderProvider>(
        &mut self, api: &ApiClient<P>, session: &SessionGate, diploma_id: &str, did: &str,
        as_jwt: bool,
    ) {
        tracing::debug!("Listing::export_one");

        if !session.is_logged_in() {
            return;
        }
        let Some(token) = session.token() else {
            return;
        };

        let prefix = format!("{DIPLOMAS_PATH}/");
        let id = diploma_id.strip_prefix(prefix.as_str()).unwrap_or(diploma_id);

        let generation = session.generation();
        match api.verifiable_form(&token, id, did, as_jwt).await {
            Ok(form) if session.generation() == generation => self.current = Some(form),
            Ok(_) => tracing::debug!("discarding verifiable form for a superseded session"),
            Err(e) => {
                tracing::error!(target: "Listing::export_one", ?e);
            }
        }
    }

    /// Export one diploma addressed to the session's wallet: the holder
    /// identifier is read from the wallet instead of being supplied by the
    /// caller. A wallet failure leaves the flow unchanged.
    #[instrument(level = "debug", skip(self, api, session))]
    pub async fn export_to_wallet<P: HolderProvider>(
        &mut self, api: &ApiClient<P>, session: &SessionGate, diploma_id: &str, as_jwt: bool,
    ) {
        match api.provider().holder_did().await {
            Ok(did) => self.export_one(api, session, diploma_id, &did, as_jwt).await,
            Err(e) => {
                tracing::error!(target: "Listing::export_to_wallet", ?e);
            }
        }
    }

    /// Store the current verifiable credential in the holder's wallet.
    ///
    /// # Errors
    /// Will return an error if no diploma has been exported, the exported
    /// text is not a JSON credential, or the wallet refuses the store.
    pub async fn save_current_to_wallet(&self, wallet: &impl Wallet) -> anyhow::Result<()> {
        let Some(form) = &self.current else {
            bail!("no diploma has been exported");
        };
        let credential: serde_json::Value = serde_json::from_str(&form.text)?;
        wallet.store(&credential).await
    }
}
