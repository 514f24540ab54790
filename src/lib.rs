//! # Educational Credentials Holder
//!
//! A holder-side library for viewing, exporting and verifying "verifiable
//! credential" diplomas against a credential backend and an optional
//! credential wallet.
//!
//! The crate does not provide a user interface - that is the job of the
//! embedding client. It owns the logic a client should not have to get
//! right twice:
//!
//! ** Session gate **
//!
//! [`session::SessionGate`] reconciles authentication events pushed by an
//! external identity provider into stable predicates (`is_logged_in`,
//! `is_loading`, `has_permission`), fetches the person's profile exactly
//! once per login, and signals the client through
//! [`provider::SessionListener`] when the visible state changes or the
//! session first becomes usable.
//!
//! ** Credential API **
//!
//! [`api::ApiClient`] executes the list/fetch/export/verify operations
//! against the backend with uniform, fail-soft error handling.
//!
//! ** Flows **
//!
//! [`listing::Listing`] and [`verification::Verification`] hold the
//! per-view state the client renders from. Each view owns its own flow
//! state; nothing is shared across views.
//!
//! ** Provider **
//!
//! Implementors need to implement the `provider` traits that are
//! responsible for transport, wallet access and status callbacks. A
//! `reqwest`-backed transport and a self-contained example provider are
//! included.

pub mod api;
pub mod credential;
pub mod listing;
pub mod provider;
pub mod session;
pub mod verification;

pub use api::{ApiClient, ApiError, ApiResult};
pub use credential::{Diploma, VerifiableForm, VerificationStatus};
pub use listing::Listing;
pub use session::{AuthEvent, LoginStatus, Person, SessionGate};
pub use verification::Verification;
