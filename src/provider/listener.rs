//! # Session listener
//!
//! The session listener trait allows a client to receive updates as the
//! session gate reconciles externally-pushed authentication events. The
//! signals carry no payload beyond what a presentation layer needs to decide
//! what to show; everything else is read back from the gate.

use crate::session::Person;

/// Receives session progress signals from the gate.
#[allow(clippy::module_name_repetitions)]
pub trait SessionListener: Send + Sync {
    /// The visible login state changed. Fired whenever the
    /// (logged in, loading) pair differs from the last one signalled, as the
    /// cue to refresh presentation.
    fn state_changed(&self, logged_in: bool, loading: bool);

    /// The session became usable: the profile is present and the permission
    /// check holds. Fired at most once per contiguous logged-in session.
    fn usable(&self, person: &Person);
}
