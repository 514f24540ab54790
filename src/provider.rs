//! # Provider
//!
//! The provider traits exported by this module are used to inject
//! functionality into the session gate and flows such as transport, wallet
//! access and status callbacks.
//!
//! See individual trait documentation for specific details.

mod client;
pub mod example;
mod http;
mod listener;
mod wallet;

use std::fmt::Debug;

pub use client::{HttpClient, HttpRequest, HttpResponse};
pub use http::HttpTransport;
pub use listener::SessionListener;
pub use wallet::Wallet;

/// Result is used for all provider errors.
pub type Result<T, E = anyhow::Error> = std::result::Result<T, E>;

/// The super trait a provider implementation supplies to drive the session
/// gate and the credential flows.
pub trait HolderProvider:
    HttpClient + SessionListener + Wallet + Clone + Debug + Send + Sync
{
}
