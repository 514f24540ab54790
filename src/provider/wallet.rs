//! # Wallet
//!
//! Trait for the browser- or device-mediated credential wallet. Each
//! operation is an independent request/response exchange outside the
//! credential backend; the library never assumes a wallet is present.

use std::future::Future;

use serde_json::Value;

use crate::provider::Result;

/// `Wallet` is implemented by clients that can reach a credential wallet on
/// the holder's behalf.
pub trait Wallet: Send + Sync {
    /// The decentralized identifier naming the holder in this wallet.
    fn holder_did(&self) -> impl Future<Output = Result<String>> + Send;

    /// Store a verifiable presentation in the wallet.
    fn store(&self, presentation: &Value) -> impl Future<Output = Result<()>> + Send;

    /// Retrieve all presentations the wallet shares with this application.
    fn retrieve(&self) -> impl Future<Output = Result<Vec<Value>>> + Send;
}
