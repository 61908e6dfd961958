//! Account backend
//!
//! Two capabilities are consumed from the backend:
//!
//! - [`RemoteSync`]: whole-collection `pull` and `push` for each collection
//! - [`AuthService`]: who-am-I probe, login, registration and logout
//!
//! [`ApiClient`] implements both over HTTP with JSON bodies. The session
//! layer only depends on the traits, so retries or versioning can be added
//! behind them without touching collection logic.
//!
//! ## Wire format
//!
//! `GET <endpoint>` returns `{<field>: [...]}`; `POST <endpoint>` takes the
//! same shape. Auth calls take `{username, password}`. Requests carry the
//! session cookie set by the login endpoint.

mod client;

use std::future::Future;

use thiserror::Error;

use crate::collections::Collection;

pub use client::ApiClient;

/// Errors from collection pull/push
#[derive(Error, Debug)]
pub enum SyncError {
    /// Network-level error (DNS, connection, TLS, etc.)
    #[error("Request failed: {0}")]
    Network(#[from] reqwest::Error),
    /// The backend does not recognize the session
    #[error("Not logged in")]
    NotLoggedIn,
    /// Non-2xx response
    #[error("HTTP error: status {0}")]
    HttpStatus(u16),
    /// Response body did not match the collection shape
    #[error("Malformed response: {0}")]
    Decode(#[from] serde_json::Error),
}

/// Errors from the auth endpoints
#[derive(Error, Debug)]
pub enum AuthError {
    /// The backend refused the request, with its message
    #[error("{0}")]
    Rejected(String),
    /// No backend is configured, or it does not serve the auth endpoints
    #[error("Login requires the backend. Set one with `randwiki config set api_url <url>`.")]
    NoBackend,
    /// The backend could not be reached
    #[error("Could not connect to the account backend: {0}")]
    Unreachable(#[source] reqwest::Error),
}

/// Whole-collection synchronization with the backend
pub trait RemoteSync: Clone + Send + Sync + 'static {
    /// Fetch the remote copy of a collection
    fn pull<C: Collection>(&self) -> impl Future<Output = Result<Vec<C::Item>, SyncError>> + Send;

    /// Replace the remote copy of a collection
    fn push<C: Collection>(
        &self,
        items: Vec<C::Item>,
    ) -> impl Future<Output = Result<(), SyncError>> + Send;
}

/// Authentication against the backend
pub trait AuthService: Send + Sync {
    /// Username of the current session, `None` when not logged in
    fn whoami(&self) -> impl Future<Output = Result<Option<String>, AuthError>> + Send;

    /// Log in and return the username the backend reports
    fn login(
        &self,
        username: &str,
        password: &str,
    ) -> impl Future<Output = Result<String, AuthError>> + Send;

    /// Create an account (does not log in)
    fn register(
        &self,
        username: &str,
        password: &str,
    ) -> impl Future<Output = Result<(), AuthError>> + Send;

    /// End the session
    fn logout(&self) -> impl Future<Output = Result<(), AuthError>> + Send;
}
