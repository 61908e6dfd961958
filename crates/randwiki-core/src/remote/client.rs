//! HTTP client for the account backend

use std::fs;
use std::path::PathBuf;
use std::sync::{Arc, RwLock};
use std::time::Duration;

use reqwest::header::{COOKIE, SET_COOKIE};
use reqwest::{Response, StatusCode};
use serde::Deserialize;
use serde_json::{json, Map, Value};
use tracing::{debug, info, warn};

use super::{AuthError, AuthService, RemoteSync, SyncError};
use crate::collections::Collection;
use crate::config::Config;
use crate::storage::local::write_private;

/// Connect timeout for backend requests
const CONNECT_TIMEOUT: u64 = 10;

#[derive(Debug, Deserialize)]
struct MeResponse {
    #[serde(default)]
    username: Option<String>,
}

#[derive(Debug, Default, Deserialize)]
struct AuthResponse {
    #[serde(default)]
    username: Option<String>,
    #[serde(default)]
    error: Option<String>,
}

/// Backend client holding the session cookie
///
/// Clones share the cookie, so a login through one clone authenticates
/// pushes issued through the others.
#[derive(Debug, Clone)]
pub struct ApiClient {
    http: reqwest::Client,
    base_url: String,
    cookie: Arc<RwLock<Option<String>>>,
    session_path: Option<PathBuf>,
}

impl ApiClient {
    /// Client for the backend at `base_url`, with an in-memory session only
    pub fn new(base_url: &str) -> Self {
        let http = reqwest::Client::builder()
            .connect_timeout(Duration::from_secs(CONNECT_TIMEOUT))
            .build()
            .unwrap_or_default();

        Self {
            http,
            base_url: base_url.trim_end_matches('/').to_string(),
            cookie: Arc::new(RwLock::new(None)),
            session_path: None,
        }
    }

    /// Persist the session cookie in `path`, restoring any saved one
    pub fn with_session_file(mut self, path: PathBuf) -> Self {
        match fs::read_to_string(&path) {
            Ok(saved) if !saved.trim().is_empty() => {
                self.set_cookie(Some(saved.trim().to_string()));
            }
            _ => {}
        }
        self.session_path = Some(path);
        self
    }

    /// Client for the configured backend, if any
    pub fn from_config(config: &Config) -> Option<Self> {
        let base_url = config.api_url.as_deref()?;
        Some(Self::new(base_url).with_session_file(config.session_path()))
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    /// Whether a session cookie is held
    pub fn has_session(&self) -> bool {
        self.current_cookie().is_some()
    }

    fn url(&self, path: &str) -> String {
        format!("{}{}", self.base_url, path)
    }

    fn current_cookie(&self) -> Option<String> {
        self.cookie.read().ok().and_then(|c| c.clone())
    }

    fn set_cookie(&self, value: Option<String>) {
        if let Ok(mut cookie) = self.cookie.write() {
            *cookie = value;
        }
    }

    fn get(&self, path: &str) -> reqwest::RequestBuilder {
        self.with_cookie(self.http.get(self.url(path)))
    }

    fn post(&self, path: &str) -> reqwest::RequestBuilder {
        self.with_cookie(self.http.post(self.url(path)))
    }

    fn with_cookie(&self, request: reqwest::RequestBuilder) -> reqwest::RequestBuilder {
        match self.current_cookie() {
            Some(cookie) => request.header(COOKIE, cookie),
            None => request,
        }
    }

    /// Keep the `name=value` part of the first `Set-Cookie` header
    fn store_session_cookie(&self, response: &Response) {
        let Some(cookie) = response
            .headers()
            .get(SET_COOKIE)
            .and_then(|v| v.to_str().ok())
            .and_then(|v| v.split(';').next())
            .map(|v| v.trim().to_string())
            .filter(|v| !v.is_empty())
        else {
            return;
        };

        if let Some(ref path) = self.session_path {
            if let Err(e) = write_private(path, cookie.as_bytes()) {
                warn!(path = ?path, error = %e, "Failed to persist session cookie");
            }
        }
        self.set_cookie(Some(cookie));
    }

    fn forget_session(&self) {
        self.set_cookie(None);
        if let Some(ref path) = self.session_path {
            if let Err(e) = fs::remove_file(path) {
                if e.kind() != std::io::ErrorKind::NotFound {
                    warn!(path = ?path, error = %e, "Failed to remove session cookie");
                }
            }
        }
    }

    /// Decode an auth response body, tolerating empty or non-JSON bodies
    async fn auth_body(response: Response) -> AuthResponse {
        response.json().await.unwrap_or_default()
    }
}

impl RemoteSync for ApiClient {
    async fn pull<C: Collection>(&self) -> Result<Vec<C::Item>, SyncError> {
        let response = self.get(C::ENDPOINT).send().await?;
        let status = response.status();
        if status == StatusCode::UNAUTHORIZED {
            return Err(SyncError::NotLoggedIn);
        }
        if !status.is_success() {
            return Err(SyncError::HttpStatus(status.as_u16()));
        }

        let mut body: Value = response.json().await?;
        let items = match body.get_mut(C::FIELD).map(Value::take) {
            None | Some(Value::Null) => Vec::new(),
            Some(value) => serde_json::from_value(value)?,
        };
        debug!(collection = C::NAME, count = items.len(), "Pulled collection");
        Ok(items)
    }

    async fn push<C: Collection>(&self, items: Vec<C::Item>) -> Result<(), SyncError> {
        let count = items.len();
        let mut body = Map::new();
        body.insert(C::FIELD.to_string(), serde_json::to_value(items)?);

        let response = self
            .post(C::ENDPOINT)
            .json(&Value::Object(body))
            .send()
            .await?;
        let status = response.status();
        if status == StatusCode::UNAUTHORIZED {
            return Err(SyncError::NotLoggedIn);
        }
        if !status.is_success() {
            return Err(SyncError::HttpStatus(status.as_u16()));
        }

        debug!(collection = C::NAME, count, "Pushed collection");
        Ok(())
    }
}

impl AuthService for ApiClient {
    async fn whoami(&self) -> Result<Option<String>, AuthError> {
        let response = self
            .get("/api/me")
            .send()
            .await
            .map_err(AuthError::Unreachable)?;

        if response.status() == StatusCode::NOT_FOUND {
            return Err(AuthError::NoBackend);
        }
        if !response.status().is_success() {
            return Ok(None);
        }

        let me: MeResponse = response
            .json()
            .await
            .map_err(|e| AuthError::Rejected(format!("Unrecognized /api/me response: {}", e)))?;
        Ok(me.username.filter(|u| !u.is_empty()))
    }

    async fn login(&self, username: &str, password: &str) -> Result<String, AuthError> {
        let response = self
            .post("/api/login")
            .json(&json!({ "username": username, "password": password }))
            .send()
            .await
            .map_err(AuthError::Unreachable)?;

        let status = response.status();
        if status == StatusCode::NOT_FOUND {
            return Err(AuthError::NoBackend);
        }
        if !status.is_success() {
            let body = Self::auth_body(response).await;
            return Err(AuthError::Rejected(
                body.error.unwrap_or_else(|| "Login failed".to_string()),
            ));
        }

        self.store_session_cookie(&response);
        let body = Self::auth_body(response).await;
        let username = body
            .username
            .filter(|u| !u.is_empty())
            .unwrap_or_else(|| username.to_string());
        info!(user = %username, "Logged in");
        Ok(username)
    }

    async fn register(&self, username: &str, password: &str) -> Result<(), AuthError> {
        let response = self
            .post("/api/register")
            .json(&json!({ "username": username, "password": password }))
            .send()
            .await
            .map_err(AuthError::Unreachable)?;

        let status = response.status();
        if status == StatusCode::NOT_FOUND {
            return Err(AuthError::NoBackend);
        }
        if !status.is_success() {
            let body = Self::auth_body(response).await;
            return Err(AuthError::Rejected(
                body.error
                    .unwrap_or_else(|| "Registration failed".to_string()),
            ));
        }
        Ok(())
    }

    async fn logout(&self) -> Result<(), AuthError> {
        let result = self.post("/api/logout").send().await;
        self.forget_session();
        match result {
            Ok(_) => Ok(()),
            Err(e) => Err(AuthError::Unreachable(e)),
        }
    }
}
