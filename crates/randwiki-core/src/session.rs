//! Session and merge manager
//!
//! A [`Session`] owns the single authentication flag that decides where every
//! collection lives:
//!
//! - **Anonymous**: `get` reads device-local storage, `save` writes it.
//! - **Authenticated**: `get` returns the in-memory cache, `save` updates the
//!   cache and pushes the whole collection to the backend in the background.
//!
//! Background pushes are tracked in a [`JoinSet`]; call [`Session::flush`]
//! before dropping the session, since dropping it aborts pushes still in
//! flight.

use tokio::task::JoinSet;
use tracing::{debug, info, warn};

use crate::collections::{
    Caches, Collection, CurrentlyReading, LinkLists, Presets, ReadLog, UserLinks,
};
use crate::config::Config;
use crate::remote::{ApiClient, AuthError, AuthService, RemoteSync};
use crate::storage::LocalStorage;

/// Message shown when registration succeeded but the follow-up login did not
const LOGIN_AFTER_REGISTER: &str = "Account created. Please log in.";

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AuthState {
    Anonymous,
    Authenticated { username: String },
}

/// Result of a successful registration
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RegisterOutcome {
    /// The account was created and the session is now authenticated
    LoggedIn(String),
    /// The account was created but logging in failed; carries the message
    /// to show next to the login prompt
    LoginRequired(String),
}

/// Session context passed to every collection operation
#[derive(Debug)]
pub struct Session<R = ApiClient> {
    local: LocalStorage,
    remote: Option<R>,
    auth: AuthState,
    caches: Caches,
    pending: JoinSet<()>,
}

impl Session<ApiClient> {
    /// Anonymous session over the configured storage and backend
    pub fn open(config: &Config) -> Self {
        Self::new(LocalStorage::open(config), ApiClient::from_config(config))
    }

    /// Anonymous session without a backend
    pub fn local_only(local: LocalStorage) -> Self {
        Self::new(local, None)
    }
}

impl<R> Session<R> {
    pub fn new(local: LocalStorage, remote: Option<R>) -> Self {
        Self {
            local,
            remote,
            auth: AuthState::Anonymous,
            caches: Caches::default(),
            pending: JoinSet::new(),
        }
    }

    pub fn auth_state(&self) -> &AuthState {
        &self.auth
    }

    pub fn username(&self) -> Option<&str> {
        match &self.auth {
            AuthState::Authenticated { username } => Some(username),
            AuthState::Anonymous => None,
        }
    }

    pub fn is_authenticated(&self) -> bool {
        matches!(self.auth, AuthState::Authenticated { .. })
    }

    pub fn has_backend(&self) -> bool {
        self.remote.is_some()
    }

    pub fn local(&self) -> &LocalStorage {
        &self.local
    }

    /// Number of background pushes not yet awaited
    pub fn pending_pushes(&self) -> usize {
        self.pending.len()
    }

    /// Wait for every background push to finish
    pub async fn flush(&mut self) {
        while let Some(result) = self.pending.join_next().await {
            if let Err(e) = result {
                warn!(error = %e, "Background push did not complete");
            }
        }
    }
}

impl<R: RemoteSync> Session<R> {
    /// Current value of a collection
    ///
    /// Never fails: missing or unreadable local data reads as empty.
    pub fn get<C: Collection>(&self) -> Vec<C::Item> {
        match C::cache(&self.caches) {
            Some(items) => items.clone(),
            None => self.local.load_list(C::STORAGE_KEY),
        }
    }

    /// Replace a collection
    ///
    /// A following [`get`](Self::get) returns `items` in both modes. While
    /// authenticated the push runs in the background on the current Tokio
    /// runtime; failures are logged and dropped.
    pub fn save<C: Collection>(&mut self, items: Vec<C::Item>) {
        if self.is_authenticated() {
            if let Some(remote) = self.remote.clone() {
                let payload = items.clone();
                self.pending.spawn(async move {
                    if let Err(e) = remote.push::<C>(payload).await {
                        warn!(collection = C::NAME, error = %e, "Failed to sync collection");
                    }
                });
            }
            *C::cache_mut(&mut self.caches) = Some(items);
            return;
        }

        match self.local.save_list(C::STORAGE_KEY, &items) {
            Ok(()) => *C::cache_mut(&mut self.caches) = None,
            Err(e) => {
                warn!(collection = C::NAME, error = %e, "Failed to save collection");
                // Keep the unsaved value visible for the rest of the session
                *C::cache_mut(&mut self.caches) = Some(items);
            }
        }
    }

    /// Adopt the remote copy of one collection
    ///
    /// With `migrate`, a successful empty pull while the local copy has data
    /// adopts the local copy instead and pushes it up.
    async fn hydrate<C: Collection>(&mut self, remote: &R, migrate: bool) {
        let items = match remote.pull::<C>().await {
            Ok(items) => items,
            Err(e) => {
                warn!(collection = C::NAME, error = %e, "Failed to load collection");
                *C::cache_mut(&mut self.caches) = Some(Vec::new());
                return;
            }
        };

        if migrate && items.is_empty() {
            let local: Vec<C::Item> = self.local.load_list(C::STORAGE_KEY);
            if !local.is_empty() {
                info!(
                    collection = C::NAME,
                    count = local.len(),
                    "Migrating local collection to account"
                );
                self.save::<C>(local);
                return;
            }
        }

        debug!(collection = C::NAME, count = items.len(), "Adopted remote collection");
        *C::cache_mut(&mut self.caches) = Some(items);
    }

    async fn hydrate_all(&mut self, remote: &R, migrate: bool) {
        self.hydrate::<ReadLog>(remote, migrate).await;
        self.hydrate::<UserLinks>(remote, migrate).await;
        self.hydrate::<LinkLists>(remote, migrate).await;
        self.hydrate::<Presets>(remote, migrate).await;
        self.hydrate::<CurrentlyReading>(remote, migrate).await;
    }

    async fn enter(&mut self, remote: &R, username: String, migrate: bool) {
        info!(user = %username, "Authenticated");
        self.auth = AuthState::Authenticated { username };
        self.hydrate_all(remote, migrate).await;
    }
}

impl<R: RemoteSync + AuthService> Session<R> {
    /// Ask the backend who the session belongs to
    ///
    /// A recognized user switches the session to authenticated and hydrates
    /// every collection, migrating local-only collections. Any failure leaves
    /// the session anonymous and untouched.
    pub async fn probe(&mut self) -> &AuthState {
        let Some(remote) = self.remote.clone() else {
            return &self.auth;
        };

        match remote.whoami().await {
            Ok(Some(username)) => self.enter(&remote, username, true).await,
            Ok(None) => debug!("Backend reports no session"),
            Err(e) => debug!(error = %e, "Session probe failed, staying anonymous"),
        }
        &self.auth
    }

    /// Log in and adopt the account's collections as they are
    pub async fn login(&mut self, username: &str, password: &str) -> Result<String, AuthError> {
        let remote = self.remote.clone().ok_or(AuthError::NoBackend)?;
        let username = remote.login(username, password).await?;
        self.enter(&remote, username.clone(), false).await;
        Ok(username)
    }

    /// Create an account, then log into it
    ///
    /// Errors only when the account could not be created.
    pub async fn register(
        &mut self,
        username: &str,
        password: &str,
    ) -> Result<RegisterOutcome, AuthError> {
        let remote = self.remote.clone().ok_or(AuthError::NoBackend)?;
        remote.register(username, password).await?;
        info!(user = %username, "Account created");

        match remote.login(username, password).await {
            Ok(username) => {
                self.enter(&remote, username.clone(), false).await;
                Ok(RegisterOutcome::LoggedIn(username))
            }
            Err(e) => {
                debug!(error = %e, "Login after registration failed");
                Ok(RegisterOutcome::LoginRequired(LOGIN_AFTER_REGISTER.to_string()))
            }
        }
    }

    /// Return to anonymous mode
    ///
    /// The backend is notified on a best-effort basis. Local storage is left
    /// as it was before login.
    pub async fn logout(&mut self) {
        if let Some(remote) = self.remote.clone() {
            if let Err(e) = remote.logout().await {
                debug!(error = %e, "Logout request failed");
            }
        }
        if let Some(user) = self.username() {
            info!(user = %user, "Logged out");
        }
        self.auth = AuthState::Anonymous;
        self.caches.clear();
    }
}

#[cfg(test)]
pub(crate) mod tests {
    use super::*;
    use crate::models::{LogEntry, UserLink};
    use crate::remote::SyncError;
    use std::collections::HashMap;
    use std::sync::{Arc, Mutex};
    use tempfile::TempDir;

    /// In-memory backend keyed by endpoint
    #[derive(Debug, Clone, Default)]
    pub(crate) struct FakeBackend {
        pub user: Option<String>,
        pub store: Arc<Mutex<HashMap<&'static str, serde_json::Value>>>,
        pub pushes: Arc<Mutex<Vec<&'static str>>>,
        pub failing_pulls: Vec<&'static str>,
    }

    impl FakeBackend {
        pub fn logged_in(user: &str) -> Self {
            Self {
                user: Some(user.to_string()),
                ..Self::default()
            }
        }

        pub fn seed<C: Collection>(&self, items: &[C::Item]) {
            self.store
                .lock()
                .unwrap()
                .insert(C::ENDPOINT, serde_json::to_value(items).unwrap());
        }

        pub fn stored<C: Collection>(&self) -> Vec<C::Item> {
            self.store
                .lock()
                .unwrap()
                .get(C::ENDPOINT)
                .cloned()
                .map(|v| serde_json::from_value(v).unwrap())
                .unwrap_or_default()
        }

        pub fn push_count(&self) -> usize {
            self.pushes.lock().unwrap().len()
        }
    }

    impl RemoteSync for FakeBackend {
        async fn pull<C: Collection>(&self) -> Result<Vec<C::Item>, SyncError> {
            if self.failing_pulls.contains(&C::ENDPOINT) {
                return Err(SyncError::HttpStatus(500));
            }
            let stored = self.store.lock().unwrap().get(C::ENDPOINT).cloned();
            match stored {
                Some(value) => Ok(serde_json::from_value(value)?),
                None => Ok(Vec::new()),
            }
        }

        async fn push<C: Collection>(&self, items: Vec<C::Item>) -> Result<(), SyncError> {
            let value = serde_json::to_value(items)?;
            self.store.lock().unwrap().insert(C::ENDPOINT, value);
            self.pushes.lock().unwrap().push(C::ENDPOINT);
            Ok(())
        }
    }

    impl AuthService for FakeBackend {
        async fn whoami(&self) -> Result<Option<String>, AuthError> {
            Ok(self.user.clone())
        }

        async fn login(&self, username: &str, password: &str) -> Result<String, AuthError> {
            if password == "pw" {
                Ok(username.to_string())
            } else {
                Err(AuthError::Rejected("Invalid username or password".to_string()))
            }
        }

        async fn register(&self, _username: &str, password: &str) -> Result<(), AuthError> {
            if password.is_empty() {
                Err(AuthError::Rejected("Password required".to_string()))
            } else {
                Ok(())
            }
        }

        async fn logout(&self) -> Result<(), AuthError> {
            Ok(())
        }
    }

    pub(crate) fn local(temp_dir: &TempDir) -> LocalStorage {
        LocalStorage::new(temp_dir.path().join("local_storage"), 1024 * 1024)
    }

    fn entries(n: usize) -> Vec<LogEntry> {
        (0..n)
            .map(|i| LogEntry::new(format!("https://example.org/{}", i), i.to_string(), "Links"))
            .collect()
    }

    #[test]
    fn test_anonymous_save_then_get() {
        let temp_dir = TempDir::new().unwrap();
        let mut session = Session::local_only(local(&temp_dir));

        let links = vec![UserLink::new("https://example.org/a", "a")];
        session.save::<UserLinks>(links.clone());
        assert_eq!(session.get::<UserLinks>(), links);

        // Persisted, not cached
        let reopened = Session::local_only(local(&temp_dir));
        assert_eq!(reopened.get::<UserLinks>(), links);
    }

    #[test]
    fn test_anonymous_failed_write_keeps_value_for_session() {
        let temp_dir = TempDir::new().unwrap();
        let tiny = LocalStorage::new(temp_dir.path(), 4);
        let mut session = Session::local_only(tiny.clone());

        let links = vec![UserLink::new("https://example.org/a", "a")];
        session.save::<UserLinks>(links.clone());
        assert_eq!(session.get::<UserLinks>(), links);

        // Nothing reached disk
        assert!(Session::local_only(tiny).get::<UserLinks>().is_empty());
    }

    #[tokio::test]
    async fn test_probe_migrates_local_when_remote_empty() {
        let temp_dir = TempDir::new().unwrap();
        let storage = local(&temp_dir);
        storage.save_list(ReadLog::STORAGE_KEY, &entries(3)).unwrap();

        let backend = FakeBackend::logged_in("ada");
        let mut session = Session::new(storage, Some(backend.clone()));
        session.probe().await;
        assert_eq!(session.username(), Some("ada"));
        assert_eq!(session.get::<ReadLog>().len(), 3);

        session.flush().await;
        assert_eq!(backend.stored::<ReadLog>().len(), 3);
        assert_eq!(backend.push_count(), 1);
    }

    #[tokio::test]
    async fn test_probe_prefers_non_empty_remote() {
        let temp_dir = TempDir::new().unwrap();
        let storage = local(&temp_dir);
        storage.save_list(ReadLog::STORAGE_KEY, &entries(3)).unwrap();

        let backend = FakeBackend::logged_in("ada");
        backend.seed::<ReadLog>(&entries(1));
        let mut session = Session::new(storage, Some(backend.clone()));
        session.probe().await;
        session.flush().await;

        assert_eq!(session.get::<ReadLog>().len(), 1);
        assert_eq!(backend.push_count(), 0);
    }

    #[tokio::test]
    async fn test_probe_failed_pull_adopts_empty_without_migrating() {
        let temp_dir = TempDir::new().unwrap();
        let storage = local(&temp_dir);
        storage.save_list(ReadLog::STORAGE_KEY, &entries(2)).unwrap();

        let backend = FakeBackend {
            failing_pulls: vec![ReadLog::ENDPOINT],
            ..FakeBackend::logged_in("ada")
        };
        let mut session = Session::new(storage, Some(backend.clone()));
        session.probe().await;
        session.flush().await;

        assert!(session.is_authenticated());
        assert!(session.get::<ReadLog>().is_empty());
        assert_eq!(backend.push_count(), 0);
    }

    #[tokio::test]
    async fn test_probe_anonymous_leaves_state() {
        let temp_dir = TempDir::new().unwrap();
        let backend = FakeBackend::default();
        let mut session = Session::new(local(&temp_dir), Some(backend));

        assert_eq!(session.probe().await, &AuthState::Anonymous);
        assert!(session.get::<ReadLog>().is_empty());
    }

    #[tokio::test]
    async fn test_login_does_not_migrate() {
        let temp_dir = TempDir::new().unwrap();
        let storage = local(&temp_dir);
        storage.save_list(ReadLog::STORAGE_KEY, &entries(3)).unwrap();

        let backend = FakeBackend::default();
        let mut session = Session::new(storage, Some(backend.clone()));
        assert_eq!(session.login("ada", "pw").await.unwrap(), "ada");
        session.flush().await;

        assert!(session.get::<ReadLog>().is_empty());
        assert_eq!(backend.push_count(), 0);
    }

    #[tokio::test]
    async fn test_login_rejected_stays_anonymous() {
        let temp_dir = TempDir::new().unwrap();
        let mut session = Session::new(local(&temp_dir), Some(FakeBackend::default()));

        let err = session.login("ada", "nope").await.unwrap_err();
        assert_eq!(err.to_string(), "Invalid username or password");
        assert!(!session.is_authenticated());
    }

    #[tokio::test]
    async fn test_login_without_backend() {
        let temp_dir = TempDir::new().unwrap();
        let mut session = Session::local_only(local(&temp_dir));
        assert!(matches!(
            session.login("ada", "pw").await,
            Err(AuthError::NoBackend)
        ));
    }

    #[tokio::test]
    async fn test_register_chains_into_login() {
        let temp_dir = TempDir::new().unwrap();
        let mut session = Session::new(local(&temp_dir), Some(FakeBackend::default()));

        let outcome = session.register("ada", "pw").await.unwrap();
        assert_eq!(outcome, RegisterOutcome::LoggedIn("ada".to_string()));
        assert!(session.is_authenticated());
    }

    #[tokio::test]
    async fn test_register_then_failed_login_asks_to_log_in() {
        let temp_dir = TempDir::new().unwrap();
        let mut session = Session::new(local(&temp_dir), Some(FakeBackend::default()));

        let outcome = session.register("ada", "other").await.unwrap();
        assert_eq!(
            outcome,
            RegisterOutcome::LoginRequired("Account created. Please log in.".to_string())
        );
        assert!(!session.is_authenticated());
    }

    #[tokio::test]
    async fn test_authenticated_save_is_write_behind() {
        let temp_dir = TempDir::new().unwrap();
        let backend = FakeBackend::logged_in("ada");
        let mut session = Session::new(local(&temp_dir), Some(backend.clone()));
        session.probe().await;

        let links = vec![UserLink::new("https://example.org/a", "a")];
        session.save::<UserLinks>(links.clone());
        assert_eq!(session.get::<UserLinks>(), links);

        session.flush().await;
        assert_eq!(session.pending_pushes(), 0);
        assert_eq!(backend.stored::<UserLinks>(), links);
        // Local storage is not written while authenticated
        assert!(session.local().load_list::<UserLink>(UserLinks::STORAGE_KEY).is_empty());
    }

    #[tokio::test]
    async fn test_logout_restores_local_view() {
        let temp_dir = TempDir::new().unwrap();
        let storage = local(&temp_dir);
        let before = vec![UserLink::new("https://example.org/local", "local")];
        storage.save_list(UserLinks::STORAGE_KEY, &before).unwrap();

        let backend = FakeBackend::logged_in("ada");
        backend.seed::<UserLinks>(&[UserLink::new("https://example.org/remote", "remote")]);
        let mut session = Session::new(storage, Some(backend));
        session.probe().await;
        assert_eq!(session.get::<UserLinks>()[0].title, "remote");

        session.logout().await;
        assert_eq!(session.auth_state(), &AuthState::Anonymous);
        assert_eq!(session.get::<UserLinks>(), before);
    }
}
