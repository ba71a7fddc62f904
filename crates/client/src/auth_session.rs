//! Dashboard sign-in state with persisted sessions.
//!
//! The identity provider does the actual authentication; [`AuthStore`] keeps
//! the resulting session in storage and publishes the current user plus a
//! loading flag for the UI.

use std::sync::{Arc, Mutex, PoisonError};

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use tokio::sync::watch;

use crate::storage::{self, KeyValueStorage};
use crate::{log_error, log_info, log_warn};

pub const SESSION_KEY: &str = "socialpulse_session";

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AuthUser {
    pub uid: String,
    pub email: Option<String>,
    pub display_name: Option<String>,
    #[serde(rename = "photoURL")]
    pub photo_url: Option<String>,
}

/// Stored session data
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AuthSession {
    pub user: AuthUser,
    pub id_token: String,
    pub refresh_token: String,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AuthState {
    pub user: Option<AuthUser>,
    /// True until the persisted session has been checked.
    pub loading: bool,
}

impl Default for AuthState {
    fn default() -> Self {
        Self {
            user: None,
            loading: true,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum AuthError {
    #[error("{0}")]
    InvalidCredentials(String),
    #[error("{0}")]
    Provider(String),
    #[error("Network error: {0}")]
    Network(String),
    #[error("Sign-in is not configured")]
    NotConfigured,
}

#[cfg_attr(target_arch = "wasm32", async_trait(?Send))]
#[cfg_attr(not(target_arch = "wasm32"), async_trait)]
pub trait IdentityProvider: Send + Sync {
    async fn sign_in_with_email(&self, email: &str, password: &str) -> Result<AuthSession, AuthError>;
    async fn register_with_email(&self, email: &str, password: &str) -> Result<AuthSession, AuthError>;
    /// Revoke `session` with the provider, if it supports that.
    async fn sign_out(&self, session: &AuthSession) -> Result<(), AuthError>;
}

/// Provider used when no identity backend is configured.
#[derive(Debug, Clone, Copy, Default)]
pub struct UnconfiguredIdentity;

#[cfg_attr(target_arch = "wasm32", async_trait(?Send))]
#[cfg_attr(not(target_arch = "wasm32"), async_trait)]
impl IdentityProvider for UnconfiguredIdentity {
    async fn sign_in_with_email(&self, _email: &str, _password: &str) -> Result<AuthSession, AuthError> {
        Err(AuthError::NotConfigured)
    }

    async fn register_with_email(&self, _email: &str, _password: &str) -> Result<AuthSession, AuthError> {
        Err(AuthError::NotConfigured)
    }

    async fn sign_out(&self, _session: &AuthSession) -> Result<(), AuthError> {
        Ok(())
    }
}

pub struct AuthStore {
    storage: Arc<dyn KeyValueStorage>,
    provider: Arc<dyn IdentityProvider>,
    session: Mutex<Option<AuthSession>>,
    state: watch::Sender<AuthState>,
}

impl AuthStore {
    pub fn new(storage: Arc<dyn KeyValueStorage>, provider: Arc<dyn IdentityProvider>) -> Self {
        let (state, _) = watch::channel(AuthState::default());
        Self {
            storage,
            provider,
            session: Mutex::new(None),
            state,
        }
    }

    pub fn subscribe(&self) -> watch::Receiver<AuthState> {
        self.state.subscribe()
    }

    pub fn state(&self) -> AuthState {
        self.state.borrow().clone()
    }

    pub fn current_user(&self) -> Option<AuthUser> {
        self.state.borrow().user.clone()
    }

    pub fn is_loading(&self) -> bool {
        self.state.borrow().loading
    }

    /// ID token of the signed-in user.
    pub fn id_token(&self) -> Option<String> {
        self.lock_session().as_ref().map(|s| s.id_token.clone())
    }

    fn lock_session(&self) -> std::sync::MutexGuard<'_, Option<AuthSession>> {
        self.session.lock().unwrap_or_else(PoisonError::into_inner)
    }

    fn install(&self, session: Option<AuthSession>) {
        let user = session.as_ref().map(|s| s.user.clone());
        *self.lock_session() = session;
        self.state.send_replace(AuthState {
            user,
            loading: false,
        });
    }

    /// Load the persisted session, if any, and clear the loading flag.
    pub fn restore(&self) -> Option<AuthUser> {
        let session = match storage::load::<AuthSession>(&*self.storage, SESSION_KEY) {
            Ok(session) => session,
            Err(err) => {
                log_warn!("Discarding unreadable session: {}", err);
                None
            }
        };
        self.install(session);
        self.current_user()
    }

    pub async fn sign_in_with_email(&self, email: &str, password: &str) -> Result<AuthUser, AuthError> {
        let result = self.provider.sign_in_with_email(email, password).await;
        self.finish_sign_in(result)
    }

    pub async fn register_with_email(&self, email: &str, password: &str) -> Result<AuthUser, AuthError> {
        let result = self.provider.register_with_email(email, password).await;
        self.finish_sign_in(result)
    }

    fn finish_sign_in(&self, result: Result<AuthSession, AuthError>) -> Result<AuthUser, AuthError> {
        match result {
            Ok(session) => {
                if let Err(err) = storage::save(&*self.storage, SESSION_KEY, &session) {
                    log_error!("Failed to persist session: {}", err);
                }
                let user = session.user.clone();
                log_info!("Signed in as {}", user.email.as_deref().unwrap_or(&user.uid));
                self.install(Some(session));
                Ok(user)
            }
            Err(err) => {
                log_error!("Sign-in failed: {}", err);
                self.state.send_modify(|s| s.loading = false);
                Err(err)
            }
        }
    }

    /// End the session locally even if the provider call fails.
    pub async fn sign_out(&self) -> Result<(), AuthError> {
        let session = self.lock_session().clone();
        let result = match &session {
            Some(session) => self.provider.sign_out(session).await,
            None => Ok(()),
        };

        if let Err(err) = self.storage.remove(SESSION_KEY) {
            log_error!("Failed to clear session: {}", err);
        }
        self.install(None);
        result
    }
}

#[cfg(test)]
pub(crate) mod tests {
    use super::*;
    use crate::storage::MemoryStorage;

    /// Accepts one email/password pair.
    pub(crate) struct StaticIdentity;

    pub(crate) fn session_for(email: &str) -> AuthSession {
        AuthSession {
            user: AuthUser {
                uid: "demo123".into(),
                email: Some(email.into()),
                display_name: Some("Sarah Johnson".into()),
                photo_url: None,
            },
            id_token: "id-token".into(),
            refresh_token: "refresh-token".into(),
        }
    }

    #[async_trait]
    impl IdentityProvider for StaticIdentity {
        async fn sign_in_with_email(&self, email: &str, password: &str) -> Result<AuthSession, AuthError> {
            if email == "sarah@example.com" && password == "hunter2" {
                Ok(session_for(email))
            } else {
                Err(AuthError::InvalidCredentials("Invalid email or password".into()))
            }
        }

        async fn register_with_email(&self, email: &str, _password: &str) -> Result<AuthSession, AuthError> {
            Ok(session_for(email))
        }

        async fn sign_out(&self, _session: &AuthSession) -> Result<(), AuthError> {
            Ok(())
        }
    }

    fn store() -> (AuthStore, Arc<MemoryStorage>) {
        let storage = Arc::new(MemoryStorage::new());
        (AuthStore::new(storage.clone(), Arc::new(StaticIdentity)), storage)
    }

    #[test]
    fn starts_loading_until_restored() {
        let (auth, _) = store();
        assert!(auth.is_loading());
        assert_eq!(auth.restore(), None);
        assert!(!auth.is_loading());
    }

    #[tokio::test]
    async fn sign_in_persists_and_restores() {
        let (auth, storage) = store();
        let user = auth
            .sign_in_with_email("sarah@example.com", "hunter2")
            .await
            .unwrap();
        assert_eq!(user.uid, "demo123");
        assert_eq!(auth.id_token().as_deref(), Some("id-token"));

        let fresh = AuthStore::new(storage, Arc::new(StaticIdentity));
        assert_eq!(fresh.restore(), Some(user));
    }

    #[tokio::test]
    async fn failed_sign_in_clears_loading_and_keeps_user_empty() {
        let (auth, _) = store();
        let err = auth
            .sign_in_with_email("sarah@example.com", "wrong")
            .await
            .unwrap_err();
        assert_eq!(err.to_string(), "Invalid email or password");
        assert_eq!(
            auth.state(),
            AuthState {
                user: None,
                loading: false
            }
        );
    }

    #[tokio::test]
    async fn sign_out_clears_everything() {
        let (auth, storage) = store();
        auth.register_with_email("new@example.com", "pw").await.unwrap();
        let mut rx = auth.subscribe();

        auth.sign_out().await.unwrap();
        assert!(rx.has_changed().unwrap());
        assert_eq!(rx.borrow_and_update().user, None);
        assert_eq!(auth.id_token(), None);
        assert_eq!(storage.get(SESSION_KEY).unwrap(), None);
    }

    #[tokio::test]
    async fn unconfigured_provider_refuses_sign_in() {
        let auth = AuthStore::new(Arc::new(MemoryStorage::new()), Arc::new(UnconfiguredIdentity));
        assert_eq!(
            auth.sign_in_with_email("a@b.c", "pw").await,
            Err(AuthError::NotConfigured)
        );
    }
}
