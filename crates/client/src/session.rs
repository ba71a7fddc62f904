//! Per-user dashboard session.
//!
//! Owns everything that lives between sign-in and sign-out: the auth store,
//! the API client and the social connections aggregator. The aggregator is
//! created lazily for a signed-in user and torn down on sign-out, which also
//! resets every stored connection record.

use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

use crate::api_client::ApiClient;
use crate::auth_session::{AuthError, AuthStore, IdentityProvider, UnconfiguredIdentity};
use crate::config::ClientConfig;
use crate::connection_store::ConnectionStore;
use crate::connections::SocialConnections;
use crate::device::{AppDetector, DeviceAppDetector};
use crate::identity::FirebaseIdentity;
use crate::metrics::{MetricsService, MetricsSource};
use crate::storage::KeyValueStorage;
use crate::theme::ThemePreference;
use crate::log_info;

pub struct DashboardSession {
    config: ClientConfig,
    storage: Arc<dyn KeyValueStorage>,
    auth: AuthStore,
    api: ApiClient,
    detector: Arc<dyn AppDetector>,
    metrics: Arc<dyn MetricsSource>,
    connections: Mutex<Option<SocialConnections>>,
}

impl DashboardSession {
    pub fn new(
        config: ClientConfig,
        storage: Arc<dyn KeyValueStorage>,
        provider: Arc<dyn IdentityProvider>,
    ) -> Self {
        Self {
            auth: AuthStore::new(storage.clone(), provider),
            api: ApiClient::from_config(&config),
            detector: Arc::new(DeviceAppDetector::new(config.device)),
            metrics: Arc::new(MetricsService::new(config.latency.metrics)),
            connections: Mutex::new(None),
            config,
            storage,
        }
    }

    /// Session backed by Firebase when an API key is configured.
    pub fn from_config(config: ClientConfig, storage: Arc<dyn KeyValueStorage>) -> Self {
        let provider: Arc<dyn IdentityProvider> = match &config.firebase_api_key {
            Some(key) => Arc::new(FirebaseIdentity::new(key.clone())),
            None => Arc::new(UnconfiguredIdentity),
        };
        let session = Self::new(config, storage, provider);
        session.auth.restore();
        session
    }

    pub fn with_app_detector(mut self, detector: Arc<dyn AppDetector>) -> Self {
        self.detector = detector;
        self
    }

    pub fn with_metrics_source(mut self, metrics: Arc<dyn MetricsSource>) -> Self {
        self.metrics = metrics;
        self
    }

    pub fn config(&self) -> &ClientConfig {
        &self.config
    }

    pub fn auth(&self) -> &AuthStore {
        &self.auth
    }

    pub fn api(&self) -> &ApiClient {
        &self.api
    }

    /// Device-local theme choice; it survives sign-out.
    pub fn theme(&self) -> ThemePreference {
        ThemePreference::new(self.storage.clone())
    }

    fn slot(&self) -> MutexGuard<'_, Option<SocialConnections>> {
        self.connections.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// The connections aggregator for the signed-in user; `None` while
    /// signed out.
    pub fn connections(&self) -> Option<SocialConnections> {
        self.auth.current_user()?;
        let mut slot = self.slot();
        let connections = slot.get_or_insert_with(|| {
            SocialConnections::new(
                Arc::new(ConnectionStore::open(self.storage.clone())),
                self.detector.clone(),
                self.metrics.clone(),
                self.config.latency,
            )
        });
        Some(connections.clone())
    }

    /// Tear down the connections aggregator, then sign out.
    pub async fn sign_out(&self) -> Result<(), AuthError> {
        let connections = self.slot().take();
        match connections {
            Some(connections) => connections.teardown(),
            None => ConnectionStore::open(self.storage.clone()).reset_all(),
        }
        log_info!("Social connections reset for sign-out");
        self.auth.sign_out().await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::auth_session::tests::StaticIdentity;
    use crate::config::LatencyProfile;
    use crate::device::StaticAppDetector;
    use crate::storage::MemoryStorage;
    use crate::theme::Theme;
    use socialpulse_shared::Platform;

    fn session() -> DashboardSession {
        let config = ClientConfig {
            latency: LatencyProfile::instant(),
            ..ClientConfig::default()
        };
        DashboardSession::new(config, Arc::new(MemoryStorage::new()), Arc::new(StaticIdentity))
            .with_app_detector(Arc::new(StaticAppDetector(true)))
    }

    #[tokio::test]
    async fn connections_exist_only_while_signed_in() {
        let session = session();
        assert!(session.connections().is_none());

        session
            .auth()
            .sign_in_with_email("sarah@example.com", "hunter2")
            .await
            .unwrap();
        let connections = session.connections().unwrap();
        connections.connect(Platform::Twitter).await.unwrap();

        // The same aggregator is handed out for the whole session.
        let again = session.connections().unwrap();
        assert!(again.snapshot().platforms.is_connected(Platform::Twitter));
    }

    #[tokio::test]
    async fn sign_out_resets_connections() {
        let session = session();
        session
            .auth()
            .sign_in_with_email("sarah@example.com", "hunter2")
            .await
            .unwrap();
        let connections = session.connections().unwrap();
        connections
            .login_with_credentials(Platform::Instagram, None, None)
            .await
            .unwrap();

        session.theme().set(Theme::Dark).unwrap();
        session.sign_out().await.unwrap();
        assert_eq!(session.theme().stored(), Some(Theme::Dark));
        assert!(session.auth().current_user().is_none());
        assert!(session.connections().is_none());
        assert_eq!(connections.snapshot().connected_count(), 0);
        assert!(connections.snapshot().metrics.is_empty());
        assert_eq!(connections.store().read().connected_count(), 0);
    }

    #[test]
    fn unconfigured_session_restores_as_signed_out() {
        let session = DashboardSession::from_config(
            ClientConfig::default(),
            Arc::new(MemoryStorage::new()),
        );
        assert!(!session.auth().is_loading());
        assert!(session.connections().is_none());
    }
}
