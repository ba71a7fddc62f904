//! Connection aggregator for the dashboard.
//!
//! [`SocialConnections`] combines the connection store with the login, OAuth
//! and metrics services, and publishes a [`ConnectionsState`] snapshot on a
//! `watch` channel after every change. UI layers subscribe to it and render
//! busy indicators from the per-platform busy counters.

use std::collections::BTreeMap;
use std::sync::Arc;

use socialpulse_shared::{ConnectionMap, ConnectionRecord, MetricsRecord, Platform};
use tokio::sync::watch;

use crate::config::LatencyProfile;
use crate::connection_store::ConnectionStore;
use crate::device::AppDetector;
use crate::error::SocialError;
use crate::login::{Credentials, LoginService};
use crate::metrics::MetricsSource;
use crate::oauth::OAuthConnector;
use crate::timing::sleep;
use crate::{log_error, log_info, log_warn};

/// What the UI should show for one platform.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PlatformPhase {
    Disconnected,
    Connecting,
    Connected,
    Disconnecting,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Busy {
    Connecting,
    Disconnecting,
    LoggingIn,
    FetchingMetrics,
}

/// In-flight operations of one kind, counted per platform.
///
/// A newer operation may supersede an older one on the same platform while
/// both are still running, so a platform stays busy until the last of them
/// finishes.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct BusyCounts(BTreeMap<Platform, usize>);

impl BusyCounts {
    pub fn contains(&self, platform: Platform) -> bool {
        self.0.contains_key(&platform)
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    fn enter(&mut self, platform: Platform) {
        *self.0.entry(platform).or_default() += 1;
    }

    fn leave(&mut self, platform: Platform) {
        if let Some(count) = self.0.get_mut(&platform) {
            *count -= 1;
            if *count == 0 {
                self.0.remove(&platform);
            }
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct ConnectionsState {
    pub platforms: ConnectionMap,
    /// Present only for connected platforms whose metrics have loaded.
    pub metrics: BTreeMap<Platform, MetricsRecord>,
    pub connecting: BusyCounts,
    pub disconnecting: BusyCounts,
    pub logging_in: BusyCounts,
    pub fetching_metrics: BusyCounts,
}

impl ConnectionsState {
    fn busy_counts(&mut self, busy: Busy) -> &mut BusyCounts {
        match busy {
            Busy::Connecting => &mut self.connecting,
            Busy::Disconnecting => &mut self.disconnecting,
            Busy::LoggingIn => &mut self.logging_in,
            Busy::FetchingMetrics => &mut self.fetching_metrics,
        }
    }

    pub fn is_connecting(&self) -> bool {
        !self.connecting.is_empty()
    }

    pub fn is_disconnecting(&self) -> bool {
        !self.disconnecting.is_empty()
    }

    pub fn is_logging_in(&self) -> bool {
        !self.logging_in.is_empty()
    }

    pub fn is_fetching_metrics(&self) -> bool {
        !self.fetching_metrics.is_empty()
    }

    pub fn connected_count(&self) -> usize {
        self.platforms.connected_count()
    }

    pub fn metrics(&self, platform: Platform) -> Option<&MetricsRecord> {
        self.metrics.get(&platform)
    }

    pub fn phase(&self, platform: Platform) -> PlatformPhase {
        if self.disconnecting.contains(platform) {
            PlatformPhase::Disconnecting
        } else if self.connecting.contains(platform) || self.logging_in.contains(platform) {
            PlatformPhase::Connecting
        } else if self.platforms.is_connected(platform) {
            PlatformPhase::Connected
        } else {
            PlatformPhase::Disconnected
        }
    }
}

struct Inner {
    store: Arc<ConnectionStore>,
    login: LoginService,
    oauth: OAuthConnector,
    metrics: Arc<dyn MetricsSource>,
    latency: LatencyProfile,
    state: watch::Sender<ConnectionsState>,
}

/// Releases a busy flag when dropped, so early returns cannot leave it set.
struct BusyGuard<'a> {
    state: &'a watch::Sender<ConnectionsState>,
    busy: Busy,
    platform: Platform,
}

impl<'a> BusyGuard<'a> {
    fn set(state: &'a watch::Sender<ConnectionsState>, busy: Busy, platform: Platform) -> Self {
        state.send_modify(|s| {
            s.busy_counts(busy).enter(platform);
        });
        Self {
            state,
            busy,
            platform,
        }
    }
}

impl Drop for BusyGuard<'_> {
    fn drop(&mut self) {
        self.state.send_modify(|s| {
            s.busy_counts(self.busy).leave(self.platform);
        });
    }
}

/// Cheaply cloneable handle; clones share state.
#[derive(Clone)]
pub struct SocialConnections {
    inner: Arc<Inner>,
}

impl SocialConnections {
    pub fn new(
        store: Arc<ConnectionStore>,
        detector: Arc<dyn AppDetector>,
        metrics: Arc<dyn MetricsSource>,
        latency: LatencyProfile,
    ) -> Self {
        let login = LoginService::new(store.clone(), detector, latency);
        let oauth = OAuthConnector::new(store.clone(), latency);
        Self::from_parts(store, login, oauth, metrics, latency)
    }

    /// Assemble from pre-configured services (seeded RNGs in tests).
    pub fn from_parts(
        store: Arc<ConnectionStore>,
        login: LoginService,
        oauth: OAuthConnector,
        metrics: Arc<dyn MetricsSource>,
        latency: LatencyProfile,
    ) -> Self {
        let initial = ConnectionsState {
            platforms: store.read(),
            ..Default::default()
        };
        let (state, _) = watch::channel(initial);
        Self {
            inner: Arc::new(Inner {
                store,
                login,
                oauth,
                metrics,
                latency,
                state,
            }),
        }
    }

    pub fn subscribe(&self) -> watch::Receiver<ConnectionsState> {
        self.inner.state.subscribe()
    }

    pub fn snapshot(&self) -> ConnectionsState {
        self.inner.state.borrow().clone()
    }

    pub fn store(&self) -> &Arc<ConnectionStore> {
        &self.inner.store
    }

    fn busy(&self, busy: Busy, platform: Platform) -> BusyGuard<'_> {
        BusyGuard::set(&self.inner.state, busy, platform)
    }

    fn publish_record(&self, record: ConnectionRecord) {
        self.inner.state.send_modify(|s| s.platforms.set(record));
    }

    /// Connect through the generic OAuth-style flow.
    pub async fn connect(&self, platform: Platform) -> Result<ConnectionRecord, SocialError> {
        let _busy = self.busy(Busy::Connecting, platform);
        let token = self.inner.store.begin(platform);

        match self.inner.oauth.connect(token).await {
            Ok(record) => {
                let published = record.clone();
                self.inner
                    .store
                    .if_current(&token, || self.publish_record(published));
                log_info!("Your {} account has been connected.", platform.display_name());
                Ok(record)
            }
            Err(err) => {
                log_error!("Failed to connect to {}: {}", platform.display_name(), err);
                Err(err)
            }
        }
    }

    /// Disconnect `platform`. Supersedes any connect or login still in flight.
    pub async fn disconnect(&self, platform: Platform) -> Result<(), SocialError> {
        let _busy = self.busy(Busy::Disconnecting, platform);
        let token = self.inner.store.begin(platform);

        sleep(self.inner.latency.disconnect).await;

        if let Err(err) = self
            .inner
            .store
            .commit(&token, ConnectionRecord::disconnected(platform))
        {
            log_error!("Failed to disconnect from {}: {}", platform.display_name(), err);
            return Err(err);
        }
        self.inner.store.if_current(&token, || {
            self.inner.state.send_modify(|s| {
                s.platforms.reset(platform);
                s.metrics.remove(&platform);
            })
        });
        log_info!("Your {} account has been disconnected.", platform.display_name());
        Ok(())
    }

    /// Log in through the app or the credential form, then load metrics.
    ///
    /// Credentials are only used when both fields are non-empty. Failing to
    /// load metrics does not fail the login.
    pub async fn login_with_credentials(
        &self,
        platform: Platform,
        username: Option<&str>,
        password: Option<&str>,
    ) -> Result<ConnectionRecord, SocialError> {
        let _busy = self.busy(Busy::LoggingIn, platform);
        let credentials = match (username, password) {
            (Some(username), Some(password)) if !username.is_empty() && !password.is_empty() => {
                Some(Credentials::new(username, password))
            }
            _ => None,
        };

        let token = self.inner.store.begin(platform);
        let record = self.inner.login.login_with_token(token, credentials).await?;
        let published = record.clone();
        self.inner
            .store
            .if_current(&token, || self.publish_record(published));
        log_info!("Your {} account has been connected.", platform.display_name());

        let username = record.username.clone().unwrap_or_default();
        match self.inner.metrics.fetch(platform, &username).await {
            Ok(metrics) => {
                let merged = self.inner.store.if_current(&token, || {
                    self.inner.state.send_modify(|s| {
                        s.metrics.insert(platform, metrics);
                    })
                });
                if merged.is_none() {
                    log_warn!("Dropping stale {} metrics after a newer operation", platform);
                }
            }
            Err(err) => log_error!("Error fetching initial metrics for {}: {}", platform, err),
        }

        Ok(record)
    }

    /// Reload metrics for a connected platform.
    pub async fn fetch_metrics(&self, platform: Platform) -> Result<MetricsRecord, SocialError> {
        let username = {
            let state = self.inner.state.borrow();
            let record = state.platforms.get(platform);
            match &record.username {
                Some(username) if record.connected && !username.is_empty() => username.clone(),
                _ => return Err(SocialError::NotConnected(platform)),
            }
        };

        let _busy = self.busy(Busy::FetchingMetrics, platform);
        let token = self.inner.store.current(platform);
        let metrics = self
            .inner
            .metrics
            .fetch(platform, &username)
            .await
            .inspect_err(|err| log_error!("Error fetching {} metrics: {}", platform, err))?;

        let published = metrics.clone();
        self.inner
            .store
            .if_current(&token, || {
                self.inner.state.send_modify(|s| {
                    s.metrics.insert(platform, published);
                })
            })
            .ok_or(SocialError::Superseded(platform))?;
        Ok(metrics)
    }

    /// Reload records from storage, dropping metrics of platforms that are no
    /// longer connected.
    pub fn refresh(&self) {
        let platforms = self.inner.store.read();
        self.inner.state.send_modify(|s| {
            s.metrics.retain(|platform, _| platforms.is_connected(*platform));
            s.platforms = platforms;
        });
    }

    /// Sign-out teardown: reset every record and drop all metrics.
    pub fn teardown(&self) {
        self.inner.store.reset_all();
        self.inner.state.send_modify(|s| {
            s.platforms = ConnectionMap::default();
            s.metrics.clear();
        });
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::time::Duration;

    use async_trait::async_trait;
    use rand::{rngs::StdRng, SeedableRng};
    use socialpulse_shared::ConnectedVia;

    use crate::device::StaticAppDetector;
    use crate::metrics::{generate_metrics, MetricsService};
    use crate::storage::MemoryStorage;

    fn connections_with(
        app_installed: bool,
        metrics: Arc<dyn MetricsSource>,
        latency: LatencyProfile,
    ) -> SocialConnections {
        let store = Arc::new(ConnectionStore::open(Arc::new(MemoryStorage::new())));
        let login = LoginService::new(store.clone(), Arc::new(StaticAppDetector(app_installed)), latency)
            .with_rng(StdRng::seed_from_u64(11));
        let oauth = OAuthConnector::new(store.clone(), latency).with_rng(StdRng::seed_from_u64(12));
        SocialConnections::from_parts(store, login, oauth, metrics, latency)
    }

    fn connections(app_installed: bool) -> SocialConnections {
        connections_with(
            app_installed,
            Arc::new(MetricsService::new(Duration::ZERO)),
            LatencyProfile::instant(),
        )
    }

    struct FailingMetrics;

    #[async_trait]
    impl MetricsSource for FailingMetrics {
        async fn fetch(&self, _platform: Platform, _username: &str) -> Result<MetricsRecord, SocialError> {
            Err(SocialError::Validation("metrics backend offline".into()))
        }
    }

    #[tokio::test]
    async fn manual_login_connects_and_loads_metrics() {
        let social = connections(false);
        let record = social
            .login_with_credentials(Platform::Twitter, Some("bob"), Some("secret"))
            .await
            .unwrap();
        assert_eq!(record.connected_via, Some(ConnectedVia::Manual));

        let state = social.snapshot();
        assert_eq!(state.phase(Platform::Twitter), PlatformPhase::Connected);
        assert_eq!(state.connected_count(), 1);
        assert_eq!(state.metrics(Platform::Twitter).unwrap().followers, 24560);
        assert!(!state.is_logging_in());
        assert!(social.store().is_connected(Platform::Twitter));
    }

    #[tokio::test]
    async fn blank_password_means_no_credentials() {
        let social = connections(false);
        let err = social
            .login_with_credentials(Platform::Facebook, Some("amy"), Some(""))
            .await
            .unwrap_err();
        assert!(matches!(err, SocialError::Validation(_)));

        let state = social.snapshot();
        assert_eq!(state.phase(Platform::Facebook), PlatformPhase::Disconnected);
        assert!(!state.is_logging_in());
    }

    #[tokio::test]
    async fn failed_login_leaves_state_untouched() {
        let social = connections(false);
        let before = social.snapshot();
        let err = social
            .login_with_credentials(Platform::Instagram, Some("amy"), Some("error"))
            .await
            .unwrap_err();
        assert!(matches!(err, SocialError::Authentication(_)));
        assert_eq!(social.snapshot(), before);
    }

    #[tokio::test]
    async fn metrics_failure_does_not_fail_login() {
        let social = connections_with(true, Arc::new(FailingMetrics), LatencyProfile::instant());
        let record = social
            .login_with_credentials(Platform::Youtube, None, None)
            .await
            .unwrap();
        assert!(record.is_connected());

        let state = social.snapshot();
        assert!(state.platforms.is_connected(Platform::Youtube));
        assert!(state.metrics(Platform::Youtube).is_none());
    }

    #[tokio::test]
    async fn disconnect_clears_record_and_metrics() {
        let social = connections(true);
        social
            .login_with_credentials(Platform::Instagram, Some("amy"), Some("pw"))
            .await
            .unwrap();
        assert!(social.snapshot().metrics(Platform::Instagram).is_some());

        social.disconnect(Platform::Instagram).await.unwrap();
        let state = social.snapshot();
        assert!(!state.platforms.is_connected(Platform::Instagram));
        assert!(state.metrics(Platform::Instagram).is_none());
        assert!(!state.is_disconnecting());
        assert!(!social.store().is_connected(Platform::Instagram));
    }

    #[tokio::test]
    async fn fetch_metrics_requires_a_connection() {
        let social = connections(true);
        let err = social.fetch_metrics(Platform::Facebook).await.unwrap_err();
        assert!(matches!(err, SocialError::NotConnected(Platform::Facebook)));
        assert_eq!(
            err.to_string(),
            "Platform facebook is not connected or missing username"
        );
        let state = social.snapshot();
        assert!(state.metrics.is_empty());
        assert!(!state.is_fetching_metrics());
    }

    #[tokio::test]
    async fn fetch_metrics_refreshes_connected_platform() {
        let social = connections_with(true, Arc::new(FailingMetrics), LatencyProfile::instant());
        social.connect(Platform::Youtube).await.unwrap();
        assert!(social.fetch_metrics(Platform::Youtube).await.is_err());

        let social = connections(true);
        social.connect(Platform::Youtube).await.unwrap();
        let metrics = social.fetch_metrics(Platform::Youtube).await.unwrap();
        assert_eq!(metrics, generate_metrics(Platform::Youtube, "user_youtube"));
        assert_eq!(social.snapshot().metrics(Platform::Youtube), Some(&metrics));
    }

    #[tokio::test]
    async fn connect_records_oauth_path() {
        let social = connections(true);
        let record = social.connect(Platform::Facebook).await.unwrap();
        assert_eq!(record.connected_via, Some(ConnectedVia::Oauth));
        let state = social.snapshot();
        assert_eq!(state.phase(Platform::Facebook), PlatformPhase::Connected);
        assert!(!state.is_connecting());
    }

    #[tokio::test]
    async fn disconnect_during_login_supersedes_it() {
        let latency = LatencyProfile {
            manual_login: Duration::from_millis(200),
            ..LatencyProfile::instant()
        };
        let social = connections_with(false, Arc::new(MetricsService::new(Duration::ZERO)), latency);

        let watcher = social.clone();
        let (login, disconnect) = tokio::join!(
            social.login_with_credentials(Platform::Twitter, Some("bob"), Some("secret")),
            async move {
                tokio::time::sleep(Duration::from_millis(20)).await;
                assert_eq!(
                    watcher.snapshot().phase(Platform::Twitter),
                    PlatformPhase::Connecting
                );
                watcher.disconnect(Platform::Twitter).await
            }
        );

        assert!(matches!(login, Err(SocialError::Superseded(Platform::Twitter))));
        disconnect.unwrap();
        let state = social.snapshot();
        assert!(!state.platforms.is_connected(Platform::Twitter));
        assert!(state.metrics(Platform::Twitter).is_none());
        assert!(!state.is_logging_in());
        assert!(!social.store().is_connected(Platform::Twitter));
    }

    #[tokio::test]
    async fn overlapping_connects_stay_busy_until_the_last_finishes() {
        let latency = LatencyProfile {
            oauth_base: Duration::from_millis(200),
            ..LatencyProfile::instant()
        };
        let social = connections_with(true, Arc::new(MetricsService::new(Duration::ZERO)), latency);

        let second = social.clone();
        let watcher = social.clone();
        let (first, second, during) = tokio::join!(
            social.connect(Platform::Twitter),
            async move {
                tokio::time::sleep(Duration::from_millis(100)).await;
                second.connect(Platform::Twitter).await
            },
            async move {
                // The first connect has been superseded and returned; the
                // second is still waiting on its OAuth delay.
                tokio::time::sleep(Duration::from_millis(250)).await;
                watcher.snapshot()
            }
        );

        assert!(matches!(first, Err(SocialError::Superseded(Platform::Twitter))));
        assert!(second.is_ok());
        assert!(during.connecting.contains(Platform::Twitter));
        assert_eq!(during.phase(Platform::Twitter), PlatformPhase::Connecting);

        let state = social.snapshot();
        assert!(!state.is_connecting());
        assert_eq!(state.phase(Platform::Twitter), PlatformPhase::Connected);
    }

    #[test]
    fn busy_counts_release_per_operation() {
        let mut counts = BusyCounts::default();
        counts.enter(Platform::Youtube);
        counts.enter(Platform::Youtube);
        counts.leave(Platform::Youtube);
        assert!(counts.contains(Platform::Youtube));
        counts.leave(Platform::Youtube);
        assert!(counts.is_empty());
        counts.leave(Platform::Youtube);
        assert!(counts.is_empty());
    }

    #[tokio::test]
    async fn subscribers_see_updates() {
        let social = connections(true);
        let mut rx = social.subscribe();
        social.connect(Platform::Instagram).await.unwrap();
        assert!(rx.has_changed().unwrap());
        assert!(rx.borrow_and_update().platforms.is_connected(Platform::Instagram));
    }

    #[tokio::test]
    async fn refresh_and_teardown() {
        let social = connections(true);
        social
            .login_with_credentials(Platform::Twitter, None, None)
            .await
            .unwrap();

        social.store().reset(Platform::Twitter);
        social.refresh();
        let state = social.snapshot();
        assert!(!state.platforms.is_connected(Platform::Twitter));
        assert!(state.metrics(Platform::Twitter).is_none());

        social.connect(Platform::Facebook).await.unwrap();
        social.teardown();
        assert_eq!(social.snapshot().connected_count(), 0);
        assert_eq!(social.store().read().connected_count(), 0);
    }
}
