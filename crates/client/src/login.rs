//! Mock social-platform login.
//!
//! When the platform's app is "installed" the login is authorized through it
//! and needs no password. Otherwise the dashboard's username/password form is
//! required, and the password `"error"` is rejected to exercise failure paths.

use std::sync::{Arc, Mutex, PoisonError};

use rand::{rngs::StdRng, Rng, SeedableRng};
use socialpulse_shared::{ConnectedVia, ConnectionRecord, IssuedTokens, Platform};

use crate::config::LatencyProfile;
use crate::connection_store::{ConnectionStore, OperationToken};
use crate::device::AppDetector;
use crate::error::SocialError;
use crate::timing::{now_millis, sleep};
use crate::{log_error, log_info};

/// Password that the manual path always rejects.
pub const FAILURE_SENTINEL_PASSWORD: &str = "error";
/// Lifetime stamped on issued tokens. Nothing enforces it.
pub const TOKEN_TTL_MS: i64 = 3_600_000;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Credentials {
    pub username: String,
    pub password: String,
}

impl Credentials {
    pub fn new(username: impl Into<String>, password: impl Into<String>) -> Self {
        Self {
            username: username.into(),
            password: password.into(),
        }
    }
}

/// Tokens named `<kind>-token-<platform>-<millis>` / `<kind>-refresh-...`.
pub(crate) fn issue_tokens(kind: &str, platform: Platform) -> IssuedTokens {
    let now = now_millis();
    IssuedTokens {
        access_token: format!("{kind}-token-{platform}-{now}"),
        refresh_token: format!("{kind}-refresh-{platform}-{now}"),
        expires_at: now + TOKEN_TTL_MS,
    }
}

pub struct LoginService {
    store: Arc<ConnectionStore>,
    detector: Arc<dyn AppDetector>,
    rng: Mutex<StdRng>,
    latency: LatencyProfile,
}

impl LoginService {
    pub fn new(
        store: Arc<ConnectionStore>,
        detector: Arc<dyn AppDetector>,
        latency: LatencyProfile,
    ) -> Self {
        Self {
            store,
            detector,
            rng: Mutex::new(StdRng::from_entropy()),
            latency,
        }
    }

    /// Seed the generator used for app-path usernames.
    pub fn with_rng(mut self, rng: StdRng) -> Self {
        self.rng = Mutex::new(rng);
        self
    }

    /// Log in to `platform` and persist the resulting record.
    pub async fn login(
        &self,
        platform: Platform,
        credentials: Option<Credentials>,
    ) -> Result<ConnectionRecord, SocialError> {
        let token = self.store.begin(platform);
        self.login_with_token(token, credentials).await
    }

    /// Like [`login`](Self::login) under a token the caller already holds.
    pub async fn login_with_token(
        &self,
        token: OperationToken,
        credentials: Option<Credentials>,
    ) -> Result<ConnectionRecord, SocialError> {
        let platform = token.platform();
        log_info!("Attempting to login to {}...", platform);

        let result = if self.detector.is_app_installed(platform) {
            Ok(self.app_login(platform, credentials).await)
        } else {
            self.manual_login(platform, credentials).await
        };

        let record = result
            .and_then(|record| self.store.commit(&token, record.clone()).map(|()| record))
            .inspect_err(|err| log_error!("Error logging into {}: {}", platform, err))?;
        Ok(record)
    }

    async fn app_login(&self, platform: Platform, credentials: Option<Credentials>) -> ConnectionRecord {
        log_info!("{} app detected! Attempting direct authentication...", platform);
        sleep(self.latency.app_login).await;

        let username = credentials
            .map(|c| c.username)
            .filter(|username| !username.is_empty())
            .unwrap_or_else(|| self.generated_username(platform));

        ConnectionRecord::connected(
            platform,
            username.clone(),
            platform.profile_url(&username),
            issue_tokens("app", platform),
            ConnectedVia::App,
        )
    }

    async fn manual_login(
        &self,
        platform: Platform,
        credentials: Option<Credentials>,
    ) -> Result<ConnectionRecord, SocialError> {
        log_info!("{} app not detected. Using manual authentication...", platform);

        let credentials = credentials.ok_or_else(|| {
            SocialError::Validation(format!(
                "No credentials provided and {platform} app not detected"
            ))
        })?;
        if credentials.username.is_empty() {
            return Err(SocialError::Validation(format!(
                "A {} username is required",
                platform.display_name()
            )));
        }

        sleep(self.latency.manual_login).await;

        if credentials.password == FAILURE_SENTINEL_PASSWORD {
            return Err(SocialError::Authentication(format!(
                "Authentication failed for {platform}"
            )));
        }

        Ok(ConnectionRecord::connected(
            platform,
            credentials.username.clone(),
            platform.profile_url(&credentials.username),
            issue_tokens("manual", platform),
            ConnectedVia::Manual,
        ))
    }

    fn generated_username(&self, platform: Platform) -> String {
        let suffix: u32 = self
            .rng
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .gen_range(0..10_000);
        format!("user_{platform}_{suffix}")
    }
}
