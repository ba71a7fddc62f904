//! Generic OAuth-style connect flow against the mock platforms.

use std::sync::{Arc, Mutex, PoisonError};
use std::time::Duration;

use rand::{rngs::StdRng, Rng, SeedableRng};
use socialpulse_shared::{ConnectedVia, ConnectionRecord, IssuedTokens, Platform};

use crate::config::LatencyProfile;
use crate::connection_store::{ConnectionStore, OperationToken};
use crate::error::SocialError;
use crate::login::TOKEN_TTL_MS;
use crate::timing::{now_millis, sleep};

pub struct OAuthConnector {
    store: Arc<ConnectionStore>,
    rng: Mutex<StdRng>,
    latency: LatencyProfile,
}

impl OAuthConnector {
    pub fn new(store: Arc<ConnectionStore>, latency: LatencyProfile) -> Self {
        Self {
            store,
            rng: Mutex::new(StdRng::from_entropy()),
            latency,
        }
    }

    pub fn with_rng(mut self, rng: StdRng) -> Self {
        self.rng = Mutex::new(rng);
        self
    }

    fn delay(&self) -> Duration {
        let jitter_ms = self.latency.oauth_jitter.as_millis() as u64;
        let extra = if jitter_ms == 0 {
            0
        } else {
            self.rng
                .lock()
                .unwrap_or_else(PoisonError::into_inner)
                .gen_range(0..jitter_ms)
        };
        self.latency.oauth_base + Duration::from_millis(extra)
    }

    /// Authorize the account for `token`'s platform and commit the record.
    pub async fn connect(&self, token: OperationToken) -> Result<ConnectionRecord, SocialError> {
        let platform = token.platform();
        sleep(self.delay()).await;

        let now = now_millis();
        let record = ConnectionRecord::connected(
            platform,
            format!("user_{platform}"),
            format!("https://{platform}.com/user_profile"),
            IssuedTokens {
                access_token: format!("mock_{platform}_token_{now}"),
                refresh_token: format!("mock_{platform}_refresh_{now}"),
                expires_at: now + TOKEN_TTL_MS,
            },
            ConnectedVia::Oauth,
        );
        self.store.commit(&token, record.clone())?;
        Ok(record)
    }
}
