//! Client configuration.
//!
//! Native hosts read `SOCIALPULSE_*` environment variables at runtime. The
//! browser build has no process environment, so values are baked in at
//! compile time and the API defaults to the page's own origin.

use std::time::Duration;

use crate::device::DeviceContext;

pub const API_URL_ENV: &str = "SOCIALPULSE_API_URL";
pub const FIREBASE_API_KEY_ENV: &str = "SOCIALPULSE_FIREBASE_API_KEY";
pub const DEVICE_ENV: &str = "SOCIALPULSE_DEVICE";

#[cfg(not(target_arch = "wasm32"))]
const DEFAULT_API_URL: &str = "http://localhost:8080";

/// Simulated delays of the mock social platforms.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct LatencyProfile {
    pub app_login: Duration,
    pub manual_login: Duration,
    pub metrics: Duration,
    pub oauth_base: Duration,
    /// Upper bound (exclusive) of the random extra OAuth delay.
    pub oauth_jitter: Duration,
    pub disconnect: Duration,
}

impl Default for LatencyProfile {
    fn default() -> Self {
        Self {
            app_login: Duration::from_millis(800),
            manual_login: Duration::from_millis(1500),
            metrics: Duration::from_millis(1000),
            oauth_base: Duration::from_millis(800),
            oauth_jitter: Duration::from_millis(1200),
            disconnect: Duration::from_millis(500),
        }
    }
}

impl LatencyProfile {
    /// No delays at all.
    pub fn instant() -> Self {
        Self {
            app_login: Duration::ZERO,
            manual_login: Duration::ZERO,
            metrics: Duration::ZERO,
            oauth_base: Duration::ZERO,
            oauth_jitter: Duration::ZERO,
            disconnect: Duration::ZERO,
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct ClientConfig {
    /// Base URL of the dashboard REST API, without a trailing slash. Empty
    /// means same-origin relative requests.
    pub api_base_url: String,
    /// Firebase Web API key; `None` disables email sign-in.
    pub firebase_api_key: Option<String>,
    pub device: DeviceContext,
    pub latency: LatencyProfile,
}

impl Default for ClientConfig {
    fn default() -> Self {
        Self {
            api_base_url: default_api_url(),
            firebase_api_key: None,
            device: DeviceContext::Desktop,
            latency: LatencyProfile::default(),
        }
    }
}

impl ClientConfig {
    #[cfg(not(target_arch = "wasm32"))]
    pub fn from_env() -> Self {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    #[cfg(target_arch = "wasm32")]
    pub fn from_env() -> Self {
        Self::from_lookup(|key| {
            match key {
                API_URL_ENV => option_env!("SOCIALPULSE_API_URL"),
                FIREBASE_API_KEY_ENV => option_env!("SOCIALPULSE_FIREBASE_API_KEY"),
                DEVICE_ENV => option_env!("SOCIALPULSE_DEVICE"),
                _ => None,
            }
            .map(str::to_string)
        })
    }

    fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Self {
        let api_base_url = lookup(API_URL_ENV)
            .map(|url| url.trim_end_matches('/').to_string())
            .unwrap_or_else(default_api_url);
        let firebase_api_key = lookup(FIREBASE_API_KEY_ENV).filter(|key| !key.trim().is_empty());
        let device = match lookup(DEVICE_ENV).as_deref() {
            Some("mobile") => DeviceContext::Mobile,
            Some("desktop") => DeviceContext::Desktop,
            _ => DeviceContext::detect(),
        };

        Self {
            api_base_url,
            firebase_api_key,
            device,
            latency: LatencyProfile::default(),
        }
    }
}

#[cfg(not(target_arch = "wasm32"))]
fn default_api_url() -> String {
    DEFAULT_API_URL.to_string()
}

#[cfg(target_arch = "wasm32")]
fn default_api_url() -> String {
    String::new()
}
