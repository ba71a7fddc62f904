//! Device context and native-app detection for the mock login flow.

use std::sync::{Mutex, PoisonError};

use rand::{rngs::StdRng, Rng, SeedableRng};
use socialpulse_shared::Platform;

use crate::log_debug;

/// Chance that a platform's app counts as installed on a mobile device.
pub const APP_INSTALL_PROBABILITY: f64 = 0.7;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DeviceContext {
    Mobile,
    Desktop,
}

impl DeviceContext {
    pub fn from_user_agent(user_agent: &str) -> Self {
        if user_agent.contains("Mobile") {
            DeviceContext::Mobile
        } else {
            DeviceContext::Desktop
        }
    }

    /// Read `navigator.userAgent` in the browser; native hosts are desktops.
    pub fn detect() -> Self {
        #[cfg(target_arch = "wasm32")]
        {
            web_sys::window()
                .and_then(|window| window.navigator().user_agent().ok())
                .map(|ua| Self::from_user_agent(&ua))
                .unwrap_or(DeviceContext::Desktop)
        }
        #[cfg(not(target_arch = "wasm32"))]
        {
            DeviceContext::Desktop
        }
    }
}

/// Decides whether a login goes through the platform's native app.
pub trait AppDetector: Send + Sync {
    fn is_app_installed(&self, platform: Platform) -> bool;
}

/// Desktops always use the app path; mobiles roll [`APP_INSTALL_PROBABILITY`].
pub struct DeviceAppDetector {
    device: DeviceContext,
    rng: Mutex<StdRng>,
}

impl DeviceAppDetector {
    pub fn new(device: DeviceContext) -> Self {
        Self::with_rng(device, StdRng::from_entropy())
    }

    pub fn with_rng(device: DeviceContext, rng: StdRng) -> Self {
        Self {
            device,
            rng: Mutex::new(rng),
        }
    }
}

impl AppDetector for DeviceAppDetector {
    fn is_app_installed(&self, platform: Platform) -> bool {
        match self.device {
            DeviceContext::Desktop => {
                log_debug!("[Device Check] Desktop detected, assuming {} is accessible", platform);
                true
            }
            DeviceContext::Mobile => {
                let installed = self
                    .rng
                    .lock()
                    .unwrap_or_else(PoisonError::into_inner)
                    .gen_bool(APP_INSTALL_PROBABILITY);
                log_debug!("[Device Check] {} app installed: {}", platform, installed);
                installed
            }
        }
    }
}

/// Always answers the same way.
#[derive(Debug, Clone, Copy)]
pub struct StaticAppDetector(pub bool);

impl AppDetector for StaticAppDetector {
    fn is_app_installed(&self, _platform: Platform) -> bool {
        self.0
    }
}
