//! SocialPulse Client - dashboard state layer
//!
//! Connects mock social accounts, derives their metrics, tracks the signed-in
//! user and talks to the dashboard REST API. Runs in the browser (wasm32) and
//! on native hosts; the `ui` feature adds Dioxus hooks over the same state.

pub mod logging;

pub mod api_client;
pub mod auth_session;
pub mod config;
pub mod connection_store;
pub mod connections;
pub mod device;
pub mod error;
pub mod identity;
pub mod login;
pub mod metrics;
pub mod oauth;
pub mod session;
pub mod storage;
pub mod theme;
pub mod timing;

#[cfg(feature = "ui")]
pub mod hooks;

pub use api_client::ApiClient;
pub use auth_session::{AuthError, AuthSession, AuthState, AuthStore, AuthUser, IdentityProvider};
pub use config::{ClientConfig, LatencyProfile};
pub use connection_store::{ConnectionStore, OperationToken};
pub use connections::{BusyCounts, ConnectionsState, PlatformPhase, SocialConnections};
pub use device::{AppDetector, DeviceAppDetector, DeviceContext, StaticAppDetector};
pub use error::SocialError;
pub use identity::FirebaseIdentity;
pub use login::{Credentials, LoginService};
pub use metrics::{generate_metrics, MetricsService, MetricsSource};
pub use session::DashboardSession;
pub use storage::{KeyValueStorage, MemoryStorage, StorageError};
pub use theme::{Theme, ThemePreference};
