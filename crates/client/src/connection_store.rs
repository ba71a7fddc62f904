//! Persisted per-platform connection records.
//!
//! All four records live as one JSON object under [`CONNECTIONS_KEY`].
//! Writers that race each other (a disconnect issued while a login is still
//! waiting on the mock platform) are ordered by per-platform generations: an
//! operation takes an [`OperationToken`] before it starts, and its commit is
//! rejected once a newer token exists for the same platform.

use std::collections::BTreeMap;
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

use socialpulse_shared::{ConnectionMap, ConnectionRecord, Platform};

use crate::error::SocialError;
use crate::storage::{self, KeyValueStorage};
use crate::{log_error, log_info, log_warn};

pub const CONNECTIONS_KEY: &str = "socialAuthState";
/// Older builds also wrote logins here; folded into [`CONNECTIONS_KEY`] on open.
pub const LEGACY_CONNECTIONS_KEY: &str = "socialPlatforms";

/// Ticket for one asynchronous connect/login/disconnect.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct OperationToken {
    platform: Platform,
    generation: u64,
}

impl OperationToken {
    pub fn platform(&self) -> Platform {
        self.platform
    }
}

pub struct ConnectionStore {
    storage: Arc<dyn KeyValueStorage>,
    /// Latest generation per platform. The lock also serializes every
    /// read-modify-write of the stored map.
    generations: Mutex<BTreeMap<Platform, u64>>,
}

impl ConnectionStore {
    /// Open the store, migrating entries left under the legacy key.
    pub fn open(storage: Arc<dyn KeyValueStorage>) -> Self {
        let store = Self {
            storage,
            generations: Mutex::new(BTreeMap::new()),
        };
        store.migrate_legacy();
        store
    }

    fn lock(&self) -> MutexGuard<'_, BTreeMap<Platform, u64>> {
        self.generations.lock().unwrap_or_else(PoisonError::into_inner)
    }

    fn migrate_legacy(&self) {
        let legacy: ConnectionMap = match storage::load(&*self.storage, LEGACY_CONNECTIONS_KEY) {
            Ok(Some(map)) => map,
            Ok(None) => return,
            Err(err) => {
                log_warn!("Discarding unreadable {}: {}", LEGACY_CONNECTIONS_KEY, err);
                self.remove_legacy();
                return;
            }
        };

        let _guard = self.lock();
        let mut current = self.read();
        let mut migrated = 0;
        for record in legacy.iter() {
            if record.is_connected() && !current.is_connected(record.platform) {
                current.set(record.clone());
                migrated += 1;
            }
        }
        if migrated > 0 {
            log_info!("Migrated {} legacy social connection(s)", migrated);
            self.write(&current);
        }
        self.remove_legacy();
    }

    fn remove_legacy(&self) {
        if let Err(err) = self.storage.remove(LEGACY_CONNECTIONS_KEY) {
            log_warn!("Failed to remove {}: {}", LEGACY_CONNECTIONS_KEY, err);
        }
    }

    /// Current records; all-disconnected when nothing usable is stored.
    pub fn read(&self) -> ConnectionMap {
        match storage::load(&*self.storage, CONNECTIONS_KEY) {
            Ok(Some(map)) => map,
            Ok(None) => ConnectionMap::default(),
            Err(err) => {
                log_error!("Error reading social auth state: {}", err);
                ConnectionMap::default()
            }
        }
    }

    /// Persist `map`. Failures are logged, never returned.
    pub fn write(&self, map: &ConnectionMap) {
        if let Err(err) = storage::save(&*self.storage, CONNECTIONS_KEY, map) {
            log_error!("Error saving social auth state: {}", err);
        }
    }

    pub fn is_connected(&self, platform: Platform) -> bool {
        self.read().is_connected(platform)
    }

    /// Reset one platform to the disconnected default, bypassing tokens.
    pub fn reset(&self, platform: Platform) {
        let _guard = self.lock();
        let mut map = self.read();
        map.reset(platform);
        self.write(&map);
    }

    /// Reset every platform and invalidate all outstanding tokens.
    pub fn reset_all(&self) {
        let mut generations = self.lock();
        for platform in Platform::ALL {
            *generations.entry(platform).or_default() += 1;
        }
        self.write(&ConnectionMap::default());
    }

    /// Start an operation on `platform`, superseding any in flight.
    pub fn begin(&self, platform: Platform) -> OperationToken {
        let mut generations = self.lock();
        let generation = generations.entry(platform).or_default();
        *generation += 1;
        OperationToken {
            platform,
            generation: *generation,
        }
    }

    /// Token for the operation currently allowed to write `platform`,
    /// without superseding it.
    pub fn current(&self, platform: Platform) -> OperationToken {
        let generations = self.lock();
        OperationToken {
            platform,
            generation: generations.get(&platform).copied().unwrap_or_default(),
        }
    }

    pub fn is_current(&self, token: &OperationToken) -> bool {
        Self::still_current(&self.lock(), token)
    }

    fn still_current(generations: &BTreeMap<Platform, u64>, token: &OperationToken) -> bool {
        generations.get(&token.platform).copied().unwrap_or_default() == token.generation
    }

    /// Store `record` if `token` is still the latest for its platform.
    pub fn commit(&self, token: &OperationToken, record: ConnectionRecord) -> Result<(), SocialError> {
        debug_assert_eq!(token.platform, record.platform);
        let generations = self.lock();
        if !Self::still_current(&generations, token) {
            return Err(SocialError::Superseded(token.platform));
        }
        let mut map = self.read();
        map.set(record);
        self.write(&map);
        Ok(())
    }

    /// Run `f` only while `token` is current; the check and `f` are atomic
    /// with respect to other store operations.
    pub fn if_current<R>(&self, token: &OperationToken, f: impl FnOnce() -> R) -> Option<R> {
        let generations = self.lock();
        Self::still_current(&generations, token).then(f)
    }
}
