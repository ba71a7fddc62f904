//! Social account connection records and generated metrics snapshots.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use crate::platform::Platform;

/// Login path that produced a connection.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum ConnectedVia {
    /// Native app deep-link authorization.
    App,
    /// Username and password entered in the dashboard.
    Manual,
    /// Generic OAuth-style redirect flow.
    Oauth,
}

/// Per-platform connection state.
///
/// A record is either fully connected (`connected`, a non-empty access token
/// and a non-empty username) or fully cleared. The JSON layout matches the
/// browser `socialAuthState` entries.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct ConnectionRecord {
    pub platform: Platform,
    #[serde(default)]
    pub access_token: Option<String>,
    #[serde(default)]
    pub refresh_token: Option<String>,
    /// Epoch milliseconds. Advisory only, nothing expires records.
    #[serde(default)]
    pub expires_at: Option<i64>,
    #[serde(default)]
    pub connected: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub username: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub profile_url: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub connected_via: Option<ConnectedVia>,
}

/// Token material issued for a new connection.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct IssuedTokens {
    pub access_token: String,
    pub refresh_token: String,
    pub expires_at: i64,
}

fn non_empty(value: &Option<String>) -> bool {
    value.as_deref().is_some_and(|v| !v.is_empty())
}

impl ConnectionRecord {
    /// The zero-value record every platform starts from and resets to.
    pub fn disconnected(platform: Platform) -> Self {
        Self {
            platform,
            access_token: None,
            refresh_token: None,
            expires_at: None,
            connected: false,
            username: None,
            profile_url: None,
            connected_via: None,
        }
    }

    /// Build a connected record for `username`.
    pub fn connected(
        platform: Platform,
        username: impl Into<String>,
        profile_url: impl Into<String>,
        tokens: IssuedTokens,
        via: ConnectedVia,
    ) -> Self {
        Self {
            platform,
            access_token: Some(tokens.access_token),
            refresh_token: Some(tokens.refresh_token),
            expires_at: Some(tokens.expires_at),
            connected: true,
            username: Some(username.into()),
            profile_url: Some(profile_url.into()),
            connected_via: Some(via),
        }
    }

    pub fn is_connected(&self) -> bool {
        self.connected && non_empty(&self.access_token) && non_empty(&self.username)
    }

    /// `connected` agrees with the token/username fields, and a disconnected
    /// record carries no leftovers.
    pub fn is_consistent(&self) -> bool {
        if self.connected {
            non_empty(&self.access_token) && non_empty(&self.username)
        } else {
            self.access_token.is_none()
                && self.refresh_token.is_none()
                && self.expires_at.is_none()
                && self.username.is_none()
                && self.profile_url.is_none()
                && self.connected_via.is_none()
        }
    }

    /// Reset half-populated records to the disconnected default.
    pub fn sanitized(self) -> Self {
        if self.is_consistent() {
            self
        } else {
            Self::disconnected(self.platform)
        }
    }
}

/// Connection records for every platform, keyed by platform tag.
///
/// Always holds exactly one record per [`Platform`]; missing entries are
/// filled with disconnected defaults when deserializing.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(
    from = "BTreeMap<Platform, ConnectionRecord>",
    into = "BTreeMap<Platform, ConnectionRecord>"
)]
pub struct ConnectionMap {
    records: BTreeMap<Platform, ConnectionRecord>,
}

impl Default for ConnectionMap {
    fn default() -> Self {
        Self {
            records: Platform::ALL
                .into_iter()
                .map(|p| (p, ConnectionRecord::disconnected(p)))
                .collect(),
        }
    }
}

impl From<BTreeMap<Platform, ConnectionRecord>> for ConnectionMap {
    fn from(mut raw: BTreeMap<Platform, ConnectionRecord>) -> Self {
        let records = Platform::ALL
            .into_iter()
            .map(|platform| {
                let record = match raw.remove(&platform) {
                    Some(mut record) => {
                        record.platform = platform;
                        record.sanitized()
                    }
                    None => ConnectionRecord::disconnected(platform),
                };
                (platform, record)
            })
            .collect();
        Self { records }
    }
}

impl From<ConnectionMap> for BTreeMap<Platform, ConnectionRecord> {
    fn from(map: ConnectionMap) -> Self {
        map.records
    }
}

impl ConnectionMap {
    pub fn get(&self, platform: Platform) -> &ConnectionRecord {
        // Every platform is inserted on construction.
        &self.records[&platform]
    }

    /// Replace the record for its platform.
    pub fn set(&mut self, record: ConnectionRecord) {
        self.records.insert(record.platform, record);
    }

    pub fn reset(&mut self, platform: Platform) {
        self.records
            .insert(platform, ConnectionRecord::disconnected(platform));
    }

    pub fn is_connected(&self, platform: Platform) -> bool {
        self.get(platform).is_connected()
    }

    pub fn connected_count(&self) -> usize {
        self.records.values().filter(|r| r.is_connected()).count()
    }

    pub fn iter(&self) -> impl Iterator<Item = &ConnectionRecord> {
        self.records.values()
    }
}

/// One entry in YouTube's top-videos list.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct VideoStat {
    pub title: String,
    pub views: u64,
}

/// Facebook reach broken down by content type.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct ContentReach {
    pub photos: u64,
    pub videos: u64,
    pub links: u64,
}

/// Extra figures only one platform reports.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(tag = "platform", rename_all = "lowercase", rename_all_fields = "camelCase")]
pub enum PlatformMetrics {
    Instagram {
        /// Percent.
        reach_rate: u64,
        /// Percent.
        save_rate: u64,
        top_hashtags: Vec<String>,
        stories_views: u64,
    },
    Twitter {
        retweet_rate: u64,
        quote_rate: u64,
        impressions_per_tweet: u64,
        top_mentions: Vec<String>,
    },
    Youtube {
        subscribers_gained: u64,
        /// Minutes.
        watch_time: u64,
        /// Minutes.
        average_view_duration: u64,
        top_videos: Vec<VideoStat>,
    },
    Facebook {
        page_views: u64,
        page_followers: u64,
        click_through_rate: u64,
        reach_by_content_type: ContentReach,
    },
}

/// Engagement snapshot for one connected account.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct MetricsRecord {
    pub followers: u64,
    pub following: u64,
    pub total_posts: u64,
    /// Fraction between 0 and 1.
    pub engagement: f64,
    pub impressions: u64,
    pub likes: u64,
    pub comments: u64,
    pub shares: u64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub views: Option<u64>,
    pub platform_specific: PlatformMetrics,
}
