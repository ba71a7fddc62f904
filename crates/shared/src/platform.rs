//! Supported social platforms.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

/// A mock social network the dashboard can connect to.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, PartialOrd, Ord, Hash)]
#[serde(rename_all = "lowercase")]
pub enum Platform {
    Instagram,
    Twitter,
    Youtube,
    Facebook,
}

impl Platform {
    /// All platforms, in display order.
    pub const ALL: [Platform; 4] = [
        Platform::Instagram,
        Platform::Twitter,
        Platform::Youtube,
        Platform::Facebook,
    ];

    /// Lowercase tag used in storage keys, tokens and URLs.
    pub fn as_str(&self) -> &'static str {
        match self {
            Platform::Instagram => "instagram",
            Platform::Twitter => "twitter",
            Platform::Youtube => "youtube",
            Platform::Facebook => "facebook",
        }
    }

    pub fn display_name(&self) -> &'static str {
        match self {
            Platform::Instagram => "Instagram",
            Platform::Twitter => "Twitter",
            Platform::Youtube => "YouTube",
            Platform::Facebook => "Facebook",
        }
    }

    /// Scale factor applied to generated follower counts.
    pub fn metrics_multiplier(&self) -> f64 {
        match self {
            Platform::Instagram => 1.2,
            Platform::Twitter => 0.8,
            Platform::Youtube => 1.5,
            Platform::Facebook => 1.0,
        }
    }

    /// Public profile URL for a username on this platform.
    pub fn profile_url(&self, username: &str) -> String {
        format!("https://{}.com/{}", self.as_str(), username)
    }
}

impl fmt::Display for Platform {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Error returned when parsing an unknown platform tag.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("unknown platform: {0}")]
pub struct UnknownPlatform(pub String);

impl FromStr for Platform {
    type Err = UnknownPlatform;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "instagram" => Ok(Platform::Instagram),
            "twitter" => Ok(Platform::Twitter),
            "youtube" => Ok(Platform::Youtube),
            "facebook" => Ok(Platform::Facebook),
            _ => Err(UnknownPlatform(s.to_string())),
        }
    }
}
