//! API route handlers.

pub mod activities;
pub mod analytics;
pub mod content;
pub mod health;
pub mod users;

use serde::Deserialize;

/// `?userId=` filter shared by the list endpoints.
///
/// Unparseable or zero ids mean "no filter", like the dashboard has always
/// treated them.
#[derive(Debug, Default, Deserialize)]
pub struct UserFilter {
    #[serde(rename = "userId")]
    pub user_id: Option<String>,
}

impl UserFilter {
    pub fn user_id(&self) -> Option<u64> {
        parse_positive(self.user_id.as_deref())
    }
}

pub(crate) fn parse_positive(raw: Option<&str>) -> Option<u64> {
    raw.and_then(|v| v.trim().parse::<u64>().ok()).filter(|v| *v > 0)
}
