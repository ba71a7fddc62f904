//! Dashboard entities served by the REST API.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

// --- Validation ---

/// A single invalid field in a create/update payload.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FieldError {
    pub field: String,
    pub message: String,
}

impl FieldError {
    fn new(field: &str, message: &str) -> Self {
        Self {
            field: field.to_string(),
            message: message.to_string(),
        }
    }
}

fn require(errors: &mut Vec<FieldError>, field: &str, value: &str) {
    if value.trim().is_empty() {
        errors.push(FieldError::new(field, "must not be empty"));
    }
}

fn check_email(errors: &mut Vec<FieldError>, email: &str) {
    let valid = email
        .split_once('@')
        .is_some_and(|(local, domain)| !local.is_empty() && domain.contains('.'));
    if !valid {
        errors.push(FieldError::new("email", "must be a valid email address"));
    }
}

fn finish(errors: Vec<FieldError>) -> Result<(), Vec<FieldError>> {
    if errors.is_empty() {
        Ok(())
    } else {
        Err(errors)
    }
}

// --- Users ---

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct User {
    pub id: u64,
    pub username: String,
    /// Argon2 hash; never sent over the wire.
    #[serde(skip_serializing, default)]
    pub password_hash: String,
    pub email: String,
    pub display_name: Option<String>,
    #[serde(rename = "photoURL")]
    pub photo_url: Option<String>,
    pub dark_mode: bool,
    /// Identity provider UID.
    pub uid: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct NewUser {
    pub username: String,
    pub password: String,
    pub email: String,
    #[serde(default)]
    pub display_name: Option<String>,
    #[serde(default, rename = "photoURL")]
    pub photo_url: Option<String>,
    #[serde(default)]
    pub dark_mode: bool,
    #[serde(default)]
    pub uid: Option<String>,
}

impl NewUser {
    pub fn validate(&self) -> Result<(), Vec<FieldError>> {
        let mut errors = Vec::new();
        require(&mut errors, "username", &self.username);
        require(&mut errors, "password", &self.password);
        check_email(&mut errors, &self.email);
        finish(errors)
    }
}

/// Partial user update; absent fields are left untouched.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct UpdateUser {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub username: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub password: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub email: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub display_name: Option<String>,
    #[serde(default, rename = "photoURL", skip_serializing_if = "Option::is_none")]
    pub photo_url: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub dark_mode: Option<bool>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub uid: Option<String>,
}

impl UpdateUser {
    pub fn validate(&self) -> Result<(), Vec<FieldError>> {
        let mut errors = Vec::new();
        if let Some(username) = &self.username {
            require(&mut errors, "username", username);
        }
        if let Some(password) = &self.password {
            require(&mut errors, "password", password);
        }
        if let Some(email) = &self.email {
            check_email(&mut errors, email);
        }
        finish(errors)
    }
}

// --- Analytics ---

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct Analytics {
    pub id: u64,
    pub user_id: Option<u64>,
    /// Free-form platform name ("Instagram", "LinkedIn", ...).
    pub platform: String,
    pub followers: u64,
    /// Display string such as "4.2%".
    pub engagement_rate: String,
    pub total_posts: u64,
    /// Display string such as "2.5 hrs".
    pub response_time: String,
    pub date: DateTime<Utc>,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct NewAnalytics {
    #[serde(default)]
    pub user_id: Option<u64>,
    pub platform: String,
    #[serde(default)]
    pub followers: u64,
    #[serde(default = "default_engagement_rate")]
    pub engagement_rate: String,
    #[serde(default)]
    pub total_posts: u64,
    #[serde(default = "default_response_time")]
    pub response_time: String,
    #[serde(default)]
    pub date: Option<DateTime<Utc>>,
}

fn default_engagement_rate() -> String {
    "0%".to_string()
}

fn default_response_time() -> String {
    "0 hrs".to_string()
}

impl NewAnalytics {
    pub fn validate(&self) -> Result<(), Vec<FieldError>> {
        let mut errors = Vec::new();
        require(&mut errors, "platform", &self.platform);
        finish(errors)
    }
}

// --- Activities ---

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct Activity {
    pub id: u64,
    pub user_id: Option<u64>,
    /// "follower", "comment", "campaign", "bookmark", ...
    #[serde(rename = "type")]
    pub kind: String,
    pub message: String,
    pub icon: Option<String>,
    pub timestamp: DateTime<Utc>,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct NewActivity {
    #[serde(default)]
    pub user_id: Option<u64>,
    #[serde(rename = "type")]
    pub kind: String,
    pub message: String,
    #[serde(default)]
    pub icon: Option<String>,
    #[serde(default)]
    pub timestamp: Option<DateTime<Utc>>,
}

impl NewActivity {
    pub fn validate(&self) -> Result<(), Vec<FieldError>> {
        let mut errors = Vec::new();
        require(&mut errors, "type", &self.kind);
        require(&mut errors, "message", &self.message);
        finish(errors)
    }
}

// --- Saved content ---

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct SavedContent {
    pub id: u64,
    pub user_id: Option<u64>,
    pub title: String,
    pub description: Option<String>,
    pub image_url: Option<String>,
    pub platform: Option<String>,
    pub likes: u64,
    pub comments: u64,
    pub shares: u64,
    pub timestamp: DateTime<Utc>,
}

impl SavedContent {
    /// Likes, comments and shares combined; the top-content sort key.
    pub fn engagement(&self) -> u64 {
        self.likes + self.comments + self.shares
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct NewSavedContent {
    #[serde(default)]
    pub user_id: Option<u64>,
    pub title: String,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default)]
    pub image_url: Option<String>,
    #[serde(default)]
    pub platform: Option<String>,
    #[serde(default)]
    pub likes: u64,
    #[serde(default)]
    pub comments: u64,
    #[serde(default)]
    pub shares: u64,
    #[serde(default)]
    pub timestamp: Option<DateTime<Utc>>,
}

impl NewSavedContent {
    pub fn validate(&self) -> Result<(), Vec<FieldError>> {
        let mut errors = Vec::new();
        require(&mut errors, "title", &self.title);
        finish(errors)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn new_user_rejects_bad_email_and_blank_username() {
        let user = NewUser {
            username: " ".into(),
            password: "pw".into(),
            email: "not-an-email".into(),
            display_name: None,
            photo_url: None,
            dark_mode: false,
            uid: None,
        };
        let errors = user.validate().unwrap_err();
        let fields: Vec<_> = errors.iter().map(|e| e.field.as_str()).collect();
        assert_eq!(fields, vec!["username", "email"]);
    }

    #[test]
    fn update_user_only_checks_present_fields() {
        assert!(UpdateUser::default().validate().is_ok());
        let update = UpdateUser {
            email: Some("a@b".into()),
            ..Default::default()
        };
        assert!(update.validate().is_err());
    }

    #[test]
    fn password_hash_is_not_serialized() {
        let user = User {
            id: 1,
            username: "sarah".into(),
            password_hash: "$argon2id$secret".into(),
            email: "s@example.com".into(),
            display_name: None,
            photo_url: None,
            dark_mode: false,
            uid: None,
        };
        let json = serde_json::to_string(&user).unwrap();
        assert!(!json.contains("argon2"));
        assert!(json.contains("\"photoURL\":null"));
    }

    #[test]
    fn activity_kind_maps_to_type_field() {
        let activity: NewActivity =
            serde_json::from_str(r#"{"type":"comment","message":"hi"}"#).unwrap();
        assert_eq!(activity.kind, "comment");
        assert!(activity.validate().is_ok());
    }
}
