//! In-memory dashboard storage.
//!
//! Everything lives in ordered maps behind one `RwLock`; ids are handed out
//! from per-collection counters starting at 1. Data is lost on restart.

use std::collections::BTreeMap;

use async_trait::async_trait;
use chrono::{Duration, Utc};
use rand::Rng;
use socialpulse_shared::{
    Activity, Analytics, NewActivity, NewAnalytics, NewSavedContent, NewUser, SavedContent,
    UpdateUser, User,
};
use tokio::sync::RwLock;

use crate::password::hash_password;

#[derive(Debug, thiserror::Error)]
pub enum StorageError {
    #[error("{0}")]
    Conflict(String),
    #[error("storage backend error: {0}")]
    Backend(String),
}

pub type StorageResult<T> = Result<T, StorageError>;

/// Storage operations used by the route handlers.
#[async_trait]
pub trait Storage: Send + Sync {
    // Users
    async fn list_users(&self) -> StorageResult<Vec<User>>;
    async fn get_user(&self, id: u64) -> StorageResult<Option<User>>;
    async fn get_user_by_username(&self, username: &str) -> StorageResult<Option<User>>;
    async fn get_user_by_email(&self, email: &str) -> StorageResult<Option<User>>;
    async fn get_user_by_uid(&self, uid: &str) -> StorageResult<Option<User>>;
    async fn create_user(&self, user: NewUser, password_hash: String) -> StorageResult<User>;
    async fn update_user(
        &self,
        id: u64,
        update: UpdateUser,
        password_hash: Option<String>,
    ) -> StorageResult<Option<User>>;

    // Analytics
    async fn get_analytics(&self, user_id: Option<u64>) -> StorageResult<Vec<Analytics>>;
    async fn get_analytics_by_platform(
        &self,
        user_id: u64,
        platform: &str,
    ) -> StorageResult<Vec<Analytics>>;
    async fn create_analytics(&self, data: NewAnalytics) -> StorageResult<Analytics>;

    // Activities
    async fn get_activities(&self, user_id: Option<u64>) -> StorageResult<Vec<Activity>>;
    async fn create_activity(&self, activity: NewActivity) -> StorageResult<Activity>;

    // Saved content
    async fn get_saved_content(&self, user_id: Option<u64>) -> StorageResult<Vec<SavedContent>>;
    async fn get_saved_content_by_id(&self, id: u64) -> StorageResult<Option<SavedContent>>;
    async fn get_top_content(
        &self,
        user_id: Option<u64>,
        limit: usize,
    ) -> StorageResult<Vec<SavedContent>>;
    async fn create_saved_content(&self, content: NewSavedContent) -> StorageResult<SavedContent>;
    async fn delete_saved_content(&self, id: u64) -> StorageResult<bool>;
}

struct Collection<T> {
    rows: BTreeMap<u64, T>,
    next_id: u64,
}

impl<T> Default for Collection<T> {
    fn default() -> Self {
        Self {
            rows: BTreeMap::new(),
            next_id: 0,
        }
    }
}

impl<T: Clone> Collection<T> {
    fn allocate_id(&mut self) -> u64 {
        self.next_id += 1;
        self.next_id
    }

    fn filtered(&self, keep: impl Fn(&T) -> bool) -> Vec<T> {
        self.rows.values().filter(|row| keep(row)).cloned().collect()
    }
}

#[derive(Default)]
struct Tables {
    users: Collection<User>,
    analytics: Collection<Analytics>,
    activities: Collection<Activity>,
    saved_content: Collection<SavedContent>,
}

/// Map-backed [`Storage`].
#[derive(Default)]
pub struct MemStorage {
    tables: RwLock<Tables>,
}

fn owned_by(user_id: Option<u64>, owner: Option<u64>) -> bool {
    user_id.is_none() || user_id == owner
}

impl MemStorage {
    pub fn new() -> Self {
        Self::default()
    }

    /// Storage pre-populated with the demo account and its dashboard data.
    pub async fn with_demo_data() -> anyhow::Result<Self> {
        let storage = Self::new();
        storage.seed_demo_data().await?;
        Ok(storage)
    }

    async fn seed_demo_data(&self) -> anyhow::Result<()> {
        let password_hash = hash_password("hashedpassword123")?;
        let demo = self
            .create_user(
                NewUser {
                    username: "sarahjohnson".to_string(),
                    password: String::new(),
                    email: "sarah.johnson@example.com".to_string(),
                    display_name: Some("Sarah Johnson".to_string()),
                    photo_url: Some(
                        "https://randomuser.me/api/portraits/women/68.jpg".to_string(),
                    ),
                    dark_mode: false,
                    uid: Some("demo123".to_string()),
                },
                password_hash,
            )
            .await?;

        let now = Utc::now();
        let analytics: Vec<NewAnalytics> = {
            let mut rng = rand::thread_rng();
            ["Instagram", "Twitter", "LinkedIn"]
                .into_iter()
                .map(|platform| NewAnalytics {
                    user_id: Some(demo.id),
                    platform: platform.to_string(),
                    followers: rng.gen_range(2000..12000),
                    engagement_rate: format!("{:.1}%", rng.gen::<f64>() * 5.0 + 1.5),
                    total_posts: rng.gen_range(50..350),
                    response_time: format!(
                        "{}.{} hrs",
                        rng.gen_range(1..5),
                        rng.gen_range(0..9)
                    ),
                    date: Some(now),
                })
                .collect()
        };
        for entry in analytics {
            self.create_analytics(entry).await?;
        }

        let activities = [
            ("follower", "23 new followers joined across your social accounts", "user-add"),
            ("comment", "New comments on your post \"Launch Announcement\"", "chat"),
            ("campaign", "Campaign completed \"Q3 Product Update\" reached 14,593 people", "rocket"),
            ("bookmark", "You saved \"Content Strategy 2023\" to favorites", "bookmark"),
        ];
        for (index, (kind, message, icon)) in activities.into_iter().enumerate() {
            self.create_activity(NewActivity {
                user_id: Some(demo.id),
                kind: kind.to_string(),
                message: message.to_string(),
                icon: Some(icon.to_string()),
                timestamp: Some(now - Duration::hours(6 * (index as i64 + 1))),
            })
            .await?;
        }

        let content = [
            (
                "How to Boost Your Social Media Presence",
                "Tips and tricks for growing your audience and improving engagement on social media platforms.",
                "https://images.unsplash.com/photo-1517694712202-14dd9538aa97",
                "Instagram",
                2400,
                89,
                324,
            ),
            (
                "10 Trends to Watch in 2023",
                "Stay ahead of the curve with these insights on emerging social media trends.",
                "https://images.unsplash.com/photo-1571171637578-41bc2dd41cd2",
                "Twitter",
                1800,
                63,
                215,
            ),
            (
                "Building a Strong Brand Identity",
                "Establish a unique and recognizable brand across all your social media channels.",
                "https://images.unsplash.com/photo-1516321497487-e288fb19713f",
                "LinkedIn",
                1500,
                42,
                187,
            ),
        ];
        for (title, description, image_url, platform, likes, comments, shares) in content {
            self.create_saved_content(NewSavedContent {
                user_id: Some(demo.id),
                title: title.to_string(),
                description: Some(description.to_string()),
                image_url: Some(image_url.to_string()),
                platform: Some(platform.to_string()),
                likes,
                comments,
                shares,
                timestamp: Some(now),
            })
            .await?;
        }

        tracing::info!("Seeded demo data for user {}", demo.username);
        Ok(())
    }
}

#[async_trait]
impl Storage for MemStorage {
    async fn list_users(&self) -> StorageResult<Vec<User>> {
        Ok(self.tables.read().await.users.filtered(|_| true))
    }

    async fn get_user(&self, id: u64) -> StorageResult<Option<User>> {
        Ok(self.tables.read().await.users.rows.get(&id).cloned())
    }

    async fn get_user_by_username(&self, username: &str) -> StorageResult<Option<User>> {
        let tables = self.tables.read().await;
        Ok(tables.users.rows.values().find(|u| u.username == username).cloned())
    }

    async fn get_user_by_email(&self, email: &str) -> StorageResult<Option<User>> {
        let tables = self.tables.read().await;
        Ok(tables.users.rows.values().find(|u| u.email == email).cloned())
    }

    async fn get_user_by_uid(&self, uid: &str) -> StorageResult<Option<User>> {
        let tables = self.tables.read().await;
        Ok(tables
            .users
            .rows
            .values()
            .find(|u| u.uid.as_deref() == Some(uid))
            .cloned())
    }

    async fn create_user(&self, user: NewUser, password_hash: String) -> StorageResult<User> {
        let mut tables = self.tables.write().await;
        if let Some(clash) = tables.users.rows.values().find(|u| {
            u.username == user.username
                || u.email == user.email
                || (user.uid.is_some() && u.uid == user.uid)
        }) {
            return Err(StorageError::Conflict(format!(
                "User {} already exists",
                clash.username
            )));
        }

        let id = tables.users.allocate_id();
        let user = User {
            id,
            username: user.username,
            password_hash,
            email: user.email,
            display_name: user.display_name,
            photo_url: user.photo_url,
            dark_mode: user.dark_mode,
            uid: user.uid,
        };
        tables.users.rows.insert(id, user.clone());
        Ok(user)
    }

    async fn update_user(
        &self,
        id: u64,
        update: UpdateUser,
        password_hash: Option<String>,
    ) -> StorageResult<Option<User>> {
        let mut tables = self.tables.write().await;
        let clash = tables.users.rows.values().any(|u| {
            u.id != id
                && (update.username.as_ref() == Some(&u.username)
                    || update.email.as_ref() == Some(&u.email))
        });
        if clash {
            return Err(StorageError::Conflict(
                "Username or email already in use".to_string(),
            ));
        }

        let Some(user) = tables.users.rows.get_mut(&id) else {
            return Ok(None);
        };
        if let Some(username) = update.username {
            user.username = username;
        }
        if let Some(hash) = password_hash {
            user.password_hash = hash;
        }
        if let Some(email) = update.email {
            user.email = email;
        }
        if let Some(display_name) = update.display_name {
            user.display_name = Some(display_name);
        }
        if let Some(photo_url) = update.photo_url {
            user.photo_url = Some(photo_url);
        }
        if let Some(dark_mode) = update.dark_mode {
            user.dark_mode = dark_mode;
        }
        if let Some(uid) = update.uid {
            user.uid = Some(uid);
        }
        Ok(Some(user.clone()))
    }

    async fn get_analytics(&self, user_id: Option<u64>) -> StorageResult<Vec<Analytics>> {
        let tables = self.tables.read().await;
        Ok(tables.analytics.filtered(|a| owned_by(user_id, a.user_id)))
    }

    async fn get_analytics_by_platform(
        &self,
        user_id: u64,
        platform: &str,
    ) -> StorageResult<Vec<Analytics>> {
        let tables = self.tables.read().await;
        Ok(tables
            .analytics
            .filtered(|a| a.user_id == Some(user_id) && a.platform == platform))
    }

    async fn create_analytics(&self, data: NewAnalytics) -> StorageResult<Analytics> {
        let mut tables = self.tables.write().await;
        let id = tables.analytics.allocate_id();
        let row = Analytics {
            id,
            user_id: data.user_id,
            platform: data.platform,
            followers: data.followers,
            engagement_rate: data.engagement_rate,
            total_posts: data.total_posts,
            response_time: data.response_time,
            date: data.date.unwrap_or_else(Utc::now),
        };
        tables.analytics.rows.insert(id, row.clone());
        Ok(row)
    }

    async fn get_activities(&self, user_id: Option<u64>) -> StorageResult<Vec<Activity>> {
        let tables = self.tables.read().await;
        let mut rows = tables.activities.filtered(|a| owned_by(user_id, a.user_id));
        rows.sort_by(|a, b| b.timestamp.cmp(&a.timestamp));
        Ok(rows)
    }

    async fn create_activity(&self, activity: NewActivity) -> StorageResult<Activity> {
        let mut tables = self.tables.write().await;
        let id = tables.activities.allocate_id();
        let row = Activity {
            id,
            user_id: activity.user_id,
            kind: activity.kind,
            message: activity.message,
            icon: activity.icon,
            timestamp: activity.timestamp.unwrap_or_else(Utc::now),
        };
        tables.activities.rows.insert(id, row.clone());
        Ok(row)
    }

    async fn get_saved_content(&self, user_id: Option<u64>) -> StorageResult<Vec<SavedContent>> {
        let tables = self.tables.read().await;
        Ok(tables.saved_content.filtered(|c| owned_by(user_id, c.user_id)))
    }

    async fn get_saved_content_by_id(&self, id: u64) -> StorageResult<Option<SavedContent>> {
        Ok(self.tables.read().await.saved_content.rows.get(&id).cloned())
    }

    async fn get_top_content(
        &self,
        user_id: Option<u64>,
        limit: usize,
    ) -> StorageResult<Vec<SavedContent>> {
        let mut rows = self.get_saved_content(user_id).await?;
        // Stable sort keeps insertion order among equal engagement.
        rows.sort_by(|a, b| b.engagement().cmp(&a.engagement()));
        rows.truncate(limit);
        Ok(rows)
    }

    async fn create_saved_content(&self, content: NewSavedContent) -> StorageResult<SavedContent> {
        let mut tables = self.tables.write().await;
        let id = tables.saved_content.allocate_id();
        let row = SavedContent {
            id,
            user_id: content.user_id,
            title: content.title,
            description: content.description,
            image_url: content.image_url,
            platform: content.platform,
            likes: content.likes,
            comments: content.comments,
            shares: content.shares,
            timestamp: content.timestamp.unwrap_or_else(Utc::now),
        };
        tables.saved_content.rows.insert(id, row.clone());
        Ok(row)
    }

    async fn delete_saved_content(&self, id: u64) -> StorageResult<bool> {
        Ok(self.tables.write().await.saved_content.rows.remove(&id).is_some())
    }
}
