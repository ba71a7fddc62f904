//! HTTP client for the dashboard REST API.

use reqwest::{Client, RequestBuilder};
use serde::de::DeserializeOwned;
use serde::Serialize;
use socialpulse_shared::{
    Activity, Analytics, ApiError, NewActivity, NewAnalytics, NewSavedContent, NewUser,
    SavedContent, UpdateUser, User,
};

use crate::config::ClientConfig;

/// Append `userId`/`limit` filters to `path`.
fn filtered(path: &str, user_id: Option<u64>, limit: Option<usize>) -> String {
    let params: Vec<String> = user_id
        .map(|id| format!("userId={id}"))
        .into_iter()
        .chain(limit.map(|limit| format!("limit={limit}")))
        .collect();
    if params.is_empty() {
        path.to_string()
    } else {
        format!("{path}?{}", params.join("&"))
    }
}

#[derive(Debug, Clone)]
pub struct ApiClient {
    client: Client,
    base_url: String,
}

impl ApiClient {
    /// Create a client that issues same-origin relative requests.
    pub fn new() -> Self {
        Self {
            client: Client::new(),
            base_url: String::new(),
        }
    }

    pub fn from_config(config: &ClientConfig) -> Self {
        Self::new().with_base_url(config.api_base_url.clone())
    }

    /// Set the base URL for API requests
    pub fn with_base_url(mut self, base_url: impl Into<String>) -> Self {
        self.base_url = base_url.into();
        self
    }

    fn url(&self, path: &str) -> String {
        if path.starts_with("http://") || path.starts_with("https://") {
            return path.to_string();
        }
        if self.base_url.is_empty() {
            if path.starts_with('/') {
                path.to_string()
            } else {
                format!("/{path}")
            }
        } else {
            let base = self.base_url.trim_end_matches('/');
            let path = path.trim_start_matches('/');
            format!("{base}/{path}")
        }
    }

    /// Send the request and return the body of a 2xx response.
    async fn send(&self, rb: RequestBuilder) -> Result<String, ApiError> {
        let resp = rb.send().await.map_err(|e| ApiError::Network(e.to_string()))?;

        let status = resp.status().as_u16();
        let is_success = resp.status().is_success();
        let text = resp
            .text()
            .await
            .map_err(|e| ApiError::Network(format!("failed to read body: {e}")))?;

        if !is_success {
            return Err(ApiError::Http { status, body: text });
        }
        Ok(text)
    }

    fn decode<T: DeserializeOwned>(text: &str) -> Result<T, ApiError> {
        let text = if text.is_empty() { "null" } else { text };
        serde_json::from_str(text).map_err(|e| ApiError::Deserialize(e.to_string()))
    }

    fn with_json<TReq: Serialize>(rb: RequestBuilder, body: &TReq) -> Result<RequestBuilder, ApiError> {
        let body_bytes = serde_json::to_vec(body).map_err(|e| ApiError::Deserialize(e.to_string()))?;
        Ok(rb.body(body_bytes).header("Content-Type", "application/json"))
    }

    pub async fn get_json<TRes: DeserializeOwned>(&self, path: &str) -> Result<TRes, ApiError> {
        let text = self.send(self.client.get(self.url(path))).await?;
        Self::decode(&text)
    }

    pub async fn post_json<TReq: Serialize, TRes: DeserializeOwned>(
        &self,
        path: &str,
        body: &TReq,
    ) -> Result<TRes, ApiError> {
        let rb = Self::with_json(self.client.post(self.url(path)), body)?;
        let text = self.send(rb).await?;
        Self::decode(&text)
    }

    pub async fn put_json<TReq: Serialize, TRes: DeserializeOwned>(
        &self,
        path: &str,
        body: &TReq,
    ) -> Result<TRes, ApiError> {
        let rb = Self::with_json(self.client.put(self.url(path)), body)?;
        let text = self.send(rb).await?;
        Self::decode(&text)
    }

    pub async fn delete(&self, path: &str) -> Result<(), ApiError> {
        self.send(self.client.delete(self.url(path))).await?;
        Ok(())
    }

    // --- Users ---

    pub async fn list_users(&self) -> Result<Vec<User>, ApiError> {
        self.get_json("/api/users").await
    }

    pub async fn get_user(&self, id: u64) -> Result<User, ApiError> {
        self.get_json(&format!("/api/users/{id}")).await
    }

    pub async fn create_user(&self, user: &NewUser) -> Result<User, ApiError> {
        self.post_json("/api/users", user).await
    }

    pub async fn update_user(&self, id: u64, update: &UpdateUser) -> Result<User, ApiError> {
        self.put_json(&format!("/api/users/{id}"), update).await
    }

    // --- Analytics and activity feed ---

    pub async fn analytics(&self, user_id: Option<u64>) -> Result<Vec<Analytics>, ApiError> {
        self.get_json(&filtered("/api/analytics", user_id, None)).await
    }

    pub async fn create_analytics(&self, row: &NewAnalytics) -> Result<Analytics, ApiError> {
        self.post_json("/api/analytics", row).await
    }

    /// Newest first.
    pub async fn activities(&self, user_id: Option<u64>) -> Result<Vec<Activity>, ApiError> {
        self.get_json(&filtered("/api/activities", user_id, None)).await
    }

    pub async fn create_activity(&self, activity: &NewActivity) -> Result<Activity, ApiError> {
        self.post_json("/api/activities", activity).await
    }

    // --- Saved content ---

    pub async fn saved_content(&self, user_id: Option<u64>) -> Result<Vec<SavedContent>, ApiError> {
        self.get_json(&filtered("/api/content/saved", user_id, None)).await
    }

    /// Highest likes + comments + shares first; the server defaults to three.
    pub async fn top_content(
        &self,
        user_id: Option<u64>,
        limit: Option<usize>,
    ) -> Result<Vec<SavedContent>, ApiError> {
        self.get_json(&filtered("/api/content/top", user_id, limit)).await
    }

    pub async fn save_content(&self, content: &NewSavedContent) -> Result<SavedContent, ApiError> {
        self.post_json("/api/content/saved", content).await
    }

    pub async fn delete_saved_content(&self, id: u64) -> Result<(), ApiError> {
        self.delete(&format!("/api/content/saved/{id}")).await
    }
}

impl Default for ApiClient {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn urls_join_base_and_path() {
        let relative = ApiClient::new();
        assert_eq!(relative.url("api/users"), "/api/users");

        let absolute = ApiClient::new().with_base_url("http://localhost:8080/");
        assert_eq!(absolute.url("/api/users/1"), "http://localhost:8080/api/users/1");
        assert_eq!(absolute.url("https://other.host/x"), "https://other.host/x");
    }

    #[test]
    fn filters_become_query_parameters() {
        assert_eq!(filtered("/api/analytics", None, None), "/api/analytics");
        assert_eq!(filtered("/api/activities", Some(1), None), "/api/activities?userId=1");
        assert_eq!(
            filtered("/api/content/top", Some(1), Some(5)),
            "/api/content/top?userId=1&limit=5"
        );
        assert_eq!(filtered("/api/content/top", None, Some(2)), "/api/content/top?limit=2");
    }

    #[test]
    fn empty_body_decodes_as_unit() {
        let () = ApiClient::decode("").unwrap();
        assert!(matches!(
            ApiClient::decode::<Vec<User>>("{"),
            Err(ApiError::Deserialize(_))
        ));
    }
}
