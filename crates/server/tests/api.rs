use axum::{
    body::{to_bytes, Body},
    http::{header, Method, Request, StatusCode},
    Router,
};
use serde_json::{json, Value};
use socialpulse_server::{app, AppState, MemStorage};
use tower::ServiceExt;

async fn demo_app() -> Router {
    app(AppState::new(MemStorage::with_demo_data().await.unwrap()))
}

async fn send(router: &Router, method: Method, uri: &str, body: Option<Value>) -> (StatusCode, Value) {
    let mut builder = Request::builder().method(method).uri(uri);
    let body = match body {
        Some(value) => {
            builder = builder.header(header::CONTENT_TYPE, "application/json");
            Body::from(value.to_string())
        }
        None => Body::empty(),
    };
    let response = router
        .clone()
        .oneshot(builder.body(body).unwrap())
        .await
        .unwrap();

    let status = response.status();
    let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
    let value = if bytes.is_empty() {
        Value::Null
    } else {
        serde_json::from_slice(&bytes).unwrap()
    };
    (status, value)
}

#[tokio::test]
async fn health_endpoint_responds() {
    let router = demo_app().await;
    let (status, body) = send(&router, Method::GET, "/api/health", None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["status"], "ok");
}

#[tokio::test]
async fn demo_user_is_served_without_password() {
    let router = demo_app().await;
    let (status, body) = send(&router, Method::GET, "/api/users/1", None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["username"], "sarahjohnson");
    assert_eq!(body["displayName"], "Sarah Johnson");
    assert!(body.get("password").is_none());
    assert!(body.get("passwordHash").is_none());
}

#[tokio::test]
async fn user_id_must_be_numeric_and_exist() {
    let router = demo_app().await;

    let (status, body) = send(&router, Method::GET, "/api/users/abc", None).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["detail"], "Invalid user ID");

    let (status, body) = send(&router, Method::GET, "/api/users/99", None).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(body["status"], 404);
}

#[tokio::test]
async fn create_and_update_user() {
    let router = demo_app().await;
    let (status, created) = send(
        &router,
        Method::POST,
        "/api/users",
        Some(json!({
            "username": "bob",
            "password": "secret",
            "email": "bob@example.com"
        })),
    )
    .await;
    assert_eq!(status, StatusCode::CREATED);
    assert_eq!(created["id"], 2);
    assert_eq!(created["darkMode"], false);

    let (status, updated) = send(
        &router,
        Method::PUT,
        "/api/users/2",
        Some(json!({ "darkMode": true, "displayName": "Bob" })),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(updated["darkMode"], true);
    assert_eq!(updated["displayName"], "Bob");
    assert_eq!(updated["email"], "bob@example.com");

    let (status, users) = send(&router, Method::GET, "/api/users", None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(users.as_array().unwrap().len(), 2);
}

#[tokio::test]
async fn invalid_payloads_are_rejected_with_field_errors() {
    let router = demo_app().await;

    let (status, body) = send(
        &router,
        Method::POST,
        "/api/users",
        Some(json!({ "username": "", "password": "pw", "email": "nope" })),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["detail"], "Invalid user data");
    assert_eq!(body["errors"].as_array().unwrap().len(), 2);

    let (status, _) = send(
        &router,
        Method::POST,
        "/api/content/saved",
        Some(json!({ "likes": 3 })),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn duplicate_username_or_email_conflicts() {
    let router = demo_app().await;
    let (status, body) = send(
        &router,
        Method::POST,
        "/api/users",
        Some(json!({
            "username": "sarahjohnson",
            "password": "pw",
            "email": "someone@example.com"
        })),
    )
    .await;
    assert_eq!(status, StatusCode::CONFLICT);
    assert_eq!(body["detail"], "Username already taken");

    let (status, body) = send(
        &router,
        Method::POST,
        "/api/users",
        Some(json!({
            "username": "someone",
            "password": "pw",
            "email": "sarah.johnson@example.com"
        })),
    )
    .await;
    assert_eq!(status, StatusCode::CONFLICT);
    assert_eq!(body["detail"], "Email already registered");
}

#[tokio::test]
async fn analytics_and_activities_filter_by_user() {
    let router = demo_app().await;

    let (_, all) = send(&router, Method::GET, "/api/analytics", None).await;
    assert_eq!(all.as_array().unwrap().len(), 3);
    let (_, none) = send(&router, Method::GET, "/api/analytics?userId=7", None).await;
    assert!(none.as_array().unwrap().is_empty());
    // Garbage ids are ignored rather than rejected.
    let (status, lenient) = send(&router, Method::GET, "/api/activities?userId=x", None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(lenient.as_array().unwrap().len(), 4);

    let (status, created) = send(
        &router,
        Method::POST,
        "/api/activities",
        Some(json!({ "userId": 1, "type": "comment", "message": "New reply", "icon": "chat" })),
    )
    .await;
    assert_eq!(status, StatusCode::CREATED);
    assert_eq!(created["type"], "comment");

    let (_, feed) = send(&router, Method::GET, "/api/activities?userId=1", None).await;
    assert_eq!(feed[0]["message"], "New reply");

    let (status, row) = send(
        &router,
        Method::POST,
        "/api/analytics",
        Some(json!({ "userId": 1, "platform": "YouTube", "followers": 12 })),
    )
    .await;
    assert_eq!(status, StatusCode::CREATED);
    assert_eq!(row["engagementRate"], "0%");
    assert_eq!(row["responseTime"], "0 hrs");
}

#[tokio::test]
async fn top_content_orders_by_engagement_with_default_limit() {
    let router = demo_app().await;
    send(
        &router,
        Method::POST,
        "/api/content/saved",
        Some(json!({ "userId": 1, "title": "Viral", "likes": 9000, "comments": 10, "shares": 5 })),
    )
    .await;

    let (status, top) = send(&router, Method::GET, "/api/content/top", None).await;
    assert_eq!(status, StatusCode::OK);
    let titles: Vec<_> = top
        .as_array()
        .unwrap()
        .iter()
        .map(|c| c["title"].as_str().unwrap().to_string())
        .collect();
    assert_eq!(
        titles,
        vec![
            "Viral",
            "How to Boost Your Social Media Presence",
            "10 Trends to Watch in 2023"
        ]
    );

    let (_, one) = send(&router, Method::GET, "/api/content/top?limit=1", None).await;
    assert_eq!(one.as_array().unwrap().len(), 1);

    // Limits that are not plain positive integers fall back to the default.
    for bad in ["5abc", "-1", "0"] {
        let (status, rows) =
            send(&router, Method::GET, &format!("/api/content/top?limit={bad}"), None).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(rows.as_array().unwrap().len(), 3, "limit={bad}");
    }
}

#[tokio::test]
async fn delete_saved_content() {
    let router = demo_app().await;

    let (status, _) = send(&router, Method::DELETE, "/api/content/saved/1", None).await;
    assert_eq!(status, StatusCode::NO_CONTENT);

    let (status, _) = send(&router, Method::DELETE, "/api/content/saved/1", None).await;
    assert_eq!(status, StatusCode::NOT_FOUND);

    let (status, body) = send(&router, Method::DELETE, "/api/content/saved/one", None).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["detail"], "Invalid content ID");

    let (_, saved) = send(&router, Method::GET, "/api/content/saved", None).await;
    assert_eq!(saved.as_array().unwrap().len(), 2);
}
