//! SocialPulse Server - dashboard REST API
//!
//! A pure Axum server exposing users, analytics, activities and saved content
//! over an in-memory store.

use axum::{
    routing::{delete, get},
    Router,
};
use tower_http::{
    cors::{Any, CorsLayer},
    trace::TraceLayer,
};

pub mod config;
pub mod error;
pub mod frontend;
pub mod password;
pub mod routes;
pub mod state;
pub mod storage;

pub use config::{FrontendMode, ServerConfig};
pub use state::AppState;
pub use storage::{MemStorage, Storage};

/// Build the API router with state applied.
pub fn app(state: AppState) -> Router {
    // Build CORS layer
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any);

    Router::new()
        .route("/api/health", get(routes::health::health))
        // Users
        .route(
            "/api/users",
            get(routes::users::list_users).post(routes::users::create_user),
        )
        .route(
            "/api/users/{id}",
            get(routes::users::get_user).put(routes::users::update_user),
        )
        // Analytics
        .route(
            "/api/analytics",
            get(routes::analytics::list_analytics).post(routes::analytics::create_analytics),
        )
        // Activities
        .route(
            "/api/activities",
            get(routes::activities::list_activities).post(routes::activities::create_activity),
        )
        // Saved content
        .route(
            "/api/content/saved",
            get(routes::content::list_saved_content).post(routes::content::save_content),
        )
        .route("/api/content/saved/{id}", delete(routes::content::delete_saved_content))
        .route("/api/content/top", get(routes::content::top_content))
        // Apply middleware
        .layer(TraceLayer::new_for_http())
        .layer(cors)
        .with_state(state)
}
