//! Dashboard bundle serving for everything outside `/api`.

use std::path::Path;

use axum::Router;
use axum_reverse_proxy::ReverseProxy;
use tower_http::services::{ServeDir, ServeFile};

use crate::config::FrontendMode;

const SPA_SHELL: &str = "index.html";

/// Serve built assets from `dir`; unknown paths such as `/dashboard` or
/// `/settings` get the SPA shell so client-side routing can take over.
fn spa_service(dir: &Path) -> ServeDir<ServeFile> {
    ServeDir::new(dir).fallback(ServeFile::new(dir.join(SPA_SHELL)))
}

/// Attach the dashboard frontend to an already stateful API router.
pub fn with_frontend_fallback(api: Router, mode: &FrontendMode) -> Router {
    match mode {
        FrontendMode::Proxy { target } => {
            tracing::info!(upstream = %target, "Proxying dashboard requests to dev server");
            api.merge(Router::from(ReverseProxy::new("/", target)))
        }
        FrontendMode::Static { dir } => {
            tracing::info!(dir = %dir, "Serving dashboard bundle");
            api.fallback_service(spa_service(Path::new(dir)))
        }
        FrontendMode::Disabled => {
            tracing::info!("Dashboard serving disabled, API only");
            api
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::{
        body::{to_bytes, Body},
        http::{Request, StatusCode},
        routing::get,
    };
    use tower::ServiceExt;

    async fn body_of(router: Router, uri: &str) -> (StatusCode, String) {
        let response = router
            .oneshot(Request::get(uri).body(Body::empty()).unwrap())
            .await
            .unwrap();
        let status = response.status();
        let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
        (status, String::from_utf8(bytes.to_vec()).unwrap())
    }

    fn api() -> Router {
        Router::new().route("/api/health", get(|| async { "ok" }))
    }

    #[tokio::test]
    async fn client_routes_fall_back_to_the_shell() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::write(dir.path().join(SPA_SHELL), "<div id=\"root\"></div>").unwrap();
        std::fs::write(dir.path().join("app.js"), "boot()").unwrap();
        let mode = FrontendMode::Static {
            dir: dir.path().to_string_lossy().into_owned(),
        };
        let router = with_frontend_fallback(api(), &mode);

        assert_eq!(body_of(router.clone(), "/app.js").await, (StatusCode::OK, "boot()".into()));
        let (status, body) = body_of(router.clone(), "/settings").await;
        assert_eq!(status, StatusCode::OK);
        assert!(body.contains("root"));
        assert_eq!(body_of(router, "/api/health").await, (StatusCode::OK, "ok".into()));
    }

    #[tokio::test]
    async fn disabled_mode_serves_only_the_api() {
        let router = with_frontend_fallback(api(), &FrontendMode::Disabled);
        assert_eq!(body_of(router.clone(), "/dashboard").await.0, StatusCode::NOT_FOUND);
        assert_eq!(body_of(router, "/api/health").await.0, StatusCode::OK);
    }
}
