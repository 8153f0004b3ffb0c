use std::sync::Arc;

use axum::{
    extract::{Request, State},
    http::StatusCode,
    middleware::{self, Next},
    response::Response,
    routing::{get, post},
    Router,
};
use tower_http::trace::TraceLayer;

use crate::AppState;

pub mod handlers;

/// Build the management API router.
/// All routes are relative — the caller mounts this under `/api/v1`.
pub fn api_router(state: Arc<AppState>) -> Router<Arc<AppState>> {
    Router::new()
        .route(
            "/apis",
            get(handlers::list_apis).post(handlers::create_api),
        )
        .route(
            "/apis/:id",
            get(handlers::get_api)
                .put(handlers::update_api)
                .delete(handlers::delete_api),
        )
        .route("/apis/:id/synchronize", post(handlers::synchronize_api))
        .route("/apis/:id/withdraw", post(handlers::withdraw_api))
        .route(
            "/consumers",
            get(handlers::list_consumers).post(handlers::create_consumer),
        )
        .route(
            "/consumers/:id",
            get(handlers::get_consumer)
                .put(handlers::update_consumer)
                .delete(handlers::delete_consumer),
        )
        .route(
            "/consumers/:id/synchronize",
            post(handlers::synchronize_consumer),
        )
        .route("/consumers/:id/withdraw", post(handlers::withdraw_consumer))
        .route(
            "/plugins",
            get(handlers::list_plugins).post(handlers::create_plugin),
        )
        .route(
            "/plugins/:id",
            get(handlers::get_plugin)
                .put(handlers::update_plugin)
                .delete(handlers::delete_plugin),
        )
        .route(
            "/plugins/:id/synchronize",
            post(handlers::synchronize_plugin),
        )
        .route("/plugins/:id/withdraw", post(handlers::withdraw_plugin))
        .layer(middleware::from_fn_with_state(state, admin_auth))
        .layer(TraceLayer::new_for_http())
        .fallback(fallback_404)
}

async fn fallback_404() -> StatusCode {
    StatusCode::NOT_FOUND
}

/// Middleware: validates `X-Admin-Key` header (or a Bearer token) against the
/// configured admin key. Returns 401 if missing/invalid.
async fn admin_auth(
    State(state): State<Arc<AppState>>,
    req: Request,
    next: Next,
) -> Result<Response, StatusCode> {
    let provided_key = req
        .headers()
        .get("x-admin-key")
        .and_then(|v| v.to_str().ok())
        .or_else(|| {
            req.headers()
                .get("authorization")
                .and_then(|v| v.to_str().ok())
                .and_then(|v| v.strip_prefix("Bearer "))
                .map(|t| t.trim())
        });

    match provided_key {
        Some(k) if k == state.config.admin_key => Ok(next.run(req).await),
        Some(k) => {
            // Never log the expected key or the full provided key
            let masked = if k.len() > 8 {
                format!("{}…{}", &k[..4], &k[k.len() - 4..])
            } else {
                "****".to_string()
            };
            tracing::warn!("management API: invalid admin key (provided: '{}')", masked);
            Err(StatusCode::UNAUTHORIZED)
        }
        None => Err(StatusCode::UNAUTHORIZED),
    }
}
