//! API router.
//!
//! Returns a composable `Router` with all endpoints nested under `/api/`.
//!
//! Middleware uses `Extension<ApiContext>` (injected as the outermost layer).
//! Endpoint handlers use `State<ApiContext>` (provided via `with_state`).

use axum::routing::{get, post, put};
use axum::Router;
use tower_http::cors::CorsLayer;

use crate::api::endpoints;
use crate::api::middleware;
use crate::api::types::ApiContext;

/// Build the API router.
///
/// Everything except login and the health check requires a bearer token.
/// Admin-only routes check the resolved role inside the handler.
///
/// NOTE: Path params use `:param` syntax (matchit 0.7 / axum 0.7).
pub fn api_router(ctx: ApiContext) -> Router {
    let protected = Router::new()
        .route(
            "/referrals",
            get(endpoints::referrals::list).post(endpoints::referrals::submit),
        )
        .route(
            "/referrals/:id/status",
            put(endpoints::referrals::update_status),
        )
        .route("/analytics", get(endpoints::analytics::snapshot))
        .route(
            "/hospitals",
            get(endpoints::hospitals::list).post(endpoints::hospitals::create),
        )
        .route(
            "/hospitals/:id",
            put(endpoints::hospitals::update).delete(endpoints::hospitals::remove),
        )
        .route("/auth/verify", get(endpoints::auth::verify))
        .route("/auth/register", post(endpoints::auth::register))
        .with_state(ctx.clone())
        .layer(axum::middleware::from_fn(middleware::auth::require_auth))
        // Extension must be outermost so the middleware can extract ApiContext
        .layer(axum::Extension(ctx.clone()));

    // Unprotected routes (no bearer token required)
    let unprotected = Router::new()
        .route("/auth/login", post(endpoints::auth::login))
        .route("/health", get(endpoints::health::check))
        .with_state(ctx);

    Router::new()
        .nest("/api", protected)
        .nest("/api", unprotected)
        // Browser client lives on another origin during development.
        .layer(CorsLayer::permissive())
}
