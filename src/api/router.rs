//! API router.
//!
//! Public routes (registration, logins, the practitioner directory, health)
//! carry no middleware; everything else sits behind the bearer-token auth
//! layer. Avatars are served as static files from the blob store directory.

use std::sync::Arc;

use axum::extract::State;
use axum::routing::{get, post};
use axum::{Json, Router};
use tower_http::cors::CorsLayer;
use tower_http::services::ServeDir;

use crate::api::endpoints;
use crate::api::middleware;
use crate::api::types::ApiContext;
use crate::config;
use crate::state::AppState;

/// Build the booking API router.
pub fn booking_api_router(state: Arc<AppState>) -> Router {
    build_router(ApiContext::new(state))
}

/// `GET /api/health`
async fn health(State(_ctx): State<ApiContext>) -> Json<serde_json::Value> {
    Json(serde_json::json!({
        "status": "ok",
        "version": config::APP_VERSION,
    }))
}

fn build_router(ctx: ApiContext) -> Router {
    let public = Router::new()
        .route("/health", get(health))
        .route("/patient/register", post(endpoints::patient::register))
        .route("/patient/login", post(endpoints::patient::login))
        .route("/practitioner/login", post(endpoints::practitioner::login))
        .route("/admin/login", post(endpoints::admin::login))
        .route("/practitioners", get(endpoints::practitioner::list))
        .with_state(ctx.clone());

    // Protected routes — Extension must be outermost so the auth middleware
    // can extract ApiContext.
    let protected = Router::new()
        .route(
            "/patient/profile",
            get(endpoints::patient::profile).post(endpoints::patient::update_profile),
        )
        .route("/patient/appointments", get(endpoints::patient::appointments))
        .route("/patient/book", post(endpoints::patient::book))
        .route("/patient/cancel", post(endpoints::patient::cancel))
        .route("/payment/razorpay", post(endpoints::payment::razorpay_order))
        .route(
            "/payment/razorpay/verify",
            post(endpoints::payment::razorpay_verify),
        )
        .route("/payment/stripe", post(endpoints::payment::stripe_session))
        .route(
            "/payment/stripe/verify",
            post(endpoints::payment::stripe_verify),
        )
        .route(
            "/practitioner/appointments",
            get(endpoints::practitioner::appointments),
        )
        .route("/practitioner/cancel", post(endpoints::practitioner::cancel))
        .route(
            "/practitioner/complete",
            post(endpoints::practitioner::complete),
        )
        .route(
            "/practitioner/availability",
            post(endpoints::practitioner::toggle_availability),
        )
        .route(
            "/practitioner/profile",
            get(endpoints::practitioner::profile).post(endpoints::practitioner::update_profile),
        )
        .route(
            "/practitioner/dashboard",
            get(endpoints::practitioner::dashboard),
        )
        .route(
            "/admin/practitioners",
            get(endpoints::admin::list_practitioners).post(endpoints::admin::add_practitioner),
        )
        .route("/admin/availability", post(endpoints::admin::toggle_availability))
        .route("/admin/appointments", get(endpoints::admin::appointments))
        .route("/admin/cancel", post(endpoints::admin::cancel))
        .route("/admin/dashboard", get(endpoints::admin::dashboard))
        .with_state(ctx.clone())
        .layer(axum::middleware::from_fn(middleware::require_auth))
        .layer(axum::Extension(ctx.clone()));

    Router::new()
        .nest("/api", public)
        .nest("/api", protected)
        .nest_service("/avatars", ServeDir::new(ctx.state.avatars.dir()))
        .layer(CorsLayer::permissive())
}
