//! Router assembly.

use crate::api::rest::handlers::{self, AppState};
use axum::Router;
use axum::routing::{get, post, put};
use std::sync::Arc;
use tower::ServiceBuilder;
use tower_http::cors::CorsLayer;
use tower_http::trace::TraceLayer;

/// Builds the `/api/v1` router with tracing and permissive CORS.
pub fn create_router(state: Arc<AppState>) -> Router {
    let api = Router::new()
        .route("/health", get(handlers::health))
        .route("/locations/resolve", get(handlers::resolve_location))
        .route("/quotes", post(handlers::create_quote).get(handlers::list_quotes))
        .route("/quotes/{id}", get(handlers::get_quote))
        .route("/bookings", post(handlers::create_booking).get(handlers::list_bookings))
        .route("/bookings/pending", get(handlers::list_pending_approvals))
        .route("/bookings/{id}", get(handlers::get_booking))
        .route("/bookings/{id}/approve", post(handlers::approve_booking))
        .route("/bookings/{id}/reject", post(handlers::reject_booking))
        .route("/bookings/{id}/confirm-payment", post(handlers::confirm_payment))
        .route("/bookings/{id}/status", put(handlers::update_booking_status))
        .route("/notifications", get(handlers::list_notifications))
        .route("/notifications/read-all", post(handlers::mark_all_notifications_read))
        .route("/notifications/{id}/read", post(handlers::mark_notification_read))
        .route("/audit", get(handlers::list_audit))
        .with_state(state);

    Router::new()
        .nest("/api/v1", api)
        .layer(
            ServiceBuilder::new()
                .layer(TraceLayer::new_for_http())
                .layer(CorsLayer::permissive()),
        )
}
