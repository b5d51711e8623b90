pub mod config;
pub mod db;
pub mod errors;
pub mod handlers;
pub mod models;
pub mod services;
pub mod state;

use std::sync::Arc;

use axum::routing::{get, patch, post};
use axum::Router;
use tower_http::cors::CorsLayer;
use tower_http::trace::TraceLayer;

use crate::state::AppState;

pub fn app(state: Arc<AppState>) -> Router {
    Router::new()
        .route("/health", get(handlers::health::health))
        .route("/customers", post(handlers::bookings::create_customer))
        .route("/rooms", post(handlers::bookings::create_room))
        .route("/bookings", post(handlers::bookings::create_booking))
        .route("/bookings/:id", get(handlers::bookings::get_booking))
        .route("/bookings/:id/guests", get(handlers::bookings::get_guests))
        .route("/bookings/:id/checkout", post(handlers::bookings::checkout))
        .route("/checkin", post(handlers::checkin::finalize))
        .route("/checkin/initiate", post(handlers::checkin::initiate))
        .route("/checkin/validate", post(handlers::checkin::validate))
        .route("/checkin/verify", get(handlers::checkin::verify))
        .route("/checkin/resend", post(handlers::checkin::resend))
        .route(
            "/consents",
            get(handlers::consents::list_consents).post(handlers::consents::create_consent),
        )
        .route(
            "/consent-logs",
            get(handlers::consents::list_consent_logs).post(handlers::consents::create_consent_log),
        )
        .route(
            "/consent-logs/attach-booking",
            patch(handlers::consents::attach_booking),
        )
        .layer(TraceLayer::new_for_http())
        .layer(CorsLayer::permissive())
        .with_state(state)
}
