// libs/appointment-cell/src/router.rs
use std::sync::Arc;

use axum::{
    routing::{delete, get, post, put},
    Router,
};

use shared_config::AppConfig;

use crate::handlers;

/// Public booking endpoint.
pub fn booking_routes(state: Arc<AppConfig>) -> Router {
    Router::new()
        .route("/appointments", post(handlers::book_appointment))
        .with_state(state)
}

/// Admin appointment management.
pub fn admin_routes(state: Arc<AppConfig>) -> Router {
    Router::new()
        .route("/appointments", get(handlers::list_appointments))
        .route("/appointments/{appointment_id}", put(handlers::update_appointment))
        .route("/appointments/{appointment_id}", delete(handlers::delete_appointment))
        .with_state(state)
}
