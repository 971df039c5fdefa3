use std::sync::Arc;

use axum::{routing::get, Router};

use shared_config::AppConfig;

pub fn create_router(state: Arc<AppConfig>) -> Router {
    // Public patient booking flow
    let booking = Router::new()
        .merge(doctor_cell::router::booking_routes(state.clone()))
        .merge(appointment_cell::router::booking_routes(state.clone()));

    // Admin management surface
    let admin = Router::new()
        .merge(appointment_cell::router::admin_routes(state.clone()))
        .merge(doctor_cell::router::admin_routes(state.clone()))
        .merge(patient_cell::router::admin_routes(state.clone()));

    Router::new()
        .route("/", get(|| async { "Medibook API is running!" }))
        .nest("/api", booking)
        .nest("/api/admin", admin)
}
