// libs/doctor-cell/src/router.rs
use std::sync::Arc;

use axum::{
    routing::{get, post, put},
    Router,
};

use shared_config::AppConfig;

use crate::handlers;

/// Public patient-facing browse flow: departments, doctors, free slots.
pub fn booking_routes(state: Arc<AppConfig>) -> Router {
    Router::new()
        .route("/departments", get(handlers::list_departments))
        .route("/departments/{department_id}/doctors", get(handlers::doctors_by_department))
        .route("/slots", get(handlers::get_doctor_slots))
        .with_state(state)
}

/// Admin management of doctors and departments.
pub fn admin_routes(state: Arc<AppConfig>) -> Router {
    Router::new()
        .route("/doctors", get(handlers::list_doctors))
        .route("/doctors", post(handlers::create_doctor))
        .route("/doctors/{doctor_id}/schedule", put(handlers::update_doctor_schedule))
        .route("/departments", get(handlers::list_departments))
        .route("/departments", post(handlers::create_department))
        .route("/departments-with-doctors", get(handlers::departments_with_doctors))
        .with_state(state)
}
