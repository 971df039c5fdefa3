use std::sync::Arc;

use axum::{
    routing::{get, post},
    Router,
};

use shared_config::AppConfig;

use crate::handlers;

pub fn admin_routes(state: Arc<AppConfig>) -> Router {
    Router::new()
        .route("/patients", get(handlers::list_patients))
        .route("/patients", post(handlers::create_patient))
        .route("/patients/{patient_id}", get(handlers::get_patient))
        .with_state(state)
}
