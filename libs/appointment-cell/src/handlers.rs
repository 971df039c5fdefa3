// libs/appointment-cell/src/handlers.rs
use std::sync::Arc;

use axum::{
    extract::{Path, State},
    Json,
};
use serde_json::{json, Value};
use uuid::Uuid;

use shared_config::AppConfig;
use shared_models::error::AppError;

use crate::models::{AppointmentError, BookAppointmentRequest, UpdateAppointmentRequest};
use crate::services::admin::AppointmentAdminService;
use crate::services::reservation::ReservationService;

fn map_appointment_error(e: AppointmentError) -> AppError {
    match e {
        AppointmentError::SlotAlreadyBooked => {
            AppError::Conflict("This slot is already booked".to_string())
        }
        AppointmentError::NotFound => AppError::NotFound("Appointment not found".to_string()),
        AppointmentError::MissingField(field) => {
            AppError::ValidationError(format!("Missing required field: {}", field))
        }
        AppointmentError::ValidationError(msg) => AppError::ValidationError(msg),
        AppointmentError::DatabaseError(msg) => AppError::Database(msg),
    }
}

/// Commit a reservation. Conflicting concurrent requests for the same
/// doctor, date, and start time resolve to exactly one success; the rest
/// receive 409 and should re-query availability.
#[axum::debug_handler]
pub async fn book_appointment(
    State(config): State<Arc<AppConfig>>,
    Json(request): Json<BookAppointmentRequest>,
) -> Result<Json<Value>, AppError> {
    let service = ReservationService::new(&config);

    let appointment = service
        .book_appointment(request)
        .await
        .map_err(map_appointment_error)?;

    Ok(Json(json!({
        "success": true,
        "appointment": appointment
    })))
}

#[axum::debug_handler]
pub async fn list_appointments(
    State(config): State<Arc<AppConfig>>,
) -> Result<Json<Value>, AppError> {
    let service = AppointmentAdminService::new(&config);

    let appointments = service
        .list_appointments()
        .await
        .map_err(map_appointment_error)?;

    Ok(Json(json!(appointments)))
}

#[axum::debug_handler]
pub async fn update_appointment(
    State(config): State<Arc<AppConfig>>,
    Path(appointment_id): Path<Uuid>,
    Json(request): Json<UpdateAppointmentRequest>,
) -> Result<Json<Value>, AppError> {
    let service = AppointmentAdminService::new(&config);

    let appointment = service
        .update_appointment(appointment_id, request)
        .await
        .map_err(map_appointment_error)?;

    Ok(Json(json!(appointment)))
}

#[axum::debug_handler]
pub async fn delete_appointment(
    State(config): State<Arc<AppConfig>>,
    Path(appointment_id): Path<Uuid>,
) -> Result<Json<Value>, AppError> {
    let service = AppointmentAdminService::new(&config);

    service
        .delete_appointment(appointment_id)
        .await
        .map_err(map_appointment_error)?;

    Ok(Json(json!({ "message": "Appointment deleted" })))
}
