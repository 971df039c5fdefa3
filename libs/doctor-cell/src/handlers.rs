// libs/doctor-cell/src/handlers.rs
use std::sync::Arc;

use axum::{
    extract::{Path, Query, State},
    Json,
};
use chrono::NaiveDate;
use serde::Deserialize;
use serde_json::{json, Value};
use uuid::Uuid;

use shared_config::AppConfig;
use shared_models::error::AppError;

use crate::models::{CreateDepartmentRequest, CreateDoctorRequest, DoctorError, WeeklySchedule};
use crate::services::availability::AvailabilityService;
use crate::services::department::DepartmentService;
use crate::services::doctor::DoctorService;

#[derive(Debug, Deserialize)]
pub struct SlotsQuery {
    pub doctor_id: Uuid,
    pub date: NaiveDate,
}

fn map_doctor_error(e: DoctorError) -> AppError {
    match e {
        DoctorError::NotFound => AppError::NotFound("Doctor not found".to_string()),
        DoctorError::DepartmentNotFound => AppError::NotFound("Department not found".to_string()),
        DoctorError::ValidationError(msg) => AppError::ValidationError(msg),
        DoctorError::DatabaseError(msg) => AppError::Database(msg),
    }
}

/// Free slots for one doctor on one date. Advisory only: booking can still
/// return 409 if another client takes the slot first.
#[axum::debug_handler]
pub async fn get_doctor_slots(
    State(config): State<Arc<AppConfig>>,
    Query(query): Query<SlotsQuery>,
) -> Result<Json<Value>, AppError> {
    let service = AvailabilityService::new(&config);

    let availability = service
        .get_available_slots(query.doctor_id, query.date)
        .await
        .map_err(map_doctor_error)?;

    Ok(Json(json!(availability)))
}

#[axum::debug_handler]
pub async fn list_departments(
    State(config): State<Arc<AppConfig>>,
) -> Result<Json<Value>, AppError> {
    let service = DepartmentService::new(&config);

    let departments = service.list_departments().await.map_err(map_doctor_error)?;

    Ok(Json(json!(departments)))
}

#[axum::debug_handler]
pub async fn create_department(
    State(config): State<Arc<AppConfig>>,
    Json(request): Json<CreateDepartmentRequest>,
) -> Result<Json<Value>, AppError> {
    let service = DepartmentService::new(&config);

    let department = service
        .create_department(request)
        .await
        .map_err(map_doctor_error)?;

    Ok(Json(json!(department)))
}

#[axum::debug_handler]
pub async fn departments_with_doctors(
    State(config): State<Arc<AppConfig>>,
) -> Result<Json<Value>, AppError> {
    let service = DepartmentService::new(&config);

    let departments = service
        .departments_with_doctors()
        .await
        .map_err(map_doctor_error)?;

    Ok(Json(json!(departments)))
}

#[axum::debug_handler]
pub async fn doctors_by_department(
    State(config): State<Arc<AppConfig>>,
    Path(department_id): Path<Uuid>,
) -> Result<Json<Value>, AppError> {
    let service = DoctorService::new(&config);

    let doctors = service
        .doctors_by_department(department_id)
        .await
        .map_err(map_doctor_error)?;

    Ok(Json(json!(doctors)))
}

#[axum::debug_handler]
pub async fn list_doctors(State(config): State<Arc<AppConfig>>) -> Result<Json<Value>, AppError> {
    let service = DoctorService::new(&config);

    let doctors = service.list_doctors().await.map_err(map_doctor_error)?;

    Ok(Json(json!(doctors)))
}

#[axum::debug_handler]
pub async fn create_doctor(
    State(config): State<Arc<AppConfig>>,
    Json(request): Json<CreateDoctorRequest>,
) -> Result<Json<Value>, AppError> {
    let service = DoctorService::new(&config);

    let doctor = service.create_doctor(request).await.map_err(map_doctor_error)?;

    Ok(Json(json!(doctor)))
}

#[axum::debug_handler]
pub async fn update_doctor_schedule(
    State(config): State<Arc<AppConfig>>,
    Path(doctor_id): Path<Uuid>,
    Json(schedule): Json<WeeklySchedule>,
) -> Result<Json<Value>, AppError> {
    let service = DoctorService::new(&config);

    let doctor = service
        .update_schedule(doctor_id, schedule)
        .await
        .map_err(map_doctor_error)?;

    Ok(Json(json!(doctor)))
}
