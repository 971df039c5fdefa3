// libs/appointment-cell/src/services/admin.rs
use chrono::Utc;
use reqwest::Method;
use serde_json::{json, Value};
use tracing::{debug, info};
use uuid::Uuid;

use shared_config::AppConfig;
use shared_database::supabase::{SupabaseClient, SupabaseError};
use shared_utils::week::week_start;

use crate::models::{Appointment, AppointmentError, UpdateAppointmentRequest};

/// Administrative appointment management: listing, status updates,
/// deletion. These paths do not re-run booking validation; the unique
/// index still applies to any write that moves a reservation.
pub struct AppointmentAdminService {
    supabase: SupabaseClient,
}

impl AppointmentAdminService {
    pub fn new(config: &AppConfig) -> Self {
        Self {
            supabase: SupabaseClient::new(config),
        }
    }

    /// All appointments with doctor, department, and patient details
    /// embedded, newest first.
    pub async fn list_appointments(&self) -> Result<Vec<Appointment>, AppointmentError> {
        debug!("Fetching all appointments");

        let path = "/rest/v1/appointments?select=*,doctor:doctors(name,department:departments(name)),patient:patients(name,guardian_name,phone)&order=appointment_date.desc";
        let result: Vec<Value> = self
            .supabase
            .request(Method::GET, path, None)
            .await
            .map_err(|e| AppointmentError::DatabaseError(e.to_string()))?;

        let appointments = result
            .into_iter()
            .map(serde_json::from_value)
            .collect::<Result<Vec<Appointment>, _>>()
            .map_err(|e| AppointmentError::DatabaseError(format!("Failed to parse appointments: {}", e)))?;

        debug!("Fetched {} appointments", appointments.len());
        Ok(appointments)
    }

    pub async fn update_appointment(
        &self,
        appointment_id: Uuid,
        request: UpdateAppointmentRequest,
    ) -> Result<Appointment, AppointmentError> {
        debug!("Updating appointment {}", appointment_id);

        let mut update_data = serde_json::Map::new();

        if let Some(status) = request.status {
            update_data.insert("status".to_string(), json!(status.to_string()));
        }
        if let Some(date) = request.date {
            // Moving the date moves the week partition with it, through the
            // same derivation the booking path uses.
            update_data.insert("appointment_date".to_string(), json!(date));
            update_data.insert(
                "week_start".to_string(),
                json!(week_start(date).format("%Y-%m-%dT%H:%M:%S").to_string()),
            );
        }
        if let Some(slot) = request.slot {
            update_data.insert("slot_start".to_string(), json!(slot.start));
            update_data.insert("slot_end".to_string(), json!(slot.end));
        }
        update_data.insert("updated_at".to_string(), json!(Utc::now().to_rfc3339()));

        let path = format!("/rest/v1/appointments?id=eq.{}", appointment_id);
        let mut headers = reqwest::header::HeaderMap::new();
        headers.insert("Prefer", reqwest::header::HeaderValue::from_static("return=representation"));

        let result: Vec<Value> = self
            .supabase
            .request_with_headers(Method::PATCH, &path, Some(Value::Object(update_data)), Some(headers))
            .await
            .map_err(|e| match e {
                SupabaseError::UniqueViolation(_) => AppointmentError::SlotAlreadyBooked,
                other => AppointmentError::DatabaseError(other.to_string()),
            })?;

        if result.is_empty() {
            return Err(AppointmentError::NotFound);
        }

        let appointment: Appointment = serde_json::from_value(result[0].clone())
            .map_err(|e| AppointmentError::DatabaseError(format!("Failed to parse appointment: {}", e)))?;

        info!("Appointment {} updated", appointment_id);
        Ok(appointment)
    }

    pub async fn delete_appointment(&self, appointment_id: Uuid) -> Result<(), AppointmentError> {
        debug!("Deleting appointment {}", appointment_id);

        let path = format!("/rest/v1/appointments?id=eq.{}", appointment_id);
        let mut headers = reqwest::header::HeaderMap::new();
        headers.insert("Prefer", reqwest::header::HeaderValue::from_static("return=representation"));

        let deleted: Vec<Value> = self
            .supabase
            .request_with_headers(Method::DELETE, &path, None, Some(headers))
            .await
            .map_err(|e| AppointmentError::DatabaseError(e.to_string()))?;

        if deleted.is_empty() {
            return Err(AppointmentError::NotFound);
        }

        info!("Appointment {} deleted", appointment_id);
        Ok(())
    }
}
