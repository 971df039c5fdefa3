// libs/appointment-cell/src/services/reservation.rs
use chrono::Utc;
use reqwest::Method;
use serde_json::{json, Value};
use tracing::{info, warn};
use uuid::Uuid;

use shared_config::AppConfig;
use shared_database::supabase::{SupabaseClient, SupabaseError};
use shared_utils::week::week_start;

use crate::models::{Appointment, AppointmentError, AppointmentStatus, BookAppointmentRequest};

/// The slot reservation protocol. There is deliberately no "is this slot
/// taken" pre-check: two clients may both see a slot as free, and the
/// composite unique index on (doctor_id, week_start, appointment_date,
/// slot_start) decides the winner at commit time. The loser gets a 409.
pub struct ReservationService {
    supabase: SupabaseClient,
}

impl ReservationService {
    pub fn new(config: &AppConfig) -> Self {
        Self {
            supabase: SupabaseClient::new(config),
        }
    }

    pub async fn book_appointment(
        &self,
        request: BookAppointmentRequest,
    ) -> Result<Appointment, AppointmentError> {
        validate_booking_request(&request)?;

        let week = week_start(request.date);

        // A fresh patient record is created for every booking, repeat
        // visitors included. If the reservation below loses the race the
        // patient row is left behind; known limitation, kept as-is.
        let patient_id = self.create_patient_record(&request).await?;

        let appointment_data = json!({
            "doctor_id": request.doctor_id,
            "patient_id": patient_id,
            "appointment_date": request.date,
            "week_start": week.format("%Y-%m-%dT%H:%M:%S").to_string(),
            "slot_start": request.slot.start,
            "slot_end": request.slot.end,
            "status": AppointmentStatus::Booked.to_string(),
            "created_at": Utc::now().to_rfc3339(),
            "updated_at": Utc::now().to_rfc3339()
        });

        let mut headers = reqwest::header::HeaderMap::new();
        headers.insert("Prefer", reqwest::header::HeaderValue::from_static("return=representation"));

        let result: Vec<Value> = self
            .supabase
            .request_with_headers(Method::POST, "/rest/v1/appointments", Some(appointment_data), Some(headers))
            .await
            .map_err(|e| match e {
                SupabaseError::UniqueViolation(_) => {
                    warn!(
                        "Slot {} on {} for doctor {} lost the booking race",
                        request.slot.start, request.date, request.doctor_id
                    );
                    AppointmentError::SlotAlreadyBooked
                }
                other => AppointmentError::DatabaseError(other.to_string()),
            })?;

        if result.is_empty() {
            return Err(AppointmentError::DatabaseError("Failed to create appointment".to_string()));
        }

        let appointment: Appointment = serde_json::from_value(result[0].clone())
            .map_err(|e| AppointmentError::DatabaseError(format!("Failed to parse appointment: {}", e)))?;

        info!(
            "Appointment {} booked: doctor {} on {} at {}",
            appointment.id, appointment.doctor_id, appointment.appointment_date, appointment.slot_start
        );
        Ok(appointment)
    }

    async fn create_patient_record(
        &self,
        request: &BookAppointmentRequest,
    ) -> Result<Uuid, AppointmentError> {
        let patient_data = json!({
            "name": request.patient_name,
            "guardian_name": request.guardian_name,
            "phone": request.phone,
            "created_at": Utc::now().to_rfc3339(),
            "updated_at": Utc::now().to_rfc3339()
        });

        let mut headers = reqwest::header::HeaderMap::new();
        headers.insert("Prefer", reqwest::header::HeaderValue::from_static("return=representation"));

        let result: Vec<Value> = self
            .supabase
            .request_with_headers(Method::POST, "/rest/v1/patients", Some(patient_data), Some(headers))
            .await
            .map_err(|e| AppointmentError::DatabaseError(e.to_string()))?;

        let patient_id = result
            .first()
            .and_then(|row| row["id"].as_str())
            .and_then(|id| Uuid::parse_str(id).ok())
            .ok_or_else(|| AppointmentError::DatabaseError("Failed to create patient".to_string()))?;

        Ok(patient_id)
    }
}

/// Presence validation only. No side effects have happened yet when this
/// fails. Slot start/end ordering is intentionally not checked.
fn validate_booking_request(request: &BookAppointmentRequest) -> Result<(), AppointmentError> {
    if request.patient_name.trim().is_empty() {
        return Err(AppointmentError::MissingField("patient_name"));
    }
    if request.phone.trim().is_empty() {
        return Err(AppointmentError::MissingField("phone"));
    }
    if request.slot.start.trim().is_empty() {
        return Err(AppointmentError::MissingField("slot.start"));
    }
    if request.slot.end.trim().is_empty() {
        return Err(AppointmentError::MissingField("slot.end"));
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use assert_matches::assert_matches;
    use chrono::NaiveDate;
    use doctor_cell::models::Slot;

    fn request() -> BookAppointmentRequest {
        BookAppointmentRequest {
            doctor_id: Uuid::new_v4(),
            date: NaiveDate::from_ymd_opt(2025, 12, 8).unwrap(),
            slot: Slot {
                start: "09:00".to_string(),
                end: "09:30".to_string(),
            },
            patient_name: "Jane Doe".to_string(),
            guardian_name: None,
            phone: "0123456789".to_string(),
        }
    }

    #[test]
    fn complete_request_passes_validation() {
        assert!(validate_booking_request(&request()).is_ok());
    }

    #[test]
    fn blank_patient_name_is_rejected() {
        let mut req = request();
        req.patient_name = "   ".to_string();
        assert_matches!(
            validate_booking_request(&req),
            Err(AppointmentError::MissingField("patient_name"))
        );
    }

    #[test]
    fn blank_phone_is_rejected() {
        let mut req = request();
        req.phone = String::new();
        assert_matches!(
            validate_booking_request(&req),
            Err(AppointmentError::MissingField("phone"))
        );
    }

    #[test]
    fn inverted_slot_times_are_accepted() {
        // start < end is deliberately not enforced.
        let mut req = request();
        req.slot = Slot {
            start: "10:00".to_string(),
            end: "09:00".to_string(),
        };
        assert!(validate_booking_request(&req).is_ok());
    }
}
