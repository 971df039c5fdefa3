// libs/appointment-cell/src/models.rs
use chrono::{DateTime, NaiveDate, NaiveDateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use doctor_cell::models::Slot;

/// Lifecycle of a reservation. Creation always yields `Booked`; the other
/// two states are reached only through the admin update path.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum AppointmentStatus {
    Booked,
    Completed,
    Cancelled,
}

impl std::fmt::Display for AppointmentStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let s = match self {
            AppointmentStatus::Booked => "booked",
            AppointmentStatus::Completed => "completed",
            AppointmentStatus::Cancelled => "cancelled",
        };
        write!(f, "{}", s)
    }
}

/// A committed reservation. The tuple (doctor_id, week_start,
/// appointment_date, slot_start) is covered by a unique index in the
/// database; that index, not application logic, is what makes double
/// booking impossible.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Appointment {
    pub id: Uuid,
    pub doctor_id: Uuid,
    pub patient_id: Uuid,
    pub appointment_date: NaiveDate,
    /// Monday 00:00:00 of the week containing `appointment_date`. Derived,
    /// never client-supplied; scopes the uniqueness index per week.
    pub week_start: NaiveDateTime,
    pub slot_start: String,
    pub slot_end: String,
    pub status: AppointmentStatus,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub doctor: Option<DoctorRef>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub patient: Option<PatientRef>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Embedded doctor fields on enriched admin listings.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DoctorRef {
    pub name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub department: Option<DepartmentRef>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DepartmentRef {
    pub name: String,
}

/// Embedded patient fields on enriched admin listings.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PatientRef {
    pub name: String,
    pub guardian_name: Option<String>,
    pub phone: String,
}

#[derive(Debug, Clone, Deserialize)]
pub struct BookAppointmentRequest {
    pub doctor_id: Uuid,
    pub date: NaiveDate,
    pub slot: Slot,
    pub patient_name: String,
    pub guardian_name: Option<String>,
    pub phone: String,
}

/// Administrative patch. A date change recomputes `week_start` server-side
/// so the uniqueness partitioning can never drift from the booking path.
#[derive(Debug, Clone, Deserialize)]
pub struct UpdateAppointmentRequest {
    pub status: Option<AppointmentStatus>,
    pub date: Option<NaiveDate>,
    pub slot: Option<Slot>,
}

#[derive(Debug, Clone, thiserror::Error)]
pub enum AppointmentError {
    #[error("This slot is already booked")]
    SlotAlreadyBooked,

    #[error("Appointment not found")]
    NotFound,

    #[error("Missing required field: {0}")]
    MissingField(&'static str),

    #[error("Validation error: {0}")]
    ValidationError(String),

    #[error("Database error: {0}")]
    DatabaseError(String),
}
