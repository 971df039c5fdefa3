// libs/doctor-cell/src/models.rs
use chrono::{DateTime, Datelike, Duration, NaiveDate, Utc, Weekday};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// A time-of-day interval such as 09:00-09:30. In a weekly schedule it is a
/// recurring template; on an appointment it is the reserved instance.
/// Start and end are stored as entered; no ordering between them is enforced.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Slot {
    pub start: String,
    pub end: String,
}

/// A doctor's recurring weekly availability, one template list per weekday.
/// Using named fields rather than a string-keyed map means every consumer
/// has to handle all seven days.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct WeeklySchedule {
    #[serde(default)]
    pub monday: Vec<Slot>,
    #[serde(default)]
    pub tuesday: Vec<Slot>,
    #[serde(default)]
    pub wednesday: Vec<Slot>,
    #[serde(default)]
    pub thursday: Vec<Slot>,
    #[serde(default)]
    pub friday: Vec<Slot>,
    #[serde(default)]
    pub saturday: Vec<Slot>,
    #[serde(default)]
    pub sunday: Vec<Slot>,
}

impl WeeklySchedule {
    pub fn for_day(&self, day: Weekday) -> &[Slot] {
        match day {
            Weekday::Mon => &self.monday,
            Weekday::Tue => &self.tuesday,
            Weekday::Wed => &self.wednesday,
            Weekday::Thu => &self.thursday,
            Weekday::Fri => &self.friday,
            Weekday::Sat => &self.saturday,
            Weekday::Sun => &self.sunday,
        }
    }

    /// First calendar date after `from` (up to 14 days ahead) whose weekday
    /// template is non-empty. Used only when the queried day has no template
    /// at all; a fully booked day never triggers this suggestion.
    pub fn next_open_day(&self, from: NaiveDate) -> Option<NaiveDate> {
        (1..=14)
            .map(|i| from + Duration::days(i))
            .find(|d| !self.for_day(d.weekday()).is_empty())
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Doctor {
    pub id: Uuid,
    pub name: String,
    pub department_id: Uuid,
    pub schedule: WeeklySchedule,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub department: Option<DepartmentName>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Embedded department name for enriched listings.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DepartmentName {
    pub name: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Department {
    pub id: Uuid,
    pub name: String,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DepartmentWithDoctors {
    pub id: Uuid,
    pub name: String,
    pub doctors: Vec<Doctor>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct CreateDoctorRequest {
    pub name: String,
    pub department_id: Uuid,
}

#[derive(Debug, Clone, Deserialize)]
pub struct CreateDepartmentRequest {
    pub name: String,
}

/// Result of the availability calculation for one doctor and date.
#[derive(Debug, Clone, Serialize)]
#[serde(untagged)]
pub enum SlotAvailability {
    /// The weekday has a template; slots are the unbooked remainder,
    /// template order preserved.
    Open { available_slots: Vec<Slot> },
    /// The weekday has no template at all. `next_available_date` is the
    /// nearest open day within two weeks, if any.
    Closed {
        available_slots: Vec<Slot>,
        next_available_date: Option<NaiveDate>,
    },
}

#[derive(Debug, Clone, thiserror::Error)]
pub enum DoctorError {
    #[error("Doctor not found")]
    NotFound,

    #[error("Department not found")]
    DepartmentNotFound,

    #[error("Validation error: {0}")]
    ValidationError(String),

    #[error("Database error: {0}")]
    DatabaseError(String),
}
