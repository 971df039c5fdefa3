// libs/doctor-cell/src/services/availability.rs
use std::collections::HashSet;

use chrono::{Datelike, NaiveDate, NaiveDateTime, Utc};
use reqwest::Method;
use serde_json::Value;
use tracing::debug;
use uuid::Uuid;

use shared_config::AppConfig;
use shared_database::supabase::SupabaseClient;
use shared_utils::week::week_start;

use crate::models::{Doctor, DoctorError, Slot, SlotAvailability};

/// Computes free slots for a doctor on a given date. Read-only and advisory:
/// a slot reported free here can still lose the race at booking time, where
/// the unique index has the final word.
pub struct AvailabilityService {
    supabase: SupabaseClient,
}

impl AvailabilityService {
    pub fn new(config: &AppConfig) -> Self {
        Self {
            supabase: SupabaseClient::new(config),
        }
    }

    pub async fn get_available_slots(
        &self,
        doctor_id: Uuid,
        date: NaiveDate,
    ) -> Result<SlotAvailability, DoctorError> {
        debug!("Calculating available slots for doctor {} on {}", doctor_id, date);

        let doctor = self.fetch_doctor(doctor_id).await?;
        let template = doctor.schedule.for_day(date.weekday());

        if template.is_empty() {
            // No template for this weekday; suggest the nearest open day
            // within two weeks of today instead.
            let next = doctor.schedule.next_open_day(Utc::now().date_naive());
            return Ok(SlotAvailability::Closed {
                available_slots: vec![],
                next_available_date: next,
            });
        }

        let booked = self
            .booked_slot_starts(doctor_id, week_start(date), date)
            .await?;

        Ok(SlotAvailability::Open {
            available_slots: free_slots(template, &booked),
        })
    }

    async fn fetch_doctor(&self, doctor_id: Uuid) -> Result<Doctor, DoctorError> {
        let path = format!("/rest/v1/doctors?id=eq.{}", doctor_id);
        let result: Vec<Value> = self
            .supabase
            .request(Method::GET, &path, None)
            .await
            .map_err(|e| DoctorError::DatabaseError(e.to_string()))?;

        if result.is_empty() {
            return Err(DoctorError::NotFound);
        }

        serde_json::from_value(result[0].clone())
            .map_err(|e| DoctorError::DatabaseError(format!("Failed to parse doctor: {}", e)))
    }

    /// Start times already reserved for this doctor, week, and exact date.
    /// The week filter narrows the index scan and must use the same
    /// derivation as the booking write path.
    async fn booked_slot_starts(
        &self,
        doctor_id: Uuid,
        week: NaiveDateTime,
        date: NaiveDate,
    ) -> Result<HashSet<String>, DoctorError> {
        let week_param = urlencoding::encode(&week.format("%Y-%m-%dT%H:%M:%S").to_string()).into_owned();
        let path = format!(
            "/rest/v1/appointments?doctor_id=eq.{}&week_start=eq.{}&appointment_date=eq.{}&select=slot_start",
            doctor_id, week_param, date
        );

        let rows: Vec<Value> = self
            .supabase
            .request(Method::GET, &path, None)
            .await
            .map_err(|e| DoctorError::DatabaseError(e.to_string()))?;

        Ok(rows
            .iter()
            .filter_map(|row| row["slot_start"].as_str().map(String::from))
            .collect())
    }
}

/// Template slots whose start time is not in the booked set, in template order.
pub fn free_slots(template: &[Slot], booked: &HashSet<String>) -> Vec<Slot> {
    template
        .iter()
        .filter(|slot| !booked.contains(slot.start.as_str()))
        .cloned()
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn slot(start: &str, end: &str) -> Slot {
        Slot {
            start: start.to_string(),
            end: end.to_string(),
        }
    }

    #[test]
    fn free_slots_excludes_booked_starts() {
        let template = vec![slot("09:00", "09:30"), slot("09:30", "10:00")];
        let booked: HashSet<String> = ["09:00".to_string()].into();

        let free = free_slots(&template, &booked);
        assert_eq!(free, vec![slot("09:30", "10:00")]);
    }

    #[test]
    fn free_slots_preserves_template_order() {
        let template = vec![
            slot("11:00", "11:30"),
            slot("09:00", "09:30"),
            slot("10:00", "10:30"),
        ];
        let booked: HashSet<String> = ["09:00".to_string()].into();

        let free = free_slots(&template, &booked);
        assert_eq!(free[0].start, "11:00");
        assert_eq!(free[1].start, "10:00");
    }

    #[test]
    fn fully_booked_template_yields_no_slots() {
        let template = vec![slot("09:00", "09:30"), slot("09:30", "10:00")];
        let booked: HashSet<String> = ["09:00".to_string(), "09:30".to_string()].into();

        assert!(free_slots(&template, &booked).is_empty());
    }

    #[test]
    fn bookings_match_on_start_time_only() {
        // A booking with a different end time still blocks the template slot.
        let template = vec![slot("09:00", "09:30")];
        let booked: HashSet<String> = ["09:00".to_string()].into();

        assert!(free_slots(&template, &booked).is_empty());
    }
}
