use std::sync::Arc;

use chrono::NaiveDate;
use tracing::{debug, warn};
use uuid::Uuid;

use crate::models::{AppointmentError, ConflictCheckResponse, SlotKey};
use crate::services::store::AppointmentStore;

pub struct ConflictDetectionService {
    store: Arc<dyn AppointmentStore>,
}

impl ConflictDetectionService {
    pub fn new(store: Arc<dyn AppointmentStore>) -> Self {
        Self { store }
    }

    /// True when another blocking appointment already holds the slot.
    /// `exclude_appointment_id` keeps an appointment from conflicting with itself.
    pub async fn has_conflict(
        &self,
        doctor_id: Uuid,
        date: NaiveDate,
        time: &str,
        exclude_appointment_id: Option<Uuid>,
    ) -> Result<bool, AppointmentError> {
        let response = self
            .check_conflicts(&SlotKey::new(doctor_id, date, time), exclude_appointment_id)
            .await?;
        Ok(response.has_conflict)
    }

    pub async fn check_conflicts(
        &self,
        slot: &SlotKey,
        exclude_appointment_id: Option<Uuid>,
    ) -> Result<ConflictCheckResponse, AppointmentError> {
        debug!("Checking conflicts for slot {}", slot);

        let blocking = self.store.find_blocking(slot, exclude_appointment_id).await?;
        let conflicting_appointments: Vec<Uuid> = blocking.iter().map(|a| a.id).collect();
        let has_conflict = !conflicting_appointments.is_empty();

        if has_conflict {
            warn!("Conflict detected for slot {} - {} blocking appointments",
                  slot, conflicting_appointments.len());
        }

        Ok(ConflictCheckResponse {
            has_conflict,
            conflicting_appointments,
        })
    }
}
