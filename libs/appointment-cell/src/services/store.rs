use std::collections::HashMap;

use async_trait::async_trait;
use thiserror::Error;
use tokio::sync::RwLock;
use uuid::Uuid;

use crate::models::{Appointment, AppointmentError, AppointmentFilter, AppointmentStatus, SlotKey};

#[derive(Debug, Error)]
pub enum StoreError {
    /// The write would leave two blocking appointments on one slot.
    #[error("Slot already holds a blocking appointment")]
    SlotTaken,

    #[error("Appointment {0} not found")]
    NotFound(Uuid),

    /// The stored row no longer has the status the write was based on.
    #[error("Appointment {id} is no longer {expected}")]
    Stale { id: Uuid, expected: AppointmentStatus },

    #[error("Persistence backend error: {0}")]
    Backend(String),

    #[error("Malformed appointment record: {0}")]
    Malformed(String),
}

impl From<StoreError> for AppointmentError {
    fn from(error: StoreError) -> Self {
        match error {
            StoreError::SlotTaken => AppointmentError::ConflictDetected,
            StoreError::NotFound(_) => AppointmentError::NotFound,
            StoreError::Stale { .. } => AppointmentError::ConcurrentModification,
            StoreError::Backend(msg) | StoreError::Malformed(msg) => AppointmentError::DatabaseError(msg),
        }
    }
}

/// Appointment persistence. Implementations must refuse any write that
/// would leave more than one blocking appointment on a slot.
#[async_trait]
pub trait AppointmentStore: Send + Sync {
    async fn get(&self, appointment_id: Uuid) -> Result<Option<Appointment>, StoreError>;

    /// Blocking appointments on `slot`, other than `exclude`.
    async fn find_blocking(&self, slot: &SlotKey, exclude: Option<Uuid>) -> Result<Vec<Appointment>, StoreError>;

    async fn insert(&self, appointment: Appointment) -> Result<Appointment, StoreError>;

    /// Replaces the stored record with the same id, provided its status is
    /// still `expected`. Otherwise fails with `Stale` and writes nothing.
    async fn update(&self, appointment: Appointment, expected: AppointmentStatus) -> Result<Appointment, StoreError>;

    /// Matching appointments ordered by date, then slot label.
    async fn query(&self, filter: &AppointmentFilter) -> Result<Vec<Appointment>, StoreError>;
}

#[derive(Default)]
pub struct InMemoryAppointmentStore {
    appointments: RwLock<HashMap<Uuid, Appointment>>,
}

impl InMemoryAppointmentStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub async fn len(&self) -> usize {
        self.appointments.read().await.len()
    }

    fn slot_taken(appointments: &HashMap<Uuid, Appointment>, candidate: &Appointment) -> bool {
        candidate.is_blocking()
            && appointments.values().any(|existing| {
                existing.id != candidate.id
                    && existing.is_blocking()
                    && existing.slot() == candidate.slot()
            })
    }
}

#[async_trait]
impl AppointmentStore for InMemoryAppointmentStore {
    async fn get(&self, appointment_id: Uuid) -> Result<Option<Appointment>, StoreError> {
        Ok(self.appointments.read().await.get(&appointment_id).cloned())
    }

    async fn find_blocking(&self, slot: &SlotKey, exclude: Option<Uuid>) -> Result<Vec<Appointment>, StoreError> {
        Ok(self
            .appointments
            .read()
            .await
            .values()
            .filter(|a| a.is_blocking() && &a.slot() == slot && Some(a.id) != exclude)
            .cloned()
            .collect())
    }

    async fn insert(&self, appointment: Appointment) -> Result<Appointment, StoreError> {
        let mut appointments = self.appointments.write().await;
        if Self::slot_taken(&appointments, &appointment) {
            return Err(StoreError::SlotTaken);
        }
        appointments.insert(appointment.id, appointment.clone());
        Ok(appointment)
    }

    async fn update(&self, appointment: Appointment, expected: AppointmentStatus) -> Result<Appointment, StoreError> {
        let mut appointments = self.appointments.write().await;
        match appointments.get(&appointment.id) {
            None => return Err(StoreError::NotFound(appointment.id)),
            Some(stored) if stored.status != expected => {
                return Err(StoreError::Stale { id: appointment.id, expected });
            }
            Some(_) => {}
        }
        if Self::slot_taken(&appointments, &appointment) {
            return Err(StoreError::SlotTaken);
        }
        appointments.insert(appointment.id, appointment.clone());
        Ok(appointment)
    }

    async fn query(&self, filter: &AppointmentFilter) -> Result<Vec<Appointment>, StoreError> {
        let mut matching: Vec<Appointment> = self
            .appointments
            .read()
            .await
            .values()
            .filter(|a| filter.matches(a))
            .cloned()
            .collect();
        matching.sort_by(|a, b| (a.date, &a.time).cmp(&(b.date, &b.time)));
        Ok(matching)
    }
}
