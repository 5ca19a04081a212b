#![allow(dead_code)]

use std::sync::Arc;
use std::time::Duration;

use uuid::Uuid;

use appointment_cell::models::CreateAppointmentRequest;
use appointment_cell::services::InMemoryAppointmentStore;
use appointment_cell::{AppointmentBookingService, Collaborators};
use doctor_cell::models::{Availability, Doctor, Hospital, UserRecord};
use doctor_cell::services::{DoctorDirectory, InMemoryDirectory};
use performance_cell::{CacheService, CacheStore};
use shared_models::auth::{CallerIdentity, Role};

/// 2024-01-01 was a Monday.
pub const MONDAY: &str = "2024-01-01";
pub const TUESDAY: &str = "2024-01-02";
pub const NEXT_MONDAY: &str = "2024-01-08";
pub const SLOT: &str = "10:00-11:00";
pub const LATE_SLOT: &str = "14:00-15:00";

pub struct Fixture {
    pub directory: Arc<InMemoryDirectory>,
    pub store: Arc<InMemoryAppointmentStore>,
    pub cache: Arc<CacheService>,
    pub service: Arc<AppointmentBookingService>,
}

impl Fixture {
    pub fn new() -> Self {
        Self::with_cache(Arc::new(CacheService::in_memory()))
    }

    /// Wires the service to an arbitrary cache backend; `cache` still
    /// counts through a fresh in-memory service for inspection.
    pub fn with_cache_backend(backend: Arc<dyn CacheStore>) -> Self {
        Self::with_cache(Arc::new(CacheService::new(backend)))
    }

    /// A second service over the same store and cache, looking doctors up
    /// through `doctors` instead of the fixture's directory.
    pub fn service_with_doctors(&self, doctors: Arc<dyn DoctorDirectory>) -> Arc<AppointmentBookingService> {
        Arc::new(AppointmentBookingService::new(Collaborators {
            store: self.store.clone(),
            doctors,
            users: self.directory.clone(),
            hospitals: self.directory.clone(),
            cache: self.cache.clone(),
            cache_ttl: Duration::from_secs(3600),
        }))
    }

    fn with_cache(cache: Arc<CacheService>) -> Self {
        let directory = Arc::new(InMemoryDirectory::new());
        let store = Arc::new(InMemoryAppointmentStore::new());

        let service = AppointmentBookingService::new(Collaborators {
            store: store.clone(),
            doctors: directory.clone(),
            users: directory.clone(),
            hospitals: directory.clone(),
            cache: cache.clone(),
            cache_ttl: Duration::from_secs(3600),
        });

        Self {
            directory,
            store,
            cache,
            service: Arc::new(service),
        }
    }

    pub async fn user(&self, name: &str, role: Role) -> CallerIdentity {
        let id = Uuid::new_v4();
        self.directory
            .insert_user(UserRecord {
                id,
                name: name.to_string(),
                email: format!("{}@example.com", id),
                role,
                phone: None,
                address: None,
            })
            .await;
        CallerIdentity::new(id, role)
    }

    pub async fn patient(&self, name: &str) -> CallerIdentity {
        self.user(name, Role::Patient).await
    }

    pub async fn admin(&self) -> CallerIdentity {
        self.user("Admin", Role::Admin).await
    }

    pub async fn hospital(&self, name: &str) -> Uuid {
        let id = Uuid::new_v4();
        self.directory
            .insert_hospital(Hospital {
                id,
                name: name.to_string(),
                address: None,
                contact_number: None,
                departments: Default::default(),
            })
            .await;
        id
    }

    /// A doctor account plus its profile, available on the given days and slots.
    pub async fn doctor(
        &self,
        name: &str,
        days: &[&str],
        slots: &[&str],
        hospital_id: Option<Uuid>,
    ) -> (CallerIdentity, Doctor) {
        let caller = self.user(name, Role::Doctor).await;
        let doctor = Doctor {
            id: Uuid::new_v4(),
            user_id: caller.user_id,
            specialities: Default::default(),
            qualifications: Default::default(),
            hospital_id,
            availability: Availability::new(days.iter().copied(), slots.iter().copied()),
        };
        self.directory.insert_doctor(doctor.clone()).await;
        (caller, doctor)
    }

    pub async fn monday_doctor(&self, name: &str) -> (CallerIdentity, Doctor) {
        self.doctor(name, &["Monday"], &[SLOT, LATE_SLOT], None).await
    }
}

pub fn booking(patient: &CallerIdentity, doctor: &Doctor, date: &str, time: &str) -> CreateAppointmentRequest {
    CreateAppointmentRequest {
        patient_id: patient.user_id,
        doctor_id: doctor.id,
        date: date.to_string(),
        time: time.to_string(),
    }
}
