// libs/appointment-cell/src/services/booking.rs
use std::sync::Arc;
use std::time::Duration;

use chrono::{NaiveDate, Utc};
use tracing::{debug, info, warn};
use uuid::Uuid;

use doctor_cell::models::Doctor;
use doctor_cell::services::{
    parse_date, weekday_name, DoctorDirectory, HospitalDirectory, SupabaseDirectory, UserDirectory,
};
use performance_cell::CacheStore;
use shared_config::AppConfig;
use shared_models::auth::{CallerIdentity, Role};

use crate::models::{
    Appointment, AppointmentError, AppointmentListing, AppointmentQueryParams, AppointmentStatus,
    AppointmentView, BookingOutcome, ConflictCheckQuery, ConflictCheckResponse,
    CreateAppointmentRequest, SlotKey, TransferAppointmentRequest, UpdateAppointmentRequest,
};
use crate::services::conflict::ConflictDetectionService;
use crate::services::lifecycle::AppointmentLifecycleService;
use crate::services::policy::{authorize, Action, Ownership};
use crate::services::query::AppointmentQueryService;
use crate::services::slot_lock::SlotLocks;
use crate::services::store::AppointmentStore;
use crate::services::supabase_store::SupabaseAppointmentStore;
use crate::services::view::AppointmentViewResolver;

/// Everything the booking core consumes from the outside.
#[derive(Clone)]
pub struct Collaborators {
    pub store: Arc<dyn AppointmentStore>,
    pub doctors: Arc<dyn DoctorDirectory>,
    pub users: Arc<dyn UserDirectory>,
    pub hospitals: Arc<dyn HospitalDirectory>,
    pub cache: Arc<dyn CacheStore>,
    pub cache_ttl: Duration,
}

impl Collaborators {
    /// Supabase-backed persistence and directories.
    pub fn from_config(config: &AppConfig, cache: Arc<dyn CacheStore>) -> Self {
        let directory = Arc::new(SupabaseDirectory::new(config));
        Self {
            store: Arc::new(SupabaseAppointmentStore::new(config)),
            doctors: directory.clone(),
            users: directory.clone(),
            hospitals: directory,
            cache,
            cache_ttl: Duration::from_secs(config.appointment_cache_ttl_seconds),
        }
    }
}

/// A fully validated target slot.
struct ValidatedSlot {
    doctor: Doctor,
    date: NaiveDate,
    time: String,
}

impl ValidatedSlot {
    fn key(&self) -> SlotKey {
        SlotKey::new(self.doctor.id, self.date, &self.time)
    }
}

pub struct AppointmentBookingService {
    store: Arc<dyn AppointmentStore>,
    doctors: Arc<dyn DoctorDirectory>,
    users: Arc<dyn UserDirectory>,
    conflict_service: ConflictDetectionService,
    lifecycle_service: AppointmentLifecycleService,
    query_service: AppointmentQueryService,
    resolver: AppointmentViewResolver,
    slot_locks: SlotLocks,
}

impl AppointmentBookingService {
    pub fn new(collaborators: Collaborators) -> Self {
        let Collaborators { store, doctors, users, hospitals, cache, cache_ttl } = collaborators;

        let resolver = AppointmentViewResolver::new(doctors.clone(), users.clone(), hospitals);
        let query_service = AppointmentQueryService::new(
            store.clone(),
            doctors.clone(),
            resolver.clone(),
            cache,
            cache_ttl,
        );

        Self {
            conflict_service: ConflictDetectionService::new(store.clone()),
            lifecycle_service: AppointmentLifecycleService::new(),
            query_service,
            resolver,
            slot_locks: SlotLocks::new(),
            store,
            doctors,
            users,
        }
    }

    pub fn from_config(config: &AppConfig, cache: Arc<dyn CacheStore>) -> Self {
        Self::new(Collaborators::from_config(config, cache))
    }

    pub fn slot_locks(&self) -> &SlotLocks {
        &self.slot_locks
    }

    // ==============================================================================
    // WRITES
    // ==============================================================================

    /// Book a new appointment for a patient. The conflict check and the
    /// insert run under the slot's lock.
    pub async fn create_appointment(
        &self,
        request: CreateAppointmentRequest,
        caller: &CallerIdentity,
    ) -> Result<BookingOutcome, AppointmentError> {
        info!("Booking appointment for patient {} with doctor {} on {} at {}",
              request.patient_id, request.doctor_id, request.date, request.time);

        authorize(caller, Action::Create, Ownership::default())?;

        self.verify_patient(request.patient_id).await?;
        let doctor = self.resolve_doctor(request.doctor_id).await?;
        let date = parse_requested_date(&request.date)?;
        let slot = self.validate_availability(doctor, date, &request.time)?;

        let _guard = self.slot_locks.acquire(slot.key()).await;
        self.ensure_slot_free(&slot, None).await?;

        let now = Utc::now();
        let appointment = Appointment {
            id: Uuid::new_v4(),
            patient_id: request.patient_id,
            doctor_id: slot.doctor.id,
            date: slot.date,
            day: weekday_name(slot.date).to_string(),
            time: slot.time.clone(),
            status: AppointmentStatus::Upcoming,
            transferred_to: None,
            created_at: now,
            updated_at: now,
        };

        let appointment = self.store.insert(appointment).await?;
        info!("Appointment {} booked for slot {}", appointment.id, appointment.slot());

        Ok(self.committed(&appointment).await)
    }

    /// Partial update by an admin or the owning patient. Slot fields that
    /// are absent fall back to the current values; any slot change is
    /// re-validated against the target doctor.
    pub async fn update_appointment(
        &self,
        appointment_id: Uuid,
        request: UpdateAppointmentRequest,
        caller: &CallerIdentity,
    ) -> Result<BookingOutcome, AppointmentError> {
        debug!("Updating appointment: {}", appointment_id);

        let current = self.get_existing(appointment_id).await?;
        let ownership = self.ownership(caller, &current).await?;
        authorize(caller, Action::Update, ownership)?;

        let new_status = match request.status {
            Some(status) => {
                authorize(caller, Action::SetStatus(status), ownership)?;
                self.lifecycle_service.validate_status_transition(current.status, status)?;
                status
            }
            None => current.status,
        };

        let mut updated = current.clone();
        updated.status = new_status;
        updated.updated_at = Utc::now();

        if !request.touches_slot() {
            let updated = self.store.update(updated, current.status).await?;
            info!("Appointment {} updated", updated.id);
            return Ok(self.committed(&updated).await);
        }

        self.lifecycle_service.ensure_reschedulable(current.status)?;

        let doctor_id = request.doctor.unwrap_or(current.doctor_id);
        let date = match request.date.as_deref() {
            Some(raw) => parse_requested_date(raw)?,
            None => current.date,
        };
        let time = request.time.as_deref().unwrap_or(&current.time);

        let doctor = self.resolve_doctor(doctor_id).await?;
        let slot = self.validate_availability(doctor, date, time)?;

        let _guard = self.slot_locks.acquire(slot.key()).await;
        if new_status.is_blocking() {
            self.ensure_slot_free(&slot, Some(current.id)).await?;
        }

        updated.doctor_id = slot.doctor.id;
        updated.date = slot.date;
        updated.day = weekday_name(slot.date).to_string();
        updated.time = slot.time.clone();

        let updated = self.store.update(updated, current.status).await?;
        info!("Appointment {} moved to slot {}", updated.id, updated.slot());

        Ok(self.committed(&updated).await)
    }

    /// Cancel an upcoming appointment. Cancelling a finished or already
    /// cancelled appointment is rejected.
    pub async fn cancel_appointment(
        &self,
        appointment_id: Uuid,
        caller: &CallerIdentity,
    ) -> Result<BookingOutcome, AppointmentError> {
        let current = self.get_existing(appointment_id).await?;
        let ownership = self.ownership(caller, &current).await?;
        authorize(caller, Action::Cancel, ownership)?;

        self.lifecycle_service
            .validate_status_transition(current.status, AppointmentStatus::Canceled)?;

        let read_status = current.status;
        let mut canceled = current;
        canceled.status = AppointmentStatus::Canceled;
        canceled.updated_at = Utc::now();

        let canceled = self.store.update(canceled, read_status).await?;
        info!("Appointment {} canceled by {} {}", canceled.id, caller.role, caller.user_id);

        Ok(self.committed(&canceled).await)
    }

    pub async fn update_appointment_status(
        &self,
        appointment_id: Uuid,
        status: AppointmentStatus,
        caller: &CallerIdentity,
    ) -> Result<BookingOutcome, AppointmentError> {
        let current = self.get_existing(appointment_id).await?;
        let ownership = self.ownership(caller, &current).await?;
        authorize(caller, Action::SetStatus(status), ownership)?;

        self.lifecycle_service.validate_status_transition(current.status, status)?;

        if current.status == status {
            debug!("Appointment {} already {}", current.id, status);
            return Ok(BookingOutcome {
                appointment: self.resolver.resolve(&current).await,
                cache_degraded: false,
            });
        }

        let read_status = current.status;
        let mut updated = current;
        updated.status = status;
        updated.updated_at = Utc::now();

        let updated = self.store.update(updated, read_status).await?;
        info!("Appointment {} status set to {}", updated.id, status);

        Ok(self.committed(&updated).await)
    }

    /// Reassign an upcoming appointment to a different doctor. The record is
    /// mutated in place and stamped with `transferred_to`. Every write here
    /// is conditional on the status read at the start, so a concurrent
    /// cancel is never overwritten.
    pub async fn transfer_appointment(
        &self,
        appointment_id: Uuid,
        request: TransferAppointmentRequest,
        caller: &CallerIdentity,
    ) -> Result<BookingOutcome, AppointmentError> {
        let current = self.get_existing(appointment_id).await?;
        let ownership = self.ownership(caller, &current).await?;
        authorize(caller, Action::Transfer, ownership)?;

        self.lifecycle_service.ensure_reschedulable(current.status)?;

        if request.new_doctor_id == current.doctor_id {
            return Err(AppointmentError::ValidationError(
                "Appointment is already with this doctor".to_string(),
            ));
        }

        let doctor = self.resolve_doctor(request.new_doctor_id).await?;
        let date = match request.date.as_deref() {
            Some(raw) => parse_requested_date(raw)?,
            None => current.date,
        };
        let time = request.time.as_deref().unwrap_or(&current.time);
        let slot = self.validate_availability(doctor, date, time)?;

        let _guard = self.slot_locks.acquire(slot.key()).await;
        self.ensure_slot_free(&slot, Some(current.id)).await?;

        let read_status = current.status;
        let mut transferred = current;
        transferred.doctor_id = slot.doctor.id;
        transferred.date = slot.date;
        transferred.day = weekday_name(slot.date).to_string();
        transferred.time = slot.time.clone();
        transferred.status = AppointmentStatus::Upcoming;
        transferred.transferred_to = Some(slot.doctor.id);
        transferred.updated_at = Utc::now();

        let transferred = self.store.update(transferred, read_status).await?;
        info!("Appointment {} transferred to doctor {}", transferred.id, slot.doctor.id);

        Ok(self.committed(&transferred).await)
    }

    // ==============================================================================
    // READS
    // ==============================================================================

    pub async fn get_appointment(
        &self,
        appointment_id: Uuid,
        caller: &CallerIdentity,
    ) -> Result<AppointmentView, AppointmentError> {
        let appointment = self.get_existing(appointment_id).await?;
        let ownership = self.ownership(caller, &appointment).await?;
        authorize(caller, Action::View, ownership)?;

        Ok(self.resolver.resolve(&appointment).await)
    }

    pub async fn retrieve_appointments(
        &self,
        caller: &CallerIdentity,
        params: AppointmentQueryParams,
    ) -> Result<AppointmentListing, AppointmentError> {
        self.query_service.retrieve(caller, params).await
    }

    /// Read-only probe; takes no lock, so the answer may be stale by the
    /// time a booking is attempted.
    pub async fn check_conflicts(
        &self,
        query: ConflictCheckQuery,
    ) -> Result<ConflictCheckResponse, AppointmentError> {
        let date = parse_requested_date(&query.date)?;
        self.conflict_service
            .check_conflicts(&SlotKey::new(query.doctor_id, date, &query.time), query.exclude_appointment_id)
            .await
    }

    // ==============================================================================
    // HELPERS
    // ==============================================================================

    async fn get_existing(&self, appointment_id: Uuid) -> Result<Appointment, AppointmentError> {
        self.store
            .get(appointment_id)
            .await?
            .ok_or(AppointmentError::NotFound)
    }

    async fn verify_patient(&self, patient_id: Uuid) -> Result<(), AppointmentError> {
        match self.users.get_user(patient_id).await? {
            Some(user) if user.role == Role::Patient => Ok(()),
            Some(user) => {
                warn!("User {} is a {}, not a patient", patient_id, user.role);
                Err(AppointmentError::InvalidPatient)
            }
            None => {
                warn!("Patient {} not found", patient_id);
                Err(AppointmentError::InvalidPatient)
            }
        }
    }

    async fn resolve_doctor(&self, doctor_id: Uuid) -> Result<Doctor, AppointmentError> {
        self.doctors
            .get_doctor(doctor_id)
            .await?
            .ok_or_else(|| {
                warn!("Doctor {} not found", doctor_id);
                AppointmentError::DoctorNotFound
            })
    }

    fn validate_availability(
        &self,
        doctor: Doctor,
        date: NaiveDate,
        time: &str,
    ) -> Result<ValidatedSlot, AppointmentError> {
        let time = time.trim();
        if time.is_empty() {
            return Err(AppointmentError::ValidationError("Time slot is required".to_string()));
        }

        if !doctor.availability.accepts(date, time) {
            warn!("Doctor {} does not take bookings on {} ({}) at {}",
                  doctor.id, date, weekday_name(date), time);
            return Err(AppointmentError::DoctorNotAvailable);
        }

        Ok(ValidatedSlot {
            doctor,
            date,
            time: time.to_string(),
        })
    }

    async fn ensure_slot_free(
        &self,
        slot: &ValidatedSlot,
        exclude_appointment_id: Option<Uuid>,
    ) -> Result<(), AppointmentError> {
        if self
            .conflict_service
            .has_conflict(slot.doctor.id, slot.date, &slot.time, exclude_appointment_id)
            .await?
        {
            return Err(AppointmentError::ConflictDetected);
        }
        Ok(())
    }

    async fn ownership(
        &self,
        caller: &CallerIdentity,
        appointment: &Appointment,
    ) -> Result<Ownership, AppointmentError> {
        let is_doctor = match caller.role {
            Role::Doctor => self
                .doctors
                .find_doctor_by_user(caller.user_id)
                .await?
                .is_some_and(|doctor| doctor.id == appointment.doctor_id),
            _ => false,
        };

        Ok(Ownership {
            is_patient: appointment.patient_id == caller.user_id,
            is_doctor,
        })
    }

    /// Post-commit work: invalidate cached listings and build the response
    /// view. Neither step can fail the committed write.
    async fn committed(&self, appointment: &Appointment) -> BookingOutcome {
        let cache_ok = self.query_service.invalidate().await;
        BookingOutcome {
            appointment: self.resolver.resolve(appointment).await,
            cache_degraded: !cache_ok,
        }
    }
}

fn parse_requested_date(raw: &str) -> Result<NaiveDate, AppointmentError> {
    parse_date(raw).ok_or_else(|| {
        warn!("Rejecting malformed date {:?}", raw);
        AppointmentError::InvalidDate(raw.to_string())
    })
}
