// libs/appointment-cell/src/models.rs
use std::fmt;

use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use thiserror::Error;
use uuid::Uuid;

use doctor_cell::models::DirectoryError;
use shared_models::error::AppError;

// ==============================================================================
// CORE APPOINTMENT MODELS
// ==============================================================================

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Appointment {
    pub id: Uuid,
    pub patient_id: Uuid,
    pub doctor_id: Uuid,
    pub date: NaiveDate,
    /// Weekday name of `date`, recomputed on every write.
    pub day: String,
    /// Slot label, e.g. `"10:00-11:00"`.
    pub time: String,
    pub status: AppointmentStatus,
    pub transferred_to: Option<Uuid>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Appointment {
    pub fn slot(&self) -> SlotKey {
        SlotKey::new(self.doctor_id, self.date, &self.time)
    }

    pub fn is_blocking(&self) -> bool {
        self.status.is_blocking()
    }
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
pub enum AppointmentStatus {
    // "Scheduled" is the legacy name for the blocking status
    #[serde(alias = "upcoming", alias = "Scheduled", alias = "scheduled")]
    Upcoming,
    #[serde(alias = "done")]
    Done,
    #[serde(alias = "canceled", alias = "Cancelled", alias = "cancelled")]
    Canceled,
}

impl AppointmentStatus {
    /// Statuses that count toward slot exclusivity.
    pub const BLOCKING: [AppointmentStatus; 1] = [AppointmentStatus::Upcoming];

    pub fn is_blocking(&self) -> bool {
        Self::BLOCKING.contains(self)
    }

    pub fn is_terminal(&self) -> bool {
        matches!(self, AppointmentStatus::Done | AppointmentStatus::Canceled)
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            AppointmentStatus::Upcoming => "Upcoming",
            AppointmentStatus::Done => "Done",
            AppointmentStatus::Canceled => "Canceled",
        }
    }
}

impl fmt::Display for AppointmentStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// One bookable unit of a doctor's schedule.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct SlotKey {
    pub doctor_id: Uuid,
    pub date: NaiveDate,
    pub time: String,
}

impl SlotKey {
    pub fn new(doctor_id: Uuid, date: NaiveDate, time: &str) -> Self {
        Self {
            doctor_id,
            date,
            time: time.to_string(),
        }
    }
}

impl fmt::Display for SlotKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}@{} {}", self.doctor_id, self.date, self.time)
    }
}

// ==============================================================================
// REQUEST/RESPONSE MODELS
// ==============================================================================

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CreateAppointmentRequest {
    pub patient_id: Uuid,
    pub doctor_id: Uuid,
    pub date: String,
    pub time: String,
}

/// Partial update: absent fields keep their current values.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct UpdateAppointmentRequest {
    pub doctor: Option<Uuid>,
    pub date: Option<String>,
    pub time: Option<String>,
    pub status: Option<AppointmentStatus>,
}

impl UpdateAppointmentRequest {
    pub fn touches_slot(&self) -> bool {
        self.doctor.is_some() || self.date.is_some() || self.time.is_some()
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct UpdateStatusRequest {
    pub status: AppointmentStatus,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TransferAppointmentRequest {
    pub new_doctor_id: Uuid,
    /// Defaults to the appointment's current date.
    pub date: Option<String>,
    /// Defaults to the appointment's current slot label.
    pub time: Option<String>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct AppointmentQueryParams {
    pub doctor_id: Option<Uuid>,
    pub patient_id: Option<Uuid>,
    pub date: Option<String>,
    pub status: Option<AppointmentStatus>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ConflictCheckQuery {
    pub doctor_id: Uuid,
    pub date: String,
    pub time: String,
    pub exclude_appointment_id: Option<Uuid>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct AppointmentFilter {
    pub doctor_id: Option<Uuid>,
    pub patient_id: Option<Uuid>,
    pub date: Option<NaiveDate>,
    pub status: Option<AppointmentStatus>,
}

impl AppointmentFilter {
    pub fn matches(&self, appointment: &Appointment) -> bool {
        self.doctor_id.map_or(true, |id| appointment.doctor_id == id)
            && self.patient_id.map_or(true, |id| appointment.patient_id == id)
            && self.date.map_or(true, |date| appointment.date == date)
            && self.status.map_or(true, |status| appointment.status == status)
    }
}

/// Appointment joined with the names of the people and place involved.
/// A missing association leaves its name empty.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct AppointmentView {
    pub id: Uuid,
    pub patient_id: Uuid,
    pub doctor_id: Uuid,
    pub patient_name: Option<String>,
    pub doctor_name: Option<String>,
    pub hospital_name: Option<String>,
    pub date: NaiveDate,
    pub day: String,
    pub time: String,
    pub status: AppointmentStatus,
    pub transferred_to: Option<Uuid>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// A committed write. `cache_degraded` reports that the query cache could
/// not be invalidated and may serve stale listings until expiry.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BookingOutcome {
    pub appointment: AppointmentView,
    pub cache_degraded: bool,
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum CacheStatus {
    Hit,
    Miss,
    Degraded,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AppointmentListing {
    pub appointments: Vec<AppointmentView>,
    pub cache: CacheStatus,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ConflictCheckResponse {
    pub has_conflict: bool,
    pub conflicting_appointments: Vec<Uuid>,
}

// ==============================================================================
// ERRORS
// ==============================================================================

#[derive(Debug, Error)]
pub enum AppointmentError {
    #[error("Appointment not found")]
    NotFound,

    #[error("Invalid patient ID or the user is not a patient")]
    InvalidPatient,

    #[error("Invalid doctor ID")]
    DoctorNotFound,

    #[error("Invalid date: {0}")]
    InvalidDate(String),

    #[error("Doctor is not available at the selected date and time")]
    DoctorNotAvailable,

    #[error("The doctor is already booked for this time slot")]
    ConflictDetected,

    #[error("Appointment cannot move from {from} to {to}")]
    InvalidStatusTransition {
        from: AppointmentStatus,
        to: AppointmentStatus,
    },

    #[error("Appointment was changed by another request; reload and retry")]
    ConcurrentModification,

    #[error("Not authorized: {0}")]
    Unauthorized(String),

    #[error("Validation error: {0}")]
    ValidationError(String),

    #[error("Database error: {0}")]
    DatabaseError(String),

    #[error("External service error: {0}")]
    ExternalServiceError(String),
}

impl From<DirectoryError> for AppointmentError {
    fn from(error: DirectoryError) -> Self {
        AppointmentError::ExternalServiceError(error.to_string())
    }
}

impl From<AppointmentError> for AppError {
    fn from(error: AppointmentError) -> Self {
        match error {
            AppointmentError::NotFound => AppError::NotFound(error.to_string()),
            AppointmentError::Unauthorized(msg) => AppError::Forbidden(msg),
            AppointmentError::InvalidPatient
            | AppointmentError::DoctorNotFound
            | AppointmentError::InvalidDate(_) => AppError::ValidationError(error.to_string()),
            AppointmentError::ValidationError(msg) => AppError::ValidationError(msg),
            AppointmentError::DoctorNotAvailable => AppError::Unavailable(error.to_string()),
            AppointmentError::ConflictDetected
            | AppointmentError::InvalidStatusTransition { .. }
            | AppointmentError::ConcurrentModification => AppError::Conflict(error.to_string()),
            AppointmentError::DatabaseError(msg) => AppError::Database(msg),
            AppointmentError::ExternalServiceError(msg) => AppError::ExternalService(msg),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_scheduled_is_a_legacy_alias_for_upcoming() {
        let status: AppointmentStatus = serde_json::from_str("\"Scheduled\"").unwrap();
        assert_eq!(status, AppointmentStatus::Upcoming);
        assert_eq!(serde_json::to_string(&status).unwrap(), "\"Upcoming\"");
    }

    #[test]
    fn test_only_upcoming_blocks() {
        assert!(AppointmentStatus::Upcoming.is_blocking());
        assert!(!AppointmentStatus::Done.is_blocking());
        assert!(!AppointmentStatus::Canceled.is_blocking());
        assert!(AppointmentStatus::Canceled.is_terminal());
    }

    #[test]
    fn test_error_mapping_to_http_taxonomy() {
        use axum::http::StatusCode;

        let cases = [
            (AppointmentError::Unauthorized("x".into()), StatusCode::FORBIDDEN),
            (AppointmentError::InvalidPatient, StatusCode::BAD_REQUEST),
            (AppointmentError::DoctorNotAvailable, StatusCode::UNPROCESSABLE_ENTITY),
            (AppointmentError::ConflictDetected, StatusCode::CONFLICT),
            (AppointmentError::ConcurrentModification, StatusCode::CONFLICT),
            (AppointmentError::NotFound, StatusCode::NOT_FOUND),
            (AppointmentError::DatabaseError("down".into()), StatusCode::INTERNAL_SERVER_ERROR),
        ];
        for (error, expected) in cases {
            assert_eq!(AppError::from(error).status_code(), expected);
        }
    }
}
