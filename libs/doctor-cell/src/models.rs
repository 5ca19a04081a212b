use std::collections::BTreeSet;

use serde::{Deserialize, Serialize};
use thiserror::Error;
use uuid::Uuid;

use shared_models::auth::Role;

/// A doctor's declared weekly schedule: English weekday names and
/// free-form slot labels such as `"10:00-11:00"`.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Availability {
    #[serde(default)]
    pub days: BTreeSet<String>,
    #[serde(default, alias = "timeSlots")]
    pub time_slots: BTreeSet<String>,
}

impl Availability {
    pub fn new<D, T>(days: D, time_slots: T) -> Self
    where
        D: IntoIterator,
        D::Item: Into<String>,
        T: IntoIterator,
        T::Item: Into<String>,
    {
        Self {
            days: days.into_iter().map(Into::into).collect(),
            time_slots: time_slots.into_iter().map(Into::into).collect(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Doctor {
    pub id: Uuid,
    /// The `users` row this doctor profile belongs to; its role must be Doctor.
    pub user_id: Uuid,
    #[serde(default)]
    pub specialities: BTreeSet<String>,
    #[serde(default)]
    pub qualifications: BTreeSet<String>,
    pub hospital_id: Option<Uuid>,
    #[serde(default)]
    pub availability: Availability,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct UserRecord {
    pub id: Uuid,
    pub name: String,
    pub email: String,
    pub role: Role,
    pub phone: Option<String>,
    pub address: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Hospital {
    pub id: Uuid,
    pub name: String,
    pub address: Option<String>,
    pub contact_number: Option<String>,
    #[serde(default)]
    pub departments: BTreeSet<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DoctorAvailabilityResponse {
    pub doctor_id: Uuid,
    pub hospital_id: Option<Uuid>,
    pub availability: Availability,
}

#[derive(Debug, Error)]
pub enum DirectoryError {
    #[error("Directory backend error: {0}")]
    Backend(String),

    #[error("Malformed directory record: {0}")]
    Malformed(String),
}
