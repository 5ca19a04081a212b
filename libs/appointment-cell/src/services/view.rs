use std::sync::Arc;

use tracing::warn;
use uuid::Uuid;

use doctor_cell::models::DirectoryError;
use doctor_cell::services::{DoctorDirectory, HospitalDirectory, UserDirectory};

use crate::models::{Appointment, AppointmentView};

/// Joins an appointment with patient, doctor and hospital names. Lookups
/// that fail or come back empty leave the name unset.
#[derive(Clone)]
pub struct AppointmentViewResolver {
    doctors: Arc<dyn DoctorDirectory>,
    users: Arc<dyn UserDirectory>,
    hospitals: Arc<dyn HospitalDirectory>,
}

impl AppointmentViewResolver {
    pub fn new(
        doctors: Arc<dyn DoctorDirectory>,
        users: Arc<dyn UserDirectory>,
        hospitals: Arc<dyn HospitalDirectory>,
    ) -> Self {
        Self { doctors, users, hospitals }
    }

    pub async fn resolve(&self, appointment: &Appointment) -> AppointmentView {
        let patient_name = self.user_name(appointment.patient_id).await;

        let doctor = tolerate(
            "doctor",
            appointment.doctor_id,
            self.doctors.get_doctor(appointment.doctor_id).await,
        );
        let (doctor_name, hospital_name) = match doctor {
            Some(doctor) => {
                let doctor_name = self.user_name(doctor.user_id).await;
                let hospital_name = match doctor.hospital_id {
                    Some(hospital_id) => tolerate(
                        "hospital",
                        hospital_id,
                        self.hospitals.get_hospital(hospital_id).await,
                    )
                    .map(|hospital| hospital.name),
                    None => None,
                };
                (doctor_name, hospital_name)
            }
            None => (None, None),
        };

        AppointmentView {
            id: appointment.id,
            patient_id: appointment.patient_id,
            doctor_id: appointment.doctor_id,
            patient_name,
            doctor_name,
            hospital_name,
            date: appointment.date,
            day: appointment.day.clone(),
            time: appointment.time.clone(),
            status: appointment.status,
            transferred_to: appointment.transferred_to,
            created_at: appointment.created_at,
            updated_at: appointment.updated_at,
        }
    }

    pub async fn resolve_all(&self, appointments: &[Appointment]) -> Vec<AppointmentView> {
        futures::future::join_all(appointments.iter().map(|a| self.resolve(a))).await
    }

    async fn user_name(&self, user_id: Uuid) -> Option<String> {
        tolerate("user", user_id, self.users.get_user(user_id).await).map(|user| user.name)
    }
}

fn tolerate<T>(kind: &str, id: Uuid, lookup: Result<Option<T>, DirectoryError>) -> Option<T> {
    lookup.unwrap_or_else(|e| {
        warn!("Could not resolve {} {} for appointment view: {}", kind, id, e);
        None
    })
}
