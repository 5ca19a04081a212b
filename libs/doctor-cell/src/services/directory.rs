use std::collections::HashMap;

use async_trait::async_trait;
use tokio::sync::RwLock;
use uuid::Uuid;

use crate::models::{DirectoryError, Doctor, Hospital, UserRecord};

/// Doctor profiles by id, and by the user account they belong to.
#[async_trait]
pub trait DoctorDirectory: Send + Sync {
    async fn get_doctor(&self, doctor_id: Uuid) -> Result<Option<Doctor>, DirectoryError>;

    async fn find_doctor_by_user(&self, user_id: Uuid) -> Result<Option<Doctor>, DirectoryError>;
}

#[async_trait]
pub trait UserDirectory: Send + Sync {
    async fn get_user(&self, user_id: Uuid) -> Result<Option<UserRecord>, DirectoryError>;
}

#[async_trait]
pub trait HospitalDirectory: Send + Sync {
    async fn get_hospital(&self, hospital_id: Uuid) -> Result<Option<Hospital>, DirectoryError>;
}

/// Seedable directory held in process memory. Backs tests and local runs
/// without a Supabase project.
#[derive(Default)]
pub struct InMemoryDirectory {
    users: RwLock<HashMap<Uuid, UserRecord>>,
    doctors: RwLock<HashMap<Uuid, Doctor>>,
    hospitals: RwLock<HashMap<Uuid, Hospital>>,
}

impl InMemoryDirectory {
    pub fn new() -> Self {
        Self::default()
    }

    pub async fn insert_user(&self, user: UserRecord) {
        self.users.write().await.insert(user.id, user);
    }

    pub async fn insert_doctor(&self, doctor: Doctor) {
        self.doctors.write().await.insert(doctor.id, doctor);
    }

    pub async fn insert_hospital(&self, hospital: Hospital) {
        self.hospitals.write().await.insert(hospital.id, hospital);
    }

    pub async fn remove_user(&self, user_id: Uuid) -> Option<UserRecord> {
        self.users.write().await.remove(&user_id)
    }
}

#[async_trait]
impl DoctorDirectory for InMemoryDirectory {
    async fn get_doctor(&self, doctor_id: Uuid) -> Result<Option<Doctor>, DirectoryError> {
        Ok(self.doctors.read().await.get(&doctor_id).cloned())
    }

    async fn find_doctor_by_user(&self, user_id: Uuid) -> Result<Option<Doctor>, DirectoryError> {
        Ok(self
            .doctors
            .read()
            .await
            .values()
            .find(|doctor| doctor.user_id == user_id)
            .cloned())
    }
}

#[async_trait]
impl UserDirectory for InMemoryDirectory {
    async fn get_user(&self, user_id: Uuid) -> Result<Option<UserRecord>, DirectoryError> {
        Ok(self.users.read().await.get(&user_id).cloned())
    }
}

#[async_trait]
impl HospitalDirectory for InMemoryDirectory {
    async fn get_hospital(&self, hospital_id: Uuid) -> Result<Option<Hospital>, DirectoryError> {
        Ok(self.hospitals.read().await.get(&hospital_id).cloned())
    }
}
