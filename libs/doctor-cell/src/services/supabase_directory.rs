use async_trait::async_trait;
use reqwest::Method;
use serde::de::DeserializeOwned;
use serde_json::Value;
use tracing::{debug, error};
use uuid::Uuid;

use shared_config::AppConfig;
use shared_database::supabase::SupabaseClient;

use crate::models::{DirectoryError, Doctor, Hospital, UserRecord};
use crate::services::directory::{DoctorDirectory, HospitalDirectory, UserDirectory};

/// Directory lookups against the `users`, `doctors` and `hospitals` tables.
#[derive(Clone)]
pub struct SupabaseDirectory {
    supabase: SupabaseClient,
}

impl SupabaseDirectory {
    pub fn new(config: &AppConfig) -> Self {
        Self {
            supabase: SupabaseClient::new(config),
        }
    }

    async fn fetch_one<T: DeserializeOwned>(&self, path: String) -> Result<Option<T>, DirectoryError> {
        debug!("Directory lookup: {}", path);

        let rows: Vec<Value> = self.supabase
            .request(Method::GET, &path, None, None)
            .await
            .map_err(|e| {
                error!("Directory lookup failed for {}: {}", path, e);
                DirectoryError::Backend(e.to_string())
            })?;

        rows.into_iter()
            .next()
            .map(|row| serde_json::from_value(row).map_err(|e| DirectoryError::Malformed(e.to_string())))
            .transpose()
    }
}

#[async_trait]
impl DoctorDirectory for SupabaseDirectory {
    async fn get_doctor(&self, doctor_id: Uuid) -> Result<Option<Doctor>, DirectoryError> {
        self.fetch_one(format!("/rest/v1/doctors?id=eq.{}&limit=1", doctor_id)).await
    }

    async fn find_doctor_by_user(&self, user_id: Uuid) -> Result<Option<Doctor>, DirectoryError> {
        self.fetch_one(format!("/rest/v1/doctors?user_id=eq.{}&limit=1", user_id)).await
    }
}

#[async_trait]
impl UserDirectory for SupabaseDirectory {
    async fn get_user(&self, user_id: Uuid) -> Result<Option<UserRecord>, DirectoryError> {
        self.fetch_one(format!(
            "/rest/v1/users?id=eq.{}&select=id,name,email,role,phone,address&limit=1",
            user_id
        ))
        .await
    }
}

#[async_trait]
impl HospitalDirectory for SupabaseDirectory {
    async fn get_hospital(&self, hospital_id: Uuid) -> Result<Option<Hospital>, DirectoryError> {
        self.fetch_one(format!("/rest/v1/hospitals?id=eq.{}&limit=1", hospital_id)).await
    }
}
