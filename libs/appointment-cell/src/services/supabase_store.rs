use anyhow::Error as AnyError;
use async_trait::async_trait;
use reqwest::Method;
use serde_json::{json, Value};
use tracing::{debug, error};
use uuid::Uuid;

use shared_config::AppConfig;
use shared_database::supabase::{SupabaseApiError, SupabaseClient};

use crate::models::{Appointment, AppointmentFilter, AppointmentStatus, SlotKey};
use crate::services::store::{AppointmentStore, StoreError};

const TABLE: &str = "/rest/v1/appointments";

/// PostgREST-backed store. Slot exclusivity is enforced by the partial
/// unique index `appointments_one_upcoming_per_slot`; its violation comes
/// back as HTTP 409.
#[derive(Clone)]
pub struct SupabaseAppointmentStore {
    supabase: SupabaseClient,
}

impl SupabaseAppointmentStore {
    pub fn new(config: &AppConfig) -> Self {
        Self {
            supabase: SupabaseClient::new(config),
        }
    }

    fn map_error(context: &str, error: AnyError) -> StoreError {
        if let Some(api_error) = error.downcast_ref::<SupabaseApiError>() {
            if api_error.is_conflict() {
                debug!("{}: unique slot constraint rejected the write", context);
                return StoreError::SlotTaken;
            }
        }
        error!("{} failed: {}", context, error);
        StoreError::Backend(error.to_string())
    }

    fn parse_rows(rows: Vec<Value>) -> Result<Vec<Appointment>, StoreError> {
        rows.into_iter()
            .map(|row| serde_json::from_value(row).map_err(|e| StoreError::Malformed(e.to_string())))
            .collect()
    }

    async fn fetch(&self, path: &str) -> Result<Vec<Appointment>, StoreError> {
        let rows: Vec<Value> = self.supabase
            .request(Method::GET, path, None, None)
            .await
            .map_err(|e| Self::map_error("Appointment lookup", e))?;
        Self::parse_rows(rows)
    }

    fn slot_query(slot: &SlotKey) -> String {
        format!(
            "doctor_id=eq.{}&date=eq.{}&time=eq.{}",
            slot.doctor_id,
            slot.date,
            urlencoding::encode(&slot.time)
        )
    }

    fn filter_query(filter: &AppointmentFilter) -> String {
        let mut params = Vec::new();
        if let Some(doctor_id) = filter.doctor_id {
            params.push(format!("doctor_id=eq.{}", doctor_id));
        }
        if let Some(patient_id) = filter.patient_id {
            params.push(format!("patient_id=eq.{}", patient_id));
        }
        if let Some(date) = filter.date {
            params.push(format!("date=eq.{}", date));
        }
        if let Some(status) = filter.status {
            params.push(format!("status=eq.{}", status));
        }
        params.push("order=date.asc,time.asc".to_string());
        params.join("&")
    }
}

#[async_trait]
impl AppointmentStore for SupabaseAppointmentStore {
    async fn get(&self, appointment_id: Uuid) -> Result<Option<Appointment>, StoreError> {
        let path = format!("{}?id=eq.{}&limit=1", TABLE, appointment_id);
        Ok(self.fetch(&path).await?.into_iter().next())
    }

    async fn find_blocking(&self, slot: &SlotKey, exclude: Option<Uuid>) -> Result<Vec<Appointment>, StoreError> {
        let mut path = format!(
            "{}?{}&status=in.({})",
            TABLE,
            Self::slot_query(slot),
            AppointmentStatus::BLOCKING.map(|s| s.as_str()).join(",")
        );
        if let Some(exclude_id) = exclude {
            path.push_str(&format!("&id=neq.{}", exclude_id));
        }
        self.fetch(&path).await
    }

    async fn insert(&self, appointment: Appointment) -> Result<Appointment, StoreError> {
        let body = serde_json::to_value(&appointment)
            .map_err(|e| StoreError::Malformed(e.to_string()))?;

        let rows: Vec<Value> = self.supabase
            .request_with_headers(
                Method::POST,
                TABLE,
                None,
                Some(body),
                Some(SupabaseClient::return_representation()),
            )
            .await
            .map_err(|e| Self::map_error("Appointment insert", e))?;

        Self::parse_rows(rows)?
            .into_iter()
            .next()
            .ok_or_else(|| StoreError::Backend("Insert returned no rows".to_string()))
    }

    async fn update(&self, appointment: Appointment, expected: AppointmentStatus) -> Result<Appointment, StoreError> {
        let path = format!("{}?id=eq.{}&status=eq.{}", TABLE, appointment.id, expected);
        let body = json!({
            "doctor_id": appointment.doctor_id,
            "date": appointment.date,
            "day": appointment.day,
            "time": appointment.time,
            "status": appointment.status,
            "transferred_to": appointment.transferred_to,
            "updated_at": appointment.updated_at,
        });

        let rows: Vec<Value> = self.supabase
            .request_with_headers(
                Method::PATCH,
                &path,
                None,
                Some(body),
                Some(SupabaseClient::return_representation()),
            )
            .await
            .map_err(|e| Self::map_error("Appointment update", e))?;

        if let Some(updated) = Self::parse_rows(rows)?.into_iter().next() {
            return Ok(updated);
        }

        // Nothing matched both id and status: tell a vanished row from a moved-on one
        match self.get(appointment.id).await? {
            Some(current) => {
                debug!("Appointment {} is {} rather than {}; write dropped",
                       appointment.id, current.status, expected);
                Err(StoreError::Stale { id: appointment.id, expected })
            }
            None => Err(StoreError::NotFound(appointment.id)),
        }
    }

    async fn query(&self, filter: &AppointmentFilter) -> Result<Vec<Appointment>, StoreError> {
        let path = format!("{}?{}", TABLE, Self::filter_query(filter));
        self.fetch(&path).await
    }
}
