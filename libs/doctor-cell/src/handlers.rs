use std::sync::Arc;

use axum::{
    extract::{Path, State},
    Json,
};
use serde_json::{json, Value};
use tracing::error;
use uuid::Uuid;

use shared_models::error::AppError;

use crate::models::DoctorAvailabilityResponse;
use crate::services::directory::DoctorDirectory;

pub async fn get_doctor_availability(
    State(directory): State<Arc<dyn DoctorDirectory>>,
    Path(doctor_id): Path<Uuid>,
) -> Result<Json<Value>, AppError> {
    let doctor = directory.get_doctor(doctor_id).await
        .map_err(|e| {
            error!("Failed to load doctor {}: {}", doctor_id, e);
            AppError::Internal(e.to_string())
        })?
        .ok_or_else(|| AppError::NotFound("Doctor not found".to_string()))?;

    Ok(Json(json!(DoctorAvailabilityResponse {
        doctor_id: doctor.id,
        hospital_id: doctor.hospital_id,
        availability: doctor.availability,
    })))
}
