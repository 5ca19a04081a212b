// libs/appointment-cell/src/handlers.rs
use std::sync::Arc;

use axum::{
    extract::{Extension, Path, Query, State},
    http::StatusCode,
    Json,
};
use serde_json::{json, Value};
use uuid::Uuid;

use shared_models::auth::User;
use shared_models::error::AppError;
use shared_utils::extractor::caller_identity;

use crate::models::{
    AppointmentQueryParams, BookingOutcome, ConflictCheckQuery, CreateAppointmentRequest,
    TransferAppointmentRequest, UpdateAppointmentRequest, UpdateStatusRequest,
};
use crate::services::booking::AppointmentBookingService;

fn outcome_body(outcome: BookingOutcome, message: &str) -> Json<Value> {
    Json(json!({
        "success": true,
        "appointment": outcome.appointment,
        "cache_degraded": outcome.cache_degraded,
        "message": message
    }))
}

#[axum::debug_handler]
pub async fn create_appointment(
    State(service): State<Arc<AppointmentBookingService>>,
    Extension(user): Extension<User>,
    Json(request): Json<CreateAppointmentRequest>,
) -> Result<(StatusCode, Json<Value>), AppError> {
    let caller = caller_identity(&user)?;

    let outcome = service.create_appointment(request, &caller).await?;

    Ok((StatusCode::CREATED, outcome_body(outcome, "Appointment booked successfully")))
}

#[axum::debug_handler]
pub async fn retrieve_appointments(
    State(service): State<Arc<AppointmentBookingService>>,
    Extension(user): Extension<User>,
    Query(params): Query<AppointmentQueryParams>,
) -> Result<Json<Value>, AppError> {
    let caller = caller_identity(&user)?;

    let listing = service.retrieve_appointments(&caller, params).await?;

    Ok(Json(json!({
        "success": true,
        "total": listing.appointments.len(),
        "appointments": listing.appointments,
        "cache": listing.cache
    })))
}

#[axum::debug_handler]
pub async fn get_appointment(
    State(service): State<Arc<AppointmentBookingService>>,
    Path(appointment_id): Path<Uuid>,
    Extension(user): Extension<User>,
) -> Result<Json<Value>, AppError> {
    let caller = caller_identity(&user)?;

    let appointment = service.get_appointment(appointment_id, &caller).await?;

    Ok(Json(json!(appointment)))
}

#[axum::debug_handler]
pub async fn update_appointment(
    State(service): State<Arc<AppointmentBookingService>>,
    Path(appointment_id): Path<Uuid>,
    Extension(user): Extension<User>,
    Json(request): Json<UpdateAppointmentRequest>,
) -> Result<Json<Value>, AppError> {
    let caller = caller_identity(&user)?;

    let outcome = service.update_appointment(appointment_id, request, &caller).await?;

    Ok(outcome_body(outcome, "Appointment updated successfully"))
}

#[axum::debug_handler]
pub async fn cancel_appointment(
    State(service): State<Arc<AppointmentBookingService>>,
    Path(appointment_id): Path<Uuid>,
    Extension(user): Extension<User>,
) -> Result<Json<Value>, AppError> {
    let caller = caller_identity(&user)?;

    let outcome = service.cancel_appointment(appointment_id, &caller).await?;

    Ok(outcome_body(outcome, "Appointment cancelled successfully"))
}

#[axum::debug_handler]
pub async fn update_appointment_status(
    State(service): State<Arc<AppointmentBookingService>>,
    Path(appointment_id): Path<Uuid>,
    Extension(user): Extension<User>,
    Json(request): Json<UpdateStatusRequest>,
) -> Result<Json<Value>, AppError> {
    let caller = caller_identity(&user)?;

    let outcome = service
        .update_appointment_status(appointment_id, request.status, &caller)
        .await?;

    Ok(outcome_body(outcome, "Appointment status updated"))
}

#[axum::debug_handler]
pub async fn transfer_appointment(
    State(service): State<Arc<AppointmentBookingService>>,
    Path(appointment_id): Path<Uuid>,
    Extension(user): Extension<User>,
    Json(request): Json<TransferAppointmentRequest>,
) -> Result<Json<Value>, AppError> {
    let caller = caller_identity(&user)?;

    let outcome = service.transfer_appointment(appointment_id, request, &caller).await?;

    Ok(outcome_body(outcome, "Appointment transferred successfully"))
}

#[axum::debug_handler]
pub async fn check_appointment_conflicts(
    State(service): State<Arc<AppointmentBookingService>>,
    Extension(user): Extension<User>,
    Query(query): Query<ConflictCheckQuery>,
) -> Result<Json<Value>, AppError> {
    caller_identity(&user)?;

    let response = service.check_conflicts(query).await?;

    Ok(Json(json!(response)))
}
