use std::sync::Arc;

use axum::{routing::get, Router};

use crate::handlers;
use crate::services::directory::DoctorDirectory;

pub fn doctor_routes(directory: Arc<dyn DoctorDirectory>) -> Router {
    Router::new()
        .route("/{doctor_id}/availability", get(handlers::get_doctor_availability))
        .with_state(directory)
}
