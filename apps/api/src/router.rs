use std::sync::Arc;

use axum::{
    Router,
    routing::get,
};

use appointment_cell::router::appointment_routes;
use appointment_cell::AppointmentBookingService;
use doctor_cell::router::doctor_routes;
use doctor_cell::services::DoctorDirectory;
use performance_cell::{create_performance_router, CacheService};
use shared_config::AppConfig;

pub struct AppServices {
    pub config: Arc<AppConfig>,
    pub booking: Arc<AppointmentBookingService>,
    pub directory: Arc<dyn DoctorDirectory>,
    pub cache: Arc<CacheService>,
}

pub fn create_router(services: AppServices) -> Router {
    Router::new()
        .route("/", get(|| async { "Clinic booking API is running!" }))
        .nest("/appointments", appointment_routes(services.config.clone(), services.booking))
        .nest("/doctors", doctor_routes(services.directory))
        .nest("/performance", create_performance_router(services.cache))
}
