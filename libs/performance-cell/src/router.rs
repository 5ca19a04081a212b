use axum::{routing::get, Router};
use std::sync::Arc;

use crate::handlers::get_performance_stats;
use crate::services::CacheService;

pub fn create_performance_router(cache: Arc<CacheService>) -> Router {
    Router::new()
        .route("/stats", get(get_performance_stats))
        .with_state(cache)
}
