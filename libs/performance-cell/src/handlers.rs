use axum::{extract::State, Json};
use std::sync::Arc;

use crate::models::PerformanceStats;
use crate::services::CacheService;

pub async fn get_performance_stats(
    State(cache): State<Arc<CacheService>>,
) -> Json<PerformanceStats> {
    Json(PerformanceStats {
        cache_stats: cache.get_cache_stats(),
        generated_at: chrono::Utc::now(),
    })
}
