use std::net::SocketAddr;
use std::sync::Arc;
use dotenv::dotenv;
use tokio::net::TcpListener;
use tower_http::cors::{CorsLayer, Any};
use tower_http::trace::{self, TraceLayer};
use tracing::{Level, info, warn};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

mod router;

use appointment_cell::AppointmentBookingService;
use doctor_cell::services::SupabaseDirectory;
use performance_cell::{CacheService, InMemoryCache, NoopCache, RedisCache};
use shared_config::AppConfig;

use crate::router::AppServices;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Loading Env Vars
    dotenv().ok();

    // Initialize tracing
    tracing_subscriber::registry()
        .with(tracing_subscriber::EnvFilter::new(
            std::env::var("RUST_LOG").unwrap_or_else(|_| "info,tower_http=debug".into()),
        ))
        .with(tracing_subscriber::fmt::layer())
        .init();

    info!("Starting clinic booking API server");

    // Load configuration
    let config = Arc::new(AppConfig::from_env());

    let cache = Arc::new(build_cache(&config).await);
    let booking = Arc::new(AppointmentBookingService::from_config(&config, cache.clone()));
    let directory = Arc::new(SupabaseDirectory::new(&config));

    // Set up CORS
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any);

    // Build the application router
    let app = router::create_router(AppServices {
        config: config.clone(),
        booking,
        directory,
        cache,
    })
    .layer(
        TraceLayer::new_for_http()
            .make_span_with(trace::DefaultMakeSpan::new()
                .level(Level::INFO))
            .on_response(trace::DefaultOnResponse::new()
                .level(Level::INFO)),
    )
    .layer(cors);

    // Run the server
    let addr = SocketAddr::from(([0, 0, 0, 0], config.port));
    info!("Listening on {}", addr);

    let listener = TcpListener::bind(addr).await?;
    axum::serve(listener, app).await?;

    Ok(())
}

/// Redis when configured and reachable, otherwise a process-local cache.
/// A zero TTL turns caching off.
async fn build_cache(config: &AppConfig) -> CacheService {
    if config.appointment_cache_ttl_seconds == 0 {
        info!("APPOINTMENT_CACHE_TTL_SECONDS is 0, listing cache disabled");
        return CacheService::new(Arc::new(NoopCache));
    }

    if !config.is_redis_configured() {
        info!("REDIS_URL not set, caching appointment listings in memory");
        return CacheService::new(Arc::new(InMemoryCache::new()));
    }

    match RedisCache::new(config).await {
        Ok(redis) => {
            info!("Caching appointment listings in Redis");
            CacheService::new(Arc::new(redis))
        }
        Err(e) => {
            warn!("Redis unavailable ({}), caching appointment listings in memory", e);
            CacheService::new(Arc::new(InMemoryCache::new()))
        }
    }
}
