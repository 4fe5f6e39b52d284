mod config;
mod core;
mod models;
mod routes;
mod services;

use actix_cors::Cors;
use actix_web::{error, http::StatusCode, middleware, web, App, HttpResponse, HttpServer};
use std::sync::Arc;
use tracing::{error, info, warn};

use crate::config::Settings;
use crate::core::{
    CandidateFinder, EngineParams, MatchingEngine, QualityScorer, RankerParams, StandoutRanker,
    StandoutScorer, UserLocks,
};
use crate::routes::matching::{AppState, RouteLimits};
use crate::services::{CacheManager, PostgresStore};

/// JSON error response for payload errors
#[derive(Debug, serde::Serialize)]
pub struct JsonError {
    pub error: String,
    pub message: String,
    pub status_code: u16,
}

impl std::fmt::Display for JsonError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}: {}", self.error, self.message)
    }
}

impl std::error::Error for JsonError {}

impl error::ResponseError for JsonError {
    fn error_response(&self) -> HttpResponse {
        HttpResponse::build(
            StatusCode::from_u16(self.status_code).unwrap_or(StatusCode::BAD_REQUEST),
        )
        .content_type("application/json")
        .json(serde_json::json!({
            "error": self.error,
            "message": self.message,
            "status_code": self.status_code,
        }))
    }
}

/// Handle JSON payload errors
pub fn handle_json_payload_error(
    err: error::JsonPayloadError,
    req: &actix_web::HttpRequest,
) -> actix_web::Error {
    tracing::info!("JSON payload error on {}: {}", req.path(), err);
    JsonError {
        error: "invalid_json".to_string(),
        message: format!("Invalid JSON: {}", err),
        status_code: 400,
    }
    .into()
}

#[actix_web::main]
async fn main() -> std::io::Result<()> {
    // Load .env file if present
    dotenv::dotenv().ok();

    // Initialize logging
    let log_level = std::env::var("LOG_LEVEL").unwrap_or_else(|_| "info".to_string());
    let log_format = std::env::var("LOG_FORMAT").unwrap_or_else(|_| "json".to_string());

    let subscriber = tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new(log_level)),
        )
        .with_target(false)
        .with_level(true);

    if log_format == "pretty" {
        subscriber.pretty().init();
    } else {
        subscriber.init();
    }

    info!("Starting Kindred matching service...");

    // Load configuration; weight tables are validated here, once
    let settings = Settings::load().unwrap_or_else(|e| {
        error!("Failed to load configuration: {}", e);
        panic!("Configuration error: {}", e);
    });

    info!("Configuration loaded successfully");

    // Connect PostgreSQL and run migrations
    let db_max_conn = settings.database.max_connections.unwrap_or(10);
    let db_min_conn = settings.database.min_connections.unwrap_or(1);

    let store = Arc::new(
        PostgresStore::connect(&settings.database.url, db_max_conn, db_min_conn)
            .await
            .unwrap_or_else(|e| {
                error!("Failed to connect to PostgreSQL: {}", e);
                panic!("PostgreSQL connection error: {}", e);
            }),
    );

    info!("PostgreSQL store initialized (max: {} connections)", db_max_conn);

    // Cache tier is best-effort; the persistent daily memo still works
    // without it
    let cache_ttl = settings.cache.ttl_secs.unwrap_or(300);
    let l1_cache_size = settings.cache.l1_cache_size.unwrap_or(1000);
    let cache = match CacheManager::new(&settings.cache.redis_url, l1_cache_size, cache_ttl).await {
        Ok(c) => {
            info!("Cache manager initialized (L1: {} entries, TTL: {}s)", l1_cache_size, cache_ttl);
            Some(Arc::new(c))
        }
        Err(e) => {
            warn!("Redis unavailable ({}), standout caching degraded to PostgreSQL only", e);
            None
        }
    };

    // Scorers from configured weights, validated at startup
    let quality = QualityScorer::new(
        settings.scoring.quality_weights.clone().into(),
        settings.scoring.response_bands.clone().into(),
        settings.scoring.similar_age_years,
    )
    .unwrap_or_else(|e| panic!("Quality scorer configuration error: {}", e));

    let standout_scorer = StandoutScorer::new(
        settings.scoring.standout_weights.clone().into(),
        settings.scoring.similar_age_years,
    )
    .unwrap_or_else(|e| panic!("Standout scorer configuration error: {}", e));

    // Lock stripes are sized once, lifetime bound to the service instance
    let locks = Arc::new(UserLocks::new(settings.matching.lock_stripes));

    let engine = Arc::new(MatchingEngine::new(
        Arc::clone(&store),
        Arc::clone(&locks),
        quality,
        EngineParams {
            daily_like_limit: settings.matching.daily_like_limit,
            session_swipe_cap: settings.matching.session_swipe_cap,
            auto_ban_report_threshold: settings.matching.auto_ban_report_threshold,
        },
    ));

    let mut ranker = StandoutRanker::new(
        Arc::clone(&store),
        standout_scorer,
        RankerParams {
            standout_count: settings.matching.standout_count,
            diversity_window_days: settings.matching.diversity_window_days,
            prefilter_limit: settings.matching.prefilter_limit,
        },
    );
    if let Some(cache) = &cache {
        ranker = ranker.with_cache(Arc::clone(cache));
    }
    let ranker = Arc::new(ranker);

    info!(
        "Matching engine initialized ({} lock stripes, {} likes/day)",
        settings.matching.lock_stripes, settings.matching.daily_like_limit
    );

    let app_state = AppState {
        store,
        engine,
        ranker,
        finder: CandidateFinder::new(),
        limits: RouteLimits {
            default_limit: settings.matching.default_limit,
            max_limit: settings.matching.max_limit,
            prefilter_limit: settings.matching.prefilter_limit,
        },
    };

    let host = settings.server.host.clone();
    let port = settings.server.port;
    let workers = settings.server.workers.unwrap_or(4);

    info!("Starting HTTP server on {}:{}", host, port);

    HttpServer::new(move || {
        let cors = Cors::permissive();

        App::new()
            .app_data(web::Data::new(app_state.clone()))
            .app_data(web::JsonConfig::default().error_handler(handle_json_payload_error))
            .wrap(cors)
            .wrap(middleware::Logger::default())
            .wrap(middleware::Compress::default())
            .configure(routes::configure_routes)
    })
    .workers(workers)
    .bind((host, port))?
    .run()
    .await
}
