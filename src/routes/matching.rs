use actix_web::{web, HttpResponse, Responder};
use std::collections::HashMap;
use std::sync::Arc;
use validator::Validate;

use crate::core::{
    CandidateFinder, EngineError, LifecycleEvent, MatchingEngine, StandoutRanker, SwipeLimit,
    SwipeOutcome,
};
use crate::models::{
    CandidateView, ErrorResponse, FindCandidatesRequest, FindCandidatesResponse, HealthResponse,
    MatchView, QualityRequest, ReportRequest, ReportResponse, StandoutInteractionRequest,
    StandoutView, StandoutsResponse, SwipeRequest, SwipeResponse, TransitionRequest,
    UndoSwipeRequest, UndoSwipeResponse,
};
use crate::services::{BlockStore, MatchStore, PostgresStore, SwipeStore, UserStore};

/// Limits applied at the HTTP boundary
#[derive(Debug, Clone, Copy)]
pub struct RouteLimits {
    pub default_limit: u16,
    pub max_limit: u16,
    pub prefilter_limit: usize,
}

/// Application state shared across all handlers
#[derive(Clone)]
pub struct AppState {
    pub store: Arc<PostgresStore>,
    pub engine: Arc<MatchingEngine<PostgresStore>>,
    pub ranker: Arc<StandoutRanker<PostgresStore>>,
    pub finder: CandidateFinder,
    pub limits: RouteLimits,
}

/// Configure all matching routes
pub fn configure(cfg: &mut web::ServiceConfig) {
    cfg.route("/health", web::get().to(health_check))
        .route("/candidates/find", web::post().to(find_candidates))
        .route("/swipes", web::post().to(process_swipe))
        .route("/swipes/undo", web::post().to(undo_swipe))
        .route("/standouts", web::get().to(get_standouts))
        .route("/standouts/interact", web::post().to(interact_standout))
        .route("/relationships", web::get().to(list_relationships))
        .route("/relationships/quality", web::post().to(relationship_quality))
        .route("/relationships/transition", web::post().to(transition))
        .route("/reports", web::post().to(report_user));
}

fn bad_request(error: &str, message: String) -> HttpResponse {
    HttpResponse::BadRequest().json(ErrorResponse {
        error: error.to_string(),
        message,
        status_code: 400,
    })
}

fn engine_error(e: EngineError) -> HttpResponse {
    match &e {
        EngineError::InvalidRequest(msg) => bad_request("invalid_request", msg.clone()),
        EngineError::UserNotFound(id) => HttpResponse::NotFound().json(ErrorResponse {
            error: "user_not_found".to_string(),
            message: id.clone(),
            status_code: 404,
        }),
        EngineError::MatchNotFound(id) => HttpResponse::NotFound().json(ErrorResponse {
            error: "relationship_not_found".to_string(),
            message: id.clone(),
            status_code: 404,
        }),
        EngineError::Lifecycle(err) => HttpResponse::Conflict().json(ErrorResponse {
            error: "invalid_transition".to_string(),
            message: err.to_string(),
            status_code: 409,
        }),
        EngineError::Store(_) | EngineError::Inconsistent(_) => {
            tracing::error!("internal error: {}", e);
            HttpResponse::InternalServerError().json(ErrorResponse {
                error: "internal_error".to_string(),
                message: e.to_string(),
                status_code: 500,
            })
        }
    }
}

/// Health check endpoint
async fn health_check(state: web::Data<AppState>) -> impl Responder {
    let db_healthy = state.store.health_check().await.unwrap_or(false);
    let status = if db_healthy { "healthy" } else { "degraded" };

    HttpResponse::Ok().json(HealthResponse {
        status: status.to_string(),
        version: env!("CARGO_PKG_VERSION").to_string(),
        timestamp: chrono::Utc::now(),
    })
}

/// Candidate discovery endpoint
///
/// POST /api/v1/candidates/find
async fn find_candidates(
    state: web::Data<AppState>,
    req: web::Json<FindCandidatesRequest>,
) -> impl Responder {
    if let Err(errors) = req.validate() {
        return bad_request("validation_failed", errors.to_string());
    }

    let user_id = &req.user_id;
    let limit = req.limit.min(state.limits.max_limit) as usize;

    tracing::info!("finding candidates for {}, limit {}", user_id, limit);

    let seeker = match state.store.get_user(user_id).await {
        Ok(Some(seeker)) => seeker,
        Ok(None) => return engine_error(EngineError::UserNotFound(user_id.clone())),
        Err(e) => return engine_error(e.into()),
    };

    // Exclusion set: already swiped, blocked either way, client extras
    let mut excluded = match state.store.swiped_ids(user_id).await {
        Ok(ids) => ids,
        Err(e) => return engine_error(e.into()),
    };
    match state.store.blocked_ids(user_id).await {
        Ok(ids) => excluded.extend(ids),
        Err(e) => return engine_error(e.into()),
    }
    excluded.extend(req.exclude_user_ids.iter().cloned());

    let pool = match state
        .store
        .candidate_prefilter(&seeker, state.limits.prefilter_limit)
        .await
    {
        Ok(pool) => pool,
        Err(e) => return engine_error(e.into()),
    };
    let total_pool = pool.len();

    let today = chrono::Utc::now().date_naive();
    let mut candidates = state.finder.find_candidates(&seeker, pool, &excluded, today);
    candidates.truncate(limit);

    let views: Vec<CandidateView> = candidates
        .iter()
        .map(|c| CandidateView {
            user_id: c.profile.user_id.clone(),
            name: c.profile.name.clone(),
            age: c.profile.age_on(today),
            distance_km: c.distance_km,
            interests: c.profile.interests.clone(),
        })
        .collect();

    tracing::info!(
        "returning {} candidates for {} (pool {})",
        views.len(),
        user_id,
        total_pool
    );

    HttpResponse::Ok().json(FindCandidatesResponse {
        candidates: views,
        total_pool,
    })
}

/// Swipe endpoint
///
/// POST /api/v1/swipes
async fn process_swipe(state: web::Data<AppState>, req: web::Json<SwipeRequest>) -> impl Responder {
    if let Err(errors) = req.validate() {
        return bad_request("validation_failed", errors.to_string());
    }

    let liked = match req.direction.to_lowercase().as_str() {
        "like" => true,
        "pass" => false,
        _ => {
            return bad_request(
                "invalid_direction",
                "direction must be one of: like, pass".to_string(),
            )
        }
    };

    match state
        .engine
        .process_swipe(&req.user_id, &req.target_user_id, liked)
        .await
    {
        Ok(outcome) => {
            let (outcome_str, matched) = match outcome {
                SwipeOutcome::Matched(m) => ("matched", Some(MatchView::from(&m))),
                SwipeOutcome::Liked => ("liked", None),
                SwipeOutcome::Passed => ("passed", None),
                SwipeOutcome::LimitReached(SwipeLimit::DailyLikes) => {
                    ("daily_limit_reached", None)
                }
                SwipeOutcome::LimitReached(SwipeLimit::SessionSwipes) => {
                    ("session_limit_reached", None)
                }
            };
            HttpResponse::Ok().json(SwipeResponse {
                outcome: outcome_str.to_string(),
                matched,
            })
        }
        Err(e) => engine_error(e),
    }
}

/// Undo endpoint
///
/// POST /api/v1/swipes/undo
async fn undo_swipe(state: web::Data<AppState>, req: web::Json<UndoSwipeRequest>) -> impl Responder {
    if let Err(errors) = req.validate() {
        return bad_request("validation_failed", errors.to_string());
    }

    match state.engine.undo_last_swipe(&req.user_id).await {
        Ok(undone_target_id) => HttpResponse::Ok().json(UndoSwipeResponse { undone_target_id }),
        Err(e) => engine_error(e),
    }
}

/// Daily standouts endpoint
///
/// GET /api/v1/standouts?userId={userId}
async fn get_standouts(
    state: web::Data<AppState>,
    query: web::Query<HashMap<String, String>>,
) -> impl Responder {
    let Some(user_id) = query.get("userId") else {
        return bad_request(
            "missing_parameter",
            "userId query parameter is required".to_string(),
        );
    };

    match state.ranker.get_standouts(user_id).await {
        Ok(feed) => HttpResponse::Ok().json(StandoutsResponse {
            standouts: feed.entries.iter().map(StandoutView::from).collect(),
            from_cache: feed.from_cache,
        }),
        Err(e) => engine_error(e),
    }
}

/// Standout interaction endpoint
///
/// POST /api/v1/standouts/interact
async fn interact_standout(
    state: web::Data<AppState>,
    req: web::Json<StandoutInteractionRequest>,
) -> impl Responder {
    if let Err(errors) = req.validate() {
        return bad_request("validation_failed", errors.to_string());
    }

    match state
        .ranker
        .mark_interacted(&req.seeker_id, &req.candidate_id)
        .await
    {
        Ok(updated) => HttpResponse::Ok().json(serde_json::json!({ "updated": updated })),
        Err(e) => engine_error(e),
    }
}

/// Active relationships for a user
///
/// GET /api/v1/relationships?userId={userId}
async fn list_relationships(
    state: web::Data<AppState>,
    query: web::Query<HashMap<String, String>>,
) -> impl Responder {
    let Some(user_id) = query.get("userId") else {
        return bad_request(
            "missing_parameter",
            "userId query parameter is required".to_string(),
        );
    };

    match state.store.active_matches_for_user(user_id).await {
        Ok(matches) => {
            let views: Vec<MatchView> = matches.iter().map(MatchView::from).collect();
            HttpResponse::Ok().json(views)
        }
        Err(e) => engine_error(e.into()),
    }
}

/// Relationship quality endpoint
///
/// POST /api/v1/relationships/quality
async fn relationship_quality(
    state: web::Data<AppState>,
    req: web::Json<QualityRequest>,
) -> impl Responder {
    if let Err(errors) = req.validate() {
        return bad_request("validation_failed", errors.to_string());
    }

    match state
        .engine
        .relationship_quality(&req.user_id, &req.other_user_id)
        .await
    {
        Ok(report) => HttpResponse::Ok().json(crate::models::QualityResponse {
            score: report.score,
            highlights: report.highlights,
            dimensions: report
                .dimensions
                .iter()
                .map(|d| crate::models::DimensionView {
                    name: d.name.to_string(),
                    weight: d.weight,
                    value: d.value,
                })
                .collect(),
        }),
        Err(e) => engine_error(e),
    }
}

/// Lifecycle transition endpoint
///
/// POST /api/v1/relationships/transition
async fn transition(
    state: web::Data<AppState>,
    req: web::Json<TransitionRequest>,
) -> impl Responder {
    if let Err(errors) = req.validate() {
        return bad_request("validation_failed", errors.to_string());
    }

    let event = match req.action.to_lowercase().as_str() {
        "friends" => LifecycleEvent::Friendzone,
        "unmatch" => LifecycleEvent::Unmatch,
        "graceful_exit" => LifecycleEvent::GracefulExit,
        "block" => LifecycleEvent::Block,
        _ => {
            return bad_request(
                "invalid_action",
                "action must be one of: friends, unmatch, graceful_exit, block".to_string(),
            )
        }
    };

    match state
        .engine
        .apply_transition(&req.user_id, &req.other_user_id, event)
        .await
    {
        Ok(m) => HttpResponse::Ok().json(MatchView::from(&m)),
        Err(e) => engine_error(e),
    }
}

/// Report endpoint
///
/// POST /api/v1/reports
async fn report_user(state: web::Data<AppState>, req: web::Json<ReportRequest>) -> impl Responder {
    if let Err(errors) = req.validate() {
        return bad_request("validation_failed", errors.to_string());
    }

    match state
        .engine
        .report_user(&req.reporter_id, &req.reported_id, &req.reason)
        .await
    {
        Ok(outcome) => HttpResponse::Ok().json(ReportResponse {
            total_reports: outcome.total_reports,
            banned: outcome.banned,
        }),
        Err(e) => engine_error(e),
    }
}
