//! API request handlers

use crate::cycle::models::{Cycle, CycleProgress, CycleStats};
use crate::cycle::CycleTracker;
use crate::error::OpsError;
use crate::map::models::{MapSnapshot, TaskType};
use crate::map::MapService;
use crate::mirror::MirrorStore;
use crate::notify::Notification;
use crate::store::OpsStore;
use crate::workflow::models::{
    DecisionAction, RequestStatus, SubmitStatusRequest, TrackerStatusRequest,
};
use crate::workflow::RequestWorkflow;
use crate::Config;
use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    response::IntoResponse,
    Json,
};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use uuid::Uuid;

use super::context::ApiContext;

/// Shared server state
pub struct ServerState {
    pub store: Arc<dyn OpsStore>,
    pub mirror: Arc<dyn MirrorStore>,
    pub map: Arc<MapService>,
    pub cycles: Arc<CycleTracker>,
    pub workflow: Arc<RequestWorkflow>,
    pub config: Arc<Config>,
}

/// Shared server state handle
pub type OpsState = Arc<ServerState>;

// ============================================================================
// Health check
// ============================================================================

/// Per-service health status in the health response
#[derive(Serialize)]
pub struct ServiceHealthStatus {
    pub neo4j: String,
    pub meilisearch: String,
}

/// Health check response
#[derive(Serialize)]
pub struct HealthResponse {
    pub status: String,
    pub version: String,
    pub services: ServiceHealthStatus,
}

/// Health check handler — verifies connectivity to both stores.
///
/// Returns:
/// - 200 + `"ok"` when both stores respond
/// - 200 + `"degraded"` when only the mirror is down (reads degrade to an
///   empty map; writes still land durably)
/// - 503 + `"unhealthy"` when the system of record is down
pub async fn health(State(state): State<OpsState>) -> (StatusCode, Json<HealthResponse>) {
    let store_ok = state.store.health_check().await.unwrap_or(false);
    let mirror_ok = state.mirror.health_check().await.unwrap_or(false);

    let status = if store_ok && mirror_ok {
        "ok"
    } else if store_ok {
        "degraded"
    } else {
        "unhealthy"
    };

    let http_status = if store_ok {
        StatusCode::OK
    } else {
        StatusCode::SERVICE_UNAVAILABLE
    };

    (
        http_status,
        Json(HealthResponse {
            status: status.to_string(),
            version: env!("CARGO_PKG_VERSION").to_string(),
            services: ServiceHealthStatus {
                neo4j: connection_label(store_ok),
                meilisearch: connection_label(mirror_ok),
            },
        }),
    )
}

fn connection_label(ok: bool) -> String {
    if ok { "connected" } else { "disconnected" }.to_string()
}

// ============================================================================
// Map
// ============================================================================

/// Get the current map snapshot (hot read path)
pub async fn get_map(
    State(state): State<OpsState>,
    ApiContext(ctx): ApiContext,
) -> Result<Json<MapSnapshot>, AppError> {
    Ok(Json(state.map.read(&ctx.tenant).await))
}

// ============================================================================
// Status requests
// ============================================================================

/// Submit a status-change request
pub async fn submit_request(
    State(state): State<OpsState>,
    ApiContext(ctx): ApiContext,
    Json(input): Json<SubmitStatusRequest>,
) -> Result<(StatusCode, Json<TrackerStatusRequest>), AppError> {
    let request = state.workflow.submit(&ctx, input).await?;
    Ok((StatusCode::CREATED, Json(request)))
}

#[derive(Deserialize)]
pub struct RequestListParams {
    pub status: Option<RequestStatus>,
}

/// List status requests, newest first
pub async fn list_requests(
    State(state): State<OpsState>,
    ApiContext(ctx): ApiContext,
    Query(params): Query<RequestListParams>,
) -> Result<Json<Vec<TrackerStatusRequest>>, AppError> {
    Ok(Json(state.workflow.list(&ctx, params.status).await?))
}

/// Get one status request
pub async fn get_request(
    State(state): State<OpsState>,
    ApiContext(ctx): ApiContext,
    Path(request_id): Path<Uuid>,
) -> Result<Json<TrackerStatusRequest>, AppError> {
    Ok(Json(state.workflow.get(&ctx, request_id).await?))
}

#[derive(Deserialize)]
pub struct DecideRequestBody {
    pub action: DecisionAction,
    #[serde(default)]
    pub rejection_reason: Option<String>,
}

/// Approve or reject a pending request
pub async fn decide_request(
    State(state): State<OpsState>,
    ApiContext(ctx): ApiContext,
    Path(request_id): Path<Uuid>,
    Json(body): Json<DecideRequestBody>,
) -> Result<Json<TrackerStatusRequest>, AppError> {
    let request = state
        .workflow
        .decide(&ctx, request_id, body.action, body.rejection_reason)
        .await?;
    Ok(Json(request))
}

// ============================================================================
// Cycles
// ============================================================================

/// Active cycle plus current progress for one task type
#[derive(Serialize)]
pub struct CycleOverviewResponse {
    pub task_type: TaskType,
    pub cycle: Option<Cycle>,
    pub progress: CycleProgress,
}

/// Get the active cycle and current progress
pub async fn get_cycle_overview(
    State(state): State<OpsState>,
    ApiContext(ctx): ApiContext,
    Path(task_type): Path<TaskType>,
) -> Result<Json<CycleOverviewResponse>, AppError> {
    let cycle = state.cycles.active(&ctx.tenant, task_type).await?;
    let progress = state.cycles.current_progress(&ctx.tenant, task_type).await;
    Ok(Json(CycleOverviewResponse {
        task_type,
        cycle,
        progress,
    }))
}

#[derive(Deserialize)]
pub struct HistoryParams {
    pub year: Option<i32>,
    pub month: Option<u32>,
}

/// Cycle history, optionally filtered by year/month
pub async fn get_cycle_history(
    State(state): State<OpsState>,
    ApiContext(ctx): ApiContext,
    Path(task_type): Path<TaskType>,
    Query(params): Query<HistoryParams>,
) -> Result<Json<Vec<Cycle>>, AppError> {
    let cycles = state
        .cycles
        .history(&ctx.tenant, task_type, params.year, params.month)
        .await?;
    Ok(Json(cycles))
}

#[derive(Deserialize)]
pub struct StatsParams {
    pub year: i32,
}

/// Yearly cycle statistics
pub async fn get_cycle_stats(
    State(state): State<OpsState>,
    ApiContext(ctx): ApiContext,
    Path(task_type): Path<TaskType>,
    Query(params): Query<StatsParams>,
) -> Result<Json<CycleStats>, AppError> {
    let stats = state
        .cycles
        .stats(&ctx.tenant, task_type, params.year)
        .await?;
    Ok(Json(stats))
}

/// Administrator cycle reset
pub async fn reset_cycle(
    State(state): State<OpsState>,
    ApiContext(ctx): ApiContext,
    Path(task_type): Path<TaskType>,
) -> Result<Json<Cycle>, AppError> {
    Ok(Json(state.cycles.reset(&ctx, task_type).await?))
}

// ============================================================================
// Notifications
// ============================================================================

/// The current user's notifications, newest first
pub async fn list_notifications(
    State(state): State<OpsState>,
    ApiContext(ctx): ApiContext,
) -> Result<Json<Vec<Notification>>, AppError> {
    let org = ctx.tenant.as_org().ok_or_else(|| {
        AppError::BadRequest("notifications require an organization scope".to_string())
    })?;
    let notifications = state
        .store
        .list_notifications(org.id, ctx.user_id)
        .await
        .map_err(AppError::Internal)?;
    Ok(Json(notifications))
}

// ============================================================================
// Error handling
// ============================================================================

/// API-level errors mapped onto HTTP status codes
#[derive(Debug)]
pub enum AppError {
    Internal(anyhow::Error),
    NotFound(String),
    BadRequest(String),
    Unauthorized(String),
    Forbidden(String),
    Conflict {
        message: String,
        existing: Option<Box<TrackerStatusRequest>>,
    },
}

impl IntoResponse for AppError {
    fn into_response(self) -> axum::response::Response {
        let (status, body) = match self {
            AppError::Internal(e) => (
                StatusCode::INTERNAL_SERVER_ERROR,
                serde_json::json!({ "error": e.to_string() }),
            ),
            AppError::NotFound(msg) => {
                (StatusCode::NOT_FOUND, serde_json::json!({ "error": msg }))
            }
            AppError::BadRequest(msg) => {
                (StatusCode::BAD_REQUEST, serde_json::json!({ "error": msg }))
            }
            AppError::Unauthorized(msg) => (
                StatusCode::UNAUTHORIZED,
                serde_json::json!({ "error": msg }),
            ),
            AppError::Forbidden(msg) => {
                (StatusCode::FORBIDDEN, serde_json::json!({ "error": msg }))
            }
            AppError::Conflict { message, existing } => (
                StatusCode::CONFLICT,
                serde_json::json!({ "error": message, "existing": existing }),
            ),
        };

        (status, Json(body)).into_response()
    }
}

impl From<anyhow::Error> for AppError {
    fn from(err: anyhow::Error) -> Self {
        AppError::Internal(err)
    }
}

impl From<OpsError> for AppError {
    fn from(err: OpsError) -> Self {
        match err {
            OpsError::Validation(msg) => AppError::BadRequest(msg),
            OpsError::NotFound(msg) => AppError::NotFound(msg),
            OpsError::Conflict { message, existing } => AppError::Conflict { message, existing },
            OpsError::Forbidden(msg) => AppError::Forbidden(msg),
            OpsError::Storage { context, source } => {
                AppError::Internal(source.context(format!("storage failure ({context})")))
            }
        }
    }
}
