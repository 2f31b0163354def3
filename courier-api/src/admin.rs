use axum::{
    extract::{Query, State},
    http::StatusCode,
    routing::{get, post},
    Extension, Json, Router,
};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::{auth::CallerClaims, error::ApiError, state::AppState};

#[derive(Debug, Deserialize)]
pub struct RegisterRequest {
    pub identity: String,
    pub label: String,
}

#[derive(Debug, Deserialize)]
pub struct QueueQuery {
    /// When present, each queue also reports structural membership of this id
    pub order_id: Option<Uuid>,
}

#[derive(Debug, Serialize)]
pub struct QueueStatus {
    pub size: usize,
    pub contains: Option<bool>,
}

#[derive(Debug, Serialize)]
pub struct QueuesResponse {
    pub pending: QueueStatus,
    pub dispatched: QueueStatus,
}

pub fn routes() -> Router<AppState> {
    Router::new()
        .route("/v1/admin/clients", post(register_client))
        .route("/v1/admin/warehouse-workers", post(register_warehouse_worker))
        .route("/v1/admin/dispatchers", post(register_dispatcher_worker))
        .route("/v1/queues", get(queues))
}

/// POST /v1/admin/clients
async fn register_client(
    State(state): State<AppState>,
    Extension(claims): Extension<CallerClaims>,
    Json(req): Json<RegisterRequest>,
) -> Result<StatusCode, ApiError> {
    let mut workflow = state.workflow.lock().await;
    workflow.register_client(&claims.sub, &req.identity, &req.label)?;
    Ok(StatusCode::CREATED)
}

/// POST /v1/admin/warehouse-workers
async fn register_warehouse_worker(
    State(state): State<AppState>,
    Extension(claims): Extension<CallerClaims>,
    Json(req): Json<RegisterRequest>,
) -> Result<StatusCode, ApiError> {
    let mut workflow = state.workflow.lock().await;
    workflow.register_warehouse_worker(&claims.sub, &req.identity, &req.label)?;
    Ok(StatusCode::CREATED)
}

/// POST /v1/admin/dispatchers
async fn register_dispatcher_worker(
    State(state): State<AppState>,
    Extension(claims): Extension<CallerClaims>,
    Json(req): Json<RegisterRequest>,
) -> Result<StatusCode, ApiError> {
    let mut workflow = state.workflow.lock().await;
    workflow.register_dispatcher_worker(&claims.sub, &req.identity, &req.label)?;
    Ok(StatusCode::CREATED)
}

/// GET /v1/queues?order_id=...
/// Structural queue view: sizes count not-yet-discarded invalid entries
async fn queues(
    State(state): State<AppState>,
    Query(query): Query<QueueQuery>,
) -> Json<QueuesResponse> {
    let workflow = state.workflow.lock().await;
    let pending = workflow.pending_orders();
    let dispatched = workflow.dispatched_orders();

    Json(QueuesResponse {
        pending: QueueStatus {
            size: pending.size(),
            contains: query.order_id.map(|id| pending.contains(&id)),
        },
        dispatched: QueueStatus {
            size: dispatched.size(),
            contains: query.order_id.map(|id| dispatched.contains(&id)),
        },
    })
}
