use axum::{
    extract::State,
    routing::{get, post},
    Extension, Json, Router,
};
use serde::Serialize;
use uuid::Uuid;

use crate::{auth::CallerClaims, error::ApiError, state::AppState};

#[derive(Debug, Serialize)]
pub struct StageResponse {
    pub order_id: Uuid,
}

#[derive(Debug, Serialize)]
pub struct ClaimResponse {
    pub order_id: Option<Uuid>,
}

pub fn routes() -> Router<AppState> {
    Router::new()
        .route("/v1/warehouse/preparation", post(add_to_preparation))
        .route("/v1/warehouse/deliver-stage", post(move_to_deliver_stage))
        .route("/v1/warehouse/claim", get(warehouse_claim))
        .route("/v1/dispatch/pickup", post(dispatch_order))
        .route("/v1/dispatch/deliver", post(deliver_order))
        .route("/v1/dispatch/claim", get(dispatcher_claim))
}

/// POST /v1/warehouse/preparation
/// Claim the next pending order for preparation
async fn add_to_preparation(
    State(state): State<AppState>,
    Extension(claims): Extension<CallerClaims>,
) -> Result<Json<StageResponse>, ApiError> {
    let mut workflow = state.workflow.lock().await;
    let order_id = workflow.add_order_to_preparation_stage(&claims.sub)?;
    Ok(Json(StageResponse { order_id }))
}

/// POST /v1/warehouse/deliver-stage
/// Hand the claimed order over to the dispatch queue
async fn move_to_deliver_stage(
    State(state): State<AppState>,
    Extension(claims): Extension<CallerClaims>,
) -> Result<Json<StageResponse>, ApiError> {
    let mut workflow = state.workflow.lock().await;
    let order_id = workflow.move_order_to_deliver_stage(&claims.sub)?;
    Ok(Json(StageResponse { order_id }))
}

/// GET /v1/warehouse/claim
async fn warehouse_claim(
    State(state): State<AppState>,
    Extension(claims): Extension<CallerClaims>,
) -> Json<ClaimResponse> {
    let workflow = state.workflow.lock().await;
    Json(ClaimResponse {
        order_id: workflow.warehouser_to_order_id(&claims.sub),
    })
}

/// POST /v1/dispatch/pickup
/// Claim the next prepared order for delivery
async fn dispatch_order(
    State(state): State<AppState>,
    Extension(claims): Extension<CallerClaims>,
) -> Result<Json<StageResponse>, ApiError> {
    let mut workflow = state.workflow.lock().await;
    let order_id = workflow.dispatch_order(&claims.sub)?;
    Ok(Json(StageResponse { order_id }))
}

/// POST /v1/dispatch/deliver
async fn deliver_order(
    State(state): State<AppState>,
    Extension(claims): Extension<CallerClaims>,
) -> Result<Json<StageResponse>, ApiError> {
    let mut workflow = state.workflow.lock().await;
    let order_id = workflow.deliver_order(&claims.sub)?;
    Ok(Json(StageResponse { order_id }))
}

/// GET /v1/dispatch/claim
async fn dispatcher_claim(
    State(state): State<AppState>,
    Extension(claims): Extension<CallerClaims>,
) -> Json<ClaimResponse> {
    let workflow = state.workflow.lock().await;
    Json(ClaimResponse {
        order_id: workflow.dispatcher_to_order_id(&claims.sub),
    })
}
