use axum::{
    extract::{Path, State},
    routing::{get, post},
    Extension, Json, Router,
};
use chrono::{DateTime, Utc};
use courier_order::{CreatedOrder, LineItem, Order, OrderStatus, OrderVerification};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::{auth::CallerClaims, error::ApiError, state::AppState};

// ============================================================================
// Request/Response Types
// ============================================================================

#[derive(Debug, Deserialize)]
pub struct CreateOrderRequest {
    /// Position-indexed quantities, one entry per catalog position
    pub quantities: Vec<u32>,
    /// Attached payment; must at least cover the catalog price
    pub payment: u64,
}

#[derive(Debug, Serialize)]
pub struct OrderResponse {
    pub id: Uuid,
    pub client: String,
    pub items: Vec<LineItem>,
    pub items_quantity: u32,
    pub total_price: u64,
    pub status: OrderStatus,
    pub verification: OrderVerification,
    pub observations: String,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl From<&Order> for OrderResponse {
    fn from(order: &Order) -> Self {
        Self {
            id: order.id,
            client: order.client.clone(),
            items: order.items.clone(),
            items_quantity: order.items_quantity(),
            total_price: order.total_price,
            status: order.status,
            verification: order.verification,
            observations: order.observations.clone(),
            created_at: order.created_at,
            updated_at: order.updated_at,
        }
    }
}

#[derive(Debug, Deserialize)]
pub struct DiscrepancyRequest {
    pub code: OrderVerification,
    pub observations: Option<String>,
}

// ============================================================================
// Handlers
// ============================================================================

pub fn routes() -> Router<AppState> {
    Router::new()
        .route("/v1/orders", post(create_order))
        .route("/v1/orders/{id}", get(get_order))
        .route("/v1/orders/{id}/products", get(get_products))
        .route("/v1/orders/{id}/cancel", post(cancel_order))
        .route("/v1/orders/{id}/verify", post(verify_order))
        .route("/v1/orders/{id}/discrepancy", post(mark_discrepancy))
}

/// POST /v1/orders
async fn create_order(
    State(state): State<AppState>,
    Extension(claims): Extension<CallerClaims>,
    Json(req): Json<CreateOrderRequest>,
) -> Result<Json<CreatedOrder>, ApiError> {
    let mut workflow = state.workflow.lock().await;
    let created = workflow.create_order(&claims.sub, &req.quantities, req.payment)?;
    Ok(Json(created))
}

/// GET /v1/orders/{id}
async fn get_order(
    State(state): State<AppState>,
    Path(order_id): Path<Uuid>,
) -> Result<Json<OrderResponse>, ApiError> {
    let workflow = state.workflow.lock().await;
    let order = workflow.get_order(order_id)?;
    Ok(Json(OrderResponse::from(order)))
}

/// GET /v1/orders/{id}/products
async fn get_products(
    State(state): State<AppState>,
    Path(order_id): Path<Uuid>,
) -> Result<Json<Vec<LineItem>>, ApiError> {
    let workflow = state.workflow.lock().await;
    let products = workflow.products_by_client(order_id)?;
    Ok(Json(products.to_vec()))
}

/// POST /v1/orders/{id}/cancel
async fn cancel_order(
    State(state): State<AppState>,
    Extension(claims): Extension<CallerClaims>,
    Path(order_id): Path<Uuid>,
) -> Result<Json<OrderResponse>, ApiError> {
    let mut workflow = state.workflow.lock().await;
    workflow.cancel_order(&claims.sub, order_id)?;
    Ok(Json(OrderResponse::from(workflow.get_order(order_id)?)))
}

/// POST /v1/orders/{id}/verify
async fn verify_order(
    State(state): State<AppState>,
    Extension(claims): Extension<CallerClaims>,
    Path(order_id): Path<Uuid>,
) -> Result<Json<OrderResponse>, ApiError> {
    let mut workflow = state.workflow.lock().await;
    workflow.verify_order(&claims.sub, order_id)?;
    Ok(Json(OrderResponse::from(workflow.get_order(order_id)?)))
}

/// POST /v1/orders/{id}/discrepancy
async fn mark_discrepancy(
    State(state): State<AppState>,
    Extension(claims): Extension<CallerClaims>,
    Path(order_id): Path<Uuid>,
    Json(req): Json<DiscrepancyRequest>,
) -> Result<Json<OrderResponse>, ApiError> {
    let mut workflow = state.workflow.lock().await;
    workflow.mark_order_received_with_discrepancy(
        &claims.sub,
        order_id,
        req.code,
        req.observations,
    )?;
    Ok(Json(OrderResponse::from(workflow.get_order(order_id)?)))
}
