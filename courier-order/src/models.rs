use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Order status in the fulfillment lifecycle
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum OrderStatus {
    Pending,
    Canceled,
    InPreparation,
    Prepared,
    InTransit,
    Delivered,
    Verified,
}

/// Client verdict recorded at receipt time
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum OrderVerification {
    NotVerified,
    ErrorInOrder,
    PackagingProblems,
    DamagedProduct,
}

/// One catalog position within an order: SKU code and ordered quantity.
/// Zero-quantity positions are retained so the breakdown always covers the
/// whole catalog.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LineItem {
    pub sku: String,
    pub quantity: u32,
}

/// The single source of truth for a client's purchase.
///
/// Owner and line items are fixed at creation; workflow transitions mutate
/// status, verification, and observations in place. Orders are never
/// deleted: `Verified`, `Canceled`, and a discrepancy-flagged `Delivered`
/// are final resting states.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Order {
    pub id: Uuid,
    pub client: String,
    pub items: Vec<LineItem>,
    pub total_price: u64,
    pub status: OrderStatus,
    pub verification: OrderVerification,
    pub observations: String,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Order {
    pub fn new(id: Uuid, client: String, items: Vec<LineItem>, total_price: u64) -> Self {
        let now = Utc::now();
        Self {
            id,
            client,
            items,
            total_price,
            status: OrderStatus::Pending,
            verification: OrderVerification::NotVerified,
            observations: String::new(),
            created_at: now,
            updated_at: now,
        }
    }

    /// Update order status
    pub fn update_status(&mut self, new_status: OrderStatus) {
        self.status = new_status;
        self.updated_at = Utc::now();
    }

    /// Total units across all line items
    pub fn items_quantity(&self) -> u32 {
        self.items.iter().map(|item| item.quantity).sum()
    }
}
