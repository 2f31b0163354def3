use uuid::Uuid;

#[derive(Debug, serde::Serialize, serde::Deserialize, Clone)]
pub struct OrderCreatedEvent {
    pub client: String,
    pub order_id: Uuid,
    pub total_price: u64,
    pub created_at: i64,
}

#[derive(Debug, serde::Serialize, serde::Deserialize, Clone)]
pub struct OrderDeliveredEvent {
    pub order_id: Uuid,
    pub delivered_at: i64,
}

/// Envelope carried by the workflow notification channel. Each variant fires
/// exactly once per corresponding transition.
#[derive(Debug, serde::Serialize, serde::Deserialize, Clone)]
#[serde(tag = "type", rename_all = "SCREAMING_SNAKE_CASE")]
pub enum WorkflowEvent {
    OrderCreated(OrderCreatedEvent),
    OrderDelivered(OrderDeliveredEvent),
}

impl WorkflowEvent {
    /// SSE event name for this notification
    pub fn kind(&self) -> &'static str {
        match self {
            WorkflowEvent::OrderCreated(_) => "order_created",
            WorkflowEvent::OrderDelivered(_) => "order_delivered",
        }
    }
}
