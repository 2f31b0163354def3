use crate::models::{Order, OrderStatus};
use std::collections::HashMap;
use uuid::Uuid;

#[derive(Debug, thiserror::Error, PartialEq, Eq)]
pub enum OrderStoreError {
    #[error("order not found: {0}")]
    NotFound(Uuid),
}

/// Owns all order records. Mutable access is crate-internal so that every
/// state change goes through the workflow.
#[derive(Debug, Clone, Default)]
pub struct OrderStore {
    orders: HashMap<Uuid, Order>,
}

impl OrderStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub(crate) fn insert(&mut self, order: Order) {
        self.orders.insert(order.id, order);
    }

    pub fn get(&self, order_id: Uuid) -> Result<&Order, OrderStoreError> {
        self.orders
            .get(&order_id)
            .ok_or(OrderStoreError::NotFound(order_id))
    }

    pub(crate) fn get_mut(&mut self, order_id: Uuid) -> Result<&mut Order, OrderStoreError> {
        self.orders
            .get_mut(&order_id)
            .ok_or(OrderStoreError::NotFound(order_id))
    }

    /// Status lookup used by queue validity predicates; `None` for unknown
    /// ids so a stale queue entry reads as invalid rather than erroring.
    pub fn status_of(&self, order_id: Uuid) -> Option<OrderStatus> {
        self.orders.get(&order_id).map(|order| order.status)
    }

    pub fn len(&self) -> usize {
        self.orders.len()
    }

    pub fn is_empty(&self) -> bool {
        self.orders.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::LineItem;

    #[test]
    fn test_get_unknown_order_fails() {
        let store = OrderStore::new();
        let id = Uuid::new_v4();
        assert!(matches!(store.get(id), Err(OrderStoreError::NotFound(_))));
        assert_eq!(store.status_of(id), None);
    }

    #[test]
    fn test_insert_and_get() {
        let mut store = OrderStore::new();
        let order = Order::new(
            Uuid::new_v4(),
            "alice".into(),
            vec![LineItem { sku: "01500".into(), quantity: 1 }],
            500,
        );
        let id = order.id;
        store.insert(order);

        assert_eq!(store.get(id).unwrap().client, "alice");
        assert_eq!(store.status_of(id), Some(OrderStatus::Pending));
    }
}
