use crate::models::{LineItem, Order, OrderStatus, OrderVerification};
use crate::store::{OrderStore, OrderStoreError};
use chrono::Utc;
use courier_catalog::{Catalog, CatalogError};
use courier_core::access::{AccessError, Role, RoleRegistry};
use courier_core::escrow::{EscrowError, EscrowLedger};
use courier_queue::FifoQueue;
use courier_shared::events::{OrderCreatedEvent, OrderDeliveredEvent, WorkflowEvent};
use serde::Serialize;
use std::collections::HashMap;
use tokio::sync::broadcast;
use uuid::Uuid;

const CLIENT_QUEUE_EMPTY: &str = "No valid order found in client queue";
const DISPATCH_QUEUE_EMPTY: &str = "No valid order found in dispatch queue";

#[derive(Debug, thiserror::Error)]
pub enum WorkflowError {
    #[error("caller does not hold the required role")]
    Unauthorized,

    #[error("caller is not the order's owning client")]
    Forbidden,

    #[error("operation {operation} not allowed while order is {status:?}")]
    InvalidState {
        operation: &'static str,
        status: OrderStatus,
    },

    #[error("{0}")]
    NoValidOrder(&'static str),

    #[error("worker has no active claim")]
    NoActiveClaim,

    #[error("insufficient payment: order costs {required}, got {provided}")]
    InsufficientPayment { required: u64, provided: u64 },

    #[error("order has no items")]
    EmptyOrder,

    #[error("verification code must not be NOT_VERIFIED")]
    InvalidVerificationCode,

    #[error(transparent)]
    Store(#[from] OrderStoreError),

    #[error(transparent)]
    Access(#[from] AccessError),

    #[error(transparent)]
    Catalog(#[from] CatalogError),

    #[error(transparent)]
    Escrow(#[from] EscrowError),
}

/// Result of a successful `create_order`: the allocated id plus any excess
/// payment returned to the caller. The escrow holds exactly `total_price`.
#[derive(Debug, Clone, Serialize)]
pub struct CreatedOrder {
    pub order_id: Uuid,
    pub total_price: u64,
    pub change: u64,
}

/// The order state machine.
///
/// Drives the two stage queues, the per-worker claims, and escrow
/// settlement. Every operation checks the caller's role first, then
/// ownership where applicable, then order state; all checks precede all
/// mutations, so a rejected operation leaves order state untouched. The one
/// documented exception: a failed dequeue has already discarded the invalid
/// entries it scanned past.
///
/// Operations take `&mut self` and run to completion without suspension;
/// callers provide the single serialization point (the API layer wraps the
/// workflow in one async mutex).
pub struct OrderWorkflow {
    catalog: Catalog,
    registry: RoleRegistry,
    orders: OrderStore,
    pending_orders: FifoQueue<Uuid>,
    dispatched_orders: FifoQueue<Uuid>,
    warehouse_claims: HashMap<String, Uuid>,
    dispatcher_claims: HashMap<String, Uuid>,
    escrow: EscrowLedger,
    events: broadcast::Sender<WorkflowEvent>,
}

impl OrderWorkflow {
    pub fn new(catalog: Catalog, registry: RoleRegistry) -> Self {
        let (events, _) = broadcast::channel(64);
        Self {
            catalog,
            registry,
            orders: OrderStore::new(),
            pending_orders: FifoQueue::new(),
            dispatched_orders: FifoQueue::new(),
            warehouse_claims: HashMap::new(),
            dispatcher_claims: HashMap::new(),
            escrow: EscrowLedger::new(),
            events,
        }
    }

    /// Subscribe to workflow notifications (`OrderCreated`, `OrderDelivered`)
    pub fn subscribe(&self) -> broadcast::Receiver<WorkflowEvent> {
        self.events.subscribe()
    }

    // ------------------------------------------------------------------
    // Role registration (owner-gated, delegated to the registry)
    // ------------------------------------------------------------------

    pub fn register_client(
        &mut self,
        caller: &str,
        identity: &str,
        label: &str,
    ) -> Result<(), WorkflowError> {
        self.registry.register_client(caller, identity, label)?;
        Ok(())
    }

    pub fn register_warehouse_worker(
        &mut self,
        caller: &str,
        identity: &str,
        label: &str,
    ) -> Result<(), WorkflowError> {
        self.registry.register_warehouse_worker(caller, identity, label)?;
        Ok(())
    }

    pub fn register_dispatcher_worker(
        &mut self,
        caller: &str,
        identity: &str,
        label: &str,
    ) -> Result<(), WorkflowError> {
        self.registry.register_dispatcher_worker(caller, identity, label)?;
        Ok(())
    }

    pub fn role_of(&self, identity: &str) -> Option<Role> {
        self.registry.role_of(identity)
    }

    // ------------------------------------------------------------------
    // Client operations
    // ------------------------------------------------------------------

    /// Create an order from a position-indexed quantity vector.
    ///
    /// Payment must at least cover the catalog price; the excess comes back
    /// as change, and the escrow holds exactly the price.
    pub fn create_order(
        &mut self,
        caller: &str,
        quantities: &[u32],
        payment: u64,
    ) -> Result<CreatedOrder, WorkflowError> {
        self.require_role(caller, Role::Client)?;

        let quote = self.catalog.quote(quantities)?;
        if quote.total_units == 0 {
            return Err(WorkflowError::EmptyOrder);
        }
        if payment < quote.total_price {
            return Err(WorkflowError::InsufficientPayment {
                required: quote.total_price,
                provided: payment,
            });
        }
        let change = payment - quote.total_price;

        let order_id = Uuid::new_v4();
        let items: Vec<LineItem> = quote
            .lines
            .into_iter()
            .map(|line| LineItem {
                sku: line.sku,
                quantity: line.quantity,
            })
            .collect();

        self.escrow.hold(order_id, quote.total_price)?;
        self.orders
            .insert(Order::new(order_id, caller.to_string(), items, quote.total_price));
        self.pending_orders.enqueue(order_id);

        tracing::info!(%order_id, client = caller, price = quote.total_price, "order created");
        let _ = self.events.send(WorkflowEvent::OrderCreated(OrderCreatedEvent {
            client: caller.to_string(),
            order_id,
            total_price: quote.total_price,
            created_at: Utc::now().timestamp(),
        }));

        Ok(CreatedOrder {
            order_id,
            total_price: quote.total_price,
            change,
        })
    }

    /// Cancel a still-pending order.
    ///
    /// The id is not removed from the pending queue; the next dequeue
    /// discards it as invalid.
    pub fn cancel_order(&mut self, caller: &str, order_id: Uuid) -> Result<(), WorkflowError> {
        self.require_role(caller, Role::Client)?;

        let order = self.orders.get(order_id)?;
        if order.client != caller {
            return Err(WorkflowError::Forbidden);
        }
        if order.status != OrderStatus::Pending {
            return Err(WorkflowError::InvalidState {
                operation: "cancelOrder",
                status: order.status,
            });
        }

        self.orders.get_mut(order_id)?.update_status(OrderStatus::Canceled);
        tracing::info!(%order_id, client = caller, "order canceled");
        Ok(())
    }

    /// Confirm receipt: terminal `Verified` state, settles the escrow hold
    /// into the operator balance.
    pub fn verify_order(&mut self, caller: &str, order_id: Uuid) -> Result<(), WorkflowError> {
        self.require_role(caller, Role::Client)?;

        let order = self.orders.get(order_id)?;
        if order.client != caller {
            return Err(WorkflowError::Forbidden);
        }
        if order.status != OrderStatus::Delivered
            || order.verification != OrderVerification::NotVerified
        {
            return Err(WorkflowError::InvalidState {
                operation: "verifyOrder",
                status: order.status,
            });
        }

        let amount = self.escrow.settle(order_id)?;
        self.orders.get_mut(order_id)?.update_status(OrderStatus::Verified);
        tracing::info!(%order_id, amount, "order verified, escrow settled");
        Ok(())
    }

    /// Flag a delivered order as received with a discrepancy.
    ///
    /// Status stays `Delivered` and no settlement occurs; the held funds
    /// remain in escrow pending a dispute-resolution policy.
    pub fn mark_order_received_with_discrepancy(
        &mut self,
        caller: &str,
        order_id: Uuid,
        code: OrderVerification,
        observations: Option<String>,
    ) -> Result<(), WorkflowError> {
        self.require_role(caller, Role::Client)?;
        if code == OrderVerification::NotVerified {
            return Err(WorkflowError::InvalidVerificationCode);
        }

        let order = self.orders.get(order_id)?;
        if order.client != caller {
            return Err(WorkflowError::Forbidden);
        }
        if order.status != OrderStatus::Delivered
            || order.verification != OrderVerification::NotVerified
        {
            return Err(WorkflowError::InvalidState {
                operation: "markOrderReceivedWithDiscrepancy",
                status: order.status,
            });
        }

        let order = self.orders.get_mut(order_id)?;
        order.verification = code;
        if let Some(note) = observations {
            order.observations = note;
        }
        order.updated_at = Utc::now();

        tracing::warn!(%order_id, ?code, "order received with discrepancy, settlement withheld");
        Ok(())
    }

    // ------------------------------------------------------------------
    // Warehouse operations
    // ------------------------------------------------------------------

    /// Pull the next still-pending order from the client queue and claim it.
    pub fn add_order_to_preparation_stage(&mut self, caller: &str) -> Result<Uuid, WorkflowError> {
        self.require_role(caller, Role::WarehouseWorker)?;

        let orders = &self.orders;
        let order_id = self
            .pending_orders
            .dequeue_next_valid(|id| orders.status_of(*id) == Some(OrderStatus::Pending))
            .map_err(|_| WorkflowError::NoValidOrder(CLIENT_QUEUE_EMPTY))?;

        self.orders
            .get_mut(order_id)?
            .update_status(OrderStatus::InPreparation);
        self.warehouse_claims.insert(caller.to_string(), order_id);

        tracing::info!(%order_id, worker = caller, "order in preparation");
        Ok(order_id)
    }

    /// Hand the claimed order over to the dispatch queue.
    pub fn move_order_to_deliver_stage(&mut self, caller: &str) -> Result<Uuid, WorkflowError> {
        self.require_role(caller, Role::WarehouseWorker)?;

        let order_id = *self
            .warehouse_claims
            .get(caller)
            .ok_or(WorkflowError::NoActiveClaim)?;

        let order = self.orders.get_mut(order_id)?;
        if order.status != OrderStatus::InPreparation {
            return Err(WorkflowError::InvalidState {
                operation: "moveOrderToDeliverStage",
                status: order.status,
            });
        }

        order.update_status(OrderStatus::Prepared);
        self.dispatched_orders.enqueue(order_id);

        tracing::info!(%order_id, worker = caller, "order prepared for dispatch");
        Ok(order_id)
    }

    // ------------------------------------------------------------------
    // Dispatcher operations
    // ------------------------------------------------------------------

    /// Pull the next still-prepared order from the dispatch queue and claim it.
    pub fn dispatch_order(&mut self, caller: &str) -> Result<Uuid, WorkflowError> {
        self.require_role(caller, Role::DispatcherWorker)?;

        let orders = &self.orders;
        let order_id = self
            .dispatched_orders
            .dequeue_next_valid(|id| orders.status_of(*id) == Some(OrderStatus::Prepared))
            .map_err(|_| WorkflowError::NoValidOrder(DISPATCH_QUEUE_EMPTY))?;

        self.orders
            .get_mut(order_id)?
            .update_status(OrderStatus::InTransit);
        self.dispatcher_claims.insert(caller.to_string(), order_id);

        tracing::info!(%order_id, dispatcher = caller, "order in transit");
        Ok(order_id)
    }

    /// Mark the claimed in-transit order as delivered.
    pub fn deliver_order(&mut self, caller: &str) -> Result<Uuid, WorkflowError> {
        self.require_role(caller, Role::DispatcherWorker)?;

        let order_id = *self
            .dispatcher_claims
            .get(caller)
            .ok_or(WorkflowError::NoActiveClaim)?;

        let order = self.orders.get_mut(order_id)?;
        if order.status != OrderStatus::InTransit {
            return Err(WorkflowError::InvalidState {
                operation: "deliverOrder",
                status: order.status,
            });
        }

        order.update_status(OrderStatus::Delivered);
        tracing::info!(%order_id, dispatcher = caller, "order delivered");
        let _ = self
            .events
            .send(WorkflowEvent::OrderDelivered(OrderDeliveredEvent {
                order_id,
                delivered_at: Utc::now().timestamp(),
            }));

        Ok(order_id)
    }

    // ------------------------------------------------------------------
    // Read surface
    // ------------------------------------------------------------------

    pub fn get_order(&self, order_id: Uuid) -> Result<&Order, WorkflowError> {
        Ok(self.orders.get(order_id)?)
    }

    /// Per-order (sku, quantity) breakdown
    pub fn products_by_client(&self, order_id: Uuid) -> Result<&[LineItem], WorkflowError> {
        Ok(&self.orders.get(order_id)?.items)
    }

    /// The order a warehouse worker last claimed, if any. The claim persists
    /// after the stage completes; only a new dequeue overwrites it.
    pub fn warehouser_to_order_id(&self, identity: &str) -> Option<Uuid> {
        self.warehouse_claims.get(identity).copied()
    }

    pub fn dispatcher_to_order_id(&self, identity: &str) -> Option<Uuid> {
        self.dispatcher_claims.get(identity).copied()
    }

    pub fn pending_orders(&self) -> &FifoQueue<Uuid> {
        &self.pending_orders
    }

    pub fn dispatched_orders(&self) -> &FifoQueue<Uuid> {
        &self.dispatched_orders
    }

    pub fn operator_balance(&self) -> u64 {
        self.escrow.operator_balance()
    }

    /// Funds still held in escrow for an order
    pub fn held(&self, order_id: Uuid) -> u64 {
        self.escrow.held(order_id)
    }

    fn require_role(&self, caller: &str, role: Role) -> Result<(), WorkflowError> {
        if self.registry.role_of(caller) == Some(role) {
            Ok(())
        } else {
            Err(WorkflowError::Unauthorized)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use courier_catalog::CatalogItem;

    fn workflow() -> OrderWorkflow {
        let catalog = Catalog::new(vec![
            CatalogItem { sku: "01500".into(), unit_price: 500 },
            CatalogItem { sku: "02500".into(), unit_price: 500 },
        ]);
        let mut registry = RoleRegistry::new("owner");
        registry.register_client("owner", "alice", "Alice").unwrap();
        registry
            .register_warehouse_worker("owner", "bob", "Bob")
            .unwrap();
        registry
            .register_dispatcher_worker("owner", "charlie", "Charlie")
            .unwrap();
        OrderWorkflow::new(catalog, registry)
    }

    #[test]
    fn test_create_order_requires_client_role() {
        let mut flow = workflow();

        let result = flow.create_order("bob", &[1, 0], 500);
        assert!(matches!(result, Err(WorkflowError::Unauthorized)));
        assert_eq!(flow.pending_orders().size(), 0);
    }

    #[test]
    fn test_create_order_rejects_empty_and_underpaid() {
        let mut flow = workflow();

        let result = flow.create_order("alice", &[0, 0], 500);
        assert!(matches!(result, Err(WorkflowError::EmptyOrder)));

        let result = flow.create_order("alice", &[1, 1], 999);
        assert!(matches!(
            result,
            Err(WorkflowError::InsufficientPayment { required: 1000, provided: 999 })
        ));
        assert_eq!(flow.pending_orders().size(), 0);
    }

    #[test]
    fn test_create_order_returns_change_and_holds_price() {
        let mut flow = workflow();

        let created = flow.create_order("alice", &[1, 1], 1500).unwrap();
        assert_eq!(created.total_price, 1000);
        assert_eq!(created.change, 500);
        assert_eq!(flow.held(created.order_id), 1000);
        assert!(flow.pending_orders().contains(&created.order_id));
    }

    #[test]
    fn test_cancel_requires_ownership() {
        let mut flow = workflow();
        flow.register_client("owner", "diana", "Diana").unwrap();
        let created = flow.create_order("alice", &[1, 0], 500).unwrap();

        let result = flow.cancel_order("diana", created.order_id);
        assert!(matches!(result, Err(WorkflowError::Forbidden)));

        flow.cancel_order("alice", created.order_id).unwrap();
        let result = flow.cancel_order("alice", created.order_id);
        assert!(matches!(
            result,
            Err(WorkflowError::InvalidState { status: OrderStatus::Canceled, .. })
        ));
    }

    #[test]
    fn test_claim_persists_after_stage_completion() {
        let mut flow = workflow();
        let created = flow.create_order("alice", &[1, 0], 500).unwrap();

        let claimed = flow.add_order_to_preparation_stage("bob").unwrap();
        assert_eq!(claimed, created.order_id);
        flow.move_order_to_deliver_stage("bob").unwrap();

        // The claim field still points at the completed order
        assert_eq!(flow.warehouser_to_order_id("bob"), Some(created.order_id));

        // Re-running the stage against it fails on state, not on the claim
        let result = flow.move_order_to_deliver_stage("bob");
        assert!(matches!(
            result,
            Err(WorkflowError::InvalidState { status: OrderStatus::Prepared, .. })
        ));
    }

    #[test]
    fn test_worker_without_claim_cannot_advance() {
        let mut flow = workflow();
        let result = flow.move_order_to_deliver_stage("bob");
        assert!(matches!(result, Err(WorkflowError::NoActiveClaim)));

        let result = flow.deliver_order("charlie");
        assert!(matches!(result, Err(WorkflowError::NoActiveClaim)));
    }

    #[test]
    fn test_discrepancy_code_must_be_meaningful() {
        let mut flow = workflow();
        let created = flow.create_order("alice", &[1, 0], 500).unwrap();

        let result = flow.mark_order_received_with_discrepancy(
            "alice",
            created.order_id,
            OrderVerification::NotVerified,
            None,
        );
        assert!(matches!(result, Err(WorkflowError::InvalidVerificationCode)));
    }

    #[test]
    fn test_events_fire_once_per_transition() {
        let mut flow = workflow();
        let mut rx = flow.subscribe();

        let created = flow.create_order("alice", &[1, 0], 500).unwrap();
        flow.add_order_to_preparation_stage("bob").unwrap();
        flow.move_order_to_deliver_stage("bob").unwrap();
        flow.dispatch_order("charlie").unwrap();
        flow.deliver_order("charlie").unwrap();

        match rx.try_recv().unwrap() {
            WorkflowEvent::OrderCreated(event) => {
                assert_eq!(event.order_id, created.order_id);
                assert_eq!(event.client, "alice");
            }
            other => panic!("unexpected event: {:?}", other),
        }
        match rx.try_recv().unwrap() {
            WorkflowEvent::OrderDelivered(event) => {
                assert_eq!(event.order_id, created.order_id);
            }
            other => panic!("unexpected event: {:?}", other),
        }
        assert!(rx.try_recv().is_err());
    }
}
