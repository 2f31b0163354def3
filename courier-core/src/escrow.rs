use std::collections::HashMap;
use uuid::Uuid;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum HoldState {
    Held(u64),
    Settled(u64),
}

#[derive(Debug, thiserror::Error, PartialEq, Eq)]
pub enum EscrowError {
    #[error("a hold already exists for order {0}")]
    AlreadyHeld(Uuid),

    #[error("no funds held for order {0}")]
    NothingHeld(Uuid),

    #[error("order {0} already settled")]
    AlreadySettled(Uuid),
}

/// Holds order payments between creation and settlement.
///
/// Funds are attached to an order id at creation and released to the
/// operator balance exactly once, on successful verification. There is no
/// refund path for canceled or disputed orders; whether those funds should
/// return to the client is an unresolved policy, and until it is decided
/// they stay held and observable via `held`.
#[derive(Debug, Clone, Default)]
pub struct EscrowLedger {
    holds: HashMap<Uuid, HoldState>,
    operator_balance: u64,
}

impl EscrowLedger {
    pub fn new() -> Self {
        Self::default()
    }

    /// Record funds held against an order.
    pub fn hold(&mut self, order_id: Uuid, amount: u64) -> Result<(), EscrowError> {
        if self.holds.contains_key(&order_id) {
            return Err(EscrowError::AlreadyHeld(order_id));
        }
        self.holds.insert(order_id, HoldState::Held(amount));
        tracing::info!(%order_id, amount, "escrow hold recorded");
        Ok(())
    }

    /// Transfer the held amount to the operator balance.
    ///
    /// Guarded against double settlement even though the workflow only
    /// settles once per order.
    pub fn settle(&mut self, order_id: Uuid) -> Result<u64, EscrowError> {
        match self.holds.get(&order_id) {
            None => Err(EscrowError::NothingHeld(order_id)),
            Some(HoldState::Settled(_)) => Err(EscrowError::AlreadySettled(order_id)),
            Some(HoldState::Held(amount)) => {
                let amount = *amount;
                self.holds.insert(order_id, HoldState::Settled(amount));
                self.operator_balance += amount;
                tracing::info!(%order_id, amount, "escrow settled to operator");
                Ok(amount)
            }
        }
    }

    /// Amount currently held for an order; zero once settled or never held.
    pub fn held(&self, order_id: Uuid) -> u64 {
        match self.holds.get(&order_id) {
            Some(HoldState::Held(amount)) => *amount,
            _ => 0,
        }
    }

    pub fn operator_balance(&self) -> u64 {
        self.operator_balance
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_hold_and_settle() {
        let mut escrow = EscrowLedger::new();
        let order_id = Uuid::new_v4();

        escrow.hold(order_id, 4300).unwrap();
        assert_eq!(escrow.held(order_id), 4300);
        assert_eq!(escrow.operator_balance(), 0);

        let settled = escrow.settle(order_id).unwrap();
        assert_eq!(settled, 4300);
        assert_eq!(escrow.held(order_id), 0);
        assert_eq!(escrow.operator_balance(), 4300);
    }

    #[test]
    fn test_double_settle_rejected() {
        let mut escrow = EscrowLedger::new();
        let order_id = Uuid::new_v4();

        escrow.hold(order_id, 100).unwrap();
        escrow.settle(order_id).unwrap();

        let result = escrow.settle(order_id);
        assert_eq!(result, Err(EscrowError::AlreadySettled(order_id)));
        assert_eq!(escrow.operator_balance(), 100);
    }

    #[test]
    fn test_settle_unknown_order() {
        let mut escrow = EscrowLedger::new();
        let order_id = Uuid::new_v4();
        assert_eq!(escrow.settle(order_id), Err(EscrowError::NothingHeld(order_id)));
    }

    #[test]
    fn test_double_hold_rejected() {
        let mut escrow = EscrowLedger::new();
        let order_id = Uuid::new_v4();

        escrow.hold(order_id, 100).unwrap();
        assert_eq!(
            escrow.hold(order_id, 200),
            Err(EscrowError::AlreadyHeld(order_id))
        );
        assert_eq!(escrow.held(order_id), 100);
    }
}
