use serde::{Deserialize, Serialize};
use std::collections::HashMap;

/// Participant roles in the fulfillment workflow
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum Role {
    Client,
    WarehouseWorker,
    DispatcherWorker,
}

/// A registered identity: its role plus a human display label
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RoleAssignment {
    pub role: Role,
    pub label: String,
}

#[derive(Debug, thiserror::Error, PartialEq, Eq)]
pub enum AccessError {
    #[error("caller is not the registry owner")]
    Unauthorized,

    #[error("identity already registered: {0}")]
    AlreadyRegistered(String),
}

/// Owner-gated registry mapping an external identity to its role.
///
/// One identity holds at most one role; there is no re-registration or
/// de-registration path. The owner is implicitly privileged and distinct
/// from all three roles.
#[derive(Debug, Clone)]
pub struct RoleRegistry {
    owner: String,
    assignments: HashMap<String, RoleAssignment>,
}

impl RoleRegistry {
    pub fn new(owner: impl Into<String>) -> Self {
        Self {
            owner: owner.into(),
            assignments: HashMap::new(),
        }
    }

    pub fn owner(&self) -> &str {
        &self.owner
    }

    pub fn register_client(
        &mut self,
        caller: &str,
        identity: impl Into<String>,
        label: impl Into<String>,
    ) -> Result<(), AccessError> {
        self.register(caller, identity.into(), label.into(), Role::Client)
    }

    pub fn register_warehouse_worker(
        &mut self,
        caller: &str,
        identity: impl Into<String>,
        label: impl Into<String>,
    ) -> Result<(), AccessError> {
        self.register(caller, identity.into(), label.into(), Role::WarehouseWorker)
    }

    pub fn register_dispatcher_worker(
        &mut self,
        caller: &str,
        identity: impl Into<String>,
        label: impl Into<String>,
    ) -> Result<(), AccessError> {
        self.register(caller, identity.into(), label.into(), Role::DispatcherWorker)
    }

    fn register(
        &mut self,
        caller: &str,
        identity: String,
        label: String,
        role: Role,
    ) -> Result<(), AccessError> {
        if caller != self.owner {
            return Err(AccessError::Unauthorized);
        }
        if self.assignments.contains_key(&identity) {
            return Err(AccessError::AlreadyRegistered(identity));
        }

        tracing::info!(%identity, ?role, "registered identity");
        self.assignments.insert(identity, RoleAssignment { role, label });
        Ok(())
    }

    pub fn role_of(&self, identity: &str) -> Option<Role> {
        self.assignments.get(identity).map(|a| a.role)
    }

    pub fn assignment_of(&self, identity: &str) -> Option<&RoleAssignment> {
        self.assignments.get(identity)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_registration_round_trip() {
        let mut registry = RoleRegistry::new("owner");

        registry.register_client("owner", "alice", "Alice").unwrap();
        registry
            .register_warehouse_worker("owner", "bob", "Bob")
            .unwrap();
        registry
            .register_dispatcher_worker("owner", "charlie", "Charlie")
            .unwrap();

        assert_eq!(registry.role_of("alice"), Some(Role::Client));
        assert_eq!(registry.role_of("bob"), Some(Role::WarehouseWorker));
        assert_eq!(registry.role_of("charlie"), Some(Role::DispatcherWorker));
        assert_eq!(registry.role_of("daniel"), None);
        assert_eq!(registry.assignment_of("alice").unwrap().label, "Alice");
    }

    #[test]
    fn test_non_owner_cannot_register() {
        let mut registry = RoleRegistry::new("owner");
        let result = registry.register_client("alice", "alice", "Alice");
        assert_eq!(result, Err(AccessError::Unauthorized));
        assert_eq!(registry.role_of("alice"), None);
    }

    #[test]
    fn test_no_re_registration() {
        let mut registry = RoleRegistry::new("owner");
        registry.register_client("owner", "alice", "Alice").unwrap();

        // Same identity cannot take a second role either
        let result = registry.register_warehouse_worker("owner", "alice", "Alice");
        assert_eq!(
            result,
            Err(AccessError::AlreadyRegistered("alice".to_string()))
        );
        assert_eq!(registry.role_of("alice"), Some(Role::Client));
    }
}
