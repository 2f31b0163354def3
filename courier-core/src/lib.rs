pub mod access;
pub mod escrow;

pub use access::{AccessError, Role, RoleAssignment, RoleRegistry};
pub use escrow::{EscrowError, EscrowLedger};
