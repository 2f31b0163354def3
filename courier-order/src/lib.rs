pub mod models;
pub mod store;
pub mod workflow;

pub use models::{LineItem, Order, OrderStatus, OrderVerification};
pub use store::{OrderStore, OrderStoreError};
pub use workflow::{CreatedOrder, OrderWorkflow, WorkflowError};
