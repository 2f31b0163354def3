pub mod events;

pub use events::{OrderCreatedEvent, OrderDeliveredEvent, WorkflowEvent};
