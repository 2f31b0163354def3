use courier_order::OrderWorkflow;
use std::sync::Arc;
use tokio::sync::Mutex;

#[derive(Clone)]
pub struct AuthConfig {
    pub secret: String,
    pub expiration: u64,
}

/// Shared handler state. The workflow sits behind a single async mutex:
/// every operation runs to completion under the lock, which is the global
/// serialization point the state machine's contracts assume.
#[derive(Clone)]
pub struct AppState {
    pub workflow: Arc<Mutex<OrderWorkflow>>,
    pub auth: AuthConfig,
}
