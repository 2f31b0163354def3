use courier_api::{app, state::AuthConfig, AppState};
use courier_core::access::RoleRegistry;
use courier_order::OrderWorkflow;
use std::net::SocketAddr;
use std::sync::Arc;
use tokio::sync::Mutex;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

#[tokio::main]
async fn main() {
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "courier_api=debug,courier_order=debug,tower_http=debug".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    let config = courier_api::app_config::Config::load().expect("Failed to load config");
    tracing::info!("Starting Courier API on port {}", config.server.port);

    let catalog = config.catalog.build();
    tracing::info!("Catalog loaded with {} SKUs", catalog.len());

    let registry = RoleRegistry::new(config.owner.identity.clone());
    let workflow = OrderWorkflow::new(catalog, registry);

    let app_state = AppState {
        workflow: Arc::new(Mutex::new(workflow)),
        auth: AuthConfig {
            secret: config.auth.jwt_secret.clone(),
            expiration: config.auth.jwt_expiration_seconds,
        },
    };

    let app = app(app_state);

    let addr = SocketAddr::from(([0, 0, 0, 0], config.server.port));
    tracing::info!("Listening on {}", addr);

    let listener = tokio::net::TcpListener::bind(addr).await.unwrap();
    axum::serve(listener, app).await.unwrap();
}
