use axum::{http::Method, middleware, Router};
use tower_http::cors::CorsLayer;
use tower_http::trace::TraceLayer;

pub mod admin;
pub mod app_config;
pub mod auth;
pub mod error;
pub mod events;
pub mod orders;
pub mod state;
pub mod workers;

pub use state::AppState;

pub fn app(state: AppState) -> Router {
    let cors = CorsLayer::new()
        .allow_origin(tower_http::cors::Any)
        .allow_methods([Method::GET, Method::POST, Method::OPTIONS])
        .allow_headers([
            axum::http::header::AUTHORIZATION,
            axum::http::header::CONTENT_TYPE,
        ]);

    // Everything except token issuing requires a bearer identity
    let protected = Router::new()
        .merge(admin::routes())
        .merge(orders::routes())
        .merge(workers::routes())
        .merge(events::routes())
        .route_layer(middleware::from_fn_with_state(
            state.clone(),
            auth::auth_middleware,
        ));

    Router::new()
        .merge(auth::routes())
        .merge(protected)
        .layer(cors)
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}
