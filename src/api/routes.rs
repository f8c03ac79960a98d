//! Routing definitions for the client lanes API.

use axum::Router;
use axum::routing::get;
use tower_http::cors::{Any, CorsLayer};
use tower_http::trace::TraceLayer;

use super::handlers::{self, AppState};

/// Creates the router with all routes and middleware.
///
/// ```ignore
/// let state = AppState::new(store);
/// let router = create_router(state);
/// axum::serve(listener, router).await?;
/// ```
pub fn create_router(state: AppState) -> Router {
    let api_v1 = Router::new()
        .route("/clients", get(handlers::list_clients))
        .route(
            "/clients/{id}",
            get(handlers::get_client).put(handlers::update_client),
        );

    Router::new()
        .route("/health", get(handlers::health_check))
        .nest("/api/v1", api_v1)
        .layer(TraceLayer::new_for_http())
        .layer(create_cors_layer())
        .with_state(state)
}

fn create_cors_layer() -> CorsLayer {
    CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any)
}

// =============================================================================
// Tests
// =============================================================================
