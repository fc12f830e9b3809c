//! Web server module for the webhook endpoint.
//!
//! - `GET /webhook` answers the subscription handshake
//! - `POST /webhook` authenticates and logs event deliveries
//! - `GET /health` for load balancers

pub mod handlers;
pub mod raw_body;

use axum::{middleware, routing::get, Router};
use tower_http::trace::TraceLayer;

pub use handlers::{health, receive_events, verify_webhook, AppState, HealthResponse};
pub use raw_body::{capture_raw_body, RawBody};

/// Build the application router.
pub fn router(state: AppState) -> Router {
    let webhook = get(verify_webhook).merge(
        axum::routing::post(receive_events)
            .layer(middleware::from_fn_with_state(state.clone(), capture_raw_body)),
    );

    Router::new()
        .route("/health", get(health))
        .route("/webhook", webhook)
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}
