//! Dashboard — Axum web server for the card desk.
//!
//! Serves a REST API and a self-contained HTML page.
//! CORS enabled for local development.

pub mod routes;

use axum::{
    http::{header, HeaderValue, Method},
    response::Html,
    routing::{get, post},
    Router,
};
use tower_http::cors::CorsLayer;

pub use routes::{AppState, DeskState};

/// The embedded dashboard HTML (compiled into the binary).
const DASHBOARD_HTML: &str = include_str!("templates/index.html");

/// Build the Axum router with all routes and middleware.
pub fn build_router(state: AppState) -> Router {
    let cors = CorsLayer::new()
        .allow_origin("*".parse::<HeaderValue>().unwrap())
        .allow_methods([Method::GET, Method::POST])
        .allow_headers([header::CONTENT_TYPE]);

    Router::new()
        // Card routes
        .route("/api/search", get(routes::search_cards))
        .route("/api/cards/:id", get(routes::card_pricing))
        .route("/api/releases", get(routes::list_releases))
        // Inventory routes
        .route("/api/inventory", get(routes::list_inventory))
        .route("/api/inventory/priced", get(routes::priced_inventory))
        .route("/api/inventory/:id/sold", post(routes::mark_sold))
        // Queue routes
        .route("/api/queue", get(routes::get_queue).post(routes::join_queue))
        .route("/api/queue/serve-next", post(routes::serve_next))
        .route("/api/queue/:username/stack/:card_id", post(routes::toggle_stack))
        // Misc
        .route("/api/status", get(routes::get_status))
        .route("/health", get(routes::health))
        .route("/", get(serve_dashboard))
        .layer(cors)
        .with_state(state)
}

/// Serve the embedded HTML dashboard.
async fn serve_dashboard() -> Html<&'static str> {
    Html(DASHBOARD_HTML)
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
