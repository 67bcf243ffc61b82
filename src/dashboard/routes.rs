//! Dashboard API route handlers.
//!
//! All endpoints return JSON. State is shared via `Arc<DeskState>`.
//! Lookup failures are converted to a caller-visible error message —
//! never retried, never fatal to the process.

use axum::extract::{Path, Query, State};
use axum::http::StatusCode;
use axum::Json;
use chrono::{NaiveDate, Utc};
use futures::future::join_all;
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use tokio::sync::RwLock;
use tracing::warn;

use crate::inventory::{Condition, Era, Inventory, QueueEntry, ServingQueue};
use crate::lookup::CardLookup;
use crate::pricing::PricingEngine;
use crate::types::{Card, DeskError, PricingResult, UpcomingRelease};

// ---------------------------------------------------------------------------
// Shared state
// ---------------------------------------------------------------------------

/// Shared state accessible by all route handlers.
pub struct DeskState {
    pub shop_name: String,
    pub lookup: Arc<dyn CardLookup>,
    pub engine: PricingEngine,
    pub inventory: RwLock<Inventory>,
    pub queue: RwLock<ServingQueue>,
}

impl DeskState {
    pub fn new(
        shop_name: String,
        lookup: Arc<dyn CardLookup>,
        engine: PricingEngine,
        inventory: Inventory,
    ) -> Self {
        Self {
            shop_name,
            lookup,
            engine,
            inventory: RwLock::new(inventory),
            queue: RwLock::new(ServingQueue::new()),
        }
    }
}

pub type AppState = Arc<DeskState>;

// ---------------------------------------------------------------------------
// Request/response types
// ---------------------------------------------------------------------------

#[derive(Debug, Deserialize)]
pub struct SearchParams {
    pub q: String,
}

#[derive(Debug, Clone, Serialize)]
pub struct CardView {
    pub card: Card,
    pub pricing: PricingResult,
}

#[derive(Debug, Clone, Serialize)]
pub struct InventoryEntryView {
    pub id: String,
    pub name: String,
    pub condition: Condition,
    pub era: Era,
    pub available: bool,
    /// Whether some customer holds this card in their stack.
    pub stacked: bool,
}

#[derive(Debug, Clone, Serialize)]
pub struct PricedInventoryEntry {
    #[serde(flatten)]
    pub entry: InventoryEntryView,
    /// Present when the lookup resolved.
    pub pricing: Option<PricingResult>,
    pub image_small: Option<String>,
    /// Display-level message when the lookup failed for this card.
    pub error: Option<String>,
}

#[derive(Debug, Clone, Serialize)]
pub struct QueueView {
    pub now_serving: Option<QueueEntry>,
    pub waiting: Vec<QueueEntry>,
}

#[derive(Debug, Deserialize)]
pub struct JoinRequest {
    pub username: String,
    pub priority: u32,
}

#[derive(Debug, Clone, Serialize)]
pub struct ToggleResponse {
    pub card_id: String,
    pub stacked: bool,
}

#[derive(Debug, Clone, Serialize)]
pub struct StatusResponse {
    pub shop: String,
    pub lookup_service: String,
    pub catalog_releases: usize,
    pub inventory_total: usize,
    pub inventory_available: usize,
    pub queue_length: usize,
}

#[derive(Debug, Clone, Serialize)]
pub struct ErrorBody {
    pub error: String,
}

type ApiError = (StatusCode, Json<ErrorBody>);

fn api_error(status: StatusCode, message: impl Into<String>) -> ApiError {
    (status, Json(ErrorBody { error: message.into() }))
}

/// Map a lookup failure to a caller-visible error response.
fn lookup_error(err: anyhow::Error) -> ApiError {
    match err.downcast_ref::<DeskError>() {
        Some(DeskError::CardNotFound(id)) => {
            api_error(StatusCode::NOT_FOUND, format!("No card data found for \"{id}\""))
        }
        _ => {
            warn!(error = %err, "Card lookup failed");
            api_error(
                StatusCode::BAD_GATEWAY,
                "Error fetching card data. Please try again later.",
            )
        }
    }
}

/// Evaluation date for the rotation rule: today's wall-clock date.
/// Tests exercise the engine with pinned dates instead.
fn today() -> NaiveDate {
    Utc::now().date_naive()
}

// ---------------------------------------------------------------------------
// Card routes
// ---------------------------------------------------------------------------

/// GET /api/search?q=...
pub async fn search_cards(
    State(state): State<AppState>,
    Query(params): Query<SearchParams>,
) -> Result<Json<Vec<Card>>, ApiError> {
    if params.q.trim().is_empty() {
        return Err(api_error(StatusCode::BAD_REQUEST, "Empty search query"));
    }
    let cards = state.lookup.search(&params.q).await.map_err(lookup_error)?;
    Ok(Json(cards))
}

/// GET /api/cards/:id — card record plus the full pricing panel.
pub async fn card_pricing(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<Json<CardView>, ApiError> {
    let card = state.lookup.card_by_id(&id).await.map_err(lookup_error)?;
    let pricing = state
        .engine
        .estimate(&card.name, card.set_release_date, &card.snapshot, today());
    Ok(Json(CardView { card, pricing }))
}

/// GET /api/releases — the upcoming-release catalog, in priority order.
pub async fn list_releases(State(state): State<AppState>) -> Json<Vec<UpcomingRelease>> {
    Json(state.engine.catalog().releases().to_vec())
}

// ---------------------------------------------------------------------------
// Inventory routes
// ---------------------------------------------------------------------------

/// GET /api/inventory
pub async fn list_inventory(State(state): State<AppState>) -> Json<Vec<InventoryEntryView>> {
    let inventory = state.inventory.read().await;
    let queue = state.queue.read().await;

    let entries = inventory
        .items()
        .iter()
        .map(|item| InventoryEntryView {
            id: item.id.clone(),
            name: item.name.clone(),
            condition: item.condition,
            era: item.era,
            available: item.available,
            stacked: queue.is_card_stacked(&item.id),
        })
        .collect();

    Json(entries)
}

/// GET /api/inventory/priced — inventory with live pricing attached.
///
/// One independent, unordered fetch per card; a failed fetch degrades
/// that entry to an error message and the rest still price normally.
pub async fn priced_inventory(
    State(state): State<AppState>,
) -> Json<Vec<PricedInventoryEntry>> {
    let (items, stacked): (Vec<_>, Vec<_>) = {
        let inventory = state.inventory.read().await;
        let queue = state.queue.read().await;
        inventory
            .items()
            .iter()
            .map(|item| (item.clone(), queue.is_card_stacked(&item.id)))
            .unzip()
    };

    let fetches = items.iter().map(|item| state.lookup.card_by_id(&item.id));
    let results = join_all(fetches).await;

    let evaluation_date = today();
    let entries = items
        .into_iter()
        .zip(stacked)
        .zip(results)
        .map(|((item, stacked), result)| {
            let entry = InventoryEntryView {
                id: item.id.clone(),
                name: item.name.clone(),
                condition: item.condition,
                era: item.era,
                available: item.available,
                stacked,
            };
            match result {
                Ok(card) => {
                    let pricing = state.engine.estimate(
                        &card.name,
                        card.set_release_date,
                        &card.snapshot,
                        evaluation_date,
                    );
                    PricedInventoryEntry {
                        entry,
                        pricing: Some(pricing),
                        image_small: card.image_small,
                        error: None,
                    }
                }
                Err(e) => {
                    warn!(card_id = %item.id, error = %e, "Inventory pricing fetch failed");
                    PricedInventoryEntry {
                        entry,
                        pricing: None,
                        image_small: None,
                        error: Some("Error fetching card data. Please try again later.".to_string()),
                    }
                }
            }
        })
        .collect();

    Json(entries)
}

/// POST /api/inventory/:id/sold
pub async fn mark_sold(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<StatusCode, ApiError> {
    let mut inventory = state.inventory.write().await;
    inventory
        .mark_sold(&id)
        .map_err(|e| api_error(StatusCode::NOT_FOUND, e.to_string()))?;
    Ok(StatusCode::OK)
}

// ---------------------------------------------------------------------------
// Queue routes
// ---------------------------------------------------------------------------

/// GET /api/queue
pub async fn get_queue(State(state): State<AppState>) -> Json<QueueView> {
    let queue = state.queue.read().await;
    let entries = queue.entries();
    Json(QueueView {
        now_serving: entries.first().cloned(),
        waiting: entries.iter().skip(1).cloned().collect(),
    })
}

/// POST /api/queue — a customer joins the queue.
pub async fn join_queue(
    State(state): State<AppState>,
    Json(req): Json<JoinRequest>,
) -> Result<StatusCode, ApiError> {
    if req.username.trim().is_empty() {
        return Err(api_error(StatusCode::BAD_REQUEST, "Username must not be empty"));
    }
    let mut queue = state.queue.write().await;
    queue
        .join(&req.username, req.priority)
        .map_err(|e| api_error(StatusCode::CONFLICT, e.to_string()))?;
    Ok(StatusCode::CREATED)
}

/// POST /api/queue/:username/stack/:card_id — toggle a reservation.
pub async fn toggle_stack(
    State(state): State<AppState>,
    Path((username, card_id)): Path<(String, String)>,
) -> Result<Json<ToggleResponse>, ApiError> {
    let mut queue = state.queue.write().await;
    let stacked = queue
        .toggle_stack(&username, &card_id)
        .map_err(|e| api_error(StatusCode::NOT_FOUND, e.to_string()))?;
    Ok(Json(ToggleResponse { card_id, stacked }))
}

/// POST /api/queue/serve-next — complete the sale at the head of the queue.
pub async fn serve_next(
    State(state): State<AppState>,
) -> Result<Json<QueueEntry>, ApiError> {
    let mut queue = state.queue.write().await;
    queue
        .serve_next()
        .map(Json)
        .ok_or_else(|| api_error(StatusCode::NOT_FOUND, "The queue is empty"))
}

// ---------------------------------------------------------------------------
// Misc
// ---------------------------------------------------------------------------

/// GET /api/status
pub async fn get_status(State(state): State<AppState>) -> Json<StatusResponse> {
    let inventory = state.inventory.read().await;
    let queue = state.queue.read().await;
    Json(StatusResponse {
        shop: state.shop_name.clone(),
        lookup_service: state.lookup.name().to_string(),
        catalog_releases: state.engine.catalog().len(),
        inventory_total: inventory.items().len(),
        inventory_available: inventory.items().iter().filter(|i| i.available).count(),
        queue_length: queue.entries().len(),
    })
}

/// GET /health
pub async fn health() -> StatusCode {
    StatusCode::OK
}
