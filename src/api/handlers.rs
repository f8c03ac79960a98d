//! HTTP handlers for the client lanes API.
//!
//! Handlers validate input, delegate to the store or the reorder service,
//! and map failures onto [`ApiErrorResponse`].

use std::sync::Arc;

use axum::{
    Json,
    extract::{Path, Query, State},
};

use super::dto::{ClientResponse, ListClientsQuery, UpdateClientRequest};
use super::error::ApiErrorResponse;
use crate::application::ReorderService;
use crate::domain::ClientId;
use crate::infrastructure::ClientStore;

// =============================================================================
// Application State
// =============================================================================

/// Shared state handed to every handler.
///
/// Reads go straight to the store; every write goes through the reorder
/// service so that lane updates are serialised.
#[derive(Clone)]
pub struct AppState {
    /// Client store used for reads.
    pub store: Arc<dyn ClientStore>,
    /// Reorder workflow used for writes.
    pub reorder: Arc<ReorderService>,
}

impl AppState {
    /// Creates state whose reorder service writes through `store`.
    #[must_use]
    pub fn new(store: Arc<dyn ClientStore>) -> Self {
        let reorder = Arc::new(ReorderService::new(Arc::clone(&store)));
        Self { store, reorder }
    }
}

// =============================================================================
// Health
// =============================================================================

/// Health check response body.
#[derive(Debug, Clone, serde::Serialize)]
pub struct HealthResponse {
    /// Service status.
    pub status: &'static str,
    /// Service version.
    pub version: &'static str,
}

/// Health check endpoint.
pub async fn health_check() -> Json<HealthResponse> {
    Json(HealthResponse {
        status: "healthy",
        version: env!("CARGO_PKG_VERSION"),
    })
}

// =============================================================================
// Clients
// =============================================================================

/// Lists clients, optionally restricted to one lane.
///
/// The lane filter returns clients in priority order; the unfiltered list is
/// ordered by id.
///
/// # Errors
///
/// - 400 `VALIDATION_ERROR` if `status` is not a lane name
/// - 500 `INTERNAL_ERROR` if the store fails
pub async fn list_clients(
    State(state): State<AppState>,
    Query(query): Query<ListClientsQuery>,
) -> Result<Json<Vec<ClientResponse>>, ApiErrorResponse> {
    let lane = query.lane()?;
    let mut clients = state.store.fetch_all().await?;

    if let Some(lane) = lane {
        clients.retain(|client| client.status == lane);
        clients.sort_by_key(|client| client.priority);
    }

    Ok(Json(clients.iter().map(ClientResponse::from).collect()))
}

/// Returns a single client.
///
/// # Errors
///
/// - 400 `INVALID_CLIENT_ID` if the path segment is not a positive integer
/// - 404 `NOT_FOUND` if no client has that id
pub async fn get_client(
    State(state): State<AppState>,
    Path(raw_id): Path<String>,
) -> Result<Json<ClientResponse>, ApiErrorResponse> {
    let id = parse_client_id(&raw_id)?;

    state
        .store
        .fetch_by_id(id)
        .await?
        .map(|client| Json(ClientResponse::from(client)))
        .ok_or_else(|| ApiErrorResponse::not_found(format!("Client {id} not found")))
}

/// Moves a client to a new lane and/or priority.
///
/// Responds with every client after the move, ordered by id.
///
/// # Errors
///
/// - 400 `INVALID_CLIENT_ID` if the path segment is not a positive integer
/// - 404 `NOT_FOUND` if no client has that id
/// - 400 `VALIDATION_ERROR` if `status` or `priority` is invalid
/// - 500 `INTERNAL_ERROR` if the store fails; no lane is changed
pub async fn update_client(
    State(state): State<AppState>,
    Path(raw_id): Path<String>,
    Json(body): Json<UpdateClientRequest>,
) -> Result<Json<Vec<ClientResponse>>, ApiErrorResponse> {
    let id = parse_client_id(&raw_id)?;

    if state.store.fetch_by_id(id).await?.is_none() {
        return Err(ApiErrorResponse::not_found(format!("Client {id} not found")));
    }

    let request = body.validate(id)?;
    let snapshot = state.reorder.reorder(request).await?;

    Ok(Json(snapshot.iter().map(ClientResponse::from).collect()))
}

fn parse_client_id(raw: &str) -> Result<ClientId, ApiErrorResponse> {
    raw.trim()
        .parse::<i64>()
        .ok()
        .and_then(|value| ClientId::new(value).ok())
        .ok_or_else(|| {
            ApiErrorResponse::bad_request(
                "INVALID_CLIENT_ID",
                format!("Client id must be a positive integer, got {raw:?}"),
            )
        })
}

// =============================================================================
// Tests
// =============================================================================
