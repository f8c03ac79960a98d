//! Common test helpers for integration tests.
//!
//! The `#![allow(dead_code)]` attribute is necessary because each
//! integration test file compiles this module as part of a separate crate
//! and uses only some of the helpers.

#![allow(dead_code)]

use std::sync::Arc;

use axum::Router;
use axum::body::Body;
use axum::http::{Request, StatusCode};
use http_body_util::BodyExt;
use proptest::prelude::*;
use tower::ServiceExt;

use client_lanes::api::{AppState, create_router};
use client_lanes::domain::{Client, ClientId, Lane, Priority, ReorderRequest};
use client_lanes::infrastructure::InMemoryClientStore;

// =============================================================================
// Fixtures
// =============================================================================

pub fn id(value: i64) -> ClientId {
    ClientId::new(value).unwrap()
}

pub fn client(client_id: i64, lane: Lane, priority: i64) -> Client {
    Client::new(
        id(client_id),
        format!("client-{client_id}"),
        lane,
        Priority::new(priority).unwrap(),
    )
}

/// Backlog A(1), B(2), C(3) at priorities 1, 2, 3.
pub fn backlog_abc() -> Vec<Client> {
    vec![
        client(1, Lane::Backlog, 1),
        client(2, Lane::Backlog, 2),
        client(3, Lane::Backlog, 3),
    ]
}

/// Builds a dense layout: ids `1..=lanes.len()`, the `i`-th id placed in
/// `lanes[i]`, ranked within its lane by position in `order`.
pub fn dense_layout(lanes: &[Lane], order: &[usize]) -> Vec<Client> {
    let mut clients: Vec<Client> = lanes
        .iter()
        .enumerate()
        .map(|(index, lane)| client(i64::try_from(index).unwrap() + 1, *lane, 1))
        .collect();

    let mut next = [1_i64; 3];
    for &index in order {
        let lane = clients[index].status;
        let slot = Lane::ALL.iter().position(|candidate| *candidate == lane).unwrap();
        clients[index].priority = Priority::new(next[slot]).unwrap();
        next[slot] += 1;
    }
    clients
}

// =============================================================================
// Strategies
// =============================================================================

pub fn lane_strategy() -> impl Strategy<Value = Lane> {
    proptest::sample::select(Lane::ALL.to_vec())
}

/// Arbitrary dense layouts of one to fourteen clients.
pub fn layout_strategy() -> impl Strategy<Value = Vec<Client>> {
    (1_usize..15).prop_flat_map(|count| {
        (
            proptest::collection::vec(lane_strategy(), count),
            Just((0..count).collect::<Vec<_>>()).prop_shuffle(),
        )
            .prop_map(|(lanes, order)| dense_layout(&lanes, &order))
    })
}

/// A layout together with a request targeting one of its clients.
///
/// Priorities may exceed the destination lane so that clamping is covered.
pub fn layout_and_request() -> impl Strategy<Value = (Vec<Client>, ReorderRequest)> {
    layout_strategy().prop_flat_map(|clients| {
        let count = clients.len();
        let ceiling = i64::try_from(count).unwrap() + 2;
        (
            Just(clients),
            1..=i64::try_from(count).unwrap(),
            proptest::option::of(lane_strategy()),
            proptest::option::of(1..=ceiling),
        )
            .prop_map(|(clients, target, status, priority)| {
                let request = ReorderRequest {
                    target: id(target),
                    status,
                    priority: priority.map(|value| Priority::new(value).unwrap()),
                };
                (clients, request)
            })
    })
}

// =============================================================================
// Router Helpers
// =============================================================================

pub fn create_test_app(clients: Vec<Client>) -> Router {
    let store = InMemoryClientStore::with_clients(clients);
    create_router(AppState::new(Arc::new(store)))
}

/// Sends a request and returns the status and the decoded JSON body.
///
/// Non-JSON bodies decode to `Value::Null`.
pub async fn send(
    app: Router,
    method: &str,
    uri: &str,
    body: Option<serde_json::Value>,
) -> (StatusCode, serde_json::Value) {
    let builder = Request::builder().method(method).uri(uri);
    let request = match body {
        Some(body) => builder
            .header("content-type", "application/json")
            .body(Body::from(body.to_string()))
            .unwrap(),
        None => builder.body(Body::empty()).unwrap(),
    };

    let response = app.oneshot(request).await.unwrap();
    let status = response.status();
    let bytes = response.into_body().collect().await.unwrap().to_bytes();
    let json = serde_json::from_slice(&bytes).unwrap_or(serde_json::Value::Null);
    (status, json)
}

/// Projects a JSON client list onto `(id, status, priority)` triples.
pub fn placements(json: &serde_json::Value) -> Vec<(i64, String, u64)> {
    json.as_array()
        .unwrap()
        .iter()
        .map(|client| {
            (
                client["id"].as_i64().unwrap(),
                client["status"].as_str().unwrap().to_string(),
                client["priority"].as_u64().unwrap(),
            )
        })
        .collect()
}
