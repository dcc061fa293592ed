//! Gateway ingestion listener.
//!
//! One router instance per configured gateway port: `POST /` with a JSON
//! body carrying a `data` field. The accepted payload is queued for the
//! drain loop keyed by the listener's bound port — the bound port, not any
//! client-supplied field, is the routing authority.

use std::sync::Arc;

use axum::body::Bytes;
use axum::extract::State;
use axum::http::{header, HeaderMap, StatusCode};
use axum::response::{IntoResponse, Response};
use axum::routing::post;
use axum::Router;
use tracing::{debug, warn};

use beacon_types::DepositEnvelope;

use crate::monitor::Monitor;

#[derive(Clone)]
struct IngestState {
    monitor: Arc<Monitor>,
    /// Port this listener is bound to; the source key for every report it
    /// accepts.
    port: u16,
}

pub fn router(monitor: Arc<Monitor>, port: u16) -> Router {
    Router::new()
        .route("/", post(deposit))
        .with_state(IngestState { monitor, port })
}

/// A malformed body answers 400 and leaves the listener serving; it must
/// never take the worker down with it.
async fn deposit(State(state): State<IngestState>, headers: HeaderMap, body: Bytes) -> Response {
    let envelope: DepositEnvelope = match serde_json::from_slice(&body) {
        Ok(env) => env,
        Err(e) => {
            warn!("gateway {}: malformed deposit: {e}", state.port);
            return (StatusCode::BAD_REQUEST, format!("malformed deposit: {e}")).into_response();
        }
    };

    let host = headers
        .get(header::HOST)
        .and_then(|h| h.to_str().ok())
        .unwrap_or("-");
    debug!("P#{} H#{host}\t{}", state.port, envelope.data);

    state.monitor.add_data(envelope.data, state.port);
    (StatusCode::OK, "OK").into_response()
}
