//! Query/control API listener.
//!
//! Two operations:
//! - `GET /<any-path>`: diagnostic echo — the path is stripped of leading and
//!   trailing separators, split into segments, and echoed back as plain text.
//!   Extension point for future command routing; today only the echo exists.
//! - `POST /path-to-some/CONFIG`: history query. Body is JSON with an
//!   optional `port` (missing means `-1`).
//!
//! Wire contract quirk, preserved for compatibility with existing clients:
//! the query route always answers HTTP 200 and signals logical failure only
//! through `"success":"false"` in the body. The status line does not reflect
//! failure.

use std::sync::Arc;

use axum::body::Bytes;
use axum::extract::State;
use axum::http::{Method, StatusCode, Uri};
use axum::response::{IntoResponse, Response};
use axum::routing::post;
use axum::{Json, Router};
use tower_http::cors::{Any, CorsLayer};
use tracing::debug;

use beacon_types::{QueryRequest, QueryResponse};

use crate::monitor::Monitor;

/// The single recognized query route (minus the leading slash).
const CONFIG_ROUTE: &str = "path-to-some/CONFIG";

pub fn router(monitor: Arc<Monitor>) -> Router {
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any);

    Router::new()
        .route("/path-to-some/CONFIG", post(query).get(echo))
        .fallback(diagnostic)
        .layer(cors)
        .with_state(monitor)
}

/// Everything that is not the query route: GET echoes, POST answers the
/// unknown-route failure body (still 200, see module docs).
async fn diagnostic(method: Method, uri: Uri) -> Response {
    match method {
        Method::GET => echo(uri).await.into_response(),
        Method::POST => Json(QueryResponse::failed(None)).into_response(),
        _ => StatusCode::METHOD_NOT_ALLOWED.into_response(),
    }
}

async fn echo(uri: Uri) -> String {
    let parsed = uri.path().trim_matches('/');
    let segments: Vec<&str> = parsed.split('/').collect();
    debug!("API echo: {segments:?}");
    segments.join("/")
}

async fn query(State(monitor): State<Arc<Monitor>>, body: Bytes) -> (StatusCode, Json<QueryResponse>) {
    let request: QueryRequest = match serde_json::from_slice(&body) {
        Ok(req) => req,
        Err(e) => {
            return (
                StatusCode::OK,
                Json(QueryResponse::failed(Some(e.to_string()))),
            );
        }
    };

    debug!("API query: {CONFIG_ROUTE} port={}", request.port);

    let response = match monitor.query_history(request.port).await {
        Some(sequence) => match serde_json::to_string(&sequence) {
            Ok(data) => QueryResponse::ok(data),
            Err(e) => QueryResponse::failed(Some(e.to_string())),
        },
        None => QueryResponse::ok("NULL".to_string()),
    };
    (StatusCode::OK, Json(response))
}
