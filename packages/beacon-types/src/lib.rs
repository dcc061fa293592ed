//! # beacon-types
//!
//! Shared wire structures for the beacon aggregation monitor.
//!
//! These types are used by:
//! - `monitor`: decoding gateway deposits and answering history queries
//! - external gateway firmware / test clients: producing deposits and
//!   consuming query responses
//!
//! ## Wire conventions
//!
//! - All bodies are JSON. Beacon payloads (device id + RSSI reading) are
//!   carried opaquely as `serde_json::Value` — the monitor stores and returns
//!   them without interpreting their shape.
//! - A query that finds no history answers the literal string `"NULL"` in the
//!   `data` field, with `success` still `"true"`.
//! - `success` is the string `"true"`/`"false"`, not a JSON boolean; existing
//!   gateway clients key off the string form.

use serde::{Deserialize, Serialize};
use serde_json::Value;

pub mod trilateration;

pub use trilateration::{solve, GeometryError, Pos2D};

// ── Gateway deposit (gateway → ingestion listener) ───────────────────────────

/// Body of a gateway `POST /` deposit. The `data` field is the beacon sighting
/// itself and is mandatory; everything else in the body is ignored.
///
/// The reporting gateway is identified by the port the listener is bound to,
/// never by anything inside this envelope.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DepositEnvelope {
    /// Opaque beacon sighting (device identifier + signal-strength reading)
    pub data: Value,
}

// ── History query (client → API listener) ────────────────────────────────────

fn default_port() -> i64 {
    -1
}

/// Body of `POST /path-to-some/CONFIG`. A missing `port` is treated as `-1`,
/// which the monitor answers with the `"NULL"` sentinel.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct QueryRequest {
    #[serde(default = "default_port")]
    pub port: i64,
}

/// Response body for the query route.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct QueryResponse {
    /// `"true"` when the lookup ran (even if it found nothing), `"false"` on
    /// an unknown route or an internal failure.
    pub success: String,
    /// JSON-serialized history sequence, or `"NULL"` when the port is
    /// unknown or non-positive. Absent on failure.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub data: Option<String>,
    /// Failure detail, present only when `success` is `"false"` with a cause.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

impl QueryResponse {
    pub fn ok(data: String) -> Self {
        Self {
            success: "true".to_string(),
            data: Some(data),
            error: None,
        }
    }

    pub fn failed(error: Option<String>) -> Self {
        Self {
            success: "false".to_string(),
            data: None,
            error,
        }
    }
}
