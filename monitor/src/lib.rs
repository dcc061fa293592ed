//! # beacon-monitor
//!
//! Aggregation monitor for short-range beacon sightings. Independent
//! physical gateways report device-id + RSSI readings over HTTP, one
//! ingestion listener per gateway port; the monitor retains a bounded recent
//! history per gateway and answers history queries through a supervised API
//! listener. A standalone trilateration solver lives in `beacon-types`.

pub mod api;
pub mod config;
pub mod history;
pub mod ingest;
pub mod monitor;
pub mod shutdown;
