//! # monitor
//!
//! The aggregation monitor: owns the report queue, the bounded per-gateway
//! history, and every HTTP listener task. Runs the drain/supervise loop.
//!
//! ## Architecture
//! - One tokio task per ingestion listener (one listener per gateway port)
//!   plus a single query/control API listener.
//! - Listener handlers push raw reports into an unbounded mpsc channel; the
//!   drain loop is the channel's only consumer and the only writer to the
//!   history store. API reads take the store's read lock, so a query never
//!   observes a half-applied drain.
//! - The drain loop also supervises the API listener: a dead API worker is
//!   relaunched on the same port within one polling interval. Ingestion
//!   listeners are deliberately not supervised — a crashed gateway worker
//!   stays down until process restart.
//!
//! ## Known limitations
//! - No per-request timeout: a stalled client holds its connection open
//!   indefinitely.
//! - Ingestion has no backpressure; the queue grows without bound if the
//!   drain loop stalls.

use std::net::SocketAddr;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::time::Duration;

use axum::Router;
use chrono::{DateTime, Utc};
use serde_json::Value;
use thiserror::Error;
use tokio::net::TcpListener;
use tokio::sync::{mpsc, watch, Mutex, RwLock};
use tokio::task::JoinHandle;
use tracing::{debug, info, warn};

use crate::config::MonitorConfig;
use crate::history::HistoryStore;
use crate::{api, ingest};

// ── Report queue entry ────────────────────────────────────────────────────────

/// One raw gateway sighting, as accepted by an ingestion listener.
#[derive(Debug, Clone)]
pub struct BeaconReport {
    /// Opaque beacon payload (device id + RSSI reading)
    pub payload: Value,
    /// Port of the listener that accepted the report
    pub source_port: u16,
    pub received_at: DateTime<Utc>,
}

// ── Errors ────────────────────────────────────────────────────────────────────

#[derive(Debug, Error)]
pub enum MonitorError {
    /// Startup bind failures are fatal; the process cannot proceed without
    /// its listeners.
    #[error("failed to bind listener on port {port}: {source}")]
    Bind {
        port: u16,
        #[source]
        source: std::io::Error,
    },
}

// ── Listener bookkeeping ──────────────────────────────────────────────────────

struct ListenerHandle {
    addr: SocketAddr,
    task: JoinHandle<()>,
}

// ── Monitor ───────────────────────────────────────────────────────────────────

pub struct Monitor {
    config: MonitorConfig,
    report_tx: mpsc::UnboundedSender<BeaconReport>,
    /// Held only by the drain routine; a Mutex rather than exclusive
    /// ownership so `drain_once` can stay `&self`.
    report_rx: Mutex<mpsc::UnboundedReceiver<BeaconReport>>,
    history: RwLock<HistoryStore>,
    gateways: Mutex<Vec<ListenerHandle>>,
    api: Mutex<Option<ListenerHandle>>,
    running: AtomicBool,
    shutdown_tx: watch::Sender<bool>,
}

impl Monitor {
    pub fn new(config: MonitorConfig) -> Self {
        let (report_tx, report_rx) = mpsc::unbounded_channel();
        let (shutdown_tx, _) = watch::channel(false);
        let max_memory = config.max_memory;
        Self {
            config,
            report_tx,
            report_rx: Mutex::new(report_rx),
            history: RwLock::new(HistoryStore::new(max_memory)),
            gateways: Mutex::new(Vec::new()),
            api: Mutex::new(None),
            running: AtomicBool::new(true),
            shutdown_tx,
        }
    }

    pub fn is_running(&self) -> bool {
        self.running.load(Ordering::SeqCst)
    }

    /// Enqueue a single beacon sighting. Never blocks and never fails from
    /// the caller's view; reports arriving during teardown are dropped.
    pub fn add_data(&self, payload: Value, source_port: u16) {
        let report = BeaconReport {
            payload,
            source_port,
            received_at: Utc::now(),
        };
        if self.report_tx.send(report).is_err() {
            debug!("report for port {source_port} dropped — queue closed");
        }
    }

    /// Stored sequence for a gateway port, oldest first. `None` for an
    /// unknown or non-positive port (the `"NULL"` sentinel on the wire).
    pub async fn query_history(&self, port: i64) -> Option<Vec<Value>> {
        if port <= 0 || port > u16::MAX as i64 {
            return None;
        }
        self.history.read().await.get(port as u16)
    }

    // ── Listener lifecycle ────────────────────────────────────────────────

    /// Bind and launch an ingestion listener for one gateway port. The
    /// actually-bound address is returned (and is what reports get keyed by,
    /// which matters when binding port 0 in tests).
    pub async fn add_listener(self: &Arc<Self>, port: u16) -> Result<SocketAddr, MonitorError> {
        let listener = self.bind(port).await?;
        let addr = listener.local_addr().map_err(|source| MonitorError::Bind { port, source })?;
        let app = ingest::router(self.clone(), addr.port());
        let task = self.spawn_serve(listener, app);
        info!("📥 Started gateway listener on {addr}");
        self.gateways.lock().await.push(ListenerHandle { addr, task });
        Ok(addr)
    }

    /// Bind and launch the API listener. At most one is ever active; calling
    /// this while one is alive replaces a dead handle only.
    pub async fn launch_api(self: &Arc<Self>) -> Result<SocketAddr, MonitorError> {
        let addr = self.spawn_api(self.config.api_port).await?;
        info!("📡 API listener on {addr}");
        Ok(addr)
    }

    async fn spawn_api(self: &Arc<Self>, port: u16) -> Result<SocketAddr, MonitorError> {
        let listener = self.bind(port).await?;
        let addr = listener.local_addr().map_err(|source| MonitorError::Bind { port, source })?;
        let app = api::router(self.clone());
        let task = self.spawn_serve(listener, app);
        *self.api.lock().await = Some(ListenerHandle { addr, task });
        Ok(addr)
    }

    pub async fn api_addr(&self) -> Option<SocketAddr> {
        self.api.lock().await.as_ref().map(|h| h.addr)
    }

    async fn bind(&self, port: u16) -> Result<TcpListener, MonitorError> {
        TcpListener::bind((self.config.bind_addr, port))
            .await
            .map_err(|source| MonitorError::Bind { port, source })
    }

    /// Serve until the shutdown signal fires; graceful shutdown drops the
    /// transport, which is what unblocks the accept loop.
    fn spawn_serve(&self, listener: TcpListener, app: Router) -> JoinHandle<()> {
        let mut shutdown_rx = self.shutdown_tx.subscribe();
        tokio::spawn(async move {
            let shutdown = async move {
                let _ = shutdown_rx.wait_for(|stop| *stop).await;
            };
            if let Err(e) = axum::serve(listener, app)
                .with_graceful_shutdown(shutdown)
                .await
            {
                warn!("listener exited with error: {e}");
            }
        })
    }

    // ── Drain & supervise ─────────────────────────────────────────────────

    /// One drain cycle: check API liveness, then pop the queue until empty,
    /// appending each payload to its gateway's history. This is the single
    /// authorized mutator of the history store.
    pub async fn drain_once(self: &Arc<Self>) {
        if self.is_running() {
            self.supervise_api().await;
        }

        let mut rx = self.report_rx.lock().await;
        let mut history = self.history.write().await;
        while let Ok(report) = rx.try_recv() {
            history.push(report.source_port, report.payload);
        }
    }

    /// Non-blocking liveness probe of the API worker; relaunch on the same
    /// port if it has terminated. A failed rebind keeps the dead handle so
    /// the next cycle retries.
    async fn supervise_api(self: &Arc<Self>) {
        let port = {
            let slot = self.api.lock().await;
            match slot.as_ref() {
                Some(h) if h.task.is_finished() => h.addr.port(),
                _ => return,
            }
        };
        match self.spawn_api(port).await {
            Ok(addr) => warn!("API listener relaunched on {addr}"),
            Err(e) => warn!("API listener dead and relaunch failed: {e}"),
        }
    }

    /// Drain/supervise loop at the configured cadence; returns once `stop`
    /// has been observed and every listener task has been joined.
    pub async fn run(self: &Arc<Self>) {
        let mut ticker = tokio::time::interval(Duration::from_millis(self.config.poll_interval_ms));
        while self.is_running() {
            ticker.tick().await;
            self.drain_once().await;
        }
        self.join_listeners().await;
    }

    /// Request shutdown: clears the running flag and fires the shutdown
    /// signal every serve task is watching.
    pub fn stop(&self) {
        if self.running.swap(false, Ordering::SeqCst) {
            info!("Monitor close queued");
            let _ = self.shutdown_tx.send(true);
        }
    }

    async fn join_listeners(&self) {
        for handle in self.gateways.lock().await.drain(..) {
            let _ = handle.task.await;
        }
        if let Some(handle) = self.api.lock().await.take() {
            let _ = handle.task.await;
        }
        info!("All listeners closed");
    }
}
