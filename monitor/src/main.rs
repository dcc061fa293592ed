use std::sync::Arc;

use tracing::info;

use beacon_monitor::config::MonitorConfig;
use beacon_monitor::monitor::Monitor;
use beacon_monitor::shutdown;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Logging
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "beacon_monitor=info".into()),
        )
        .init();

    let config = MonitorConfig::default();
    info!(
        "🛰  Beacon monitor starting — bind {}, gateways {:?}, API port {}",
        config.bind_addr, config.gateway_ports, config.api_port
    );

    let monitor = Arc::new(Monitor::new(config.clone()));

    // A bind failure here is fatal — the process cannot run partially deaf.
    monitor.launch_api().await?;
    for port in &config.gateway_ports {
        monitor.add_listener(*port).await?;
    }

    // Console control, so the monitor can be stopped without a signal
    shutdown::spawn(monitor.clone());

    // Drain/supervise loop; returns once shutdown has been requested and
    // every listener task has been joined.
    monitor.run().await;

    info!("Monitor stopped");
    Ok(())
}
