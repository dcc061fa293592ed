//! Monitor configuration.
//!
//! All knobs come from the environment with fixed defaults; there is no
//! config file. The bind address and port tables are explicit here rather
//! than process-wide globals so the monitor can be constructed with any
//! network identity (and tests can bind ephemeral ports).

use std::net::IpAddr;

#[derive(Debug, Clone)]
pub struct MonitorConfig {
    /// Address every listener binds on (default 0.0.0.0)
    pub bind_addr: IpAddr,
    /// Gateway ingestion ports, one listener each (default 1337)
    pub gateway_ports: Vec<u16>,
    /// Query/control API port (default 1234)
    pub api_port: u16,
    /// Retained reports per gateway before the oldest is evicted (default 16)
    pub max_memory: usize,
    /// Drain/supervise cadence in milliseconds (default 500)
    pub poll_interval_ms: u64,
}

impl Default for MonitorConfig {
    fn default() -> Self {
        Self {
            bind_addr: std::env::var("BIND_ADDR")
                .ok()
                .and_then(|v| v.parse().ok())
                .unwrap_or_else(|| "0.0.0.0".parse().expect("valid literal")),
            gateway_ports: std::env::var("GATEWAY_PORTS")
                .ok()
                .map(|v| {
                    v.split(',')
                        .filter_map(|p| p.trim().parse().ok())
                        .collect()
                })
                .filter(|ports: &Vec<u16>| !ports.is_empty())
                .unwrap_or_else(|| vec![1337]),
            api_port: std::env::var("API_PORT")
                .ok()
                .and_then(|v| v.parse().ok())
                .unwrap_or(1234),
            max_memory: std::env::var("MAX_MEMORY")
                .ok()
                .and_then(|v| v.parse().ok())
                .unwrap_or(16),
            poll_interval_ms: std::env::var("POLL_INTERVAL_MS")
                .ok()
                .and_then(|v| v.parse().ok())
                .unwrap_or(500),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_match_deployment_values() {
        // Only meaningful when the env vars are unset, which is the normal
        // test environment.
        if std::env::var("GATEWAY_PORTS").is_ok() {
            return;
        }
        let cfg = MonitorConfig::default();
        assert_eq!(cfg.gateway_ports, vec![1337]);
        assert_eq!(cfg.api_port, 1234);
        assert_eq!(cfg.max_memory, 16);
        assert_eq!(cfg.poll_interval_ms, 500);
    }
}
