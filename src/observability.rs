use std::net::SocketAddr;

use crate::wire::Command;

// ── RED metrics (request-driven) ────────────────────────────────

/// Counter: total requests processed. Labels: command, status.
pub const REQUESTS_TOTAL: &str = "stanza_requests_total";

/// Histogram: request latency in seconds. Labels: command.
pub const REQUEST_DURATION_SECONDS: &str = "stanza_request_duration_seconds";

/// Counter: allocation or modification requests turned away for capacity.
pub const ALLOCATIONS_REJECTED_TOTAL: &str = "stanza_allocations_rejected_total";

// ── USE metrics (resource utilization) ──────────────────────────

/// Gauge: active TCP connections.
pub const CONNECTIONS_ACTIVE: &str = "stanza_connections_active";

/// Counter: total connections accepted.
pub const CONNECTIONS_TOTAL: &str = "stanza_connections_total";

/// Counter: connections rejected due to limit.
pub const CONNECTIONS_REJECTED_TOTAL: &str = "stanza_connections_rejected_total";

/// Gauge: reservations currently held by the engine.
pub const RESERVATIONS_ACTIVE: &str = "stanza_reservations_active";

/// Install Prometheus metrics exporter on the given port. No-op if port is None.
pub fn init(port: Option<u16>) {
    let Some(port) = port else { return };
    let addr: SocketAddr = ([0, 0, 0, 0], port).into();
    metrics_exporter_prometheus::PrometheusBuilder::new()
        .with_http_listener(addr)
        .install()
        .expect("failed to install Prometheus metrics exporter");
    tracing::info!("metrics endpoint: http://0.0.0.0:{port}/metrics");
}

/// Map a Command variant to a short label for metrics.
pub fn command_label(cmd: &Command) -> &'static str {
    match cmd {
        Command::Room { .. } => "room",
        Command::Request { .. } => "request",
        Command::Change { .. } => "change",
        Command::Cancel { .. } => "cancel",
        Command::List { .. } => "list",
    }
}
