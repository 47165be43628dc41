use metrics::{Counter, Histogram};
use metrics_derive::Metrics;
use metrics_exporter_prometheus::{BuildError, PrometheusBuilder};
use std::net::SocketAddr;
use tokio::time::Duration;

/// `record_histogram` lets us record with tags.
pub fn record_histogram(route_latency: Duration, route: &'static str) {
    metrics::histogram!("txn_ingress_route_latency", "route" => route)
        .record(route_latency.as_secs_f64());
}

/// Metrics for the `txn_ingress` component.
/// Conventions:
/// - Durations are recorded in seconds (histograms).
/// - Counters are monotonic event counts.
#[derive(Metrics, Clone)]
#[metrics(scope = "txn_ingress")]
pub struct Metrics {
    #[metric(describe = "Number of transactions submitted to the gateway")]
    pub transactions_received: Counter,

    #[metric(describe = "Number of transactions rejected as invalid")]
    pub transactions_rejected: Counter,

    #[metric(describe = "Number of transactions handed to the broker client")]
    pub publish_accepted: Counter,

    #[metric(describe = "Number of transactions the broker client refused")]
    pub publish_failed: Counter,

    #[metric(describe = "Number of messages the broker acknowledged")]
    pub delivery_succeeded: Counter,

    #[metric(describe = "Number of messages the broker reported as undeliverable")]
    pub delivery_failed: Counter,

    #[metric(describe = "Number of delivery reports dropped because the subscriber channel was full")]
    pub delivery_reports_dropped: Counter,

    #[metric(describe = "Duration of the broker handoff")]
    pub publish_duration: Histogram,
}

/// Initialize Prometheus metrics exporter
pub fn init_prometheus_exporter(addr: SocketAddr) -> Result<(), BuildError> {
    PrometheusBuilder::new().with_http_listener(addr).install()
}
