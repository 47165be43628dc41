use anyhow::Context;
use clap::Parser;
use rdkafka::producer::FutureProducer;
use std::sync::Arc;
use tokio::net::TcpListener;
use tokio::time::Duration;
use tracing::{info, warn};
use txn_ingress_core::logger::init_logger;
use txn_ingress_lib::Config;
use txn_ingress_lib::metrics::init_prometheus_exporter;
use txn_ingress_lib::queue::{KafkaBrokerClient, TransactionPublisher};
use txn_ingress_lib::service::{IngressService, router};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();

    let config = Config::parse();

    init_logger(&config.log_level, config.log_format)?;

    init_prometheus_exporter(config.metrics_addr)
        .context("Failed to install Prometheus exporter")?;

    info!(
        message = "Starting ingress service",
        address = %config.address,
        port = config.port,
        kafka_brokers = %config.kafka_brokers,
        topic = %config.topic,
        metrics_address = %config.metrics_addr,
    );

    let producer: FutureProducer = config
        .kafka_client_config()
        .context("Failed to load Kafka properties")?
        .create()
        .context("Failed to create Kafka producer")?;

    let publisher = TransactionPublisher::new(KafkaBrokerClient::new(producer), config.topic.clone());
    let service = Arc::new(IngressService::new(publisher));

    let listener = TcpListener::bind(config.bind_addr()).await?;
    let addr = listener.local_addr()?;

    info!(
        message = "Ingress HTTP server started",
        address = %addr
    );

    axum::serve(listener, router(Arc::clone(&service)))
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    let client = service.publisher().client();
    info!(
        message = "Flushing Kafka producer",
        in_flight = client.in_flight_count(),
        timeout_ms = config.shutdown_flush_timeout_ms,
    );
    if let Err(e) = client.flush(Duration::from_millis(config.shutdown_flush_timeout_ms)) {
        warn!(
            message = "Kafka producer did not flush before shutdown",
            in_flight = client.in_flight_count(),
            error = %e
        );
    }

    info!("Ingress service stopped");
    Ok(())
}

async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = tokio::signal::ctrl_c().await {
            warn!(message = "Failed to listen for ctrl-c", error = %e);
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate()) {
            Ok(mut signal) => {
                signal.recv().await;
            }
            Err(e) => {
                warn!(message = "Failed to listen for SIGTERM", error = %e);
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        () = ctrl_c => {},
        () = terminate => {},
    }

    info!("Shutdown signal received, draining requests");
}
