//! HTTP ingestion gateway that validates transactions and publishes them to Kafka.

pub mod delivery;
pub mod metrics;
pub mod queue;
pub mod service;
pub mod validation;

use clap::Parser;
use rdkafka::ClientConfig;
use std::net::{IpAddr, SocketAddr};
use std::path::PathBuf;
use txn_ingress_core::kafka::load_kafka_config_from_file;
use txn_ingress_core::logger::LogFormat;

/// Delivery timeout applied unless the properties file overrides it.
pub const DEFAULT_MESSAGE_TIMEOUT_MS: &str = "30000";

#[derive(Parser, Debug, Clone)]
#[command(author, version, about, long_about = None)]
pub struct Config {
    /// Address to bind the HTTP server to
    #[arg(long, env = "TXN_INGRESS_ADDRESS", default_value = "0.0.0.0")]
    pub address: IpAddr,

    /// Port to bind the HTTP server to
    #[arg(long, env = "TXN_INGRESS_PORT", default_value = "8080")]
    pub port: u16,

    /// Kafka bootstrap servers
    #[arg(long, env = "TXN_INGRESS_KAFKA_BROKERS", default_value = "localhost:9092")]
    pub kafka_brokers: String,

    /// Extra producer settings, one `key=value` per line; they override the defaults
    #[arg(long, env = "TXN_INGRESS_KAFKA_PROPERTIES_FILE")]
    pub kafka_properties_file: Option<PathBuf>,

    /// Kafka topic every transaction is published to
    #[arg(long, env = "TXN_INGRESS_KAFKA_TOPIC", default_value = "transactions")]
    pub topic: String,

    /// Log level (trace, debug, info, warn, error)
    #[arg(long, env = "TXN_INGRESS_LOG_LEVEL", default_value = "info")]
    pub log_level: String,

    /// `text` or `json`
    #[arg(long, env = "TXN_INGRESS_LOG_FORMAT", default_value = "text")]
    pub log_format: LogFormat,

    /// Address of the Prometheus scrape endpoint
    #[arg(long, env = "TXN_INGRESS_METRICS_ADDR", default_value = "0.0.0.0:9002")]
    pub metrics_addr: SocketAddr,

    /// How long to wait for buffered messages on shutdown
    #[arg(
        long,
        env = "TXN_INGRESS_SHUTDOWN_FLUSH_TIMEOUT_MS",
        default_value = "5000"
    )]
    pub shutdown_flush_timeout_ms: u64,
}

impl Config {
    pub const fn bind_addr(&self) -> SocketAddr {
        SocketAddr::new(self.address, self.port)
    }

    /// Producer configuration: brokers and defaults first, then the properties file.
    pub fn kafka_client_config(&self) -> std::io::Result<ClientConfig> {
        let mut client_config = ClientConfig::new();
        client_config
            .set("bootstrap.servers", &self.kafka_brokers)
            .set("message.timeout.ms", DEFAULT_MESSAGE_TIMEOUT_MS);

        if let Some(path) = &self.kafka_properties_file {
            for (key, value) in load_kafka_config_from_file(path)? {
                client_config.set(key, value);
            }
        }

        Ok(client_config)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[test]
    fn test_config_defaults() {
        let config = Config::try_parse_from(["txn-ingress"]).unwrap();

        assert_eq!(config.topic, "transactions");
        assert_eq!(config.bind_addr().port(), 8080);
        assert_eq!(config.log_format, LogFormat::Text);
        assert!(config.kafka_properties_file.is_none());
    }

    #[test]
    fn test_kafka_client_config_file_overrides_defaults() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        writeln!(file, "# overrides").unwrap();
        writeln!(file, "message.timeout.ms=1000").unwrap();
        writeln!(file, "acks=all").unwrap();

        let config = Config::try_parse_from([
            "txn-ingress",
            "--kafka-brokers",
            "kafka-1:9092,kafka-2:9092",
            "--kafka-properties-file",
            file.path().to_str().unwrap(),
        ])
        .unwrap();
        let client_config = config.kafka_client_config().unwrap();

        assert_eq!(
            client_config.get("bootstrap.servers"),
            Some("kafka-1:9092,kafka-2:9092")
        );
        assert_eq!(client_config.get("message.timeout.ms"), Some("1000"));
        assert_eq!(client_config.get("acks"), Some("all"));
    }

    #[test]
    fn test_kafka_client_config_without_file() {
        let config = Config::try_parse_from(["txn-ingress"]).unwrap();
        let client_config = config.kafka_client_config().unwrap();

        assert_eq!(
            client_config.get("message.timeout.ms"),
            Some(DEFAULT_MESSAGE_TIMEOUT_MS)
        );
    }

    #[test]
    fn test_invalid_log_format_is_rejected() {
        assert!(Config::try_parse_from(["txn-ingress", "--log-format", "xml"]).is_err());
    }
}
