use rdkafka::error::{KafkaError, KafkaResult};
use rdkafka::producer::{FutureProducer, FutureRecord, Producer};
use std::time::Instant;
use thiserror::Error;
use tokio::sync::mpsc;
use tokio::time::Duration;
use tracing::{debug, info, warn};
use txn_ingress_core::Transaction;

use crate::delivery::{DeliveryFuture, DeliveryOutcome, DeliveryReport, spawn_delivery_watcher};
use crate::metrics::Metrics;

/// A message on its way to the broker.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OutboundRecord {
    pub topic: String,
    pub key: Option<String>,
    pub payload: Vec<u8>,
}

/// The broker client refused a message before it entered the send buffer.
#[derive(Debug, Error)]
pub enum SubmitError {
    #[error("kafka producer rejected the message: {0}")]
    Kafka(#[from] KafkaError),
    #[error("broker client unavailable: {0}")]
    Unavailable(String),
}

/// One-way handoff of a message to a broker client.
///
/// Implementations are shared by every request handler and must be safe to
/// call concurrently without external locking. `submit` must not wait for the
/// broker: the returned future resolves with the broker's answer later.
#[cfg_attr(test, mockall::automock)]
pub trait BrokerClient: Send + Sync + 'static {
    fn submit(&self, record: OutboundRecord) -> Result<DeliveryFuture, SubmitError>;
}

/// Kafka broker client backed by a process-wide [`FutureProducer`].
#[derive(Clone)]
pub struct KafkaBrokerClient {
    producer: FutureProducer,
}

impl KafkaBrokerClient {
    pub const fn new(producer: FutureProducer) -> Self {
        Self { producer }
    }

    /// Waits up to `timeout` for buffered messages to reach the broker.
    pub fn flush(&self, timeout: Duration) -> KafkaResult<()> {
        self.producer.flush(timeout)
    }

    /// Number of messages still waiting in the producer queue.
    pub fn in_flight_count(&self) -> i32 {
        self.producer.in_flight_count()
    }
}

impl BrokerClient for KafkaBrokerClient {
    fn submit(&self, record: OutboundRecord) -> Result<DeliveryFuture, SubmitError> {
        let mut kafka_record = FutureRecord::to(&record.topic).payload(&record.payload);
        if let Some(key) = record.key.as_deref() {
            kafka_record = kafka_record.key(key);
        }

        let delivery = self
            .producer
            .send_result(kafka_record)
            .map_err(|(err, _)| SubmitError::Kafka(err))?;

        Ok(Box::pin(async move {
            match delivery.await {
                Ok(Ok((partition, offset))) => DeliveryOutcome::Delivered { partition, offset },
                Ok(Err((err, _))) => DeliveryOutcome::Failed {
                    reason: err.to_string(),
                },
                Err(_) => DeliveryOutcome::Failed {
                    reason: "producer dropped the delivery report".to_string(),
                },
            }
        }))
    }
}

/// Why a transaction could not be handed to the broker client.
#[derive(Debug, Error)]
pub enum PublishError {
    #[error("failed to encode transaction: {0}")]
    Serialization(#[from] serde_json::Error),
    #[error(transparent)]
    Submission(#[from] SubmitError),
}

/// Result of a publish call.
///
/// `Accepted` means the message was handed to the broker client, not that
/// the broker committed it.
#[derive(Debug)]
#[must_use]
pub enum PublishAck {
    Accepted,
    Failed(PublishError),
}

impl PublishAck {
    pub const fn is_accepted(&self) -> bool {
        matches!(self, Self::Accepted)
    }
}

/// Publishes validated transactions to a single topic fixed at construction.
pub struct TransactionPublisher<Client> {
    client: Client,
    topic: String,
    metrics: Metrics,
    delivery_reports: Option<mpsc::Sender<DeliveryReport>>,
}

impl<Client> TransactionPublisher<Client> {
    pub fn new(client: Client, topic: impl Into<String>) -> Self {
        Self {
            client,
            topic: topic.into(),
            metrics: Metrics::default(),
            delivery_reports: None,
        }
    }

    /// Forwards every broker delivery outcome to `sender`.
    ///
    /// Reports never wait for channel capacity. When the receiver falls behind
    /// and the channel is full, the report is dropped and counted.
    pub fn with_delivery_reports(mut self, sender: mpsc::Sender<DeliveryReport>) -> Self {
        self.delivery_reports = Some(sender);
        self
    }

    pub const fn client(&self) -> &Client {
        &self.client
    }
}

impl<Client> TransactionPublisher<Client>
where
    Client: BrokerClient,
{
    /// Hands `transaction` to the broker client without waiting for delivery.
    ///
    /// Must be called from within a tokio runtime. Every call submits exactly
    /// one message; a refused submission is reported once and never retried.
    pub fn publish(&self, transaction: &Transaction) -> PublishAck {
        let start = Instant::now();

        debug!(
            message = "Sending transaction to Kafka",
            transaction_id = ?transaction.id,
            user_id = %transaction.user_id,
            amount = transaction.amount,
            topic = %self.topic,
        );

        let ack = match self.submit(transaction) {
            Ok(delivery) => {
                spawn_delivery_watcher(
                    delivery,
                    transaction,
                    &self.topic,
                    self.metrics.clone(),
                    self.delivery_reports.clone(),
                );
                self.metrics.publish_accepted.increment(1);
                info!(
                    message = "queued transaction",
                    transaction_id = ?transaction.id,
                    user_id = %transaction.user_id,
                    topic = %self.topic,
                );
                PublishAck::Accepted
            }
            Err(err) => {
                self.metrics.publish_failed.increment(1);
                warn!(
                    message = "Failed to publish transaction",
                    transaction_id = ?transaction.id,
                    user_id = %transaction.user_id,
                    topic = %self.topic,
                    error = %err,
                );
                PublishAck::Failed(err)
            }
        };

        self.metrics
            .publish_duration
            .record(start.elapsed().as_secs_f64());
        ack
    }

    fn submit(&self, transaction: &Transaction) -> Result<DeliveryFuture, PublishError> {
        let record = OutboundRecord {
            topic: self.topic.clone(),
            key: None,
            payload: transaction.to_json_bytes()?,
        };
        Ok(self.client.submit(record)?)
    }
}
