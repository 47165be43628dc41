//! Broker-side completion of a publish.
//!
//! A successful handoff only means the message sits in the broker client's
//! send buffer. The broker answers later; that answer never reaches the HTTP
//! caller, whose response has already been sent. It is logged, counted and,
//! when a subscriber is attached, forwarded as a [`DeliveryReport`].

use std::future::Future;
use std::pin::Pin;
use tokio::sync::mpsc;
use tokio::sync::mpsc::error::TrySendError;
use tracing::{debug, error, warn};

use txn_ingress_core::Transaction;

use crate::metrics::Metrics;

/// Resolves once the broker acknowledged or gave up on a message.
pub type DeliveryFuture = Pin<Box<dyn Future<Output = DeliveryOutcome> + Send + 'static>>;

/// The broker's final answer for one message.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DeliveryOutcome {
    Delivered { partition: i32, offset: i64 },
    Failed { reason: String },
}

impl DeliveryOutcome {
    pub const fn is_delivered(&self) -> bool {
        matches!(self, Self::Delivered { .. })
    }
}

/// Delivery outcome of one published transaction.
#[derive(Debug, Clone, PartialEq)]
pub struct DeliveryReport {
    pub transaction_id: Option<String>,
    pub user_id: String,
    pub topic: String,
    pub outcome: DeliveryOutcome,
}

/// Awaits `delivery` on a detached task and records its outcome.
pub(crate) fn spawn_delivery_watcher(
    delivery: DeliveryFuture,
    transaction: &Transaction,
    topic: &str,
    metrics: Metrics,
    subscriber: Option<mpsc::Sender<DeliveryReport>>,
) {
    let transaction_id = transaction.id.clone();
    let user_id = transaction.user_id.clone();
    let topic = topic.to_string();

    tokio::spawn(async move {
        let report = DeliveryReport {
            transaction_id,
            user_id,
            topic,
            outcome: delivery.await,
        };

        match &report.outcome {
            DeliveryOutcome::Delivered { partition, offset } => {
                metrics.delivery_succeeded.increment(1);
                debug!(
                    message = "Transaction delivered",
                    transaction_id = ?report.transaction_id,
                    user_id = %report.user_id,
                    topic = %report.topic,
                    partition = partition,
                    offset = offset,
                );
            }
            DeliveryOutcome::Failed { reason } => {
                metrics.delivery_failed.increment(1);
                error!(
                    message = "Transaction delivery failed",
                    transaction_id = ?report.transaction_id,
                    user_id = %report.user_id,
                    topic = %report.topic,
                    error = %reason,
                );
            }
        }

        if let Some(subscriber) = subscriber {
            match subscriber.try_send(report) {
                Ok(()) | Err(TrySendError::Closed(_)) => {}
                Err(TrySendError::Full(report)) => {
                    metrics.delivery_reports_dropped.increment(1);
                    warn!(
                        message = "Delivery report channel full, dropping report",
                        transaction_id = ?report.transaction_id,
                        topic = %report.topic,
                    );
                }
            }
        }
    });
}
