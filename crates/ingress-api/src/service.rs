use axum::extract::rejection::JsonRejection;
use axum::extract::State;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::routing::{get, post};
use axum::{Json, Router};
use std::sync::Arc;
use std::time::Instant;
use tracing::{info, warn};
use txn_ingress_core::TransactionRequest;

use crate::metrics::{Metrics, record_histogram};
use crate::queue::{BrokerClient, PublishAck, PublishError, TransactionPublisher};
use crate::validation::{ValidationError, validate_transaction};

pub const TRANSACTIONS_PATH: &str = "/api/transactions";
pub const HEALTH_PATH: &str = "/health";

pub const ACCEPTED_MESSAGE: &str = "Transaction received and processing";
pub const INVALID_MESSAGE: &str = "Invalid transaction data";
pub const PUBLISH_FAILED_MESSAGE: &str = "Failed to publish transaction";

/// Terminal outcome of one ingest request.
#[derive(Debug)]
pub enum IngestOutcome {
    Accepted,
    Rejected(ValidationError),
    /// The body could not be read as a transaction-shaped JSON object.
    Malformed(String),
    PublishFailed(PublishError),
}

impl IntoResponse for IngestOutcome {
    fn into_response(self) -> Response {
        match self {
            Self::Accepted => (StatusCode::OK, ACCEPTED_MESSAGE).into_response(),
            Self::Rejected(_) | Self::Malformed(_) => {
                (StatusCode::BAD_REQUEST, INVALID_MESSAGE).into_response()
            }
            Self::PublishFailed(_) => {
                (StatusCode::INTERNAL_SERVER_ERROR, PUBLISH_FAILED_MESSAGE).into_response()
            }
        }
    }
}

/// Validates submitted transactions and forwards the valid ones.
pub struct IngressService<Client> {
    publisher: TransactionPublisher<Client>,
    metrics: Metrics,
}

impl<Client> IngressService<Client> {
    pub fn new(publisher: TransactionPublisher<Client>) -> Self {
        Self {
            publisher,
            metrics: Metrics::default(),
        }
    }

    pub const fn publisher(&self) -> &TransactionPublisher<Client> {
        &self.publisher
    }
}

impl<Client> IngressService<Client>
where
    Client: BrokerClient,
{
    /// Runs the validator and, if it passes, the publisher.
    pub fn submit_transaction(&self, request: TransactionRequest) -> IngestOutcome {
        self.metrics.transactions_received.increment(1);

        let transaction = match validate_transaction(request) {
            Ok(transaction) => transaction,
            Err(reason) => {
                self.metrics.transactions_rejected.increment(1);
                info!(message = "rejected transaction", reason = %reason);
                return IngestOutcome::Rejected(reason);
            }
        };

        match self.publisher.publish(&transaction) {
            PublishAck::Accepted => IngestOutcome::Accepted,
            PublishAck::Failed(err) => IngestOutcome::PublishFailed(err),
        }
    }
}

/// Route table of the gateway.
pub fn router<Client>(service: Arc<IngressService<Client>>) -> Router
where
    Client: BrokerClient,
{
    Router::new()
        .route(TRANSACTIONS_PATH, post(create_transaction::<Client>))
        .route(HEALTH_PATH, get(health))
        .with_state(service)
}

async fn create_transaction<Client>(
    State(service): State<Arc<IngressService<Client>>>,
    payload: Result<Json<TransactionRequest>, JsonRejection>,
) -> IngestOutcome
where
    Client: BrokerClient,
{
    let start = Instant::now();

    let outcome = match payload {
        Ok(Json(request)) => service.submit_transaction(request),
        Err(rejection) => {
            service.metrics.transactions_received.increment(1);
            service.metrics.transactions_rejected.increment(1);
            let reason = rejection.body_text();
            warn!(message = "unreadable transaction payload", error = %reason);
            IngestOutcome::Malformed(reason)
        }
    };

    record_histogram(start.elapsed(), "create_transaction");
    outcome
}

async fn health() -> &'static str {
    "OK"
}
