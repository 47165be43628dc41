//! Test doubles and helpers shared by the gateway integration tests.
#![allow(dead_code)]

use axum::Router;
use axum::body::{Body, to_bytes};
use axum::http::{Request, StatusCode, header};
use std::sync::{Arc, Mutex};
use tower::ServiceExt;
use txn_ingress_lib::delivery::{DeliveryFuture, DeliveryOutcome};
use txn_ingress_lib::queue::{BrokerClient, OutboundRecord, SubmitError, TransactionPublisher};
use txn_ingress_lib::service::{IngressService, TRANSACTIONS_PATH, router};

/// Broker client that records every submitted message.
#[derive(Clone, Default)]
pub struct RecordingBrokerClient {
    records: Arc<Mutex<Vec<OutboundRecord>>>,
    fail_submit: Arc<Mutex<Option<String>>>,
    delivery_failure: Arc<Mutex<Option<String>>>,
}

impl RecordingBrokerClient {
    pub fn new() -> Self {
        Self::default()
    }

    /// Makes every following `submit` fail synchronously.
    pub fn fail_submit_with(self, reason: &str) -> Self {
        *self.fail_submit.lock().unwrap() = Some(reason.to_string());
        self
    }

    /// Accepts messages but reports them as undeliverable.
    pub fn fail_delivery_with(self, reason: &str) -> Self {
        *self.delivery_failure.lock().unwrap() = Some(reason.to_string());
        self
    }

    pub fn recover(&self) {
        *self.fail_submit.lock().unwrap() = None;
    }

    pub fn records(&self) -> Vec<OutboundRecord> {
        self.records.lock().unwrap().clone()
    }

    pub fn submit_count(&self) -> usize {
        self.records.lock().unwrap().len()
    }
}

impl BrokerClient for RecordingBrokerClient {
    fn submit(&self, record: OutboundRecord) -> Result<DeliveryFuture, SubmitError> {
        if let Some(reason) = self.fail_submit.lock().unwrap().clone() {
            return Err(SubmitError::Unavailable(reason));
        }

        let offset = {
            let mut records = self.records.lock().unwrap();
            records.push(record);
            records.len() as i64 - 1
        };

        let outcome = match self.delivery_failure.lock().unwrap().clone() {
            Some(reason) => DeliveryOutcome::Failed { reason },
            None => DeliveryOutcome::Delivered {
                partition: 0,
                offset,
            },
        };
        Ok(Box::pin(async move { outcome }))
    }
}

pub fn gateway(client: RecordingBrokerClient) -> Router {
    let publisher = TransactionPublisher::new(client, "transactions");
    router(Arc::new(IngressService::new(publisher)))
}

/// Sends a POST with a JSON body and returns status and body text.
pub async fn post_json(app: &Router, body: &str) -> (StatusCode, String) {
    let request = Request::post(TRANSACTIONS_PATH)
        .header(header::CONTENT_TYPE, "application/json")
        .body(Body::from(body.to_string()))
        .unwrap();
    send(app, request).await
}

pub async fn send(app: &Router, request: Request<Body>) -> (StatusCode, String) {
    let response = app.clone().oneshot(request).await.unwrap();
    let status = response.status();
    let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
    (status, String::from_utf8(bytes.to_vec()).unwrap())
}
