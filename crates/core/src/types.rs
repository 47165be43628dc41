use serde::{Deserialize, Serialize};

/// A transaction as submitted by a caller, before validation.
///
/// Every field is optional: a missing key and an explicit `null` both
/// deserialize to `None`. Unknown keys are ignored.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TransactionRequest {
    pub id: Option<String>,
    pub amount: Option<f64>,
    pub user_id: Option<String>,
    pub merchant_id: Option<String>,
    pub timestamp: Option<i64>,
}

/// A transaction carrying both mandatory fields.
///
/// This is also the event published to the broker. It is encoded as a JSON
/// object with camelCase keys; absent optional fields are written as `null`:
///
/// ```json
/// {"id":null,"amount":42.5,"userId":"u1","merchantId":null,"timestamp":null}
/// ```
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Transaction {
    pub id: Option<String>,
    pub amount: f64,
    pub user_id: String,
    pub merchant_id: Option<String>,
    pub timestamp: Option<i64>,
}

impl Transaction {
    /// Builds a transaction from its mandatory fields.
    pub fn new(amount: f64, user_id: impl Into<String>) -> Self {
        Self {
            id: None,
            amount,
            user_id: user_id.into(),
            merchant_id: None,
            timestamp: None,
        }
    }

    /// Encodes the transaction in its wire format.
    pub fn to_json_bytes(&self) -> serde_json::Result<Vec<u8>> {
        serde_json::to_vec(self)
    }

    /// Decodes a transaction from its wire format.
    pub fn from_json_bytes(bytes: &[u8]) -> serde_json::Result<Self> {
        serde_json::from_slice(bytes)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_request_missing_and_null_fields_are_none() {
        let absent: TransactionRequest = serde_json::from_value(json!({"userId": "u1"})).unwrap();
        let null: TransactionRequest =
            serde_json::from_value(json!({"amount": null, "userId": "u1"})).unwrap();

        assert_eq!(absent.amount, None);
        assert_eq!(absent, null);
        assert_eq!(absent.user_id.as_deref(), Some("u1"));
    }

    #[test]
    fn test_request_accepts_integer_amount_and_ignores_unknown_keys() {
        let request: TransactionRequest = serde_json::from_value(json!({
            "amount": 42,
            "userId": "u1",
            "currency": "EUR"
        }))
        .unwrap();

        assert_eq!(request.amount, Some(42.0));
    }

    #[test]
    fn test_wire_format_uses_camel_case_and_explicit_nulls() {
        let tx = Transaction {
            merchant_id: Some("m9".to_string()),
            timestamp: Some(1_700_000_000_000),
            ..Transaction::new(42.5, "u1")
        };

        let value: serde_json::Value =
            serde_json::from_slice(&tx.to_json_bytes().unwrap()).unwrap();

        assert_eq!(
            value,
            json!({
                "id": null,
                "amount": 42.5,
                "userId": "u1",
                "merchantId": "m9",
                "timestamp": 1_700_000_000_000i64
            })
        );
    }

    #[test]
    fn test_wire_format_decodes_what_it_encodes() {
        let tx = Transaction {
            id: Some("tx-1".to_string()),
            ..Transaction::new(-5.0, "u1")
        };

        let decoded = Transaction::from_json_bytes(&tx.to_json_bytes().unwrap()).unwrap();
        assert_eq!(decoded, tx);
    }
}
