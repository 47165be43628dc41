use thiserror::Error;
use txn_ingress_core::{Transaction, TransactionRequest};

/// Why a submitted transaction was rejected.
#[derive(Debug, Clone, Copy, Error, PartialEq, Eq)]
pub enum ValidationError {
    #[error("missing mandatory field `amount`")]
    MissingAmount,
    #[error("missing mandatory field `userId`")]
    MissingUserId,
    #[error("missing mandatory fields `amount` and `userId`")]
    MissingAmountAndUserId,
}

/// Checks that `amount` and `userId` are present.
///
/// Values are not inspected: negative amounts and empty user ids pass.
pub fn validate_transaction(request: TransactionRequest) -> Result<Transaction, ValidationError> {
    let TransactionRequest {
        id,
        amount,
        user_id,
        merchant_id,
        timestamp,
    } = request;

    match (amount, user_id) {
        (Some(amount), Some(user_id)) => Ok(Transaction {
            id,
            amount,
            user_id,
            merchant_id,
            timestamp,
        }),
        (None, Some(_)) => Err(ValidationError::MissingAmount),
        (Some(_), None) => Err(ValidationError::MissingUserId),
        (None, None) => Err(ValidationError::MissingAmountAndUserId),
    }
}
