use rust_decimal::Decimal;
use thiserror::Error;

use crate::domain::AccountError;
use crate::infrastructure::StoreError;

/// Use-case error taxonomy. Validation, not-found, and conflict errors are
/// surfaced to the caller; `Infrastructure` is the only transient class and
/// the only one a consumer may requeue on.
#[derive(Debug, Error)]
pub enum ServiceError {
    #[error("Validation error: {0}")]
    Validation(String),
    #[error("Invalid amount: {0}")]
    InvalidAmount(Decimal),
    #[error("Insufficient funds: available {available}, requested {requested}")]
    InsufficientFunds {
        available: Decimal,
        requested: Decimal,
    },
    #[error("User not found")]
    UserNotFound,
    #[error("Account not found")]
    AccountNotFound,
    #[error("Email is already in use")]
    EmailAlreadyInUse,
    #[error("Account already exists for this user")]
    AccountAlreadyExists,
    #[error("Email already confirmed")]
    EmailAlreadyConfirmed,
    #[error("Invalid email or password")]
    InvalidCredentials,
    #[error("Infrastructure error: {0}")]
    Infrastructure(String),
}

impl ServiceError {
    /// True for failures that may heal on their own (store, cache, broker
    /// outages). Consumers requeue these instead of dropping the message.
    pub fn is_transient(&self) -> bool {
        matches!(self, ServiceError::Infrastructure(_))
    }
}

impl From<AccountError> for ServiceError {
    fn from(err: AccountError) -> Self {
        match err {
            AccountError::InvalidAmount(amount) => ServiceError::InvalidAmount(amount),
            AccountError::InsufficientFunds {
                available,
                requested,
            } => ServiceError::InsufficientFunds {
                available,
                requested,
            },
        }
    }
}

impl From<StoreError> for ServiceError {
    fn from(err: StoreError) -> Self {
        // Unique violations are mapped to the matching conflict variant at
        // the call sites that create rows; anywhere else they are unexpected.
        ServiceError::Infrastructure(err.to_string())
    }
}
