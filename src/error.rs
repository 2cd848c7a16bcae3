use crate::domain::payment::PaymentId;
use miette::Diagnostic;
use thiserror::Error;

pub type Result<T> = std::result::Result<T, PaymentError>;

#[derive(Error, Debug, Diagnostic)]
pub enum PaymentError {
    #[error("Payment {0} not found")]
    #[diagnostic(code(paysm::not_found))]
    NotFound(PaymentId),

    #[error("Persistence error: {0}")]
    #[diagnostic(
        code(paysm::persistence),
        help("the operation was rolled back; query the payment and retry")
    )]
    Persistence(String),

    #[error("Invalid transition table: {0}")]
    #[diagnostic(code(paysm::invalid_table))]
    InvalidTransitionTable(String),

    #[error("Event cascade exceeded {0} dispatches")]
    #[diagnostic(code(paysm::cascade_limit))]
    CascadeLimitExceeded(usize),

    #[error("Validation error: {0}")]
    #[diagnostic(code(paysm::validation))]
    ValidationError(String),

    #[error("Authorization gateway error: {0}")]
    #[diagnostic(code(paysm::gateway))]
    Gateway(String),

    #[error("CSV error: {0}")]
    CsvError(#[from] csv::Error),

    #[error("IO error: {0}")]
    IoError(#[from] std::io::Error),
}

impl PaymentError {
    /// Infrastructure failures the caller may retry after re-querying the payment.
    pub fn is_retryable(&self) -> bool {
        matches!(self, PaymentError::Persistence(_))
    }
}

impl From<serde_json::Error> for PaymentError {
    fn from(e: serde_json::Error) -> Self {
        PaymentError::Persistence(format!("serialization error: {}", e))
    }
}

#[cfg(feature = "storage-rocksdb")]
impl From<rocksdb::Error> for PaymentError {
    fn from(e: rocksdb::Error) -> Self {
        PaymentError::Persistence(e.into_string())
    }
}
