use thiserror::Error;

/// Coarse classification of [`VendingError`] used by callers that only care
/// about the failure family (e.g. mapping onto transport status codes).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorKind {
    NotFound,
    Validation,
    Conflict,
    OutOfStock,
    PaymentFailed,
    Internal,
}

#[derive(Error, Debug)]
pub enum VendingError {
    #[error("Product not found")]
    ProductNotFound,
    #[error("Transaction not found")]
    TransactionNotFound,
    #[error("Invalid payment type")]
    InvalidPaymentType(String),
    #[error("Invalid quantity: {0}")]
    InvalidQuantity(String),
    #[error("Invalid configuration: {0}")]
    InvalidConfig(String),
    #[error("There is already an active transaction")]
    ActiveTransactionExists,
    #[error("Invalid transaction - Transaction already processed")]
    AlreadyProcessed,
    #[error("Transaction not active")]
    NotActive,
    #[error("Out of stock")]
    OutOfStock,
    #[error("{0}")]
    PaymentFailed(String),
    #[error("Internal error: {0}")]
    InternalError(#[from] Box<dyn std::error::Error + Send + Sync>),
}

impl VendingError {
    pub fn kind(&self) -> ErrorKind {
        match self {
            Self::ProductNotFound | Self::TransactionNotFound => ErrorKind::NotFound,
            Self::InvalidPaymentType(_) | Self::InvalidQuantity(_) | Self::InvalidConfig(_) => {
                ErrorKind::Validation
            }
            Self::ActiveTransactionExists | Self::AlreadyProcessed | Self::NotActive => {
                ErrorKind::Conflict
            }
            Self::OutOfStock => ErrorKind::OutOfStock,
            Self::PaymentFailed(_) => ErrorKind::PaymentFailed,
            Self::InternalError(_) => ErrorKind::Internal,
        }
    }
}

#[cfg(feature = "storage-rocksdb")]
impl From<rocksdb::Error> for VendingError {
    fn from(err: rocksdb::Error) -> Self {
        Self::InternalError(Box::new(err))
    }
}

impl From<serde_json::Error> for VendingError {
    fn from(err: serde_json::Error) -> Self {
        Self::InternalError(Box::new(err))
    }
}

pub type Result<T> = std::result::Result<T, VendingError>;
