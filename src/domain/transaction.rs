use super::money::Money;
use super::product::ProductId;
use crate::error::VendingError;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

pub type TransactionId = u32;

#[derive(Debug, Serialize, Deserialize, PartialEq, Eq, Hash, Clone, Copy)]
pub enum PaymentType {
    Cash,
    Card,
}

impl PaymentType {
    pub fn as_str(&self) -> &'static str {
        match self {
            PaymentType::Cash => "Cash",
            PaymentType::Card => "Card",
        }
    }

    /// An absent or empty filter selects every payment type.
    pub fn parse_filter(filter: Option<&str>) -> Result<Option<Self>, VendingError> {
        match filter {
            None | Some("") => Ok(None),
            Some(s) => s.parse().map(Some),
        }
    }
}

impl fmt::Display for PaymentType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Payment types are matched exactly, as the front panel sends them.
impl FromStr for PaymentType {
    type Err = VendingError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "Cash" => Ok(PaymentType::Cash),
            "Card" => Ok(PaymentType::Card),
            other => Err(VendingError::InvalidPaymentType(other.to_string())),
        }
    }
}

/// `Created` is the only non-terminal status.
#[derive(Debug, Serialize, Deserialize, PartialEq, Eq, Clone, Copy, Default)]
pub enum TransactionStatus {
    #[default]
    Created,
    Success,
    Failed,
    Cancelled,
}

impl TransactionStatus {
    pub fn is_terminal(&self) -> bool {
        *self != TransactionStatus::Created
    }
}

impl fmt::Display for TransactionStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            TransactionStatus::Created => "Created",
            TransactionStatus::Success => "Success",
            TransactionStatus::Failed => "Failed",
            TransactionStatus::Cancelled => "Cancelled",
        };
        f.write_str(s)
    }
}

/// One purchase attempt, from coin insert or card tap to its final status.
#[derive(Debug, Serialize, Deserialize, PartialEq, Clone)]
pub struct Transaction {
    pub id: TransactionId,
    /// Set once a product is chosen.
    pub product_id: Option<ProductId>,
    pub payment_type: PaymentType,
    pub created_at: DateTime<Utc>,
    pub last_updated_at: DateTime<Utc>,
    pub amount: Money,
    pub status: TransactionStatus,
}

impl Transaction {
    pub fn new(id: TransactionId, payment_type: PaymentType) -> Self {
        let now = Utc::now();
        Self {
            id,
            product_id: None,
            payment_type,
            created_at: now,
            last_updated_at: now,
            amount: Money::ZERO,
            status: TransactionStatus::Created,
        }
    }

    pub fn is_active(&self) -> bool {
        !self.status.is_terminal()
    }

    /// A transaction can take a product only while it is open and still unattached.
    pub fn is_attachable(&self) -> bool {
        self.is_active() && self.product_id.is_none()
    }

    pub fn attach(&mut self, product_id: ProductId, price: Money) {
        self.product_id = Some(product_id);
        if self.amount.is_zero() {
            self.amount = price;
        }
        self.touch();
    }

    pub fn set_status(&mut self, status: TransactionStatus) {
        self.status = status;
        self.touch();
    }

    fn touch(&mut self) {
        self.last_updated_at = Utc::now();
    }
}
