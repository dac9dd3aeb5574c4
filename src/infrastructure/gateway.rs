//! Built-in payment gateways.
//!
//! The machine has no card network attached by default; `ApprovingGateway`
//! accepts every charge and `DecliningGateway` rejects every charge, which is
//! how an offline terminal behaves.

use crate::domain::ports::{GatewayError, PaymentGateway};
use crate::domain::transaction::Transaction;
use async_trait::async_trait;

#[derive(Debug, Clone, Copy, Default)]
pub struct ApprovingGateway;

#[async_trait]
impl PaymentGateway for ApprovingGateway {
    async fn charge(&self, _tx: &Transaction) -> Result<(), GatewayError> {
        Ok(())
    }
}

#[derive(Debug, Clone)]
pub struct DecliningGateway {
    reason: String,
}

impl DecliningGateway {
    pub fn new(reason: impl Into<String>) -> Self {
        Self {
            reason: reason.into(),
        }
    }
}

impl Default for DecliningGateway {
    fn default() -> Self {
        Self::new("card terminal offline")
    }
}

#[async_trait]
impl PaymentGateway for DecliningGateway {
    async fn charge(&self, tx: &Transaction) -> Result<(), GatewayError> {
        Err(GatewayError(format!(
            "transaction {}: {}",
            tx.id, self.reason
        )))
    }
}
