use super::notifier::{BalanceUpdate, cleared_updates, settlement_updates};
use crate::domain::funds::Funds;
use crate::domain::money::Money;
use crate::domain::ports::PaymentGatewayBox;
use crate::domain::transaction::{PaymentType, Transaction, TransactionId};
use crate::error::Result;
use tracing::warn;

/// Message shown to the customer when the card network refuses a charge.
pub const CARD_PAYMENT_FAILED: &str = "Card payment failed";

/// Outcome of settling one transaction.
#[derive(Debug, Clone, PartialEq)]
pub enum Settlement {
    /// Totals were credited; `updates` are ready to be broadcast.
    Settled { updates: Vec<BalanceUpdate> },
    /// Nothing was credited.
    Declined { reason: String },
}

/// Classifies payments, runs card settlement and keeps the running totals.
pub struct PaymentProcessor {
    gateway: PaymentGatewayBox,
}

impl PaymentProcessor {
    pub fn new(gateway: PaymentGatewayBox) -> Self {
        Self { gateway }
    }

    /// Cash always settles. Card settles only if the gateway accepts the charge.
    pub async fn settle(&self, funds: &mut Funds, tx: &Transaction) -> Settlement {
        if tx.payment_type == PaymentType::Card
            && let Err(e) = self.gateway.charge(tx).await
        {
            warn!(transaction = tx.id, amount = %tx.amount, error = %e, "card charge rejected");
            return Settlement::Declined {
                reason: CARD_PAYMENT_FAILED.to_string(),
            };
        }

        funds.credit(tx.payment_type, tx.amount);
        Settlement::Settled {
            updates: settlement_updates(tx.payment_type, funds),
        }
    }

    pub fn clear(&self, funds: &mut Funds, watermark: TransactionId) -> Vec<BalanceUpdate> {
        funds.clear(watermark);
        cleared_updates(funds)
    }

    pub fn amount(&self, funds: &Funds, filter: Option<&str>) -> Result<Money> {
        let filter = PaymentType::parse_filter(filter)?;
        Ok(funds.amount(filter))
    }
}
