use super::ledger::Ledger;
use super::money::Money;
use super::transaction::{PaymentType, TransactionId, TransactionStatus};
use serde::{Deserialize, Serialize};

/// Running totals of settled money per payment type.
///
/// Totals are accumulated on settlement rather than summed from the ledger, so
/// [`Funds::reconcile`] exists to check the two views still agree.
#[derive(Debug, Serialize, Deserialize, PartialEq, Clone, Default)]
pub struct Funds {
    pub cash: Money,
    pub card: Money,
    /// Transactions up to this id were final when the totals were last cleared.
    pub cleared_through: TransactionId,
}

impl Funds {
    pub fn credit(&mut self, payment_type: PaymentType, amount: Money) {
        match payment_type {
            PaymentType::Cash => self.cash += amount,
            PaymentType::Card => self.card += amount,
        }
    }

    pub fn amount(&self, filter: Option<PaymentType>) -> Money {
        match filter {
            Some(PaymentType::Cash) => self.cash,
            Some(PaymentType::Card) => self.card,
            None => self.total(),
        }
    }

    pub fn total(&self) -> Money {
        self.cash + self.card
    }

    pub fn clear(&mut self, watermark: TransactionId) {
        self.cash = Money::ZERO;
        self.card = Money::ZERO;
        self.cleared_through = watermark;
    }

    pub fn reconcile(&self, ledger: &Ledger) -> Reconciliation {
        let derived = |payment_type: PaymentType| -> Money {
            ledger
                .iter()
                .filter(|tx| tx.id > self.cleared_through)
                .filter(|tx| tx.payment_type == payment_type)
                .filter(|tx| tx.status == TransactionStatus::Success)
                .map(|tx| tx.amount)
                .sum()
        };
        Reconciliation {
            recorded_cash: self.cash,
            recorded_card: self.card,
            derived_cash: derived(PaymentType::Cash),
            derived_card: derived(PaymentType::Card),
        }
    }
}

/// Recorded totals next to the totals derived from successful transactions.
#[derive(Debug, Serialize, PartialEq, Clone, Copy)]
pub struct Reconciliation {
    pub recorded_cash: Money,
    pub recorded_card: Money,
    pub derived_cash: Money,
    pub derived_card: Money,
}

impl Reconciliation {
    pub fn is_balanced(&self) -> bool {
        self.recorded_cash == self.derived_cash && self.recorded_card == self.derived_card
    }
}
