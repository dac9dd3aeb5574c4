//! Append-only record of every transaction the machine has opened.
//!
//! Only the tail of the ledger can be active: a new transaction is refused
//! while the tail is still `Created`.
//!
//! Changes are staged on a copy (`stage_create`, `stage_cancel`) and applied
//! with [`Ledger::commit`] once they have been persisted.

use super::transaction::{PaymentType, Transaction, TransactionId, TransactionStatus};
use crate::error::{Result, VendingError};

#[derive(Debug, Clone, PartialEq, Default)]
pub struct Ledger {
    transactions: Vec<Transaction>,
}

impl Ledger {
    pub fn new(transactions: Vec<Transaction>) -> Self {
        Self { transactions }
    }

    pub fn len(&self) -> usize {
        self.transactions.len()
    }

    pub fn is_empty(&self) -> bool {
        self.transactions.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &Transaction> {
        self.transactions.iter()
    }

    /// The transaction `create` would append, without appending it.
    pub fn stage_create(&self, payment_type: PaymentType) -> Result<Transaction> {
        if self.active().is_some() {
            return Err(VendingError::ActiveTransactionExists);
        }
        Ok(Transaction::new(self.next_id()?, payment_type))
    }

    /// The tail as it would look once cancelled.
    pub fn stage_cancel(&self) -> Result<Transaction> {
        let tx = self.tail().ok_or(VendingError::TransactionNotFound)?;
        if !tx.is_active() {
            return Err(VendingError::NotActive);
        }
        let mut tx = tx.clone();
        tx.set_status(TransactionStatus::Cancelled);
        Ok(tx)
    }

    /// Replaces the transaction with the same id, or appends a new one.
    pub fn commit(&mut self, tx: Transaction) {
        match self.transactions.iter_mut().rev().find(|t| t.id == tx.id) {
            Some(slot) => *slot = tx,
            None => self.transactions.push(tx),
        }
    }

    /// The tail transaction, if it is still open.
    pub fn active(&self) -> Option<&Transaction> {
        self.tail().filter(|tx| tx.is_active())
    }

    pub fn tail(&self) -> Option<&Transaction> {
        self.transactions.last()
    }

    pub fn find(&self, id: TransactionId) -> Option<&Transaction> {
        self.transactions.iter().find(|tx| tx.id == id)
    }

    /// Transactions of one payment type (or all of them), in the order they were opened.
    pub fn payments(&self, filter: Option<PaymentType>) -> Vec<Transaction> {
        self.transactions
            .iter()
            .filter(|tx| filter.is_none_or(|pt| tx.payment_type == pt))
            .cloned()
            .collect()
    }

    /// Highest id whose transaction is already final; everything after it can still settle.
    pub fn settled_watermark(&self) -> TransactionId {
        match self.tail() {
            Some(tx) if tx.is_active() => tx.id.saturating_sub(1),
            Some(tx) => tx.id,
            None => 0,
        }
    }

    fn next_id(&self) -> Result<TransactionId> {
        match self.tail() {
            Some(tx) => tx
                .id
                .checked_add(1)
                .ok_or_else(|| VendingError::InternalError("transaction ids exhausted".into())),
            None => Ok(1),
        }
    }
}
