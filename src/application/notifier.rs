use crate::domain::funds::Funds;
use crate::domain::money::Money;
use crate::domain::transaction::PaymentType;
use serde::Serialize;
use tokio::sync::broadcast;
use tracing::debug;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum BalanceKind {
    Cash,
    Card,
    Total,
}

impl From<PaymentType> for BalanceKind {
    fn from(payment_type: PaymentType) -> Self {
        match payment_type {
            PaymentType::Cash => BalanceKind::Cash,
            PaymentType::Card => BalanceKind::Card,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct BalanceUpdate {
    pub kind: BalanceKind,
    pub amount: Money,
}

/// Lossy broadcast of balance changes to front panels and other observers.
///
/// Publishing never blocks: with no subscribers the update is dropped, and a
/// subscriber that falls behind loses the oldest updates.
#[derive(Debug, Clone)]
pub struct BalanceNotifier {
    sender: broadcast::Sender<BalanceUpdate>,
}

impl BalanceNotifier {
    pub fn new(capacity: usize) -> Self {
        let (sender, _) = broadcast::channel(capacity.max(1));
        Self { sender }
    }

    pub fn subscribe(&self) -> broadcast::Receiver<BalanceUpdate> {
        self.sender.subscribe()
    }

    pub fn publish(&self, updates: &[BalanceUpdate]) {
        for update in updates {
            if self.sender.send(*update).is_err() {
                debug!(kind = ?update.kind, "no balance subscribers");
            }
        }
    }
}

/// Updates emitted after a settlement: the per-type total, then the grand total.
pub fn settlement_updates(payment_type: PaymentType, funds: &Funds) -> Vec<BalanceUpdate> {
    vec![
        BalanceUpdate {
            kind: payment_type.into(),
            amount: funds.amount(Some(payment_type)),
        },
        BalanceUpdate {
            kind: BalanceKind::Total,
            amount: funds.total(),
        },
    ]
}

/// Updates emitted after the totals are cleared.
pub fn cleared_updates(funds: &Funds) -> Vec<BalanceUpdate> {
    vec![
        BalanceUpdate {
            kind: BalanceKind::Cash,
            amount: funds.cash,
        },
        BalanceUpdate {
            kind: BalanceKind::Card,
            amount: funds.card,
        },
        BalanceUpdate {
            kind: BalanceKind::Total,
            amount: funds.total(),
        },
    ]
}
