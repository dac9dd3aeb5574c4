use super::notifier::{BalanceNotifier, BalanceUpdate};
use super::payment::{PaymentProcessor, Settlement};
use crate::config::MachineConfig;
use crate::domain::funds::{Funds, Reconciliation};
use crate::domain::inventory::Inventory;
use crate::domain::ledger::Ledger;
use crate::domain::money::Money;
use crate::domain::ports::{MachineSnapshot, MachineStoreBox, PaymentGatewayBox};
use crate::domain::product::{Product, ProductId};
use crate::domain::transaction::{PaymentType, Transaction, TransactionId, TransactionStatus};
use crate::error::{Result, VendingError};
use tokio::sync::{Mutex, broadcast};
use tracing::{error, info, warn};

/// Everything the engine mutates, guarded as one unit.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct MachineState {
    pub inventory: Inventory,
    pub ledger: Ledger,
    pub funds: Funds,
}

impl MachineState {
    pub fn seeded(config: &MachineConfig) -> Self {
        Self {
            inventory: Inventory::seeded(config.stock_limit, config.price),
            ledger: Ledger::default(),
            funds: Funds::default(),
        }
    }
}

impl From<MachineSnapshot> for MachineState {
    fn from(snapshot: MachineSnapshot) -> Self {
        Self {
            inventory: Inventory::new(snapshot.products),
            ledger: Ledger::new(snapshot.transactions),
            funds: snapshot.funds,
        }
    }
}

/// The vending state machine.
///
/// Transactions move `Created -> Success | Failed | Cancelled` and never leave
/// a terminal status. Every operation takes the state lock for its whole
/// duration, card settlement included. Changes are made on copies of the
/// touched records, persisted, and only then applied to the in-memory state,
/// so a storage failure leaves the machine as it was. Balance updates are
/// broadcast only after the lock is dropped.
pub struct VendingEngine {
    state: Mutex<MachineState>,
    store: MachineStoreBox,
    payments: PaymentProcessor,
    notifier: BalanceNotifier,
}

impl VendingEngine {
    /// Creates an engine over an already-built state.
    ///
    /// The state is not written to `store`; use [`VendingEngine::open`] to
    /// restore or seed a persisted machine.
    pub fn new(
        state: MachineState,
        store: MachineStoreBox,
        gateway: PaymentGatewayBox,
        notifier: BalanceNotifier,
    ) -> Self {
        Self {
            state: Mutex::new(state),
            store,
            payments: PaymentProcessor::new(gateway),
            notifier,
        }
    }

    /// Restores the machine from `store`, or seeds the catalog if the store is empty.
    pub async fn open(
        config: &MachineConfig,
        store: MachineStoreBox,
        gateway: PaymentGatewayBox,
    ) -> Result<Self> {
        config.validate()?;
        let state = match store.load().await? {
            Some(snapshot) => {
                info!(
                    products = snapshot.products.len(),
                    transactions = snapshot.transactions.len(),
                    "machine state restored"
                );
                MachineState::from(snapshot)
            }
            None => {
                let state = MachineState::seeded(config);
                store.save_funds(&state.funds).await?;
                store.save_products(state.inventory.list()).await?;
                info!(products = state.inventory.list().len(), "machine seeded");
                state
            }
        };

        Ok(Self::new(
            state,
            store,
            gateway,
            BalanceNotifier::new(config.notify_capacity),
        ))
    }

    pub fn subscribe(&self) -> broadcast::Receiver<BalanceUpdate> {
        self.notifier.subscribe()
    }

    pub async fn list_products(&self) -> Vec<Product> {
        self.state.lock().await.inventory.list().to_vec()
    }

    pub async fn product(&self, id: ProductId) -> Result<Product> {
        let state = self.state.lock().await;
        state
            .inventory
            .find(id)
            .cloned()
            .ok_or(VendingError::ProductNotFound)
    }

    pub async fn start_transaction(&self, payment_type: &str) -> Result<Transaction> {
        let result = self.try_start_transaction(payment_type).await;
        match &result {
            Ok(tx) => info!(transaction = tx.id, payment_type = %tx.payment_type, "transaction started"),
            Err(e) => warn!(payment_type, reason = %e, "transaction not started"),
        }
        result
    }

    pub async fn cancel_transaction(&self) -> Result<Transaction> {
        let result = self.try_cancel_transaction().await;
        match &result {
            Ok(tx) => info!(transaction = tx.id, "transaction cancelled"),
            Err(e) => warn!(reason = %e, "cancel rejected"),
        }
        result
    }

    pub async fn active_transaction(&self) -> Option<Transaction> {
        self.state.lock().await.ledger.active().cloned()
    }

    pub async fn transaction(&self, id: TransactionId) -> Result<Transaction> {
        let state = self.state.lock().await;
        state
            .ledger
            .find(id)
            .cloned()
            .ok_or(VendingError::TransactionNotFound)
    }

    /// Payments of the given type in ledger order. An unknown type matches nothing.
    pub async fn list_payments(&self, filter: Option<&str>) -> Vec<Transaction> {
        let state = self.state.lock().await;
        match PaymentType::parse_filter(filter) {
            Ok(filter) => state.ledger.payments(filter),
            Err(_) => Vec::new(),
        }
    }

    /// Sells one unit of `product_id` against a transaction.
    ///
    /// Without `transaction_id` the tail of the ledger is used, so a customer
    /// only ever buys against the transaction they just opened.
    pub async fn sell(
        &self,
        product_id: ProductId,
        transaction_id: Option<TransactionId>,
    ) -> Result<Product> {
        let result = self.try_sell(product_id, transaction_id).await;
        match &result {
            Ok(product) => info!(
                product = product_id,
                remaining = product.current_stock,
                "sale completed"
            ),
            Err(e) => warn!(product = product_id, transaction = ?transaction_id, reason = %e, "sale rejected"),
        }
        result
    }

    pub async fn restock(&self, id: ProductId, quantity: Option<u32>) -> Result<Product> {
        let mut state = self.state.lock().await;
        let mut inventory = state.inventory.clone();
        let product = inventory.restock(id, quantity)?.clone();
        self.store.save_product(&product).await?;
        state.inventory = inventory;
        info!(product = id, quantity = ?quantity, stock = product.current_stock, "product restocked");
        Ok(product)
    }

    pub async fn restock_all(&self) -> Result<()> {
        let mut state = self.state.lock().await;
        let mut inventory = state.inventory.clone();
        inventory.restock_all();
        self.store.save_products(inventory.list()).await?;
        state.inventory = inventory;
        info!("all products restocked");
        Ok(())
    }

    pub async fn clear_funds(&self) -> Result<()> {
        let mut state = self.state.lock().await;
        let watermark = state.ledger.settled_watermark();
        let mut funds = state.funds.clone();
        let updates = self.payments.clear(&mut funds, watermark);
        self.store.save_funds(&funds).await?;
        state.funds = funds;
        drop(state);

        info!(cleared_through = watermark, "funds cleared");
        self.notifier.publish(&updates);
        Ok(())
    }

    pub async fn payment_amount(&self, filter: Option<&str>) -> Result<Money> {
        let state = self.state.lock().await;
        self.payments.amount(&state.funds, filter)
    }

    /// Compares the running totals with what the ledger says they should be.
    pub async fn reconcile(&self) -> Reconciliation {
        let state = self.state.lock().await;
        let report = state.funds.reconcile(&state.ledger);
        if !report.is_balanced() {
            warn!(?report, "running totals disagree with ledger");
        }
        report
    }

    /// A consistent copy of the whole machine.
    pub async fn snapshot(&self) -> MachineSnapshot {
        let state = self.state.lock().await;
        MachineSnapshot {
            products: state.inventory.list().to_vec(),
            transactions: state.ledger.iter().cloned().collect(),
            funds: state.funds.clone(),
        }
    }
}

/// Private API
impl VendingEngine {
    async fn try_start_transaction(&self, payment_type: &str) -> Result<Transaction> {
        let payment_type: PaymentType = payment_type.parse()?;
        let mut state = self.state.lock().await;
        let tx = state.ledger.stage_create(payment_type)?;
        self.store.save_transaction(&tx).await?;
        state.ledger.commit(tx.clone());
        Ok(tx)
    }

    async fn try_cancel_transaction(&self) -> Result<Transaction> {
        let mut state = self.state.lock().await;
        let tx = state.ledger.stage_cancel()?;
        self.store.save_transaction(&tx).await?;
        state.ledger.commit(tx.clone());
        Ok(tx)
    }

    /// - Resolve product, then transaction
    /// - Refuse anything already attached or final, without touching state
    /// - Attach, then fail on empty slot or declined payment
    /// - On settlement: mark success, take one unit, persist the sale as one write
    /// - Apply to memory only once persisted, then broadcast new totals
    async fn try_sell(
        &self,
        product_id: ProductId,
        transaction_id: Option<TransactionId>,
    ) -> Result<Product> {
        let mut state = self.state.lock().await;

        let product = state
            .inventory
            .find(product_id)
            .cloned()
            .ok_or(VendingError::ProductNotFound)?;

        let mut tx = match transaction_id {
            Some(id) => state.ledger.find(id),
            None => state.ledger.tail(),
        }
        .cloned()
        .ok_or(VendingError::TransactionNotFound)?;

        if !tx.is_attachable() {
            return Err(VendingError::AlreadyProcessed);
        }

        tx.attach(product.id, product.price);

        if product.is_sold_out() {
            tx.set_status(TransactionStatus::Failed);
            self.store.save_transaction(&tx).await?;
            state.ledger.commit(tx);
            return Err(VendingError::OutOfStock);
        }

        let mut funds = state.funds.clone();
        match self.payments.settle(&mut funds, &tx).await {
            Settlement::Declined { reason } => {
                tx.set_status(TransactionStatus::Failed);
                self.store.save_transaction(&tx).await?;
                state.ledger.commit(tx);
                Err(VendingError::PaymentFailed(reason))
            }
            Settlement::Settled { updates } => {
                tx.set_status(TransactionStatus::Success);
                let mut inventory = state.inventory.clone();
                let sold = inventory.decrement(product_id)?.clone();

                if let Err(e) = self.store.save_sale(&tx, &sold, &funds).await {
                    error!(transaction = tx.id, amount = %tx.amount, error = %e, "settled sale could not be stored");
                    return Err(e);
                }

                state.ledger.commit(tx);
                state.inventory = inventory;
                state.funds = funds;
                drop(state);

                self.notifier.publish(&updates);
                Ok(sold)
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::ports::MachineStore;
    use crate::infrastructure::gateway::{ApprovingGateway, DecliningGateway};
    use crate::infrastructure::in_memory::InMemoryMachineStore;
    use rust_decimal_macros::dec;

    async fn engine() -> VendingEngine {
        VendingEngine::open(
            &MachineConfig::default(),
            Box::new(InMemoryMachineStore::new()),
            Box::new(ApprovingGateway),
        )
        .await
        .unwrap()
    }

    #[tokio::test]
    async fn test_open_seeds_catalog() {
        let engine = engine().await;
        let products = engine.list_products().await;
        assert_eq!(products.len(), 10);
        assert!(products.iter().all(|p| p.current_stock == 20));
        assert!(products.iter().all(|p| p.price == Money::new(dec!(2.40))));
    }

    #[tokio::test]
    async fn test_sell_uses_tail_transaction() {
        let engine = engine().await;
        let tx = engine.start_transaction("Cash").await.unwrap();

        let product = engine.sell(1, None).await.unwrap();

        assert_eq!(product.current_stock, 19);
        let tx = engine.transaction(tx.id).await.unwrap();
        assert_eq!(tx.status, TransactionStatus::Success);
        assert_eq!(tx.product_id, Some(1));
        assert_eq!(tx.amount, Money::new(dec!(2.40)));
        assert_eq!(
            engine.payment_amount(Some("Cash")).await.unwrap(),
            Money::new(dec!(2.40))
        );
    }

    #[tokio::test]
    async fn test_sell_with_explicit_transaction() {
        let engine = engine().await;
        let tx = engine.start_transaction("Card").await.unwrap();

        engine.sell(4, Some(tx.id)).await.unwrap();

        assert!(matches!(
            engine.sell(4, Some(tx.id)).await,
            Err(VendingError::AlreadyProcessed)
        ));
        assert!(matches!(
            engine.sell(4, Some(99)).await,
            Err(VendingError::TransactionNotFound)
        ));
    }

    #[tokio::test]
    async fn test_sell_unknown_product_checked_first() {
        let engine = engine().await;
        assert!(matches!(
            engine.sell(20, None).await,
            Err(VendingError::ProductNotFound)
        ));
    }

    #[tokio::test]
    async fn test_sell_against_cancelled_transaction() {
        let engine = engine().await;
        engine.start_transaction("Cash").await.unwrap();
        engine.cancel_transaction().await.unwrap();

        assert!(matches!(
            engine.sell(1, None).await,
            Err(VendingError::AlreadyProcessed)
        ));
        assert_eq!(engine.product(1).await.unwrap().current_stock, 20);
    }

    #[tokio::test]
    async fn test_declined_card_marks_failed() {
        let engine = VendingEngine::open(
            &MachineConfig::default(),
            Box::new(InMemoryMachineStore::new()),
            Box::new(DecliningGateway::default()),
        )
        .await
        .unwrap();
        let tx = engine.start_transaction("Card").await.unwrap();

        let err = engine.sell(2, None).await.unwrap_err();

        assert!(matches!(err, VendingError::PaymentFailed(_)));
        assert_eq!(err.to_string(), "Card payment failed");
        assert_eq!(
            engine.transaction(tx.id).await.unwrap().status,
            TransactionStatus::Failed
        );
        assert_eq!(engine.product(2).await.unwrap().current_stock, 20);
        assert_eq!(engine.payment_amount(None).await.unwrap(), Money::ZERO);
        assert!(engine.active_transaction().await.is_none());
    }

    #[tokio::test]
    async fn test_invalid_payment_type_leaves_ledger_empty() {
        let engine = engine().await;
        assert!(matches!(
            engine.start_transaction("AfterPay").await,
            Err(VendingError::InvalidPaymentType(_))
        ));
        assert!(engine.list_payments(None).await.is_empty());
    }

    #[tokio::test]
    async fn test_list_payments_unknown_filter_is_empty() {
        let engine = engine().await;
        engine.start_transaction("Cash").await.unwrap();
        assert!(engine.list_payments(Some("AfterPay")).await.is_empty());
        assert_eq!(engine.list_payments(Some("")).await.len(), 1);
    }

    #[tokio::test]
    async fn test_open_rejects_invalid_config() {
        for config in [
            MachineConfig {
                stock_limit: 0,
                ..MachineConfig::default()
            },
            MachineConfig {
                price: Money::new(dec!(-2.40)),
                ..MachineConfig::default()
            },
        ] {
            let store = InMemoryMachineStore::new();
            let result =
                VendingEngine::open(&config, Box::new(store.clone()), Box::new(ApprovingGateway))
                    .await;
            assert!(matches!(result, Err(VendingError::InvalidConfig(_))));
            assert!(store.load().await.unwrap().is_none());
        }
    }

    #[tokio::test]
    async fn test_open_restores_previous_state() {
        let store = InMemoryMachineStore::new();
        let first = VendingEngine::open(
            &MachineConfig::default(),
            Box::new(store.clone()),
            Box::new(ApprovingGateway),
        )
        .await
        .unwrap();
        first.start_transaction("Card").await.unwrap();
        first.sell(5, None).await.unwrap();
        first.start_transaction("Cash").await.unwrap();
        drop(first);

        let second = VendingEngine::open(
            &MachineConfig::default(),
            Box::new(store),
            Box::new(ApprovingGateway),
        )
        .await
        .unwrap();

        assert_eq!(second.product(5).await.unwrap().current_stock, 19);
        assert_eq!(
            second.payment_amount(Some("Card")).await.unwrap(),
            Money::new(dec!(2.40))
        );
        assert_eq!(second.active_transaction().await.map(|tx| tx.id), Some(2));
        assert!(matches!(
            second.start_transaction("Cash").await,
            Err(VendingError::ActiveTransactionExists)
        ));
    }
}
