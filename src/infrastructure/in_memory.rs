use crate::domain::funds::Funds;
use crate::domain::ports::{MachineSnapshot, MachineStore};
use crate::domain::product::{Product, ProductId};
use crate::domain::transaction::{Transaction, TransactionId};
use crate::error::Result;
use async_trait::async_trait;
use std::collections::BTreeMap;
use std::sync::Arc;
use tokio::sync::RwLock;

/// A thread-safe in-memory machine store.
///
/// Records are keyed by id in `BTreeMap`s so a snapshot comes back in catalog
/// and ledger order. Cloning shares the same underlying maps, which lets a test
/// reopen an engine against the state a previous engine left behind.
#[derive(Default, Clone)]
pub struct InMemoryMachineStore {
    products: Arc<RwLock<BTreeMap<ProductId, Product>>>,
    transactions: Arc<RwLock<BTreeMap<TransactionId, Transaction>>>,
    funds: Arc<RwLock<Option<Funds>>>,
}

impl InMemoryMachineStore {
    /// Creates a new, empty in-memory store.
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl MachineStore for InMemoryMachineStore {
    async fn save_product(&self, product: &Product) -> Result<()> {
        let mut products = self.products.write().await;
        products.insert(product.id, product.clone());
        Ok(())
    }

    async fn save_products(&self, products: &[Product]) -> Result<()> {
        let mut stored = self.products.write().await;
        for product in products {
            stored.insert(product.id, product.clone());
        }
        Ok(())
    }

    async fn save_transaction(&self, tx: &Transaction) -> Result<()> {
        let mut transactions = self.transactions.write().await;
        transactions.insert(tx.id, tx.clone());
        Ok(())
    }

    async fn save_funds(&self, funds: &Funds) -> Result<()> {
        *self.funds.write().await = Some(funds.clone());
        Ok(())
    }

    async fn save_sale(&self, tx: &Transaction, product: &Product, funds: &Funds) -> Result<()> {
        // Same lock order as `load`.
        let mut products = self.products.write().await;
        let mut transactions = self.transactions.write().await;
        let mut stored_funds = self.funds.write().await;
        products.insert(product.id, product.clone());
        transactions.insert(tx.id, tx.clone());
        *stored_funds = Some(funds.clone());
        Ok(())
    }

    async fn load(&self) -> Result<Option<MachineSnapshot>> {
        let products = self.products.read().await;
        if products.is_empty() {
            return Ok(None);
        }
        let transactions = self.transactions.read().await;
        let funds = self.funds.read().await;

        Ok(Some(MachineSnapshot {
            products: products.values().cloned().collect(),
            transactions: transactions.values().cloned().collect(),
            funds: funds.clone().unwrap_or_default(),
        }))
    }
}
