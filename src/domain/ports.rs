use super::funds::Funds;
use super::product::Product;
use super::transaction::Transaction;
use crate::error::Result;
use async_trait::async_trait;
use thiserror::Error;

/// Raw failure reported by a payment network. Never shown to the customer as-is.
#[derive(Error, Debug, Clone, PartialEq)]
#[error("{0}")]
pub struct GatewayError(pub String);

/// External settlement for card payments.
///
/// A charge either succeeds or fails as a whole; a failed charge leaves no
/// partial state behind on either side.
#[async_trait]
pub trait PaymentGateway: Send + Sync {
    async fn charge(&self, tx: &Transaction) -> std::result::Result<(), GatewayError>;
}

/// Everything needed to bring a machine back after a restart.
#[derive(Debug, Clone, PartialEq)]
pub struct MachineSnapshot {
    pub products: Vec<Product>,
    pub transactions: Vec<Transaction>,
    pub funds: Funds,
}

/// Persistence for the machine. Each call either stores everything it was
/// given or nothing.
#[async_trait]
pub trait MachineStore: Send + Sync {
    async fn save_product(&self, product: &Product) -> Result<()>;
    async fn save_products(&self, products: &[Product]) -> Result<()>;
    async fn save_transaction(&self, tx: &Transaction) -> Result<()>;
    async fn save_funds(&self, funds: &Funds) -> Result<()>;
    /// A completed sale: the settled transaction, the product it took a unit
    /// from and the credited totals.
    async fn save_sale(&self, tx: &Transaction, product: &Product, funds: &Funds) -> Result<()>;
    /// `None` when nothing has been stored yet.
    async fn load(&self) -> Result<Option<MachineSnapshot>>;
}

pub type MachineStoreBox = Box<dyn MachineStore>;
pub type PaymentGatewayBox = Box<dyn PaymentGateway>;
