use crate::domain::funds::Funds;
use crate::domain::ports::{MachineSnapshot, MachineStore};
use crate::domain::product::Product;
use crate::domain::transaction::Transaction;
use crate::error::{Result, VendingError};
use async_trait::async_trait;
use rocksdb::{ColumnFamily, ColumnFamilyDescriptor, DB, IteratorMode, Options, WriteBatch};
use serde::de::DeserializeOwned;
use std::path::Path;
use std::sync::Arc;

/// Column Family for product records.
pub const CF_PRODUCTS: &str = "products";
/// Column Family for the transaction ledger.
pub const CF_TRANSACTIONS: &str = "transactions";
/// Column Family for the running totals.
pub const CF_FUNDS: &str = "funds";

const FUNDS_KEY: &[u8] = b"totals";

/// A persistent machine store backed by RocksDB.
///
/// Products and transactions are keyed by their big-endian id, so iterating a
/// column family returns them in catalog and ledger order. Values are JSON.
///
/// This struct is thread-safe (`Clone` shares the underlying `Arc<DB>`).
#[derive(Clone)]
pub struct RocksDBStore {
    db: Arc<DB>,
}

impl RocksDBStore {
    /// Opens or creates a RocksDB instance at the specified path, creating the
    /// column families on first use.
    pub fn open<P: AsRef<Path>>(path: P) -> Result<Self> {
        let mut opts = Options::default();
        opts.create_if_missing(true);
        opts.create_missing_column_families(true);

        let families = [CF_PRODUCTS, CF_TRANSACTIONS, CF_FUNDS]
            .into_iter()
            .map(|name| ColumnFamilyDescriptor::new(name, Options::default()))
            .collect::<Vec<_>>();

        let db = DB::open_cf_descriptors(&opts, path, families)?;

        Ok(Self { db: Arc::new(db) })
    }

    fn cf(&self, name: &str) -> Result<&ColumnFamily> {
        self.db.cf_handle(name).ok_or_else(|| {
            VendingError::InternalError(Box::new(std::io::Error::other(format!(
                "{name} column family not found"
            ))))
        })
    }

    fn read_all<T: DeserializeOwned>(&self, name: &str) -> Result<Vec<T>> {
        let cf = self.cf(name)?;
        let mut values = Vec::new();
        for item in self.db.iterator_cf(cf, IteratorMode::Start) {
            let (_key, value) = item?;
            values.push(serde_json::from_slice(&value)?);
        }
        Ok(values)
    }
}

#[async_trait]
impl MachineStore for RocksDBStore {
    async fn save_product(&self, product: &Product) -> Result<()> {
        let cf = self.cf(CF_PRODUCTS)?;
        let value = serde_json::to_vec(product)?;
        self.db.put_cf(cf, product.id.to_be_bytes(), value)?;
        Ok(())
    }

    async fn save_products(&self, products: &[Product]) -> Result<()> {
        let cf = self.cf(CF_PRODUCTS)?;
        let mut batch = WriteBatch::default();
        for product in products {
            batch.put_cf(cf, product.id.to_be_bytes(), serde_json::to_vec(product)?);
        }
        self.db.write(&batch)?;
        Ok(())
    }

    async fn save_transaction(&self, tx: &Transaction) -> Result<()> {
        let cf = self.cf(CF_TRANSACTIONS)?;
        let value = serde_json::to_vec(tx)?;
        self.db.put_cf(cf, tx.id.to_be_bytes(), value)?;
        Ok(())
    }

    async fn save_funds(&self, funds: &Funds) -> Result<()> {
        let cf = self.cf(CF_FUNDS)?;
        let value = serde_json::to_vec(funds)?;
        self.db.put_cf(cf, FUNDS_KEY, value)?;
        Ok(())
    }

    async fn save_sale(&self, tx: &Transaction, product: &Product, funds: &Funds) -> Result<()> {
        let mut batch = WriteBatch::default();
        batch.put_cf(
            self.cf(CF_TRANSACTIONS)?,
            tx.id.to_be_bytes(),
            serde_json::to_vec(tx)?,
        );
        batch.put_cf(
            self.cf(CF_PRODUCTS)?,
            product.id.to_be_bytes(),
            serde_json::to_vec(product)?,
        );
        batch.put_cf(self.cf(CF_FUNDS)?, FUNDS_KEY, serde_json::to_vec(funds)?);
        self.db.write(&batch)?;
        Ok(())
    }

    async fn load(&self) -> Result<Option<MachineSnapshot>> {
        let products: Vec<Product> = self.read_all(CF_PRODUCTS)?;
        if products.is_empty() {
            return Ok(None);
        }
        let transactions = self.read_all(CF_TRANSACTIONS)?;

        let funds = match self.db.get_cf(self.cf(CF_FUNDS)?, FUNDS_KEY)? {
            Some(bytes) => serde_json::from_slice(&bytes)?,
            None => Funds::default(),
        };

        Ok(Some(MachineSnapshot {
            products,
            transactions,
            funds,
        }))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::money::Money;
    use crate::domain::transaction::{PaymentType, TransactionStatus};
    use rust_decimal_macros::dec;
    use tempfile::tempdir;

    #[tokio::test]
    async fn test_rocksdb_open_cf() {
        let dir = tempdir().unwrap();
        let store = RocksDBStore::open(dir.path()).expect("Failed to open RocksDB");

        assert!(store.db.cf_handle(CF_PRODUCTS).is_some());
        assert!(store.db.cf_handle(CF_TRANSACTIONS).is_some());
        assert!(store.db.cf_handle(CF_FUNDS).is_some());
        assert!(store.load().await.unwrap().is_none());
    }

    #[tokio::test]
    async fn test_rocksdb_snapshot_roundtrip() {
        let dir = tempdir().unwrap();
        let store = RocksDBStore::open(dir.path()).unwrap();

        let price = Money::new(dec!(2.40));
        let products = [
            Product::new(10, "Bubblegum", "#000000", 20, price),
            Product::new(2, "Raspberry", "#000000", 20, price),
        ];
        store.save_products(&products).await.unwrap();

        let mut tx = Transaction::new(1, PaymentType::Cash);
        tx.attach(2, price);
        tx.set_status(TransactionStatus::Success);
        let mut sold = products[1].clone();
        sold.current_stock = 19;
        let mut funds = Funds::default();
        funds.credit(PaymentType::Cash, price);
        store.save_sale(&tx, &sold, &funds).await.unwrap();

        let snapshot = store.load().await.unwrap().unwrap();
        assert_eq!(
            snapshot.products.iter().map(|p| p.id).collect::<Vec<_>>(),
            vec![2, 10]
        );
        assert_eq!(snapshot.products[0].current_stock, 19);
        assert_eq!(snapshot.transactions, vec![tx]);
        assert_eq!(snapshot.funds, funds);
    }
}
