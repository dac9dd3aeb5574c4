#![allow(dead_code)]

use async_trait::async_trait;
use rand::Rng;
use std::fs::File;
use std::io::Error;
use std::path::Path;
use std::sync::Arc;
use std::sync::atomic::{AtomicUsize, Ordering};
use vending_machine::domain::ports::{GatewayError, PaymentGateway};
use vending_machine::domain::transaction::Transaction;
use vending_machine::infrastructure::gateway::ApprovingGateway;
use vending_machine::infrastructure::in_memory::InMemoryMachineStore;
use vending_machine::{MachineConfig, VendingEngine};

pub const HEADER: [&str; 4] = ["command", "product", "tx", "value"];

pub async fn engine() -> VendingEngine {
    engine_with(Box::new(ApprovingGateway)).await
}

pub async fn engine_with(gateway: Box<dyn PaymentGateway>) -> VendingEngine {
    VendingEngine::open(
        &MachineConfig::default(),
        Box::new(InMemoryMachineStore::new()),
        gateway,
    )
    .await
    .expect("failed to open engine")
}

/// Gateway that counts charges and declines when told to.
#[derive(Clone, Default)]
pub struct CountingGateway {
    pub charges: Arc<AtomicUsize>,
    pub decline: bool,
}

impl CountingGateway {
    pub fn declining() -> Self {
        Self {
            decline: true,
            ..Self::default()
        }
    }

    pub fn count(&self) -> usize {
        self.charges.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl PaymentGateway for CountingGateway {
    async fn charge(&self, tx: &Transaction) -> Result<(), GatewayError> {
        self.charges.fetch_add(1, Ordering::SeqCst);
        if self.decline {
            Err(GatewayError(format!("issuer declined transaction {}", tx.id)))
        } else {
            Ok(())
        }
    }
}

pub fn write_script(path: &Path, rows: &[[&str; 4]]) -> Result<(), Error> {
    let file = File::create(path)?;
    let mut wtr = csv::WriterBuilder::new().from_writer(file);
    wtr.write_record(HEADER)?;
    for row in rows {
        wtr.write_record(row)?;
    }
    wtr.flush()?;
    Ok(())
}

/// Writes `purchases` random create/sell pairs, with a restock_all every 50 purchases.
pub fn generate_script(path: &Path, purchases: usize) -> Result<(), Error> {
    let file = File::create(path)?;
    let mut wtr = csv::WriterBuilder::new().from_writer(file);
    wtr.write_record(HEADER)?;

    let mut rng = rand::thread_rng();
    for i in 1..=purchases {
        let payment = if rng.gen_bool(0.5) { "Cash" } else { "Card" };
        let product = rng.gen_range(1..=10).to_string();
        wtr.write_record(["create", "", "", payment])?;
        wtr.write_record(["sell", product.as_str(), "", ""])?;
        if i % 50 == 0 {
            wtr.write_record(["restock_all", "", "", ""])?;
        }
    }

    wtr.flush()?;
    Ok(())
}
