use crate::application::engine::VendingEngine;
use crate::domain::product::ProductId;
use crate::domain::transaction::TransactionId;
use crate::error::Result;

/// One operator or hardware event fed to the machine.
#[derive(Debug, Clone, PartialEq)]
pub enum Command {
    /// Money inserted or card tapped.
    CreateTransaction { payment_type: String },
    CancelTransaction,
    /// Product button pressed.
    Sell {
        product: ProductId,
        transaction: Option<TransactionId>,
    },
    Restock {
        product: ProductId,
        quantity: Option<u32>,
    },
    RestockAll,
    ClearFunds,
}

impl Command {
    pub async fn execute(self, engine: &VendingEngine) -> Result<()> {
        match self {
            Command::CreateTransaction { payment_type } => {
                engine.start_transaction(&payment_type).await?;
            }
            Command::CancelTransaction => {
                engine.cancel_transaction().await?;
            }
            Command::Sell {
                product,
                transaction,
            } => {
                engine.sell(product, transaction).await?;
            }
            Command::Restock { product, quantity } => {
                engine.restock(product, quantity).await?;
            }
            Command::RestockAll => engine.restock_all().await?,
            Command::ClearFunds => engine.clear_funds().await?,
        }
        Ok(())
    }
}
