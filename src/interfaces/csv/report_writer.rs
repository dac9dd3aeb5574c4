use crate::domain::funds::{Funds, Reconciliation};
use crate::domain::product::{Product, ProductId};
use crate::domain::transaction::{Transaction, TransactionId};
use serde::Serialize;
use std::io::Write;

#[derive(Debug, Serialize)]
struct ProductRow<'a> {
    id: ProductId,
    name: &'a str,
    image: &'a str,
    current_stock: u32,
    stock_limit: u32,
    price: String,
}

#[derive(Debug, Serialize)]
struct PaymentRow {
    id: TransactionId,
    product: Option<ProductId>,
    payment_type: String,
    amount: String,
    status: String,
    created_at: String,
    last_updated_at: String,
}

#[derive(Debug, Serialize)]
struct FundsRow {
    cash: String,
    card: String,
    total: String,
    balanced: bool,
}

/// Writes machine reports as CSV to any `Write` sink (usually stdout).
pub struct ReportWriter<W: Write> {
    writer: csv::Writer<W>,
}

impl<W: Write> ReportWriter<W> {
    pub fn new(sink: W) -> Self {
        Self {
            writer: csv::Writer::from_writer(sink),
        }
    }

    pub fn write_products<'a>(
        &mut self,
        products: impl IntoIterator<Item = &'a Product>,
    ) -> csv::Result<()> {
        for product in products {
            self.writer.serialize(ProductRow {
                id: product.id,
                name: &product.name,
                image: &product.image,
                current_stock: product.current_stock,
                stock_limit: product.stock_limit,
                price: product.price.to_string(),
            })?;
        }
        self.writer.flush()?;
        Ok(())
    }

    pub fn write_payments<'a>(
        &mut self,
        payments: impl IntoIterator<Item = &'a Transaction>,
    ) -> csv::Result<()> {
        for tx in payments {
            self.writer.serialize(PaymentRow {
                id: tx.id,
                product: tx.product_id,
                payment_type: tx.payment_type.to_string(),
                amount: tx.amount.to_string(),
                status: tx.status.to_string(),
                created_at: tx.created_at.to_rfc3339(),
                last_updated_at: tx.last_updated_at.to_rfc3339(),
            })?;
        }
        self.writer.flush()?;
        Ok(())
    }

    pub fn write_funds(&mut self, funds: &Funds, reconciliation: &Reconciliation) -> csv::Result<()> {
        self.writer.serialize(FundsRow {
            cash: funds.cash.to_string(),
            card: funds.card.to_string(),
            total: funds.total().to_string(),
            balanced: reconciliation.is_balanced(),
        })?;
        self.writer.flush()?;
        Ok(())
    }
}
