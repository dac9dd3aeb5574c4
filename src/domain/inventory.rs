//! Product records and the stock rules applied to them.

use super::money::Money;
use super::product::{CATALOG, Product, ProductId};
use crate::error::{Result, VendingError};

#[derive(Debug, Clone, PartialEq, Default)]
pub struct Inventory {
    products: Vec<Product>,
}

impl Inventory {
    pub fn new(products: Vec<Product>) -> Self {
        Self { products }
    }

    /// The ten catalog products, each full at `stock_limit` units and `price`.
    pub fn seeded(stock_limit: u32, price: Money) -> Self {
        let products = CATALOG
            .iter()
            .map(|(id, name, image)| Product::new(*id, name, image, stock_limit, price))
            .collect();
        Self { products }
    }

    /// All products in catalog order.
    pub fn list(&self) -> &[Product] {
        &self.products
    }

    pub fn find(&self, id: ProductId) -> Option<&Product> {
        self.products.iter().find(|p| p.id == id)
    }

    /// Adds `quantity` units, saturating at the stock limit. A missing quantity fills the slot.
    pub fn restock(&mut self, id: ProductId, quantity: Option<u32>) -> Result<&Product> {
        let product = self.find_mut(id)?;
        product.current_stock = match quantity {
            Some(quantity)
                if product.current_stock.saturating_add(quantity) <= product.stock_limit =>
            {
                product.current_stock + quantity
            }
            _ => product.stock_limit,
        };
        Ok(&*product)
    }

    pub fn restock_all(&mut self) {
        for product in &mut self.products {
            product.current_stock = product.stock_limit;
        }
    }

    /// Removes one unit. Callers check for stock first; an empty slot stays at zero.
    pub fn decrement(&mut self, id: ProductId) -> Result<&Product> {
        let product = self.find_mut(id)?;
        product.current_stock = product.current_stock.saturating_sub(1);
        Ok(&*product)
    }

    fn find_mut(&mut self, id: ProductId) -> Result<&mut Product> {
        self.products
            .iter_mut()
            .find(|p| p.id == id)
            .ok_or(VendingError::ProductNotFound)
    }
}
