use super::money::Money;
use serde::{Deserialize, Serialize};

pub type ProductId = u32;

/// A slot in the machine: what it sells, what it costs, and how full it is.
#[derive(Debug, Serialize, Deserialize, PartialEq, Clone)]
pub struct Product {
    pub id: ProductId,
    pub name: String,
    /// Display colour token used by the front panel.
    pub image: String,
    pub stock_limit: u32,
    pub current_stock: u32,
    pub price: Money,
}

impl Product {
    /// A full slot at the given capacity and price.
    pub fn new(id: ProductId, name: &str, image: &str, stock_limit: u32, price: Money) -> Self {
        Self {
            id,
            name: name.to_string(),
            image: image.to_string(),
            stock_limit,
            current_stock: stock_limit,
            price,
        }
    }

    pub fn is_sold_out(&self) -> bool {
        self.current_stock == 0
    }
}

/// The fixed catalog loaded into a new machine, in slot order.
pub const CATALOG: [(ProductId, &str, &str); 10] = [
    (1, "Cola", "#873E23"),
    (2, "Raspberry", "#D1281F"),
    (3, "Orange", "#F77F07"),
    (4, "Lemon", "#F7F307"),
    (5, "Blueberry", "#070BF7"),
    (6, "Watermelon", "#19470D"),
    (7, "Strawberry", "#470D1E"),
    (8, "Mango", "#C27121"),
    (9, "Lime", "#98F24E"),
    (10, "Bubblegum", "#8C298C"),
];
