//! Domain model: products, transactions, money, and the rules that govern them.

pub mod funds;
pub mod inventory;
pub mod ledger;
pub mod money;
pub mod ports;
pub mod product;
pub mod transaction;
