//! Application layer orchestrating the vending workflows.
//!
//! `VendingEngine` is the entry point. It owns the machine state behind a
//! single `tokio` mutex so that every purchase, cancellation, restock and
//! funds operation runs as one uninterrupted read-modify-write.

pub mod engine;
pub mod notifier;
pub mod payment;
