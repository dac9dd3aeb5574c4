pub mod application;
pub mod config;
pub mod domain;
pub mod error;
pub mod infrastructure;
pub mod interfaces;

pub use application::engine::VendingEngine;
pub use config::MachineConfig;
pub use error::{ErrorKind, Result, VendingError};
