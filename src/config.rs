use crate::domain::money::Money;
use crate::error::{Result, VendingError};
use rust_decimal_macros::dec;

/// Defaults applied when a machine is seeded for the first time.
#[derive(Debug, Clone, PartialEq)]
pub struct MachineConfig {
    /// Capacity of every catalog slot. Must be positive.
    pub stock_limit: u32,
    /// Unit price of every catalog product. Must not be negative.
    pub price: Money,
    /// Buffered balance updates per subscriber before the oldest are dropped.
    pub notify_capacity: usize,
}

impl MachineConfig {
    pub fn validate(&self) -> Result<()> {
        if self.stock_limit == 0 {
            return Err(VendingError::InvalidConfig(
                "stock limit must be positive".to_string(),
            ));
        }
        if self.price < Money::ZERO {
            return Err(VendingError::InvalidConfig(format!(
                "price must not be negative, got {}",
                self.price
            )));
        }
        Ok(())
    }
}

impl Default for MachineConfig {
    fn default() -> Self {
        Self {
            stock_limit: 20,
            price: Money::new(dec!(2.40)),
            notify_capacity: 64,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::ErrorKind;

    #[test]
    fn test_default_config_is_valid() {
        assert!(MachineConfig::default().validate().is_ok());
    }

    #[test]
    fn test_free_products_are_allowed() {
        let config = MachineConfig {
            price: Money::ZERO,
            ..MachineConfig::default()
        };
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_zero_stock_limit_rejected() {
        let config = MachineConfig {
            stock_limit: 0,
            ..MachineConfig::default()
        };
        let err = config.validate().unwrap_err();
        assert_eq!(err.kind(), ErrorKind::Validation);
        assert_eq!(
            err.to_string(),
            "Invalid configuration: stock limit must be positive"
        );
    }

    #[test]
    fn test_negative_price_rejected() {
        let config = MachineConfig {
            price: Money::new(dec!(-2.40)),
            ..MachineConfig::default()
        };
        assert!(matches!(
            config.validate(),
            Err(VendingError::InvalidConfig(_))
        ));
    }
}
