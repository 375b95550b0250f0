//! Three-key legacy layout
//!
//! Older ledgers kept each meter attribute under its own key:
//!
//! ```text
//! kwh_<name>     reported usage   "120.500000"
//! <name>         balance          "5.000000"
//! status_<name>  enabled flag     "true"
//! ```
//!
//! A legacy meter exists only if all three keys are present.

use meterledger_common::{MeterRecord, Result};
use meterledger_store::LedgerStore;

use super::MeterRegistry;

/// Legacy key holding a meter's reported usage
pub fn key_usage(name: &str) -> String {
    format!("kwh_{}", name)
}

/// Legacy key holding a meter's balance
pub fn key_balance(name: &str) -> String {
    name.to_string()
}

/// Legacy key holding a meter's enabled flag
pub fn key_status(name: &str) -> String {
    format!("status_{}", name)
}

impl<S: LedgerStore> MeterRegistry<S> {
    /// Assemble a record from the legacy keys of meter `name`
    ///
    /// Returns `None` unless all three keys are present.
    pub fn load_legacy(&self, name: &str) -> Result<Option<MeterRecord>> {
        let (usage_key, balance_key, status_key) =
            (key_usage(name), key_balance(name), key_status(name));

        for key in [&usage_key, &balance_key, &status_key] {
            if !self.contains(key)? {
                return Ok(None);
            }
        }

        Ok(Some(MeterRecord::from_parts(
            name,
            self.read_decimal(&usage_key)?,
            self.read_decimal(&balance_key)?,
            self.read_bool(&status_key)?,
        )))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use meterledger_store::MemoryLedger;
    use rust_decimal::Decimal;
    use rust_decimal_macros::dec;

    #[test]
    fn test_key_derivation() {
        assert_eq!(key_usage("M1"), "kwh_M1");
        assert_eq!(key_balance("M1"), "M1");
        assert_eq!(key_status("M1"), "status_M1");
    }

    #[test]
    fn test_load_complete_legacy_meter() {
        let registry = MeterRegistry::new(MemoryLedger::new());
        registry.write(&key_usage("M1"), b"120.500000").unwrap();
        registry.write(&key_balance("M1"), b"5.000000").unwrap();
        registry.write(&key_status("M1"), b"false").unwrap();

        let record = registry.load_legacy("M1").unwrap().unwrap();
        assert_eq!(record.name, "M1");
        assert_eq!(record.reported_usage, dec!(120.5));
        assert_eq!(record.balance, dec!(5));
        assert!(!record.enabled);
    }

    #[test]
    fn test_malformed_legacy_values_read_as_defaults() {
        let registry = MeterRegistry::new(MemoryLedger::new());
        registry.write(&key_usage("M1"), b"lots").unwrap();
        registry.write(&key_balance("M1"), b"2.5").unwrap();
        registry.write(&key_status("M1"), b"maybe").unwrap();

        let record = registry.load_legacy("M1").unwrap().unwrap();
        assert_eq!(record.reported_usage, Decimal::ZERO);
        assert_eq!(record.balance, dec!(2.5));
        assert!(!record.enabled);
    }

    #[test]
    fn test_partial_legacy_meter_is_absent() {
        let registry = MeterRegistry::new(MemoryLedger::new());
        registry.write(&key_usage("M1"), b"3").unwrap();

        assert!(registry.load_legacy("M1").unwrap().is_none());
    }
}
