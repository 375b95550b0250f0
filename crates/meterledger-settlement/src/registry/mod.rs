//! Meter registry
//!
//! Derives ledger keys for meters and gives typed access to what is stored
//! under them. No business rules live here; the engine decides what to
//! read and write.
//!
//! Each meter is one JSON [`MeterRecord`] under `<prefix><name>`. The
//! three-key layout older ledgers used is handled in [`legacy`].

pub mod legacy;

use meterledger_common::{MeterLedgerError, MeterRecord, Result, DEFAULT_KEY_PREFIX};
use meterledger_store::LedgerStore;
use rust_decimal::Decimal;
use std::str::FromStr;
use tracing::warn;

/// Typed access to meter records in a [`LedgerStore`]
pub struct MeterRegistry<S> {
    store: S,
    prefix: String,
}

impl<S: LedgerStore> MeterRegistry<S> {
    /// Create a registry using the default record prefix
    pub fn new(store: S) -> Self {
        Self {
            store,
            prefix: DEFAULT_KEY_PREFIX.to_string(),
        }
    }

    /// Use a custom record prefix
    pub fn with_prefix(mut self, prefix: &str) -> Self {
        self.prefix = prefix.to_string();
        self
    }

    /// The underlying store
    pub fn store(&self) -> &S {
        &self.store
    }

    /// Key the record of meter `name` is stored under
    pub fn record_key(&self, name: &str) -> String {
        format!("{}{}", self.prefix, name)
    }

    /// Load the record of meter `name`, `None` if it was never initialized
    pub fn load(&self, name: &str) -> Result<Option<MeterRecord>> {
        match self.store.get(&self.record_key(name))? {
            Some(bytes) => MeterRecord::from_bytes(&bytes).map(Some),
            None => Ok(None),
        }
    }

    /// Load the record of meter `name`, failing with `NotFound` if absent
    pub fn require(&self, name: &str) -> Result<MeterRecord> {
        self.load(name)?
            .ok_or_else(|| MeterLedgerError::NotFound(format!("meter {}", name)))
    }

    /// Persist `record` with a single put
    pub fn save(&self, record: &MeterRecord) -> Result<()> {
        self.write(&self.record_key(&record.name), &record.to_bytes()?)
    }

    /// Check whether anything is stored under `key`
    pub fn contains(&self, key: &str) -> Result<bool> {
        Ok(self.store.get(key)?.is_some())
    }

    /// Read a decimal stored as text under `key`
    ///
    /// An absent key reads as zero. A malformed value also reads as zero and
    /// is logged.
    pub fn read_decimal(&self, key: &str) -> Result<Decimal> {
        Ok(match self.store.get(key)? {
            Some(raw) => decode_decimal(key, &raw),
            None => Decimal::ZERO,
        })
    }

    /// Read a flag stored as text under `key`, failing with `NotFound` if absent
    pub fn read_bool(&self, key: &str) -> Result<bool> {
        match self.store.get(key)? {
            Some(raw) => Ok(decode_bool(key, &raw)),
            None => Err(MeterLedgerError::NotFound(format!("key {}", key))),
        }
    }

    /// Store `value` under `key`
    pub fn write(&self, key: &str, value: &[u8]) -> Result<()> {
        self.store.put(key, value)
    }
}

fn decode_decimal(key: &str, raw: &[u8]) -> Decimal {
    let parsed = std::str::from_utf8(raw)
        .ok()
        .and_then(|text| Decimal::from_str(text).or_else(|_| Decimal::from_scientific(text)).ok());

    parsed.unwrap_or_else(|| {
        warn!(key = %key, "Malformed decimal in ledger, reading as zero");
        Decimal::ZERO
    })
}

fn decode_bool(key: &str, raw: &[u8]) -> bool {
    match std::str::from_utf8(raw).map(meterledger_common::parse_flag) {
        Ok(Ok(flag)) => flag,
        _ => {
            warn!(key = %key, "Malformed flag in ledger, reading as false");
            false
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use meterledger_store::MemoryLedger;
    use rust_decimal_macros::dec;

    fn registry() -> MeterRegistry<MemoryLedger> {
        MeterRegistry::new(MemoryLedger::new())
    }

    #[test]
    fn test_record_key() {
        let registry = registry();
        assert_eq!(registry.record_key("M1"), "meter:M1");

        let registry = registry.with_prefix("grid/");
        assert_eq!(registry.record_key("M1"), "grid/M1");
    }

    #[test]
    fn test_save_then_load() {
        let registry = registry();
        assert!(registry.load("M1").unwrap().is_none());

        let mut record = MeterRecord::new("M1");
        record.record_usage(dec!(7));
        registry.save(&record).unwrap();

        let loaded = registry.require("M1").unwrap();
        assert_eq!(loaded.reported_usage, dec!(7));
        assert!(registry.store().contains_key("meter:M1"));
    }

    #[test]
    fn test_require_absent_is_not_found() {
        let result = registry().require("ghost");
        assert!(matches!(result, Err(MeterLedgerError::NotFound(_))));
    }

    #[test]
    fn test_corrupt_record_is_serialization_error() {
        let registry = registry();
        registry.write("meter:M1", b"not json").unwrap();

        let result = registry.load("M1");
        assert!(matches!(result, Err(MeterLedgerError::Serialization(_))));
    }

    #[test]
    fn test_read_decimal_defaults() {
        let registry = registry();
        assert_eq!(registry.read_decimal("kwh_1").unwrap(), Decimal::ZERO);

        registry.write("kwh_1", b"12.500000").unwrap();
        assert_eq!(registry.read_decimal("kwh_1").unwrap(), dec!(12.5));

        registry.write("kwh_2", b"garbage").unwrap();
        assert_eq!(registry.read_decimal("kwh_2").unwrap(), Decimal::ZERO);
    }

    #[test]
    fn test_contains() {
        let registry = registry();
        assert!(!registry.contains("status_M1").unwrap());

        registry.write("status_M1", b"").unwrap();
        assert!(registry.contains("status_M1").unwrap());
    }

    #[test]
    fn test_read_bool() {
        let registry = registry();
        assert!(matches!(
            registry.read_bool("status_M1"),
            Err(MeterLedgerError::NotFound(_))
        ));

        registry.write("status_M1", b"true").unwrap();
        assert!(registry.read_bool("status_M1").unwrap());

        registry.write("status_M2", b"maybe").unwrap();
        assert!(!registry.read_bool("status_M2").unwrap());
    }
}
