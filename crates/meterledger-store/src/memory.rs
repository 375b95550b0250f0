//! In-memory ledger
//!
//! Uses DashMap for concurrent access. Contents live only as long as the
//! value; nothing is persisted.

use dashmap::DashMap;
use meterledger_common::Result;

use crate::LedgerStore;

/// In-memory ledger implementation
#[derive(Debug, Default)]
pub struct MemoryLedger {
    entries: DashMap<String, Vec<u8>>,
}

impl MemoryLedger {
    /// Create an empty ledger
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of keys stored
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Check if the ledger holds no keys
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Check whether `key` is present
    pub fn contains_key(&self, key: &str) -> bool {
        self.entries.contains_key(key)
    }
}

impl LedgerStore for MemoryLedger {
    fn get(&self, key: &str) -> Result<Option<Vec<u8>>> {
        Ok(self.entries.get(key).map(|v| v.value().clone()))
    }

    fn put(&self, key: &str, value: &[u8]) -> Result<()> {
        self.entries.insert(key.to_string(), value.to_vec());
        Ok(())
    }
}
