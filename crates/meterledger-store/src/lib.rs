//! # Meterledger Store
//!
//! The ledger capability the settlement core reads and writes through.
//!
//! The ledger offers point lookups only: [`LedgerStore::get`] and
//! [`LedgerStore::put`]. There is no range scan, no delete and no
//! multi-call transaction; each call is individually atomic and the caller's
//! execution context serializes whole operations.
//!
//! ## Backends
//!
//! - [`MemoryLedger`]: DashMap-backed, for tests and dry runs
//! - [`RedisLedger`]: Redis-backed, one blocking connection

pub mod memory;
pub mod redis_ledger;

pub use memory::MemoryLedger;
pub use redis_ledger::RedisLedger;

use meterledger_common::Result;
use std::sync::Arc;

/// Point get/put access to the shared ledger
pub trait LedgerStore: Send + Sync {
    /// Read the value stored under `key`, `None` if absent
    fn get(&self, key: &str) -> Result<Option<Vec<u8>>>;

    /// Store `value` under `key`, replacing any previous value
    fn put(&self, key: &str, value: &[u8]) -> Result<()>;
}

impl<T: LedgerStore + ?Sized> LedgerStore for Arc<T> {
    fn get(&self, key: &str) -> Result<Option<Vec<u8>>> {
        (**self).get(key)
    }

    fn put(&self, key: &str, value: &[u8]) -> Result<()> {
        (**self).put(key, value)
    }
}

impl<T: LedgerStore + ?Sized> LedgerStore for Box<T> {
    fn get(&self, key: &str) -> Result<Option<Vec<u8>>> {
        (**self).get(key)
    }

    fn put(&self, key: &str, value: &[u8]) -> Result<()> {
        (**self).put(key, value)
    }
}
