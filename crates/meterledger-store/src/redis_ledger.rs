//! Redis-backed ledger
//!
//! Maps ledger keys onto Redis string keys under a namespace prefix. A
//! single blocking connection is shared behind a mutex and re-established
//! lazily after a failed call.

use meterledger_common::{MeterLedgerError, Result};
use parking_lot::Mutex;
use redis::{Client, Commands, Connection};
use tracing::{debug, info, instrument, warn};

use crate::LedgerStore;

/// Redis ledger implementation
pub struct RedisLedger {
    /// Redis client
    client: Client,
    /// Lazily (re)opened connection
    connection: Mutex<Option<Connection>>,
    /// Namespace prefix for every key, empty for none
    prefix: String,
}

impl RedisLedger {
    /// Connect to Redis at `redis_url`
    #[instrument(skip(redis_url))]
    pub fn open(redis_url: &str) -> Result<Self> {
        let client = Client::open(redis_url)
            .map_err(|e| MeterLedgerError::Config(format!("Failed to create Redis client: {}", e)))?;

        let connection = client
            .get_connection()
            .map_err(|e| MeterLedgerError::Storage(format!("Failed to connect to Redis: {}", e)))?;

        info!("Connected to Redis ledger");

        Ok(Self {
            client,
            connection: Mutex::new(Some(connection)),
            prefix: "meterledger".to_string(),
        })
    }

    /// Use a custom namespace prefix
    pub fn with_prefix(mut self, prefix: &str) -> Self {
        self.prefix = prefix.to_string();
        self
    }

    fn namespaced(&self, key: &str) -> String {
        if self.prefix.is_empty() {
            key.to_string()
        } else {
            format!("{}:{}", self.prefix, key)
        }
    }

    fn with_connection<T>(
        &self,
        op: impl FnOnce(&mut Connection) -> redis::RedisResult<T>,
    ) -> Result<T> {
        let mut guard = self.connection.lock();

        if guard.is_none() {
            let connection = self
                .client
                .get_connection()
                .map_err(|e| MeterLedgerError::Storage(format!("Failed to connect to Redis: {}", e)))?;
            *guard = Some(connection);
        }

        let Some(connection) = guard.as_mut() else {
            return Err(MeterLedgerError::Storage("Redis connection unavailable".to_string()));
        };

        match op(connection) {
            Ok(value) => Ok(value),
            Err(e) => {
                warn!(error = %e, "Redis call failed, dropping connection");
                *guard = None;
                Err(MeterLedgerError::Storage(format!("Redis call failed: {}", e)))
            }
        }
    }
}

impl LedgerStore for RedisLedger {
    fn get(&self, key: &str) -> Result<Option<Vec<u8>>> {
        let redis_key = self.namespaced(key);
        let value: Option<Vec<u8>> = self.with_connection(|conn| conn.get(&redis_key))?;
        debug!(key = %redis_key, hit = value.is_some(), "Ledger get");
        Ok(value)
    }

    fn put(&self, key: &str, value: &[u8]) -> Result<()> {
        let redis_key = self.namespaced(key);
        self.with_connection(|conn| conn.set::<_, _, ()>(&redis_key, value))?;
        debug!(key = %redis_key, bytes = value.len(), "Ledger put");
        Ok(())
    }
}
