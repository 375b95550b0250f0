//! Meterledger configuration
//!
//! Loaded from an optional TOML file (`meterledger.toml`, or the path in
//! `METERLEDGER_CONFIG`) overlaid with `METERLEDGER__<SECTION>__<KEY>`
//! environment variables. Every field has a default, so an empty
//! environment yields a usable configuration.

use meterledger_common::{
    MeterLedgerError, Result, DEFAULT_EXCHANGE_RATE, DEFAULT_KEY_PREFIX,
    DEFAULT_SETTLEMENT_CANDIDATES,
};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

/// Top-level configuration
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct AppConfig {
    /// Settlement rules
    pub settlement: SettlementSettings,
    /// Ledger backend
    pub store: StoreSettings,
}

impl AppConfig {
    /// Load configuration from file and environment
    pub fn load() -> Result<Self> {
        // Try to load .env file
        let _ = dotenvy::dotenv();

        let path = std::env::var("METERLEDGER_CONFIG")
            .unwrap_or_else(|_| "meterledger.toml".to_string());

        let settings = ::config::Config::builder()
            .add_source(::config::File::with_name(&path).required(false))
            .add_source(
                ::config::Environment::with_prefix("METERLEDGER")
                    .prefix_separator("__")
                    .separator("__")
                    .list_separator(",")
                    .with_list_parse_key("settlement.candidates")
                    .try_parsing(true),
            )
            .build()
            .map_err(|e| MeterLedgerError::Config(format!("Failed to read configuration: {}", e)))?;

        settings
            .try_deserialize()
            .map_err(|e| MeterLedgerError::Config(format!("Invalid configuration: {}", e)))
    }
}

/// Settlement rules
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct SettlementSettings {
    /// Multiplier converting reported kWh into a balance adjustment
    pub exchange_rate: Decimal,
    /// Meters settled when a settle call names none
    pub candidates: Vec<String>,
    /// Reject report/change on disabled meters and skip them at settlement
    pub reject_disabled_writes: bool,
    /// Prefix of the key each meter record is stored under
    pub key_prefix: String,
}

impl Default for SettlementSettings {
    fn default() -> Self {
        Self {
            exchange_rate: Decimal::from(DEFAULT_EXCHANGE_RATE),
            candidates: DEFAULT_SETTLEMENT_CANDIDATES
                .iter()
                .map(|c| c.to_string())
                .collect(),
            reject_disabled_writes: true,
            key_prefix: DEFAULT_KEY_PREFIX.to_string(),
        }
    }
}

/// Ledger backend selection
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum StoreBackend {
    /// In-process map, discarded on exit
    Memory,
    /// Redis server
    Redis,
}

/// Ledger backend settings
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct StoreSettings {
    /// Which backend to open
    pub backend: StoreBackend,
    /// Redis connection URL
    pub redis_url: String,
    /// Namespace prefix for Redis keys, empty for none
    pub redis_prefix: String,
}

impl Default for StoreSettings {
    fn default() -> Self {
        Self {
            backend: StoreBackend::Redis,
            redis_url: "redis://localhost:6379".to_string(),
            redis_prefix: "meterledger".to_string(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;

    #[test]
    fn test_defaults() {
        let config = AppConfig::default();
        assert_eq!(config.settlement.exchange_rate, dec!(-1));
        assert_eq!(config.settlement.candidates.len(), 9);
        assert_eq!(config.settlement.candidates[0], "1");
        assert!(config.settlement.reject_disabled_writes);
        assert_eq!(config.store.backend, StoreBackend::Redis);
    }

    #[test]
    fn test_partial_toml_keeps_defaults() {
        let config: AppConfig = ::config::Config::builder()
            .add_source(::config::File::from_str(
                r#"
                [settlement]
                exchange_rate = "0.25"
                candidates = ["north", "south"]

                [store]
                backend = "memory"
                "#,
                ::config::FileFormat::Toml,
            ))
            .build()
            .unwrap()
            .try_deserialize()
            .unwrap();

        assert_eq!(config.settlement.exchange_rate, dec!(0.25));
        assert_eq!(config.settlement.candidates, vec!["north", "south"]);
        assert!(config.settlement.reject_disabled_writes);
        assert_eq!(config.settlement.key_prefix, "meter:");
        assert_eq!(config.store.backend, StoreBackend::Memory);
        assert_eq!(config.store.redis_url, "redis://localhost:6379");
    }
}
