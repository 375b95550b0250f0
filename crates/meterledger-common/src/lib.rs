//! # Meterledger Common
//!
//! Shared types and errors for metered-energy settlement.
//!
//! ## Core Types
//!
//! - [`MeterRecord`]: persisted state of a single meter (usage, balance, status)
//! - [`MeterState`]: aggregated read-side view returned by `complete_meter_state`
//! - [`MeterLedgerError`]: unified error taxonomy for every operation
//!
//! ## Amounts
//!
//! - [`types::amount`]: strict decimal/flag parsing and scale-6 formatting

pub mod error;
pub mod types;

// Re-export commonly used types at crate root
pub use error::{MeterLedgerError, Result};
pub use types::{
    amount::{format_amount, normalize_amount, parse_amount, parse_flag},
    meter::{MeterRecord, MeterState},
};

/// Meterledger version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

/// Fractional digits every persisted or rendered amount carries
pub const AMOUNT_SCALE: u32 = 6;

/// Exchange rate applied at settlement when none is configured
pub const DEFAULT_EXCHANGE_RATE: i64 = -1;

/// Candidate identifiers probed by settlement when none are configured
pub const DEFAULT_SETTLEMENT_CANDIDATES: [&str; 9] = ["1", "2", "3", "4", "5", "6", "7", "8", "9"];

/// Key prefix for meter records
pub const DEFAULT_KEY_PREFIX: &str = "meter:";
