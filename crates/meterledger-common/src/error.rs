//! Error types for Meterledger
//!
//! Provides a unified error type covering argument validation, missing
//! meters, and failures of the underlying ledger store.

use thiserror::Error;

/// Result type alias using MeterLedgerError
pub type Result<T> = std::result::Result<T, MeterLedgerError>;

/// Unified error type for Meterledger operations
#[derive(Debug, Error)]
pub enum MeterLedgerError {
    // Wrong argument count, unknown function, malformed decimal or flag
    #[error("Invalid argument: {0}")]
    InvalidArgument(String),

    // Required key or record absent
    #[error("Not found: {0}")]
    NotFound(String),

    // Underlying ledger get/put failure
    #[error("Storage error: {0}")]
    Storage(String),

    // Write attempted against a disabled meter
    #[error("Meter is disabled: {0}")]
    MeterDisabled(String),

    // Any failure while composing the complete meter state
    #[error("Failed to get complete state for {name}")]
    AggregateUnavailable {
        name: String,
        #[source]
        source: Box<MeterLedgerError>,
    },

    // Record encode/decode failure
    #[error("Serialization error: {0}")]
    Serialization(String),

    // Configuration errors
    #[error("Configuration error: {0}")]
    Config(String),

    // Amount arithmetic outside the representable decimal range
    #[error("Amount overflow: {0}")]
    Overflow(String),
}

impl MeterLedgerError {
    /// Stable short label, used as a metrics dimension
    pub fn kind(&self) -> &'static str {
        match self {
            MeterLedgerError::InvalidArgument(_) => "invalid_argument",
            MeterLedgerError::NotFound(_) => "not_found",
            MeterLedgerError::Storage(_) => "storage",
            MeterLedgerError::MeterDisabled(_) => "meter_disabled",
            MeterLedgerError::AggregateUnavailable { .. } => "aggregate_unavailable",
            MeterLedgerError::Serialization(_) => "serialization",
            MeterLedgerError::Config(_) => "config",
            MeterLedgerError::Overflow(_) => "overflow",
        }
    }

    /// Check whether this error reports a missing meter or key
    pub fn is_not_found(&self) -> bool {
        matches!(self, MeterLedgerError::NotFound(_))
    }
}

impl From<serde_json::Error> for MeterLedgerError {
    fn from(err: serde_json::Error) -> Self {
        MeterLedgerError::Serialization(err.to_string())
    }
}
