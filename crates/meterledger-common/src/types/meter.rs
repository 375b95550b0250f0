//! Meter record - usage, balance and status of one meter
//!
//! A meter is persisted as a single record so its three attributes are
//! always written together:
//! - `reported_usage`: kWh accrued since the last settlement
//! - `balance`: settled monetary balance, only ever adjusted
//! - `enabled`: whether the meter currently participates
//! - Version field bumped on every mutation

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize, Serializer};

use crate::types::amount::{format_amount, normalize_amount};
use crate::{MeterLedgerError, Result};

/// Persisted state of a single meter
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MeterRecord {
    /// Meter name, unique across the ledger
    pub name: String,

    /// Usage accrued since the last settlement (kWh)
    pub reported_usage: Decimal,

    /// Settled monetary balance
    pub balance: Decimal,

    /// Whether the meter participates in reporting and settlement
    pub enabled: bool,

    /// Incremented on every persisted mutation
    pub version: u64,

    /// Timestamp of last modification (Unix milliseconds)
    pub updated_at: i64,
}

impl MeterRecord {
    /// Create a freshly initialized meter: zero usage, zero balance, enabled
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            reported_usage: normalize_amount(Decimal::ZERO),
            balance: normalize_amount(Decimal::ZERO),
            enabled: true,
            version: 0,
            updated_at: chrono::Utc::now().timestamp_millis(),
        }
    }

    /// Assemble a record from individually stored attributes
    pub fn from_parts(
        name: impl Into<String>,
        reported_usage: Decimal,
        balance: Decimal,
        enabled: bool,
    ) -> Self {
        let mut record = Self::new(name);
        record.reported_usage = normalize_amount(reported_usage);
        record.balance = normalize_amount(balance);
        record.enabled = enabled;
        record
    }

    /// Overwrite the reported usage (reports replace, they do not accumulate)
    pub fn record_usage(&mut self, usage: Decimal) {
        self.reported_usage = normalize_amount(usage);
        self.touch();
    }

    /// Add `amount` to the balance, returning the new balance
    ///
    /// Fails with `Overflow` and leaves the record untouched if the sum is
    /// out of range.
    pub fn adjust_balance(&mut self, amount: Decimal) -> Result<Decimal> {
        self.balance = normalize_amount(self.checked_balance(amount)?);
        self.touch();
        Ok(self.balance)
    }

    /// Convert pending usage into a balance adjustment at `exchange_rate`
    ///
    /// Returns the settled amount. Reported usage is reset to zero. On
    /// `Overflow` the record is left untouched.
    pub fn settle(&mut self, exchange_rate: Decimal) -> Result<Decimal> {
        let amount = self.reported_usage.checked_mul(exchange_rate).ok_or_else(|| {
            MeterLedgerError::Overflow(format!(
                "{}: usage {} at rate {}",
                self.name, self.reported_usage, exchange_rate
            ))
        })?;
        let amount = normalize_amount(amount);
        let balance = self.checked_balance(amount)?;

        self.balance = normalize_amount(balance);
        self.reported_usage = normalize_amount(Decimal::ZERO);
        self.touch();
        Ok(amount)
    }

    /// Set the enabled flag
    pub fn set_enabled(&mut self, enabled: bool) {
        self.enabled = enabled;
        self.touch();
    }

    /// Aggregated read-side view of this record
    pub fn state(&self) -> MeterState {
        MeterState {
            name: self.name.clone(),
            balance: self.balance,
            status: self.enabled,
            reported_kwh: self.reported_usage,
        }
    }

    /// Encode for storage
    pub fn to_bytes(&self) -> Result<Vec<u8>> {
        Ok(serde_json::to_vec(self)?)
    }

    /// Decode from storage
    pub fn from_bytes(bytes: &[u8]) -> Result<Self> {
        Ok(serde_json::from_slice(bytes)?)
    }

    fn checked_balance(&self, amount: Decimal) -> Result<Decimal> {
        self.balance.checked_add(amount).ok_or_else(|| {
            MeterLedgerError::Overflow(format!(
                "{}: balance {} adjusted by {}",
                self.name, self.balance, amount
            ))
        })
    }

    fn touch(&mut self) {
        self.version += 1;
        self.updated_at = chrono::Utc::now().timestamp_millis();
    }
}

/// Complete state of a meter as returned by `complete_meter_state`
///
/// Serializes every field as a string:
/// `{"name":"M1","balance":"5.000000","status":"false","reported_kwh":"120.500000"}`
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct MeterState {
    pub name: String,
    #[serde(serialize_with = "amount_as_str")]
    pub balance: Decimal,
    #[serde(serialize_with = "flag_as_str")]
    pub status: bool,
    #[serde(serialize_with = "amount_as_str")]
    pub reported_kwh: Decimal,
}

fn amount_as_str<S: Serializer>(value: &Decimal, serializer: S) -> std::result::Result<S::Ok, S::Error> {
    serializer.serialize_str(&format_amount(*value))
}

fn flag_as_str<S: Serializer>(value: &bool, serializer: S) -> std::result::Result<S::Ok, S::Error> {
    serializer.serialize_str(if *value { "true" } else { "false" })
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;

    #[test]
    fn test_new_record() {
        let record = MeterRecord::new("M1");
        assert_eq!(record.reported_usage, Decimal::ZERO);
        assert_eq!(record.balance, Decimal::ZERO);
        assert!(record.enabled);
        assert_eq!(record.version, 0);
    }

    #[test]
    fn test_usage_overwrites() {
        let mut record = MeterRecord::new("M1");
        record.record_usage(dec!(10));
        record.record_usage(dec!(4.5));
        assert_eq!(record.reported_usage, dec!(4.5));
        assert_eq!(record.version, 2);
    }

    #[test]
    fn test_settle_converts_and_resets() {
        let mut record = MeterRecord::from_parts("3", dec!(50), dec!(10), true);

        let amount = record.settle(dec!(-1)).unwrap();
        assert_eq!(amount, dec!(-50));
        assert_eq!(record.balance, dec!(-40));
        assert_eq!(record.reported_usage, Decimal::ZERO);
    }

    #[test]
    fn test_adjust_balance_is_additive() {
        let mut record = MeterRecord::new("M1");
        record.adjust_balance(dec!(5)).unwrap();
        let balance = record.adjust_balance(dec!(-1.25)).unwrap();
        assert_eq!(balance, dec!(3.75));
    }

    #[test]
    fn test_adjust_balance_overflow_leaves_record() {
        let mut record = MeterRecord::from_parts("M1", Decimal::ZERO, Decimal::MAX, true);
        let before = record.clone();

        let result = record.adjust_balance(Decimal::ONE);
        assert!(matches!(result, Err(MeterLedgerError::Overflow(_))));
        assert_eq!(record, before);
    }

    #[test]
    fn test_settle_overflow_leaves_record() {
        let mut record = MeterRecord::from_parts("3", Decimal::MAX, Decimal::ZERO, true);
        let before = record.clone();

        assert!(matches!(record.settle(dec!(2)), Err(MeterLedgerError::Overflow(_))));
        assert_eq!(record, before);

        let mut record = MeterRecord::from_parts("3", Decimal::ONE, Decimal::MIN, true);
        assert!(matches!(record.settle(dec!(-1)), Err(MeterLedgerError::Overflow(_))));
        assert_eq!(record.reported_usage, Decimal::ONE);
    }

    #[test]
    fn test_bytes_roundtrip_keeps_scale() {
        let mut record = MeterRecord::new("M1");
        record.record_usage(dec!(120.5));

        let bytes = record.to_bytes().unwrap();
        let json = String::from_utf8(bytes.clone()).unwrap();
        assert!(json.contains("\"reported_usage\":\"120.500000\""));

        let decoded = MeterRecord::from_bytes(&bytes).unwrap();
        assert_eq!(decoded, record);
    }

    #[test]
    fn test_state_serializes_as_strings() {
        let mut record = MeterRecord::from_parts("M1", dec!(120.5), dec!(5), true);
        record.set_enabled(false);

        let json = serde_json::to_value(record.state()).unwrap();
        assert_eq!(
            json,
            serde_json::json!({
                "name": "M1",
                "balance": "5.000000",
                "status": "false",
                "reported_kwh": "120.500000",
            })
        );
    }
}
