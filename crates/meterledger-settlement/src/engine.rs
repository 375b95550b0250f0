//! Settlement engine
//!
//! The meter state machine:
//!
//! ```text
//! Uninitialized ──initialize──▶ Active(enabled) ◀──set_status──┐
//!                                   │                          │
//!                                   └──────────────────────────┘
//! ```
//!
//! `report`, `settle` and `change` mutate the numeric fields only. With
//! `reject_disabled_writes` on, a disabled meter rejects `report`/`change`
//! and is skipped by `settle` with its pending usage kept.
//!
//! Every operation is a bounded sequence of point reads and writes. Nothing
//! spans multiple meters atomically: a failure part-way through `initialize`
//! or `settle` leaves the meters already handled persisted.

use meterledger_common::{MeterLedgerError, MeterRecord, MeterState, Result};
use meterledger_store::LedgerStore;
use rust_decimal::Decimal;
use serde::Serialize;
use tracing::{debug, info, instrument};
use uuid::Uuid;

use crate::config::SettlementSettings;
use crate::registry::MeterRegistry;

/// One meter converted during a settlement run
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SettledMeter {
    /// Meter name
    pub name: String,
    /// Usage consumed (kWh)
    pub usage: Decimal,
    /// Balance adjustment applied
    pub amount: Decimal,
    /// Balance after settlement
    pub balance: Decimal,
}

/// Outcome of a settlement run
#[derive(Debug, Clone, Serialize)]
pub struct SettlementReport {
    /// Run identifier
    pub run_id: Uuid,
    /// Exchange rate applied
    pub exchange_rate: Decimal,
    /// Meters settled, in candidate order
    pub settled: Vec<SettledMeter>,
    /// Candidates left untouched (absent, or disabled under enforcement)
    pub skipped: Vec<String>,
    /// Run timestamp (Unix millis)
    pub settled_at: i64,
}

impl SettlementReport {
    /// Total usage converted in this run, `None` if the sum is out of range
    pub fn total_usage(&self) -> Option<Decimal> {
        self.settled
            .iter()
            .try_fold(Decimal::ZERO, |total, s| total.checked_add(s.usage))
    }
}

/// Meter accounting over a [`LedgerStore`]
pub struct SettlementEngine<S> {
    registry: MeterRegistry<S>,
    exchange_rate: Decimal,
    reject_disabled_writes: bool,
}

impl<S: LedgerStore> SettlementEngine<S> {
    /// Create an engine over `store` with the given settlement rules
    pub fn new(store: S, settings: &SettlementSettings) -> Self {
        Self {
            registry: MeterRegistry::new(store).with_prefix(&settings.key_prefix),
            exchange_rate: settings.exchange_rate,
            reject_disabled_writes: settings.reject_disabled_writes,
        }
    }

    /// The registry this engine reads and writes through
    pub fn registry(&self) -> &MeterRegistry<S> {
        &self.registry
    }

    /// Exchange rate applied at settlement
    pub fn exchange_rate(&self) -> Decimal {
        self.exchange_rate
    }

    /// Create (or reset) a meter for every non-empty name
    ///
    /// Fails with `InvalidArgument` on an empty list. The first write failure
    /// aborts the call; meters written before it remain.
    #[instrument(skip(self, names), fields(count = names.len()))]
    pub fn initialize(&self, names: &[String]) -> Result<Vec<String>> {
        if names.is_empty() {
            return Err(MeterLedgerError::InvalidArgument(
                "at least one meter name is required".to_string(),
            ));
        }

        let mut created = Vec::with_capacity(names.len());
        for name in names.iter().filter(|n| !n.is_empty()) {
            self.registry.save(&MeterRecord::new(name.as_str()))?;
            created.push(name.clone());
        }

        info!(created = created.len(), "Initialized meters");
        Ok(created)
    }

    /// Overwrite the reported usage of meter `name`
    #[instrument(skip(self))]
    pub fn report(&self, name: &str, usage: Decimal) -> Result<()> {
        let mut record = self.registry.require(name)?;
        self.ensure_writable(&record)?;

        record.record_usage(usage);
        self.registry.save(&record)?;

        debug!(usage = %record.reported_usage, "Recorded usage");
        Ok(())
    }

    /// Convert pending usage of each candidate into a balance adjustment
    ///
    /// Absent candidates are skipped. Each settled meter is written with one
    /// put; a write failure or an `Overflow` aborts the run, leaving the
    /// failing meter unchanged and earlier ones settled.
    #[instrument(skip(self, candidates), fields(candidates = candidates.len()))]
    pub fn settle(&self, candidates: &[String]) -> Result<SettlementReport> {
        if candidates.is_empty() {
            return Err(MeterLedgerError::InvalidArgument(
                "no settlement candidates given".to_string(),
            ));
        }

        let run_id = Uuid::now_v7();
        let mut settled = Vec::new();
        let mut skipped = Vec::new();

        for name in candidates {
            let Some(mut record) = self.registry.load(name)? else {
                debug!(meter = %name, "No meter for candidate, skipping");
                skipped.push(name.clone());
                continue;
            };

            if self.reject_disabled_writes && !record.enabled {
                debug!(meter = %name, "Meter disabled, keeping pending usage");
                skipped.push(name.clone());
                continue;
            }

            let usage = record.reported_usage;
            let amount = record.settle(self.exchange_rate)?;
            self.registry.save(&record)?;

            settled.push(SettledMeter {
                name: name.clone(),
                usage,
                amount,
                balance: record.balance,
            });
        }

        info!(
            run_id = %run_id,
            settled = settled.len(),
            skipped = skipped.len(),
            exchange_rate = %self.exchange_rate,
            "Settlement run complete"
        );

        Ok(SettlementReport {
            run_id,
            exchange_rate: self.exchange_rate,
            settled,
            skipped,
            settled_at: chrono::Utc::now().timestamp_millis(),
        })
    }

    /// Add `amount` to the balance of meter `name`, returning the new balance
    ///
    /// An out-of-range result fails with `Overflow` and nothing is written.
    #[instrument(skip(self))]
    pub fn change(&self, name: &str, amount: Decimal) -> Result<Decimal> {
        let mut record = self.registry.require(name)?;
        self.ensure_writable(&record)?;

        let balance = record.adjust_balance(amount)?;
        self.registry.save(&record)?;

        debug!(balance = %balance, "Adjusted balance");
        Ok(balance)
    }

    /// Enable or disable meter `name`
    #[instrument(skip(self))]
    pub fn set_status(&self, name: &str, enabled: bool) -> Result<()> {
        let mut record = self.registry.require(name)?;

        record.set_enabled(enabled);
        self.registry.save(&record)?;

        info!(meter = %name, enabled, "Meter status changed");
        Ok(())
    }

    /// Settled balance of meter `name`
    pub fn balance(&self, name: &str) -> Result<Decimal> {
        let record = self.registry.require(name)?;
        debug!(meter = %name, balance = %record.balance, "Query response");
        Ok(record.balance)
    }

    /// Enabled flag of meter `name`
    pub fn status(&self, name: &str) -> Result<bool> {
        let record = self.registry.require(name)?;
        debug!(meter = %name, status = record.enabled, "Query response");
        Ok(record.enabled)
    }

    /// Usage reported since the last settlement of meter `name`
    pub fn reported_usage(&self, name: &str) -> Result<Decimal> {
        let record = self.registry.require(name)?;
        debug!(meter = %name, reported_kwh = %record.reported_usage, "Query response");
        Ok(record.reported_usage)
    }

    /// Balance, status and reported usage of meter `name` in one view
    ///
    /// Any failure is reported as `AggregateUnavailable` carrying the cause.
    pub fn aggregate_state(&self, name: &str) -> Result<MeterState> {
        self.registry
            .require(name)
            .map(|record| record.state())
            .map_err(|source| MeterLedgerError::AggregateUnavailable {
                name: name.to_string(),
                source: Box::new(source),
            })
    }

    /// Rewrite legacy three-key meters as records
    ///
    /// Names without a complete legacy entry are skipped. Returns the names
    /// migrated.
    #[instrument(skip(self, names), fields(count = names.len()))]
    pub fn migrate(&self, names: &[String]) -> Result<Vec<String>> {
        if names.is_empty() {
            return Err(MeterLedgerError::InvalidArgument(
                "at least one meter name is required".to_string(),
            ));
        }

        let mut migrated = Vec::new();
        for name in names.iter().filter(|n| !n.is_empty()) {
            match self.registry.load_legacy(name)? {
                Some(record) => {
                    self.registry.save(&record)?;
                    migrated.push(name.clone());
                }
                None => debug!(meter = %name, "No complete legacy entry, skipping"),
            }
        }

        info!(migrated = migrated.len(), "Migrated legacy meters");
        Ok(migrated)
    }

    fn ensure_writable(&self, record: &MeterRecord) -> Result<()> {
        if self.reject_disabled_writes && !record.enabled {
            return Err(MeterLedgerError::MeterDisabled(record.name.clone()));
        }
        Ok(())
    }
}
