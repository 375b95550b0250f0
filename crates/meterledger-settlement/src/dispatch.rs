//! Function-name dispatch
//!
//! Entry point for callers that invoke the ledger by function name and
//! positional string arguments. Returns the raw response payload:
//! - writes: empty
//! - `balance`, `reported_kwh`: the amount, e.g. `5.000000`
//! - `status`: `true` / `false`
//! - `complete_meter_state`: JSON object with string values
//! - `settle`: JSON settlement report
//! - `migrate`: JSON array of migrated names

use std::sync::Arc;

use meterledger_common::{format_amount, Result};
use meterledger_store::LedgerStore;
use rust_decimal::prelude::ToPrimitive;
use tracing::{debug, warn};

use crate::command::{Command, FUNCTIONS};
use crate::engine::SettlementEngine;
use crate::metrics::SettlementMetrics;

/// Routes invocations to the settlement engine
pub struct Dispatcher<S> {
    engine: SettlementEngine<S>,
    default_candidates: Vec<String>,
    metrics: Arc<SettlementMetrics>,
}

impl<S: LedgerStore> Dispatcher<S> {
    /// Create a dispatcher; `default_candidates` are settled when a settle
    /// call names none
    pub fn new(
        engine: SettlementEngine<S>,
        default_candidates: Vec<String>,
        metrics: Arc<SettlementMetrics>,
    ) -> Self {
        Self {
            engine,
            default_candidates,
            metrics,
        }
    }

    /// The engine behind this dispatcher
    pub fn engine(&self) -> &SettlementEngine<S> {
        &self.engine
    }

    /// Invoke `function` with positional `args`
    pub fn invoke(&self, function: &str, args: &[String]) -> Result<Vec<u8>> {
        // unknown names share one label
        let label = FUNCTIONS
            .iter()
            .copied()
            .find(|f| *f == function)
            .unwrap_or("unknown");
        self.metrics.commands_total.with_label_values(&[label]).inc();

        let result = Command::parse(function, args).and_then(|command| self.execute(command));

        if let Err(e) = &result {
            self.metrics
                .command_failures_total
                .with_label_values(&[label, e.kind()])
                .inc();
            warn!(function = %function, error = %e, "Command failed");
        }
        result
    }

    /// Execute an already parsed command
    pub fn execute(&self, command: Command) -> Result<Vec<u8>> {
        debug!(function = command.function(), query = command.is_query(), "Executing command");

        match command {
            Command::Initialize { names } => {
                self.engine.initialize(&names)?;
                Ok(Vec::new())
            }
            Command::Report { name, usage } => {
                self.engine.report(&name, usage)?;
                Ok(Vec::new())
            }
            Command::Settle { candidates } => {
                let candidates = if candidates.is_empty() {
                    &self.default_candidates
                } else {
                    &candidates
                };
                let report = self.engine.settle(candidates)?;

                self.metrics.settlement_runs_total.inc();
                self.metrics
                    .meters_settled_total
                    .inc_by(report.settled.len() as u64);
                // counters only move forward
                if let Some(kwh) = report
                    .total_usage()
                    .and_then(|total| total.to_f64())
                    .filter(|kwh| *kwh > 0.0)
                {
                    self.metrics.usage_settled_kwh_total.inc_by(kwh);
                }

                Ok(serde_json::to_vec(&report)?)
            }
            Command::Change { name, amount } => {
                self.engine.change(&name, amount)?;
                Ok(Vec::new())
            }
            Command::SetMeterStatus { name, enabled } => {
                self.engine.set_status(&name, enabled)?;
                Ok(Vec::new())
            }
            Command::Migrate { names } => {
                let migrated = self.engine.migrate(&names)?;
                Ok(serde_json::to_vec(&migrated)?)
            }
            Command::Balance { name } => Ok(format_amount(self.engine.balance(&name)?).into_bytes()),
            Command::Status { name } => Ok(self.engine.status(&name)?.to_string().into_bytes()),
            Command::ReportedKwh { name } => {
                Ok(format_amount(self.engine.reported_usage(&name)?).into_bytes())
            }
            Command::CompleteMeterState { name } => {
                Ok(serde_json::to_vec(&self.engine.aggregate_state(&name)?)?)
            }
        }
    }
}
