//! Prometheus metrics for the dispatcher

use prometheus::{Counter, IntCounter, IntCounterVec, Opts, Registry};

/// Command and settlement counters
pub struct SettlementMetrics {
    pub commands_total: IntCounterVec,
    pub command_failures_total: IntCounterVec,
    pub settlement_runs_total: IntCounter,
    pub meters_settled_total: IntCounter,
    pub usage_settled_kwh_total: Counter,
}

impl SettlementMetrics {
    pub fn new() -> prometheus::Result<Self> {
        Ok(Self {
            commands_total: IntCounterVec::new(
                Opts::new("meterledger_commands_total", "Total commands invoked"),
                &["function"],
            )?,
            command_failures_total: IntCounterVec::new(
                Opts::new("meterledger_command_failures_total", "Total failed commands"),
                &["function", "kind"],
            )?,
            settlement_runs_total: IntCounter::new(
                "meterledger_settlement_runs_total",
                "Total completed settlement runs",
            )?,
            meters_settled_total: IntCounter::new(
                "meterledger_meters_settled_total",
                "Total meters converted at settlement",
            )?,
            usage_settled_kwh_total: Counter::new(
                "meterledger_usage_settled_kwh_total",
                "Total positive usage converted at settlement (kWh)",
            )?,
        })
    }

    pub fn register(&self, registry: &Registry) -> prometheus::Result<()> {
        registry.register(Box::new(self.commands_total.clone()))?;
        registry.register(Box::new(self.command_failures_total.clone()))?;
        registry.register(Box::new(self.settlement_runs_total.clone()))?;
        registry.register(Box::new(self.meters_settled_total.clone()))?;
        registry.register(Box::new(self.usage_settled_kwh_total.clone()))?;
        Ok(())
    }
}
