//! # Meterledger Settlement
//!
//! Usage reporting, settlement, and balance accounting for energy meters
//! recorded in a shared key-value ledger.
//!
//! ## Settlement Formula
//!
//! ```text
//! balance' = balance + reported_usage × exchange_rate
//! reported_usage' = 0
//! ```
//!
//! ## Components
//!
//! - **Registry**: key derivation and typed record access over a [`LedgerStore`]
//! - **Engine**: the meter state machine (initialize, report, settle, change, status)
//! - **Command**: the closed set of invocable functions and their arguments
//! - **Dispatcher**: function-name entry point with metrics and logging
//!
//! ## Architecture
//!
//! ```text
//! ┌────────────┐   ┌─────────┐   ┌──────────────────┐   ┌───────────────┐   ┌─────────────┐
//! │ Dispatcher │──▶│ Command │──▶│ SettlementEngine │──▶│ MeterRegistry │──▶│ LedgerStore │
//! └────────────┘   └─────────┘   └──────────────────┘   └───────────────┘   └─────────────┘
//! ```

pub mod command;
pub mod config;
pub mod dispatch;
pub mod engine;
pub mod metrics;
pub mod registry;

pub use command::Command;
pub use config::{AppConfig, SettlementSettings, StoreBackend, StoreSettings};
pub use dispatch::Dispatcher;
pub use engine::{SettledMeter, SettlementEngine, SettlementReport};
pub use metrics::SettlementMetrics;
pub use registry::MeterRegistry;

pub use meterledger_store::LedgerStore;
