//! Meterledger CLI
//!
//! ```text
//! meterledger <function> [args...]
//! ```
//!
//! Invokes one ledger function and writes its payload to stdout. Logs go to
//! stderr.

use std::io::Write;
use std::sync::Arc;

use anyhow::{bail, Context, Result};
use prometheus::{Encoder, Registry, TextEncoder};
use tracing::{debug, info, warn};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use meterledger_common::VERSION;
use meterledger_settlement::{
    AppConfig, Dispatcher, LedgerStore, SettlementEngine, SettlementMetrics, StoreBackend,
};
use meterledger_store::{MemoryLedger, RedisLedger};

fn main() -> Result<()> {
    // Initialize tracing
    tracing_subscriber::registry()
        .with(tracing_subscriber::EnvFilter::new(
            std::env::var("RUST_LOG").unwrap_or_else(|_| "info".into()),
        ))
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();

    let mut args = std::env::args().skip(1);
    let Some(function) = args.next() else {
        bail!("usage: meterledger <function> [args...]");
    };
    let args: Vec<String> = args.collect();

    info!("Starting Meterledger v{}", VERSION);

    // Load configuration
    let config = AppConfig::load()?;
    info!(
        "Settlement config: exchange_rate={}, candidates={}, reject_disabled_writes={}",
        config.settlement.exchange_rate,
        config.settlement.candidates.len(),
        config.settlement.reject_disabled_writes
    );

    let store: Box<dyn LedgerStore> = match config.store.backend {
        StoreBackend::Memory => {
            warn!("Using in-memory ledger, state is discarded on exit");
            Box::new(MemoryLedger::new())
        }
        StoreBackend::Redis => Box::new(
            RedisLedger::open(&config.store.redis_url)
                .context("Failed to open Redis ledger")?
                .with_prefix(&config.store.redis_prefix),
        ),
    };

    let registry = Registry::new();
    let metrics = Arc::new(SettlementMetrics::new()?);
    metrics.register(&registry)?;

    let engine = SettlementEngine::new(store, &config.settlement);
    let dispatcher = Dispatcher::new(engine, config.settlement.candidates.clone(), metrics);

    let result = dispatcher.invoke(&function, &args);

    let mut buffer = Vec::new();
    TextEncoder::new().encode(&registry.gather(), &mut buffer)?;
    debug!("Metrics:\n{}", String::from_utf8_lossy(&buffer));

    let payload = result.with_context(|| format!("{} failed", function))?;

    let mut stdout = std::io::stdout().lock();
    stdout.write_all(&payload)?;
    if !payload.is_empty() {
        stdout.write_all(b"\n")?;
    }
    Ok(())
}
