//! Invocable functions
//!
//! The closed set of functions callers may invoke, with their arguments
//! already validated and typed. A function name plus positional string
//! arguments is turned into a [`Command`] by [`Command::parse`]; everything
//! after that is an exhaustive `match`.

use meterledger_common::{parse_amount, parse_flag, MeterLedgerError, Result};
use rust_decimal::Decimal;

/// Every function name [`Command::parse`] accepts
pub const FUNCTIONS: [&str; 10] = [
    "initialize",
    "report",
    "settle",
    "change",
    "setmeterstatus",
    "migrate",
    "balance",
    "status",
    "reported_kwh",
    "complete_meter_state",
];

/// A validated invocation
#[derive(Debug, Clone, PartialEq)]
pub enum Command {
    /// Create meters, one per non-empty name
    Initialize { names: Vec<String> },
    /// Overwrite reported usage
    Report { name: String, usage: Decimal },
    /// Settle the named candidates, or the configured defaults when empty
    Settle { candidates: Vec<String> },
    /// Adjust a balance
    Change { name: String, amount: Decimal },
    /// Set the enabled flag
    SetMeterStatus { name: String, enabled: bool },
    /// Rewrite legacy three-key meters as records
    Migrate { names: Vec<String> },
    /// Query the balance
    Balance { name: String },
    /// Query the enabled flag
    Status { name: String },
    /// Query the reported usage
    ReportedKwh { name: String },
    /// Query balance, status and reported usage together
    CompleteMeterState { name: String },
}

impl Command {
    /// Parse a function name and its positional arguments
    pub fn parse(function: &str, args: &[String]) -> Result<Self> {
        match function {
            "initialize" => {
                require_some(function, args)?;
                Ok(Command::Initialize {
                    names: args.to_vec(),
                })
            }
            "report" => {
                let [name, usage] = exactly::<2>(function, args)?;
                Ok(Command::Report {
                    name: name.clone(),
                    usage: parse_amount(usage)?,
                })
            }
            "settle" => Ok(Command::Settle {
                candidates: args.to_vec(),
            }),
            "change" => {
                let [name, amount] = exactly::<2>(function, args)?;
                Ok(Command::Change {
                    name: name.clone(),
                    amount: parse_amount(amount)?,
                })
            }
            "setmeterstatus" => {
                let [name, enabled] = exactly::<2>(function, args)?;
                Ok(Command::SetMeterStatus {
                    name: name.clone(),
                    enabled: parse_flag(enabled)?,
                })
            }
            "migrate" => {
                require_some(function, args)?;
                Ok(Command::Migrate {
                    names: args.to_vec(),
                })
            }
            "balance" => {
                let [name] = exactly::<1>(function, args)?;
                Ok(Command::Balance { name: name.clone() })
            }
            "status" => {
                let [name] = exactly::<1>(function, args)?;
                Ok(Command::Status { name: name.clone() })
            }
            "reported_kwh" => {
                let [name] = exactly::<1>(function, args)?;
                Ok(Command::ReportedKwh { name: name.clone() })
            }
            "complete_meter_state" => {
                let [name] = exactly::<1>(function, args)?;
                Ok(Command::CompleteMeterState { name: name.clone() })
            }
            other => Err(MeterLedgerError::InvalidArgument(format!(
                "unimplemented function '{}'",
                other
            ))),
        }
    }

    /// Function name this command was invoked as
    pub fn function(&self) -> &'static str {
        match self {
            Command::Initialize { .. } => "initialize",
            Command::Report { .. } => "report",
            Command::Settle { .. } => "settle",
            Command::Change { .. } => "change",
            Command::SetMeterStatus { .. } => "setmeterstatus",
            Command::Migrate { .. } => "migrate",
            Command::Balance { .. } => "balance",
            Command::Status { .. } => "status",
            Command::ReportedKwh { .. } => "reported_kwh",
            Command::CompleteMeterState { .. } => "complete_meter_state",
        }
    }

    /// Check if this command only reads the ledger
    pub fn is_query(&self) -> bool {
        matches!(
            self,
            Command::Balance { .. }
                | Command::Status { .. }
                | Command::ReportedKwh { .. }
                | Command::CompleteMeterState { .. }
        )
    }
}

fn exactly<'a, const N: usize>(function: &str, args: &'a [String]) -> Result<&'a [String; N]> {
    args.try_into().map_err(|_| {
        MeterLedgerError::InvalidArgument(format!(
            "incorrect number of arguments for {}: expecting {}, got {}",
            function,
            N,
            args.len()
        ))
    })
}

fn require_some(function: &str, args: &[String]) -> Result<()> {
    if args.is_empty() {
        return Err(MeterLedgerError::InvalidArgument(format!(
            "incorrect number of arguments for {}: at least one meter name is required",
            function
        )));
    }
    Ok(())
}
