//! Core data types for Meterledger

pub mod amount;
pub mod meter;
