//! Traffic display and result reporting
//!
//! Provides:
//! - Hex dump sinks fed with every transferred byte
//! - Human-readable unit scaling for byte counts and throughput
//! - Per-direction result lines in text or JSON

mod dump;
mod report;

pub use dump::*;
pub use report::*;
