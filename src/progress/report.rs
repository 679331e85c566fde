//! Per-direction transfer summaries and result lines
//!
//! Byte counts use a base-1024 cascade (B, KB, MB, GB, TB, PB, EB). The
//! throughput is expressed in the same unit as the byte count.

use crate::config::OutputFormat;
use crate::core::{Direction, TransferOutcome};
use serde::Serialize;
use std::io::{self, Write};
use std::time::Duration;

const KB: u64 = 1024;
const MB: u64 = 1024 * KB;
const GB: u64 = 1024 * MB;
const TB: u64 = 1024 * GB;
const PB: u64 = 1024 * TB;
const EB: u64 = 1024 * PB;

/// Scale a byte count to the largest unit where the value is at least 1
pub fn human_size(n: u64) -> (f64, &'static str) {
    let (divisor, unit) = if n >= EB {
        (EB, "EB")
    } else if n >= PB {
        (PB, "PB")
    } else if n >= TB {
        (TB, "TB")
    } else if n >= GB {
        (GB, "GB")
    } else if n >= MB {
        (MB, "MB")
    } else if n >= KB {
        (KB, "KB")
    } else {
        (1, "B")
    };

    (n as f64 / divisor as f64, unit)
}

/// Successful completion of one direction
#[derive(Debug, Clone)]
pub struct TransferSummary {
    /// Direction of the transfer
    pub direction: Direction,
    /// Peer address
    pub peer: String,
    /// Bytes copied
    pub bytes: u64,
    /// Accumulated time spent in read+write cycles
    pub elapsed: Duration,
    /// Hex digest of the copied bytes, when checksums are enabled
    pub digest: Option<String>,
    /// Human-readable summary line (may be empty)
    pub message: String,
}

impl TransferSummary {
    /// Build a summary and render its message
    pub fn new(
        direction: Direction,
        peer: impl Into<String>,
        bytes: u64,
        elapsed: Duration,
        digest: Option<String>,
        show_statistics: bool,
    ) -> Self {
        let mut summary = Self {
            direction,
            peer: peer.into(),
            bytes,
            elapsed,
            digest,
            message: String::new(),
        };
        summary.message = summary.render(show_statistics);
        summary
    }

    /// Throughput in bytes/second (0 when no time was accumulated)
    pub fn throughput(&self) -> f64 {
        let secs = self.elapsed.as_secs_f64();
        if secs > 0.0 {
            self.bytes as f64 / secs
        } else {
            0.0
        }
    }

    /// Render the summary line from the enabled features
    pub fn render(&self, show_statistics: bool) -> String {
        let mut msg = String::new();

        if show_statistics {
            let (size, unit) = human_size(self.bytes);
            let secs = self.elapsed.as_secs_f64();
            let speed = if secs > 0.0 { size / secs } else { 0.0 };

            msg.push_str(&format!(
                "{:4.1} {} ({:4.1} {}/s) {} {}",
                size, unit, speed, unit, self.direction, self.peer
            ));
        }

        if let Some(digest) = &self.digest {
            if !msg.is_empty() {
                msg.push(' ');
            }
            msg.push_str(&format!("({})", digest));
        }

        msg
    }
}

/// JSON shape of one result line
#[derive(Serialize)]
struct ResultLine<'a> {
    ok: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    direction: Option<Direction>,
    #[serde(skip_serializing_if = "Option::is_none")]
    peer: Option<&'a str>,
    #[serde(skip_serializing_if = "Option::is_none")]
    bytes: Option<u64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    elapsed_secs: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    throughput: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    digest: Option<&'a str>,
    #[serde(skip_serializing_if = "Option::is_none")]
    message: Option<&'a str>,
    #[serde(skip_serializing_if = "Option::is_none")]
    error: Option<String>,
}

/// Prints one line per transfer outcome and counts failures
pub struct Reporter<W: Write> {
    out: W,
    format: OutputFormat,
    failures: usize,
}

impl Reporter<io::Stderr> {
    /// Reporter writing to stderr
    pub fn stderr(format: OutputFormat) -> Self {
        Self::new(io::stderr(), format)
    }
}

impl<W: Write> Reporter<W> {
    /// Create a reporter writing to `out`
    pub fn new(out: W, format: OutputFormat) -> Self {
        Self {
            out,
            format,
            failures: 0,
        }
    }

    /// Print one outcome. Failures are counted even if printing fails.
    pub fn report(&mut self, outcome: &TransferOutcome) -> io::Result<()> {
        if outcome.is_err() {
            self.failures += 1;
        }

        match self.format {
            OutputFormat::Text => match outcome {
                Ok(summary) => writeln!(self.out, "{}", summary.message),
                Err(e) => writeln!(self.out, "{}", e),
            },
            OutputFormat::Json => {
                let line = match outcome {
                    Ok(summary) => ResultLine {
                        ok: true,
                        direction: Some(summary.direction),
                        peer: Some(&summary.peer),
                        bytes: Some(summary.bytes),
                        elapsed_secs: Some(summary.elapsed.as_secs_f64()),
                        throughput: Some(summary.throughput()),
                        digest: summary.digest.as_deref(),
                        message: Some(&summary.message),
                        error: None,
                    },
                    Err(e) => ResultLine {
                        ok: false,
                        direction: e.direction(),
                        peer: None,
                        bytes: None,
                        elapsed_secs: None,
                        throughput: None,
                        digest: None,
                        message: None,
                        error: Some(e.to_string()),
                    },
                };
                serde_json::to_writer(&mut self.out, &line)?;
                writeln!(self.out)
            }
        }
    }

    /// Failed outcomes reported so far
    pub fn failures(&self) -> usize {
        self.failures
    }

    /// Consume the reporter, returning the underlying writer
    pub fn into_inner(self) -> W {
        self.out
    }
}
