//! Configuration settings for NetCopy
//!
//! Defines the CLI arguments and the immutable session configuration
//! derived from them once at startup.

use crate::error::{NetcopyError, Result};
use crate::hash::HashAlgorithm;
use clap::{Parser, ValueEnum};

/// Default copy chunk size (4 MiB)
pub const DEFAULT_BUFFER_SIZE: usize = 4 * 1024 * 1024;

/// Largest accepted copy chunk size (1 GiB)
pub const MAX_BUFFER_SIZE: usize = 1024 * 1024 * 1024;

/// NetCopy - netcat with checksums and traffic statistics
#[derive(Parser, Debug, Clone)]
#[command(name = "netcopy")]
#[command(author = "NetCopy Team")]
#[command(version = env!("CARGO_PKG_VERSION"))]
#[command(about = "Pipe stdin/stdout over TCP with checksums and traffic statistics")]
#[command(long_about = r#"
NetCopy connects to (or listens on) a TCP endpoint and copies bytes between
the connection and stdin/stdout, optionally in both directions at once.

Examples:
  netcopy -l -cs 0.0.0.0:9000 > out.bin      # Receive, print stats and SHA-256
  netcopy -cs server:9000 < in.bin           # Send
  netcopy -b -l :9000                        # Bidirectional pipe
  netcopy -x host:7 <<< "hello"              # Hex dump the traffic
"#)]
pub struct CliArgs {
    /// Peer address (host:port)
    #[arg(value_name = "ADDRESS")]
    pub address: Option<String>,

    /// Compute a checksum on all network I/O
    #[arg(short = 'c', long)]
    pub checksum: bool,

    /// Show traffic statistics
    #[arg(short = 's', long)]
    pub statistics: bool,

    /// Work in listen mode
    #[arg(short = 'l', long)]
    pub listen: bool,

    /// Do I/O in both directions
    #[arg(short = 'b', long)]
    pub bidirectional: bool,

    /// Show verbose progress messages
    #[arg(short = 'v', long)]
    pub verbose: bool,

    /// Show hexdump of traffic
    #[arg(short = 'x', long)]
    pub hexdump: bool,

    /// I/O chunk size (e.g., 4M, 64K)
    #[arg(long, default_value = "4M", value_name = "SIZE")]
    pub buffer_size: String,

    /// Checksum algorithm
    #[arg(long = "hash", value_enum, default_value = "sha256", value_name = "ALGO")]
    pub hash: HashAlgorithm,

    /// Output format for per-direction results
    #[arg(long, value_enum, default_value = "text")]
    pub output_format: OutputFormat,
}

/// Output format for result lines
#[derive(ValueEnum, Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum OutputFormat {
    /// Human-readable text
    #[default]
    Text,
    /// One JSON object per line
    Json,
}

/// Immutable session configuration, resolved once before any copy starts
#[derive(Debug, Clone)]
pub struct SessionConfig {
    /// Peer address (host:port)
    pub address: String,
    /// Compute a digest of each direction's stream
    pub compute_checksum: bool,
    /// Report byte counts and throughput
    pub show_statistics: bool,
    /// Accept one peer instead of connecting out
    pub listen_mode: bool,
    /// Copy in both directions at once
    pub bidirectional: bool,
    /// Verbose progress messages
    pub verbose: bool,
    /// Hex dump every byte to stderr
    pub hexdump: bool,
    /// Copy chunk size in bytes
    pub buffer_size: usize,
    /// Digest algorithm
    pub hash: HashAlgorithm,
    /// Result line format
    pub output_format: OutputFormat,
}

impl Default for SessionConfig {
    fn default() -> Self {
        Self {
            address: String::new(),
            compute_checksum: false,
            show_statistics: false,
            listen_mode: false,
            bidirectional: false,
            verbose: false,
            hexdump: false,
            buffer_size: DEFAULT_BUFFER_SIZE,
            hash: HashAlgorithm::Sha256,
            output_format: OutputFormat::Text,
        }
    }
}

/// Per-transfer subset of the session configuration
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TransferOptions {
    /// Append the stream digest to the success message
    pub compute_checksum: bool,
    /// Prefix the success message with size and throughput
    pub show_statistics: bool,
    /// Hex dump transferred bytes to stderr
    pub hexdump: bool,
    /// Digest algorithm
    pub hash: HashAlgorithm,
    /// Copy chunk size in bytes
    pub buffer_size: usize,
}

impl Default for TransferOptions {
    fn default() -> Self {
        SessionConfig::default().transfer_options()
    }
}

impl SessionConfig {
    /// Create config from CLI arguments
    pub fn from_cli(args: &CliArgs) -> Result<Self> {
        let address = args
            .address
            .clone()
            .ok_or_else(|| NetcopyError::config("Peer address required"))?;

        let buffer_size = parse_size(&args.buffer_size)
            .map_err(|e| NetcopyError::config(format!("Invalid buffer size: {}", e)))?;
        let buffer_size = check_buffer_size(buffer_size).map_err(NetcopyError::config)?;

        Ok(Self {
            address,
            compute_checksum: args.checksum,
            show_statistics: args.statistics,
            listen_mode: args.listen,
            bidirectional: args.bidirectional,
            verbose: args.verbose,
            hexdump: args.hexdump,
            buffer_size,
            hash: args.hash,
            output_format: args.output_format,
        })
    }

    /// Number of transfers this session runs
    pub fn task_count(&self) -> usize {
        if self.bidirectional {
            2
        } else {
            1
        }
    }

    /// Options handed to every transfer
    pub fn transfer_options(&self) -> TransferOptions {
        TransferOptions {
            compute_checksum: self.compute_checksum,
            show_statistics: self.show_statistics,
            hexdump: self.hexdump,
            hash: self.hash,
            buffer_size: self.buffer_size,
        }
    }
}

/// Check that a copy chunk size is usable
pub fn check_buffer_size(size: u64) -> std::result::Result<usize, String> {
    if size == 0 {
        return Err("Buffer size must be greater than zero".to_string());
    }
    if size > MAX_BUFFER_SIZE as u64 {
        return Err(format!(
            "Buffer size {} exceeds the maximum of {}",
            size, MAX_BUFFER_SIZE
        ));
    }
    Ok(size as usize)
}

/// Parse human-readable size string to bytes
pub fn parse_size(size: &str) -> std::result::Result<u64, String> {
    let size = size.trim().to_uppercase();

    if size.is_empty() {
        return Err("Empty size string".to_string());
    }

    let (num_str, multiplier) = if size.ends_with("GB") || size.ends_with('G') {
        (size.trim_end_matches(|c| c == 'G' || c == 'B'), 1024u64 * 1024 * 1024)
    } else if size.ends_with("MB") || size.ends_with('M') {
        (size.trim_end_matches(|c| c == 'M' || c == 'B'), 1024u64 * 1024)
    } else if size.ends_with("KB") || size.ends_with('K') {
        (size.trim_end_matches(|c| c == 'K' || c == 'B'), 1024u64)
    } else if size.ends_with('B') {
        (size.trim_end_matches('B'), 1u64)
    } else {
        (size.as_str(), 1u64)
    };

    let num: f64 = num_str
        .trim()
        .parse()
        .map_err(|_| format!("Invalid number: {}", num_str))?;

    if !num.is_finite() {
        return Err(format!("Not a finite size: {}", num_str));
    }
    if num < 0.0 {
        return Err(format!("Negative size: {}", num_str));
    }

    let bytes = num * multiplier as f64;
    if bytes >= u64::MAX as f64 {
        return Err(format!("Size too large: {}", num_str));
    }

    Ok(bytes as u64)
}
