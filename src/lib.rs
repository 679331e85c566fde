//! # NetCopy - netcat with checksums and traffic statistics
//!
//! NetCopy connects to (or listens on) a TCP endpoint and copies bytes
//! between that connection and the process's standard input/output,
//! optionally in both directions at once. Every direction keeps its own
//! running digest, byte count and transfer time.
//!
//! ## Features
//!
//! - **Checksums**: SHA-256 (default) or BLAKE3 over everything on the wire
//! - **Statistics**: byte counts and throughput per direction
//! - **Bidirectional**: both directions on their own threads
//! - **Hex dumps**: canonical hex+ASCII dump of all traffic to stderr
//!
//! ## Counting copy
//!
//! ```
//! use netcopy::config::TransferOptions;
//! use netcopy::core::{CountingCopier, Direction};
//! use std::io::Cursor;
//!
//! let options = TransferOptions {
//!     compute_checksum: true,
//!     show_statistics: true,
//!     ..Default::default()
//! };
//!
//! let copier = CountingCopier::new(Direction::To, "127.0.0.1:9000", options);
//! let mut sink: Vec<u8> = Vec::new();
//! let summary = copier.run(&mut Cursor::new(b"hello".to_vec()), &mut sink).unwrap();
//!
//! assert_eq!(sink, b"hello");
//! assert_eq!(summary.bytes, 5);
//! println!("{}", summary.message);
//! ```
//!
//! ## Sessions
//!
//! ```no_run
//! use netcopy::config::SessionConfig;
//! use netcopy::core::Session;
//!
//! let config = SessionConfig {
//!     address: "server:9000".to_string(),
//!     compute_checksum: true,
//!     bidirectional: true,
//!     ..Default::default()
//! };
//!
//! let report = Session::new(config).run().unwrap();
//! std::process::exit(report.exit_code());
//! ```

#![warn(missing_docs)]
#![warn(clippy::all)]

pub mod config;
pub mod core;
pub mod error;
pub mod hash;
pub mod network;
pub mod progress;

// Re-export commonly used types
pub use config::{SessionConfig, TransferOptions};
pub use core::{CountingCopier, Direction, Session, SessionReport, TransferOutcome};
pub use error::{NetcopyError, Result};
pub use hash::HashAlgorithm;

/// Library version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

/// Prelude module for convenient imports
pub mod prelude {
    //! Convenient re-exports for common usage
    //!
    //! ```no_run
    //! use netcopy::prelude::*;
    //! ```

    pub use crate::config::{OutputFormat, SessionConfig, TransferOptions};
    pub use crate::core::{CountingCopier, Direction, Session, SessionReport, TransferOutcome};
    pub use crate::error::{NetcopyError, Result};
    pub use crate::hash::{hash_bytes, HashAlgorithm};
    pub use crate::network::PeerConnection;
    pub use crate::progress::{DumpSink, HexDumper, NullDump, Reporter, TransferSummary};
}
