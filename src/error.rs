//! Error types for NetCopy
//!
//! Setup errors (listen, accept, connect) end the process before any
//! transfer starts. Transfer errors stay inside the direction that hit them
//! and travel to the coordinator through the result channel.

use crate::core::Direction;
use thiserror::Error;

/// Main error type for NetCopy operations
#[derive(Error, Debug)]
pub enum NetcopyError {
    /// Could not bind a listening socket
    #[error("Can't listen on {addr}: {source}")]
    Listen {
        /// Address we tried to bind
        addr: String,
        /// Underlying socket error
        #[source]
        source: std::io::Error,
    },

    /// Listening socket failed to accept a peer
    #[error("Can't accept on {addr}: {source}")]
    Accept {
        /// Address we were listening on
        addr: String,
        /// Underlying socket error
        #[source]
        source: std::io::Error,
    },

    /// Could not connect to the peer
    #[error("Can't connect to {addr}: {source}")]
    Connect {
        /// Address we tried to reach
        addr: String,
        /// Underlying socket error
        #[source]
        source: std::io::Error,
    },

    /// Read or write failed in the middle of a transfer
    #[error("{direction} {peer}: {source}")]
    Transfer {
        /// Direction of the failing transfer
        direction: Direction,
        /// Peer address
        peer: String,
        /// Underlying I/O error
        #[source]
        source: std::io::Error,
    },

    /// Sink accepted fewer bytes than it was handed
    #[error("partial write {direction} {peer}: exp {expected}, saw {actual}")]
    PartialWrite {
        /// Direction of the failing transfer
        direction: Direction,
        /// Peer address
        peer: String,
        /// Bytes handed to the sink
        expected: usize,
        /// Bytes the sink reported as written
        actual: usize,
    },

    /// Could not start the thread for a transfer
    #[error("Can't start {direction} transfer: {source}")]
    Spawn {
        /// Direction that never started
        direction: Direction,
        /// Underlying OS error
        #[source]
        source: std::io::Error,
    },

    /// Configuration error
    #[error("Configuration error: {0}")]
    ConfigError(String),

    /// Local standard stream could not be opened
    #[error("Can't open {stream}: {source}")]
    Stdio {
        /// `stdin` or `stdout`
        stream: &'static str,
        /// Underlying OS error
        #[source]
        source: std::io::Error,
    },
}

impl NetcopyError {
    /// Create a mid-transfer I/O error tagged with its direction and peer
    pub fn transfer(direction: Direction, peer: impl Into<String>, source: std::io::Error) -> Self {
        Self::Transfer {
            direction,
            peer: peer.into(),
            source,
        }
    }

    /// Create a partial write error
    pub fn partial_write(
        direction: Direction,
        peer: impl Into<String>,
        expected: usize,
        actual: usize,
    ) -> Self {
        Self::PartialWrite {
            direction,
            peer: peer.into(),
            expected,
            actual,
        }
    }

    /// Create a configuration error
    pub fn config(message: impl Into<String>) -> Self {
        Self::ConfigError(message.into())
    }

    /// Check if this error ends the process before any transfer runs
    pub fn is_fatal(&self) -> bool {
        matches!(
            self,
            Self::Listen { .. }
                | Self::Accept { .. }
                | Self::Connect { .. }
                | Self::ConfigError(_)
                | Self::Stdio { .. }
        )
    }

    /// Direction this error belongs to, if it came from a transfer
    pub fn direction(&self) -> Option<Direction> {
        match self {
            Self::Transfer { direction, .. }
            | Self::PartialWrite { direction, .. }
            | Self::Spawn { direction, .. } => Some(*direction),
            _ => None,
        }
    }
}

/// Result type alias for NetCopy operations
pub type Result<T> = std::result::Result<T, NetcopyError>;
