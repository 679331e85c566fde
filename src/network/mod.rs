//! Network and local endpoints
//!
//! - [`PeerConnection`]: the single TCP peer of a session, connected to or
//!   accepted on a listening socket
//! - [`stdio`]: unbuffered standard input/output handles

mod tcp;
pub mod stdio;

pub use tcp::*;
