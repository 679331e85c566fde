//! Core transfer module
//!
//! Provides the counting copy that moves one direction of traffic and the
//! session coordinator that runs one or two of them concurrently.

mod copier;
mod session;

pub use copier::*;
pub use session::*;
