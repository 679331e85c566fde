//! Configuration module for NetCopy
//!
//! Provides the CLI arguments and the immutable runtime settings
//! every transfer reads.

mod settings;

pub use settings::*;
