//! Stream digests for on-the-wire checksums
//!
//! Every transferred chunk is fed into a [`Hasher`] so the digest covers
//! exactly the bytes the sink accepted.

mod digest;

pub use digest::*;
