//! Unbuffered handles to the process's standard streams
//!
//! `std::io::Stdout` is line buffered and may accept only a prefix of a
//! chunk, which a counting copy would report as a partial write. The
//! handles here are duplicates of the OS descriptors wrapped in [`File`],
//! so every write is a single OS write.

use crate::error::{NetcopyError, Result};
use std::fs::File;
use std::io;

/// Duplicate standard input as an unbuffered reader
pub fn stdin() -> Result<File> {
    duplicate(&io::stdin()).map_err(|source| NetcopyError::Stdio {
        stream: "stdin",
        source,
    })
}

/// Duplicate standard output as an unbuffered writer
pub fn stdout() -> Result<File> {
    duplicate(&io::stdout()).map_err(|source| NetcopyError::Stdio {
        stream: "stdout",
        source,
    })
}

#[cfg(unix)]
fn duplicate(stream: &impl std::os::fd::AsFd) -> io::Result<File> {
    stream.as_fd().try_clone_to_owned().map(File::from)
}

#[cfg(windows)]
fn duplicate(stream: &impl std::os::windows::io::AsHandle) -> io::Result<File> {
    stream.as_handle().try_clone_to_owned().map(File::from)
}
