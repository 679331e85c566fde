//! Hex dump sinks
//!
//! A transfer feeds every chunk it moves into a [`DumpSink`] whether or not
//! dumping is enabled, and calls [`DumpSink::finish`] once at the end so a
//! buffered partial line gets written.

use std::io::{self, Write};

/// Bytes shown per dump line
const BYTES_PER_LINE: usize = 16;

/// Consumer of transferred bytes for display
pub trait DumpSink {
    /// Feed transferred bytes
    fn write(&mut self, data: &[u8]) -> io::Result<()>;

    /// Flush any buffered partial line
    fn finish(&mut self) -> io::Result<()>;
}

/// Discards everything
#[derive(Debug, Default, Clone, Copy)]
pub struct NullDump;

impl DumpSink for NullDump {
    fn write(&mut self, _data: &[u8]) -> io::Result<()> {
        Ok(())
    }

    fn finish(&mut self) -> io::Result<()> {
        Ok(())
    }
}

/// Canonical hex+ASCII dump, one line per 16 bytes:
///
/// ```text
/// 00000000  47 6f 20 69 73 20 61 6e  20 6f 70 65 6e 20 73 6f  |Go is an open so|
/// ```
pub struct HexDumper<W: Write> {
    out: W,
    /// Current, not yet complete line
    line: String,
    /// ASCII gutter for the current line
    gutter: [u8; BYTES_PER_LINE],
    /// Bytes in the current line
    used: usize,
    /// Total bytes dumped so far
    offset: u64,
}

impl<W: Write> HexDumper<W> {
    /// Create a dumper writing to `out`
    pub fn new(out: W) -> Self {
        Self {
            out,
            line: String::with_capacity(80),
            gutter: [b'.'; BYTES_PER_LINE],
            used: 0,
            offset: 0,
        }
    }

    /// Total bytes fed so far
    pub fn offset(&self) -> u64 {
        self.offset
    }

    /// Consume the dumper, returning the underlying writer
    pub fn into_inner(self) -> W {
        self.out
    }

    fn push_byte(&mut self, byte: u8, completed: &mut String) {
        use std::fmt::Write as _;

        if self.used == 0 {
            let _ = write!(self.line, "{:08x}  ", self.offset);
        }

        let _ = write!(self.line, "{:02x} ", byte);
        match self.used {
            7 => self.line.push(' '),
            15 => self.line.push_str(" |"),
            _ => {}
        }

        self.gutter[self.used] = printable(byte);
        self.used += 1;
        self.offset += 1;

        if self.used == BYTES_PER_LINE {
            self.close_line(completed);
        }
    }

    fn close_line(&mut self, completed: &mut String) {
        completed.push_str(&self.line);
        completed.extend(self.gutter[..self.used].iter().map(|&b| b as char));
        completed.push_str("|\n");
        self.line.clear();
        self.used = 0;
    }
}

impl<W: Write> DumpSink for HexDumper<W> {
    fn write(&mut self, data: &[u8]) -> io::Result<()> {
        let mut completed = String::new();
        for &byte in data {
            self.push_byte(byte, &mut completed);
        }

        if !completed.is_empty() {
            self.out.write_all(completed.as_bytes())?;
        }
        Ok(())
    }

    fn finish(&mut self) -> io::Result<()> {
        if self.used == 0 {
            return Ok(());
        }

        let filled = self.used;
        for slot in filled..BYTES_PER_LINE {
            match slot {
                7 => self.line.push_str("    "),
                15 => self.line.push_str("    |"),
                _ => self.line.push_str("   "),
            }
        }

        let mut completed = String::new();
        self.close_line(&mut completed);

        self.out.write_all(completed.as_bytes())?;
        self.out.flush()
    }
}

fn printable(byte: u8) -> u8 {
    if (32..=126).contains(&byte) {
        byte
    } else {
        b'.'
    }
}
