//! Counting copy for one direction of a session
//!
//! Copies a byte stream from a source to a sink chunk by chunk, hashing and
//! hex dumping every chunk the sink accepted and accumulating the time spent
//! in read+write cycles. The transfer ends in exactly one
//! [`TransferOutcome`].

use crate::config::{check_buffer_size, TransferOptions};
use crate::error::{NetcopyError, Result};
use crate::hash::Hasher;
use crate::progress::{DumpSink, HexDumper, NullDump, TransferSummary};
use crossbeam::channel::Sender;
use serde::Serialize;
use std::io::{self, ErrorKind, Read, Write};
use std::time::{Duration, Instant};

/// Which way bytes flow relative to the peer
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Direction {
    /// Local input to the peer
    To,
    /// Peer to local output
    From,
}

impl Direction {
    /// Label used in messages
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::To => "to",
            Self::From => "from",
        }
    }
}

impl std::fmt::Display for Direction {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Result of one transfer: a summary or the error that stopped it
pub type TransferOutcome = Result<TransferSummary>;

/// Counters owned by a single transfer
struct TransferCounters {
    bytes: u64,
    hasher: Hasher,
    elapsed: Duration,
}

impl TransferCounters {
    fn new(options: &TransferOptions) -> Self {
        Self {
            bytes: 0,
            hasher: Hasher::new(options.hash),
            elapsed: Duration::ZERO,
        }
    }

    fn record(&mut self, chunk: &[u8], cycle: Duration) {
        self.bytes += chunk.len() as u64;
        self.hasher.update(chunk);
        self.elapsed += cycle;
    }
}

/// One-direction copier with statistics
#[derive(Debug, Clone)]
pub struct CountingCopier {
    direction: Direction,
    peer: String,
    options: TransferOptions,
}

impl CountingCopier {
    /// Create a copier for `direction` against `peer`
    pub fn new(direction: Direction, peer: impl Into<String>, options: TransferOptions) -> Self {
        Self {
            direction,
            peer: peer.into(),
            options,
        }
    }

    /// Copy until end of stream, dumping to stderr when hex dumps are enabled
    pub fn run<R, W>(&self, src: &mut R, dst: &mut W) -> TransferOutcome
    where
        R: Read + ?Sized,
        W: Write + ?Sized,
    {
        let mut dump = dump_sink(self.options.hexdump, io::stderr());
        self.run_with_dump(src, dst, dump.as_mut())
    }

    /// Copy until end of stream, feeding every accepted chunk to `dump`
    pub fn run_with_dump<R, W>(
        &self,
        src: &mut R,
        dst: &mut W,
        dump: &mut dyn DumpSink,
    ) -> TransferOutcome
    where
        R: Read + ?Sized,
        W: Write + ?Sized,
    {
        let buffer_size = check_buffer_size(self.options.buffer_size as u64).map_err(|e| {
            NetcopyError::transfer(
                self.direction,
                &self.peer,
                io::Error::new(ErrorKind::InvalidInput, e),
            )
        })?;

        let mut buffer = vec![0u8; buffer_size];
        let mut counters = TransferCounters::new(&self.options);
        let mut cycle_start = Instant::now();

        loop {
            let bytes_read = match src.read(&mut buffer) {
                Ok(0) => break,
                Ok(n) => n,
                Err(ref e) if e.kind() == ErrorKind::Interrupted => continue,
                Err(e) => {
                    tracing::info!("{} {}: ERROR {}", self.direction, self.peer, e);
                    return Err(NetcopyError::transfer(self.direction, &self.peer, e));
                }
            };

            let chunk = &buffer[..bytes_read];
            let written = self.write_chunk(dst, chunk)?;
            if written != bytes_read {
                tracing::info!(
                    "{} {}: ERROR partial write, exp {}, saw {}",
                    self.direction,
                    self.peer,
                    bytes_read,
                    written
                );
                return Err(NetcopyError::partial_write(
                    self.direction,
                    &self.peer,
                    bytes_read,
                    written,
                ));
            }

            let now = Instant::now();
            counters.record(chunk, now - cycle_start);
            cycle_start = now;

            if let Err(e) = dump.write(chunk) {
                tracing::debug!("hexdump write failed: {}", e);
            }
        }

        if let Err(e) = dump.finish() {
            tracing::debug!("hexdump flush failed: {}", e);
        }

        dst.flush()
            .map_err(|e| NetcopyError::transfer(self.direction, &self.peer, e))?;

        let TransferCounters {
            bytes,
            hasher,
            elapsed,
        } = counters;

        if self.options.show_statistics {
            tracing::info!(
                "{} bytes {} {} in {:.2} s",
                bytes,
                self.direction,
                self.peer,
                elapsed.as_secs_f64()
            );
        }

        let digest = self.options.compute_checksum.then(|| hasher.finalize());

        Ok(TransferSummary::new(
            self.direction,
            self.peer.clone(),
            bytes,
            elapsed,
            digest,
            self.options.show_statistics,
        ))
    }

    /// Run to completion and hand the outcome to `results`
    pub fn run_and_send<R, W>(&self, src: &mut R, dst: &mut W, results: &Sender<TransferOutcome>)
    where
        R: Read + ?Sized,
        W: Write + ?Sized,
    {
        let outcome = self.run(src, dst);
        if results.send(outcome).is_err() {
            tracing::debug!("No receiver for the {} transfer result", self.direction);
        }
    }

    /// One write call; a short count is left for the caller to judge
    fn write_chunk<W: Write + ?Sized>(&self, dst: &mut W, chunk: &[u8]) -> Result<usize> {
        loop {
            match dst.write(chunk) {
                Ok(n) => return Ok(n),
                Err(ref e) if e.kind() == ErrorKind::Interrupted => continue,
                Err(e) => {
                    tracing::info!("{} {}: ERROR {}", self.direction, self.peer, e);
                    return Err(NetcopyError::transfer(self.direction, &self.peer, e));
                }
            }
        }
    }
}

/// Hex dumper writing to `out` when enabled, otherwise a sink that drops everything
pub fn dump_sink<'a, W: Write + 'a>(hexdump: bool, out: W) -> Box<dyn DumpSink + 'a> {
    if hexdump {
        Box::new(HexDumper::new(out))
    } else {
        Box::new(NullDump)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::hash::{hash_bytes, HashAlgorithm};
    use std::io::Cursor;

    fn options() -> TransferOptions {
        TransferOptions {
            compute_checksum: true,
            show_statistics: true,
            hexdump: false,
            hash: HashAlgorithm::Sha256,
            buffer_size: 64,
        }
    }

    /// Sink that fails once it has accepted `limit` bytes
    struct FailingSink {
        accepted: Vec<u8>,
        limit: usize,
    }

    impl Write for FailingSink {
        fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
            if self.accepted.len() >= self.limit {
                return Err(io::Error::new(ErrorKind::BrokenPipe, "sink closed"));
            }
            self.accepted.extend_from_slice(buf);
            Ok(buf.len())
        }

        fn flush(&mut self) -> io::Result<()> {
            Ok(())
        }
    }

    /// Sink that accepts at most `max` bytes per call without erroring
    struct ShortSink {
        max: usize,
    }

    impl Write for ShortSink {
        fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
            Ok(buf.len().min(self.max))
        }

        fn flush(&mut self) -> io::Result<()> {
            Ok(())
        }
    }

    /// Source that returns some data, then an error
    struct BrokenSource {
        sent: bool,
    }

    impl Read for BrokenSource {
        fn read(&mut self, buf: &mut [u8]) -> io::Result<usize> {
            if self.sent {
                return Err(io::Error::new(ErrorKind::ConnectionReset, "reset"));
            }
            self.sent = true;
            buf[..4].copy_from_slice(b"data");
            Ok(4)
        }
    }

    /// Source that is interrupted before every chunk
    struct InterruptedSource {
        inner: Cursor<Vec<u8>>,
        interrupt: bool,
    }

    impl Read for InterruptedSource {
        fn read(&mut self, buf: &mut [u8]) -> io::Result<usize> {
            self.interrupt = !self.interrupt;
            if self.interrupt {
                return Err(io::Error::from(ErrorKind::Interrupted));
            }
            self.inner.read(buf)
        }
    }

    /// Records what it is fed and whether it was finished
    #[derive(Default)]
    struct RecordingDump {
        seen: Vec<u8>,
        finished: usize,
    }

    impl DumpSink for RecordingDump {
        fn write(&mut self, data: &[u8]) -> io::Result<()> {
            self.seen.extend_from_slice(data);
            Ok(())
        }

        fn finish(&mut self) -> io::Result<()> {
            self.finished += 1;
            Ok(())
        }
    }

    #[test]
    fn test_copies_and_hashes_everything() {
        let data: Vec<u8> = (0..2048u32).map(|i| (i % 251) as u8).collect();
        let mut src = Cursor::new(data.clone());
        let mut dst: Vec<u8> = Vec::new();

        let copier = CountingCopier::new(Direction::To, "127.0.0.1:9", options());
        let summary = copier.run(&mut src, &mut dst).unwrap();

        assert_eq!(dst, data);
        assert_eq!(summary.bytes, 2048);
        assert_eq!(summary.direction, Direction::To);
        assert_eq!(
            summary.digest.as_deref(),
            Some(hash_bytes(&data, HashAlgorithm::Sha256).as_str())
        );
        assert!(summary.message.starts_with(" 2.0 KB ("));
        assert!(summary.message.contains(") to 127.0.0.1:9 ("));
        assert!(summary.message.ends_with(&format!("({})", hash_bytes(&data, HashAlgorithm::Sha256))));
    }

    #[test]
    fn test_empty_source() {
        let mut src = io::empty();
        let mut dst: Vec<u8> = Vec::new();

        let copier = CountingCopier::new(Direction::From, "peer:1", options());
        let summary = copier.run(&mut src, &mut dst).unwrap();

        assert_eq!(summary.bytes, 0);
        assert_eq!(summary.elapsed, Duration::ZERO);
        assert!(summary.message.starts_with(" 0.0 B ( 0.0 B/s) from peer:1 ("));
        assert_eq!(
            summary.digest.as_deref(),
            Some("e3b0c44298fc1c149afbf4c8996fb92427ae41e4649b934ca495991b7852b855")
        );
    }

    #[test]
    fn test_no_flags_gives_empty_message() {
        let opts = TransferOptions {
            compute_checksum: false,
            show_statistics: false,
            ..options()
        };
        let copier = CountingCopier::new(Direction::To, "p", opts);
        let summary = copier.run(&mut Cursor::new(b"abc".to_vec()), &mut Vec::<u8>::new()).unwrap();

        assert!(summary.message.is_empty());
        assert!(summary.digest.is_none());
        assert_eq!(summary.bytes, 3);
    }

    #[test]
    fn test_write_error_after_data() {
        let data = vec![7u8; 256];
        let mut dst = FailingSink {
            accepted: Vec::new(),
            limit: 64,
        };

        let copier = CountingCopier::new(Direction::From, "peer:2", options());
        let err = copier.run(&mut Cursor::new(data), &mut dst).unwrap_err();

        assert!(matches!(err, NetcopyError::Transfer { direction: Direction::From, .. }));
        assert_eq!(dst.accepted.len(), 64);
        assert!(err.to_string().starts_with("from peer:2: "));
    }

    #[test]
    fn test_partial_write_reported() {
        let copier = CountingCopier::new(Direction::To, "peer:3", options());
        let err = copier
            .run(&mut Cursor::new(vec![1u8; 50]), &mut ShortSink { max: 10 })
            .unwrap_err();

        match err {
            NetcopyError::PartialWrite {
                expected, actual, ..
            } => {
                assert_eq!(expected, 50);
                assert_eq!(actual, 10);
            }
            other => panic!("unexpected error: {}", other),
        }
    }

    #[test]
    fn test_partial_write_compares_to_bytes_read() {
        // A sink taking 10 bytes per call is fine when only 10 bytes are read
        let copier = CountingCopier::new(Direction::To, "peer:3", options());
        let summary = copier
            .run(&mut Cursor::new(vec![1u8; 10]), &mut ShortSink { max: 10 })
            .unwrap();
        assert_eq!(summary.bytes, 10);
    }

    #[test]
    fn test_read_error_stops_transfer() {
        let mut dst: Vec<u8> = Vec::new();
        let mut dump = RecordingDump::default();

        let copier = CountingCopier::new(Direction::From, "peer:4", options());
        let err = copier
            .run_with_dump(&mut BrokenSource { sent: false }, &mut dst, &mut dump)
            .unwrap_err();

        assert!(matches!(err, NetcopyError::Transfer { .. }));
        assert_eq!(dst, b"data");
        assert_eq!(dump.seen, b"data");
        assert_eq!(dump.finished, 0);
    }

    #[test]
    fn test_interrupted_reads_are_retried() {
        let mut src = InterruptedSource {
            inner: Cursor::new(vec![9u8; 200]),
            interrupt: false,
        };
        let mut dst: Vec<u8> = Vec::new();

        let copier = CountingCopier::new(Direction::To, "p", options());
        let summary = copier.run(&mut src, &mut dst).unwrap();

        assert_eq!(summary.bytes, 200);
        assert_eq!(dst.len(), 200);
    }

    #[test]
    fn test_dump_sees_every_byte_and_is_finished() {
        let data: Vec<u8> = (0..=255u8).collect();
        let mut dump = RecordingDump::default();

        let copier = CountingCopier::new(Direction::To, "p", options());
        copier
            .run_with_dump(&mut Cursor::new(data.clone()), &mut Vec::<u8>::new(), &mut dump)
            .unwrap();

        assert_eq!(dump.seen, data);
        assert_eq!(dump.finished, 1);
    }

    #[test]
    fn test_result_sent_exactly_once() {
        let (tx, rx) = crossbeam::channel::bounded(1);
        let copier = CountingCopier::new(Direction::From, "p", options());

        copier.run_and_send(&mut Cursor::new(b"xyz".to_vec()), &mut Vec::<u8>::new(), &tx);
        drop(tx);

        let outcome = rx.recv().unwrap();
        assert_eq!(outcome.unwrap().bytes, 3);
        assert!(rx.recv().is_err());
    }

    #[test]
    fn test_zero_buffer_is_an_error() {
        let opts = TransferOptions {
            buffer_size: 0,
            ..options()
        };
        let copier = CountingCopier::new(Direction::To, "peer:4", opts);
        let mut dst: Vec<u8> = Vec::new();
        let err = copier
            .run(&mut Cursor::new(b"not lost".to_vec()), &mut dst)
            .unwrap_err();

        assert!(matches!(err, NetcopyError::Transfer { direction: Direction::To, .. }));
        assert!(dst.is_empty());
    }

    #[test]
    fn test_oversized_buffer_is_an_error() {
        let opts = TransferOptions {
            buffer_size: usize::MAX,
            ..options()
        };
        let copier = CountingCopier::new(Direction::From, "peer:4", opts);
        let err = copier.run(&mut io::empty(), &mut io::sink()).unwrap_err();

        assert!(err.to_string().starts_with("from peer:4: "));
    }

    #[test]
    fn test_dump_sink_follows_flag() {
        let mut dumped: Vec<u8> = Vec::new();
        {
            let mut dump = dump_sink(true, &mut dumped);
            dump.write(b"hi").unwrap();
            dump.finish().unwrap();
        }
        assert!(dumped.starts_with(b"00000000  68 69 "));
        assert!(dumped.ends_with(b"|hi|\n"));

        let mut silent: Vec<u8> = Vec::new();
        {
            let mut dump = dump_sink(false, &mut silent);
            dump.write(b"hi").unwrap();
            dump.finish().unwrap();
        }
        assert!(silent.is_empty());
    }

    #[test]
    fn test_direction_labels() {
        assert_eq!(Direction::To.to_string(), "to");
        assert_eq!(Direction::From.to_string(), "from");
    }
}
