//! Session coordination
//!
//! Establishes the peer connection, starts one [`CountingCopier`] thread
//! per direction, collects exactly one outcome from each and reports them.
//! The exit code of a session is the number of directions that failed.

use crate::config::SessionConfig;
use crate::core::{CountingCopier, Direction, TransferOutcome};
use crate::error::{NetcopyError, Result};
use crate::network::{stdio, PeerConnection};
use crate::progress::Reporter;
use crossbeam::channel::bounded;
use std::io::{Read, Write};
use std::thread;

/// One direction, ready to run
pub struct TransferTask {
    /// Direction label
    pub direction: Direction,
    /// Where bytes come from
    pub source: Box<dyn Read + Send>,
    /// Where bytes go
    pub sink: Box<dyn Write + Send>,
}

impl TransferTask {
    /// Create a task
    pub fn new(
        direction: Direction,
        source: impl Read + Send + 'static,
        sink: impl Write + Send + 'static,
    ) -> Self {
        Self {
            direction,
            source: Box::new(source),
            sink: Box::new(sink),
        }
    }
}

impl std::fmt::Debug for TransferTask {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("TransferTask")
            .field("direction", &self.direction)
            .finish_non_exhaustive()
    }
}

/// What a finished session amounted to
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SessionReport {
    /// Transfers that were started
    pub launched: usize,
    /// Transfers that ended in an error (or never started)
    pub failures: usize,
}

impl SessionReport {
    /// Process exit status: 0 on full success, else the failure count
    pub fn exit_code(&self) -> i32 {
        self.failures as i32
    }

    /// Check if every direction succeeded
    pub fn is_success(&self) -> bool {
        self.failures == 0
    }
}

/// Coordinator for one run of the tool
pub struct Session {
    config: SessionConfig,
}

impl Session {
    /// Create a session from its immutable configuration
    pub fn new(config: SessionConfig) -> Self {
        Self { config }
    }

    /// Session configuration
    pub fn config(&self) -> &SessionConfig {
        &self.config
    }

    /// Run against stdin/stdout, reporting to stderr
    pub fn run(&self) -> Result<SessionReport> {
        let peer = self.establish()?;
        let local_in = stdio::stdin()?;
        let local_out = stdio::stdout()?;

        let mut reporter = Reporter::stderr(self.config.output_format);
        self.run_with(peer, local_in, local_out, &mut reporter)
    }

    /// Listen and accept one peer, or connect to it
    pub fn establish(&self) -> Result<PeerConnection> {
        let addr = &self.config.address;
        if self.config.listen_mode {
            PeerConnection::listen_and_accept(addr)
        } else {
            PeerConnection::connect(addr)
        }
    }

    /// Run the transfers for an established peer and close it afterwards
    pub fn run_with<W: Write>(
        &self,
        peer: PeerConnection,
        local_in: impl Read + Send + 'static,
        local_out: impl Write + Send + 'static,
        reporter: &mut Reporter<W>,
    ) -> Result<SessionReport> {
        let tasks = self.plan(&peer, local_in, local_out)?;
        let report = self.run_transfers(peer.peer_addr(), tasks, reporter);
        peer.close();
        Ok(report)
    }

    /// Decide which directions run
    ///
    /// One direction: peer to local output when listening, local input to
    /// the peer when connecting. Both directions when bidirectional.
    pub fn plan(
        &self,
        peer: &PeerConnection,
        local_in: impl Read + Send + 'static,
        local_out: impl Write + Send + 'static,
    ) -> Result<Vec<TransferTask>> {
        let tasks = match (self.config.listen_mode, self.config.bidirectional) {
            (true, false) => vec![from_peer(peer, local_out)?],
            (false, false) => vec![to_peer(peer, local_in)?],
            (true, true) => vec![from_peer(peer, local_out)?, to_peer(peer, local_in)?],
            (false, true) => vec![to_peer(peer, local_in)?, from_peer(peer, local_out)?],
        };

        debug_assert_eq!(tasks.len(), self.config.task_count());
        Ok(tasks)
    }

    /// Run every task on its own thread and report each outcome as it arrives
    pub fn run_transfers<W: Write>(
        &self,
        peer: &str,
        tasks: Vec<TransferTask>,
        reporter: &mut Reporter<W>,
    ) -> SessionReport {
        let options = self.config.transfer_options();
        let (sender, receiver) = bounded::<TransferOutcome>(tasks.len().max(1));

        let mut handles = Vec::with_capacity(tasks.len());

        for task in tasks {
            let direction = task.direction;
            let copier = CountingCopier::new(direction, peer, options);
            let sender = sender.clone();

            let spawned = thread::Builder::new()
                .name(format!("netcopy-{}", direction))
                .spawn(move || {
                    let TransferTask {
                        mut source,
                        mut sink,
                        ..
                    } = task;
                    copier.run_and_send(&mut *source, &mut *sink, &sender);
                });

            match spawned {
                Ok(handle) => handles.push(handle),
                Err(source) => {
                    let outcome: TransferOutcome = Err(NetcopyError::Spawn { direction, source });
                    if let Err(e) = reporter.report(&outcome) {
                        tracing::warn!("Failed to print result: {}", e);
                    }
                }
            }
        }
        drop(sender);

        let launched = handles.len();
        tracing::info!("Waiting for {} transfers to end ..", launched);

        let mut received = 0;
        while received < launched {
            match receiver.recv() {
                Ok(outcome) => {
                    received += 1;
                    if let Err(e) = reporter.report(&outcome) {
                        tracing::warn!("Failed to print result: {}", e);
                    }
                }
                Err(_) => break,
            }
        }

        let missing = launched - received;
        if missing > 0 {
            tracing::error!("{} transfers ended without reporting a result", missing);
        }

        for handle in handles {
            if handle.join().is_err() {
                tracing::error!("Transfer thread panicked");
            }
        }

        SessionReport {
            launched,
            failures: reporter.failures() + missing,
        }
    }
}

/// Peer to local output
fn from_peer(
    peer: &PeerConnection,
    local_out: impl Write + Send + 'static,
) -> Result<TransferTask> {
    let reader = peer
        .reader()
        .map_err(|e| NetcopyError::transfer(Direction::From, peer.peer_addr(), e))?;
    Ok(TransferTask::new(Direction::From, reader, local_out))
}

/// Local input to the peer
fn to_peer(peer: &PeerConnection, local_in: impl Read + Send + 'static) -> Result<TransferTask> {
    let writer = peer
        .writer()
        .map_err(|e| NetcopyError::transfer(Direction::To, peer.peer_addr(), e))?;
    Ok(TransferTask::new(Direction::To, local_in, writer))
}
