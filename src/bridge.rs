//! The bridge loop: drives one [`Session`] to completion.
//!
//! # Architecture
//!
//! ```text
//! loop until session.is_complete():
//!     interest = session.interest()
//!     ready    = endpoint.wait(interest, local fd, timeout)   ← only suspension point
//!     ├→ local ready    → one read_chunk → append / mark EOF
//!     ├→ receive ready  → one receive    → write to sink → record
//!     └→ send ready     → one send       → mark sent
//! ```
//!
//! Each iteration attempts at most one of each operation, and only those
//! the session permitted before the wait. Readiness is level-triggered, so
//! anything left over is picked up by the next wait rather than drained in
//! a loop here.
//!
//! Any error is fatal: the loop returns immediately. The endpoint is
//! released by its own `Drop` when the bridge is consumed; the scope guard
//! in [`Bridge::run`] only traces the loop exit.

use std::io::{ErrorKind, Write};

use crate::command;
use crate::config::{BridgeConfig, InputMode};
use crate::constants::READ_CHUNK_SIZE;
use crate::endpoint::{MessageEndpoint, ZmqEndpoint};
use crate::error::{BridgeError, Result};
use crate::local::{LocalSource, StdinSource};
use crate::session::Session;

/// Runs one exchange against stdin/stdout as described by `config`.
///
/// The payload command (if any) runs before the socket is created, so a
/// failing command never touches the transport. The endpoint is dropped,
/// closing the socket and terminating its context, on every return path.
pub fn run(config: &BridgeConfig) -> Result<ExchangeSummary> {
    let session = match &config.input {
        InputMode::Stdin => Session::streaming(config.role, config.poll_timeout),
        InputMode::Suppressed => {
            Session::with_payload(config.role, Vec::new(), config.poll_timeout)
        }
        InputMode::Command(cmd) => {
            let payload = command::capture_output(cmd)?;
            Session::with_payload(config.role, payload, config.poll_timeout)
        }
    };

    let endpoint = ZmqEndpoint::open(config)?;
    let stdout = std::io::stdout();
    Bridge::new(session, StdinSource::new(), endpoint, stdout.lock()).run()
}

/// Byte counts for a completed exchange.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ExchangeSummary {
    /// Size of the message this side sent.
    pub bytes_sent: usize,
    /// Size of the message this side received.
    pub bytes_received: usize,
    /// Readiness waits performed.
    pub iterations: usize,
}

/// Couples a session with its local input, endpoint, and output sink.
#[derive(Debug)]
pub struct Bridge<L, E, W> {
    session: Session,
    local: L,
    endpoint: E,
    sink: W,
}

impl<L, E, W> Bridge<L, E, W>
where
    L: LocalSource,
    E: MessageEndpoint,
    W: Write,
{
    /// Creates a bridge. Nothing happens until [`Bridge::run`].
    pub fn new(session: Session, local: L, endpoint: E, sink: W) -> Self {
        Self {
            session,
            local,
            endpoint,
            sink,
        }
    }

    /// Runs the exchange to completion or to the first error.
    pub fn run(mut self) -> Result<ExchangeSummary> {
        let role = self.session.role();
        let _guard = scopeguard::guard((), |()| {
            log::debug!("[bridge] {} loop exited", role);
        });

        log::debug!(
            "[bridge] Starting {} exchange (local input {})",
            role,
            if self.session.local_eof() { "suppressed" } else { "open" }
        );

        let mut summary = ExchangeSummary::default();
        let mut chunk = vec![0u8; READ_CHUNK_SIZE];

        while !self.session.is_complete() {
            let interest = self.session.interest();
            let ready = self.endpoint.wait(
                interest,
                self.local.poll_fd(),
                self.session.poll_timeout(),
            )?;
            summary.iterations += 1;

            if ready.is_idle() {
                log::trace!("[bridge] Wait timed out with nothing ready");
                continue;
            }

            if interest.local && ready.local {
                self.read_local(&mut chunk)?;
            }

            if interest.receive && ready.receive {
                if let Some(message) = self.endpoint.receive()? {
                    summary.bytes_received = message.len();
                    self.deliver(message)?;
                }
            }

            if interest.send && ready.send && self.session.may_send() {
                if self.endpoint.send(self.session.pending_payload())? {
                    let sent = self.session.mark_sent();
                    summary.bytes_sent = sent.len();
                    log::debug!("[bridge] Sent {} bytes", sent.len());
                } else {
                    log::trace!("[bridge] Send would block, waiting again");
                }
            }
        }

        log::info!(
            "[bridge] Exchange complete: sent {} bytes, received {} bytes",
            summary.bytes_sent,
            summary.bytes_received
        );
        Ok(summary)
    }

    /// One read attempt from local input.
    fn read_local(&mut self, chunk: &mut [u8]) -> Result<()> {
        match self.local.read_chunk(chunk) {
            Ok(0) => {
                self.session.mark_local_eof();
                log::debug!(
                    "[bridge] Local EOF, payload complete at {} bytes",
                    self.session.pending_payload().len()
                );
            }
            Ok(n) => {
                self.session.append_local(&chunk[..n]);
                log::trace!("[bridge] Read {} bytes from local input", n);
            }
            Err(e) if matches!(e.kind(), ErrorKind::Interrupted | ErrorKind::WouldBlock) => {
                log::trace!("[bridge] Local read made no progress: {}", e);
            }
            Err(e) => return Err(BridgeError::io("read local input", e)),
        }
        Ok(())
    }

    /// Writes the received message to the sink, once and in full, then
    /// records it in the session.
    fn deliver(&mut self, message: Vec<u8>) -> Result<()> {
        log::debug!("[bridge] Received {} bytes", message.len());
        self.sink
            .write_all(&message)
            .and_then(|()| self.sink.flush())
            .map_err(|e| BridgeError::io("write output", e))?;
        self.session.record_received(message);
        Ok(())
    }
}
