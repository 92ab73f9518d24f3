//! Per-run state of one request/reply exchange.
//!
//! A [`Session`] tracks both halves of the exchange with a handful of flags
//! rather than a named state per role. The two roles share the flags but
//! move through them under different rules:
//!
//! ```text
//! Requester: accumulate stdin ─EOF─▶ send ─▶ receive ─▶ done
//! Replier:   receive ─┐
//!                     ├─▶ send (once both) ─▶ done
//!  accumulate stdin ─EOF
//! ```
//!
//! The session never performs I/O itself. The bridge loop asks it what is
//! permitted ([`Session::interest`]), performs the operation, and reports
//! the outcome back.
//!
//! Rust guideline compliant 2025-01

use crate::config::{PollTimeout, Role};
use crate::endpoint::Interest;

/// Buffers and completion flags for one exchange.
#[derive(Debug)]
pub struct Session {
    role: Role,
    /// Outbound payload under construction. Taken exactly once, on send.
    tx_buffer: Vec<u8>,
    /// The single message received from the peer.
    rx_buffer: Vec<u8>,
    local_eof: bool,
    local_done: bool,
    remote_done: bool,
    /// Replier only: the request has arrived. Distinct from `remote_done`,
    /// which for a replier means the reply has gone out.
    request_received: bool,
    poll_timeout: PollTimeout,
}

impl Session {
    /// Session whose payload is accumulated from local input until EOF.
    pub fn streaming(role: Role, poll_timeout: PollTimeout) -> Self {
        Self {
            role,
            tx_buffer: Vec::new(),
            rx_buffer: Vec::new(),
            local_eof: false,
            local_done: false,
            remote_done: false,
            request_received: false,
            poll_timeout,
        }
    }

    /// Session with local input suppressed: the payload is already complete
    /// (empty, or the captured output of a command) and no local read will
    /// ever be attempted.
    pub fn with_payload(role: Role, payload: Vec<u8>, poll_timeout: PollTimeout) -> Self {
        let mut session = Self::streaming(role, poll_timeout);
        session.tx_buffer = payload;
        session.local_eof = true;
        session
    }

    /// Role of this side of the exchange.
    pub fn role(&self) -> Role {
        self.role
    }

    /// Timeout for each readiness wait.
    pub fn poll_timeout(&self) -> PollTimeout {
        self.poll_timeout
    }

    /// Local input has signalled end of data (or was suppressed).
    pub fn local_eof(&self) -> bool {
        self.local_eof
    }

    /// Local half complete: the outbound payload has been sent.
    pub fn local_done(&self) -> bool {
        self.local_done
    }

    /// Remote half complete. For a requester the reply has arrived; for a
    /// replier the reply has been sent.
    pub fn remote_done(&self) -> bool {
        self.remote_done
    }

    /// Both halves finished. The bridge loop stops exactly when this holds.
    pub fn is_complete(&self) -> bool {
        self.local_done && self.remote_done
    }

    /// Bytes accumulated for the outbound message so far.
    pub fn pending_payload(&self) -> &[u8] {
        &self.tx_buffer
    }

    /// Bytes received from the peer, empty until the message arrives.
    pub fn received(&self) -> &[u8] {
        &self.rx_buffer
    }

    /// Whether a local read should be attempted.
    pub fn wants_local_input(&self) -> bool {
        !self.local_eof
    }

    /// Whether the protocol currently permits a receive.
    ///
    /// A requester may only receive after its request has gone out; a
    /// replier receives first and only once.
    pub fn may_receive(&self) -> bool {
        match self.role {
            Role::Requester => self.local_done && !self.remote_done,
            Role::Replier => !self.request_received,
        }
    }

    /// Whether the outbound payload is complete and the protocol permits
    /// sending it now.
    pub fn may_send(&self) -> bool {
        if !self.local_eof || self.local_done {
            return false;
        }
        match self.role {
            Role::Requester => true,
            Role::Replier => self.request_received,
        }
    }

    /// What the next readiness wait should watch for.
    pub fn interest(&self) -> Interest {
        Interest {
            local: self.wants_local_input(),
            receive: self.may_receive(),
            send: self.may_send(),
        }
    }

    /// Appends a chunk of local input to the outbound payload.
    pub fn append_local(&mut self, chunk: &[u8]) {
        debug_assert!(!self.local_eof, "local input after EOF");
        self.tx_buffer.extend_from_slice(chunk);
    }

    /// Records end of local data. The payload is frozen from here on.
    pub fn mark_local_eof(&mut self) {
        self.local_eof = true;
    }

    /// Records that the payload was transmitted and hands it back, leaving
    /// the session's buffer empty so it cannot be sent twice.
    pub fn mark_sent(&mut self) -> Vec<u8> {
        debug_assert!(self.may_send(), "send not permitted in this state");
        self.local_done = true;
        if self.role == Role::Replier {
            // The reply is the final action of a replier.
            self.remote_done = true;
        }
        std::mem::take(&mut self.tx_buffer)
    }

    /// Stores the single message received from the peer.
    pub fn record_received(&mut self, message: Vec<u8>) {
        debug_assert!(self.may_receive(), "receive not permitted in this state");
        self.rx_buffer = message;
        match self.role {
            Role::Requester => self.remote_done = true,
            Role::Replier => self.request_received = true,
        }
    }
}
