//! Message endpoint: whole-message send/receive plus a multiplexed
//! readiness wait.
//!
//! The readiness wait covers both the endpoint and the local input
//! descriptor in one call, so the bridge loop has a single suspension
//! point.
//!
//! # ZeroMQ mapping
//!
//! ```text
//! Role::Requester → REQ socket, connect(transport)
//! Role::Replier   → REP socket, bind(transport)
//! wait()          → zmq_poll([socket: POLLIN|POLLOUT, stdin fd: POLLIN])
//! send()/receive() → DONTWAIT; EAGAIN means "not yet"
//! ```
//!
//! REQ/REP enforce the send/receive alternation themselves; the session's
//! bookkeeping only avoids asking for operations the socket would reject.

use std::os::fd::RawFd;
use std::time::Duration;

use crate::config::{BridgeConfig, PollTimeout, Role, Transport};
use crate::error::{BridgeError, Result};

/// Operations the next readiness wait should watch for.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Interest {
    /// Local input is wanted.
    pub local: bool,
    /// A receive is permitted.
    pub receive: bool,
    /// A send is permitted.
    pub send: bool,
}

/// Operations that would currently proceed without blocking.
///
/// Readiness is a level condition: it may be reported again on the next
/// wait if the work it announced was not fully drained.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Readiness {
    /// Local input is readable (data, EOF, or a pending error).
    pub local: bool,
    /// A message can be received.
    pub receive: bool,
    /// A message can be sent.
    pub send: bool,
}

impl Readiness {
    /// Nothing became ready before the timeout.
    pub fn is_idle(&self) -> bool {
        !(self.local || self.receive || self.send)
    }
}

/// A message-oriented endpoint with atomic whole-message delivery.
pub trait MessageEndpoint {
    /// Blocks until something in `interest` is ready or `timeout` elapses.
    ///
    /// `local_fd` is included in the wait when `interest.local` is set. If
    /// local input is wanted but has no descriptor, it counts as ready and
    /// the wait does not block.
    fn wait(
        &mut self,
        interest: Interest,
        local_fd: Option<RawFd>,
        timeout: PollTimeout,
    ) -> Result<Readiness>;

    /// Sends one whole message. `Ok(false)` means it would block and
    /// nothing was sent.
    fn send(&mut self, payload: &[u8]) -> Result<bool>;

    /// Receives one whole message. `Ok(None)` means none is available yet.
    fn receive(&mut self) -> Result<Option<Vec<u8>>>;
}

impl<E: MessageEndpoint + ?Sized> MessageEndpoint for &mut E {
    fn wait(
        &mut self,
        interest: Interest,
        local_fd: Option<RawFd>,
        timeout: PollTimeout,
    ) -> Result<Readiness> {
        (**self).wait(interest, local_fd, timeout)
    }

    fn send(&mut self, payload: &[u8]) -> Result<bool> {
        (**self).send(payload)
    }

    fn receive(&mut self) -> Result<Option<Vec<u8>>> {
        (**self).receive()
    }
}

/// A ZeroMQ REQ or REP socket together with the context that owns it.
///
/// Field order matters: the socket is closed before the context is
/// terminated when the endpoint is dropped.
pub struct ZmqEndpoint {
    socket: zmq::Socket,
    _context: zmq::Context,
    role: Role,
}

impl std::fmt::Debug for ZmqEndpoint {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ZmqEndpoint")
            .field("role", &self.role)
            .finish_non_exhaustive()
    }
}

impl ZmqEndpoint {
    /// Creates the socket for `config.role` and binds or connects it.
    pub fn open(config: &BridgeConfig) -> Result<Self> {
        Self::open_with(config.role, &config.transport, config.linger)
    }

    /// Creates a socket for `role` on `transport` with the given linger.
    pub fn open_with(role: Role, transport: &Transport, linger: Duration) -> Result<Self> {
        let context = zmq::Context::new();
        let socket_type = match role {
            Role::Requester => zmq::REQ,
            Role::Replier => zmq::REP,
        };
        let socket = context
            .socket(socket_type)
            .map_err(|e| BridgeError::unavailable("zmq_socket", e))?;

        let linger_ms = i32::try_from(linger.as_millis()).unwrap_or(i32::MAX);
        socket
            .set_linger(linger_ms)
            .map_err(|e| BridgeError::unavailable("zmq_setsockopt", e))?;

        match role {
            Role::Requester => socket
                .connect(transport.as_str())
                .map_err(|e| BridgeError::unavailable("zmq_connect", e))?,
            Role::Replier => socket
                .bind(transport.as_str())
                .map_err(|e| BridgeError::unavailable("zmq_bind", e))?,
        }

        log::debug!(
            "[endpoint] {} socket {} {}",
            role,
            if role == Role::Requester { "connected to" } else { "bound to" },
            transport
        );

        Ok(Self {
            socket,
            _context: context,
            role,
        })
    }
}

impl MessageEndpoint for ZmqEndpoint {
    fn wait(
        &mut self,
        interest: Interest,
        local_fd: Option<RawFd>,
        timeout: PollTimeout,
    ) -> Result<Readiness> {
        let mut events = zmq::PollEvents::empty();
        if interest.receive {
            events |= zmq::POLLIN;
        }
        if interest.send {
            events |= zmq::POLLOUT;
        }

        let watched_fd = local_fd.filter(|_| interest.local);
        let local_always_ready = interest.local && watched_fd.is_none();
        let timeout_ms = if local_always_ready {
            0
        } else {
            timeout.as_poll_millis()
        };

        let mut items = vec![self.socket.as_poll_item(events)];
        if let Some(fd) = watched_fd {
            items.push(zmq::PollItem::from_fd(fd, zmq::POLLIN));
        }

        match zmq::poll(&mut items, timeout_ms) {
            Ok(_) => {}
            Err(zmq::Error::EINTR) => {
                return Ok(Readiness {
                    local: local_always_ready,
                    ..Readiness::default()
                });
            }
            Err(e) => return Err(BridgeError::transport("zmq_poll", e)),
        }

        let socket_item = &items[0];
        // POLLHUP/POLLERR on the fd surface as an error event; the read that
        // follows reports EOF or the actual failure.
        let local = local_always_ready
            || items
                .get(1)
                .is_some_and(|item| item.is_readable() || item.is_error());

        Ok(Readiness {
            local,
            receive: interest.receive && socket_item.is_readable(),
            send: interest.send && socket_item.is_writable(),
        })
    }

    fn send(&mut self, payload: &[u8]) -> Result<bool> {
        match self.socket.send(payload, zmq::DONTWAIT) {
            Ok(()) => Ok(true),
            Err(zmq::Error::EAGAIN) => Ok(false),
            Err(e) => Err(BridgeError::transport("zmq_send", e)),
        }
    }

    fn receive(&mut self) -> Result<Option<Vec<u8>>> {
        match self.socket.recv_multipart(zmq::DONTWAIT) {
            Ok(parts) => Ok(Some(parts.concat())),
            Err(zmq::Error::EAGAIN) => Ok(None),
            Err(e) => Err(BridgeError::transport("zmq_recv", e)),
        }
    }
}

impl Drop for ZmqEndpoint {
    fn drop(&mut self) {
        log::debug!("[endpoint] Closing {} socket and terminating context", self.role);
    }
}
