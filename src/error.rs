//! Error taxonomy for the bridge.
//!
//! Every variant is terminal for the process: nothing is retried, and the
//! binary maps each kind to a sysexits code via [`BridgeError::exit_code`].

use thiserror::Error;

use crate::constants::{EX_IOERR, EX_UNAVAILABLE, EX_USAGE};

/// Errors raised while configuring or running a bridge session.
#[derive(Error, Debug)]
pub enum BridgeError {
    /// Invalid arguments, unsupported role, or a malformed transport.
    #[error("usage error: {0}")]
    Usage(String),

    /// The endpoint could not be created, bound, or connected.
    #[error("{context}: {source}")]
    ResourceUnavailable {
        /// Operation that failed (`zmq_socket`, `zmq_bind`, ...).
        context: &'static str,
        /// Underlying transport reason.
        #[source]
        source: zmq::Error,
    },

    /// Local stream read, output sink write, or payload command failure.
    #[error("{context}: {source}")]
    Io {
        /// Operation that failed.
        context: &'static str,
        /// Underlying OS error.
        #[source]
        source: std::io::Error,
    },

    /// A send, receive, or readiness wait failed on the endpoint.
    #[error("{context}: {source}")]
    Transport {
        /// Operation that failed.
        context: &'static str,
        /// Underlying transport reason.
        #[source]
        source: zmq::Error,
    },
}

impl BridgeError {
    /// Wraps an I/O error with the operation that produced it.
    pub fn io(context: &'static str, source: std::io::Error) -> Self {
        Self::Io { context, source }
    }

    /// Wraps a transport error raised while setting up the endpoint.
    pub fn unavailable(context: &'static str, source: zmq::Error) -> Self {
        Self::ResourceUnavailable { context, source }
    }

    /// Wraps a transport error raised inside the bridge loop.
    pub fn transport(context: &'static str, source: zmq::Error) -> Self {
        Self::Transport { context, source }
    }

    /// Process exit status for this error.
    pub fn exit_code(&self) -> u8 {
        match self {
            Self::Usage(_) => EX_USAGE,
            Self::ResourceUnavailable { .. } | Self::Transport { .. } => EX_UNAVAILABLE,
            Self::Io { .. } => EX_IOERR,
        }
    }
}

/// Result alias used across the library.
pub type Result<T> = std::result::Result<T, BridgeError>;
