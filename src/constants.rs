//! Application-wide constants for zmqcat.
//!
//! Exit codes, buffer sizes, and socket defaults live here so the rest of
//! the crate never carries magic numbers.
//!
//! # Categories
//!
//! - **Exit codes**: sysexits(3) values reported by the binary
//! - **I/O**: local read sizing
//! - **Socket**: linger and environment overrides

use std::time::Duration;

// ============================================================================
// Exit codes (sysexits.h)
// ============================================================================

/// Command line usage error: bad flag, unknown role, malformed transport.
pub const EX_USAGE: u8 = 64;

/// Internal software error not covered by any other code.
pub const EX_SOFTWARE: u8 = 70;

/// A required service is unavailable: socket creation, bind, connect, or a
/// failed send/receive on the endpoint.
pub const EX_UNAVAILABLE: u8 = 69;

/// Input/output error on the local stream or the output sink.
pub const EX_IOERR: u8 = 74;

// ============================================================================
// Local I/O
// ============================================================================

/// Size of a single local read.
///
/// One readiness event yields at most this many bytes; larger inputs are
/// accumulated across iterations of the bridge loop.
pub const READ_CHUNK_SIZE: usize = 4096;

// ============================================================================
// Socket
// ============================================================================

/// Default linger applied to the socket before it is closed.
///
/// A replier exits right after sending, so context termination has to wait
/// long enough for the reply to leave the process.
pub const DEFAULT_LINGER: Duration = Duration::from_millis(1000);

/// Environment override for the readiness wait timeout, in milliseconds.
pub const ENV_POLL_TIMEOUT_MS: &str = "ZMQCAT_POLL_TIMEOUT_MS";

/// Environment override for the socket linger, in milliseconds.
pub const ENV_LINGER_MS: &str = "ZMQCAT_LINGER_MS";
