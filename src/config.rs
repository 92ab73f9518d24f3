//! Resolved configuration for one bridge run.
//!
//! The binary parses flags with clap and hands the result to
//! [`BridgeConfig`]; environment overrides are layered on top for values
//! the command line left unset.

use std::ffi::OsString;
use std::fmt;
use std::str::FromStr;
use std::time::Duration;

use crate::constants::{DEFAULT_LINGER, ENV_LINGER_MS, ENV_POLL_TIMEOUT_MS};
use crate::error::{BridgeError, Result};

/// Side of the request/reply exchange this process plays.
#[derive(Debug, Clone, Copy, PartialEq, Eq, clap::ValueEnum)]
pub enum Role {
    /// Sends first, then receives. Connects to the transport.
    #[value(name = "REQ")]
    Requester,
    /// Receives first, then sends. Binds the transport.
    #[value(name = "REP")]
    Replier,
}

impl fmt::Display for Role {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Requester => write!(f, "REQ"),
            Self::Replier => write!(f, "REP"),
        }
    }
}

/// A transport endpoint with a validated `ipc://` or `tcp://` scheme.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Transport(String);

impl Transport {
    /// Schemes accepted by the bridge.
    pub const SCHEMES: [&'static str; 2] = ["ipc://", "tcp://"];

    /// The endpoint string as handed to the socket.
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl FromStr for Transport {
    type Err = BridgeError;

    fn from_str(s: &str) -> Result<Self> {
        let rest = Self::SCHEMES
            .iter()
            .find_map(|scheme| s.strip_prefix(scheme))
            .ok_or_else(|| {
                BridgeError::Usage(format!(
                    "invalid transport '{}' - must start with ipc:// or tcp://",
                    s
                ))
            })?;
        if rest.is_empty() {
            return Err(BridgeError::Usage(format!(
                "invalid transport '{}' - missing address",
                s
            )));
        }
        Ok(Self(s.to_string()))
    }
}

impl fmt::Display for Transport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// How long a single readiness wait may block.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum PollTimeout {
    /// Block until something becomes ready.
    #[default]
    Infinite,
    /// Give up the wait after this long and loop again.
    After(Duration),
}

impl PollTimeout {
    /// Builds a timeout from a millisecond count.
    pub fn from_millis(ms: u64) -> Self {
        Self::After(Duration::from_millis(ms))
    }

    /// Timeout in the form `zmq_poll` expects: `-1` blocks indefinitely.
    pub fn as_poll_millis(self) -> i64 {
        match self {
            Self::Infinite => -1,
            Self::After(d) => i64::try_from(d.as_millis()).unwrap_or(i64::MAX),
        }
    }
}

/// Where the outbound payload comes from.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum InputMode {
    /// Accumulate standard input until EOF.
    Stdin,
    /// No local input; the payload is empty.
    Suppressed,
    /// Run a shell command and use its full standard output.
    Command(String),
}

impl InputMode {
    /// Resolves `-e` / `-n`. A command always wins and implies suppression.
    pub fn resolve(exec: Option<String>, no_input: bool) -> Self {
        match exec {
            Some(cmd) => Self::Command(cmd),
            None if no_input => Self::Suppressed,
            None => Self::Stdin,
        }
    }

    /// Whether standard input is read at all.
    pub fn reads_stdin(&self) -> bool {
        matches!(self, Self::Stdin)
    }
}

/// Everything a bridge run needs, after flags and environment are merged.
#[derive(Debug, Clone)]
pub struct BridgeConfig {
    /// Role in the exchange.
    pub role: Role,
    /// Endpoint to connect (requester) or bind (replier).
    pub transport: Transport,
    /// Source of the outbound payload.
    pub input: InputMode,
    /// Readiness wait timeout.
    pub poll_timeout: PollTimeout,
    /// Linger applied to the socket before close.
    pub linger: Duration,
}

impl BridgeConfig {
    /// Creates a config with default timeout and linger.
    pub fn new(role: Role, transport: Transport, input: InputMode) -> Self {
        Self {
            role,
            transport,
            input,
            poll_timeout: PollTimeout::Infinite,
            linger: DEFAULT_LINGER,
        }
    }

    /// Applies flag values, falling back to environment overrides for
    /// anything the command line did not set.
    pub fn with_overrides(mut self, timeout_ms: Option<u64>, linger_ms: Option<u64>) -> Result<Self> {
        let timeout_ms = match timeout_ms {
            Some(ms) => Some(ms),
            None => env_millis(ENV_POLL_TIMEOUT_MS)?,
        };
        if let Some(ms) = timeout_ms {
            self.poll_timeout = PollTimeout::from_millis(ms);
        }

        let linger_ms = match linger_ms {
            Some(ms) => Some(ms),
            None => env_millis(ENV_LINGER_MS)?,
        };
        if let Some(ms) = linger_ms {
            self.linger = Duration::from_millis(ms);
        }
        Ok(self)
    }
}

/// Reads a millisecond value from the environment. Unset is `None`;
/// present but unparseable (including non-UTF-8) is a usage error.
fn env_millis(var: &str) -> Result<Option<u64>> {
    parse_millis(var, std::env::var_os(var))
}

fn parse_millis(var: &str, value: Option<OsString>) -> Result<Option<u64>> {
    let Some(value) = value else {
        return Ok(None);
    };
    let raw = value.into_string().map_err(|raw| {
        BridgeError::Usage(format!("{}={:?}: not valid UTF-8", var, raw))
    })?;
    raw.trim()
        .parse()
        .map(Some)
        .map_err(|e| BridgeError::Usage(format!("{}={:?}: {}", var, raw, e)))
}
