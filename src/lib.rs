//! zmqcat - bridge stdin/stdout to one ZeroMQ request/reply exchange.
//!
//! A requester reads its payload from standard input, sends it as a single
//! message, and writes the reply to standard output. A replier does the
//! reverse: it receives one request, writes it out, and answers with its
//! own standard input once that reaches EOF.
//!
//! # Architecture
//!
//! - **Session** - Buffers and completion flags for one exchange
//! - **Bridge** - Event loop; the only component with decision logic
//! - **Endpoint** - ZeroMQ REQ/REP socket plus the multiplexed readiness wait
//! - **Local** - Raw stdin reads kept in step with the readiness wait
//!
//! # Modules
//!
//! - [`bridge`] - The event loop and [`run`]
//! - [`session`] - Exchange state machine
//! - [`endpoint`] - Message endpoint trait and ZeroMQ implementation
//! - [`config`] - Role, transport, and timeout configuration

// Library modules
pub mod bridge;
pub mod command;
pub mod config;
pub mod constants;
pub mod endpoint;
pub mod error;
pub mod local;
pub mod session;

// Re-export commonly used types
pub use bridge::{run, Bridge, ExchangeSummary};
pub use config::{BridgeConfig, InputMode, PollTimeout, Role, Transport};
pub use error::BridgeError;
pub use session::Session;
