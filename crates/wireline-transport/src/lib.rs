//! Blocking duplex byte-stream abstraction.
//!
//! Provides the [`Transport`] trait — blocking `read`/`write`/`close`
//! through `&self` — plus implementations for TCP and Unix domain socket
//! streams and a [`TcpEndpoint`] for wiring real connections.
//!
//! This is the lowest layer of wireline. Everything else builds on top of
//! the [`Transport`] trait defined here.

pub mod error;
pub mod tcp;
pub mod traits;

pub use error::{Result, TransportError};
pub use tcp::TcpEndpoint;
pub use traits::Transport;
