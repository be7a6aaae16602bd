//! Per-connection framing session.
//!
//! This is the core of wireline. A [`Session`] owns one transport and
//! turns its unbounded byte stream into discrete, validated messages,
//! routing each to a caller-supplied [`Dispatcher`]. It tolerates partial
//! reads, multiple frames per read, corrupt input, and crashing handlers.
//!
//! One thread per session blocks on transport reads; `send` may be called
//! from any thread. Stopping a session closes the transport, which
//! unblocks the reader, and fires the [`CloseListener`] exactly once.

pub mod debounce;
pub mod dispatch;
pub mod error;
pub mod session;

pub use debounce::{DebounceGuard, DEBOUNCE_WINDOW};
pub use dispatch::{CloseListener, Dispatcher, HandlerError};
pub use error::{Result, SessionError};
pub use session::{Session, SessionConfig, DEFAULT_BUFFER_SIZE};
