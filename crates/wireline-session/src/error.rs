use crate::dispatch::HandlerError;

/// Errors that can occur in session operations.
///
/// Only `send` surfaces errors to callers. Read-side faults are logged and
/// either dropped (per-message) or terminal to the session, never returned.
#[derive(Debug, thiserror::Error)]
pub enum SessionError {
    /// Transport-level I/O error.
    #[error("transport error: {0}")]
    Transport(#[from] std::io::Error),

    /// Frame-level error.
    #[error("frame error: {0}")]
    Frame(#[from] wireline_frame::FrameError),

    /// The transport stopped accepting bytes mid-frame.
    #[error("connection closed")]
    ConnectionClosed,

    /// A message arrived inside the debounce window and was dropped.
    #[error("message {cmd_id} arrived too fast; dropped")]
    TooFast { cmd_id: u32 },

    /// The handler panicked while dispatching a message.
    #[error("handler panicked on message {cmd_id}")]
    HandlerPanic { cmd_id: u32 },

    /// The handler returned an error for a message.
    #[error("handler failed on message {cmd_id}: {source}")]
    Handler { cmd_id: u32, source: HandlerError },
}

pub type Result<T> = std::result::Result<T, SessionError>;
