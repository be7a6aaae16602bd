use bytes::Bytes;

use crate::session::Session;

/// Error type returned by message handlers.
pub type HandlerError = Box<dyn std::error::Error + Send + Sync>;

/// Application-level handler for decoded messages.
///
/// Invoked by the session's read loop for each validated, admitted frame,
/// sequentially and in stream order. Treated as untrusted: a panic inside
/// `handle` is caught by the session and converted into a logged error
/// without terminating the connection.
pub trait Dispatcher<C = ()>: Send + Sync {
    /// Handle one message. The session handle may be used to reply via
    /// [`Session::send`] or to stop the connection.
    fn handle(&self, session: &Session<C>, cmd_id: u32, payload: Bytes) -> Result<(), HandlerError>;
}

/// Observer notified when a session stops.
///
/// Called at most once per session, no matter how many paths race into
/// [`Session::stop`].
pub trait CloseListener<C = ()>: Send + Sync {
    /// The session has stopped and its transport is closed.
    fn notify(&self, session: &Session<C>);
}
