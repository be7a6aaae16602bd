use std::io::ErrorKind;
use std::panic::{catch_unwind, AssertUnwindSafe};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};
use std::thread;
use std::time::{Duration, Instant};

use bytes::Bytes;
use tracing::{debug, error, warn};
use wireline_frame::{decode_header, encode_frame, StreamBuffer, HEADER_SIZE};
use wireline_transport::Transport;

use crate::debounce::{DebounceGuard, DEBOUNCE_WINDOW};
use crate::dispatch::{CloseListener, Dispatcher};
use crate::error::{Result, SessionError};

/// Default receive buffer capacity. Also the largest frame a session can
/// reassemble; a declared length past this is treated as corruption.
pub const DEFAULT_BUFFER_SIZE: usize = 64 * 1024;

/// Configuration for session behavior.
#[derive(Debug, Clone)]
pub struct SessionConfig {
    /// Receive buffer capacity in bytes. Default: 64 KiB.
    pub buffer_size: usize,
    /// Minimum gap between two admitted messages. Default: 100 µs.
    /// A zero window disables debouncing.
    pub debounce_window: Duration,
}

impl Default for SessionConfig {
    fn default() -> Self {
        Self {
            buffer_size: DEFAULT_BUFFER_SIZE,
            debounce_window: DEBOUNCE_WINDOW,
        }
    }
}

/// One connection's framing session.
///
/// Owns the transport and runs the read/reassemble/dispatch loop on its
/// own thread once [`start`](Self::start) is called. `Session` is a cheap
/// clonable handle; all clones refer to the same connection.
///
/// The type parameter `C` is a caller-defined attachment slot, available
/// to dispatchers via [`custom_data`](Self::custom_data).
pub struct Session<C = ()> {
    inner: Arc<Inner<C>>,
}

impl<C> Clone for Session<C> {
    fn clone(&self) -> Self {
        Self {
            inner: Arc::clone(&self.inner),
        }
    }
}

struct Inner<C> {
    transport: Box<dyn Transport>,
    config: SessionConfig,
    running: AtomicBool,
    close_notified: AtomicBool,
    guard: Mutex<DebounceGuard>,
    /// Partial buffer carried between read iterations. Only the read-loop
    /// thread takes or stashes it.
    pending: Mutex<Option<StreamBuffer>>,
    custom: Mutex<Option<C>>,
    dispatcher: Arc<dyn Dispatcher<C>>,
    close_listener: Mutex<Option<Arc<dyn CloseListener<C>>>>,
}

// A poisoned lock only means another thread panicked while holding it;
// every guarded value here is a plain slot that stays coherent.
fn lock<T>(mutex: &Mutex<T>) -> MutexGuard<'_, T> {
    mutex.lock().unwrap_or_else(PoisonError::into_inner)
}

impl<C: Send + 'static> Session<C> {
    /// Create a session bound to a live transport with default config.
    pub fn new(transport: impl Transport + 'static, dispatcher: Arc<dyn Dispatcher<C>>) -> Self {
        Self::with_config(transport, dispatcher, SessionConfig::default())
    }

    /// Create a session with explicit configuration.
    pub fn with_config(
        transport: impl Transport + 'static,
        dispatcher: Arc<dyn Dispatcher<C>>,
        config: SessionConfig,
    ) -> Self {
        let guard = DebounceGuard::new(config.debounce_window);
        Self {
            inner: Arc::new(Inner {
                transport: Box::new(transport),
                config,
                running: AtomicBool::new(false),
                close_notified: AtomicBool::new(false),
                guard: Mutex::new(guard),
                pending: Mutex::new(None),
                custom: Mutex::new(None),
                dispatcher,
                close_listener: Mutex::new(None),
            }),
        }
    }

    /// Register the observer notified when this session stops.
    ///
    /// Call before [`start`](Self::start). Absence of a listener is fine.
    pub fn set_close_listener(&self, listener: Arc<dyn CloseListener<C>>) {
        *lock(&self.inner.close_listener) = Some(listener);
    }

    /// Spawn the read loop. No-op if the session is already running.
    pub fn start(&self) {
        if self
            .inner
            .running
            .compare_exchange(false, true, Ordering::AcqRel, Ordering::Acquire)
            .is_err()
        {
            return;
        }

        let session = self.clone();
        thread::spawn(move || {
            // Loop-level recovery tier: a panic anywhere in the read or
            // extraction path is fatal to this session, not the process.
            if let Err(panic) = catch_unwind(AssertUnwindSafe(|| session.read_loop())) {
                error!(reason = panic_message(&*panic), "read loop panicked");
            }
            session.stop();
        });
    }

    /// Stop the session: close the transport and notify the close
    /// listener. Idempotent; the listener fires exactly once even when
    /// multiple failure paths race into `stop`.
    pub fn stop(&self) {
        self.inner.running.store(false, Ordering::Release);

        if let Err(err) = self.inner.transport.close() {
            debug!(%err, "transport close reported error");
        }

        if self.inner.close_notified.swap(true, Ordering::AcqRel) {
            return;
        }
        let listener = lock(&self.inner.close_listener).clone();
        if let Some(listener) = listener {
            listener.notify(self);
        }
    }

    /// Whether the read loop is (still) running.
    pub fn is_running(&self) -> bool {
        self.inner.running.load(Ordering::Acquire)
    }

    /// Encode and write one frame, blocking until the transport has
    /// accepted all of it.
    ///
    /// Returns the transport error on failure; never stops the session on
    /// its own — the caller decides whether a write failure is fatal.
    /// There is no internal write serialization: concurrent `send` calls
    /// on the same session can interleave their bytes and corrupt the
    /// stream. Callers that send from multiple threads must serialize
    /// externally.
    pub fn send(&self, cmd_id: u32, payload: &[u8]) -> Result<()> {
        let frame = encode_frame(cmd_id, payload)?;

        let mut offset = 0;
        while offset < frame.len() {
            match self.inner.transport.write(&frame[offset..]) {
                Ok(0) => return Err(SessionError::ConnectionClosed),
                Ok(n) => offset += n,
                Err(err) if err.kind() == ErrorKind::Interrupted => continue,
                Err(err) => return Err(SessionError::Transport(err)),
            }
        }

        Ok(())
    }

    /// Attach a caller-defined value to this session.
    pub fn set_custom_data(&self, value: C) {
        *lock(&self.inner.custom) = Some(value);
    }

    /// The caller-defined value attached to this session, if any.
    pub fn custom_data(&self) -> Option<C>
    where
        C: Clone,
    {
        lock(&self.inner.custom).clone()
    }

    fn read_loop(&self) {
        while self.is_running() {
            let mut buffer = lock(&self.inner.pending)
                .take()
                .unwrap_or_else(|| StreamBuffer::with_capacity(self.inner.config.buffer_size));

            let read = match self.inner.transport.read(buffer.writable_tail()) {
                Ok(0) => {
                    debug!("peer closed connection");
                    self.stop();
                    continue;
                }
                Ok(n) => n,
                Err(err) => {
                    warn!(%err, "transport read failed");
                    self.stop();
                    continue;
                }
            };

            if let Err(err) = buffer.commit_written(read) {
                warn!(%err, "discarding bytes past buffer capacity");
                continue;
            }

            self.drain_frames(buffer);
        }
    }

    /// Extract and dispatch every complete frame buffered so far.
    ///
    /// Frames are dispatched in stream order, sequentially; dispatch of
    /// frame k+1 never begins before the handler call for frame k
    /// returns. The buffer is stashed on the session when it holds a
    /// partial header or body, and reset (dropping all buffered bytes)
    /// when corruption is detected.
    fn drain_frames(&self, mut buffer: StreamBuffer) {
        loop {
            if buffer.unread_len() < HEADER_SIZE {
                *lock(&self.inner.pending) = Some(buffer);
                return;
            }

            let header = match buffer.peek_head(HEADER_SIZE).ok().and_then(decode_header) {
                Some(header) => header,
                None => {
                    warn!(
                        buffered = buffer.unread_len(),
                        "header checksum mismatch; dropping buffered bytes"
                    );
                    buffer.reset();
                    return;
                }
            };

            let frame_len = header.len as usize;
            if frame_len < HEADER_SIZE || frame_len > buffer.capacity() {
                warn!(
                    declared = frame_len,
                    capacity = buffer.capacity(),
                    "invalid declared frame length; dropping buffered bytes"
                );
                buffer.reset();
                return;
            }

            if buffer.unread_len() < frame_len {
                // Partial body; keep the frame (header included) for the
                // next read.
                *lock(&self.inner.pending) = Some(buffer);
                return;
            }

            let payload = match buffer.consume(frame_len) {
                Ok(frame) => Bytes::copy_from_slice(&frame[HEADER_SIZE..]),
                Err(err) => {
                    warn!(%err, declared = frame_len, "frame length integrity failure");
                    buffer.reset();
                    return;
                }
            };

            if buffer.unread_len() == 0 {
                // The consumed frame was everything buffered.
                self.dispatch_frame(header.cmd_id, payload);
                return;
            }

            // Another frame, complete or partial, arrived in the same
            // read. Carry it into a fresh buffer and keep draining without
            // touching the transport.
            let surplus = buffer.split_surplus(self.inner.config.buffer_size);
            self.dispatch_frame(header.cmd_id, payload);
            buffer = surplus;
        }
    }

    fn dispatch_frame(&self, cmd_id: u32, payload: Bytes) {
        if let Err(err) = self.admit_and_handle(cmd_id, payload) {
            warn!(cmd_id, %err, "message dispatch failed");
        }
    }

    fn admit_and_handle(&self, cmd_id: u32, payload: Bytes) -> Result<()> {
        let now = Instant::now();
        {
            let mut guard = lock(&self.inner.guard);
            if !guard.is_valid(now) {
                return Err(SessionError::TooFast { cmd_id });
            }
            guard.mark(now, cmd_id);
        }

        // Dispatch-level recovery tier: a crashing handler kills this
        // message, not the session.
        match catch_unwind(AssertUnwindSafe(|| {
            self.inner.dispatcher.handle(self, cmd_id, payload)
        })) {
            Ok(Ok(())) => Ok(()),
            Ok(Err(source)) => Err(SessionError::Handler { cmd_id, source }),
            Err(_) => Err(SessionError::HandlerPanic { cmd_id }),
        }
    }
}

fn panic_message(panic: &(dyn std::any::Any + Send)) -> &str {
    if let Some(message) = panic.downcast_ref::<&str>() {
        message
    } else if let Some(message) = panic.downcast_ref::<String>() {
        message
    } else {
        "non-string panic payload"
    }
}
