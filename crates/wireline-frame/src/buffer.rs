use tracing::trace;

use crate::error::{FrameError, Result};

/// A byte accumulator for stream reassembly.
///
/// Backed by a fixed-capacity region with two offsets,
/// `head <= tail <= capacity`. Bytes in `[head, tail)` are valid unread
/// data; bytes in `[tail, capacity)` are writable free space; bytes before
/// `head` are consumed and logically gone. A buffer belongs to exactly one
/// session's read loop and is never shared across threads.
#[derive(Debug)]
pub struct StreamBuffer {
    buf: Vec<u8>,
    head: usize,
    tail: usize,
}

impl StreamBuffer {
    /// Create an empty buffer with the given capacity.
    pub fn with_capacity(capacity: usize) -> Self {
        Self {
            buf: vec![0; capacity],
            head: 0,
            tail: 0,
        }
    }

    /// Total capacity of the backing region.
    pub fn capacity(&self) -> usize {
        self.buf.len()
    }

    /// Number of valid unread bytes.
    pub fn unread_len(&self) -> usize {
        self.tail - self.head
    }

    /// Number of writable free bytes after the tail.
    pub fn free_len(&self) -> usize {
        self.buf.len() - self.tail
    }

    /// The writable window to receive fresh bytes into.
    ///
    /// Bytes placed here are not part of the unread region until
    /// [`commit_written`](Self::commit_written) is called.
    pub fn writable_tail(&mut self) -> &mut [u8] {
        let tail = self.tail;
        &mut self.buf[tail..]
    }

    /// Advance the tail past `n` freshly written bytes.
    pub fn commit_written(&mut self, n: usize) -> Result<()> {
        let free = self.free_len();
        if n > free {
            return Err(FrameError::BufferOverflow { requested: n, free });
        }
        self.tail += n;
        Ok(())
    }

    /// Borrow the first `n` unread bytes without consuming them.
    pub fn peek_head(&self, n: usize) -> Result<&[u8]> {
        let unread = self.unread_len();
        if n > unread {
            return Err(FrameError::BufferUnderflow {
                requested: n,
                unread,
            });
        }
        Ok(&self.buf[self.head..self.head + n])
    }

    /// Consume `n` unread bytes, advancing the head, and return them.
    pub fn consume(&mut self, n: usize) -> Result<&[u8]> {
        let unread = self.unread_len();
        if n > unread {
            return Err(FrameError::BufferUnderflow {
                requested: n,
                unread,
            });
        }
        let start = self.head;
        self.head += n;
        Ok(&self.buf[start..start + n])
    }

    /// All currently unread bytes.
    pub fn unread(&self) -> &[u8] {
        &self.buf[self.head..self.tail]
    }

    /// Drop all unread data and restart offsets at zero.
    ///
    /// Used only when stream corruption is detected; in-flight bytes are
    /// lost and the stream resynchronizes on the next read.
    pub fn reset(&mut self) {
        trace!(dropped = self.unread_len(), "resetting stream buffer");
        self.head = 0;
        self.tail = 0;
    }

    /// Copy the unread surplus into a fresh buffer with offsets restarted
    /// at zero.
    ///
    /// The new buffer has capacity `base_capacity`, or the surplus length
    /// if that is larger. The old buffer (and its possibly grown backing
    /// region) can then be discarded.
    pub fn split_surplus(&self, base_capacity: usize) -> StreamBuffer {
        let surplus = self.unread();
        let mut next = StreamBuffer::with_capacity(base_capacity.max(surplus.len()));
        next.buf[..surplus.len()].copy_from_slice(surplus);
        next.tail = surplus.len();
        trace!(carried = surplus.len(), "split surplus into fresh buffer");
        next
    }
}
