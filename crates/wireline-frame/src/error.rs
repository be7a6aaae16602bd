/// Errors that can occur in frame encoding and buffer management.
#[derive(Debug, thiserror::Error)]
pub enum FrameError {
    /// The payload exceeds the representable frame length.
    #[error("payload too large ({size} bytes, max {max})")]
    PayloadTooLarge { size: usize, max: usize },

    /// More bytes were committed than the buffer has free space for.
    #[error("buffer overflow (committing {requested} bytes, {free} free)")]
    BufferOverflow { requested: usize, free: usize },

    /// More bytes were requested than the buffer holds unread.
    #[error("buffer underflow (requested {requested} bytes, {unread} unread)")]
    BufferUnderflow { requested: usize, unread: usize },
}

pub type Result<T> = std::result::Result<T, FrameError>;
