//! Length-prefixed, checksummed frame codec and stream reassembly buffer.
//!
//! Every message on the wire is framed with:
//! - A 4-byte little-endian command id
//! - A 4-byte little-endian total frame length (header included)
//! - A 4-byte little-endian FNV-1a checksum covering the two fields above
//!
//! Frames sit back-to-back on the stream with no delimiters. The checksum
//! protects the header only, so a frame can be rejected as soon as its
//! header window is buffered — before the body has arrived.

pub mod buffer;
pub mod codec;
pub mod error;

pub use buffer::StreamBuffer;
pub use codec::{decode_header, encode_frame, FrameHeader, HEADER_SIZE, MAX_PAYLOAD};
pub use error::{FrameError, Result};
