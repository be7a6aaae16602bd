use bytes::{BufMut, BytesMut};

use crate::error::{FrameError, Result};

/// Frame header: command id (4) + total length (4) + checksum (4) = 12 bytes.
pub const HEADER_SIZE: usize = 12;

/// Maximum payload size representable by the 32-bit length field.
pub const MAX_PAYLOAD: usize = u32::MAX as usize - HEADER_SIZE;

/// The checksum field starts here and covers the bytes before it.
const CHECKSUM_OFFSET: usize = 8;

const FNV_OFFSET_BASIS: u32 = 0x811c_9dc5;
const FNV_PRIME: u32 = 0x0100_0193;

/// A validated frame header.
///
/// `len` is the total frame length, header included, exactly as declared
/// on the wire. Header validation does not guarantee the declared length
/// is sane; callers must range-check it before consuming a body.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FrameHeader {
    /// The command this frame carries.
    pub cmd_id: u32,
    /// Declared total frame length (header + payload).
    pub len: u32,
}

impl FrameHeader {
    /// Declared payload length, zero if the declared total is short.
    pub fn payload_len(&self) -> usize {
        (self.len as usize).saturating_sub(HEADER_SIZE)
    }
}

/// FNV-1a, 32-bit.
fn checksum(data: &[u8]) -> u32 {
    let mut hash = FNV_OFFSET_BASIS;
    for &byte in data {
        hash ^= u32::from(byte);
        hash = hash.wrapping_mul(FNV_PRIME);
    }
    hash
}

/// Encode a command id and payload into the wire format.
///
/// Wire format:
/// ```text
/// ┌──────────────┬──────────────┬──────────────┬──────────────────────┐
/// │ CmdId (4B LE)│ Length (4B LE)│ Checksum (4B)│ Payload              │
/// │              │ header incl. │ FNV-1a [0..8)│ (Length − 12 bytes)  │
/// └──────────────┴──────────────┴──────────────┴──────────────────────┘
/// ```
pub fn encode_frame(cmd_id: u32, payload: &[u8]) -> Result<BytesMut> {
    if payload.len() > MAX_PAYLOAD {
        return Err(FrameError::PayloadTooLarge {
            size: payload.len(),
            max: MAX_PAYLOAD,
        });
    }

    let total = HEADER_SIZE + payload.len();
    let mut frame = BytesMut::with_capacity(total);
    frame.put_u32_le(cmd_id);
    frame.put_u32_le(total as u32);
    frame.put_u32_le(0);
    frame.put_slice(payload);

    let sum = checksum(&frame[..CHECKSUM_OFFSET]);
    frame[CHECKSUM_OFFSET..HEADER_SIZE].copy_from_slice(&sum.to_le_bytes());

    Ok(frame)
}

/// Decode and validate a frame header from the first `HEADER_SIZE` bytes.
///
/// Returns `None` if fewer than `HEADER_SIZE` bytes are given or the
/// stored checksum does not match the recomputed one. `None` means the
/// stream is desynchronized; the caller's policy is to drop everything
/// buffered and wait for more data.
pub fn decode_header(bytes: &[u8]) -> Option<FrameHeader> {
    if bytes.len() < HEADER_SIZE {
        return None;
    }

    let declared = u32::from_le_bytes(bytes[CHECKSUM_OFFSET..HEADER_SIZE].try_into().unwrap());
    if checksum(&bytes[..CHECKSUM_OFFSET]) != declared {
        return None;
    }

    let cmd_id = u32::from_le_bytes(bytes[0..4].try_into().unwrap());
    let len = u32::from_le_bytes(bytes[4..8].try_into().unwrap());
    Some(FrameHeader { cmd_id, len })
}
