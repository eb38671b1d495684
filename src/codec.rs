//! Frame codec: a length-prefixed wire frame with a magic header.
//!
//! Layout (all little-endian), exactly 7 header bytes + payload:
//! ```text
//! offset 0..4  magic (u32, 0xABCDEF00)
//! offset 4..6  payload_length (u16)
//! offset 6     type (u8)
//! offset 7..   payload (payload_length bytes)
//! ```
//!
//! The codec is purely functional over a byte buffer plus an in/out cursor;
//! it holds no state of its own (that belongs to [`crate::connection::Pipeline`]).

pub const MAGIC: u32 = 0xABCD_EF00;
pub const HEADER_LEN: usize = 7;
/// Largest payload a single frame can carry (`payload_length` is a `u16`).
pub const MAX_PAYLOAD_LEN: usize = u16::MAX as usize;

/// Wire message types (spec §6). Unknown bytes decode fine at the frame
/// layer — only [`crate::engine::Engine`] rejects them.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
#[repr(u8)]
pub enum MessageType {
    NewOrder = 1,
    CancelOrder = 2,
    Heartbeat = 3,
    ExecutionReport = 4,
}

impl MessageType {
    pub fn from_u8(v: u8) -> Option<Self> {
        match v {
            1 => Some(MessageType::NewOrder),
            2 => Some(MessageType::CancelOrder),
            3 => Some(MessageType::Heartbeat),
            4 => Some(MessageType::ExecutionReport),
            _ => None,
        }
    }
}

/// Result of attempting to decode one frame starting at the cursor.
#[derive(Debug, PartialEq)]
pub enum Decoded {
    /// Fewer than a full frame is buffered; the cursor is unchanged, call
    /// again once more bytes have arrived.
    Incomplete,
    /// Bad magic: the stream is corrupt. The cursor has been advanced to
    /// the end of `buf` (all buffered bytes are dropped) so the caller can
    /// resynchronize on the next read.
    Resync,
    /// One complete frame. The cursor has been advanced past it.
    Frame { msg_type: u8, payload: Vec<u8> },
}

/// Encodes `payload` as a complete frame. `payload.len()` must fit in a
/// `u16` (the caller is responsible for not exceeding [`MAX_PAYLOAD_LEN`]).
pub fn encode(msg_type: u8, payload: &[u8]) -> Vec<u8> {
    debug_assert!(payload.len() <= MAX_PAYLOAD_LEN, "payload exceeds u16 length");
    let mut frame = Vec::with_capacity(HEADER_LEN + payload.len());
    frame.extend_from_slice(&MAGIC.to_le_bytes());
    frame.extend_from_slice(&(payload.len() as u16).to_le_bytes());
    frame.push(msg_type);
    frame.extend_from_slice(payload);
    frame
}

/// Attempts to decode one frame from `buf[*cursor..]`. Advances `*cursor`
/// past the frame on success or resync, leaves it untouched on
/// [`Decoded::Incomplete`].
pub fn decode(buf: &[u8], cursor: &mut usize) -> Decoded {
    let available = buf.len() - *cursor;
    if available < HEADER_LEN {
        return Decoded::Incomplete;
    }

    let header = &buf[*cursor..*cursor + HEADER_LEN];
    let magic = u32::from_le_bytes([header[0], header[1], header[2], header[3]]);
    if magic != MAGIC {
        *cursor = buf.len();
        return Decoded::Resync;
    }

    let payload_len = u16::from_le_bytes([header[4], header[5]]) as usize;
    let msg_type = header[6];

    if available < HEADER_LEN + payload_len {
        return Decoded::Incomplete;
    }

    let payload_start = *cursor + HEADER_LEN;
    let payload = buf[payload_start..payload_start + payload_len].to_vec();
    *cursor += HEADER_LEN + payload_len;
    Decoded::Frame { msg_type, payload }
}
