//! Fixed-layout binary payloads carried inside a [`crate::codec`] frame.

pub mod order;
pub mod report;

pub use order::OrderPayload;
pub use report::ReportPayload;

/// Why a fixed-layout payload was rejected. The engine logs these and drops
/// the frame (spec §7) — it never panics on attacker- or bug-controlled
/// wire input.
#[derive(Clone, Debug, PartialEq)]
pub enum DecodeError {
    WrongSize { expected: usize, actual: usize },
    InvalidSide(u8),
    InvalidExecType(u8),
    NonPositivePrice(f64),
    NonPositiveQuantity(i32),
}

impl std::fmt::Display for DecodeError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            DecodeError::WrongSize { expected, actual } => {
                write!(f, "wrong payload size: expected {expected}, got {actual}")
            }
            DecodeError::InvalidSide(v) => write!(f, "invalid side byte: {v}"),
            DecodeError::InvalidExecType(v) => write!(f, "invalid exec_type byte: {v}"),
            DecodeError::NonPositivePrice(p) => write!(f, "non-positive price: {p}"),
            DecodeError::NonPositiveQuantity(q) => write!(f, "non-positive quantity: {q}"),
        }
    }
}

impl std::error::Error for DecodeError {}

/// Copies `s` (UTF-8) into a fixed NUL-padded slot, truncating if needed.
/// Used by both payload encoders; the slot is always fully initialized.
pub(crate) fn write_fixed_str(dst: &mut [u8], s: &str) {
    let bytes = s.as_bytes();
    let n = bytes.len().min(dst.len());
    dst[..n].copy_from_slice(&bytes[..n]);
    for b in &mut dst[n..] {
        *b = 0;
    }
}

/// Reads a NUL-padded slot back to a `String`, truncating at the first NUL
/// (or the whole slot if there is none). Invalid UTF-8 is replaced
/// losslessly rather than rejected — the wire format has no separate
/// validity bit for this field.
pub(crate) fn read_fixed_str(src: &[u8]) -> String {
    let end = src.iter().position(|&b| b == 0).unwrap_or(src.len());
    String::from_utf8_lossy(&src[..end]).into_owned()
}

/// Bytes occupied by the `order_id` slot of a `CANCEL_ORDER` payload
/// (spec §4.2/§4.5): the first 32 bytes, NUL-padded, anything past that
/// ignored.
pub const CANCEL_ORDER_ID_LEN: usize = 32;

/// Extracts the `order_id` out of a `CANCEL_ORDER` payload. The wire payload
/// is "a 32-byte fixed-width order_id" (spec §4.5); rejects payloads
/// shorter than that rather than guessing.
///
/// Truncated to [`crate::types::ORDER_ID_SLOT`] `- 1` bytes, the same cap
/// [`crate::types::Order::truncate_ids`] applies to a resting order's id —
/// a 32-byte slot with no NUL terminator must decode to the same string here
/// as it does for the order that's actually resting in the book, or it can
/// never be found by this lookup.
pub fn decode_cancel_order_id(data: &[u8]) -> Result<String, DecodeError> {
    if data.len() < CANCEL_ORDER_ID_LEN {
        return Err(DecodeError::WrongSize {
            expected: CANCEL_ORDER_ID_LEN,
            actual: data.len(),
        });
    }
    let mut order_id = read_fixed_str(&data[..CANCEL_ORDER_ID_LEN]);
    crate::types::truncate_to_byte_len(&mut order_id, crate::types::ORDER_ID_SLOT - 1);
    Ok(order_id)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn decode_cancel_order_id_reads_the_first_32_bytes() {
        let mut payload = vec![0u8; 40];
        payload[..3].copy_from_slice(b"A1Z");
        assert_eq!(decode_cancel_order_id(&payload).unwrap(), "A1Z");
    }

    #[test]
    fn decode_cancel_order_id_rejects_short_payload() {
        assert_eq!(
            decode_cancel_order_id(&[0u8; 31]),
            Err(DecodeError::WrongSize {
                expected: 32,
                actual: 31
            })
        );
    }

    #[test]
    fn decode_cancel_order_id_ignores_bytes_past_the_slot() {
        let mut payload = vec![0u8; 32];
        payload[..2].copy_from_slice(b"id");
        payload.extend_from_slice(b"trailing-garbage-not-part-of-id");
        assert_eq!(decode_cancel_order_id(&payload).unwrap(), "id");
    }

    /// A 32-byte slot with no NUL terminator must truncate to 31 bytes,
    /// matching `Order::truncate_ids` — otherwise a cancel for such an id
    /// would never match the book's (truncated) index key.
    #[test]
    fn decode_cancel_order_id_truncates_a_full_slot_to_31_bytes() {
        let payload = vec![b'a'; 32];
        let order_id = decode_cancel_order_id(&payload).unwrap();
        assert_eq!(order_id, "a".repeat(31));
    }
}
