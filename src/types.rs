//! Core wire-level types: [`Side`], [`ExecType`], and [`Order`].
//!
//! These mirror the fixed-layout payloads in [`crate::wire`] rather than a
//! richer domain model — `order_id`/`user_id` are plain strings capped at
//! the slot sizes the wire format allows, and `price` is a bare `f64`.

/// Order side, matching the wire encoding `BUY=1` / `SELL=0` exactly.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum Side {
    Sell,
    Buy,
}

impl Side {
    pub fn as_u8(self) -> u8 {
        match self {
            Side::Buy => 1,
            Side::Sell => 0,
        }
    }

    pub fn from_u8(v: u8) -> Option<Self> {
        match v {
            1 => Some(Side::Buy),
            0 => Some(Side::Sell),
            _ => None,
        }
    }
}

/// Execution report type (FIX-style), matching the wire encoding exactly.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum ExecType {
    New,
    PartialFill,
    Fill,
    Canceled,
}

impl ExecType {
    pub fn as_u8(self) -> u8 {
        match self {
            ExecType::New => 0,
            ExecType::PartialFill => 1,
            ExecType::Fill => 2,
            ExecType::Canceled => 3,
        }
    }
}

/// Maximum payload bytes for `user_id` (slot is 16 bytes, NUL-terminated).
pub const USER_ID_SLOT: usize = 16;
/// Maximum payload bytes for `order_id` (slot is 32 bytes, NUL-terminated).
pub const ORDER_ID_SLOT: usize = 32;

/// A decoded order submission.
///
/// Invariants (checked by [`crate::wire::order::OrderPayload::decode`] before
/// an `Order` is ever constructed): `price > 0`, `quantity > 0`,
/// `0 <= remaining_quantity <= quantity`.
#[derive(Clone, Debug, PartialEq)]
pub struct Order {
    pub user_id: String,
    pub order_id: String,
    pub side: Side,
    pub price: f64,
    pub quantity: i32,
    pub remaining_quantity: i32,
    pub timestamp: u64,
}

impl Order {
    /// Truncates `user_id`/`order_id` to their wire slot capacity (15 / 31
    /// bytes of payload before the NUL terminator), the same rule the wire
    /// encoder applies. Useful for building test fixtures and for the
    /// synthetic order generator in [`crate::gen`].
    pub fn truncate_ids(mut self) -> Self {
        truncate_to_byte_len(&mut self.user_id, USER_ID_SLOT - 1);
        truncate_to_byte_len(&mut self.order_id, ORDER_ID_SLOT - 1);
        self
    }
}

pub(crate) fn truncate_to_byte_len(s: &mut String, max: usize) {
    if s.len() > max {
        let mut end = max;
        while !s.is_char_boundary(end) {
            end -= 1;
        }
        s.truncate(end);
    }
}
