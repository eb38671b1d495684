//! `OrderPayload`: the 73-byte on-the-wire layout for `NEW_ORDER` (spec §4.2).
//!
//! ```text
//! [0..16)   user_id         (NUL-padded)
//! [16..48)  order_id        (NUL-padded)
//! [48]      side            (u8: 1=BUY, 0=SELL)
//! [49..57)  price           (f64, LE)
//! [57..61)  quantity        (i32, LE)
//! [61..65)  remaining_qty   (i32, LE)
//! [65..73)  timestamp       (u64, LE)
//! ```

use super::{read_fixed_str, write_fixed_str, DecodeError};
use crate::types::{Order, Side, ORDER_ID_SLOT, USER_ID_SLOT};

pub const LEN: usize = 73;

const USER_ID: std::ops::Range<usize> = 0..16;
const ORDER_ID: std::ops::Range<usize> = 16..48;
const SIDE: usize = 48;
const PRICE: std::ops::Range<usize> = 49..57;
const QUANTITY: std::ops::Range<usize> = 57..61;
const REMAINING_QTY: std::ops::Range<usize> = 61..65;
const TIMESTAMP: std::ops::Range<usize> = 65..73;

/// The decoded `NEW_ORDER` payload. Distinct from [`Order`] only in that it
/// keeps the wire's own `remaining_quantity`, which the engine may trust or
/// re-derive from `quantity` (spec §4.2 note) — see [`OrderPayload::into_order`].
#[derive(Clone, Debug, PartialEq)]
pub struct OrderPayload {
    pub user_id: String,
    pub order_id: String,
    pub side: Side,
    pub price: f64,
    pub quantity: i32,
    pub remaining_quantity: i32,
    pub timestamp: u64,
}

impl OrderPayload {
    pub fn encode(&self) -> [u8; LEN] {
        let mut buf = [0u8; LEN];
        write_fixed_str(&mut buf[USER_ID], &self.user_id);
        write_fixed_str(&mut buf[ORDER_ID], &self.order_id);
        buf[SIDE] = self.side.as_u8();
        buf[PRICE].copy_from_slice(&self.price.to_le_bytes());
        buf[QUANTITY].copy_from_slice(&self.quantity.to_le_bytes());
        buf[REMAINING_QTY].copy_from_slice(&self.remaining_quantity.to_le_bytes());
        buf[TIMESTAMP].copy_from_slice(&self.timestamp.to_le_bytes());
        buf
    }

    /// Decodes and validates a `NEW_ORDER` payload. Rejects (spec §4.2) if
    /// size != 73, `side > 1`, `price <= 0`, or `quantity <= 0`.
    pub fn decode(data: &[u8]) -> Result<Self, DecodeError> {
        if data.len() != LEN {
            return Err(DecodeError::WrongSize {
                expected: LEN,
                actual: data.len(),
            });
        }

        let side_byte = data[SIDE];
        let side = Side::from_u8(side_byte).ok_or(DecodeError::InvalidSide(side_byte))?;

        let price = f64::from_le_bytes(data[PRICE].try_into().unwrap());
        if price <= 0.0 {
            return Err(DecodeError::NonPositivePrice(price));
        }

        let quantity = i32::from_le_bytes(data[QUANTITY].try_into().unwrap());
        if quantity <= 0 {
            return Err(DecodeError::NonPositiveQuantity(quantity));
        }

        let remaining_quantity = i32::from_le_bytes(data[REMAINING_QTY].try_into().unwrap());
        let timestamp = u64::from_le_bytes(data[TIMESTAMP].try_into().unwrap());

        Ok(Self {
            user_id: read_fixed_str(&data[USER_ID]),
            order_id: read_fixed_str(&data[ORDER_ID]),
            side,
            price,
            quantity,
            remaining_quantity,
            timestamp,
        })
    }

    /// Converts to the engine's [`Order`], using whichever of
    /// `quantity`/`remaining_quantity` is smaller as the residue — trusting
    /// the wire value but never letting it exceed `quantity` (spec §4.2).
    pub fn into_order(self) -> Order {
        let remaining_quantity = self.remaining_quantity.min(self.quantity).max(0);
        Order {
            user_id: self.user_id,
            order_id: self.order_id,
            side: self.side,
            price: self.price,
            quantity: self.quantity,
            remaining_quantity,
            timestamp: self.timestamp,
        }
        .truncate_ids()
    }
}

impl From<&Order> for OrderPayload {
    fn from(order: &Order) -> Self {
        Self {
            user_id: order.user_id.clone(),
            order_id: order.order_id.clone(),
            side: order.side,
            price: order.price,
            quantity: order.quantity,
            remaining_quantity: order.remaining_quantity,
            timestamp: order.timestamp,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample() -> OrderPayload {
        OrderPayload {
            user_id: "alice".into(),
            order_id: "ord-1".into(),
            side: Side::Buy,
            price: 100.5,
            quantity: 10,
            remaining_quantity: 10,
            timestamp: 42,
        }
    }

    #[test]
    fn encode_is_exactly_73_bytes() {
        assert_eq!(sample().encode().len(), LEN);
    }

    #[test]
    fn round_trip_preserves_fields() {
        let original = sample();
        let decoded = OrderPayload::decode(&original.encode()).unwrap();
        assert_eq!(original, decoded);
    }

    #[test]
    fn ids_truncate_at_first_nul_on_decode() {
        let mut buf = sample().encode();
        // Embed a NUL followed by garbage inside the order_id slot.
        buf[16] = b'a';
        buf[17] = 0;
        buf[18] = b'z';
        let decoded = OrderPayload::decode(&buf).unwrap();
        assert_eq!(decoded.order_id, "a");
    }

    #[test]
    fn rejects_wrong_size() {
        let err = OrderPayload::decode(&[0u8; 10]).unwrap_err();
        assert_eq!(
            err,
            DecodeError::WrongSize {
                expected: 73,
                actual: 10
            }
        );
    }

    #[test]
    fn rejects_invalid_side() {
        let mut buf = sample().encode();
        buf[SIDE] = 2;
        assert_eq!(
            OrderPayload::decode(&buf).unwrap_err(),
            DecodeError::InvalidSide(2)
        );
    }

    #[test]
    fn rejects_non_positive_price() {
        let mut payload = sample();
        payload.price = -1.0;
        let mut buf = payload.encode();
        buf[PRICE].copy_from_slice(&(-1.0f64).to_le_bytes());
        assert!(matches!(
            OrderPayload::decode(&buf),
            Err(DecodeError::NonPositivePrice(_))
        ));
    }

    #[test]
    fn rejects_non_positive_quantity() {
        let mut buf = sample().encode();
        buf[QUANTITY].copy_from_slice(&0i32.to_le_bytes());
        assert!(matches!(
            OrderPayload::decode(&buf),
            Err(DecodeError::NonPositiveQuantity(_))
        ));
    }

    #[test]
    fn into_order_trusts_the_smaller_of_quantity_and_remaining() {
        let mut payload = sample();
        payload.remaining_quantity = 999; // wire claims more residue than quantity
        let order = payload.into_order();
        assert_eq!(order.remaining_quantity, order.quantity);
    }

    #[test]
    fn into_order_truncates_ids_to_slot_capacity() {
        let mut payload = sample();
        payload.user_id = "x".repeat(USER_ID_SLOT * 2);
        payload.order_id = "y".repeat(ORDER_ID_SLOT * 2);
        let order = payload.into_order();
        assert_eq!(order.user_id.len(), USER_ID_SLOT - 1);
        assert_eq!(order.order_id.len(), ORDER_ID_SLOT - 1);
    }
}
