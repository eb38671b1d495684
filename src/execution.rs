//! Execution reports: one is emitted for every order-book state change.
//!
//! [`ExecutionReport`] is the in-memory shape; [`crate::wire::report`] holds
//! its fixed 37-byte wire encoding, which deliberately omits `price` and
//! `last_shares` (see the module docs there).

use crate::types::ExecType;

/// Execution report (charter). `price` is the last-traded price at the time
/// of this event (`0.0` for a no-trade NEW or a CANCELED). `last_shares` is
/// the quantity traded on this specific event (`0` for NEW and CANCELED).
#[derive(Clone, Debug, PartialEq)]
pub struct ExecutionReport {
    pub order_id: String,
    pub price: f64,
    pub last_shares: i32,
    pub leaves_qty: i32,
    pub exec_type: ExecType,
}
