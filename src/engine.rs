//! The matching engine: routes decoded frames to the order book and encodes
//! the resulting execution reports back into frames.
//!
//! `Engine` owns exactly one [`OrderBook`] (spec §3: single venue, single
//! instrument). It has no notion of which TCP connection a frame arrived on
//! — [`crate::net::Gateway`] is responsible for writing the returned frames
//! back to the originating peer (spec §9's "session affinity" note).

use log::{debug, warn};
use serde_json::json;

use crate::audit::{AuditEvent, AuditSink};
use crate::book::OrderBook;
use crate::codec::{self, MessageType};
use crate::wire::{decode_cancel_order_id, order::OrderPayload, report::ReportPayload, DecodeError};

pub struct Engine {
    book: OrderBook,
    audit: Box<dyn AuditSink>,
}

impl Engine {
    pub fn new(audit: Box<dyn AuditSink>) -> Self {
        Self {
            book: OrderBook::new(),
            audit,
        }
    }

    pub fn book(&self) -> &OrderBook {
        &self.book
    }

    /// Handles one decoded frame. Returns zero or more fully-encoded outgoing
    /// frames (execution reports) to write back to the peer that sent it.
    ///
    /// Unknown message types and malformed payloads are logged and dropped
    /// (spec §7): the engine never closes the connection or panics on bad
    /// input, it just produces no reports for that frame.
    pub fn handle_frame(&mut self, msg_type: u8, payload: &[u8]) -> Vec<Vec<u8>> {
        match MessageType::from_u8(msg_type) {
            Some(MessageType::NewOrder) => self.handle_new_order(payload),
            Some(MessageType::CancelOrder) => self.handle_cancel_order(payload),
            Some(MessageType::Heartbeat) => {
                debug!("heartbeat received");
                Vec::new()
            }
            Some(MessageType::ExecutionReport) => {
                warn!("peer sent an EXECUTION_REPORT frame, which is outbound-only; dropping");
                Vec::new()
            }
            None => {
                warn!("dropping frame with unknown message type {msg_type}");
                self.audit.emit(&AuditEvent::now(
                    "tcp",
                    "unknown_message_type",
                    Some(json!({ "msg_type": msg_type })),
                    "rejected",
                ));
                Vec::new()
            }
        }
    }

    fn handle_new_order(&mut self, payload: &[u8]) -> Vec<Vec<u8>> {
        let parsed = OrderPayload::decode(payload);
        let parsed = match parsed {
            Ok(p) => p,
            Err(err) => {
                self.reject_new_order(&err);
                return Vec::new();
            }
        };

        // Check for a duplicate *after* truncating to the wire slot capacity
        // (spec §4.2): the book's order_index is keyed by the truncated id,
        // and a 32-byte order_id with no NUL terminator would otherwise
        // never match its own truncated resting copy.
        let order = parsed.into_order();

        if self.book.contains(&order.order_id) {
            warn!("rejecting duplicate order_id {}", order.order_id);
            self.audit.emit(&AuditEvent::now(
                "tcp",
                "order_reject_duplicate_id",
                Some(json!({ "order_id": order.order_id })),
                "rejected",
            ));
            return Vec::new();
        }

        self.audit.emit(&AuditEvent::now(
            "tcp",
            "order_submit",
            Some(json!({
                "order_id": order.order_id,
                "side": order.side.as_u8(),
                "price": order.price,
                "quantity": order.quantity,
            })),
            "success",
        ));

        let reports = self.book.match_order(order);
        self.audit_and_encode_reports(reports)
    }

    fn handle_cancel_order(&mut self, payload: &[u8]) -> Vec<Vec<u8>> {
        // CANCEL_ORDER carries just a 32-byte fixed-width order_id on the
        // wire (spec §4.5), not the 73-byte NEW_ORDER layout.
        let order_id = match decode_cancel_order_id(payload) {
            Ok(id) => id,
            Err(err) => {
                warn!("dropping truncated cancel payload: {err}");
                self.audit.emit(&AuditEvent::now(
                    "tcp",
                    "order_reject_malformed",
                    Some(json!({ "reason": err.to_string() })),
                    "rejected",
                ));
                return Vec::new();
            }
        };

        match self.book.cancel_order(&order_id) {
            Some(report) => {
                self.audit.emit(&AuditEvent::now(
                    "tcp",
                    "order_cancel",
                    Some(json!({ "order_id": report.order_id })),
                    "success",
                ));
                self.audit_and_encode_reports(vec![report])
            }
            None => {
                debug!("cancel for unknown or already-resolved order_id {order_id}");
                self.audit.emit(&AuditEvent::now(
                    "tcp",
                    "order_cancel",
                    Some(json!({ "order_id": order_id })),
                    "rejected",
                ));
                Vec::new()
            }
        }
    }

    fn reject_new_order(&self, err: &DecodeError) {
        warn!("dropping malformed order payload: {err}");
        self.audit.emit(&AuditEvent::now(
            "tcp",
            "order_reject_malformed",
            Some(json!({ "reason": err.to_string() })),
            "rejected",
        ));
    }

    fn audit_and_encode_reports(&self, reports: Vec<crate::execution::ExecutionReport>) -> Vec<Vec<u8>> {
        reports
            .into_iter()
            .map(|report| {
                self.audit.emit(&AuditEvent::now(
                    "tcp",
                    "execution_report",
                    Some(json!({
                        "order_id": report.order_id,
                        "exec_type": report.exec_type.as_u8(),
                        "leaves_qty": report.leaves_qty,
                    })),
                    "success",
                ));
                let wire = ReportPayload::from(&report);
                codec::encode(MessageType::ExecutionReport as u8, &wire.encode())
            })
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::audit::InMemoryAuditSink;
    use crate::types::Side;
    use crate::wire::order::OrderPayload;

    fn new_order_frame(order_id: &str, side: Side, price: f64, qty: i32) -> Vec<u8> {
        let payload = OrderPayload {
            user_id: "u1".into(),
            order_id: order_id.into(),
            side,
            price,
            quantity: qty,
            remaining_quantity: qty,
            timestamp: 0,
        };
        codec::encode(MessageType::NewOrder as u8, &payload.encode())
    }

    /// Builds a `CANCEL_ORDER` frame: a bare 32-byte, NUL-padded `order_id`
    /// (spec §4.5), not the 73-byte `NEW_ORDER` layout.
    fn cancel_order_frame(order_id: &str) -> Vec<u8> {
        let mut payload = [0u8; 32];
        let bytes = order_id.as_bytes();
        payload[..bytes.len()].copy_from_slice(bytes);
        codec::encode(MessageType::CancelOrder as u8, &payload)
    }

    fn decode_one_frame(bytes: &[u8]) -> (u8, Vec<u8>) {
        let mut cursor = 0;
        match codec::decode(bytes, &mut cursor) {
            codec::Decoded::Frame { msg_type, payload } => (msg_type, payload),
            other => panic!("expected a frame, got {other:?}"),
        }
    }

    #[test]
    fn new_order_with_no_cross_produces_one_new_report() {
        let mut engine = Engine::new(Box::new(InMemoryAuditSink::new()));
        let frame = new_order_frame("b1", Side::Buy, 99.0, 10);
        let mut cursor = 0;
        let codec::Decoded::Frame { msg_type, payload } = codec::decode(&frame, &mut cursor) else {
            panic!("frame did not decode");
        };
        let out = engine.handle_frame(msg_type, &payload);
        assert_eq!(out.len(), 1);
        let (mt, p) = decode_one_frame(&out[0]);
        assert_eq!(mt, MessageType::ExecutionReport as u8);
        let report = ReportPayload::decode(&p).unwrap();
        assert_eq!(report.exec_type, crate::types::ExecType::New);
    }

    #[test]
    fn matching_new_order_produces_reports_for_both_sides() {
        let mut engine = Engine::new(Box::new(InMemoryAuditSink::new()));
        let sell = new_order_frame("s1", Side::Sell, 100.0, 10);
        let mut cursor = 0;
        let codec::Decoded::Frame { msg_type, payload } = codec::decode(&sell, &mut cursor) else {
            panic!()
        };
        assert!(engine.handle_frame(msg_type, &payload).is_empty());

        let buy = new_order_frame("b1", Side::Buy, 100.0, 10);
        let mut cursor = 0;
        let codec::Decoded::Frame { msg_type, payload } = codec::decode(&buy, &mut cursor) else {
            panic!()
        };
        let out = engine.handle_frame(msg_type, &payload);
        assert_eq!(out.len(), 2);
    }

    #[test]
    fn duplicate_order_id_is_rejected_with_no_reports() {
        let mut engine = Engine::new(Box::new(InMemoryAuditSink::new()));
        let frame = new_order_frame("dup", Side::Buy, 99.0, 10);
        let mut cursor = 0;
        let codec::Decoded::Frame { msg_type, payload } = codec::decode(&frame, &mut cursor) else {
            panic!()
        };
        assert_eq!(engine.handle_frame(msg_type, &payload).len(), 1);
        let mut cursor2 = 0;
        let codec::Decoded::Frame { msg_type, payload } = codec::decode(&frame, &mut cursor2) else {
            panic!()
        };
        assert!(engine.handle_frame(msg_type, &payload).is_empty());
    }

    /// An `order_id` that exactly fills the 32-byte wire slot with no NUL
    /// terminator must still be recognized as a duplicate against its own
    /// (31-byte-truncated) resting copy, and must still be cancelable by
    /// the same id — both the duplicate check and `decode_cancel_order_id`
    /// have to truncate exactly the way the book's index key does.
    #[test]
    fn order_id_filling_the_whole_slot_is_deduped_and_cancelable() {
        let mut engine = Engine::new(Box::new(InMemoryAuditSink::new()));
        let full_slot_id = "a".repeat(32);
        let truncated_id = "a".repeat(31);

        let frame = new_order_frame(&full_slot_id, Side::Buy, 99.0, 10);
        let mut cursor = 0;
        let codec::Decoded::Frame { msg_type, payload } = codec::decode(&frame, &mut cursor) else {
            panic!()
        };
        assert_eq!(engine.handle_frame(msg_type, &payload).len(), 1);
        assert!(engine.book().contains(&truncated_id));

        let mut cursor2 = 0;
        let codec::Decoded::Frame { msg_type, payload } = codec::decode(&frame, &mut cursor2) else {
            panic!()
        };
        assert!(
            engine.handle_frame(msg_type, &payload).is_empty(),
            "resubmitting the same full-slot order_id must be detected as a duplicate"
        );

        let cancel_frame = cancel_order_frame(&full_slot_id);
        let mut cursor3 = 0;
        let codec::Decoded::Frame { msg_type, payload } = codec::decode(&cancel_frame, &mut cursor3) else {
            panic!()
        };
        let out = engine.handle_frame(msg_type, &payload);
        assert_eq!(out.len(), 1, "cancel must find the order by its truncated id");
        let (_, p) = decode_one_frame(&out[0]);
        let report = ReportPayload::decode(&p).unwrap();
        assert_eq!(report.exec_type, crate::types::ExecType::Canceled);
        assert!(!engine.book().contains(&truncated_id));
    }

    #[test]
    fn cancel_of_resting_order_produces_canceled_report() {
        let mut engine = Engine::new(Box::new(InMemoryAuditSink::new()));
        let frame = new_order_frame("b1", Side::Buy, 99.0, 10);
        let mut cursor = 0;
        let codec::Decoded::Frame { msg_type, payload } = codec::decode(&frame, &mut cursor) else {
            panic!()
        };
        engine.handle_frame(msg_type, &payload);

        let cancel_frame = cancel_order_frame("b1");
        let mut cursor = 0;
        let codec::Decoded::Frame { msg_type, payload } = codec::decode(&cancel_frame, &mut cursor) else {
            panic!()
        };
        let out = engine.handle_frame(msg_type, &payload);
        assert_eq!(out.len(), 1);
        let (_, p) = decode_one_frame(&out[0]);
        let report = ReportPayload::decode(&p).unwrap();
        assert_eq!(report.exec_type, crate::types::ExecType::Canceled);
        assert_eq!(report.leaves_qty, 0);
        assert!(!engine.book().contains("b1"));
    }

    #[test]
    fn truncated_cancel_payload_is_dropped() {
        let mut engine = Engine::new(Box::new(InMemoryAuditSink::new()));
        let short = codec::encode(MessageType::CancelOrder as u8, &[0u8; 31]);
        let mut cursor = 0;
        let codec::Decoded::Frame { msg_type, payload } = codec::decode(&short, &mut cursor) else {
            panic!()
        };
        assert!(engine.handle_frame(msg_type, &payload).is_empty());
    }

    #[test]
    fn unknown_message_type_is_dropped_without_panicking() {
        let mut engine = Engine::new(Box::new(InMemoryAuditSink::new()));
        assert!(engine.handle_frame(200, &[]).is_empty());
    }

    #[test]
    fn heartbeat_produces_no_reports() {
        let mut engine = Engine::new(Box::new(InMemoryAuditSink::new()));
        assert!(engine.handle_frame(MessageType::Heartbeat as u8, &[]).is_empty());
    }
}
