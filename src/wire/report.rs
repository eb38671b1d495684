//! `ReportPayload`: the 37-byte on-the-wire layout for `EXECUTION_REPORT`
//! (spec §4.2).
//!
//! ```text
//! [0..32)   order_id        (NUL-padded)
//! [32]      exec_type       (u8)
//! [33..37)  leaves_qty      (i32, LE)
//! ```
//!
//! This intentionally omits `price` and `last_shares`, which exist on
//! [`crate::execution::ExecutionReport`] but never go on the wire — the
//! reference format trims the report down to what a client needs to track
//! its own resting quantity. Implementations MUST emit exactly 37 bytes.

use super::{read_fixed_str, write_fixed_str, DecodeError};
use crate::execution::ExecutionReport;
use crate::types::ExecType;

pub const LEN: usize = 37;

const ORDER_ID: std::ops::Range<usize> = 0..32;
const EXEC_TYPE: usize = 32;
const LEAVES_QTY: std::ops::Range<usize> = 33..37;

#[derive(Clone, Debug, PartialEq)]
pub struct ReportPayload {
    pub order_id: String,
    pub exec_type: ExecType,
    pub leaves_qty: i32,
}

impl ReportPayload {
    pub fn encode(&self) -> [u8; LEN] {
        let mut buf = [0u8; LEN];
        write_fixed_str(&mut buf[ORDER_ID], &self.order_id);
        buf[EXEC_TYPE] = self.exec_type.as_u8();
        buf[LEAVES_QTY].copy_from_slice(&self.leaves_qty.to_le_bytes());
        buf
    }

    /// Decodes a report payload. Only used by tests and client-side
    /// tooling — the engine only ever encodes these.
    pub fn decode(data: &[u8]) -> Result<Self, DecodeError> {
        if data.len() != LEN {
            return Err(DecodeError::WrongSize {
                expected: LEN,
                actual: data.len(),
            });
        }
        let exec_byte = data[EXEC_TYPE];
        let exec_type = match exec_byte {
            0 => ExecType::New,
            1 => ExecType::PartialFill,
            2 => ExecType::Fill,
            3 => ExecType::Canceled,
            other => return Err(DecodeError::InvalidExecType(other)),
        };
        let leaves_qty = i32::from_le_bytes(data[LEAVES_QTY].try_into().unwrap());
        Ok(Self {
            order_id: read_fixed_str(&data[ORDER_ID]),
            exec_type,
            leaves_qty,
        })
    }
}

impl From<&ExecutionReport> for ReportPayload {
    fn from(report: &ExecutionReport) -> Self {
        Self {
            order_id: report.order_id.clone(),
            exec_type: report.exec_type,
            leaves_qty: report.leaves_qty,
        }
    }
}
