//! # limitbook
//!
//! A single-venue, single-instrument limit order matching engine with a
//! length-prefixed, framed TCP front-end.
//!
//! ## Entry point
//!
//! [`net::Gateway`] owns the TCP listener and an [`engine::Engine`]; binding
//! one and calling [`net::Gateway::run`] is the whole server. The pieces
//! compose like this:
//!
//! ```text
//! TcpStream -> connection::Pipeline -> codec frames -> engine::Engine -> book::OrderBook
//! ```
//!
//! ## Example
//!
//! ```rust
//! use limitbook::book::OrderBook;
//! use limitbook::types::{Order, Side};
//!
//! let mut book = OrderBook::new();
//! let sell = Order {
//!     user_id: "u1".into(),
//!     order_id: "s1".into(),
//!     side: Side::Sell,
//!     price: 100.0,
//!     quantity: 10,
//!     remaining_quantity: 10,
//!     timestamp: 1,
//! };
//! let buy = Order {
//!     user_id: "u2".into(),
//!     order_id: "b1".into(),
//!     side: Side::Buy,
//!     price: 100.0,
//!     quantity: 10,
//!     remaining_quantity: 10,
//!     timestamp: 2,
//! };
//! book.match_order(sell);
//! let reports = book.match_order(buy);
//! assert_eq!(reports.len(), 2);
//! ```

pub mod audit;
pub mod book;
pub mod codec;
pub mod connection;
pub mod engine;
pub mod execution;
pub mod gen;
pub mod net;
pub mod types;
pub mod wire;

pub use book::OrderBook;
pub use engine::Engine;
pub use execution::ExecutionReport;
pub use types::{ExecType, Order, Side};
