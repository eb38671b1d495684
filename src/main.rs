//! Matching engine binary: bootstraps logging and the TCP gateway.
//!
//! Configuration is environment-only (spec §4.8):
//! - `MATCHING_ENGINE_PORT` — listen port, default `9999`.
//! - `RUST_LOG` — `env_logger` filter, e.g. `info` or `limitbook=debug`.

use std::net::SocketAddr;

use limitbook::audit::StdoutAuditSink;
use limitbook::net::Gateway;

fn main() {
    env_logger::init();

    let port: u16 = std::env::var("MATCHING_ENGINE_PORT")
        .ok()
        .and_then(|s| s.parse().ok())
        .unwrap_or(9999);
    let addr = SocketAddr::from(([0, 0, 0, 0], port));

    let mut gateway = Gateway::bind(addr, Box::new(StdoutAuditSink)).expect("bind gateway");
    log::info!("matching engine listening on {addr}");
    gateway.run().expect("gateway event loop failed");
}
