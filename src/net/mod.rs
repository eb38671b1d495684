//! Single-threaded, edge-triggered TCP gateway.
//!
//! One `mio::Poll` instance multiplexes the listening socket and every
//! accepted connection. Each connection owns a [`Pipeline`] that turns
//! incoming bytes into frames, and a write queue for outbound execution
//! reports that couldn't be written in one shot (spec §9: implementations
//! MAY buffer if the socket isn't writable yet).

use std::collections::{HashMap, VecDeque};
use std::io::{self, Read, Write};
use std::net::SocketAddr;

use log::{info, warn};
use mio::net::{TcpListener, TcpStream};
use mio::{Events, Interest, Poll, Token};

use crate::audit::AuditSink;
use crate::connection::Pipeline;
use crate::engine::Engine;

const SERVER: Token = Token(0);
const READ_CHUNK: usize = 4096;

struct Conn {
    stream: TcpStream,
    pipeline: Pipeline,
    write_queue: VecDeque<u8>,
}

impl Conn {
    fn new(stream: TcpStream) -> Self {
        Self {
            stream,
            pipeline: Pipeline::new(),
            write_queue: VecDeque::new(),
        }
    }

    fn queue_write(&mut self, bytes: &[u8]) {
        self.write_queue.extend(bytes);
    }

    /// Drains as much of the write queue as the socket currently accepts.
    fn flush(&mut self) -> io::Result<()> {
        while !self.write_queue.is_empty() {
            let (front, _) = self.write_queue.as_slices();
            match self.stream.write(front) {
                Ok(0) => break,
                Ok(n) => {
                    self.write_queue.drain(..n);
                }
                Err(ref e) if e.kind() == io::ErrorKind::WouldBlock => break,
                Err(ref e) if e.kind() == io::ErrorKind::Interrupted => continue,
                Err(e) => return Err(e),
            }
        }
        Ok(())
    }
}

/// The single-venue TCP front-end. Owns the [`Engine`] and every connection.
pub struct Gateway {
    poll: Poll,
    listener: TcpListener,
    connections: HashMap<Token, Conn>,
    next_token: usize,
    engine: Engine,
}

impl Gateway {
    pub fn bind(addr: SocketAddr, audit: Box<dyn AuditSink>) -> io::Result<Self> {
        let poll = Poll::new()?;
        let mut listener = TcpListener::bind(addr)?;
        poll.registry()
            .register(&mut listener, SERVER, Interest::READABLE)?;

        Ok(Self {
            poll,
            listener,
            connections: HashMap::new(),
            next_token: 1,
            engine: Engine::new(audit),
        })
    }

    pub fn local_addr(&self) -> io::Result<SocketAddr> {
        self.listener.local_addr()
    }

    /// Runs the event loop forever. Used by the `matching-engine` binary.
    pub fn run(&mut self) -> io::Result<()> {
        let mut events = Events::with_capacity(1024);
        loop {
            self.poll_once(&mut events, None)?;
        }
    }

    /// Runs one iteration of the event loop with the given poll timeout.
    /// Exposed separately so tests and benches can drive the gateway
    /// without blocking forever.
    pub fn poll_once(&mut self, events: &mut Events, timeout: Option<std::time::Duration>) -> io::Result<()> {
        self.poll.poll(events, timeout)?;
        for event in events.iter() {
            match event.token() {
                SERVER => self.accept_connections()?,
                token => self.service_connection(token, event.is_readable(), event.is_writable()),
            }
        }
        Ok(())
    }

    fn accept_connections(&mut self) -> io::Result<()> {
        loop {
            match self.listener.accept() {
                Ok((mut stream, addr)) => {
                    let token = Token(self.next_token);
                    self.next_token += 1;
                    stream.set_nodelay(true)?;
                    self.poll.registry().register(
                        &mut stream,
                        token,
                        Interest::READABLE | Interest::WRITABLE,
                    )?;
                    info!("accepted connection {addr} as {token:?}");
                    self.connections.insert(token, Conn::new(stream));
                }
                Err(ref e) if e.kind() == io::ErrorKind::WouldBlock => return Ok(()),
                Err(e) => return Err(e),
            }
        }
    }

    fn service_connection(&mut self, token: Token, readable: bool, writable: bool) {
        if readable && self.read_connection(token) {
            self.drop_connection(token);
            return;
        }
        if writable {
            if let Some(conn) = self.connections.get_mut(&token) {
                if conn.flush().is_err() {
                    self.drop_connection(token);
                }
            }
        }
    }

    /// Reads available bytes, feeds them through the pipeline and engine,
    /// and queues any resulting reports for write-back. Returns `true` if
    /// the connection should be torn down.
    fn read_connection(&mut self, token: Token) -> bool {
        let mut buf = [0u8; READ_CHUNK];
        let mut closed = false;
        let mut chunks: Vec<Vec<u8>> = Vec::new();

        {
            let Some(conn) = self.connections.get_mut(&token) else {
                return false;
            };
            loop {
                match conn.stream.read(&mut buf) {
                    Ok(0) => {
                        closed = true;
                        break;
                    }
                    Ok(n) => chunks.push(buf[..n].to_vec()),
                    Err(ref e) if e.kind() == io::ErrorKind::WouldBlock => break,
                    Err(ref e) if e.kind() == io::ErrorKind::Interrupted => continue,
                    Err(_) => {
                        closed = true;
                        break;
                    }
                }
            }
        }

        for chunk in chunks {
            let result = {
                let Some(conn) = self.connections.get_mut(&token) else {
                    return false;
                };
                conn.pipeline.ingest(&chunk)
            };
            if result.resynced {
                warn!("{token:?}: bad magic, resynchronizing stream");
            }
            for (msg_type, payload) in result.frames {
                let outgoing = self.engine.handle_frame(msg_type, &payload);
                if let Some(conn) = self.connections.get_mut(&token) {
                    for frame in outgoing {
                        conn.queue_write(&frame);
                    }
                }
            }
        }

        if let Some(conn) = self.connections.get_mut(&token) {
            let _ = conn.flush();
        }

        closed
    }

    fn drop_connection(&mut self, token: Token) {
        if let Some(mut conn) = self.connections.remove(&token) {
            let _ = self.poll.registry().deregister(&mut conn.stream);
            info!("closed connection {token:?}");
        }
    }
}
