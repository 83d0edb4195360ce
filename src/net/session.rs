// SPDX-License-Identifier: AGPL-3.0-or-later
// Copyright (C) 2012-2025 Andrei Maltsev

use std::{
    collections::VecDeque,
    io::{self, Read, Write},
    net::SocketAddr,
};

use bytes::Bytes;
use mio::{Token, net::TcpStream};

use crate::net::protocol::{ArityLookup, Codec, ParseOutcome};

/// Generous default cap on buffered-but-unsent reply bytes before a stalled
/// peer gets disconnected (spec §5's backpressure MAY clause).
const MAX_PENDING_WRITE_BYTES: usize = 16 * 1024 * 1024;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SessionState {
    Accepted,
    Active,
    Closing,
    Closed,
}

/// Per-connection state: parse buffer, bound database, reply FIFO.
pub struct Session {
    pub token: Token,
    pub stream: TcpStream,
    pub peer_addr: SocketAddr,
    pub db_index: usize,
    pub state: SessionState,
    codec: Codec,
    out_queue: VecDeque<Bytes>,
    out_cursor: usize,
    pub write_interested: bool,
}

impl Session {
    pub fn new(token: Token, stream: TcpStream, peer_addr: SocketAddr) -> Self {
        Self {
            token,
            stream,
            peer_addr,
            db_index: 0,
            state: SessionState::Accepted,
            codec: Codec::default(),
            out_queue: VecDeque::new(),
            out_cursor: 0,
            write_interested: false,
        }
    }

    pub fn enqueue_reply(&mut self, bytes: Bytes) {
        self.out_queue.push_back(bytes);
    }

    pub fn pending_write_bytes(&self) -> usize {
        self.out_queue
            .iter()
            .map(Bytes::len)
            .sum::<usize>()
            .saturating_sub(self.out_cursor)
    }

    pub fn has_pending_write(&self) -> bool {
        !self.out_queue.is_empty()
    }

    pub fn overflowed(&self) -> bool {
        self.pending_write_bytes() > MAX_PENDING_WRITE_BYTES
    }

    /// Reads everything currently available into the parse buffer. The
    /// second element of the returned pair is `true` if the peer closed its
    /// write half (`read` returned `Ok(0)`) during this call.
    pub fn read_available(&mut self) -> io::Result<(usize, bool)> {
        let mut buf = [0u8; 16 * 1024];
        let mut total = 0;
        loop {
            match self.stream.read(&mut buf) {
                Ok(0) => return Ok((total, true)),
                Ok(n) => {
                    self.codec.feed(&buf[..n]);
                    total += n;
                    if self.state == SessionState::Accepted {
                        self.state = SessionState::Active;
                    }
                },
                Err(e) if e.kind() == io::ErrorKind::WouldBlock => return Ok((total, false)),
                Err(e) if e.kind() == io::ErrorKind::Interrupted => continue,
                Err(e) => return Err(e),
            }
        }
    }

    pub fn next_command(&mut self, registry: &dyn ArityLookup) -> ParseOutcome {
        self.codec.next_command(registry)
    }

    /// Drains as much of the reply queue as the socket will accept right
    /// now. Returns `true` once the queue is fully drained.
    pub fn flush_writes(&mut self) -> io::Result<bool> {
        while let Some(front) = self.out_queue.front() {
            let remaining = &front[self.out_cursor..];
            match self.stream.write(remaining) {
                Ok(n) if n == remaining.len() => {
                    self.out_queue.pop_front();
                    self.out_cursor = 0;
                },
                Ok(n) => self.out_cursor += n,
                Err(e) if e.kind() == io::ErrorKind::WouldBlock => return Ok(false),
                Err(e) if e.kind() == io::ErrorKind::Interrupted => continue,
                Err(e) => return Err(e),
            }
        }
        Ok(true)
    }

    pub fn begin_closing(&mut self) {
        if self.state != SessionState::Closed {
            self.state = SessionState::Closing;
        }
    }

    pub fn is_closed(&self) -> bool {
        self.state == SessionState::Closed
    }

    pub fn close(&mut self) {
        self.state = SessionState::Closed;
    }
}
