// SPDX-License-Identifier: AGPL-3.0-or-later
// Copyright (C) 2012-2025 Andrei Maltsev

use std::{io, net::SocketAddr};

use mio::{Token, net::TcpListener};

/// The single bound/listening TCP endpoint. Its OS-level backlog (128 on
/// most platforms via `std::net::TcpListener`'s default, which mio wraps)
/// comfortably exceeds the spec's minimum of 32.
pub struct Listener {
    pub token: Token,
    pub inner: TcpListener,
}

impl Listener {
    pub fn bind(addr: SocketAddr, token: Token) -> io::Result<Self> {
        let inner = TcpListener::bind(addr)?;
        Ok(Self { token, inner })
    }

    /// Accepts every currently pending connection; a single READABLE
    /// wakeup can represent more than one waiting peer.
    pub fn accept_all(&mut self) -> io::Result<Vec<(mio::net::TcpStream, SocketAddr)>> {
        let mut out = Vec::new();
        loop {
            match self.inner.accept() {
                Ok(pair) => out.push(pair),
                Err(e) if e.kind() == io::ErrorKind::WouldBlock => break,
                Err(e) if e.kind() == io::ErrorKind::Interrupted => continue,
                Err(e) => return Err(e),
            }
        }
        Ok(out)
    }
}
