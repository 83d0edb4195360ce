// SPDX-License-Identifier: AGPL-3.0-or-later
// Copyright (C) 2012-2025 Andrei Maltsev

use std::{
    io::{BufRead, BufReader, Read, Write},
    net::TcpStream,
    sync::mpsc,
    thread::{self, JoinHandle},
};

use pedis::cfg::config::Config;

/// A running server bound to an OS-assigned port, torn down by sending
/// `shutdown` when dropped.
pub struct TestServer {
    pub port: u16,
    handle: Option<JoinHandle<()>>,
    _tempdir: tempfile::TempDir,
}

impl TestServer {
    pub fn connect(&self) -> TcpStream {
        TcpStream::connect(("127.0.0.1", self.port)).expect("connect to test server")
    }
}

impl Drop for TestServer {
    fn drop(&mut self) {
        if let Ok(mut stream) = TcpStream::connect(("127.0.0.1", self.port)) {
            let _ = stream.write_all(b"shutdown\r\n");
        }
        if let Some(handle) = self.handle.take() {
            let _ = handle.join();
        }
    }
}

/// Starts `pedis` on an ephemeral port with an isolated temp dump directory,
/// blocking until the listener is up and ready to accept connections.
pub fn spawn_server() -> TestServer {
    spawn_server_with(|_| {})
}

pub fn spawn_server_with(configure: impl FnOnce(&mut Config)) -> TestServer {
    let tempdir = tempfile::tempdir().expect("tempdir");

    let mut config = Config {
        port: 0,
        dir: Some(tempdir.path().to_string_lossy().into_owned()),
        ..Config::default()
    };
    configure(&mut config);

    let (tx, rx) = mpsc::channel();
    let handle = thread::spawn(move || {
        let _ = pedis::server::run_reporting_port(config, tx);
    });

    let port = rx.recv_timeout(std::time::Duration::from_secs(5)).expect("server failed to start");
    TestServer { port, handle: Some(handle), _tempdir: tempdir }
}

/// Sends one inline command (already CRLF-terminated by the caller's
/// choice of `line`) and reads back a single reply frame: a plain
/// CRLF-terminated line, or a `$<len>\r\n<bytes>\r\n` bulk frame.
pub fn roundtrip(stream: &mut TcpStream, line: &str) -> Vec<u8> {
    stream.write_all(line.as_bytes()).expect("write command");
    if !line.ends_with("\r\n") {
        stream.write_all(b"\r\n").expect("write terminator");
    }
    read_reply(stream)
}

pub fn read_reply(stream: &mut TcpStream) -> Vec<u8> {
    let mut reader = BufReader::new(stream.try_clone().expect("clone stream"));
    let mut line = Vec::new();
    reader.read_until(b'\n', &mut line).expect("read reply line");
    if line.last() == Some(&b'\n') {
        line.pop();
        if line.last() == Some(&b'\r') {
            line.pop();
        }
    }

    if line.first() != Some(&b'$') {
        return line;
    }

    let len: usize = std::str::from_utf8(&line[1..])
        .ok()
        .and_then(|s| s.parse().ok())
        .expect("malformed bulk length");
    let mut payload = vec![0u8; len];
    reader.read_exact(&mut payload).expect("read bulk payload");
    let mut term = [0u8; 2];
    reader.read_exact(&mut term).expect("read bulk terminator");
    assert_eq!(&term, b"\r\n");
    payload
}
