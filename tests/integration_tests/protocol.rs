// SPDX-License-Identifier: AGPL-3.0-or-later
// Copyright (C) 2012-2025 Andrei Maltsev

use std::io::Write;

use crate::integration_tests::common::{read_reply, roundtrip, spawn_server};

#[test]
fn bulk_value_containing_whitespace_round_trips() {
    let server = spawn_server();
    let mut conn = server.connect();
    let payload = "hello world, with spaces";
    conn.write_all(format!("SET k\r\n${}\r\n{payload}\r\n", payload.len()).as_bytes())
        .expect("write bulk frame");
    assert_eq!(read_reply(&mut conn), b"+OK\r\n");
    assert_eq!(roundtrip(&mut conn, "GET k"), payload.as_bytes());
}

#[test]
fn echo_bulk_reply_carries_arbitrary_bytes() {
    let server = spawn_server();
    let mut conn = server.connect();
    let payload = "has space";
    conn.write_all(format!("ECHO\r\n${}\r\n{payload}\r\n", payload.len()).as_bytes())
        .expect("write bulk frame");
    assert_eq!(read_reply(&mut conn), payload.as_bytes());
}

#[test]
fn partial_writes_are_reassembled_across_reads() {
    let server = spawn_server();
    let mut conn = server.connect();
    // Dribble the command out one byte at a time to exercise the codec's
    // partial-frame tolerance across several READABLE wakeups.
    for byte in b"PING\r\n" {
        conn.write_all(&[*byte]).expect("write one byte");
    }
    assert_eq!(read_reply(&mut conn), b"+PONG\r\n");
}

#[test]
fn pipelined_commands_are_answered_in_order() {
    let server = spawn_server();
    let mut conn = server.connect();
    conn.write_all(b"SET a 1\r\nSET b 2\r\nGET a\r\nGET b\r\n").expect("write pipeline");
    assert_eq!(read_reply(&mut conn), b"+OK\r\n");
    assert_eq!(read_reply(&mut conn), b"+OK\r\n");
    assert_eq!(read_reply(&mut conn), b"1\r\n");
    assert_eq!(read_reply(&mut conn), b"2\r\n");
}

#[test]
fn blank_inline_lines_are_skipped_as_keepalives() {
    let server = spawn_server();
    let mut conn = server.connect();
    conn.write_all(b"\r\n\r\nPING\r\n").expect("write with leading blank lines");
    assert_eq!(read_reply(&mut conn), b"+PONG\r\n");
}
