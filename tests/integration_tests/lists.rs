// SPDX-License-Identifier: AGPL-3.0-or-later
// Copyright (C) 2012-2025 Andrei Maltsev

use crate::integration_tests::common::{roundtrip, spawn_server};

#[test]
fn rpush_lpop_rpop_matches_the_literal_scenario() {
    let server = spawn_server();
    let mut conn = server.connect();
    assert_eq!(roundtrip(&mut conn, "RPUSH L a"), b"+OK\r\n");
    assert_eq!(roundtrip(&mut conn, "RPUSH L b"), b"+OK\r\n");
    assert_eq!(roundtrip(&mut conn, "LPOP L"), b"a\r\n");
    assert_eq!(roundtrip(&mut conn, "RPOP L"), b"b\r\n");
    assert_eq!(roundtrip(&mut conn, "LLEN L"), b"0\r\n");
}

#[test]
fn lpush_prepends_so_last_pushed_pops_first() {
    let server = spawn_server();
    let mut conn = server.connect();
    roundtrip(&mut conn, "LPUSH L a");
    roundtrip(&mut conn, "LPUSH L b");
    assert_eq!(roundtrip(&mut conn, "LPOP L"), b"b\r\n");
}

#[test]
fn pop_on_missing_key_is_nil() {
    let server = spawn_server();
    let mut conn = server.connect();
    assert_eq!(roundtrip(&mut conn, "LPOP nope"), b"nil\r\n");
}

#[test]
fn lindex_supports_negative_indices() {
    let server = spawn_server();
    let mut conn = server.connect();
    roundtrip(&mut conn, "RPUSH L a");
    roundtrip(&mut conn, "RPUSH L b");
    roundtrip(&mut conn, "RPUSH L c");
    assert_eq!(roundtrip(&mut conn, "LINDEX L 0"), b"a\r\n");
    assert_eq!(roundtrip(&mut conn, "LINDEX L -1"), b"c\r\n");
    assert_eq!(roundtrip(&mut conn, "LINDEX L 99"), b"nil\r\n");
}

#[test]
fn lrange_returns_the_half_open_slice() {
    let server = spawn_server();
    let mut conn = server.connect();
    for v in ["a", "b", "c", "d"] {
        roundtrip(&mut conn, &format!("RPUSH L {v}"));
    }
    assert_eq!(roundtrip(&mut conn, "LRANGE L 0 2"), b"a b\r\n");
    assert_eq!(roundtrip(&mut conn, "LRANGE L 1 4"), b"b c d\r\n");
}

#[test]
fn lset_out_of_range_is_an_error() {
    let server = spawn_server();
    let mut conn = server.connect();
    roundtrip(&mut conn, "RPUSH L a");
    let reply = roundtrip(&mut conn, "LSET L 5 z");
    assert_eq!(reply, b"-ERR index out of range\r\n");
}

#[test]
fn lrem_counts_from_the_requested_direction() {
    let server = spawn_server();
    let mut conn = server.connect();
    for v in ["a", "b", "a", "a", "b"] {
        roundtrip(&mut conn, &format!("RPUSH L {v}"));
    }
    assert_eq!(roundtrip(&mut conn, "LREM L 2 a"), b"2\r\n");
    assert_eq!(roundtrip(&mut conn, "LRANGE L 0 10"), b"b a b\r\n");
}

#[test]
fn list_operation_against_a_string_is_wrongtype() {
    let server = spawn_server();
    let mut conn = server.connect();
    roundtrip(&mut conn, "SET k scalar");
    let reply = roundtrip(&mut conn, "RPUSH k x");
    assert!(reply.starts_with(b"-ERR WRONGTYPE"));
}
