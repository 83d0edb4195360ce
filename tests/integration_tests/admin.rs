// SPDX-License-Identifier: AGPL-3.0-or-later
// Copyright (C) 2012-2025 Andrei Maltsev

use crate::integration_tests::common::{roundtrip, spawn_server};

#[test]
fn select_binds_the_session_and_rejects_out_of_range_index() {
    let server = spawn_server();
    let mut conn = server.connect();
    assert_eq!(roundtrip(&mut conn, "SELECT 1"), b"+OK\r\n");
    assert_eq!(roundtrip(&mut conn, "DBSIZE"), b"0\r\n");
    assert_eq!(roundtrip(&mut conn, "SELECT 99"), b"-ERR invalid DB index\r\n");
}

#[test]
fn select_rebinds_visibly_to_subsequent_commands() {
    let server = spawn_server();
    let mut conn = server.connect();
    roundtrip(&mut conn, "SET only-in-db0 v");
    roundtrip(&mut conn, "SELECT 1");
    assert_eq!(roundtrip(&mut conn, "EXISTS only-in-db0"), b"0\r\n");
    roundtrip(&mut conn, "SELECT 0");
    assert_eq!(roundtrip(&mut conn, "EXISTS only-in-db0"), b"1\r\n");
}

#[test]
fn dbsize_counts_keys_in_the_bound_db() {
    let server = spawn_server();
    let mut conn = server.connect();
    roundtrip(&mut conn, "SET a 1");
    roundtrip(&mut conn, "SET b 2");
    assert_eq!(roundtrip(&mut conn, "DBSIZE"), b"2\r\n");
}

#[test]
fn move_transfers_a_key_to_the_target_db() {
    let server = spawn_server();
    let mut conn = server.connect();
    roundtrip(&mut conn, "SET k v");
    assert_eq!(roundtrip(&mut conn, "MOVE k 1"), b"1\r\n");
    assert_eq!(roundtrip(&mut conn, "EXISTS k"), b"0\r\n");
    roundtrip(&mut conn, "SELECT 1");
    assert_eq!(roundtrip(&mut conn, "GET k"), b"v\r\n");
}

#[test]
fn move_fails_when_the_key_already_exists_in_the_target_db() {
    let server = spawn_server();
    let mut conn = server.connect();
    roundtrip(&mut conn, "SET k v");
    roundtrip(&mut conn, "SELECT 1");
    roundtrip(&mut conn, "SET k other");
    roundtrip(&mut conn, "SELECT 0");
    assert_eq!(roundtrip(&mut conn, "MOVE k 1"), b"0\r\n");
    assert_eq!(roundtrip(&mut conn, "EXISTS k"), b"1\r\n");
}

#[test]
fn flushdb_clears_only_the_bound_db() {
    let server = spawn_server();
    let mut conn = server.connect();
    roundtrip(&mut conn, "SET a 1");
    roundtrip(&mut conn, "SELECT 1");
    roundtrip(&mut conn, "SET b 2");
    roundtrip(&mut conn, "FLUSHDB");
    assert_eq!(roundtrip(&mut conn, "DBSIZE"), b"0\r\n");
    roundtrip(&mut conn, "SELECT 0");
    assert_eq!(roundtrip(&mut conn, "DBSIZE"), b"1\r\n");
}

#[test]
fn flushall_clears_every_db() {
    let server = spawn_server();
    let mut conn = server.connect();
    roundtrip(&mut conn, "SET a 1");
    roundtrip(&mut conn, "SELECT 1");
    roundtrip(&mut conn, "SET b 2");
    roundtrip(&mut conn, "FLUSHALL");
    assert_eq!(roundtrip(&mut conn, "DBSIZE"), b"0\r\n");
    roundtrip(&mut conn, "SELECT 0");
    assert_eq!(roundtrip(&mut conn, "DBSIZE"), b"0\r\n");
}

#[test]
fn unknown_command_does_not_kill_the_session() {
    let server = spawn_server();
    let mut conn = server.connect();
    assert_eq!(roundtrip(&mut conn, "FROBNICATE a b"), b"-ERR unknown command\r\n");
    assert_eq!(roundtrip(&mut conn, "PING"), b"+PONG\r\n");
}

#[test]
fn wrong_arity_does_not_kill_the_session() {
    let server = spawn_server();
    let mut conn = server.connect();
    assert_eq!(roundtrip(&mut conn, "GET"), b"-ERR wrong number of arguments\r\n");
    assert_eq!(roundtrip(&mut conn, "PING"), b"+PONG\r\n");
}

#[test]
fn quit_closes_the_session_after_its_reply() {
    use std::io::Read;
    let server = spawn_server();
    let mut conn = server.connect();
    assert_eq!(roundtrip(&mut conn, "QUIT"), b"+OK\r\n");
    let mut buf = [0u8; 16];
    let n = conn.read(&mut buf).expect("read after quit");
    assert_eq!(n, 0, "expected EOF after quit");
}
