// SPDX-License-Identifier: AGPL-3.0-or-later
// Copyright (C) 2012-2025 Andrei Maltsev

use crate::integration_tests::common::{roundtrip, spawn_server};

#[test]
fn ping_pong() {
    let server = spawn_server();
    let mut conn = server.connect();
    assert_eq!(roundtrip(&mut conn, "PING"), b"+PONG\r\n");
}

#[test]
fn set_then_get_round_trips_the_value() {
    let server = spawn_server();
    let mut conn = server.connect();
    assert_eq!(roundtrip(&mut conn, "SET foo bar"), b"+OK\r\n");
    assert_eq!(roundtrip(&mut conn, "GET foo"), b"bar\r\n");
}

#[test]
fn get_missing_key_is_nil() {
    let server = spawn_server();
    let mut conn = server.connect();
    assert_eq!(roundtrip(&mut conn, "GET nope"), b"nil\r\n");
}

#[test]
fn set_overwrites_whatever_was_there_including_wrong_type() {
    let server = spawn_server();
    let mut conn = server.connect();
    roundtrip(&mut conn, "RPUSH L a");
    assert_eq!(roundtrip(&mut conn, "SET L scalar"), b"+OK\r\n");
    assert_eq!(roundtrip(&mut conn, "GET L"), b"scalar\r\n");
}

#[test]
fn get_against_a_list_is_wrongtype() {
    let server = spawn_server();
    let mut conn = server.connect();
    roundtrip(&mut conn, "RPUSH L a");
    let reply = roundtrip(&mut conn, "GET L");
    assert!(reply.starts_with(b"-ERR WRONGTYPE"), "got {:?}", String::from_utf8_lossy(&reply));
}

#[test]
fn setnx_only_sets_when_absent() {
    let server = spawn_server();
    let mut conn = server.connect();
    assert_eq!(roundtrip(&mut conn, "SETNX k v1"), b"1\r\n");
    assert_eq!(roundtrip(&mut conn, "SETNX k v2"), b"0\r\n");
    assert_eq!(roundtrip(&mut conn, "GET k"), b"v1\r\n");
}

#[test]
fn exists_and_del() {
    let server = spawn_server();
    let mut conn = server.connect();
    assert_eq!(roundtrip(&mut conn, "EXISTS k"), b"0\r\n");
    roundtrip(&mut conn, "SET k v");
    assert_eq!(roundtrip(&mut conn, "EXISTS k"), b"1\r\n");
    assert_eq!(roundtrip(&mut conn, "DEL k"), b"1\r\n");
    assert_eq!(roundtrip(&mut conn, "DEL k"), b"0\r\n");
    assert_eq!(roundtrip(&mut conn, "EXISTS k"), b"0\r\n");
}

#[test]
fn incr_decr_lifecycle_matches_the_literal_scenario() {
    let server = spawn_server();
    let mut conn = server.connect();
    assert_eq!(roundtrip(&mut conn, "INCR counter"), b"1\r\n");
    assert_eq!(roundtrip(&mut conn, "INCR counter"), b"2\r\n");
    assert_eq!(roundtrip(&mut conn, "SET counter abc"), b"+OK\r\n");
    assert_eq!(roundtrip(&mut conn, "INCR counter"), b"0\r\n");
}

#[test]
fn incrby_decrby_apply_the_given_delta() {
    let server = spawn_server();
    let mut conn = server.connect();
    assert_eq!(roundtrip(&mut conn, "INCRBY n 10"), b"10\r\n");
    assert_eq!(roundtrip(&mut conn, "DECRBY n 3"), b"7\r\n");
}

#[test]
fn keys_matches_glob_patterns() {
    let server = spawn_server();
    let mut conn = server.connect();
    roundtrip(&mut conn, "SET one 1");
    roundtrip(&mut conn, "SET two 2");
    roundtrip(&mut conn, "SET three 3");
    let reply = roundtrip(&mut conn, "KEYS *o*");
    let text = String::from_utf8_lossy(&reply);
    let mut names: Vec<&str> = text.split(' ').collect();
    names.sort_unstable();
    assert_eq!(names, vec!["one", "two"]);
}

#[test]
fn keys_with_no_matches_is_zero() {
    let server = spawn_server();
    let mut conn = server.connect();
    assert_eq!(roundtrip(&mut conn, "KEYS nomatch*"), b"0\r\n");
}

#[test]
fn rename_moves_the_value_under_the_new_name() {
    let server = spawn_server();
    let mut conn = server.connect();
    roundtrip(&mut conn, "SET a 1");
    assert_eq!(roundtrip(&mut conn, "RENAME a b"), b"+OK\r\n");
    assert_eq!(roundtrip(&mut conn, "GET b"), b"1\r\n");
    assert_eq!(roundtrip(&mut conn, "EXISTS a"), b"0\r\n");
}

#[test]
fn renamenx_refuses_to_clobber_an_existing_destination() {
    let server = spawn_server();
    let mut conn = server.connect();
    roundtrip(&mut conn, "SET a 1");
    roundtrip(&mut conn, "SET b 2");
    assert_eq!(roundtrip(&mut conn, "RENAMENX a b"), b"1\r\n");
    assert_eq!(roundtrip(&mut conn, "GET a"), b"1\r\n");
    assert_eq!(roundtrip(&mut conn, "GET b"), b"2\r\n");
}

#[test]
fn renamenx_succeeds_and_replies_ok_when_destination_is_free() {
    let server = spawn_server();
    let mut conn = server.connect();
    roundtrip(&mut conn, "SET a 1");
    assert_eq!(roundtrip(&mut conn, "RENAMENX a b"), b"+OK\r\n");
    assert_eq!(roundtrip(&mut conn, "GET b"), b"1\r\n");
    assert_eq!(roundtrip(&mut conn, "EXISTS a"), b"0\r\n");
}

#[test]
fn rename_missing_source_replies_zero_not_an_error() {
    let server = spawn_server();
    let mut conn = server.connect();
    assert_eq!(roundtrip(&mut conn, "RENAME nope dest"), b"0\r\n");
}
