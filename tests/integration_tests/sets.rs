// SPDX-License-Identifier: AGPL-3.0-or-later
// Copyright (C) 2012-2025 Andrei Maltsev

use crate::integration_tests::common::{roundtrip, spawn_server};

#[test]
fn sadd_sismember_matches_the_literal_scenario() {
    let server = spawn_server();
    let mut conn = server.connect();
    assert_eq!(roundtrip(&mut conn, "SADD S x"), b"1\r\n");
    assert_eq!(roundtrip(&mut conn, "SISMEMBER S x"), b"1\r\n");
    assert_eq!(roundtrip(&mut conn, "SISMEMBER S y"), b"0\r\n");
}

#[test]
fn sadd_is_idempotent_on_membership() {
    let server = spawn_server();
    let mut conn = server.connect();
    // sadd's reply is not a presence flag: a duplicate add still replies
    // `1\r\n`. Idempotency shows up in SCARD, not in the second SADD's reply.
    assert_eq!(roundtrip(&mut conn, "SADD S x"), b"1\r\n");
    assert_eq!(roundtrip(&mut conn, "SADD S x"), b"1\r\n");
    assert_eq!(roundtrip(&mut conn, "SCARD S"), b"1\r\n");
}

#[test]
fn srem_removes_and_reports_prior_membership() {
    let server = spawn_server();
    let mut conn = server.connect();
    roundtrip(&mut conn, "SADD S x");
    assert_eq!(roundtrip(&mut conn, "SREM S x"), b"1\r\n");
    assert_eq!(roundtrip(&mut conn, "SREM S x"), b"0\r\n");
}

#[test]
fn sinter_intersects_across_more_than_two_sets() {
    let server = spawn_server();
    let mut conn = server.connect();
    for v in ["a", "b", "c"] {
        roundtrip(&mut conn, &format!("SADD s1 {v}"));
    }
    for v in ["b", "c", "d"] {
        roundtrip(&mut conn, &format!("SADD s2 {v}"));
    }
    for v in ["b", "c", "e"] {
        roundtrip(&mut conn, &format!("SADD s3 {v}"));
    }
    let reply = roundtrip(&mut conn, "SINTER s1 s2 s3");
    let text = String::from_utf8_lossy(&reply);
    let mut members: Vec<&str> = text.split(' ').collect();
    members.sort_unstable();
    assert_eq!(members, vec!["b", "c"]);
}

#[test]
fn sinterstore_persists_the_intersection_under_the_destination_key() {
    let server = spawn_server();
    let mut conn = server.connect();
    roundtrip(&mut conn, "SADD s1 x");
    roundtrip(&mut conn, "SADD s1 y");
    roundtrip(&mut conn, "SADD s2 x");
    assert_eq!(roundtrip(&mut conn, "SINTERSTORE dest s1 s2"), b"+OK\r\n");
    assert_eq!(roundtrip(&mut conn, "SMEMBERS dest"), b"x\r\n");
}

#[test]
fn sinter_against_a_missing_key_is_an_error() {
    let server = spawn_server();
    let mut conn = server.connect();
    roundtrip(&mut conn, "SADD s1 x");
    let reply = roundtrip(&mut conn, "SINTER s1 nope");
    assert!(reply.starts_with(b"-ERR"));
}

#[test]
fn set_operation_against_a_list_is_wrongtype() {
    let server = spawn_server();
    let mut conn = server.connect();
    roundtrip(&mut conn, "RPUSH L a");
    let reply = roundtrip(&mut conn, "SADD L x");
    assert!(reply.starts_with(b"-ERR WRONGTYPE"));
}
