// SPDX-License-Identifier: AGPL-3.0-or-later
// Copyright (C) 2012-2025 Andrei Maltsev

use std::{thread, time::Duration};

use crate::integration_tests::common::{roundtrip, spawn_server};

#[test]
fn save_reports_ok_and_advances_lastsave() {
    let server = spawn_server();
    let mut conn = server.connect();
    assert_eq!(roundtrip(&mut conn, "SET k v"), b"+OK\r\n");
    assert_eq!(roundtrip(&mut conn, "LASTSAVE"), b"0\r\n");
    assert_eq!(roundtrip(&mut conn, "SAVE"), b"+OK\r\n");
    let reply = roundtrip(&mut conn, "LASTSAVE");
    let text = String::from_utf8_lossy(&reply);
    let ts: u64 = text.trim_end().parse().expect("lastsave should be a decimal timestamp");
    assert!(ts > 0);
}

#[test]
fn bgsave_completes_without_blocking_subsequent_commands() {
    let server = spawn_server();
    let mut conn = server.connect();
    roundtrip(&mut conn, "SET k v");
    assert_eq!(roundtrip(&mut conn, "BGSAVE"), b"+OK\r\n");
    assert_eq!(roundtrip(&mut conn, "PING"), b"+PONG\r\n");

    for _ in 0..50 {
        let reply = roundtrip(&mut conn, "LASTSAVE");
        if reply != b"0\r\n" {
            return;
        }
        thread::sleep(Duration::from_millis(50));
    }
    panic!("bgsave never completed within the test's budget");
}

#[test]
fn dump_file_survives_a_restart() {
    let dump_dir = tempfile::tempdir().expect("tempdir");
    let dir_path = dump_dir.path().to_string_lossy().into_owned();

    {
        let server = crate::integration_tests::common::spawn_server_with(|cfg| {
            cfg.dir = Some(dir_path.clone());
        });
        let mut conn = server.connect();
        roundtrip(&mut conn, "SET durable yes");
        roundtrip(&mut conn, "RPUSH L a");
        roundtrip(&mut conn, "RPUSH L b");
        roundtrip(&mut conn, "SADD S x");
        assert_eq!(roundtrip(&mut conn, "SAVE"), b"+OK\r\n");
    }

    let server = crate::integration_tests::common::spawn_server_with(|cfg| {
        cfg.dir = Some(dir_path.clone());
    });
    let mut conn = server.connect();
    assert_eq!(roundtrip(&mut conn, "GET durable"), b"yes\r\n");
    assert_eq!(roundtrip(&mut conn, "LRANGE L 0 10"), b"a b\r\n");
    assert_eq!(roundtrip(&mut conn, "SISMEMBER S x"), b"1\r\n");
}
