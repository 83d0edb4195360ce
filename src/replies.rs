// SPDX-License-Identifier: AGPL-3.0-or-later
// Copyright (C) 2012-2025 Andrei Maltsev

//! Shared reply-sentinel constants, mirroring the prototype's `SharedObjects`
//! table so every handler reuses one `Bytes` for the common cases instead of
//! allocating a fresh line each time.

use bytes::Bytes;
use once_cell::sync::Lazy;

pub static OK: Lazy<Bytes> = Lazy::new(|| Bytes::from_static(b"+OK\r\n"));
pub static PONG: Lazy<Bytes> = Lazy::new(|| Bytes::from_static(b"+PONG\r\n"));
pub static NIL: Lazy<Bytes> = Lazy::new(|| Bytes::from_static(b"nil\r\n"));
pub static ONE: Lazy<Bytes> = Lazy::new(|| Bytes::from_static(b"1\r\n"));
pub static ZERO: Lazy<Bytes> = Lazy::new(|| Bytes::from_static(b"0\r\n"));

pub static ERR_UNKNOWN_COMMAND: Lazy<Bytes> =
    Lazy::new(|| Bytes::from_static(b"-ERR unknown command\r\n"));
pub static ERR_WRONG_ARITY: Lazy<Bytes> =
    Lazy::new(|| Bytes::from_static(b"-ERR wrong number of arguments\r\n"));
pub static ERR_WRONGTYPE: Lazy<Bytes> = Lazy::new(|| {
    Bytes::from_static(b"-ERR WRONGTYPE Operation against a key holding the wrong kind of value\r\n")
});
pub static ERR_INVALID_DB_INDEX: Lazy<Bytes> =
    Lazy::new(|| Bytes::from_static(b"-ERR invalid DB index\r\n"));
pub static ERR_INDEX_OUT_OF_RANGE: Lazy<Bytes> =
    Lazy::new(|| Bytes::from_static(b"-ERR index out of range\r\n"));
pub static ERR_NOT_AN_INTEGER: Lazy<Bytes> =
    Lazy::new(|| Bytes::from_static(b"-ERR value is not an integer or out of range\r\n"));
pub static ERR_NO_SUCH_KEY: Lazy<Bytes> = Lazy::new(|| Bytes::from_static(b"-ERR no such key\r\n"));
pub static ERR_BGSAVE_IN_PROGRESS: Lazy<Bytes> = Lazy::new(|| {
    Bytes::from_static(b"-ERR background save already in progress\r\n")
});
pub static ERR_SAVE_FAILED: Lazy<Bytes> = Lazy::new(|| Bytes::from_static(b"-ERR\r\n"));
pub static ERR_SHUTDOWN_SAVE_FAILED: Lazy<Bytes> = Lazy::new(|| {
    Bytes::from_static(b"-ERR can't quit, problems saving the DB\r\n")
});

/// Formats a generic `-ERR <message>\r\n` reply for cases not covered by a
/// shared constant above.
pub fn err(message: &str) -> Bytes {
    Bytes::from(format!("-ERR {message}\r\n"))
}
