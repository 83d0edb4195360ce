// SPDX-License-Identifier: AGPL-3.0-or-later
// Copyright (C) 2012-2025 Andrei Maltsev

use bytes::Bytes;
use rand::seq::IteratorRandom;

use crate::{
    context::ServerContext,
    glob,
    net::{
        protocol::{format_bulk, format_line},
        session::Session,
    },
    replies,
    store::Value,
};

pub fn ping(_ctx: &mut ServerContext, session: &mut Session, _argv: &[Bytes]) {
    session.enqueue_reply(replies::PONG.clone());
}

/// Replies in bulk form, not as a plain line: an echoed payload is a binary
/// string and may itself contain a `\r\n`.
pub fn echo(_ctx: &mut ServerContext, session: &mut Session, argv: &[Bytes]) {
    session.enqueue_reply(format_bulk(&argv[1]));
}

pub fn set(ctx: &mut ServerContext, session: &mut Session, argv: &[Bytes]) {
    let db = ctx.db_mut(session.db_index);
    db.set(argv[1].clone(), Value::String(argv[2].clone()));
    session.enqueue_reply(replies::OK.clone());
}

pub fn setnx(ctx: &mut ServerContext, session: &mut Session, argv: &[Bytes]) {
    let db = ctx.db_mut(session.db_index);
    let inserted = db.set_nx(argv[1].clone(), Value::String(argv[2].clone()));
    session.enqueue_reply(if inserted { replies::ONE.clone() } else { replies::ZERO.clone() });
}

pub fn get(ctx: &mut ServerContext, session: &mut Session, argv: &[Bytes]) {
    let db = ctx.db_mut(session.db_index);
    let reply = match db.get(&argv[1]) {
        None => replies::NIL.clone(),
        Some(v) => match v.as_string() {
            Ok(s) => format_line(s),
            Err(_) => replies::ERR_WRONGTYPE.clone(),
        },
    };
    session.enqueue_reply(reply);
}

pub fn exists(ctx: &mut ServerContext, session: &mut Session, argv: &[Bytes]) {
    let db = ctx.db_mut(session.db_index);
    let reply = if db.contains(&argv[1]) { replies::ONE.clone() } else { replies::ZERO.clone() };
    session.enqueue_reply(reply);
}

pub fn del(ctx: &mut ServerContext, session: &mut Session, argv: &[Bytes]) {
    let db = ctx.db_mut(session.db_index);
    let reply = if db.remove(&argv[1]).is_some() { replies::ONE.clone() } else { replies::ZERO.clone() };
    session.enqueue_reply(reply);
}

/// A non-integer existing value (or a value that would overflow) is left
/// untouched and replies `0\r\n`, matching `_incrDecr`'s
/// `except ValueError: rv = 0` fallback, not a dedicated error reply.
fn incr_decr(ctx: &mut ServerContext, session: &mut Session, key: &Bytes, delta: i64) {
    let db = ctx.db_mut(session.db_index);

    let current: i64 = match db.get(key) {
        None => 0,
        Some(v) => match v.as_string() {
            Err(_) => {
                session.enqueue_reply(replies::ERR_WRONGTYPE.clone());
                return;
            },
            Ok(s) => match std::str::from_utf8(s).ok().and_then(|s| s.parse::<i64>().ok()) {
                Some(n) => n,
                None => {
                    session.enqueue_reply(replies::ZERO.clone());
                    return;
                },
            },
        },
    };

    let Some(next) = current.checked_add(delta) else {
        session.enqueue_reply(replies::ZERO.clone());
        return;
    };

    db.set(key.clone(), Value::String(Bytes::from(next.to_string())));
    session.enqueue_reply(format_line(next.to_string().as_bytes()));
}

pub fn incr(ctx: &mut ServerContext, session: &mut Session, argv: &[Bytes]) {
    incr_decr(ctx, session, &argv[1], 1);
}

pub fn decr(ctx: &mut ServerContext, session: &mut Session, argv: &[Bytes]) {
    incr_decr(ctx, session, &argv[1], -1);
}

/// A malformed delta argument is treated as `0`, matching `incrby`/`decrby`'s
/// `except ValueError: x = 0` fallback rather than an error reply.
fn parse_delta(raw: &Bytes) -> i64 {
    std::str::from_utf8(raw).ok().and_then(|s| s.parse::<i64>().ok()).unwrap_or(0)
}

pub fn incrby(ctx: &mut ServerContext, session: &mut Session, argv: &[Bytes]) {
    let delta = parse_delta(&argv[2]);
    incr_decr(ctx, session, &argv[1], delta);
}

pub fn decrby(ctx: &mut ServerContext, session: &mut Session, argv: &[Bytes]) {
    let delta = parse_delta(&argv[2]);
    incr_decr(ctx, session, &argv[1], delta.wrapping_neg());
}

pub fn keys(ctx: &mut ServerContext, session: &mut Session, argv: &[Bytes]) {
    let db = ctx.db_mut(session.db_index);
    let pattern = &argv[1];

    let matched: Vec<&[u8]> =
        db.keys().map(|k| k.as_ref()).filter(|k| glob::matches(pattern, k)).collect();

    let reply = if matched.is_empty() {
        replies::ZERO.clone()
    } else {
        let mut joined = Vec::with_capacity(matched.iter().map(|k| k.len() + 1).sum());
        for (i, k) in matched.iter().enumerate() {
            if i > 0 {
                joined.push(b' ');
            }
            joined.extend_from_slice(k);
        }
        format_line(&joined)
    };
    session.enqueue_reply(reply);
}

pub fn randomkey(ctx: &mut ServerContext, session: &mut Session, _argv: &[Bytes]) {
    let db = ctx.db_mut(session.db_index);
    let mut rng = rand::rng();
    let reply = match db.keys().choose(&mut rng) {
        Some(k) => format_line(k),
        None => replies::NIL.clone(),
    };
    session.enqueue_reply(reply);
}

/// Shared by `rename`/`renamenx`: `nx` refuses to clobber an existing
/// destination, replying `1\r\n` without touching either key, matching
/// `_renameGeneric`. A successful rename (destination clear, source
/// present) replies `+OK\r\n`; a missing source key replies `0\r\n`, not
/// an error.
fn rename_generic(ctx: &mut ServerContext, session: &mut Session, argv: &[Bytes], nx: bool) {
    let db = ctx.db_mut(session.db_index);

    if nx && db.contains(&argv[2]) {
        session.enqueue_reply(replies::ONE.clone());
        return;
    }

    match db.remove(&argv[1]) {
        None => session.enqueue_reply(replies::ZERO.clone()),
        Some(v) => {
            db.set(argv[2].clone(), v);
            session.enqueue_reply(replies::OK.clone());
        },
    }
}

pub fn rename(ctx: &mut ServerContext, session: &mut Session, argv: &[Bytes]) {
    rename_generic(ctx, session, argv, false);
}

pub fn renamenx(ctx: &mut ServerContext, session: &mut Session, argv: &[Bytes]) {
    rename_generic(ctx, session, argv, true);
}
