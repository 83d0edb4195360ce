// SPDX-License-Identifier: AGPL-3.0-or-later
// Copyright (C) 2012-2025 Andrei Maltsev

use std::collections::VecDeque;

use bytes::Bytes;

use crate::{
    context::ServerContext,
    net::{protocol::format_line, session::Session},
    replies,
    store::Value,
};

pub fn lpush(ctx: &mut ServerContext, session: &mut Session, argv: &[Bytes]) {
    let db = ctx.db_mut(session.db_index);
    let entry = db.entry_or_insert_with(argv[1].clone(), || Value::List(VecDeque::new()));
    match entry.as_list_mut() {
        Err(_) => session.enqueue_reply(replies::ERR_WRONGTYPE.clone()),
        Ok(list) => {
            list.push_front(argv[2].clone());
            session.enqueue_reply(replies::OK.clone());
        },
    }
}

pub fn rpush(ctx: &mut ServerContext, session: &mut Session, argv: &[Bytes]) {
    let db = ctx.db_mut(session.db_index);
    let entry = db.entry_or_insert_with(argv[1].clone(), || Value::List(VecDeque::new()));
    match entry.as_list_mut() {
        Err(_) => session.enqueue_reply(replies::ERR_WRONGTYPE.clone()),
        Ok(list) => {
            list.push_back(argv[2].clone());
            session.enqueue_reply(replies::OK.clone());
        },
    }
}

fn pop(ctx: &mut ServerContext, session: &mut Session, key: &Bytes, front: bool) {
    let db = ctx.db_mut(session.db_index);
    let Some(value) = db.get_mut(key) else {
        session.enqueue_reply(replies::NIL.clone());
        return;
    };
    let list = match value.as_list_mut() {
        Err(_) => {
            session.enqueue_reply(replies::ERR_WRONGTYPE.clone());
            return;
        },
        Ok(l) => l,
    };

    let popped = if front { list.pop_front() } else { list.pop_back() };
    if list.is_empty() {
        db.remove(key);
    }

    session.enqueue_reply(match popped {
        Some(v) => format_line(&v),
        None => replies::NIL.clone(),
    });
}

pub fn lpop(ctx: &mut ServerContext, session: &mut Session, argv: &[Bytes]) {
    pop(ctx, session, &argv[1], true);
}

pub fn rpop(ctx: &mut ServerContext, session: &mut Session, argv: &[Bytes]) {
    pop(ctx, session, &argv[1], false);
}

pub fn llen(ctx: &mut ServerContext, session: &mut Session, argv: &[Bytes]) {
    let db = ctx.db_mut(session.db_index);
    let reply = match db.get(&argv[1]) {
        None => replies::ZERO.clone(),
        Some(v) => match v.as_list() {
            Ok(l) => format_line(l.len().to_string().as_bytes()),
            Err(_) => replies::ERR_WRONGTYPE.clone(),
        },
    };
    session.enqueue_reply(reply);
}

/// Resolves a possibly-negative Redis-style index against `len`, clamping
/// rather than erroring (negative indices count from the tail, per the
/// original `linklist.py`'s `index()` helper).
fn resolve_index(raw: i64, len: usize) -> Option<usize> {
    let idx = if raw < 0 { raw + len as i64 } else { raw };
    if idx < 0 || idx as usize >= len { None } else { Some(idx as usize) }
}

fn parse_index(session: &mut Session, raw: &Bytes) -> Option<i64> {
    match std::str::from_utf8(raw).ok().and_then(|s| s.parse::<i64>().ok()) {
        Some(n) => Some(n),
        None => {
            session.enqueue_reply(replies::ERR_NOT_AN_INTEGER.clone());
            None
        },
    }
}

pub fn lindex(ctx: &mut ServerContext, session: &mut Session, argv: &[Bytes]) {
    let Some(raw) = parse_index(session, &argv[2]) else { return };
    let db = ctx.db_mut(session.db_index);
    let reply = match db.get(&argv[1]) {
        None => replies::NIL.clone(),
        Some(v) => match v.as_list() {
            Err(_) => replies::ERR_WRONGTYPE.clone(),
            Ok(list) => match resolve_index(raw, list.len()) {
                None => replies::NIL.clone(),
                Some(i) => format_line(&list[i]),
            },
        },
    };
    session.enqueue_reply(reply);
}

/// Clamps a half-open `[start, end)` range (Python-slice semantics, per
/// §9's resolution of the lrange/ltrim ambiguity) against `len`.
fn clamp_range(start: i64, end: i64, len: usize) -> (usize, usize) {
    let len_i = len as i64;
    let clamp = |mut v: i64| {
        if v < 0 {
            v += len_i;
        }
        v.clamp(0, len_i) as usize
    };
    let s = clamp(start);
    let e = clamp(end).max(s);
    (s, e)
}

pub fn lrange(ctx: &mut ServerContext, session: &mut Session, argv: &[Bytes]) {
    let Some(start) = parse_index(session, &argv[2]) else { return };
    let Some(end) = parse_index(session, &argv[3]) else { return };

    let db = ctx.db_mut(session.db_index);
    let reply = match db.get(&argv[1]) {
        None => replies::ZERO.clone(),
        Some(v) => match v.as_list() {
            Err(_) => replies::ERR_WRONGTYPE.clone(),
            Ok(list) => {
                let (s, e) = clamp_range(start, end, list.len());
                let mut out = Vec::new();
                for item in list.iter().take(e).skip(s) {
                    if !out.is_empty() {
                        out.push(b' ');
                    }
                    out.extend_from_slice(item);
                }
                if out.is_empty() && s >= e {
                    replies::ZERO.clone()
                } else {
                    format_line(&out)
                }
            },
        },
    };
    session.enqueue_reply(reply);
}

pub fn ltrim(ctx: &mut ServerContext, session: &mut Session, argv: &[Bytes]) {
    let Some(start) = parse_index(session, &argv[2]) else { return };
    let Some(end) = parse_index(session, &argv[3]) else { return };

    let db = ctx.db_mut(session.db_index);
    match db.get_mut(&argv[1]) {
        None => session.enqueue_reply(replies::OK.clone()),
        Some(v) => match v.as_list_mut() {
            Err(_) => session.enqueue_reply(replies::ERR_WRONGTYPE.clone()),
            Ok(list) => {
                let (s, e) = clamp_range(start, end, list.len());
                let trimmed: VecDeque<Bytes> = list.iter().take(e).skip(s).cloned().collect();
                *list = trimmed;
                if list.is_empty() {
                    db.remove(&argv[1]);
                }
                session.enqueue_reply(replies::OK.clone());
            },
        },
    }
}

pub fn lset(ctx: &mut ServerContext, session: &mut Session, argv: &[Bytes]) {
    let Some(raw) = parse_index(session, &argv[2]) else { return };
    let db = ctx.db_mut(session.db_index);
    match db.get_mut(&argv[1]) {
        None => session.enqueue_reply(replies::ERR_NO_SUCH_KEY.clone()),
        Some(v) => match v.as_list_mut() {
            Err(_) => session.enqueue_reply(replies::ERR_WRONGTYPE.clone()),
            Ok(list) => match resolve_index(raw, list.len()) {
                None => session.enqueue_reply(replies::ERR_INDEX_OUT_OF_RANGE.clone()),
                Some(i) => {
                    list[i] = argv[3].clone();
                    session.enqueue_reply(replies::OK.clone());
                },
            },
        },
    }
}

pub fn lrem(ctx: &mut ServerContext, session: &mut Session, argv: &[Bytes]) {
    let Some(count) = parse_index(session, &argv[2]) else { return };
    let target = &argv[3];

    let db = ctx.db_mut(session.db_index);
    let removed = match db.get_mut(&argv[1]) {
        None => 0,
        Some(v) => match v.as_list_mut() {
            Err(_) => {
                session.enqueue_reply(replies::ERR_WRONGTYPE.clone());
                return;
            },
            Ok(list) => {
                let n = remove_matches(list, target, count);
                if list.is_empty() {
                    db.remove(&argv[1]);
                }
                n
            },
        },
    };
    session.enqueue_reply(format_line(removed.to_string().as_bytes()));
}

/// `count > 0`: drop the first `count` matches head-to-tail. `count < 0`:
/// drop the last `count` matches tail-to-head. `count == 0`: drop all.
fn remove_matches(list: &mut VecDeque<Bytes>, target: &Bytes, count: i64) -> usize {
    if count == 0 {
        let before = list.len();
        list.retain(|v| v != target);
        return before - list.len();
    }

    let limit = count.unsigned_abs() as usize;
    let mut removed = 0;

    if count > 0 {
        let mut kept = VecDeque::with_capacity(list.len());
        for item in list.drain(..) {
            if removed < limit && item == *target {
                removed += 1;
            } else {
                kept.push_back(item);
            }
        }
        *list = kept;
    } else {
        let mut kept: VecDeque<Bytes> = VecDeque::with_capacity(list.len());
        for item in list.drain(..).rev() {
            if removed < limit && item == *target {
                removed += 1;
            } else {
                kept.push_front(item);
            }
        }
        *list = kept;
    }

    removed
}
