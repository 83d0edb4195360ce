// SPDX-License-Identifier: AGPL-3.0-or-later
// Copyright (C) 2012-2025 Andrei Maltsev

use std::collections::HashSet;

use bytes::Bytes;

use crate::{
    context::ServerContext,
    net::{protocol::format_line, session::Session},
    replies,
    store::Value,
};

/// Always replies `1\r\n` on a successful add, even when the member was
/// already present — unlike `srem`/`sismember`, `sadd`'s reply is not a
/// presence flag. Matches `pedis.py`'s `sadd`, which does
/// `server.addReply(c, shared.one)` unconditionally after the insert.
pub fn sadd(ctx: &mut ServerContext, session: &mut Session, argv: &[Bytes]) {
    let db = ctx.db_mut(session.db_index);
    let entry = db.entry_or_insert_with(argv[1].clone(), || Value::Set(HashSet::new()));
    match entry.as_set_mut() {
        Err(_) => session.enqueue_reply(replies::ERR_WRONGTYPE.clone()),
        Ok(set) => {
            set.insert(argv[2].clone());
            session.enqueue_reply(replies::ONE.clone());
        },
    }
}

pub fn srem(ctx: &mut ServerContext, session: &mut Session, argv: &[Bytes]) {
    let db = ctx.db_mut(session.db_index);
    let Some(value) = db.get_mut(&argv[1]) else {
        session.enqueue_reply(replies::ZERO.clone());
        return;
    };
    match value.as_set_mut() {
        Err(_) => session.enqueue_reply(replies::ERR_WRONGTYPE.clone()),
        Ok(set) => {
            let removed = set.remove(&argv[2]);
            if set.is_empty() {
                db.remove(&argv[1]);
            }
            session.enqueue_reply(if removed { replies::ONE.clone() } else { replies::ZERO.clone() });
        },
    }
}

pub fn scard(ctx: &mut ServerContext, session: &mut Session, argv: &[Bytes]) {
    let db = ctx.db_mut(session.db_index);
    let reply = match db.get(&argv[1]) {
        None => replies::ZERO.clone(),
        Some(v) => match v.as_set() {
            Ok(s) => format_line(s.len().to_string().as_bytes()),
            Err(_) => replies::ERR_WRONGTYPE.clone(),
        },
    };
    session.enqueue_reply(reply);
}

pub fn sismember(ctx: &mut ServerContext, session: &mut Session, argv: &[Bytes]) {
    let db = ctx.db_mut(session.db_index);
    let reply = match db.get(&argv[1]) {
        None => replies::ZERO.clone(),
        Some(v) => match v.as_set() {
            Err(_) => replies::ERR_WRONGTYPE.clone(),
            Ok(s) => {
                if s.contains(&argv[2]) {
                    replies::ONE.clone()
                } else {
                    replies::ZERO.clone()
                }
            },
        },
    };
    session.enqueue_reply(reply);
}

fn intersect_all(db: &crate::store::Database, keys: &[Bytes]) -> Result<HashSet<Bytes>, Bytes> {
    let mut iter = keys.iter();
    let first_key = iter.next().expect("sinter requires at least one key");

    let Some(first) = db.get(first_key) else { return Err(replies::ERR_NO_SUCH_KEY.clone()) };
    let Ok(first_set) = first.as_set() else { return Err(replies::ERR_WRONGTYPE.clone()) };
    let mut acc = first_set.clone();

    for key in iter {
        let Some(v) = db.get(key) else { return Err(replies::ERR_NO_SUCH_KEY.clone()) };
        let Ok(set) = v.as_set() else { return Err(replies::ERR_WRONGTYPE.clone()) };
        acc.retain(|m| set.contains(m));
    }

    Ok(acc)
}

pub fn sinter(ctx: &mut ServerContext, session: &mut Session, argv: &[Bytes]) {
    let db = ctx.db_mut(session.db_index);
    match intersect_all(db, &argv[1..]) {
        Err(reply) => session.enqueue_reply(reply),
        Ok(members) => session.enqueue_reply(format_members(&members)),
    }
}

/// Replies `+OK\r\n` after storing, not the result cardinality: matches
/// `_sinterGeneric`'s `dstkey` branch in `pedis.py`, which calls
/// `server.addReply(c, shared.ok)` once the intersection is stored.
pub fn sinterstore(ctx: &mut ServerContext, session: &mut Session, argv: &[Bytes]) {
    let db = ctx.db_mut(session.db_index);
    match intersect_all(db, &argv[2..]) {
        Err(reply) => session.enqueue_reply(reply),
        Ok(members) => {
            db.set(argv[1].clone(), Value::Set(members));
            session.enqueue_reply(replies::OK.clone());
        },
    }
}

pub fn smembers(ctx: &mut ServerContext, session: &mut Session, argv: &[Bytes]) {
    let db = ctx.db_mut(session.db_index);
    let reply = match db.get(&argv[1]) {
        None => replies::ZERO.clone(),
        Some(v) => match v.as_set() {
            Err(_) => replies::ERR_WRONGTYPE.clone(),
            Ok(s) => format_members(s),
        },
    };
    session.enqueue_reply(reply);
}

fn format_members(members: &HashSet<Bytes>) -> Bytes {
    if members.is_empty() {
        return replies::ZERO.clone();
    }
    let mut out = Vec::new();
    for (i, m) in members.iter().enumerate() {
        if i > 0 {
            out.push(b' ');
        }
        out.extend_from_slice(m);
    }
    format_line(&out)
}
