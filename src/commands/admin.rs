// SPDX-License-Identifier: AGPL-3.0-or-later
// Copyright (C) 2012-2025 Andrei Maltsev

use bytes::Bytes;

use crate::{context::ServerContext, net::{protocol::format_line, session::Session}, replies};

pub fn select(ctx: &mut ServerContext, session: &mut Session, argv: &[Bytes]) {
    let Ok(index) = std::str::from_utf8(&argv[1]).unwrap_or("").parse::<usize>() else {
        session.enqueue_reply(replies::ERR_INVALID_DB_INDEX.clone());
        return;
    };
    if index >= ctx.keyspace.len() {
        session.enqueue_reply(replies::ERR_INVALID_DB_INDEX.clone());
        return;
    }
    session.db_index = index;
    session.enqueue_reply(replies::OK.clone());
}

pub fn dbsize(ctx: &mut ServerContext, session: &mut Session, _argv: &[Bytes]) {
    let db = ctx.db_mut(session.db_index);
    session.enqueue_reply(format_line(db.len().to_string().as_bytes()));
}

pub fn move_key(ctx: &mut ServerContext, session: &mut Session, argv: &[Bytes]) {
    let Ok(target) = std::str::from_utf8(&argv[2]).unwrap_or("").parse::<usize>() else {
        session.enqueue_reply(replies::ERR_INVALID_DB_INDEX.clone());
        return;
    };
    if target >= ctx.keyspace.len() {
        session.enqueue_reply(replies::ERR_INVALID_DB_INDEX.clone());
        return;
    }
    if target == session.db_index {
        session.enqueue_reply(replies::ZERO.clone());
        return;
    }

    let Some(value) = ctx.db_mut(session.db_index).get(&argv[1]).cloned() else {
        session.enqueue_reply(replies::ZERO.clone());
        return;
    };

    if ctx.keyspace.db(target).expect("validated above").contains(&argv[1]) {
        session.enqueue_reply(replies::ZERO.clone());
        return;
    }

    ctx.db_mut(session.db_index).remove(&argv[1]);
    ctx.db_mut(target).set(argv[1].clone(), value);
    session.enqueue_reply(replies::ONE.clone());
}

pub fn flushdb(ctx: &mut ServerContext, session: &mut Session, _argv: &[Bytes]) {
    ctx.db_mut(session.db_index).clear();
    session.enqueue_reply(replies::OK.clone());
}

pub fn flushall(ctx: &mut ServerContext, session: &mut Session, _argv: &[Bytes]) {
    ctx.keyspace.flush_all();
    session.enqueue_reply(replies::OK.clone());
}

pub fn save(ctx: &mut ServerContext, session: &mut Session, _argv: &[Bytes]) {
    match ctx.snapshotter.save(&ctx.keyspace) {
        Ok(()) => session.enqueue_reply(replies::OK.clone()),
        Err(e) => {
            tracing::error!(error = %e, "save failed");
            session.enqueue_reply(replies::ERR_SAVE_FAILED.clone());
        },
    }
}

pub fn bgsave(ctx: &mut ServerContext, session: &mut Session, _argv: &[Bytes]) {
    if ctx.snapshotter.bgsave_in_progress() {
        session.enqueue_reply(replies::ERR_BGSAVE_IN_PROGRESS.clone());
        return;
    }
    match ctx.snapshotter.bgsave(&ctx.keyspace) {
        Ok(()) => session.enqueue_reply(replies::OK.clone()),
        Err(e) => {
            tracing::error!(error = %e, "bgsave failed to start");
            session.enqueue_reply(replies::ERR_SAVE_FAILED.clone());
        },
    }
}

pub fn lastsave(ctx: &mut ServerContext, session: &mut Session, _argv: &[Bytes]) {
    session.enqueue_reply(format_line(ctx.snapshotter.lastsave().to_string().as_bytes()));
}

pub fn shutdown(ctx: &mut ServerContext, session: &mut Session, _argv: &[Bytes]) {
    match ctx.snapshotter.save(&ctx.keyspace) {
        Ok(()) => {
            ctx.shutdown_requested = true;
            ctx.exit_code = 0;
        },
        Err(e) => {
            tracing::error!(error = %e, "shutdown save failed");
            session.enqueue_reply(replies::ERR_SHUTDOWN_SAVE_FAILED.clone());
        },
    }
}

pub fn quit(_ctx: &mut ServerContext, session: &mut Session, _argv: &[Bytes]) {
    session.enqueue_reply(replies::OK.clone());
    session.begin_closing();
}
