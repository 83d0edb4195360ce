// SPDX-License-Identifier: AGPL-3.0-or-later
// Copyright (C) 2012-2025 Andrei Maltsev

use std::collections::HashMap;

use bytes::Bytes;
use once_cell::sync::Lazy;

use crate::{
    commands::{admin, lists, sets, strings},
    context::ServerContext,
    net::protocol::{Arity, ArityLookup, CommandKind},
    net::session::Session,
    replies,
};

/// Uniform handler signature: a handler's only channel back to the client is
/// the session's reply queue, so it never returns a `Result` — every
/// failure mode is translated into a documented reply sentinel inline.
pub type Handler = fn(&mut ServerContext, &mut Session, &[Bytes]);

#[derive(Clone, Copy)]
pub struct CommandSpec {
    pub name: &'static str,
    /// Argc including the command token itself; exact for most commands,
    /// a floor for the handful that take a variable number of keys.
    pub arity: Arity,
    pub kind: CommandKind,
    pub handler: Handler,
}

/// Declarative, immutable-after-startup table mapping command name to its
/// handler record. Replaces the teacher's per-PDU decorator dispatch with a
/// single static map, per the spec's registration redesign note.
pub struct CommandRegistry {
    table: HashMap<&'static str, CommandSpec>,
}

macro_rules! spec {
    ($name:literal, $arity:expr, $kind:expr, $handler:expr) => {
        CommandSpec { name: $name, arity: $arity, kind: $kind, handler: $handler }
    };
}

pub static REGISTRY: Lazy<CommandRegistry> = Lazy::new(|| {
    use Arity::{AtLeast, Exact};
    use CommandKind::{Bulk, Inline};

    let specs = [
        // strings
        spec!("ping", Exact(1), Inline, strings::ping),
        spec!("echo", Exact(2), Bulk, strings::echo),
        spec!("set", Exact(3), Bulk, strings::set),
        spec!("setnx", Exact(3), Bulk, strings::setnx),
        spec!("get", Exact(2), Inline, strings::get),
        spec!("exists", Exact(2), Inline, strings::exists),
        spec!("del", Exact(2), Inline, strings::del),
        spec!("incr", Exact(2), Inline, strings::incr),
        spec!("decr", Exact(2), Inline, strings::decr),
        spec!("incrby", Exact(3), Inline, strings::incrby),
        spec!("decrby", Exact(3), Inline, strings::decrby),
        spec!("keys", Exact(2), Inline, strings::keys),
        spec!("randomkey", Exact(1), Inline, strings::randomkey),
        spec!("rename", Exact(3), Inline, strings::rename),
        spec!("renamenx", Exact(3), Inline, strings::renamenx),
        // lists
        spec!("lpush", Exact(3), Bulk, lists::lpush),
        spec!("rpush", Exact(3), Bulk, lists::rpush),
        spec!("lpop", Exact(2), Inline, lists::lpop),
        spec!("rpop", Exact(2), Inline, lists::rpop),
        spec!("llen", Exact(2), Inline, lists::llen),
        spec!("lindex", Exact(3), Inline, lists::lindex),
        spec!("lrange", Exact(4), Inline, lists::lrange),
        spec!("ltrim", Exact(4), Bulk, lists::ltrim),
        spec!("lset", Exact(4), Bulk, lists::lset),
        spec!("lrem", Exact(4), Bulk, lists::lrem),
        // sets
        spec!("sadd", Exact(3), Bulk, sets::sadd),
        spec!("srem", Exact(3), Bulk, sets::srem),
        spec!("scard", Exact(2), Inline, sets::scard),
        spec!("sismember", Exact(3), Bulk, sets::sismember),
        spec!("sinter", AtLeast(2), Inline, sets::sinter),
        spec!("sinterstore", AtLeast(3), Inline, sets::sinterstore),
        spec!("smembers", Exact(2), Inline, sets::smembers),
        // admin
        spec!("select", Exact(2), Inline, admin::select),
        spec!("dbsize", Exact(1), Inline, admin::dbsize),
        spec!("move", Exact(3), Inline, admin::move_key),
        spec!("flushdb", Exact(1), Inline, admin::flushdb),
        spec!("flushall", Exact(1), Inline, admin::flushall),
        spec!("save", Exact(1), Inline, admin::save),
        spec!("bgsave", Exact(1), Inline, admin::bgsave),
        spec!("lastsave", Exact(1), Inline, admin::lastsave),
        spec!("shutdown", Exact(1), Inline, admin::shutdown),
        spec!("quit", Exact(1), Inline, admin::quit),
    ];

    let table = specs.into_iter().map(|s| (s.name, s)).collect();
    CommandRegistry { table }
});

impl CommandRegistry {
    pub fn get(&self, name: &str) -> Option<&CommandSpec> {
        self.table.get(name)
    }

    /// Looks up and runs the handler for one parsed command, applying the
    /// unknown-command and arity checks the spec assigns to dispatch (as
    /// opposed to the wire codec, which only needs kind/arity to frame bulk
    /// tails).
    pub fn dispatch(&self, ctx: &mut ServerContext, session: &mut Session, argv: &[Bytes]) {
        let Some(name) = argv.first().and_then(|b| std::str::from_utf8(b).ok()) else {
            session.enqueue_reply(replies::ERR_UNKNOWN_COMMAND.clone());
            return;
        };
        let name = name.to_ascii_lowercase();

        let Some(spec) = self.table.get(name.as_str()) else {
            session.enqueue_reply(replies::ERR_UNKNOWN_COMMAND.clone());
            return;
        };

        if !spec.arity.matches(argv.len()) {
            session.enqueue_reply(replies::ERR_WRONG_ARITY.clone());
            return;
        }

        (spec.handler)(ctx, session, argv);
    }
}

impl ArityLookup for CommandRegistry {
    fn lookup(&self, name: &[u8]) -> Option<(Arity, CommandKind)> {
        let name = std::str::from_utf8(name).ok()?.to_ascii_lowercase();
        self.table.get(name.as_str()).map(|s| (s.arity, s.kind))
    }
}
