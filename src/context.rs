// SPDX-License-Identifier: AGPL-3.0-or-later
// Copyright (C) 2012-2025 Andrei Maltsev

use std::collections::HashMap;

use mio::Token;

use crate::{
    cfg::config::Config,
    net::{listener::Listener, session::Session},
    persistence::Snapshotter,
    store::{Database, Keyspace},
};

/// Process-scoped state shared by every command handler and by Cron. Owned
/// exclusively by the reactor thread — there is exactly one of these per
/// process, and it is never behind a lock.
pub struct ServerContext {
    pub config: Config,
    pub keyspace: Keyspace,
    pub snapshotter: Snapshotter,
    pub listener: Listener,
    pub sessions: HashMap<Token, Session>,
    /// Set by `shutdown` once its save has succeeded; the main loop checks
    /// this after every dispatch and exits the reactor when true.
    pub shutdown_requested: bool,
    pub exit_code: i32,
    /// Lifetime count of accepted connections, surfaced by Cron the way the
    /// prototype's `serverCron` printed `server.numconnection`.
    pub connections_accepted: u64,
}

impl ServerContext {
    pub fn new(
        config: Config,
        keyspace: Keyspace,
        snapshotter: Snapshotter,
        listener: Listener,
    ) -> Self {
        Self {
            config,
            keyspace,
            snapshotter,
            listener,
            sessions: HashMap::new(),
            shutdown_requested: false,
            exit_code: 0,
            connections_accepted: 0,
        }
    }

    /// Panics if `index` is out of range: callers must validate via `select`
    /// or the fixed keyspace size before reaching a handler.
    pub fn db_mut(&mut self, index: usize) -> &mut Database {
        self.keyspace.db_mut(index).expect("db_index must be in range by construction")
    }
}
