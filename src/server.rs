// SPDX-License-Identifier: AGPL-3.0-or-later
// Copyright (C) 2012-2025 Andrei Maltsev

//! Wires the reactor, listener, keyspace, and command registry into a
//! running server. This is the only module that knows about all four at
//! once; everything else talks through `ServerContext`.

use std::{net::SocketAddr, path::PathBuf};

use anyhow::{Context, Result};
use mio::Token;
use tracing::{info, warn};

use crate::{
    cfg::config::Config,
    commands::REGISTRY,
    context::ServerContext,
    cron,
    net::{
        listener::Listener,
        protocol::ParseOutcome,
        session::{Session, SessionState},
    },
    persistence::{DEFAULT_DUMP_FILE, Snapshotter},
    reactor::{FileEventMask, Reactor},
};

/// Binds the listener, loads the keyspace from disk, and runs the reactor
/// loop until a `shutdown` command flips `ctx.shutdown_requested`. Returns
/// the process exit code the caller should use.
pub fn run(config: Config) -> Result<i32> {
    run_inner(config, None)
}

/// Like `run`, but reports the actual bound port over `port_tx` once the
/// listener is up. Lets tests bind to an OS-assigned port (`config.port ==
/// 0`) instead of racing over a fixed one.
pub fn run_reporting_port(config: Config, port_tx: std::sync::mpsc::Sender<u16>) -> Result<i32> {
    run_inner(config, Some(port_tx))
}

fn run_inner(config: Config, port_tx: Option<std::sync::mpsc::Sender<u16>>) -> Result<i32> {
    let dump_path = dump_path_for(&config);
    let keyspace = Snapshotter::load_or_default(&dump_path, config.databases)
        .context("failed to load snapshot")?;
    let snapshotter = Snapshotter::new(dump_path);

    let addr: SocketAddr = ([127, 0, 0, 1], config.port).into();
    let mut reactor: Reactor<ServerContext> =
        Reactor::new().context("failed to create reactor")?;

    let listener_token = reactor.alloc_token();
    let mut listener = Listener::bind(addr, listener_token)
        .with_context(|| format!("failed to bind {addr}"))?;
    let bound_addr = listener.inner.local_addr().context("failed to read bound address")?;
    reactor
        .register_file(
            &mut listener.inner,
            listener_token,
            FileEventMask::READABLE,
            Box::new(listener_callback),
        )
        .context("failed to register listener")?;

    let mut ctx = ServerContext::new(config, keyspace, snapshotter, listener);
    cron::start(&mut reactor);

    info!(addr = %bound_addr, databases = ctx.keyspace.len(), "pedis listening");
    if let Some(tx) = port_tx {
        let _ = tx.send(bound_addr.port());
    }

    loop {
        reactor.run_once(&mut ctx).context("reactor iteration failed")?;
        if ctx.shutdown_requested {
            break;
        }
    }

    info!(exit_code = ctx.exit_code, "pedis shutting down");
    Ok(ctx.exit_code)
}

fn dump_path_for(config: &Config) -> PathBuf {
    let dir = config.dir.as_deref().unwrap_or(".");
    PathBuf::from(dir).join(DEFAULT_DUMP_FILE)
}

/// Accepts every pending connection and registers a session for each. A
/// single listener wakeup can carry more than one waiting peer.
fn listener_callback(
    ctx: &mut ServerContext,
    reactor: &mut Reactor<ServerContext>,
    _token: Token,
    _mask: FileEventMask,
) {
    let pairs = match ctx.listener.accept_all() {
        Ok(pairs) => pairs,
        Err(e) => {
            warn!(error = %e, "accept failed");
            return;
        },
    };

    for (mut stream, peer_addr) in pairs {
        let token = reactor.alloc_token();
        if let Err(e) = reactor.register_file(
            &mut stream,
            token,
            FileEventMask::READABLE,
            Box::new(session_callback),
        ) {
            warn!(?token, error = %e, "failed to register new session");
            continue;
        }

        ctx.connections_accepted += 1;
        info!(?token, %peer_addr, "accepted connection");
        ctx.sessions.insert(token, Session::new(token, stream, peer_addr));
    }
}

/// Dispatch point for every session socket event: reads and parses on
/// READABLE, flushes queued replies on WRITABLE, drops the session on a
/// hangup/error.
fn session_callback(
    ctx: &mut ServerContext,
    reactor: &mut Reactor<ServerContext>,
    token: Token,
    mask: FileEventMask,
) {
    if mask.contains(FileEventMask::EXCEPTION) {
        drop_session(ctx, reactor, token);
        return;
    }
    if mask.contains(FileEventMask::READABLE) {
        handle_readable(ctx, reactor, token);
        if !ctx.sessions.contains_key(&token) {
            return;
        }
    }
    if mask.contains(FileEventMask::WRITABLE) {
        handle_writable(ctx, reactor, token);
    }
}

fn handle_readable(ctx: &mut ServerContext, reactor: &mut Reactor<ServerContext>, token: Token) {
    let Some(session) = ctx.sessions.get_mut(&token) else { return };
    let (_, eof) = match session.read_available() {
        Ok(pair) => pair,
        Err(e) => {
            warn!(?token, error = %e, "session read failed");
            drop_session(ctx, reactor, token);
            return;
        },
    };

    loop {
        let Some(session) = ctx.sessions.get_mut(&token) else { return };
        match session.next_command(&*REGISTRY) {
            ParseOutcome::NeedMore => break,
            ParseOutcome::Command(argv) => {
                // The handler needs `&mut ServerContext` and `&mut Session`
                // at once; since the session lives inside `ctx.sessions`,
                // pull it out for the call and put it back afterward.
                let Some(mut session) = ctx.sessions.remove(&token) else { return };
                REGISTRY.dispatch(ctx, &mut session, &argv);
                ctx.sessions.insert(token, session);
            },
            ParseOutcome::ProtocolError(reason) => {
                warn!(?token, reason, "protocol error, closing session");
                drop_session(ctx, reactor, token);
                return;
            },
        }
    }

    if eof && let Some(session) = ctx.sessions.get_mut(&token) {
        session.begin_closing();
    }

    rearm(ctx, reactor, token);
}

fn handle_writable(ctx: &mut ServerContext, reactor: &mut Reactor<ServerContext>, token: Token) {
    let Some(session) = ctx.sessions.get_mut(&token) else { return };
    if let Err(e) = session.flush_writes() {
        warn!(?token, error = %e, "session write failed");
        drop_session(ctx, reactor, token);
        return;
    }
    rearm(ctx, reactor, token);
}

/// Closes the session if it has nothing left to send and wants to close (EOF
/// seen or a command like `quit`/`shutdown` asked for it), or a misbehaving
/// peer has piled up too much unsent output. Otherwise brings the
/// registered interest in line with whether a reply is still queued.
fn rearm(ctx: &mut ServerContext, reactor: &mut Reactor<ServerContext>, token: Token) {
    let Some(session) = ctx.sessions.get(&token) else { return };

    if session.overflowed() {
        warn!(?token, "pending write buffer exceeded cap, disconnecting");
        drop_session(ctx, reactor, token);
        return;
    }

    let wants_close = session.state == SessionState::Closing;
    let has_pending = session.has_pending_write();

    if wants_close && !has_pending {
        drop_session(ctx, reactor, token);
        return;
    }

    let mut mask = FileEventMask::READABLE;
    if has_pending {
        mask |= FileEventMask::WRITABLE;
    }

    let Some(session) = ctx.sessions.get_mut(&token) else { return };
    if let Err(e) =
        reactor.reregister_file(&mut session.stream, token, mask, Box::new(session_callback))
    {
        warn!(?token, error = %e, "failed to reregister session interest");
    }
}

fn drop_session(ctx: &mut ServerContext, reactor: &mut Reactor<ServerContext>, token: Token) {
    if let Some(mut session) = ctx.sessions.remove(&token) {
        session.close();
        let _ = reactor.unregister_file(&mut session.stream, token);
        info!(?token, peer = %session.peer_addr, "session closed");
    }
}
