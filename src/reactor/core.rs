// SPDX-License-Identifier: AGPL-3.0-or-later
// Copyright (C) 2012-2025 Andrei Maltsev

use std::{collections::HashMap, io, time::Duration};

use mio::{Events, Poll, Registry, Token, event::Source};
use tracing::{trace, warn};

use crate::reactor::{
    mask::FileEventMask,
    timer::{Rearm, TimerId, TimerQueue},
};

/// Callback invoked when a registered file descriptor becomes ready. The
/// mask reflects which of the registered interests actually fired; the
/// reactor and the fired token are passed back in so the callback can
/// re-register (e.g. to toggle WRITABLE) or unregister itself.
pub type FileCallback<Ctx> = Box<dyn FnMut(&mut Ctx, &mut Reactor<Ctx>, Token, FileEventMask)>;

struct FileEntry<Ctx> {
    mask: FileEventMask,
    callback: FileCallback<Ctx>,
}

/// Single-threaded multiplexer over file-descriptor readiness and timers,
/// modeled directly on the select()-based reactor this crate's prototype
/// used: one poll call per iteration, ready fds dispatched, then due timers
/// swept and optionally re-armed.
pub struct Reactor<Ctx> {
    poll: Poll,
    events_buf: Events,
    file_events: HashMap<Token, FileEntry<Ctx>>,
    timers: TimerQueue<Ctx>,
    next_token: usize,
    stop_flag: bool,
    /// The token currently being dispatched, if any, and whether
    /// `unregister_file` was called for it during this callback. Lets
    /// `run_once` tell "callback unregistered this token" apart from
    /// "callback left the registration alone" — both leave the token
    /// vacant in `file_events` the instant `unregister_file` runs, but
    /// only the former must not be resurrected after the callback returns.
    dispatching: Option<Token>,
    dispatch_unregistered: bool,
}

impl<Ctx> Reactor<Ctx> {
    pub fn new() -> io::Result<Self> {
        Ok(Self {
            poll: Poll::new()?,
            events_buf: Events::with_capacity(1024),
            file_events: HashMap::new(),
            timers: TimerQueue::default(),
            next_token: 0,
            stop_flag: false,
            dispatching: None,
            dispatch_unregistered: false,
        })
    }

    /// The mio `Registry` owners of sources (listeners, sessions) register
    /// their raw sources against, using a token obtained from
    /// [`Reactor::alloc_token`].
    pub fn registry(&self) -> &Registry {
        self.poll.registry()
    }

    pub fn alloc_token(&mut self) -> Token {
        let t = Token(self.next_token);
        self.next_token += 1;
        t
    }

    /// Registers `source` for `mask` under `token` and attaches `callback`.
    /// Replaces any previously registered callback for the same token.
    pub fn register_file<S: Source>(
        &mut self,
        source: &mut S,
        token: Token,
        mask: FileEventMask,
        callback: FileCallback<Ctx>,
    ) -> io::Result<()> {
        let interest = mask
            .to_mio_interest()
            .ok_or_else(|| io::Error::other("empty file event mask"))?;
        self.poll.registry().register(source, token, interest)?;
        self.file_events.insert(token, FileEntry { mask, callback });
        if self.dispatching == Some(token) {
            self.dispatch_unregistered = false;
        }
        Ok(())
    }

    /// Changes the interest mask for an already-registered source (e.g.
    /// turning WRITABLE on when a reply is queued, off once drained).
    pub fn reregister_file<S: Source>(
        &mut self,
        source: &mut S,
        token: Token,
        mask: FileEventMask,
        callback: FileCallback<Ctx>,
    ) -> io::Result<()> {
        let interest = mask
            .to_mio_interest()
            .ok_or_else(|| io::Error::other("empty file event mask"))?;
        self.poll.registry().reregister(source, token, interest)?;
        self.file_events.insert(token, FileEntry { mask, callback });
        if self.dispatching == Some(token) {
            self.dispatch_unregistered = false;
        }
        Ok(())
    }

    pub fn unregister_file<S: Source>(&mut self, source: &mut S, token: Token) -> io::Result<()> {
        self.file_events.remove(&token);
        if self.dispatching == Some(token) {
            self.dispatch_unregistered = true;
        }
        self.poll.registry().deregister(source)
    }

    pub fn schedule_timer(
        &mut self,
        delay_ms: u64,
        callback: Box<dyn FnMut(&mut Ctx) -> Rearm>,
    ) -> TimerId {
        self.timers.schedule(delay_ms, callback)
    }

    pub fn cancel_timer(&mut self, id: TimerId) {
        self.timers.cancel(id);
    }

    pub fn stop(&mut self) {
        self.stop_flag = true;
    }

    /// Runs until `stop()` is called. One iteration: compute the deadline
    /// from the nearest due timer, poll for readiness, dispatch ready fds,
    /// then sweep due timers.
    pub fn run(&mut self, ctx: &mut Ctx) -> io::Result<()> {
        while !self.stop_flag {
            self.run_once(ctx)?;
        }
        Ok(())
    }

    pub fn run_once(&mut self, ctx: &mut Ctx) -> io::Result<()> {
        let timeout = self.timers.nearest_due().map(|due| {
            due.saturating_duration_since(std::time::Instant::now())
        });

        if timeout.is_none() && self.file_events.is_empty() && self.timers.is_empty() {
            return Ok(());
        }

        match self.poll.poll(&mut self.events_buf, timeout.or(Some(Duration::from_secs(1)))) {
            Ok(()) => {},
            Err(e) if e.kind() == io::ErrorKind::Interrupted => return Ok(()),
            Err(e) => return Err(e),
        }

        // Copy the ready set out of `events_buf` before doing anything
        // mutable: dispatch hands callbacks the whole `Reactor`, which
        // would otherwise conflict with the borrow the iterator holds.
        let ready: Vec<(Token, FileEventMask)> = self
            .events_buf
            .iter()
            .map(|event| {
                let mut fired = FileEventMask::empty();
                if event.is_readable() {
                    fired |= FileEventMask::READABLE;
                }
                if event.is_writable() {
                    fired |= FileEventMask::WRITABLE;
                }
                if event.is_error() || event.is_read_closed() || event.is_write_closed() {
                    fired |= FileEventMask::EXCEPTION;
                }
                (event.token(), fired)
            })
            .collect();

        for (token, fired) in ready {
            if let Some(mut entry) = self.file_events.remove(&token) {
                trace!(?token, ?fired, "dispatching file event");
                self.dispatching = Some(token);
                self.dispatch_unregistered = false;
                (entry.callback)(ctx, self, token, fired);
                let unregistered = self.dispatch_unregistered;
                self.dispatching = None;
                // Re-insert unless the callback itself explicitly
                // unregistered this token (tracked above) — a vacant slot
                // alone doesn't mean that, since the callback may instead
                // have replaced it via register_file/reregister_file, which
                // already left a fresh entry in place.
                if !unregistered {
                    self.file_events.entry(token).or_insert(entry);
                }
            } else {
                warn!(?token, "readiness event for unknown token");
            }
        }

        self.timers.sweep(ctx);
        Ok(())
    }
}
