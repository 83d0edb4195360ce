// SPDX-License-Identifier: AGPL-3.0-or-later
// Copyright (C) 2012-2025 Andrei Maltsev

use std::{
    cmp::Reverse,
    collections::BinaryHeap,
    time::{Duration, Instant},
};

/// Strictly monotonic handle returned by `Reactor::schedule_timer`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct TimerId(pub(crate) u64);

/// What a fired timer callback returns: `Some(ms)` re-arms it `ms`
/// milliseconds from now, `None` removes it for good. Mirrors the
/// `timeProc` return convention of the original reactor this is modeled on
/// (a positive delay reschedules, `NOMORE` drops the timer).
pub type Rearm = Option<u64>;

pub(crate) struct TimerEntry<Ctx> {
    pub id: TimerId,
    pub due: Instant,
    seq: u64,
    pub callback: Box<dyn FnMut(&mut Ctx) -> Rearm>,
}

struct HeapKey {
    due: Instant,
    seq: u64,
}

impl PartialEq for HeapKey {
    fn eq(&self, other: &Self) -> bool {
        self.due == other.due && self.seq == other.seq
    }
}
impl Eq for HeapKey {}
impl PartialOrd for HeapKey {
    fn partial_cmp(&self, other: &Self) -> Option<std::cmp::Ordering> {
        Some(self.cmp(other))
    }
}
impl Ord for HeapKey {
    fn cmp(&self, other: &Self) -> std::cmp::Ordering {
        self.due.cmp(&other.due).then(self.seq.cmp(&other.seq))
    }
}

/// A min-heap of due timers, ordered by nearest-due-first with insertion
/// order breaking ties, as required by the reactor's iteration contract.
pub(crate) struct TimerQueue<Ctx> {
    heap: BinaryHeap<Reverse<HeapKey>>,
    entries: std::collections::HashMap<u64, TimerEntry<Ctx>>,
    next_id: u64,
    next_seq: u64,
}

impl<Ctx> Default for TimerQueue<Ctx> {
    fn default() -> Self {
        Self {
            heap: BinaryHeap::new(),
            entries: std::collections::HashMap::new(),
            next_id: 0,
            next_seq: 0,
        }
    }
}

impl<Ctx> TimerQueue<Ctx> {
    pub fn schedule(
        &mut self,
        delay_ms: u64,
        callback: Box<dyn FnMut(&mut Ctx) -> Rearm>,
    ) -> TimerId {
        let id = self.next_id;
        self.next_id += 1;
        let due = Instant::now() + Duration::from_millis(delay_ms);
        self.insert(id, due, callback);
        TimerId(id)
    }

    fn insert(&mut self, id: u64, due: Instant, callback: Box<dyn FnMut(&mut Ctx) -> Rearm>) {
        let seq = self.next_seq;
        self.next_seq += 1;
        self.heap.push(Reverse(HeapKey { due, seq }));
        self.entries.insert(id, TimerEntry { id: TimerId(id), due, seq, callback });
    }

    pub fn cancel(&mut self, id: TimerId) {
        self.entries.remove(&id.0);
    }

    pub fn nearest_due(&self) -> Option<Instant> {
        self.entries.values().map(|e| e.due).min()
    }

    /// Pops and invokes every timer whose due instant has passed, rescheduling
    /// those whose callback asks to be re-armed.
    pub fn sweep(&mut self, ctx: &mut Ctx) {
        let now = Instant::now();
        loop {
            let Some(Reverse(top)) = self.heap.peek() else { break };
            if top.due > now {
                break;
            }
            let Reverse(top) = self.heap.pop().expect("peeked entry must pop");

            let id = match self.entries.iter().find(|(_, e)| e.seq == top.seq) {
                Some((id, _)) => *id,
                None => continue, // stale heap entry for a cancelled timer
            };

            let Some(mut entry) = self.entries.remove(&id) else { continue };
            let rearm = (entry.callback)(ctx);
            if let Some(delay_ms) = rearm {
                let due = now + Duration::from_millis(delay_ms);
                entry.due = due;
                let seq = self.next_seq;
                self.next_seq += 1;
                entry.seq = seq;
                self.heap.push(Reverse(HeapKey { due, seq }));
                self.entries.insert(id, entry);
            }
        }
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}
