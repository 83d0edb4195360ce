// SPDX-License-Identifier: AGPL-3.0-or-later
// Copyright (C) 2012-2025 Andrei Maltsev

//! The single recurring housekeeping timer: reaps finished bgsave children
//! and periodically logs connection stats, mirroring the prototype's
//! `serverCron` (fixed 1000ms period, stats every third tick).

use tracing::info;

use crate::{context::ServerContext, reactor::Reactor};

const CRON_PERIOD_MS: u64 = 1000;
const STATS_EVERY_N_TICKS: u64 = 3;

pub fn start(reactor: &mut Reactor<ServerContext>) {
    let mut ticks: u64 = 0;
    reactor.schedule_timer(
        CRON_PERIOD_MS,
        Box::new(move |ctx: &mut ServerContext| {
            ticks += 1;

            ctx.snapshotter.reap_bgsave();

            if ticks % STATS_EVERY_N_TICKS == 0 {
                info!(
                    connections_accepted = ctx.connections_accepted,
                    active_sessions = ctx.sessions.len(),
                    "cron stats"
                );
            }

            Some(CRON_PERIOD_MS)
        }),
    );
}
