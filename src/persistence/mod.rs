// SPDX-License-Identifier: AGPL-3.0-or-later
// Copyright (C) 2012-2025 Andrei Maltsev

//! Snapshot persistence: atomic foreground saves and fork-based background
//! saves that never touch the live keyspace.

pub mod format;
pub mod snapshotter;

pub use snapshotter::{DEFAULT_DUMP_FILE, Snapshotter};
