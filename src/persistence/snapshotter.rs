// SPDX-License-Identifier: AGPL-3.0-or-later
// Copyright (C) 2012-2025 Andrei Maltsev

use std::{
    fs,
    io::Write,
    path::{Path, PathBuf},
    sync::atomic::{AtomicU64, Ordering},
    time::{SystemTime, UNIX_EPOCH},
};

use anyhow::{Context, Result};
use tracing::{info, warn};

use crate::{persistence::format::SnapshotFile, store::Keyspace};

/// Default dump file name, written alongside the binary.
pub const DEFAULT_DUMP_FILE: &str = "dump.pdb";

/// Owns the on-disk snapshot path and the bgsave bookkeeping (in-flight
/// child pid, last successful save timestamp). `save` blocks the reactor;
/// `bgsave` forks so the write happens off the reactor thread entirely.
pub struct Snapshotter {
    dump_path: PathBuf,
    lastsave: AtomicU64,
    bgsave_child: Option<i32>,
}

impl Snapshotter {
    pub fn new(dump_path: PathBuf) -> Self {
        Self { dump_path, lastsave: AtomicU64::new(0), bgsave_child: None }
    }

    pub fn dump_path(&self) -> &Path {
        &self.dump_path
    }

    pub fn lastsave(&self) -> u64 {
        self.lastsave.load(Ordering::SeqCst)
    }

    pub fn bgsave_in_progress(&self) -> bool {
        self.bgsave_child.is_some()
    }

    /// Loads the keyspace from the dump file if present, otherwise builds
    /// an empty keyspace of `databases` logical databases.
    pub fn load_or_default(dump_path: &Path, databases: usize) -> Result<Keyspace> {
        if !dump_path.exists() {
            info!(path = %dump_path.display(), "no dump file found, starting empty");
            return Ok(Keyspace::new(databases));
        }

        let raw = fs::read(dump_path)
            .with_context(|| format!("failed to read dump file {}", dump_path.display()))?;
        let file: SnapshotFile =
            serde_json::from_slice(&raw).context("failed to parse dump file")?;
        Ok(file.into_keyspace())
    }

    /// Synchronous, atomic save: write to a temp file in the same
    /// directory, fsync, then rename over the target path.
    pub fn save(&self, keyspace: &Keyspace) -> Result<()> {
        write_snapshot(&self.dump_path, keyspace)?;
        self.mark_saved_now();
        Ok(())
    }

    /// Forks a child that performs `save` in isolation from the live
    /// keyspace; the parent returns immediately. Only one bgsave may be in
    /// flight at a time (checked by the caller via `bgsave_in_progress`).
    #[cfg(unix)]
    pub fn bgsave(&mut self, keyspace: &Keyspace) -> Result<()> {
        // SAFETY: fork() duplicates the process; the child's view of
        // `keyspace` is a copy-on-write snapshot of this process's memory
        // at the instant of the call, so it never observes later writes
        // the parent makes on the reactor thread.
        let pid = unsafe { libc::fork() };
        match pid {
            -1 => Err(std::io::Error::last_os_error()).context("fork failed"),
            0 => {
                let code = match write_snapshot(&self.dump_path, keyspace) {
                    Ok(()) => 0,
                    Err(e) => {
                        // The child has no logging sink worth sharing with the
                        // parent's non-blocking writer thread; best effort only.
                        eprintln!("bgsave child failed: {e:#}");
                        1
                    },
                };
                // _exit, not exit: skip atexit/Drop machinery inherited from
                // the parent's copy of the process image.
                unsafe { libc::_exit(code) };
            },
            child => {
                self.bgsave_child = Some(child);
                Ok(())
            },
        }
    }

    /// Non-blocking reap of a finished bgsave child, called from Cron. Does
    /// nothing if no bgsave is in flight or the child hasn't exited yet.
    #[cfg(unix)]
    pub fn reap_bgsave(&mut self) {
        let Some(pid) = self.bgsave_child else { return };

        let mut status: libc::c_int = 0;
        let ret = unsafe { libc::waitpid(pid, &mut status, libc::WNOHANG) };
        if ret == 0 {
            return; // still running
        }
        if ret < 0 {
            warn!(pid, "waitpid failed while reaping bgsave child");
            self.bgsave_child = None;
            return;
        }

        self.bgsave_child = None;
        let exited_ok = (status & 0x7f) == 0 && ((status >> 8) & 0xff) == 0;
        if exited_ok {
            self.mark_saved_now();
            info!(pid, "bgsave completed");
        } else {
            warn!(pid, status, "bgsave child exited with failure");
        }
    }

    fn mark_saved_now(&self) {
        let now = SystemTime::now().duration_since(UNIX_EPOCH).unwrap_or_default().as_secs();
        self.lastsave.store(now, Ordering::SeqCst);
    }
}

fn write_snapshot(dump_path: &Path, keyspace: &Keyspace) -> Result<()> {
    let dir = dump_path.parent().filter(|p| !p.as_os_str().is_empty()).unwrap_or(Path::new("."));
    let tmp_path = dir.join(format!(
        ".{}.tmp",
        dump_path.file_name().and_then(|n| n.to_str()).unwrap_or("dump")
    ));

    let file = SnapshotFile::from_keyspace(keyspace);
    let encoded = serde_json::to_vec(&file).context("failed to encode snapshot")?;

    let mut f = fs::File::create(&tmp_path)
        .with_context(|| format!("failed to create temp snapshot {}", tmp_path.display()))?;
    f.write_all(&encoded).context("failed to write snapshot contents")?;
    f.sync_all().context("failed to fsync snapshot")?;
    drop(f);

    fs::rename(&tmp_path, dump_path)
        .with_context(|| format!("failed to rename snapshot into place at {}", dump_path.display()))?;
    Ok(())
}
