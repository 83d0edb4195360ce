// SPDX-License-Identifier: AGPL-3.0-or-later
// Copyright (C) 2012-2025 Andrei Maltsev

use std::path::{Path, PathBuf};

use anyhow::{Context, Result};

/// Name of the environment variable that overrides the default config path.
pub const CONFIG_PATH_ENV: &str = "PEDIS_CONF";
const DEFAULT_CONFIG_PATH: &str = "../pedis.conf";

/// Resolves the path to the config file: an explicit CLI argument if given,
/// else `PEDIS_CONF` if set, else the default path (`../pedis.conf`) taken
/// relative to the running binary's own directory, not the current working
/// directory — so `pedis-server` finds its config whether launched from its
/// own directory or elsewhere.
///
/// Unlike a strict canonicalization this does not require the file to
/// already exist, since a missing config file is a valid (defaults-only)
/// startup state.
pub fn resolve_config_path(rel: Option<&str>) -> Result<PathBuf> {
    let rel = rel
        .map(str::to_string)
        .or_else(|| std::env::var(CONFIG_PATH_ENV).ok())
        .unwrap_or_else(|| DEFAULT_CONFIG_PATH.to_string());

    let p = Path::new(&rel);
    let abs = if p.is_absolute() {
        p.to_path_buf()
    } else {
        let exe = std::env::current_exe().context("cannot resolve own executable path")?;
        let exe_dir = exe.parent().unwrap_or_else(|| Path::new(".")).to_path_buf();
        exe_dir.join(p)
    };

    Ok(abs)
}
