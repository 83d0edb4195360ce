// SPDX-License-Identifier: AGPL-3.0-or-later
// Copyright (C) 2012-2025 Andrei Maltsev

use std::{fs, path::Path};

use anyhow::{Context, Result, ensure};
use tracing::warn;

use crate::cfg::enums::{LogLevel, LogTarget};

/// Default number of logical databases when `databases` is absent from the
/// config file.
const DEFAULT_DATABASES: usize = 16;
const DEFAULT_PORT: u16 = 6379;

#[derive(Debug, Clone)]
pub struct Config {
    pub port: u16,
    pub loglevel: LogLevel,
    pub logfile: LogTarget,
    /// The directory the snapshotter writes its dump file into. Defaults to
    /// the current working directory when absent.
    pub dir: Option<String>,
    pub databases: usize,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            port: DEFAULT_PORT,
            loglevel: LogLevel::Info,
            logfile: LogTarget::Stdout,
            dir: None,
            databases: DEFAULT_DATABASES,
        }
    }
}

impl Config {
    /// Loads the server configuration from its line-oriented `key value`
    /// file format. Falls back to defaults (logged at `info`) when the path
    /// does not exist.
    pub fn load_from_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();
        if !path.exists() {
            tracing::info!(path = %path.display(), "no config file found, using defaults");
            return Ok(Self::default());
        }

        let contents = fs::read_to_string(path)
            .with_context(|| format!("failed to read config file {}", path.display()))?;

        let mut cfg = Self::default();
        for (lineno, raw) in contents.lines().enumerate() {
            let line = raw.trim();
            if line.is_empty() || line.starts_with('#') {
                continue;
            }

            let Some((key, rest)) = line.split_once(char::is_whitespace) else {
                warn!(line = lineno + 1, %line, "ignoring malformed config line");
                continue;
            };
            let value = rest.trim();

            match key {
                "port" => {
                    cfg.port = value
                        .parse()
                        .with_context(|| format!("invalid port on line {}", lineno + 1))?;
                },
                "loglevel" => {
                    cfg.loglevel = value.parse().with_context(|| {
                        format!("invalid loglevel on line {}", lineno + 1)
                    })?;
                },
                "logfile" => {
                    cfg.logfile = value.parse().with_context(|| {
                        format!("invalid logfile on line {}", lineno + 1)
                    })?;
                },
                "dir" => cfg.dir = Some(value.to_string()),
                "databases" => {
                    cfg.databases = value.parse().with_context(|| {
                        format!("invalid databases on line {}", lineno + 1)
                    })?;
                },
                other => warn!(key = other, line = lineno + 1, "unknown config key, ignoring"),
            }
        }

        cfg.validate()?;
        Ok(cfg)
    }

    fn validate(&self) -> Result<()> {
        ensure!(self.databases >= 1, "databases must be >= 1");
        Ok(())
    }
}
