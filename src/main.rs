// SPDX-License-Identifier: AGPL-3.0-or-later
// Copyright (C) 2012-2025 Andrei Maltsev

use anyhow::{Context, Result};
use pedis::{
    cfg::{cli::resolve_config_path, config::Config, logger::init_logger},
    server,
};
use tracing::info;

fn main() -> Result<()> {
    let config_arg = std::env::args().nth(1);
    let config_path = resolve_config_path(config_arg.as_deref())
        .context("failed to resolve config path")?;
    let cfg = Config::load_from_file(&config_path).context("failed to load config")?;

    let _logger_guard = init_logger(&cfg).context("failed to initialize logger")?;
    info!(config_path = %config_path.display(), port = cfg.port, "starting pedis");

    let exit_code = server::run(cfg)?;
    std::process::exit(exit_code);
}
